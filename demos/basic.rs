use std::net::{IpAddr, Ipv4Addr};

use nwam_rules::{
    ActivationMode, ConditionField, ConditionSetBuilder, ConditionalEntity, EditorConfig,
    EntityKind, MemoryEntity, NetworkSnapshot, RuleEditor, StaticCatalog,
};

fn main() {
    let catalog = StaticCatalog::new().interface("net0").interface("wlan0");
    let mut editor = RuleEditor::new(catalog, EditorConfig::default());
    let mut office = MemoryEntity::new(EntityKind::Location, "office");

    // Two rows: the wired link is up and we hold an office address
    let first = editor.row_ids()[0];
    let second = editor.add_row_after(first);
    editor.set_field(first, ConditionField::Ncu);
    editor.set_value(first, "net0");
    editor.set_field(second, ConditionField::IpAddress);
    editor.set_value(second, "10.1.0.0/16");
    editor.set_activation_mode(ActivationMode::ConditionalAll);

    editor
        .apply(&mut office)
        .expect("failed to apply conditions");

    let set = ConditionSetBuilder::new()
        .mode(office.activation_mode())
        .conditions(office.conditions())
        .build()
        .expect("stored set is valid");
    println!("{set}");

    let snapshot = NetworkSnapshot::new()
        .ncu("net0")
        .address(IpAddr::V4(Ipv4Addr::new(10, 1, 4, 20)));

    if set.evaluate(&snapshot) {
        println!("Location 'office' activates.");
    } else {
        println!("Location 'office' stays inactive.");
    }
}
