#![cfg(feature = "file-store")]

use nwam_rules::store::{FileStore, StoreError};
use nwam_rules::{
    condition, ActivationMode, Catalog, ConditionField, ConditionalEntity, EditorConfig,
    EntityKind, RuleEditor,
};

#[test]
fn missing_file_is_empty_store() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileStore::open(dir.path().join("nwam.db")).unwrap();
    assert!(store.names(EntityKind::Location).is_empty());
    assert!(!store.path().exists());
}

#[test]
fn commit_persists_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nwam.db");

    let mut store = FileStore::open(&path).unwrap();
    {
        let mut home = store.entity(EntityKind::Location, "home");
        home.set_activation_mode(ActivationMode::ConditionalAny);
        home.set_conditions(vec![
            condition(ConditionField::Essid).contains("Home Net"),
            condition(ConditionField::IpAddress).in_range("192.168.1.0/24"),
        ]);
        home.commit().unwrap();
    }

    let mut reopened = FileStore::open(&path).unwrap();
    assert_eq!(reopened.names(EntityKind::Location), vec!["home"]);
    let home = reopened.entity(EntityKind::Location, "home");
    assert_eq!(home.activation_mode(), ActivationMode::ConditionalAny);
    assert_eq!(
        home.conditions(),
        vec![
            condition(ConditionField::Essid).contains("Home Net"),
            condition(ConditionField::IpAddress).in_range("192.168.1.0/24"),
        ]
    );
}

#[test]
fn invalid_set_rejected_before_write() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nwam.db");
    let mut store = FileStore::open(&path).unwrap();

    let mut vpn = store.entity(EntityKind::Enm, "vpn");
    vpn.set_activation_mode(ActivationMode::ConditionalAll);
    let err = vpn.commit().unwrap_err();
    assert_eq!(err.property.as_deref(), Some("conditions"));

    assert!(!store.contains(EntityKind::Enm, "vpn"));
    assert!(!path.exists());
}

#[test]
fn editor_round_trip_through_store() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nwam.db");

    let mut store = FileStore::open(&path).unwrap();
    store.entity(EntityKind::Ncu, "net0").commit().unwrap();
    store.entity(EntityKind::Ncu, "wlan0").commit().unwrap();
    assert_eq!(store.interfaces(), vec!["net0", "wlan0"]);

    let catalog = nwam_rules::StaticCatalog {
        interfaces: store.interfaces(),
        ..Default::default()
    };
    let mut editor = RuleEditor::new(catalog, EditorConfig::default());
    let id = editor.row_ids()[0];
    editor.set_field(id, ConditionField::Ncu);
    editor.set_value(id, "wlan0");
    editor.set_activation_mode(ActivationMode::ConditionalAll);

    let mut office = store.entity(EntityKind::Location, "office");
    editor.apply(&mut office).unwrap();

    let mut reopened = FileStore::open(&path).unwrap();
    let office = reopened.entity(EntityKind::Location, "office");
    editor.refresh(&office, true);
    assert_eq!(
        editor.conditions(),
        vec![condition(ConditionField::Ncu).is("wlan0")]
    );
    assert_eq!(editor.activation_mode(), ActivationMode::ConditionalAll);
}

#[test]
fn remove_deletes_record() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nwam.db");

    let mut store = FileStore::open(&path).unwrap();
    store.entity(EntityKind::Location, "cafe").commit().unwrap();
    assert!(store.remove(EntityKind::Location, "cafe").unwrap());
    assert!(!store.remove(EntityKind::Location, "cafe").unwrap());

    let reopened = FileStore::open(&path).unwrap();
    assert!(!reopened.contains(EntityKind::Location, "cafe"));
}

#[test]
fn foreign_file_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nwam.db");
    std::fs::write(&path, vec![0x42; 64]).unwrap();
    assert!(matches!(FileStore::open(&path), Err(StoreError::BadMagic)));
}

#[test]
fn tampered_file_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nwam.db");

    let mut store = FileStore::open(&path).unwrap();
    store.entity(EntityKind::Location, "home").commit().unwrap();

    let mut bytes = std::fs::read(&path).unwrap();
    let last = bytes.len() - 1;
    bytes[last] ^= 0x01;
    std::fs::write(&path, bytes).unwrap();

    assert!(matches!(
        FileStore::open(&path),
        Err(StoreError::ChecksumMismatch)
    ));
}

#[test]
fn unreadable_path_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    assert!(matches!(
        FileStore::open(dir.path()),
        Err(StoreError::Io(_))
    ));
}

#[test]
fn failed_write_rolls_back() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nwam.db");

    let mut store = FileStore::open(&path).unwrap();
    store.entity(EntityKind::Location, "home").commit().unwrap();

    // A directory in place of the file makes the next write fail.
    std::fs::remove_file(&path).unwrap();
    std::fs::create_dir(&path).unwrap();

    let mut home = store.entity(EntityKind::Location, "home");
    home.set_activation_mode(ActivationMode::System);
    assert!(home.commit().is_err());
    assert_eq!(
        store.entity(EntityKind::Location, "home").activation_mode(),
        ActivationMode::Manual
    );
    assert!(!dir.path().join("nwam.db.tmp").exists());
}

fn dir_listing(dir: &std::path::Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[test]
fn save_replaces_file_without_leftovers() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nwam.db");

    let mut store = FileStore::open(&path).unwrap();
    store.entity(EntityKind::Location, "home").commit().unwrap();
    store.entity(EntityKind::Location, "work").commit().unwrap();
    assert_eq!(dir_listing(dir.path()), vec!["nwam.db"]);

    let reopened = FileStore::open(&path).unwrap();
    assert_eq!(reopened.names(EntityKind::Location), vec!["home", "work"]);
}

#[test]
fn stale_staging_file_is_ignored_and_replaced() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nwam.db");

    let mut store = FileStore::open(&path).unwrap();
    store.entity(EntityKind::Location, "home").commit().unwrap();

    // An interrupted save leaves a partial staging file beside an intact store.
    std::fs::write(dir.path().join("nwam.db.tmp"), b"NWRL\x01").unwrap();

    let mut reopened = FileStore::open(&path).unwrap();
    assert!(reopened.contains(EntityKind::Location, "home"));
    reopened.entity(EntityKind::Location, "cafe").commit().unwrap();
    assert_eq!(dir_listing(dir.path()), vec!["nwam.db"]);
    assert_eq!(
        FileStore::open(&path).unwrap().names(EntityKind::Location),
        vec!["home", "cafe"]
    );
}
