use std::net::{IpAddr, Ipv4Addr};

use nwam_rules::{ActivationMode, ConditionSet, NetworkSnapshot};

fn main() {
    let set = ConditionSet::from_strings(
        ActivationMode::ConditionalAny,
        [
            r#"essid contains "Coffee""#,
            "ip-address is-in-range 192.168.0.0/16",
            "advertised-domain is corp.example.com",
        ],
    )
    .expect("failed to parse conditions");

    let snapshot = NetworkSnapshot::new()
        .essid("Free Wi-Fi")
        .address(IpAddr::V4(Ipv4Addr::new(192, 168, 1, 7)));

    let report = set.evaluate_detailed(&snapshot);

    println!("{report}");
    println!();
    println!("Conditions that held: {:?}", report.held());
    println!("Undecidable conditions: {:?}", report.undecidable());
    println!("Duration: {:?}", report.duration());
}
