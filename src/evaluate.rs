use std::net::IpAddr;
use std::time::Instant;

use ipnet::IpNet;

use crate::types::EvaluationReport;
use crate::{ActivationMode, Condition, ConditionField, ConditionOp, NetworkSnapshot};

pub(crate) fn evaluate(
    mode: ActivationMode,
    conditions: &[Condition],
    snapshot: &NetworkSnapshot,
) -> bool {
    let holds = |c: &Condition| eval_condition(c, snapshot).unwrap_or(false);
    match mode {
        ActivationMode::Manual => false,
        ActivationMode::System => true,
        ActivationMode::ConditionalAll => !conditions.is_empty() && conditions.iter().all(holds),
        ActivationMode::ConditionalAny => conditions.iter().any(holds),
    }
}

pub(crate) fn evaluate_detailed(
    mode: ActivationMode,
    conditions: &[Condition],
    snapshot: &NetworkSnapshot,
) -> EvaluationReport {
    let start = Instant::now();

    let mut held = Vec::new();
    let mut undecidable = Vec::new();
    for (i, c) in conditions.iter().enumerate() {
        match eval_condition(c, snapshot) {
            Some(true) => held.push(i),
            Some(false) => {}
            None => undecidable.push(i),
        }
    }

    let active = match mode {
        ActivationMode::Manual => false,
        ActivationMode::System => true,
        ActivationMode::ConditionalAll => !conditions.is_empty() && held.len() == conditions.len(),
        ActivationMode::ConditionalAny => !held.is_empty(),
    };

    EvaluationReport::new(mode, active, held, undecidable, start.elapsed())
}

/// Evaluate one condition. `None` means the condition cannot be decided:
/// no field selected, an operator the field does not support, or a value
/// that does not parse.
pub(crate) fn eval_condition(c: &Condition, snapshot: &NetworkSnapshot) -> Option<bool> {
    match c.field {
        ConditionField::Ncu => eval_entity(c.op, snapshot.is_ncu_active(&c.value)),
        ConditionField::Enm => eval_entity(c.op, snapshot.is_enm_active(&c.value)),
        ConditionField::Loc => eval_entity(c.op, snapshot.is_location_active(&c.value)),
        ConditionField::IpAddress => eval_address(c.op, &c.value, snapshot.addresses()),
        ConditionField::AdvDomain => {
            eval_text(c.op, &c.value, snapshot.advertised_domains(), false)
        }
        ConditionField::SysDomain => eval_text(c.op, &c.value, snapshot.system_domains(), false),
        ConditionField::Essid => eval_text(c.op, &c.value, snapshot.essids(), false),
        // Hardware addresses are compared without regard to hex digit case.
        ConditionField::Bssid => eval_text(c.op, &c.value, snapshot.bssids(), true),
        ConditionField::Last => None,
    }
}

fn eval_entity(op: ConditionOp, active: bool) -> Option<bool> {
    match op {
        ConditionOp::Is | ConditionOp::Include => Some(active),
        ConditionOp::IsNot | ConditionOp::DoesNotInclude => Some(!active),
        _ => None,
    }
}

fn parse_range(value: &str) -> Option<IpNet> {
    let value = value.trim();
    value
        .parse::<IpNet>()
        .ok()
        .or_else(|| value.parse::<IpAddr>().ok().map(IpNet::from))
}

fn eval_address(op: ConditionOp, value: &str, addresses: &[IpAddr]) -> Option<bool> {
    match op {
        ConditionOp::IsInRange | ConditionOp::IsNotInRange => {
            let range = parse_range(value)?;
            let any = addresses.iter().any(|a| range.contains(a));
            Some(any != op.is_negated())
        }
        ConditionOp::Is | ConditionOp::IsNot => {
            let target: IpAddr = value.trim().parse().ok()?;
            let any = addresses.contains(&target);
            Some(any != op.is_negated())
        }
        _ => None,
    }
}

fn eval_text(
    op: ConditionOp,
    value: &str,
    observed: &[String],
    ignore_case: bool,
) -> Option<bool> {
    let norm = |s: &str| {
        if ignore_case {
            s.to_ascii_lowercase()
        } else {
            s.to_owned()
        }
    };
    let needle = norm(value);
    let any = match op {
        ConditionOp::Contains | ConditionOp::DoesNotContain => {
            observed.iter().any(|o| norm(o.as_str()).contains(&needle))
        }
        ConditionOp::Is
        | ConditionOp::IsNot
        | ConditionOp::Include
        | ConditionOp::DoesNotInclude => observed.iter().any(|o| norm(o.as_str()) == needle),
        ConditionOp::IsInRange | ConditionOp::IsNotInRange => return None,
    };
    Some(any != op.is_negated())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{condition, ConditionSetBuilder};

    fn office() -> NetworkSnapshot {
        NetworkSnapshot::new()
            .ncu("net0")
            .location("work")
            .enm("vpn")
            .address("10.0.0.12".parse().unwrap())
            .address("fe80::1".parse().unwrap())
            .advertised_domain("corp.example.com")
            .system_domain("example.com")
            .essid("CorpWLAN")
            .bssid("00:1B:2C:3D:4E:5F")
    }

    #[test]
    fn entity_conditions() {
        let snap = office();
        let cases = vec![
            (condition(ConditionField::Ncu).is("net0"), Some(true)),
            (condition(ConditionField::Ncu).is("net1"), Some(false)),
            (condition(ConditionField::Ncu).is_not("net1"), Some(true)),
            (condition(ConditionField::Loc).is("work"), Some(true)),
            (condition(ConditionField::Loc).is_not("work"), Some(false)),
            (condition(ConditionField::Enm).include("vpn"), Some(true)),
            (condition(ConditionField::Enm).contains("vpn"), None),
        ];
        for (c, expected) in cases {
            assert_eq!(eval_condition(&c, &snap), expected, "failed for {c}");
        }
    }

    #[test]
    fn address_ranges() {
        let snap = office();
        let cases = vec![
            (condition(ConditionField::IpAddress).in_range("10.0.0.0/24"), Some(true)),
            (condition(ConditionField::IpAddress).in_range("10.0.1.0/24"), Some(false)),
            (condition(ConditionField::IpAddress).not_in_range("192.168.0.0/16"), Some(true)),
            (condition(ConditionField::IpAddress).in_range("fe80::/10"), Some(true)),
            (condition(ConditionField::IpAddress).in_range("10.0.0.12"), Some(true)),
            (condition(ConditionField::IpAddress).is("10.0.0.12"), Some(true)),
            (condition(ConditionField::IpAddress).in_range("not-a-cidr"), None),
            (condition(ConditionField::IpAddress).contains("10."), None),
        ];
        for (c, expected) in cases {
            assert_eq!(eval_condition(&c, &snap), expected, "failed for {c}");
        }
    }

    #[test]
    fn text_conditions() {
        let snap = office();
        let cases = vec![
            (condition(ConditionField::AdvDomain).contains("corp"), Some(true)),
            (condition(ConditionField::AdvDomain).does_not_contain("corp"), Some(false)),
            (condition(ConditionField::SysDomain).contains("example"), Some(true)),
            (condition(ConditionField::Essid).contains("Corp"), Some(true)),
            (condition(ConditionField::Essid).contains("corp"), Some(false)),
            (condition(ConditionField::Essid).is("CorpWLAN"), Some(true)),
            (condition(ConditionField::Bssid).contains("00:1b:2c"), Some(true)),
            (condition(ConditionField::Bssid).is("00:1b:2c:3d:4e:5f"), Some(true)),
            (condition(ConditionField::Essid).in_range("x"), None),
        ];
        for (c, expected) in cases {
            assert_eq!(eval_condition(&c, &snap), expected, "failed for {c}");
        }
    }

    #[test]
    fn unset_system_domain_never_contains() {
        let snap = NetworkSnapshot::new();
        let c = condition(ConditionField::SysDomain).contains("example");
        assert_eq!(eval_condition(&c, &snap), Some(false));
        let c = condition(ConditionField::SysDomain).does_not_contain("example");
        assert_eq!(eval_condition(&c, &snap), Some(true));
    }

    #[test]
    fn blank_condition_is_undecidable() {
        assert_eq!(eval_condition(&Condition::default(), &office()), None);
    }

    #[test]
    fn modes() {
        let snap = office();
        let conditions = vec![
            condition(ConditionField::Ncu).is("net0"),
            condition(ConditionField::Essid).contains("Guest"),
        ];
        assert!(!evaluate(ActivationMode::Manual, &conditions, &snap));
        assert!(evaluate(ActivationMode::System, &conditions, &snap));
        assert!(!evaluate(ActivationMode::ConditionalAll, &conditions, &snap));
        assert!(evaluate(ActivationMode::ConditionalAny, &conditions, &snap));
    }

    #[test]
    fn conditional_with_no_conditions_is_inactive() {
        let snap = office();
        assert!(!evaluate(ActivationMode::ConditionalAll, &[], &snap));
        assert!(!evaluate(ActivationMode::ConditionalAny, &[], &snap));
    }

    #[test]
    fn detailed_matches_plain() {
        let snap = office();
        let set = ConditionSetBuilder::new()
            .mode(ActivationMode::ConditionalAny)
            .condition(condition(ConditionField::Ncu).is("net9"))
            .condition(condition(ConditionField::IpAddress).in_range("bogus"))
            .condition(condition(ConditionField::Loc).is("work"))
            .build()
            .unwrap();
        let report = set.evaluate_detailed(&snap);
        assert_eq!(report.active(), set.evaluate(&snap));
        assert_eq!(report.held(), &[2]);
        assert_eq!(report.undecidable(), &[1]);
    }
}
