use serde::{Deserialize, Serialize};

use super::condition::{Condition, ConditionField, ConditionOp};
use super::entity_kind::EntityKind;

/// How the value of a condition is entered for a given field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    /// Pick the name of a configured entity of the given kind.
    Reference(EntityKind),
    /// Free text entry.
    FreeText,
    /// Free text with completion from known wireless networks.
    Completion,
    /// No field selected; nothing to enter.
    Disabled,
}

/// Operator policy for [`ConditionField::Bssid`].
///
/// The configuration service documents no operator restriction for BSSID
/// conditions. `LikeEssid` restricts them the same way ESSID is restricted;
/// `Unrestricted` offers every operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BssidPolicy {
    #[default]
    LikeEssid,
    Unrestricted,
}

const ENTITY_OPS: &[ConditionOp] = &[ConditionOp::Is, ConditionOp::IsNot];
const RANGE_OPS: &[ConditionOp] = &[ConditionOp::IsInRange, ConditionOp::IsNotInRange];
const TEXT_OPS: &[ConditionOp] = &[ConditionOp::Contains, ConditionOp::DoesNotContain];

impl ConditionField {
    /// Operators selectable for this field. The first entry is the default.
    ///
    /// Returns an empty slice for [`ConditionField::Last`].
    #[must_use]
    pub fn operators(self, bssid: BssidPolicy) -> &'static [ConditionOp] {
        match self {
            ConditionField::Ncu | ConditionField::Loc | ConditionField::Enm => ENTITY_OPS,
            ConditionField::IpAddress => RANGE_OPS,
            ConditionField::AdvDomain | ConditionField::SysDomain | ConditionField::Essid => {
                TEXT_OPS
            }
            ConditionField::Bssid => match bssid {
                BssidPolicy::LikeEssid => TEXT_OPS,
                BssidPolicy::Unrestricted => &ConditionOp::ALL,
            },
            ConditionField::Last => &[],
        }
    }

    /// The operator a row falls back to when this field is selected.
    #[must_use]
    pub fn default_op(self, bssid: BssidPolicy) -> Option<ConditionOp> {
        self.operators(bssid).first().copied()
    }

    #[must_use]
    pub fn accepts(self, op: ConditionOp, bssid: BssidPolicy) -> bool {
        self.operators(bssid).contains(&op)
    }

    #[must_use]
    pub fn value_kind(self) -> ValueKind {
        match self {
            ConditionField::Ncu => ValueKind::Reference(EntityKind::Ncu),
            ConditionField::Loc => ValueKind::Reference(EntityKind::Location),
            ConditionField::Enm => ValueKind::Reference(EntityKind::Enm),
            ConditionField::IpAddress
            | ConditionField::AdvDomain
            | ConditionField::SysDomain
            | ConditionField::Bssid => ValueKind::FreeText,
            ConditionField::Essid => ValueKind::Completion,
            ConditionField::Last => ValueKind::Disabled,
        }
    }
}

impl Condition {
    /// Whether the operator is selectable for the field.
    #[must_use]
    pub fn is_compatible(&self, bssid: BssidPolicy) -> bool {
        self.field.accepts(self.op, bssid)
    }
}

impl ValueKind {
    /// Text-like inputs keep their contents when switching between each other.
    #[must_use]
    pub fn is_text(self) -> bool {
        matches!(self, ValueKind::FreeText | ValueKind::Completion)
    }
}
