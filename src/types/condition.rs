use std::fmt;

use serde::{Deserialize, Serialize};

/// Subject of a condition test.
///
/// `Last` is the sentinel for "no condition selected"; it is what a freshly
/// added editor row holds and it never appears in a persisted condition set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConditionField {
    Ncu,
    Loc,
    Enm,
    IpAddress,
    AdvDomain,
    SysDomain,
    Essid,
    Bssid,
    #[default]
    Last,
}

/// Comparison operators supported in activation conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConditionOp {
    #[default]
    Is,
    IsNot,
    Include,
    DoesNotInclude,
    IsInRange,
    IsNotInRange,
    Contains,
    DoesNotContain,
}

impl ConditionField {
    /// Every selectable field, in picker order. `Last` is excluded.
    pub const ALL: [ConditionField; 8] = [
        ConditionField::Ncu,
        ConditionField::Loc,
        ConditionField::Enm,
        ConditionField::IpAddress,
        ConditionField::AdvDomain,
        ConditionField::SysDomain,
        ConditionField::Essid,
        ConditionField::Bssid,
    ];

    /// Keyword used in condition strings. `None` for the `Last` sentinel.
    #[must_use]
    pub fn keyword(self) -> Option<&'static str> {
        match self {
            ConditionField::Ncu => Some("ncu"),
            ConditionField::Loc => Some("loc"),
            ConditionField::Enm => Some("enm"),
            ConditionField::IpAddress => Some("ip-address"),
            ConditionField::AdvDomain => Some("advertised-domain"),
            ConditionField::SysDomain => Some("system-domain"),
            ConditionField::Essid => Some("essid"),
            ConditionField::Bssid => Some("bssid"),
            ConditionField::Last => None,
        }
    }

    #[must_use]
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|f| f.keyword() == Some(keyword))
    }
}

impl ConditionOp {
    pub const ALL: [ConditionOp; 8] = [
        ConditionOp::Is,
        ConditionOp::IsNot,
        ConditionOp::Include,
        ConditionOp::DoesNotInclude,
        ConditionOp::IsInRange,
        ConditionOp::IsNotInRange,
        ConditionOp::Contains,
        ConditionOp::DoesNotContain,
    ];

    #[must_use]
    pub fn keyword(self) -> &'static str {
        match self {
            ConditionOp::Is => "is",
            ConditionOp::IsNot => "is-not",
            ConditionOp::Include => "include",
            ConditionOp::DoesNotInclude => "does-not-include",
            ConditionOp::IsInRange => "is-in-range",
            ConditionOp::IsNotInRange => "is-not-in-range",
            ConditionOp::Contains => "contains",
            ConditionOp::DoesNotContain => "does-not-contain",
        }
    }

    #[must_use]
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.keyword() == keyword)
    }

    /// Whether this operator is the negated form of a test.
    #[must_use]
    pub fn is_negated(self) -> bool {
        matches!(
            self,
            ConditionOp::IsNot
                | ConditionOp::DoesNotInclude
                | ConditionOp::IsNotInRange
                | ConditionOp::DoesNotContain
        )
    }
}

impl fmt::Display for ConditionField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.keyword() {
            Some(k) => f.write_str(k),
            None => f.write_str("<none>"),
        }
    }
}

impl fmt::Display for ConditionOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// A single `(field, operator, value)` activation test.
///
/// The legal syntax of `value` depends on `field`: a CIDR for
/// [`ConditionField::IpAddress`], the name of a configured entity for
/// `Ncu`/`Loc`/`Enm`, free text otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Condition {
    pub field: ConditionField,
    pub op: ConditionOp,
    pub value: String,
}

impl Condition {
    pub fn new(field: ConditionField, op: ConditionOp, value: impl Into<String>) -> Self {
        Self {
            field,
            op,
            value: value.into(),
        }
    }

    /// A row that has no field selected yet.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.field == ConditionField::Last
    }
}

/// Renders the canonical condition string, e.g. `ip-address is-in-range 10.0.0.0/24`.
///
/// Values containing whitespace or quotes are quoted and escaped so the output
/// parses back to the same condition.
impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} ", self.field, self.op)?;
        let needs_quotes = self.value.is_empty()
            || self
                .value
                .chars()
                .any(|c| c.is_whitespace() || c == '"' || c == '\\' || c == '#');
        if needs_quotes {
            f.write_str("\"")?;
            for c in self.value.chars() {
                match c {
                    '"' => f.write_str("\\\"")?,
                    '\\' => f.write_str("\\\\")?,
                    c => write!(f, "{c}")?,
                }
            }
            f.write_str("\"")
        } else {
            f.write_str(&self.value)
        }
    }
}

/// Intermediate builder for conditions. Created by [`condition()`]; an
/// operator method produces the finished [`Condition`].
#[derive(Debug, Clone, Copy)]
pub struct ConditionBuilder {
    field: ConditionField,
}

impl ConditionBuilder {
    fn with(self, op: ConditionOp, value: impl Into<String>) -> Condition {
        Condition::new(self.field, op, value)
    }

    #[must_use]
    pub fn is(self, value: impl Into<String>) -> Condition {
        self.with(ConditionOp::Is, value)
    }

    #[must_use]
    pub fn is_not(self, value: impl Into<String>) -> Condition {
        self.with(ConditionOp::IsNot, value)
    }

    #[must_use]
    pub fn include(self, value: impl Into<String>) -> Condition {
        self.with(ConditionOp::Include, value)
    }

    #[must_use]
    pub fn does_not_include(self, value: impl Into<String>) -> Condition {
        self.with(ConditionOp::DoesNotInclude, value)
    }

    #[must_use]
    pub fn in_range(self, value: impl Into<String>) -> Condition {
        self.with(ConditionOp::IsInRange, value)
    }

    #[must_use]
    pub fn not_in_range(self, value: impl Into<String>) -> Condition {
        self.with(ConditionOp::IsNotInRange, value)
    }

    #[must_use]
    pub fn contains(self, value: impl Into<String>) -> Condition {
        self.with(ConditionOp::Contains, value)
    }

    #[must_use]
    pub fn does_not_contain(self, value: impl Into<String>) -> Condition {
        self.with(ConditionOp::DoesNotContain, value)
    }
}

#[must_use]
pub fn condition(field: ConditionField) -> ConditionBuilder {
    ConditionBuilder { field }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_sets_operator() {
        let c = condition(ConditionField::Ncu).is("net0");
        assert_eq!(
            c,
            Condition {
                field: ConditionField::Ncu,
                op: ConditionOp::Is,
                value: "net0".to_owned(),
            }
        );
    }

    #[test]
    fn all_builder_ops() {
        let b = condition(ConditionField::Essid);
        let ops = vec![
            (b.is("x"), ConditionOp::Is),
            (b.is_not("x"), ConditionOp::IsNot),
            (b.include("x"), ConditionOp::Include),
            (b.does_not_include("x"), ConditionOp::DoesNotInclude),
            (b.in_range("x"), ConditionOp::IsInRange),
            (b.not_in_range("x"), ConditionOp::IsNotInRange),
            (b.contains("x"), ConditionOp::Contains),
            (b.does_not_contain("x"), ConditionOp::DoesNotContain),
        ];
        for (c, expected) in ops {
            assert_eq!(c.op, expected);
            assert_eq!(c.field, ConditionField::Essid);
        }
    }

    #[test]
    fn default_is_blank() {
        let c = Condition::default();
        assert!(c.is_blank());
        assert_eq!(c.value, "");
    }

    #[test]
    fn keywords_round_trip() {
        for field in ConditionField::ALL {
            let kw = field.keyword().unwrap();
            assert_eq!(ConditionField::from_keyword(kw), Some(field));
        }
        for op in ConditionOp::ALL {
            assert_eq!(ConditionOp::from_keyword(op.keyword()), Some(op));
        }
        assert_eq!(ConditionField::Last.keyword(), None);
        assert_eq!(ConditionField::from_keyword("last"), None);
    }

    #[test]
    fn display_bare_value() {
        let c = condition(ConditionField::IpAddress).in_range("10.0.0.0/24");
        assert_eq!(c.to_string(), "ip-address is-in-range 10.0.0.0/24");
    }

    #[test]
    fn display_quotes_whitespace_and_escapes() {
        let c = condition(ConditionField::Essid).contains(r#"Cafe "Free" Wi\Fi"#);
        assert_eq!(
            c.to_string(),
            r#"essid contains "Cafe \"Free\" Wi\\Fi""#
        );
    }

    #[test]
    fn display_quotes_empty_value() {
        let c = condition(ConditionField::SysDomain).contains("");
        assert_eq!(c.to_string(), r#"system-domain contains """#);
    }

    #[test]
    fn negated_ops() {
        assert!(ConditionOp::IsNot.is_negated());
        assert!(ConditionOp::DoesNotContain.is_negated());
        assert!(!ConditionOp::Is.is_negated());
        assert!(!ConditionOp::IsInRange.is_negated());
    }
}
