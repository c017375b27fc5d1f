mod error;
mod grammar;

pub use error::ParseError;

use crate::Condition;

/// Parse one persisted condition string, e.g. `essid contains "Coffee Shop"`.
///
/// # Errors
///
/// Returns [`ParseError`] if the input is not a valid condition string.
pub fn parse_condition(input: &str) -> Result<Condition, ParseError> {
    use winnow::Parser;
    grammar::condition
        .parse(input)
        .map_err(|e| ParseError::new(input, e.to_string()))
}

impl std::str::FromStr for Condition {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_condition(s)
    }
}
