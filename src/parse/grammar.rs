use winnow::combinator::{alt, cut_err};
use winnow::error::{ModalResult, StrContext, StrContextValue};
use winnow::prelude::*;
use winnow::token::{any, take_while};

use crate::{Condition, ConditionField, ConditionOp};

// -- Whitespace -------------------------------------------------------------

fn ws(input: &mut &str) -> ModalResult<()> {
    take_while(0.., |c: char| c.is_whitespace())
        .void()
        .parse_next(input)
}

// -- Keywords ---------------------------------------------------------------

fn keyword<'i>(input: &mut &'i str) -> ModalResult<&'i str> {
    take_while(1.., |c: char| c.is_ascii_alphanumeric() || c == '-').parse_next(input)
}

fn field(input: &mut &str) -> ModalResult<ConditionField> {
    keyword
        .verify_map(ConditionField::from_keyword)
        .context(StrContext::Expected(StrContextValue::Description(
            "condition field",
        )))
        .parse_next(input)
}

fn operator(input: &mut &str) -> ModalResult<ConditionOp> {
    keyword
        .verify_map(ConditionOp::from_keyword)
        .context(StrContext::Expected(StrContextValue::Description(
            "condition operator",
        )))
        .parse_next(input)
}

// -- Values -----------------------------------------------------------------

fn string_literal(input: &mut &str) -> ModalResult<String> {
    '"'.parse_next(input)?;
    let mut s = String::new();
    loop {
        let ch = cut_err(any).parse_next(input)?;
        match ch {
            '"' => return Ok(s),
            '\\' => {
                let esc = cut_err(any).parse_next(input)?;
                match esc {
                    '"' => s.push('"'),
                    '\\' => s.push('\\'),
                    other => {
                        s.push('\\');
                        s.push(other);
                    }
                }
            }
            c => s.push(c),
        }
    }
}

fn bare_value(input: &mut &str) -> ModalResult<String> {
    take_while(1.., |c: char| !c.is_whitespace() && c != '"')
        .map(str::to_owned)
        .parse_next(input)
}

fn value(input: &mut &str) -> ModalResult<String> {
    alt((string_literal, bare_value))
        .context(StrContext::Expected(StrContextValue::Description("value")))
        .parse_next(input)
}

// -- Top-level parser -------------------------------------------------------

pub fn condition(input: &mut &str) -> ModalResult<Condition> {
    ws.parse_next(input)?;
    let field = field.parse_next(input)?;
    ws.parse_next(input)?;
    let op = cut_err(operator).parse_next(input)?;
    ws.parse_next(input)?;
    let value = cut_err(value).parse_next(input)?;
    ws.parse_next(input)?;
    Ok(Condition { field, op, value })
}
