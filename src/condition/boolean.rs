//! `Bool` and `Null`.

use super::value::parse_bool;
use super::{Operator, ValueSet};
use crate::error::PolicyError;

/// Both operators take exactly one `true`/`false` operand.
pub(super) fn operand(operator: Operator, values: &ValueSet) -> Result<bool, PolicyError> {
    let mut iter = values.iter();
    match (iter.next(), iter.next()) {
        (Some(v), None) => v.as_bool().ok_or_else(|| {
            PolicyError::invalid_value(operator, format!("value '{v}' must be true or false"))
        }),
        _ => Err(PolicyError::invalid_value(
            operator,
            "exactly one value is allowed",
        )),
    }
}

pub(super) fn matches(expected: bool, observed: &[String]) -> bool {
    observed.iter().any(|v| parse_bool(v) == Some(expected))
}

/// `Null: true` holds when the key is absent, `Null: false` when present.
pub(super) fn presence(must_be_absent: bool, observed: &[String]) -> bool {
    let present = !observed.is_empty();
    present == !must_be_absent
}
