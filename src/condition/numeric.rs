//! `Numeric*` operators over integer request values.

use super::{Operator, ValueSet};
use crate::error::PolicyError;

pub(super) fn operand(operator: Operator, values: &ValueSet) -> Result<i64, PolicyError> {
    let mut iter = values.iter();
    match (iter.next(), iter.next()) {
        (Some(v), None) => v.as_int().ok_or_else(|| {
            PolicyError::invalid_value(operator, format!("value '{v}' must be an integer"))
        }),
        _ => Err(PolicyError::invalid_value(
            operator,
            "exactly one value is allowed",
        )),
    }
}

/// Positive form; `NumericNotEquals` is negated by the caller.
pub(super) fn matches(operator: Operator, operand: i64, observed: &[String]) -> bool {
    observed
        .iter()
        .filter_map(|v| v.trim().parse::<i64>().ok())
        .any(|n| match operator {
            Operator::NumericEquals | Operator::NumericNotEquals => n == operand,
            Operator::NumericLessThan => n < operand,
            Operator::NumericLessThanEquals => n <= operand,
            Operator::NumericGreaterThan => n > operand,
            Operator::NumericGreaterThanEquals => n >= operand,
            _ => false,
        })
}
