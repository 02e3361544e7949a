//! `String*` operators.

use std::borrow::Cow;

use super::{Operator, ValueSet};
use crate::error::PolicyError;
use crate::variables::{ConditionValues, substitute};
use crate::wildcard;

pub(super) fn operands(operator: Operator, values: &ValueSet) -> Result<Vec<String>, PolicyError> {
    values
        .iter()
        .map(|v| {
            v.as_str().map(str::to_string).ok_or_else(|| {
                PolicyError::invalid_value(operator, format!("value '{v}' must be a string"))
            })
        })
        .collect()
}

/// Positive form of every string operator; negation is applied by the caller.
pub(super) fn matches(
    operator: Operator,
    operands: &[String],
    observed: &[String],
    values: &ConditionValues,
) -> bool {
    // Operands may carry policy variables, resolved per request.
    let operands: Vec<Cow<'_, str>> = operands.iter().map(|o| substitute(o, values)).collect();

    match operator {
        Operator::StringEquals | Operator::StringNotEquals => observed
            .iter()
            .any(|v| operands.iter().any(|o| *o == v.as_str())),
        Operator::StringEqualsIgnoreCase | Operator::StringNotEqualsIgnoreCase => {
            observed.iter().any(|v| {
                let v = v.to_lowercase();
                operands.iter().any(|o| o.to_lowercase() == v)
            })
        }
        Operator::StringLike | Operator::StringNotLike => observed
            .iter()
            .any(|v| operands.iter().any(|o| wildcard::matches(o, v))),
        _ => false,
    }
}
