//! `BinaryEquals`: base64 operands compared with raw request bytes.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

use super::{Operator, ValueSet};
use crate::error::PolicyError;

pub(super) fn operands(operator: Operator, values: &ValueSet) -> Result<Vec<Vec<u8>>, PolicyError> {
    values
        .iter()
        .map(|v| {
            let encoded = v.as_str().ok_or_else(|| {
                PolicyError::invalid_value(operator, format!("value '{v}' must be a string"))
            })?;
            STANDARD.decode(encoded).map_err(|e| {
                PolicyError::invalid_value(operator, format!("value '{v}' is not base64: {e}"))
            })
        })
        .collect()
}

pub(super) fn matches(operands: &[Vec<u8>], observed: &[String]) -> bool {
    observed
        .iter()
        .any(|v| operands.iter().any(|o| o.as_slice() == v.as_bytes()))
}
