//! `IpAddress` / `NotIpAddress` over CIDR operands.

use std::net::IpAddr;

use ipnetwork::IpNetwork;

use super::{Operator, ValueSet};
use crate::error::PolicyError;

pub(super) fn operands(operator: Operator, values: &ValueSet) -> Result<Vec<IpNetwork>, PolicyError> {
    values
        .iter()
        .map(|v| {
            // A bare address is not a CIDR, even though `IpNetwork` reads it as a host route.
            v.as_str()
                .filter(|s| s.contains('/'))
                .and_then(|s| s.parse::<IpNetwork>().ok())
                .ok_or_else(|| {
                    PolicyError::invalid_value(operator, format!("value '{v}' must be a CIDR"))
                })
        })
        .collect()
}

/// True when any observed value is an IP inside any operand network.
pub(super) fn matches(networks: &[IpNetwork], observed: &[String]) -> bool {
    observed
        .iter()
        .filter_map(|v| v.trim().parse::<IpAddr>().ok())
        .any(|ip| networks.iter().any(|net| net.contains(ip)))
}
