//! Statement effect.

use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use strum::{AsRefStr, Display, EnumIter};
use utoipa::ToSchema;

use crate::error::PolicyError;

/// Polarity of a statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, AsRefStr, Display, EnumIter, ToSchema)]
pub enum Effect {
    Allow,
    Deny,
}

impl Effect {
    /// Apply this effect to a statement's match result.
    ///
    /// An `Allow` statement allows when it matches; a `Deny` statement
    /// returns `false` (denies) exactly when it matches.
    pub fn is_allowed(&self, matched: bool) -> bool {
        match self {
            Effect::Allow => matched,
            Effect::Deny => !matched,
        }
    }
}

impl FromStr for Effect {
    type Err = PolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Allow" => Ok(Effect::Allow),
            "Deny" => Ok(Effect::Deny),
            _ => Err(PolicyError::InvalidEffect(s.to_string())),
        }
    }
}

impl Serialize for Effect {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_ref())
    }
}

impl<'de> Deserialize<'de> for Effect {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
