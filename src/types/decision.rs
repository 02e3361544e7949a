//! Authorization decisions.

use std::fmt::{Display, Formatter, Result as FmtResult};

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display as StrumDisplay, EnumIter, EnumString};
use utoipa::ToSchema;

use crate::error::PolicyError;

/// Tri-state outcome of an authorizer.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    AsRefStr,
    StrumDisplay,
    EnumString,
    EnumIter,
    ToSchema,
)]
pub enum Decision {
    Deny,
    Allow,
    /// The authorizer has nothing to say about the request.
    NoOpinion,
}

/// A decision together with a human-readable reason and an optional
/// error the authorizer wants to report alongside it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    pub decision: Decision,
    pub reason: String,
    pub error: Option<PolicyError>,
}

impl Verdict {
    pub fn new(decision: Decision, reason: impl Into<String>) -> Self {
        Verdict {
            decision,
            reason: reason.into(),
            error: None,
        }
    }

    pub fn allow(reason: impl Into<String>) -> Self {
        Verdict::new(Decision::Allow, reason)
    }

    pub fn deny(reason: impl Into<String>) -> Self {
        Verdict::new(Decision::Deny, reason)
    }

    pub fn no_opinion(reason: impl Into<String>) -> Self {
        Verdict::new(Decision::NoOpinion, reason)
    }

    pub fn with_error(mut self, error: PolicyError) -> Self {
        self.error = Some(error);
        self
    }

    pub fn is_allowed(&self) -> bool {
        self.decision == Decision::Allow
    }
}

impl Display for Verdict {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.decision)?;
        if !self.reason.is_empty() {
            write!(f, " ({})", self.reason)?;
        }
        if let Some(error) = &self.error {
            write!(f, " error: {error}")?;
        }
        Ok(())
    }
}
