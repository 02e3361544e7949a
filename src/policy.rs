//! Policy documents and their evaluation.

use std::fmt::{Display, Formatter, Result as FmtResult};

use itertools::Itertools;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tracing::{debug, info};

use crate::error::PolicyError;
use crate::statement::Statement;
use crate::traits::{Bucket, Dialect, Identity};
use crate::types::{Effect, Request, Verdict};

/// The only policy language version understood. An empty version is also
/// accepted.
pub const POLICY_VERSION: &str = "2012-10-17";

pub type BucketPolicy = Policy<Bucket>;
pub type IdentityPolicy = Policy<Identity>;

/// A validated list of statements.
///
/// No two statements may apply to the same principal, action and resource
/// under identical conditions, whatever their effects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Policy<D: Dialect> {
    id: Option<String>,
    version: String,
    statements: Vec<Statement<D>>,
}

/// Why a policy reached its decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    /// A matching deny statement, by index.
    Denied(usize),
    Owner,
    /// A matching allow statement, by index.
    Allowed(usize),
    Implicit,
}

impl Outcome {
    fn is_allowed(self) -> bool {
        matches!(self, Outcome::Owner | Outcome::Allowed(_))
    }
}

impl<D: Dialect> Policy<D> {
    pub fn new(
        version: impl Into<String>,
        statements: Vec<Statement<D>>,
    ) -> Result<Self, PolicyError> {
        let policy = Policy {
            id: None,
            version: version.into(),
            statements,
        };
        policy.validate()?;
        Ok(policy)
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into()).filter(|id: &String| !id.is_empty());
        self
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn statements(&self) -> &[Statement<D>] {
        &self.statements
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    /// Check the version, every statement, and that no two statements
    /// overlap.
    pub fn validate(&self) -> Result<(), PolicyError> {
        if !self.version.is_empty() && self.version != POLICY_VERSION {
            return Err(PolicyError::InvalidVersion(self.version.clone()));
        }

        for statement in &self.statements {
            statement.validate()?;
        }

        for ((i, a), (j, b)) in self.statements.iter().enumerate().tuple_combinations() {
            if a.overlaps(b) {
                return Err(PolicyError::DuplicateStatement(format!(
                    "statement #{i} ({a}) and statement #{j} ({b}) apply to the same \
                     principal, action and resource under identical conditions"
                )));
            }
        }

        Ok(())
    }

    fn evaluate(&self, request: &Request) -> Outcome {
        let by_effect = |effect: Effect| {
            self.statements
                .iter()
                .enumerate()
                .filter(move |(_, s)| s.effect() == effect)
        };

        if let Some((i, _)) = by_effect(Effect::Deny).find(|(_, s)| !s.is_allowed(request)) {
            return Outcome::Denied(i);
        }

        if request.is_owner {
            return Outcome::Owner;
        }

        if let Some((i, _)) = by_effect(Effect::Allow).find(|(_, s)| s.is_allowed(request)) {
            return Outcome::Allowed(i);
        }

        Outcome::Implicit
    }

    /// Deny overrides allow: any matching deny statement denies, then an
    /// owner is allowed, then any matching allow statement allows.
    /// Everything else is implicitly denied.
    pub fn is_allowed(&self, request: &Request) -> bool {
        self.evaluate(request).is_allowed()
    }

    /// Like [`Policy::is_allowed`], with a reason naming the statement that
    /// decided. Never returns `NoOpinion`.
    pub fn authorize(&self, request: &Request) -> Verdict {
        debug!(
            event = "Request",
            phase = "Evaluation",
            dialect = D::NAME,
            account = request.account_name.as_str(),
            action = request.action.as_str(),
            resource = request.resource_path(),
            owner = request.is_owner
        );

        let outcome = self.evaluate(request);
        let verdict = match outcome {
            Outcome::Denied(i) => {
                Verdict::deny(format!("denied by statement {}", self.describe(i)))
            }
            Outcome::Owner => Verdict::allow("allowed for resource owner"),
            Outcome::Allowed(i) => {
                Verdict::allow(format!("allowed by statement {}", self.describe(i)))
            }
            Outcome::Implicit => Verdict::deny("no statement allows the request"),
        };

        if let Outcome::Denied(i) | Outcome::Allowed(i) = outcome {
            info!(
                event = "Request",
                phase = "Statement",
                statement = i,
                sid = self.statements[i].sid().unwrap_or_default(),
                decision = verdict.decision.as_ref()
            );
        }

        debug!(event = "Request", phase = "Result", result = ?verdict.decision);
        verdict
    }

    fn describe(&self, index: usize) -> String {
        match self.statements[index].sid() {
            Some(sid) => format!("'{sid}'"),
            None => format!("#{index}"),
        }
    }

    /// The canonical JSON form. Fails if the policy is invalid.
    pub fn to_json(&self) -> Result<String, PolicyError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Like [`Policy::to_json`], indented for people.
    pub fn to_json_pretty(&self) -> Result<String, PolicyError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl<D: Dialect> Display for Policy<D> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{} policy", D::NAME)?;
        if let Some(id) = &self.id {
            write!(f, " '{id}'")?;
        }
        write!(f, " with {} statement(s)", self.statements.len())
    }
}

#[derive(Serialize)]
#[serde(bound = "")]
struct PolicyRef<'a, D: Dialect> {
    #[serde(rename = "Version", skip_serializing_if = "Option::is_none")]
    version: Option<&'a str>,
    #[serde(rename = "Id", skip_serializing_if = "Option::is_none")]
    id: Option<&'a str>,
    #[serde(rename = "Statement")]
    statements: &'a [Statement<D>],
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields, bound = "")]
struct PolicyDoc<D: Dialect> {
    #[serde(rename = "Version", default)]
    version: String,
    #[serde(rename = "Id", alias = "ID", default)]
    id: Option<String>,
    #[serde(rename = "Statement", default)]
    statements: Vec<Statement<D>>,
}

impl<D: Dialect> Serialize for Policy<D> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::Error;

        self.validate().map_err(S::Error::custom)?;

        if !serializer.is_human_readable() {
            // Binary formats carry the canonical JSON text.
            let json = self.to_json().map_err(S::Error::custom)?;
            return serializer.serialize_str(&json);
        }

        PolicyRef {
            version: Some(self.version.as_str()).filter(|v| !v.is_empty()),
            id: self.id(),
            statements: &self.statements,
        }
        .serialize(serializer)
    }
}

impl<'de, D: Dialect> Deserialize<'de> for Policy<D> {
    fn deserialize<De: Deserializer<'de>>(deserializer: De) -> Result<Self, De::Error> {
        use serde::de::Error;

        let doc = if deserializer.is_human_readable() {
            PolicyDoc::<D>::deserialize(deserializer)?
        } else {
            let json = String::deserialize(deserializer)?;
            serde_json::from_str(&json).map_err(De::Error::custom)?
        };

        let policy = Policy {
            id: doc.id.filter(|id| !id.is_empty()),
            version: doc.version,
            statements: doc.statements,
        };
        policy.validate().map_err(De::Error::custom)?;
        Ok(policy)
    }
}
