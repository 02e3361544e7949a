//! Policy statements.

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::marker::PhantomData;

use serde::{Deserialize, Serialize};

use crate::condition::Functions;
use crate::error::PolicyError;
use crate::traits::{Bucket, Dialect, Identity};
use crate::types::{ActionSet, Effect, Principal, Request, ResourceSet};

pub type BucketStatement = Statement<Bucket>;
pub type IdentityStatement = Statement<Identity>;

/// One `Allow` or `Deny` rule of a policy.
///
/// A statement can only be built valid for its dialect, so evaluation
/// never fails.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "StatementDoc", bound(serialize = "", deserialize = ""))]
pub struct Statement<D: Dialect> {
    #[serde(rename = "Sid", skip_serializing_if = "Option::is_none")]
    sid: Option<String>,
    #[serde(rename = "Effect")]
    effect: Effect,
    #[serde(rename = "Principal", skip_serializing_if = "Option::is_none")]
    principal: Option<Principal>,
    #[serde(rename = "Action")]
    actions: ActionSet,
    #[serde(rename = "Resource")]
    resources: ResourceSet,
    #[serde(rename = "Condition", skip_serializing_if = "Functions::is_empty")]
    conditions: Functions,
    #[serde(skip)]
    dialect: PhantomData<D>,
}

/// The document form of a statement, before dialect validation.
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct StatementDoc {
    #[serde(rename = "Sid", default)]
    sid: Option<String>,
    #[serde(rename = "Effect")]
    effect: Effect,
    #[serde(rename = "Principal", default)]
    principal: Option<Principal>,
    #[serde(rename = "Action")]
    actions: ActionSet,
    #[serde(rename = "Resource")]
    resources: ResourceSet,
    #[serde(rename = "Condition", default)]
    conditions: Functions,
}

impl<D: Dialect> TryFrom<StatementDoc> for Statement<D> {
    type Error = PolicyError;

    fn try_from(doc: StatementDoc) -> Result<Self, Self::Error> {
        Statement::new(
            doc.sid,
            doc.effect,
            doc.principal,
            doc.actions,
            doc.resources,
            doc.conditions,
        )
    }
}

impl<D: Dialect> Statement<D> {
    pub fn new(
        sid: Option<String>,
        effect: Effect,
        principal: Option<Principal>,
        actions: ActionSet,
        resources: ResourceSet,
        conditions: Functions,
    ) -> Result<Self, PolicyError> {
        let statement = Statement {
            sid: sid.filter(|s| !s.is_empty()),
            effect,
            principal,
            actions,
            resources,
            conditions,
            dialect: PhantomData,
        };
        statement.validate()?;
        Ok(statement)
    }

    pub fn sid(&self) -> Option<&str> {
        self.sid.as_deref()
    }

    pub fn effect(&self) -> Effect {
        self.effect
    }

    pub fn principal(&self) -> Option<&Principal> {
        self.principal.as_ref()
    }

    pub fn actions(&self) -> &ActionSet {
        &self.actions
    }

    pub fn resources(&self) -> &ResourceSet {
        &self.resources
    }

    pub fn conditions(&self) -> &Functions {
        &self.conditions
    }

    /// Structural checks: non-empty action and resource sets, valid ARNs,
    /// and the dialect's principal rule.
    pub fn validate(&self) -> Result<(), PolicyError> {
        D::check_principal(self.principal.as_ref())?;
        if self.actions.is_empty() {
            return Err(PolicyError::EmptySet("Action".to_string()));
        }
        if self.resources.is_empty() {
            return Err(PolicyError::EmptySet("Resource".to_string()));
        }
        if let Some(arn) = self.resources.iter().find(|arn| !arn.is_valid()) {
            return Err(PolicyError::InvalidResource(arn.to_string()));
        }
        Ok(())
    }

    /// True when principal, action, resource and conditions all match.
    pub fn matches(&self, request: &Request) -> bool {
        let principal_matches = self
            .principal
            .as_ref()
            .is_none_or(|p| p.matches(&request.account_name));

        principal_matches
            && self.actions.matches(&request.action)
            && self
                .resources
                .matches(&request.resource_path(), &request.condition_values)
            && self.conditions.evaluate(&request.condition_values)
    }

    /// The match result seen through the statement's effect: a `Deny`
    /// statement returns `false` exactly when it matches.
    pub fn is_allowed(&self, request: &Request) -> bool {
        self.effect.is_allowed(self.matches(request))
    }

    /// Two statements that could both apply to one request under the same
    /// conditions. Effects are not compared.
    pub(crate) fn overlaps(&self, other: &Statement<D>) -> bool {
        let principals = match (&self.principal, &other.principal) {
            (None, None) => true,
            (Some(a), Some(b)) => !a.intersection(b).is_empty(),
            _ => false,
        };

        principals
            && !self.actions.intersection(&other.actions).is_empty()
            && !self.resources.intersection(&other.resources).is_empty()
            && self.conditions == other.conditions
    }
}

impl<D: Dialect> Display for Statement<D> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match &self.sid {
            Some(sid) => write!(f, "'{sid}'")?,
            None => write!(f, "{}", self.effect)?,
        }
        write!(f, " {} on {}", self.actions, self.resources)
    }
}
