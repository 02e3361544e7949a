use std::fmt::Debug;
use std::hash::Hash;

use crate::error::PolicyError;
use crate::types::Principal;

/// Whether statements of a dialect carry a `Principal`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrincipalRule {
    /// Resource-based policies name who they apply to.
    Required,
    /// Identity-based policies are already scoped to their subject.
    Forbidden,
}

/// The shape of a policy document.
///
/// Both dialects share one statement model and one evaluator; they only
/// differ in how the `Principal` field is validated.
pub trait Dialect: Debug + Clone + Copy + PartialEq + Eq + Hash + Send + Sync + 'static {
    /// Name used in error messages, e.g. "bucket".
    const NAME: &'static str;
    const PRINCIPAL: PrincipalRule;

    /// Check a statement's principal against this dialect's rule.
    fn check_principal(principal: Option<&Principal>) -> Result<(), PolicyError> {
        match (Self::PRINCIPAL, principal) {
            (PrincipalRule::Required, None) => {
                Err(PolicyError::MissingPrincipal(Self::NAME.to_string()))
            }
            (PrincipalRule::Forbidden, Some(_)) => {
                Err(PolicyError::UnexpectedPrincipal(Self::NAME.to_string()))
            }
            _ => Ok(()),
        }
    }
}

/// Resource-based (bucket) policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Bucket;

impl Dialect for Bucket {
    const NAME: &'static str = "bucket";
    const PRINCIPAL: PrincipalRule = PrincipalRule::Required;
}

/// Identity-based (IAM) policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Identity;

impl Dialect for Identity {
    const NAME: &'static str = "identity";
    const PRINCIPAL: PrincipalRule = PrincipalRule::Forbidden;
}
