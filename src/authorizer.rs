//! Authorizers and authorizer chains.
//!
//! An [`Authorizer`] turns a [`Request`] into a [`Verdict`]. Policies are
//! authorizers, and so is a [`Union`] of other authorizers, which asks each
//! member in turn until one of them has an opinion.

use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::sync::Arc;

use tracing::{debug, warn};

use crate::error::PolicyError;
use crate::policy::Policy;
use crate::traits::Dialect;
use crate::types::{Decision, Request, Verdict};

/// Anything that can decide on a request.
pub trait Authorizer: Send + Sync {
    fn authorize(&self, request: &Request) -> Verdict;
}

impl<D: Dialect> Authorizer for Policy<D> {
    fn authorize(&self, request: &Request) -> Verdict {
        Policy::authorize(self, request)
    }
}

impl<A: Authorizer + ?Sized> Authorizer for Arc<A> {
    fn authorize(&self, request: &Request) -> Verdict {
        (**self).authorize(request)
    }
}

impl<A: Authorizer + ?Sized> Authorizer for Box<A> {
    fn authorize(&self, request: &Request) -> Verdict {
        (**self).authorize(request)
    }
}

/// Adapts a closure into an [`Authorizer`]. Build one with [`authorizer_fn`].
pub struct AuthorizerFn<F>(F);

/// Wrap a closure as an authorizer.
///
/// ```rust
/// use treetop_iam::{Authorizer, Request, Verdict, authorizer_fn};
///
/// let admins_only = authorizer_fn(|request: &Request| {
///     if request.account_name == "admin" {
///         Verdict::allow("admin account")
///     } else {
///         Verdict::no_opinion("")
///     }
/// });
/// let verdict = admins_only.authorize(&Request::new("admin", "s3:GetObject", "logs"));
/// assert!(verdict.is_allowed());
/// ```
pub fn authorizer_fn<F>(f: F) -> AuthorizerFn<F>
where
    F: Fn(&Request) -> Verdict + Send + Sync,
{
    AuthorizerFn(f)
}

impl<F> Authorizer for AuthorizerFn<F>
where
    F: Fn(&Request) -> Verdict + Send + Sync,
{
    fn authorize(&self, request: &Request) -> Verdict {
        (self.0)(request)
    }
}

impl<F> Debug for AuthorizerFn<F> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str("AuthorizerFn")
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysAllow;

impl Authorizer for AlwaysAllow {
    fn authorize(&self, _: &Request) -> Verdict {
        Verdict::allow("")
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysDeny;

impl Authorizer for AlwaysDeny {
    fn authorize(&self, _: &Request) -> Verdict {
        Verdict::deny("")
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysNoOpinion;

impl Authorizer for AlwaysNoOpinion {
    fn authorize(&self, _: &Request) -> Verdict {
        Verdict::no_opinion("")
    }
}

/// An ordered chain of authorizers.
///
/// The first member to answer `Allow` or `Deny` decides. Members answering
/// `NoOpinion` are skipped; their reasons and errors are collected and
/// returned if nobody decides.
///
/// With [`Union::fail_on_error`] set, the first member to report an error
/// ends the chain with a `Deny` carrying that error.
#[derive(Default)]
pub struct Union {
    members: Vec<Arc<dyn Authorizer>>,
    fail_on_error: bool,
}

impl Union {
    pub fn new<I>(members: I) -> Self
    where
        I: IntoIterator<Item = Arc<dyn Authorizer>>,
    {
        Union {
            members: members.into_iter().collect(),
            fail_on_error: false,
        }
    }

    pub fn fail_on_error(mut self, fail_on_error: bool) -> Self {
        self.fail_on_error = fail_on_error;
        self
    }

    /// Append a member at the end of the chain.
    pub fn push<A: Authorizer + 'static>(&mut self, member: A) {
        self.members.push(Arc::new(member));
    }

    pub fn with<A: Authorizer + 'static>(mut self, member: A) -> Self {
        self.push(member);
        self
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

impl Debug for Union {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("Union")
            .field("members", &self.members.len())
            .field("fail_on_error", &self.fail_on_error)
            .finish()
    }
}

impl Authorizer for Union {
    fn authorize(&self, request: &Request) -> Verdict {
        let mut reasons: Vec<String> = Vec::new();
        let mut errors: Vec<PolicyError> = Vec::new();

        for (index, member) in self.members.iter().enumerate() {
            let verdict = member.authorize(request);
            debug!(
                event = "Request",
                phase = "Union",
                member = index,
                decision = verdict.decision.as_ref()
            );

            if let Some(error) = &verdict.error {
                warn!(
                    event = "Request",
                    phase = "Union",
                    member = index,
                    error = error.to_string()
                );
                if self.fail_on_error {
                    return Verdict::deny(verdict.reason).with_error(error.clone());
                }
            }

            match verdict.decision {
                Decision::Allow | Decision::Deny => return verdict,
                Decision::NoOpinion => {
                    if !verdict.reason.is_empty() {
                        reasons.push(verdict.reason);
                    }
                    errors.extend(verdict.error);
                }
            }
        }

        let verdict = Verdict::no_opinion(reasons.join("\n"));
        match PolicyError::aggregate(errors) {
            Some(error) => verdict.with_error(error),
            None => verdict,
        }
    }
}
