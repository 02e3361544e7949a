//! Data model types for policy documents and authorization requests.
//!
//! Canonical string forms:
//! - ARN: `arn:<partition>:<service>:<region>:<account>:<resource>`
//! - Action: `*` or `<service>:<name>`, either may contain `*` / `?`
//! - Principal: `"*"` or `{"AWS": ["<name>", ...]}`
//!
//! Sets are written in documents either as a single string or as an array;
//! they are always encoded back as sorted arrays.

use serde::Deserialize;

mod action;
mod arn;
mod decision;
mod effect;
mod principal;
mod request;
mod resource;

pub use action::{Action, ActionSet};
pub use arn::{ARN_PREFIX, Arn};
pub use decision::{Decision, Verdict};
pub use effect::Effect;
pub use principal::Principal;
pub use request::Request;
pub use resource::ResourceSet;

/// A document field holding either one value or an array of them.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    pub(crate) fn into_vec(self) -> Vec<T> {
        match self {
            OneOrMany::One(v) => vec![v],
            OneOrMany::Many(v) => v,
        }
    }
}
