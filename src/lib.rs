// src/lib.rs
pub use authorizer::{
    AlwaysAllow, AlwaysDeny, AlwaysNoOpinion, Authorizer, AuthorizerFn, Union, authorizer_fn,
};
pub use condition::{Function, Functions, Key, KeySet, Operator, Value, ValueSet};
pub use error::PolicyError;
pub use loader::{compile_policy, load_policy_file};
pub use policy::{BucketPolicy, IdentityPolicy, POLICY_VERSION, Policy};
pub use statement::{BucketStatement, IdentityStatement, Statement};
pub use traits::{Bucket, Dialect, Identity, PrincipalRule};
pub use types::{
    ARN_PREFIX, Action, ActionSet, Arn, Decision, Effect, Principal, Request, ResourceSet,
    Verdict,
};
pub use variables::ConditionValues;

mod authorizer;
pub mod condition;
mod error;
mod loader;
mod policy;
mod statement;
mod traits;
mod types;
pub mod variables;
pub mod wildcard;

#[cfg(test)]
mod tests;
