use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::PolicyError;
use crate::policy::Policy;
use crate::traits::Dialect;

/// Compile a JSON policy document into a validated `Policy`.
///
/// Parse and validation errors are mapped into `PolicyError::ParseError`.
///
/// Example:
/// ```rust
/// use treetop_iam::{BucketPolicy, Bucket, compile_policy};
/// let policy_text = r#"{
///     "Version": "2012-10-17",
///     "Statement": [{
///         "Effect": "Allow",
///         "Principal": "*",
///         "Action": ["s3:GetBucketLocation", "s3:PutObject"],
///         "Resource": "arn:aws:s3:::*"
///     }]
/// }"#;
/// let policy: BucketPolicy = compile_policy::<Bucket>(policy_text).unwrap();
/// assert_eq!(policy.statements().len(), 1);
/// ```
pub fn compile_policy<D: Dialect>(text: &str) -> Result<Policy<D>, PolicyError> {
    let policy: Policy<D> = serde_json::from_str(text)?;
    debug!(
        event = "Policy",
        phase = "Compiled",
        dialect = D::NAME,
        id = policy.id().unwrap_or_default(),
        statements = policy.statements().len()
    );
    Ok(policy)
}

/// Read a policy document from disk and compile it.
pub fn load_policy_file<D: Dialect>(path: impl AsRef<Path>) -> Result<Policy<D>, PolicyError> {
    let path = path.as_ref();
    debug!(event = "Policy", phase = "Load", path = %path.display());
    let text = fs::read_to_string(path)?;
    compile_policy(&text)
}
