//! Authorization request type.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::variables::ConditionValues;

/// Everything an authorizer needs to know about one request.
///
/// `condition_values` is keyed by the short name of a condition key
/// (`SourceIp`, `prefix`, `username`, ...).
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct Request {
    /// The acting account, matched against a statement's `Principal`.
    pub account_name: String,
    pub action: String,
    /// The top-level resource, e.g. a bucket name.
    pub resource: String,
    /// Optional object below `resource`.
    #[serde(default)]
    pub object_name: String,
    #[serde(default)]
    pub condition_values: ConditionValues,
    /// Owners bypass allow statements, but not deny statements.
    #[serde(default)]
    pub is_owner: bool,
    /// Opaque caller data, ignored by policy evaluation.
    #[serde(default)]
    pub metadata: HashMap<String, Vec<String>>,
}

impl Request {
    pub fn new(
        account_name: impl Into<String>,
        action: impl Into<String>,
        resource: impl Into<String>,
    ) -> Self {
        Request {
            account_name: account_name.into(),
            action: action.into(),
            resource: resource.into(),
            ..Default::default()
        }
    }

    pub fn with_object(mut self, object_name: impl Into<String>) -> Self {
        self.object_name = object_name.into();
        self
    }

    /// Append a value under a condition key's short name.
    pub fn with_condition_value(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.condition_values
            .entry(key.into())
            .or_default()
            .push(value.into());
        self
    }

    pub fn as_owner(mut self) -> Self {
        self.is_owner = true;
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata
            .entry(key.into())
            .or_default()
            .push(value.into());
        self
    }

    /// The path resource patterns are matched against: `resource`, then
    /// `object_name` joined with a single `/` when one is given.
    pub fn resource_path(&self) -> String {
        if self.object_name.is_empty() {
            self.resource.clone()
        } else if self.object_name.starts_with('/') {
            format!("{}{}", self.resource, self.object_name)
        } else {
            format!("{}/{}", self.resource, self.object_name)
        }
    }
}
