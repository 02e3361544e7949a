//! Amazon-style resource names.

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::PolicyError;
use crate::variables::{ConditionValues, substitute};
use crate::wildcard;

/// The literal tag every ARN starts with.
pub const ARN_PREFIX: &str = "arn";

/// A parsed `arn:<partition>:<service>:<region>:<account>:<resource>`.
///
/// In a policy the `resource` field is a pattern: it may contain `*` / `?`
/// wildcards and `${key}` policy variables.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Arn {
    partition: String,
    service: String,
    region: String,
    account: String,
    resource: String,
}

impl Arn {
    pub fn new(
        partition: impl Into<String>,
        service: impl Into<String>,
        region: impl Into<String>,
        account: impl Into<String>,
        resource: impl Into<String>,
    ) -> Self {
        Arn {
            partition: partition.into(),
            service: service.into(),
            region: region.into(),
            account: account.into(),
            resource: resource.into(),
        }
    }

    /// Shorthand for `arn:aws:s3:::<resource>`.
    pub fn s3(resource: impl Into<String>) -> Self {
        Arn::new("aws", "s3", "", "", resource)
    }

    pub fn partition(&self) -> &str {
        &self.partition
    }

    pub fn service(&self) -> &str {
        &self.service
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    pub fn account(&self) -> &str {
        &self.account
    }

    pub fn resource(&self) -> &str {
        &self.resource
    }

    /// Partition, service and resource must all be set.
    pub fn is_valid(&self) -> bool {
        !self.partition.is_empty() && !self.service.is_empty() && !self.resource.is_empty()
    }

    /// A pattern naming top-level resources (e.g. buckets): no `/`, or `*`.
    pub fn is_resource_pattern(&self) -> bool {
        !self.resource.contains('/') || self.resource == "*"
    }

    /// A pattern that can name objects below a resource: it has a path, or
    /// its leading segment is itself a wildcard.
    pub fn is_object_pattern(&self) -> bool {
        let leading = self.resource.split('/').next().unwrap_or_default();
        self.resource.contains('/') || leading.contains('*')
    }

    /// Match a resource path such as `mybucket/photos/cat.jpg` against this
    /// pattern, after substituting policy variables from `values`.
    pub fn matches(&self, resource: &str, values: &ConditionValues) -> bool {
        let pattern = substitute(&self.resource, values);
        wildcard::matches(&pattern, resource)
    }
}

impl Display for Arn {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(
            f,
            "{ARN_PREFIX}:{}:{}:{}:{}:{}",
            self.partition, self.service, self.region, self.account, self.resource
        )
    }
}

impl FromStr for Arn {
    type Err = PolicyError;

    /// Split on the first five colons; any further colons belong to the resource.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fields: Vec<&str> = s.splitn(6, ':').collect();
        if fields.len() != 6 {
            return Err(PolicyError::InvalidArn(format!(
                "expected 6 colon-separated fields in '{s}', found {}",
                fields.len()
            )));
        }
        if fields[0] != ARN_PREFIX {
            return Err(PolicyError::InvalidArn(format!(
                "expected '{ARN_PREFIX}' prefix in '{s}', found '{}'",
                fields[0]
            )));
        }

        Ok(Arn::new(fields[1], fields[2], fields[3], fields[4], fields[5]))
    }
}

// Intentionally no `From<&str>`: a bad ARN must surface as an error.

impl Serialize for Arn {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Arn {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        let arn: Arn = s.parse().map_err(serde::de::Error::custom)?;
        if !arn.is_valid() {
            return Err(serde::de::Error::custom(PolicyError::InvalidResource(s)));
        }
        Ok(arn)
    }
}
