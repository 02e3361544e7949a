//! Resource sets.

use std::collections::BTreeSet;
use std::fmt::{Display, Formatter, Result as FmtResult};

use itertools::Itertools;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::PolicyError;
use crate::variables::ConditionValues;

use super::OneOrMany;
use super::arn::Arn;

/// A non-empty set of valid ARN patterns.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceSet(BTreeSet<Arn>);

impl ResourceSet {
    /// Build a set, rejecting empty input, invalid ARNs and duplicates.
    pub fn new<I: IntoIterator<Item = Arn>>(resources: I) -> Result<Self, PolicyError> {
        let mut set = BTreeSet::new();
        for arn in resources {
            if !arn.is_valid() {
                return Err(PolicyError::InvalidResource(arn.to_string()));
            }
            if set.contains(&arn) {
                return Err(PolicyError::duplicate("Resource", &arn));
            }
            set.insert(arn);
        }
        if set.is_empty() {
            return Err(PolicyError::EmptySet("Resource".to_string()));
        }
        Ok(ResourceSet(set))
    }

    /// Parse each string as an ARN, then build the set.
    pub fn parse<I, S>(resources: I) -> Result<Self, PolicyError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let arns = resources
            .into_iter()
            .map(|s| s.as_ref().parse::<Arn>())
            .collect::<Result<Vec<_>, _>>()?;
        ResourceSet::new(arns)
    }

    /// True if any member ARN matches the resource path.
    pub fn matches(&self, resource: &str, values: &ConditionValues) -> bool {
        self.0.iter().any(|arn| arn.matches(resource, values))
    }

    /// Members present, verbatim, in both sets.
    pub fn intersection(&self, other: &ResourceSet) -> BTreeSet<Arn> {
        self.0.intersection(&other.0).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arn> {
        self.0.iter()
    }
}

impl Display for ResourceSet {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "[{}]", self.0.iter().join(","))
    }
}

impl Serialize for ResourceSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.0.iter())
    }
}

impl<'de> Deserialize<'de> for ResourceSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let resources = OneOrMany::<String>::deserialize(deserializer)?;
        ResourceSet::parse(resources.into_vec()).map_err(serde::de::Error::custom)
    }
}
