//! The principal a resource-based statement applies to.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::{Display, Formatter, Result as FmtResult};

use itertools::Itertools;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::PolicyError;
use crate::wildcard;

use super::OneOrMany;

/// The only principal namespace understood in documents.
const AWS: &str = "AWS";

/// A non-empty set of account name patterns.
///
/// Documents write it either as `"*"` (anyone) or as
/// `{"AWS": "<name>" | ["<name>", ...]}`. It is always encoded back in
/// the object form.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Principal(BTreeSet<String>);

impl Principal {
    /// Build a principal from account name patterns.
    pub fn new<I, S>(names: I) -> Result<Self, PolicyError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut set = BTreeSet::new();
        for name in names {
            let name = name.into();
            if name.is_empty() {
                return Err(PolicyError::InvalidPrincipal(
                    "account name must not be empty".to_string(),
                ));
            }
            if set.contains(&name) {
                return Err(PolicyError::duplicate("Principal", &name));
            }
            set.insert(name);
        }
        if set.is_empty() {
            return Err(PolicyError::EmptySet("Principal".to_string()));
        }
        Ok(Principal(set))
    }

    /// A principal that matches any account.
    pub fn any() -> Self {
        Principal(BTreeSet::from(["*".to_string()]))
    }

    pub fn is_any(&self) -> bool {
        self.0.contains("*")
    }

    /// True if any member pattern matches the account name.
    pub fn matches(&self, name: &str) -> bool {
        self.0.iter().any(|p| wildcard::matches(p, name))
    }

    /// Members present, verbatim, in both principals.
    pub fn intersection(&self, other: &Principal) -> BTreeSet<String> {
        self.0.intersection(&other.0).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl Display for Principal {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{AWS}:[{}]", self.0.iter().join(","))
    }
}

impl Serialize for Principal {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = BTreeMap::new();
        map.insert(AWS, &self.0);
        map.serialize(serializer)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PrincipalDoc {
    Any(String),
    Accounts(BTreeMap<String, OneOrMany<String>>),
}

impl<'de> Deserialize<'de> for Principal {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        use serde::de::Error;

        match PrincipalDoc::deserialize(deserializer)? {
            PrincipalDoc::Any(s) if s == "*" => Ok(Principal::any()),
            PrincipalDoc::Any(s) => Err(D::Error::custom(PolicyError::InvalidPrincipal(
                format!("expected \"*\" or an object, found \"{s}\""),
            ))),
            PrincipalDoc::Accounts(mut accounts) => {
                let names = accounts.remove(AWS).ok_or_else(|| {
                    D::Error::custom(PolicyError::InvalidPrincipal(format!(
                        "missing '{AWS}' key"
                    )))
                })?;
                if let Some(other) = accounts.keys().next() {
                    return Err(D::Error::custom(PolicyError::InvalidPrincipal(format!(
                        "unsupported key '{other}'"
                    ))));
                }
                Principal::new(names.into_vec()).map_err(D::Error::custom)
            }
        }
    }
}
