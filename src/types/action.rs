//! Actions and action sets.

use std::collections::BTreeSet;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use itertools::Itertools;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::PolicyError;
use crate::wildcard;

use super::OneOrMany;

/// An action pattern such as `s3:GetObject`, `s3:Get*` or `*`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Action(String);

impl Action {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Wildcard-match a requested action name against this pattern.
    pub fn matches(&self, action: &str) -> bool {
        wildcard::matches(&self.0, action)
    }
}

impl FromStr for Action {
    type Err = PolicyError;

    /// Accepts `*` or `<service>:<name>` with a non-empty service.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "*" {
            return Ok(Action(s.to_string()));
        }
        match s.split_once(':') {
            Some((service, name)) if !service.is_empty() && !name.is_empty() => {
                Ok(Action(s.to_string()))
            }
            _ => Err(PolicyError::InvalidAction(s.to_string())),
        }
    }
}

impl Display for Action {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(&self.0)
    }
}

/// A non-empty set of action patterns.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ActionSet(BTreeSet<Action>);

impl ActionSet {
    /// Build a set from action strings, rejecting empty input, invalid
    /// actions and duplicates.
    pub fn new<I, S>(actions: I) -> Result<Self, PolicyError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = BTreeSet::new();
        for action in actions {
            let action: Action = action.as_ref().parse()?;
            if set.contains(&action) {
                return Err(PolicyError::duplicate("Action", &action));
            }
            set.insert(action);
        }
        if set.is_empty() {
            return Err(PolicyError::EmptySet("Action".to_string()));
        }
        Ok(ActionSet(set))
    }

    /// True if any member pattern matches `action`.
    pub fn matches(&self, action: &str) -> bool {
        self.0.iter().any(|a| a.matches(action))
    }

    /// Members present, verbatim, in both sets.
    pub fn intersection(&self, other: &ActionSet) -> BTreeSet<Action> {
        self.0.intersection(&other.0).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Action> {
        self.0.iter()
    }
}

impl Display for ActionSet {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "[{}]", self.0.iter().join(","))
    }
}

impl Serialize for ActionSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.0.iter().map(Action::as_str))
    }
}

impl<'de> Deserialize<'de> for ActionSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let actions = OneOrMany::<String>::deserialize(deserializer)?;
        ActionSet::new(actions.into_vec()).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use insta::assert_snapshot;
    use yare::parameterized;

    #[parameterized(
        get_prefix = { &["s3:Get*", "s3:Put*"], "s3:GetObject", true },
        put_prefix = { &["s3:Get*", "s3:Put*"], "s3:PutObject", true },
        no_delete = { &["s3:Get*", "s3:Put*"], "s3:DeleteObject", false },
        service_wildcard = { &["s3:*"], "s3:PutObject", true },
        other_service = { &["s3:*"], "iam:CreateUser", false },
        everything = { &["*"], "iam:CreateUser", true },
        exact = { &["s3:GetObject"], "s3:GetObject", true },
        exact_is_not_prefix = { &["s3:GetObject"], "s3:GetObjectAcl", false },
    )]
    fn test_action_set_matches(actions: &[&str], action: &str, expected: bool) {
        let set = ActionSet::new(actions).unwrap();
        assert_eq!(set.matches(action), expected);
    }

    #[parameterized(
        empty = { "" },
        no_service = { ":GetObject" },
        no_name = { "s3:" },
        no_colon = { "GetObject" },
    )]
    fn test_action_rejects(input: &str) {
        assert_eq!(
            input.parse::<Action>(),
            Err(PolicyError::InvalidAction(input.to_string()))
        );
    }

    #[test]
    fn test_action_set_rejects_empty_and_duplicates() {
        let empty: [&str; 0] = [];
        assert_eq!(
            ActionSet::new(empty),
            Err(PolicyError::EmptySet("Action".to_string()))
        );
        assert!(matches!(
            ActionSet::new(["s3:GetObject", "s3:GetObject"]),
            Err(PolicyError::DuplicateValue { .. })
        ));
    }

    #[test]
    fn test_action_set_intersection() {
        let a = ActionSet::new(["s3:GetObject", "s3:PutObject"]).unwrap();
        let b = ActionSet::new(["s3:PutObject", "s3:*"]).unwrap();
        let common: Vec<String> = a.intersection(&b).iter().map(|a| a.to_string()).collect();
        assert_eq!(common, vec!["s3:PutObject"]);
    }

    #[test]
    fn test_action_set_serde() {
        let set: ActionSet = serde_json::from_str(r#""s3:GetObject""#).unwrap();
        assert_eq!(set.len(), 1);

        let set: ActionSet =
            serde_json::from_str(r#"["s3:PutObject", "s3:GetBucketLocation"]"#).unwrap();
        assert_snapshot!(
            serde_json::to_string(&set).unwrap(),
            @r#"["s3:GetBucketLocation","s3:PutObject"]"#
        );
        assert_snapshot!(set.to_string(), @"[s3:GetBucketLocation,s3:PutObject]");
    }

    #[parameterized(
        empty_array = { "[]", "'Action' must not be empty" },
        duplicate = { r#"["s3:GetObject", "s3:GetObject"]"#, "duplicate value" },
        invalid = { r#""GetObject""#, "invalid action" },
    )]
    fn test_action_set_serde_rejects(json: &str, message: &str) {
        let err = serde_json::from_str::<ActionSet>(json).unwrap_err();
        assert!(err.to_string().contains(message), "{err}");
    }
}
