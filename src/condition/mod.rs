//! Condition functions: named boolean predicates over request attributes.
//!
//! A policy's `Condition` block maps operator names to keys to operand values:
//!
//! ```json
//! { "IpAddress": { "aws:SourceIp": ["192.0.2.0/24"] },
//!   "StringLike": { "s3:prefix": "home/${aws:username}/*" } }
//! ```
//!
//! Every (operator, key) pair becomes one [`Function`]; a statement's
//! [`Functions`] hold when all of them hold.
//!
//! Absent keys make every positive operator false. The negated operators
//! (`StringNotEquals`, `StringNotEqualsIgnoreCase`, `StringNotLike`,
//! `NotIpAddress`, `NumericNotEquals`) are the exact negation of their
//! positive form, so for them an absent key is vacuously true. `Null` is the
//! only operator that tests presence itself.

use std::collections::BTreeMap;
use std::fmt::{Display, Formatter, Result as FmtResult};

use ipnetwork::IpNetwork;
use itertools::Itertools;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use strum_macros::{AsRefStr, Display as StrumDisplay, EnumIter, EnumString};

use crate::error::PolicyError;
use crate::variables::ConditionValues;

mod binary;
mod boolean;
mod ip;
mod key;
mod numeric;
mod string;
mod value;

pub use key::{COMMON_KEYS, Key, KeySet};
pub use value::{Value, ValueSet};

/// The closed set of supported condition operators.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    AsRefStr,
    StrumDisplay,
    EnumString,
    EnumIter,
)]
pub enum Operator {
    StringEquals,
    StringNotEquals,
    StringEqualsIgnoreCase,
    StringNotEqualsIgnoreCase,
    StringLike,
    StringNotLike,
    BinaryEquals,
    IpAddress,
    NotIpAddress,
    Null,
    Bool,
    NumericEquals,
    NumericNotEquals,
    NumericLessThan,
    NumericLessThanEquals,
    NumericGreaterThan,
    NumericGreaterThanEquals,
}

impl Operator {
    /// Parse an operator name as written in a policy document.
    pub fn from_name(name: &str) -> Result<Self, PolicyError> {
        name.parse()
            .map_err(|_| PolicyError::UnknownOperator(name.to_string()))
    }

    /// Whether this operator is the negation of a positive operator.
    pub fn is_negated(&self) -> bool {
        matches!(
            self,
            Operator::StringNotEquals
                | Operator::StringNotEqualsIgnoreCase
                | Operator::StringNotLike
                | Operator::NotIpAddress
                | Operator::NumericNotEquals
        )
    }
}

/// Operands validated and converted once, at construction.
#[derive(Debug, Clone)]
enum Operand {
    Strings(Vec<String>),
    Bytes(Vec<Vec<u8>>),
    Networks(Vec<IpNetwork>),
    Flag(bool),
    Presence(bool),
    Number(i64),
}

/// One condition: an operator applied to one key with a set of operands.
#[derive(Debug, Clone)]
pub struct Function {
    operator: Operator,
    key: Key,
    values: ValueSet,
    operand: Operand,
}

impl Function {
    /// Build a function, validating the operands for the operator.
    pub fn new(operator: Operator, key: Key, values: ValueSet) -> Result<Self, PolicyError> {
        use Operator::*;

        let operand = match operator {
            StringEquals
            | StringNotEquals
            | StringEqualsIgnoreCase
            | StringNotEqualsIgnoreCase
            | StringLike
            | StringNotLike => Operand::Strings(string::operands(operator, &values)?),
            BinaryEquals => Operand::Bytes(binary::operands(operator, &values)?),
            IpAddress | NotIpAddress => Operand::Networks(ip::operands(operator, &values)?),
            Bool => Operand::Flag(boolean::operand(operator, &values)?),
            Null => Operand::Presence(boolean::operand(operator, &values)?),
            NumericEquals
            | NumericNotEquals
            | NumericLessThan
            | NumericLessThanEquals
            | NumericGreaterThan
            | NumericGreaterThanEquals => Operand::Number(numeric::operand(operator, &values)?),
        };

        Ok(Function {
            operator,
            key,
            values,
            operand,
        })
    }

    pub fn operator(&self) -> Operator {
        self.operator
    }

    pub fn key(&self) -> Key {
        self.key
    }

    pub fn values(&self) -> &ValueSet {
        &self.values
    }

    /// Evaluate against the request's condition values.
    pub fn evaluate(&self, values: &ConditionValues) -> bool {
        let observed: &[String] = values
            .get(self.key.name())
            .map(Vec::as_slice)
            .unwrap_or_default();

        let matched = match &self.operand {
            Operand::Presence(must_be_absent) => {
                return boolean::presence(*must_be_absent, observed);
            }
            Operand::Strings(operands) => string::matches(self.operator, operands, observed, values),
            Operand::Bytes(operands) => binary::matches(operands, observed),
            Operand::Networks(networks) => ip::matches(networks, observed),
            Operand::Flag(expected) => boolean::matches(*expected, observed),
            Operand::Number(operand) => numeric::matches(self.operator, *operand, observed),
        };

        matched != self.operator.is_negated()
    }
}

// Operands are derived from `values`, so they take no part in equality.
impl PartialEq for Function {
    fn eq(&self, other: &Self) -> bool {
        self.operator == other.operator && self.key == other.key && self.values == other.values
    }
}

impl Eq for Function {}

impl Display for Function {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}:{}:{}", self.operator, self.key, self.values)
    }
}

/// A conjunction of condition functions, kept in canonical (operator, key) order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Functions(Vec<Function>);

impl Functions {
    pub fn new<I: IntoIterator<Item = Function>>(functions: I) -> Self {
        let mut functions: Vec<Function> = functions.into_iter().collect();
        functions.sort_by_key(|f| (f.operator, f.key));
        Functions(functions)
    }

    /// True when every function holds; an empty list always holds.
    pub fn evaluate(&self, values: &ConditionValues) -> bool {
        self.0.iter().all(|f| f.evaluate(values))
    }

    /// Every key inspected by these functions.
    pub fn keys(&self) -> KeySet {
        self.0.iter().map(Function::key).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Function> {
        self.0.iter()
    }
}

impl Display for Functions {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "[{}]", self.0.iter().join(" "))
    }
}

impl Serialize for Functions {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut by_operator: BTreeMap<&str, BTreeMap<&str, &ValueSet>> = BTreeMap::new();
        for function in &self.0 {
            by_operator
                .entry(function.operator.as_ref())
                .or_default()
                .insert(function.key.as_ref(), &function.values);
        }
        by_operator.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Functions {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = BTreeMap::<String, BTreeMap<String, ValueSet>>::deserialize(deserializer)?;
        if raw.is_empty() {
            return Err(D::Error::custom(PolicyError::EmptySet(
                "Condition".to_string(),
            )));
        }

        let mut functions = Vec::new();
        for (name, keyed) in raw {
            let operator = Operator::from_name(&name).map_err(D::Error::custom)?;
            if keyed.is_empty() {
                return Err(D::Error::custom(PolicyError::EmptySet(format!(
                    "Condition.{name}"
                ))));
            }
            for (key, values) in keyed {
                let key: Key = key.parse().map_err(D::Error::custom)?;
                functions.push(Function::new(operator, key, values).map_err(D::Error::custom)?);
            }
        }

        Ok(Functions::new(functions))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use insta::assert_snapshot;
    use yare::parameterized;

    fn function(operator: Operator, key: &str, values: &[&str]) -> Function {
        let values = ValueSet::new(values.iter().copied()).unwrap();
        Function::new(operator, key.parse().unwrap(), values).unwrap()
    }

    fn request(pairs: &[(&str, &[&str])]) -> ConditionValues {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.iter().map(|s| s.to_string()).collect()))
            .collect()
    }

    #[parameterized(
        equals_hit = { Operator::StringEquals, &["home/"], &["home/"], true },
        equals_miss = { Operator::StringEquals, &["home/"], &["work/"], false },
        equals_any_operand = { Operator::StringEquals, &["a/", "home/"], &["home/"], true },
        equals_any_observed = { Operator::StringEquals, &["home/"], &["x", "home/"], true },
        not_equals_hit = { Operator::StringNotEquals, &["home/"], &["work/"], true },
        not_equals_miss = { Operator::StringNotEquals, &["home/"], &["home/"], false },
        ignore_case_hit = { Operator::StringEqualsIgnoreCase, &["HOME/"], &["home/"], true },
        not_ignore_case_miss = { Operator::StringNotEqualsIgnoreCase, &["HOME/"], &["home/"], false },
        like_hit = { Operator::StringLike, &["home/*"], &["home/alice"], true },
        like_question = { Operator::StringLike, &["home/?"], &["home/ab"], false },
        not_like_hit = { Operator::StringNotLike, &["home/*"], &["work/alice"], true },
        not_like_miss = { Operator::StringNotLike, &["home/*"], &["home/alice"], false },
    )]
    fn test_string_operators(
        operator: Operator,
        operands: &[&str],
        observed: &[&str],
        expected: bool,
    ) {
        let f = function(operator, "s3:prefix", operands);
        assert_eq!(f.evaluate(&request(&[("prefix", observed)])), expected);
    }

    #[parameterized(
        string_equals = { Operator::StringEquals, false },
        string_equals_ignore_case = { Operator::StringEqualsIgnoreCase, false },
        string_like = { Operator::StringLike, false },
        string_not_equals = { Operator::StringNotEquals, true },
        string_not_equals_ignore_case = { Operator::StringNotEqualsIgnoreCase, true },
        string_not_like = { Operator::StringNotLike, true },
    )]
    fn test_string_operators_absent_key(operator: Operator, expected: bool) {
        let f = function(operator, "s3:prefix", &["home/"]);
        assert_eq!(f.evaluate(&ConditionValues::new()), expected);
    }

    #[test]
    fn test_string_operand_with_policy_variable() {
        let f = function(Operator::StringLike, "s3:prefix", &["home/${aws:username}/*"]);
        let alice = request(&[("prefix", &["home/alice/docs"]), ("username", &["alice"])]);
        let bob = request(&[("prefix", &["home/alice/docs"]), ("username", &["bob"])]);
        assert!(f.evaluate(&alice));
        assert!(!f.evaluate(&bob));
    }

    #[test]
    fn test_string_operators_reject_non_strings() {
        let values = ValueSet::new([Value::Int(10)]).unwrap();
        let err = Function::new(Operator::StringEquals, Key::S3MaxKeys, values).unwrap_err();
        assert!(matches!(err, PolicyError::InvalidValue { .. }));
    }

    #[parameterized(
        inside_v4 = { "192.168.1.10", true },
        outside_v4 = { "10.0.0.1", false },
        inside_v6 = { "2001:db8::1", true },
        not_an_ip = { "localhost", false },
    )]
    fn test_ip_address(observed: &str, expected: bool) {
        let f = function(
            Operator::IpAddress,
            "aws:SourceIp",
            &["192.168.1.0/24", "2001:db8::/32"],
        );
        assert_eq!(f.evaluate(&request(&[("SourceIp", &[observed])])), expected);

        let not = function(
            Operator::NotIpAddress,
            "aws:SourceIp",
            &["192.168.1.0/24", "2001:db8::/32"],
        );
        assert_eq!(not.evaluate(&request(&[("SourceIp", &[observed])])), !expected);
    }

    #[test]
    fn test_ip_address_absent_key() {
        let f = function(Operator::IpAddress, "aws:SourceIp", &["0.0.0.0/0"]);
        let not = function(Operator::NotIpAddress, "aws:SourceIp", &["0.0.0.0/0"]);
        assert!(!f.evaluate(&ConditionValues::new()));
        assert!(not.evaluate(&ConditionValues::new()));
    }

    #[parameterized(
        not_cidr = { "192.168.1.0/33" },
        garbage = { "not-an-ip" },
        bare_ip = { "10.0.0.1" },
        bare_ipv6 = { "2001:db8::1" },
        empty_prefix = { "10.0.0.0/" },
    )]
    fn test_ip_address_rejects_invalid_cidr(cidr: &str) {
        for operator in [Operator::IpAddress, Operator::NotIpAddress] {
            let values = ValueSet::new([cidr]).unwrap();
            let err = Function::new(operator, Key::AwsSourceIp, values).unwrap_err();
            assert!(
                matches!(err, PolicyError::InvalidValue { .. }),
                "{operator}: {err:?}"
            );
            assert!(err.to_string().contains("must be a CIDR"), "{err}");
        }
    }

    #[test]
    fn test_binary_equals() {
        // "hello" in base64
        let f = function(Operator::BinaryEquals, "s3:x-amz-content-sha256", &["aGVsbG8="]);
        assert!(f.evaluate(&request(&[("x-amz-content-sha256", &["hello"])])));
        assert!(!f.evaluate(&request(&[("x-amz-content-sha256", &["world"])])));
        assert!(!f.evaluate(&ConditionValues::new()));
    }

    #[test]
    fn test_binary_equals_rejects_invalid_base64() {
        let values = ValueSet::new(["***"]).unwrap();
        let result = Function::new(Operator::BinaryEquals, Key::S3XAmzContentSha256, values);
        assert!(matches!(result, Err(PolicyError::InvalidValue { .. })));
    }

    #[parameterized(
        must_be_absent_and_is = { "true", &[], true },
        must_be_absent_but_present = { "true", &["x"], false },
        must_be_present_and_is = { "false", &["x"], true },
        must_be_present_but_absent = { "false", &[], false },
    )]
    fn test_null(operand: &str, observed: &[&str], expected: bool) {
        let f = function(Operator::Null, "s3:x-amz-server-side-encryption", &[operand]);
        let values = if observed.is_empty() {
            ConditionValues::new()
        } else {
            request(&[("x-amz-server-side-encryption", observed)])
        };
        assert_eq!(f.evaluate(&values), expected);
    }

    #[parameterized(
        true_true = { "true", "true", true },
        true_false = { "true", "false", false },
        false_false = { "false", "false", true },
        case_insensitive = { "true", "TRUE", true },
        garbage = { "true", "yes", false },
    )]
    fn test_bool(operand: &str, observed: &str, expected: bool) {
        let f = function(Operator::Bool, "aws:SecureTransport", &[operand]);
        assert_eq!(
            f.evaluate(&request(&[("SecureTransport", &[observed])])),
            expected
        );
    }

    #[test]
    fn test_bool_absent_key() {
        let f = function(Operator::Bool, "aws:SecureTransport", &["false"]);
        assert!(!f.evaluate(&ConditionValues::new()));
    }

    #[parameterized(
        bool_not_boolean = { Operator::Bool, &["maybe"] },
        bool_two_values = { Operator::Bool, &["true", "false"] },
        null_not_boolean = { Operator::Null, &["1"] },
        numeric_not_number = { Operator::NumericEquals, &["ten"] },
        numeric_two_values = { Operator::NumericLessThan, &["1", "2"] },
    )]
    fn test_single_operand_validation(operator: Operator, operands: &[&str]) {
        let values = ValueSet::new(operands.iter().copied()).unwrap();
        assert!(Function::new(operator, Key::S3MaxKeys, values).is_err());
    }

    #[parameterized(
        equals = { Operator::NumericEquals, "10", true },
        not_equals = { Operator::NumericNotEquals, "10", false },
        less_than = { Operator::NumericLessThan, "9", true },
        less_than_boundary = { Operator::NumericLessThan, "10", false },
        less_than_equals = { Operator::NumericLessThanEquals, "10", true },
        greater_than = { Operator::NumericGreaterThan, "11", true },
        greater_than_equals = { Operator::NumericGreaterThanEquals, "9", false },
        not_a_number = { Operator::NumericEquals, "ten", false },
    )]
    fn test_numeric(operator: Operator, observed: &str, expected: bool) {
        let f = function(operator, "s3:max-keys", &["10"]);
        assert_eq!(f.evaluate(&request(&[("max-keys", &[observed])])), expected);
    }

    #[test]
    fn test_functions_and_semantics() {
        let f1 = function(Operator::StringEquals, "s3:prefix", &["home/"]);
        let f2 = function(Operator::IpAddress, "aws:SourceIp", &["10.0.0.0/8"]);
        let functions = Functions::new([f1.clone(), f2.clone()]);

        let both = request(&[("prefix", &["home/"]), ("SourceIp", &["10.1.2.3"])]);
        let only_first = request(&[("prefix", &["home/"]), ("SourceIp", &["192.0.2.1"])]);

        assert!(f1.evaluate(&both) && f2.evaluate(&both));
        assert!(functions.evaluate(&both));
        assert!(f1.evaluate(&only_first) && !f2.evaluate(&only_first));
        assert!(!functions.evaluate(&only_first));
    }

    #[test]
    fn test_empty_functions_hold() {
        assert!(Functions::default().evaluate(&ConditionValues::new()));
    }

    #[test]
    fn test_functions_canonical_order() {
        let a = function(Operator::StringEquals, "s3:prefix", &["a"]);
        let b = function(Operator::Bool, "aws:SecureTransport", &["true"]);
        assert_eq!(
            Functions::new([a.clone(), b.clone()]),
            Functions::new([b, a])
        );
    }

    #[test]
    fn test_functions_keys() {
        let functions = Functions::new([
            function(Operator::StringEquals, "s3:prefix", &["a"]),
            function(Operator::StringNotLike, "s3:prefix", &["b*"]),
            function(Operator::IpAddress, "aws:SourceIp", &["10.0.0.0/8"]),
        ]);
        assert_snapshot!(functions.keys().to_string(), @"[s3:prefix,aws:SourceIp]");
    }

    #[test]
    fn test_functions_deserialize() {
        let json = r#"{
            "StringEquals": { "s3:prefix": ["home/", "work/"], "s3:delimiter": "/" },
            "IpAddress": { "aws:SourceIp": "192.0.2.0/24" }
        }"#;
        let functions: Functions = serde_json::from_str(json).unwrap();
        assert_eq!(functions.len(), 3);

        let values = request(&[
            ("prefix", &["work/"]),
            ("delimiter", &["/"]),
            ("SourceIp", &["192.0.2.7"]),
        ]);
        assert!(functions.evaluate(&values));
    }

    #[test]
    fn test_functions_serialize() {
        let functions = Functions::new([
            function(Operator::StringEquals, "s3:prefix", &["home/"]),
            function(Operator::Bool, "aws:SecureTransport", &["true"]),
        ]);
        assert_snapshot!(
            serde_json::to_string(&functions).unwrap(),
            @r#"{"Bool":{"aws:SecureTransport":["true"]},"StringEquals":{"s3:prefix":["home/"]}}"#
        );
    }

    #[parameterized(
        empty_condition = { "{}", "'Condition' must not be empty" },
        empty_operator = { r#"{"StringEquals": {}}"#, "'Condition.StringEquals' must not be empty" },
        empty_values = { r#"{"StringEquals": {"s3:prefix": []}}"#, "must not be empty" },
        unknown_operator = { r#"{"StringSortOf": {"s3:prefix": "a"}}"#, "unknown condition operator 'StringSortOf'" },
        unknown_key = { r#"{"StringEquals": {"s3:colour": "a"}}"#, "unknown condition key 's3:colour'" },
        bad_cidr = { r#"{"IpAddress": {"aws:SourceIp": "nope"}}"#, "must be a CIDR" },
    )]
    fn test_functions_deserialize_rejects(json: &str, message: &str) {
        let err = serde_json::from_str::<Functions>(json).unwrap_err();
        assert!(err.to_string().contains(message), "{err}");
    }

    #[test]
    fn test_operator_names() {
        assert_eq!(Operator::from_name("IpAddress").unwrap(), Operator::IpAddress);
        assert_eq!(
            Operator::from_name("ipaddress"),
            Err(PolicyError::UnknownOperator("ipaddress".to_string()))
        );
        assert!(Operator::StringNotLike.is_negated());
        assert!(!Operator::Null.is_negated());
    }
}
