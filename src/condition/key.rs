//! Condition keys and key sets.

use std::collections::BTreeSet;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use itertools::Itertools;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use strum::{AsRefStr, EnumIter, IntoEnumIterator, IntoStaticStr};

use crate::error::PolicyError;

/// A supported condition key.
///
/// Keys are written in policies with their service prefix (`aws:SourceIp`,
/// `s3:prefix`) but are looked up in a request's condition values by their
/// short [`name`](Key::name), with the prefix removed.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, AsRefStr, IntoStaticStr, EnumIter,
)]
pub enum Key {
    #[strum(serialize = "s3:x-amz-copy-source")]
    S3XAmzCopySource,
    #[strum(serialize = "s3:x-amz-server-side-encryption")]
    S3XAmzServerSideEncryption,
    #[strum(serialize = "s3:x-amz-server-side-encryption-customer-algorithm")]
    S3XAmzServerSideEncryptionCustomerAlgorithm,
    #[strum(serialize = "s3:x-amz-metadata-directive")]
    S3XAmzMetadataDirective,
    #[strum(serialize = "s3:x-amz-storage-class")]
    S3XAmzStorageClass,
    #[strum(serialize = "s3:x-amz-content-sha256")]
    S3XAmzContentSha256,
    #[strum(serialize = "s3:LocationConstraint")]
    S3LocationConstraint,
    #[strum(serialize = "s3:prefix")]
    S3Prefix,
    #[strum(serialize = "s3:delimiter")]
    S3Delimiter,
    #[strum(serialize = "s3:max-keys")]
    S3MaxKeys,
    #[strum(serialize = "s3:versionid")]
    S3VersionId,
    #[strum(serialize = "s3:signatureversion")]
    S3SignatureVersion,
    #[strum(serialize = "s3:authType")]
    S3AuthType,
    #[strum(serialize = "aws:Referer")]
    AwsReferer,
    #[strum(serialize = "aws:SourceIp")]
    AwsSourceIp,
    #[strum(serialize = "aws:UserAgent")]
    AwsUserAgent,
    #[strum(serialize = "aws:SecureTransport")]
    AwsSecureTransport,
    #[strum(serialize = "aws:CurrentTime")]
    AwsCurrentTime,
    #[strum(serialize = "aws:EpochTime")]
    AwsEpochTime,
    #[strum(serialize = "aws:principaltype")]
    AwsPrincipalType,
    #[strum(serialize = "aws:userid")]
    AwsUserId,
    #[strum(serialize = "aws:username")]
    AwsUsername,
}

/// Keys usable as `${...}` policy variables.
pub const COMMON_KEYS: [Key; 9] = [
    Key::AwsReferer,
    Key::AwsSourceIp,
    Key::AwsUserAgent,
    Key::AwsSecureTransport,
    Key::AwsCurrentTime,
    Key::AwsEpochTime,
    Key::AwsPrincipalType,
    Key::AwsUserId,
    Key::AwsUsername,
];

impl Key {
    /// The lookup name in a request's condition values, e.g. `SourceIp`.
    pub fn name(&self) -> &'static str {
        let full: &'static str = (*self).into();
        full.strip_prefix("aws:")
            .or_else(|| full.strip_prefix("s3:"))
            .unwrap_or(full)
    }

    /// Whether this key may appear as a policy variable.
    pub fn is_common(&self) -> bool {
        COMMON_KEYS.contains(self)
    }
}

impl Display for Key {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_ref())
    }
}

impl FromStr for Key {
    type Err = PolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(PolicyError::UnknownKey(s.to_string()));
        }
        Key::iter()
            .find(|k| k.as_ref() == s)
            .ok_or_else(|| PolicyError::UnknownKey(s.to_string()))
    }
}

impl Serialize for Key {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_ref())
    }
}

impl<'de> Deserialize<'de> for Key {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// A set of condition keys, e.g. every key a statement's conditions inspect.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct KeySet(BTreeSet<Key>);

impl KeySet {
    pub fn new() -> Self {
        KeySet::default()
    }

    /// Add a key, returning `false` if it was already present.
    pub fn add(&mut self, key: Key) -> bool {
        self.0.insert(key)
    }

    pub fn contains(&self, key: &Key) -> bool {
        self.0.contains(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Key> {
        self.0.iter()
    }

    pub fn intersection(&self, other: &KeySet) -> KeySet {
        KeySet(self.0.intersection(&other.0).copied().collect())
    }

}

impl FromIterator<Key> for KeySet {
    fn from_iter<I: IntoIterator<Item = Key>>(iter: I) -> Self {
        KeySet(iter.into_iter().collect())
    }
}

impl Display for KeySet {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "[{}]", self.0.iter().join(","))
    }
}
