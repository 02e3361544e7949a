use std::sync::Arc;

use yare::parameterized;

use super::request_with;
use crate::{
    AlwaysAllow, AlwaysDeny, AlwaysNoOpinion, Authorizer, Bucket, BucketPolicy, Decision,
    Identity, IdentityPolicy, PolicyError, Request, Union, compile_policy,
};

const PUBLIC_BUCKET: &str = include_str!("../../testdata/public_bucket.json");
const HOME_DIRECTORIES: &str = include_str!("../../testdata/home_directories.json");

fn public_bucket() -> BucketPolicy {
    compile_policy::<Bucket>(PUBLIC_BUCKET).unwrap()
}

fn home_directories() -> IdentityPolicy {
    compile_policy::<Identity>(HOME_DIRECTORIES).unwrap()
}

#[parameterized(
    location = { "s3:GetBucketLocation", false, Decision::Allow },
    put = { "s3:PutObject", false, Decision::Allow },
    get_is_implicitly_denied = { "s3:GetObject", false, Decision::Deny },
    owner_get = { "s3:GetObject", true, Decision::Allow },
)]
fn test_public_bucket(action: &str, owner: bool, expected: Decision) {
    let mut request = Request::new("anyone", action, "mybucket");
    request.is_owner = owner;

    let policy = public_bucket();
    assert_eq!(policy.authorize(&request).decision, expected);
    assert_eq!(policy.is_allowed(&request), expected == Decision::Allow);
}

#[parameterized(
    list_own_prefix = { "s3:ListBucket", "", "alice", "alice/docs/", "192.0.2.10", true },
    list_own_root = { "s3:ListBucket", "", "alice", "alice", "192.0.2.10", true },
    list_other_prefix = { "s3:ListBucket", "", "alice", "bob/", "192.0.2.10", false },
    get_own_object = { "s3:GetObject", "alice/notes.txt", "alice", "", "192.0.2.10", true },
    put_own_object_v6 = { "s3:PutObject", "alice/notes.txt", "alice", "", "2001:db8::1", true },
    get_other_object = { "s3:GetObject", "bob/notes.txt", "alice", "", "192.0.2.10", false },
    outside_office = { "s3:GetObject", "alice/notes.txt", "alice", "", "198.51.100.7", false },
    bad_source_ip = { "s3:GetObject", "alice/notes.txt", "alice", "", "not-an-ip", false },
)]
fn test_home_directories(
    action: &str,
    object: &str,
    username: &str,
    prefix: &str,
    source_ip: &str,
    expected: bool,
) {
    let mut values = vec![("username", username), ("SourceIp", source_ip)];
    if !prefix.is_empty() {
        values.push(("prefix", prefix));
    }
    let request = request_with(username, action, "home", object, &values);
    assert_eq!(home_directories().is_allowed(&request), expected);
}

#[test]
fn test_owner_is_still_denied_by_matching_deny() {
    let policy = home_directories();
    let request = request_with(
        "alice",
        "s3:GetObject",
        "home",
        "alice/notes.txt",
        &[("username", "alice")],
    )
    .as_owner();

    // No SourceIp at all: the NotIpAddress deny applies vacuously.
    let verdict = policy.authorize(&request);
    assert_eq!(verdict.decision, Decision::Deny);
    assert_eq!(verdict.reason, "denied by statement 'OfficeNetworkOnly'");
}

#[test]
fn test_union_short_circuit() {
    let union = Union::default()
        .with(AlwaysNoOpinion)
        .with(AlwaysAllow)
        .with(AlwaysDeny);
    assert_eq!(
        union.authorize(&Request::default()).decision,
        Decision::Allow
    );
}

#[test]
fn test_union_of_dialects() {
    let members: Vec<Arc<dyn Authorizer>> =
        vec![Arc::new(home_directories()), Arc::new(public_bucket())];
    let union = Union::new(members);

    // The identity policy decides first, even when it denies implicitly.
    let request = request_with(
        "bob",
        "s3:PutObject",
        "mybucket",
        "x",
        &[("SourceIp", "192.0.2.1")],
    );
    assert_eq!(union.authorize(&request).decision, Decision::Deny);
}

#[test]
fn test_duplicate_statements_fail_with_description() {
    let json = r#"{
        "Version": "2012-10-17",
        "Statement": [
            {"Sid": "A", "Effect": "Allow", "Principal": {"AWS": ["alice", "bob"]},
             "Action": ["s3:GetObject"], "Resource": ["arn:aws:s3:::shared/*"]},
            {"Sid": "B", "Effect": "Deny", "Principal": {"AWS": ["bob"]},
             "Action": ["s3:GetObject"], "Resource": ["arn:aws:s3:::shared/*"]}
        ]
    }"#;
    let err = compile_policy::<Bucket>(json).unwrap_err();
    match err {
        PolicyError::ParseError(message) => {
            assert!(message.contains("statement #0 ('A'"), "{message}");
            assert!(message.contains("statement #1 ('B'"), "{message}");
        }
        other => panic!("Expected ParseError, got {other:?}"),
    }
}
