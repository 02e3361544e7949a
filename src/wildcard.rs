//! Glob-style matching shared by ARNs, action sets, principals and `StringLike`.
//!
//! `*` matches any run of characters (including none), `?` matches exactly one
//! character. There is no escaping and there are no character classes.

/// Match `subject` against `pattern`.
///
/// An empty pattern only matches an empty subject.
///
/// ```rust
/// use treetop_iam::wildcard;
/// assert!(wildcard::matches("s3:Get*", "s3:GetObject"));
/// assert!(wildcard::matches("a?c", "abc"));
/// assert!(!wildcard::matches("a?c", "ac"));
/// ```
pub fn matches(pattern: &str, subject: &str) -> bool {
    if pattern.is_empty() {
        return subject.is_empty();
    }
    if pattern == "*" {
        return true;
    }

    let pattern: Vec<char> = pattern.chars().collect();
    let subject: Vec<char> = subject.chars().collect();

    let (mut p, mut s) = (0, 0);
    // Position of the last `*` seen and the subject index it is anchored at.
    let mut backtrack: Option<(usize, usize)> = None;

    while s < subject.len() {
        match pattern.get(p) {
            Some('*') => {
                backtrack = Some((p, s));
                p += 1;
            }
            Some('?') => {
                p += 1;
                s += 1;
            }
            Some(c) if *c == subject[s] => {
                p += 1;
                s += 1;
            }
            _ => match backtrack {
                Some((star, anchor)) => {
                    // Let the last star swallow one more character and retry.
                    p = star + 1;
                    s = anchor + 1;
                    backtrack = Some((star, anchor + 1));
                }
                None => return false,
            },
        }
    }

    pattern[p..].iter().all(|c| *c == '*')
}
