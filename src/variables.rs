//! `${key}` policy variables.
//!
//! Resource patterns and string condition operands may embed variables such
//! as `${aws:username}`. Before matching, each variable naming a common key is
//! replaced by the first value the request carries for that key.
//!
//! Substituted values are not escaped: a `*` or `?` inside a request value
//! acts as a wildcard once it lands in a resource pattern or `StringLike`
//! operand. A `username` of `*` turns `home/${aws:username}/*` into
//! `home/*/*`. Callers must sanitise the values they put into
//! [`ConditionValues`].

use std::borrow::Cow;
use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::condition::Key;

/// Request attributes, keyed by [`Key::name`].
pub type ConditionValues = HashMap<String, Vec<String>>;

static VARIABLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$\{([^}]+)\}").expect("policy variable pattern compiles"));

fn common_key(name: &str) -> Option<Key> {
    name.parse::<Key>().ok().filter(Key::is_common)
}

/// Replace every known `${key}` in `text` with the request's first value for
/// that key. Unknown variables, missing keys and empty values are left as-is.
pub fn substitute<'a>(text: &'a str, values: &ConditionValues) -> Cow<'a, str> {
    if !text.contains("${") {
        return Cow::Borrowed(text);
    }

    VARIABLE.replace_all(text, |caps: &Captures<'_>| {
        common_key(&caps[1])
            .and_then(|key| values.get(key.name()))
            .and_then(|observed| observed.first())
            .filter(|first| !first.is_empty())
            .cloned()
            .unwrap_or_else(|| caps[0].to_string())
    })
}
