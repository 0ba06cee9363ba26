//! `@name` placeholders in raw SQL fragments.
//!
//! String literals and `@@` system variables are never placeholders. Both
//! query front ends go through these helpers before a command is prepared.

use std::sync::LazyLock;

use docstore_sql_core::CommandParameterValues;
use regex::{Captures, Regex};

use crate::error::{OrmError, Result};

/// A string literal, a system variable or a placeholder, leftmost first, so
/// an `@` inside a literal is consumed with the literal.
static TOKEN_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?P<literal>N?'(?:[^']|'')*')|(?P<system>@@\w+)|@(?P<name>\w+)")
        .expect("valid placeholder pattern")
});

fn placeholder_name<'s>(captures: &Captures<'s>) -> Option<&'s str> {
    captures.name("name").map(|name| name.as_str())
}

/// Rewrites each placeholder to the spelling `registered` returns for it.
/// Unknown placeholders are left alone.
pub(crate) fn normalize_casing<'v>(
    sql: &str,
    registered: impl Fn(&str) -> Option<&'v str>,
) -> String {
    TOKEN_PATTERN
        .replace_all(sql, |captures: &Captures<'_>| {
            placeholder_name(captures)
                .and_then(&registered)
                .map_or_else(|| captures[0].to_string(), |name| format!("@{name}"))
        })
        .into_owned()
}

/// The first placeholder in `sql` without a value.
pub(crate) fn missing_parameter(sql: &str, values: &CommandParameterValues) -> Option<String> {
    TOKEN_PATTERN
        .captures_iter(sql)
        .filter_map(|captures| placeholder_name(&captures).map(str::to_string))
        .find(|name| !values.contains_key(name))
}

/// Fails with [`OrmError::MissingParameterValue`] unless every placeholder
/// in `sql` has a value.
pub(crate) fn ensure_bound(sql: &str, values: &CommandParameterValues) -> Result<()> {
    match missing_parameter(sql, values) {
        Some(missing) => Err(OrmError::MissingParameterValue(missing)),
        None => Ok(()),
    }
}
