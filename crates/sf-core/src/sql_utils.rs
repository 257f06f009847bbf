//! SQL identifier validation and literal escaping
//!
//! Generated statements interpolate table and column names verbatim, so every
//! name that reaches SQL text must first pass [`validate_identifier`]. Literal
//! values travel as bound parameters instead; [`escape_sql_string`] is only
//! used for dialect fragments such as the hash separator.

use crate::error::{CoreError, CoreResult};
use regex::Regex;
use std::sync::OnceLock;

/// Longest identifier accepted. Matches the tightest limit among the
/// supported databases (PostgreSQL truncates at 63 bytes).
pub const MAX_IDENTIFIER_LEN: usize = 63;

static IDENT_RE: OnceLock<Regex> = OnceLock::new();

fn ident_re() -> &'static Regex {
    IDENT_RE.get_or_init(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid regex"))
}

/// Validate a bare SQL identifier (table or column name).
///
/// Accepts ASCII letters, digits and underscores, not starting with a digit.
///
/// # Examples
/// ```
/// use sf_core::sql_utils::validate_identifier;
/// assert!(validate_identifier("o_sales").is_ok());
/// assert!(validate_identifier("sales; DROP TABLE x").is_err());
/// ```
pub fn validate_identifier(ident: &str) -> CoreResult<()> {
    if ident.is_empty() {
        return Err(CoreError::InvalidIdentifier {
            ident: ident.to_string(),
            reason: "identifier is empty".to_string(),
        });
    }
    if ident.len() > MAX_IDENTIFIER_LEN {
        return Err(CoreError::InvalidIdentifier {
            ident: ident.to_string(),
            reason: format!("longer than {} characters", MAX_IDENTIFIER_LEN),
        });
    }
    if !ident_re().is_match(ident) {
        return Err(CoreError::InvalidIdentifier {
            ident: ident.to_string(),
            reason: "only ASCII letters, digits and '_' are allowed, and it must not start with a digit"
                .to_string(),
        });
    }
    Ok(())
}

/// Normalize a name into the short form used by load queries.
///
/// Lowercases, turns every character outside `[a-z0-9_]` into `_` and trims
/// the result to [`MAX_IDENTIFIER_LEN`].
///
/// # Examples
/// ```
/// use sf_core::sql_utils::format_short_name;
/// assert_eq!(format_short_name("Order Date"), "order_date");
/// assert_eq!(format_short_name("f_sales"), "f_sales");
/// ```
pub fn format_short_name(name: &str) -> String {
    name.trim()
        .chars()
        .map(|c| {
            let c = c.to_ascii_lowercase();
            if c.is_ascii_alphanumeric() || c == '_' {
                c
            } else {
                '_'
            }
        })
        .take(MAX_IDENTIFIER_LEN)
        .collect()
}

/// Escape a SQL string literal value by doubling single quotes.
///
/// This is for use inside single-quoted SQL string literals, not identifiers.
pub fn escape_sql_string(value: &str) -> String {
    value.replace('\'', "''")
}

#[cfg(test)]
#[path = "sql_utils_test.rs"]
mod tests;
