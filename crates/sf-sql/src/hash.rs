//! Natural-key hash expressions

use sf_core::sql_utils::escape_sql_string;
use sf_core::DialectProfile;

/// Render the `hashid` expression over natural-key source columns.
///
/// Components are joined with the dialect's concatenation operator, with the
/// hash separator literal between consecutive components, and wrapped in the
/// concatenation prefix and suffix. `qualifier` prefixes every column
/// (`o.product`).
///
/// # Examples
/// ```
/// use sf_core::{DialectKind, DialectProfile};
/// use sf_sql::hash::hash_key_expr;
///
/// let duck = DialectProfile::for_kind(DialectKind::DuckDb);
/// assert_eq!(hash_key_expr(&duck, &["a", "b"], None), "CONCAT(a,'%',b)");
///
/// let derby = DialectProfile::for_kind(DialectKind::Derby);
/// assert_eq!(hash_key_expr(&derby, &["a", "b"], Some("o")), "o.a||'%'||o.b");
/// ```
pub fn hash_key_expr(profile: &DialectProfile, columns: &[&str], qualifier: Option<&str>) -> String {
    let separator = format!("'{}'", escape_sql_string(&profile.hash_separator));
    let mut parts = Vec::with_capacity(columns.len() * 2);
    for (i, column) in columns.iter().enumerate() {
        if i > 0 && !profile.hash_separator.is_empty() {
            parts.push(separator.clone());
        }
        parts.push(match qualifier {
            Some(q) => format!("{}.{}", q, column),
            None => column.to_string(),
        });
    }
    format!(
        "{}{}{}",
        profile.concat_prefix,
        parts.join(&profile.concat_operator),
        profile.concat_suffix
    )
}
