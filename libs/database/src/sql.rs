//! Helpers for hand-written SQL.

/// `%text%` for a `LIKE`/`ILIKE` substring match.
///
/// `%`, `_` and the escape character itself are escaped, so the text is
/// matched literally with Postgres' default `\` escape.
pub fn like_pattern(text: &str) -> String {
    let escaped = text
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}
