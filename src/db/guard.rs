//! Read-only statement guard.
//!
//! A cooperative policy check, not a security boundary: the statement's leading
//! keyword must be `SELECT`. The statement is never parsed, so semicolon-chained
//! statements (`SELECT 1; DROP TABLE x`) and CTE-wrapped mutations are not
//! detected. Connect with a read-only database role when that matters.

use crate::error::{AssistantError, AssistantResult};

/// Leading keyword of a statement, trimmed and upper-cased.
pub fn leading_keyword(sql: &str) -> String {
    sql.trim_start()
        .split(|c: char| c.is_whitespace() || c == '(' || c == ';')
        .next()
        .unwrap_or_default()
        .to_ascii_uppercase()
}

/// Reject anything whose leading keyword is not `SELECT`.
///
/// # Examples
///
/// ```
/// use dr_database::db::guard::validate_read_only;
///
/// assert!(validate_read_only("  select 1").is_ok());
/// assert!(validate_read_only("DROP TABLE x").is_err());
/// ```
pub fn validate_read_only(sql: &str) -> AssistantResult<()> {
    let keyword = leading_keyword(sql);
    if keyword.is_empty() {
        return Err(AssistantError::policy_violation("Empty SQL statement"));
    }
    if keyword != "SELECT" {
        return Err(AssistantError::policy_violation(format!(
            "Only SELECT statements are allowed, got {}",
            keyword
        )));
    }
    Ok(())
}
