//! Custom Askama template filters.

#![allow(clippy::unnecessary_wraps)]

use std::fmt::Display;

/// Returns the current year.
///
/// Usage in templates: `{{ ""|current_year }}`
#[askama::filter_fn]
pub fn current_year(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<i32> {
    use chrono::Datelike;
    Ok(chrono::Local::now().year())
}

/// Formats an amount in Indian rupees.
///
/// Usage in templates: `{{ receipt.total|rupees }}`
#[askama::filter_fn]
pub fn rupees(value: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    Ok(format!("₹{value}"))
}

/// Shows `N/A` for blank values.
///
/// Usage in templates: `{{ card.instructions|or_na }}`
#[askama::filter_fn]
pub fn or_na(value: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    let value = value.to_string();
    if value.trim().is_empty() {
        Ok("N/A".to_string())
    } else {
        Ok(value)
    }
}
