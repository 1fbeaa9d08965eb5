//! Application services over the store abstractions.
//!
//! Services validate inputs before they reach a store and translate missing
//! rows into [`CoreError::NotFound`]; the stores themselves stay dumb.

pub mod category_service;
pub mod profile_service;
pub mod recurring_service;
pub mod scheduler;
pub mod summary_service;
pub mod transaction_service;

pub use category_service::CategoryService;
pub use profile_service::ProfileService;
pub use recurring_service::RecurringService;
pub use scheduler::RecurrenceScheduler;
pub use summary_service::SummaryService;
pub use transaction_service::TransactionService;

use crate::errors::CoreError;

pub type ServiceResult<T> = Result<T, CoreError>;

/// Trims a required text field, rejecting blank values.
pub(crate) fn validate_label(field: &str, value: &str) -> ServiceResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(CoreError::InvalidInput(format!("{field} is required")));
    }
    Ok(trimmed.to_string())
}

pub(crate) fn validate_amount(amount_cents: i64) -> ServiceResult<()> {
    if amount_cents <= 0 {
        return Err(CoreError::InvalidInput(
            "amount must be a positive number".into(),
        ));
    }
    Ok(())
}

/// `#rgb` or `#rrggbb`, matching what the clients send.
pub(crate) fn validate_color(value: &str) -> ServiceResult<String> {
    let trimmed = value.trim();
    let digits = trimmed.strip_prefix('#').unwrap_or("");
    let valid = matches!(digits.len(), 3 | 6) && digits.chars().all(|c| c.is_ascii_hexdigit());
    if !valid {
        return Err(CoreError::InvalidInput(
            "color must be a valid hex color".into(),
        ));
    }
    Ok(trimmed.to_string())
}
