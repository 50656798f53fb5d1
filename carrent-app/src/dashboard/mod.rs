//! Role-gated views. Each operation checks the session role before any
//! request goes out.

pub mod admin;
pub mod customer;
pub mod owner;

pub use admin::{AdminDashboard, AdminStats, UserPage, UserQuery, USERS_PER_PAGE};
pub use customer::CustomerDashboard;
pub use owner::OwnerDashboard;

use crate::error::{AppError, AppResult};

/// Trimmed reason, or the message to show when none was given.
fn required_reason(reason: &str, missing: &str) -> AppResult<String> {
    let reason = reason.trim();
    if reason.is_empty() {
        return Err(AppError::InvalidInput(missing.to_string()));
    }
    Ok(reason.to_string())
}
