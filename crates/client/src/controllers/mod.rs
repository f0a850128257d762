//! Controllers own UI-facing state and orchestrate service calls.
//!
//! No error escapes a controller unstructured: every failure becomes an
//! [`ActionError`] and, unless the session expired, is also reported through
//! the controller's `on_error` hook. Views observe state changes by
//! implementing the hook traits, whose methods all default to no-ops.

pub mod auth;
pub mod products;
pub mod sales;

pub use auth::{AuthController, AuthEvents};
pub use products::{ProductController, ProductEvents, ProductState};
pub use sales::{SalesController, SalesEvents, SalesState};

use crate::services::ServiceError;

/// A rejected controller operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionError {
    /// Human-readable reason, suitable for display.
    pub message: String,
    /// The API rejected our credentials; the caller must send the visitor
    /// back to the login page instead of showing `message`.
    pub session_expired: bool,
}

impl ActionError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            session_expired: false,
        }
    }
}

impl From<&ServiceError> for ActionError {
    fn from(error: &ServiceError) -> Self {
        Self {
            message: error.to_string(),
            session_expired: error.is_session_expired(),
        }
    }
}

impl std::fmt::Display for ActionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

/// `{success, message}` in Rust form.
pub type ActionResult<T> = Result<T, ActionError>;
