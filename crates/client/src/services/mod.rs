//! Façade services over the POS API.
//!
//! Each service maps domain calls onto fixed endpoint paths and decodes the
//! responses into models. Services hold no state beyond their [`ApiClient`].
//!
//! [`ApiClient`]: crate::api::ApiClient

pub mod auth;
pub mod products;
pub mod sales;

pub use auth::AuthService;
pub use products::ProductService;
pub use sales::{HourlySales, SalesService, SalesStats};

use thiserror::Error;

use crate::api::ApiError;
use crate::models::ModelError;
use crate::storage::StorageError;

/// Errors surfaced by services.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl ServiceError {
    /// Whether this error means the visitor must log in again.
    #[must_use]
    pub const fn is_session_expired(&self) -> bool {
        matches!(self, Self::Api(ApiError::SessionExpired))
    }
}

/// Result alias for service calls.
pub type Result<T> = std::result::Result<T, ServiceError>;
