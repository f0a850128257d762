//! Domain models for the POS client.
//!
//! Each model is a transient value built from an API response (or a form)
//! and filled with defaults for anything the API left out. Models own their
//! validation rules but never talk to the network.

pub mod cart;
pub mod product;
pub mod sale;
pub mod user;

pub use cart::{Cart, CartError, CartItem};
pub use product::Product;
pub use sale::{Sale, SaleItem, SalePayload};
pub use user::{Credentials, User};

use thiserror::Error;

/// Validation failures raised by models before they are sent to the API.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    /// Product is missing a name or has a non-positive price.
    #[error("Nombre y precio válido son requeridos")]
    InvalidProduct,

    /// Sale has no line items.
    #[error("La venta debe tener al menos un producto")]
    EmptySale,

    /// User is missing a username or email.
    #[error("Usuario y email son requeridos")]
    InvalidUser,
}
