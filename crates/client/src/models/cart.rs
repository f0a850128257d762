//! Point-of-sale cart.
//!
//! The cart is page-local state owned by the sales controller. Every
//! mutation keeps each line's subtotal equal to `quantity × unit price`, and
//! the cart total is always derived from the lines.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use poscore_core::{PaymentMethod, Price, ProductId, UserId};

use super::{Product, Sale, SaleItem};

/// Reasons a cart mutation is rejected. A rejected mutation leaves the cart
/// unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CartError {
    #[error("No hay suficiente stock disponible")]
    InsufficientStock,
    #[error("Cantidad invalida")]
    InvalidQuantity,
    #[error("El producto no esta en el carrito")]
    NotInCart,
    #[error("El carrito esta vacio")]
    Empty,
    #[error("Monto fuera de rango")]
    AmountOverflow,
}

/// A product selected for the pending sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    /// Snapshot of the product when it was last added.
    pub product: Product,
    pub quantity: u32,
    pub subtotal: Price,
}

fn line_subtotal(product: &Product, quantity: u32) -> Result<Price, CartError> {
    product
        .price
        .checked_times(quantity)
        .ok_or(CartError::AmountOverflow)
}

/// Ordered list of cart lines, one per product.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Add `quantity` units of `product`, merging into an existing line.
    ///
    /// # Errors
    ///
    /// - [`CartError::InvalidQuantity`] if `quantity` is zero.
    /// - [`CartError::InsufficientStock`] if the resulting quantity would
    ///   exceed the product's current stock.
    /// - [`CartError::AmountOverflow`] if the line or cart total would not
    ///   fit in a [`Price`].
    pub fn add(&mut self, product: &Product, quantity: u32) -> Result<(), CartError> {
        if quantity == 0 {
            return Err(CartError::InvalidQuantity);
        }

        if let Some(index) = self.position(&product.id) {
            let merged = self.items[index]
                .quantity
                .checked_add(quantity)
                .ok_or(CartError::InsufficientStock)?;
            if merged > product.stock {
                return Err(CartError::InsufficientStock);
            }
            let subtotal = line_subtotal(product, merged)?;
            self.total_replacing(Some(index), subtotal)?;

            let item = &mut self.items[index];
            item.product = product.clone();
            item.quantity = merged;
            item.subtotal = subtotal;
            return Ok(());
        }

        if quantity > product.stock {
            return Err(CartError::InsufficientStock);
        }
        let subtotal = line_subtotal(product, quantity)?;
        self.total_replacing(None, subtotal)?;
        self.items.push(CartItem {
            product: product.clone(),
            quantity,
            subtotal,
        });
        Ok(())
    }

    /// Replace the quantity of a line. The new quantity must be within
    /// `(0, stock]` of the product snapshot held by the line.
    ///
    /// # Errors
    ///
    /// - [`CartError::NotInCart`] if no line holds `product_id`.
    /// - [`CartError::InvalidQuantity`] if the quantity is out of range.
    /// - [`CartError::AmountOverflow`] if the new total would not fit in a
    ///   [`Price`].
    pub fn update_quantity(&mut self, product_id: &ProductId, quantity: u32) -> Result<(), CartError> {
        let index = self.position(product_id).ok_or(CartError::NotInCart)?;

        let product = &self.items[index].product;
        if quantity == 0 || quantity > product.stock {
            return Err(CartError::InvalidQuantity);
        }
        let subtotal = line_subtotal(product, quantity)?;
        self.total_replacing(Some(index), subtotal)?;

        let item = &mut self.items[index];
        item.quantity = quantity;
        item.subtotal = subtotal;
        Ok(())
    }

    fn position(&self, product_id: &ProductId) -> Option<usize> {
        self.items
            .iter()
            .position(|item| &item.product.id == product_id)
    }

    /// Cart total with line `replaced` (or a new line) carrying `subtotal`.
    fn total_replacing(&self, replaced: Option<usize>, subtotal: Price) -> Result<Price, CartError> {
        self.items
            .iter()
            .enumerate()
            .filter(|(index, _)| Some(*index) != replaced)
            .try_fold(subtotal, |total, (_, item)| total.checked_add(item.subtotal))
            .ok_or(CartError::AmountOverflow)
    }

    /// Remove the line holding `product_id`, if any.
    pub fn remove(&mut self, product_id: &ProductId) {
        self.items.retain(|item| &item.product.id != product_id);
    }

    /// Remove every line.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Sum of line subtotals.
    #[must_use]
    pub fn total(&self) -> Price {
        self.items.iter().map(|item| item.subtotal).sum()
    }

    /// Cart lines in insertion order.
    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn unit_count(&self) -> u32 {
        self.items
            .iter()
            .fold(0, |count, item| count.saturating_add(item.quantity))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Turn the cart into a sale ready for submission.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Empty`] if there is nothing to sell.
    pub fn to_sale(&self, payment_method: PaymentMethod, user_id: UserId) -> Result<Sale, CartError> {
        if self.is_empty() {
            return Err(CartError::Empty);
        }

        let items: Vec<SaleItem> = self
            .items
            .iter()
            .map(|item| SaleItem {
                product_id: item.product.id.clone(),
                name: item.product.name.clone(),
                quantity: item.quantity,
                unit_price: item.product.price,
                subtotal: item.subtotal,
            })
            .collect();

        Ok(Sale {
            total: self.total(),
            payment_method,
            user_id,
            items,
            ..Sale::default()
        })
    }
}
