//! Point-of-sale controller.
//!
//! Drives the cart through `empty → building → submitting`. A successful
//! submission always returns the cart to `empty`; a failed one leaves it
//! untouched so the cashier can retry.

use serde::{Deserialize, Serialize};
use tracing::instrument;

use poscore_core::{PaymentMethod, Price, ProductId, UserId};

use super::{ActionError, ActionResult};
use crate::models::{Cart, CartError, Product, Sale};
use crate::services::{ProductService, SalesService, SalesStats, ServiceError};
use crate::storage::Storage;

/// Observers of cart and sale changes.
pub trait SalesEvents {
    fn on_products_loaded(&mut self, _products: &[Product]) {}
    fn on_cart_updated(&mut self, _cart: &Cart, _total: Price) {}
    fn on_sale_processed(&mut self, _sale: &Sale) {}
    fn on_error(&mut self, _message: &str) {}
}

impl SalesEvents for () {}

/// State kept between requests of one page visit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalesState {
    pub cart: Cart,
    /// Products available to sell, with locally adjusted stock.
    pub products: Vec<Product>,
    pub payment_method: PaymentMethod,
}

pub struct SalesController<S, H = ()> {
    sales: SalesService<S>,
    products: ProductService<S>,
    state: SalesState,
    hooks: H,
}

impl<S: Storage, H: SalesEvents> SalesController<S, H> {
    pub const fn new(
        sales: SalesService<S>,
        products: ProductService<S>,
        state: SalesState,
        hooks: H,
    ) -> Self {
        Self {
            sales,
            products,
            state,
            hooks,
        }
    }

    /// Load the sellable products.
    ///
    /// # Errors
    ///
    /// Fails when the product list cannot be fetched.
    pub async fn initialize(&mut self) -> ActionResult<()> {
        self.load_products().await
    }

    /// # Errors
    ///
    /// Fails when the product list cannot be fetched.
    #[instrument(skip(self))]
    pub async fn load_products(&mut self) -> ActionResult<()> {
        match self.products.get_products().await {
            Ok(products) => {
                self.state.products = products;
                self.hooks.on_products_loaded(&self.state.products);
                Ok(())
            }
            Err(e) => Err(self.fail("Error al cargar productos", &e)),
        }
    }

    /// Add `quantity` units of `product` to the cart.
    ///
    /// Returns `false` (and reports through `on_error`) when the cart
    /// rejects the change.
    pub fn add_to_cart(&mut self, product: &Product, quantity: u32) -> bool {
        match self.state.cart.add(product, quantity) {
            Ok(()) => {
                self.cart_updated();
                true
            }
            Err(e) => {
                self.hooks.on_error(&e.to_string());
                false
            }
        }
    }

    /// Add a loaded product by id.
    pub fn add_product_by_id(&mut self, id: &ProductId, quantity: u32) -> bool {
        let Some(product) = self.state.products.iter().find(|p| &p.id == id).cloned() else {
            self.hooks.on_error("Producto no encontrado");
            return false;
        };
        self.add_to_cart(&product, quantity)
    }

    /// Change a line's quantity. Out-of-range quantities are ignored.
    pub fn update_quantity(&mut self, id: &ProductId, quantity: u32) -> bool {
        if self.state.cart.update_quantity(id, quantity).is_ok() {
            self.cart_updated();
            true
        } else {
            false
        }
    }

    pub fn remove_from_cart(&mut self, id: &ProductId) {
        self.state.cart.remove(id);
        self.cart_updated();
    }

    pub fn clear_cart(&mut self) {
        self.state.cart.clear();
        self.cart_updated();
    }

    pub const fn set_payment_method(&mut self, method: PaymentMethod) {
        self.state.payment_method = method;
    }

    /// Submit the cart as a sale on behalf of `user_id`.
    ///
    /// On success the cached stock of every sold product drops by the sold
    /// quantity and the cart is cleared.
    ///
    /// # Errors
    ///
    /// An empty cart fails without contacting the API. API failures leave
    /// the cart as it was.
    #[instrument(skip(self), fields(total = %self.state.cart.total()))]
    pub async fn process_sale(&mut self, user_id: UserId) -> ActionResult<Sale> {
        let sale = match self.state.cart.to_sale(self.state.payment_method, user_id) {
            Ok(sale) => sale,
            Err(e @ CartError::Empty) => {
                let message = e.to_string();
                self.hooks.on_error(&message);
                return Err(ActionError::new(message));
            }
            Err(e) => return Err(ActionError::new(e.to_string())),
        };

        match self.sales.create_sale(&sale).await {
            Ok(created) => {
                for item in self.state.cart.items() {
                    if let Some(product) = self
                        .state
                        .products
                        .iter_mut()
                        .find(|p| p.id == item.product.id)
                    {
                        product.stock = product.stock.saturating_sub(item.quantity);
                    }
                }
                self.clear_cart();
                tracing::info!(sale_id = %created.id, "Sale processed");
                self.hooks.on_sale_processed(&created);
                Ok(created)
            }
            Err(e) => Err(self.fail("Error al procesar venta", &e)),
        }
    }

    /// Today's statistics.
    ///
    /// # Errors
    ///
    /// Fails when today's sales cannot be fetched.
    pub async fn get_stats(&mut self) -> ActionResult<SalesStats> {
        match self.sales.get_sales_stats().await {
            Ok(stats) => Ok(stats),
            Err(e) => Err(self.fail("Error al obtener estadisticas", &e)),
        }
    }

    #[must_use]
    pub const fn cart(&self) -> &Cart {
        &self.state.cart
    }

    #[must_use]
    pub fn products(&self) -> &[Product] {
        &self.state.products
    }

    #[must_use]
    pub const fn payment_method(&self) -> PaymentMethod {
        self.state.payment_method
    }

    pub const fn hooks_mut(&mut self) -> &mut H {
        &mut self.hooks
    }

    /// Hand back the page state and the hooks.
    pub fn into_parts(self) -> (SalesState, H) {
        (self.state, self.hooks)
    }

    fn cart_updated(&mut self) {
        let total = self.state.cart.total();
        self.hooks.on_cart_updated(&self.state.cart, total);
    }

    fn fail(&mut self, context: &str, error: &ServiceError) -> ActionError {
        let action = ActionError::from(error);
        if !action.session_expired {
            self.hooks.on_error(&format!("{context}: {}", action.message));
        }
        action
    }
}
