//! Inventory controller.

use serde::{Deserialize, Serialize};
use tracing::instrument;

use poscore_core::ProductId;

use super::{ActionError, ActionResult};
use crate::models::Product;
use crate::services::{ProductService, ServiceError};
use crate::storage::Storage;

/// Observers of inventory changes.
pub trait ProductEvents {
    fn on_products_loaded(&mut self, _products: &[Product]) {}
    fn on_product_created(&mut self, _product: &Product) {}
    fn on_product_updated(&mut self, _product: &Product) {}
    fn on_product_deleted(&mut self, _id: &ProductId) {}
    fn on_products_filtered(&mut self, _products: &[Product]) {}
    fn on_error(&mut self, _message: &str) {}
}

impl ProductEvents for () {}

/// State kept between requests of one page visit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductState {
    pub products: Vec<Product>,
    pub filter: String,
}

pub struct ProductController<S, H = ()> {
    service: ProductService<S>,
    state: ProductState,
    hooks: H,
}

impl<S: Storage, H: ProductEvents> ProductController<S, H> {
    pub const fn new(service: ProductService<S>, state: ProductState, hooks: H) -> Self {
        Self {
            service,
            state,
            hooks,
        }
    }

    /// Replace the cached list with a fresh copy from the API.
    ///
    /// # Errors
    ///
    /// Fails when the API call fails; the cached list is left unchanged.
    #[instrument(skip(self))]
    pub async fn load_products(&mut self) -> ActionResult<&[Product]> {
        match self.service.get_products().await {
            Ok(products) => {
                self.state.products = products;
                self.hooks.on_products_loaded(&self.state.products);
                Ok(&self.state.products)
            }
            Err(e) => Err(self.fail("Error al cargar productos", &e)),
        }
    }

    /// # Errors
    ///
    /// Fails on validation or API errors.
    #[instrument(skip(self, product))]
    pub async fn create_product(&mut self, product: &Product) -> ActionResult<Product> {
        match self.service.create_product(product).await {
            Ok(created) => {
                self.state.products.push(created.clone());
                self.hooks.on_product_created(&created);
                Ok(created)
            }
            Err(e) => Err(self.fail("Error al crear producto", &e)),
        }
    }

    /// # Errors
    ///
    /// Fails on validation or API errors.
    #[instrument(skip(self, product))]
    pub async fn update_product(&mut self, id: &ProductId, product: &Product) -> ActionResult<Product> {
        match self.service.update_product(id, product).await {
            Ok(updated) => {
                if let Some(slot) = self.state.products.iter_mut().find(|p| &p.id == id) {
                    *slot = updated.clone();
                }
                self.hooks.on_product_updated(&updated);
                Ok(updated)
            }
            Err(e) => Err(self.fail("Error al actualizar producto", &e)),
        }
    }

    /// # Errors
    ///
    /// Fails on API errors; the cached list is left unchanged.
    #[instrument(skip(self))]
    pub async fn delete_product(&mut self, id: &ProductId) -> ActionResult<()> {
        match self.service.delete_product(id).await {
            Ok(_) => {
                self.state.products.retain(|p| &p.id != id);
                self.hooks.on_product_deleted(id);
                Ok(())
            }
            Err(e) => Err(self.fail("Error al eliminar producto", &e)),
        }
    }

    /// Set a product's stock and mirror it in the cached list.
    ///
    /// # Errors
    ///
    /// Fails on API errors.
    #[instrument(skip(self))]
    pub async fn update_stock(&mut self, id: &ProductId, stock: u32) -> ActionResult<()> {
        match self.service.update_stock(id, stock).await {
            Ok(_) => {
                if let Some(product) = self.state.products.iter_mut().find(|p| &p.id == id) {
                    product.stock = stock;
                    self.hooks.on_product_updated(product);
                }
                Ok(())
            }
            Err(e) => Err(self.fail("Error al actualizar stock", &e)),
        }
    }

    /// Remember `query` as the active filter and return matching products.
    ///
    /// # Errors
    ///
    /// Fails when the product list cannot be fetched.
    #[instrument(skip(self))]
    pub async fn search_products(&mut self, query: &str) -> ActionResult<Vec<Product>> {
        self.state.filter = query.to_string();
        match self.service.search_products(query).await {
            Ok(found) => {
                self.hooks.on_products_filtered(&found);
                Ok(found)
            }
            Err(e) => Err(self.fail("Error al buscar productos", &e)),
        }
    }

    /// Cached products at or below their minimum stock.
    #[must_use]
    pub fn low_stock_products(&self) -> Vec<&Product> {
        self.state
            .products
            .iter()
            .filter(|p| p.is_low_stock())
            .collect()
    }

    #[must_use]
    pub fn products(&self) -> &[Product] {
        &self.state.products
    }

    #[must_use]
    pub fn filter(&self) -> &str {
        &self.state.filter
    }

    pub const fn hooks_mut(&mut self) -> &mut H {
        &mut self.hooks
    }

    /// Hand back the page state and the hooks.
    pub fn into_parts(self) -> (ProductState, H) {
        (self.state, self.hooks)
    }

    fn fail(&mut self, context: &str, error: &ServiceError) -> ActionError {
        let action = ActionError::from(error);
        if !action.session_expired {
            self.hooks.on_error(&format!("{context}: {}", action.message));
        }
        action
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use poscore_core::Price;

    use super::*;
    use crate::api::ApiClient;
    use crate::storage::MemoryStorage;

    #[derive(Default)]
    struct Recorder {
        errors: Vec<String>,
    }

    impl ProductEvents for Recorder {
        fn on_error(&mut self, message: &str) {
            self.errors.push(message.to_string());
        }
    }

    /// A client whose requests can never succeed, to prove validation runs
    /// before any network call.
    fn offline_service() -> ProductService<MemoryStorage> {
        ProductService::new(ApiClient::new(
            reqwest::Client::new(),
            "http://127.0.0.1:9",
            MemoryStorage::new(),
        ))
    }

    fn product(id: &str, stock: u32, min_stock: u32) -> Product {
        Product {
            id: ProductId::new(id),
            name: format!("Producto {id}"),
            price: Price::from_units(2),
            stock,
            min_stock,
            ..Product::default()
        }
    }

    #[tokio::test]
    async fn test_create_invalid_product_reports_validation_error() {
        let mut controller =
            ProductController::new(offline_service(), ProductState::default(), Recorder::default());

        let err = controller.create_product(&Product::default()).await.unwrap_err();

        assert_eq!(err.message, "Nombre y precio válido son requeridos");
        assert!(!err.session_expired);
        assert!(controller.products().is_empty());
        let (_, hooks) = controller.into_parts();
        assert_eq!(
            hooks.errors,
            vec!["Error al crear producto: Nombre y precio válido son requeridos"]
        );
    }

    #[tokio::test]
    async fn test_update_invalid_product_never_touches_cache() {
        let state = ProductState {
            products: vec![product("1", 3, 5)],
            filter: String::new(),
        };
        let mut controller = ProductController::new(offline_service(), state.clone(), ());

        let invalid = Product {
            price: Price::ZERO,
            ..product("1", 3, 5)
        };
        assert!(controller.update_product(&ProductId::new("1"), &invalid).await.is_err());
        assert_eq!(controller.products(), state.products.as_slice());
    }

    #[test]
    fn test_low_stock_products() {
        let state = ProductState {
            products: vec![product("1", 5, 5), product("2", 6, 5), product("3", 0, 0)],
            filter: String::new(),
        };
        let controller = ProductController::new(offline_service(), state, ());

        let ids: Vec<&str> = controller
            .low_stock_products()
            .iter()
            .map(|p| p.id.as_str())
            .collect();
        assert_eq!(ids, vec!["1", "3"]);
    }
}
