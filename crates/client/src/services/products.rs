//! Product and inventory service.

use serde::Serialize;
use serde_json::Value;
use tracing::instrument;

use poscore_core::ProductId;

use super::Result;
use crate::api::ApiClient;
use crate::models::Product;
use crate::storage::Storage;

/// Body of `PATCH /inventory/product/{id}/stock`.
#[derive(Debug, Serialize)]
struct StockUpdate {
    stock: u32,
}

/// CRUD over `/products` plus stock adjustments.
#[derive(Debug, Clone)]
pub struct ProductService<S> {
    api: ApiClient<S>,
}

impl<S: Storage> ProductService<S> {
    pub const fn new(api: ApiClient<S>) -> Self {
        Self { api }
    }

    /// Fetch every product.
    ///
    /// # Errors
    ///
    /// Propagates API failures.
    #[instrument(skip(self))]
    pub async fn get_products(&self) -> Result<Vec<Product>> {
        let products: Option<Vec<Product>> = self.api.get("/products").await?;
        Ok(products.unwrap_or_default())
    }

    /// Fetch one product.
    ///
    /// # Errors
    ///
    /// Propagates API failures.
    #[instrument(skip(self))]
    pub async fn get_product(&self, id: &ProductId) -> Result<Product> {
        Ok(self.api.get(&format!("/products/{id}")).await?)
    }

    /// Validate and create a product.
    ///
    /// # Errors
    ///
    /// Fails with a validation error before any request is made if the
    /// product is invalid.
    #[instrument(skip(self, product), fields(name = %product.name))]
    pub async fn create_product(&self, product: &Product) -> Result<Product> {
        product.validate()?;
        Ok(self.api.post("/products", product).await?)
    }

    /// Validate and replace a product.
    ///
    /// # Errors
    ///
    /// Fails with a validation error before any request is made if the
    /// product is invalid.
    #[instrument(skip(self, product))]
    pub async fn update_product(&self, id: &ProductId, product: &Product) -> Result<Product> {
        product.validate()?;
        Ok(self.api.put(&format!("/products/{id}"), product).await?)
    }

    /// Delete a product. Returns the raw API response.
    ///
    /// # Errors
    ///
    /// Propagates API failures.
    #[instrument(skip(self))]
    pub async fn delete_product(&self, id: &ProductId) -> Result<Value> {
        Ok(self.api.delete(&format!("/products/{id}")).await?)
    }

    /// Set the stock count of a product. Returns the raw API response.
    ///
    /// # Errors
    ///
    /// Propagates API failures.
    #[instrument(skip(self))]
    pub async fn update_stock(&self, id: &ProductId, stock: u32) -> Result<Value> {
        Ok(self
            .api
            .patch(&format!("/inventory/product/{id}/stock"), &StockUpdate { stock })
            .await?)
    }

    /// Case-insensitive substring search over name, category and SKU.
    ///
    /// The API has no search endpoint: the full list is fetched and filtered
    /// locally.
    ///
    /// # Errors
    ///
    /// Propagates API failures.
    #[instrument(skip(self))]
    pub async fn search_products(&self, query: &str) -> Result<Vec<Product>> {
        let products = self.get_products().await?;
        Ok(filter_products(products, query))
    }
}

/// Keep the products matching `query`. An empty query keeps everything.
#[must_use]
pub fn filter_products(products: Vec<Product>, query: &str) -> Vec<Product> {
    let needle = query.to_lowercase();
    products
        .into_iter()
        .filter(|product| product.matches(&needle))
        .collect()
}

#[cfg(test)]
mod tests {
    use poscore_core::Price;

    use super::*;

    fn product(name: &str, category: &str, sku: &str) -> Product {
        Product {
            name: name.to_string(),
            category: category.to_string(),
            sku: sku.to_string(),
            price: Price::from_units(1),
            ..Product::default()
        }
    }

    #[test]
    fn test_filter_products_case_insensitive() {
        let products = vec![
            product("Leche Entera", "Lacteos", "LAC-1"),
            product("Pan Blanco", "Panaderia", "PAN-1"),
            product("Yogur", "LACTEOS", "LAC-2"),
        ];

        assert_eq!(filter_products(products.clone(), "LACTEOS").len(), 2);

        assert_eq!(filter_products(products.clone(), "pan-").len(), 1);
        assert_eq!(filter_products(products.clone(), "").len(), 3);
        assert!(filter_products(products, "cafe").is_empty());
    }
}
