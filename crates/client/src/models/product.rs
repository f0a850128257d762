//! Product model.

use serde::{Deserialize, Serialize};

use poscore_core::{Price, ProductId};

use super::ModelError;

/// Stock threshold applied when the API does not send one.
pub const DEFAULT_MIN_STOCK: u32 = 5;

/// A product as exposed by the inventory API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "ProductRecord")]
pub struct Product {
    pub id: ProductId,
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "descripcion")]
    pub description: String,
    #[serde(rename = "precio")]
    pub price: Price,
    pub stock: u32,
    #[serde(rename = "stock_minimo")]
    pub min_stock: u32,
    #[serde(rename = "categoria")]
    pub category: String,
    #[serde(rename = "proveedor")]
    pub supplier: String,
    pub sku: String,
    #[serde(rename = "activo")]
    pub active: bool,
}

impl Default for Product {
    fn default() -> Self {
        Self {
            id: ProductId::default(),
            name: String::new(),
            description: String::new(),
            price: Price::ZERO,
            stock: 0,
            min_stock: DEFAULT_MIN_STOCK,
            category: String::new(),
            supplier: String::new(),
            sku: String::new(),
            active: true,
        }
    }
}

impl Product {
    /// Check the invariants enforced on create and update.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidProduct`] if the name is blank or the
    /// price is not strictly positive.
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.name.trim().is_empty() || !self.price.is_positive() {
            return Err(ModelError::InvalidProduct);
        }
        Ok(())
    }

    /// Whether stock has fallen to or below the minimum threshold.
    #[must_use]
    pub const fn is_low_stock(&self) -> bool {
        self.stock <= self.min_stock
    }

    /// Case-insensitive substring match over name, category and SKU.
    ///
    /// `needle` must already be lowercase.
    #[must_use]
    pub fn matches(&self, needle: &str) -> bool {
        [&self.name, &self.category, &self.sku]
            .iter()
            .any(|field| field.to_lowercase().contains(needle))
    }
}

/// Lenient wire shape: every field is optional and `null` counts as missing.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ProductRecord {
    id: Option<ProductId>,
    nombre: Option<String>,
    descripcion: Option<String>,
    precio: Option<Price>,
    stock: Option<u32>,
    stock_minimo: Option<u32>,
    categoria: Option<String>,
    proveedor: Option<String>,
    sku: Option<String>,
    activo: Option<bool>,
}

impl From<ProductRecord> for Product {
    fn from(record: ProductRecord) -> Self {
        let defaults = Self::default();
        Self {
            id: record.id.unwrap_or(defaults.id),
            name: record.nombre.unwrap_or(defaults.name),
            description: record.descripcion.unwrap_or(defaults.description),
            price: record.precio.unwrap_or(defaults.price),
            stock: record.stock.unwrap_or(defaults.stock),
            min_stock: record.stock_minimo.unwrap_or(defaults.min_stock),
            category: record.categoria.unwrap_or(defaults.category),
            supplier: record.proveedor.unwrap_or(defaults.supplier),
            sku: record.sku.unwrap_or(defaults.sku),
            active: record.activo.unwrap_or(defaults.active),
        }
    }
}
