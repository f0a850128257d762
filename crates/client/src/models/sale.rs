//! Sale model.

use chrono::{DateTime, Local, NaiveDateTime};
use serde::{Deserialize, Serialize};

use poscore_core::{PaymentMethod, Price, ProductId, SaleId, SaleStatus, UserId};

use super::{ModelError, Product};

/// Wire format used when sending timestamps.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// One line of a sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "SaleItemRecord")]
pub struct SaleItem {
    #[serde(rename = "producto_id")]
    pub product_id: ProductId,
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "cantidad")]
    pub quantity: u32,
    #[serde(rename = "precio_unitario")]
    pub unit_price: Price,
    pub subtotal: Price,
}

impl SaleItem {
    /// Build a line for `quantity` units of `product` at its current price.
    #[must_use]
    pub fn new(product: &Product, quantity: u32) -> Self {
        Self {
            product_id: product.id.clone(),
            name: product.name.clone(),
            quantity,
            unit_price: product.price,
            subtotal: product.price.times(quantity),
        }
    }
}

/// A sale (ticket) as exposed by the sales API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "SaleRecord")]
pub struct Sale {
    pub id: SaleId,
    /// Store wall-clock time of the sale.
    #[serde(rename = "fecha", serialize_with = "serialize_timestamp")]
    pub date: NaiveDateTime,
    pub total: Price,
    #[serde(rename = "metodo_pago")]
    pub payment_method: PaymentMethod,
    #[serde(rename = "estado")]
    pub status: SaleStatus,
    #[serde(rename = "usuario_id")]
    pub user_id: UserId,
    #[serde(rename = "productos")]
    pub items: Vec<SaleItem>,
}

impl Default for Sale {
    fn default() -> Self {
        Self {
            id: SaleId::default(),
            date: Local::now().naive_local(),
            total: Price::ZERO,
            payment_method: PaymentMethod::default(),
            status: SaleStatus::default(),
            user_id: UserId::default(),
            items: Vec::new(),
        }
    }
}

impl Sale {
    /// Append a line for `product` and recompute the total.
    pub fn add_product(&mut self, product: &Product, quantity: u32) {
        self.items.push(SaleItem::new(product, quantity));
        self.calculate_total();
    }

    /// Recompute the total as the sum of line subtotals.
    pub fn calculate_total(&mut self) {
        self.total = self.items.iter().map(|item| item.subtotal).sum();
    }

    /// A sale must carry at least one line before it is submitted.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::EmptySale`] when there are no line items.
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.items.is_empty() {
            return Err(ModelError::EmptySale);
        }
        Ok(())
    }

    /// The body sent to `POST /sales`.
    #[must_use]
    pub fn payload(&self) -> SalePayload<'_> {
        SalePayload {
            items: &self.items,
            total: self.total,
            payment_method: self.payment_method,
            user_id: &self.user_id,
        }
    }
}

/// Request body for creating a sale.
#[derive(Debug, Serialize)]
pub struct SalePayload<'a> {
    #[serde(rename = "productos")]
    pub items: &'a [SaleItem],
    pub total: Price,
    #[serde(rename = "metodo_pago")]
    pub payment_method: PaymentMethod,
    #[serde(rename = "usuario_id")]
    pub user_id: &'a UserId,
}

fn serialize_timestamp<S: serde::Serializer>(
    date: &NaiveDateTime,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_str(&date.format(TIMESTAMP_FORMAT))
}

/// Parse an API timestamp, with or without a UTC offset.
///
/// Offsets are dropped after conversion so the hour matches the store's
/// local clock as reported by the API.
fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    if let Ok(with_offset) = DateTime::parse_from_rfc3339(raw) {
        return Some(with_offset.naive_local());
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()
}

/// Lenient wire shape: every field is optional and `null` counts as missing.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SaleRecord {
    id: Option<SaleId>,
    #[serde(alias = "fecha_creacion")]
    fecha: Option<String>,
    total: Option<Price>,
    metodo_pago: Option<PaymentMethod>,
    estado: Option<SaleStatus>,
    usuario_id: Option<UserId>,
    #[serde(alias = "detalles")]
    productos: Option<Vec<SaleItem>>,
}

impl From<SaleRecord> for Sale {
    fn from(record: SaleRecord) -> Self {
        let defaults = Self::default();
        Self {
            id: record.id.unwrap_or(defaults.id),
            date: record
                .fecha
                .as_deref()
                .and_then(parse_timestamp)
                .unwrap_or(defaults.date),
            total: record.total.unwrap_or(defaults.total),
            payment_method: record.metodo_pago.unwrap_or(defaults.payment_method),
            status: record.estado.unwrap_or(defaults.status),
            user_id: record.usuario_id.unwrap_or(defaults.user_id),
            items: record.productos.unwrap_or(defaults.items),
        }
    }
}

/// Lenient line shape. The API's `detalles` omit `nombre` and `subtotal`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SaleItemRecord {
    producto_id: Option<ProductId>,
    nombre: Option<String>,
    cantidad: Option<u32>,
    precio_unitario: Option<Price>,
    subtotal: Option<Price>,
}

impl From<SaleItemRecord> for SaleItem {
    fn from(record: SaleItemRecord) -> Self {
        let quantity = record.cantidad.unwrap_or_default();
        let unit_price = record.precio_unitario.unwrap_or(Price::ZERO);
        Self {
            product_id: record.producto_id.unwrap_or_default(),
            name: record.nombre.unwrap_or_default(),
            quantity,
            unit_price,
            subtotal: record
                .subtotal
                .unwrap_or_else(|| unit_price.times(quantity)),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Timelike;
    use serde_json::json;

    use super::*;

    fn product(id: &str, price: i64) -> Product {
        Product {
            id: ProductId::new(id),
            name: format!("Producto {id}"),
            price: Price::from_units(price),
            stock: 10,
            ..Product::default()
        }
    }

    #[test]
    fn test_add_product_recomputes_total() {
        let mut sale = Sale::default();
        sale.add_product(&product("1", 10), 3);
        assert_eq!(sale.total, Price::from_units(30));

        sale.add_product(&product("2", 4), 2);
        assert_eq!(sale.total, Price::from_units(38));
        assert_eq!(sale.items.len(), 2);
    }

    #[test]
    fn test_validate_requires_items() {
        let mut sale = Sale::default();
        assert_eq!(sale.validate(), Err(ModelError::EmptySale));
        sale.add_product(&product("1", 1), 1);
        assert!(sale.validate().is_ok());
    }

    #[test]
    fn test_payload_only_carries_submission_fields() {
        let mut sale = Sale {
            user_id: UserId::new("u1"),
            payment_method: PaymentMethod::Card,
            ..Sale::default()
        };
        sale.add_product(&product("1", 10), 2);

        let value = serde_json::to_value(sale.payload()).unwrap();
        let object = value.as_object().unwrap();
        assert_eq!(object.len(), 4);
        assert_eq!(value["metodo_pago"], "tarjeta");
        assert_eq!(value["usuario_id"], "u1");
        assert_eq!(value["total"], 20.0);
        assert_eq!(value["productos"][0]["producto_id"], "1");
        assert_eq!(value["productos"][0]["cantidad"], 2);
    }

    #[test]
    fn test_deserialize_fills_defaults_and_parses_dates() {
        let sale: Sale = serde_json::from_value(json!({
            "id": "s1",
            "fecha_creacion": "2025-03-01T14:05:00.123456",
            "total": 12,
            "detalles": [
                {"producto_id": "p1", "cantidad": 1, "precio_unitario": 12, "subtotal": 12}
            ]
        }))
        .unwrap();

        assert_eq!(sale.id.as_str(), "s1");
        assert_eq!(sale.date.hour(), 14);
        assert_eq!(sale.payment_method, PaymentMethod::Cash);
        assert_eq!(sale.status, SaleStatus::Completed);
        assert_eq!(sale.items.len(), 1);
        assert_eq!(sale.items[0].name, "");
    }

    #[test]
    fn test_backend_detail_lines_derive_subtotal() {
        let sale: Sale = serde_json::from_value(json!({
            "id": "s7",
            "total": 21,
            "detalles": [
                {"producto_id": "p1", "cantidad": 2, "precio_unitario": 10.5, "sku": "LEC-1"},
                {"producto_id": "p2", "cantidad": 1, "precio_unitario": "3", "subtotal": null}
            ]
        }))
        .unwrap();

        assert_eq!(sale.items.len(), 2);
        assert_eq!(sale.items[0].product_id.as_str(), "p1");
        assert_eq!(sale.items[0].quantity, 2);
        assert_eq!(sale.items[0].subtotal, Price::from_units(21));
        assert_eq!(sale.items[1].subtotal, Price::from_units(3));
    }

    #[test]
    fn test_parse_timestamp_with_offset_keeps_wall_clock() {
        let parsed = parse_timestamp("2025-03-01T09:30:00-05:00").unwrap();
        assert_eq!(parsed.hour(), 9);
        assert!(parse_timestamp("yesterday").is_none());
    }
}
