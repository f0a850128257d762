//! Sales, inventory and reports sections of the dashboard shell.

use askama::Template;
use askama_web::WebTemplate;

use poscore_core::PaymentMethod;

use crate::app::Notification;
use crate::models::{Cart, Product};
use crate::services::SalesStats;

/// Product as displayed in tables and forms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductRow {
    pub id: String,
    pub name: String,
    pub description: String,
    pub category: String,
    pub supplier: String,
    pub sku: String,
    /// Formatted for display, e.g. `$10.50`.
    pub price: String,
    /// Plain decimal for form inputs, e.g. `10.50`.
    pub price_input: String,
    pub stock: u32,
    pub min_stock: u32,
    pub low_stock: bool,
    pub active: bool,
}

impl From<&Product> for ProductRow {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.to_string(),
            name: product.name.clone(),
            description: product.description.clone(),
            category: product.category.clone(),
            supplier: product.supplier.clone(),
            sku: product.sku.clone(),
            price: product.price.to_string(),
            price_input: product.price.amount().to_string(),
            stock: product.stock,
            min_stock: product.min_stock,
            low_stock: product.is_low_stock(),
            active: product.active,
        }
    }
}

fn rows<'a>(products: impl IntoIterator<Item = &'a Product>) -> Vec<ProductRow> {
    products.into_iter().map(ProductRow::from).collect()
}

/// A cart line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartRow {
    pub product_id: String,
    pub name: String,
    pub quantity: u32,
    pub max_quantity: u32,
    pub unit_price: String,
    pub subtotal: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartModel {
    pub rows: Vec<CartRow>,
    pub total: String,
    pub unit_count: u32,
}

impl CartModel {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl From<&Cart> for CartModel {
    fn from(cart: &Cart) -> Self {
        Self {
            rows: cart
                .items()
                .iter()
                .map(|item| CartRow {
                    product_id: item.product.id.to_string(),
                    name: item.product.name.clone(),
                    quantity: item.quantity,
                    max_quantity: item.product.stock,
                    unit_price: item.product.price.to_string(),
                    subtotal: item.subtotal.to_string(),
                })
                .collect(),
            total: cart.total().to_string(),
            unit_count: cart.unit_count(),
        }
    }
}

/// A payment method choice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentOption {
    pub value: &'static str,
    pub label: &'static str,
    pub selected: bool,
}

#[must_use]
pub const fn payment_label(method: PaymentMethod) -> &'static str {
    match method {
        PaymentMethod::Cash => "Efectivo",
        PaymentMethod::Card => "Tarjeta",
        PaymentMethod::Transfer => "Transferencia",
    }
}

/// Point-of-sale section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SalesModel {
    pub products: Vec<ProductRow>,
    pub cart: CartModel,
    pub payment_options: Vec<PaymentOption>,
}

impl SalesModel {
    #[must_use]
    pub fn new(products: &[Product], cart: &Cart, payment_method: PaymentMethod) -> Self {
        Self {
            products: rows(products.iter().filter(|p| p.active)),
            cart: CartModel::from(cart),
            payment_options: PaymentMethod::ALL
                .into_iter()
                .map(|method| PaymentOption {
                    value: method.as_str(),
                    label: payment_label(method),
                    selected: method == payment_method,
                })
                .collect(),
        }
    }
}

/// Inventory section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InventoryModel {
    pub products: Vec<ProductRow>,
    pub filter: String,
    pub low_stock_count: usize,
}

impl InventoryModel {
    /// `products` is what the table shows (possibly filtered); `all` drives
    /// the low-stock counter.
    #[must_use]
    pub fn new(products: &[Product], all: &[Product], filter: &str) -> Self {
        Self {
            products: rows(products),
            filter: filter.to_string(),
            low_stock_count: all.iter().filter(|p| p.is_low_stock()).count(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HourRow {
    pub label: String,
    pub revenue: String,
    pub transactions: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodRow {
    pub label: &'static str,
    pub count: usize,
}

/// Reports section.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ReportsModel {
    pub available: bool,
    pub total_sales: usize,
    pub total_revenue: String,
    pub hours: Vec<HourRow>,
    pub methods: Vec<MethodRow>,
}

impl ReportsModel {
    /// `None` renders an "unavailable" notice.
    #[must_use]
    pub fn new(stats: Option<&SalesStats>) -> Self {
        let Some(stats) = stats else {
            return Self::default();
        };
        Self {
            available: true,
            total_sales: stats.total_sales,
            total_revenue: stats.total_revenue.to_string(),
            hours: stats
                .hourly
                .iter()
                .map(|hour| HourRow {
                    label: hour.label(),
                    revenue: hour.revenue.to_string(),
                    transactions: hour.transactions,
                })
                .collect(),
            methods: stats
                .payment_methods
                .iter()
                .map(|(method, count)| MethodRow {
                    label: payment_label(*method),
                    count: *count,
                })
                .collect(),
        }
    }
}

/// `#ventas-content` fragment.
#[derive(Template, WebTemplate)]
#[template(path = "fragments/sales.html")]
pub struct SalesFragment {
    pub notifications: Vec<Notification>,
    pub sales: SalesModel,
}

/// `#inventario-content` fragment.
#[derive(Template, WebTemplate)]
#[template(path = "fragments/inventory.html")]
pub struct InventoryFragment {
    pub notifications: Vec<Notification>,
    pub inventory: InventoryModel,
}

/// Low-stock list fragment.
#[derive(Template, WebTemplate)]
#[template(path = "partials/low_stock.html")]
pub struct LowStockFragment {
    pub products: Vec<ProductRow>,
}

impl LowStockFragment {
    #[must_use]
    pub fn new(products: &[&Product]) -> Self {
        Self {
            products: rows(products.iter().copied()),
        }
    }
}

/// `#reportes-content` fragment.
#[derive(Template, WebTemplate)]
#[template(path = "fragments/reports.html")]
pub struct ReportsFragment {
    pub notifications: Vec<Notification>,
    pub reports: ReportsModel,
}
