//! Inventory routes. Every handler answers with the `#inventario-content`
//! fragment, except the low-stock list which has its own target.

use axum::{
    Form,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use poscore_core::{Price, ProductId};

use super::context::{PageContext, inventory_model, settle};
use crate::app::{Notification, PageState};
use crate::controllers::ProductController;
use crate::error::Result;
use crate::middleware::RequireAuth;
use crate::models::Product;
use crate::models::product::DEFAULT_MIN_STOCK;
use crate::state::AppState;
use crate::views::ViewEvents;
use crate::views::sections::{InventoryFragment, InventoryModel, LowStockFragment};

/// Search query.
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

/// Create and edit form fields. Numbers arrive as text so that a blank
/// input falls back to a default instead of rejecting the whole form.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ProductForm {
    pub nombre: String,
    pub descripcion: String,
    pub precio: String,
    pub stock: String,
    pub stock_minimo: String,
    pub categoria: String,
    pub proveedor: String,
    pub sku: String,
    /// Present only when the checkbox is ticked.
    pub activo: Option<String>,
}

impl ProductForm {
    /// Build the product to send. An unparsable price becomes zero, which
    /// product validation then rejects.
    #[must_use]
    pub fn into_product(self, id: ProductId) -> Product {
        Product {
            id,
            name: self.nombre.trim().to_string(),
            description: self.descripcion.trim().to_string(),
            price: self.precio.parse().unwrap_or(Price::ZERO),
            stock: self.stock.trim().parse().unwrap_or(0),
            min_stock: self.stock_minimo.trim().parse().unwrap_or(DEFAULT_MIN_STOCK),
            category: self.categoria.trim().to_string(),
            supplier: self.proveedor.trim().to_string(),
            sku: self.sku.trim().to_string(),
            active: self.activo.is_some(),
        }
    }
}

/// Stock adjustment form.
#[derive(Debug, Default, Deserialize)]
pub struct StockForm {
    #[serde(default)]
    pub stock: String,
}

type Controller = ProductController<Session, ViewEvents>;

/// Store the controller's state and render the section.
async fn finish(ctx: &PageContext, mut page: PageState, controller: Controller) -> Result<InventoryFragment> {
    let (inventory, mut events) = controller.into_parts();
    page.inventory = inventory;
    ctx.save_page(&page).await?;

    Ok(InventoryFragment {
        notifications: events.take(),
        inventory: inventory_model(&page.inventory),
    })
}

/// Search (or list, with an empty query) the inventory.
#[instrument(skip(state, session))]
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(_): RequireAuth,
    Query(query): Query<SearchQuery>,
) -> Result<InventoryFragment> {
    let ctx = PageContext::new(state, session);
    let mut page = ctx.page().await;
    let query = query.q.trim().to_string();

    let mut controller = ctx.product_controller(std::mem::take(&mut page.inventory));
    let found = settle(controller.search_products(&query).await)?;
    let (mut inventory, mut events) = controller.into_parts();

    let notifications = events.take();
    let model = match found {
        Some(found) => {
            if query.is_empty() {
                inventory.products.clone_from(&found);
            }
            InventoryModel::new(&found, &inventory.products, &query)
        }
        None => inventory_model(&inventory),
    };

    page.inventory = inventory;
    ctx.save_page(&page).await?;

    Ok(InventoryFragment {
        notifications,
        inventory: model,
    })
}

/// Products at or below their minimum stock.
#[instrument(skip_all)]
pub async fn low_stock(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(_): RequireAuth,
) -> LowStockFragment {
    let ctx = PageContext::new(state, session);
    let page = ctx.page().await;
    let controller = ctx.product_controller(page.inventory);

    LowStockFragment::new(&controller.low_stock_products())
}

#[instrument(skip(state, session))]
pub async fn create(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(_): RequireAuth,
    Form(form): Form<ProductForm>,
) -> Result<InventoryFragment> {
    let ctx = PageContext::new(state, session);
    let mut page = ctx.page().await;
    let mut controller = ctx.product_controller(std::mem::take(&mut page.inventory));

    settle(
        controller
            .create_product(&form.into_product(ProductId::default()))
            .await,
    )?;

    finish(&ctx, page, controller).await
}

#[instrument(skip(state, session))]
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(_): RequireAuth,
    Path(id): Path<String>,
    Form(form): Form<ProductForm>,
) -> Result<InventoryFragment> {
    let ctx = PageContext::new(state, session);
    let mut page = ctx.page().await;
    let mut controller = ctx.product_controller(std::mem::take(&mut page.inventory));

    let id = ProductId::new(id);
    settle(
        controller
            .update_product(&id, &form.into_product(id.clone()))
            .await,
    )?;

    finish(&ctx, page, controller).await
}

#[instrument(skip(state, session))]
pub async fn delete(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(_): RequireAuth,
    Path(id): Path<String>,
) -> Result<InventoryFragment> {
    let ctx = PageContext::new(state, session);
    let mut page = ctx.page().await;
    let mut controller = ctx.product_controller(std::mem::take(&mut page.inventory));

    settle(controller.delete_product(&ProductId::new(id)).await)?;

    finish(&ctx, page, controller).await
}

#[instrument(skip(state, session))]
pub async fn update_stock(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(_): RequireAuth,
    Path(id): Path<String>,
    Form(form): Form<StockForm>,
) -> Result<InventoryFragment> {
    let ctx = PageContext::new(state, session);
    let mut page = ctx.page().await;
    let mut controller = ctx.product_controller(std::mem::take(&mut page.inventory));

    match form.stock.trim().parse::<u32>() {
        Ok(stock) => {
            settle(controller.update_stock(&ProductId::new(id), stock).await)?;
        }
        Err(_) => controller
            .hooks_mut()
            .push(Notification::error("Stock invalido")),
    }

    finish(&ctx, page, controller).await
}
