//! Point-of-sale routes. Every handler answers with the `#ventas-content`
//! fragment.

use axum::{Form, extract::State};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use poscore_core::{PaymentMethod, ProductId};

use super::context::{PageContext, sales_model, settle};
use crate::app::PageState;
use crate::controllers::SalesController;
use crate::error::{Result, add_breadcrumb};
use crate::middleware::RequireAuth;
use crate::state::AppState;
use crate::views::ViewEvents;
use crate::views::sections::SalesFragment;

/// A cart line change.
#[derive(Debug, Deserialize)]
pub struct CartLineForm {
    pub product_id: String,
    /// Text so that a blank input reaches the cart as an invalid quantity.
    #[serde(default)]
    pub quantity: String,
}

impl CartLineForm {
    fn product_id(&self) -> ProductId {
        ProductId::new(self.product_id.as_str())
    }

    /// Unparsable quantities become zero, which the cart rejects.
    fn quantity(&self) -> u32 {
        self.quantity.trim().parse().unwrap_or(0)
    }
}

#[derive(Debug, Deserialize)]
pub struct RemoveForm {
    pub product_id: String,
}

#[derive(Debug, Deserialize)]
pub struct CheckoutForm {
    pub metodo_pago: PaymentMethod,
}

type Controller = SalesController<Session, ViewEvents>;

/// Load the visit's sales state into a controller.
async fn begin(ctx: &PageContext) -> (PageState, Controller) {
    let mut page = ctx.page().await;
    let controller = ctx.sales_controller(std::mem::take(&mut page.sales));
    (page, controller)
}

/// Store the controller's state and render the section.
async fn finish(ctx: &PageContext, mut page: PageState, controller: Controller) -> Result<SalesFragment> {
    let (sales, mut events) = controller.into_parts();
    page.sales = sales;
    ctx.save_page(&page).await?;

    Ok(SalesFragment {
        notifications: events.take(),
        sales: sales_model(&page.sales),
    })
}

#[instrument(skip(state, session))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(_): RequireAuth,
    Form(form): Form<CartLineForm>,
) -> Result<SalesFragment> {
    let ctx = PageContext::new(state, session);
    let (page, mut controller) = begin(&ctx).await;

    controller.add_product_by_id(&form.product_id(), form.quantity());

    finish(&ctx, page, controller).await
}

#[instrument(skip(state, session))]
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(_): RequireAuth,
    Form(form): Form<CartLineForm>,
) -> Result<SalesFragment> {
    let ctx = PageContext::new(state, session);
    let (page, mut controller) = begin(&ctx).await;

    controller.update_quantity(&form.product_id(), form.quantity());

    finish(&ctx, page, controller).await
}

#[instrument(skip(state, session))]
pub async fn remove(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(_): RequireAuth,
    Form(form): Form<RemoveForm>,
) -> Result<SalesFragment> {
    let ctx = PageContext::new(state, session);
    let (page, mut controller) = begin(&ctx).await;

    controller.remove_from_cart(&ProductId::new(form.product_id));

    finish(&ctx, page, controller).await
}

#[instrument(skip_all)]
pub async fn clear(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(_): RequireAuth,
) -> Result<SalesFragment> {
    let ctx = PageContext::new(state, session);
    let (page, mut controller) = begin(&ctx).await;

    controller.clear_cart();

    finish(&ctx, page, controller).await
}

/// Submit the cart as a sale by the logged-in user.
#[instrument(skip(state, session, user))]
pub async fn checkout(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
    Form(form): Form<CheckoutForm>,
) -> Result<SalesFragment> {
    let ctx = PageContext::new(state, session);
    let (page, mut controller) = begin(&ctx).await;

    controller.set_payment_method(form.metodo_pago);
    if let Some(sale) = settle(controller.process_sale(user.id.clone()).await)? {
        add_breadcrumb("sales", "Sale processed", Some(&[("sale_id", sale.id.as_str())]));
    }

    finish(&ctx, page, controller).await
}
