//! Full-page routes: the login page and the dashboard shell.

use axum::{
    extract::State,
    http::Uri,
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;
use tracing::instrument;

use super::context::{PageContext, settle, workspace};
use crate::app::{PageState, Route, Section};
use crate::controllers::{ProductState, SalesState};
use crate::error::{AppError, Result};
use crate::state::AppState;
use crate::views::LOGIN_PATH;
use crate::views::dashboard::ShellPage;
use crate::views::login::LoginPage;

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check the POS API.
pub async fn health() -> &'static str {
    "ok"
}

/// Serve the page selected by the request path.
///
/// `login.html` shows the login form; `index.html` or the root show the
/// dashboard to authenticated visitors.
#[instrument(skip(state, session))]
pub async fn page(State(state): State<AppState>, session: Session, uri: Uri) -> Result<Response> {
    let ctx = PageContext::new(state, session);

    match Route::from_path(uri.path()) {
        Route::Login => Ok(LoginPage {
            theme: ctx.theme().await,
            username: String::new(),
            message: None,
        }
        .into_response()),
        Route::Dashboard => dashboard(&ctx).await,
        Route::NotFound => Err(AppError::NotFound(uri.path().to_string())),
    }
}

/// Start a new visit: fresh product lists, empty cart, today's statistics.
async fn dashboard(ctx: &PageContext) -> Result<Response> {
    let auth = ctx.auth_controller();
    if !auth.check_auth().await {
        return Ok(Redirect::to(LOGIN_PATH).into_response());
    }
    let Some(user) = auth.current_user().await else {
        return Ok(Redirect::to(LOGIN_PATH).into_response());
    };

    ctx.app().reset_page().await?;

    let mut sales = ctx.sales_controller(SalesState::default());
    settle(sales.initialize().await)?;
    let stats = settle(sales.get_stats().await)?;
    let (sales_state, mut sales_events) = sales.into_parts();

    let mut inventory = ctx.product_controller(ProductState::default());
    settle(inventory.load_products().await.map(|_| ()))?;
    let (inventory_state, mut inventory_events) = inventory.into_parts();

    let page = PageState {
        section: Section::Dashboard,
        sales: sales_state,
        inventory: inventory_state,
        stats,
    };
    ctx.save_page(&page).await?;

    let mut notifications = sales_events.take();
    notifications.extend(inventory_events.take());

    tracing::info!(
        products = page.sales.products.len(),
        "Dashboard loaded"
    );

    Ok(ShellPage::new(
        ctx.theme().await,
        &user,
        workspace(&page, &user, notifications),
    )
    .into_response())
}
