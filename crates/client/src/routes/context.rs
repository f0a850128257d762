//! Per-request wiring shared by the route handlers.
//!
//! Every handler works on one visitor: their session backs the API token,
//! the theme and the page state, and controllers are rebuilt from that state
//! on each request.

use axum::http::HeaderMap;
use tower_sessions::Session;

use crate::app::{Notification, PageState, PosApp};
use crate::controllers::{
    ActionResult, AuthController, ProductController, ProductState, SalesController, SalesState,
};
use crate::error::{AppError, Result};
use crate::models::{Product, User};
use crate::services::products::filter_products;
use crate::services::{AuthService, ProductService, SalesService};
use crate::state::AppState;
use crate::views::ViewEvents;
use crate::views::dashboard::{DashboardModel, Workspace, nav_items};
use crate::views::sections::{InventoryModel, ReportsModel, SalesModel};

/// Header set by the client script on fragment requests.
pub const HX_REQUEST: &str = "hx-request";
/// Response header telling the client script to navigate.
pub const HX_REDIRECT: &str = "hx-redirect";

/// Whether the request came from the client script rather than a plain
/// form submit or page load.
#[must_use]
pub fn is_fragment_request(headers: &HeaderMap) -> bool {
    headers
        .get(HX_REQUEST)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.eq_ignore_ascii_case("true"))
}

/// Split a controller result into its three outcomes.
///
/// A failure has already been reported to the view through the hooks, so
/// it becomes `None`. An expired session is escalated instead: the page
/// cannot continue without credentials.
///
/// # Errors
///
/// Returns [`AppError::SessionExpired`] when the API rejected the token.
pub fn settle<T>(result: ActionResult<T>) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(e) if e.session_expired => Err(AppError::SessionExpired),
        Err(_) => Ok(None),
    }
}

/// One visitor's view of the application.
pub struct PageContext {
    state: AppState,
    session: Session,
    app: PosApp<Session>,
}

impl PageContext {
    #[must_use]
    pub fn new(state: AppState, session: Session) -> Self {
        Self {
            app: PosApp::new(session.clone()),
            state,
            session,
        }
    }

    #[must_use]
    pub const fn app(&self) -> &PosApp<Session> {
        &self.app
    }

    pub async fn page(&self) -> PageState {
        self.app.page().await
    }

    /// # Errors
    ///
    /// Returns an error if the session cannot be written.
    pub async fn save_page(&self, page: &PageState) -> Result<()> {
        Ok(self.app.save_page(page).await?)
    }

    pub async fn theme(&self) -> &'static str {
        self.app.theme().await.as_str()
    }

    #[must_use]
    pub fn auth_controller(&self) -> AuthController<Session, ViewEvents> {
        AuthController::new(
            AuthService::new(self.state.api(self.session.clone())),
            ViewEvents::new(),
        )
    }

    #[must_use]
    pub fn product_controller(&self, state: ProductState) -> ProductController<Session, ViewEvents> {
        ProductController::new(
            ProductService::new(self.state.api(self.session.clone())),
            state,
            ViewEvents::new(),
        )
    }

    #[must_use]
    pub fn sales_controller(&self, state: SalesState) -> SalesController<Session, ViewEvents> {
        let api = self.state.api(self.session.clone());
        SalesController::new(
            SalesService::new(api.clone()),
            ProductService::new(api),
            state,
            ViewEvents::new(),
        )
    }
}

/// Products the inventory table shows: the cached list, narrowed by the
/// active filter.
#[must_use]
pub fn visible_products(inventory: &ProductState) -> Vec<Product> {
    if inventory.filter.is_empty() {
        inventory.products.clone()
    } else {
        filter_products(inventory.products.clone(), &inventory.filter)
    }
}

#[must_use]
pub fn inventory_model(inventory: &ProductState) -> InventoryModel {
    InventoryModel::new(
        &visible_products(inventory),
        &inventory.products,
        &inventory.filter,
    )
}

#[must_use]
pub fn sales_model(sales: &SalesState) -> SalesModel {
    SalesModel::new(&sales.products, &sales.cart, sales.payment_method)
}

/// Everything inside `#workspace` for the current page state.
#[must_use]
pub fn workspace(page: &PageState, user: &User, notifications: Vec<Notification>) -> Workspace {
    Workspace {
        active: page.section.as_str(),
        nav: nav_items(page.section),
        notifications,
        dashboard: DashboardModel::new(user, page.stats.as_ref()),
        sales: sales_model(&page.sales),
        inventory: inventory_model(&page.inventory),
        reports: ReportsModel::new(page.stats.as_ref()),
    }
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;
    use crate::controllers::ActionError;

    #[test]
    fn test_fragment_request_detection() {
        let mut headers = HeaderMap::new();
        assert!(!is_fragment_request(&headers));

        headers.insert(HX_REQUEST, HeaderValue::from_static("true"));
        assert!(is_fragment_request(&headers));
    }

    #[test]
    fn test_settle_outcomes() {
        assert!(matches!(settle(Ok(1)), Ok(Some(1))));
        assert!(matches!(
            settle::<()>(Err(ActionError::new("Error al cargar productos: x"))),
            Ok(None)
        ));

        let expired = ActionError {
            message: "Sesion expirada".to_string(),
            session_expired: true,
        };
        assert!(matches!(
            settle::<()>(Err(expired)),
            Err(AppError::SessionExpired)
        ));
    }

    #[test]
    fn test_visible_products_apply_filter() {
        let products = vec![
            Product {
                name: "Leche".to_string(),
                ..Product::default()
            },
            Product {
                name: "Pan".to_string(),
                ..Product::default()
            },
        ];
        let state = ProductState {
            products,
            filter: "pan".to_string(),
        };

        let visible = visible_products(&state);
        assert_eq!(visible.len(), 1);
        assert_eq!(inventory_model(&state).products.len(), 1);
    }
}
