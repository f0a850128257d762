//! HTTP route handlers for the POS client.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                  - Health check
//!
//! # Pages
//! GET  /, /index.html           - Dashboard shell (requires login)
//! GET  /login.html              - Login page
//!
//! # Auth
//! POST /auth/login              - Login form (rate limited, fragment + HX-Redirect)
//! POST /auth/logout             - Logout
//!
//! # Shell (fragments)
//! POST /navigate/{section}      - Activate a section, returns #workspace
//! POST /preferences/theme       - Toggle theme, returns the new theme name
//! GET  /dashboard               - Dashboard panel with fresh totals
//! GET  /sales/stats             - Reports section with fresh statistics
//!
//! # Inventory (fragments)
//! GET  /products?q=             - Search or list products
//! GET  /products/low-stock      - Low-stock list
//! POST /products                - Create product
//! POST /products/{id}           - Update product
//! POST /products/{id}/delete    - Delete product
//! POST /products/{id}/stock     - Set stock
//!
//! # Point of sale (fragments)
//! POST /cart/add                - Add a product
//! POST /cart/update             - Change a line's quantity
//! POST /cart/remove             - Remove a line
//! POST /cart/clear              - Empty the cart
//! POST /cart/checkout           - Process the sale
//! ```
//!
//! Any other path is matched against the page names, so `/caja/index.html`
//! also serves the dashboard.

pub mod auth;
pub mod cart;
pub mod context;
pub mod navigation;
pub mod pages;
pub mod products;

use axum::{
    Router, middleware as axum_middleware,
    routing::{get, post},
};
use tower_http::services::ServeDir;
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;

use crate::config::ConfigError;
use crate::middleware::{
    auth_rate_limiter, create_session_layer, request_id_middleware, security_headers_middleware,
};
use crate::state::AppState;

/// Directory holding `css/` and `js/`.
const STATIC_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/static");

/// Create the login route, behind its rate limiter.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(auth::login))
        .layer(auth_rate_limiter())
        .route("/logout", post(auth::logout))
}

/// Create the inventory routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index).post(products::create))
        .route("/low-stock", get(products::low_stock))
        .route("/{id}", post(products::update))
        .route("/{id}/delete", post(products::delete))
        .route("/{id}/stock", post(products::update_stock))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/clear", post(cart::clear))
        .route("/checkout", post(cart::checkout))
}

/// Create all routes for the client.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(pages::health))
        .route("/", get(pages::page))
        .route("/index.html", get(pages::page))
        .route("/login.html", get(pages::page))
        .route("/navigate/{section}", post(navigation::navigate))
        .route("/preferences/theme", post(navigation::toggle_theme))
        .route("/dashboard", get(navigation::dashboard))
        .route("/sales/stats", get(navigation::stats))
        .nest("/auth", auth_routes())
        .nest("/products", product_routes())
        .nest("/cart", cart_routes())
        .fallback(pages::page)
}

/// Build the complete application: routes, static assets and middleware.
///
/// Serve it with `into_make_service_with_connect_info::<SocketAddr>()` so
/// the login rate limiter can key on the peer address.
///
/// # Errors
///
/// Returns an error if the session secret cannot be used as a signing key.
pub fn router(state: AppState) -> Result<Router, ConfigError> {
    let session_layer = create_session_layer(state.config())?;

    Ok(Router::new()
        .merge(routes())
        .nest_service("/static", ServeDir::new(STATIC_DIR))
        .layer(session_layer)
        .layer(axum_middleware::from_fn(security_headers_middleware))
        .layer(axum_middleware::from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = tracing::field::Empty,
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record(
                            "latency_ms",
                            u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                        );
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .with_state(state)
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction()))
}
