//! Login and logout.
//!
//! The login form is submitted by the client script, which swaps the
//! message area and follows the `HX-Redirect` header on success. A plain
//! form submit gets a redirect or the full login page instead.

use axum::{
    Form,
    extract::State,
    http::HeaderMap,
    response::{AppendHeaders, IntoResponse, Redirect, Response},
};
use tower_sessions::Session;
use tracing::instrument;

use super::context::{HX_REDIRECT, PageContext, is_fragment_request};
use crate::error::{add_breadcrumb, clear_sentry_user};
use crate::state::AppState;
use crate::views::login::{LoginForm, LoginMessage, LoginPage};
use crate::views::{LOGIN_PATH, LoginView};

/// Handle the login form.
#[instrument(skip_all, fields(username = %form.username.trim()))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    headers: HeaderMap,
    Form(form): Form<LoginForm>,
) -> Response {
    let ctx = PageContext::new(state, session.clone());
    let outcome = LoginView::new(ctx.auth_controller())
        .handle_login(&form)
        .await;

    if outcome.redirect.is_some() {
        // New identity, new session id
        if let Err(e) = session.cycle_id().await {
            tracing::warn!(error = %e, "Failed to rotate session id after login");
        }
        add_breadcrumb("auth", "Logged in", None);
    }

    if is_fragment_request(&headers) {
        let message = LoginMessage {
            message: Some(outcome.message),
        };
        return match outcome.redirect {
            Some(target) => (AppendHeaders([(HX_REDIRECT, target)]), message).into_response(),
            None => message.into_response(),
        };
    }

    match outcome.redirect {
        Some(target) => Redirect::to(target).into_response(),
        None => LoginPage {
            theme: ctx.theme().await,
            username: outcome.username,
            message: Some(outcome.message),
        }
        .into_response(),
    }
}

/// Log out and return to the login page.
#[instrument(skip_all)]
pub async fn logout(
    State(state): State<AppState>,
    session: Session,
    headers: HeaderMap,
) -> Response {
    let ctx = PageContext::new(state, session);

    let mut controller = ctx.auth_controller();
    controller.logout().await;
    let target = controller.into_hooks().redirect.unwrap_or(LOGIN_PATH);

    if let Err(e) = ctx.app().reset_page().await {
        tracing::warn!(error = %e, "Failed to discard page state on logout");
    }
    clear_sentry_user();

    if is_fragment_request(&headers) {
        (AppendHeaders([(HX_REDIRECT, target)]), ()).into_response()
    } else {
        Redirect::to(target).into_response()
    }
}
