//! Authentication extractors.
//!
//! A visitor is authenticated when their session holds both an API token and
//! the cached user returned by `POST /auth/login`.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use crate::error::set_sentry_user;
use crate::models::User;
use crate::storage::Storage;
use crate::views::LOGIN_PATH;

/// Extractor that requires an authenticated visitor.
///
/// If there is no session token, the visitor is redirected to the login page.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(RequireAuth(user): RequireAuth) -> impl IntoResponse {
///     format!("Hola, {}!", user.name)
/// }
/// ```
pub struct RequireAuth(pub User);

/// Error returned when authentication is required but missing.
pub enum AuthRejection {
    /// Redirect to the login page.
    RedirectToLogin,
    /// The session layer is not installed.
    MissingSession,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin => Redirect::to(LOGIN_PATH).into_response(),
            Self::MissingSession => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        }
    }
}

/// Current user, if the session holds a token.
async fn authenticated_user(session: &Session) -> Option<User> {
    session.token().await?;
    session.current_user().await
}

impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let session = parts
            .extensions
            .get::<Session>()
            .ok_or(AuthRejection::MissingSession)?;

        let user = authenticated_user(session)
            .await
            .ok_or(AuthRejection::RedirectToLogin)?;

        set_sentry_user(&user.id, &user.username);

        Ok(Self(user))
    }
}
