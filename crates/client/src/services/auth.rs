//! Authentication service.

use serde::Deserialize;
use tracing::instrument;

use poscore_core::Role;

use super::Result;
use crate::api::ApiClient;
use crate::models::{Credentials, User};
use crate::storage::{Storage, keys};

/// Body of `POST /auth/login`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct LoginResponse {
    token: Option<String>,
    user: Option<User>,
}

/// Body of `GET /auth/verify`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct VerifyResponse {
    valid: bool,
}

/// Login, logout and credential inspection.
#[derive(Debug, Clone)]
pub struct AuthService<S> {
    api: ApiClient<S>,
}

impl<S: Storage> AuthService<S> {
    pub const fn new(api: ApiClient<S>) -> Self {
        Self { api }
    }

    /// Exchange credentials for a token.
    ///
    /// Returns `Ok(None)` when the API answered without a token. On success
    /// the token and user are persisted to storage.
    ///
    /// # Errors
    ///
    /// Propagates API and storage failures.
    #[instrument(skip(self, credentials), fields(username = %credentials.username))]
    pub async fn login(&self, credentials: &Credentials) -> Result<Option<User>> {
        let response: Option<LoginResponse> = self.api.post("/auth/login", credentials).await?;
        let Some(LoginResponse {
            token: Some(token),
            user,
        }) = response
        else {
            return Ok(None);
        };

        let user = user.unwrap_or_default();
        self.api.set_token(&token).await?;
        self.api.storage().save(keys::USER, &user).await?;
        tracing::info!(user_id = %user.id, "User logged in");
        Ok(Some(user))
    }

    /// Tell the API we are leaving, then forget local credentials.
    ///
    /// Server errors are logged and ignored; local credentials are always
    /// cleared.
    #[instrument(skip(self))]
    pub async fn logout(&self) {
        if let Err(e) = self.api.post_empty::<serde_json::Value>("/auth/logout").await {
            tracing::warn!(error = %e, "Logout request failed");
        }
        self.api.clear_auth().await;
    }

    /// Ask the API whether the stored token is still valid. Any failure
    /// counts as invalid.
    #[instrument(skip(self))]
    pub async fn verify_token(&self) -> bool {
        match self.api.get::<Option<VerifyResponse>>("/auth/verify").await {
            Ok(response) => response.is_some_and(|r| r.valid),
            Err(e) => {
                tracing::debug!(error = %e, "Token verification failed");
                false
            }
        }
    }

    /// The cached user, if any.
    pub async fn current_user(&self) -> Option<User> {
        self.api.storage().current_user().await
    }

    /// True iff both a token and a cached user are stored.
    pub async fn is_authenticated(&self) -> bool {
        self.api.storage().token().await.is_some() && self.current_user().await.is_some()
    }

    /// Strict equality against the cached user's role.
    pub async fn has_role(&self, role: &Role) -> bool {
        self.current_user()
            .await
            .is_some_and(|user| user.has_role(role))
    }

    pub async fn is_admin(&self) -> bool {
        self.has_role(&Role::Admin).await
    }

    pub async fn is_cashier(&self) -> bool {
        self.has_role(&Role::Cashier).await
    }
}
