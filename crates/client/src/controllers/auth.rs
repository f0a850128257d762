//! Authentication controller.

use tracing::instrument;

use poscore_core::Role;

use super::{ActionError, ActionResult};
use crate::models::{Credentials, User};
use crate::services::AuthService;
use crate::storage::Storage;

/// Message shown when the API accepts the request but issues no token.
pub const INVALID_CREDENTIALS: &str = "Credenciales incorrectas";

/// Observers of authentication transitions.
pub trait AuthEvents {
    fn on_login_success(&mut self, _user: &User) {}
    fn on_logout(&mut self) {}
}

impl AuthEvents for () {}

pub struct AuthController<S, H = ()> {
    service: AuthService<S>,
    hooks: H,
}

impl<S: Storage, H: AuthEvents> AuthController<S, H> {
    pub const fn new(service: AuthService<S>, hooks: H) -> Self {
        Self { service, hooks }
    }

    /// Log in and notify observers.
    ///
    /// # Errors
    ///
    /// Fails with [`INVALID_CREDENTIALS`] when no token was issued, or with
    /// the API error message.
    #[instrument(skip_all)]
    pub async fn login(&mut self, credentials: &Credentials) -> ActionResult<User> {
        match self.service.login(credentials).await {
            Ok(Some(user)) => {
                self.hooks.on_login_success(&user);
                Ok(user)
            }
            Ok(None) => Err(ActionError::new(INVALID_CREDENTIALS)),
            Err(e) => {
                tracing::info!(error = %e, "Login rejected");
                Err(ActionError::from(&e))
            }
        }
    }

    /// Log out. Never fails.
    pub async fn logout(&mut self) {
        self.service.logout().await;
        self.hooks.on_logout();
    }

    /// Page guard: whether the visitor may see authenticated pages.
    pub async fn check_auth(&self) -> bool {
        self.service.is_authenticated().await
    }

    pub async fn current_user(&self) -> Option<User> {
        self.service.current_user().await
    }

    pub async fn has_permission(&self, role: &Role) -> bool {
        self.service.has_role(role).await
    }

    pub fn into_hooks(self) -> H {
        self.hooks
    }
}
