//! Login view.

use askama::Template;
use askama_web::WebTemplate;
use serde::Deserialize;

use super::ViewEvents;
use crate::app::Notification;
use crate::controllers::AuthController;
use crate::models::Credentials;
use crate::storage::Storage;

/// Shown when either field is left blank.
pub const MISSING_FIELDS: &str = "Por favor completa todos los campos";

/// Login form fields.
#[derive(Debug, Default, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// Full login page.
#[derive(Template, WebTemplate)]
#[template(path = "login.html")]
pub struct LoginPage {
    pub theme: &'static str,
    pub username: String,
    pub message: Option<Notification>,
}

/// Message area fragment, swapped in after a submit.
#[derive(Template, WebTemplate)]
#[template(path = "partials/login_message.html")]
pub struct LoginMessage {
    pub message: Option<Notification>,
}

/// Result of a login attempt, ready to render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginOutcome {
    pub message: Notification,
    /// Username echoed back into the form.
    pub username: String,
    /// Where to send the visitor next, on success.
    pub redirect: Option<&'static str>,
}

/// Handles the login form on behalf of the auth controller.
pub struct LoginView<S> {
    controller: AuthController<S, ViewEvents>,
}

impl<S: Storage> LoginView<S> {
    pub const fn new(controller: AuthController<S, ViewEvents>) -> Self {
        Self { controller }
    }

    /// Validate the form, log in and produce the message to show.
    ///
    /// Blank fields are rejected without contacting the API.
    pub async fn handle_login(self, form: &LoginForm) -> LoginOutcome {
        let credentials = Credentials::new(&form.username, form.password.as_str());
        if !credentials.is_complete() {
            return LoginOutcome {
                message: Notification::error(MISSING_FIELDS),
                username: credentials.username,
                redirect: None,
            };
        }

        let mut controller = self.controller;
        let result = controller.login(&credentials).await;
        let mut events = controller.into_hooks();

        match result {
            Ok(_) => LoginOutcome {
                message: events
                    .take()
                    .pop()
                    .unwrap_or_else(|| Notification::success("Bienvenido")),
                username: credentials.username,
                redirect: events.redirect,
            },
            Err(e) => LoginOutcome {
                message: Notification::error(e.message),
                username: credentials.username,
                redirect: None,
            },
        }
    }
}
