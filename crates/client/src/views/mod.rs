//! Views turn controller state into HTML.
//!
//! A view observes its controllers through [`ViewEvents`], which implements
//! every hook trait and collects the notifications (and the redirect, if
//! any) produced while handling one request.

pub mod dashboard;
pub mod login;
pub mod sections;

pub use dashboard::{DashboardLayout, DashboardModel};
pub use login::{LoginOutcome, LoginView};

use poscore_core::ProductId;

use crate::app::Notification;
use crate::controllers::{AuthEvents, ProductEvents, SalesEvents};
use crate::models::{Product, Sale, User};

/// Landing page after a successful login.
pub const INDEX_PATH: &str = "/index.html";
/// Page shown to visitors without a session.
pub const LOGIN_PATH: &str = "/login.html";

/// Hook observer shared by every view.
#[derive(Debug, Default)]
pub struct ViewEvents {
    pub notifications: Vec<Notification>,
    pub redirect: Option<&'static str>,
}

impl ViewEvents {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, notification: Notification) {
        self.notifications.push(notification);
    }

    /// Take the collected notifications, leaving none behind.
    pub fn take(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.notifications)
    }
}

impl AuthEvents for ViewEvents {
    fn on_login_success(&mut self, user: &User) {
        self.push(Notification::success(format!("Bienvenido {}", user.name)));
        self.redirect = Some(INDEX_PATH);
    }

    fn on_logout(&mut self) {
        self.redirect = Some(LOGIN_PATH);
    }
}

impl ProductEvents for ViewEvents {
    fn on_product_created(&mut self, product: &Product) {
        self.push(Notification::success(format!("Producto creado: {}", product.name)));
    }

    fn on_product_updated(&mut self, product: &Product) {
        self.push(Notification::success(format!("Producto actualizado: {}", product.name)));
    }

    fn on_product_deleted(&mut self, _id: &ProductId) {
        self.push(Notification::success("Producto eliminado"));
    }

    fn on_error(&mut self, message: &str) {
        self.push(Notification::error(message));
    }
}

impl SalesEvents for ViewEvents {
    fn on_sale_processed(&mut self, sale: &Sale) {
        self.push(Notification::success(format!("Venta procesada: {}", sale.total)));
    }

    fn on_error(&mut self, message: &str) {
        self.push(Notification::error(message));
    }
}
