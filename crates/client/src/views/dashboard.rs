//! Dashboard shell and the role-specific dashboard panel.
//!
//! The panel shows today's sales count and revenue. Low stock, active users
//! and shift duration are fixed placeholders in the templates.

use askama::Template;
use askama_web::WebTemplate;

use poscore_core::Role;

use super::sections::{InventoryModel, ReportsModel, SalesModel};
use crate::app::{Notification, Section};
use crate::models::User;
use crate::services::SalesStats;

/// Panel variant, chosen by the user's role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DashboardLayout {
    Admin,
    Cashier,
    Default,
}

impl DashboardLayout {
    #[must_use]
    pub const fn for_role(role: &Role) -> Self {
        match role {
            Role::Admin => Self::Admin,
            Role::Cashier => Self::Cashier,
            Role::Other(_) => Self::Default,
        }
    }
}

/// Data behind the dashboard panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardModel {
    pub layout: DashboardLayout,
    pub user_name: String,
    pub revenue: String,
    pub sales_count: usize,
}

impl DashboardModel {
    /// Missing statistics render as zero.
    #[must_use]
    pub fn new(user: &User, stats: Option<&SalesStats>) -> Self {
        let stats = stats.cloned().unwrap_or_default();
        Self {
            layout: DashboardLayout::for_role(&user.role),
            user_name: user.name.clone(),
            revenue: stats.total_revenue.to_string(),
            sales_count: stats.total_sales,
        }
    }
}

/// A navigation button.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavItem {
    pub section: &'static str,
    pub label: &'static str,
    pub icon: &'static str,
    pub active: bool,
}

/// One button per section; only `active` is marked.
#[must_use]
pub fn nav_items(active: Section) -> Vec<NavItem> {
    Section::ALL
        .into_iter()
        .map(|section| NavItem {
            section: section.as_str(),
            label: section.label(),
            icon: section.icon(),
            active: section == active,
        })
        .collect()
}

/// Everything rendered inside `#workspace`.
#[derive(Debug, Clone)]
pub struct Workspace {
    pub active: &'static str,
    pub nav: Vec<NavItem>,
    pub notifications: Vec<Notification>,
    pub dashboard: DashboardModel,
    pub sales: SalesModel,
    pub inventory: InventoryModel,
    pub reports: ReportsModel,
}

/// Full dashboard page (`/`, `/index.html`).
#[derive(Template, WebTemplate)]
#[template(path = "index.html")]
pub struct ShellPage {
    pub theme: &'static str,
    pub user_name: String,
    pub user_role: String,
    pub active: &'static str,
    pub nav: Vec<NavItem>,
    pub notifications: Vec<Notification>,
    pub dashboard: DashboardModel,
    pub sales: SalesModel,
    pub inventory: InventoryModel,
    pub reports: ReportsModel,
}

impl ShellPage {
    #[must_use]
    pub fn new(theme: &'static str, user: &User, workspace: Workspace) -> Self {
        Self {
            theme,
            user_name: user.name.clone(),
            user_role: user.role.to_string(),
            active: workspace.active,
            nav: workspace.nav,
            notifications: workspace.notifications,
            dashboard: workspace.dashboard,
            sales: workspace.sales,
            inventory: workspace.inventory,
            reports: workspace.reports,
        }
    }
}

/// `#workspace` fragment, returned by navigation.
#[derive(Template, WebTemplate)]
#[template(path = "partials/workspace.html")]
pub struct WorkspaceFragment {
    pub active: &'static str,
    pub nav: Vec<NavItem>,
    pub notifications: Vec<Notification>,
    pub dashboard: DashboardModel,
    pub sales: SalesModel,
    pub inventory: InventoryModel,
    pub reports: ReportsModel,
}

impl From<Workspace> for WorkspaceFragment {
    fn from(workspace: Workspace) -> Self {
        Self {
            active: workspace.active,
            nav: workspace.nav,
            notifications: workspace.notifications,
            dashboard: workspace.dashboard,
            sales: workspace.sales,
            inventory: workspace.inventory,
            reports: workspace.reports,
        }
    }
}

/// Dashboard panel fragment.
#[derive(Template, WebTemplate)]
#[template(path = "partials/dashboard.html")]
pub struct DashboardFragment {
    pub dashboard: DashboardModel,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use poscore_core::Price;

    use super::*;

    fn user(role: &str) -> User {
        User {
            name: "Ana".to_string(),
            role: Role::from(role),
            ..User::default()
        }
    }

    fn stats() -> SalesStats {
        SalesStats {
            total_sales: 3,
            total_revenue: Price::from_units(42),
            ..SalesStats::default()
        }
    }

    #[test]
    fn test_layout_for_role() {
        assert_eq!(DashboardLayout::for_role(&Role::Admin), DashboardLayout::Admin);
        assert_eq!(DashboardLayout::for_role(&Role::Cashier), DashboardLayout::Cashier);
        assert_eq!(DashboardLayout::for_role(&Role::from("supervisor")), DashboardLayout::Default);
    }

    #[test]
    fn test_nav_items_mark_single_active() {
        let items = nav_items(Section::Reports);
        assert_eq!(items.len(), 4);
        let active: Vec<&str> = items.iter().filter(|i| i.active).map(|i| i.section).collect();
        assert_eq!(active, vec!["reportes"]);
    }

    #[test]
    fn test_admin_panel_shows_totals_and_placeholders() {
        let html = DashboardFragment {
            dashboard: DashboardModel::new(&user("admin"), Some(&stats())),
        }
        .render()
        .unwrap();

        assert!(html.contains("Panel de Administracion"));
        assert!(html.contains("$42.00"));
        assert!(html.contains(">3<"));
        assert!(html.contains(">15<"));
        assert!(html.contains(">4<"));
    }

    #[test]
    fn test_cashier_panel_shows_shift() {
        let html = DashboardFragment {
            dashboard: DashboardModel::new(&user("cajero"), None),
        }
        .render()
        .unwrap();

        assert!(html.contains("Turno activo - Ana"));
        assert!(html.contains("4:30"));
        assert!(html.contains("$0.00"));
    }

    #[test]
    fn test_default_panel_greets_user() {
        let html = DashboardFragment {
            dashboard: DashboardModel::new(&user("supervisor"), Some(&stats())),
        }
        .render()
        .unwrap();

        assert!(html.contains("Bienvenido Ana"));
        assert!(!html.contains("Panel de Administracion"));
    }
}
