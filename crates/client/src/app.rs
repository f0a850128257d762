//! Top-level application state: route selection, in-page navigation, theme
//! and notifications.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::controllers::{ProductState, SalesState};
use crate::services::SalesStats;
use crate::storage::{Storage, StorageError, keys};

/// Which view a request path selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Login,
    Dashboard,
    NotFound,
}

impl Route {
    /// `login.html` selects the login view; `index.html` or the root select
    /// the dashboard.
    #[must_use]
    pub fn from_path(path: &str) -> Self {
        if path.contains("login.html") {
            Self::Login
        } else if path.contains("index.html") || path == "/" {
            Self::Dashboard
        } else {
            Self::NotFound
        }
    }
}

/// Content sections of the dashboard shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Section {
    #[default]
    #[serde(rename = "dashboard")]
    Dashboard,
    #[serde(rename = "ventas")]
    Sales,
    #[serde(rename = "inventario")]
    Inventory,
    #[serde(rename = "reportes")]
    Reports,
}

impl Section {
    pub const ALL: [Self; 4] = [Self::Dashboard, Self::Sales, Self::Inventory, Self::Reports];

    /// Element id and `data-section` value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Dashboard => "dashboard",
            Self::Sales => "ventas",
            Self::Inventory => "inventario",
            Self::Reports => "reportes",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Dashboard => "Dashboard",
            Self::Sales => "Ventas",
            Self::Inventory => "Inventario",
            Self::Reports => "Reportes",
        }
    }

    #[must_use]
    pub const fn icon(self) -> &'static str {
        match self {
            Self::Dashboard => "layout-dashboard",
            Self::Sales => "shopping-cart",
            Self::Inventory => "package",
            Self::Reports => "bar-chart-3",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Section {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|section| section.as_str() == s)
            .ok_or_else(|| format!("unknown section: {s}"))
    }
}

/// UI color scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }

    /// Value of the `data-theme` attribute.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Severity of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NotificationKind {
    Success,
    Error,
    Warning,
    #[default]
    Info,
}

impl NotificationKind {
    /// Parse a type name. Unknown names are treated as `info`.
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name {
            "success" => Self::Success,
            "error" => Self::Error,
            "warning" => Self::Warning,
            _ => Self::Info,
        }
    }

    /// CSS class.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Info => "info",
        }
    }

    /// Lucide icon name.
    #[must_use]
    pub const fn icon(self) -> &'static str {
        match self {
            Self::Success => "check-circle",
            Self::Error => "x-circle",
            Self::Warning => "alert-triangle",
            Self::Info => "info",
        }
    }
}

/// A message shown to the visitor after an action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
}

impl Notification {
    pub fn new(kind: NotificationKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(NotificationKind::Success, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(NotificationKind::Error, message)
    }

    #[must_use]
    pub const fn icon(&self) -> &'static str {
        self.kind.icon()
    }
}

/// Controller state for one visit of the dashboard shell.
///
/// Reset whenever the shell page itself is loaded; fragment requests read
/// and write it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageState {
    pub section: Section,
    pub sales: SalesState,
    pub inventory: ProductState,
    /// Today's statistics as last fetched; `None` when unavailable.
    #[serde(default)]
    pub stats: Option<SalesStats>,
}

/// Per-visitor application object.
#[derive(Debug, Clone)]
pub struct PosApp<S> {
    storage: S,
}

impl<S: Storage> PosApp<S> {
    pub const fn new(storage: S) -> Self {
        Self { storage }
    }

    /// Stored theme, light when unset.
    pub async fn theme(&self) -> Theme {
        self.storage.load(keys::THEME).await.unwrap_or_default()
    }

    /// Flip between light and dark and persist the choice.
    ///
    /// # Errors
    ///
    /// Returns an error if the preference cannot be stored.
    pub async fn toggle_theme(&self) -> Result<Theme, StorageError> {
        let theme = self.theme().await.toggled();
        self.storage.save(keys::THEME, &theme).await?;
        Ok(theme)
    }

    pub async fn page(&self) -> PageState {
        self.storage.load(keys::PAGE).await.unwrap_or_default()
    }

    /// # Errors
    ///
    /// Returns an error if the state cannot be stored.
    pub async fn save_page(&self, page: &PageState) -> Result<(), StorageError> {
        self.storage.save(keys::PAGE, page).await
    }

    /// Discard the previous visit's cart, product lists and section.
    ///
    /// # Errors
    ///
    /// Returns an error if the state cannot be removed.
    pub async fn reset_page(&self) -> Result<(), StorageError> {
        self.storage.remove_item(keys::PAGE).await
    }

    /// Make `section` the single active section.
    ///
    /// # Errors
    ///
    /// Returns an error if the state cannot be stored.
    pub async fn navigate_to(&self, section: Section) -> Result<PageState, StorageError> {
        let mut page = self.page().await;
        page.section = section;
        self.save_page(&page).await?;
        Ok(page)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    #[test]
    fn test_route_from_path() {
        assert_eq!(Route::from_path("/login.html"), Route::Login);
        assert_eq!(Route::from_path("/index.html"), Route::Dashboard);
        assert_eq!(Route::from_path("/"), Route::Dashboard);
        assert_eq!(Route::from_path("/caja/index.html"), Route::Dashboard);
        assert_eq!(Route::from_path("/ventas"), Route::NotFound);
    }

    #[test]
    fn test_section_names_round_trip() {
        for section in Section::ALL {
            assert_eq!(section.as_str().parse::<Section>().unwrap(), section);
        }
        assert!("ajustes".parse::<Section>().is_err());
    }

    #[test]
    fn test_notification_icons() {
        assert_eq!(NotificationKind::from_name("success").icon(), "check-circle");
        assert_eq!(NotificationKind::from_name("error").icon(), "x-circle");
        assert_eq!(NotificationKind::from_name("warning").icon(), "alert-triangle");
        assert_eq!(NotificationKind::from_name("info").icon(), "info");
        assert_eq!(NotificationKind::from_name("debug").icon(), "info");
    }

    #[tokio::test]
    async fn test_toggle_theme_persists() {
        let storage = MemoryStorage::new();
        let app = PosApp::new(storage.clone());
        assert_eq!(app.theme().await, Theme::Light);

        assert_eq!(app.toggle_theme().await.unwrap(), Theme::Dark);
        assert_eq!(storage.load::<String>(keys::THEME).await.as_deref(), Some("dark"));

        assert_eq!(app.toggle_theme().await.unwrap(), Theme::Light);
    }

    #[tokio::test]
    async fn test_navigate_to_and_reset() {
        let app = PosApp::new(MemoryStorage::new());

        let page = app.navigate_to(Section::Inventory).await.unwrap();
        assert_eq!(page.section, Section::Inventory);
        assert_eq!(app.page().await.section, Section::Inventory);

        app.reset_page().await.unwrap();
        assert_eq!(app.page().await, PageState::default());
    }
}
