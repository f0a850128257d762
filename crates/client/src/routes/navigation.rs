//! In-page navigation, theme preference and the statistics fragments.

use axum::extract::{Path, State};
use tower_sessions::Session;
use tracing::instrument;

use super::context::{PageContext, settle, workspace};
use crate::app::{Notification, PageState, Section};
use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::state::AppState;
use crate::views::dashboard::{DashboardFragment, DashboardModel, WorkspaceFragment};
use crate::views::sections::{ReportsFragment, ReportsModel};

/// Make `section` the active one and re-render the workspace.
///
/// Nothing is fetched: the sections show the state of the current visit.
#[instrument(skip(state, session, user))]
pub async fn navigate(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
    Path(section): Path<String>,
) -> Result<WorkspaceFragment> {
    let section: Section = section.parse().map_err(AppError::BadRequest)?;
    let ctx = PageContext::new(state, session);
    let page = ctx.app().navigate_to(section).await?;

    Ok(workspace(&page, &user, Vec::new()).into())
}

/// Flip the theme. The body is the new `data-theme` value.
#[instrument(skip_all)]
pub async fn toggle_theme(State(state): State<AppState>, session: Session) -> Result<&'static str> {
    let ctx = PageContext::new(state, session);
    let theme = ctx.app().toggle_theme().await?;
    Ok(theme.as_str())
}

/// Fetch today's statistics into the page state.
async fn refresh_stats(ctx: &PageContext) -> Result<(PageState, Vec<Notification>)> {
    let mut page = ctx.page().await;
    let mut sales = ctx.sales_controller(page.sales);
    page.stats = settle(sales.get_stats().await)?;
    let (sales_state, mut events) = sales.into_parts();
    page.sales = sales_state;
    ctx.save_page(&page).await?;
    Ok((page, events.take()))
}

/// Dashboard panel with fresh totals.
#[instrument(skip(state, session, user))]
pub async fn dashboard(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
) -> Result<DashboardFragment> {
    let ctx = PageContext::new(state, session);
    let (page, _) = refresh_stats(&ctx).await?;

    Ok(DashboardFragment {
        dashboard: DashboardModel::new(&user, page.stats.as_ref()),
    })
}

/// Reports section with fresh statistics.
#[instrument(skip(state, session))]
pub async fn stats(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(_): RequireAuth,
) -> Result<ReportsFragment> {
    let ctx = PageContext::new(state, session);
    let (page, notifications) = refresh_stats(&ctx).await?;

    Ok(ReportsFragment {
        notifications,
        reports: ReportsModel::new(page.stats.as_ref()),
    })
}
