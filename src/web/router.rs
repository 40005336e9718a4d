//! Axum router — maps all URL paths to handlers.

use axum::{Router, routing::get};

use super::handlers::{health, month_bar_chart, page, scatter_chart, search_results, table, years};
use super::pages::SEARCH_PATH;
use crate::state::SharedState;

/// Build and return the full Axum router.
pub fn build_router(state: SharedState) -> Router {
    Router::new()
        // Pages
        .route("/", get(page))
        .route(SEARCH_PATH, get(page))
        .route("/health", get(health))
        // API endpoints
        .route("/api/years", get(years))
        .route("/api/charts/month-bar", get(month_bar_chart))
        .route("/api/charts/scatter", get(scatter_chart))
        .route("/api/search", get(search_results))
        .route("/api/table", get(table))
        // Unknown paths render the home page
        .fallback(page)
        .with_state(state)
}
