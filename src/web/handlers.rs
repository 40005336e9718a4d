use axum::{
    Json,
    extract::{Query, State},
    http::Uri,
    response::{Html, IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use super::error::ApiError;
use super::pages::{self, Page};
use crate::chart::ChartSpec;
use crate::data::table::{ColumnFilter, MAX_PAGE_SIZE, SortKey, TableRequest};
use crate::state::{SearchView, SharedState, TableView};

// ---------------------------------------------------------------------------
// Pages
// ---------------------------------------------------------------------------

/// GET / , GET /page-2 and every unmatched path.
///
/// Unknown `/api/...` paths get a JSON 404 instead of the home page.
pub async fn page(State(state): State<SharedState>, uri: Uri) -> Response {
    let path = uri.path();
    if path.starts_with("/api/") {
        return ApiError::NotFound(path.to_string()).into_response();
    }

    let html = match Page::from_path(path) {
        Page::Home => pages::home_page(&state.dataset.years, state.dataset.default_year()),
        Page::Search => pages::search_page(state.page_size),
    };
    Html(html).into_response()
}

// ---------------------------------------------------------------------------
// Health / metadata
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub tracks: usize,
}

/// GET /health
pub async fn health(State(state): State<SharedState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        tracks: state.dataset.len(),
    })
}

#[derive(Debug, Serialize)]
pub struct YearsResponse {
    pub years: Vec<i64>,
    pub default: Option<i64>,
}

/// GET /api/years - dropdown options in first-appearance order
pub async fn years(State(state): State<SharedState>) -> Json<YearsResponse> {
    Json(YearsResponse {
        years: state.dataset.years.clone(),
        default: state.dataset.default_year(),
    })
}

// ---------------------------------------------------------------------------
// Charts
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct ChartQuery {
    /// Defaults to the first year in the dataset.
    pub year: Option<i64>,
    pub q: Option<String>,
}

/// GET /api/charts/month-bar?year=&q=
pub async fn month_bar_chart(
    State(state): State<SharedState>,
    Query(query): Query<ChartQuery>,
) -> Result<Json<ChartSpec>, ApiError> {
    let year = state.resolve_year(query.year).ok_or(ApiError::NoYear)?;
    log::debug!("month bar: year={year} q={:?}", query.q);
    Ok(Json(state.month_bar(year, query.q.as_deref())))
}

/// GET /api/charts/scatter?year=&q=
pub async fn scatter_chart(
    State(state): State<SharedState>,
    Query(query): Query<ChartQuery>,
) -> Result<Json<ChartSpec>, ApiError> {
    let year = state.resolve_year(query.year).ok_or(ApiError::NoYear)?;
    log::debug!("scatter: year={year} q={:?}", query.q);
    Ok(Json(state.scatter(year, query.q.as_deref())))
}

// ---------------------------------------------------------------------------
// Search
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
}

/// GET /api/search?q= - home page search-results list
pub async fn search_results(
    State(state): State<SharedState>,
    Query(query): Query<SearchQuery>,
) -> Json<SearchView> {
    log::debug!("search: q={:?}", query.q);
    Json(state.search_results(query.q.as_deref()))
}

#[derive(Debug, Deserialize)]
pub struct TableQuery {
    pub q: Option<String>,
    /// 1-indexed
    pub page: Option<usize>,
    pub page_size: Option<usize>,
    /// `column[:asc|:desc],...`
    pub sort: Option<String>,
    /// `column=value;...`
    pub filter: Option<String>,
}

/// GET /api/table?q=&page=&sort=&filter= - search page data table
pub async fn table(
    State(state): State<SharedState>,
    Query(query): Query<TableQuery>,
) -> Result<Json<TableView>, ApiError> {
    let request = TableRequest {
        page: query.page.unwrap_or(1),
        page_size: query
            .page_size
            .unwrap_or(state.page_size)
            .clamp(1, MAX_PAGE_SIZE),
        sort: SortKey::parse_list(query.sort.as_deref().unwrap_or(""))?,
        filters: ColumnFilter::parse_list(query.filter.as_deref().unwrap_or(""))?,
    };
    log::debug!("table: q={:?} {request:?}", query.q);
    Ok(Json(state.table(query.q.as_deref(), &request)?))
}
