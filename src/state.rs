use std::sync::Arc;

use serde::Serialize;

use crate::chart::{self, ChartSpec, MONTH_BAR_TITLE};
use crate::data::filter::{
    Aggregate, NO_RESULTS_MESSAGE, PROMPT_MESSAGE, SearchOutcome, filter_and_aggregate, search,
};
use crate::data::model::TrackDataset;
use crate::data::table::{TableError, TablePage, TableRequest, build_page};

// ---------------------------------------------------------------------------
// Rendered views
// ---------------------------------------------------------------------------

/// One line of the home page search-results list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchItem {
    pub track_name: String,
    pub artist_name: String,
    pub streams: u64,
    /// `"<track> by <artist> - <n> streams"`
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SearchView {
    Prompt { message: String },
    NoResults { message: String },
    Results { items: Vec<SearchItem> },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum TableView {
    Prompt { message: String },
    NoResults { message: String },
    Table(TablePage),
}

// ---------------------------------------------------------------------------
// Dashboard state
// ---------------------------------------------------------------------------

/// Everything the handlers need: the dataset loaded at startup, shared
/// read-only, plus display settings.
///
/// Every output is recomputed from scratch from its inputs; nothing is
/// cached between requests.
#[derive(Debug)]
pub struct DashboardState {
    pub dataset: Arc<TrackDataset>,
    pub page_size: usize,
}

pub type SharedState = Arc<DashboardState>;

impl DashboardState {
    pub fn new(dataset: TrackDataset, page_size: usize) -> Self {
        Self {
            dataset: Arc::new(dataset),
            page_size,
        }
    }

    /// The year used when a request does not name one.
    pub fn resolve_year(&self, year: Option<i64>) -> Option<i64> {
        year.or_else(|| self.dataset.default_year())
    }

    /// `(year, query) → bar chart of streams per month`.
    pub fn month_bar(&self, year: i64, query: Option<&str>) -> ChartSpec {
        self.chart(year, query, true)
    }

    /// `(year, query) → playlist adds × streams scatter`.
    pub fn scatter(&self, year: i64, query: Option<&str>) -> ChartSpec {
        self.chart(year, query, false)
    }

    fn chart(&self, year: i64, query: Option<&str>, group_by_month: bool) -> ChartSpec {
        match filter_and_aggregate(&self.dataset, year, query, group_by_month) {
            Aggregate::ByMonth(totals) => chart::month_bar_chart(&totals, MONTH_BAR_TITLE),
            Aggregate::Rows(rows) => chart::playlist_scatter(&rows),
        }
    }

    /// `query → search-results list` across all years.
    pub fn search_results(&self, query: Option<&str>) -> SearchView {
        match search(&self.dataset, query) {
            SearchOutcome::Prompt => SearchView::Prompt {
                message: PROMPT_MESSAGE.to_string(),
            },
            SearchOutcome::NoResults => SearchView::NoResults {
                message: NO_RESULTS_MESSAGE.to_string(),
            },
            SearchOutcome::Matches(rows) => SearchView::Results {
                items: rows
                    .iter()
                    .map(|t| SearchItem {
                        track_name: t.track_name.clone(),
                        artist_name: t.artist_name.clone(),
                        streams: t.streams,
                        text: format!("{} by {} - {} streams", t.track_name, t.artist_name, t.streams),
                    })
                    .collect(),
            },
        }
    }

    /// `(query, page, sort, filters) → data table page`.
    pub fn table(&self, query: Option<&str>, request: &TableRequest) -> Result<TableView, TableError> {
        match search(&self.dataset, query) {
            SearchOutcome::Prompt => Ok(TableView::Prompt {
                message: PROMPT_MESSAGE.to_string(),
            }),
            SearchOutcome::NoResults => Ok(TableView::NoResults {
                message: NO_RESULTS_MESSAGE.to_string(),
            }),
            SearchOutcome::Matches(rows) => {
                build_page(&self.dataset.columns, &rows, request).map(TableView::Table)
            }
        }
    }
}
