//! Paginated, sortable, filterable view over search matches.
//!
//! Filter expressions are `column=value` pairs separated by `;`, where a
//! backslash escapes a literal `;` or backslash inside a value. Sort
//! expressions are `column[:asc|:desc]` separated by `,`, applied left to
//! right as a stable lexicographic sort.

use std::cmp::Ordering;

use serde::Serialize;
use thiserror::Error;

use super::model::{CellValue, Track};

pub const DEFAULT_PAGE_SIZE: usize = 10;
/// Upper bound on a client-requested page size.
pub const MAX_PAGE_SIZE: usize = 100;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TableError {
    #[error("unknown column '{0}'")]
    UnknownColumn(String),
    #[error("invalid sort direction '{0}' (expected asc or desc)")]
    InvalidDirection(String),
    #[error("invalid filter '{0}' (expected column=value)")]
    InvalidFilter(String),
}

// ---------------------------------------------------------------------------
// Request pieces
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKey {
    pub column: String,
    pub descending: bool,
}

impl SortKey {
    /// Parse `"streams:desc,track_name"` into keys.
    pub fn parse_list(spec: &str) -> Result<Vec<SortKey>, TableError> {
        spec.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|part| {
                let (column, direction) = part.split_once(':').unwrap_or((part, "asc"));
                let descending = match direction.trim().to_ascii_lowercase().as_str() {
                    "asc" => false,
                    "desc" => true,
                    other => return Err(TableError::InvalidDirection(other.to_string())),
                };
                Ok(SortKey {
                    column: column.trim().to_string(),
                    descending,
                })
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnFilter {
    pub column: String,
    pub value: String,
}

impl ColumnFilter {
    /// Parse `"artist_name=swift;released_month=6"` into filters.
    pub fn parse_list(spec: &str) -> Result<Vec<ColumnFilter>, TableError> {
        split_unescaped(spec)
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(|part| {
                let (column, value) = part
                    .split_once('=')
                    .ok_or_else(|| TableError::InvalidFilter(part.to_string()))?;
                Ok(ColumnFilter {
                    column: column.trim().to_string(),
                    value: value.trim().to_string(),
                })
            })
            .collect()
    }

    /// Numbers compare for equality; everything else is a case-insensitive
    /// substring test on the cell text.
    fn accepts(&self, cell: &CellValue) -> bool {
        if self.value.is_empty() {
            return true;
        }
        match (cell.as_f64(), self.value.parse::<f64>()) {
            (Some(have), Ok(want)) => have == want,
            _ => cell
                .to_string()
                .to_lowercase()
                .contains(&self.value.to_lowercase()),
        }
    }
}

/// Split on `;` unless escaped, unescaping `\;` and `\\` as it goes.
fn split_unescaped(spec: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut chars = spec.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => current.push(chars.next().unwrap_or('\\')),
            ';' => parts.push(std::mem::take(&mut current)),
            other => current.push(other),
        }
    }
    parts.push(current);
    parts
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRequest {
    /// 1-indexed page number.
    pub page: usize,
    pub page_size: usize,
    pub sort: Vec<SortKey>,
    pub filters: Vec<ColumnFilter>,
}

impl Default for TableRequest {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
            sort: Vec::new(),
            filters: Vec::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Result page
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TablePage {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
    pub page: usize,
    pub page_size: usize,
    pub total_pages: usize,
    pub total_rows: usize,
}

/// Filter, sort and slice `rows` into one page over `columns`.
///
/// The page number is clamped into the valid range so a stale page index
/// after narrowing the filter still shows something.
pub fn build_page(
    columns: &[String],
    rows: &[&Track],
    request: &TableRequest,
) -> Result<TablePage, TableError> {
    let known = |column: &str| {
        if columns.iter().any(|c| c == column) {
            Ok(())
        } else {
            Err(TableError::UnknownColumn(column.to_string()))
        }
    };
    for key in &request.sort {
        known(&key.column)?;
    }
    for filter in &request.filters {
        known(&filter.column)?;
    }

    let mut selected: Vec<&Track> = rows
        .iter()
        .copied()
        .filter(|t| request.filters.iter().all(|f| f.accepts(&t.cell(&f.column))))
        .collect();

    if !request.sort.is_empty() {
        selected.sort_by(|a, b| compare_tracks(a, b, &request.sort));
    }

    let page_size = request.page_size.max(1);
    let total_rows = selected.len();
    let total_pages = total_rows.div_ceil(page_size);
    let page = request.page.clamp(1, total_pages.max(1));
    let offset = (page - 1) * page_size;

    let rows = selected
        .iter()
        .skip(offset)
        .take(page_size)
        .map(|t| columns.iter().map(|c| t.cell(c)).collect())
        .collect();

    Ok(TablePage {
        columns: columns.to_vec(),
        rows,
        page,
        page_size,
        total_pages,
        total_rows,
    })
}

fn compare_tracks(a: &Track, b: &Track, keys: &[SortKey]) -> Ordering {
    for key in keys {
        let ord = a.cell(&key.column).cmp(&b.cell(&key.column));
        let ord = if key.descending { ord.reverse() } else { ord };
        if ord != Ordering::Equal {
            return ord;
        }
    }
    Ordering::Equal
}
