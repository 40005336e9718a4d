use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::Serialize;
use thiserror::Error;

// ---------------------------------------------------------------------------
// Column names
// ---------------------------------------------------------------------------

pub const TRACK_NAME: &str = "track_name";
pub const ARTIST_NAME: &str = "artist_name";
pub const RELEASED_YEAR: &str = "released_year";
pub const RELEASED_MONTH: &str = "released_month";
pub const STREAMS: &str = "streams";
pub const IN_SPOTIFY_PLAYLISTS: &str = "in_spotify_playlists";
pub const PLAYLIST_ADDS: &str = "playlist_adds";

/// Chart-position columns that are discarded at load time.
pub const DROPPED_COLUMNS: [&str; 3] = ["in_shazam_charts", "in_apple_charts", "in_spotify_charts"];

/// Free-text columns; their cells are never type-guessed.
pub const TEXT_COLUMNS: [&str; 2] = [TRACK_NAME, ARTIST_NAME];

/// A row missing any of these is excluded from the dataset.
pub const REQUIRED_COLUMNS: [&str; 3] = [IN_SPOTIFY_PLAYLISTS, ARTIST_NAME, RELEASED_YEAR];

/// Map a source header onto the name used throughout the dashboard.
pub fn canonical_column(header: &str) -> String {
    match header.trim() {
        "artist(s)_name" => ARTIST_NAME.to_string(),
        other => other.to_string(),
    }
}

// ---------------------------------------------------------------------------
// CellValue – a single cell of a retained column
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value for columns the dashboard does not model.
/// Used as a `BTreeMap` key downstream so it must be `Ord`. Integers and
/// floats compare by numeric value.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum CellValue {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
}

impl PartialEq for CellValue {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == std::cmp::Ordering::Equal
    }
}

impl Eq for CellValue {}

impl PartialOrd for CellValue {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CellValue {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use CellValue::*;
        fn discriminant(v: &CellValue) -> u8 {
            match v {
                Null => 0,
                Bool(_) => 1,
                Integer(_) | Float(_) => 2,
                String(_) => 3,
            }
        }
        let da = discriminant(self);
        let db = discriminant(other);
        if da != db {
            return da.cmp(&db);
        }
        match (self, other) {
            (Null, Null) => std::cmp::Ordering::Equal,
            (Bool(a), Bool(b)) => a.cmp(b),
            (Integer(a), Integer(b)) => a.cmp(b),
            (Float(a), Float(b)) => a.total_cmp(b),
            (Integer(a), Float(b)) => (*a as f64).total_cmp(b),
            (Float(a), Integer(b)) => a.total_cmp(&(*b as f64)),
            (String(a), String(b)) => a.cmp(b),
            _ => std::cmp::Ordering::Equal,
        }
    }
}

impl std::hash::Hash for CellValue {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        match self {
            CellValue::String(s) => s.hash(state),
            CellValue::Integer(i) => (*i as f64).to_bits().hash(state),
            CellValue::Float(f) => f.to_bits().hash(state),
            CellValue::Bool(b) => b.hash(state),
            CellValue::Null => 0u8.hash(state),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::String(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{v}"),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Null => Ok(()),
        }
    }
}

impl CellValue {
    /// Guess the type of a raw text cell the way a CSV reader would.
    ///
    /// Only plain decimal spellings become numbers: `inf`, `NaN` and
    /// zero-padded values such as `007` stay text.
    pub fn parse(s: &str) -> Self {
        let s = s.trim();
        if s.is_empty() {
            return CellValue::Null;
        }
        if looks_numeric(s) {
            if let Ok(i) = s.parse::<i64>() {
                return CellValue::Integer(i);
            }
            if let Ok(f) = s.parse::<f64>() {
                return CellValue::Float(f);
            }
        }
        if s == "true" || s == "false" {
            return CellValue::Bool(s == "true");
        }
        CellValue::String(s.to_string())
    }

    /// A text cell kept exactly as written, `Null` when blank.
    pub fn text(s: &str) -> Self {
        let s = s.trim();
        if s.is_empty() {
            CellValue::Null
        } else {
            CellValue::String(s.to_string())
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    /// Try to interpret the value as an `f64` for plotting.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(v) => Some(*v),
            CellValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Interpret the value as a whole number.
    ///
    /// Floats without a fractional part are accepted (nullable integer
    /// columns are often stored as floats), as are digit strings with
    /// thousands separators such as `"1,316,855,716"`.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            CellValue::Integer(i) => Some(*i),
            CellValue::Float(f) if f.is_finite() && f.fract() == 0.0 => Some(*f as i64),
            CellValue::String(s) => s.trim().replace(',', "").parse::<i64>().ok(),
            _ => None,
        }
    }

    /// Text content of a cell, `None` when the cell is null or blank.
    pub fn as_text(&self) -> Option<String> {
        match self {
            CellValue::Null => None,
            CellValue::String(s) if s.trim().is_empty() => None,
            other => Some(other.to_string()),
        }
    }
}

/// Digits with an optional sign, point and exponent, without leading zeros.
fn looks_numeric(s: &str) -> bool {
    let unsigned = s.strip_prefix(['-', '+']).unwrap_or(s);
    let mut chars = unsigned.chars();
    match (chars.next(), chars.next()) {
        (Some(c), _) if !c.is_ascii_digit() && c != '.' => return false,
        (Some('0'), Some(d)) if d.is_ascii_digit() => return false,
        _ => {}
    }
    unsigned
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '-' | '+'))
}

// ---------------------------------------------------------------------------
// Track – one row of the dataset
// ---------------------------------------------------------------------------

/// A single song (one row of the source table).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Track {
    pub track_name: String,
    /// One or more joined artists, kept as a single text field.
    pub artist_name: String,
    pub released_year: i64,
    /// Not validated: whatever the source holds, `None` when blank.
    pub released_month: Option<i64>,
    pub streams: u64,
    pub in_spotify_playlists: i64,
    pub playlist_adds: i64,
    /// Every other retained column, verbatim.
    #[serde(flatten)]
    pub extra: BTreeMap<String, CellValue>,
}

/// Why a raw record could not become a [`Track`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowRejection {
    MissingRequired(&'static str),
}

impl Track {
    /// Build a track from a raw `column → value` record.
    ///
    /// Column names must already be canonical. Dropped columns are expected
    /// to have been removed by the caller. Returns the reason on rejection.
    pub fn from_record(mut record: BTreeMap<String, CellValue>) -> Result<Self, RowRejection> {
        let mut take = |col: &str| record.remove(col).unwrap_or(CellValue::Null);

        let artist_name = take(ARTIST_NAME)
            .as_text()
            .ok_or(RowRejection::MissingRequired(ARTIST_NAME))?;
        let released_year = take(RELEASED_YEAR)
            .as_i64()
            .ok_or(RowRejection::MissingRequired(RELEASED_YEAR))?;
        let in_spotify_playlists = take(IN_SPOTIFY_PLAYLISTS)
            .as_i64()
            .ok_or(RowRejection::MissingRequired(IN_SPOTIFY_PLAYLISTS))?;

        let track_name = take(TRACK_NAME).as_text().unwrap_or_default();
        let released_month = take(RELEASED_MONTH).as_i64();
        let streams = take(STREAMS)
            .as_i64()
            .and_then(|s| u64::try_from(s).ok())
            .unwrap_or(0);
        let playlist_adds = take(PLAYLIST_ADDS).as_i64().unwrap_or(in_spotify_playlists);

        Ok(Track {
            track_name,
            artist_name,
            released_year,
            released_month,
            streams,
            in_spotify_playlists,
            playlist_adds,
            extra: record,
        })
    }

    /// Look up any column of this track by name.
    pub fn cell(&self, column: &str) -> CellValue {
        match column {
            TRACK_NAME => CellValue::String(self.track_name.clone()),
            ARTIST_NAME => CellValue::String(self.artist_name.clone()),
            RELEASED_YEAR => CellValue::Integer(self.released_year),
            RELEASED_MONTH => self
                .released_month
                .map(CellValue::Integer)
                .unwrap_or(CellValue::Null),
            STREAMS => i64::try_from(self.streams)
                .map(CellValue::Integer)
                .unwrap_or(CellValue::Float(self.streams as f64)),
            IN_SPOTIFY_PLAYLISTS => CellValue::Integer(self.in_spotify_playlists),
            PLAYLIST_ADDS => CellValue::Integer(self.playlist_adds),
            other => self.extra.get(other).cloned().unwrap_or(CellValue::Null),
        }
    }
}

// ---------------------------------------------------------------------------
// TrackDataset – the complete loaded dataset
// ---------------------------------------------------------------------------

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchemaError {
    #[error("source is missing required column '{0}'")]
    MissingColumn(String),
}

/// The full parsed dataset. Immutable once built.
#[derive(Debug, Clone, Default)]
pub struct TrackDataset {
    /// All tracks (rows), in source order.
    pub tracks: Vec<Track>,
    /// Ordered list of retained column names.
    pub columns: Vec<String>,
    /// Distinct release years in first-appearance order.
    pub years: Vec<i64>,
    /// Rows excluded for missing required fields.
    pub dropped_rows: usize,
}

impl TrackDataset {
    /// Build the dataset from raw records sharing the given header.
    ///
    /// Drops the unused chart columns and every row that lacks a required
    /// field. Fails only when a required column is absent altogether.
    pub fn from_records(
        headers: &[String],
        records: Vec<BTreeMap<String, CellValue>>,
    ) -> Result<Self, SchemaError> {
        let columns: Vec<String> = headers
            .iter()
            .map(|h| canonical_column(h))
            .filter(|h| !DROPPED_COLUMNS.contains(&h.as_str()))
            .collect();

        for required in REQUIRED_COLUMNS {
            if !columns.iter().any(|c| c == required) {
                return Err(SchemaError::MissingColumn(required.to_string()));
            }
        }

        let mut tracks = Vec::with_capacity(records.len());
        let mut dropped_rows = 0;
        let mut seen_years = BTreeSet::new();
        let mut years = Vec::new();

        for mut record in records {
            for dropped in DROPPED_COLUMNS {
                record.remove(dropped);
            }
            match Track::from_record(record) {
                Ok(track) => {
                    if seen_years.insert(track.released_year) {
                        years.push(track.released_year);
                    }
                    tracks.push(track);
                }
                Err(RowRejection::MissingRequired(col)) => {
                    log::debug!("dropping row without '{col}'");
                    dropped_rows += 1;
                }
            }
        }

        Ok(TrackDataset {
            tracks,
            columns,
            years,
            dropped_rows,
        })
    }

    /// Number of tracks.
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// The year preselected in the dropdown.
    pub fn default_year(&self) -> Option<i64> {
        self.years.first().copied()
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }
}
