use std::collections::BTreeMap;

use serde::Serialize;

use super::model::{Track, TrackDataset};

/// The categorical order of the month axis.
pub const MONTH_ORDER: [i64; 12] = [1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12];

// ---------------------------------------------------------------------------
// Text matching
// ---------------------------------------------------------------------------

/// Normalise a search box value: `None` when there is nothing to filter by.
///
/// Only the empty string counts as "no query"; whitespace is searched for
/// literally like any other character.
pub fn active_query(query: Option<&str>) -> Option<&str> {
    query.filter(|q| !q.is_empty())
}

/// Case-insensitive, unanchored substring match on track OR artist name.
/// `needle` must already be lowercase.
pub fn matches_search(track: &Track, needle: &str) -> bool {
    track.track_name.to_lowercase().contains(needle)
        || track.artist_name.to_lowercase().contains(needle)
}

// ---------------------------------------------------------------------------
// Year + text filter
// ---------------------------------------------------------------------------

/// Tracks released in `year`, further narrowed by the search query when one
/// is given. Dataset order is preserved.
///
/// A year that does not occur in the dataset simply yields no rows.
pub fn filter_tracks<'a>(dataset: &'a TrackDataset, year: i64, query: Option<&str>) -> Vec<&'a Track> {
    let needle = active_query(query).map(str::to_lowercase);

    dataset
        .tracks
        .iter()
        .filter(|t| t.released_year == year)
        .filter(|t| needle.as_deref().map_or(true, |n| matches_search(t, n)))
        .collect()
}

// ---------------------------------------------------------------------------
// Month aggregation
// ---------------------------------------------------------------------------

/// Total streams of one release month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MonthTotal {
    pub month: i64,
    pub streams: u64,
}

/// Sort key placing 1..12 in calendar order and anything else after them.
fn month_rank(month: i64) -> (bool, i64) {
    (!MONTH_ORDER.contains(&month), month)
}

/// Sum `streams` per `released_month`.
///
/// Groups come out in calendar order whatever the input order; months with
/// no rows are omitted rather than zero-filled. Tracks without a month do
/// not form a group. Out-of-range months are kept and listed last.
pub fn streams_by_month(rows: &[&Track]) -> Vec<MonthTotal> {
    let mut sums: BTreeMap<i64, u64> = BTreeMap::new();
    for track in rows {
        if let Some(month) = track.released_month {
            *sums.entry(month).or_default() += track.streams;
        }
    }

    let mut totals: Vec<MonthTotal> = sums
        .into_iter()
        .map(|(month, streams)| MonthTotal { month, streams })
        .collect();
    totals.sort_by_key(|t| month_rank(t.month));
    totals
}

/// Output of [`filter_and_aggregate`].
#[derive(Debug, Clone, PartialEq)]
pub enum Aggregate<'a> {
    /// Scatter path: the filtered rows, unaggregated.
    Rows(Vec<&'a Track>),
    /// Bar path: streams summed per month.
    ByMonth(Vec<MonthTotal>),
}

impl Aggregate<'_> {
    pub fn is_empty(&self) -> bool {
        match self {
            Aggregate::Rows(rows) => rows.is_empty(),
            Aggregate::ByMonth(totals) => totals.is_empty(),
        }
    }
}

/// Restrict to `year`, apply the optional search query, then either group by
/// month or hand back the rows as they are.
pub fn filter_and_aggregate<'a>(
    dataset: &'a TrackDataset,
    year: i64,
    query: Option<&str>,
    group_by_month: bool,
) -> Aggregate<'a> {
    let rows = filter_tracks(dataset, year, query);
    if group_by_month {
        Aggregate::ByMonth(streams_by_month(&rows))
    } else {
        Aggregate::Rows(rows)
    }
}

// ---------------------------------------------------------------------------
// Table search
// ---------------------------------------------------------------------------

pub const PROMPT_MESSAGE: &str = "Please enter a search query to see results.";
pub const NO_RESULTS_MESSAGE: &str = "No results found.";

/// Result of a free-text search across all years.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome<'a> {
    /// No query yet: ask the user for one.
    Prompt,
    /// A query was given but nothing matched.
    NoResults,
    /// Matching tracks in dataset order.
    Matches(Vec<&'a Track>),
}

/// Search track and artist names regardless of release year.
pub fn search<'a>(dataset: &'a TrackDataset, query: Option<&str>) -> SearchOutcome<'a> {
    let Some(query) = active_query(query) else {
        return SearchOutcome::Prompt;
    };
    let needle = query.to_lowercase();

    let matches: Vec<&Track> = dataset
        .tracks
        .iter()
        .filter(|t| matches_search(t, &needle))
        .collect();

    if matches.is_empty() {
        SearchOutcome::NoResults
    } else {
        SearchOutcome::Matches(matches)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::collections::BTreeMap;

    use super::*;

    pub(crate) fn track(name: &str, artist: &str, year: i64, month: i64, streams: u64, adds: i64) -> Track {
        Track {
            track_name: name.to_string(),
            artist_name: artist.to_string(),
            released_year: year,
            released_month: Some(month),
            streams,
            in_spotify_playlists: adds,
            playlist_adds: adds,
            extra: BTreeMap::new(),
        }
    }

    /// The three-row dataset used throughout the examples.
    pub(crate) fn example_dataset() -> TrackDataset {
        TrackDataset {
            tracks: vec![
                track("A", "X", 2023, 1, 100, 5),
                track("B", "Y", 2023, 1, 50, 2),
                track("C", "X", 2022, 3, 10, 1),
            ],
            columns: [
                "track_name",
                "artist_name",
                "released_year",
                "released_month",
                "streams",
                "in_spotify_playlists",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            years: vec![2023, 2022],
            dropped_rows: 0,
        }
    }

    fn names(rows: &[&Track]) -> Vec<String> {
        rows.iter().map(|t| t.track_name.clone()).collect()
    }

    #[test]
    fn test_filter_by_year() {
        let ds = example_dataset();
        assert_eq!(names(&filter_tracks(&ds, 2023, None)), vec!["A", "B"]);
        assert_eq!(names(&filter_tracks(&ds, 2023, Some(""))), vec!["A", "B"]);
        assert!(filter_tracks(&ds, 1999, None).is_empty());
    }

    #[test]
    fn test_query_only_narrows_the_year_filter() {
        let ds = example_dataset();
        let base = filter_tracks(&ds, 2023, None);
        for q in ["x", "Y", "a", "zzz", " "] {
            let narrowed = filter_tracks(&ds, 2023, Some(q));
            assert!(narrowed.len() <= base.len(), "query {q:?} grew the result");
            assert!(narrowed.iter().all(|t| t.released_year == 2023));
        }
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let mut ds = example_dataset();
        ds.tracks.push(track("Blinding Lights", "The Weeknd", 2019, 11, 3_703_895_074, 43899));
        ds.tracks.push(track("Die For You", "The Weeknd, Ariana Grande", 2016, 11, 1_647_990_401, 2483));

        assert_eq!(search(&ds, Some("WEEKND")), search(&ds, Some("weeknd")));
        match search(&ds, Some("WeEkNd")) {
            SearchOutcome::Matches(rows) => assert_eq!(rows.len(), 2),
            other => panic!("expected matches, got {other:?}"),
        }
    }

    #[test]
    fn test_grouped_bar_for_example() {
        let ds = example_dataset();
        assert_eq!(
            filter_and_aggregate(&ds, 2023, None, true),
            Aggregate::ByMonth(vec![MonthTotal { month: 1, streams: 150 }])
        );
    }

    #[test]
    fn test_scatter_path_returns_rows_unaggregated() {
        let ds = example_dataset();
        match filter_and_aggregate(&ds, 2023, Some("b"), false) {
            Aggregate::Rows(rows) => assert_eq!(names(&rows), vec!["B"]),
            other => panic!("expected rows, got {other:?}"),
        }
        assert!(filter_and_aggregate(&ds, 2023, Some("zzz"), false).is_empty());
    }

    #[test]
    fn test_month_order_ignores_input_order() {
        let tracks = [
            track("a", "x", 2023, 12, 1, 0),
            track("b", "x", 2023, 3, 2, 0),
            track("c", "x", 2023, 13, 4, 0),
            track("d", "x", 2023, 1, 8, 0),
            track("e", "x", 2023, 3, 16, 0),
            track("f", "x", 2023, 0, 32, 0),
        ];
        let rows: Vec<&Track> = tracks.iter().collect();
        let totals = streams_by_month(&rows);
        let months: Vec<i64> = totals.iter().map(|t| t.month).collect();
        assert_eq!(months, vec![1, 3, 12, 0, 13]);
        assert_eq!(totals[1], MonthTotal { month: 3, streams: 18 });
    }

    #[test]
    fn test_month_sums_match_row_totals() {
        let mut ds = example_dataset();
        ds.tracks.push(track("D", "Z", 2023, 7, 70, 3));
        ds.tracks.push(track("E", "Z", 2023, 1, 25, 3));
        let rows = filter_tracks(&ds, 2023, None);
        for total in streams_by_month(&rows) {
            let expected: u64 = rows
                .iter()
                .filter(|t| t.released_month == Some(total.month))
                .map(|t| t.streams)
                .sum();
            assert_eq!(total.streams, expected);
        }
    }

    #[test]
    fn test_tracks_without_month_are_not_grouped() {
        let mut t = track("a", "x", 2023, 1, 10, 0);
        t.released_month = None;
        assert!(streams_by_month(&[&t]).is_empty());
    }

    #[test]
    fn test_search_states() {
        let ds = example_dataset();
        assert_eq!(search(&ds, None), SearchOutcome::Prompt);
        assert_eq!(search(&ds, Some("")), SearchOutcome::Prompt);
        assert_eq!(search(&ds, Some("zzz")), SearchOutcome::NoResults);
        match search(&ds, Some("x")) {
            SearchOutcome::Matches(rows) => assert_eq!(names(&rows), vec!["A", "C"]),
            other => panic!("expected matches, got {other:?}"),
        }
    }

    #[test]
    fn test_filtering_is_idempotent() {
        let ds = example_dataset();
        let first = filter_and_aggregate(&ds, 2023, Some("x"), true);
        let second = filter_and_aggregate(&ds, 2023, Some("x"), true);
        assert_eq!(first, second);
    }
}
