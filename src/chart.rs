use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::color::{ColorMap, DEFAULT_COLOR};
use crate::data::filter::{MONTH_ORDER, MonthTotal};
use crate::data::model::{CellValue, PLAYLIST_ADDS, RELEASED_MONTH, STREAMS, Track};

pub const SCATTER_TITLE: &str = "Playlist Adds vs. Streams";
pub const MONTH_BAR_TITLE: &str = "Streams by Released Month";

// ---------------------------------------------------------------------------
// Chart specification
// ---------------------------------------------------------------------------

/// A declarative chart description, rendered by the browser.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    pub kind: ChartKind,
    pub title: String,
    pub x: Axis,
    pub y: Axis,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color_field: Option<String>,
    pub series: Vec<Series>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    Scatter,
    Bar,
}

/// Binding of one axis to a dataset column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Axis {
    pub field: String,
    pub title: String,
    /// Fixed categorical order, when the axis is categorical.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_order: Option<Vec<i64>>,
}

impl Axis {
    fn numeric(field: &str) -> Self {
        Axis {
            field: field.to_string(),
            title: field.to_string(),
            category_order: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    pub name: String,
    pub color: String,
    pub points: Vec<Point>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl ChartSpec {
    pub fn point_count(&self) -> usize {
        self.series.iter().map(|s| s.points.len()).sum()
    }
}

// ---------------------------------------------------------------------------
// Builders
// ---------------------------------------------------------------------------

/// Scatter plot of `x_field` against `y_field`, one series per distinct
/// value of `color_field` when given.
///
/// Rows without a numeric value on either axis are left out.
pub fn scatter_chart(
    rows: &[&Track],
    x_field: &str,
    y_field: &str,
    color_field: Option<&str>,
    title: &str,
) -> ChartSpec {
    let mut groups: BTreeMap<CellValue, Vec<Point>> = BTreeMap::new();

    for track in rows {
        let (Some(x), Some(y)) = (track.cell(x_field).as_f64(), track.cell(y_field).as_f64()) else {
            continue;
        };
        let key = color_field.map(|c| track.cell(c)).unwrap_or(CellValue::Null);
        groups.entry(key).or_default().push(Point {
            x,
            y,
            label: Some(format!("{} by {}", track.track_name, track.artist_name)),
        });
    }

    let series = match color_field {
        Some(column) => {
            let values: BTreeSet<CellValue> = groups.keys().cloned().collect();
            let colors = ColorMap::new(column, &values);
            groups
                .into_iter()
                .map(|(value, points)| Series {
                    name: if value.is_null() { "n/a".to_string() } else { value.to_string() },
                    color: colors.color_for(&value).to_string(),
                    points,
                })
                .collect()
        }
        None => groups
            .into_values()
            .map(|points| Series {
                name: "tracks".to_string(),
                color: DEFAULT_COLOR.to_string(),
                points,
            })
            .collect(),
    };

    ChartSpec {
        kind: ChartKind::Scatter,
        title: title.to_string(),
        x: Axis::numeric(x_field),
        y: Axis::numeric(y_field),
        color_field: color_field.map(str::to_string),
        series,
    }
}

/// The dashboard's scatter: playlist adds × streams, coloured by month.
pub fn playlist_scatter(rows: &[&Track]) -> ChartSpec {
    scatter_chart(rows, PLAYLIST_ADDS, STREAMS, Some(RELEASED_MONTH), SCATTER_TITLE)
}

/// Bar chart of streams per release month on a categorical 1..12 axis.
pub fn month_bar_chart(totals: &[MonthTotal], title: &str) -> ChartSpec {
    let points = totals
        .iter()
        .map(|t| Point {
            x: t.month as f64,
            y: t.streams as f64,
            label: None,
        })
        .collect();

    ChartSpec {
        kind: ChartKind::Bar,
        title: title.to_string(),
        x: Axis {
            field: RELEASED_MONTH.to_string(),
            title: RELEASED_MONTH.to_string(),
            category_order: Some(MONTH_ORDER.to_vec()),
        },
        y: Axis::numeric(STREAMS),
        color_field: None,
        series: vec![Series {
            name: STREAMS.to_string(),
            color: DEFAULT_COLOR.to_string(),
            points,
        }],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::streams_by_month;
    use crate::data::filter::tests::{example_dataset, track};

    #[test]
    fn test_scatter_defaults_and_month_series() {
        let ds = example_dataset();
        let rows: Vec<&Track> = ds.tracks.iter().collect();
        let chart = playlist_scatter(&rows);

        assert_eq!(chart.kind, ChartKind::Scatter);
        assert_eq!(chart.x.field, "playlist_adds");
        assert_eq!(chart.y.field, "streams");
        assert_eq!(chart.color_field.as_deref(), Some("released_month"));
        let names: Vec<&str> = chart.series.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["1", "3"]);
        assert_eq!(chart.point_count(), 3);

        let first = &chart.series[0].points[0];
        assert_eq!((first.x, first.y), (5.0, 100.0));
        assert_eq!(first.label.as_deref(), Some("A by X"));
    }

    #[test]
    fn test_scatter_without_color_is_single_series() {
        let ds = example_dataset();
        let rows: Vec<&Track> = ds.tracks.iter().collect();
        let chart = scatter_chart(&rows, PLAYLIST_ADDS, STREAMS, None, "t");
        assert_eq!(chart.series.len(), 1);
        assert_eq!(chart.series[0].points.len(), 3);
        assert!(chart.color_field.is_none());
    }

    #[test]
    fn test_scatter_skips_non_numeric_axes() {
        let ds = example_dataset();
        let rows: Vec<&Track> = ds.tracks.iter().collect();
        let chart = scatter_chart(&rows, "artist_name", STREAMS, None, "t");
        assert_eq!(chart.point_count(), 0);
    }

    #[test]
    fn test_month_bar_declares_category_order() {
        let tracks = [track("a", "x", 2023, 5, 7, 0), track("b", "x", 2023, 2, 3, 0)];
        let rows: Vec<&Track> = tracks.iter().collect();
        let chart = month_bar_chart(&streams_by_month(&rows), MONTH_BAR_TITLE);

        assert_eq!(chart.kind, ChartKind::Bar);
        assert_eq!(chart.x.category_order, Some((1..=12).collect()));
        let xs: Vec<f64> = chart.series[0].points.iter().map(|p| p.x).collect();
        assert_eq!(xs, vec![2.0, 5.0]);

        let json = serde_json::to_value(&chart).unwrap();
        assert_eq!(json["kind"], "bar");
        assert_eq!(json["x"]["category_order"][11], 12);
        assert!(json.get("color_field").is_none());
    }
}
