//! Whole-dataset preview charts built once at startup.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::chart::{self, ChartSpec};
use crate::data::filter::streams_by_month;
use crate::data::model::{PLAYLIST_ADDS, STREAMS, Track, TrackDataset};

pub const SCATTER_PREVIEW_TITLE: &str = "Scatter Plot of Playlist Adds vs Streams";
pub const BAR_PREVIEW_TITLE: &str = "Bar Graph Streams by Released month";

pub const SCATTER_PREVIEW_FILE: &str = "scatter_preview.json";
pub const BAR_PREVIEW_FILE: &str = "bar_preview.json";

/// The two preview charts over every track, unfiltered and uncoloured.
pub fn preview_charts(dataset: &TrackDataset) -> (ChartSpec, ChartSpec) {
    let rows: Vec<&Track> = dataset.tracks.iter().collect();
    let scatter = chart::scatter_chart(&rows, PLAYLIST_ADDS, STREAMS, None, SCATTER_PREVIEW_TITLE);
    let bar = chart::month_bar_chart(&streams_by_month(&rows), BAR_PREVIEW_TITLE);
    (scatter, bar)
}

/// Write both previews as JSON into `dir`, creating it if needed.
pub fn write_previews(dataset: &TrackDataset, dir: &Path) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;

    let (scatter, bar) = preview_charts(dataset);
    let mut written = Vec::with_capacity(2);
    for (name, spec) in [(SCATTER_PREVIEW_FILE, &scatter), (BAR_PREVIEW_FILE, &bar)] {
        let path = dir.join(name);
        let json = serde_json::to_string_pretty(spec).context("serializing preview chart")?;
        std::fs::write(&path, json).with_context(|| format!("writing {}", path.display()))?;
        written.push(path);
    }
    Ok(written)
}
