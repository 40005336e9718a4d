/// Data layer: core types, loading, filtering and the table view.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → raw records
///   └──────────┘
///        │
///        ▼
///   ┌──────────────┐
///   │ TrackDataset  │  Vec<Track>, columns, years (required fields checked)
///   └──────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  year + text predicates → rows / month totals / search
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  table    │  column filters, multi-sort, pages of 10
///   └──────────┘
/// ```

pub mod filter;
pub mod loader;
pub mod model;
pub mod table;
