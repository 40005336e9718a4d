use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use arrow::array::{Array, AsArray};
use arrow::datatypes::{DataType, Float32Type, Float64Type, Int32Type, Int64Type};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{CellValue, TEXT_COLUMNS, TrackDataset, canonical_column};

type RawRecord = BTreeMap<String, CellValue>;

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a track dataset from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row plus one track per line (the usual export)
/// * `.json`    – `[{ "track_name": ..., "streams": ..., ... }, ...]`
/// * `.parquet` – flat scalar columns, as written by `df.to_parquet()`
pub fn load_file(path: &Path) -> Result<TrackDataset> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let (headers, records) = match ext.as_str() {
        "csv" => read_csv(path)?,
        "json" => read_json(path)?,
        "parquet" | "pq" => read_parquet(path)?,
        other => bail!("Unsupported file extension: .{other}"),
    };

    let dataset = TrackDataset::from_records(&headers, records)
        .with_context(|| format!("validating {}", path.display()))?;

    let zero_streams = dataset.tracks.iter().filter(|t| t.streams == 0).count();
    if zero_streams > 0 {
        log::warn!("{zero_streams} tracks have no usable stream count; counted as 0");
    }

    Ok(dataset)
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names, one track per record.
/// Cells are decoded lossily so that Latin-1 exports still load. Name
/// columns are kept as written; every other cell is type-guessed.
fn read_csv(path: &Path) -> Result<(Vec<String>, Vec<RawRecord>)> {
    let mut reader = csv::Reader::from_path(path).context("opening CSV")?;
    let headers: Vec<String> = reader
        .byte_headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| canonical_column(&String::from_utf8_lossy(h)))
        .collect();

    let mut records = Vec::new();

    for (row_no, result) in reader.byte_records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;

        let raw: RawRecord = headers
            .iter()
            .zip(record.iter())
            .map(|(col, value)| {
                let value = String::from_utf8_lossy(value);
                let cell = if TEXT_COLUMNS.contains(&col.as_str()) {
                    CellValue::text(&value)
                } else {
                    CellValue::parse(&value)
                };
                (col.clone(), cell)
            })
            .collect();

        records.push(raw);
    }

    Ok((headers, records))
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "track_name": "Flowers", "artist(s)_name": "Miley Cyrus",
///     "released_year": 2023, "released_month": 1, "streams": 1316855716, ... },
///   ...
/// ]
/// ```
///
/// The header is the union of keys in first-seen order.
fn read_json(path: &Path) -> Result<(Vec<String>, Vec<RawRecord>)> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    let rows = root.as_array().context("Expected top-level JSON array")?;

    let mut headers: Vec<String> = Vec::new();
    let mut records = Vec::with_capacity(rows.len());

    for (i, row) in rows.iter().enumerate() {
        let obj = row
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;

        let mut raw = RawRecord::new();
        for (key, val) in obj {
            let col = canonical_column(key);
            if !headers.contains(&col) {
                headers.push(col.clone());
            }
            raw.insert(col, json_to_cell(val));
        }
        records.push(raw);
    }

    Ok((headers, records))
}

fn json_to_cell(val: &JsonValue) -> CellValue {
    match val {
        JsonValue::String(s) => CellValue::String(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                CellValue::Integer(i)
            } else if let Some(f) = n.as_f64() {
                CellValue::Float(f)
            } else {
                CellValue::String(n.to_string())
            }
        }
        JsonValue::Bool(b) => CellValue::Bool(*b),
        JsonValue::Null => CellValue::Null,
        other => CellValue::String(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file of tracks.
///
/// Every column must be a flat scalar (string, integer, float, bool).
/// Works with files written by both **Pandas** and **Polars**; nullable
/// integer columns written as floats are accepted.
fn read_parquet(path: &Path) -> Result<(Vec<String>, Vec<RawRecord>)> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let headers: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| canonical_column(f.name()))
        .collect();
    let reader = builder.build().context("building parquet reader")?;

    let mut records = Vec::new();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;

        for row in 0..batch.num_rows() {
            let raw: RawRecord = headers
                .iter()
                .zip(batch.columns())
                .map(|(col, array)| (col.clone(), extract_cell(array, row)))
                .collect();
            records.push(raw);
        }
    }

    Ok((headers, records))
}

/// Extract a single cell from an Arrow column at a given row.
fn extract_cell(col: &Arc<dyn Array>, row: usize) -> CellValue {
    if col.is_null(row) {
        return CellValue::Null;
    }
    match col.data_type() {
        DataType::Utf8 => CellValue::String(col.as_string::<i32>().value(row).to_string()),
        DataType::LargeUtf8 => CellValue::String(col.as_string::<i64>().value(row).to_string()),
        DataType::Int32 => CellValue::Integer(col.as_primitive::<Int32Type>().value(row) as i64),
        DataType::Int64 => CellValue::Integer(col.as_primitive::<Int64Type>().value(row)),
        DataType::Float32 => CellValue::Float(col.as_primitive::<Float32Type>().value(row) as f64),
        DataType::Float64 => CellValue::Float(col.as_primitive::<Float64Type>().value(row)),
        DataType::Boolean => CellValue::Bool(col.as_boolean().value(row)),
        other => {
            log::debug!("unsupported parquet column type {other:?}, reading as null");
            CellValue::Null
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use arrow::array::{Float64Array, Int64Array, StringArray};
    use arrow::datatypes::{Field, Schema};
    use arrow::record_batch::RecordBatch;
    use parquet::arrow::ArrowWriter;

    use super::*;
    use crate::data::model::SchemaError;

    fn write_temp(suffix: &str, contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    const SAMPLE_CSV: &str = "\
track_name,artist(s)_name,released_year,released_month,in_spotify_playlists,in_spotify_charts,streams,in_apple_charts,in_shazam_charts,bpm
Flowers,Miley Cyrus,2023,1,12211,115,\"1,316,855,716\",300,1021,118
Kill Bill,SZA,2022,12,8109,77,1163093654,87,,89
No Year,Someone,,5,10,1,100,1,1,100
Orphan,,2021,3,10,1,100,1,1,100
";

    #[test]
    fn test_load_csv_drops_columns_and_incomplete_rows() {
        let file = write_temp(".csv", SAMPLE_CSV);
        let ds = load_file(file.path()).unwrap();

        assert_eq!(ds.len(), 2);
        assert_eq!(ds.dropped_rows, 2);
        assert_eq!(ds.years, vec![2023, 2022]);
        assert!(ds.has_column("artist_name"));
        assert!(!ds.has_column("in_shazam_charts"));

        let flowers = &ds.tracks[0];
        assert_eq!(flowers.artist_name, "Miley Cyrus");
        assert_eq!(flowers.streams, 1_316_855_716);
        assert_eq!(flowers.released_month, Some(1));
        assert_eq!(flowers.playlist_adds, 12211);
    }

    #[test]
    fn test_load_csv_keeps_names_verbatim() {
        let file = write_temp(
            ".csv",
            "track_name,artist(s)_name,released_year,released_month,in_spotify_playlists,streams\n\
             Infinity,Jaymes Young,2017,6,4375,888046992\n\
             007,NaN,2022,2,10,100\n\
             1989,Taylor Swift,2014,10,20,300\n",
        );
        let ds = load_file(file.path()).unwrap();
        let names: Vec<(&str, &str)> = ds
            .tracks
            .iter()
            .map(|t| (t.track_name.as_str(), t.artist_name.as_str()))
            .collect();
        assert_eq!(
            names,
            vec![("Infinity", "Jaymes Young"), ("007", "NaN"), ("1989", "Taylor Swift")]
        );

        match crate::data::filter::search(&ds, Some("infinity")) {
            crate::data::filter::SearchOutcome::Matches(rows) => {
                assert_eq!(rows[0].track_name, "Infinity");
            }
            other => panic!("expected a match, got {other:?}"),
        }
    }

    #[test]
    fn test_load_csv_missing_required_column_is_fatal() {
        let file = write_temp(".csv", "track_name,released_year,in_spotify_playlists\nA,2023,1\n");
        let err = load_file(file.path()).unwrap_err();
        let schema = err.downcast_ref::<SchemaError>().expect("schema error");
        assert_eq!(*schema, SchemaError::MissingColumn("artist_name".into()));
    }

    #[test]
    fn test_load_json_records() {
        let file = write_temp(
            ".json",
            r#"[
                {"track_name": "A", "artist(s)_name": "X", "released_year": 2023,
                 "released_month": 1, "streams": 100, "in_spotify_playlists": 5},
                {"track_name": "B", "artist(s)_name": null, "released_year": 2023,
                 "released_month": 1, "streams": 50, "in_spotify_playlists": 2}
            ]"#,
        );
        let ds = load_file(file.path()).unwrap();
        assert_eq!(ds.len(), 1);
        assert_eq!(ds.dropped_rows, 1);
        assert_eq!(ds.tracks[0].track_name, "A");
    }

    #[test]
    fn test_load_parquet_with_float_years() {
        let schema = Arc::new(Schema::new(vec![
            Field::new("track_name", DataType::Utf8, false),
            Field::new("artist(s)_name", DataType::Utf8, true),
            Field::new("released_year", DataType::Float64, true),
            Field::new("in_spotify_playlists", DataType::Int64, false),
            Field::new("streams", DataType::Int64, false),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(StringArray::from(vec!["A", "B"])),
                Arc::new(StringArray::from(vec![Some("X"), None])),
                Arc::new(Float64Array::from(vec![Some(2023.0), Some(2022.0)])),
                Arc::new(Int64Array::from(vec![5, 2])),
                Arc::new(Int64Array::from(vec![100, 50])),
            ],
        )
        .unwrap();

        let file = tempfile::Builder::new().suffix(".parquet").tempfile().unwrap();
        let mut writer = ArrowWriter::try_new(std::fs::File::create(file.path()).unwrap(), schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let ds = load_file(file.path()).unwrap();
        assert_eq!(ds.len(), 1);
        assert_eq!(ds.tracks[0].released_year, 2023);
        assert_eq!(ds.tracks[0].streams, 100);
    }

    #[test]
    fn test_unknown_extension_is_rejected() {
        let file = write_temp(".xlsx", "");
        assert!(load_file(file.path()).is_err());
    }
}
