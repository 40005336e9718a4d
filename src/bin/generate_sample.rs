use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use arrow::array::{Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use clap::Parser;
use parquet::arrow::ArrowWriter;

/// Write a synthetic track dataset for trying the dashboard out.
#[derive(Parser, Debug)]
#[command(name = "generate_sample")]
struct Args {
    /// Output file; `.csv` or `.parquet`
    #[arg(default_value = "sample_tracks.csv")]
    output: PathBuf,

    /// Number of rows to generate
    #[arg(short, long, default_value_t = 500)]
    rows: usize,

    /// PRNG seed
    #[arg(long, default_value_t = 42)]
    seed: u64,
}

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn below(&mut self, n: usize) -> usize {
        (self.next_f64() * n as f64) as usize % n.max(1)
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

const ARTISTS: [&str; 10] = [
    "Taylor Swift",
    "The Weeknd",
    "Bad Bunny",
    "SZA",
    "Harry Styles",
    "Miley Cyrus",
    "Bad Bunny, Grupo Frontera",
    "Olivia Rodrigo",
    "Metro Boomin, The Weeknd, 21 Savage",
    "Eslabon Armado, Peso Pluma",
];
const WORDS: [&str; 12] = [
    "Flowers", "Night", "Summer", "Anti", "Hero", "Kill", "Bill", "Cruel", "Love", "Lights",
    "Vampire", "Daylight",
];
const YEARS: [i64; 6] = [2023, 2022, 2021, 2020, 2019, 2017];

struct Row {
    track_name: String,
    artist_name: Option<String>,
    released_year: i64,
    released_month: i64,
    in_spotify_playlists: Option<i64>,
    in_spotify_charts: i64,
    streams: i64,
    in_apple_charts: i64,
    in_shazam_charts: i64,
    bpm: i64,
}

fn generate(args: &Args) -> Vec<Row> {
    let mut rng = SimpleRng::new(args.seed);

    (0..args.rows)
        .map(|i| {
            let first = WORDS[rng.below(WORDS.len())];
            let second = WORDS[rng.below(WORDS.len())];
            let playlists = (rng.gauss(8.0, 1.2).exp()) as i64;
            let streams = (playlists as f64 * rng.gauss(60_000.0, 15_000.0).abs()) as i64;

            // Roughly one row in fifty lacks a required field.
            let artist_name = (i % 53 != 7).then(|| ARTISTS[rng.below(ARTISTS.len())].to_string());
            let in_spotify_playlists = (i % 47 != 11).then_some(playlists);

            Row {
                track_name: format!("{first} {second}"),
                artist_name,
                released_year: YEARS[rng.below(YEARS.len())],
                released_month: 1 + rng.below(12) as i64,
                in_spotify_playlists,
                in_spotify_charts: rng.below(150) as i64,
                streams,
                in_apple_charts: rng.below(300) as i64,
                in_shazam_charts: rng.below(1000) as i64,
                bpm: 70 + rng.below(110) as i64,
            }
        })
        .collect()
}

const HEADERS: [&str; 10] = [
    "track_name",
    "artist(s)_name",
    "released_year",
    "released_month",
    "in_spotify_playlists",
    "in_spotify_charts",
    "streams",
    "in_apple_charts",
    "in_shazam_charts",
    "bpm",
];

fn write_csv(path: &Path, rows: &[Row]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).context("creating CSV")?;
    writer.write_record(HEADERS)?;
    for r in rows {
        writer.write_record([
            r.track_name.clone(),
            r.artist_name.clone().unwrap_or_default(),
            r.released_year.to_string(),
            r.released_month.to_string(),
            r.in_spotify_playlists.map(|p| p.to_string()).unwrap_or_default(),
            r.in_spotify_charts.to_string(),
            r.streams.to_string(),
            r.in_apple_charts.to_string(),
            r.in_shazam_charts.to_string(),
            r.bpm.to_string(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

fn write_parquet(path: &Path, rows: &[Row]) -> Result<()> {
    let int_column = |f: fn(&Row) -> i64| Int64Array::from(rows.iter().map(f).collect::<Vec<_>>());

    let schema = Arc::new(Schema::new(vec![
        Field::new(HEADERS[0], DataType::Utf8, false),
        Field::new(HEADERS[1], DataType::Utf8, true),
        Field::new(HEADERS[2], DataType::Int64, false),
        Field::new(HEADERS[3], DataType::Int64, false),
        Field::new(HEADERS[4], DataType::Int64, true),
        Field::new(HEADERS[5], DataType::Int64, false),
        Field::new(HEADERS[6], DataType::Int64, false),
        Field::new(HEADERS[7], DataType::Int64, false),
        Field::new(HEADERS[8], DataType::Int64, false),
        Field::new(HEADERS[9], DataType::Int64, false),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.track_name.as_str()))),
            Arc::new(StringArray::from(
                rows.iter().map(|r| r.artist_name.as_deref()).collect::<Vec<_>>(),
            )),
            Arc::new(int_column(|r| r.released_year)),
            Arc::new(int_column(|r| r.released_month)),
            Arc::new(Int64Array::from(
                rows.iter().map(|r| r.in_spotify_playlists).collect::<Vec<_>>(),
            )),
            Arc::new(int_column(|r| r.in_spotify_charts)),
            Arc::new(int_column(|r| r.streams)),
            Arc::new(int_column(|r| r.in_apple_charts)),
            Arc::new(int_column(|r| r.in_shazam_charts)),
            Arc::new(int_column(|r| r.bpm)),
        ],
    )
    .context("building record batch")?;

    let file = std::fs::File::create(path).context("creating output file")?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch)?;
    writer.close()?;
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    let rows = generate(&args);

    let ext = args
        .output
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();
    match ext.as_str() {
        "csv" => write_csv(&args.output, &rows)?,
        "parquet" | "pq" => write_parquet(&args.output, &rows)?,
        other => bail!("Unsupported output extension: .{other}"),
    }

    println!("Wrote {} tracks to {}", rows.len(), args.output.display());
    Ok(())
}
