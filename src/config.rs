use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use crate::data::table::DEFAULT_PAGE_SIZE;

/// Command-line arguments; every flag can also come from the environment.
#[derive(Parser, Debug, Clone)]
#[command(name = "spotify-dashboard")]
#[command(about = "Web dashboard for song streaming metadata")]
#[command(version)]
pub struct Args {
    /// Track dataset to serve (.csv, .json or .parquet)
    #[arg(short, long, default_value = "spotify-2023.csv", env = "SPOTIFY_DATA")]
    pub data: PathBuf,

    /// Address to bind
    #[arg(long, default_value = "127.0.0.1", env = "DASHBOARD_HOST")]
    pub host: String,

    /// Port to listen on
    #[arg(short, long, default_value_t = 8050, env = "DASHBOARD_PORT")]
    pub port: u16,

    /// Rows per page in the search table
    #[arg(long, default_value_t = DEFAULT_PAGE_SIZE, env = "DASHBOARD_PAGE_SIZE")]
    pub page_size: usize,

    /// Write the startup preview charts as JSON into this directory
    #[arg(long, env = "DASHBOARD_PREVIEW_DIR")]
    pub preview_dir: Option<PathBuf>,
}

impl Args {
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("invalid bind address {}:{}", self.host, self.port))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use clap::CommandFactory;

    fn default_of(id: &str) -> Vec<String> {
        Args::command()
            .get_arguments()
            .find(|arg| arg.get_id() == id)
            .map(|arg| {
                arg.get_default_values()
                    .iter()
                    .map(|v| v.to_string_lossy().into_owned())
                    .collect()
            })
            .unwrap_or_default()
    }

    // Read from the command definition so exported env vars cannot interfere.
    #[test]
    fn test_defaults() {
        assert_eq!(default_of("data"), ["spotify-2023.csv"]);
        assert_eq!(default_of("host"), ["127.0.0.1"]);
        assert_eq!(default_of("port"), ["8050"]);
        assert_eq!(default_of("page_size"), ["10"]);
        assert!(default_of("preview_dir").is_empty());
    }

    #[test]
    fn test_socket_addr() {
        let args =
            Args::try_parse_from(["spotify-dashboard", "--host", "127.0.0.1", "--port", "8050"]).unwrap();
        assert_eq!(args.socket_addr().unwrap().to_string(), "127.0.0.1:8050");
    }

    #[test]
    fn test_flags_override_defaults() {
        let args = Args::try_parse_from([
            "spotify-dashboard",
            "--data",
            "tracks.parquet",
            "--host",
            "0.0.0.0",
            "--port",
            "9000",
            "--preview-dir",
            "out",
        ])
        .unwrap();
        assert_eq!(args.data, PathBuf::from("tracks.parquet"));
        assert_eq!(args.socket_addr().unwrap().port(), 9000);
        assert_eq!(args.preview_dir, Some(PathBuf::from("out")));
    }

    #[test]
    fn test_bad_host_is_an_error() {
        let args = Args::try_parse_from(["spotify-dashboard", "--host", "not a host"]).unwrap();
        assert!(args.socket_addr().is_err());
    }
}
