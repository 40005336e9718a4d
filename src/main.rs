use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;

use spotify_dashboard::config::Args;
use spotify_dashboard::data::loader::load_file;
use spotify_dashboard::preview;
use spotify_dashboard::state::DashboardState;
use spotify_dashboard::web::build_router;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let addr = args.socket_addr()?;

    let dataset = load_file(&args.data)
        .with_context(|| format!("loading dataset {}", args.data.display()))?;
    log::info!(
        "Loaded {} tracks from {} ({} rows dropped for missing fields)",
        dataset.len(),
        args.data.display(),
        dataset.dropped_rows
    );
    log::info!("Release years: {:?}", dataset.years);

    match &args.preview_dir {
        Some(dir) => {
            for path in preview::write_previews(&dataset, dir)? {
                log::info!("Wrote preview chart {}", path.display());
            }
        }
        None => {
            let (scatter, bar) = preview::preview_charts(&dataset);
            log::info!(
                "Preview charts: {} scatter points, {} month bars",
                scatter.point_count(),
                bar.point_count()
            );
        }
    }

    let state = Arc::new(DashboardState::new(dataset, args.page_size));
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    log::info!("Dashboard listening on http://{addr}");
    axum::serve(listener, app).await?;

    Ok(())
}
