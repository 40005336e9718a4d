//! Interactive dashboard over a static dataset of song streaming metadata.
//!
//! The dataset is loaded once ([`data::loader::load_file`]), wrapped in a
//! read-only [`state::DashboardState`], and served by the axum router from
//! [`web::build_router`]. Every chart, list and table is a pure function of
//! the dataset and the request's inputs.

pub mod chart;
pub mod color;
pub mod config;
pub mod data;
pub mod preview;
pub mod state;
pub mod web;
