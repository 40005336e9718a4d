//! HTTP surface: router, JSON handlers and the two dashboard pages.

pub mod error;
pub mod handlers;
pub mod pages;
pub mod router;

pub use router::build_router;
