//! Probe service HTTP handlers.

mod cors;
mod download;
mod probe;

pub use cors::{cors_headers, preflight_handler};
pub use download::download_handler;
pub use probe::probe_handler;
