//! Single-page-app fallback server
//!
//! [`handler::handle`] asks an [`assets::AssetStore`] for the requested path
//! and, when the store answers 404, asks again for `index.html` so a
//! client-side router can resolve deep links. The rest of the crate is the
//! host around it: a directory-backed asset store, a hyper server,
//! configuration and logging.

pub mod assets;
pub mod config;
pub mod handler;
pub mod http;
pub mod logger;
pub mod server;
