//! Request handler module
//!
//! Single-page-app fallback: serve the asset the request names, and when the
//! asset store has nothing for it, serve the fallback document instead so the
//! client-side router can take over.

pub mod env;
pub mod spa;

// Re-export main entry point
pub use env::Env;
pub use spa::handle;
