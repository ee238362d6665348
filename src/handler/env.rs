//! Environment binding passed to the handler on every invocation

use crate::assets::AssetStore;

/// Host-provided capabilities available to the request handler
#[derive(Debug, Clone)]
pub struct Env<S> {
    pub assets: S,
}

impl<S: AssetStore> Env<S> {
    pub const fn new(assets: S) -> Self {
        Self { assets }
    }
}
