// Application state module
// Everything a connection task needs, shared read-only through an Arc

use super::types::Config;
use crate::assets::DirAssetStore;
use crate::handler::Env;

/// Application state
pub struct AppState {
    pub config: Config,
    /// Environment binding handed to the request handler
    pub env: Env<DirAssetStore>,
}

impl AppState {
    pub fn new(config: &Config) -> Self {
        let assets = DirAssetStore::from_config(&config.assets, &config.http);
        Self {
            config: config.clone(),
            env: Env::new(assets),
        }
    }
}
