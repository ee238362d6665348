// Configuration module entry point
// Loads the server configuration and holds the shared runtime state

mod state;
mod types;

use std::net::SocketAddr;

// Re-export public types
pub use state::AppState;
pub use types::{AssetsConfig, Config, HttpConfig, LoggingConfig, PerformanceConfig, ServerConfig};

/// Config file used when none is given on the command line (extension optional)
pub const DEFAULT_CONFIG_PATH: &str = "config";

impl Config {
    /// Load configuration from specified file path (without extension)
    /// Missing files are fine; every key has a default
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        Self::load_with_env(config_path, environment())
    }

    /// Load configuration with an explicit environment source layered over the file
    pub fn load_with_env(
        config_path: &str,
        env: config::Environment,
    ) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(env)
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("assets.directory", "public")?
            .set_default("assets.cache_max_age", 3600)?
            .set_default("logging.access_log", true)?
            .set_default("performance.keep_alive_timeout", 75)?
            .set_default("performance.read_timeout", 30)?
            .set_default("performance.write_timeout", 30)?
            .set_default("http.server_name", "spa-fallback")?
            .set_default("http.enable_cors", false)?
            .build()?;

        settings.try_deserialize()
    }

    /// Defaults only, isolated from the process environment
    #[cfg(test)]
    pub(crate) fn defaults() -> Self {
        Self::load_with_env("does-not-exist/spa-fallback", env_from(&[]))
            .expect("defaults always deserialize")
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }
}

/// `SPA_` variables, `__` between nested keys: `SPA_SERVER__PORT=9000`
fn environment() -> config::Environment {
    config::Environment::with_prefix("SPA")
        .prefix_separator("_")
        .separator("__")
}

/// `SPA_` environment read from `vars` instead of the process
#[cfg(test)]
fn env_from(vars: &[(&str, &str)]) -> config::Environment {
    let source = vars
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect::<config::Map<String, String>>();
    environment().source(Some(source))
}
