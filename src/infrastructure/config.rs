// Settings loading - File and environment layered configuration
use anyhow::{Context, ensure};
use config::builder::DefaultState;
use config::{ConfigBuilder, Environment, File};
use serde::Deserialize;
use std::net::SocketAddr;
use std::time::Duration;

pub const DEFAULT_SETTINGS_FILE: &str = "config/shelly";
pub const DEFAULT_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const ENV_PREFIX: &str = "SHELLY_PANEL";

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub endpoint: Option<String>,
    pub refresh_interval_secs: u64,
    pub datetime_format: String,
    pub use_fahrenheit: bool,
    pub use_eu_format: bool,
    pub listen_addr: SocketAddr,
    pub request_timeout_secs: u64,
}

/// Snapshot of the options the poll cycle reads. Held immutably per run.
#[derive(Debug, Clone, PartialEq)]
pub struct PanelConfig {
    pub endpoint: Option<String>,
    pub refresh_interval_secs: u64,
    pub datetime_format: String,
    pub use_fahrenheit: bool,
    pub use_eu_format: bool,
}

impl PanelConfig {
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs.max(1))
    }
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            refresh_interval_secs: 10,
            datetime_format: DEFAULT_DATETIME_FORMAT.to_string(),
            use_fahrenheit: false,
            use_eu_format: false,
        }
    }
}

impl AppConfig {
    pub fn panel(&self) -> PanelConfig {
        PanelConfig {
            endpoint: self.endpoint.clone(),
            refresh_interval_secs: self.refresh_interval_secs,
            datetime_format: self.datetime_format.clone(),
            use_fahrenheit: self.use_fahrenheit,
            use_eu_format: self.use_eu_format,
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn with_defaults() -> anyhow::Result<ConfigBuilder<DefaultState>> {
    let defaults = PanelConfig::default();
    Ok(config::Config::builder()
        .set_default("refresh_interval_secs", defaults.refresh_interval_secs)?
        .set_default("datetime_format", defaults.datetime_format)?
        .set_default("use_fahrenheit", defaults.use_fahrenheit)?
        .set_default("use_eu_format", defaults.use_eu_format)?
        .set_default("listen_addr", "127.0.0.1:8089")?
        .set_default("request_timeout_secs", 10)?)
}

/// Load settings from `path` (optional, any format the config crate knows)
/// overridden by `SHELLY_PANEL_*` environment variables.
pub fn load_app_config(path: &str) -> anyhow::Result<AppConfig> {
    let builder = with_defaults()?
        .add_source(File::with_name(path).required(false))
        .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true));

    build(builder).with_context(|| format!("Failed to load settings from {}", path))
}

fn build(builder: ConfigBuilder<DefaultState>) -> anyhow::Result<AppConfig> {
    let mut settings: AppConfig = builder.build()?.try_deserialize()?;

    ensure!(
        settings.refresh_interval_secs >= 1,
        "refresh_interval_secs must be at least 1"
    );

    // Blank endpoints behave as unset
    if settings
        .endpoint
        .as_deref()
        .is_some_and(|e| e.trim().is_empty())
    {
        settings.endpoint = None;
    }

    Ok(settings)
}
