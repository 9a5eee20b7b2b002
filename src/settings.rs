use std::path::PathBuf;
use std::time::Duration;

use anyhow::{ensure, Result};
use config::{builder::DefaultState, Config, ConfigBuilder, Environment, File};
use serde::Deserialize;

use crate::parser::classify::CollisionPolicy;

const CONFIG_FILE: &str = "coin_tracker";
const ENV_PREFIX: &str = "COIN";

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub url: String,
    pub top_n: usize,
    pub presence_timeout_secs: u64,
    pub poll_interval_ms: u64,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    pub output: PathBuf,
    pub collision: CollisionPolicy,
}

impl Settings {
    /// Defaults, then `coin_tracker.{toml,json,yaml}` if present, then
    /// `COIN_*` environment variables.
    pub fn load() -> Result<Self> {
        let cfg = defaults()?
            .add_source(File::with_name(CONFIG_FILE).required(false))
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?;
        Self::from_config(cfg)
    }

    pub fn from_config(cfg: Config) -> Result<Self> {
        let settings: Settings = cfg.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(self.top_n >= 1, "top_n must be at least 1");
        ensure!(self.presence_timeout_secs >= 1, "presence_timeout_secs must be at least 1");
        ensure!(self.request_timeout_secs >= 1, "request_timeout_secs must be at least 1");
        ensure!(self.poll_interval_ms >= 1, "poll_interval_ms must be at least 1");
        ensure!(!self.url.trim().is_empty(), "url must not be empty");
        Ok(())
    }

    pub fn presence_timeout(&self) -> Duration {
        Duration::from_secs(self.presence_timeout_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn defaults() -> Result<ConfigBuilder<DefaultState>> {
    Ok(Config::builder()
        .set_default("url", "https://coinmarketcap.com/")?
        .set_default("top_n", 10_i64)?
        .set_default("presence_timeout_secs", 20_i64)?
        .set_default("poll_interval_ms", 1000_i64)?
        .set_default("request_timeout_secs", 15_i64)?
        .set_default("user_agent", DEFAULT_USER_AGENT)?
        .set_default("output", "crypto_data.csv")?
        .set_default("collision", "prefer_price")?)
}
