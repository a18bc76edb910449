use std::env;
use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::Context;
use tracing::debug;

pub struct Config {
    pub api_url: String,
    pub state_dir: PathBuf,
    /// Unread-badge polling period
    pub poll: Duration,
    /// Orphanage dashboard refresh period
    pub refresh: Duration,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        Ok(Self {
            api_url: load("SAVEPLATE_API_URL", saveplate_client::DEFAULT_API_URL)?,
            state_dir: load("SAVEPLATE_STATE_DIR", ".saveplate")?,
            poll: Duration::from_secs(load("SAVEPLATE_POLL_SECS", "30")?),
            refresh: Duration::from_secs(load("SAVEPLATE_REFRESH_SECS", "20")?),
        })
    }

    pub fn local_store(&self) -> PathBuf {
        self.state_dir.join("local.json")
    }

    pub fn session_store(&self) -> PathBuf {
        self.state_dir.join("session.json")
    }
}

fn load<T>(key: &str, default: &str) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    let raw = env::var(key).unwrap_or_else(|_| {
        debug!("{key} not set, using default: {default}");
        default.to_string()
    });
    raw.parse()
        .map_err(|e| anyhow::anyhow!("{e}"))
        .with_context(|| format!("invalid {key} value {raw:?}"))
}
