use std::{fs, path::Path, time::Duration};

use anyhow::Context;
use serde::Deserialize;

use crate::kernel::controller::ControllerConfig;
use crate::kernel::ticker::TICK_MS;

pub const SETTINGS_FILE: &str = "axiomai.toml";

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub backend_url: String,
    pub tick_period_ms: u64,
    pub request_timeout_secs: Option<u64>,
    pub log_filter: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            backend_url: "http://localhost:8000".into(),
            tick_period_ms: TICK_MS,
            request_timeout_secs: None,
            log_filter: "info".into(),
        }
    }
}

/// On-disk shape. Every key is optional; missing keys keep the default.
#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    backend_url: Option<String>,
    tick_period_ms: Option<u64>,
    request_timeout_secs: Option<u64>,
    log_filter: Option<String>,
}

impl Settings {
    pub fn controller_config(&self) -> ControllerConfig {
        ControllerConfig {
            tick_period: Duration::from_millis(self.tick_period_ms.max(1)),
        }
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    pub fn from_toml_str(raw: &str) -> anyhow::Result<Self> {
        let file_cfg: FileSettings = toml::from_str(raw).context("invalid settings file")?;
        let mut settings = Settings::default();

        if let Some(v) = file_cfg.backend_url {
            settings.backend_url = v;
        }
        if let Some(v) = file_cfg.tick_period_ms {
            settings.tick_period_ms = v;
        }
        if let Some(v) = file_cfg.request_timeout_secs {
            settings.request_timeout_secs = Some(v);
        }
        if let Some(v) = file_cfg.log_filter {
            settings.log_filter = v;
        }

        settings.tick_period_ms = settings.tick_period_ms.max(1);
        Ok(settings)
    }

    /// Environment overrides. Numbers that don't parse are ignored.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(v) = lookup("AXIOMAI_BACKEND_URL") {
            self.backend_url = v;
        }
        if let Some(v) = lookup("AXIOMAI_TICK_PERIOD_MS") {
            if let Ok(parsed) = v.parse::<u64>() {
                self.tick_period_ms = parsed.max(1);
            }
        }
        if let Some(v) = lookup("AXIOMAI_REQUEST_TIMEOUT_SECS") {
            if let Ok(parsed) = v.parse::<u64>() {
                self.request_timeout_secs = Some(parsed);
            }
        }
        if let Some(v) = lookup("AXIOMAI_LOG") {
            self.log_filter = v;
        }
    }
}

/// `.env`, then `axiomai.toml` in the working directory, then the process environment.
pub fn load_settings() -> anyhow::Result<Settings> {
    let _ = dotenvy::dotenv();

    let mut settings = load_settings_file(Path::new(SETTINGS_FILE))?;
    settings.apply_overrides(|key| std::env::var(key).ok());
    Ok(settings)
}

pub fn load_settings_file(path: &Path) -> anyhow::Result<Settings> {
    if !path.exists() {
        return Ok(Settings::default());
    }

    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read settings file '{}'", path.display()))?;
    Settings::from_toml_str(&raw)
        .with_context(|| format!("failed to parse settings file '{}'", path.display()))
}
