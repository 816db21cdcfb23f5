use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::Context;
use client_core::ControllerOptions;
use serde::Deserialize;

pub const DEFAULT_CONFIG_FILE: &str = "recommender.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub server_url: String,
    pub display_delay_ms: u64,
    pub notification_ttl_secs: u64,
    pub export_dir: PathBuf,
    pub log_filter: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:8080".into(),
            display_delay_ms: 2_000,
            notification_ttl_secs: 5,
            export_dir: PathBuf::from("."),
            log_filter: "info".into(),
        }
    }
}

impl Settings {
    pub fn controller_options(&self) -> ControllerOptions {
        ControllerOptions {
            display_delay: Duration::from_millis(self.display_delay_ms),
            notification_ttl: Duration::from_secs(self.notification_ttl_secs),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileSettings {
    server_url: Option<String>,
    display_delay_ms: Option<u64>,
    notification_ttl_secs: Option<u64>,
    export_dir: Option<PathBuf>,
    log_filter: Option<String>,
}

/// Defaults, then `recommender.toml` (or `explicit_path`), then environment.
/// A missing default file is ignored; a missing explicit file is an error.
pub fn load_settings(explicit_path: Option<&Path>) -> anyhow::Result<Settings> {
    let mut settings = Settings::default();

    let path = explicit_path.unwrap_or(Path::new(DEFAULT_CONFIG_FILE));
    match fs::read_to_string(path) {
        Ok(raw) => apply_file(&mut settings, &raw)
            .with_context(|| format!("invalid config file '{}'", path.display()))?,
        Err(err) if err.kind() == ErrorKind::NotFound && explicit_path.is_none() => {}
        Err(err) => {
            return Err(err)
                .with_context(|| format!("failed to read config file '{}'", path.display()))
        }
    }

    apply_env(&mut settings, |key| std::env::var(key).ok());
    Ok(settings)
}

fn apply_file(settings: &mut Settings, raw: &str) -> anyhow::Result<()> {
    let file_cfg: FileSettings = toml::from_str(raw)?;
    if let Some(v) = file_cfg.server_url {
        settings.server_url = v;
    }
    if let Some(v) = file_cfg.display_delay_ms {
        settings.display_delay_ms = v;
    }
    if let Some(v) = file_cfg.notification_ttl_secs {
        settings.notification_ttl_secs = v;
    }
    if let Some(v) = file_cfg.export_dir {
        settings.export_dir = v;
    }
    if let Some(v) = file_cfg.log_filter {
        settings.log_filter = v;
    }
    Ok(())
}

fn apply_env(settings: &mut Settings, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(v) = lookup("BLOG_RECOMMENDER_URL") {
        settings.server_url = v;
    }
    if let Some(v) = lookup("APP__SERVER_URL") {
        settings.server_url = v;
    }

    if let Some(v) = lookup("APP__DISPLAY_DELAY_MS") {
        if let Ok(parsed) = v.parse::<u64>() {
            settings.display_delay_ms = parsed;
        }
    }
    if let Some(v) = lookup("APP__NOTIFICATION_TTL_SECS") {
        if let Ok(parsed) = v.parse::<u64>() {
            settings.notification_ttl_secs = parsed;
        }
    }

    if let Some(v) = lookup("APP__EXPORT_DIR") {
        settings.export_dir = PathBuf::from(v);
    }
}
