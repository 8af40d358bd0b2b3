// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use devdex_api::DEFAULT_BASE_URL;
use devdex_app::{
    DEFAULT_IMAGE_SERVICE_BASE, DEFAULT_OVERSCAN, DEFAULT_STATIC_IMAGE_BASE,
    DEFAULT_SUGGESTION_LIMIT, ImageUrls, ViewMode,
};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const APP_NAME: &str = "devdex";
pub const CONFIG_PATH_ENV: &str = "DEVDEX_CONFIG_PATH";

const CONFIG_VERSION: i64 = 1;
const DEFAULT_TIMEOUT: &str = "10s";
const DEFAULT_LOG_LEVEL: &str = "warn";
const LOG_LEVELS: [&str; 6] = ["off", "error", "warn", "info", "debug", "trace"];

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    pub version: i64,
    #[serde(default)]
    pub source: Source,
    #[serde(default)]
    pub images: Images,
    #[serde(default)]
    pub ui: Ui,
    #[serde(default)]
    pub log: Log,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Source {
    pub base_url: Option<String>,
    pub timeout: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Images {
    pub static_base: Option<String>,
    pub service_base: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Ui {
    pub default_view: Option<String>,
    pub suggestion_limit: Option<i64>,
    pub overscan: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Log {
    pub level: Option<String>,
    pub file: Option<String>,
}

impl Config {
    pub fn default_path() -> Result<PathBuf> {
        if let Some(path) = env::var_os(CONFIG_PATH_ENV) {
            return Ok(PathBuf::from(path));
        }

        let config_root = dirs::config_dir().ok_or_else(|| {
            anyhow!("cannot resolve config directory; set {CONFIG_PATH_ENV} to the config file")
        })?;

        let app_dir = config_root.join(APP_NAME);
        fs::create_dir_all(&app_dir)
            .with_context(|| format!("create config directory {}", app_dir.display()))?;
        Ok(app_dir.join("config.toml"))
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self {
                version: CONFIG_VERSION,
                ..Self::default()
            });
        }

        let raw = fs::read_to_string(path)
            .with_context(|| format!("read config file {}", path.display()))?;
        let value: toml::Value = toml::from_str(&raw)
            .with_context(|| format!("parse TOML config {}", path.display()))?;

        let version = value
            .get("version")
            .and_then(toml::Value::as_integer)
            .ok_or_else(|| {
                anyhow!(
                    "config file {} has no version; add `version = 1` and keep values under [source], [images], [ui] and [log]",
                    path.display()
                )
            })?;

        if version != CONFIG_VERSION {
            bail!(
                "unsupported config version {} in {}; expected version = 1",
                version,
                path.display()
            );
        }

        let config: Config = value
            .try_into()
            .with_context(|| format!("decode config {}", path.display()))?;
        config.validate(path)?;
        Ok(config)
    }

    fn validate(&self, path: &Path) -> Result<()> {
        if let Some(base_url) = &self.source.base_url
            && base_url.trim().is_empty()
        {
            bail!("source.base_url in {} must not be empty", path.display());
        }

        if let Some(timeout) = &self.source.timeout {
            let parsed = parse_duration(timeout)?;
            if parsed <= Duration::ZERO {
                bail!(
                    "source.timeout in {} must be positive, got {}",
                    path.display(),
                    timeout
                );
            }
        }

        if let Some(view) = &self.ui.default_view
            && ViewMode::parse(view).is_none()
        {
            let known: Vec<&str> = ViewMode::ALL.iter().map(|mode| mode.as_str()).collect();
            bail!(
                "ui.default_view in {} must be one of {}, got {view:?}",
                path.display(),
                known.join(", ")
            );
        }

        if let Some(limit) = self.ui.suggestion_limit
            && limit <= 0
        {
            bail!(
                "ui.suggestion_limit in {} must be positive, got {}",
                path.display(),
                limit
            );
        }

        if let Some(overscan) = self.ui.overscan
            && overscan < 0
        {
            bail!(
                "ui.overscan in {} must be non-negative, got {}",
                path.display(),
                overscan
            );
        }

        if let Some(level) = &self.log.level
            && !LOG_LEVELS.contains(&level.to_ascii_lowercase().as_str())
        {
            bail!(
                "log.level in {} must be one of {}, got {level:?}",
                path.display(),
                LOG_LEVELS.join(", ")
            );
        }

        Ok(())
    }

    pub fn base_url(&self) -> &str {
        self.source
            .base_url
            .as_deref()
            .unwrap_or(DEFAULT_BASE_URL)
            .trim_end_matches('/')
    }

    pub fn timeout(&self) -> Result<Duration> {
        parse_duration(self.source.timeout.as_deref().unwrap_or(DEFAULT_TIMEOUT))
    }

    pub fn image_urls(&self) -> ImageUrls {
        ImageUrls::new(
            self.images
                .static_base
                .as_deref()
                .unwrap_or(DEFAULT_STATIC_IMAGE_BASE),
            self.images
                .service_base
                .as_deref()
                .unwrap_or(DEFAULT_IMAGE_SERVICE_BASE),
        )
    }

    pub fn default_view(&self) -> ViewMode {
        self.ui
            .default_view
            .as_deref()
            .and_then(ViewMode::parse)
            .unwrap_or_default()
    }

    pub fn suggestion_limit(&self) -> usize {
        self.ui
            .suggestion_limit
            .and_then(|limit| usize::try_from(limit).ok())
            .filter(|limit| *limit > 0)
            .unwrap_or(DEFAULT_SUGGESTION_LIMIT)
    }

    pub fn overscan(&self) -> usize {
        self.ui
            .overscan
            .and_then(|overscan| usize::try_from(overscan).ok())
            .unwrap_or(DEFAULT_OVERSCAN)
    }

    pub fn log_level(&self) -> String {
        self.log
            .level
            .as_deref()
            .unwrap_or(DEFAULT_LOG_LEVEL)
            .to_ascii_lowercase()
    }

    pub fn log_file(&self) -> Result<PathBuf> {
        if let Some(file) = &self.log.file {
            return Ok(PathBuf::from(file));
        }
        let cache_root = dirs::cache_dir().ok_or_else(|| {
            anyhow!("cannot resolve cache directory; set [log].file in the config")
        })?;
        Ok(cache_root.join(APP_NAME).join("devdex.log"))
    }

    pub fn example_config(path: &Path) -> String {
        format!(
            "# devdex config\n# Place this file at: {}\n\nversion = 1\n\n[source]\nbase_url = \"{}\"\ntimeout = \"{}\"\n\n[images]\nstatic_base = \"{}\"\nservice_base = \"{}\"\n\n[ui]\n# table | grid\ndefault_view = \"table\"\nsuggestion_limit = {}\noverscan = {}\n\n[log]\nlevel = \"{}\"\n# Default is the platform cache dir (for example ~/.cache/devdex/devdex.log)\n# file = \"/absolute/path/to/devdex.log\"\n",
            path.display(),
            DEFAULT_BASE_URL,
            DEFAULT_TIMEOUT,
            DEFAULT_STATIC_IMAGE_BASE,
            DEFAULT_IMAGE_SERVICE_BASE,
            DEFAULT_SUGGESTION_LIMIT,
            DEFAULT_OVERSCAN,
            DEFAULT_LOG_LEVEL,
        )
    }
}

fn parse_duration(raw: &str) -> Result<Duration> {
    if let Some(value) = raw.strip_suffix("ms") {
        let millis: u64 = value
            .parse()
            .with_context(|| format!("invalid timeout duration {raw:?}"))?;
        return Ok(Duration::from_millis(millis));
    }
    if let Some(value) = raw.strip_suffix('s') {
        let secs: u64 = value
            .parse()
            .with_context(|| format!("invalid timeout duration {raw:?}"))?;
        return Ok(Duration::from_secs(secs));
    }
    if let Some(value) = raw.strip_suffix('m') {
        let mins: u64 = value
            .parse()
            .with_context(|| format!("invalid timeout duration {raw:?}"))?;
        return Ok(Duration::from_secs(mins * 60));
    }

    bail!("invalid duration {raw:?}; use one of: <N>ms, <N>s, <N>m (for example 500ms or 10s)")
}
