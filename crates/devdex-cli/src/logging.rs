// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! Log subscriber setup. The terminal belongs to the UI, so events go to a
//! file. Filter precedence: `DEVDEX_LOG`, then `RUST_LOG`, then `[log].level`.

use anyhow::{Context, Result, anyhow};
use std::env;
use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

use crate::config::Config;

pub const LOG_ENV: &str = "DEVDEX_LOG";

pub fn init(config: &Config) -> Result<PathBuf> {
    let path = config.log_file()?;
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("create log directory {}", parent.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("open log file {}", path.display()))?;

    let filter = select_filter(
        [env::var(LOG_ENV).ok(), env::var("RUST_LOG").ok()],
        &config.log_level(),
    );
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true)
        .try_init()
        .map_err(|error| anyhow!("install log subscriber: {error}"))?;
    Ok(path)
}

/// First candidate that parses wins; blank or invalid values fall through
/// to the configured level.
fn select_filter(candidates: [Option<String>; 2], level: &str) -> EnvFilter {
    for directives in candidates.into_iter().flatten() {
        if directives.trim().is_empty() {
            continue;
        }
        if let Ok(filter) = EnvFilter::try_new(&directives) {
            return filter;
        }
    }
    EnvFilter::new(level)
}
