use anyhow::{anyhow, Context, Result};
use cimr_core::CimrConfig;
use std::path::PathBuf;

/// Loads layered configuration and applies the `--backend` flag on top.
pub fn load_config(backend_override: Option<&str>) -> Result<CimrConfig> {
    let mut config = CimrConfig::load().context("Failed to load configuration")?;

    if let Some(url) = backend_override {
        config.backend.url = url.to_string();
        config.normalize();
        config
            .validate()
            .map_err(|e| anyhow!("Invalid --backend value: {}", e))?;
    }

    Ok(config)
}

/// Default location for exported transcripts and downloaded charts.
pub fn default_output_dir() -> PathBuf {
    std::env::current_dir()
        .map(|d| d.join("cimr-output"))
        .unwrap_or_else(|_| PathBuf::from("cimr-output"))
}
