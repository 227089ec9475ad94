// SPDX-License-Identifier: PMPL-1.0-or-later
//! Error types for the harness shell (config, browser session, file output).
//!
//! The audit core never returns these: structural checks and the scan
//! extractor degrade to partial or empty results instead.

use thiserror::Error;

/// Main error type for a11ybot
#[derive(Error, Debug)]
pub enum HarnessError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Browser error: {0}")]
    Browser(String),

    #[error("Rule engine error: {0}")]
    Engine(String),
}

impl From<chromiumoxide::error::CdpError> for HarnessError {
    fn from(err: chromiumoxide::error::CdpError) -> Self {
        HarnessError::Browser(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, HarnessError>;
