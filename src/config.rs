// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Provider configuration is passed in by the host application. Service
//! endpoints and storage location can be given explicitly or loaded from
//! the environment.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `RECEIPT_SDK_DATA_DIR` | Root directory for key storage | platform local data dir |
//! | `RECEIPT_SDK_API_URL` | Base URL of the receipt/licensing service | Required |
//! | `RECEIPT_SDK_PROXY_URL` | Proxy all service requests through this URL | none |
//! | `RECEIPT_SDK_TIMEOUT_SECS` | HTTP request timeout | `15` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info` |

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::SdkError;

/// Environment variable name for the key storage root.
pub const DATA_DIR_ENV: &str = "RECEIPT_SDK_DATA_DIR";

/// Environment variable name for the service base URL.
pub const API_URL_ENV: &str = "RECEIPT_SDK_API_URL";

/// Environment variable name for the optional proxy URL.
pub const PROXY_URL_ENV: &str = "RECEIPT_SDK_PROXY_URL";

/// Environment variable name for the HTTP timeout in seconds.
pub const TIMEOUT_SECS_ENV: &str = "RECEIPT_SDK_TIMEOUT_SECS";

/// Environment variable name for the log output format.
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

/// Default HTTP request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Scopes requested for user tokens unless configured otherwise.
pub const DEFAULT_SCOPES: [&str; 2] = ["trail", "publish"];

/// Provider (company) configuration.
///
/// Immutable once handed to the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Provider (tenant) identifier that scopes users and keys
    pub provider_id: String,
    /// Service-side publishing key for this provider
    pub public_key: String,
    pub company_name: String,
    pub company_jurisdiction: String,
    pub tos_url: String,
    pub privacy_url: String,
    /// Application id stamped into licenses as their origin
    #[serde(default = "default_origin")]
    pub origin: String,
    /// Scopes requested when exchanging an address for a token
    #[serde(default = "default_scopes")]
    pub scopes: Vec<String>,
}

fn default_origin() -> String {
    env!("CARGO_PKG_NAME").to_string()
}

fn default_scopes() -> Vec<String> {
    DEFAULT_SCOPES.iter().map(|s| s.to_string()).collect()
}

impl Config {
    pub fn new(
        provider_id: impl Into<String>,
        public_key: impl Into<String>,
        company_name: impl Into<String>,
        company_jurisdiction: impl Into<String>,
        tos_url: impl Into<String>,
        privacy_url: impl Into<String>,
    ) -> Self {
        Self {
            provider_id: provider_id.into(),
            public_key: public_key.into(),
            company_name: company_name.into(),
            company_jurisdiction: company_jurisdiction.into(),
            tos_url: tos_url.into(),
            privacy_url: privacy_url.into(),
            origin: default_origin(),
            scopes: default_scopes(),
        }
    }

    /// Override the license origin (application id).
    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = origin.into();
        self
    }

    /// Override the requested token scopes.
    pub fn with_scopes<I, S>(mut self, scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.scopes = scopes.into_iter().map(Into::into).collect();
        self
    }

    /// Check required fields are present.
    pub fn validate(&self) -> Result<(), SdkError> {
        let required = [
            ("provider_id", &self.provider_id),
            ("public_key", &self.public_key),
            ("company_name", &self.company_name),
            ("company_jurisdiction", &self.company_jurisdiction),
            ("tos_url", &self.tos_url),
            ("privacy_url", &self.privacy_url),
            ("origin", &self.origin),
        ];
        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(SdkError::InvalidConfig(format!("{name} is required")));
            }
        }
        if self.scopes.is_empty() {
            return Err(SdkError::InvalidConfig("at least one scope is required".to_string()));
        }
        Ok(())
    }
}

/// Where and how to reach the service.
#[derive(Debug, Clone)]
pub struct Endpoints {
    pub base_url: Url,
    pub proxy: Option<Url>,
    pub timeout: Duration,
}

impl Endpoints {
    pub fn new(base_url: &str) -> Result<Self, SdkError> {
        Ok(Self {
            base_url: parse_base_url(base_url)?,
            proxy: None,
            timeout: DEFAULT_TIMEOUT,
        })
    }

    pub fn with_proxy(mut self, proxy: &str) -> Result<Self, SdkError> {
        let url = Url::parse(proxy)
            .map_err(|e| SdkError::InvalidConfig(format!("invalid proxy URL: {e}")))?;
        self.proxy = Some(url);
        Ok(self)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Load endpoints from `RECEIPT_SDK_*` environment variables.
    pub fn from_env() -> Result<Self, SdkError> {
        let base_url = env_required(API_URL_ENV)?;
        let mut endpoints = Self::new(&base_url)?;

        if let Some(proxy) = env_optional(PROXY_URL_ENV) {
            endpoints = endpoints.with_proxy(&proxy)?;
        }
        if let Some(secs) = env_optional(TIMEOUT_SECS_ENV) {
            endpoints = endpoints.with_timeout(parse_timeout_secs(&secs)?);
        }
        Ok(endpoints)
    }
}

/// Key storage root from `RECEIPT_SDK_DATA_DIR`, if set.
pub fn data_dir_from_env() -> Option<PathBuf> {
    env_optional(DATA_DIR_ENV).map(PathBuf::from)
}

/// Parse a base URL, forcing a trailing slash so relative joins append.
fn parse_base_url(raw: &str) -> Result<Url, SdkError> {
    let mut url = Url::parse(raw.trim())
        .map_err(|e| SdkError::InvalidConfig(format!("invalid base URL: {e}")))?;
    if url.cannot_be_a_base() {
        return Err(SdkError::InvalidConfig(format!("{raw} cannot be a base URL")));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

/// Parse a timeout in whole seconds; zero would fail every request.
fn parse_timeout_secs(raw: &str) -> Result<Duration, SdkError> {
    let secs: u64 = raw.parse().map_err(|e| {
        SdkError::InvalidConfig(format!("{TIMEOUT_SECS_ENV} must be an integer: {e}"))
    })?;
    if secs == 0 {
        return Err(SdkError::InvalidConfig(format!(
            "{TIMEOUT_SECS_ENV} must be greater than zero"
        )));
    }
    Ok(Duration::from_secs(secs))
}

fn env_optional(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_required(name: &str) -> Result<String, SdkError> {
    env_optional(name).ok_or_else(|| SdkError::InvalidConfig(format!("{name} is not set")))
}
