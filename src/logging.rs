// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Tracing subscriber setup for host applications.
//!
//! The SDK only emits `tracing` events; installing a subscriber is left to
//! the host. `init` is a convenience for hosts without their own setup.

use tracing_subscriber::{fmt, EnvFilter};

use crate::config::LOG_FORMAT_ENV;

/// Default filter when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "info";

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl LogFormat {
    /// Parse a format name; anything but `json` means pretty.
    pub fn parse(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("json") {
            Self::Json
        } else {
            Self::Pretty
        }
    }

    /// Read the format from `LOG_FORMAT`.
    pub fn from_env() -> Self {
        std::env::var(LOG_FORMAT_ENV)
            .map(|v| Self::parse(&v))
            .unwrap_or(Self::Pretty)
    }
}

/// Install a global subscriber using `RUST_LOG` and `LOG_FORMAT`.
///
/// Returns `false` if a global subscriber was already installed.
pub fn init() -> bool {
    init_with(LogFormat::from_env())
}

pub fn init_with(format: LogFormat) -> bool {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let builder = fmt().with_env_filter(filter).with_target(true);

    match format {
        LogFormat::Json => builder.json().try_init().is_ok(),
        LogFormat::Pretty => builder.try_init().is_ok(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_format() {
        assert_eq!(LogFormat::parse("json"), LogFormat::Json);
        assert_eq!(LogFormat::parse(" JSON "), LogFormat::Json);
        assert_eq!(LogFormat::parse("pretty"), LogFormat::Pretty);
        assert_eq!(LogFormat::parse("whatever"), LogFormat::Pretty);
    }

    #[test]
    fn second_init_reports_existing_subscriber() {
        let _ = init_with(LogFormat::Pretty);
        assert!(!init_with(LogFormat::Json));
    }
}
