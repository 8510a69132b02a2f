// ABOUTME: Logging configuration and structured logging setup for observability and debugging
// ABOUTME: Configures log levels, formatters, and noise filters for the tracing subscriber
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Saedam Contributors

//! Production-ready logging configuration with structured output

use crate::config::Environment;
use crate::constants::service_names;
use anyhow::Result;
use std::env;
use std::io;
use tracing::info;
use tracing_subscriber::{
    filter::Directive,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Output format (json, pretty, compact)
    pub format: LogFormat,
    /// Include source file and line numbers
    pub include_location: bool,
    /// Include span open/close events
    pub include_spans: bool,
    /// Service name for structured logging
    pub service_name: String,
    /// Service version
    pub service_version: String,
    /// Environment (development, staging, production)
    pub environment: String,
}

/// Log output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// `JSON` format for production logging
    Json,
    /// Pretty format for development
    Pretty,
    /// Compact format for space-constrained environments
    Compact,
}

impl LogFormat {
    /// Parse the `LOG_FORMAT` value, defaulting to pretty
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => Self::Json,
            "compact" => Self::Compact,
            _ => Self::Pretty,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: LogFormat::Pretty,
            include_location: false,
            include_spans: false,
            service_name: service_names::SAEDAM_SERVER.into(),
            service_version: env!("CARGO_PKG_VERSION").to_owned(),
            environment: "development".into(),
        }
    }
}

impl LoggingConfig {
    /// Create logging configuration from environment variables
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build logging configuration from an arbitrary key lookup
    ///
    /// Production (as parsed by [`Environment`]) defaults to JSON output with
    /// source locations.
    #[must_use]
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = lookup("ENVIRONMENT").unwrap_or_else(|| "development".into());
        let is_production = Environment::from_str_or_default(&environment).is_production();

        Self {
            level: lookup("RUST_LOG").unwrap_or_else(|| "info".into()),
            format: lookup("LOG_FORMAT").map_or(
                if is_production {
                    LogFormat::Json
                } else {
                    LogFormat::Pretty
                },
                |f| LogFormat::from_str_or_default(&f),
            ),
            include_location: is_production || lookup("LOG_INCLUDE_LOCATION").is_some(),
            include_spans: lookup("LOG_INCLUDE_SPANS").is_some(),
            service_name: lookup("SERVICE_NAME")
                .unwrap_or_else(|| service_names::SAEDAM_SERVER.into()),
            service_version: env!("CARGO_PKG_VERSION").to_owned(),
            environment,
        }
    }

    /// Build the filter: the configured level plus fixed noise reduction
    fn env_filter(&self) -> EnvFilter {
        let directives = [
            "hyper=warn",
            "hyper_util=warn",
            "reqwest=warn",
            "sqlx=warn",
            "tower_http=info",
        ];

        directives.into_iter().fold(
            EnvFilter::try_new(&self.level).unwrap_or_else(|_| EnvFilter::new("info")),
            |filter, directive| match directive.parse::<Directive>() {
                Ok(parsed) => filter.add_directive(parsed),
                Err(_) => filter,
            },
        )
    }

    /// Initialize the global tracing subscriber
    ///
    /// # Errors
    ///
    /// Returns an error if a global subscriber is already installed
    pub fn init(&self) -> Result<()> {
        let registry = tracing_subscriber::registry().with(self.env_filter());
        let span_events = if self.include_spans {
            FmtSpan::NEW | FmtSpan::CLOSE
        } else {
            FmtSpan::NONE
        };

        match self.format {
            LogFormat::Json => {
                let json_layer = fmt::layer()
                    .with_file(self.include_location)
                    .with_line_number(self.include_location)
                    .with_target(true)
                    .with_writer(io::stdout)
                    .with_span_events(span_events)
                    .json();
                registry.with(json_layer).try_init()?;
            }
            LogFormat::Pretty => {
                let pretty_layer = fmt::layer()
                    .with_file(self.include_location)
                    .with_line_number(self.include_location)
                    .with_target(true)
                    .with_writer(io::stdout)
                    .with_span_events(span_events);
                registry.with(pretty_layer).try_init()?;
            }
            LogFormat::Compact => {
                let compact_layer = fmt::layer()
                    .compact()
                    .with_target(false)
                    .with_writer(io::stdout)
                    .with_span_events(FmtSpan::NONE);
                registry.with(compact_layer).try_init()?;
            }
        }

        info!(
            service.name = %self.service_name,
            service.version = %self.service_version,
            environment = %self.environment,
            log.level = %self.level,
            log.format = ?self.format,
            "Saedam API starting up"
        );

        Ok(())
    }
}

/// Initialize logging from environment
///
/// # Errors
///
/// Returns an error if logging initialization fails
pub fn init_from_env() -> Result<()> {
    LoggingConfig::from_env().init()
}
