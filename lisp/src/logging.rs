// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Tracing initialization. The configuration is a comma-separated list of
//! `target=level` items where the target `default` sets the level of every
//! target not listed, e.g. `"default=info,overlay_lisp=debug"`.

use std::str::FromStr;
use thiserror::Error;
use tracing_subscriber::filter::{Directive, EnvFilter, LevelFilter};
use tracing_subscriber::prelude::*;

#[derive(Error, Debug, PartialEq)]
pub enum LoggingError {
    #[error("Invalid tracing configuration item '{0}'")]
    InvalidConfig(String),
    #[error("Tracing is already initialized")]
    AlreadyInitialized,
}

/// Build the filter for a tracing configuration string
///
/// # Errors
///
/// Fails if an item is not of the form `target=level` or the level is unknown.
pub fn env_filter(config: &str) -> Result<EnvFilter, LoggingError> {
    let mut default = LevelFilter::INFO;
    let mut directives: Vec<Directive> = vec![];
    for item in config.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let invalid = || LoggingError::InvalidConfig(item.to_owned());
        let (target, level) = item.split_once('=').ok_or_else(invalid)?;
        let (target, level) = (target.trim(), level.trim());
        let level = LevelFilter::from_str(level).map_err(|_| invalid())?;
        if target == "default" {
            default = level;
        } else if target.is_empty() {
            return Err(invalid());
        } else {
            directives.push(format!("{target}={level}").parse().map_err(|_| invalid())?);
        }
    }
    Ok(directives
        .into_iter()
        .fold(EnvFilter::default().add_directive(default.into()), |filter, d| {
            filter.add_directive(d)
        }))
}

/// Install the global subscriber: formatted output with targets, line numbers and
/// thread names, filtered as `config` tells.
///
/// # Errors
///
/// Fails if the configuration is invalid or a global subscriber is already set.
pub fn init_tracing(config: &str) -> Result<(), LoggingError> {
    let filter = env_filter(config)?;
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_line_number(true)
        .with_target(true)
        .with_thread_ids(false)
        .with_thread_names(true)
        .with_level(true);
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|_| LoggingError::AlreadyInitialized)
}
