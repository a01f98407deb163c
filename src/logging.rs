// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-FlowiseMcp-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of flowise-mcp and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Process-wide `tracing` setup.
//!
//! Logs always go to stderr: stdout carries the MCP stdio protocol.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing_subscriber::{fmt, prelude::*, registry, EnvFilter};

#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("cannot open log file {}: {source}", .path.display())]
    OpenLogFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot install tracing subscriber: {0}")]
    Install(#[from] tracing_subscriber::util::TryInitError),
}

/// Directives used when `RUST_LOG` is not set.
pub fn default_directives(debug: bool) -> String {
    let level = if debug { "debug" } else { "info" };
    format!("rmcp=warn,{level}")
}

fn env_filter(debug: bool) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directives(debug)))
}

fn open_log_file(path: &Path) -> Result<File, LoggingError> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|source| LoggingError::OpenLogFile { path: path.to_owned(), source })
}

/// Installs the global subscriber: stderr, plus `log_file` (appended, no ANSI) when given.
pub fn init(debug: bool, log_file: Option<&Path>) -> Result<(), LoggingError> {
    let file_layer = match log_file {
        Some(path) => {
            let file = open_log_file(path)?;
            Some(fmt::layer().with_writer(Mutex::new(file)).with_ansi(false))
        }
        None => None,
    };

    registry()
        .with(env_filter(debug))
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .try_init()?;
    Ok(())
}
