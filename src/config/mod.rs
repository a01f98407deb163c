// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-FlowiseMcp-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of flowise-mcp and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Environment-driven configuration and startup mode selection.
//!
//! Every setting comes from a `FLOWISE_*` variable (or `DEBUG`). Values are read once at
//! startup; empty values count as unset.

mod descriptions;

use std::path::PathBuf;
use std::time::Duration;

use regex::Regex;
use url::Url;

use crate::filter::ChatflowFilter;
use crate::model::{AssistantId, ChatflowDescription, ChatflowId, IdError, PredictionTarget};

pub use descriptions::parse_descriptions;

pub const DEFAULT_API_ENDPOINT: &str = "http://localhost:3000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

pub const ENV_API_KEY: &str = "FLOWISE_API_KEY";
pub const ENV_API_ENDPOINT: &str = "FLOWISE_API_ENDPOINT";
pub const ENV_CHATFLOW_ID: &str = "FLOWISE_CHATFLOW_ID";
pub const ENV_ASSISTANT_ID: &str = "FLOWISE_ASSISTANT_ID";
pub const ENV_CHATFLOW_DESCRIPTION: &str = "FLOWISE_CHATFLOW_DESCRIPTION";
pub const ENV_CHATFLOW_DESCRIPTIONS: &str = "FLOWISE_CHATFLOW_DESCRIPTIONS";
pub const ENV_CHATFLOW_WHITELIST: &str = "FLOWISE_CHATFLOW_WHITELIST";
pub const ENV_CHATFLOW_BLACKLIST: &str = "FLOWISE_CHATFLOW_BLACKLIST";
pub const ENV_WHITELIST_NAME_REGEX: &str = "FLOWISE_WHITELIST_NAME_REGEX";
pub const ENV_BLACKLIST_NAME_REGEX: &str = "FLOWISE_BLACKLIST_NAME_REGEX";
pub const ENV_TIMEOUT_SECS: &str = "FLOWISE_TIMEOUT_SECS";
pub const ENV_LOG_FILE: &str = "FLOWISE_LOG_FILE";
pub const ENV_DEBUG: &str = "DEBUG";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("both FLOWISE_CHATFLOW_ID and FLOWISE_ASSISTANT_ID are set; set only one")]
    ConflictingTargets,
    #[error("invalid FLOWISE_API_ENDPOINT {value:?}: {source}")]
    InvalidEndpoint {
        value: String,
        #[source]
        source: url::ParseError,
    },
    #[error("FLOWISE_API_ENDPOINT {value:?} must be an http(s) URL")]
    UnsupportedScheme { value: String },
    #[error("invalid {variable} {value:?}: {source}")]
    InvalidId {
        variable: &'static str,
        value: String,
        #[source]
        source: IdError,
    },
    #[error("invalid {variable} pattern: {source}")]
    InvalidRegex {
        variable: &'static str,
        #[source]
        source: regex::Error,
    },
    #[error("invalid FLOWISE_TIMEOUT_SECS {value:?}: expected a positive number of seconds")]
    InvalidTimeout { value: String },
    #[error("no chatflow tools left to register from FLOWISE_CHATFLOW_DESCRIPTIONS")]
    NoDynamicTools,
    #[error("cannot load .env: {0}")]
    EnvFile(#[source] dotenvy::Error),
}

/// Which tool surface the server exposes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerMode {
    /// `list_chatflows` plus `create_prediction(chatflow_id, question)`.
    Catalog,
    /// A single `create_prediction(question)` bound to one chatflow or assistant.
    Locked(PredictionTarget),
    /// One tool per configured chatflow description.
    Dynamic(Vec<ChatflowDescription>),
}

impl ServerMode {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Catalog => "catalog",
            Self::Locked(_) => "locked",
            Self::Dynamic(_) => "dynamic",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: Option<String>,
    pub endpoint: String,
    pub chatflow_id: Option<ChatflowId>,
    pub assistant_id: Option<AssistantId>,
    pub chatflow_description: Option<String>,
    /// `Some` whenever `FLOWISE_CHATFLOW_DESCRIPTIONS` is set, even if no entry parsed.
    pub descriptions: Option<Vec<ChatflowDescription>>,
    pub filter: ChatflowFilter,
    pub timeout: Duration,
    pub log_file: Option<PathBuf>,
    pub debug: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            endpoint: DEFAULT_API_ENDPOINT.to_owned(),
            chatflow_id: None,
            assistant_id: None,
            chatflow_description: None,
            descriptions: None,
            filter: ChatflowFilter::default(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            log_file: None,
            debug: false,
        }
    }
}

impl Config {
    /// Reads the process environment, after loading `.env` from the working directory.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Variables already in the environment win over `.env`.
        check_env_file(dotenvy::dotenv())?;
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let endpoint = match get(ENV_API_ENDPOINT) {
            Some(value) => validate_endpoint(value.trim())?,
            None => DEFAULT_API_ENDPOINT.to_owned(),
        };

        let chatflow_id = get(ENV_CHATFLOW_ID)
            .map(|value| parse_id(ENV_CHATFLOW_ID, value.trim()))
            .transpose()?;
        let assistant_id = get(ENV_ASSISTANT_ID)
            .map(|value| parse_id(ENV_ASSISTANT_ID, value.trim()))
            .transpose()?;

        let mut filter = ChatflowFilter::new();
        if let Some(value) = get(ENV_CHATFLOW_WHITELIST) {
            filter = filter.with_whitelist_ids(split_list(&value));
        }
        if let Some(value) = get(ENV_CHATFLOW_BLACKLIST) {
            filter = filter.with_blacklist_ids(split_list(&value));
        }
        if let Some(value) = get(ENV_WHITELIST_NAME_REGEX) {
            filter = filter.with_whitelist_name(parse_regex(ENV_WHITELIST_NAME_REGEX, &value)?);
        }
        if let Some(value) = get(ENV_BLACKLIST_NAME_REGEX) {
            filter = filter.with_blacklist_name(parse_regex(ENV_BLACKLIST_NAME_REGEX, &value)?);
        }

        let timeout = match get(ENV_TIMEOUT_SECS) {
            Some(value) => match value.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => return Err(ConfigError::InvalidTimeout { value }),
            },
            None => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        };

        Ok(Self {
            api_key: get(ENV_API_KEY).map(|value| value.trim().to_owned()),
            endpoint,
            chatflow_id,
            assistant_id,
            chatflow_description: get(ENV_CHATFLOW_DESCRIPTION),
            descriptions: get(ENV_CHATFLOW_DESCRIPTIONS).map(|raw| parse_descriptions(&raw)),
            filter,
            timeout,
            log_file: get(ENV_LOG_FILE).map(PathBuf::from),
            debug: lookup(ENV_DEBUG).is_some_and(|value| parse_flag(&value)),
        })
    }

    /// Picks the tool surface; fails when both a chatflow and an assistant are configured.
    pub fn mode(&self) -> Result<ServerMode, ConfigError> {
        if self.chatflow_id.is_some() && self.assistant_id.is_some() {
            return Err(ConfigError::ConflictingTargets);
        }

        if let Some(descriptions) = &self.descriptions {
            if descriptions.is_empty() {
                return Err(ConfigError::NoDynamicTools);
            }
            if self.chatflow_id.is_some() || self.assistant_id.is_some() {
                tracing::warn!(
                    "{ENV_CHATFLOW_DESCRIPTIONS} is set; ignoring {ENV_CHATFLOW_ID}/{ENV_ASSISTANT_ID}"
                );
            }
            return Ok(ServerMode::Dynamic(descriptions.clone()));
        }

        if let Some(id) = &self.chatflow_id {
            return Ok(ServerMode::Locked(PredictionTarget::Chatflow(id.clone())));
        }
        if let Some(id) = &self.assistant_id {
            return Ok(ServerMode::Locked(PredictionTarget::Assistant(id.clone())));
        }
        Ok(ServerMode::Catalog)
    }

    pub fn redacted_api_key(&self) -> String {
        redact_api_key(self.api_key.as_deref().unwrap_or_default())
    }
}

/// Masks an API key for logs: keeps the first and last two characters.
pub fn redact_api_key(key: &str) -> String {
    let chars = key.chars().collect::<Vec<_>>();
    if chars.len() <= 4 {
        return "<not set>".to_owned();
    }
    let head = chars[..2].iter().collect::<String>();
    let tail = chars[chars.len() - 2..].iter().collect::<String>();
    format!("{head}{}{tail}", "*".repeat(chars.len() - 4))
}

/// A missing `.env` is fine; an unreadable or malformed one is not.
fn check_env_file(
    loaded: Result<PathBuf, dotenvy::Error>,
) -> Result<Option<PathBuf>, ConfigError> {
    match loaded {
        Ok(path) => Ok(Some(path)),
        Err(dotenvy::Error::Io(err)) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(err) => Err(ConfigError::EnvFile(err)),
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(value.trim().to_ascii_lowercase().as_str(), "true" | "1" | "yes")
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_owned)
        .collect()
}

fn parse_id<T>(variable: &'static str, value: &str) -> Result<crate::model::Id<T>, ConfigError> {
    crate::model::Id::new(value.to_owned()).map_err(|source| ConfigError::InvalidId {
        variable,
        value: value.to_owned(),
        source,
    })
}

fn parse_regex(variable: &'static str, value: &str) -> Result<Regex, ConfigError> {
    Regex::new(value).map_err(|source| ConfigError::InvalidRegex { variable, source })
}

fn validate_endpoint(value: &str) -> Result<String, ConfigError> {
    let url = Url::parse(value).map_err(|source| ConfigError::InvalidEndpoint {
        value: value.to_owned(),
        source,
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::UnsupportedScheme { value: value.to_owned() });
    }
    Ok(value.trim_end_matches('/').to_owned())
}

#[cfg(test)]
mod tests;
