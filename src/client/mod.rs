// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-FlowiseMcp-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of flowise-mcp and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! HTTP client for the Flowise REST API.
//!
//! Only two endpoints are used: `GET /api/v1/chatflows` and `POST /api/v1/prediction/{id}`.
//! Requests carry `Authorization: Bearer <key>` when an API key is configured.

use std::time::Duration;

use reqwest::{Client, RequestBuilder, StatusCode};
use serde::Serialize;
use url::Url;

use crate::config::Config;
use crate::filter::ChatflowFilter;
use crate::model::{Chatflow, PredictionTarget};

const USER_AGENT: &str = concat!("flowise-mcp/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, thiserror::Error)]
pub enum FlowiseError {
    #[error("cannot build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("invalid Flowise endpoint {value:?}: {source}")]
    InvalidEndpoint {
        value: String,
        #[source]
        source: url::ParseError,
    },
    #[error("Flowise endpoint {value:?} cannot be used as a base URL")]
    NotABaseUrl { value: String },
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} returned HTTP {status}: {body}")]
    Status { url: String, status: StatusCode, body: String },
    #[error("cannot decode chatflow list from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PredictionRequest<'a> {
    chatflow_id: &'a str,
    question: &'a str,
    streaming: bool,
}

#[derive(Debug, Clone)]
pub struct FlowiseClient {
    http: Client,
    endpoint: String,
    base: Url,
    api_key: Option<String>,
    filter: ChatflowFilter,
}

impl FlowiseClient {
    pub fn new(
        endpoint: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, FlowiseError> {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(FlowiseError::Client)?;
        let endpoint = endpoint.into().trim_end_matches('/').to_owned();
        let base = Url::parse(&endpoint)
            .map_err(|source| FlowiseError::InvalidEndpoint { value: endpoint.clone(), source })?;
        if base.cannot_be_a_base() {
            return Err(FlowiseError::NotABaseUrl { value: endpoint });
        }
        Ok(Self { http, endpoint, base, api_key, filter: ChatflowFilter::default() })
    }

    pub fn from_config(config: &Config) -> Result<Self, FlowiseError> {
        Ok(Self::new(config.endpoint.clone(), config.api_key.clone(), config.timeout)?
            .with_filter(config.filter.clone()))
    }

    pub fn with_filter(mut self, filter: ChatflowFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn filter(&self) -> &ChatflowFilter {
        &self.filter
    }

    /// `{endpoint}/api/v1/{segments..}`; every segment is percent-encoded on its own.
    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(["api", "v1"]).extend(segments);
        }
        url
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match self.api_key.as_deref() {
            Some(key) if !key.is_empty() => request.bearer_auth(key),
            _ => request,
        }
    }

    /// Fetches all chatflows and applies the configured whitelist/blacklist.
    pub async fn list_chatflows(&self) -> Result<Vec<Chatflow>, FlowiseError> {
        Ok(self.filter.apply(self.list_all_chatflows().await?))
    }

    /// Fetches all chatflows, ignoring the filter.
    pub async fn list_all_chatflows(&self) -> Result<Vec<Chatflow>, FlowiseError> {
        let url = self.url(&["chatflows"]);
        tracing::debug!("fetching chatflows from {url}");

        let body = self.send(self.authorize(self.http.get(url.clone())), &url).await?;
        let chatflows = serde_json::from_str::<Vec<Chatflow>>(&body)
            .map_err(|source| FlowiseError::Decode { url: url.to_string(), source })?;
        tracing::debug!("fetched {} chatflow(s)", chatflows.len());
        Ok(chatflows)
    }

    /// Sends `question` to `target` and returns the raw response body.
    pub async fn create_prediction(
        &self,
        target: &PredictionTarget,
        question: &str,
    ) -> Result<String, FlowiseError> {
        let url = self.url(&["prediction", target.id()]);
        let payload = PredictionRequest { chatflow_id: target.id(), question, streaming: false };
        tracing::debug!(%target, "sending prediction request to {url}");

        let body =
            self.send(self.authorize(self.http.post(url.clone())).json(&payload), &url).await?;
        tracing::debug!(%target, "prediction response: {body}");
        Ok(body)
    }

    async fn send(&self, request: RequestBuilder, url: &Url) -> Result<String, FlowiseError> {
        let transport = |source| FlowiseError::Transport { url: url.to_string(), source };

        let response = request.send().await.map_err(transport)?;
        let status = response.status();
        let body = response.text().await.map_err(transport)?;
        if !status.is_success() {
            tracing::error!("{url} returned HTTP {status}");
            return Err(FlowiseError::Status { url: url.to_string(), status, body });
        }
        Ok(body)
    }
}
