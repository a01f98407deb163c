// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-FlowiseMcp-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of flowise-mcp and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::ids::{AssistantId, ChatflowId};

/// A chatflow as listed by `GET /api/v1/chatflows`, reduced to the fields the tools expose.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Chatflow {
    #[schemars(with = "String")]
    pub id: ChatflowId,
    pub name: String,
}

impl Chatflow {
    pub fn new(id: ChatflowId, name: impl Into<String>) -> Self {
        Self { id, name: name.into() }
    }
}

/// What a prediction is sent to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PredictionTarget {
    Chatflow(ChatflowId),
    Assistant(AssistantId),
}

impl PredictionTarget {
    /// The id placed in the request path and the `chatflowId` body field.
    ///
    /// Flowise serves assistants through the same prediction endpoint as chatflows.
    pub fn id(&self) -> &str {
        match self {
            Self::Chatflow(id) => id.as_str(),
            Self::Assistant(id) => id.as_str(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Chatflow(_) => "chatflow",
            Self::Assistant(_) => "assistant",
        }
    }
}

impl fmt::Display for PredictionTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind(), self.id())
    }
}

/// One `id:description` entry of `FLOWISE_CHATFLOW_DESCRIPTIONS`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatflowDescription {
    pub id: ChatflowId,
    pub description: String,
}
