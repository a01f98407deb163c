// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-FlowiseMcp-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of flowise-mcp and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use schemars::JsonSchema;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct CreatePredictionParams {
    /// The ID of the Flowise chatflow to send the question to (see `list_chatflows`).
    pub chatflow_id: String,
    /// The question or prompt to send to the chatflow.
    pub question: String,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct QuestionParams {
    /// The question or prompt to send.
    pub question: String,
}
