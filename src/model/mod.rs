// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-FlowiseMcp-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of flowise-mcp and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Flowise entities as seen by the bridge.

pub mod chatflow;
pub mod ids;

pub use chatflow::{Chatflow, ChatflowDescription, PredictionTarget};
pub use ids::{AssistantId, ChatflowId, Id, IdError};
