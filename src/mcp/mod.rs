// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-FlowiseMcp-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of flowise-mcp and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Model Context Protocol (MCP) server surface.
//!
//! Exposes Flowise chatflows and assistants as MCP tools, in one of three fixed layouts
//! chosen at startup.

mod dynamic;
mod server;
mod types;

pub use dynamic::{normalize_tool_name, DynamicTool, DynamicTools};
pub use server::{FlowiseMcp, SERVER_NAME};
pub use types::{CreatePredictionParams, QuestionParams};
