// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-FlowiseMcp-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of flowise-mcp and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! flowise-mcp: exposes Flowise chatflows and assistants as MCP tools.
//!
//! Configuration comes from the environment ([`config`]), Flowise is reached over its REST
//! API ([`client`]) and the tool surface lives in [`mcp`].

pub mod client;
pub mod config;
pub mod filter;
pub mod logging;
pub mod mcp;
pub mod model;
