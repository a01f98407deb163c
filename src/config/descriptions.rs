// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-FlowiseMcp-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of flowise-mcp and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::BTreeSet;

use crate::model::{ChatflowDescription, ChatflowId};

/// Parses `id1:Desc One,id2:Desc Two` into ordered entries.
///
/// Malformed pairs are skipped with a warning; a repeated id keeps its first description.
pub fn parse_descriptions(raw: &str) -> Vec<ChatflowDescription> {
    let mut seen = BTreeSet::new();
    let mut entries = Vec::new();

    for pair in raw.split(',') {
        if pair.trim().is_empty() {
            continue;
        }
        let Some((id, description)) = pair.split_once(':') else {
            tracing::warn!("invalid FLOWISE_CHATFLOW_DESCRIPTIONS entry (expected id:description): {pair:?}");
            continue;
        };
        let (id, description) = (id.trim(), description.trim());
        if id.is_empty() || description.is_empty() {
            tracing::warn!("incomplete FLOWISE_CHATFLOW_DESCRIPTIONS entry: {pair:?}");
            continue;
        }
        let id = match ChatflowId::new(id) {
            Ok(id) => id,
            Err(err) => {
                tracing::warn!("invalid chatflow id in FLOWISE_CHATFLOW_DESCRIPTIONS {id:?}: {err}");
                continue;
            }
        };
        if !seen.insert(id.clone()) {
            tracing::warn!("duplicate chatflow id in FLOWISE_CHATFLOW_DESCRIPTIONS: {id}");
            continue;
        }
        entries.push(ChatflowDescription { id, description: description.to_owned() });
    }

    tracing::debug!("parsed {} chatflow description(s)", entries.len());
    entries
}
