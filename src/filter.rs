// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-FlowiseMcp-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of flowise-mcp and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Whitelist/blacklist rules deciding which chatflows the tools may see and call.

use std::collections::BTreeSet;

use regex::Regex;

use crate::model::Chatflow;

/// Chatflow visibility rules.
///
/// When any whitelist is configured, a chatflow must pass all of them and is then
/// exempt from the blacklist. Without a whitelist, the blacklist alone decides.
#[derive(Debug, Clone, Default)]
pub struct ChatflowFilter {
    whitelist_ids: BTreeSet<String>,
    blacklist_ids: BTreeSet<String>,
    whitelist_name: Option<Regex>,
    blacklist_name: Option<Regex>,
}

impl ChatflowFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_whitelist_ids<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.whitelist_ids = ids.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_blacklist_ids<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.blacklist_ids = ids.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_whitelist_name(mut self, pattern: Regex) -> Self {
        self.whitelist_name = Some(pattern);
        self
    }

    pub fn with_blacklist_name(mut self, pattern: Regex) -> Self {
        self.blacklist_name = Some(pattern);
        self
    }

    pub fn is_empty(&self) -> bool {
        !self.has_whitelist() && !self.has_blacklist()
    }

    fn has_whitelist(&self) -> bool {
        !self.whitelist_ids.is_empty() || self.whitelist_name.is_some()
    }

    fn has_blacklist(&self) -> bool {
        !self.blacklist_ids.is_empty() || self.blacklist_name.is_some()
    }

    pub fn allows(&self, chatflow: &Chatflow) -> bool {
        let id = chatflow.id.as_str();
        let name = chatflow.name.as_str();

        if self.has_whitelist() {
            if !self.whitelist_ids.is_empty() && !self.whitelist_ids.contains(id) {
                tracing::debug!(chatflow = name, id, "skipping chatflow: not in whitelist");
                return false;
            }
            if let Some(pattern) = &self.whitelist_name {
                if !pattern.is_match(name) {
                    tracing::debug!(chatflow = name, id, "skipping chatflow: name not whitelisted");
                    return false;
                }
            }
            return true;
        }

        if self.blacklist_ids.contains(id) {
            tracing::debug!(chatflow = name, id, "skipping chatflow: in blacklist");
            return false;
        }
        if let Some(pattern) = &self.blacklist_name {
            if pattern.is_match(name) {
                tracing::debug!(chatflow = name, id, "skipping chatflow: name blacklisted");
                return false;
            }
        }
        true
    }

    /// Id-only variant of [`Self::allows`], for callers that do not know the chatflow name.
    /// Name rules are not applied.
    pub fn allows_id(&self, id: &str) -> bool {
        if !self.whitelist_ids.is_empty() {
            return self.whitelist_ids.contains(id);
        }
        if self.whitelist_name.is_some() {
            return true;
        }
        !self.blacklist_ids.contains(id)
    }

    pub fn apply(&self, chatflows: Vec<Chatflow>) -> Vec<Chatflow> {
        let total = chatflows.len();
        let kept = chatflows.into_iter().filter(|chatflow| self.allows(chatflow)).collect::<Vec<_>>();
        tracing::info!("filtered chatflows: {} out of {total}", kept.len());
        kept
    }
}
