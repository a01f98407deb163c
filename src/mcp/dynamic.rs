// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-FlowiseMcp-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of flowise-mcp and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Per-chatflow tools built from `FLOWISE_CHATFLOW_DESCRIPTIONS`.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use rmcp::model::{JsonObject, Tool};

use crate::client::FlowiseClient;
use crate::filter::ChatflowFilter;
use crate::model::{Chatflow, ChatflowDescription, ChatflowId};

const UNKNOWN_TOOL_NAME: &str = "unknown_tool";

/// Lower-cases `name` and replaces every non-ASCII-alphanumeric character with `_`.
pub fn normalize_tool_name(name: &str) -> String {
    let normalized = name
        .chars()
        .map(|ch| if ch.is_ascii_alphanumeric() { ch.to_ascii_lowercase() } else { '_' })
        .collect::<String>();
    if normalized.is_empty() {
        tracing::warn!("empty tool name; using {UNKNOWN_TOOL_NAME:?}");
        return UNKNOWN_TOOL_NAME.to_owned();
    }
    normalized
}

fn question_schema() -> Arc<JsonObject> {
    let schema = serde_json::json!({
        "type": "object",
        "required": ["question"],
        "properties": {
            "question": { "type": "string" }
        }
    });
    match schema {
        serde_json::Value::Object(map) => Arc::new(map),
        _ => Arc::new(JsonObject::new()),
    }
}

#[derive(Debug, Clone)]
pub struct DynamicTool {
    pub chatflow_id: ChatflowId,
    pub tool: Tool,
}

/// Registered per-chatflow tools, in registration order.
#[derive(Debug, Clone, Default)]
pub struct DynamicTools {
    tools: Vec<DynamicTool>,
    by_name: BTreeMap<String, usize>,
}

impl DynamicTools {
    /// Builds one tool per description entry the filter allows.
    ///
    /// `names` maps chatflow ids to their Flowise names; entries without a known name are
    /// registered as `predict_<id>`. Name collisions keep the first tool.
    pub fn build(
        descriptions: &[ChatflowDescription],
        names: &HashMap<String, String>,
        filter: &ChatflowFilter,
    ) -> Self {
        let mut registry = Self::default();

        for entry in descriptions {
            let id = entry.id.as_str();
            let name = names.get(id);
            let allowed = match name {
                Some(name) => filter.allows(&Chatflow::new(entry.id.clone(), name.clone())),
                None => filter.allows_id(id),
            };
            if !allowed {
                tracing::info!("chatflow {id} is filtered out; not registering a tool");
                continue;
            }

            let tool_name = match name {
                Some(name) => normalize_tool_name(name),
                None => format!("predict_{}", normalize_tool_name(id)),
            };
            if registry.by_name.contains_key(&tool_name) {
                tracing::warn!(
                    "tool name conflict: {tool_name:?} already exists; skipping chatflow {id}"
                );
                continue;
            }

            let tool = Tool::new(tool_name.clone(), entry.description.clone(), question_schema());
            tracing::info!("registered chatflow tool {tool_name} (id: {id})");
            registry.by_name.insert(tool_name, registry.tools.len());
            registry.tools.push(DynamicTool { chatflow_id: entry.id.clone(), tool });
        }

        registry
    }

    /// Resolves chatflow names from Flowise, then builds the tools.
    ///
    /// When the chatflow list cannot be fetched the tools fall back to id-based names.
    pub async fn resolve(client: &FlowiseClient, descriptions: &[ChatflowDescription]) -> Self {
        let names = match client.list_all_chatflows().await {
            Ok(chatflows) => chatflows
                .into_iter()
                .map(|chatflow| (chatflow.id.into_string(), chatflow.name))
                .collect::<HashMap<_, _>>(),
            Err(err) => {
                tracing::warn!("cannot resolve chatflow names, using ids for tool names: {err}");
                HashMap::new()
            }
        };
        Self::build(descriptions, &names, client.filter())
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn get(&self, name: &str) -> Option<&DynamicTool> {
        self.by_name.get(name).map(|&index| &self.tools[index])
    }

    pub fn tools(&self) -> Vec<Tool> {
        self.tools.iter().map(|entry| entry.tool.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn entry(id: &str, description: &str) -> ChatflowDescription {
        ChatflowDescription {
            id: ChatflowId::new(id).expect("chatflow id"),
            description: description.to_owned(),
        }
    }

    fn names(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(id, name)| ((*id).to_owned(), (*name).to_owned())).collect()
    }

    fn tool_names(tools: &DynamicTools) -> Vec<String> {
        tools.tools().into_iter().map(|tool| tool.name.to_string()).collect()
    }

    #[rstest]
    #[case("MockTool", "mocktool")]
    #[case("Customer Support Bot", "customer_support_bot")]
    #[case("FAQ-v2 (beta)", "faq_v2__beta_")]
    #[case("Café", "caf_")]
    #[case("", "unknown_tool")]
    fn normalizes_tool_names(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(normalize_tool_name(input), expected);
    }

    #[test]
    fn two_descriptions_yield_two_described_tools() {
        let tools = DynamicTools::build(
            &[entry("id1", "Desc One"), entry("id2", "Desc Two")],
            &HashMap::new(),
            &ChatflowFilter::new(),
        );

        assert_eq!(tools.len(), 2);
        assert_eq!(tool_names(&tools), vec!["predict_id1", "predict_id2"]);
        let descriptions = tools
            .tools()
            .into_iter()
            .map(|tool| tool.description.map(|text| text.to_string()))
            .collect::<Vec<_>>();
        assert_eq!(descriptions, vec![Some("Desc One".to_owned()), Some("Desc Two".to_owned())]);
        assert_eq!(tools.get("predict_id2").map(|tool| tool.chatflow_id.as_str()), Some("id2"));
    }

    #[test]
    fn resolved_names_become_tool_names() {
        let tools = DynamicTools::build(
            &[entry("chatflow1", "Test Chatflow 1"), entry("chatflow2", "Test Chatflow 2")],
            &names(&[("chatflow1", "Test Chatflow 1"), ("chatflow2", "Test Chatflow 2")]),
            &ChatflowFilter::new(),
        );
        assert_eq!(tool_names(&tools), vec!["test_chatflow_1", "test_chatflow_2"]);
    }

    #[test]
    fn tools_require_a_question_string() {
        let tools =
            DynamicTools::build(&[entry("id1", "Desc")], &HashMap::new(), &ChatflowFilter::new());
        let tool = tools.get("predict_id1").expect("tool");
        let schema = serde_json::Value::Object(tool.tool.input_schema.as_ref().clone());
        assert_eq!(
            schema,
            serde_json::json!({
                "type": "object",
                "required": ["question"],
                "properties": { "question": { "type": "string" } }
            })
        );
    }

    #[test]
    fn conflicting_names_keep_the_first_tool() {
        let tools = DynamicTools::build(
            &[entry("a", "First"), entry("b", "Second")],
            &names(&[("a", "Sales Bot"), ("b", "sales-bot")]),
            &ChatflowFilter::new(),
        );
        assert_eq!(tool_names(&tools), vec!["sales_bot"]);
        assert_eq!(tools.get("sales_bot").map(|tool| tool.chatflow_id.as_str()), Some("a"));
    }

    #[test]
    fn filtered_chatflows_get_no_tool() {
        let filter = ChatflowFilter::new()
            .with_blacklist_ids(["id2"])
            .with_blacklist_name(regex::Regex::new("(?i)internal").expect("regex"));
        let tools = DynamicTools::build(
            &[entry("id1", "One"), entry("id2", "Two"), entry("id3", "Three")],
            &names(&[("id3", "Internal Reports")]),
            &filter,
        );
        assert_eq!(tool_names(&tools), vec!["predict_id1"]);
    }
}
