// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-FlowiseMcp-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of flowise-mcp and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::sync::Arc;

use rmcp::handler::server::tool::{ToolCallContext, ToolRouter};
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{
    CallToolRequestParams, CallToolResult, Content, Implementation, JsonObject, ListToolsResult,
    PaginatedRequestParams, ServerCapabilities, ServerInfo, Tool,
};
use rmcp::service::RequestContext;
use rmcp::{tool, tool_router, ErrorData, RoleServer, ServerHandler, ServiceExt};

use crate::client::FlowiseClient;
use crate::config::{ConfigError, ServerMode};
use crate::model::{ChatflowId, PredictionTarget};

use super::dynamic::DynamicTools;
use super::types::*;

pub const SERVER_NAME: &str = "FlowiseMCP-with-EnvAuth";

const MISSING_QUESTION: &str = "Missing \"question\" argument";
const CHATFLOW_UNAVAILABLE: &str = "chatflow is not available";

#[derive(Debug)]
enum ToolSurface {
    Catalog,
    Locked { target: PredictionTarget, description: Option<String> },
    Dynamic(DynamicTools),
}

/// MCP server forwarding tool calls to Flowise.
///
/// The tool surface is fixed at construction: see [`ServerMode`].
#[derive(Clone)]
pub struct FlowiseMcp {
    client: Arc<FlowiseClient>,
    surface: Arc<ToolSurface>,
    tool_router: ToolRouter<Self>,
}

impl FlowiseMcp {
    /// `list_chatflows` and `create_prediction(chatflow_id, question)`.
    pub fn catalog(client: FlowiseClient) -> Self {
        Self {
            client: Arc::new(client),
            surface: Arc::new(ToolSurface::Catalog),
            tool_router: Self::catalog_router(),
        }
    }

    /// A single `create_prediction(question)` bound to `target`.
    pub fn locked(
        client: FlowiseClient,
        target: PredictionTarget,
        description: Option<String>,
    ) -> Self {
        Self {
            client: Arc::new(client),
            surface: Arc::new(ToolSurface::Locked { target, description }),
            tool_router: Self::locked_router(),
        }
    }

    /// One `(question)` tool per registered chatflow.
    pub fn dynamic(client: FlowiseClient, tools: DynamicTools) -> Self {
        Self {
            client: Arc::new(client),
            surface: Arc::new(ToolSurface::Dynamic(tools)),
            tool_router: ToolRouter::new(),
        }
    }

    /// Builds the server for `mode`. Dynamic mode resolves chatflow names from Flowise and
    /// fails when no tool survives filtering.
    pub async fn from_mode(
        client: FlowiseClient,
        mode: ServerMode,
        locked_description: Option<String>,
    ) -> Result<Self, ConfigError> {
        match mode {
            ServerMode::Catalog => Ok(Self::catalog(client)),
            ServerMode::Locked(target) => Ok(Self::locked(client, target, locked_description)),
            ServerMode::Dynamic(descriptions) => {
                let tools = DynamicTools::resolve(&client, &descriptions).await;
                if tools.is_empty() {
                    return Err(ConfigError::NoDynamicTools);
                }
                Ok(Self::dynamic(client, tools))
            }
        }
    }

    pub async fn serve_stdio(self) -> Result<(), rmcp::RmcpError> {
        let service = self.serve((tokio::io::stdin(), tokio::io::stdout())).await?;
        service.waiting().await?;
        Ok(())
    }

    /// The tools advertised by `tools/list`.
    pub fn tools(&self) -> Vec<Tool> {
        match self.surface.as_ref() {
            ToolSurface::Dynamic(tools) => tools.tools(),
            ToolSurface::Locked { description: Some(description), .. } => self
                .tool_router
                .list_all()
                .into_iter()
                .map(|mut tool| {
                    tool.description = Some(description.clone().into());
                    tool
                })
                .collect(),
            _ => self.tool_router.list_all(),
        }
    }

    fn instructions(&self) -> String {
        match self.surface.as_ref() {
            ToolSurface::Catalog => "Flowise bridge: call list_chatflows to discover chatflows, then \
                 create_prediction(chatflow_id, question) to query one."
                .to_owned(),
            ToolSurface::Locked { target, .. } => {
                format!("Flowise bridge bound to {target}: call create_prediction(question).")
            }
            ToolSurface::Dynamic(tools) => {
                let names = tools
                    .tools()
                    .into_iter()
                    .map(|tool| tool.name.to_string())
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("Flowise bridge with one tool per chatflow (tools: {names}); each takes a question.")
            }
        }
    }

    async fn predict(&self, target: &PredictionTarget, question: &str) -> CallToolResult {
        match self.client.create_prediction(target, question).await {
            Ok(body) => CallToolResult::success(vec![Content::text(body)]),
            Err(err) => {
                tracing::error!(%target, "prediction failed: {err}");
                CallToolResult::error(vec![Content::text(format!("Error: {err}"))])
            }
        }
    }

    async fn call_dynamic(
        &self,
        tools: &DynamicTools,
        name: &str,
        arguments: Option<JsonObject>,
    ) -> Result<CallToolResult, ErrorData> {
        tracing::debug!("dispatching call to tool {name}");
        let Some(entry) = tools.get(name) else {
            tracing::error!("unknown tool requested: {name}");
            return Err(ErrorData::invalid_params(
                format!("unknown tool: {name}"),
                Some(serde_json::json!({ "tool": name })),
            ));
        };

        let question = arguments
            .as_ref()
            .and_then(|arguments| arguments.get("question"))
            .and_then(serde_json::Value::as_str)
            .filter(|question| !question.trim().is_empty());
        let Some(question) = question else {
            tracing::error!("missing question argument for tool {name}");
            return Err(ErrorData::invalid_params(MISSING_QUESTION, None));
        };

        let target = PredictionTarget::Chatflow(entry.chatflow_id.clone());
        Ok(self.predict(&target, question).await)
    }
}

fn require_question(question: &str) -> Result<(), ErrorData> {
    if question.trim().is_empty() {
        return Err(ErrorData::invalid_params(MISSING_QUESTION, None));
    }
    Ok(())
}

#[tool_router(router = catalog_router)]
impl FlowiseMcp {
    /// List all available chatflows from the Flowise API; returns a JSON array of
    /// `{"id", "name"}` objects.
    #[tool(name = "list_chatflows")]
    async fn list_chatflows(&self) -> Result<CallToolResult, ErrorData> {
        tracing::debug!("handling list_chatflows");
        let chatflows = match self.client.list_chatflows().await {
            Ok(chatflows) => chatflows,
            Err(err) => {
                tracing::error!("listing chatflows failed: {err}");
                return Ok(CallToolResult::error(vec![Content::text(format!("Error: {err}"))]));
            }
        };
        let text = serde_json::to_string(&chatflows).map_err(|err| {
            ErrorData::internal_error(format!("cannot encode chatflows: {err}"), None)
        })?;
        Ok(CallToolResult::success(vec![Content::text(text)]))
    }

    /// Create a prediction by sending a question to a specific chatflow (ids come from
    /// `list_chatflows`).
    // Arguments are checked in order: chatflow_id shape, question, then chatflow availability.
    #[tool(name = "create_prediction")]
    async fn create_prediction(
        &self,
        params: Parameters<CreatePredictionParams>,
    ) -> Result<CallToolResult, ErrorData> {
        let CreatePredictionParams { chatflow_id, question } = params.0;

        let id = ChatflowId::new(chatflow_id.clone()).map_err(|err| {
            ErrorData::invalid_params(
                format!("invalid chatflow_id: {err}"),
                Some(serde_json::json!({ "chatflow_id": chatflow_id })),
            )
        })?;
        require_question(&question)?;
        if !self.client.filter().allows_id(id.as_str()) {
            return Err(ErrorData::invalid_params(
                CHATFLOW_UNAVAILABLE,
                Some(serde_json::json!({ "chatflow_id": id.as_str() })),
            ));
        }

        Ok(self.predict(&PredictionTarget::Chatflow(id), &question).await)
    }
}

#[tool_router(router = locked_router)]
impl FlowiseMcp {
    /// Create a prediction by sending a question to the configured chatflow or assistant.
    #[tool(name = "create_prediction")]
    async fn create_locked_prediction(
        &self,
        params: Parameters<QuestionParams>,
    ) -> Result<CallToolResult, ErrorData> {
        let QuestionParams { question } = params.0;
        require_question(&question)?;

        let ToolSurface::Locked { target, .. } = self.surface.as_ref() else {
            return Err(ErrorData::internal_error("server is not bound to a target", None));
        };
        Ok(self.predict(target, &question).await)
    }
}

impl ServerHandler for FlowiseMcp {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(self.instructions().into()),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: SERVER_NAME.to_owned(),
                version: env!("CARGO_PKG_VERSION").to_owned(),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, ErrorData> {
        tracing::debug!("handling tools/list");
        Ok(ListToolsResult::with_all_items(self.tools()))
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParams,
        context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, ErrorData> {
        if let ToolSurface::Dynamic(tools) = self.surface.as_ref() {
            return self.call_dynamic(tools, &request.name, request.arguments).await;
        }
        let context = ToolCallContext::new(self, request, context);
        self.tool_router.call(context).await
    }
}
