// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-FlowiseMcp-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of flowise-mcp and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! flowise-mcp CLI entrypoint.
//!
//! By default this serves MCP over stdio. Use `--http` to serve streamable HTTP at
//! `http://<host>:<port>/mcp` instead.
//!
//! All settings other than the transport come from the environment (and `.env`).

use std::error::Error;
use std::sync::Arc;

use axum::Router;
use rmcp::transport::{
    streamable_http_server::session::local::LocalSessionManager, StreamableHttpServerConfig,
    StreamableHttpService,
};

use flowise_mcp::client::FlowiseClient;
use flowise_mcp::config::Config;
use flowise_mcp::mcp::FlowiseMcp;

const DEFAULT_HTTP_HOST: &str = "127.0.0.1";
const DEFAULT_HTTP_PORT: u16 = 8000;

fn print_usage(program: &str) {
    eprintln!(
        "Usage:\n  {program}\n  {program} --http [--host <addr>] [--port <port>]\n\nWithout flags MCP is served over stdio.\n--http serves MCP over streamable HTTP at `http://<host>:<port>/mcp`\n(default host {DEFAULT_HTTP_HOST}, default port {DEFAULT_HTTP_PORT}; port 0 = ephemeral).\n\nFlowise settings are read from the environment and `.env`:\nFLOWISE_API_KEY, FLOWISE_API_ENDPOINT, FLOWISE_CHATFLOW_ID, FLOWISE_ASSISTANT_ID,\nFLOWISE_CHATFLOW_DESCRIPTION, FLOWISE_CHATFLOW_DESCRIPTIONS, FLOWISE_CHATFLOW_WHITELIST,\nFLOWISE_CHATFLOW_BLACKLIST, FLOWISE_WHITELIST_NAME_REGEX, FLOWISE_BLACKLIST_NAME_REGEX,\nFLOWISE_TIMEOUT_SECS, FLOWISE_LOG_FILE, DEBUG."
    );
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
struct CliOptions {
    http: bool,
    host: Option<String>,
    port: Option<u16>,
}

fn parse_options(mut args: impl Iterator<Item = String>) -> Result<CliOptions, ()> {
    let mut options = CliOptions::default();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--http" => {
                if options.http {
                    return Err(());
                }
                options.http = true;
            }
            "--host" => {
                if options.host.is_some() {
                    return Err(());
                }
                let host = args.next().ok_or(())?;
                if host.is_empty() || host.starts_with('-') {
                    return Err(());
                }
                options.host = Some(host);
            }
            "--port" => {
                if options.port.is_some() {
                    return Err(());
                }
                let raw = args.next().ok_or(())?;
                let port: u16 = raw.parse().map_err(|_| ())?;
                options.port = Some(port);
            }
            _ => return Err(()),
        }
    }

    if !options.http && (options.host.is_some() || options.port.is_some()) {
        return Err(());
    }

    Ok(options)
}

async fn serve_http(mcp: FlowiseMcp, host: &str, port: u16) -> Result<(), Box<dyn Error>> {
    let listener = tokio::net::TcpListener::bind((host, port)).await?;
    tracing::info!("serving MCP over streamable HTTP at http://{}/mcp", listener.local_addr()?);

    let config =
        StreamableHttpServerConfig { stateful_mode: true, ..StreamableHttpServerConfig::default() };
    let shutdown_token = config.cancellation_token.clone();
    let server_shutdown = shutdown_token.clone();

    let session_manager = Arc::new(LocalSessionManager::default());
    let mcp_service = StreamableHttpService::new(move || Ok(mcp.clone()), session_manager, config);

    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => tracing::info!("interrupt received; shutting down"),
            Err(err) => tracing::warn!("cannot listen for ctrl-c: {err}"),
        }
        shutdown_token.cancel();
    });

    let router = Router::new().nest_service("/mcp", mcp_service);
    axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            server_shutdown.cancelled().await;
        })
        .await?;
    Ok(())
}

fn run(options: CliOptions, config: Config) -> Result<(), Box<dyn Error>> {
    tracing::info!("API key: {}", config.redacted_api_key());
    tracing::info!("API endpoint: {}", config.endpoint);

    let mode = config.mode()?;
    tracing::info!("server mode: {}", mode.label());

    let client = FlowiseClient::from_config(&config)?;
    let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build()?;

    runtime.block_on(async move {
        let mcp = FlowiseMcp::from_mode(client, mode, config.chatflow_description.clone()).await?;
        tracing::info!("advertising {} tool(s)", mcp.tools().len());

        if options.http {
            let host = options.host.as_deref().unwrap_or(DEFAULT_HTTP_HOST);
            let port = options.port.unwrap_or(DEFAULT_HTTP_PORT);
            serve_http(mcp, host, port).await
        } else {
            tracing::info!("serving MCP over stdio");
            mcp.serve_stdio().await?;
            Ok(())
        }
    })
}

fn main() {
    let mut args = std::env::args();
    let program = args.next().unwrap_or_else(|| "flowise-mcp".to_owned());

    let options = match parse_options(args) {
        Ok(options) => options,
        Err(()) => {
            print_usage(&program);
            std::process::exit(2);
        }
    };

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("flowise-mcp: {err}");
            std::process::exit(1);
        }
    };

    if let Err(err) = flowise_mcp::logging::init(config.debug, config.log_file.as_deref()) {
        eprintln!("flowise-mcp: {err}");
        std::process::exit(1);
    }

    if let Err(err) = run(options, config) {
        tracing::error!("flowise-mcp: {err}");
        std::process::exit(1);
    }
}
