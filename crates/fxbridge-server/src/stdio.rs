//! stdio transport for MCP JSON-RPC

use crate::FxBridgeServer;
use crate::logs::LogStore;
use crate::mcp::{
    InitializeParams, InitializeResult, Request, ResourcesCapability, Response,
    ServerCapabilities, ServerInfo, ToolsCapability,
};
use crate::tools::{handle_tool_call, list_tools};
use fxbridge_core::{BridgeError, Result};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{debug, error, info};

const PROTOCOL_VERSION: &str = "2025-11-25";

/// Run the MCP server on stdio until the client disconnects
pub async fn run<L: LogStore>(server: FxBridgeServer<L>) -> Result<()> {
    let stdin = tokio::io::stdin();
    let mut stdout = tokio::io::stdout();
    let mut reader = BufReader::new(stdin);
    let mut line = String::new();

    info!("fxbridge MCP server starting on stdio");

    loop {
        line.clear();
        let bytes_read = reader
            .read_line(&mut line)
            .await
            .map_err(|e| BridgeError::Io(format!("Failed to read stdin: {}", e)))?;

        if bytes_read == 0 {
            // EOF - client disconnected
            info!("Client disconnected (EOF)");
            break;
        }

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        debug!("Received: {}", trimmed);

        let request: Request = match serde_json::from_str(trimmed) {
            Ok(r) => r,
            Err(e) => {
                error!("Failed to parse request: {}", e);
                continue;
            }
        };

        let response = handle_request(&request, &server).await;
        let response_json = serde_json::to_string(&response)?;

        debug!("Sending: {}", response_json);

        stdout
            .write_all(response_json.as_bytes())
            .await
            .map_err(|e| BridgeError::Io(format!("Failed to write stdout: {}", e)))?;
        stdout
            .write_all(b"\n")
            .await
            .map_err(|e| BridgeError::Io(format!("Failed to write newline: {}", e)))?;
        stdout
            .flush()
            .await
            .map_err(|e| BridgeError::Io(format!("Failed to flush stdout: {}", e)))?;
    }

    // Release the RCON socket on shutdown
    server.manager.read().await.close().await;

    Ok(())
}

async fn handle_request<L: LogStore>(request: &Request, server: &FxBridgeServer<L>) -> Response {
    match request.method.as_str() {
        "initialize" => handle_initialize(request),
        "initialized" => {
            // Notification, no response needed but we return success
            Response::success(request.id.clone(), serde_json::json!({}))
        }
        "tools/list" => handle_tools_list(request),
        "tools/call" => handle_tools_call(request, server).await,
        "resources/list" => handle_resources_list(request),
        "resources/read" => handle_resources_read(request, server).await,
        _ => Response::error(
            request.id.clone(),
            -32601,
            format!("Method not found: {}", request.method),
        ),
    }
}

fn handle_initialize(request: &Request) -> Response {
    let _params: InitializeParams = match serde_json::from_value(request.params.clone()) {
        Ok(p) => p,
        Err(e) => {
            return Response::error(
                request.id.clone(),
                -32602,
                format!("Invalid initialize params: {}", e),
            );
        }
    };

    let result = InitializeResult {
        protocol_version: PROTOCOL_VERSION.to_string(),
        capabilities: ServerCapabilities {
            tools: ToolsCapability {
                list_changed: false,
            },
            resources: ResourcesCapability {
                subscribe: false,
                list_changed: false,
            },
        },
        server_info: ServerInfo {
            name: env!("CARGO_PKG_NAME").to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
    };

    match serde_json::to_value(result) {
        Ok(value) => Response::success(request.id.clone(), value),
        Err(e) => Response::error(request.id.clone(), -32603, e.to_string()),
    }
}

fn handle_tools_list(request: &Request) -> Response {
    let tools = list_tools();
    Response::success(request.id.clone(), serde_json::json!({ "tools": tools }))
}

async fn handle_tools_call<L: LogStore>(request: &Request, server: &FxBridgeServer<L>) -> Response {
    #[derive(serde::Deserialize)]
    struct ToolCallParams {
        name: String,
        #[serde(default)]
        arguments: serde_json::Value,
    }

    let params: ToolCallParams = match serde_json::from_value(request.params.clone()) {
        Ok(p) => p,
        Err(e) => {
            return Response::error(
                request.id.clone(),
                -32602,
                format!("Invalid tool call params: {}", e),
            );
        }
    };

    handle_tool_call(
        &params.name,
        params.arguments,
        request.id.clone(),
        &server.manager,
    )
    .await
}

fn handle_resources_list(request: &Request) -> Response {
    let resources = vec![
        serde_json::json!({
            "uri": "fxserver://logs/recent",
            "name": "Recent Operations",
            "description": "Recent bridge operation log",
            "mimeType": "text/plain"
        }),
        serde_json::json!({
            "uri": "fxserver://console/info",
            "name": "Console Information",
            "description": "Server console information via log files",
            "mimeType": "text/plain"
        }),
    ];

    Response::success(
        request.id.clone(),
        serde_json::json!({ "resources": resources }),
    )
}

async fn handle_resources_read<L: LogStore>(
    request: &Request,
    server: &FxBridgeServer<L>,
) -> Response {
    #[derive(serde::Deserialize)]
    struct ReadParams {
        uri: String,
    }

    let params: ReadParams = match serde_json::from_value(request.params.clone()) {
        Ok(p) => p,
        Err(e) => {
            return Response::error(
                request.id.clone(),
                -32602,
                format!("Invalid read params: {}", e),
            );
        }
    };

    let content = match params.uri.as_str() {
        "fxserver://logs/recent" => {
            let manager = server.manager.read().await;
            manager
                .recent_operations(100)
                .iter()
                .map(|op| op.render())
                .collect::<Vec<_>>()
                .join("\n")
        }
        "fxserver://console/info" => {
            let mut manager = server.manager.write().await;
            manager.console_logs(100).await
        }
        _ => {
            return Response::error(
                request.id.clone(),
                -32602,
                format!("Unknown resource: {}", params.uri),
            );
        }
    };

    Response::success(
        request.id.clone(),
        serde_json::json!({
            "contents": [{
                "uri": params.uri,
                "mimeType": "text/plain",
                "text": content
            }]
        }),
    )
}
