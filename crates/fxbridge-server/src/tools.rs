//! MCP tool definitions and dispatch

use crate::logs::LogStore;
use crate::manager::ServerManager;
use crate::mcp::{RequestId, Response};
use fxbridge_core::ToolResponse;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Tool definition for MCP tools/list
#[derive(Debug, Clone, Serialize)]
pub struct ToolDef {
    pub name: String,
    pub description: String,
    #[serde(rename = "inputSchema")]
    pub input_schema: serde_json::Value,
}

/// Get list of available tools
pub fn list_tools() -> Vec<ToolDef> {
    vec![
        ToolDef {
            name: "ensure_plugin".into(),
            description: "Start/ensure an FXServer plugin".into(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "plugin_name": {
                        "type": "string",
                        "description": "Name of the plugin to ensure"
                    }
                },
                "required": ["plugin_name"]
            }),
        },
        ToolDef {
            name: "stop_plugin".into(),
            description: "Stop an FXServer plugin".into(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "plugin_name": {
                        "type": "string",
                        "description": "Name of the plugin to stop"
                    }
                },
                "required": ["plugin_name"]
            }),
        },
        ToolDef {
            name: "restart_plugin".into(),
            description: "Restart an FXServer plugin".into(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "plugin_name": {
                        "type": "string",
                        "description": "Name of the plugin to restart"
                    }
                },
                "required": ["plugin_name"]
            }),
        },
        ToolDef {
            name: "execute_command".into(),
            description: "Execute a raw RCON command on the server".into(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "command": {
                        "type": "string",
                        "description": "RCON command to execute"
                    }
                },
                "required": ["command"]
            }),
        },
        ToolDef {
            name: "refresh_resources".into(),
            description: "Refresh the server's resource list".into(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {}
            }),
        },
        ToolDef {
            name: "get_server_logs".into(),
            description: "Get server console logs".into(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "lines": {
                        "type": "number",
                        "description": "Number of lines to retrieve (default: 100)"
                    }
                }
            }),
        },
        ToolDef {
            name: "get_plugin_logs".into(),
            description: "Get plugin/script logs".into(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "lines": {
                        "type": "number",
                        "description": "Number of lines to retrieve (default: 50)"
                    },
                    "plugin_name": {
                        "type": "string",
                        "description": "Specific plugin name to filter logs for (optional)"
                    }
                }
            }),
        },
        ToolDef {
            name: "clear_logs".into(),
            description: "Clear the local operation log".into(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {}
            }),
        },
    ]
}

#[derive(Debug, Deserialize)]
struct PluginParams {
    plugin_name: String,
}

#[derive(Debug, Deserialize)]
struct CommandParams {
    command: String,
}

#[derive(Debug, Deserialize)]
struct ServerLogParams {
    #[serde(default = "default_console_lines")]
    lines: usize,
}

#[derive(Debug, Deserialize)]
struct PluginLogParams {
    #[serde(default = "default_plugin_lines")]
    lines: usize,
    plugin_name: Option<String>,
}

fn default_console_lines() -> usize {
    100
}

fn default_plugin_lines() -> usize {
    50
}

/// Handle a tools/call request
pub async fn handle_tool_call<L: LogStore>(
    name: &str,
    params: serde_json::Value,
    id: RequestId,
    manager: &Arc<RwLock<ServerManager<L>>>,
) -> Response {
    match name {
        "ensure_plugin" => {
            let p: PluginParams = match serde_json::from_value(params) {
                Ok(p) => p,
                Err(e) => return invalid_params(id, e),
            };
            let outcome = manager.write().await.ensure_plugin(&p.plugin_name).await;
            envelope_response(id, &outcome)
        }
        "stop_plugin" => {
            let p: PluginParams = match serde_json::from_value(params) {
                Ok(p) => p,
                Err(e) => return invalid_params(id, e),
            };
            let outcome = manager.write().await.stop_plugin(&p.plugin_name).await;
            envelope_response(id, &outcome)
        }
        "restart_plugin" => {
            let p: PluginParams = match serde_json::from_value(params) {
                Ok(p) => p,
                Err(e) => return invalid_params(id, e),
            };
            let outcome = manager.write().await.restart_plugin(&p.plugin_name).await;
            envelope_response(id, &outcome)
        }
        "execute_command" => {
            let p: CommandParams = match serde_json::from_value(params) {
                Ok(p) => p,
                Err(e) => return invalid_params(id, e),
            };
            let outcome = manager.write().await.execute(&p.command).await;
            envelope_response(id, &outcome)
        }
        "refresh_resources" => {
            let outcome = manager.write().await.refresh_resources().await;
            envelope_response(id, &outcome)
        }
        "get_server_logs" => {
            let p: ServerLogParams = match serde_json::from_value(params) {
                Ok(p) => p,
                Err(e) => return invalid_params(id, e),
            };
            let report = manager.write().await.console_logs(p.lines).await;
            Response::text(id, format!("CONSOLE LOGS:\n{}", report))
        }
        "get_plugin_logs" => {
            let p: PluginLogParams = match serde_json::from_value(params) {
                Ok(p) => p,
                Err(e) => return invalid_params(id, e),
            };
            let report = manager
                .write()
                .await
                .plugin_logs(p.lines, p.plugin_name.as_deref())
                .await;
            let title = match &p.plugin_name {
                Some(name) => format!("PLUGIN '{}' LOGS", name),
                None => "ALL PLUGIN LOGS".to_string(),
            };
            Response::text(id, format!("{}:\n{}", title, report))
        }
        "clear_logs" => {
            manager.write().await.clear_operations();
            Response::text(id, "Operation logs cleared")
        }
        _ => Response::error(id, -32601, format!("Unknown tool: {}", name)),
    }
}

/// Render the uniform envelope as the tool's text content
fn envelope_response(id: RequestId, outcome: &ToolResponse) -> Response {
    let text = serde_json::to_string_pretty(outcome).unwrap_or_else(|_| outcome.message.clone());
    Response::text(id, text)
}

fn invalid_params(id: RequestId, err: serde_json::Error) -> Response {
    Response::error(id, -32602, format!("Invalid tool call params: {}", err))
}
