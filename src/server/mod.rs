// JSON-RPC server over stdio

pub mod tools;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::io::{self, Write};
use tokio::sync::mpsc;
use tracing::{debug, error, info};

use crate::service::{AnalysisService, ServiceError};

/// JSON-RPC message
#[derive(Debug, Serialize, Deserialize)]
struct JsonRpcMessage {
    jsonrpc: String,
    id: Option<Value>,
    method: Option<String>,
    params: Option<Value>,
    result: Option<Value>,
    error: Option<JsonRpcError>,
}

/// JSON-RPC error
#[derive(Debug, Serialize, Deserialize)]
struct JsonRpcError {
    code: i32,
    message: String,
    data: Option<Value>,
}

/// Tool definition advertised to clients
#[derive(Debug, Serialize, Deserialize)]
struct Tool {
    name: String,
    description: String,
    input_schema: Value,
}

/// Server capabilities
#[derive(Debug, Serialize, Deserialize)]
struct ServerCapabilities {
    tools: Option<Value>,
}

/// Server info
#[derive(Debug, Serialize, Deserialize)]
struct ServerInfo {
    name: String,
    version: String,
}

/// Initialize result
#[derive(Debug, Serialize, Deserialize)]
struct InitializeResult {
    protocol_version: String,
    capabilities: ServerCapabilities,
    server_info: ServerInfo,
}

/// Analysis server speaking JSON-RPC over stdio
pub struct AnalysisServer {
    service: AnalysisService,
}

impl AnalysisServer {
    pub fn new(service: AnalysisService) -> Self {
        Self { service }
    }

    /// Run the server loop until stdin closes
    pub async fn run(self) -> Result<()> {
        info!("Starting analysis server");

        let (tx, mut rx) = mpsc::unbounded_channel();

        // Spawn a task to handle stdin
        let tx_clone = tx.clone();
        tokio::spawn(async move {
            let stdin = io::stdin();
            let mut lines = stdin.lines();

            while let Some(line) = lines.next() {
                match line {
                    Ok(line) => {
                        if let Err(e) = tx_clone.send(line) {
                            error!("Failed to send line to channel: {}", e);
                            break;
                        }
                    }
                    Err(e) => {
                        error!("Error reading from stdin: {}", e);
                        break;
                    }
                }
            }
        });

        // Main message processing loop
        while let Some(line) = rx.recv().await {
            debug!("Received: {}", line);

            match self.handle_message(&line) {
                Ok(response) => {
                    if let Some(response) = response {
                        println!("{}", response);
                        io::stdout().flush()?;
                    }
                }
                Err(e) => {
                    error!("Error handling message: {}", e);
                    let error_response = json!({
                        "jsonrpc": "2.0",
                        "id": null,
                        "error": {
                            "code": -32603,
                            "message": format!("Internal error: {}", e)
                        }
                    });
                    println!("{}", error_response);
                    io::stdout().flush()?;
                }
            }
        }

        Ok(())
    }

    /// Handle a single JSON-RPC message
    fn handle_message(&self, message: &str) -> Result<Option<String>> {
        let msg: JsonRpcMessage = serde_json::from_str(message)?;

        match msg.method.as_deref() {
            Some("initialize") => {
                let result = InitializeResult {
                    protocol_version: "2024-11-05".to_string(),
                    capabilities: ServerCapabilities {
                        tools: Some(json!({})),
                    },
                    server_info: ServerInfo {
                        name: "codecheck".to_string(),
                        version: env!("CARGO_PKG_VERSION").to_string(),
                    },
                };

                let response = json!({
                    "jsonrpc": "2.0",
                    "id": msg.id,
                    "result": result
                });

                Ok(Some(serde_json::to_string(&response)?))
            }

            Some("tools/list") => {
                let tools = self.list_tools();
                let response = json!({
                    "jsonrpc": "2.0",
                    "id": msg.id,
                    "result": { "tools": tools }
                });

                Ok(Some(serde_json::to_string(&response)?))
            }

            Some("tools/call") => {
                let Some(params) = &msg.params else {
                    let error = json!({
                        "jsonrpc": "2.0",
                        "id": msg.id,
                        "error": {
                            "code": -32602,
                            "message": "Invalid params"
                        }
                    });
                    return Ok(Some(serde_json::to_string(&error)?));
                };

                let response = match self.call_tool(params) {
                    Ok(result) => json!({
                        "jsonrpc": "2.0",
                        "id": msg.id,
                        "result": result
                    }),
                    Err(ToolError(message)) => json!({
                        "jsonrpc": "2.0",
                        "id": msg.id,
                        "error": { "code": -32602, "message": message }
                    }),
                };

                Ok(Some(serde_json::to_string(&response)?))
            }

            Some("shutdown") => {
                info!("Received shutdown request");
                let response = json!({
                    "jsonrpc": "2.0",
                    "id": msg.id,
                    "result": null
                });
                Ok(Some(serde_json::to_string(&response)?))
            }

            _ => {
                let error = json!({
                    "jsonrpc": "2.0",
                    "id": msg.id,
                    "error": {
                        "code": -32601,
                        "message": "Method not found"
                    }
                });
                Ok(Some(serde_json::to_string(&error)?))
            }
        }
    }

    /// List available tools
    fn list_tools(&self) -> Vec<Tool> {
        vec![
            Tool {
                name: "analyze".to_string(),
                description: "Analyze an unsaved buffer against repository knowledge".to_string(),
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "content": { "type": "string", "description": "Buffer content" },
                        "file_path": { "type": "string", "description": "Path of the buffer's file" },
                        "repo_path": { "type": "string", "description": "Repository root" },
                        "language": {
                            "type": "string",
                            "enum": ["python", "c"],
                            "description": "Override extension-based language detection"
                        },
                        "open_buffers": {
                            "type": "array",
                            "items": {
                                "type": "object",
                                "properties": {
                                    "content": { "type": "string" },
                                    "file_path": { "type": "string" }
                                },
                                "required": ["content", "file_path"]
                            },
                            "description": "Other unsaved buffers to overlay"
                        }
                    },
                    "required": ["content", "file_path", "repo_path"]
                }),
            },
            Tool {
                name: "refresh".to_string(),
                description: "Rescan the repository and rebuild the symbol table".to_string(),
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "repo_path": { "type": "string", "description": "Repository root" }
                    },
                    "required": ["repo_path"]
                }),
            },
            Tool {
                name: "symbols".to_string(),
                description: "Return the repository symbol table (builds if needed)".to_string(),
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "repo_path": { "type": "string", "description": "Repository root" }
                    },
                    "required": ["repo_path"]
                }),
            },
            Tool {
                name: "graph".to_string(),
                description: "Return the repository graph (nodes + edges)".to_string(),
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "repo_path": { "type": "string", "description": "Repository root" }
                    },
                    "required": ["repo_path"]
                }),
            },
            Tool {
                name: "rules".to_string(),
                description: "Return the static rule catalog".to_string(),
                input_schema: json!({
                    "type": "object",
                    "properties": {}
                }),
            },
        ]
    }

    /// Dispatch a tool call to the service
    fn call_tool(&self, params: &Value) -> Result<Value, ToolError> {
        let tool_name = params["name"]
            .as_str()
            .ok_or_else(|| ToolError("Missing tool name".to_string()))?;
        let args = params
            .get("arguments")
            .cloned()
            .unwrap_or_else(|| json!({}));

        match tool_name {
            "analyze" => tools::analyze(&self.service, args),
            "refresh" => tools::refresh(&self.service, args),
            "symbols" => tools::symbols(&self.service, args),
            "graph" => tools::graph(&self.service, args),
            "rules" => tools::rules(&self.service),
            _ => Err(ToolError(format!("Unknown tool: {}", tool_name))),
        }
    }
}

/// A client-caused tool failure, reported as a JSON-RPC invalid-params
/// error. Internal failures surface through the outer message loop instead.
#[derive(Debug)]
pub struct ToolError(pub String);

impl From<ServiceError> for ToolError {
    fn from(err: ServiceError) -> Self {
        ToolError(err.to_string())
    }
}

impl From<serde_json::Error> for ToolError {
    fn from(err: serde_json::Error) -> Self {
        ToolError(format!("Invalid arguments: {}", err))
    }
}
