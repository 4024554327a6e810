// Tool handlers mapping JSON-RPC arguments onto the service

use serde_json::{json, Value};

use crate::server::ToolError;
use crate::service::{AnalysisService, AnalyzeRequest, RefreshRequest};

/// Analyze tool: §6 payload in, diagnostics out
pub fn analyze(service: &AnalysisService, args: Value) -> Result<Value, ToolError> {
    let request: AnalyzeRequest = serde_json::from_value(args)?;
    let response = service.analyze(request)?;
    Ok(json!({
        "diagnostics": response.diagnostics,
        "file": response.file,
    }))
}

/// Refresh tool: force an unconditional rebuild
pub fn refresh(service: &AnalysisService, args: Value) -> Result<Value, ToolError> {
    let request: RefreshRequest = serde_json::from_value(args)?;
    let response = service.refresh(request)?;
    Ok(json!({
        "symbol_count": response.symbol_count,
        "repo_path": response.repo_path,
    }))
}

/// Symbols tool: current table, built lazily
pub fn symbols(service: &AnalysisService, args: Value) -> Result<Value, ToolError> {
    let repo_path = required_str(&args, "repo_path")?;
    let response = service.symbols(repo_path)?;
    Ok(json!({ "symbols": response.symbols }))
}

/// Graph tool: read-only projection of the table
pub fn graph(service: &AnalysisService, args: Value) -> Result<Value, ToolError> {
    let repo_path = required_str(&args, "repo_path")?;
    let graph = service.graph(repo_path)?;
    Ok(json!({ "nodes": graph.nodes, "edges": graph.edges }))
}

/// Rules tool: static catalog pass-through
pub fn rules(service: &AnalysisService) -> Result<Value, ToolError> {
    Ok(service.rules())
}

fn required_str<'a>(args: &'a Value, key: &str) -> Result<&'a str, ToolError> {
    args.get(key)
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ToolError(format!("{} required", key)))
}
