use anyhow::Result;
use std::path::PathBuf;

use crate::config::Config;
use crate::index::store::IndexStore;
use crate::service::{AnalysisService, AnalyzeRequest};

/// One-shot analysis of a file against the repository index
pub async fn analyze_file(file: String, project: String, json: bool) -> Result<()> {
    let config = Config::from_project_dir(&project);
    let content = std::fs::read_to_string(&file)?;

    let store = IndexStore::with_excluded(config.indexing.exclude.clone());
    let rules_path = config
        .server
        .rules_file
        .as_ref()
        .map(|f| PathBuf::from(&project).join(f));
    let service = AnalysisService::new(store).with_rules_path(rules_path);

    let response = service.analyze(AnalyzeRequest {
        content,
        file_path: file.clone(),
        repo_path: project,
        language: None,
        open_buffers: None,
    })?;

    if json {
        println!("{}", serde_json::to_string_pretty(&response)?);
        return Ok(());
    }

    if response.diagnostics.is_empty() {
        println!("No findings in {}", file);
        return Ok(());
    }

    for d in &response.diagnostics {
        println!("{}:{} {} [{}] {}", d.file, d.line, d.severity, d.code, d.message);
    }
    println!("\n{} finding(s)", response.diagnostics.len());

    Ok(())
}
