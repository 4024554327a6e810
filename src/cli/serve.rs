use anyhow::Result;
use std::path::PathBuf;
use tracing::info;

use crate::config::Config;
use crate::index::store::IndexStore;
use crate::server::AnalysisServer;
use crate::service::AnalysisService;

/// Start the analysis server with stdio transport
pub async fn serve_stdio(project: String) -> Result<()> {
    // Load configuration
    let config = Config::from_project_dir(&project);

    info!("Analysis server (stdio) for project: {}", project);
    println!(
        "Config: {}",
        if config.project.name != "unnamed-project" {
            "loaded"
        } else {
            "default"
        }
    );

    let store = IndexStore::with_excluded(config.indexing.exclude.clone());
    let rules_path = config
        .server
        .rules_file
        .as_ref()
        .map(|f| PathBuf::from(&project).join(f));
    let service = AnalysisService::new(store).with_rules_path(rules_path);

    let server = AnalysisServer::new(service);
    server.run().await?;

    Ok(())
}
