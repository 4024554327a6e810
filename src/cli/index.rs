use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::info;
use walkdir::WalkDir;

use crate::config::Config;
use crate::index::store::IndexStore;
use crate::indexer::Language;

/// Build (or rebuild) the repository symbol table and write the snapshot
pub async fn index_repo(project: String, rebuild: bool) -> Result<()> {
    info!("Indexing repository: {}", project);

    // Load configuration
    let config = Config::from_project_dir(&project);

    println!("CodeCheck Indexer v{}", env!("CARGO_PKG_VERSION"));
    println!("Project: {}", project);
    println!(
        "Config: {}",
        if config.project.name != "unnamed-project" {
            "loaded"
        } else {
            "default"
        }
    );
    println!("Languages: {}", config.get_enabled_languages().join(", "));
    println!("Rebuild: {}", rebuild);

    let repo_root = PathBuf::from(&project);
    anyhow::ensure!(repo_root.is_dir(), "not a directory: {}", project);

    // Scan for recognized files first so the summary matches the walk
    println!("\nScanning repository files...");
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::with_template("{spinner} {msg}")?);

    let mut python_files = 0usize;
    let mut c_files = 0usize;
    let excluded = &config.indexing.exclude;
    let walker = WalkDir::new(&repo_root).into_iter().filter_entry(|entry| {
        if entry.depth() == 0 || !entry.file_type().is_dir() {
            return true;
        }
        let name = entry.file_name().to_string_lossy();
        !excluded.iter().any(|d| d.as_str() == name)
    });
    for entry in walker.filter_map(|e| e.ok()) {
        if !entry.file_type().is_file() {
            continue;
        }
        spinner.set_message(entry.path().display().to_string());
        spinner.tick();
        match Language::from_path(&entry.path().to_string_lossy()) {
            Some(Language::Python) => python_files += 1,
            Some(Language::C) => c_files += 1,
            None => {}
        }
    }
    spinner.finish_and_clear();

    println!("Found {} Python files", python_files);
    println!("Found {} C files", c_files);

    // Build and publish the snapshot
    let store = IndexStore::with_excluded(config.indexing.exclude.clone());
    let snapshot = store.ensure(&repo_root, rebuild);

    let mut by_kind: HashMap<String, usize> = HashMap::new();
    for sym in &snapshot.symbols {
        *by_kind.entry(sym.kind.to_string()).or_insert(0) += 1;
    }
    let mut kinds: Vec<(&String, &usize)> = by_kind.iter().collect();
    kinds.sort();

    println!("\nIndexing complete!");
    println!("Total symbols: {}", snapshot.symbols.len());
    for (kind, count) in kinds {
        println!("  {}: {}", kind, count);
    }
    println!(
        "Snapshot: {}",
        repo_root.join(".codecheck").join("symbols.json").display()
    );

    Ok(())
}
