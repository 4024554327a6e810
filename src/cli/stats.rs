use anyhow::Result;
use std::collections::HashMap;
use std::path::PathBuf;

use crate::config::Config;
use crate::index::store::IndexStore;
use crate::indexer::Language;

/// Show symbol table statistics for a repository
pub async fn show_stats(project: String, verbose: bool) -> Result<()> {
    let config = Config::from_project_dir(&project);
    let repo_root = PathBuf::from(&project);
    anyhow::ensure!(repo_root.is_dir(), "not a directory: {}", project);

    let store = IndexStore::with_excluded(config.indexing.exclude.clone());
    let snapshot = store.ensure(&repo_root, false);

    let mut by_kind: HashMap<String, usize> = HashMap::new();
    let mut by_language: HashMap<&'static str, usize> = HashMap::new();
    let mut files: HashMap<&str, usize> = HashMap::new();
    for sym in &snapshot.symbols {
        *by_kind.entry(sym.kind.to_string()).or_insert(0) += 1;
        if let Some(lang) = Language::from_path(&sym.file_path) {
            *by_language.entry(lang.as_str()).or_insert(0) += 1;
        }
        *files.entry(sym.file_path.as_str()).or_insert(0) += 1;
    }

    println!("CodeCheck Statistics");
    println!("Project: {}", project);
    println!("Built at: {}", snapshot.built_at.to_rfc3339());
    println!("Total symbols: {}", snapshot.symbols.len());
    println!("Files with symbols: {}", files.len());

    let mut kinds: Vec<(&String, &usize)> = by_kind.iter().collect();
    kinds.sort();
    println!("\nBy kind:");
    for (kind, count) in kinds {
        println!("  {}: {}", kind, count);
    }

    let mut languages: Vec<(&&str, &usize)> = by_language.iter().collect();
    languages.sort();
    println!("\nBy language:");
    for (lang, count) in languages {
        println!("  {}: {}", lang, count);
    }

    if verbose {
        let mut per_file: Vec<(&&str, &usize)> = files.iter().collect();
        per_file.sort();
        println!("\nBy file:");
        for (file, count) in per_file {
            println!("  {}: {}", file, count);
        }
    }

    Ok(())
}
