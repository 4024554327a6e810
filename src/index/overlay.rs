// Open-buffer overlay: substitute live symbols for stale on-disk entries

use std::collections::HashSet;
use std::path::Path;

use tracing::debug;

use crate::index::store::relative_path;
use crate::index::Symbol;
use crate::indexer;

/// An unsaved editor buffer supplied alongside an analysis request
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct OpenBuffer {
    pub content: String,
    pub file_path: String,
}

/// Produce a request-scoped working set: repo symbols with every overlaid
/// file's entries replaced by symbols re-extracted from its live content.
/// The persisted index is never touched.
pub fn overlay_buffers(
    repo_symbols: &[Symbol],
    open_buffers: &[OpenBuffer],
    repo_root: &Path,
) -> Vec<Symbol> {
    if open_buffers.is_empty() {
        return repo_symbols.to_vec();
    }

    let mut overlay_files: HashSet<String> = HashSet::new();
    let mut fresh: Vec<Symbol> = Vec::new();
    for buffer in open_buffers {
        let rel = normalize_buffer_path(&buffer.file_path, repo_root);
        let mut symbols = indexer::extract_symbols(buffer.content.as_bytes(), &rel, None);
        for sym in &mut symbols {
            sym.file_path = rel.clone();
        }
        debug!("overlay {}: {} live symbol(s)", rel, symbols.len());
        overlay_files.insert(rel);
        fresh.append(&mut symbols);
    }

    let mut merged: Vec<Symbol> = repo_symbols
        .iter()
        .filter(|s| !overlay_files.contains(&s.file_path.replace('\\', "/")))
        .cloned()
        .collect();
    merged.extend(fresh);
    merged
}

/// Normalize a buffer path to the repo-relative, forward-slash form used as
/// index keys, so matching works regardless of how the editor reports paths.
pub fn normalize_buffer_path(file_path: &str, repo_root: &Path) -> String {
    let path = Path::new(file_path);
    relative_path(repo_root, path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::SymbolKind;

    fn repo_symbol(name: &str, file_path: &str, type_info: &str) -> Symbol {
        let mut sym = Symbol::new(name, SymbolKind::Variable, file_path, 1, "");
        sym.type_info = Some(type_info.to_string());
        sym
    }

    #[test]
    fn live_buffer_replaces_stale_file_symbols() {
        let repo = vec![
            repo_symbol("balance", "utils.py", "int"),
            repo_symbol("other", "core.py", "float"),
        ];
        let buffers = vec![OpenBuffer {
            content: "balance: str = \"now a string\"\n".to_string(),
            file_path: "utils.py".to_string(),
        }];

        let merged = overlay_buffers(&repo, &buffers, Path::new("/repo"));

        let balances: Vec<&Symbol> = merged.iter().filter(|s| s.name == "balance").collect();
        assert_eq!(balances.len(), 1);
        assert_eq!(balances[0].type_info.as_deref(), Some("str"));
        // Untouched files survive
        assert!(merged.iter().any(|s| s.name == "other"));
    }

    #[test]
    fn absolute_buffer_paths_match_relative_index_keys() {
        let repo = vec![repo_symbol("balance", "src/utils.py", "int")];
        let buffers = vec![OpenBuffer {
            content: "fresh = 1\n".to_string(),
            file_path: "/repo/src/utils.py".to_string(),
        }];

        let merged = overlay_buffers(&repo, &buffers, Path::new("/repo"));

        assert!(!merged.iter().any(|s| s.name == "balance"));
        let fresh = merged.iter().find(|s| s.name == "fresh").unwrap();
        assert_eq!(fresh.file_path, "src/utils.py");
    }

    #[test]
    fn no_buffers_is_a_plain_copy() {
        let repo = vec![repo_symbol("x", "a.py", "int")];
        let merged = overlay_buffers(&repo, &[], Path::new("/repo"));
        assert_eq!(merged, repo);
    }

    #[test]
    fn buffer_for_unknown_language_still_removes_stale_entries() {
        let repo = vec![repo_symbol("ghost", "data.txt", "int")];
        let buffers = vec![OpenBuffer {
            content: "anything".to_string(),
            file_path: "data.txt".to_string(),
        }];

        let merged = overlay_buffers(&repo, &buffers, Path::new("/repo"));
        assert!(merged.is_empty());
    }
}
