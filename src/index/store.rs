// Repository symbol store: walk, staleness tracking, snapshot publication

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::index::Symbol;
use crate::indexer;

/// Directory names never descended into during a repository walk.
pub const EXCLUDED_DIRS: &[&str] = &[
    "node_modules",
    ".git",
    "__pycache__",
    ".venv",
    "venv",
    "dist",
    "build",
    "target",
    ".codecheck",
];

/// An immutable, fully built view of one repository's symbols.
#[derive(Debug)]
pub struct IndexSnapshot {
    pub repo_path: PathBuf,
    pub symbols: Vec<Symbol>,
    /// Max modification time over recognized files at build time
    pub max_mtime: Option<SystemTime>,
    pub built_at: DateTime<Utc>,
}

/// Process-wide symbol index handle. A rebuild constructs the new snapshot
/// completely and only then publishes it under the write lock, so readers
/// observe either the old or the new index, never a partial one.
pub struct IndexStore {
    current: RwLock<Option<Arc<IndexSnapshot>>>,
    excluded: Vec<String>,
}

impl IndexStore {
    pub fn new() -> Self {
        Self::with_excluded(EXCLUDED_DIRS.iter().map(|s| s.to_string()).collect())
    }

    pub fn with_excluded(excluded: Vec<String>) -> Self {
        Self {
            current: RwLock::new(None),
            excluded,
        }
    }

    /// Return the current snapshot for `repo_root`, rebuilding when stale.
    ///
    /// Rebuild triggers: an explicit `force`, no cached snapshot, a cached
    /// snapshot for a different root, or a recognized file modified since
    /// the last build. Otherwise the cached snapshot is returned as-is.
    pub fn ensure(&self, repo_root: &Path, force: bool) -> Arc<IndexSnapshot> {
        let (files, current_mtime) = self.scan(repo_root);

        if !force {
            let guard = self.current.read();
            if let Some(snapshot) = guard.as_ref() {
                let fresh = snapshot.repo_path == repo_root
                    && current_mtime <= snapshot.max_mtime;
                if fresh {
                    debug!(
                        "symbol index for {} is current ({} symbols)",
                        repo_root.display(),
                        snapshot.symbols.len()
                    );
                    return Arc::clone(snapshot);
                }
            }
        }

        let snapshot = Arc::new(self.build(repo_root, files, current_mtime));
        self.persist(&snapshot);
        *self.current.write() = Some(Arc::clone(&snapshot));
        snapshot
    }

    /// Walk the repository, returning recognized files and their max mtime.
    fn scan(&self, repo_root: &Path) -> (Vec<PathBuf>, Option<SystemTime>) {
        let mut files = Vec::new();
        let mut max_mtime: Option<SystemTime> = None;

        let walker = WalkDir::new(repo_root).into_iter().filter_entry(|entry| {
            if entry.depth() == 0 || !entry.file_type().is_dir() {
                return true;
            }
            let name = entry.file_name().to_string_lossy();
            !self.excluded.iter().any(|d| d.as_str() == name)
        });

        for entry in walker.filter_map(|e| e.ok()) {
            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.path();
            if indexer::Language::from_path(&path.to_string_lossy()).is_none() {
                continue;
            }
            if let Ok(meta) = entry.metadata() {
                if let Ok(mtime) = meta.modified() {
                    max_mtime = Some(max_mtime.map_or(mtime, |m| m.max(mtime)));
                }
            }
            files.push(path.to_path_buf());
        }
        (files, max_mtime)
    }

    fn build(
        &self,
        repo_root: &Path,
        files: Vec<PathBuf>,
        max_mtime: Option<SystemTime>,
    ) -> IndexSnapshot {
        let mut symbols = Vec::new();
        for path in &files {
            let source = match fs::read(path) {
                Ok(bytes) => bytes,
                Err(e) => {
                    warn!("skipping unreadable file {}: {}", path.display(), e);
                    continue;
                }
            };
            let rel = relative_path(repo_root, path);
            symbols.extend(indexer::extract_symbols(&source, &rel, None));
        }
        info!(
            "built symbol index for {}: {} file(s), {} symbol(s)",
            repo_root.display(),
            files.len(),
            symbols.len()
        );
        IndexSnapshot {
            repo_path: repo_root.to_path_buf(),
            symbols,
            max_mtime,
            built_at: Utc::now(),
        }
    }

    /// Best-effort snapshot file under `<repo>/.codecheck/`; failure is
    /// logged and never propagated.
    fn persist(&self, snapshot: &IndexSnapshot) {
        let data_dir = snapshot.repo_path.join(".codecheck");
        let out_path = data_dir.join("symbols.json");
        let doc = serde_json::json!({
            "repo_path": snapshot.repo_path.to_string_lossy(),
            "built_at": snapshot.built_at.to_rfc3339(),
            "symbol_count": snapshot.symbols.len(),
            "symbols": snapshot.symbols,
        });
        let result = fs::create_dir_all(&data_dir)
            .and_then(|_| fs::write(&out_path, serde_json::to_vec_pretty(&doc).unwrap_or_default()));
        if let Err(e) = result {
            warn!("failed to write snapshot {}: {}", out_path.display(), e);
        }
    }
}

impl Default for IndexStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Repo-relative path with forward slashes, matching overlay normalization.
pub fn relative_path(repo_root: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(repo_root).unwrap_or(path);
    rel.to_string_lossy().replace('\\', "/")
}
