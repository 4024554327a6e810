// Transport-independent analysis operations

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::analyzer::{self, CheckContext};
use crate::graph::{self, Graph};
use crate::index::overlay::{self, OpenBuffer};
use crate::index::store::IndexStore;
use crate::index::{Diagnostic, Symbol};
use crate::indexer::{self, Language};

/// Failures surfaced to transport layers. Only `InvalidRepoPath` is a
/// client error; everything upstream of it degrades instead of failing.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("invalid repo_path: {0}")]
    InvalidRepoPath(String),
}

#[derive(Debug, Clone, Deserialize)]
pub struct AnalyzeRequest {
    pub content: String,
    pub file_path: String,
    pub repo_path: String,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub open_buffers: Option<Vec<OpenBuffer>>,
}

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub diagnostics: Vec<Diagnostic>,
    pub file: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RefreshRequest {
    pub repo_path: String,
}

#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub symbol_count: usize,
    pub repo_path: String,
}

#[derive(Debug, Serialize)]
pub struct SymbolsResponse {
    pub symbols: Vec<Symbol>,
}

/// The operation layer shared by the stdio server and the CLI commands.
/// Owns the process-wide index store.
pub struct AnalysisService {
    store: IndexStore,
    rules_path: Option<PathBuf>,
}

impl AnalysisService {
    pub fn new(store: IndexStore) -> Self {
        Self {
            store,
            rules_path: None,
        }
    }

    pub fn with_rules_path(mut self, rules_path: Option<PathBuf>) -> Self {
        self.rules_path = rules_path;
        self
    }

    /// Analyze an in-progress buffer against repository knowledge.
    pub fn analyze(&self, request: AnalyzeRequest) -> Result<AnalyzeResponse, ServiceError> {
        let root = self.validated_root(&request.repo_path)?;
        let snapshot = self.store.ensure(&root, false);

        let language = request.language.as_deref().and_then(Language::from_name);
        let (buffer_symbols, buffer_refs) =
            indexer::parse_buffer(&request.content, &request.file_path, language);

        // Checkers compare repo-relative paths; the response echoes the
        // caller's original path.
        let current_file = overlay::normalize_buffer_path(&request.file_path, &root);
        let open_buffers = request.open_buffers.unwrap_or_default();
        let working_set = overlay::overlay_buffers(&snapshot.symbols, &open_buffers, &root);

        let checkers = analyzer::default_pipeline();
        let diagnostics = analyzer::run_pipeline(
            &checkers,
            &CheckContext {
                buffer_refs: &buffer_refs,
                buffer_symbols: &buffer_symbols,
                repo_symbols: &working_set,
                current_file: &current_file,
            },
        );
        info!(
            "analyze {}: {} reference(s), {} diagnostic(s)",
            current_file,
            buffer_refs.len(),
            diagnostics.len()
        );

        Ok(AnalyzeResponse {
            diagnostics,
            file: request.file_path,
        })
    }

    /// Unconditionally rebuild the symbol table for a repository.
    pub fn refresh(&self, request: RefreshRequest) -> Result<RefreshResponse, ServiceError> {
        let root = self.validated_root(&request.repo_path)?;
        let snapshot = self.store.ensure(&root, true);
        info!(
            "refresh {}: {} symbol(s)",
            root.display(),
            snapshot.symbols.len()
        );
        Ok(RefreshResponse {
            symbol_count: snapshot.symbols.len(),
            repo_path: root.to_string_lossy().into_owned(),
        })
    }

    /// Current symbol table, building lazily when no snapshot exists.
    pub fn symbols(&self, repo_path: &str) -> Result<SymbolsResponse, ServiceError> {
        let root = self.validated_root(repo_path)?;
        let snapshot = self.store.ensure(&root, false);
        Ok(SymbolsResponse {
            symbols: snapshot.symbols.clone(),
        })
    }

    /// Repository graph projection of the current symbol table.
    pub fn graph(&self, repo_path: &str) -> Result<Graph, ServiceError> {
        let root = self.validated_root(repo_path)?;
        let snapshot = self.store.ensure(&root, false);
        Ok(graph::build_graph(&snapshot.symbols))
    }

    /// Externally defined rule catalog, passed through unchanged.
    pub fn rules(&self) -> serde_json::Value {
        if let Some(path) = &self.rules_path {
            if let Ok(raw) = std::fs::read_to_string(path) {
                if let Ok(value) = serde_json::from_str(&raw) {
                    return value;
                }
            }
        }
        serde_json::json!({ "rules": [] })
    }

    fn validated_root(&self, repo_path: &str) -> Result<PathBuf, ServiceError> {
        let root = Path::new(repo_path)
            .canonicalize()
            .map_err(|_| ServiceError::InvalidRepoPath(repo_path.to_string()))?;
        if !root.is_dir() {
            return Err(ServiceError::InvalidRepoPath(repo_path.to_string()));
        }
        Ok(root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn service() -> AnalysisService {
        AnalysisService::new(IndexStore::new())
    }

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    fn analyze_request(repo: &Path, file_path: &str, content: &str) -> AnalyzeRequest {
        AnalyzeRequest {
            content: content.to_string(),
            file_path: file_path.to_string(),
            repo_path: repo.to_string_lossy().into_owned(),
            language: None,
            open_buffers: None,
        }
    }

    #[test]
    fn nonexistent_repo_is_rejected_before_parsing() {
        let err = service()
            .analyze(analyze_request(
                Path::new("/definitely/not/a/repo"),
                "a.py",
                "x = 1\n",
            ))
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidRepoPath(_)));
    }

    #[test]
    fn signature_drift_against_repo_definition() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "utils.py",
            "def greet(name, greeting=\"Hello\"):\n    return name\n",
        );

        let response = service()
            .analyze(analyze_request(
                dir.path(),
                "app.py",
                "greet(\"a\", \"b\", \"c\")\n",
            ))
            .unwrap();

        let drift: Vec<&Diagnostic> = response
            .diagnostics
            .iter()
            .filter(|d| d.code == "CC_SIGNATURE_DRIFT")
            .collect();
        assert_eq!(drift.len(), 1);
        assert!(drift[0].message.contains("1 to 2"));
        assert_eq!(response.file, "app.py");
    }

    #[test]
    fn bounds_error_from_python_list_in_another_file() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "utils.py", "scores = [90, 85, 78]\n");

        let response = service()
            .analyze(analyze_request(dir.path(), "app.py", "x = scores[5]\n"))
            .unwrap();

        let bounds: Vec<&Diagnostic> = response
            .diagnostics
            .iter()
            .filter(|d| d.code == "CC_ARRAY_BOUNDS")
            .collect();
        assert_eq!(bounds.len(), 1);
        assert!(bounds[0].message.contains('5'));
        assert!(bounds[0].message.contains('3'));
    }

    #[test]
    fn open_buffer_overlay_supersedes_stale_disk_state() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "utils.py", "scores = [90, 85, 78]\n");

        // Index 5 is out of bounds on disk, but the unsaved utils.py buffer
        // grew the list to six entries.
        let mut request = analyze_request(dir.path(), "app.py", "x = scores[5]\n");
        request.open_buffers = Some(vec![OpenBuffer {
            content: "scores = [1, 2, 3, 4, 5, 6]\n".to_string(),
            file_path: "utils.py".to_string(),
        }]);

        let response = service().analyze(request).unwrap();
        assert!(response
            .diagnostics
            .iter()
            .all(|d| d.code != "CC_ARRAY_BOUNDS"));
    }

    #[test]
    fn refresh_reports_symbol_count() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "a.py", "x = 1\ny = 2\n");

        let response = service()
            .refresh(RefreshRequest {
                repo_path: dir.path().to_string_lossy().into_owned(),
            })
            .unwrap();
        assert_eq!(response.symbol_count, 2);
    }

    #[test]
    fn symbols_builds_lazily() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "a.py", "x = 1\n");

        let response = service()
            .symbols(&dir.path().to_string_lossy())
            .unwrap();
        assert_eq!(response.symbols.len(), 1);
        assert_eq!(response.symbols[0].name, "x");
    }

    #[test]
    fn rules_catalog_passes_through_or_defaults_empty() {
        let dir = tempfile::tempdir().unwrap();
        let rules_path = dir.path().join("rules.json");
        fs::write(&rules_path, r#"{"rules": [{"id": "CC_ARRAY_BOUNDS"}]}"#).unwrap();

        let with_file = AnalysisService::new(IndexStore::new())
            .with_rules_path(Some(rules_path));
        assert_eq!(with_file.rules()["rules"][0]["id"], "CC_ARRAY_BOUNDS");

        let without = service();
        assert!(without.rules()["rules"].as_array().unwrap().is_empty());
    }

    #[test]
    fn unsafe_c_call_flagged_in_one_shot_analysis() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "lib.c", "int helper(void) { return 0; }\n");

        let response = service()
            .analyze(analyze_request(
                dir.path(),
                "main.c",
                "int main(void) { gets(buf); return 0; }\n",
            ))
            .unwrap();
        assert!(response
            .diagnostics
            .iter()
            .any(|d| d.code == "CC_UNSAFE_FUNCTION" && d.message.contains("fgets")));
    }
}
