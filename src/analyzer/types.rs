// Cross-file type consistency

use std::collections::HashMap;

use crate::analyzer::{CheckContext, Checker};
use crate::index::{Diagnostic, RefKind, Severity, Symbol};

pub const CODE: &str = "CC_TYPE_MISMATCH";

/// Flags a name used with a different type than its declaration in another
/// file. Resolution is first-match-wins by name with no scope awareness;
/// that simplification is part of the observable contract.
pub struct TypeConsistency;

impl Checker for TypeConsistency {
    fn code(&self) -> &'static str {
        CODE
    }

    fn check(&self, ctx: &CheckContext) -> Vec<Diagnostic> {
        // Local type map from the buffer: explicit types first, kind label
        // as the fallback for untyped names.
        let mut local_types: HashMap<&str, String> = HashMap::new();
        for sym in ctx.buffer_symbols {
            if let Some(t) = &sym.type_info {
                local_types.insert(sym.name.as_str(), t.clone());
            }
        }
        for sym in ctx.buffer_symbols {
            local_types
                .entry(sym.name.as_str())
                .or_insert_with(|| sym.kind.to_string());
        }

        // First repo declaration outside the current file wins.
        let mut repo_by_name: HashMap<&str, &Symbol> = HashMap::new();
        for sym in ctx.repo_symbols {
            if sym.file_path == ctx.current_file {
                continue;
            }
            repo_by_name.entry(sym.name.as_str()).or_insert(sym);
        }

        let mut diagnostics = Vec::new();
        for r in ctx.buffer_refs {
            if !matches!(r.kind, RefKind::Read | RefKind::ArrayAccess) {
                continue;
            }
            let Some(repo_def) = repo_by_name.get(r.name.as_str()) else {
                continue;
            };
            let declared = repo_def.type_label();
            let used = r
                .inferred_type
                .clone()
                .or_else(|| local_types.get(r.name.as_str()).cloned());
            let Some(used) = used else {
                continue;
            };
            let declared = declared.trim();
            let used = used.trim();
            if !declared.is_empty() && !used.is_empty() && declared != used {
                diagnostics.push(Diagnostic::new(
                    ctx.current_file,
                    r.line,
                    Severity::Warning,
                    CODE,
                    format!(
                        "'{}' is declared as {} in {}:{} but used as {} here.",
                        r.name, declared, repo_def.file_path, repo_def.line, used
                    ),
                ));
            }
        }
        diagnostics
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::{Reference, SymbolKind};

    fn typed(name: &str, type_info: &str, file_path: &str, line: u32) -> Symbol {
        let mut sym = Symbol::new(name, SymbolKind::Variable, file_path, line, "");
        sym.type_info = Some(type_info.to_string());
        sym
    }

    fn ctx<'a>(
        refs: &'a [Reference],
        buffer: &'a [Symbol],
        repo: &'a [Symbol],
    ) -> CheckContext<'a> {
        CheckContext {
            buffer_refs: refs,
            buffer_symbols: buffer,
            repo_symbols: repo,
            current_file: "main.c",
        }
    }

    #[test]
    fn conflicting_declaration_in_another_file_warns() {
        let refs = vec![Reference::read("balance", 3)];
        let buffer = vec![typed("balance", "float", "main.c", 1)];
        let repo = vec![typed("balance", "int", "utils.py", 10)];

        let out = TypeConsistency.check(&ctx(&refs, &buffer, &repo));
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].severity, Severity::Warning);
        assert!(out[0].message.contains("int"));
        assert!(out[0].message.contains("float"));
        assert!(out[0].message.contains("utils.py:10"));
    }

    #[test]
    fn inferred_reference_type_beats_local_map() {
        let mut r = Reference::read("x", 1);
        r.inferred_type = Some("float".to_string());
        let refs = vec![r];
        let buffer = vec![typed("x", "int", "main.c", 1)];
        let repo = vec![typed("x", "int", "other.c", 2)];

        let out = TypeConsistency.check(&ctx(&refs, &buffer, &repo));
        assert_eq!(out.len(), 1);
        assert!(out[0].message.contains("used as float"));
    }

    #[test]
    fn matching_types_stay_silent() {
        let refs = vec![Reference::read("x", 1)];
        let buffer = vec![typed("x", "int", "main.c", 1)];
        let repo = vec![typed("x", "int", "other.c", 2)];
        assert!(TypeConsistency.check(&ctx(&refs, &buffer, &repo)).is_empty());
    }

    #[test]
    fn same_file_repo_entries_are_ignored() {
        // The buffer supersedes on-disk data for the current file.
        let refs = vec![Reference::read("x", 1)];
        let buffer = vec![typed("x", "float", "main.c", 1)];
        let repo = vec![typed("x", "int", "main.c", 9)];
        assert!(TypeConsistency.check(&ctx(&refs, &buffer, &repo)).is_empty());
    }

    #[test]
    fn kind_label_serves_as_fallback_type() {
        let refs = vec![Reference::read("scores", 2)];
        let buffer = vec![Symbol::new("scores", SymbolKind::Variable, "main.c", 1, "")];
        let mut repo_def = Symbol::new("scores", SymbolKind::Array, "utils.py", 3, "");
        repo_def.array_size = Some(5);
        let repo = vec![repo_def];

        let out = TypeConsistency.check(&ctx(&refs, &buffer, &repo));
        assert_eq!(out.len(), 1);
        assert!(out[0].message.contains("declared as array"));
        assert!(out[0].message.contains("used as variable"));
    }

    #[test]
    fn unknown_names_are_skipped() {
        let refs = vec![Reference::read("mystery", 1)];
        assert!(TypeConsistency.check(&ctx(&refs, &[], &[])).is_empty());
    }
}
