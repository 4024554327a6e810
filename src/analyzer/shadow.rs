// Cross-file shadowing detection

use std::collections::HashMap;

use crate::analyzer::{CheckContext, Checker};
use crate::index::{Diagnostic, Severity, Symbol, SymbolKind};

pub const CODE: &str = "CC_SHADOWED_SYMBOL";

/// Flags scoped buffer declarations that reuse the name of a top-level
/// declaration from another file, where a reader may expect the shared one.
pub struct VariableShadowing;

impl Checker for VariableShadowing {
    fn code(&self) -> &'static str {
        CODE
    }

    fn check(&self, ctx: &CheckContext) -> Vec<Diagnostic> {
        // Top-level variable/array declarations elsewhere in the repo;
        // first match wins, same as the other cross-file lookups.
        let mut globals: HashMap<&str, &Symbol> = HashMap::new();
        for sym in ctx.repo_symbols {
            if !sym.scope.is_empty() || sym.file_path == ctx.current_file {
                continue;
            }
            if !matches!(sym.kind, SymbolKind::Variable | SymbolKind::Array) {
                continue;
            }
            globals.entry(sym.name.as_str()).or_insert(sym);
        }

        let mut diagnostics = Vec::new();
        for sym in ctx.buffer_symbols {
            if sym.scope.is_empty() {
                continue;
            }
            if !matches!(sym.kind, SymbolKind::Variable | SymbolKind::Array) {
                continue;
            }
            if let Some(original) = globals.get(sym.name.as_str()) {
                diagnostics.push(Diagnostic::new(
                    ctx.current_file,
                    sym.line,
                    Severity::Warning,
                    CODE,
                    format!(
                        "'{}' shadows the top-level declaration in {}:{}.",
                        sym.name, original.file_path, original.line
                    ),
                ));
            }
        }
        diagnostics
    }
}
