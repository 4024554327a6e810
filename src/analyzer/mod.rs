// Checker pipeline and diagnostic aggregation

pub mod bounds;
pub mod safety;
pub mod shadow;
pub mod signature;
pub mod types;
pub mod undefined;

use std::collections::HashSet;

use crate::index::{Diagnostic, Reference, Symbol};

/// Inputs shared by every checker for one analysis request
pub struct CheckContext<'a> {
    pub buffer_refs: &'a [Reference],
    pub buffer_symbols: &'a [Symbol],
    pub repo_symbols: &'a [Symbol],
    pub current_file: &'a str,
}

/// One independent check. Pure function of the context: no side effects,
/// no dependence on other checkers or on execution order.
pub trait Checker: Send + Sync {
    fn code(&self) -> &'static str;
    fn check(&self, ctx: &CheckContext) -> Vec<Diagnostic>;
}

/// The full pipeline in emission order.
pub fn default_pipeline() -> Vec<Box<dyn Checker>> {
    vec![
        Box::new(types::TypeConsistency),
        Box::new(bounds::ArrayBounds),
        Box::new(signature::SignatureDrift),
        Box::new(undefined::UndefinedCall),
        Box::new(shadow::VariableShadowing),
        Box::new(safety::UnsafeFunctions),
    ]
}

/// Run every checker and deduplicate the combined output.
pub fn run_pipeline(checkers: &[Box<dyn Checker>], ctx: &CheckContext) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    for checker in checkers {
        let found = checker.check(ctx);
        if !found.is_empty() {
            tracing::debug!("{}: {} diagnostic(s)", checker.code(), found.len());
        }
        diagnostics.extend(found);
    }
    aggregate(diagnostics)
}

/// Drop duplicates by `(file, line, code, message)`, keeping the first
/// occurrence in emission order. No other reordering.
pub fn aggregate(diagnostics: Vec<Diagnostic>) -> Vec<Diagnostic> {
    let mut seen: HashSet<(String, u32, String, String)> = HashSet::new();
    diagnostics
        .into_iter()
        .filter(|d| seen.insert((d.file.clone(), d.line, d.code.clone(), d.message.clone())))
        .collect()
}
