// Function signature drift detection

use std::collections::HashMap;

use crate::analyzer::{CheckContext, Checker};
use crate::index::{Diagnostic, RefKind, Severity, Symbol, SymbolKind};

pub const CODE: &str = "CC_SIGNATURE_DRIFT";

/// Flags calls whose argument count falls outside the declared parameter
/// contract. The accepted range is [parameters without a default, all
/// parameters]; variadic functions accept any count.
pub struct SignatureDrift;

impl Checker for SignatureDrift {
    fn code(&self) -> &'static str {
        CODE
    }

    fn check(&self, ctx: &CheckContext) -> Vec<Diagnostic> {
        // Functions by name, preferring a same-file definition over others.
        let mut funcs: HashMap<&str, &Symbol> = HashMap::new();
        for sym in ctx.repo_symbols {
            if sym.kind != SymbolKind::Function || sym.name.is_empty() {
                continue;
            }
            if !funcs.contains_key(sym.name.as_str()) || sym.file_path == ctx.current_file {
                funcs.insert(sym.name.as_str(), sym);
            }
        }

        let mut diagnostics = Vec::new();
        for r in ctx.buffer_refs {
            if r.kind != RefKind::Call {
                continue;
            }
            let Some(arg_count) = r.arg_count else {
                continue;
            };
            let Some(def) = funcs.get(r.name.as_str()) else {
                continue;
            };
            if def.is_variadic {
                continue;
            }
            let required = def
                .params
                .iter()
                .filter(|p| !p.has_default && !p.name.starts_with('*'))
                .count();
            let total = def.params.len();
            if arg_count >= required && arg_count <= total {
                continue;
            }
            let expected = if required == total {
                format!("{} argument(s)", total)
            } else {
                format!("{} to {} arguments", required, total)
            };
            diagnostics.push(Diagnostic::new(
                ctx.current_file,
                r.line,
                Severity::Warning,
                CODE,
                format!(
                    "Function '{}' expects {} but {} provided (see {}:{}).",
                    r.name, expected, arg_count, def.file_path, def.line
                ),
            ));
        }
        diagnostics
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::{Param, Reference};

    fn function(name: &str, params: Vec<Param>, variadic: bool) -> Symbol {
        let mut sym = Symbol::new(name, SymbolKind::Function, "utils.py", 1, "");
        sym.params = params;
        sym.is_variadic = variadic;
        sym
    }

    fn check(refs: &[Reference], repo: &[Symbol]) -> Vec<Diagnostic> {
        SignatureDrift.check(&CheckContext {
            buffer_refs: refs,
            buffer_symbols: &[],
            repo_symbols: repo,
            current_file: "app.py",
        })
    }

    #[test]
    fn exact_arity_mismatch_warns_with_both_counts() {
        let repo = vec![function(
            "greet",
            vec![Param::new("a", None, false), Param::new("b", None, false)],
            false,
        )];
        let out = check(&[Reference::call("greet", 1, 3)], &repo);
        assert_eq!(out.len(), 1);
        assert!(out[0].message.contains('2'));
        assert!(out[0].message.contains('3'));
        assert!(out[0].message.contains("utils.py:1"));
    }

    #[test]
    fn defaults_open_an_accepted_range() {
        let repo = vec![function(
            "greet",
            vec![
                Param::new("name", Some("str".to_string()), false),
                Param::new("greeting", Some("str".to_string()), true),
            ],
            false,
        )];

        assert!(check(&[Reference::call("greet", 1, 1)], &repo).is_empty());
        assert!(check(&[Reference::call("greet", 1, 2)], &repo).is_empty());

        let too_few = check(&[Reference::call("greet", 1, 0)], &repo);
        assert_eq!(too_few.len(), 1);
        assert!(too_few[0].message.contains("1 to 2"));

        let too_many = check(&[Reference::call("greet", 1, 3)], &repo);
        assert_eq!(too_many.len(), 1);
        assert!(too_many[0].message.contains("1 to 2"));
    }

    #[test]
    fn variadic_accepts_any_count() {
        let repo = vec![function(
            "flexible",
            vec![
                Param::new("*args", None, false),
                Param::new("**kwargs", None, false),
            ],
            true,
        )];
        assert!(check(&[Reference::call("flexible", 1, 0)], &repo).is_empty());
        assert!(check(&[Reference::call("flexible", 1, 5)], &repo).is_empty());
    }

    #[test]
    fn unknown_function_is_skipped() {
        assert!(check(&[Reference::call("mystery", 1, 2)], &[]).is_empty());
    }

    #[test]
    fn call_without_count_is_skipped() {
        let repo = vec![function("f", vec![Param::new("a", None, false)], false)];
        let mut r = Reference::call("f", 1, 0);
        r.arg_count = None;
        assert!(check(&[r], &repo).is_empty());
    }

    #[test]
    fn same_file_definition_is_preferred() {
        let mut other = function("calc", vec![Param::new("a", None, false)], false);
        other.file_path = "legacy.py".to_string();
        let mut local = function(
            "calc",
            vec![Param::new("a", None, false), Param::new("b", None, false)],
            false,
        );
        local.file_path = "app.py".to_string();
        let repo = vec![other, local];

        // Two args matches the same-file definition, not the stale one.
        assert!(check(&[Reference::call("calc", 1, 2)], &repo).is_empty());
    }

    #[test]
    fn c_style_exact_signature_still_checked() {
        let mut add = function(
            "add",
            vec![
                Param::new("a", Some("int".to_string()), false),
                Param::new("b", Some("int".to_string()), false),
            ],
            false,
        );
        add.file_path = "core.c".to_string();
        let repo = vec![add];

        assert!(check(&[Reference::call("add", 1, 2)], &repo).is_empty());
        assert_eq!(check(&[Reference::call("add", 1, 3)], &repo).len(), 1);
    }
}
