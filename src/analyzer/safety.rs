// Dangerous C function detection

use once_cell::sync::Lazy;
use std::collections::HashMap;

use crate::analyzer::{CheckContext, Checker};
use crate::index::{Diagnostic, RefKind, Severity};

pub const CODE: &str = "CC_UNSAFE_FUNCTION";

/// Known-dangerous C functions and their remediation
static UNSAFE_FUNCTIONS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("strcpy", "Use strncpy() or strlcpy() instead"),
        ("strcat", "Use strncat() or strlcat() instead"),
        ("sprintf", "Use snprintf() instead"),
        ("gets", "Use fgets() instead"),
        ("scanf", "Use fgets() + sscanf() or limit field width (e.g. %99s)"),
        ("vsprintf", "Use vsnprintf() instead"),
        ("tmpnam", "Use mkstemp() instead"),
    ])
});

/// Flags calls to the unsafe C function table, regardless of argument count.
/// Only applies to files recognized as C.
pub struct UnsafeFunctions;

impl Checker for UnsafeFunctions {
    fn code(&self) -> &'static str {
        CODE
    }

    fn check(&self, ctx: &CheckContext) -> Vec<Diagnostic> {
        if !is_c_file(ctx.current_file) {
            return Vec::new();
        }

        let mut diagnostics = Vec::new();
        for r in ctx.buffer_refs {
            if r.kind != RefKind::Call {
                continue;
            }
            if let Some(suggestion) = UNSAFE_FUNCTIONS.get(r.name.as_str()) {
                diagnostics.push(Diagnostic::new(
                    ctx.current_file,
                    r.line,
                    Severity::Warning,
                    CODE,
                    format!(
                        "'{}' is unsafe and can cause buffer overflows. {}.",
                        r.name, suggestion
                    ),
                ));
            }
        }
        diagnostics
    }
}

pub(crate) fn is_c_file(file_path: &str) -> bool {
    file_path.ends_with(".c") || file_path.ends_with(".h")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::Reference;

    fn check(refs: &[Reference], current_file: &str) -> Vec<Diagnostic> {
        UnsafeFunctions.check(&CheckContext {
            buffer_refs: refs,
            buffer_symbols: &[],
            repo_symbols: &[],
            current_file,
        })
    }

    #[test]
    fn strcpy_call_warns_with_remediation() {
        let out = check(&[Reference::call("strcpy", 7, 2)], "main.c");
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].severity, Severity::Warning);
        assert!(out[0].message.contains("strncpy"));
        assert_eq!(out[0].line, 7);
    }

    #[test]
    fn every_table_entry_fires() {
        for name in ["strcpy", "strcat", "sprintf", "gets", "scanf", "vsprintf", "tmpnam"] {
            let out = check(&[Reference::call(name, 1, 0)], "x.c");
            assert_eq!(out.len(), 1, "expected a warning for {}", name);
        }
    }

    #[test]
    fn argument_count_is_irrelevant() {
        assert_eq!(check(&[Reference::call("gets", 1, 0)], "a.c").len(), 1);
        assert_eq!(check(&[Reference::call("gets", 1, 9)], "a.c").len(), 1);
    }

    #[test]
    fn python_files_are_out_of_scope() {
        assert!(check(&[Reference::call("strcpy", 1, 2)], "app.py").is_empty());
    }

    #[test]
    fn headers_count_as_c() {
        assert_eq!(check(&[Reference::call("sprintf", 1, 1)], "util.h").len(), 1);
    }

    #[test]
    fn safe_calls_are_silent() {
        assert!(check(&[Reference::call("snprintf", 1, 3)], "main.c").is_empty());
    }
}
