// Undefined call detection (C)

use once_cell::sync::Lazy;
use std::collections::HashSet;

use crate::analyzer::safety::is_c_file;
use crate::analyzer::{CheckContext, Checker};
use crate::index::{Diagnostic, RefKind, Severity};

pub const CODE: &str = "CC_UNDEFINED_CALL";

/// Standard-library names that never need a repository definition
static LIBC_FUNCTIONS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    HashSet::from([
        "printf", "fprintf", "sprintf", "snprintf", "vsprintf", "vsnprintf", "scanf", "sscanf",
        "fscanf", "puts", "putchar", "fputs", "fputc", "getchar", "fgets", "fgetc", "gets",
        "fopen", "fclose", "fread", "fwrite", "fseek", "ftell", "fflush", "perror", "malloc",
        "calloc", "realloc", "free", "memcpy", "memmove", "memset", "memcmp", "strcpy", "strncpy",
        "strlcpy", "strcat", "strncat", "strlcat", "strcmp", "strncmp", "strlen", "strchr",
        "strrchr", "strstr", "strtok", "strtol", "strtoul", "strtod", "atoi", "atol", "atof",
        "abs", "labs", "rand", "srand", "exit", "abort", "assert", "qsort", "bsearch", "tmpnam",
        "mkstemp", "isdigit", "isalpha", "isspace", "toupper", "tolower", "time", "clock",
    ])
});

/// Flags C calls whose target has no declaration anywhere in the working
/// set and is not a standard-library name. Restricted to C: dynamic-language
/// call targets routinely come from imports this tool does not resolve.
pub struct UndefinedCall;

impl Checker for UndefinedCall {
    fn code(&self) -> &'static str {
        CODE
    }

    fn check(&self, ctx: &CheckContext) -> Vec<Diagnostic> {
        if !is_c_file(ctx.current_file) {
            return Vec::new();
        }

        // Any declared name counts: prototypes surface as variables, and a
        // call through a function pointer is not an undefined function.
        let known: HashSet<&str> = ctx
            .buffer_symbols
            .iter()
            .chain(ctx.repo_symbols.iter())
            .map(|s| s.name.as_str())
            .collect();

        let mut diagnostics = Vec::new();
        for r in ctx.buffer_refs {
            if r.kind != RefKind::Call {
                continue;
            }
            if known.contains(r.name.as_str()) || LIBC_FUNCTIONS.contains(r.name.as_str()) {
                continue;
            }
            diagnostics.push(Diagnostic::new(
                ctx.current_file,
                r.line,
                Severity::Warning,
                CODE,
                format!(
                    "Call to '{}' has no declaration in the repository.",
                    r.name
                ),
            ));
        }
        diagnostics
    }
}
