// Static array bounds verification

use std::collections::HashMap;

use crate::analyzer::{CheckContext, Checker};
use crate::index::{Diagnostic, RefKind, Severity};

pub const CODE: &str = "CC_ARRAY_BOUNDS";

/// Flags literal subscripts outside a statically declared array size.
/// Sizes come from repo symbols and current-buffer symbols; the buffer
/// declaration wins when both know the same name.
pub struct ArrayBounds;

impl Checker for ArrayBounds {
    fn code(&self) -> &'static str {
        CODE
    }

    fn check(&self, ctx: &CheckContext) -> Vec<Diagnostic> {
        let mut sizes: HashMap<&str, (usize, &str, u32)> = HashMap::new();
        for sym in ctx.repo_symbols {
            if let Some(size) = sym.array_size {
                sizes.insert(sym.name.as_str(), (size, sym.file_path.as_str(), sym.line));
            }
        }
        for sym in ctx.buffer_symbols {
            if let Some(size) = sym.array_size {
                let file = if sym.file_path.is_empty() {
                    ctx.current_file
                } else {
                    sym.file_path.as_str()
                };
                sizes.insert(sym.name.as_str(), (size, file, sym.line));
            }
        }

        let mut diagnostics = Vec::new();
        for r in ctx.buffer_refs {
            if r.kind != RefKind::ArrayAccess {
                continue;
            }
            let Some(index) = r.index_value else {
                continue;
            };
            let Some(&(size, file, line)) = sizes.get(r.name.as_str()) else {
                continue;
            };
            if index < 0 || index as u64 >= size as u64 {
                diagnostics.push(Diagnostic::new(
                    ctx.current_file,
                    r.line,
                    Severity::Error,
                    CODE,
                    format!(
                        "Index {} exceeds declared size {} for '{}' (declared in {}:{}).",
                        index, size, r.name, file, line
                    ),
                ));
            }
        }
        diagnostics
    }
}
