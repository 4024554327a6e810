// Source extraction: language detection and infallible entry points

pub mod parser;

use std::path::Path;

use crate::index::{Reference, Symbol};
use parser::{CParser, PythonParser};

/// Languages this tool understands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    Python,
    C,
}

impl Language {
    /// Detect a language from a file extension; None means the file is skipped.
    pub fn from_path(file_path: &str) -> Option<Self> {
        let ext = Path::new(file_path).extension()?.to_str()?.to_lowercase();
        match ext.as_str() {
            "py" => Some(Language::Python),
            "c" | "h" => Some(Language::C),
            _ => None,
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "python" => Some(Language::Python),
            "c" => Some(Language::C),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Python => "python",
            Language::C => "c",
        }
    }
}

/// Extract declaration symbols from raw source. Unknown extensions, missing
/// grammars, and parse failures all degrade to an empty result.
pub fn extract_symbols(source: &[u8], file_path: &str, language: Option<Language>) -> Vec<Symbol> {
    match language.or_else(|| Language::from_path(file_path)) {
        Some(Language::Python) => PythonParser::new().extract_symbols(source, file_path),
        Some(Language::C) => CParser::new().extract_symbols(source, file_path),
        None => Vec::new(),
    }
}

/// Extract use-site references from raw source, with the same degradation
/// contract as [`extract_symbols`].
pub fn extract_references(
    source: &[u8],
    file_path: &str,
    language: Option<Language>,
) -> Vec<Reference> {
    match language.or_else(|| Language::from_path(file_path)) {
        Some(Language::Python) => PythonParser::new().extract_references(source, file_path),
        Some(Language::C) => CParser::new().extract_references(source, file_path),
        None => Vec::new(),
    }
}

/// Parse a live buffer into symbols and references in one pass.
pub fn parse_buffer(
    content: &str,
    file_path: &str,
    language: Option<Language>,
) -> (Vec<Symbol>, Vec<Reference>) {
    let source = content.as_bytes();
    (
        extract_symbols(source, file_path, language),
        extract_references(source, file_path, language),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn language_detection() {
        assert_eq!(Language::from_path("app.py"), Some(Language::Python));
        assert_eq!(Language::from_path("src/main.c"), Some(Language::C));
        assert_eq!(Language::from_path("include/util.h"), Some(Language::C));
        assert_eq!(Language::from_path("README.md"), None);
        assert_eq!(Language::from_path("Makefile"), None);
    }

    #[test]
    fn explicit_language_overrides_extension() {
        let symbols = extract_symbols(b"x = 1\n", "buffer.txt", Some(Language::Python));
        assert!(symbols.iter().any(|s| s.name == "x"));
    }

    #[test]
    fn unknown_extension_extracts_nothing() {
        assert!(extract_symbols(b"x = 1\n", "notes.txt", None).is_empty());
        assert!(extract_references(b"foo(1)\n", "notes.txt", None).is_empty());
    }

    #[test]
    fn parse_buffer_returns_both_sides() {
        let (symbols, refs) = parse_buffer("def f():\n    return arr[12]\n", "demo.py", None);
        assert!(symbols.iter().any(|s| s.name == "f"));
        assert!(refs
            .iter()
            .any(|r| r.name == "arr" && r.index_value == Some(12)));
    }
}
