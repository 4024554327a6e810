// Symbol index: core data model and storage

pub mod overlay;
pub mod store;

use std::fmt;

/// A declared name extracted from source (variable, function, array, class, struct)
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Symbol {
    pub name: String,
    pub kind: SymbolKind,
    #[serde(rename = "type")]
    pub type_info: Option<String>,
    pub file_path: String,
    pub line: u32,
    pub scope: String,
    pub array_size: Option<usize>,
    pub params: Vec<Param>,
    pub return_type: Option<String>,
    pub is_variadic: bool,
}

impl Symbol {
    pub fn new(name: impl Into<String>, kind: SymbolKind, file_path: &str, line: u32, scope: &str) -> Self {
        Self {
            name: name.into(),
            kind,
            type_info: None,
            file_path: file_path.to_string(),
            line,
            scope: scope.to_string(),
            array_size: None,
            params: Vec::new(),
            return_type: None,
            is_variadic: false,
        }
    }

    /// The type label checkers compare against: explicit type, else the kind name
    pub fn type_label(&self) -> String {
        self.type_info
            .clone()
            .unwrap_or_else(|| self.kind.to_string())
    }
}

/// Symbol kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SymbolKind {
    Variable,
    Function,
    Array,
    Class,
    Struct,
}

impl fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SymbolKind::Variable => "variable",
            SymbolKind::Function => "function",
            SymbolKind::Array => "array",
            SymbolKind::Class => "class",
            SymbolKind::Struct => "struct",
        };
        f.write_str(s)
    }
}

/// A function parameter in declaration order
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Param {
    pub name: String,
    #[serde(rename = "type")]
    pub type_info: Option<String>,
    pub has_default: bool,
}

impl Param {
    pub fn new(name: impl Into<String>, type_info: Option<String>, has_default: bool) -> Self {
        Self {
            name: name.into(),
            type_info,
            has_default,
        }
    }
}

/// A use-site occurrence of a name
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Reference {
    pub name: String,
    pub kind: RefKind,
    pub inferred_type: Option<String>,
    pub line: u32,
    /// Literal subscript value, only for array accesses with an integer literal index
    pub index_value: Option<i64>,
    /// Positional argument count, only for calls
    pub arg_count: Option<usize>,
}

impl Reference {
    pub fn call(name: impl Into<String>, line: u32, arg_count: usize) -> Self {
        Self {
            name: name.into(),
            kind: RefKind::Call,
            inferred_type: None,
            line,
            index_value: None,
            arg_count: Some(arg_count),
        }
    }

    pub fn read(name: impl Into<String>, line: u32) -> Self {
        Self {
            name: name.into(),
            kind: RefKind::Read,
            inferred_type: None,
            line,
            index_value: None,
            arg_count: None,
        }
    }

    pub fn array_access(name: impl Into<String>, line: u32, index_value: Option<i64>) -> Self {
        Self {
            name: name.into(),
            kind: RefKind::ArrayAccess,
            inferred_type: None,
            line,
            index_value,
            arg_count: None,
        }
    }
}

/// Reference kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefKind {
    Call,
    Read,
    ArrayAccess,
}

/// A reported finding
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Diagnostic {
    pub file: String,
    pub line: u32,
    pub severity: Severity,
    pub code: String,
    pub message: String,
}

impl Diagnostic {
    pub fn new(
        file: &str,
        line: u32,
        severity: Severity,
        code: &str,
        message: impl Into<String>,
    ) -> Self {
        Self {
            file: file.to_string(),
            line,
            severity,
            code: code.to_string(),
            message: message.into(),
        }
    }
}

/// Diagnostic severities
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => f.write_str("ERROR"),
            Severity::Warning => f.write_str("WARNING"),
        }
    }
}
