// Language parsers

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;
use tree_sitter::{Node, Parser as TreeParser, Tree};

use crate::index::{Param, Reference, Symbol, SymbolKind};

/// Matches `name[123]` — shared by the C declaration-line re-scan and the
/// whole-file subscript fallback.
static NAME_INDEX_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([A-Za-z_][A-Za-z0-9_]*)\s*\[\s*(\d+)\s*\]").unwrap());

/// Python parser using tree-sitter
pub struct PythonParser;

/// C parser using tree-sitter
pub struct CParser;

fn node_text(node: Node, source: &[u8]) -> String {
    String::from_utf8_lossy(&source[node.byte_range()])
        .trim()
        .to_string()
}

fn node_line(node: Node) -> u32 {
    node.start_position().row as u32 + 1
}

/// Parse an integer literal in any base the source languages allow
/// (decimal, 0x, 0o, 0b, optional sign, Python digit separators).
fn parse_int_literal(text: &str) -> Option<i64> {
    let cleaned = text.trim().replace('_', "");
    let mut digits = cleaned.as_str();
    let negative = match digits.strip_prefix('-') {
        Some(rest) => {
            digits = rest;
            true
        }
        None => {
            digits = digits.strip_prefix('+').unwrap_or(digits);
            false
        }
    };
    let value = if let Some(hex) = digits.strip_prefix("0x").or_else(|| digits.strip_prefix("0X")) {
        i64::from_str_radix(hex, 16).ok()?
    } else if let Some(oct) = digits.strip_prefix("0o").or_else(|| digits.strip_prefix("0O")) {
        i64::from_str_radix(oct, 8).ok()?
    } else if let Some(bin) = digits.strip_prefix("0b").or_else(|| digits.strip_prefix("0B")) {
        i64::from_str_radix(bin, 2).ok()?
    } else {
        digits.parse::<i64>().ok()?
    };
    Some(if negative { -value } else { value })
}

impl PythonParser {
    pub fn new() -> Self {
        Self
    }

    fn parse_tree(&self, source: &[u8]) -> Option<Tree> {
        let mut parser = TreeParser::new();
        parser
            .set_language(&tree_sitter_python::LANGUAGE.into())
            .ok()?;
        parser.parse(source, None)
    }

    pub fn extract_symbols(&self, source: &[u8], file_path: &str) -> Vec<Symbol> {
        let mut symbols = Vec::new();
        if let Some(tree) = self.parse_tree(source) {
            self.walk_symbols(tree.root_node(), source, file_path, "", &mut symbols);
        }
        symbols
    }

    fn walk_symbols(
        &self,
        node: Node,
        source: &[u8],
        file_path: &str,
        scope: &str,
        symbols: &mut Vec<Symbol>,
    ) {
        match node.kind() {
            "function_definition" => {
                if let Some(name_node) = node.child_by_field_name("name") {
                    let name = node_text(name_node, source);
                    symbols.push(self.extract_function(node, source, file_path, scope, &name));
                    let inner = extend_scope(scope, &name);
                    let mut cursor = node.walk();
                    for child in node.children(&mut cursor) {
                        self.walk_symbols(child, source, file_path, &inner, symbols);
                    }
                }
                return;
            }
            "class_definition" => {
                if let Some(name_node) = node.child_by_field_name("name") {
                    let name = node_text(name_node, source);
                    symbols.push(Symbol::new(
                        name.as_str(),
                        SymbolKind::Class,
                        file_path,
                        node_line(node),
                        scope,
                    ));
                    let inner = extend_scope(scope, &name);
                    let mut cursor = node.walk();
                    for child in node.children(&mut cursor) {
                        self.walk_symbols(child, source, file_path, &inner, symbols);
                    }
                }
                return;
            }
            "assignment" => {
                self.extract_assignment(node, source, file_path, scope, symbols);
            }
            _ => {}
        }
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            self.walk_symbols(child, source, file_path, scope, symbols);
        }
    }

    fn extract_function(
        &self,
        node: Node,
        source: &[u8],
        file_path: &str,
        scope: &str,
        name: &str,
    ) -> Symbol {
        let mut sym = Symbol::new(name, SymbolKind::Function, file_path, node_line(node), scope);

        if let Some(params_node) = node.child_by_field_name("parameters") {
            let mut cursor = params_node.walk();
            for child in params_node.children(&mut cursor) {
                match child.kind() {
                    "identifier" => {
                        let pname = node_text(child, source);
                        if pname != "self" {
                            sym.params.push(Param::new(pname, None, false));
                        }
                    }
                    "typed_parameter" => {
                        let ptype = child
                            .child_by_field_name("type")
                            .map(|n| node_text(n, source));
                        if let Some(pattern) = child.child(0) {
                            let pname = node_text(pattern, source);
                            if pattern.kind() != "identifier" {
                                sym.is_variadic = true;
                            }
                            sym.params.push(Param::new(pname, ptype, false));
                        }
                    }
                    "default_parameter" => {
                        if let Some(name_node) = child.child_by_field_name("name") {
                            sym.params
                                .push(Param::new(node_text(name_node, source), None, true));
                        }
                    }
                    "typed_default_parameter" => {
                        if let Some(name_node) = child.child_by_field_name("name") {
                            let ptype = child
                                .child_by_field_name("type")
                                .map(|n| node_text(n, source));
                            sym.params
                                .push(Param::new(node_text(name_node, source), ptype, true));
                        }
                    }
                    "list_splat_pattern" | "dictionary_splat_pattern" => {
                        // node text keeps the star prefix: "*args" / "**kwargs"
                        sym.is_variadic = true;
                        sym.params
                            .push(Param::new(node_text(child, source), None, false));
                    }
                    _ => {}
                }
            }
        }

        sym.return_type = node
            .child_by_field_name("return_type")
            .map(|n| node_text(n, source));
        sym.type_info = sym.return_type.clone();
        sym
    }

    fn extract_assignment(
        &self,
        node: Node,
        source: &[u8],
        file_path: &str,
        scope: &str,
        symbols: &mut Vec<Symbol>,
    ) {
        let Some(left) = node.child_by_field_name("left") else {
            return;
        };
        let annotation = node
            .child_by_field_name("type")
            .map(|n| node_text(n, source));
        let right = node.child_by_field_name("right");

        match left.kind() {
            "identifier" => {
                let name = node_text(left, source);
                if name.is_empty() || name.starts_with('_') {
                    return;
                }
                let mut sym =
                    Symbol::new(name, SymbolKind::Variable, file_path, node_line(node), scope);
                sym.type_info = annotation;
                if let Some(rhs) = right {
                    if rhs.kind() == "list" {
                        sym.kind = SymbolKind::Array;
                        sym.array_size = Some(count_list_elements(rhs));
                        if sym.type_info.is_none() {
                            sym.type_info = Some("list".to_string());
                        }
                    }
                }
                symbols.push(sym);
            }
            "pattern_list" | "tuple_pattern" | "list_pattern" => {
                let mut cursor = left.walk();
                for target in left.children(&mut cursor) {
                    if target.kind() == "identifier" {
                        let name = node_text(target, source);
                        if !name.is_empty() && !name.starts_with('_') {
                            symbols.push(Symbol::new(
                                name,
                                SymbolKind::Variable,
                                file_path,
                                node_line(node),
                                scope,
                            ));
                        }
                    }
                }
            }
            _ => {}
        }
    }

    pub fn extract_references(&self, source: &[u8], _file_path: &str) -> Vec<Reference> {
        let mut refs = Vec::new();
        if let Some(tree) = self.parse_tree(source) {
            self.walk_refs(tree.root_node(), source, &mut refs);
        }
        refs
    }

    fn walk_refs(&self, node: Node, source: &[u8], refs: &mut Vec<Reference>) {
        match node.kind() {
            "call" => {
                if let Some(function) = node.child_by_field_name("function") {
                    let name = node_text(function, source);
                    let arg_count = node
                        .child_by_field_name("arguments")
                        .map(|args| count_call_args(args))
                        .unwrap_or(0);
                    refs.push(Reference::call(name, node_line(node), arg_count));
                }
            }
            "subscript" => {
                if let (Some(value), Some(index)) = (
                    node.child_by_field_name("value"),
                    node.child_by_field_name("subscript"),
                ) {
                    let index_value = parse_int_literal(&node_text(index, source));
                    refs.push(Reference::array_access(
                        node_text(value, source),
                        node_line(node),
                        index_value,
                    ));
                }
            }
            "identifier" => {
                // Free reads only: skip call targets, def headers, parameter
                // lists, and attribute-access positions.
                let parent_kind = node.parent().map(|p| p.kind()).unwrap_or("");
                if !matches!(
                    parent_kind,
                    "call" | "function_definition" | "parameters" | "attribute"
                ) {
                    let name = node_text(node, source);
                    if !name.is_empty() && !name.starts_with('_') {
                        refs.push(Reference::read(name, node_line(node)));
                    }
                }
            }
            _ => {}
        }
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            self.walk_refs(child, source, refs);
        }
    }
}

impl CParser {
    pub fn new() -> Self {
        Self
    }

    fn parse_tree(&self, source: &[u8]) -> Option<Tree> {
        let mut parser = TreeParser::new();
        parser.set_language(&tree_sitter_c::LANGUAGE.into()).ok()?;
        parser.parse(source, None)
    }

    pub fn extract_symbols(&self, source: &[u8], file_path: &str) -> Vec<Symbol> {
        let mut symbols = Vec::new();
        if let Some(tree) = self.parse_tree(source) {
            self.walk_symbols(tree.root_node(), source, file_path, &mut symbols);
        }
        self.recover_array_sizes(source, &mut symbols);
        symbols
    }

    fn walk_symbols(&self, node: Node, source: &[u8], file_path: &str, symbols: &mut Vec<Symbol>) {
        match node.kind() {
            "function_definition" => {
                if let Some(sym) = self.extract_function(node, source, file_path) {
                    symbols.push(sym);
                }
            }
            "declaration" => {
                self.extract_declaration(node, source, file_path, symbols);
            }
            "struct_specifier" => {
                if let Some(name_node) = node.child_by_field_name("name") {
                    let mut sym = Symbol::new(
                        node_text(name_node, source),
                        SymbolKind::Struct,
                        file_path,
                        node_line(node),
                        "",
                    );
                    sym.type_info = Some("struct".to_string());
                    symbols.push(sym);
                }
            }
            _ => {}
        }
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            self.walk_symbols(child, source, file_path, symbols);
        }
    }

    /// Compose a type string from specifier tokens plus a trailing `*`
    /// marker when a pointer declarator is present.
    fn compose_type(&self, node: Node, source: &[u8]) -> String {
        let mut parts = Vec::new();
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            match child.kind() {
                "primitive_type" | "sized_type_specifier" | "type_identifier"
                | "struct_specifier" => {
                    parts.push(node_text(child, source));
                }
                "pointer_declarator" if child.child_count() > 0 => {
                    parts.push("*".to_string());
                }
                _ => {}
            }
        }
        if parts.is_empty() {
            "int".to_string()
        } else {
            parts.join(" ")
        }
    }

    fn extract_function(&self, node: Node, source: &[u8], file_path: &str) -> Option<Symbol> {
        let declarator = node.child_by_field_name("declarator")?;
        if declarator.kind() != "function_declarator" {
            return None;
        }
        let id_node = declarator.child_by_field_name("declarator")?;
        if id_node.kind() != "identifier" {
            return None;
        }

        let mut sym = Symbol::new(
            node_text(id_node, source),
            SymbolKind::Function,
            file_path,
            node_line(node),
            "",
        );
        sym.type_info = Some(self.compose_type(node, source));

        if let Some(params_node) = declarator.child_by_field_name("parameters") {
            let mut cursor = params_node.walk();
            for child in params_node.children(&mut cursor) {
                match child.kind() {
                    "parameter_declaration" => {
                        if let Some(pdecl) = child.child_by_field_name("declarator") {
                            if pdecl.kind() == "identifier" {
                                sym.params.push(Param::new(
                                    node_text(pdecl, source),
                                    Some(self.compose_type(child, source)),
                                    false,
                                ));
                            }
                        }
                    }
                    "variadic_parameter" => {
                        sym.is_variadic = true;
                    }
                    _ => {}
                }
            }
        }
        Some(sym)
    }

    fn extract_declaration(
        &self,
        node: Node,
        source: &[u8],
        file_path: &str,
        symbols: &mut Vec<Symbol>,
    ) {
        let type_str = self.compose_type(node, source);
        let mut cursor = node.walk();
        for declarator in node.children_by_field_name("declarator", &mut cursor) {
            let inner = if declarator.kind() == "init_declarator" {
                declarator
                    .child_by_field_name("declarator")
                    .unwrap_or(declarator)
            } else {
                declarator
            };
            let size = self.array_size_from_declarator(inner, source);
            if let Some(name) = identifier_from_declarator(inner, source) {
                let mut sym = Symbol::new(
                    name,
                    if size.is_some() {
                        SymbolKind::Array
                    } else {
                        SymbolKind::Variable
                    },
                    file_path,
                    node_line(node),
                    "",
                );
                sym.type_info = Some(type_str.clone());
                sym.array_size = size;
                symbols.push(sym);
            }
        }
    }

    fn array_size_from_declarator(&self, node: Node, source: &[u8]) -> Option<usize> {
        if node.kind() == "array_declarator" {
            if let Some(size_node) = node.child_by_field_name("size") {
                if let Some(value) = parse_int_literal(&node_text(size_node, source)) {
                    return usize::try_from(value).ok();
                }
            }
            let mut cursor = node.walk();
            for child in node.children(&mut cursor) {
                if child.kind() == "number_literal" {
                    let value = parse_int_literal(&node_text(child, source))?;
                    return usize::try_from(value).ok();
                }
            }
            return None;
        }
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            if child.kind() == "array_declarator" {
                return self.array_size_from_declarator(child, source);
            }
        }
        None
    }

    /// Best-effort recovery for sizes the grammar missed: re-scan each
    /// symbol's declaration line for `name[<digits>]`.
    fn recover_array_sizes(&self, source: &[u8], symbols: &mut [Symbol]) {
        let text = String::from_utf8_lossy(source);
        let lines: Vec<&str> = text.lines().collect();
        for sym in symbols.iter_mut() {
            if sym.array_size.is_some() {
                continue;
            }
            let idx = sym.line.saturating_sub(1) as usize;
            let Some(line) = lines.get(idx) else {
                continue;
            };
            for caps in NAME_INDEX_RE.captures_iter(line) {
                if &caps[1] == sym.name.as_str() {
                    if let Ok(size) = caps[2].parse::<usize>() {
                        sym.array_size = Some(size);
                        sym.kind = SymbolKind::Array;
                    }
                    break;
                }
            }
        }
    }

    pub fn extract_references(&self, source: &[u8], _file_path: &str) -> Vec<Reference> {
        let mut refs = Vec::new();
        if let Some(tree) = self.parse_tree(source) {
            self.walk_refs(tree.root_node(), source, &mut refs);
        }

        // The grammar misses some subscript forms; always re-scan the raw
        // bytes for identifier[<digits>]. Duplicate sites are fine, the
        // aggregator dedups diagnostics.
        let text = String::from_utf8_lossy(source);
        let before = refs.len();
        for caps in NAME_INDEX_RE.captures_iter(&text) {
            let Some(whole) = caps.get(0) else { continue };
            let line = text[..whole.start()].matches('\n').count() as u32 + 1;
            refs.push(Reference::array_access(
                caps[1].to_string(),
                line,
                caps[2].parse::<i64>().ok(),
            ));
        }
        if refs.len() > before {
            debug!(
                "C subscript fallback added {} array access reference(s)",
                refs.len() - before
            );
        }
        refs
    }

    fn walk_refs(&self, node: Node, source: &[u8], refs: &mut Vec<Reference>) {
        match node.kind() {
            "call_expression" => {
                if let Some(function) = node.child_by_field_name("function") {
                    if function.kind() == "identifier" {
                        let arg_count = node
                            .child_by_field_name("arguments")
                            .map(|args| count_call_args(args))
                            .unwrap_or(0);
                        refs.push(Reference::call(
                            node_text(function, source),
                            node_line(node),
                            arg_count,
                        ));
                    }
                }
            }
            "subscript_expression" => {
                let mut base = node.child_by_field_name("argument");
                let mut index = node.child_by_field_name("index");
                // Positional fallback (base, '[', index, ']') for grammar
                // versions without named fields.
                if (base.is_none() || index.is_none()) && node.child_count() >= 4 {
                    base = node.child(0);
                    index = node.child(2);
                }
                if let (Some(base), Some(index)) = (base, index) {
                    let index_value = parse_int_literal(&node_text(index, source));
                    refs.push(Reference::array_access(
                        node_text(base, source),
                        node_line(node),
                        index_value,
                    ));
                }
            }
            _ => {}
        }
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            self.walk_refs(child, source, refs);
        }
    }
}

fn extend_scope(scope: &str, name: &str) -> String {
    if scope.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", scope, name)
    }
}

fn count_list_elements(list_node: Node) -> usize {
    let mut cursor = list_node.walk();
    list_node
        .children(&mut cursor)
        .filter(|c| !matches!(c.kind(), "[" | "]" | ","))
        .count()
}

fn count_call_args(args_node: Node) -> usize {
    let mut cursor = args_node.walk();
    args_node
        .children(&mut cursor)
        .filter(|c| !matches!(c.kind(), "(" | ")" | ","))
        .count()
}

fn identifier_from_declarator(node: Node, source: &[u8]) -> Option<String> {
    if node.kind() == "identifier" {
        return Some(node_text(node, source));
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if child.kind() == "identifier" {
            return Some(node_text(child, source));
        }
        if let Some(found) = identifier_from_declarator(child, source) {
            return Some(found);
        }
    }
    None
}
