// Repository graph projection

use std::collections::{HashMap, HashSet};

use crate::index::Symbol;

/// A node in the repository graph (one per distinct declaration site)
#[derive(Debug, Clone, serde::Serialize)]
pub struct GraphNode {
    pub id: String,
    pub label: String,
    pub kind: String,
    #[serde(rename = "type")]
    pub type_info: Option<String>,
    pub file_path: String,
    pub line: u32,
}

/// An edge between symbols sharing a name across the table
#[derive(Debug, Clone, serde::Serialize)]
pub struct GraphEdge {
    pub source: String,
    pub target: String,
    #[serde(rename = "type")]
    pub edge_type: String,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct Graph {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

/// Read-only projection of the symbol table: node id is
/// `file_path:line:name`, and every pair of same-named nodes gets a
/// REFERENCES edge.
pub fn build_graph(symbols: &[Symbol]) -> Graph {
    let mut nodes: Vec<GraphNode> = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();

    for sym in symbols {
        let id = format!("{}:{}:{}", sym.file_path, sym.line, sym.name);
        if !seen.insert(id.clone()) {
            continue;
        }
        nodes.push(GraphNode {
            id,
            label: sym.name.clone(),
            kind: sym.kind.to_string(),
            type_info: sym.type_info.clone(),
            file_path: sym.file_path.clone(),
            line: sym.line,
        });
    }

    // Group node ids by label in first-seen order
    let mut order: Vec<&str> = Vec::new();
    let mut by_name: HashMap<&str, Vec<&str>> = HashMap::new();
    for node in &nodes {
        let entry = by_name.entry(node.label.as_str()).or_default();
        if entry.is_empty() {
            order.push(node.label.as_str());
        }
        entry.push(node.id.as_str());
    }

    let mut edges = Vec::new();
    for name in order {
        let ids = &by_name[name];
        if ids.len() < 2 {
            continue;
        }
        for (i, a) in ids.iter().enumerate() {
            for b in &ids[i + 1..] {
                edges.push(GraphEdge {
                    source: a.to_string(),
                    target: b.to_string(),
                    edge_type: "REFERENCES".to_string(),
                });
            }
        }
    }

    Graph { nodes, edges }
}
