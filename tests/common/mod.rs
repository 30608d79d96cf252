#![allow(dead_code)]

use jsinsight::ir::index::{Index, NodeId, build_index};
use jsinsight::ir::js_node::NodeKind;
use jsinsight::ir::scope::Resolution;
use jsinsight::ir::transforms::scope_resolver::resolve;
use jsinsight::parsers::javascript::parse_program;

/// Parses, indexes and resolves `source`, returning the index with its resolution
/// attached.
pub fn analyze(source: &str) -> Index {
    let parsed = parse_program(source).expect("parser setup");
    let mut index = build_index(&parsed.program, source);
    let resolution = resolve(&parsed.program, &index);
    index.attach_resolution(resolution);
    index
}

pub fn resolution(index: &Index) -> &Resolution {
    index.resolution().expect("resolution attached")
}

/// Identifier records named `name`, in source order.
pub fn idents(index: &Index, name: &str) -> Vec<NodeId> {
    let mut ids: Vec<&jsinsight::ir::index::NodeRecord> = index
        .iter()
        .filter(|n| n.kind == NodeKind::Identifier && n.name.as_deref() == Some(name))
        .collect();
    ids.sort_by_key(|n| n.start);
    ids.into_iter().map(|n| n.id).collect()
}
