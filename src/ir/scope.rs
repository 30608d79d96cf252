//! Scope and binding graph produced by scope resolution
//!
//! A [`Resolution`] is an arena of [`ScopeRecord`]s and [`BindingRecord`]s linked by
//! integer ids, plus the mapping from identifier nodes of an
//! [`Index`](super::index::Index) to the binding they declare or read.
//!
//! Every `Identifier` record in the index falls into exactly one bucket:
//! - a property-name position (member property, object or class key), never resolved
//! - [`Resolution::binding_for_node`] returns its binding
//! - [`Resolution::is_unresolved`] is true (a free or global reference)

use indexmap::IndexMap;
use rustc_hash::{FxHashMap, FxHashSet};

use super::index::NodeId;

pub type ScopeId = usize;
pub type BindingId = usize;

/// Kind of construct that introduced a scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScopeKind {
    Global,
    Function,
    Block,
    Catch,
    For,
}

impl ScopeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScopeKind::Global => "global",
            ScopeKind::Function => "function",
            ScopeKind::Block => "block",
            ScopeKind::Catch => "catch",
            ScopeKind::For => "for",
        }
    }

    /// `var` and function declarations hoist to the nearest scope of these kinds.
    pub fn is_hoist_target(&self) -> bool {
        matches!(self, ScopeKind::Global | ScopeKind::Function)
    }
}

/// How a name was declared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BindingKind {
    Var,
    Let,
    Const,
    Function,
    Class,
    Parameter,
    CatchParameter,
}

impl BindingKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BindingKind::Var => "var",
            BindingKind::Let => "let",
            BindingKind::Const => "const",
            BindingKind::Function => "function",
            BindingKind::Class => "class",
            BindingKind::Parameter => "parameter",
            BindingKind::CatchParameter => "catch-parameter",
        }
    }

    /// Bindings that attach to the nearest function-or-global scope.
    pub fn is_hoisted(&self) -> bool {
        matches!(self, BindingKind::Var | BindingKind::Function)
    }
}

/// One lexical scope.
#[derive(Debug, Clone, PartialEq)]
pub struct ScopeRecord {
    pub id: ScopeId,
    /// `None` for the global scope.
    pub parent_id: Option<ScopeId>,
    pub kind: ScopeKind,
    /// 1-based half-open span of the construct owning the scope.
    pub start: u32,
    pub end: u32,
    /// Names declared here, in declaration order. One record per name.
    pub bindings: IndexMap<String, BindingId>,
    pub children: Vec<ScopeId>,
}

impl ScopeRecord {
    pub fn contains(&self, offset: u32) -> bool {
        self.start <= offset && offset < self.end
    }
}

/// One declared name.
#[derive(Debug, Clone, PartialEq)]
pub struct BindingRecord {
    pub id: BindingId,
    pub name: String,
    pub kind: BindingKind,
    /// Identifier node at the (latest winning) declaration site.
    pub decl_node_id: NodeId,
    /// Owning scope; differs from the textual scope for hoisted declarations.
    pub scope_id: ScopeId,
    /// Identifier nodes reading the name, in source order. Declarations excluded.
    pub references: Vec<NodeId>,
}

impl BindingRecord {
    /// Declaration node followed by every reference.
    pub fn all_usages(&self) -> Vec<NodeId> {
        let mut usages = Vec::with_capacity(self.references.len() + 1);
        usages.push(self.decl_node_id);
        usages.extend_from_slice(&self.references);
        usages
    }
}

/// Output of scope analysis over one program.
#[derive(Debug, Clone, Default)]
pub struct Resolution {
    pub scopes: Vec<ScopeRecord>,
    pub bindings: Vec<BindingRecord>,
    pub root_scope_id: ScopeId,
    /// Identifier node (declaration or reference) to its binding.
    pub node_binding: FxHashMap<NodeId, BindingId>,
    /// Identifier nodes that matched no binding, in source order.
    pub unresolved: Vec<NodeId>,
    /// Every identifier node registered as a declaration site.
    pub(crate) declarations: FxHashSet<NodeId>,
}

impl Resolution {
    pub fn scope(&self, id: ScopeId) -> Option<&ScopeRecord> {
        self.scopes.get(id)
    }

    pub fn binding(&self, id: BindingId) -> Option<&BindingRecord> {
        self.bindings.get(id)
    }

    pub fn global_scope(&self) -> Option<&ScopeRecord> {
        self.scope(self.root_scope_id)
    }

    pub fn binding_for_node(&self, node: NodeId) -> Option<&BindingRecord> {
        self.node_binding.get(&node).and_then(|b| self.binding(*b))
    }

    /// True if `node` is a declaration site (including redeclarations).
    pub fn is_declaration(&self, node: NodeId) -> bool {
        self.declarations.contains(&node)
    }

    pub fn is_reference(&self, node: NodeId) -> bool {
        self.node_binding.contains_key(&node) && !self.declarations.contains(&node)
    }

    pub fn is_unresolved(&self, node: NodeId) -> bool {
        self.unresolved.contains(&node)
    }

    /// Finds `name` starting at `scope` and walking outward to the global scope.
    pub fn lookup(&self, scope: ScopeId, name: &str) -> Option<&BindingRecord> {
        let mut current = self.scope(scope);
        while let Some(record) = current {
            if let Some(binding) = record.bindings.get(name) {
                return self.binding(*binding);
            }
            current = record.parent_id.and_then(|p| self.scope(p));
        }
        None
    }

    /// Innermost scope whose span contains `offset`; the global scope otherwise.
    pub fn scope_at_offset(&self, offset: u32) -> Option<&ScopeRecord> {
        let mut current = self.global_scope()?;
        'descend: loop {
            for child in &current.children {
                if let Some(scope) = self.scope(*child) {
                    if scope.contains(offset) {
                        current = scope;
                        continue 'descend;
                    }
                }
            }
            return Some(current);
        }
    }

    /// Bindings of the global scope in declaration order.
    pub fn global_bindings(&self) -> impl Iterator<Item = &BindingRecord> {
        self.global_scope()
            .into_iter()
            .flat_map(|scope| scope.bindings.values())
            .filter_map(|id| self.binding(*id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scope(id: ScopeId, parent: Option<ScopeId>, kind: ScopeKind, start: u32, end: u32) -> ScopeRecord {
        ScopeRecord { id, parent_id: parent, kind, start, end, bindings: IndexMap::new(), children: Vec::new() }
    }

    fn sample() -> Resolution {
        let mut global = scope(0, None, ScopeKind::Global, 1, 50);
        let mut func = scope(1, Some(0), ScopeKind::Function, 10, 40);
        let block = scope(2, Some(1), ScopeKind::Block, 20, 30);
        global.children.push(1);
        func.children.push(2);
        global.bindings.insert("x".to_string(), 0);
        func.bindings.insert("y".to_string(), 1);

        let mut resolution = Resolution {
            scopes: vec![global, func, block],
            bindings: vec![
                BindingRecord {
                    id: 0,
                    name: "x".into(),
                    kind: BindingKind::Var,
                    decl_node_id: 3,
                    scope_id: 0,
                    references: vec![7, 9],
                },
                BindingRecord {
                    id: 1,
                    name: "y".into(),
                    kind: BindingKind::Parameter,
                    decl_node_id: 5,
                    scope_id: 1,
                    references: vec![],
                },
            ],
            ..Default::default()
        };
        for (node, binding) in [(3, 0), (7, 0), (9, 0), (5, 1)] {
            resolution.node_binding.insert(node, binding);
        }
        resolution.declarations.extend([3, 5]);
        resolution.unresolved.push(11);
        resolution
    }

    #[test]
    fn test_all_usages_puts_declaration_first() {
        let resolution = sample();
        let usages = resolution.binding(0).unwrap().all_usages();
        assert_eq!(usages, vec![3, 7, 9]);
        assert_eq!(resolution.binding(1).unwrap().all_usages(), vec![5]);
    }

    #[test]
    fn test_node_classification() {
        let resolution = sample();
        assert!(resolution.is_declaration(3));
        assert!(!resolution.is_reference(3));
        assert!(resolution.is_reference(7));
        assert!(resolution.is_unresolved(11));
        assert!(resolution.binding_for_node(11).is_none());
    }

    #[test]
    fn test_lookup_walks_outward() {
        let resolution = sample();
        assert_eq!(resolution.lookup(2, "x").map(|b| b.id), Some(0));
        assert_eq!(resolution.lookup(2, "y").map(|b| b.id), Some(1));
        assert!(resolution.lookup(0, "y").is_none());
    }

    #[test]
    fn test_scope_at_offset_finds_innermost() {
        let resolution = sample();
        assert_eq!(resolution.scope_at_offset(25).map(|s| s.id), Some(2));
        assert_eq!(resolution.scope_at_offset(12).map(|s| s.id), Some(1));
        assert_eq!(resolution.scope_at_offset(45).map(|s| s.id), Some(0));
    }
}
