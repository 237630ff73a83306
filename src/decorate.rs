//! Decoration cache.
//!
//! A [`DecoratedNode`] wraps one raw node with derived predicates (collection,
//! map, enum, ...). Decorations are memoized by node identity for the lifetime of
//! one [`CompilationContext`](crate::context::CompilationContext); decorating the
//! same node twice hands back the same `Rc`.
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use indexmap::IndexSet;

use crate::context::CompilationContext;
use crate::graph::{DeclId, DeclKind, MemberId, RawNode, TypeGraph, TypeId, TypeKind};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecoratedNode {
    pub node: RawNode,
    /// Erasure of the node's type (the declaration itself for declarations).
    pub qualified_name: Option<String>,
    /// Erasures reachable through supertypes, the node's own included.
    supertypes: IndexSet<String>,
    pub is_collection: bool,
    pub is_map: bool,
    pub is_enum: bool,
    pub is_array: bool,
    pub is_primitive: bool,
    pub is_interface: bool,
    pub doc: Option<String>,
}

impl DecoratedNode {
    pub fn is_instance_of(&self, qualified_name: &str) -> bool {
        self.supertypes.contains(qualified_name)
    }

    pub fn supertypes(&self) -> impl Iterator<Item = &str> {
        self.supertypes.iter().map(String::as_str)
    }

    fn build(cx: &CompilationContext<'_>, node: RawNode) -> Self {
        let graph = cx.graph;
        let (ty, decl, doc) = match node {
            RawNode::Type(t) => (Some(t), erasure(graph, t), None),
            RawNode::Decl(d) => (None, Some(d), graph.declaration(d).doc.clone()),
            RawNode::Member(m) => {
                let member = graph.member(m);
                (Some(member.ty), erasure(graph, member.ty), member.doc.clone())
            }
        };
        let kind = ty.map(|t| graph.kind(t));
        let supertypes = decl.map(|d| erasure_closure(graph, d)).unwrap_or_default();
        let declared_kind = decl.map(|d| graph.declaration(d).kind);
        Self {
            node,
            qualified_name: decl.map(|d| graph.qualified_name_of(d).to_string()),
            is_collection: supertypes.iter().any(|s| cx.config.is_collection_type(s)),
            is_map: supertypes.iter().any(|s| cx.config.is_map_type(s)),
            is_enum: declared_kind == Some(DeclKind::Enum),
            is_interface: declared_kind == Some(DeclKind::Interface),
            is_array: matches!(kind, Some(TypeKind::Array(_))),
            is_primitive: matches!(kind, Some(TypeKind::Primitive(_))),
            supertypes,
            doc,
        }
    }
}

/// Declaration behind a type, looking through variable and wildcard bounds.
pub fn erasure(graph: &dyn TypeGraph, ty: TypeId) -> Option<DeclId> {
    match graph.kind(ty) {
        TypeKind::Declared { decl, .. } => Some(decl),
        TypeKind::Variable { bound: Some(b), .. } => erasure(graph, b),
        TypeKind::Wildcard { extends: Some(b), .. } => erasure(graph, b),
        _ => None,
    }
}

fn erasure_closure(graph: &dyn TypeGraph, decl: DeclId) -> IndexSet<String> {
    let mut seen = IndexSet::new();
    let mut queue = vec![decl];
    while let Some(d) = queue.pop() {
        if !seen.insert(graph.qualified_name_of(d).to_string()) {
            continue;
        }
        for st in graph.direct_supertypes(d) {
            if let Some(next) = graph.declared(st) {
                queue.push(next);
            }
        }
    }
    seen
}

// ————————————————————————————————————————————————————————————————————————————
// CACHE
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Default)]
pub struct DecorationCache {
    nodes: RefCell<HashMap<RawNode, Rc<DecoratedNode>>>,
}

impl DecorationCache {
    pub fn len(&self) -> usize {
        self.nodes.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.borrow().is_empty()
    }

    fn get_or_build(&self, cx: &CompilationContext<'_>, node: RawNode) -> Rc<DecoratedNode> {
        if let Some(hit) = self.nodes.borrow().get(&node) {
            return hit.clone();
        }
        let built = Rc::new(DecoratedNode::build(cx, node));
        self.nodes.borrow_mut().entry(node).or_insert(built).clone()
    }
}

/// Anything that can be decorated. Already-decorated nodes decorate to themselves,
/// `None` to `None`, and lists element-wise.
pub trait Decorate {
    type Output;
    fn decorate(self, cx: &CompilationContext<'_>) -> Self::Output;
}

impl Decorate for RawNode {
    type Output = Rc<DecoratedNode>;
    fn decorate(self, cx: &CompilationContext<'_>) -> Rc<DecoratedNode> {
        cx.decorations.get_or_build(cx, self)
    }
}

impl Decorate for TypeId {
    type Output = Rc<DecoratedNode>;
    fn decorate(self, cx: &CompilationContext<'_>) -> Rc<DecoratedNode> {
        RawNode::from(self).decorate(cx)
    }
}

impl Decorate for DeclId {
    type Output = Rc<DecoratedNode>;
    fn decorate(self, cx: &CompilationContext<'_>) -> Rc<DecoratedNode> {
        RawNode::from(self).decorate(cx)
    }
}

impl Decorate for MemberId {
    type Output = Rc<DecoratedNode>;
    fn decorate(self, cx: &CompilationContext<'_>) -> Rc<DecoratedNode> {
        RawNode::from(self).decorate(cx)
    }
}

impl Decorate for Rc<DecoratedNode> {
    type Output = Rc<DecoratedNode>;
    fn decorate(self, _cx: &CompilationContext<'_>) -> Rc<DecoratedNode> {
        self
    }
}

impl<N: Decorate> Decorate for Option<N> {
    type Output = Option<N::Output>;
    fn decorate(self, cx: &CompilationContext<'_>) -> Self::Output {
        self.map(|n| n.decorate(cx))
    }
}

impl<N: Decorate> Decorate for Vec<N> {
    type Output = Vec<N::Output>;
    fn decorate(self, cx: &CompilationContext<'_>) -> Self::Output {
        self.into_iter().map(|n| n.decorate(cx)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CompilerConfig;
    use crate::fixtures;

    #[test]
    fn decoration_is_idempotent_and_memoized() {
        let graph = fixtures::order_model();
        let cx = CompilationContext::new(&graph, CompilerConfig::default());
        let order = graph.find_declaration("com.acme.Order").unwrap();
        let first = cx.decorate(order);
        let again = cx.decorate(first.clone());
        assert!(Rc::ptr_eq(&first, &again));
        let third = cx.decorate(order);
        assert!(Rc::ptr_eq(&first, &third));
        assert_eq!(*first, *third);
        assert_eq!(cx.decorations.len(), 1);
        assert!(cx.decorate(None::<DeclId>).is_none());
    }

    #[test]
    fn predicates_follow_supertypes() {
        let graph = fixtures::order_model();
        let cx = CompilationContext::new(&graph, CompilerConfig::default());
        let order = graph.find_declaration("com.acme.Order").unwrap();
        let items = MemberId { owner: order, index: 0 };
        let d = cx.decorate(items);
        assert!(d.is_collection && !d.is_map && !d.is_array);
        assert!(d.is_instance_of("java.lang.Iterable"));
        assert_eq!(d.qualified_name.as_deref(), Some("java.util.List"));
        assert_eq!(d.doc.as_deref(), Some("The line items."));

        let linked = graph.find_declaration("java.util.LinkedHashMap").unwrap();
        let d = cx.decorate(linked);
        assert!(d.is_map && !d.is_collection);

        let nodes = cx.decorate(vec![RawNode::from(order), RawNode::from(linked)]);
        assert_eq!(nodes[0].qualified_name.as_deref(), Some("com.acme.Order"));
        assert_eq!(nodes[1].qualified_name.as_deref(), Some("java.util.LinkedHashMap"));
    }
}
