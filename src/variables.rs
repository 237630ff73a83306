//! Type-variable resolution over a persistent stack of generic frames.
//!
//! A frame pairs the type parameters of one generic declaration with the concrete
//! arguments it was instantiated with. Frames pushed by
//! [`TypeVariableContext::push_declaration`] never disturb the receiver, so nested
//! generic contexts (a transient superclass of a generic class, a generic supertype
//! chain) can branch freely.
use crate::graph::{DeclId, TypeGraph, TypeId, TypeKind};
use crate::stack::PersistentStack;

#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub owner: DeclId,
    pub params: Vec<String>,
    pub args: Vec<TypeId>,
}

#[derive(Debug, Clone, Default)]
pub struct TypeVariableContext {
    frames: PersistentStack<Frame>,
}

impl TypeVariableContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Frame binding `decl`'s own parameters to `args`.
    pub fn push_declaration(
        &self,
        graph: &dyn TypeGraph,
        decl: DeclId,
        args: Vec<TypeId>,
    ) -> Self {
        let params = graph
            .declaration(decl)
            .type_parameters
            .iter()
            .map(|p| p.name.clone())
            .collect();
        Self { frames: self.frames.push(Frame { owner: decl, params, args }) }
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    fn parent(&self) -> Option<Self> {
        self.frames.parent().map(|frames| Self { frames })
    }

    /// Substitute a type variable.
    ///
    /// The innermost frame pushed for the variable's declaring type binds it, and
    /// the bound argument is resolved against the frames below that one. Unbound
    /// variables and arity mismatches fall back to the erasure of the variable's
    /// bound; a variable with no bound at all comes back unchanged.
    pub fn resolve(&self, graph: &dyn TypeGraph, var: TypeId) -> TypeId {
        let TypeKind::Variable { name, owner, bound } = graph.kind(var) else {
            return self.resolve_type(graph, var);
        };
        let fallback = || bound.map(|b| erase(graph, b)).unwrap_or(var);
        let mut scope = self.clone();
        loop {
            let Some(frame) = scope.frames.peek() else {
                return fallback();
            };
            if frame.owner == owner {
                if frame.params.len() != frame.args.len() {
                    return fallback();
                }
                let Some(index) = frame.params.iter().position(|p| *p == name) else {
                    return fallback();
                };
                let arg = frame.args[index];
                // arguments are written in terms of the enclosing frames
                let enclosing = scope.parent().unwrap_or_default();
                return enclosing.resolve_type(graph, arg);
            }
            match scope.parent() {
                Some(parent) => scope = parent,
                None => return fallback(),
            }
        }
    }

    /// Substitute every variable inside `ty`.
    pub fn resolve_type(&self, graph: &dyn TypeGraph, ty: TypeId) -> TypeId {
        match graph.kind(ty) {
            TypeKind::Primitive(_) | TypeKind::Void => ty,
            TypeKind::Variable { .. } => self.resolve(graph, ty),
            TypeKind::Array(component) => {
                let resolved = self.resolve_type(graph, component);
                if resolved == component {
                    ty
                } else {
                    graph.intern(TypeKind::Array(resolved))
                }
            }
            TypeKind::Declared { decl, args } => {
                let resolved: Vec<TypeId> =
                    args.iter().map(|a| self.resolve_type(graph, *a)).collect();
                if resolved == args {
                    ty
                } else {
                    graph.intern(TypeKind::Declared { decl, args: resolved })
                }
            }
            TypeKind::Wildcard { extends, super_ } => {
                let e = extends.map(|b| self.resolve_type(graph, b));
                let s = super_.map(|b| self.resolve_type(graph, b));
                if e == extends && s == super_ {
                    ty
                } else {
                    graph.intern(TypeKind::Wildcard { extends: e, super_: s })
                }
            }
        }
    }

    /// Direct supertypes of a parameterized type, with the declaration's own
    /// parameters bound to `ty`'s arguments.
    pub fn substituted_supertypes(&self, graph: &dyn TypeGraph, ty: TypeId) -> Vec<TypeId> {
        let ty = self.resolve_type(graph, ty);
        let TypeKind::Declared { decl, args } = graph.kind(ty) else {
            return Vec::new();
        };
        let inner = self.push_declaration(graph, decl, args);
        graph
            .direct_supertypes(decl)
            .into_iter()
            .map(|st| inner.resolve_type(graph, st))
            .collect()
    }

    /// The parameterization of the first supertype of `ty` (itself included) whose
    /// erasure is one of `erasures`, breadth first.
    pub fn find_supertype(
        &self,
        graph: &dyn TypeGraph,
        ty: TypeId,
        erasures: &[String],
    ) -> Option<TypeId> {
        let mut queue = std::collections::VecDeque::from([self.resolve_type(graph, ty)]);
        let mut seen = std::collections::HashSet::new();
        while let Some(t) = queue.pop_front() {
            if !seen.insert(t) {
                continue;
            }
            let Some(decl) = graph.declared(t) else { continue };
            if erasures.iter().any(|e| e == graph.qualified_name_of(decl)) {
                return Some(t);
            }
            queue.extend(TypeVariableContext::new().substituted_supertypes(graph, t));
        }
        None
    }
}

/// Raw form of a declared type; other shapes are left alone.
fn erase(graph: &dyn TypeGraph, ty: TypeId) -> TypeId {
    match graph.kind(ty) {
        TypeKind::Declared { decl, args } if !args.is_empty() => {
            graph.intern(TypeKind::Declared { decl, args: Vec::new() })
        }
        TypeKind::Variable { bound: Some(b), .. } => erase(graph, b),
        _ => ty,
    }
}
