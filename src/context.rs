//! Round-scoped compilation context.
//!
//! Everything a round memoizes (decorations, package adapter tables) lives here
//! and dies with the context, so independent compilations never share state.
use crate::adapters::PackageAdapterCache;
use crate::config::CompilerConfig;
use crate::decorate::{Decorate, DecorationCache};
use crate::graph::{DeclId, TypeGraph, TypeId, TypeKind};
use crate::ir::known::KNOWN_TYPES;
use crate::ir::QName;

pub struct CompilationContext<'g> {
    pub graph: &'g dyn TypeGraph,
    pub config: CompilerConfig,
    pub decorations: DecorationCache,
    pub package_adapters: PackageAdapterCache,
}

impl<'g> CompilationContext<'g> {
    pub fn new(graph: &'g dyn TypeGraph, config: CompilerConfig) -> Self {
        Self {
            graph,
            config,
            decorations: DecorationCache::default(),
            package_adapters: PackageAdapterCache::default(),
        }
    }

    pub fn decorate<N: Decorate>(&self, node: N) -> N::Output {
        node.decorate(self)
    }

    /// Configured mappings first, then the built-in table.
    pub fn known_type(&self, qualified_name: &str) -> Option<QName> {
        self.config
            .known_types
            .get(qualified_name)
            .or_else(|| KNOWN_TYPES.get(qualified_name))
            .cloned()
    }

    pub fn is_object_type(&self, decl: DeclId) -> bool {
        self.graph.qualified_name_of(decl) == self.config.object_type
    }

    /// The raw (unparameterized) type of a declaration.
    pub fn raw_type(&self, decl: DeclId) -> TypeId {
        self.graph.intern(TypeKind::Declared { decl, args: Vec::new() })
    }

    pub fn qualified_name(&self, decl: DeclId) -> String {
        self.graph.qualified_name_of(decl).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::model::ModelGraph;
    use crate::ir::XSD_NAMESPACE;

    #[test]
    fn configured_known_types_shadow_the_builtin_table() {
        let graph = ModelGraph::platform().unwrap();
        let mut config = CompilerConfig::default();
        config.known_types.insert(
            "java.lang.String".into(),
            QName { name: "token".into(), namespace: XSD_NAMESPACE.into() },
        );
        let cx = CompilationContext::new(&graph, config);
        assert_eq!(cx.known_type("java.lang.String").unwrap().name, "token");
        assert_eq!(cx.known_type("java.math.BigDecimal").unwrap().name, "decimal");
        assert!(cx.known_type("java.util.List").is_none());
        let object = graph.find_declaration("java.lang.Object").unwrap();
        assert!(cx.is_object_type(object));
    }

    #[test]
    fn rounds_do_not_share_caches() {
        let graph = ModelGraph::platform().unwrap();
        let object = graph.find_declaration("java.lang.Object").unwrap();
        let first = CompilationContext::new(&graph, CompilerConfig::default());
        first.decorate(object);
        let second = CompilationContext::new(&graph, CompilerConfig::default());
        assert_eq!(first.decorations.len(), 1);
        assert!(second.decorations.is_empty());
    }
}
