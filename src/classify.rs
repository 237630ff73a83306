//! Schema-type classification.
//!
//! Total over type shapes: every input produces a [`SchemaType`] or a
//! [`ClassificationError`]. Precedence for declared types is adapter, collection,
//! map, known atomic, then a registered definition. `Any` only comes out of raw
//! collections and maps, unbounded variables and wildcards, and the object type.
use tracing::trace;

use crate::adapters::{find_adapter, item_type, AdapterTarget, AdapterType};
use crate::context::CompilationContext;
use crate::error::ClassificationError;
use crate::graph::{DeclId, DeclKind, PrimitiveKind, TypeId, TypeKind};
use crate::ir::known;
use crate::ir::{DefinitionRef, SchemaType};
use crate::variables::TypeVariableContext;

/// Where class and enum references are looked up. A discovering lookup registers
/// what it is asked about; a read-only one only answers for what is already there.
pub trait DefinitionLookup {
    fn definition_for(
        &mut self,
        cx: &CompilationContext<'_>,
        decl: DeclId,
    ) -> Result<Option<DefinitionRef>, ClassificationError>;
}

pub struct Classifier<'c, 'g> {
    cx: &'c CompilationContext<'g>,
    variables: TypeVariableContext,
    lookup: &'c mut dyn DefinitionLookup,
}

impl<'c, 'g> Classifier<'c, 'g> {
    pub fn new(cx: &'c CompilationContext<'g>, lookup: &'c mut dyn DefinitionLookup) -> Self {
        Self { cx, variables: TypeVariableContext::new(), lookup }
    }

    pub fn with_variables(mut self, variables: TypeVariableContext) -> Self {
        self.variables = variables;
        self
    }

    pub fn classify(&mut self, ty: TypeId) -> Result<SchemaType, ClassificationError> {
        self.visit(ty, 0)
    }

    /// Classify an accessor type given the adapter resolved for the accessor. An
    /// adapter that applies to the items of an array or collection adapts each item.
    pub fn classify_accessor(
        &mut self,
        ty: TypeId,
        adapter: Option<&AdapterType>,
    ) -> Result<SchemaType, ClassificationError> {
        let Some(adapter) = adapter else {
            return self.visit(ty, 0);
        };
        let item = item_type(self.cx, ty);
        if item != ty && adapter.can_adapt(self.cx, item) {
            let adapted = self.visit_adapted(adapter, 0).map_err(|e| e.within("collection item"))?;
            return Ok(SchemaType::collection(adapted));
        }
        self.visit_adapted(adapter, 0)
    }

    fn visit(&mut self, ty: TypeId, depth: usize) -> Result<SchemaType, ClassificationError> {
        let graph = self.cx.graph;
        match graph.kind(ty) {
            TypeKind::Primitive(p) => Ok(match known::primitive_atomic(p) {
                Some(q) => SchemaType::KnownAtomic(q),
                None => SchemaType::Primitive(p),
            }),
            TypeKind::Void => Err(ClassificationError::Void),
            TypeKind::Array(component) => {
                if graph.kind(component) == TypeKind::Primitive(PrimitiveKind::Byte) {
                    return Ok(SchemaType::KnownAtomic(known::binary()));
                }
                let item = self.visit(component, depth).map_err(|e| e.within("array component"))?;
                Ok(SchemaType::collection(item))
            }
            TypeKind::Variable { .. } => {
                let resolved = self.variables.resolve(graph, ty);
                match graph.kind(resolved) {
                    TypeKind::Variable { .. } => Ok(SchemaType::Any),
                    _ => self.visit(resolved, depth),
                }
            }
            TypeKind::Wildcard { extends, .. } => match extends {
                Some(bound) => self.visit(bound, depth),
                None => Ok(SchemaType::Any),
            },
            TypeKind::Declared { decl, .. } => self.visit_declared(ty, decl, depth),
        }
    }

    fn visit_declared(
        &mut self,
        ty: TypeId,
        decl: DeclId,
        depth: usize,
    ) -> Result<SchemaType, ClassificationError> {
        let cx = self.cx;
        let graph = cx.graph;
        let ty = self.variables.resolve_type(graph, ty);

        if let Some(adapter) = find_adapter(cx, AdapterTarget::Type(ty))? {
            return self.visit_adapted(&adapter, depth);
        }
        if cx.is_object_type(decl) {
            return Ok(SchemaType::Any);
        }

        let decorated = cx.decorate(ty);
        if decorated.is_collection {
            let collection = self.variables.find_supertype(graph, ty, &cx.config.collection_types);
            let args = collection.map(|c| graph.type_arguments(c)).unwrap_or_default();
            return match args.first() {
                None => Ok(SchemaType::collection(SchemaType::Any)),
                Some(item) => {
                    let item = self.visit(*item, depth).map_err(|e| e.within("collection item"))?;
                    Ok(SchemaType::collection(item))
                }
            };
        }
        if decorated.is_map {
            let map = self.variables.find_supertype(graph, ty, &cx.config.map_types);
            let args = map.map(|m| graph.type_arguments(m)).unwrap_or_default();
            let [key, value] = args[..] else {
                return Ok(SchemaType::map(SchemaType::Any, SchemaType::Any));
            };
            let key = self.visit(key, depth).map_err(|e| e.within("map key"))?;
            let value = self.visit(value, depth).map_err(|e| e.within("map value"))?;
            return Ok(SchemaType::map(key, value));
        }

        let qualified_name = graph.qualified_name_of(decl);
        let name = || qualified_name.to_string();
        if let Some(q) = cx.known_type(qualified_name) {
            return Ok(SchemaType::KnownAtomic(q));
        }
        let declaration = graph.declaration(decl);
        match declaration.kind {
            DeclKind::Interface => return Err(ClassificationError::Interface(name())),
            DeclKind::Annotation => return Err(ClassificationError::AnnotationType(name())),
            DeclKind::Package => return Err(ClassificationError::Unknown(name())),
            DeclKind::Class | DeclKind::Enum => {}
        }
        match self.lookup.definition_for(cx, decl)? {
            Some(r) if declaration.kind == DeclKind::Enum => Ok(SchemaType::Enum(r)),
            Some(r) => Ok(SchemaType::ClassRef(r)),
            None => {
                trace!(class = %qualified_name, "no definition");
                Err(ClassificationError::Unknown(name()))
            }
        }
    }

    fn visit_adapted(
        &mut self,
        adapter: &AdapterType,
        depth: usize,
    ) -> Result<SchemaType, ClassificationError> {
        if depth >= self.cx.config.max_adapter_depth {
            return Err(ClassificationError::AdapterChain(adapter.adapter_name.clone()));
        }
        let adapting = self
            .visit(adapter.adapting, depth + 1)
            .map_err(|e| e.within("adapting type"))?;
        Ok(SchemaType::Adapted { adapting: Box::new(adapting), adapter: adapter.into() })
    }
}
