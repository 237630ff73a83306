//! Adapter resolution.
//!
//! An adapter class extends an adapter base (`XmlAdapter<ValueType, BoundType>`):
//! the bound type is what the model declares, the value type is what actually gets
//! serialized. Lookup precedence is accessor, then the class of the type, then the
//! package of the accessor's declaring class (cached per package per round).
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use indexmap::IndexMap;
use tracing::{debug, trace, warn};

use crate::context::CompilationContext;
use crate::decorate;
use crate::error::ClassificationError;
use crate::graph::{find_annotation, Annotation, DeclId, MemberId, TypeId, TypeKind};
use crate::variables::TypeVariableContext;

const XML_JAVA_TYPE_ADAPTER: &str = "adapters.XmlJavaTypeAdapter";
const XML_JAVA_TYPE_ADAPTERS: &str = "adapters.XmlJavaTypeAdapters";

#[derive(Debug, Clone, PartialEq)]
pub struct AdapterType {
    pub adapter: DeclId,
    pub adapter_name: String,
    /// Erased bound type.
    pub adapted: TypeId,
    /// Value type.
    pub adapting: TypeId,
}

impl AdapterType {
    pub fn new(
        cx: &CompilationContext<'_>,
        adapter_ty: TypeId,
    ) -> Result<Self, ClassificationError> {
        let graph = cx.graph;
        let Some(adapter) = graph.declared(adapter_ty) else {
            return Err(ClassificationError::NotAnAdapter(graph.display(adapter_ty)));
        };
        let adapter_name = cx.qualified_name(adapter);
        let base = TypeVariableContext::new()
            .find_supertype(graph, adapter_ty, &cx.config.adapter_types)
            .ok_or_else(|| ClassificationError::NotAnAdapter(adapter_name.clone()))?;
        let args = graph.type_arguments(base);
        let [adapting, bound] = args[..] else {
            return Err(ClassificationError::AdapterArguments(adapter_name));
        };
        Ok(Self { adapter, adapter_name, adapted: erased(cx, bound), adapting })
    }

    /// Whether a value of `ty` is assignable to the adapted type.
    pub fn can_adapt(&self, cx: &CompilationContext<'_>, ty: TypeId) -> bool {
        let graph = cx.graph;
        match (graph.kind(ty), graph.kind(self.adapted)) {
            (TypeKind::Array(a), TypeKind::Array(b)) => {
                a == b
                    || decorate::erasure(graph, a)
                        .is_some_and(|d| Some(d) == decorate::erasure(graph, b))
            }
            (TypeKind::Primitive(a), TypeKind::Primitive(b)) => a == b,
            _ => {
                let Some(target) = graph.declared(self.adapted) else { return false };
                if cx.is_object_type(target) {
                    return true;
                }
                match decorate::erasure(graph, ty) {
                    Some(d) => cx.decorate(d).is_instance_of(graph.qualified_name_of(target)),
                    None => false,
                }
            }
        }
    }

    /// The adapter hands back the very type it adapts.
    pub fn is_identity(&self, cx: &CompilationContext<'_>, ty: TypeId) -> bool {
        let graph = cx.graph;
        let adapting = decorate::erasure(graph, self.adapting);
        adapting.is_some() && adapting == decorate::erasure(graph, ty)
    }
}

fn erased(cx: &CompilationContext<'_>, ty: TypeId) -> TypeId {
    match cx.graph.kind(ty) {
        TypeKind::Variable { bound: Some(b), .. } => erased(cx, b),
        TypeKind::Variable { bound: None, .. } | TypeKind::Wildcard { extends: None, .. } => {
            match cx.graph.find_declaration(&cx.config.object_type) {
                Some(object) => cx.raw_type(object),
                None => ty,
            }
        }
        TypeKind::Wildcard { extends: Some(b), .. } => erased(cx, b),
        TypeKind::Declared { decl, .. } => cx.raw_type(decl),
        _ => ty,
    }
}

// ————————————————————————————————————————————————————————————————————————————
// PACKAGE ADAPTERS
// ————————————————————————————————————————————————————————————————————————————

/// Package-level adapters, keyed by the qualified name of the type they target.
pub type PackageAdapters = IndexMap<String, TypeId>;

#[derive(Debug, Default)]
pub struct PackageAdapterCache {
    packages: RefCell<HashMap<DeclId, Rc<PackageAdapters>>>,
}

impl PackageAdapterCache {
    pub fn adapters_of(&self, cx: &CompilationContext<'_>, package: DeclId) -> Rc<PackageAdapters> {
        if let Some(hit) = self.packages.borrow().get(&package) {
            return hit.clone();
        }
        let mut table = PackageAdapters::new();
        for ann in package_adapter_annotations(cx.graph.annotations_of(package.into())) {
            let (Some(target), Some(adapter)) = (ann.type_value("type"), ann.type_value("value"))
            else {
                warn!(
                    package = %cx.qualified_name(package),
                    "package-level adapter without a target type"
                );
                continue;
            };
            match cx.graph.declared(target) {
                Some(decl) => {
                    table.insert(cx.qualified_name(decl), adapter);
                }
                None => warn!(
                    package = %cx.qualified_name(package),
                    target = %cx.graph.display(target),
                    "unadaptable package-level target"
                ),
            }
        }
        debug!(
            package = %cx.qualified_name(package),
            adapters = table.len(),
            "package adapters cached"
        );
        self.packages.borrow_mut().entry(package).or_insert(Rc::new(table)).clone()
    }

    pub fn len(&self) -> usize {
        self.packages.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.borrow().is_empty()
    }
}

/// Every `XmlJavaTypeAdapter` on a package, single or grouped.
pub fn package_adapter_annotations(annotations: &[Annotation]) -> Vec<&Annotation> {
    let mut out: Vec<&Annotation> =
        find_annotation(annotations, XML_JAVA_TYPE_ADAPTER).into_iter().collect();
    if let Some(group) = find_annotation(annotations, XML_JAVA_TYPE_ADAPTERS) {
        out.extend(group.annotations("value"));
    }
    out
}

// ————————————————————————————————————————————————————————————————————————————
// LOOKUP
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Clone, Copy)]
pub enum AdapterTarget {
    /// A member, with its type already resolved in the owner's context. Arrays
    /// and collections are looked through to their items.
    Accessor { member: MemberId, ty: TypeId },
    Declaration(DeclId),
    Type(TypeId),
}

/// Adapter annotation on a member: field or getter first, then setter.
pub fn accessor_adapter_annotation<'a>(
    cx: &'a CompilationContext<'_>,
    member: MemberId,
) -> Option<&'a Annotation> {
    let m = cx.graph.member(member);
    find_annotation(&m.annotations, XML_JAVA_TYPE_ADAPTER)
        .or_else(|| find_annotation(&m.setter_annotations, XML_JAVA_TYPE_ADAPTER))
}

pub fn find_adapter(
    cx: &CompilationContext<'_>,
    target: AdapterTarget,
) -> Result<Option<AdapterType>, ClassificationError> {
    let graph = cx.graph;
    let (ty, referer, package) = match target {
        AdapterTarget::Accessor { member, ty } => (
            item_type(cx, ty),
            accessor_adapter_annotation(cx, member).and_then(|a| a.type_value("value")),
            graph.declaring_package_of(member.owner),
        ),
        AdapterTarget::Declaration(decl) => (cx.raw_type(decl), None, None),
        AdapterTarget::Type(ty) => (ty, None, None),
    };

    let TypeKind::Declared { decl, .. } = graph.kind(ty) else {
        return match referer {
            Some(_) => Err(ClassificationError::NotAdaptable(graph.display(ty))),
            None => Ok(None),
        };
    };

    let adapter_ty = referer
        .or_else(|| {
            find_annotation(&graph.declaration(decl).annotations, XML_JAVA_TYPE_ADAPTER)
                .and_then(|a| a.type_value("value"))
        })
        .or_else(|| {
            let table = cx.package_adapters.adapters_of(cx, package?);
            table.get(graph.qualified_name_of(decl)).copied()
        });
    let Some(adapter_ty) = adapter_ty else {
        return Ok(None);
    };

    let adapter = AdapterType::new(cx, adapter_ty)?;
    if !adapter.can_adapt(cx, ty) {
        let ty = graph.display(ty);
        return Err(ClassificationError::DoesNotAdapt { adapter: adapter.adapter_name, ty });
    }
    if adapter.is_identity(cx, ty) {
        trace!(adapter = %adapter.adapter_name, "adapter maps a type onto itself; ignored");
        return Ok(None);
    }
    debug!(adapter = %adapter.adapter_name, ty = %graph.display(ty), "adapter resolved");
    Ok(Some(adapter))
}

/// Item type of an array or collection, else `ty`.
pub fn item_type(cx: &CompilationContext<'_>, ty: TypeId) -> TypeId {
    let graph = cx.graph;
    if let TypeKind::Array(component) = graph.kind(ty) {
        return component;
    }
    if !cx.decorate(ty).is_collection {
        return ty;
    }
    let collection =
        TypeVariableContext::new().find_supertype(graph, ty, &cx.config.collection_types);
    match collection.map(|c| graph.type_arguments(c)).and_then(|args| args.first().copied()) {
        Some(item) => item,
        None => match graph.find_declaration(&cx.config.object_type) {
            Some(object) => cx.raw_type(object),
            None => ty,
        },
    }
}
