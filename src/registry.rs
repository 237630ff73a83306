//! Type-definition registry.
//!
//! Definitions are keyed by qualified name and discovered transitively from a
//! root set: supertypes, member types, choices, see-also hints and (optionally)
//! subclasses. A persistent reference stack carries the in-progress ancestors
//! (the cycle guard) and the accessors that led to each discovery (the trail).
pub mod members;

use indexmap::IndexMap;
use tracing::{debug, trace, warn};

use crate::adapters::{find_adapter, AdapterTarget};
use crate::classify::DefinitionLookup;
use crate::context::CompilationContext;
use crate::error::ClassificationError;
use crate::graph::{find_annotation, DeclId, DeclKind, MemberId, SourcePosition, TypeGraph};
use crate::ir::{AccessorKind, DefinitionKind, DefinitionRef, EnumValue, TypeDefinition};
use crate::stack::PersistentStack;
use crate::variables::TypeVariableContext;
use members::{decapitalize, AccessorSite};

#[derive(Debug, Clone, PartialEq)]
pub enum Reference {
    /// A declaration whose discovery is in progress.
    Declaration(DeclId),
    /// A class whose adapter is being followed to the adapting class.
    Adapted(DeclId),
    /// Where the next declaration was reached from (`Order.items`, `supertype of Order`).
    Site(String),
}

pub type ReferenceStack = PersistentStack<Reference>;

/// Sites on the stack, outermost first.
pub fn trail_of(stack: &ReferenceStack) -> Vec<String> {
    let mut trail: Vec<String> = stack
        .iter()
        .filter_map(|r| match r {
            Reference::Site(s) => Some(s.clone()),
            Reference::Declaration(_) | Reference::Adapted(_) => None,
        })
        .collect();
    trail.reverse();
    trail
}

/// A reference outside any accessor that could not be followed.
#[derive(Debug, Clone)]
pub struct DiscoveryFailure {
    pub site: String,
    pub error: ClassificationError,
    pub reference_trail: Vec<String>,
    pub position: Option<SourcePosition>,
}

#[derive(Debug, Default)]
pub struct Registry {
    /// Reserved on entry, filled once discovery of the definition completes.
    slots: IndexMap<String, Option<TypeDefinition>>,
    failures: Vec<DiscoveryFailure>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// In discovery order.
    pub fn all_definitions(&self) -> impl Iterator<Item = &TypeDefinition> {
        self.slots.values().flatten()
    }

    pub fn find(&self, qualified_name: &str) -> Option<&TypeDefinition> {
        self.slots.get(qualified_name).and_then(Option::as_ref)
    }

    pub fn len(&self) -> usize {
        self.all_definitions().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn failures(&self) -> &[DiscoveryFailure] {
        &self.failures
    }

    /// Register a root. Failures are recorded, not returned.
    pub fn add_root(&mut self, cx: &CompilationContext<'_>, decl: DeclId) {
        let stack = ReferenceStack::new();
        if let Err(error) = self.add(cx, decl, &stack) {
            let declaration = cx.graph.declaration(decl);
            let site = declaration.qualified_name.clone();
            self.fail(site, error, &stack, declaration.position.clone());
        }
    }

    /// Register `decl` and everything reachable from it.
    ///
    /// `Ok(None)` for types that are never registered (the object type, known
    /// atomics, classes adapted to a non-class).
    pub fn add(
        &mut self,
        cx: &CompilationContext<'_>,
        decl: DeclId,
        stack: &ReferenceStack,
    ) -> Result<Option<DefinitionRef>, ClassificationError> {
        let graph = cx.graph;
        let qualified_name = cx.qualified_name(decl);
        let reference = DefinitionRef { decl, qualified_name: qualified_name.clone() };
        if stack.contains(&Reference::Declaration(decl)) {
            trace!(class = %qualified_name, "cycle guard: discovery already in progress");
            return Ok(Some(reference));
        }
        if self.slots.contains_key(&qualified_name) {
            return Ok(Some(reference));
        }
        if cx.is_object_type(decl) || cx.known_type(&qualified_name).is_some() {
            trace!(class = %qualified_name, "base or atomic type; not registered");
            return Ok(None);
        }
        let declaration = graph.declaration(decl);
        match declaration.kind {
            DeclKind::Class | DeclKind::Enum => {}
            DeclKind::Interface => return Err(ClassificationError::Interface(qualified_name)),
            DeclKind::Annotation => return Err(ClassificationError::AnnotationType(qualified_name)),
            DeclKind::Package => return Err(ClassificationError::Unknown(qualified_name)),
        }
        if let Some(adapter) = find_adapter(cx, AdapterTarget::Declaration(decl))? {
            // the adapting class stands in for the adapted one
            let Some(adapting) = graph.declared(adapter.adapting) else {
                return Ok(None);
            };
            let adapted = Reference::Adapted(decl);
            let chain: Vec<&Reference> =
                stack.iter().take_while(|r| matches!(r, Reference::Adapted(_))).collect();
            if chain.contains(&&adapted) || chain.len() >= cx.config.max_adapter_depth {
                return Err(ClassificationError::AdapterChain(adapter.adapter_name));
            }
            return self.add(cx, adapting, &stack.push(adapted));
        }

        self.slots.insert(qualified_name.clone(), None);
        let trail = trail_of(stack);
        let stack = stack.push(Reference::Declaration(decl));
        debug!(class = %qualified_name, depth = trail.len(), "registering type definition");
        let definition = self.build_definition(cx, decl, trail, &stack);
        self.slots.insert(qualified_name, Some(definition));
        Ok(Some(reference))
    }

    fn build_definition(
        &mut self,
        cx: &CompilationContext<'_>,
        decl: DeclId,
        reference_trail: Vec<String>,
        stack: &ReferenceStack,
    ) -> TypeDefinition {
        let graph = cx.graph;
        let declaration = graph.declaration(decl);
        let qualified_name = declaration.qualified_name.clone();
        let (local_name, namespace, anonymous) = naming(cx, decl);

        // Transient superclasses fold their members in; the first other one is the supertype.
        let mut variables = TypeVariableContext::new();
        let mut folded: Vec<(DeclId, TypeVariableContext)> = Vec::new();
        let mut supertype = None;
        let mut current = declaration.superclass;
        while let Some(st) = current {
            let st = variables.resolve_type(graph, st);
            let Some(super_decl) = graph.declared(st) else { break };
            if cx.is_object_type(super_decl) {
                break;
            }
            if is_transient(graph, super_decl) {
                variables = variables.push_declaration(graph, super_decl, graph.type_arguments(st));
                folded.push((super_decl, variables.clone()));
                current = graph.declaration(super_decl).superclass;
                continue;
            }
            let site = stack.push(Reference::Site(format!("supertype of {qualified_name}")));
            match self.add(cx, super_decl, &site) {
                Ok(found) => supertype = found,
                Err(error) => {
                    let what = format!("supertype of {qualified_name}");
                    self.fail(what, error, stack, declaration.position.clone());
                }
            }
            break;
        }

        let mut owners: Vec<(DeclId, TypeVariableContext)> = folded.into_iter().rev().collect();
        owners.push((decl, TypeVariableContext::new()));
        let mut members = Vec::new();
        let mut value = None;
        for (owner, variables) in &owners {
            for index in 0..graph.declaration(*owner).members.len() {
                let site = AccessorSite {
                    owner_name: &qualified_name,
                    owner_namespace: &namespace,
                    member: MemberId { owner: *owner, index: index as u32 },
                    variables,
                    stack,
                };
                let Some(accessor) = self.build_accessor(cx, site) else { continue };
                match accessor.kind {
                    AccessorKind::Value if value.is_none() => value = Some(accessor),
                    AccessorKind::Value => {
                        warn!(
                            class = %qualified_name,
                            member = %accessor.member_name,
                            "second xml value"
                        );
                        members.push(accessor)
                    }
                    _ => members.push(accessor),
                }
            }
        }

        let enum_values = declaration
            .constants
            .iter()
            .map(|c| EnumValue {
                constant: c.name.clone(),
                value: find_annotation(&c.annotations, "XmlEnumValue")
                    .and_then(|a| a.str("value"))
                    .unwrap_or(&c.name)
                    .to_string(),
            })
            .collect();

        self.discover_hints(cx, decl, stack);

        let kind = if declaration.kind == DeclKind::Enum {
            DefinitionKind::Enum
        } else if value.is_some() && members.is_empty() && self.has_no_content(supertype.as_ref()) {
            DefinitionKind::Simple
        } else {
            DefinitionKind::Complex
        };

        TypeDefinition {
            decl,
            qualified_name,
            local_name,
            namespace,
            anonymous,
            kind,
            members,
            value,
            enum_values,
            supertype,
            reference_trail,
            position: declaration.position.clone(),
            doc: declaration.doc.clone(),
        }
    }

    /// See-also hints, or the API subclasses when there are none.
    fn discover_hints(
        &mut self,
        cx: &CompilationContext<'_>,
        decl: DeclId,
        stack: &ReferenceStack,
    ) {
        let graph = cx.graph;
        let declaration = graph.declaration(decl);
        let qualified_name = &declaration.qualified_name;
        match find_annotation(&declaration.annotations, "XmlSeeAlso") {
            Some(see_also) => {
                for ty in see_also.type_values("value") {
                    let what = format!("see also on {qualified_name}");
                    let site = stack.push(Reference::Site(what.clone()));
                    let result = match graph.declared(ty) {
                        Some(hint) => self.add(cx, hint, &site).map(|_| ()),
                        None => Err(ClassificationError::Unresolved(graph.display(ty))),
                    };
                    if let Err(error) = result {
                        self.fail(what, error, stack, declaration.position.clone());
                    }
                }
            }
            None if cx.config.discover_subtypes => {
                for sub in subclasses_of(graph, decl) {
                    let what = format!("subclass of {qualified_name}");
                    let site = stack.push(Reference::Site(what.clone()));
                    if let Err(error) = self.add(cx, sub, &site) {
                        self.fail(what, error, stack, graph.declaration(sub).position.clone());
                    }
                }
            }
            None => {}
        }
    }

    /// No attributes or elements here or up the registered supertype chain.
    fn has_no_content(&self, supertype: Option<&DefinitionRef>) -> bool {
        let mut next = supertype;
        let mut hops = 0;
        while let Some(r) = next {
            let Some(def) = self.find(&r.qualified_name) else { break };
            if !def.members.is_empty() {
                return false;
            }
            next = def.supertype.as_ref();
            hops += 1;
            if hops > self.slots.len() {
                break;
            }
        }
        true
    }

    /// `stack` is where the failing reference was made from, without its site.
    fn fail(
        &mut self,
        site: String,
        error: ClassificationError,
        stack: &ReferenceStack,
        position: Option<SourcePosition>,
    ) {
        debug!(%site, %error, "discovery failure");
        let reference_trail = trail_of(stack);
        self.failures.push(DiscoveryFailure { site, error, reference_trail, position });
    }

    fn discovering(&mut self, stack: &ReferenceStack) -> Discovering<'_> {
        Discovering { registry: self, stack: stack.clone() }
    }
}

/// Read-only: answers for registered (or in-progress) definitions.
impl DefinitionLookup for Registry {
    fn definition_for(
        &mut self,
        cx: &CompilationContext<'_>,
        decl: DeclId,
    ) -> Result<Option<DefinitionRef>, ClassificationError> {
        let qualified_name = cx.qualified_name(decl);
        let registered = self.slots.contains_key(&qualified_name);
        Ok(registered.then_some(DefinitionRef { decl, qualified_name }))
    }
}

/// Registers whatever the classifier asks about, under the given stack.
pub(crate) struct Discovering<'r> {
    registry: &'r mut Registry,
    stack: ReferenceStack,
}

impl DefinitionLookup for Discovering<'_> {
    fn definition_for(
        &mut self,
        cx: &CompilationContext<'_>,
        decl: DeclId,
    ) -> Result<Option<DefinitionRef>, ClassificationError> {
        self.registry.add(cx, decl, &self.stack)
    }
}

pub fn is_transient(graph: &dyn TypeGraph, decl: DeclId) -> bool {
    find_annotation(&graph.declaration(decl).annotations, "XmlTransient").is_some()
}

/// Local name, namespace, anonymous.
fn naming(cx: &CompilationContext<'_>, decl: DeclId) -> (String, String, bool) {
    let graph = cx.graph;
    let declaration = graph.declaration(decl);
    let xml_type = find_annotation(&declaration.annotations, "XmlType");
    let (local_name, anonymous) = match members::explicit(xml_type, "name") {
        Some("") => (String::new(), true),
        Some(name) => (name.to_string(), false),
        None => (decapitalize(&declaration.simple_name), false),
    };
    let namespace = members::explicit(xml_type, "namespace")
        .map(str::to_string)
        .or_else(|| {
            let package = declaration.package?;
            find_annotation(&graph.declaration(package).annotations, "XmlSchema")
                .and_then(|a| a.str("namespace"))
                .map(str::to_string)
        })
        .unwrap_or_else(|| cx.config.default_namespace.clone());
    (local_name, namespace, anonymous)
}

/// API (non-platform) classes whose superclass is `decl`.
fn subclasses_of(graph: &dyn TypeGraph, decl: DeclId) -> Vec<DeclId> {
    graph
        .declarations()
        .into_iter()
        .filter(|d| {
            let candidate = graph.declaration(*d);
            !candidate.platform
                && candidate.kind == DeclKind::Class
                && candidate.superclass.and_then(|s| graph.declared(s)) == Some(decl)
        })
        .collect()
}
