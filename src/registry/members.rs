//! Members of a class as accessors.
use tracing::warn;

use super::{Reference, ReferenceStack, Registry};
use crate::adapters::{find_adapter, AdapterTarget};
use crate::classify::Classifier;
use crate::context::CompilationContext;
use crate::graph::{find_annotation, Annotation, Member, MemberId, PrimitiveKind, TypeId, TypeKind};
use crate::ir::{Accessor, AccessorKind, AdapterRef, Choice};
use crate::variables::TypeVariableContext;

/// JAXB's "use the default" marker for names and namespaces.
const DEFAULT_MARKER: &str = "##default";

/// A binding annotation on the field, getter, or setter.
pub fn binding<'a>(member: &'a Member, simple: &str) -> Option<&'a Annotation> {
    find_annotation(&member.annotations, simple)
        .or_else(|| find_annotation(&member.setter_annotations, simple))
}

pub fn explicit<'a>(ann: Option<&'a Annotation>, key: &str) -> Option<&'a str> {
    ann.and_then(|a| a.str(key)).filter(|s| *s != DEFAULT_MARKER)
}

/// `Introspector.decapitalize`: `FooBar` → `fooBar`, `URL` stays `URL`.
pub fn decapitalize(name: &str) -> String {
    let mut chars = name.chars();
    let Some(first) = chars.next() else { return String::new() };
    if chars.next().is_some_and(char::is_uppercase) && first.is_uppercase() {
        return name.to_string();
    }
    first.to_lowercase().chain(name.chars().skip(1)).collect()
}

pub(super) struct AccessorSite<'a> {
    pub owner_name: &'a str,
    pub owner_namespace: &'a str,
    pub member: MemberId,
    pub variables: &'a TypeVariableContext,
    pub stack: &'a ReferenceStack,
}

impl Registry {
    /// `None` for transient members.
    pub(super) fn build_accessor(
        &mut self,
        cx: &CompilationContext<'_>,
        site: AccessorSite<'_>,
    ) -> Option<Accessor> {
        let graph = cx.graph;
        let member = graph.member(site.member);
        if binding(member, "XmlTransient").is_some() {
            return None;
        }
        let attribute = binding(member, "XmlAttribute");
        let value = binding(member, "XmlValue");
        let element = binding(member, "XmlElement");
        let kind = match (attribute, value) {
            (Some(_), _) => AccessorKind::Attribute,
            (None, Some(_)) => AccessorKind::Value,
            (None, None) => AccessorKind::Element,
        };
        let naming = match kind {
            AccessorKind::Attribute => attribute,
            AccessorKind::Element => element,
            AccessorKind::Value => None,
        };

        let label = format!("{}.{}", site.owner_name, member.name);
        let stack = site.stack.push(Reference::Site(label.clone()));
        let ty = site.variables.resolve_type(graph, member.ty);
        let adapter = find_adapter(cx, AdapterTarget::Accessor { member: site.member, ty });
        let schema_type = match &adapter {
            Ok(adapter) => {
                let mut lookup = self.discovering(&stack);
                Classifier::new(cx, &mut lookup)
                    .with_variables(site.variables.clone())
                    .classify_accessor(ty, adapter.as_ref())
            }
            Err(e) => Err(e.clone()),
        };
        if let Err(error) = &schema_type {
            warn!(accessor = %label, %error, "accessor type could not be classified");
        }

        let many = match &schema_type {
            Ok(t) => t.is_collection(),
            Err(_) => is_many(cx, ty),
        };
        let required = naming.and_then(|a| a.bool("required")).unwrap_or(false);
        let (min_occurs, max_occurs) = match kind {
            AccessorKind::Element => {
                let min = required || is_primitive_or_primitive_array(cx, ty);
                (u32::from(min), (!many).then_some(1))
            }
            AccessorKind::Attribute => (u32::from(required), Some(1)),
            AccessorKind::Value => (1, Some(1)),
        };
        let namespace = match kind {
            AccessorKind::Element => explicit(naming, "namespace").unwrap_or(site.owner_namespace),
            _ => explicit(naming, "namespace").unwrap_or(""),
        };

        let choices = match binding(member, "XmlElements") {
            Some(group) => group
                .annotations("value")
                .into_iter()
                .filter_map(|choice| {
                    let ty = choice.type_value("type")?;
                    let mut lookup = self.discovering(&stack);
                    let schema_type = Classifier::new(cx, &mut lookup)
                        .with_variables(site.variables.clone())
                        .classify(ty);
                    let name = match explicit(Some(choice), "name") {
                        Some(name) => name.to_string(),
                        None => match graph.declared(ty) {
                            Some(d) => decapitalize(&graph.declaration(d).simple_name),
                            None => member.name.clone(),
                        },
                    };
                    let namespace = explicit(Some(choice), "namespace")
                        .unwrap_or(site.owner_namespace)
                        .to_string();
                    Some(Choice { name, namespace, ty, schema_type })
                })
                .collect(),
            None => Vec::new(),
        };

        Some(Accessor {
            name: explicit(naming, "name").unwrap_or(&member.name).to_string(),
            member: site.member,
            member_name: member.name.clone(),
            kind,
            ty,
            namespace: namespace.to_string(),
            min_occurs,
            max_occurs,
            required,
            nillable: element.and_then(|a| a.bool("nillable")).unwrap_or(false),
            adapter: adapter.ok().flatten().as_ref().map(AdapterRef::from),
            choices,
            schema_type,
            position: member.position.clone(),
            doc: member.doc.clone(),
        })
    }
}

fn is_many(cx: &CompilationContext<'_>, ty: TypeId) -> bool {
    match cx.graph.kind(ty) {
        TypeKind::Array(c) => cx.graph.kind(c) != TypeKind::Primitive(PrimitiveKind::Byte),
        _ => cx.decorate(ty).is_collection,
    }
}

fn is_primitive_or_primitive_array(cx: &CompilationContext<'_>, ty: TypeId) -> bool {
    match cx.graph.kind(ty) {
        TypeKind::Primitive(_) => true,
        TypeKind::Array(c) => {
            matches!(cx.graph.kind(c), TypeKind::Primitive(p) if p != PrimitiveKind::Byte)
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decapitalize_like_java_beans() {
        assert_eq!(decapitalize("LineItem"), "lineItem");
        assert_eq!(decapitalize("URL"), "URL");
        assert_eq!(decapitalize("A"), "a");
        assert_eq!(decapitalize(""), "");
    }
}
