//! The base rule set.
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;

use super::{walk_type_definition, with_trail, Model, ValidationResult, Validator};
use crate::adapters::package_adapter_annotations;
use crate::graph::DeclId;
use crate::ir::{Accessor, QName, SchemaType, TypeDefinition};
use crate::registry::{is_transient, DiscoveryFailure};

static NCNAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_.\-]*$").expect("NCName pattern"));

#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultValidator;

impl DefaultValidator {
    fn error_on_definition(result: &mut ValidationResult, def: &TypeDefinition, text: &str) {
        let text = with_trail(text, &def.reference_trail);
        result.add_error(def.position.clone(), &def.qualified_name, text);
    }

    fn error_on_accessor(
        result: &mut ValidationResult,
        owner: &TypeDefinition,
        accessor: &Accessor,
        text: &str,
    ) {
        let text = with_trail(text, &owner.reference_trail);
        result.add_error(accessor.position.clone(), accessor.label(&owner.qualified_name), text);
    }

    fn warn_on_accessor(
        result: &mut ValidationResult,
        owner: &TypeDefinition,
        accessor: &Accessor,
        text: &str,
    ) {
        let text = with_trail(text, &owner.reference_trail);
        result.add_warning(accessor.position.clone(), accessor.label(&owner.qualified_name), text);
    }

    /// Attributes and values are written as text.
    fn require_simple(
        result: &mut ValidationResult,
        owner: &TypeDefinition,
        accessor: &Accessor,
        what: &str,
    ) {
        let Ok(schema_type) = &accessor.schema_type else { return };
        if !schema_type.is_simple() && !matches!(schema_type.base(), SchemaType::Any) {
            let text =
                format!("{what} must have a simple base type. {schema_type} is a complex type.");
            Self::error_on_accessor(result, owner, accessor, &text);
        }
    }

    fn where_is(accessor: &Accessor, owner: &TypeDefinition) -> String {
        accessor
            .position
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_else(|| accessor.label(&owner.qualified_name))
    }
}

impl Validator for DefaultValidator {
    fn validate_package(&self, model: &Model<'_, '_>, package: DeclId) -> ValidationResult {
        let mut result = ValidationResult::new();
        let declaration = model.cx.graph.declaration(package);
        for adapter in package_adapter_annotations(&declaration.annotations) {
            if adapter.type_value("type").is_none() {
                result.add_error(
                    declaration.position.clone(),
                    &declaration.qualified_name,
                    "A type must be specified at the package-level for @XmlJavaTypeAdapter.",
                );
            }
        }
        result
    }

    fn validate_type_definition(
        &self,
        model: &Model<'_, '_>,
        def: &TypeDefinition,
    ) -> ValidationResult {
        let mut result = ValidationResult::new();
        if is_transient(model.cx.graph, def.decl) {
            Self::error_on_definition(&mut result, def, "XmlTransient type definition.");
        }
        if !def.anonymous && !NCNAME.is_match(&def.local_name) {
            let text = format!("'{}' is not a valid xml type name.", def.local_name);
            Self::error_on_definition(&mut result, def, &text);
        }

        let mut attributes: IndexMap<QName, &Accessor> = IndexMap::new();
        for attribute in def.attributes() {
            let qname =
                QName { name: attribute.name.clone(), namespace: attribute.namespace.clone() };
            match attributes.get(&qname) {
                Some(same) => {
                    let text = format!(
                        "Attribute has the same name ({qname}) as {}.",
                        Self::where_is(same, def)
                    );
                    Self::error_on_accessor(&mut result, def, attribute, &text);
                }
                None => {
                    attributes.insert(qname, attribute);
                }
            }
        }

        let mut elements: IndexMap<QName, &Accessor> = IndexMap::new();
        for element in def.elements() {
            let mut names: Vec<QName> = element
                .choices
                .iter()
                .map(|c| QName { name: c.name.clone(), namespace: c.namespace.clone() })
                .collect();
            if names.is_empty() {
                let namespace = element.namespace.clone();
                names.push(QName { name: element.name.clone(), namespace });
            }
            for qname in names {
                match elements.get(&qname) {
                    Some(same) if !std::ptr::eq(*same, element) => {
                        let text = format!(
                            "Element (or element choice) has the same name ({qname}) as {}.",
                            Self::where_is(same, def)
                        );
                        Self::error_on_accessor(&mut result, def, element, &text);
                    }
                    Some(_) => {}
                    None => {
                        elements.insert(qname, element);
                    }
                }
            }
        }

        if let Some(value) = &def.value {
            if def.elements().next().is_some() {
                let text = "A type definition cannot have both an xml value and child element(s).";
                Self::error_on_accessor(&mut result, def, value, text);
            }
        }
        let second_value = def.members.iter().any(|a| a.kind == crate::ir::AccessorKind::Value);
        if def.value.is_some() && second_value {
            let text = "A type definition may have only one xml value.";
            Self::error_on_definition(&mut result, def, text);
        }

        result.aggregate(walk_type_definition(self, model, def));
        result
    }

    fn validate_complex_type(
        &self,
        model: &Model<'_, '_>,
        def: &TypeDefinition,
    ) -> ValidationResult {
        let mut result = ValidationResult::new();
        if def.value.is_some() {
            let extends_object =
                def.supertype.as_ref().is_none_or(|s| model.cx.is_object_type(s.decl));
            if !extends_object {
                let text = "A type with an @XmlValue must not extend another object \
                    (other than java.lang.Object).";
                Self::error_on_definition(&mut result, def, text);
            }
        }
        result
    }

    fn validate_simple_type(
        &self,
        _model: &Model<'_, '_>,
        def: &TypeDefinition,
    ) -> ValidationResult {
        let mut result = ValidationResult::new();
        match &def.value {
            None => Self::error_on_definition(&mut result, def, "No base type specified."),
            Some(value) => {
                if let Ok(schema_type) = &value.schema_type {
                    if !schema_type.is_simple() {
                        let text = format!(
                            "A simple type must have a simple base type. \
                             {schema_type} is a complex type."
                        );
                        Self::error_on_definition(&mut result, def, &text);
                    }
                }
            }
        }
        result
    }

    fn validate_enum_type(&self, _model: &Model<'_, '_>, def: &TypeDefinition) -> ValidationResult {
        let mut result = ValidationResult::new();
        if def.enum_values.is_empty() {
            let text = with_trail("Enum type has no constants.", &def.reference_trail);
            result.add_warning(def.position.clone(), &def.qualified_name, text);
        }
        let mut seen: IndexMap<&str, &str> = IndexMap::new();
        for value in &def.enum_values {
            if let Some(first) = seen.insert(&value.value, &value.constant) {
                let text = format!(
                    "Enum constant {} uses the same value ('{}') as {first}.",
                    value.constant, value.value
                );
                Self::error_on_definition(&mut result, def, &text);
            }
        }
        result
    }

    fn validate_accessor(
        &self,
        _model: &Model<'_, '_>,
        owner: &TypeDefinition,
        accessor: &Accessor,
    ) -> ValidationResult {
        let mut result = ValidationResult::new();
        if let Err(error) = &accessor.schema_type {
            Self::error_on_accessor(&mut result, owner, accessor, &error.to_string());
        }
        for choice in &accessor.choices {
            if let Err(error) = &choice.schema_type {
                let text = format!("Choice '{}': {error}", choice.name);
                Self::error_on_accessor(&mut result, owner, accessor, &text);
            }
        }
        if accessor.kind != crate::ir::AccessorKind::Value && !NCNAME.is_match(&accessor.name) {
            let text = format!("'{}' is not a valid xml name.", accessor.name);
            Self::error_on_accessor(&mut result, owner, accessor, &text);
        }
        result
    }

    fn validate_attribute(
        &self,
        model: &Model<'_, '_>,
        owner: &TypeDefinition,
        accessor: &Accessor,
    ) -> ValidationResult {
        let mut result = self.validate_accessor(model, owner, accessor);
        Self::require_simple(&mut result, owner, accessor, "An attribute");
        result
    }

    fn validate_element(
        &self,
        model: &Model<'_, '_>,
        owner: &TypeDefinition,
        accessor: &Accessor,
    ) -> ValidationResult {
        let mut result = self.validate_accessor(model, owner, accessor);
        if let Ok(schema_type) = &accessor.schema_type {
            if schema_type.is_collection() && matches!(schema_type.item().base(), SchemaType::Any) {
                let text = "Unknown or invisible collection item type.";
                Self::warn_on_accessor(&mut result, owner, accessor, text);
            }
        }
        result
    }

    fn validate_value(
        &self,
        model: &Model<'_, '_>,
        owner: &TypeDefinition,
        accessor: &Accessor,
    ) -> ValidationResult {
        let mut result = self.validate_accessor(model, owner, accessor);
        Self::require_simple(&mut result, owner, accessor, "An xml value");
        if accessor.schema_type.as_ref().is_ok_and(SchemaType::is_collection) {
            let text =
                "An xml value that is a collection is written as a whitespace-separated list.";
            Self::warn_on_accessor(&mut result, owner, accessor, text);
        }
        result
    }

    fn validate_discovery_failure(
        &self,
        _model: &Model<'_, '_>,
        failure: &DiscoveryFailure,
    ) -> ValidationResult {
        let mut result = ValidationResult::new();
        let text = with_trail(&failure.error.to_string(), &failure.reference_trail);
        result.add_error(failure.position.clone(), &failure.site, text);
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CompilerConfig;
    use crate::context::CompilationContext;
    use crate::fixtures::{self, ann};
    use crate::graph::model::ModelGraph;
    use crate::graph::TypeGraph;
    use crate::registry::Registry;
    use crate::validation::validate_model;
    use serde_json::json;

    fn validate(graph: &ModelGraph, roots: &[&str]) -> ValidationResult {
        let cx = CompilationContext::new(graph, CompilerConfig::default());
        let mut registry = Registry::new();
        for root in roots {
            registry.add_root(&cx, graph.find_declaration(root).unwrap());
        }
        validate_model(&Model { cx: &cx, registry: &registry }, &DefaultValidator)
    }

    fn texts(result: &ValidationResult) -> Vec<String> {
        result.errors().iter().map(ToString::to_string).collect()
    }

    #[test]
    fn order_scenario_is_valid() {
        let result = validate(&fixtures::order_model(), &["com.acme.Order"]);
        assert!(!result.has_errors(), "{:?}", texts(&result));
        assert!(!result.has_warnings());
    }

    #[test]
    fn independent_errors_are_all_reported() {
        let graph = fixtures::model(json!([
            { "kind": "class", "name": "v.Both", "position": { "file": "Both.java", "line": 7, "column": 1 }, "members": [
                { "name": "text", "type": "String", "annotations": [ ann("XmlValue", json!({})) ],
                  "position": { "file": "Both.java", "line": 9, "column": 5 } },
                { "name": "child", "type": "String" }
            ] },
            { "kind": "class", "name": "v.Twice", "members": [
                { "name": "a", "type": "String", "annotations": [ ann("XmlAttribute", json!({ "name": "id" })) ] },
                { "name": "b", "type": "String", "annotations": [ ann("XmlAttribute", json!({ "name": "id" })) ] }
            ] },
            { "kind": "class", "name": "v.Fine", "members": [ { "name": "both", "type": "v.Both" }, { "name": "twice", "type": "v.Twice" } ] }
        ]));
        let result = validate(&graph, &["v.Fine"]);
        let errors = texts(&result);
        assert_eq!(errors.len(), 2, "{errors:?}");
        assert_eq!(
            errors[0],
            "Both.java:9:5: A type definition cannot have both an xml value and child element(s).\nThis was added to the model from v.Fine.both"
        );
        assert!(errors[1].starts_with("v.Twice.b: Attribute has the same name (id) as v.Twice.a."));
    }

    #[test]
    fn attributes_and_values_must_be_simple() {
        let graph = fixtures::model(json!([
            { "kind": "class", "name": "s.Inner", "members": [ { "name": "x", "type": "int" } ] },
            { "kind": "class", "name": "s.Outer", "members": [
                { "name": "inner", "type": "s.Inner", "annotations": [ ann("XmlAttribute", json!({})) ] },
                { "name": "lookup", "type": "java.util.Map<String, String>", "annotations": [ ann("XmlAttribute", json!({})) ] },
                { "name": "tags", "type": "java.util.List<String>", "annotations": [ ann("XmlAttribute", json!({})) ] }
            ] },
            { "kind": "class", "name": "s.Words", "members": [
                { "name": "words", "type": "java.util.List<String>", "annotations": [ ann("XmlValue", json!({})) ] }
            ] }
        ]));
        let result = validate(&graph, &["s.Outer", "s.Words"]);
        let errors = texts(&result);
        assert_eq!(errors.len(), 2, "{errors:?}");
        assert_eq!(errors[0], "s.Outer.inner: An attribute must have a simple base type. s.Inner is a complex type.");
        assert_eq!(errors[1], "s.Outer.lookup: An attribute must have a simple base type. map<string, string> is a complex type.");
        assert_eq!(result.warnings().len(), 1);
        assert_eq!(result.warnings()[0].subject, "s.Words.words");
    }

    #[test]
    fn value_types_must_not_extend_other_classes() {
        let graph = fixtures::model(json!([
            { "kind": "class", "name": "x.Base", "members": [ { "name": "id", "type": "long" } ] },
            { "kind": "class", "name": "x.Code", "superclass": "x.Base", "members": [
                { "name": "code", "type": "String", "annotations": [ ann("XmlValue", json!({})) ] }
            ] }
        ]));
        let result = validate(&graph, &["x.Code"]);
        let errors = texts(&result);
        assert_eq!(errors.len(), 1, "{errors:?}");
        assert!(errors[0].contains("must not extend another object"));
    }

    #[test]
    fn classification_failures_carry_their_trail() {
        let graph = fixtures::model(json!([
            { "kind": "interface", "name": "c.Shape" },
            { "kind": "class", "name": "c.Canvas", "members": [ { "name": "shape", "type": "c.Shape" } ] },
            { "kind": "class", "name": "c.Page", "members": [ { "name": "canvas", "type": "c.Canvas" } ],
              "annotations": [ ann("XmlSeeAlso", json!({ "value": [ { "type": "c.Shape" } ] })) ] }
        ]));
        let result = validate(&graph, &["c.Page"]);
        let errors = texts(&result);
        assert_eq!(
            errors,
            [
                "c.Canvas.shape: c.Shape: an interface cannot be a schema type\nThis was added to the model from c.Page.canvas",
                "see also on c.Page: c.Shape: an interface cannot be a schema type",
            ]
        );
    }

    #[test]
    fn enums_names_and_packages() {
        let graph = fixtures::model(json!([
            { "kind": "package", "name": "e", "annotations": [
                ann("adapters.XmlJavaTypeAdapters", json!({ "value": [
                    { "annotation": ann("adapters.XmlJavaTypeAdapter", json!({ "value": { "type": "e.Holder" } })) }
                ] }))
            ] },
            { "kind": "enum", "name": "e.Empty" },
            { "kind": "enum", "name": "e.Clash", "constants": [
                { "name": "A", "annotations": [ ann("XmlEnumValue", json!({ "value": "x" })) ] },
                { "name": "B", "annotations": [ ann("XmlEnumValue", json!({ "value": "x" })) ] }
            ] },
            { "kind": "class", "name": "e.Holder", "annotations": [ ann("XmlType", json!({ "name": "bad name" })) ], "members": [
                { "name": "empty", "type": "e.Empty" },
                { "name": "clash", "type": "e.Clash", "annotations": [ ann("XmlElement", json!({ "name": "1st" })) ] }
            ] }
        ]));
        let result = validate(&graph, &["e.Holder"]);
        let errors = texts(&result);
        assert_eq!(errors.len(), 4, "{errors:?}");
        assert_eq!(errors[0], "e: A type must be specified at the package-level for @XmlJavaTypeAdapter.");
        assert_eq!(errors[1], "e.Holder: 'bad name' is not a valid xml type name.");
        assert_eq!(errors[2], "e.Holder.clash: '1st' is not a valid xml name.");
        assert!(errors[3].starts_with("e.Clash: Enum constant B uses the same value ('x') as A."));
        assert_eq!(result.warnings().len(), 1);
        assert_eq!(result.warnings()[0].subject, "e.Empty");
    }
}
