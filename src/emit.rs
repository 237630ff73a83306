//! JSON debug view of a compiled model.
use serde_json::{json, Value};

use crate::compile::CompileOutcome;
use crate::graph::TypeGraph;
use crate::ir::{Accessor, Choice, SchemaType, TypeDefinition};
use crate::validation::{ValidationMessage, ValidationResult};

pub fn emit_model(graph: &dyn TypeGraph, outcome: &CompileOutcome) -> Value {
    let definitions: Vec<Value> =
        outcome.registry.all_definitions().map(|d| emit_definition(graph, d)).collect();
    json!({
        "definitions": definitions,
        "diagnostics": emit_diagnostics(&outcome.validation),
    })
}

pub fn emit_diagnostics(validation: &ValidationResult) -> Value {
    let render = |messages: &[ValidationMessage]| {
        messages.iter().map(ToString::to_string).collect::<Vec<_>>()
    };
    json!({
        "errors": render(validation.errors()),
        "warnings": render(validation.warnings()),
    })
}

pub fn emit_definition(graph: &dyn TypeGraph, def: &TypeDefinition) -> Value {
    let mut o = json!({
        "class": def.qualified_name,
        "name": def.local_name,
        "namespace": def.namespace,
        "kind": def.kind,
    });
    if def.anonymous {
        o["anonymous"] = Value::Bool(true);
    }
    if let Some(supertype) = &def.supertype {
        o["extends"] = Value::from(supertype.qualified_name.clone());
    }
    if !def.members.is_empty() {
        o["members"] = Value::Array(def.members.iter().map(|a| emit_accessor(graph, a)).collect());
    }
    if let Some(value) = &def.value {
        o["value"] = emit_accessor(graph, value);
    }
    if !def.enum_values.is_empty() {
        let values = def.enum_values.iter().map(|v| Value::from(v.value.clone()));
        o["values"] = Value::Array(values.collect());
    }
    if !def.reference_trail.is_empty() {
        o["referenced_from"] = json!(def.reference_trail);
    }
    if let Some(doc) = &def.doc {
        o["doc"] = Value::from(doc.clone());
    }
    o
}

fn emit_accessor(graph: &dyn TypeGraph, accessor: &Accessor) -> Value {
    let mut o = json!({
        "name": accessor.name,
        "kind": accessor.kind,
        "java": graph.display(accessor.ty),
        "min_occurs": accessor.min_occurs,
        "max_occurs": match accessor.max_occurs {
            Some(n) => Value::from(n),
            None => Value::from("unbounded"),
        },
    });
    if accessor.name != accessor.member_name {
        o["member"] = Value::from(accessor.member_name.clone());
    }
    if !accessor.namespace.is_empty() {
        o["namespace"] = Value::from(accessor.namespace.clone());
    }
    match &accessor.schema_type {
        Ok(ty) => o["type"] = emit_schema_type(ty),
        Err(error) => o["error"] = Value::from(error.to_string()),
    }
    if accessor.required {
        o["required"] = Value::Bool(true);
    }
    if accessor.nillable {
        o["nillable"] = Value::Bool(true);
    }
    if let Some(adapter) = &accessor.adapter {
        o["adapter"] = Value::from(adapter.qualified_name.clone());
    }
    if !accessor.choices.is_empty() {
        o["choices"] = Value::Array(accessor.choices.iter().map(emit_choice).collect());
    }
    if let Some(doc) = &accessor.doc {
        o["doc"] = Value::from(doc.clone());
    }
    o
}

fn emit_choice(choice: &Choice) -> Value {
    let mut o = json!({ "name": choice.name });
    if !choice.namespace.is_empty() {
        o["namespace"] = Value::from(choice.namespace.clone());
    }
    match &choice.schema_type {
        Ok(ty) => o["type"] = emit_schema_type(ty),
        Err(error) => o["error"] = Value::from(error.to_string()),
    }
    o
}

pub fn emit_schema_type(ty: &SchemaType) -> Value {
    match ty {
        SchemaType::Primitive(p) => json!({ "type": "primitive", "name": p.keyword() }),
        SchemaType::KnownAtomic(q) => {
            json!({ "type": "atomic", "name": q.name, "namespace": q.namespace })
        }
        SchemaType::Enum(d) => json!({ "type": "enum", "ref": d.qualified_name }),
        SchemaType::ClassRef(d) => json!({ "type": "class", "ref": d.qualified_name }),
        SchemaType::Collection(item) => {
            json!({ "type": "collection", "items": emit_schema_type(item) })
        }
        SchemaType::Map { key, value } => json!({
            "type": "map",
            "key": emit_schema_type(key),
            "value": emit_schema_type(value),
        }),
        SchemaType::Adapted { adapting, adapter } => json!({
            "type": "adapted",
            "adapter": adapter.qualified_name,
            "adapting": emit_schema_type(adapting),
        }),
        SchemaType::Any => json!({ "type": "any" }),
    }
}
