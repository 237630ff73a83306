//! One compilation round: context, registry, validation.
use tracing::{debug, info};

use crate::config::CompilerConfig;
use crate::context::CompilationContext;
use crate::error::{CompileError, ModelError};
use crate::graph::{DeclId, DeclKind, TypeGraph};
use crate::registry::{is_transient, Registry};
use crate::validation::rules::DefaultValidator;
use crate::validation::{validate_model, Model, ValidationResult, Validator, ValidatorChain};

/// The registry and everything validation had to say about it.
#[derive(Debug)]
pub struct CompileOutcome {
    pub registry: Registry,
    pub validation: ValidationResult,
}

impl CompileOutcome {
    /// Fails when validation produced any error. Warnings never fail a round.
    pub fn check(&self) -> Result<(), CompileError> {
        if self.validation.has_errors() {
            return Err(CompileError::Validation {
                errors: self.validation.errors().len(),
                warnings: self.validation.warnings().len(),
            });
        }
        Ok(())
    }
}

pub struct Compiler<'g> {
    cx: CompilationContext<'g>,
    validators: ValidatorChain,
}

impl<'g> Compiler<'g> {
    /// A compiler with the base rule set.
    pub fn new(graph: &'g dyn TypeGraph, config: CompilerConfig) -> Self {
        Self {
            cx: CompilationContext::new(graph, config),
            validators: ValidatorChain::new().with(DefaultValidator),
        }
    }

    /// Additional rules, run after the ones already registered.
    pub fn with_validator(mut self, validator: impl Validator + 'static) -> Self {
        self.validators.push(Box::new(validator));
        self
    }

    pub fn context(&self) -> &CompilationContext<'g> {
        &self.cx
    }

    /// Resolve root names against the graph.
    pub fn roots_named(&self, names: &[String]) -> Result<Vec<DeclId>, ModelError> {
        names
            .iter()
            .map(|name| {
                self.cx.graph.find_declaration(name).ok_or_else(|| ModelError::UnknownType {
                    name: name.clone(),
                    from: "the root set".to_string(),
                })
            })
            .collect()
    }

    /// Every API class and enum that is not transient.
    pub fn default_roots(&self) -> Vec<DeclId> {
        let graph = self.cx.graph;
        graph
            .declarations()
            .into_iter()
            .filter(|d| {
                let declaration = graph.declaration(*d);
                !declaration.platform
                    && matches!(declaration.kind, DeclKind::Class | DeclKind::Enum)
                    && !is_transient(graph, *d)
            })
            .collect()
    }

    pub fn run(&self, roots: &[DeclId]) -> CompileOutcome {
        let mut registry = Registry::new();
        for root in roots {
            registry.add_root(&self.cx, *root);
        }
        debug!(
            definitions = registry.len(),
            failures = registry.failures().len(),
            decorations = self.cx.decorations.len(),
            "registry complete"
        );
        let model = Model { cx: &self.cx, registry: &registry };
        let validation = validate_model(&model, &self.validators);
        info!(
            definitions = registry.len(),
            errors = validation.errors().len(),
            warnings = validation.warnings().len(),
            "compilation round finished"
        );
        CompileOutcome { registry, validation }
    }
}

/// Compile `roots` (all API types when empty) and fail on validation errors.
pub fn compile(
    graph: &dyn TypeGraph,
    config: CompilerConfig,
    roots: &[String],
) -> Result<CompileOutcome, CompileError> {
    let compiler = Compiler::new(graph, config);
    let roots = match roots {
        [] => compiler.default_roots(),
        names => compiler.roots_named(names)?,
    };
    let outcome = compiler.run(&roots);
    outcome.check()?;
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ClassificationError;
    use crate::fixtures::{self, ann};
    use crate::ir::{DefinitionKind, QName, SchemaType, TypeDefinition};
    use serde_json::json;

    #[test]
    fn order_and_line_item() {
        let graph = fixtures::order_model();
        let roots = ["com.acme.Order".to_string()];
        let outcome = compile(&graph, CompilerConfig::default(), &roots).unwrap();
        let definitions: Vec<&TypeDefinition> = outcome.registry.all_definitions().collect();
        assert_eq!(definitions.len(), 2);
        assert!(definitions.iter().all(|d| d.kind == DefinitionKind::Complex));

        let order = outcome.registry.find("com.acme.Order").unwrap();
        let line_item = outcome.registry.find("com.acme.LineItem").unwrap();
        let items = order.accessors().find(|a| a.name == "items").unwrap();
        let line_items = SchemaType::collection(SchemaType::ClassRef(line_item.reference()));
        assert_eq!(items.schema_type, Ok(line_items));
        let total = order.accessors().find(|a| a.name == "total").unwrap();
        assert_eq!(total.schema_type, Ok(SchemaType::KnownAtomic(QName::xsd("decimal"))));
        assert!(!outcome.validation.has_errors());
    }

    #[test]
    fn default_roots_skip_platform_and_transient_types() {
        let graph = fixtures::model(json!([
            { "kind": "class", "name": "r.A" },
            { "kind": "class", "name": "r.Hidden", "annotations": [ ann("XmlTransient", json!({})) ] },
            { "kind": "interface", "name": "r.I" },
            { "kind": "enum", "name": "r.E", "constants": ["X"] }
        ]));
        let compiler = Compiler::new(&graph, CompilerConfig::default());
        let roots = compiler.default_roots();
        let names: Vec<&str> = roots.into_iter().map(|d| graph.qualified_name_of(d)).collect();
        assert_eq!(names, ["r.A", "r.E"]);
        let outcome = compile(&graph, CompilerConfig::default(), &[]).unwrap();
        assert_eq!(outcome.registry.len(), 2);
    }

    #[test]
    fn adapter_cycles_among_default_roots_are_reported() {
        let graph = fixtures::adapter_model();
        let compiler = Compiler::new(&graph, CompilerConfig::default());
        let outcome = compiler.run(&compiler.default_roots());
        let chains: Vec<&str> = outcome
            .registry
            .failures()
            .iter()
            .filter(|f| matches!(f.error, ClassificationError::AdapterChain(_)))
            .map(|f| f.site.as_str())
            .collect();
        assert_eq!(chains, ["a.Ping", "a.Pong"]);
        assert!(outcome.registry.find("a.Shape").is_some());
        assert!(outcome.registry.find("a.Ping").is_none());
        assert!(outcome.validation.has_errors());
    }

    #[test]
    fn unknown_roots_are_model_errors() {
        let graph = fixtures::order_model();
        let roots = ["com.acme.Nope".to_string()];
        let err = compile(&graph, CompilerConfig::default(), &roots).unwrap_err();
        assert!(matches!(
            err,
            CompileError::Model(ModelError::UnknownType { ref name, .. }) if name == "com.acme.Nope"
        ));
    }

    #[test]
    fn validation_errors_fail_only_after_everything_is_validated() {
        let graph = fixtures::model(json!([
            { "kind": "interface", "name": "b.Shape" },
            { "kind": "class", "name": "b.One", "members": [ { "name": "shape", "type": "b.Shape" } ] },
            { "kind": "class", "name": "b.Two", "members": [
                { "name": "v", "type": "String", "annotations": [ ann("XmlValue", json!({})) ] },
                { "name": "e", "type": "String" }
            ] },
            { "kind": "enum", "name": "b.Nothing" }
        ]));
        let compiler = Compiler::new(&graph, CompilerConfig::default());
        let outcome = compiler.run(&compiler.default_roots());
        assert_eq!(outcome.validation.errors().len(), 2);
        assert_eq!(outcome.validation.warnings().len(), 1);
        let err = outcome.check().unwrap_err();
        assert_eq!(err.to_string(), "there were validation errors (2 errors, 1 warnings)");
        assert!(matches!(
            compile(&graph, CompilerConfig::default(), &[]),
            Err(CompileError::Validation { errors: 2, warnings: 1 })
        ));
    }

    #[test]
    fn extra_validators_run_after_the_base_rules() {
        struct NoEnums;
        impl Validator for NoEnums {
            fn validate_enum_type(
                &self,
                _model: &Model<'_, '_>,
                def: &TypeDefinition,
            ) -> ValidationResult {
                let mut result = ValidationResult::new();
                let text = "enums are not supported by this client";
                result.add_error(None, &def.qualified_name, text);
                result
            }
        }

        let graph = fixtures::model(json!([ { "kind": "enum", "name": "q.Color", "constants": ["RED"] } ]));
        let compiler = Compiler::new(&graph, CompilerConfig::default()).with_validator(NoEnums);
        let outcome = compiler.run(&compiler.default_roots());
        let errors: Vec<String> =
            outcome.validation.errors().iter().map(ToString::to_string).collect();
        assert_eq!(errors, ["q.Color: enums are not supported by this client"]);
        assert_eq!(compiler.context().graph.declarations().len(), graph.declarations().len());
    }
}
