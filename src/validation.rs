//! Validation of the compiled model.
//!
//! A [`Validator`] has one method per entity kind. The provided methods form a
//! template: validating a type definition dispatches on its kind and then walks
//! its accessors, so an implementation overrides only the entities it has rules
//! for. A [`ValidatorChain`] runs several validators and concatenates results.
pub mod rules;

use std::fmt;

use indexmap::IndexSet;
use serde::Serialize;

use crate::context::CompilationContext;
use crate::graph::{DeclId, SourcePosition};
use crate::ir::{Accessor, AccessorKind, DefinitionKind, TypeDefinition};
use crate::registry::{DiscoveryFailure, Registry};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationMessage {
    pub position: Option<SourcePosition>,
    /// Qualified name of whatever the message is about.
    pub subject: String,
    pub text: String,
}

impl fmt::Display for ValidationMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.position {
            Some(position) => write!(f, "{position}: {}", self.text),
            None => write!(f, "{}: {}", self.subject, self.text),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    errors: Vec<ValidationMessage>,
    warnings: Vec<ValidationMessage>,
}

impl ValidationResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_error(
        &mut self,
        position: Option<SourcePosition>,
        subject: impl Into<String>,
        text: impl Into<String>,
    ) {
        let (subject, text) = (subject.into(), text.into());
        self.errors.push(ValidationMessage { position, subject, text });
    }

    pub fn add_warning(
        &mut self,
        position: Option<SourcePosition>,
        subject: impl Into<String>,
        text: impl Into<String>,
    ) {
        let (subject, text) = (subject.into(), text.into());
        self.warnings.push(ValidationMessage { position, subject, text });
    }

    pub fn aggregate(&mut self, other: ValidationResult) {
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    pub fn errors(&self) -> &[ValidationMessage] {
        &self.errors
    }

    pub fn warnings(&self) -> &[ValidationMessage] {
        &self.warnings
    }
}

/// Appends the discovery trail to a message text.
pub fn with_trail(text: &str, trail: &[String]) -> String {
    if trail.is_empty() {
        return text.to_string();
    }
    format!("{text}\nThis was added to the model from {}", trail.join(" and from "))
}

/// What validators see: the graph, the configuration and the finished registry.
pub struct Model<'m, 'g> {
    pub cx: &'m CompilationContext<'g>,
    pub registry: &'m Registry,
}

impl Model<'_, '_> {
    /// Packages of the registered definitions, first-seen order.
    pub fn packages(&self) -> Vec<DeclId> {
        let packages: IndexSet<DeclId> = self
            .registry
            .all_definitions()
            .filter_map(|d| self.cx.graph.declaration(d.decl).package)
            .collect();
        packages.into_iter().collect()
    }
}

pub trait Validator {
    fn validate_package(&self, _model: &Model<'_, '_>, _package: DeclId) -> ValidationResult {
        ValidationResult::new()
    }

    fn validate_type_definition(
        &self,
        model: &Model<'_, '_>,
        def: &TypeDefinition,
    ) -> ValidationResult {
        walk_type_definition(self, model, def)
    }

    fn validate_complex_type(
        &self,
        _model: &Model<'_, '_>,
        _def: &TypeDefinition,
    ) -> ValidationResult {
        ValidationResult::new()
    }

    fn validate_simple_type(
        &self,
        _model: &Model<'_, '_>,
        _def: &TypeDefinition,
    ) -> ValidationResult {
        ValidationResult::new()
    }

    fn validate_enum_type(
        &self,
        _model: &Model<'_, '_>,
        _def: &TypeDefinition,
    ) -> ValidationResult {
        ValidationResult::new()
    }

    /// Rules shared by every accessor kind.
    fn validate_accessor(
        &self,
        _model: &Model<'_, '_>,
        _owner: &TypeDefinition,
        _accessor: &Accessor,
    ) -> ValidationResult {
        ValidationResult::new()
    }

    fn validate_attribute(
        &self,
        model: &Model<'_, '_>,
        owner: &TypeDefinition,
        accessor: &Accessor,
    ) -> ValidationResult {
        self.validate_accessor(model, owner, accessor)
    }

    fn validate_element(
        &self,
        model: &Model<'_, '_>,
        owner: &TypeDefinition,
        accessor: &Accessor,
    ) -> ValidationResult {
        self.validate_accessor(model, owner, accessor)
    }

    fn validate_value(
        &self,
        model: &Model<'_, '_>,
        owner: &TypeDefinition,
        accessor: &Accessor,
    ) -> ValidationResult {
        self.validate_accessor(model, owner, accessor)
    }

    /// A reference the registry could not follow.
    fn validate_discovery_failure(
        &self,
        _model: &Model<'_, '_>,
        _failure: &DiscoveryFailure,
    ) -> ValidationResult {
        ValidationResult::new()
    }
}

/// Kind-specific rules, then each accessor by kind.
pub fn walk_type_definition<V: Validator + ?Sized>(
    validator: &V,
    model: &Model<'_, '_>,
    def: &TypeDefinition,
) -> ValidationResult {
    let mut result = match def.kind {
        DefinitionKind::Complex => validator.validate_complex_type(model, def),
        DefinitionKind::Simple => validator.validate_simple_type(model, def),
        DefinitionKind::Enum => validator.validate_enum_type(model, def),
    };
    for accessor in def.accessors() {
        result.aggregate(walk_accessor(validator, model, def, accessor));
    }
    result
}

pub fn walk_accessor<V: Validator + ?Sized>(
    validator: &V,
    model: &Model<'_, '_>,
    owner: &TypeDefinition,
    accessor: &Accessor,
) -> ValidationResult {
    match accessor.kind {
        AccessorKind::Attribute => validator.validate_attribute(model, owner, accessor),
        AccessorKind::Element => validator.validate_element(model, owner, accessor),
        AccessorKind::Value => validator.validate_value(model, owner, accessor),
    }
}

/// Runs every validator for each entity.
#[derive(Default)]
pub struct ValidatorChain {
    validators: Vec<Box<dyn Validator>>,
}

impl ValidatorChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, validator: impl Validator + 'static) -> Self {
        self.validators.push(Box::new(validator));
        self
    }

    pub fn push(&mut self, validator: Box<dyn Validator>) {
        self.validators.push(validator);
    }

    pub fn len(&self) -> usize {
        self.validators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.validators.is_empty()
    }

    fn each(&self, f: impl Fn(&dyn Validator) -> ValidationResult) -> ValidationResult {
        let mut result = ValidationResult::new();
        for validator in &self.validators {
            result.aggregate(f(validator.as_ref()));
        }
        result
    }
}

impl Validator for ValidatorChain {
    fn validate_package(&self, model: &Model<'_, '_>, package: DeclId) -> ValidationResult {
        self.each(|v| v.validate_package(model, package))
    }

    // each validator walks the definition itself
    fn validate_type_definition(
        &self,
        model: &Model<'_, '_>,
        def: &TypeDefinition,
    ) -> ValidationResult {
        self.each(|v| v.validate_type_definition(model, def))
    }

    fn validate_complex_type(
        &self,
        model: &Model<'_, '_>,
        def: &TypeDefinition,
    ) -> ValidationResult {
        self.each(|v| v.validate_complex_type(model, def))
    }

    fn validate_simple_type(
        &self,
        model: &Model<'_, '_>,
        def: &TypeDefinition,
    ) -> ValidationResult {
        self.each(|v| v.validate_simple_type(model, def))
    }

    fn validate_enum_type(&self, model: &Model<'_, '_>, def: &TypeDefinition) -> ValidationResult {
        self.each(|v| v.validate_enum_type(model, def))
    }

    fn validate_accessor(
        &self,
        model: &Model<'_, '_>,
        owner: &TypeDefinition,
        accessor: &Accessor,
    ) -> ValidationResult {
        self.each(|v| v.validate_accessor(model, owner, accessor))
    }

    fn validate_attribute(
        &self,
        model: &Model<'_, '_>,
        owner: &TypeDefinition,
        accessor: &Accessor,
    ) -> ValidationResult {
        self.each(|v| v.validate_attribute(model, owner, accessor))
    }

    fn validate_element(
        &self,
        model: &Model<'_, '_>,
        owner: &TypeDefinition,
        accessor: &Accessor,
    ) -> ValidationResult {
        self.each(|v| v.validate_element(model, owner, accessor))
    }

    fn validate_value(
        &self,
        model: &Model<'_, '_>,
        owner: &TypeDefinition,
        accessor: &Accessor,
    ) -> ValidationResult {
        self.each(|v| v.validate_value(model, owner, accessor))
    }

    fn validate_discovery_failure(
        &self,
        model: &Model<'_, '_>,
        failure: &DiscoveryFailure,
    ) -> ValidationResult {
        self.each(|v| v.validate_discovery_failure(model, failure))
    }
}

/// The whole model: packages, definitions, then discovery failures. Never stops early.
pub fn validate_model(model: &Model<'_, '_>, validator: &dyn Validator) -> ValidationResult {
    let mut result = ValidationResult::new();
    for package in model.packages() {
        result.aggregate(validator.validate_package(model, package));
    }
    for def in model.registry.all_definitions() {
        result.aggregate(validator.validate_type_definition(model, def));
    }
    for failure in model.registry.failures() {
        result.aggregate(validator.validate_discovery_failure(model, failure));
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CompilerConfig;
    use crate::fixtures;
    use std::cell::RefCell;

    /// Records what it was asked about.
    #[derive(Default)]
    struct Recorder {
        seen: RefCell<Vec<String>>,
    }

    impl Validator for Recorder {
        fn validate_complex_type(
            &self,
            _model: &Model<'_, '_>,
            def: &TypeDefinition,
        ) -> ValidationResult {
            self.seen.borrow_mut().push(format!("complex {}", def.qualified_name));
            ValidationResult::new()
        }

        fn validate_accessor(
            &self,
            _model: &Model<'_, '_>,
            owner: &TypeDefinition,
            accessor: &Accessor,
        ) -> ValidationResult {
            let label = accessor.label(&owner.qualified_name);
            self.seen.borrow_mut().push(format!("accessor {label}"));
            ValidationResult::new()
        }
    }

    /// Flags every element.
    struct NoElements;

    impl Validator for NoElements {
        fn validate_element(
            &self,
            _model: &Model<'_, '_>,
            owner: &TypeDefinition,
            accessor: &Accessor,
        ) -> ValidationResult {
            let mut result = ValidationResult::new();
            let label = accessor.label(&owner.qualified_name);
            result.add_error(accessor.position.clone(), label, "no elements");
            result.add_warning(None, &owner.qualified_name, "had elements");
            result
        }
    }

    fn order_registry(
        graph: &crate::graph::model::ModelGraph,
        cx: &CompilationContext<'_>,
    ) -> Registry {
        use crate::graph::TypeGraph;
        let mut registry = Registry::new();
        registry.add_root(cx, graph.find_declaration("com.acme.Order").unwrap());
        registry
    }

    #[test]
    fn template_walks_definitions_then_accessors() {
        let graph = fixtures::order_model();
        let cx = CompilationContext::new(&graph, CompilerConfig::default());
        let registry = order_registry(&graph, &cx);
        let model = Model { cx: &cx, registry: &registry };
        let recorder = Recorder::default();
        let result = validate_model(&model, &recorder);
        assert!(!result.has_errors());
        assert_eq!(
            *recorder.seen.borrow(),
            [
                "complex com.acme.Order",
                "accessor com.acme.Order.items",
                "accessor com.acme.Order.total",
                "complex com.acme.LineItem",
                "accessor com.acme.LineItem.sku",
                "accessor com.acme.LineItem.qty",
            ]
        );
    }

    #[test]
    fn chain_concatenates_every_validator() {
        let graph = fixtures::order_model();
        let cx = CompilationContext::new(&graph, CompilerConfig::default());
        let registry = order_registry(&graph, &cx);
        let model = Model { cx: &cx, registry: &registry };
        let chain = ValidatorChain::new().with(NoElements).with(NoElements);
        assert_eq!(chain.len(), 2);
        let result = validate_model(&model, &chain);
        assert!(result.has_errors());
        assert_eq!(result.errors().len(), 8);
        assert_eq!(result.warnings().len(), 8);
        assert_eq!(result.errors()[0].to_string(), "com.acme.Order.items: no elements");
        assert!(ValidatorChain::new().is_empty());
        assert!(!validate_model(&model, &ValidatorChain::new()).has_errors());
    }

    #[test]
    fn warnings_alone_are_not_errors() {
        let mut result = ValidationResult::new();
        result.add_warning(None, "a.B", "suspicious");
        assert!(result.has_warnings());
        assert!(!result.has_errors());
        let mut other = ValidationResult::new();
        other.add_error(
            Some(SourcePosition { file: "B.java".into(), line: 4, column: 2 }),
            "a.B",
            "broken",
        );
        result.aggregate(other);
        assert!(result.has_errors());
        assert_eq!(result.errors()[0].to_string(), "B.java:4:2: broken");
    }

    #[test]
    fn trails_are_appended() {
        assert_eq!(with_trail("bad", &[]), "bad");
        assert_eq!(
            with_trail("bad", &["a.A.b".into(), "supertype of a.B".into()]),
            "bad\nThis was added to the model from a.A.b and from supertype of a.B"
        );
    }
}
