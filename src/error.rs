//! Error taxonomy.
//!
//! - `ClassificationError`: a type cannot be mapped onto any schema type.
//! - `ModelError`: the host model document is malformed.
//! - `CompileError`: a compilation round failed (validation errors are fatal only
//!   after the whole model has been validated).
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClassificationError {
    #[error("void is not a valid schema type")]
    Void,
    #[error("{0}: an interface cannot be a schema type")]
    Interface(String),
    #[error("{0}: an annotation type cannot be a schema type")]
    AnnotationType(String),
    #[error("unknown schema type for class {0}")]
    Unknown(String),
    #[error("{0} is not an instance of an XML adapter")]
    NotAnAdapter(String),
    #[error("{0} must specify both a value type and a bound type")]
    AdapterArguments(String),
    #[error("adapter {adapter} does not adapt {ty}")]
    DoesNotAdapt { adapter: String, ty: String },
    #[error("an XML adapter can only adapt a declared type ({0} cannot be adapted)")]
    NotAdaptable(String),
    #[error("adapter chain through {0} is too deep")]
    AdapterChain(String),
    #[error("class not found: {0}")]
    Unresolved(String),
    #[error("problem with the {what}: {source}")]
    Within {
        what: &'static str,
        source: Box<ClassificationError>,
    },
}

impl ClassificationError {
    /// Wrap with a short description of the enclosing shape ("array component", "map key", ...).
    pub fn within(self, what: &'static str) -> Self {
        Self::Within { what, source: Box::new(self) }
    }

    /// The innermost error, without the shape context.
    pub fn root_cause(&self) -> &ClassificationError {
        match self {
            Self::Within { source, .. } => source.root_cause(),
            other => other,
        }
    }
}

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("malformed type signature `{signature}`: {reason}")]
    Signature { signature: String, reason: String },
    #[error("unknown type `{name}` (referenced from {from})")]
    UnknownType { name: String, from: String },
    #[error("duplicate declaration `{0}`")]
    Duplicate(String),
    #[error("{0}")]
    Json(String),
}

#[derive(Debug, Error)]
pub enum CompileError {
    #[error("there were validation errors ({errors} errors, {warnings} warnings)")]
    Validation { errors: usize, warnings: usize },
    #[error(transparent)]
    Model(#[from] ModelError),
}
