//! Schema-type compilation for annotated class models.
//!
//! A host [`graph::TypeGraph`] supplies declarations and types; a compilation
//! round classifies every reachable type into a [`ir::SchemaType`], registers
//! the composite ones as [`ir::TypeDefinition`]s and validates the result.
pub mod adapters;
pub mod classify;
pub mod cli;
pub mod compile;
pub mod config;
pub mod context;
pub mod decorate;
pub mod emit;
pub mod error;
pub mod graph;
pub mod ir;
pub mod path_de;
pub mod registry;
pub mod stack;
pub mod validation;
pub mod variables;

#[cfg(test)]
mod fixtures;

pub use compile::{compile, CompileOutcome, Compiler};
pub use config::CompilerConfig;
pub use error::{ClassificationError, CompileError, ModelError};
