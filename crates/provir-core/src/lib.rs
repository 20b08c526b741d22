/*! Core IR types and intraprocedural data-flow analyses.
 *
 * Tracking data provenance requires knowing, inside each procedure, how
 * values feed one another: directly as operands and indirectly through
 * memory. This crate provides the IR to express procedures, builders to
 * construct them, and the analyses that turn a function into a flow graph
 * with source-to-sink closures over it.
 */

pub mod analysis;
pub mod block;
pub mod builder;
pub mod function;
pub mod instructions;
pub mod module;
pub mod types;
pub mod values;

pub use block::{BasicBlock, BlockId, Terminator};
pub use builder::FunctionBuilder;
pub use function::{Function, FunctionBody, FunctionSignature, InstSite, Parameter};
pub use instructions::{Callee, CallSite, Instruction};
pub use module::{Global, Module};
pub use types::Type;
pub use values::{Constant, GlobalId, ParamId, TempId, Value};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProvError {
    #[error("Builder error: {0}")]
    Builder(String),
    #[error("Duplicate function: {0}")]
    DuplicateFunction(String),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ProvError>;
