/*! Rendering for discovered flows: Graphviz DOT graphs for eyeballs, YAML
 * module reports for tooling. Everything here is pure formatting over the
 * analysis results; no analytic decisions are made in this crate.
 */

pub mod dot;
pub mod emitter;
pub mod naming;
pub mod report;

pub use dot::{DotEmitter, FlowGraph};
pub use emitter::{EmitContext, EmitResult, Emitter};
pub use naming::NameTable;
pub use report::{
    ArgumentEntry, BlockEntry, ChainEntry, EdgeEntry, InstructionEntry, ModuleReport,
    ProcedureReport, ReportEmitter,
};
