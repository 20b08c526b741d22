/*! Unified interface for flow discovery.
 *
 * Single import for everything you need: building procedures, running the
 * flow analysis, and rendering graphs or reports from the results.
 */

pub use provir_core as core;
pub use provir_emit as emit;

pub use provir_core::{
    analysis::{
        AliasAnalysis, AnalysisPass, CallSemantics, FlowAnalysis, FlowAnalysisPass, FlowFinder,
        FlowKind, FlowSet, MemoryDependence, PosixCallSemantics, SourceSinkChain,
    },
    block::{BasicBlock, BlockId, Terminator},
    function::Function,
    instructions::Instruction,
    types::Type,
    values::Value,
    FunctionBuilder, Module,
};

pub use provir_emit::{DotEmitter, Emitter, FlowGraph, ModuleReport, NameTable};
