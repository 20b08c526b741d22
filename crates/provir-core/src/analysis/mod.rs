/*! Discover how information moves through a function.
 *
 * Provenance tracking starts from pairwise value-to-value flows: direct
 * operand dependence, and store-to-load dependence established by an alias
 * oracle. The flow finder builds that relation and computes transitive
 * closures from source calls to every sink their data eventually reaches.
 */

pub mod alias;
pub mod call_semantics;
pub mod control_flow;
pub mod flows;
pub mod memdep;
pub mod pass;

pub use alias::{AliasAnalysis, PointsTo};
pub use call_semantics::{CallSemantics, PosixCallSemantics};
pub use control_flow::ControlFlowGraph;
pub use flows::{FlowFinder, FlowKind, FlowSet};
pub use memdep::{AliasMemoryDependence, MemoryDependence};
pub use pass::{AnalysisPass, FlowAnalysis, FlowAnalysisPass, SourceSinkChain};
