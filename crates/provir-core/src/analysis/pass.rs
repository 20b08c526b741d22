use crate::analysis::call_semantics::CallSemantics;
use crate::analysis::flows::{FlowFinder, FlowSet};
use crate::analysis::memdep::AliasMemoryDependence;
use crate::function::Function;
use crate::values::Value;
use anyhow::Result;
use std::collections::HashSet;

/// A named analysis over one function. Drivers run passes uniformly across
/// a module; each function's analysis is independent of every other's.
pub trait AnalysisPass {
    type Output;

    fn name(&self) -> &'static str;

    fn analyze(&self, function: &Function) -> Result<Self::Output>;
}

/// Everything the driver wants per function: the pairwise flow set plus
/// the source-to-sink chains discovered over its transitive closure.
#[derive(Debug, Clone)]
pub struct FlowAnalysis {
    pub flows: FlowSet,
    pub chains: Vec<SourceSinkChain>,
}

/// One source call and every sink-argument value its output eventually
/// reaches. Sinks are unordered; emitters sort by name before printing.
#[derive(Debug, Clone)]
pub struct SourceSinkChain {
    pub source: Value,
    pub sinks: HashSet<Value>,
}

/// Builds the flow set with an alias-based memory-dependence oracle, then
/// runs the closure search from every source call the injected semantics
/// recognizes.
pub struct FlowAnalysisPass<S: CallSemantics> {
    semantics: S,
}

impl<S: CallSemantics> FlowAnalysisPass<S> {
    pub fn new(semantics: S) -> Self {
        Self { semantics }
    }

    pub fn semantics(&self) -> &S {
        &self.semantics
    }
}

impl<S: CallSemantics> AnalysisPass for FlowAnalysisPass<S> {
    type Output = FlowAnalysis;

    fn name(&self) -> &'static str {
        "flow-analysis"
    }

    fn analyze(&self, function: &Function) -> Result<FlowAnalysis> {
        let memdep = AliasMemoryDependence::new(function);
        let finder = FlowFinder::new(&self.semantics);
        let flows = finder.find_pairwise(function, &memdep);

        let mut sink_args: HashSet<Value> = HashSet::new();
        for (_, inst) in function.body.sites() {
            let Some(call) = inst.as_call() else {
                continue;
            };
            if !self.semantics.can_sink(&call) {
                continue;
            }
            for (index, arg) in call.args.iter().enumerate() {
                if self.semantics.sink_argument(&call, index) {
                    sink_args.insert(arg.clone());
                }
            }
        }

        let mut chains = Vec::new();
        for (_, inst) in function.body.sites() {
            let Some(call) = inst.as_call() else {
                continue;
            };
            if !self.semantics.is_source(&call) {
                continue;
            }
            let sinks = finder.find_eventual(&flows, call.result, |v| sink_args.contains(v));
            if !sinks.is_empty() {
                chains.push(SourceSinkChain {
                    source: call.result.clone(),
                    sinks,
                });
            }
        }

        Ok(FlowAnalysis { flows, chains })
    }
}
