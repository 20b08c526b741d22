use crate::analysis::call_semantics::CallSemantics;
use crate::analysis::memdep::MemoryDependence;
use crate::function::{Function, InstSite};
use crate::instructions::Instruction;
use crate::values::Value;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet, VecDeque};

/// Ways information can flow between values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FlowKind {
    /// Direct operand relationship, e.g. `a + b` or a gep base.
    Operand,
    /// Indirect flow through memory, from a stored value to a load.
    Memory,
    /// Summary of a possibly multi-hop flow, collapsed to one edge.
    /// Never produced by [`FlowFinder::find_pairwise`]; reserved for
    /// summarization passes.
    Meta,
}

impl FlowKind {
    pub fn label(&self) -> &'static str {
        match self {
            FlowKind::Operand => "operand",
            FlowKind::Memory => "memory",
            FlowKind::Meta => "meta",
        }
    }
}

impl std::fmt::Display for FlowKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// All pairwise flows discovered in one function: a multimap keyed by the
/// destination value, since one value may receive flows from many sources
/// (a phi merging predecessors, an instruction with several operands).
/// Insertion order is preserved so output is deterministic run to run.
#[derive(Debug, Clone, Default)]
pub struct FlowSet {
    edges: IndexMap<Value, Vec<(Value, FlowKind)>>,
}

impl FlowSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, dest: Value, source: Value, kind: FlowKind) {
        self.edges.entry(dest).or_default().push((source, kind));
    }

    pub fn sources_of(&self, dest: &Value) -> &[(Value, FlowKind)] {
        self.edges.get(dest).map(|v| v.as_slice()).unwrap_or(&[])
    }

    /// All edges as (destination, source, kind) triples.
    pub fn iter(&self) -> impl Iterator<Item = (&Value, &Value, FlowKind)> {
        self.edges
            .iter()
            .flat_map(|(dest, sources)| sources.iter().map(move |(src, kind)| (dest, src, *kind)))
    }

    pub fn destinations(&self) -> impl Iterator<Item = &Value> {
        self.edges.keys()
    }

    /// Total edge count.
    pub fn len(&self) -> usize {
        self.edges.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    pub fn contains(&self, dest: &Value, source: &Value, kind: FlowKind) -> bool {
        self.sources_of(dest)
            .iter()
            .any(|(s, k)| s == source && *k == kind)
    }

    /// Index from source to destinations, for forward expansion.
    fn forward_index(&self) -> HashMap<Value, Vec<Value>> {
        let mut forward: HashMap<Value, Vec<Value>> = HashMap::new();
        for (dest, src, _) in self.iter() {
            forward.entry(src.clone()).or_default().push(dest.clone());
        }
        forward
    }
}

/// Discovers intraprocedural data flows: pairwise operand/memory edges per
/// function, and transitive closures from a source value to every sink
/// satisfying a predicate.
pub struct FlowFinder<'a> {
    semantics: &'a dyn CallSemantics,
}

impl<'a> FlowFinder<'a> {
    pub fn new(semantics: &'a dyn CallSemantics) -> Self {
        Self { semantics }
    }

    pub fn semantics(&self) -> &dyn CallSemantics {
        self.semantics
    }

    /// Find all pairwise flows within a function. A function with no flows
    /// yields an empty set; that is a result, not an error.
    pub fn find_pairwise(
        &self,
        function: &Function,
        memdep: &dyn MemoryDependence,
    ) -> FlowSet {
        let mut flows = FlowSet::new();
        for (site, inst) in function.body.sites() {
            self.collect_pairwise(function, site, inst, memdep, &mut flows);
        }
        flows
    }

    fn collect_pairwise(
        &self,
        function: &Function,
        site: InstSite,
        inst: &Instruction,
        memdep: &dyn MemoryDependence,
        flows: &mut FlowSet,
    ) {
        // Stores define no result, so they get a site-addressed node
        // instead; their operands still point at them like any other
        // instruction's.
        let dest = match inst.result() {
            Some(result) => result.clone(),
            None if inst.is_store() => Value::Store(site),
            None => return,
        };

        for operand in inst.operands() {
            if operand.is_tracked() {
                flows.add(dest.clone(), operand.clone(), FlowKind::Operand);
            }
        }

        // Memory edges skip the store node: they run from the value a
        // writer pushed into memory straight to the reader.
        if inst.is_load() || inst.as_call().is_some() {
            for writer_site in memdep.dependencies(function, site) {
                let written = function
                    .body
                    .instruction_at(writer_site)
                    .and_then(Instruction::written_value);
                if let Some(source) = written {
                    if source.is_tracked() {
                        flows.add(dest.clone(), source.clone(), FlowKind::Memory);
                    }
                }
            }
        }
    }

    /// Find every value reachable from `source` along the transitive
    /// closure of flow edges that satisfies `is_sink`. The search does not
    /// stop at the first satisfying value: a sink is recorded and then
    /// expanded like any other value, so in
    ///
    /// ```text
    /// [source] -> a -> b -> [sink1] -> c -> d -> [sink2]
    /// ```
    ///
    /// both sink1 and sink2 are returned. Cycles (loop-carried phis) are
    /// handled by expanding each value at most once.
    pub fn find_eventual<P>(&self, flows: &FlowSet, source: &Value, is_sink: P) -> HashSet<Value>
    where
        P: Fn(&Value) -> bool,
    {
        let forward = flows.forward_index();

        let mut sinks = HashSet::new();
        let mut seen = HashSet::new();
        let mut worklist = VecDeque::new();

        seen.insert(source.clone());
        worklist.push_back(source.clone());

        while let Some(current) = worklist.pop_front() {
            let Some(nexts) = forward.get(&current) else {
                continue;
            };
            for next in nexts {
                if is_sink(next) {
                    sinks.insert(next.clone());
                }
                if seen.insert(next.clone()) {
                    worklist.push_back(next.clone());
                }
            }
        }

        sinks
    }
}
