use crate::emitter::{EmitContext, EmitResult, Emitter};
use crate::naming::NameTable;
use indexmap::{IndexMap, IndexSet};
use provir_core::analysis::{FlowKind, FlowSet};
use provir_core::{BlockId, Function, Module, Value};
use std::io::Write;

/// A function's discovered flows, paired with the IR they came from so the
/// renderer can resolve names and block membership.
pub struct FlowGraph<'a> {
    pub function: &'a Function,
    pub flows: &'a FlowSet,
    module: Option<&'a Module>,
}

impl<'a> FlowGraph<'a> {
    pub fn new(function: &'a Function, flows: &'a FlowSet) -> Self {
        Self {
            function,
            flows,
            module: None,
        }
    }

    pub fn with_module(module: &'a Module, function: &'a Function, flows: &'a FlowSet) -> Self {
        Self {
            function,
            flows,
            module: Some(module),
        }
    }

    fn name_table(&self) -> NameTable<'a> {
        match self.module {
            Some(module) => NameTable::with_module(module, self.function),
            None => NameTable::new(self.function),
        }
    }
}

/// Renders a [`FlowGraph`] as Graphviz DOT. Each value becomes a node
/// labelled with its qualified name; each flow edge becomes a directed
/// edge from source to destination, labelled with its kind. With
/// `show_blocks` enabled, temps are grouped into one cluster per basic
/// block.
pub struct DotEmitter {
    pub show_blocks: bool,
}

impl DotEmitter {
    pub fn new() -> Self {
        Self { show_blocks: false }
    }

    pub fn with_blocks(show_blocks: bool) -> Self {
        Self { show_blocks }
    }

    fn edge_attrs(kind: FlowKind) -> String {
        match kind {
            FlowKind::Operand => format!("label=\"{}\"", kind.label()),
            FlowKind::Memory => format!("label=\"{}\", style=dashed", kind.label()),
            FlowKind::Meta => format!("label=\"{}\", style=dotted", kind.label()),
        }
    }
}

impl Default for DotEmitter {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> Emitter<FlowGraph<'a>> for DotEmitter {
    fn emit<W: Write>(
        &self,
        graph: &FlowGraph<'a>,
        writer: &mut W,
        context: &mut EmitContext,
    ) -> EmitResult {
        let mut names = graph.name_table();

        // Every value that participates in at least one edge, in first-seen
        // order so node ids are stable across runs.
        let mut values: IndexSet<&Value> = IndexSet::new();
        for (dest, src, _) in graph.flows.iter() {
            values.insert(src);
            values.insert(dest);
        }

        let node_id = |index: usize| format!("n{}", index);

        context.write_line(
            writer,
            &format!("digraph \"{}\" {{", escape(graph.function.name())),
        )?;
        context.indent();
        context.write_line(writer, "node [shape=box];")?;
        context.write_line(
            writer,
            &format!("label=\"{}\";", escape(graph.function.name())),
        )?;

        if self.show_blocks {
            // Temps clustered by defining block; everything else floats at
            // the top level.
            let mut clusters: IndexMap<BlockId, Vec<usize>> = IndexMap::new();
            let mut loose: Vec<usize> = Vec::new();
            for (index, value) in values.iter().enumerate() {
                match names.scope_block(value) {
                    Some(block) => clusters.entry(block).or_default().push(index),
                    None => loose.push(index),
                }
            }

            for (block, members) in &clusters {
                context.write_line(writer, &format!("subgraph \"cluster_{}\" {{", block))?;
                context.indent();
                context.write_line(writer, &format!("label=\"{}\";", block))?;
                for &index in members {
                    let label = names.name(values[index]);
                    context.write_line(
                        writer,
                        &format!("{} [label=\"{}\"];", node_id(index), escape(&label)),
                    )?;
                }
                context.dedent();
                context.write_line(writer, "}")?;
            }
            for index in loose {
                let label = names.name(values[index]);
                context.write_line(
                    writer,
                    &format!("{} [label=\"{}\"];", node_id(index), escape(&label)),
                )?;
            }
        } else {
            for (index, value) in values.iter().enumerate() {
                let label = names.name(value);
                context.write_line(
                    writer,
                    &format!("{} [label=\"{}\"];", node_id(index), escape(&label)),
                )?;
            }
        }

        for (dest, src, kind) in graph.flows.iter() {
            let from = values.get_index_of(src).unwrap_or_default();
            let to = values.get_index_of(dest).unwrap_or_default();
            context.write_line(
                writer,
                &format!(
                    "{} -> {} [{}];",
                    node_id(from),
                    node_id(to),
                    Self::edge_attrs(kind)
                ),
            )?;
        }

        context.dedent();
        context.write_line(writer, "}")?;
        Ok(())
    }
}

fn escape(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"")
}

#[cfg(test)]
mod tests {
    use super::*;
    use provir_core::analysis::{AliasMemoryDependence, FlowFinder, PosixCallSemantics};
    use provir_core::{FunctionBuilder, Type};

    fn pairwise(function: &Function) -> FlowSet {
        let memdep = AliasMemoryDependence::new(function);
        FlowFinder::new(&PosixCallSemantics).find_pairwise(function, &memdep)
    }

    fn sample() -> (Function, FlowSet) {
        let mut fb = FunctionBuilder::new("f");
        let x = fb.param("x", Type::Int(32));
        let y = fb.add(x, Value::int(1, 32), Type::Int(32));
        fb.ret(Some(y));
        let function = fb.build().unwrap();
        let flows = pairwise(&function);
        (function, flows)
    }

    #[test]
    fn renders_nodes_and_labelled_edges() {
        let (function, flows) = sample();
        let dot = DotEmitter::new()
            .emit_to_string(&FlowGraph::new(&function, &flows))
            .unwrap();

        assert!(dot.starts_with("digraph \"f\" {"));
        assert!(dot.contains("[label=\"f::x\"]"));
        assert!(dot.contains("[label=\"block0::t0\"]"));
        assert!(dot.contains("label=\"operand\""));
        assert!(dot.trim_end().ends_with('}'));
    }

    #[test]
    fn clusters_temps_when_blocks_are_shown() {
        let (function, flows) = sample();
        let dot = DotEmitter::with_blocks(true)
            .emit_to_string(&FlowGraph::new(&function, &flows))
            .unwrap();

        assert!(dot.contains("subgraph \"cluster_block0\""));
        // The argument is not defined by any block, so it stays outside.
        let cluster_start = dot.find("subgraph").unwrap();
        let cluster_end = cluster_start + dot[cluster_start..].find('}').unwrap();
        assert!(!dot[cluster_start..cluster_end].contains("f::x"));
    }

    #[test]
    fn memory_edges_are_dashed() {
        let mut fb = FunctionBuilder::new("g");
        let x = fb.param("x", Type::Int(32));
        let slot = fb.alloca(Type::Int(32));
        fb.store(x, slot.clone());
        let loaded = fb.load(slot, Type::Int(32));
        fb.ret(Some(loaded));
        let function = fb.build().unwrap();
        let flows = pairwise(&function);

        let dot = DotEmitter::new()
            .emit_to_string(&FlowGraph::new(&function, &flows))
            .unwrap();
        assert!(dot.contains("style=dashed"));
    }

    #[test]
    fn quotes_in_names_are_escaped() {
        assert_eq!(escape("a\"b"), "a\\\"b");
        assert_eq!(escape("a\\b"), "a\\\\b");
    }
}
