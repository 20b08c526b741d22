use indexmap::IndexMap;
use provir_core::analysis::{AnalysisPass, FlowAnalysisPass, PosixCallSemantics};
use provir_core::{FunctionBuilder, Module, Type, Value};
use provir_emit::{DotEmitter, Emitter, FlowGraph, ModuleReport};

fn relay_module() -> Module {
    let mut module = Module::new("m");
    let g = module.add_global("shared", Type::ptr(Type::Int(64)));

    let mut fb = FunctionBuilder::new("relay");
    let fd = fb.param("fd", Type::Int(32));
    let done = fb.create_block();

    let n = fb.call(
        "read",
        vec![fd.clone(), g.clone(), Value::int(64, 64)],
        Type::Int(64),
    );
    fb.store(n.clone(), g.clone());
    let ok = fb.lt(Value::int(0, 64), n);
    fb.branch(ok, done, done);

    fb.switch_to_block(done).unwrap();
    let data = fb.load(g, Type::Int(64));
    fb.call(
        "write",
        vec![Value::int(1, 32), data, Value::int(8, 64)],
        Type::Int(64),
    );
    fb.ret(None);
    module.add_function(fb.build().unwrap()).unwrap();
    module
}

#[test]
fn dot_and_report_agree_on_names() {
    let module = relay_module();
    let function = module.get_function("relay").unwrap();
    let analysis = FlowAnalysisPass::new(PosixCallSemantics)
        .analyze(function)
        .unwrap();

    let dot = DotEmitter::with_blocks(true)
        .emit_to_string(&FlowGraph::with_module(&module, function, &analysis.flows))
        .unwrap();
    assert!(dot.contains("subgraph \"cluster_block0\""));
    assert!(dot.contains("subgraph \"cluster_block1\""));
    assert!(dot.contains("relay::fd"));

    let mut analyses = IndexMap::new();
    analyses.insert("relay".to_string(), analysis);
    let report = ModuleReport::build(&module, &analyses);
    let proc = &report.procedures["relay"];

    // Every flow endpoint named in the report also appears in the graph.
    for edge in &proc.flows {
        assert!(dot.contains(&edge.from), "missing {}", edge.from);
        assert!(dot.contains(&edge.to), "missing {}", edge.to);
    }
    assert!(proc.blocks.contains_key("block0"));
    assert!(proc.blocks.contains_key("block1"));
    assert_eq!(proc.chains.len(), 1);
}

#[test]
fn report_round_trips_through_yaml() {
    let module = relay_module();
    let function = module.get_function("relay").unwrap();
    let analysis = FlowAnalysisPass::new(PosixCallSemantics)
        .analyze(function)
        .unwrap();

    let mut analyses = IndexMap::new();
    analyses.insert("relay".to_string(), analysis);
    let report = ModuleReport::build(&module, &analyses);

    let yaml = report.to_yaml().unwrap();
    let parsed: ModuleReport = serde_yaml::from_str(&yaml).unwrap();
    assert_eq!(
        parsed.procedures["relay"].flows.len(),
        report.procedures["relay"].flows.len()
    );
    assert_eq!(
        parsed.procedures["relay"].arguments.keys().collect::<Vec<_>>(),
        report.procedures["relay"].arguments.keys().collect::<Vec<_>>()
    );
}
