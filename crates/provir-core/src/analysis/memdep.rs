use crate::analysis::alias::AliasAnalysis;
use crate::analysis::control_flow::ControlFlowGraph;
use crate::function::{Function, InstSite};
use crate::instructions::Instruction;
use crate::values::Value;

/// Oracle answering which memory-writing instructions a memory-reading
/// instruction may depend on. Implementations are read-only; the flow
/// finder issues one query per memory-reading instruction and never caches
/// across functions.
pub trait MemoryDependence {
    fn dependencies(&self, function: &Function, site: InstSite) -> Vec<InstSite>;
}

/// Alias-based implementation: a store reaches a load when their addresses
/// may alias and some control path runs from the store to the load. Calls
/// count as readers and writers through their pointer-like arguments. The
/// aliasing side over-approximates; a sharper oracle can replace this
/// behind the same trait.
pub struct AliasMemoryDependence {
    alias: AliasAnalysis,
    cfg: ControlFlowGraph,
}

impl AliasMemoryDependence {
    pub fn new(function: &Function) -> Self {
        Self {
            alias: AliasAnalysis::build(function),
            cfg: ControlFlowGraph::build(function),
        }
    }

    pub fn alias(&self) -> &AliasAnalysis {
        &self.alias
    }

    fn read_addresses<'f>(&self, inst: &'f Instruction) -> Vec<&'f Value> {
        match inst {
            Instruction::Load { address, .. } => vec![address],
            Instruction::Call { args, .. } => args
                .iter()
                .filter(|arg| self.alias.is_pointer_like(arg))
                .collect(),
            _ => Vec::new(),
        }
    }

    fn write_addresses<'f>(&self, inst: &'f Instruction) -> Vec<&'f Value> {
        match inst {
            Instruction::Store { address, .. } => vec![address],
            Instruction::Call { args, .. } => args
                .iter()
                .filter(|arg| self.alias.is_pointer_like(arg))
                .collect(),
            _ => Vec::new(),
        }
    }
}

impl MemoryDependence for AliasMemoryDependence {
    fn dependencies(&self, function: &Function, site: InstSite) -> Vec<InstSite> {
        let Some(reader) = function.body.instruction_at(site) else {
            return Vec::new();
        };
        let reads = self.read_addresses(reader);
        if reads.is_empty() {
            return Vec::new();
        }

        let mut writers = Vec::new();
        for (writer_site, writer) in function.body.sites() {
            if writer_site == site || !self.cfg.site_reaches(writer_site, site) {
                continue;
            }
            let writes = self.write_addresses(writer);
            if writes
                .iter()
                .any(|w| reads.iter().any(|r| self.alias.may_alias(r, w)))
            {
                writers.push(writer_site);
            }
        }
        writers
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::FunctionBuilder;
    use crate::types::Type;

    fn load_site(function: &Function) -> InstSite {
        function
            .body
            .sites()
            .find(|(_, inst)| inst.is_load())
            .map(|(site, _)| site)
            .expect("function has a load")
    }

    #[test]
    fn store_reaches_aliasing_load() {
        let mut fb = FunctionBuilder::new("f");
        let slot = fb.alloca(Type::Int(32));
        fb.store(Value::int(7, 32), slot.clone());
        let _ = fb.load(slot, Type::Int(32));
        fb.ret(None);
        let function = fb.build().unwrap();

        let memdep = AliasMemoryDependence::new(&function);
        let deps = memdep.dependencies(&function, load_site(&function));
        assert_eq!(deps.len(), 1);
        assert!(function.body.instruction_at(deps[0]).unwrap().is_store());
    }

    #[test]
    fn unrelated_store_is_not_a_dependency() {
        let mut fb = FunctionBuilder::new("f");
        let a = fb.alloca(Type::Int(32));
        let b = fb.alloca(Type::Int(32));
        fb.store(Value::int(1, 32), a);
        let _ = fb.load(b, Type::Int(32));
        fb.ret(None);
        let function = fb.build().unwrap();

        let memdep = AliasMemoryDependence::new(&function);
        assert!(memdep
            .dependencies(&function, load_site(&function))
            .is_empty());
    }

    #[test]
    fn call_with_pointer_argument_clobbers() {
        let mut fb = FunctionBuilder::new("f");
        let buf = fb.alloca(Type::Array(Box::new(Type::Int(8)), 64));
        fb.call("fill", vec![buf.clone()], Type::Void);
        let _ = fb.load(buf, Type::Int(8));
        fb.ret(None);
        let function = fb.build().unwrap();

        let memdep = AliasMemoryDependence::new(&function);
        let deps = memdep.dependencies(&function, load_site(&function));
        assert_eq!(deps.len(), 1);
        assert!(function
            .body
            .instruction_at(deps[0])
            .unwrap()
            .as_call()
            .is_some());
    }

    #[test]
    fn later_store_is_not_a_dependency() {
        let mut fb = FunctionBuilder::new("f");
        let x = fb.param("x", Type::Int(32));
        let slot = fb.alloca(Type::Int(32));
        let _ = fb.load(slot.clone(), Type::Int(32));
        fb.store(x, slot);
        fb.ret(None);
        let function = fb.build().unwrap();

        // Straight-line code: no path runs from the store back to the load.
        let memdep = AliasMemoryDependence::new(&function);
        assert!(memdep
            .dependencies(&function, load_site(&function))
            .is_empty());
    }

    #[test]
    fn loop_back_edge_makes_a_later_store_reach() {
        let mut fb = FunctionBuilder::new("f");
        let x = fb.param("x", Type::Int(32));
        let header = fb.create_block();
        let exit = fb.create_block();
        let slot = fb.alloca(Type::Int(32));
        fb.jump(header);
        fb.switch_to_block(header).unwrap();
        let loaded = fb.load(slot.clone(), Type::Int(32));
        fb.store(x, slot);
        let cond = fb.lt(loaded, Value::int(10, 32));
        fb.branch(cond, header, exit);
        fb.switch_to_block(exit).unwrap();
        fb.ret(None);
        let function = fb.build().unwrap();

        let memdep = AliasMemoryDependence::new(&function);
        let deps = memdep.dependencies(&function, load_site(&function));
        assert_eq!(deps.len(), 1);
        assert!(function.body.instruction_at(deps[0]).unwrap().is_store());
    }

    #[test]
    fn non_reader_has_no_dependencies() {
        let mut fb = FunctionBuilder::new("f");
        let x = fb.param("x", Type::Int(32));
        let _ = fb.add(x.clone(), x, Type::Int(32));
        fb.ret(None);
        let function = fb.build().unwrap();

        let memdep = AliasMemoryDependence::new(&function);
        let site = function.body.sites().next().unwrap().0;
        assert!(memdep.dependencies(&function, site).is_empty());
    }
}
