use provir_core::{BlockId, Function, GlobalId, Module, Value};
use std::collections::{HashMap, HashSet};

/// Assigns every value a stable, human-readable `<scope>::<identifier>`
/// name for one report invocation. Scope is the defining basic block for
/// temps and the function name for everything else (arguments, globals,
/// constants). Names are memoized, so the same value always maps to the
/// same string, and suffixed on collision, so two values never share one.
pub struct NameTable<'f> {
    function: &'f Function,
    global_names: HashMap<GlobalId, String>,
    def_blocks: HashMap<Value, BlockId>,
    names: HashMap<Value, String>,
    used: HashSet<String>,
}

impl<'f> NameTable<'f> {
    pub fn new(function: &'f Function) -> Self {
        let def_blocks = function
            .def_sites()
            .into_iter()
            .map(|(value, site)| (value, site.block))
            .collect();

        Self {
            function,
            global_names: HashMap::new(),
            def_blocks,
            names: HashMap::new(),
            used: HashSet::new(),
        }
    }

    /// Like [`new`](Self::new), but resolving global ids to their declared
    /// module names.
    pub fn with_module(module: &Module, function: &'f Function) -> Self {
        let mut table = Self::new(function);
        table.global_names = module
            .globals
            .iter()
            .map(|(&id, global)| (id, global.name.clone()))
            .collect();
        table
    }

    pub fn scope_block(&self, value: &Value) -> Option<BlockId> {
        if let Value::Store(site) = value {
            return Some(site.block);
        }
        self.def_blocks.get(value).copied()
    }

    pub fn name(&mut self, value: &Value) -> String {
        if let Some(existing) = self.names.get(value) {
            return existing.clone();
        }

        let scope = match self.scope_block(value) {
            Some(block) => block.to_string(),
            None => self.function.name().to_string(),
        };

        let ident = match value {
            Value::Temp(t) => t.to_string(),
            Value::Param(p) => self
                .function
                .param_name(*p)
                .map(str::to_string)
                .unwrap_or_else(|| p.to_string()),
            Value::Global(g) => self
                .global_names
                .get(g)
                .cloned()
                .unwrap_or_else(|| g.to_string()),
            Value::Constant(c) => c.to_string(),
            Value::Store(site) => format!("store.{}", site.index),
            Value::Undefined => "undef".to_string(),
        };

        let base = format!("{}::{}", scope, ident);
        let mut candidate = base.clone();
        let mut suffix = 1;
        while self.used.contains(&candidate) {
            candidate = format!("{}.{}", base, suffix);
            suffix += 1;
        }

        self.used.insert(candidate.clone());
        self.names.insert(value.clone(), candidate.clone());
        candidate
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use provir_core::{FunctionBuilder, Type};

    #[test]
    fn naming_is_idempotent() {
        let mut fb = FunctionBuilder::new("f");
        let x = fb.param("x", Type::Int(32));
        let y = fb.add(x.clone(), Value::int(1, 32), Type::Int(32));
        fb.ret(Some(y.clone()));
        let function = fb.build().unwrap();

        let mut names = NameTable::new(&function);
        assert_eq!(names.name(&y), names.name(&y));
        assert_eq!(names.name(&x), "f::x");
        assert_eq!(names.name(&y), "block0::t0");
        assert_eq!(names.name(&Value::int(1, 32)), "f::1i32");
    }

    #[test]
    fn distinct_values_never_collide() {
        let mut module = Module::new("m");
        let g = module.add_global("x", Type::ptr(Type::Int(32)));

        let mut fb = FunctionBuilder::new("f");
        let x = fb.param("x", Type::Int(32));
        fb.store(x.clone(), g.clone());
        fb.ret(None);
        module.add_function(fb.build().unwrap()).unwrap();
        let function = module.get_function("f").unwrap();

        // Both the argument and the global are named "x" in function scope.
        let mut names = NameTable::with_module(&module, function);
        let param_name = names.name(&x);
        let global_name = names.name(&g);
        assert_eq!(param_name, "f::x");
        assert_ne!(param_name, global_name);
        assert_eq!(global_name, names.name(&g));
    }

    #[test]
    fn store_nodes_are_scoped_to_their_block() {
        let mut fb = FunctionBuilder::new("f");
        let x = fb.param("x", Type::Int(32));
        let slot = fb.alloca(Type::Int(32));
        fb.store(x, slot);
        fb.ret(None);
        let function = fb.build().unwrap();

        let store_site = function
            .body
            .sites()
            .find(|(_, inst)| inst.is_store())
            .map(|(site, _)| site)
            .unwrap();

        let mut names = NameTable::new(&function);
        assert_eq!(names.name(&Value::Store(store_site)), "block0::store.1");
    }

    #[test]
    fn temps_are_scoped_to_their_defining_block() {
        let mut fb = FunctionBuilder::new("f");
        let exit = fb.create_block();
        let a = fb.alloca(Type::Int(32));
        fb.jump(exit);
        fb.switch_to_block(exit).unwrap();
        let b = fb.alloca(Type::Int(32));
        fb.ret(None);
        let function = fb.build().unwrap();

        let mut names = NameTable::new(&function);
        assert_eq!(names.name(&a), "block0::t0");
        assert_eq!(names.name(&b), "block1::t1");
    }
}
