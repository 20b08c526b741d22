use crate::function::Function;
use crate::types::Type;
use crate::values::{GlobalId, Value};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Global {
    pub name: String,
    pub ty: Type,
}

/// A translation unit: named globals plus the functions to analyze.
/// Functions are analyzed independently of one another; the module exists
/// so drivers can iterate them and resolve global names.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Module {
    pub name: String,
    pub globals: IndexMap<GlobalId, Global>,
    pub functions: IndexMap<String, Function>,
    next_global_id: u32,
}

impl Module {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            globals: IndexMap::new(),
            functions: IndexMap::new(),
            next_global_id: 0,
        }
    }

    pub fn add_global(&mut self, name: impl Into<String>, ty: Type) -> Value {
        let id = GlobalId(self.next_global_id);
        self.next_global_id += 1;
        self.globals.insert(
            id,
            Global {
                name: name.into(),
                ty,
            },
        );
        Value::Global(id)
    }

    pub fn global_name(&self, id: GlobalId) -> Option<&str> {
        self.globals.get(&id).map(|g| g.name.as_str())
    }

    pub fn add_function(&mut self, function: Function) -> crate::Result<()> {
        let name = function.name().to_string();
        if self.functions.contains_key(&name) {
            return Err(crate::ProvError::DuplicateFunction(name));
        }
        self.functions.insert(name, function);
        Ok(())
    }

    pub fn get_function(&self, name: &str) -> Option<&Function> {
        self.functions.get(name)
    }

    pub fn to_json(&self) -> crate::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(text: &str) -> crate::Result<Module> {
        Ok(serde_json::from_str(text)?)
    }
}
