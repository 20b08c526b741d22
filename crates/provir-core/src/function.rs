use crate::block::{BasicBlock, BlockId};
use crate::instructions::Instruction;
use crate::types::Type;
use crate::values::{ParamId, Value};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Address of one instruction within a function body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct InstSite {
    pub block: BlockId,
    pub index: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Function {
    pub signature: FunctionSignature,
    pub body: FunctionBody,
}

impl Function {
    pub fn new(signature: FunctionSignature) -> Self {
        Self {
            signature,
            body: FunctionBody::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.signature.name
    }

    pub fn param_value(&self, index: usize) -> Value {
        Value::Param(ParamId(index as u32))
    }

    pub fn param_name(&self, id: ParamId) -> Option<&str> {
        self.signature
            .params
            .get(id.0 as usize)
            .map(|p| p.name.as_str())
    }

    /// Map every defined value to the site of its defining instruction.
    pub fn def_sites(&self) -> HashMap<Value, InstSite> {
        let mut sites = HashMap::new();
        for (site, inst) in self.body.sites() {
            if let Some(result) = inst.result() {
                sites.insert(result.clone(), site);
            }
        }
        sites
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionSignature {
    pub name: String,
    pub params: Vec<Parameter>,
    pub return_type: Type,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    pub ty: Type,
}

impl Parameter {
    pub fn new(name: impl Into<String>, ty: Type) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionBody {
    pub entry_block: BlockId,
    pub blocks: IndexMap<BlockId, BasicBlock>,
    next_block_id: u32,
}

impl FunctionBody {
    pub fn new() -> Self {
        let entry_block = BlockId(0);
        let mut blocks = IndexMap::new();
        blocks.insert(entry_block, BasicBlock::new(entry_block));

        Self {
            entry_block,
            blocks,
            next_block_id: 1,
        }
    }

    pub fn create_block(&mut self) -> BlockId {
        let id = BlockId(self.next_block_id);
        self.next_block_id += 1;
        self.blocks.insert(id, BasicBlock::new(id));
        id
    }

    pub fn entry_block(&self) -> BlockId {
        self.entry_block
    }

    pub fn get_block(&self, id: BlockId) -> Option<&BasicBlock> {
        self.blocks.get(&id)
    }

    pub fn get_block_mut(&mut self, id: BlockId) -> Option<&mut BasicBlock> {
        self.blocks.get_mut(&id)
    }

    /// Iterate every instruction with its site, in block insertion order.
    pub fn sites(&self) -> impl Iterator<Item = (InstSite, &Instruction)> {
        self.blocks.iter().flat_map(|(&block, bb)| {
            bb.instructions
                .iter()
                .enumerate()
                .map(move |(index, inst)| (InstSite { block, index }, inst))
        })
    }

    pub fn instruction_at(&self, site: InstSite) -> Option<&Instruction> {
        self.blocks
            .get(&site.block)
            .and_then(|bb| bb.instructions.get(site.index))
    }
}

impl Default for FunctionBody {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::FunctionBuilder;

    #[test]
    fn sites_walk_every_instruction() {
        let mut fb = FunctionBuilder::new("f");
        let x = fb.param("x", Type::Int(32));
        let y = fb.add(x.clone(), Value::int(1, 32), Type::Int(32));
        fb.ret(Some(y.clone()));
        let function = fb.build().unwrap();

        let sites: Vec<_> = function.body.sites().collect();
        assert_eq!(sites.len(), 1);
        assert_eq!(sites[0].0, InstSite { block: BlockId(0), index: 0 });

        let defs = function.def_sites();
        assert_eq!(defs.get(&y), Some(&sites[0].0));
        assert!(defs.get(&x).is_none());
    }
}
