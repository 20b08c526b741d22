use crate::block::BlockId;
use crate::function::{Function, InstSite};
use std::collections::{HashMap, HashSet, VecDeque};

/// Block-level reachability over a function's control-flow graph, derived
/// from the terminators. `reachable[b]` holds every block some path starting
/// at `b`'s terminator can enter; `b` itself is a member only when a cycle
/// leads back into it.
#[derive(Debug, Clone)]
pub struct ControlFlowGraph {
    reachable: HashMap<BlockId, HashSet<BlockId>>,
}

impl ControlFlowGraph {
    pub fn build(function: &Function) -> Self {
        let successors: HashMap<BlockId, Vec<BlockId>> = function
            .body
            .blocks
            .iter()
            .map(|(&id, block)| (id, block.successors()))
            .collect();

        let mut reachable = HashMap::new();
        for &block in function.body.blocks.keys() {
            let mut seen = HashSet::new();
            let mut worklist: VecDeque<BlockId> =
                successors.get(&block).into_iter().flatten().copied().collect();
            while let Some(next) = worklist.pop_front() {
                if seen.insert(next) {
                    if let Some(onward) = successors.get(&next) {
                        worklist.extend(onward.iter().copied());
                    }
                }
            }
            reachable.insert(block, seen);
        }

        Self { reachable }
    }

    pub fn block_reaches(&self, from: BlockId, to: BlockId) -> bool {
        self.reachable
            .get(&from)
            .map(|blocks| blocks.contains(&to))
            .unwrap_or(false)
    }

    /// Whether execution can flow from `from` to `to`: earlier in the same
    /// block, or through the terminator graph. A site later in the same
    /// block reaches an earlier one only if a back edge re-enters the block.
    pub fn site_reaches(&self, from: InstSite, to: InstSite) -> bool {
        if from.block == to.block && from.index < to.index {
            return true;
        }
        self.block_reaches(from.block, to.block)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::FunctionBuilder;
    use crate::types::Type;
    use crate::values::Value;

    #[test]
    fn straight_line_order_is_respected() {
        let mut fb = FunctionBuilder::new("f");
        fb.alloca(Type::Int(32));
        fb.alloca(Type::Int(32));
        fb.ret(None);
        let function = fb.build().unwrap();

        let cfg = ControlFlowGraph::build(&function);
        let entry = function.body.entry_block();
        let first = InstSite { block: entry, index: 0 };
        let second = InstSite { block: entry, index: 1 };
        assert!(cfg.site_reaches(first, second));
        assert!(!cfg.site_reaches(second, first));
        assert!(!cfg.block_reaches(entry, entry));
    }

    #[test]
    fn loops_make_blocks_self_reachable() {
        let mut fb = FunctionBuilder::new("f");
        let header = fb.create_block();
        let exit = fb.create_block();
        fb.jump(header);
        fb.switch_to_block(header).unwrap();
        let cond = fb.eq(Value::int(0, 32), Value::int(0, 32));
        fb.branch(cond, header, exit);
        fb.switch_to_block(exit).unwrap();
        fb.ret(None);
        let function = fb.build().unwrap();

        let cfg = ControlFlowGraph::build(&function);
        assert!(cfg.block_reaches(header, header));
        assert!(cfg.block_reaches(header, exit));
        assert!(!cfg.block_reaches(exit, header));

        // Within the looping block, a later site reaches an earlier one.
        let early = InstSite { block: header, index: 0 };
        let late = InstSite { block: header, index: 1 };
        assert!(cfg.site_reaches(late, early));
    }
}
