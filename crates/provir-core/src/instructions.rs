use crate::block::BlockId;
use crate::types::Type;
use crate::values::Value;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Instruction {
    Add {
        result: Value,
        left: Value,
        right: Value,
        ty: Type,
    },
    Sub {
        result: Value,
        left: Value,
        right: Value,
        ty: Type,
    },
    Mul {
        result: Value,
        left: Value,
        right: Value,
        ty: Type,
    },
    Div {
        result: Value,
        left: Value,
        right: Value,
        ty: Type,
    },

    And {
        result: Value,
        left: Value,
        right: Value,
    },
    Or {
        result: Value,
        left: Value,
        right: Value,
    },
    Xor {
        result: Value,
        left: Value,
        right: Value,
    },
    Not {
        result: Value,
        operand: Value,
    },

    Eq {
        result: Value,
        left: Value,
        right: Value,
    },
    Ne {
        result: Value,
        left: Value,
        right: Value,
    },
    Lt {
        result: Value,
        left: Value,
        right: Value,
    },
    Le {
        result: Value,
        left: Value,
        right: Value,
    },
    Gt {
        result: Value,
        left: Value,
        right: Value,
    },
    Ge {
        result: Value,
        left: Value,
        right: Value,
    },

    Select {
        result: Value,
        condition: Value,
        then_val: Value,
        else_val: Value,
        ty: Type,
    },

    Gep {
        result: Value,
        base: Value,
        indices: Vec<Value>,
        ty: Type,
    },
    Alloca {
        result: Value,
        ty: Type,
    },
    Load {
        result: Value,
        address: Value,
        ty: Type,
    },
    Store {
        address: Value,
        value: Value,
    },

    Cast {
        result: Value,
        value: Value,
        to: Type,
    },

    Phi {
        result: Value,
        incoming: Vec<(BlockId, Value)>,
        ty: Type,
    },

    Call {
        result: Value,
        callee: Callee,
        args: Vec<Value>,
        ty: Type,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Callee {
    Direct(String),
    Indirect(Value),
}

impl std::fmt::Display for Callee {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Callee::Direct(name) => write!(f, "@{}", name),
            Callee::Indirect(value) => write!(f, "*{}", value),
        }
    }
}

/// Borrowed view of a call site handed to [`CallSemantics`] classifiers.
///
/// [`CallSemantics`]: crate::analysis::CallSemantics
#[derive(Debug, Clone, Copy)]
pub struct CallSite<'a> {
    pub result: &'a Value,
    pub callee: &'a Callee,
    pub args: &'a [Value],
}

impl CallSite<'_> {
    pub fn callee_name(&self) -> Option<&str> {
        match self.callee {
            Callee::Direct(name) => Some(name),
            Callee::Indirect(_) => None,
        }
    }
}

impl Instruction {
    /// The value this instruction defines, if any. Stores define nothing;
    /// calls always define a result (Void-typed for void callees) so every
    /// call site has a node identity in the flow graph.
    pub fn result(&self) -> Option<&Value> {
        match self {
            Instruction::Add { result, .. }
            | Instruction::Sub { result, .. }
            | Instruction::Mul { result, .. }
            | Instruction::Div { result, .. }
            | Instruction::And { result, .. }
            | Instruction::Or { result, .. }
            | Instruction::Xor { result, .. }
            | Instruction::Not { result, .. }
            | Instruction::Eq { result, .. }
            | Instruction::Ne { result, .. }
            | Instruction::Lt { result, .. }
            | Instruction::Le { result, .. }
            | Instruction::Gt { result, .. }
            | Instruction::Ge { result, .. }
            | Instruction::Select { result, .. }
            | Instruction::Gep { result, .. }
            | Instruction::Alloca { result, .. }
            | Instruction::Load { result, .. }
            | Instruction::Cast { result, .. }
            | Instruction::Phi { result, .. }
            | Instruction::Call { result, .. } => Some(result),
            Instruction::Store { .. } => None,
        }
    }

    /// Every explicit value operand, in positional order. Phi incoming
    /// values and call arguments count as operands; an indirect callee does
    /// too.
    pub fn operands(&self) -> Vec<&Value> {
        match self {
            Instruction::Add { left, right, .. }
            | Instruction::Sub { left, right, .. }
            | Instruction::Mul { left, right, .. }
            | Instruction::Div { left, right, .. }
            | Instruction::And { left, right, .. }
            | Instruction::Or { left, right, .. }
            | Instruction::Xor { left, right, .. }
            | Instruction::Eq { left, right, .. }
            | Instruction::Ne { left, right, .. }
            | Instruction::Lt { left, right, .. }
            | Instruction::Le { left, right, .. }
            | Instruction::Gt { left, right, .. }
            | Instruction::Ge { left, right, .. } => vec![left, right],
            Instruction::Not { operand, .. } => vec![operand],
            Instruction::Select {
                condition,
                then_val,
                else_val,
                ..
            } => vec![condition, then_val, else_val],
            Instruction::Gep { base, indices, .. } => {
                let mut ops = vec![base];
                ops.extend(indices.iter());
                ops
            }
            Instruction::Alloca { .. } => Vec::new(),
            Instruction::Load { address, .. } => vec![address],
            Instruction::Store { address, value } => vec![value, address],
            Instruction::Cast { value, .. } => vec![value],
            Instruction::Phi { incoming, .. } => incoming.iter().map(|(_, v)| v).collect(),
            Instruction::Call { callee, args, .. } => {
                let mut ops: Vec<&Value> = args.iter().collect();
                if let Callee::Indirect(target) = callee {
                    ops.push(target);
                }
                ops
            }
        }
    }

    pub fn opcode(&self) -> &'static str {
        match self {
            Instruction::Add { .. } => "add",
            Instruction::Sub { .. } => "sub",
            Instruction::Mul { .. } => "mul",
            Instruction::Div { .. } => "div",
            Instruction::And { .. } => "and",
            Instruction::Or { .. } => "or",
            Instruction::Xor { .. } => "xor",
            Instruction::Not { .. } => "not",
            Instruction::Eq { .. } => "eq",
            Instruction::Ne { .. } => "ne",
            Instruction::Lt { .. } => "lt",
            Instruction::Le { .. } => "le",
            Instruction::Gt { .. } => "gt",
            Instruction::Ge { .. } => "ge",
            Instruction::Select { .. } => "select",
            Instruction::Gep { .. } => "gep",
            Instruction::Alloca { .. } => "alloca",
            Instruction::Load { .. } => "load",
            Instruction::Store { .. } => "store",
            Instruction::Cast { .. } => "cast",
            Instruction::Phi { .. } => "phi",
            Instruction::Call { .. } => "call",
        }
    }

    pub fn ty(&self) -> Option<&Type> {
        match self {
            Instruction::Add { ty, .. }
            | Instruction::Sub { ty, .. }
            | Instruction::Mul { ty, .. }
            | Instruction::Div { ty, .. }
            | Instruction::Select { ty, .. }
            | Instruction::Gep { ty, .. }
            | Instruction::Alloca { ty, .. }
            | Instruction::Load { ty, .. }
            | Instruction::Phi { ty, .. }
            | Instruction::Call { ty, .. } => Some(ty),
            Instruction::Cast { to, .. } => Some(to),
            _ => None,
        }
    }

    pub fn is_load(&self) -> bool {
        matches!(self, Instruction::Load { .. })
    }

    pub fn is_store(&self) -> bool {
        matches!(self, Instruction::Store { .. })
    }

    pub fn as_call(&self) -> Option<CallSite<'_>> {
        match self {
            Instruction::Call {
                result,
                callee,
                args,
                ..
            } => Some(CallSite {
                result,
                callee,
                args,
            }),
            _ => None,
        }
    }

    /// The value an instruction pushes into memory, from the perspective of
    /// a load that depends on it: a store contributes its stored operand, a
    /// call contributes its result (the only identity a call clobber has).
    pub fn written_value(&self) -> Option<&Value> {
        match self {
            Instruction::Store { value, .. } => Some(value),
            Instruction::Call { result, .. } => Some(result),
            _ => None,
        }
    }
}

impl std::fmt::Display for Instruction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Instruction::Store { address, value } => {
                write!(f, "store {}, {}", value, address)
            }
            Instruction::Phi { result, incoming, .. } => {
                write!(f, "{} = phi ", result)?;
                for (i, (block, value)) in incoming.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "[{}, {}]", block, value)?;
                }
                Ok(())
            }
            Instruction::Call {
                result,
                callee,
                args,
                ..
            } => {
                write!(f, "{} = call {}(", result, callee)?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                write!(f, ")")
            }
            other => {
                if let Some(result) = other.result() {
                    write!(f, "{} = {}", result, other.opcode())?;
                } else {
                    write!(f, "{}", other.opcode())?;
                }
                for (i, op) in other.operands().iter().enumerate() {
                    if i == 0 {
                        write!(f, " {}", op)?;
                    } else {
                        write!(f, ", {}", op)?;
                    }
                }
                Ok(())
            }
        }
    }
}
