use crate::function::InstSite;
use serde::{Deserialize, Serialize};

/// A node identity in the flow graph: an instruction result, a procedure
/// argument, a module global, a constant, or a store site. Values are cheap
/// to clone and compare; constants are uniqued structurally, so two uses of
/// the same literal are the same node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Value {
    Temp(TempId),
    Param(ParamId),
    Global(GlobalId),
    Constant(Constant),
    /// A store instruction, addressed by its site. Stores define no result,
    /// but they are still graph nodes: their value and address operands
    /// point at them, keeping every instruction's operands visible.
    Store(InstSite),
    Undefined,
}

impl Value {
    pub fn as_temp(&self) -> Option<TempId> {
        match self {
            Value::Temp(t) => Some(*t),
            _ => None,
        }
    }

    pub fn is_constant(&self) -> bool {
        matches!(self, Value::Constant(_))
    }

    pub fn as_constant(&self) -> Option<&Constant> {
        match self {
            Value::Constant(c) => Some(c),
            _ => None,
        }
    }

    /// Whether this value participates in the flow graph at all.
    pub fn is_tracked(&self) -> bool {
        !matches!(self, Value::Undefined)
    }

    pub fn int(value: i64, bits: u16) -> Value {
        Value::Constant(Constant::Int(value, bits))
    }

    pub fn bool(value: bool) -> Value {
        Value::Constant(Constant::Bool(value))
    }

    pub fn str(value: impl Into<String>) -> Value {
        Value::Constant(Constant::Str(value.into()))
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Temp(t) => write!(f, "{}", t),
            Value::Param(p) => write!(f, "{}", p),
            Value::Global(g) => write!(f, "{}", g),
            Value::Constant(c) => write!(f, "{}", c),
            Value::Store(site) => write!(f, "store@{}.{}", site.block, site.index),
            Value::Undefined => write!(f, "undef"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TempId(pub u32);

impl std::fmt::Display for TempId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "t{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ParamId(pub u32);

impl std::fmt::Display for ParamId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "p{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GlobalId(pub u32);

impl std::fmt::Display for GlobalId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "g{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Constant {
    Bool(bool),
    Int(i64, u16),
    Str(String),
    Null,
}

impl std::fmt::Display for Constant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Constant::Bool(b) => write!(f, "{}", b),
            Constant::Int(v, bits) => write!(f, "{}i{}", v, bits),
            Constant::Str(s) => write!(f, "{:?}", s),
            Constant::Null => write!(f, "null"),
        }
    }
}
