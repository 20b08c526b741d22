use serde::{Deserialize, Serialize};

/// Static types carried by instructions and report output. The analysis
/// itself is type-agnostic; pointers matter only to the alias analysis.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Type {
    Void,
    Bool,
    Int(u16),
    Ptr(Box<Type>),
    Array(Box<Type>, u64),
    Str,
}

impl Type {
    pub fn ptr(pointee: Type) -> Type {
        Type::Ptr(Box::new(pointee))
    }

    pub fn is_pointer(&self) -> bool {
        matches!(self, Type::Ptr(_))
    }

    pub fn pointee(&self) -> Option<&Type> {
        match self {
            Type::Ptr(inner) => Some(inner),
            _ => None,
        }
    }
}

impl std::fmt::Display for Type {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Type::Void => write!(f, "void"),
            Type::Bool => write!(f, "bool"),
            Type::Int(bits) => write!(f, "i{}", bits),
            Type::Ptr(inner) => write!(f, "{}*", inner),
            Type::Array(elem, len) => write!(f, "[{} x {}]", len, elem),
            Type::Str => write!(f, "str"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_forms() {
        assert_eq!(Type::Int(32).to_string(), "i32");
        assert_eq!(Type::ptr(Type::Int(8)).to_string(), "i8*");
        assert_eq!(Type::Array(Box::new(Type::Int(8)), 16).to_string(), "[16 x i8]");
    }

    #[test]
    fn pointer_queries() {
        assert!(Type::ptr(Type::Void).is_pointer());
        assert!(!Type::Int(64).is_pointer());
        assert_eq!(Type::ptr(Type::Int(8)).pointee(), Some(&Type::Int(8)));
    }
}
