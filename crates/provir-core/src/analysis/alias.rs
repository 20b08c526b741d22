use crate::function::{Function, InstSite};
use crate::instructions::Instruction;
use crate::values::{GlobalId, ParamId, Value};
use std::collections::{HashMap, HashSet};

/// Abstract locations a pointer value may refer to. A set with `unknown`
/// subsumes everything; an empty set with `unknown == false` means the
/// value is not a pointer the analysis can see.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PointsTo {
    pub allocations: HashSet<InstSite>,
    pub globals: HashSet<GlobalId>,
    pub parameters: HashSet<ParamId>,
    pub unknown: bool,
}

impl PointsTo {
    fn allocation(site: InstSite) -> Self {
        let mut pts = PointsTo::default();
        pts.allocations.insert(site);
        pts
    }

    fn global(id: GlobalId) -> Self {
        let mut pts = PointsTo::default();
        pts.globals.insert(id);
        pts
    }

    fn parameter(id: ParamId) -> Self {
        let mut pts = PointsTo::default();
        pts.parameters.insert(id);
        pts
    }

    fn unknown() -> Self {
        PointsTo {
            unknown: true,
            ..PointsTo::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        !self.unknown
            && self.allocations.is_empty()
            && self.globals.is_empty()
            && self.parameters.is_empty()
    }

    fn merge(&mut self, other: &PointsTo) -> bool {
        let before = (
            self.allocations.len(),
            self.globals.len(),
            self.parameters.len(),
            self.unknown,
        );
        self.allocations.extend(other.allocations.iter().copied());
        self.globals.extend(other.globals.iter().copied());
        self.parameters.extend(other.parameters.iter().copied());
        self.unknown |= other.unknown;
        before
            != (
                self.allocations.len(),
                self.globals.len(),
                self.parameters.len(),
                self.unknown,
            )
    }

    pub fn overlaps(&self, other: &PointsTo) -> bool {
        if self.is_empty() || other.is_empty() {
            return false;
        }
        if self.unknown || other.unknown {
            return true;
        }
        !self.allocations.is_disjoint(&other.allocations)
            || !self.globals.is_disjoint(&other.globals)
            || !self.parameters.is_disjoint(&other.parameters)
    }
}

/// Flow-insensitive points-to analysis over one function. Pointers are
/// rooted at allocas, globals, and pointer-typed parameters; roots travel
/// through gep, cast, phi, and select. Pointers produced by loads or calls
/// point to unknown memory.
#[derive(Debug, Clone)]
pub struct AliasAnalysis {
    points_to: HashMap<Value, PointsTo>,
}

impl AliasAnalysis {
    pub fn build(function: &Function) -> Self {
        let mut points_to: HashMap<Value, PointsTo> = HashMap::new();

        for (index, param) in function.signature.params.iter().enumerate() {
            if param.ty.is_pointer() {
                let id = ParamId(index as u32);
                points_to.insert(Value::Param(id), PointsTo::parameter(id));
            }
        }

        for (site, inst) in function.body.sites() {
            match inst {
                Instruction::Alloca { result, .. } => {
                    points_to.insert(result.clone(), PointsTo::allocation(site));
                }
                Instruction::Load { result, ty, .. } | Instruction::Call { result, ty, .. } => {
                    if ty.is_pointer() {
                        points_to.insert(result.clone(), PointsTo::unknown());
                    }
                }
                _ => {}
            }
        }

        // Roots travel through pointer-shuffling instructions until fixpoint;
        // phi cycles converge because merge only ever grows sets.
        let mut changed = true;
        while changed {
            changed = false;
            for (_, inst) in function.body.sites() {
                let flow: Option<(&Value, Vec<&Value>)> = match inst {
                    Instruction::Gep { result, base, .. } => Some((result, vec![base])),
                    Instruction::Cast { result, value, .. } => Some((result, vec![value])),
                    Instruction::Phi {
                        result, incoming, ..
                    } => Some((result, incoming.iter().map(|(_, v)| v).collect())),
                    Instruction::Select {
                        result,
                        then_val,
                        else_val,
                        ..
                    } => Some((result, vec![then_val, else_val])),
                    _ => None,
                };

                let Some((result, sources)) = flow else {
                    continue;
                };
                let mut merged = points_to.get(result).cloned().unwrap_or_default();
                for source in sources {
                    let pts = Self::resolve_in(&points_to, source);
                    if merged.merge(&pts) {
                        changed = true;
                    }
                }
                points_to.insert(result.clone(), merged);
            }
        }

        Self { points_to }
    }

    fn resolve_in(points_to: &HashMap<Value, PointsTo>, value: &Value) -> PointsTo {
        if let Some(pts) = points_to.get(value) {
            return pts.clone();
        }
        match value {
            Value::Global(id) => PointsTo::global(*id),
            _ => PointsTo::default(),
        }
    }

    pub fn points_to(&self, value: &Value) -> PointsTo {
        Self::resolve_in(&self.points_to, value)
    }

    /// Whether the value carries any abstract location, i.e. is usable as a
    /// memory address from this analysis' point of view.
    pub fn is_pointer_like(&self, value: &Value) -> bool {
        !self.points_to(value).is_empty()
    }

    pub fn may_alias(&self, a: &Value, b: &Value) -> bool {
        if a == b {
            return true;
        }
        self.points_to(a).overlaps(&self.points_to(b))
    }
}
