// src/ops/registry.rs

use std::collections::BTreeMap;
use std::sync::OnceLock;

use super::error::OpError;
use super::kind::{OpKind, SameOp};
use super::transform::TransformSameOp;

/// Lookup table for same-dtype transforms; hands out unbound templates.
#[derive(Debug)]
pub struct OpRegistry {
    by_name: BTreeMap<&'static str, SameOp>,
    by_num: BTreeMap<i32, SameOp>,
}

impl OpRegistry {
    /// Registry holding every built-in same-dtype transform.
    pub fn standard() -> Self {
        let mut registry = Self {
            by_name: BTreeMap::new(),
            by_num: BTreeMap::new(),
        };
        for op in SameOp::ALL {
            registry.register(op);
        }
        registry
    }

    fn register(&mut self, op: SameOp) {
        self.by_name.insert(op.name(), op);
        self.by_num.insert(op.op_num(), op);
    }

    /// Resolves a name (or alias) to a kind.
    pub fn lookup(&self, name: &str) -> Result<SameOp, OpError> {
        let lowered = name.trim().to_ascii_lowercase();
        self.by_name
            .get(lowered.as_str())
            .copied()
            .or_else(|| SameOp::from_name(&lowered))
            .ok_or_else(|| OpError::UnknownOp(name.to_string()))
    }

    pub fn lookup_num(&self, num: i32) -> Result<SameOp, OpError> {
        self.by_num
            .get(&num)
            .copied()
            .ok_or_else(|| OpError::UnknownOp(format!("op number {}", num)))
    }

    pub fn template(&self, name: &str) -> Result<TransformSameOp, OpError> {
        Ok(TransformSameOp::template(self.lookup(name)?))
    }

    pub fn template_by_num(&self, num: i32) -> Result<TransformSameOp, OpError> {
        Ok(TransformSameOp::template(self.lookup_num(num)?))
    }

    /// Registered kinds ordered by op number.
    pub fn ops(&self) -> Vec<SameOp> {
        self.by_num.values().copied().collect()
    }
}

/// Process-wide standard registry.
pub fn registry() -> &'static OpRegistry {
    static REGISTRY: OnceLock<OpRegistry> = OnceLock::new();
    REGISTRY.get_or_init(OpRegistry::standard)
}
