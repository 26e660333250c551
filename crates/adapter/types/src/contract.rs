//! Wrapper contracts: the fixed operation sets a synthesized adapter implements.

use serde::{Deserialize, Serialize};

use crate::types::ValueType;

/// Signature of one contract operation.
///
/// For List and Map operations, `result` is the type produced per bound
/// member; the wrapper aggregates them.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationSignature {
    pub name: String,
    pub params: Vec<ValueType>,
    pub result: ValueType,
}

impl OperationSignature {
    pub fn new(name: impl Into<String>, params: Vec<ValueType>, result: ValueType) -> Self {
        Self {
            name: name.into(),
            params,
            result,
        }
    }

    pub fn arity(&self) -> usize {
        self.params.len()
    }
}

impl std::fmt::Display for OperationSignature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let params: Vec<String> = self.params.iter().map(|p| p.to_string()).collect();
        write!(f, "{}({}) -> {}", self.name, params.join(", "), self.result)
    }
}

/// Target contract: an ordered list of abstract operations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WrapperContract {
    pub name: String,
    pub operations: Vec<OperationSignature>,
}

impl WrapperContract {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            operations: Vec::new(),
        }
    }

    /// Append an operation.
    pub fn operation(
        mut self,
        name: impl Into<String>,
        params: Vec<ValueType>,
        result: ValueType,
    ) -> Self {
        self.operations
            .push(OperationSignature::new(name, params, result));
        self
    }

    pub fn get(&self, name: &str) -> Option<&OperationSignature> {
        self.operations.iter().find(|op| op.name == name)
    }

    /// Names declared more than once, in first-repeat order.
    pub fn duplicate_operations(&self) -> Vec<&str> {
        let mut seen = std::collections::HashSet::new();
        let mut dups = Vec::new();
        for op in &self.operations {
            if !seen.insert(op.name.as_str()) && !dups.contains(&op.name.as_str()) {
                dups.push(op.name.as_str());
            }
        }
        dups
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }
}
