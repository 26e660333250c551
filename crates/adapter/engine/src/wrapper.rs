//! Wrapper instances.
//!
//! A [`WrapperConstructor`] is the cached, per-origin-type entry point; each
//! [`construct`](WrapperConstructor::construct) binds a fresh [`Wrapper`] to
//! one origin instance. Wrappers dispatch contract operations to the atoms
//! of their synthesized type.

use std::collections::BTreeMap;
use std::sync::Arc;

use adapter_types::{AccessError, Adaptable, Value};

use crate::adapter::SynthesizedAdapterType;
use crate::descriptor::{Enhancer, OperationSlot};
use crate::error::{AdaptError, AdaptResult};

/// Builds wrappers for instances of one origin type. Cheap to clone.
#[derive(Clone, Debug)]
pub struct WrapperConstructor {
    adapter_type: Arc<SynthesizedAdapterType>,
    strict_arity: bool,
}

impl WrapperConstructor {
    pub(crate) fn new(adapter_type: Arc<SynthesizedAdapterType>, strict_arity: bool) -> Self {
        Self {
            adapter_type,
            strict_arity,
        }
    }

    pub fn adapter_type(&self) -> &Arc<SynthesizedAdapterType> {
        &self.adapter_type
    }

    /// Bind a new wrapper to `instance`, which must be of this constructor's
    /// origin type. A different type with the same name is rejected.
    pub fn construct(&self, instance: Arc<dyn Adaptable>) -> AdaptResult<Wrapper> {
        let actual = instance.origin_type();
        if *actual.id() != self.adapter_type.origin_id {
            return Err(AccessError::InstanceMismatch {
                expected: self.adapter_type.origin_type.clone(),
            }
            .into());
        }
        Ok(Wrapper {
            adapter_type: Arc::clone(&self.adapter_type),
            origin: instance,
            strict_arity: self.strict_arity,
        })
    }
}

// ── Wrapper ──────────────────────────────────────────────────────────

/// A contract implementation bound to one origin instance.
#[derive(Clone)]
pub struct Wrapper {
    adapter_type: Arc<SynthesizedAdapterType>,
    origin: Arc<dyn Adaptable>,
    strict_arity: bool,
}

impl Wrapper {
    /// Invoke an operation.
    ///
    /// Singleton and Setter operations return their atom's result; List
    /// operations return a `Value::List` and Map operations a `Value::Map`.
    pub fn call(&self, operation: &str, args: &[Value]) -> AdaptResult<Value> {
        let enhancer = self.prepare(operation, args)?;
        let instance = self.origin.as_any();
        match &enhancer.slot {
            OperationSlot::Single(atom) => atom.call(instance, args),
            OperationSlot::List(atoms) => atoms
                .iter()
                .map(|atom| atom.call(instance, args))
                .collect::<AdaptResult<Vec<_>>>()
                .map(Value::List),
            OperationSlot::Map(atoms) => atoms
                .iter()
                .map(|(key, atom)| Ok((key.clone(), atom.call(instance, args)?)))
                .collect::<AdaptResult<BTreeMap<_, _>>>()
                .map(Value::Map),
        }
    }

    /// Invoke every atom of a List or Map operation, in order.
    pub fn call_each(&self, operation: &str, args: &[Value]) -> AdaptResult<Vec<Value>> {
        let enhancer = self.prepare(operation, args)?;
        let instance = self.origin.as_any();
        match &enhancer.slot {
            OperationSlot::List(atoms) => atoms.iter().map(|a| a.call(instance, args)).collect(),
            OperationSlot::Map(atoms) => atoms.values().map(|a| a.call(instance, args)).collect(),
            OperationSlot::Single(_) => Err(mismatch(enhancer, "list or map")),
        }
    }

    /// Invoke the atom stored under `key` of a Map operation. `None` when the
    /// key is absent.
    pub fn call_keyed(&self, operation: &str, key: &str, args: &[Value]) -> AdaptResult<Option<Value>> {
        let enhancer = self.prepare(operation, args)?;
        match &enhancer.slot {
            OperationSlot::Map(atoms) => atoms
                .get(key)
                .map(|atom| atom.call(self.origin.as_any(), args))
                .transpose(),
            _ => Err(mismatch(enhancer, "map")),
        }
    }

    /// Keys of a Map operation, sorted.
    pub fn keys(&self, operation: &str) -> AdaptResult<Vec<&str>> {
        let enhancer = self.enhancer(operation)?;
        match &enhancer.slot {
            OperationSlot::Map(atoms) => Ok(atoms.keys().map(String::as_str).collect()),
            _ => Err(mismatch(enhancer, "map")),
        }
    }

    /// Number of atoms bound to an operation.
    pub fn len(&self, operation: &str) -> AdaptResult<usize> {
        Ok(self.enhancer(operation)?.slot.len())
    }

    pub fn origin(&self) -> &Arc<dyn Adaptable> {
        &self.origin
    }

    pub fn adapter_type(&self) -> &Arc<SynthesizedAdapterType> {
        &self.adapter_type
    }

    fn enhancer(&self, operation: &str) -> AdaptResult<&Enhancer> {
        self.adapter_type
            .enhancer(operation)
            .ok_or_else(|| AdaptError::UnknownOperation {
                contract: self.adapter_type.contract.clone(),
                operation: operation.to_string(),
            })
    }

    fn prepare(&self, operation: &str, args: &[Value]) -> AdaptResult<&Enhancer> {
        let enhancer = self.enhancer(operation)?;
        if self.strict_arity && args.len() != enhancer.signature.arity() {
            return Err(AdaptError::ArityMismatch {
                operation: operation.to_string(),
                expected: enhancer.signature.arity(),
                found: args.len(),
            });
        }
        Ok(enhancer)
    }
}

impl std::fmt::Debug for Wrapper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Wrapper")
            .field("adapter_type", &self.adapter_type.id)
            .field("contract", &self.adapter_type.contract)
            .field("origin", &self.adapter_type.origin_type)
            .finish()
    }
}

fn mismatch(enhancer: &Enhancer, expected: &str) -> AdaptError {
    AdaptError::CardinalityMismatch {
        operation: enhancer.operation().to_string(),
        expected: expected.to_string(),
        actual: enhancer.cardinality.to_string(),
    }
}
