//! Delegate atoms.
//!
//! An atom is the smallest unit of delegation: read a field, write a field,
//! invoke a method with routed arguments, return a fixed value, or do
//! nothing. Atoms are compiled once per (origin type, member, operation) and
//! then shared by every wrapper of that origin type; the instance is supplied
//! on each call.

use std::any::Any;
use std::sync::Arc;

use adapter_types::{
    FieldDescriptor, Getter, Invoker, MethodDescriptor, OperationSignature, OriginType, Setter,
    TypeHierarchy, Value, ValueType,
};
use serde::{Deserialize, Serialize};

use crate::error::{AdaptResult, Site, SynthesisResult};
use crate::router::{ParameterRouter, ParameterSource, RoutePlan};
use crate::translator::{Translation, TranslatorRegistry};

/// What an atom does when called.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AtomKind {
    FieldRead,
    FieldWrite,
    Invoke,
    Constant,
    Noop,
}

impl std::fmt::Display for AtomKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FieldRead => write!(f, "field_read"),
            Self::FieldWrite => write!(f, "field_write"),
            Self::Invoke => write!(f, "invoke"),
            Self::Constant => write!(f, "constant"),
            Self::Noop => write!(f, "noop"),
        }
    }
}

/// Single entry point of a compiled delegate.
pub trait Delegate: Send + Sync {
    /// Perform the delegated access on `instance` with the wrapper arguments.
    fn call(&self, instance: &dyn Any, args: &[Value]) -> AdaptResult<Value>;

    fn kind(&self) -> AtomKind;

    /// Name of the bound origin member, if any.
    fn member(&self) -> Option<&str> {
        None
    }
}

/// Shared handle to a compiled delegate.
pub type Atom = Arc<dyn Delegate>;

// ── Atom Implementations ─────────────────────────────────────────────

struct FieldRead {
    member: String,
    getter: Getter,
    result: Translation,
}

impl Delegate for FieldRead {
    fn call(&self, instance: &dyn Any, _args: &[Value]) -> AdaptResult<Value> {
        let value = (self.getter)(instance)?;
        Ok(self.result.apply(value)?)
    }

    fn kind(&self) -> AtomKind {
        AtomKind::FieldRead
    }

    fn member(&self) -> Option<&str> {
        Some(&self.member)
    }
}

struct FieldWrite {
    member: String,
    setter: Setter,
    argument: Translation,
}

impl Delegate for FieldWrite {
    fn call(&self, instance: &dyn Any, args: &[Value]) -> AdaptResult<Value> {
        let value = self
            .argument
            .apply(args.first().cloned().unwrap_or(Value::Null))?;
        (self.setter)(instance, value)?;
        Ok(Value::Unit)
    }

    fn kind(&self) -> AtomKind {
        AtomKind::FieldWrite
    }

    fn member(&self) -> Option<&str> {
        Some(&self.member)
    }
}

struct Invoke {
    member: String,
    invoker: Invoker,
    route: RoutePlan,
    result: Translation,
}

impl Delegate for Invoke {
    fn call(&self, instance: &dyn Any, args: &[Value]) -> AdaptResult<Value> {
        let routed = self.route.arguments(args)?;
        let value = (self.invoker)(instance, &routed)?;
        Ok(self.result.apply(value)?)
    }

    fn kind(&self) -> AtomKind {
        AtomKind::Invoke
    }

    fn member(&self) -> Option<&str> {
        Some(&self.member)
    }
}

struct Constant {
    value: Value,
}

impl Delegate for Constant {
    fn call(&self, _instance: &dyn Any, _args: &[Value]) -> AdaptResult<Value> {
        Ok(self.value.clone())
    }

    fn kind(&self) -> AtomKind {
        AtomKind::Constant
    }
}

struct Noop;

impl Delegate for Noop {
    fn call(&self, _instance: &dyn Any, _args: &[Value]) -> AdaptResult<Value> {
        Ok(Value::Unit)
    }

    fn kind(&self) -> AtomKind {
        AtomKind::Noop
    }
}

// ── Generator ────────────────────────────────────────────────────────

/// Compiles atoms for members of one origin type.
///
/// All type checks happen here, so a compiled atom can only fail at call
/// time through its accessor or a translator.
#[derive(Clone, Copy, Debug)]
pub struct AtomGenerator<'a> {
    hierarchy: &'a TypeHierarchy,
    implicit_identity: bool,
}

impl<'a> AtomGenerator<'a> {
    pub fn new(hierarchy: &'a TypeHierarchy, implicit_identity: bool) -> Self {
        Self {
            hierarchy,
            implicit_identity,
        }
    }

    pub fn hierarchy(&self) -> &'a TypeHierarchy {
        self.hierarchy
    }

    /// Read `field` and convert it to the operation's result type.
    pub fn for_field(
        &self,
        origin: &OriginType,
        operation: &OperationSignature,
        field: &FieldDescriptor,
        results: &TranslatorRegistry,
    ) -> SynthesisResult<Atom> {
        let site = site(origin, operation);
        if operation.arity() > 0 {
            return Err(site.alien(
                &field.name,
                format!(
                    "a field read takes no arguments, operation takes {}",
                    operation.arity()
                ),
            ));
        }
        let result = self.result_translation(site, &field.name, &field.value_type, &operation.result, results)?;
        Ok(Arc::new(FieldRead {
            member: field.name.clone(),
            getter: field.getter(),
            result,
        }))
    }

    /// Invoke `method` with routed arguments and convert its result.
    pub fn for_method(
        &self,
        origin: &OriginType,
        operation: &OperationSignature,
        method: &MethodDescriptor,
        routing: &[ParameterSource],
        params: &TranslatorRegistry,
        results: &TranslatorRegistry,
    ) -> SynthesisResult<Atom> {
        let route = ParameterRouter::new(self.hierarchy, self.implicit_identity)
            .plan(origin, operation, method, routing, params)?;
        let result = self.result_translation(
            site(origin, operation),
            &method.name,
            &method.result,
            &operation.result,
            results,
        )?;
        Ok(Arc::new(Invoke {
            member: method.name.clone(),
            invoker: method.invoker(),
            route,
            result,
        }))
    }

    /// Write the operation's single argument into `field`.
    pub fn for_setter(
        &self,
        origin: &OriginType,
        operation: &OperationSignature,
        field: &FieldDescriptor,
        params: &TranslatorRegistry,
    ) -> SynthesisResult<Atom> {
        let site = site(origin, operation);
        let setter = field
            .setter()
            .ok_or_else(|| site.alien(&field.name, "field is read-only"))?;
        let [argument_ty] = operation.params.as_slice() else {
            return Err(site.alien(
                &field.name,
                format!(
                    "a field write takes exactly one argument, operation takes {}",
                    operation.arity()
                ),
            ));
        };
        let argument = params
            .plan(argument_ty, &field.value_type, self.hierarchy, self.implicit_identity)
            .ok_or_else(|| site.no_translator(&field.name, argument_ty, &field.value_type))?;
        Ok(Arc::new(FieldWrite {
            member: field.name.clone(),
            setter,
            argument,
        }))
    }

    /// Always return `value`.
    pub fn for_constant(&self, value: Value) -> Atom {
        Arc::new(Constant { value })
    }

    /// Accept any arguments and do nothing.
    pub fn for_noop(&self) -> Atom {
        Arc::new(Noop)
    }

    fn result_translation(
        &self,
        site: Site<'_>,
        member: &str,
        from: &ValueType,
        to: &ValueType,
        results: &TranslatorRegistry,
    ) -> SynthesisResult<Translation> {
        results
            .plan(from, to, self.hierarchy, self.implicit_identity)
            .ok_or_else(|| site.no_translator(member, from, to))
    }
}

fn site<'s>(origin: &'s OriginType, operation: &'s OperationSignature) -> Site<'s> {
    Site {
        origin: origin.name(),
        operation: &operation.name,
    }
}
