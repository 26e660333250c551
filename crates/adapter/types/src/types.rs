//! Declared value types and the subtype relation between them.
//!
//! Every field, method parameter and method result of an origin type carries
//! a declared [`ValueType`]. Translator lookup and parameter routing compare
//! declared types through a [`TypeHierarchy`], which knows the built-in
//! numeric family and any named types registered by the integrator.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet, VecDeque};

// ── Value Types ──────────────────────────────────────────────────────

/// A declared type in the adapter type system.
///
/// `Int`, `Long`, `Double` and `Text` are distinct: converting between them
/// always requires an explicitly registered translator.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueType {
    /// No value (void result).
    Unit,
    Bool,
    /// 32-bit signed integer.
    Int,
    /// 64-bit signed integer.
    Long,
    Double,
    Text,
    /// Abstract numeric supertype of `Int`, `Long` and `Double`.
    Number,
    List,
    Map,
    /// Top type; every type is a subtype of `Any`.
    Any,
    /// Integrator-defined type, placed in the hierarchy via [`TypeHierarchy::declare`].
    Named(String),
}

impl ValueType {
    /// Shorthand for a named type.
    pub fn named(name: impl Into<String>) -> Self {
        Self::Named(name.into())
    }

    /// Whether this is one of the concrete numeric types.
    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Int | Self::Long | Self::Double)
    }
}

impl std::fmt::Display for ValueType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unit => write!(f, "unit"),
            Self::Bool => write!(f, "bool"),
            Self::Int => write!(f, "int"),
            Self::Long => write!(f, "long"),
            Self::Double => write!(f, "double"),
            Self::Text => write!(f, "text"),
            Self::Number => write!(f, "number"),
            Self::List => write!(f, "list"),
            Self::Map => write!(f, "map"),
            Self::Any => write!(f, "any"),
            Self::Named(name) => write!(f, "{}", name),
        }
    }
}

// ── Type Hierarchy ───────────────────────────────────────────────────

/// Reflexive, transitive subtype relation over [`ValueType`].
///
/// Built-in edges: every type is a subtype of `Any`, and the concrete
/// numeric types are subtypes of `Number`. Named types declare their
/// direct parents explicitly.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TypeHierarchy {
    parents: HashMap<String, Vec<ValueType>>,
}

impl TypeHierarchy {
    /// Create a hierarchy containing only the built-in edges.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare the direct parents of a named type.
    ///
    /// Repeated declarations extend the parent list.
    pub fn declare(&mut self, name: impl Into<String>, parents: Vec<ValueType>) -> &mut Self {
        let entry = self.parents.entry(name.into()).or_default();
        for parent in parents {
            if !entry.contains(&parent) {
                entry.push(parent);
            }
        }
        self
    }

    /// Builder-style variant of [`declare`](Self::declare).
    pub fn with(mut self, name: impl Into<String>, parents: Vec<ValueType>) -> Self {
        self.declare(name, parents);
        self
    }

    /// Direct parents of a type, including the built-in edges.
    pub fn direct_parents(&self, ty: &ValueType) -> Vec<ValueType> {
        let mut out = Vec::new();
        match ty {
            ValueType::Any => return out,
            ValueType::Int | ValueType::Long | ValueType::Double => out.push(ValueType::Number),
            ValueType::Named(name) => {
                if let Some(parents) = self.parents.get(name) {
                    out.extend(parents.iter().cloned());
                }
            }
            _ => {}
        }
        out.push(ValueType::Any);
        out
    }

    /// `true` when `sub` is `sup` or a (transitive) subtype of it.
    pub fn is_subtype(&self, sub: &ValueType, sup: &ValueType) -> bool {
        if sub == sup || *sup == ValueType::Any {
            return true;
        }
        let mut seen: HashSet<ValueType> = HashSet::new();
        let mut queue: VecDeque<ValueType> = VecDeque::new();
        queue.push_back(sub.clone());
        while let Some(current) = queue.pop_front() {
            for parent in self.direct_parents(&current) {
                if &parent == sup {
                    return true;
                }
                if seen.insert(parent.clone()) {
                    queue.push_back(parent);
                }
            }
        }
        false
    }

    /// `true` when `sup` is `sub` or a (transitive) supertype of it.
    pub fn is_supertype(&self, sup: &ValueType, sub: &ValueType) -> bool {
        self.is_subtype(sub, sup)
    }

    /// Whether a value declared as `source` may be used where `target` is expected.
    ///
    /// `Unit` is only assignable to `Unit`; a void result never silently
    /// becomes an `Any`.
    pub fn is_assignable(&self, source: &ValueType, target: &ValueType) -> bool {
        if *source == ValueType::Unit {
            return *target == ValueType::Unit;
        }
        self.is_subtype(source, target)
    }
}
