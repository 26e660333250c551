//! Type-translator registry.
//!
//! Entries are keyed by a declared type and a [`Variance`]. Lookup for an
//! actual type runs three passes, each in registration order:
//!
//! 1. an entry declared for exactly the actual type;
//! 2. an `AppliesToSubtypes` entry whose declared type is a supertype of the actual type;
//! 3. an `AppliesToSupertypes` entry whose declared type is a subtype of the actual type.
//!
//! Every entry also names the type it produces, so a [`Translation`] can chain
//! entries until the produced type fits the expected one.

use std::collections::HashSet;
use std::sync::Arc;

use adapter_types::{TypeHierarchy, Value, ValueType};
use serde::{Deserialize, Serialize};

use crate::error::TranslationResult;

/// A conversion function.
pub type ConvertFn = Arc<dyn Fn(Value) -> TranslationResult<Value> + Send + Sync>;

/// Which actual types an entry applies to besides its declared type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Variance {
    /// Only the declared type.
    Exact,
    /// The declared type and all of its subtypes.
    AppliesToSubtypes,
    /// The declared type and all of its supertypes.
    AppliesToSupertypes,
}

impl std::fmt::Display for Variance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Exact => write!(f, "exact"),
            Self::AppliesToSubtypes => write!(f, "subtypes"),
            Self::AppliesToSupertypes => write!(f, "supertypes"),
        }
    }
}

/// One registered conversion.
#[derive(Clone)]
pub struct TranslatorEntry {
    pub declared: ValueType,
    pub variance: Variance,
    pub target: ValueType,
    convert: ConvertFn,
}

impl TranslatorEntry {
    pub fn convert(&self, value: Value) -> TranslationResult<Value> {
        (self.convert)(value)
    }
}

impl std::fmt::Debug for TranslatorEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({}) -> {}", self.declared, self.variance, self.target)
    }
}

// ── Registry ─────────────────────────────────────────────────────────

/// Ordered set of translator entries. First applicable entry wins within
/// each lookup pass.
#[derive(Clone, Debug, Default)]
pub struct TranslatorRegistry {
    entries: Vec<TranslatorEntry>,
}

impl TranslatorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a conversion from `declared` (per `variance`) to `target`.
    pub fn register<F>(
        &mut self,
        declared: ValueType,
        variance: Variance,
        target: ValueType,
        convert: F,
    ) -> &mut Self
    where
        F: Fn(Value) -> TranslationResult<Value> + Send + Sync + 'static,
    {
        self.entries.push(TranslatorEntry {
            declared,
            variance,
            target,
            convert: Arc::new(convert),
        });
        self
    }

    /// Builder-style [`register`](Self::register).
    pub fn with<F>(
        mut self,
        declared: ValueType,
        variance: Variance,
        target: ValueType,
        convert: F,
    ) -> Self
    where
        F: Fn(Value) -> TranslationResult<Value> + Send + Sync + 'static,
    {
        self.register(declared, variance, target, convert);
        self
    }

    /// Builder-style exact registration.
    pub fn exact<F>(self, declared: ValueType, target: ValueType, convert: F) -> Self
    where
        F: Fn(Value) -> TranslationResult<Value> + Send + Sync + 'static,
    {
        self.with(declared, Variance::Exact, target, convert)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[TranslatorEntry] {
        &self.entries
    }

    /// First applicable entry for `actual`, or `None`.
    pub fn resolve(&self, actual: &ValueType, hierarchy: &TypeHierarchy) -> Option<&TranslatorEntry> {
        self.resolve_index(actual, hierarchy)
            .map(|i| &self.entries[i])
    }

    fn resolve_index(&self, actual: &ValueType, hierarchy: &TypeHierarchy) -> Option<usize> {
        self.entries
            .iter()
            .position(|e| &e.declared == actual)
            .or_else(|| {
                self.entries.iter().position(|e| {
                    e.variance == Variance::AppliesToSubtypes
                        && hierarchy.is_subtype(actual, &e.declared)
                })
            })
            .or_else(|| {
                self.entries.iter().position(|e| {
                    e.variance == Variance::AppliesToSupertypes
                        && hierarchy.is_supertype(actual, &e.declared)
                })
            })
    }

    /// Plan the conversion of a value declared as `actual` into `expected`.
    ///
    /// When `implicit_identity` is set and `actual` is already assignable to
    /// `expected`, the value passes through unchanged and no entry runs.
    /// Otherwise registered entries are followed from `actual` until the
    /// produced type is assignable to `expected`; an entry is used at most
    /// once per chain. An `expected` of `Unit` discards the value. Returns
    /// `None` when nothing applies.
    pub fn plan(
        &self,
        actual: &ValueType,
        expected: &ValueType,
        hierarchy: &TypeHierarchy,
        implicit_identity: bool,
    ) -> Option<Translation> {
        if implicit_identity && hierarchy.is_assignable(actual, expected) {
            return Some(Translation::identity());
        }

        let mut steps = Vec::new();
        let mut used = HashSet::new();
        let mut current = actual.clone();
        while let Some(i) = self.resolve_index(&current, hierarchy) {
            if !used.insert(i) {
                break;
            }
            let entry = &self.entries[i];
            steps.push(TranslationStep {
                from: current.clone(),
                to: entry.target.clone(),
                convert: Arc::clone(&entry.convert),
            });
            current = entry.target.clone();
            if hierarchy.is_assignable(&current, expected) {
                return Some(Translation::chain(steps));
            }
        }

        if *expected == ValueType::Unit {
            return Some(Translation::discard());
        }
        None
    }
}

// ── Translation ──────────────────────────────────────────────────────

#[derive(Clone)]
struct TranslationStep {
    from: ValueType,
    to: ValueType,
    convert: ConvertFn,
}

/// A compiled conversion chain, applied to values at call time.
#[derive(Clone)]
pub struct Translation {
    steps: Vec<TranslationStep>,
    discard: bool,
}

impl Translation {
    /// Pass values through unchanged.
    pub fn identity() -> Self {
        Self {
            steps: Vec::new(),
            discard: false,
        }
    }

    /// Replace every value with `Unit`.
    pub fn discard() -> Self {
        Self {
            steps: Vec::new(),
            discard: true,
        }
    }

    fn chain(steps: Vec<TranslationStep>) -> Self {
        Self {
            steps,
            discard: false,
        }
    }

    pub fn is_identity(&self) -> bool {
        self.steps.is_empty() && !self.discard
    }

    /// Number of conversion steps.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn apply(&self, value: Value) -> TranslationResult<Value> {
        if self.discard {
            return Ok(Value::Unit);
        }
        self.steps
            .iter()
            .try_fold(value, |value, step| (step.convert)(value))
    }
}

impl std::fmt::Debug for Translation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.discard {
            return write!(f, "Translation(discard)");
        }
        if self.steps.is_empty() {
            return write!(f, "Translation(identity)");
        }
        write!(f, "Translation({}", self.steps[0].from)?;
        for step in &self.steps {
            write!(f, " -> {}", step.to)?;
        }
        write!(f, ")")
    }
}
