//! # adapter-engine
//!
//! Structural adapter compiler. Given a [`WrapperContract`] and one
//! [`OperationDescriptor`] per contract operation, an [`AdapterFactory`]
//! synthesizes, on first encounter of each origin type, a composite of
//! delegate atoms implementing the contract for that type. A
//! [`WrapperCache`] turns origin instances into [`Wrapper`]s.
//!
//! Pipeline per origin type:
//!
//! 1. [`MemberSelector`] resolves each descriptor's [`Criterion`];
//! 2. [`TranslatorRegistry`] plans result and argument conversions;
//! 3. [`ParameterRouter`] maps wrapper arguments onto method parameters;
//! 4. [`AtomGenerator`] compiles one [`Atom`] per bound member;
//! 5. the descriptor assembles its atoms into an [`Enhancer`];
//! 6. the factory caches the resulting [`SynthesizedAdapterType`].
//!
//! ## Guarantees
//!
//! - At most one synthesized adapter exists per origin type and factory,
//!   including under concurrent first use.
//! - Members are discovered fields first, then methods, each in declaration
//!   order, so List and Map operations are reproducible.
//! - Synthesis of one origin type fails as a whole and leaves other types
//!   untouched.
//!
//! [`WrapperContract`]: adapter_types::WrapperContract

#![deny(unsafe_code)]

pub mod adapter;
pub mod atom;
pub mod cache;
pub mod config;
pub mod descriptor;
pub mod error;
pub mod factory;
pub mod router;
pub mod selector;
pub mod standard;
pub mod translator;
pub mod wrapper;

// ── Re-exports ──────────────────────────────────────────────────────

pub use adapter::{AdapterTypeId, SynthesizedAdapterType};
pub use atom::{Atom, AtomGenerator, AtomKind, Delegate};
pub use cache::WrapperCache;
pub use config::{AmbiguityPolicy, DuplicateKeyPolicy, FactoryConfig};
pub use descriptor::{
    Cardinality, DescriptorBuilder, Enhancer, KeyRule, OperationDescriptor, OperationSlot,
};
pub use error::{
    AdaptError, AdaptResult, ConfigError, ConfigResult, SynthesisError, SynthesisResult,
    TranslationError, TranslationResult,
};
pub use factory::{AdapterFactory, AdapterFactoryBuilder, FactorySummary};
pub use router::{ArgBinding, ParamFilter, ParameterRouter, ParameterSource, RoutePlan};
pub use selector::{Criterion, MemberPredicate, MemberSelector, Selection};
pub use translator::{ConvertFn, Translation, TranslatorEntry, TranslatorRegistry, Variance};
pub use wrapper::{Wrapper, WrapperConstructor};
