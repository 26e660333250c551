//! # adapter-types
//!
//! Introspection model consumed by the adapter synthesis engine.
//!
//! - [`ValueType`] / [`TypeHierarchy`]: declared types and the subtype relation
//! - [`Value`]: dynamically typed values crossing the adapter boundary
//! - [`Marker`] / [`MarkerSet`]: queryable tags on types and members
//! - [`OriginType`]: ordered fields and methods with bound accessors
//! - [`Adaptable`] / [`DynamicObject`]: runtime-type discovery for instances
//! - [`WrapperContract`]: the operations a synthesized adapter implements

#![deny(unsafe_code)]

pub mod contract;
pub mod dynamic;
pub mod error;
pub mod marker;
pub mod origin;
pub mod types;
pub mod value;

// ── Re-exports ──────────────────────────────────────────────────────

pub use contract::{OperationSignature, WrapperContract};
pub use dynamic::{Adaptable, DynamicObject, DynamicSchema};
pub use error::{AccessError, AccessResult};
pub use marker::{Marker, MarkerSet};
pub use origin::{
    FieldDescriptor, Getter, Invoker, MemberKind, MemberRef, MethodDescriptor, OriginType,
    OriginTypeBuilder, OriginTypeId, ParamDescriptor, Setter,
};
pub use types::{TypeHierarchy, ValueType};
pub use value::Value;
