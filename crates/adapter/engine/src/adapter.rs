//! Synthesized adapter types.
//!
//! Instead of generating code, a synthesized adapter is a data-driven
//! composite: one [`Enhancer`] per contract operation, in contract order,
//! each holding the atoms bound to one origin type. It is created once per
//! origin type and never mutated afterwards.

use adapter_types::{OriginType, OriginTypeId};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::descriptor::Enhancer;

// ── Identifiers ──────────────────────────────────────────────────────

/// Unique identifier for a synthesized adapter type.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AdapterTypeId(pub String);

impl AdapterTypeId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

impl Default for AdapterTypeId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for AdapterTypeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "adapter:{}", self.0)
    }
}

// ── Synthesized Type ─────────────────────────────────────────────────

/// The contract implementation compiled for one origin type.
#[derive(Debug)]
pub struct SynthesizedAdapterType {
    pub id: AdapterTypeId,
    /// Identity of the origin type the atoms are bound to.
    pub origin_id: OriginTypeId,
    pub origin_type: String,
    pub contract: String,
    pub synthesized_at: chrono::DateTime<chrono::Utc>,
    enhancers: Vec<Enhancer>,
}

impl SynthesizedAdapterType {
    pub(crate) fn new(
        origin: &OriginType,
        contract: impl Into<String>,
        enhancers: Vec<Enhancer>,
    ) -> Self {
        Self {
            id: AdapterTypeId::new(),
            origin_id: origin.id().clone(),
            origin_type: origin.name().to_string(),
            contract: contract.into(),
            synthesized_at: Utc::now(),
            enhancers,
        }
    }

    pub fn enhancer(&self, operation: &str) -> Option<&Enhancer> {
        self.enhancers.iter().find(|e| e.operation() == operation)
    }

    /// Enhancers in contract order.
    pub fn enhancers(&self) -> &[Enhancer] {
        &self.enhancers
    }

    pub fn operation_count(&self) -> usize {
        self.enhancers.len()
    }
}

impl std::fmt::Display for SynthesizedAdapterType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}<{}> ({}, {} operations)",
            self.contract,
            self.origin_type,
            self.id,
            self.enhancers.len()
        )
    }
}
