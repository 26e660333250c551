//! Adapter factory.
//!
//! The factory owns a wrapper contract and one finalized descriptor per
//! contract operation. [`AdapterFactory::compile`] synthesizes, at most once
//! per origin type, the adapter implementing the contract for that type and
//! returns its [`WrapperConstructor`].
//!
//! The per-type cache is a `DashMap` keyed by [`OriginTypeId`], so two
//! distinct origin types sharing a name get separate adapters. First use
//! takes a per-type gate (a `parking_lot::Mutex` kept in a second map) and
//! re-checks the cache under it, so concurrent first requests for the same
//! type observe a single synthesized adapter. No map lock is held while a
//! type is synthesized; other types compile in parallel.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use adapter_types::{OriginType, OriginTypeId, TypeHierarchy, WrapperContract};
use dashmap::DashMap;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::adapter::SynthesizedAdapterType;
use crate::atom::AtomGenerator;
use crate::config::FactoryConfig;
use crate::descriptor::OperationDescriptor;
use crate::error::{ConfigError, ConfigResult, SynthesisResult};
use crate::wrapper::WrapperConstructor;

/// Counters describing factory activity.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactorySummary {
    pub compiled_types: u64,
    pub cache_hits: u64,
    pub failed_compilations: u64,
}

impl std::fmt::Display for FactorySummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Factory(compiled={}, hits={}, failed={})",
            self.compiled_types, self.cache_hits, self.failed_compilations
        )
    }
}

/// Synthesizes and caches adapters for one contract.
pub struct AdapterFactory {
    contract: WrapperContract,
    /// In contract operation order.
    descriptors: Vec<OperationDescriptor>,
    hierarchy: TypeHierarchy,
    config: FactoryConfig,
    compiled: DashMap<OriginTypeId, WrapperConstructor>,
    /// Serializes first-use synthesis per origin type.
    gates: DashMap<OriginTypeId, Arc<Mutex<()>>>,
    compiled_types: AtomicU64,
    cache_hits: AtomicU64,
    failed_compilations: AtomicU64,
}

impl AdapterFactory {
    pub fn builder(contract: WrapperContract) -> AdapterFactoryBuilder {
        AdapterFactoryBuilder {
            contract,
            descriptors: Vec::new(),
            hierarchy: TypeHierarchy::new(),
            config: FactoryConfig::default(),
        }
    }

    pub fn contract(&self) -> &WrapperContract {
        &self.contract
    }

    pub fn descriptors(&self) -> &[OperationDescriptor] {
        &self.descriptors
    }

    pub fn config(&self) -> &FactoryConfig {
        &self.config
    }

    pub fn hierarchy(&self) -> &TypeHierarchy {
        &self.hierarchy
    }

    /// Constructor for `origin`, synthesizing its adapter on first use.
    ///
    /// A failed synthesis is not cached; the error names the origin type and
    /// the operation that could not be served.
    pub fn compile(&self, origin: &Arc<OriginType>) -> SynthesisResult<WrapperConstructor> {
        if let Some(constructor) = self.compiled.get(origin.id()) {
            return Ok(self.hit(origin, constructor.value()));
        }

        let gate = Arc::clone(
            self.gates
                .entry(origin.id().clone())
                .or_default()
                .value(),
        );
        let _guard = gate.lock();

        if let Some(constructor) = self.compiled.get(origin.id()) {
            return Ok(self.hit(origin, constructor.value()));
        }

        match self.synthesize(origin) {
            Ok(adapter_type) => {
                let constructor =
                    WrapperConstructor::new(Arc::new(adapter_type), self.config.strict_arity);
                self.compiled.insert(origin.id().clone(), constructor.clone());
                self.compiled_types.fetch_add(1, Ordering::Relaxed);
                // Later callers take the fast path.
                self.gates.remove(origin.id());
                Ok(constructor)
            }
            Err(e) => {
                self.failed_compilations.fetch_add(1, Ordering::Relaxed);
                tracing::warn!(
                    origin = %origin.name(),
                    contract = %self.contract.name,
                    operation = %e.operation(),
                    error = %e,
                    "Adapter synthesis failed"
                );
                Err(e)
            }
        }
    }

    /// Whether an adapter for `origin` has been synthesized.
    pub fn is_compiled(&self, origin: &OriginType) -> bool {
        self.compiled.contains_key(origin.id())
    }

    pub fn compiled_count(&self) -> usize {
        self.compiled.len()
    }

    pub fn summary(&self) -> FactorySummary {
        FactorySummary {
            compiled_types: self.compiled_types.load(Ordering::Relaxed),
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            failed_compilations: self.failed_compilations.load(Ordering::Relaxed),
        }
    }

    fn hit(&self, origin: &OriginType, constructor: &WrapperConstructor) -> WrapperConstructor {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(
            origin = %origin.name(),
            adapter = %constructor.adapter_type().id,
            "Adapter cache hit"
        );
        constructor.clone()
    }

    /// Compile every descriptor against `origin`. The first failure aborts
    /// the whole type.
    fn synthesize(&self, origin: &OriginType) -> SynthesisResult<SynthesizedAdapterType> {
        let generator = AtomGenerator::new(&self.hierarchy, self.config.implicit_identity);
        let enhancers = self
            .descriptors
            .iter()
            .zip(&self.contract.operations)
            .map(|(descriptor, signature)| descriptor.compile(origin, signature, &generator, &self.config))
            .collect::<SynthesisResult<Vec<_>>>()?;

        let adapter_type = SynthesizedAdapterType::new(origin, &self.contract.name, enhancers);
        tracing::info!(
            origin = %origin.name(),
            contract = %self.contract.name,
            operations = adapter_type.operation_count(),
            adapter = %adapter_type.id,
            "Adapter type synthesized"
        );
        Ok(adapter_type)
    }
}

impl std::fmt::Debug for AdapterFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdapterFactory")
            .field("contract", &self.contract.name)
            .field("operations", &self.descriptors.len())
            .field("compiled", &self.compiled.len())
            .field("config", &self.config)
            .finish()
    }
}

// ── Builder ──────────────────────────────────────────────────────────

/// Assembles an [`AdapterFactory`], checking the descriptors against the
/// contract before any origin type is seen.
#[derive(Clone, Debug)]
pub struct AdapterFactoryBuilder {
    contract: WrapperContract,
    descriptors: Vec<OperationDescriptor>,
    hierarchy: TypeHierarchy,
    config: FactoryConfig,
}

impl AdapterFactoryBuilder {
    pub fn descriptor(mut self, descriptor: OperationDescriptor) -> Self {
        self.descriptors.push(descriptor);
        self
    }

    pub fn descriptors(mut self, descriptors: impl IntoIterator<Item = OperationDescriptor>) -> Self {
        self.descriptors.extend(descriptors);
        self
    }

    pub fn hierarchy(mut self, hierarchy: TypeHierarchy) -> Self {
        self.hierarchy = hierarchy;
        self
    }

    pub fn config(mut self, config: FactoryConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> ConfigResult<AdapterFactory> {
        let contract = self.contract;
        if let Some(name) = contract.duplicate_operations().first() {
            return Err(ConfigError::DuplicateOperation {
                contract: contract.name.clone(),
                operation: name.to_string(),
            });
        }

        let mut seen = HashSet::new();
        for descriptor in &self.descriptors {
            let signature = contract.get(descriptor.operation()).ok_or_else(|| {
                ConfigError::UnknownOperation {
                    contract: contract.name.clone(),
                    operation: descriptor.operation().to_string(),
                }
            })?;
            if !seen.insert(descriptor.operation()) {
                return Err(ConfigError::DuplicateDescriptor {
                    operation: descriptor.operation().to_string(),
                });
            }
            descriptor.validate_against(signature, &self.hierarchy)?;
        }

        let mut ordered = Vec::with_capacity(contract.operations.len());
        for signature in &contract.operations {
            let descriptor = self
                .descriptors
                .iter()
                .find(|d| d.operation() == signature.name)
                .ok_or_else(|| ConfigError::UncoveredOperation {
                    contract: contract.name.clone(),
                    operation: signature.name.clone(),
                })?;
            ordered.push(descriptor.clone());
        }

        tracing::debug!(
            contract = %contract.name,
            operations = ordered.len(),
            "Adapter factory assembled"
        );

        Ok(AdapterFactory {
            contract,
            descriptors: ordered,
            hierarchy: self.hierarchy,
            config: self.config,
            compiled: DashMap::new(),
            gates: DashMap::new(),
            compiled_types: AtomicU64::new(0),
            cache_hits: AtomicU64::new(0),
            failed_compilations: AtomicU64::new(0),
        })
    }
}
