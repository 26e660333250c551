//! Wrapper cache: `get(instance) -> wrapper`.
//!
//! Only the synthesized type and its constructor are cached (inside the
//! factory). Every call returns a new wrapper.

use std::sync::Arc;

use adapter_types::{Adaptable, OriginType};

use crate::error::{AdaptResult, SynthesisResult};
use crate::factory::AdapterFactory;
use crate::wrapper::{Wrapper, WrapperConstructor};

/// Façade over an [`AdapterFactory`] that adapts instances directly.
#[derive(Clone, Debug)]
pub struct WrapperCache {
    factory: Arc<AdapterFactory>,
}

impl WrapperCache {
    pub fn new(factory: Arc<AdapterFactory>) -> Self {
        Self { factory }
    }

    /// Wrap `instance`, compiling its origin type on first use.
    pub fn get(&self, instance: Arc<dyn Adaptable>) -> AdaptResult<Wrapper> {
        let constructor = self.factory.compile(&instance.origin_type())?;
        constructor.construct(instance)
    }

    /// Typed convenience for [`get`](Self::get).
    pub fn adapt<T: Adaptable>(&self, instance: Arc<T>) -> AdaptResult<Wrapper> {
        self.get(instance)
    }

    pub fn constructor_for(&self, origin: &Arc<OriginType>) -> SynthesisResult<WrapperConstructor> {
        self.factory.compile(origin)
    }

    pub fn factory(&self) -> &Arc<AdapterFactory> {
        &self.factory
    }
}
