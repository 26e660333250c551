//! Runtime-typed origins.
//!
//! [`Adaptable`] is the seam through which a wrapper cache discovers the
//! runtime type of an instance. [`DynamicObject`] is an origin whose type is
//! described at runtime from a schema rather than by a Rust struct.

use std::any::Any;
use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::error::{AccessError, AccessResult};
use crate::marker::Marker;
use crate::origin::{
    FieldDescriptor, Getter, Invoker, MemberKind, MethodDescriptor, OriginType, ParamDescriptor,
    Setter,
};
use crate::types::{TypeHierarchy, ValueType};
use crate::value::Value;

/// An instance that can report its own origin type.
///
/// Adapters are cached per [`OriginType`] identity, so every instance of one
/// type should hand out the same shared `OriginType` (see
/// [`OriginType::shared`]).
pub trait Adaptable: Any + Send + Sync {
    /// Metadata for the instance's runtime type.
    fn origin_type(&self) -> Arc<OriginType>;

    /// The instance as `Any`, handed to bound accessors.
    fn as_any(&self) -> &dyn Any;
}

// ── Dynamic Object ───────────────────────────────────────────────────

/// An origin instance whose fields live in a name-keyed slot table.
pub struct DynamicObject {
    origin: Arc<OriginType>,
    slots: RwLock<BTreeMap<String, Value>>,
}

impl DynamicObject {
    /// Start describing a dynamic origin type.
    pub fn schema(name: impl Into<String>) -> DynamicSchema {
        DynamicSchema {
            ty: OriginType::new(name),
            last: None,
        }
    }

    /// Create an instance. Slots not listed in `values` read as `Null`.
    pub fn new<I, K>(origin: Arc<OriginType>, values: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        Self {
            origin,
            slots: RwLock::new(values.into_iter().map(|(k, v)| (k.into(), v)).collect()),
        }
    }

    /// Current value of a slot.
    pub fn get(&self, name: &str) -> Value {
        self.slots.read().get(name).cloned().unwrap_or(Value::Null)
    }

    /// Overwrite a slot directly, bypassing declared types.
    pub fn set(&self, name: impl Into<String>, value: Value) {
        self.slots.write().insert(name.into(), value);
    }
}

impl Adaptable for DynamicObject {
    fn origin_type(&self) -> Arc<OriginType> {
        Arc::clone(&self.origin)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl std::fmt::Debug for DynamicObject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DynamicObject")
            .field("origin", &self.origin.name())
            .field("slots", &*self.slots.read())
            .finish()
    }
}

fn as_dynamic<'a>(instance: &'a dyn Any, origin: &str) -> AccessResult<&'a DynamicObject> {
    instance
        .downcast_ref::<DynamicObject>()
        .filter(|obj| obj.origin.name() == origin)
        .ok_or_else(|| AccessError::InstanceMismatch {
            expected: origin.to_string(),
        })
}

/// Builder for the [`OriginType`] of a family of [`DynamicObject`]s.
pub struct DynamicSchema {
    ty: OriginType,
    last: Option<MemberKind>,
}

impl DynamicSchema {
    pub fn type_marker(mut self, marker: Marker) -> Self {
        self.ty.push_marker(marker);
        self
    }

    /// Declare a read-only slot.
    pub fn field(mut self, name: impl Into<String>, value_type: ValueType) -> Self {
        let name = name.into();
        let getter = self.slot_getter(&name);
        self.ty.push_field(FieldDescriptor::new(name, value_type, getter));
        self.last = Some(MemberKind::Field);
        self
    }

    /// Declare a writable slot. Writes are checked against the declared type;
    /// `Null` is always accepted.
    pub fn field_mut(mut self, name: impl Into<String>, value_type: ValueType) -> Self {
        let name = name.into();
        let getter = self.slot_getter(&name);
        let origin = self.ty.name().to_string();
        let slot = name.clone();
        let declared = value_type.clone();
        let hierarchy = TypeHierarchy::new();
        let setter: Setter = Arc::new(move |instance: &dyn Any, value: Value| {
            let obj = as_dynamic(instance, &origin)?;
            if !value.is_null() && !hierarchy.is_assignable(&value.value_type(), &declared) {
                return Err(AccessError::TypeMismatch {
                    member: slot.clone(),
                    expected: declared.to_string(),
                    found: value.value_type().to_string(),
                });
            }
            obj.set(slot.clone(), value);
            Ok(())
        });
        self.ty
            .push_field(FieldDescriptor::new(name, value_type, getter).with_setter(setter));
        self.last = Some(MemberKind::Field);
        self
    }

    /// Declare a method implemented by a closure over the object.
    pub fn method<F>(
        mut self,
        name: impl Into<String>,
        params: Vec<ParamDescriptor>,
        result: ValueType,
        call: F,
    ) -> Self
    where
        F: Fn(&DynamicObject, &[Value]) -> AccessResult<Value> + Send + Sync + 'static,
    {
        let origin = self.ty.name().to_string();
        let invoker: Invoker = Arc::new(move |instance: &dyn Any, args: &[Value]| {
            call(as_dynamic(instance, &origin)?, args)
        });
        self.ty
            .push_method(MethodDescriptor::new(name, params, result, invoker));
        self.last = Some(MemberKind::Method);
        self
    }

    /// Attach a marker to the most recently declared member.
    pub fn tagged(mut self, marker: Marker) -> Self {
        if let Some(kind) = self.last {
            self.ty.tag_last(kind, marker);
        }
        self
    }

    pub fn build(self) -> Arc<OriginType> {
        Arc::new(self.ty)
    }

    fn slot_getter(&self, name: &str) -> Getter {
        let origin = self.ty.name().to_string();
        let slot = name.to_string();
        Arc::new(move |instance: &dyn Any| Ok(as_dynamic(instance, &origin)?.get(&slot)))
    }
}
