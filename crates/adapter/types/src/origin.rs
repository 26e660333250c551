//! Origin-type metadata.
//!
//! An [`OriginType`] describes the type being adapted: its markers, its
//! fields and its callable methods, each in declaration order. Every member
//! carries a bound accessor, a type-erased closure over `&dyn Any` that reads,
//! writes or invokes the member on a concrete instance. Accessors are built
//! once per type and shared by every delegate compiled against it.

use std::any::Any;
use std::marker::PhantomData;
use std::sync::{Arc, OnceLock};

use serde::{Deserialize, Serialize};

use crate::error::{AccessError, AccessResult};
use crate::marker::{Marker, MarkerSet};
use crate::types::ValueType;
use crate::value::Value;

// ── Bound Accessors ──────────────────────────────────────────────────

/// Reads a field from an instance.
pub type Getter = Arc<dyn Fn(&dyn Any) -> AccessResult<Value> + Send + Sync>;

/// Writes a field on an instance. Origins supply their own interior mutability.
pub type Setter = Arc<dyn Fn(&dyn Any, Value) -> AccessResult<()> + Send + Sync>;

/// Invokes a method on an instance with already-routed arguments.
pub type Invoker = Arc<dyn Fn(&dyn Any, &[Value]) -> AccessResult<Value> + Send + Sync>;

// ── Members ──────────────────────────────────────────────────────────

/// A field of an origin type.
#[derive(Clone)]
pub struct FieldDescriptor {
    pub name: String,
    pub value_type: ValueType,
    pub markers: MarkerSet,
    getter: Getter,
    setter: Option<Setter>,
}

impl FieldDescriptor {
    /// A read-only field.
    pub fn new(name: impl Into<String>, value_type: ValueType, getter: Getter) -> Self {
        Self {
            name: name.into(),
            value_type,
            markers: MarkerSet::new(),
            getter,
            setter: None,
        }
    }

    /// Attach a setter, making the field writable.
    pub fn with_setter(mut self, setter: Setter) -> Self {
        self.setter = Some(setter);
        self
    }

    pub fn with_marker(mut self, marker: Marker) -> Self {
        self.markers.insert(marker);
        self
    }

    pub fn is_writable(&self) -> bool {
        self.setter.is_some()
    }

    pub fn getter(&self) -> Getter {
        Arc::clone(&self.getter)
    }

    pub fn setter(&self) -> Option<Setter> {
        self.setter.clone()
    }

    pub fn read(&self, instance: &dyn Any) -> AccessResult<Value> {
        (self.getter)(instance)
    }
}

impl std::fmt::Debug for FieldDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("name", &self.name)
            .field("value_type", &self.value_type)
            .field("markers", &self.markers)
            .field("writable", &self.is_writable())
            .finish()
    }
}

/// A declared parameter of an origin method.
#[derive(Clone, Debug, PartialEq)]
pub struct ParamDescriptor {
    pub name: String,
    pub value_type: ValueType,
    pub markers: MarkerSet,
    /// Value supplied when no wrapper argument is routed to this parameter.
    pub default: Option<Value>,
}

impl ParamDescriptor {
    pub fn new(name: impl Into<String>, value_type: ValueType) -> Self {
        Self {
            name: name.into(),
            value_type,
            markers: MarkerSet::new(),
            default: None,
        }
    }

    pub fn marked(mut self, marker: Marker) -> Self {
        self.markers.insert(marker);
        self
    }

    /// Make the parameter optional, falling back to `default`.
    pub fn optional(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        self
    }

    pub fn is_required(&self) -> bool {
        self.default.is_none()
    }
}

/// A callable member of an origin type.
#[derive(Clone)]
pub struct MethodDescriptor {
    pub name: String,
    pub params: Vec<ParamDescriptor>,
    pub result: ValueType,
    pub markers: MarkerSet,
    invoker: Invoker,
}

impl MethodDescriptor {
    pub fn new(
        name: impl Into<String>,
        params: Vec<ParamDescriptor>,
        result: ValueType,
        invoker: Invoker,
    ) -> Self {
        Self {
            name: name.into(),
            params,
            result,
            markers: MarkerSet::new(),
            invoker,
        }
    }

    pub fn with_marker(mut self, marker: Marker) -> Self {
        self.markers.insert(marker);
        self
    }

    pub fn invoker(&self) -> Invoker {
        Arc::clone(&self.invoker)
    }

    pub fn invoke(&self, instance: &dyn Any, args: &[Value]) -> AccessResult<Value> {
        (self.invoker)(instance, args)
    }
}

impl std::fmt::Debug for MethodDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MethodDescriptor")
            .field("name", &self.name)
            .field("params", &self.params)
            .field("result", &self.result)
            .field("markers", &self.markers)
            .finish()
    }
}

/// Kind of an origin member.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MemberKind {
    Field,
    Method,
}

impl std::fmt::Display for MemberKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Field => write!(f, "field"),
            Self::Method => write!(f, "method"),
        }
    }
}

/// Borrowed view of either kind of member.
#[derive(Clone, Copy, Debug)]
pub enum MemberRef<'a> {
    Field(&'a FieldDescriptor),
    Method(&'a MethodDescriptor),
}

impl<'a> MemberRef<'a> {
    pub fn name(&self) -> &'a str {
        match self {
            Self::Field(f) => &f.name,
            Self::Method(m) => &m.name,
        }
    }

    pub fn kind(&self) -> MemberKind {
        match self {
            Self::Field(_) => MemberKind::Field,
            Self::Method(_) => MemberKind::Method,
        }
    }

    pub fn markers(&self) -> &'a MarkerSet {
        match self {
            Self::Field(f) => &f.markers,
            Self::Method(m) => &m.markers,
        }
    }

    /// Type produced by reading the field or invoking the method.
    pub fn value_type(&self) -> &'a ValueType {
        match self {
            Self::Field(f) => &f.value_type,
            Self::Method(m) => &m.result,
        }
    }
}

impl std::fmt::Display for MemberRef<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} '{}'", self.kind(), self.name())
    }
}

// ── Origin Type ──────────────────────────────────────────────────────

/// Identity of one [`OriginType`], assigned when the type is created.
///
/// Two independently built types never share an id, even under the same
/// name. Clones of a type keep its id.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OriginTypeId(pub String);

impl OriginTypeId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

impl Default for OriginTypeId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for OriginTypeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "origin:{}", self.0)
    }
}

/// Immutable description of an adaptable type.
///
/// Adapter factories cache synthesized adapters by [`OriginType::id`]; the
/// name is only descriptive.
#[derive(Clone, Debug)]
pub struct OriginType {
    id: OriginTypeId,
    name: String,
    markers: MarkerSet,
    fields: Vec<FieldDescriptor>,
    methods: Vec<MethodDescriptor>,
}

impl OriginType {
    /// An empty origin type, to be filled with erased descriptors.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: OriginTypeId::new(),
            name: name.into(),
            markers: MarkerSet::new(),
            fields: Vec::new(),
            methods: Vec::new(),
        }
    }

    /// Typed builder binding accessors to the concrete Rust type `T`.
    pub fn builder<T: Any + Send + Sync>(name: impl Into<String>) -> OriginTypeBuilder<T> {
        OriginTypeBuilder {
            ty: Self::new(name),
            last: None,
            _instance: PhantomData,
        }
    }

    /// Return the shared instance stored in `cell`, initializing it on first use.
    pub fn shared(
        cell: &'static OnceLock<Arc<OriginType>>,
        init: impl FnOnce() -> OriginType,
    ) -> Arc<OriginType> {
        Arc::clone(cell.get_or_init(|| Arc::new(init())))
    }

    pub fn push_marker(&mut self, marker: Marker) {
        self.markers.insert(marker);
    }

    pub fn push_field(&mut self, field: FieldDescriptor) {
        self.fields.push(field);
    }

    pub fn push_method(&mut self, method: MethodDescriptor) {
        self.methods.push(method);
    }

    /// Attach a marker to the last declared member of the given kind.
    pub(crate) fn tag_last(&mut self, kind: MemberKind, marker: Marker) {
        match kind {
            MemberKind::Field => {
                if let Some(f) = self.fields.last_mut() {
                    f.markers.insert(marker);
                }
            }
            MemberKind::Method => {
                if let Some(m) = self.methods.last_mut() {
                    m.markers.insert(marker);
                }
            }
        }
    }

    pub fn id(&self) -> &OriginTypeId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Markers attached to the type itself.
    pub fn markers(&self) -> &MarkerSet {
        &self.markers
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub fn methods(&self) -> &[MethodDescriptor] {
        &self.methods
    }

    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn method(&self, name: &str) -> Option<&MethodDescriptor> {
        self.methods.iter().find(|m| m.name == name)
    }

    /// All members in discovery order: fields first, then methods, each in
    /// declaration order.
    pub fn members(&self) -> impl Iterator<Item = MemberRef<'_>> {
        self.fields
            .iter()
            .map(MemberRef::Field)
            .chain(self.methods.iter().map(MemberRef::Method))
    }

    pub fn member_count(&self) -> usize {
        self.fields.len() + self.methods.len()
    }

    /// This type as a declared value type.
    pub fn as_value_type(&self) -> ValueType {
        ValueType::Named(self.name.clone())
    }
}

// ── Typed Builder ────────────────────────────────────────────────────

/// Builds an [`OriginType`] whose accessors downcast to `T`.
///
/// [`tagged`](Self::tagged) attaches a marker to the most recently declared
/// member.
pub struct OriginTypeBuilder<T> {
    ty: OriginType,
    last: Option<MemberKind>,
    _instance: PhantomData<fn() -> T>,
}

fn downcast<'a, T: Any>(instance: &'a dyn Any, origin: &str) -> AccessResult<&'a T> {
    instance
        .downcast_ref::<T>()
        .ok_or_else(|| AccessError::InstanceMismatch {
            expected: origin.to_string(),
        })
}

impl<T: Any + Send + Sync> OriginTypeBuilder<T> {
    /// Attach a marker to the type itself.
    pub fn type_marker(mut self, marker: Marker) -> Self {
        self.ty.markers.insert(marker);
        self
    }

    /// Declare a read-only field.
    pub fn field<G>(mut self, name: impl Into<String>, value_type: ValueType, get: G) -> Self
    where
        G: Fn(&T) -> Value + Send + Sync + 'static,
    {
        let origin = self.ty.name.clone();
        let getter: Getter = Arc::new(move |instance: &dyn Any| {
            downcast::<T>(instance, &origin).map(&get)
        });
        self.ty.fields.push(FieldDescriptor::new(name, value_type, getter));
        self.last = Some(MemberKind::Field);
        self
    }

    /// Declare a writable field.
    pub fn field_mut<G, S>(
        mut self,
        name: impl Into<String>,
        value_type: ValueType,
        get: G,
        set: S,
    ) -> Self
    where
        G: Fn(&T) -> Value + Send + Sync + 'static,
        S: Fn(&T, Value) -> AccessResult<()> + Send + Sync + 'static,
    {
        let origin = self.ty.name.clone();
        let origin_w = origin.clone();
        let getter: Getter = Arc::new(move |instance: &dyn Any| {
            downcast::<T>(instance, &origin).map(&get)
        });
        let setter: Setter = Arc::new(move |instance: &dyn Any, value: Value| {
            set(downcast::<T>(instance, &origin_w)?, value)
        });
        self.ty
            .fields
            .push(FieldDescriptor::new(name, value_type, getter).with_setter(setter));
        self.last = Some(MemberKind::Field);
        self
    }

    /// Declare a callable method.
    pub fn method<F>(
        mut self,
        name: impl Into<String>,
        params: Vec<ParamDescriptor>,
        result: ValueType,
        call: F,
    ) -> Self
    where
        F: Fn(&T, &[Value]) -> AccessResult<Value> + Send + Sync + 'static,
    {
        let origin = self.ty.name.clone();
        let invoker: Invoker = Arc::new(move |instance: &dyn Any, args: &[Value]| {
            call(downcast::<T>(instance, &origin)?, args)
        });
        self.ty
            .methods
            .push(MethodDescriptor::new(name, params, result, invoker));
        self.last = Some(MemberKind::Method);
        self
    }

    /// Attach a marker to the most recently declared member. Ignored when no
    /// member has been declared yet.
    pub fn tagged(mut self, marker: Marker) -> Self {
        if let Some(kind) = self.last {
            self.ty.tag_last(kind, marker);
        }
        self
    }

    pub fn build(self) -> OriginType {
        self.ty
    }
}
