//! Operation descriptors.
//!
//! One [`OperationDescriptor`] per contract operation says which origin
//! members serve it, how many (the [`Cardinality`]), and how values are
//! converted on the way in and out. Descriptors are assembled with a
//! [`DescriptorBuilder`] and are immutable once built; the same descriptor is
//! compiled against every origin type the factory later sees, producing one
//! [`Enhancer`] per origin type.

use std::collections::BTreeMap;

use adapter_types::{MemberRef, OperationSignature, OriginType, TypeHierarchy, Value};
use serde::{Deserialize, Serialize};

use crate::atom::{Atom, AtomGenerator};
use crate::config::{AmbiguityPolicy, DuplicateKeyPolicy, FactoryConfig};
use crate::error::{ConfigError, ConfigResult, SynthesisError, SynthesisResult};
use crate::router::ParameterSource;
use crate::selector::{Criterion, MemberSelector, Selection};
use crate::translator::TranslatorRegistry;

/// How many origin members one operation binds to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cardinality {
    /// Exactly one member, or a default value.
    Singleton,
    /// Every matching member, in discovery order.
    List,
    /// Every matching member, keyed.
    Map,
    /// One writable member; absent members make the operation a no-op.
    Setter,
}

impl std::fmt::Display for Cardinality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Singleton => write!(f, "singleton"),
            Self::List => write!(f, "list"),
            Self::Map => write!(f, "map"),
            Self::Setter => write!(f, "setter"),
        }
    }
}

/// Where a Map member's key comes from.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyRule {
    /// The payload of the marker that made the member match.
    #[default]
    Payload,
    /// The member's name.
    MemberName,
    /// The payload of the named marker on the member.
    MarkerPayload(String),
}

impl KeyRule {
    fn key_for(&self, selection: &Selection<'_>) -> Option<String> {
        let payload = match self {
            Self::MemberName => return Some(selection.member.name().to_string()),
            Self::Payload => selection.payload.as_ref(),
            Self::MarkerPayload(key) => selection.member.markers().payload(key),
        };
        match payload? {
            Value::Text(s) => Some(s.clone()),
            Value::Bool(b) => Some(b.to_string()),
            Value::Int(i) => Some(i.to_string()),
            Value::Long(l) => Some(l.to_string()),
            _ => None,
        }
    }
}

// ── Descriptor ───────────────────────────────────────────────────────

/// Finalized mapping for one contract operation.
#[derive(Clone, Debug)]
pub struct OperationDescriptor {
    operation: String,
    cardinality: Cardinality,
    criterion: Option<Criterion>,
    default: Option<Value>,
    key_rule: KeyRule,
    results: TranslatorRegistry,
    params: TranslatorRegistry,
    routing: Vec<ParameterSource>,
}

impl OperationDescriptor {
    pub fn singleton(operation: impl Into<String>) -> DescriptorBuilder {
        DescriptorBuilder::new(operation, Cardinality::Singleton)
    }

    pub fn list(operation: impl Into<String>) -> DescriptorBuilder {
        DescriptorBuilder::new(operation, Cardinality::List)
    }

    pub fn map(operation: impl Into<String>) -> DescriptorBuilder {
        DescriptorBuilder::new(operation, Cardinality::Map)
    }

    pub fn setter(operation: impl Into<String>) -> DescriptorBuilder {
        DescriptorBuilder::new(operation, Cardinality::Setter)
    }

    /// A Singleton that always returns `value`, whatever the origin type.
    pub fn constant(operation: impl Into<String>, value: impl Into<Value>) -> DescriptorBuilder {
        DescriptorBuilder::new(operation, Cardinality::Singleton).default_value(value)
    }

    pub fn operation(&self) -> &str {
        &self.operation
    }

    pub fn cardinality(&self) -> Cardinality {
        self.cardinality
    }

    pub fn criterion(&self) -> Option<&Criterion> {
        self.criterion.as_ref()
    }

    pub fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    pub fn key_rule(&self) -> &KeyRule {
        &self.key_rule
    }

    pub fn routing(&self) -> &[ParameterSource] {
        &self.routing
    }

    /// Check the descriptor against the contract operation it serves.
    pub(crate) fn validate_against(
        &self,
        signature: &OperationSignature,
        hierarchy: &TypeHierarchy,
    ) -> ConfigResult<()> {
        if let Some(source) = self
            .routing
            .iter()
            .find(|s| s.wrapper_arg >= signature.arity())
        {
            return Err(ConfigError::ArgumentOutOfRange {
                descriptor: self.operation.clone(),
                index: source.wrapper_arg,
                arity: signature.arity(),
            });
        }
        if let Some(default) = &self.default {
            let found = default.value_type();
            if !default.is_null() && !hierarchy.is_assignable(&found, &signature.result) {
                return Err(ConfigError::DefaultTypeMismatch {
                    descriptor: self.operation.clone(),
                    expected: signature.result.clone(),
                    found,
                });
            }
        }
        Ok(())
    }

    /// Bind this descriptor to the members of `origin`.
    pub fn compile(
        &self,
        origin: &OriginType,
        signature: &OperationSignature,
        generator: &AtomGenerator<'_>,
        config: &FactoryConfig,
    ) -> SynthesisResult<Enhancer> {
        let selections = match &self.criterion {
            Some(criterion) => MemberSelector::new().select(origin, criterion),
            None => Vec::new(),
        };

        let slot = match self.cardinality {
            Cardinality::Singleton => self.compile_singleton(origin, signature, generator, config, &selections)?,
            Cardinality::List => OperationSlot::List(
                selections
                    .iter()
                    .map(|s| self.read_atom(origin, signature, generator, s.member))
                    .collect::<SynthesisResult<Vec<_>>>()?,
            ),
            Cardinality::Map => self.compile_map(origin, signature, generator, config, &selections)?,
            Cardinality::Setter => self.compile_setter(origin, signature, generator, config, &selections)?,
        };

        tracing::debug!(
            origin = %origin.name(),
            operation = %self.operation,
            cardinality = %self.cardinality,
            atoms = slot.len(),
            "Enhancer compiled"
        );

        Ok(Enhancer {
            signature: signature.clone(),
            cardinality: self.cardinality,
            slot,
        })
    }

    fn compile_singleton(
        &self,
        origin: &OriginType,
        signature: &OperationSignature,
        generator: &AtomGenerator<'_>,
        config: &FactoryConfig,
        selections: &[Selection<'_>],
    ) -> SynthesisResult<OperationSlot> {
        match self.pick_one(origin, config, selections)? {
            Some(member) => Ok(OperationSlot::Single(
                self.read_atom(origin, signature, generator, member)?,
            )),
            None => match &self.default {
                Some(value) => Ok(OperationSlot::Single(generator.for_constant(value.clone()))),
                None => Err(SynthesisError::MissingMember {
                    origin: origin.name().to_string(),
                    operation: self.operation.clone(),
                    criterion: self
                        .criterion
                        .as_ref()
                        .map(|c| c.to_string())
                        .unwrap_or_else(|| "<none>".to_string()),
                }),
            },
        }
    }

    fn compile_setter(
        &self,
        origin: &OriginType,
        signature: &OperationSignature,
        generator: &AtomGenerator<'_>,
        config: &FactoryConfig,
        selections: &[Selection<'_>],
    ) -> SynthesisResult<OperationSlot> {
        let atom = match self.pick_one(origin, config, selections)? {
            Some(MemberRef::Field(field)) => {
                generator.for_setter(origin, signature, field, &self.params)?
            }
            Some(MemberRef::Method(method)) => generator.for_method(
                origin,
                signature,
                method,
                &self.routing,
                &self.params,
                &self.results,
            )?,
            None => {
                tracing::warn!(
                    origin = %origin.name(),
                    operation = %self.operation,
                    "No member to write, setter does nothing"
                );
                generator.for_noop()
            }
        };
        Ok(OperationSlot::Single(atom))
    }

    fn compile_map(
        &self,
        origin: &OriginType,
        signature: &OperationSignature,
        generator: &AtomGenerator<'_>,
        config: &FactoryConfig,
        selections: &[Selection<'_>],
    ) -> SynthesisResult<OperationSlot> {
        let mut atoms: BTreeMap<String, Atom> = BTreeMap::new();
        for selection in selections {
            let member = selection.member;
            let key = self
                .key_rule
                .key_for(selection)
                .ok_or_else(|| SynthesisError::MissingMapKey {
                    origin: origin.name().to_string(),
                    operation: self.operation.clone(),
                    member: member.name().to_string(),
                })?;
            if atoms.contains_key(&key) {
                match config.duplicate_keys {
                    DuplicateKeyPolicy::Reject => {
                        return Err(SynthesisError::DuplicateMapKey {
                            origin: origin.name().to_string(),
                            operation: self.operation.clone(),
                            key,
                        })
                    }
                    DuplicateKeyPolicy::KeepFirst => {
                        tracing::warn!(
                            origin = %origin.name(),
                            operation = %self.operation,
                            key = %key,
                            member = %member.name(),
                            "Duplicate map key, keeping first member"
                        );
                        continue;
                    }
                    DuplicateKeyPolicy::Overwrite => {
                        tracing::warn!(
                            origin = %origin.name(),
                            operation = %self.operation,
                            key = %key,
                            member = %member.name(),
                            "Duplicate map key, overwriting"
                        );
                    }
                }
            }
            let atom = self.read_atom(origin, signature, generator, member)?;
            atoms.insert(key, atom);
        }
        Ok(OperationSlot::Map(atoms))
    }

    /// Apply the ambiguity policy to a Singleton or Setter selection.
    fn pick_one<'a>(
        &self,
        origin: &OriginType,
        config: &FactoryConfig,
        selections: &[Selection<'a>],
    ) -> SynthesisResult<Option<MemberRef<'a>>> {
        match selections {
            [] => Ok(None),
            [only] => Ok(Some(only.member)),
            [first, ..] => {
                let candidates: Vec<String> =
                    selections.iter().map(|s| s.member.name().to_string()).collect();
                match config.ambiguity {
                    AmbiguityPolicy::Reject => Err(SynthesisError::AmbiguousMember {
                        origin: origin.name().to_string(),
                        operation: self.operation.clone(),
                        candidates,
                    }),
                    AmbiguityPolicy::FirstMatch => {
                        tracing::warn!(
                            origin = %origin.name(),
                            operation = %self.operation,
                            chosen = %first.member.name(),
                            candidates = ?candidates,
                            "Several members match, using the first"
                        );
                        Ok(Some(first.member))
                    }
                }
            }
        }
    }

    fn read_atom(
        &self,
        origin: &OriginType,
        signature: &OperationSignature,
        generator: &AtomGenerator<'_>,
        member: MemberRef<'_>,
    ) -> SynthesisResult<Atom> {
        match member {
            MemberRef::Field(field) => generator.for_field(origin, signature, field, &self.results),
            MemberRef::Method(method) => generator.for_method(
                origin,
                signature,
                method,
                &self.routing,
                &self.params,
                &self.results,
            ),
        }
    }
}

// ── Builder ──────────────────────────────────────────────────────────

/// A descriptor still being configured.
#[derive(Clone, Debug)]
pub struct DescriptorBuilder {
    operation: String,
    cardinality: Cardinality,
    criterion: Option<Criterion>,
    default: Option<Value>,
    key_rule: KeyRule,
    results: TranslatorRegistry,
    params: TranslatorRegistry,
    routing: Vec<ParameterSource>,
}

impl DescriptorBuilder {
    fn new(operation: impl Into<String>, cardinality: Cardinality) -> Self {
        Self {
            operation: operation.into(),
            cardinality,
            criterion: None,
            default: None,
            key_rule: KeyRule::default(),
            results: TranslatorRegistry::new(),
            params: TranslatorRegistry::new(),
            routing: Vec::new(),
        }
    }

    /// Members matching `criterion` serve the operation.
    pub fn select(mut self, criterion: Criterion) -> Self {
        self.criterion = Some(criterion);
        self
    }

    /// Shorthand for selecting members carrying marker `key`.
    pub fn marked(self, key: impl Into<String>) -> Self {
        self.select(Criterion::marker(key))
    }

    /// Value returned by a Singleton when no member matches.
    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn key(mut self, rule: KeyRule) -> Self {
        self.key_rule = rule;
        self
    }

    /// Translators applied to member results.
    pub fn results(mut self, translators: TranslatorRegistry) -> Self {
        self.results = translators;
        self
    }

    /// Translators applied to positional arguments and setter values.
    pub fn params(mut self, translators: TranslatorRegistry) -> Self {
        self.params = translators;
        self
    }

    /// Add a routed parameter source. Any source switches the descriptor
    /// from positional to routed arguments.
    pub fn route(mut self, source: ParameterSource) -> Self {
        self.routing.push(source);
        self
    }

    /// Finalize. Fails naming the first missing mandatory field.
    pub fn build(self) -> ConfigResult<OperationDescriptor> {
        if self.operation.trim().is_empty() {
            return Err(ConfigError::MissingField {
                descriptor: format!("<{} descriptor>", self.cardinality),
                field: "operation name".to_string(),
            });
        }
        let needs_criterion = match self.cardinality {
            Cardinality::Singleton => self.default.is_none(),
            Cardinality::List | Cardinality::Map | Cardinality::Setter => true,
        };
        if needs_criterion && self.criterion.is_none() {
            return Err(ConfigError::MissingField {
                descriptor: self.operation,
                field: "selection criterion".to_string(),
            });
        }
        if self.default.is_some() && self.cardinality != Cardinality::Singleton {
            return Err(ConfigError::InvalidConfig(format!(
                "descriptor '{}': a default value only applies to singleton operations",
                self.operation
            )));
        }
        Ok(OperationDescriptor {
            operation: self.operation,
            cardinality: self.cardinality,
            criterion: self.criterion,
            default: self.default,
            key_rule: self.key_rule,
            results: self.results,
            params: self.params,
            routing: self.routing,
        })
    }
}

// ── Enhancer ─────────────────────────────────────────────────────────

/// Atoms held by a synthesized adapter for one operation.
#[derive(Clone)]
pub enum OperationSlot {
    Single(Atom),
    List(Vec<Atom>),
    Map(BTreeMap<String, Atom>),
}

impl OperationSlot {
    pub fn len(&self) -> usize {
        match self {
            Self::Single(_) => 1,
            Self::List(atoms) => atoms.len(),
            Self::Map(atoms) => atoms.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for OperationSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        fn label(atom: &Atom) -> String {
            match atom.member() {
                Some(member) => format!("{}({})", atom.kind(), member),
                None => atom.kind().to_string(),
            }
        }
        match self {
            Self::Single(atom) => write!(f, "Single({})", label(atom)),
            Self::List(atoms) => f
                .debug_tuple("List")
                .field(&atoms.iter().map(label).collect::<Vec<_>>())
                .finish(),
            Self::Map(atoms) => f
                .debug_tuple("Map")
                .field(
                    &atoms
                        .iter()
                        .map(|(k, a)| (k.as_str(), label(a)))
                        .collect::<BTreeMap<_, _>>(),
                )
                .finish(),
        }
    }
}

/// One descriptor compiled against one origin type.
#[derive(Clone, Debug)]
pub struct Enhancer {
    pub signature: OperationSignature,
    pub cardinality: Cardinality,
    pub slot: OperationSlot,
}

impl Enhancer {
    pub fn operation(&self) -> &str {
        &self.signature.name
    }
}
