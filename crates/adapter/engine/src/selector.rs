//! Member selection.
//!
//! A [`Criterion`] is a pure predicate over an origin member and its markers.
//! [`MemberSelector::select`] evaluates it across an origin type in discovery
//! order (fields first, then methods, each in declaration order) and returns
//! every match with the marker payload that made it match.

use std::sync::Arc;

use adapter_types::{MemberKind, MemberRef, OriginType, Value};

/// Custom predicate over a member of an origin type.
pub type MemberPredicate = Arc<dyn Fn(&OriginType, MemberRef<'_>) -> bool + Send + Sync>;

/// Selection criterion.
#[derive(Clone)]
pub enum Criterion {
    /// Member carries a marker with this key. Yields the marker payload.
    HasMarker(String),
    /// Member carries a marker with this key and exactly this payload.
    MarkerEquals(String, Value),
    /// Member has this name.
    Named(String),
    /// Member is of this kind.
    Kind(MemberKind),
    /// The origin type itself carries a marker with this key.
    OriginHasMarker(String),
    /// Every sub-criterion matches. Yields the first payload found.
    All(Vec<Criterion>),
    /// Some sub-criterion matches. Yields the payload of the first match.
    AnyOf(Vec<Criterion>),
    Not(Box<Criterion>),
    /// Arbitrary side-effect-free predicate.
    Predicate(MemberPredicate),
}

impl Criterion {
    pub fn marker(key: impl Into<String>) -> Self {
        Self::HasMarker(key.into())
    }

    pub fn marker_eq(key: impl Into<String>, payload: impl Into<Value>) -> Self {
        Self::MarkerEquals(key.into(), payload.into())
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self::Named(name.into())
    }

    /// Custom predicate. It runs while an origin type is being synthesized
    /// and may compile other origin types on the same factory, but not the
    /// one currently being selected from.
    pub fn predicate<F>(f: F) -> Self
    where
        F: Fn(&OriginType, MemberRef<'_>) -> bool + Send + Sync + 'static,
    {
        Self::Predicate(Arc::new(f))
    }

    /// Conjunction with another criterion.
    pub fn and(self, other: Criterion) -> Self {
        match self {
            Self::All(mut parts) => {
                parts.push(other);
                Self::All(parts)
            }
            first => Self::All(vec![first, other]),
        }
    }

    /// Restrict to fields.
    pub fn fields_only(self) -> Self {
        self.and(Self::Kind(MemberKind::Field))
    }

    /// Restrict to methods.
    pub fn methods_only(self) -> Self {
        self.and(Self::Kind(MemberKind::Method))
    }

    /// Evaluate against one member. `None` means no match; `Some(payload)`
    /// means a match carrying the given marker payload, if any.
    pub fn evaluate(&self, origin: &OriginType, member: MemberRef<'_>) -> Option<Option<Value>> {
        match self {
            Self::HasMarker(key) => member.markers().get(key).map(|m| m.payload.clone()),
            Self::MarkerEquals(key, expected) => member
                .markers()
                .iter()
                .find(|m| &m.key == key && m.payload.as_ref() == Some(expected))
                .map(|m| m.payload.clone()),
            Self::Named(name) => (member.name() == name).then_some(None),
            Self::Kind(kind) => (member.kind() == *kind).then_some(None),
            Self::OriginHasMarker(key) => origin.markers().contains(key).then_some(None),
            Self::All(parts) => {
                let mut payload = None;
                for part in parts {
                    let found = part.evaluate(origin, member)?;
                    if payload.is_none() {
                        payload = found;
                    }
                }
                Some(payload)
            }
            Self::AnyOf(parts) => parts.iter().find_map(|part| part.evaluate(origin, member)),
            Self::Not(inner) => match inner.evaluate(origin, member) {
                Some(_) => None,
                None => Some(None),
            },
            Self::Predicate(f) => f(origin, member).then_some(None),
        }
    }

    pub fn matches(&self, origin: &OriginType, member: MemberRef<'_>) -> bool {
        self.evaluate(origin, member).is_some()
    }
}

impl std::fmt::Display for Criterion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::HasMarker(key) => write!(f, "@{}", key),
            Self::MarkerEquals(key, value) => write!(f, "@{}({})", key, value),
            Self::Named(name) => write!(f, "name={}", name),
            Self::Kind(kind) => write!(f, "kind={}", kind),
            Self::OriginHasMarker(key) => write!(f, "origin@{}", key),
            Self::All(parts) => {
                let parts: Vec<String> = parts.iter().map(|p| p.to_string()).collect();
                write!(f, "({})", parts.join(" && "))
            }
            Self::AnyOf(parts) => {
                let parts: Vec<String> = parts.iter().map(|p| p.to_string()).collect();
                write!(f, "({})", parts.join(" || "))
            }
            Self::Not(inner) => write!(f, "!{}", inner),
            Self::Predicate(_) => write!(f, "<predicate>"),
        }
    }
}

impl std::fmt::Debug for Criterion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Criterion({})", self)
    }
}

/// A member matched by a criterion.
#[derive(Clone, Debug)]
pub struct Selection<'a> {
    pub member: MemberRef<'a>,
    pub payload: Option<Value>,
}

/// Stateless query over origin-type metadata.
#[derive(Clone, Copy, Debug, Default)]
pub struct MemberSelector;

impl MemberSelector {
    pub fn new() -> Self {
        Self
    }

    /// All matching members in discovery order. An empty result is not an error.
    pub fn select<'a>(&self, origin: &'a OriginType, criterion: &Criterion) -> Vec<Selection<'a>> {
        origin
            .members()
            .filter_map(|member| {
                criterion
                    .evaluate(origin, member)
                    .map(|payload| Selection { member, payload })
            })
            .collect()
    }
}
