//! Queryable tags attached to origin types and their members.
//!
//! A marker is a key with an optional payload. Member selection is a plain
//! predicate over marker sets, independent of how the markers were declared.

use serde::{Deserialize, Serialize};

use crate::value::Value;

/// A tag with an optional payload value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    pub key: String,
    pub payload: Option<Value>,
}

impl Marker {
    /// A marker without payload.
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            payload: None,
        }
    }

    /// A marker carrying a payload.
    pub fn with_payload(key: impl Into<String>, payload: impl Into<Value>) -> Self {
        Self {
            key: key.into(),
            payload: Some(payload.into()),
        }
    }
}

impl std::fmt::Display for Marker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.payload {
            Some(payload) => write!(f, "@{}({})", self.key, payload),
            None => write!(f, "@{}", self.key),
        }
    }
}

/// Declaration-ordered collection of markers.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MarkerSet {
    markers: Vec<Marker>,
}

impl MarkerSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, marker: Marker) {
        self.markers.push(marker);
    }

    /// First marker with the given key.
    pub fn get(&self, key: &str) -> Option<&Marker> {
        self.markers.iter().find(|m| m.key == key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Payload of the first marker with the given key, if both exist.
    pub fn payload(&self, key: &str) -> Option<&Value> {
        self.get(key).and_then(|m| m.payload.as_ref())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Marker> {
        self.markers.iter()
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }
}

impl FromIterator<Marker> for MarkerSet {
    fn from_iter<I: IntoIterator<Item = Marker>>(iter: I) -> Self {
        Self {
            markers: iter.into_iter().collect(),
        }
    }
}
