//! Shared fixtures for the adapter engine test suites.

use std::any::Any;
use std::sync::{Arc, OnceLock};

use adapter_types::{
    AccessError, Adaptable, DynamicObject, Marker, OriginType, ParamDescriptor, Value, ValueType,
};
use parking_lot::Mutex;

/// Install a test subscriber honoring `RUST_LOG`. Safe to call repeatedly.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

// ── Sensor ───────────────────────────────────────────────────────────

/// A typed origin whose reading is kept as text.
pub struct Sensor {
    pub id: String,
    pub reading: Mutex<String>,
    pub offset: Mutex<i64>,
}

impl Sensor {
    pub fn new(id: impl Into<String>, reading: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            reading: Mutex::new(reading.into()),
            offset: Mutex::new(0),
        }
    }

    pub fn shared(id: impl Into<String>, reading: impl Into<String>) -> Arc<Self> {
        Arc::new(Self::new(id, reading))
    }
}

impl Adaptable for Sensor {
    fn origin_type(&self) -> Arc<OriginType> {
        static TYPE: OnceLock<Arc<OriginType>> = OnceLock::new();
        OriginType::shared(&TYPE, || {
            OriginType::builder::<Sensor>("Sensor")
                .type_marker(Marker::new("device"))
                .field("id", ValueType::Text, |s| Value::text(&s.id))
                .tagged(Marker::new("key"))
                .field_mut(
                    "reading",
                    ValueType::Text,
                    |s| Value::text(s.reading.lock().as_str()),
                    |s, v| match v {
                        Value::Text(text) => {
                            *s.reading.lock() = text;
                            Ok(())
                        }
                        other => Err(AccessError::TypeMismatch {
                            member: "reading".into(),
                            expected: "text".into(),
                            found: other.value_type().to_string(),
                        }),
                    },
                )
                .tagged(Marker::with_payload("measure", "raw"))
                .method(
                    "calibrate",
                    vec![ParamDescriptor::new("offset", ValueType::Long)],
                    ValueType::Unit,
                    |s, args| {
                        *s.offset.lock() = args.first().and_then(Value::as_long).unwrap_or(0);
                        Ok(Value::Unit)
                    },
                )
                .tagged(Marker::new("action"))
                .build()
        })
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

// ── Checkpoint ────────────────────────────────────────────────────────────

/// Dynamic origin with three checks returning void, text and bool.
pub fn checkpoint_type() -> Arc<OriginType> {
    static TYPE: OnceLock<Arc<OriginType>> = OnceLock::new();
    Arc::clone(TYPE.get_or_init(|| {
        DynamicObject::schema("Checkpoint")
            .field("answer", ValueType::Text)
            .method("ping", vec![], ValueType::Unit, |_, _| Ok(Value::Unit))
            .tagged(Marker::new("check"))
            .method("status", vec![], ValueType::Text, |obj, _| Ok(obj.get("answer")))
            .tagged(Marker::new("check"))
            .method("ready", vec![], ValueType::Bool, |_, _| Ok(Value::Bool(true)))
            .tagged(Marker::new("check"))
            .build()
    }))
}

/// A checkpoint whose `status` check answers `answer`.
pub fn checkpoint(answer: &str) -> Arc<DynamicObject> {
    Arc::new(DynamicObject::new(
        checkpoint_type(),
        [("answer", Value::text(answer))],
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixtures_are_consistent() {
        let sensor = Sensor::new("s-1", "42");
        let ty = sensor.origin_type();
        assert_eq!(ty.name(), "Sensor");
        assert!(Arc::ptr_eq(&ty, &Sensor::new("s-2", "0").origin_type()));
        assert_eq!(ty.member_count(), 3);

        let p = checkpoint("yes");
        assert_eq!(p.origin_type().methods().len(), 3);
        assert_eq!(p.get("answer"), Value::text("yes"));
    }
}
