//! End-to-end test: result translation through synthesized adapters.
//!
//! Covers text-to-int extraction, per-type translators over a List of
//! heterogeneous checks, and exact-before-subtype translator resolution.

use std::sync::Arc;

use adapter_engine::{
    standard, AdapterFactory, OperationDescriptor, SynthesisError, TranslatorRegistry, Variance,
    WrapperCache,
};
use adapter_tests::{checkpoint, init_tracing, Sensor};
use adapter_types::{DynamicObject, Marker, Value, ValueType, WrapperContract};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn readings_cache() -> WrapperCache {
    let contract = WrapperContract::new("Gauge").operation("value", vec![], ValueType::Int);
    let factory = AdapterFactory::builder(contract)
        .descriptor(
            OperationDescriptor::singleton("value")
                .marked("measure")
                .results(TranslatorRegistry::new().exact(
                    ValueType::Text,
                    ValueType::Int,
                    standard::parse_int(),
                ))
                .build()
                .unwrap(),
        )
        .build()
        .unwrap();
    WrapperCache::new(Arc::new(factory))
}

fn checks_cache() -> WrapperCache {
    let contract = WrapperContract::new("HealthCheck").operation("checks", vec![], ValueType::Bool);
    let results = TranslatorRegistry::new()
        .exact(ValueType::Unit, ValueType::Bool, standard::constant(Value::Bool(true)))
        .exact(ValueType::Text, ValueType::Bool, standard::equals_ignore_case("yes"))
        .exact(ValueType::Bool, ValueType::Bool, standard::identity());
    let factory = AdapterFactory::builder(contract)
        .descriptor(
            OperationDescriptor::list("checks")
                .marked("check")
                .results(results)
                .build()
                .unwrap(),
        )
        .build()
        .unwrap();
    WrapperCache::new(Arc::new(factory))
}

fn all_true(values: &[Value]) -> bool {
    values.iter().all(|v| v.as_bool() == Some(true))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[test]
fn text_field_is_returned_as_int() {
    init_tracing();
    let cache = readings_cache();
    let wrapper = cache.adapt(Sensor::shared("s-1", "42")).unwrap();
    let value = wrapper.call("value", &[]).unwrap();
    assert_eq!(value, Value::Int(42));
    assert_eq!(value.value_type(), ValueType::Int);
}

#[test]
fn unparsable_reading_propagates_translation_error() {
    let cache = readings_cache();
    let wrapper = cache.adapt(Sensor::shared("s-1", "n/a")).unwrap();
    let err = wrapper.call("value", &[]).unwrap_err();
    assert!(matches!(err, adapter_engine::AdaptError::Translation(_)));
}

#[test]
fn heterogeneous_checks_reduce_with_and() {
    init_tracing();
    let cache = checks_cache();

    let yes = cache.adapt(checkpoint("yes")).unwrap();
    let results = yes.call_each("checks", &[]).unwrap();
    assert_eq!(results, vec![Value::Bool(true); 3]);
    assert!(all_true(&results));

    let shouted = cache.adapt(checkpoint("YES")).unwrap();
    assert!(all_true(&shouted.call_each("checks", &[]).unwrap()));

    let no = cache.adapt(checkpoint("no")).unwrap();
    let results = no.call_each("checks", &[]).unwrap();
    assert_eq!(results[1], Value::Bool(false));
    assert!(!all_true(&results));

    assert_eq!(cache.factory().summary().compiled_types, 1);
}

#[test]
fn exact_translator_wins_over_subtype_translator() {
    let contract = WrapperContract::new("Described").operation("describe", vec![], ValueType::Text);
    let results = TranslatorRegistry::new()
        .with(
            ValueType::Number,
            Variance::AppliesToSubtypes,
            ValueType::Text,
            |v| Ok(Value::text(format!("number:{}", v))),
        )
        .exact(ValueType::Long, ValueType::Text, |v| {
            Ok(Value::text(format!("long:{}", v)))
        });
    let factory = AdapterFactory::builder(contract)
        .descriptor(
            OperationDescriptor::singleton("describe")
                .marked("amount")
                .results(results)
                .build()
                .unwrap(),
        )
        .build()
        .unwrap();
    let cache = WrapperCache::new(Arc::new(factory));

    let long_type = DynamicObject::schema("LongAmount")
        .field("value", ValueType::Long)
        .tagged(Marker::new("amount"))
        .build();
    let double_type = DynamicObject::schema("DoubleAmount")
        .field("value", ValueType::Double)
        .tagged(Marker::new("amount"))
        .build();

    let long = cache
        .adapt(Arc::new(DynamicObject::new(long_type, [("value", Value::Long(7))])))
        .unwrap();
    assert_eq!(long.call("describe", &[]).unwrap(), Value::text("long:7L"));

    let double = cache
        .adapt(Arc::new(DynamicObject::new(double_type, [("value", Value::Double(1.5))])))
        .unwrap();
    assert_eq!(double.call("describe", &[]).unwrap(), Value::text("number:1.5"));
}

#[test]
fn matching_result_type_bypasses_registered_translators() {
    let contract = WrapperContract::new("Named").operation("name", vec![], ValueType::Text);
    let results = TranslatorRegistry::new()
        .exact(ValueType::Text, ValueType::Int, standard::parse_int())
        .with(
            ValueType::Number,
            Variance::AppliesToSubtypes,
            ValueType::Text,
            standard::to_text(),
        );
    let factory = AdapterFactory::builder(contract)
        .descriptor(
            OperationDescriptor::singleton("name")
                .marked("label")
                .results(results)
                .build()
                .unwrap(),
        )
        .build()
        .unwrap();
    let label_type = DynamicObject::schema("Label")
        .field("n", ValueType::Text)
        .tagged(Marker::new("label"))
        .build();
    let wrapper = WrapperCache::new(Arc::new(factory))
        .adapt(Arc::new(DynamicObject::new(label_type, [("n", Value::text("hello"))])))
        .unwrap();
    assert_eq!(wrapper.call("name", &[]).unwrap(), Value::text("hello"));
}

#[test]
fn missing_translator_aborts_synthesis_with_context() {
    let contract = WrapperContract::new("Flag").operation("enabled", vec![], ValueType::Bool);
    let factory = AdapterFactory::builder(contract)
        .descriptor(OperationDescriptor::singleton("enabled").marked("measure").build().unwrap())
        .build()
        .unwrap();
    let err = factory
        .compile(&adapter_types::Adaptable::origin_type(&Sensor::new("s", "1")))
        .unwrap_err();
    match err {
        SynthesisError::NoSuitableTranslatorFound {
            origin,
            operation,
            member,
            from,
            to,
        } => {
            assert_eq!(origin, "Sensor");
            assert_eq!(operation, "enabled");
            assert_eq!(member, "reading");
            assert_eq!(from, ValueType::Text);
            assert_eq!(to, ValueType::Bool);
        }
        other => panic!("unexpected error: {}", other),
    }
}
