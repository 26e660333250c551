//! End-to-end test: Singleton defaults, Setter leniency and keyed Map access.

use std::sync::Arc;

use adapter_engine::{
    standard, AdaptError, AdapterFactory, AtomKind, DuplicateKeyPolicy, FactoryConfig, KeyRule,
    OperationDescriptor, OperationSlot, SynthesisError, TranslatorRegistry, WrapperCache,
};
use adapter_tests::{init_tracing, Sensor};
use adapter_types::{Adaptable, DynamicObject, Marker, OriginType, Value, ValueType, WrapperContract};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn profile_contract() -> WrapperContract {
    WrapperContract::new("Profile")
        .operation("retries", vec![], ValueType::Int)
        .operation("set_nickname", vec![ValueType::Text], ValueType::Unit)
        .operation("settings", vec![], ValueType::Text)
}

fn profile_cache(config: FactoryConfig) -> WrapperCache {
    let factory = AdapterFactory::builder(profile_contract())
        .descriptor(
            OperationDescriptor::singleton("retries")
                .marked("retries")
                .default_value(3)
                .build()
                .unwrap(),
        )
        .descriptor(OperationDescriptor::setter("set_nickname").marked("nickname").build().unwrap())
        .descriptor(
            OperationDescriptor::map("settings")
                .marked("setting")
                .results(TranslatorRegistry::new().exact(
                    ValueType::Bool,
                    ValueType::Text,
                    standard::to_text(),
                ))
                .build()
                .unwrap(),
        )
        .config(config)
        .build()
        .unwrap();
    WrapperCache::new(Arc::new(factory))
}

fn bare_type() -> Arc<OriginType> {
    DynamicObject::schema("Bare").field_mut("name", ValueType::Text).build()
}

fn user_type() -> Arc<OriginType> {
    DynamicObject::schema("User")
        .field_mut("nick", ValueType::Text)
        .tagged(Marker::new("nickname"))
        .field("theme", ValueType::Text)
        .tagged(Marker::with_payload("setting", "theme"))
        .field("beta", ValueType::Bool)
        .tagged(Marker::with_payload("setting", "beta"))
        .build()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[test]
fn singleton_default_is_returned_exactly() {
    init_tracing();
    let cache = profile_cache(FactoryConfig::default());
    let obj = Arc::new(DynamicObject::new(bare_type(), [("name", Value::text("x"))]));
    let wrapper = cache.adapt(obj).unwrap();
    assert_eq!(wrapper.call("retries", &[]).unwrap(), Value::Int(3));
}

#[test]
fn setter_without_target_is_callable_and_changes_nothing() {
    init_tracing();
    let cache = profile_cache(FactoryConfig::default());
    let obj = Arc::new(DynamicObject::new(bare_type(), [("name", Value::text("before"))]));
    let wrapper = cache.adapt(Arc::clone(&obj)).unwrap();

    let before = format!("{:?}", obj);
    assert_eq!(
        wrapper.call("set_nickname", &[Value::text("ignored")]).unwrap(),
        Value::Unit
    );
    assert_eq!(format!("{:?}", obj), before);
    assert_eq!(obj.get("name"), Value::text("before"));

    let enhancer = wrapper.adapter_type().enhancer("set_nickname").unwrap();
    match &enhancer.slot {
        OperationSlot::Single(atom) => assert_eq!(atom.kind(), AtomKind::Noop),
        other => panic!("unexpected slot {:?}", other),
    }
}

#[test]
fn setter_with_target_writes_through() {
    let cache = profile_cache(FactoryConfig::default());
    let obj = Arc::new(DynamicObject::new(
        user_type(),
        [
            ("nick", Value::text("ada")),
            ("theme", Value::text("dark")),
            ("beta", Value::Bool(true)),
        ],
    ));
    let wrapper = cache.adapt(Arc::clone(&obj)).unwrap();
    wrapper.call("set_nickname", &[Value::text("lovelace")]).unwrap();
    assert_eq!(obj.get("nick"), Value::text("lovelace"));
}

#[test]
fn map_is_keyed_by_marker_payload() {
    let cache = profile_cache(FactoryConfig::default());
    let obj = Arc::new(DynamicObject::new(
        user_type(),
        [("theme", Value::text("dark")), ("beta", Value::Bool(true))],
    ));
    let wrapper = cache.adapt(obj).unwrap();
    assert_eq!(wrapper.keys("settings").unwrap(), vec!["beta", "theme"]);
    assert_eq!(
        wrapper.call_keyed("settings", "beta", &[]).unwrap(),
        Some(Value::text("true"))
    );
    let all = wrapper.call("settings", &[]).unwrap();
    assert_eq!(all.as_map().unwrap()["theme"], Value::text("dark"));
    assert_eq!(wrapper.len("settings").unwrap(), 2);
}

#[test]
fn duplicate_map_keys_follow_the_configured_policy() {
    let clash = DynamicObject::schema("Clash")
        .field("a", ValueType::Text)
        .tagged(Marker::with_payload("setting", "color"))
        .field("b", ValueType::Text)
        .tagged(Marker::with_payload("setting", "color"))
        .build();

    let err = profile_cache(FactoryConfig::default())
        .constructor_for(&clash)
        .unwrap_err();
    assert!(matches!(err, SynthesisError::DuplicateMapKey { ref key, .. } if key == "color"));

    let lenient = FactoryConfig {
        duplicate_keys: DuplicateKeyPolicy::Overwrite,
        ..FactoryConfig::default()
    };
    let cache = profile_cache(lenient);
    let obj = Arc::new(DynamicObject::new(
        Arc::clone(&clash),
        [("a", Value::text("red")), ("b", Value::text("blue"))],
    ));
    let wrapper = cache.adapt(obj).unwrap();
    assert_eq!(
        wrapper.call_keyed("settings", "color", &[]).unwrap(),
        Some(Value::text("blue"))
    );
}

#[test]
fn map_keyed_by_member_name_on_a_typed_origin() {
    let contract = WrapperContract::new("Inventory").operation("fields", vec![], ValueType::Text);
    let factory = AdapterFactory::builder(contract)
        .descriptor(
            OperationDescriptor::map("fields")
                .select(adapter_engine::Criterion::Kind(adapter_types::MemberKind::Field))
                .key(KeyRule::MemberName)
                .build()
                .unwrap(),
        )
        .build()
        .unwrap();
    let cache = WrapperCache::new(Arc::new(factory));
    let wrapper = cache.adapt(Sensor::shared("s-9", "17")).unwrap();
    assert_eq!(wrapper.keys("fields").unwrap(), vec!["id", "reading"]);
    assert_eq!(
        wrapper.call_keyed("fields", "id", &[]).unwrap(),
        Some(Value::text("s-9"))
    );
}

#[test]
fn wrong_call_shape_is_an_adapt_error() {
    let cache = profile_cache(FactoryConfig::default());
    let obj = Arc::new(DynamicObject::new(bare_type(), Vec::<(String, Value)>::new()));
    let wrapper = cache.adapt(obj).unwrap();
    assert!(matches!(
        wrapper.call("set_nickname", &[]).unwrap_err(),
        AdaptError::ArityMismatch { expected: 1, found: 0, .. }
    ));
    assert!(matches!(
        wrapper.keys("retries").unwrap_err(),
        AdaptError::CardinalityMismatch { .. }
    ));
    assert_eq!(wrapper.origin().origin_type().name(), "Bare");
}
