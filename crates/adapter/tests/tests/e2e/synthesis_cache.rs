//! End-to-end test: at most one synthesized adapter per origin type.
//!
//! Repeated and concurrent first-use compilation must converge on a single
//! synthesized type, and a failing type must not disturb the others.

use std::collections::HashSet;
use std::sync::Arc;

use adapter_engine::{AdapterFactory, OperationDescriptor, WrapperCache};
use adapter_tests::{init_tracing, Sensor};
use adapter_types::{Adaptable, DynamicObject, Marker, Value, ValueType, WrapperContract};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn identified_cache() -> WrapperCache {
    let contract = WrapperContract::new("Identified").operation("id", vec![], ValueType::Text);
    let factory = AdapterFactory::builder(contract)
        .descriptor(OperationDescriptor::singleton("id").marked("key").build().unwrap())
        .build()
        .unwrap();
    WrapperCache::new(Arc::new(factory))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[test]
fn repeated_compilation_returns_the_same_type() {
    init_tracing();
    let cache = identified_cache();
    let ty = Sensor::new("s", "0").origin_type();

    let first = cache.constructor_for(&ty).unwrap();
    for _ in 0..10 {
        let again = cache.constructor_for(&ty).unwrap();
        assert!(Arc::ptr_eq(first.adapter_type(), again.adapter_type()));
        assert_eq!(first.adapter_type().id, again.adapter_type().id);
    }

    let summary = cache.factory().summary();
    assert_eq!(summary.compiled_types, 1);
    assert_eq!(summary.cache_hits, 10);
    assert_eq!(summary.failed_compilations, 0);
}

#[test]
fn concurrent_first_use_synthesizes_once() {
    init_tracing();
    let cache = identified_cache();

    let ids: Vec<String> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..16)
            .map(|i| {
                let cache = &cache;
                scope.spawn(move || {
                    let wrapper = cache
                        .adapt(Sensor::shared(format!("s-{}", i), "0"))
                        .unwrap();
                    assert_eq!(
                        wrapper.call("id", &[]).unwrap(),
                        Value::text(format!("s-{}", i))
                    );
                    wrapper.adapter_type().id.0.clone()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    let distinct: HashSet<&String> = ids.iter().collect();
    assert_eq!(distinct.len(), 1);
    assert_eq!(cache.factory().summary().compiled_types, 1);
    assert_eq!(cache.factory().compiled_count(), 1);
}

#[test]
fn each_origin_type_gets_its_own_adapter() {
    let cache = identified_cache();
    let tag_type = DynamicObject::schema("Tag")
        .field("slug", ValueType::Text)
        .tagged(Marker::new("key"))
        .build();

    let sensor = cache.adapt(Sensor::shared("s-1", "0")).unwrap();
    let tag = cache
        .adapt(Arc::new(DynamicObject::new(tag_type, [("slug", Value::text("rust"))])))
        .unwrap();

    assert!(!Arc::ptr_eq(sensor.adapter_type(), tag.adapter_type()));
    assert_eq!(tag.call("id", &[]).unwrap(), Value::text("rust"));
    assert_eq!(tag.adapter_type().origin_type, "Tag");
    assert_eq!(tag.adapter_type().contract, "Identified");
    assert_eq!(cache.factory().summary().compiled_types, 2);
}

#[test]
fn failed_type_does_not_poison_the_cache() {
    let cache = identified_cache();
    let anonymous = DynamicObject::schema("Anonymous").field("x", ValueType::Text).build();

    for _ in 0..3 {
        assert!(cache.constructor_for(&anonymous).is_err());
    }
    assert!(!cache.factory().is_compiled(&anonymous));
    assert_eq!(cache.factory().summary().failed_compilations, 3);

    let wrapper = cache.adapt(Sensor::shared("s-2", "0")).unwrap();
    assert_eq!(wrapper.call("id", &[]).unwrap(), Value::text("s-2"));
}

#[test]
fn namesake_origin_types_are_compiled_separately() {
    let contract = WrapperContract::new("Titled").operation("title", vec![], ValueType::Text);
    let factory = AdapterFactory::builder(contract)
        .descriptor(OperationDescriptor::singleton("title").marked("title").build().unwrap())
        .build()
        .unwrap();
    let cache = WrapperCache::new(Arc::new(factory));

    let first = DynamicObject::schema("Item")
        .field("a", ValueType::Text)
        .tagged(Marker::new("title"))
        .build();
    let second = DynamicObject::schema("Item")
        .field("b", ValueType::Text)
        .tagged(Marker::new("title"))
        .build();

    let a = cache
        .adapt(Arc::new(DynamicObject::new(first, [("a", Value::text("A"))])))
        .unwrap();
    let b = cache
        .adapt(Arc::new(DynamicObject::new(second, [("b", Value::text("B"))])))
        .unwrap();

    assert_eq!(a.call("title", &[]).unwrap(), Value::text("A"));
    assert_eq!(b.call("title", &[]).unwrap(), Value::text("B"));
    assert_ne!(a.adapter_type().origin_id, b.adapter_type().origin_id);
    assert_eq!(cache.factory().summary().compiled_types, 2);
}
