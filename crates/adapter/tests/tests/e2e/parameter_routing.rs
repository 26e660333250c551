//! End-to-end test: routing wrapper arguments onto origin method parameters.

use std::sync::Arc;

use adapter_engine::{
    standard, AdapterFactory, ConfigError, OperationDescriptor, ParameterSource, SynthesisError,
    TranslatorRegistry, WrapperCache,
};
use adapter_tests::Sensor;
use adapter_types::{DynamicObject, Marker, OriginType, ParamDescriptor, Value, ValueType, WrapperContract};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn transfer_type() -> Arc<OriginType> {
    DynamicObject::schema("Transfer")
        .method(
            "send",
            vec![
                ParamDescriptor::new("amount", ValueType::Long),
                ParamDescriptor::new("memo", ValueType::Text).optional(""),
                ParamDescriptor::new("to", ValueType::Text).marked(Marker::new("account")),
            ],
            ValueType::Text,
            |_, args| {
                Ok(Value::text(format!(
                    "{} -> {} ({})",
                    args[0].as_long().unwrap_or_default(),
                    args[2].as_text().unwrap_or_default(),
                    args[1].as_text().unwrap_or_default()
                )))
            },
        )
        .tagged(Marker::new("pay"))
        .build()
}

fn payments_contract() -> WrapperContract {
    WrapperContract::new("Payments").operation(
        "pay",
        vec![ValueType::Text, ValueType::Text],
        ValueType::Text,
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[test]
fn routed_arguments_reach_marked_and_typed_parameters() {
    let factory = AdapterFactory::builder(payments_contract())
        .descriptor(
            OperationDescriptor::singleton("pay")
                .marked("pay")
                .route(ParameterSource::new(0).at_marker("account"))
                .route(ParameterSource::new(1).at_type(ValueType::Long).translators(
                    TranslatorRegistry::new().exact(
                        ValueType::Text,
                        ValueType::Long,
                        standard::parse_long(),
                    ),
                ))
                .build()
                .unwrap(),
        )
        .build()
        .unwrap();
    let cache = WrapperCache::new(Arc::new(factory));
    let wrapper = cache
        .adapt(Arc::new(DynamicObject::new(transfer_type(), Vec::<(String, Value)>::new())))
        .unwrap();
    assert_eq!(
        wrapper
            .call("pay", &[Value::text("acct-7"), Value::text("250")])
            .unwrap(),
        Value::text("250 -> acct-7 ()")
    );
}

#[test]
fn unbound_required_parameter_fails_synthesis() {
    let factory = AdapterFactory::builder(payments_contract())
        .descriptor(
            OperationDescriptor::singleton("pay")
                .marked("pay")
                .route(ParameterSource::new(0).at_marker("account"))
                .build()
                .unwrap(),
        )
        .build()
        .unwrap();
    let err = factory.compile(&transfer_type()).unwrap_err();
    assert_eq!(
        err,
        SynthesisError::UnboundParameter {
            origin: "Transfer".into(),
            operation: "pay".into(),
            member: "send".into(),
            parameter: "amount".into(),
        }
    );
}

#[test]
fn out_of_range_wrapper_argument_is_a_config_error() {
    let err = AdapterFactory::builder(payments_contract())
        .descriptor(
            OperationDescriptor::singleton("pay")
                .marked("pay")
                .route(ParameterSource::new(2))
                .build()
                .unwrap(),
        )
        .build()
        .unwrap_err();
    assert_eq!(
        err,
        ConfigError::ArgumentOutOfRange {
            descriptor: "pay".into(),
            index: 2,
            arity: 2,
        }
    );
}

#[test]
fn positional_arguments_feed_a_typed_origin_method() {
    let contract = WrapperContract::new("Calibrated").operation(
        "calibrate",
        vec![ValueType::Int],
        ValueType::Unit,
    );
    let factory = AdapterFactory::builder(contract)
        .descriptor(
            OperationDescriptor::singleton("calibrate")
                .marked("action")
                .params(TranslatorRegistry::new().exact(
                    ValueType::Int,
                    ValueType::Long,
                    standard::int_to_long(),
                ))
                .build()
                .unwrap(),
        )
        .build()
        .unwrap();
    let sensor = Sensor::shared("s-1", "0");
    let wrapper = WrapperCache::new(Arc::new(factory))
        .adapt(Arc::clone(&sensor))
        .unwrap();
    assert_eq!(wrapper.call("calibrate", &[Value::Int(-4)]).unwrap(), Value::Unit);
    assert_eq!(*sensor.offset.lock(), -4);
}
