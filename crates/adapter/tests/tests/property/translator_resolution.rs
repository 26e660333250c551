//! Property tests: translator lookup prefers exact entries, then subtype
//! entries, then supertype entries, independent of registration order.

use adapter_engine::{standard, TranslatorRegistry, Variance};
use adapter_types::{TypeHierarchy, Value, ValueType};
use proptest::prelude::*;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

#[derive(Clone, Debug)]
struct Registration {
    declared: ValueType,
    variance: Variance,
}

fn arb_numeric() -> impl Strategy<Value = ValueType> {
    prop_oneof![
        Just(ValueType::Int),
        Just(ValueType::Long),
        Just(ValueType::Double),
    ]
}

fn arb_registration() -> impl Strategy<Value = Registration> {
    let declared = prop_oneof![
        Just(ValueType::Int),
        Just(ValueType::Long),
        Just(ValueType::Double),
        Just(ValueType::Number),
        Just(ValueType::Any),
        Just(ValueType::Text),
    ];
    let variance = prop_oneof![
        Just(Variance::Exact),
        Just(Variance::AppliesToSubtypes),
        Just(Variance::AppliesToSupertypes),
    ];
    (declared, variance).prop_map(|(declared, variance)| Registration { declared, variance })
}

fn registry(registrations: &[Registration]) -> TranslatorRegistry {
    registrations
        .iter()
        .enumerate()
        .fold(TranslatorRegistry::new(), |reg, (i, r)| {
            reg.with(
                r.declared.clone(),
                r.variance,
                ValueType::Text,
                standard::constant(Value::Int(i as i32)),
            )
        })
}

/// Reference implementation of the three-pass lookup.
fn expected_index(
    registrations: &[Registration],
    actual: &ValueType,
    h: &TypeHierarchy,
) -> Option<usize> {
    registrations
        .iter()
        .position(|r| &r.declared == actual)
        .or_else(|| {
            registrations.iter().position(|r| {
                r.variance == Variance::AppliesToSubtypes && h.is_subtype(actual, &r.declared)
            })
        })
        .or_else(|| {
            registrations.iter().position(|r| {
                r.variance == Variance::AppliesToSupertypes && h.is_subtype(&r.declared, actual)
            })
        })
}

// ---------------------------------------------------------------------------
// Property Tests
// ---------------------------------------------------------------------------

proptest! {
    /// The resolved entry matches the three-pass reference lookup.
    #[test]
    fn resolution_matches_reference(
        registrations in prop::collection::vec(arb_registration(), 0..12),
        actual in arb_numeric(),
    ) {
        let h = TypeHierarchy::new();
        let reg = registry(&registrations);
        let resolved = reg
            .resolve(&actual, &h)
            .map(|entry| entry.convert(Value::Unit).unwrap());
        let expected = expected_index(&registrations, &actual, &h).map(|i| Value::Int(i as i32));
        prop_assert_eq!(resolved, expected);
    }

    /// An exact `Long` entry always beats a `Number` subtype entry.
    #[test]
    fn exact_long_beats_number_subtypes(exact_first in any::<bool>(), padding in 0usize..5) {
        let h = TypeHierarchy::new();
        let mut reg = TranslatorRegistry::new();
        let register_subtype = |reg: &mut TranslatorRegistry| {
            reg.register(
                ValueType::Number,
                Variance::AppliesToSubtypes,
                ValueType::Text,
                standard::constant(Value::text("number")),
            );
        };
        for _ in 0..padding {
            register_subtype(&mut reg);
        }
        if !exact_first {
            register_subtype(&mut reg);
        }
        reg.register(
            ValueType::Long,
            Variance::Exact,
            ValueType::Text,
            standard::constant(Value::text("long")),
        );
        register_subtype(&mut reg);

        let entry = reg.resolve(&ValueType::Long, &h).unwrap();
        prop_assert_eq!(entry.variance, Variance::Exact);
        prop_assert_eq!(entry.convert(Value::Long(1)).unwrap(), Value::text("long"));
    }

    /// Text holding any i32 converts to that Int through `parse_int`.
    #[test]
    fn parse_int_chain_round_trips_integers(n in any::<i32>()) {
        let h = TypeHierarchy::new();
        let plan = TranslatorRegistry::new()
            .exact(ValueType::Text, ValueType::Int, standard::parse_int())
            .plan(&ValueType::Text, &ValueType::Int, &h, true)
            .unwrap();
        prop_assert_eq!(plan.apply(Value::text(n.to_string())).unwrap(), Value::Int(n));
    }
}
