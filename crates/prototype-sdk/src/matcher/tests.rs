//! Unit tests for structural matching and required-field validation.

use rstest::rstest;
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::*;
use crate::tests::support::{Envelope, PowerOfTen, SimpleObject, Wrapper, payload};

fn matched(outcome: MatchOutcome) -> Decoded {
    match outcome {
        MatchOutcome::Matched(decoded) => decoded,
        MatchOutcome::Disqualified(reason) => panic!("expected match, got: {reason}"),
    }
}

fn disqualified(outcome: MatchOutcome) -> Disqualification {
    match outcome {
        MatchOutcome::Matched(decoded) => panic!("expected disqualification, got {decoded:?}"),
        MatchOutcome::Disqualified(reason) => reason,
    }
}

#[test]
fn decodes_declared_fields_and_ignores_the_rest() {
    let descriptor = ShapeDescriptor::of::<SimpleObject>();
    let raw = payload(json!({"foo": "x", "baz": "y"}));
    let decoded = matched(match_shape(&descriptor, &raw).expect("match runs"));

    assert_eq!(decoded.shape(), "SimpleObject");
    assert_eq!(
        decoded.downcast_ref::<SimpleObject>(),
        Some(&SimpleObject {
            foo: "x".into(),
            bar: 0,
        })
    );
    assert_eq!(decoded.json(), &payload(json!({"foo": "x", "bar": 0})));
    assert_eq!(raw.len(), 2, "payload must not be mutated");
}

#[test]
fn type_mismatch_disqualifies() {
    let descriptor = ShapeDescriptor::of::<SimpleObject>();
    let reason = disqualified(
        match_shape(&descriptor, &payload(json!({"foo": 123}))).expect("match runs"),
    );
    assert!(matches!(reason, Disqualification::Decode { .. }), "{reason}");
}

#[rstest]
#[case::missing(json!({"bar": 123}))]
#[case::empty_string(json!({"foo": ""}))]
#[case::null(json!({"foo": null}))]
fn zero_required_field_disqualifies(#[case] raw: serde_json::Value) {
    let descriptor = ShapeDescriptor::of::<SimpleObject>();
    let reason = disqualified(match_shape(&descriptor, &payload(raw)).expect("match runs"));
    assert_eq!(
        reason,
        Disqualification::RequiredField {
            field: "foo".into()
        }
    );
}

#[rstest]
#[case::accepted(100, true)]
#[case::one(1, true)]
#[case::rejected(123, false)]
fn validation_hook_controls_match(#[case] power: u64, #[case] accepted: bool) {
    let descriptor = ShapeDescriptor::of::<PowerOfTen>();
    let outcome = match_shape(&descriptor, &payload(json!({"power_of_ten": power})))
        .expect("match runs");
    match (outcome, accepted) {
        (MatchOutcome::Matched(_), true) => {}
        (MatchOutcome::Disqualified(Disqualification::Validation { reason }), false) => {
            assert!(reason.contains("power of ten"), "{reason}");
        }
        (other, _) => panic!("unexpected outcome for {power}: {other:?}"),
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct Notes {
    note: String,
}

impl Shape for Notes {
    fn schema() -> Schema {
        Schema::builder("Notes").optional("note").build()
    }
}

#[test]
fn shape_without_required_fields_matches_empty_payload() {
    let descriptor = ShapeDescriptor::of::<Notes>();
    let decoded = matched(match_shape(&descriptor, &payload(json!({}))).expect("match runs"));
    assert_eq!(decoded.json(), &payload(json!({"note": ""})));
}

#[test]
fn nested_required_fields_are_validated() {
    let descriptor = ShapeDescriptor::of::<Wrapper>();
    let reason = disqualified(
        match_shape(
            &descriptor,
            &payload(json!({"label": "l", "inner": {"bar": 1}})),
        )
        .expect("match runs"),
    );
    assert_eq!(
        reason,
        Disqualification::RequiredField {
            field: "inner.foo".into()
        }
    );
}

#[test]
fn mandatory_nested_shape_at_zero_value_disqualifies() {
    let descriptor = ShapeDescriptor::of::<Envelope>();
    let reason = disqualified(match_shape(&descriptor, &payload(json!({}))).expect("match runs"));
    assert_eq!(
        reason,
        Disqualification::RequiredField {
            field: "inner".into()
        }
    );
}

#[test]
fn zero_shape_check_descends_into_nested_objects() {
    let schema = Schema::builder("Outer")
        .required_nested("inner", Schema::builder("Inner").optional("deep").build())
        .build();
    let unset = payload(json!({"inner": {"deep": {"count": 0, "tags": []}}}));
    let set = payload(json!({"inner": {"deep": {"count": 2}}}));
    assert_eq!(
        required::validate(&schema, &unset),
        Err(String::from("inner"))
    );
    assert_eq!(required::validate(&schema, &set), Ok(()));
}

#[test]
fn absent_nested_shape_is_not_validated() {
    let descriptor = ShapeDescriptor::of::<Wrapper>();
    let decoded = matched(
        match_shape(&descriptor, &payload(json!({"label": "l"}))).expect("match runs"),
    );
    assert_eq!(
        decoded.downcast_ref::<Wrapper>().map(|w| w.inner.is_none()),
        Some(true)
    );
}

#[test]
fn required_validation_walks_arrays_of_nested_shapes() {
    let schema = Schema::builder("List")
        .nested("items", SimpleObject::schema())
        .build();
    let encoded = payload(json!({"items": [{"foo": "a"}, {"foo": ""}]}));
    assert_eq!(
        required::validate(&schema, &encoded),
        Err(String::from("items[1].foo"))
    );
}

#[test]
fn disqualification_messages_are_descriptive() {
    let leftover = Disqualification::Leftover {
        keys: vec!["baz".into(), "qux".into()],
    };
    assert_eq!(leftover.to_string(), "unexplained keys: baz, qux");
}
