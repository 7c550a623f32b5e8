//! Diffing with the compositional encoding and applying the result.
//!
//! Run with: `cargo test -p otdiff-compose --test round_trip`

use proptest::prelude::*;
use serde_json::{json, Value};

use otdiff_compose::{apply, diff, encoding_without_text, ComposedOp, Edit, EditAction};
use otdiff_core::{compute_diff, diff_raw, DiffOptions};
use otdiff_types::{json_equal, path, Path};

fn whole_strings(input: &Value, output: &Value) -> ComposedOp {
    compute_diff(input, output, &DiffOptions::new(encoding_without_text())).unwrap()
}

fn assert_round_trip(input: &Value, output: &Value, op: &ComposedOp) {
    let applied = apply(input, op).unwrap();
    assert!(json_equal(&applied, output), "{op:?} gave {applied}, expected {output}");
}

// =============================================================================
// Scenarios
// =============================================================================

#[test]
fn insert_into_empty_list() {
    let op = diff(&json!([]), &json!(["one"])).unwrap();
    assert_eq!(op.edits(), &[Edit::new(path![0], EditAction::Insert(json!("one")))]);
}

#[test]
fn trailing_inserts_use_their_own_indices() {
    let op = whole_strings(&json!([1]), &json!([1, 2, 3]));
    assert_eq!(
        op.into_edits(),
        vec![
            Edit::new(path![1], EditAction::Insert(json!(2))),
            Edit::new(path![2], EditAction::Insert(json!(3))),
        ]
    );
}

#[test]
fn surplus_elements_are_removed_at_the_boundary() {
    let (start, end) = (json!(["foo", "bar"]), json!(["bar"]));
    let op = whole_strings(&start, &end);
    assert_eq!(
        op.edits(),
        &[
            Edit::new(path![0], EditAction::Replace { old: json!("foo"), new: json!("bar") }),
            Edit::new(path![1], EditAction::Remove(json!("bar"))),
        ]
    );
    assert_round_trip(&start, &end, &op);

    let op = whole_strings(&json!([1, 2, 3]), &json!([]));
    assert!(op.edits().iter().all(|edit| edit.p == path![0]));
    assert_eq!(apply(&json!([1, 2, 3]), &op).unwrap(), json!([]));
}

#[test]
fn number_replace_in_map() {
    let op = diff(&json!({"one": 1}), &json!({"one": 2})).unwrap();
    assert_eq!(
        op.edits(),
        &[Edit::new(path!["one"], EditAction::Replace { old: json!(1), new: json!(2) })]
    );
}

#[test]
fn strings_are_edited_in_place() {
    let (start, end) = (json!({"one": "one"}), json!({"one": "two"}));
    let op = diff(&start, &end).unwrap();
    assert!(op
        .edits()
        .iter()
        .all(|edit| edit.p == path!["one"] && matches!(edit.action, EditAction::Text { .. })));
    assert_round_trip(&start, &end, &op);
}

#[test]
fn astral_text_offsets_count_code_points() {
    let (start, end) = (json!({"s": "😀a"}), json!({"s": "😀ab"}));
    let op = diff(&start, &end).unwrap();
    assert_eq!(
        op.edits(),
        &[Edit::new(
            path!["s"],
            EditAction::Text { edit_type: "text-unicode".to_string(), payload: json!([2, "b"]) }
        )]
    );
    assert_round_trip(&start, &end, &op);
}

#[test]
fn without_text_strings_are_replaced() {
    let op = whole_strings(&json!({"one": "one"}), &json!({"one": "two"}));
    assert_eq!(
        op.edits(),
        &[Edit::new(
            path!["one"],
            EditAction::Replace { old: json!("one"), new: json!("two") }
        )]
    );
}

#[test]
fn container_kind_change_replaces_the_root() {
    let op = diff(&json!([]), &json!({})).unwrap();
    assert_eq!(
        op.edits(),
        &[Edit::new(Path::root(), EditAction::Replace { old: json!([]), new: json!({}) })]
    );
}

#[test]
fn identical_documents_give_the_noop() {
    let doc = json!({"a": ["x", {"b": null}]});
    assert_eq!(diff(&doc, &doc).unwrap(), ComposedOp::noop());
}

#[test]
fn raw_and_composed_agree_on_edits() {
    let (start, end) = (json!({"a": [1, 2], "b": "xy"}), json!({"a": [1], "b": "xyz"}));
    let options = DiffOptions::new(otdiff_compose::encoding()).with_shared_char_diff();
    let raw = diff_raw(&start, &end, &options).unwrap();
    let folded = raw.into_iter().fold(ComposedOp::noop(), ComposedOp::then);
    assert_eq!(folded, diff(&start, &end).unwrap());
}

#[test]
fn markup_documents_round_trip() {
    let pairs = [
        (
            json!(["html", {}, ["body", {}, "\n\n", "\n\n", ["p", {}, "Quux!"]], "\n"]),
            json!(["html", {}, ["body", {}, "\n\n\n\n", ["p", {}, "Quux!"]], "\n"]),
        ),
        (
            json!(["html", {}, ["body", {}, "foo", ["b", {}, "hello"], "foo", ["b", {}], ["strong", {}, "bar"]]]),
            json!(["html", {}, ["body", {}, "foo", ["b", {}], ["strong", {}, "bar"], ["p", {}]]]),
        ),
        (
            json!([["the", {"quick": "black", "fox": "jumped"}, "over", {"the": ["lazy", "dog"]}]]),
            json!(["the", {"quick": "brown", "fox": "leapt"}, "over", {"the": ["stupid", "dog"]}]),
        ),
        (
            json!(["foo", "The only change here is at the end.", 1, 2, 3]),
            json!(["foo", "The only change here is at the very end.", 1, 2]),
        ),
    ];
    for (start, end) in pairs {
        assert_round_trip(&start, &end, &diff(&start, &end).unwrap());
        assert_round_trip(&start, &end, &whole_strings(&start, &end));
    }
}

// =============================================================================
// Properties
// =============================================================================

fn document() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        (-3i64..4).prop_map(|n| Value::Number(n.into())),
        "[ab ż😀x]{0,6}".prop_map(Value::String),
    ];

    leaf.prop_recursive(3, 32, 5, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..5).prop_map(Value::Array),
            prop::collection::btree_map("[a-d]", inner, 0..4)
                .prop_map(|m| Value::Object(m.into_iter().collect())),
        ]
    })
}

/// Edits over a tiny space of paths and values, so inverse pairs are common.
fn edit() -> impl Strategy<Value = Edit> {
    (0usize..2, 0i64..2, 0u8..3).prop_map(|(index, n, kind)| {
        let action = match kind {
            0 => EditAction::Insert(json!(n)),
            1 => EditAction::Remove(json!(n)),
            _ => EditAction::Replace { old: json!(n), new: json!(1 - n) },
        };
        Edit::new(path![index], action)
    })
}

fn composed() -> impl Strategy<Value = ComposedOp> {
    prop::collection::vec(edit(), 0..6).prop_map(ComposedOp::from)
}

proptest! {
    #[test]
    fn prop_round_trip(input in document(), output in document()) {
        let op = diff(&input, &output).unwrap();
        let applied = apply(&input, &op).unwrap();
        prop_assert!(json_equal(&applied, &output), "{:?} gave {}", op, applied);

        let op = whole_strings(&input, &output);
        let applied = apply(&input, &op).unwrap();
        prop_assert!(json_equal(&applied, &output), "{:?} gave {}", op, applied);
    }

    #[test]
    fn prop_inputs_unchanged(input in document(), output in document()) {
        let (input_before, output_before) = (input.clone(), output.clone());
        diff(&input, &output).unwrap();
        whole_strings(&input, &output);
        prop_assert_eq!(input, input_before);
        prop_assert_eq!(output, output_before);
    }

    #[test]
    fn prop_identity_is_noop(doc in document()) {
        prop_assert!(diff(&doc, &doc).unwrap().is_empty());
    }

    #[test]
    fn prop_compose_is_associative(a in composed(), b in composed(), c in composed()) {
        let left = a.clone().then(b.clone()).then(c.clone());
        let right = a.then(b.then(c));
        prop_assert_eq!(left, right);
    }

    #[test]
    fn prop_noop_is_neutral(a in composed()) {
        prop_assert_eq!(ComposedOp::noop().then(a.clone()), a.clone());
        prop_assert_eq!(a.clone().then(ComposedOp::noop()), a);
    }
}
