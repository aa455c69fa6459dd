//! Property tests for flattening.

use json2csv::flatten::{flatten_document, flatten_value, FlattenConfig, IndexFormat, KeyBuilder};
use proptest::prelude::*;
use serde_json::{Map, Value};

fn scalar() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::from),
        "[a-z ]{0,8}".prop_map(Value::String),
    ]
}

fn nested() -> impl Strategy<Value = Value> {
    scalar().prop_recursive(4, 32, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
            prop::collection::btree_map("[a-z]{1,4}", inner, 0..4)
                .prop_map(|fields| Value::Object(fields.into_iter().collect::<Map<_, _>>())),
        ]
    })
}

fn leaf_count(value: &Value) -> usize {
    match value {
        Value::Array(items) => items.iter().map(leaf_count).sum(),
        Value::Object(fields) => fields.values().map(leaf_count).sum(),
        _ => 1,
    }
}

proptest! {
    #[test]
    fn flat_object_keys_are_prefix_and_field(
        fields in prop::collection::btree_map("[a-z]{1,6}", scalar(), 0..8)
    ) {
        let keys = KeyBuilder::new(&FlattenConfig::default()).unwrap();
        let object: Map<String, Value> = fields.clone().into_iter().collect();
        let pairs = flatten_document(Value::Object(object), "p", &keys).unwrap();

        prop_assert_eq!(pairs.len(), fields.len());
        for (pair, name) in pairs.iter().zip(fields.keys()) {
            prop_assert_eq!(&pair.key, &format!("p_{name}"));
        }
    }

    #[test]
    fn array_indices_use_index_format(items in prop::collection::vec(scalar(), 0..20)) {
        let format: IndexFormat = "{:03d}".parse().unwrap();
        let keys = KeyBuilder::new(&FlattenConfig::default().with_index_format(format.clone())).unwrap();
        let pairs = flatten_value(Value::Array(items.clone()), "a", &keys).unwrap();

        prop_assert_eq!(pairs.len(), items.len());
        for (position, pair) in pairs.iter().enumerate() {
            prop_assert_eq!(&pair.key, &format!("a_{}", format.render(position)));
        }
    }

    #[test]
    fn flattening_is_deterministic(value in nested()) {
        let keys = KeyBuilder::new(&FlattenConfig::default()).unwrap();
        let first = flatten_value(value.clone(), "d", &keys).unwrap();
        let second = flatten_value(value.clone(), "d", &keys).unwrap();

        prop_assert_eq!(first.len(), leaf_count(&value));
        prop_assert_eq!(first, second);
    }
}
