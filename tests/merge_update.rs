//! End-to-end merge behavior across all field kinds.

use graft_sdk::{FieldKind, Identified, MergeEngine, MergeError, Mergeable, TypeBuilder};
use std::collections::HashMap;

#[derive(Clone, Debug, Default, PartialEq)]
struct Address {
    street: Option<String>,
    city: Option<String>,
}

impl Mergeable for Address {
    fn configure(fields: &mut TypeBuilder<Self>) {
        fields.scalar("street", |a| &a.street, |a| &mut a.street).accept_null();
        fields.scalar("city", |a| &a.city, |a| &mut a.city);
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
struct OrderLine {
    id: Option<i64>,
    sku: Option<String>,
    quantity: Option<i64>,
}

impl Identified for OrderLine {
    type Key = i64;

    fn identity(&self) -> Option<i64> {
        self.id
    }

    fn set_identity(&mut self, key: Option<i64>) {
        self.id = key;
    }
}

impl Mergeable for OrderLine {
    fn configure(fields: &mut TypeBuilder<Self>) {
        fields.scalar("sku", |l| &l.sku, |l| &mut l.sku);
        fields.scalar("quantity", |l| &l.quantity, |l| &mut l.quantity);
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
struct Bin {
    id: Option<String>,
    capacity: Option<i64>,
}

impl Identified for Bin {
    type Key = String;

    fn identity(&self) -> Option<String> {
        self.id.clone()
    }

    fn set_identity(&mut self, key: Option<String>) {
        self.id = key;
    }
}

impl Mergeable for Bin {
    fn configure(fields: &mut TypeBuilder<Self>) {
        fields.scalar("capacity", |b| &b.capacity, |b| &mut b.capacity);
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
struct Customer {
    id: Option<i64>,
    name: Option<String>,
    street: Option<String>,
    number: Option<i64>,
    address: Option<Address>,
    tags: Option<Vec<String>>,
    attributes: Option<HashMap<String, i64>>,
    lines: Option<Vec<OrderLine>>,
    bins: Option<HashMap<String, Bin>>,
}

impl Identified for Customer {
    type Key = i64;

    fn identity(&self) -> Option<i64> {
        self.id
    }

    fn set_identity(&mut self, key: Option<i64>) {
        self.id = key;
    }
}

impl Mergeable for Customer {
    fn configure(fields: &mut TypeBuilder<Self>) {
        fields.scalar("name", |c| &c.name, |c| &mut c.name);
        fields.scalar("street", |c| &c.street, |c| &mut c.street).accept_null();
        fields.scalar("number", |c| &c.number, |c| &mut c.number).accept_null();
        fields.nested("address", |c| &c.address, |c| &mut c.address).accept_null();
        fields.scalar_vec("tags", |c| &c.tags, |c| &mut c.tags);
        fields.scalar_map("attributes", |c| &c.attributes, |c| &mut c.attributes);
        fields.entity_vec("lines", |c| &c.lines, |c| &mut c.lines);
        fields.entity_map("bins", |c| &c.bins, |c| &mut c.bins);
    }
}

fn line(id: i64, sku: &str, quantity: i64) -> OrderLine {
    OrderLine {
        id: Some(id),
        sku: Some(sku.to_string()),
        quantity: Some(quantity),
    }
}

#[test]
fn null_reject_keeps_target_value() {
    let engine = MergeEngine::new();
    let mut target = Customer {
        name: Some("x".into()),
        ..Default::default()
    };
    let source = Customer::default();
    assert!(!engine.update(&mut target, &source).unwrap());
    assert_eq!(target.name.as_deref(), Some("x"));
}

#[test]
fn null_accept_clears_target_value() {
    let engine = MergeEngine::new();
    let mut target = Customer {
        street: Some("x".into()),
        ..Default::default()
    };
    let source = Customer::default();
    assert!(engine.update(&mut target, &source).unwrap());
    assert_eq!(target.street, None);
    // already null, nothing left to clear
    assert!(!engine.update(&mut target, &source).unwrap());
}

#[test]
fn equality_short_circuits() {
    let engine = MergeEngine::new();
    let mut target = Customer {
        name: Some("same".into()),
        ..Default::default()
    };
    let source = target.clone();
    assert!(!engine.update(&mut target, &source).unwrap());
    assert_eq!(target.name.as_deref(), Some("same"));
}

#[test]
fn end_to_end_scenario() {
    let engine = MergeEngine::new();
    let mut target = Customer {
        name: Some("A".into()),
        street: Some("x".into()),
        number: Some(1),
        ..Default::default()
    };
    let source = Customer {
        name: Some("B".into()),
        street: None,
        number: Some(1),
        ..Default::default()
    };
    assert!(engine.update(&mut target, &source).unwrap());
    assert_eq!(target.name.as_deref(), Some("B"));
    assert_eq!(target.street, None);
    assert_eq!(target.number, Some(1));
}

#[test]
fn nested_merges_existing_child_in_place() {
    let engine = MergeEngine::new();
    let mut target = Customer {
        address: Some(Address {
            street: Some("Old Rd".into()),
            city: Some("Springfield".into()),
        }),
        ..Default::default()
    };
    let source = Customer {
        address: Some(Address {
            street: Some("New Rd".into()),
            city: None,
        }),
        ..Default::default()
    };
    assert!(engine.update(&mut target, &source).unwrap());
    let address = target.address.as_ref().unwrap();
    // street replaced, city untouched: the child was merged, not swapped
    assert_eq!(address.street.as_deref(), Some("New Rd"));
    assert_eq!(address.city.as_deref(), Some("Springfield"));
}

#[test]
fn nested_constructs_missing_child() {
    let engine = MergeEngine::new();
    let mut target = Customer::default();
    let source = Customer {
        address: Some(Address {
            street: Some("First St".into()),
            city: Some("Shelbyville".into()),
        }),
        ..Default::default()
    };
    assert!(engine.update(&mut target, &source).unwrap());
    assert_eq!(target.address, source.address);
}

#[test]
fn nested_accept_null_clears_reference() {
    let engine = MergeEngine::new();
    let mut target = Customer {
        address: Some(Address {
            city: Some("Springfield".into()),
            ..Default::default()
        }),
        ..Default::default()
    };
    let source = Customer::default();
    assert!(engine.update(&mut target, &source).unwrap());
    assert_eq!(target.address, None);
}

#[test]
fn scalar_collection_replaces_wholesale() {
    let engine = MergeEngine::new();
    let mut target = Customer {
        tags: Some(vec!["a".into(), "b".into()]),
        ..Default::default()
    };
    let source = Customer {
        tags: Some(vec!["c".into()]),
        ..Default::default()
    };
    assert!(engine.update(&mut target, &source).unwrap());
    assert_eq!(target.tags, Some(vec!["c".to_string()]));
    assert!(!engine.update(&mut target, &source).unwrap());

    // both empty is a no-op
    let mut empty_target = Customer {
        tags: Some(Vec::new()),
        ..Default::default()
    };
    let empty_source = empty_target.clone();
    assert!(!engine.update(&mut empty_target, &empty_source).unwrap());
}

#[test]
fn scalar_map_diffs_by_key() {
    let engine = MergeEngine::new();
    let mut target = Customer {
        attributes: Some(HashMap::from([("a".to_string(), 1), ("b".to_string(), 2)])),
        ..Default::default()
    };
    let source = Customer {
        attributes: Some(HashMap::from([("b".to_string(), 2), ("c".to_string(), 3)])),
        ..Default::default()
    };
    assert!(engine.update(&mut target, &source).unwrap());
    assert_eq!(
        target.attributes,
        Some(HashMap::from([("b".to_string(), 2), ("c".to_string(), 3)]))
    );
    assert!(!engine.update(&mut target, &source).unwrap());
}

#[test]
fn entity_collection_reconciles_by_identity() {
    let engine = MergeEngine::new();
    let mut target = Customer {
        lines: Some(vec![line(1, "widget", 1), line(2, "gadget", 5)]),
        ..Default::default()
    };
    let source = Customer {
        lines: Some(vec![line(1, "widget", 3), line(3, "sprocket", 7)]),
        ..Default::default()
    };
    assert!(engine.update(&mut target, &source).unwrap());
    let lines = target.lines.as_ref().unwrap();
    assert_eq!(lines.len(), 2);
    // key 1 merged in place
    assert_eq!(lines[0], line(1, "widget", 3));
    // key 2 dropped, key 3 freshly created with all source fields
    assert_eq!(lines[1], line(3, "sprocket", 7));
    assert!(!engine.update(&mut target, &source).unwrap());
}

#[test]
fn entity_collection_drops_missing_keys_only() {
    let engine = MergeEngine::new();
    let mut target = Customer {
        lines: Some(vec![line(1, "widget", 1)]),
        ..Default::default()
    };
    let source = Customer {
        lines: Some(Vec::new()),
        ..Default::default()
    };
    assert!(engine.update(&mut target, &source).unwrap());
    assert_eq!(target.lines, Some(Vec::new()));
}

#[test]
fn entity_collection_duplicate_identity_last_write_wins() {
    let engine = MergeEngine::new();
    let mut target = Customer {
        lines: Some(vec![line(1, "widget", 1)]),
        ..Default::default()
    };
    let source = Customer {
        lines: Some(vec![line(1, "widget", 2), line(1, "widget", 9)]),
        ..Default::default()
    };
    assert!(engine.update(&mut target, &source).unwrap());
    let lines = target.lines.as_ref().unwrap();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].quantity, Some(9));
}

#[test]
fn entity_collection_unkeyed_sources_append_verbatim() {
    let engine = MergeEngine::new();
    let unkeyed = OrderLine {
        id: None,
        sku: Some("loose".into()),
        quantity: Some(2),
    };
    let mut target = Customer {
        lines: Some(vec![line(1, "widget", 1)]),
        ..Default::default()
    };
    let source = Customer {
        lines: Some(vec![line(1, "widget", 1), unkeyed.clone()]),
        ..Default::default()
    };
    assert!(engine.update(&mut target, &source).unwrap());
    let lines = target.lines.as_ref().unwrap();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[1], unkeyed);
    // identical content on the second pass, nothing to report
    assert!(!engine.update(&mut target, &source).unwrap());
}

#[test]
fn entity_map_reconciles_key_set() {
    let engine = MergeEngine::new();
    let bin = |capacity: i64| Bin {
        id: None,
        capacity: Some(capacity),
    };
    let mut target = Customer {
        bins: Some(HashMap::from([
            ("north".to_string(), Bin { id: Some("north".into()), capacity: Some(10) }),
            ("south".to_string(), Bin { id: Some("south".into()), capacity: Some(20) }),
        ])),
        ..Default::default()
    };
    let source = Customer {
        bins: Some(HashMap::from([
            ("north".to_string(), bin(15)),
            ("east".to_string(), bin(5)),
        ])),
        ..Default::default()
    };
    assert!(engine.update(&mut target, &source).unwrap());
    let bins = target.bins.as_ref().unwrap();
    assert_eq!(bins.len(), 2);
    // shared key merged in place
    assert_eq!(bins["north"].capacity, Some(15));
    assert_eq!(bins["north"].id.as_deref(), Some("north"));
    // new key inserted with identity stamped from the map key
    assert_eq!(bins["east"].capacity, Some(5));
    assert_eq!(bins["east"].id.as_deref(), Some("east"));
    assert!(!bins.contains_key("south"));
    assert!(!engine.update(&mut target, &source).unwrap());
}

#[test]
fn full_graph_update_is_idempotent() {
    let engine = MergeEngine::new();
    let mut target = Customer {
        id: Some(7),
        name: Some("A".into()),
        street: Some("x".into()),
        address: Some(Address {
            city: Some("Springfield".into()),
            ..Default::default()
        }),
        tags: Some(vec!["old".into()]),
        attributes: Some(HashMap::from([("a".to_string(), 1)])),
        lines: Some(vec![line(1, "widget", 1)]),
        ..Default::default()
    };
    let source = Customer {
        name: Some("B".into()),
        street: None,
        number: Some(4),
        address: Some(Address {
            street: Some("New Rd".into()),
            city: None,
        }),
        tags: Some(vec!["new".into()]),
        attributes: Some(HashMap::from([("b".to_string(), 2)])),
        lines: Some(vec![line(1, "widget", 2), line(2, "gadget", 1)]),
        bins: Some(HashMap::from([("north".to_string(), Bin { id: None, capacity: Some(3) })])),
        ..Default::default()
    };
    assert!(engine.update(&mut target, &source).unwrap());
    assert!(!engine.update(&mut target, &source).unwrap());
    // the identity field is never merged
    assert_eq!(target.id, Some(7));
}

#[derive(Default)]
struct Conflicted {
    code: Option<i64>,
}

impl Mergeable for Conflicted {
    fn configure(fields: &mut TypeBuilder<Self>) {
        fields
            .scalar("code", |c| &c.code, |c| &mut c.code)
            .required()
            .accept_null();
    }
}

#[test]
fn conflicting_configuration_fails_update() {
    let engine = MergeEngine::new();
    let mut target = Conflicted::default();
    let source = Conflicted::default();
    let err = engine.update(&mut target, &source).unwrap_err();
    assert!(matches!(err, MergeError::Descriptor(_)));
}

#[test]
fn field_lookup_reads_scalars_generically() {
    let engine = MergeEngine::new();
    let descriptor = engine.describe::<Customer>().unwrap();
    let customer = Customer {
        name: Some("Ada".into()),
        tags: Some(vec!["vip".into()]),
        ..Default::default()
    };

    let name = descriptor.field("name").unwrap();
    assert_eq!(name.kind(), FieldKind::Scalar);
    assert_eq!(name.read_value(&customer), Some(serde_json::json!("Ada")));
    assert!(!name.is_unset(&customer));

    // container kinds have no generic reader
    let tags = descriptor.field("tags").unwrap();
    assert_eq!(tags.kind(), FieldKind::ScalarCollection);
    assert_eq!(tags.read_value(&customer), None);
    assert!(!tags.is_unset(&customer));

    assert!(descriptor.field("id").is_none());
}
