#![cfg(feature = "serde")]

use std::collections::BTreeMap;

use serde::Serialize;

use scriptlet::{to_value, value, ErrorKind, Value};

#[test]
fn to_value_scalars() {
    assert_eq!(to_value(()).unwrap(), Value::None);
    assert_eq!(to_value(None::<i32>).unwrap(), Value::None);
    assert_eq!(to_value(true).unwrap(), Value::Bool(true));
    assert_eq!(to_value(-7_i8).unwrap(), Value::Integer(-7));
    assert_eq!(to_value(u64::MAX).unwrap(), Value::Float(u64::MAX as f64));
    assert_eq!(to_value(1.25).unwrap(), Value::Float(1.25));
    assert_eq!(to_value('c').unwrap(), Value::from("c"));
    assert_eq!(to_value("text").unwrap(), Value::from("text"));
}

#[test]
fn to_value_struct() {
    #[derive(Serialize)]
    struct User {
        name: &'static str,
        age: u32,
        nick: Option<String>,
        roles: Vec<Role>,
    }

    #[derive(Serialize)]
    enum Role {
        Admin,
    }

    let user = User {
        name: "Ann",
        age: 42,
        nick: None,
        roles: vec![Role::Admin],
    };
    assert_eq!(
        to_value(user).unwrap(),
        value! { name: "Ann", age: 42, nick: None, roles: ["Admin"] }
    );
}

#[test]
fn to_value_map() {
    let mut map = BTreeMap::new();
    map.insert("b", vec![1, 2]);
    map.insert("a", vec![]);
    assert_eq!(to_value(map).unwrap(), value! { a: [], b: [1, 2] });
}

#[test]
fn to_value_value() {
    let v = value! { list: [1.5, "x", None], map: { yes: true } };
    assert_eq!(to_value(&v).unwrap(), v);
}

#[test]
fn to_value_err_non_string_key() {
    let mut map = BTreeMap::new();
    map.insert(vec![1], "x");
    let err = to_value(map).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Serialize);
    assert_eq!(
        err.to_string(),
        "failed to serialize render context: key must be a string"
    );
}
