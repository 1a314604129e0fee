use std::collections::BTreeMap;

use scriptlet::{value, Value};

#[test]
fn value_empty() {
    assert_eq!(value! {}, Value::Map(BTreeMap::new()));
}

#[test]
fn value_scalars() {
    let tests = [
        (value! { f: None }, Value::None),
        (value! { f: true }, Value::Bool(true)),
        (value! { f: -42 }, Value::Integer(-42)),
        (value! { f: 0.5 }, Value::Float(0.5)),
        (value! { f: "text" }, Value::String("text".into())),
        (value! { f: String::from("owned") }, Value::String("owned".into())),
        (value! { f: 2 * 21 }, Value::Integer(42)),
    ];
    for (v, exp) in tests {
        assert_eq!(v, Value::from([("f", exp)]));
    }
}

#[test]
fn value_lists() {
    assert_eq!(value! { l: [] }, Value::from([("l", Value::List(vec![]))]));
    assert_eq!(value! { l: [,] }, Value::from([("l", Value::List(vec![]))]));
    assert_eq!(
        value! { l: [1, "two", None, [3], { four: 4 },] },
        Value::from([(
            "l",
            Value::List(vec![
                Value::Integer(1),
                Value::from("two"),
                Value::None,
                Value::from(vec![3]),
                Value::from([("four", 4)]),
            ])
        )])
    );
}

#[test]
fn value_nested_maps() {
    let v = value! {
        user: {
            name: "Ann",
            address: { city: "Oslo", zip: None },
        },
        tags: ["a", "b"],
    };
    let exp = Value::from([
        (
            "user",
            Value::from([
                ("name", Value::from("Ann")),
                (
                    "address",
                    Value::from([("city", Value::from("Oslo")), ("zip", Value::None)]),
                ),
            ]),
        ),
        ("tags", Value::from(vec!["a", "b"])),
    ]);
    assert_eq!(v, exp);
}

#[test]
fn value_renders() {
    let result = scriptlet::Engine::new()
        .compile("<%= user.name %> (<%= tags.length %>)")
        .unwrap()
        .render_from(&value! { user: { name: "Ann" }, tags: ["x", "y", "z"] })
        .unwrap();
    assert_eq!(result, "Ann (3)");
}
