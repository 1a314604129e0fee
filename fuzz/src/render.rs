#![no_main]

use std::collections::BTreeMap;

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use serde::Serialize;

#[derive(Debug, Serialize, Arbitrary)]
#[serde(untagged)]
enum Value {
    None,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    List(Vec<Value>),
    Map(BTreeMap<String, Value>),
}

fuzz_target!(|data: (&str, Option<&str>, Value)| {
    let (source, echo, value) = data;
    let mut options = scriptlet::Options::builder();
    if let Some(name) = echo.filter(|name| !name.is_empty()) {
        options.output_function_name(name);
    }
    let engine = scriptlet::Engine::with_options(options.build());
    if let Ok(template) = engine.compile(source) {
        let _ = template.render(&value);
    }
});
