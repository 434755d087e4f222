use serde_json::{json, Value};
use symbolgraph::Symbol;

pub const PREFIX: &str = "scip-python python demo 1.0";

/// Full URI for a descriptor path in the test package
pub fn uri(descriptors: &str) -> String {
    format!("{} {}", PREFIX, descriptors)
}

pub fn sym(descriptors: &str) -> Symbol {
    Symbol::parse(&uri(descriptors)).expect("test symbol URI must parse")
}

/// Single-line definition occurrence
pub fn def(descriptors: &str, line: u32, start: u32, end: u32) -> Value {
    json!({ "symbol_uri": uri(descriptors), "range": [line, start, end], "roles": 1 })
}

/// Definition occurrence with the span of its whole body
pub fn def_enclosing(descriptors: &str, line: u32, start: u32, end: u32, enclosing: [u32; 4]) -> Value {
    json!({
        "symbol_uri": uri(descriptors),
        "range": [line, start, end],
        "enclosing_range": enclosing,
        "roles": 1
    })
}

/// Single-line read reference
pub fn reference(descriptors: &str, line: u32, start: u32, end: u32) -> Value {
    json!({ "symbol_uri": uri(descriptors), "range": [line, start, end], "roles": 8 })
}

pub fn info(descriptors: &str, documentation: &str) -> Value {
    json!({ "symbol_uri": uri(descriptors), "documentation": documentation })
}
