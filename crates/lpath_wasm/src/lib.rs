use lpath_core::JsonPath;
use serde_json::Value;
use wasm_bindgen::prelude::*;

fn parse_input(path: &str, json_str: &str) -> Result<(JsonPath, Value), String> {
    let json: Value =
        serde_json::from_str(json_str).map_err(|e| format!("JSON parse error: {e}"))?;
    let path = JsonPath::parse(path).map_err(|e| e.to_string())?;
    Ok((path, json))
}

fn to_output(value: &Value) -> Result<String, String> {
    serde_json::to_string_pretty(value).map_err(|e| format!("Serialization error: {e}"))
}

/// Matched values as a JSON array
#[wasm_bindgen]
pub fn query(path: &str, json_str: &str) -> Result<String, String> {
    let (path, json) = parse_input(path, json_str)?;
    let matches = path.query(&json).map_err(|e| e.to_string())?;
    to_output(&Value::Array(
        matches.into_iter().map(|m| m.value.clone()).collect(),
    ))
}

/// Normalized locations of the matches as a JSON array of strings
#[wasm_bindgen]
pub fn paths(path: &str, json_str: &str) -> Result<String, String> {
    let (path, json) = parse_input(path, json_str)?;
    let matches = path.query(&json).map_err(|e| e.to_string())?;
    to_output(&Value::from(
        matches
            .iter()
            .map(|m| m.location.to_string())
            .collect::<Vec<_>>(),
    ))
}

/// The document with every match replaced by `value_str`
#[wasm_bindgen]
pub fn set(path: &str, json_str: &str, value_str: &str) -> Result<String, String> {
    let (path, mut json) = parse_input(path, json_str)?;
    let value: Value =
        serde_json::from_str(value_str).map_err(|e| format!("JSON parse error: {e}"))?;
    path.set(&mut json, value).map_err(|e| e.to_string())?;
    to_output(&json)
}

/// The document with every match deleted
#[wasm_bindgen]
pub fn remove(path: &str, json_str: &str) -> Result<String, String> {
    let (path, mut json) = parse_input(path, json_str)?;
    path.remove(&mut json).map_err(|e| e.to_string())?;
    to_output(&json)
}
