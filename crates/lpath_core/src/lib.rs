//! lpath_core - path queries over JSON documents
//!
//! A path string is compiled once into a [`JsonPath`] and then evaluated
//! against any [`Document`] to read (`query`, `get`, `contains`) or mutate
//! (`set`, `remove`) the matched values.

pub mod ast;
pub mod document;
pub mod error;
pub mod eval;
mod filter;
mod lexer;
pub mod options;
pub mod parser;

pub use ast::JsonPath;
pub use document::{Document, Kind};
pub use error::{Error, SyntaxError};
pub use eval::{Evaluator, Location, Match, PathElement};
pub use options::{DEFAULT_MAX_DEPTH, Options};
pub use parser::Compiler;

use serde_json::Value;

/// Execute a path query against a JSON value
///
/// # Arguments
/// * `path` - A path string (e.g., "$.store.book[*].author")
/// * `json` - The JSON value to query
///
/// # Returns
/// A vector of matching JSON values, or an error if the path is invalid
///
/// # Example
/// ```
/// use serde_json::json;
/// use lpath_core::query;
///
/// let json = json!({"foo": "bar"});
/// let results = query("$.foo", &json).unwrap();
/// assert_eq!(results, vec![json!("bar")]);
/// ```
pub fn query(path: &str, json: &Value) -> Result<Vec<Value>, Error> {
    let path = JsonPath::parse(path)?;
    let matches = path.query(json)?;
    Ok(matches.into_iter().map(|m| m.value.clone()).collect())
}
