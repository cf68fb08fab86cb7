//! Document capability consumed by the evaluator

use serde_json::{Number, Value};

/// Shape of a document value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Object,
    Array,
    Primitive,
    Null,
}

impl std::fmt::Display for Kind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Kind::Object => "object",
            Kind::Array => "array",
            Kind::Primitive => "primitive",
            Kind::Null => "null",
        })
    }
}

/// A tree-shaped document the evaluator can read and mutate
///
/// Object operations are no-ops (returning `None`/`false`) on non-objects,
/// and likewise for array operations on non-arrays. The `coerce_*` accessors
/// return `Some` only for a primitive of that type.
pub trait Document: Sized {
    fn kind(&self) -> Kind;

    /// Object keys in insertion order
    fn keys(&self) -> Vec<&str>;
    fn get_key(&self, key: &str) -> Option<&Self>;
    fn get_key_mut(&mut self, key: &str) -> Option<&mut Self>;
    /// Insert or replace; false when `self` is not an object
    fn set_key(&mut self, key: &str, value: Self) -> bool;
    /// Remove preserving the order of the remaining keys
    fn remove_key(&mut self, key: &str) -> Option<Self>;

    fn array_len(&self) -> Option<usize>;
    fn get_index(&self, index: usize) -> Option<&Self>;
    fn get_index_mut(&mut self, index: usize) -> Option<&mut Self>;
    /// Replace an existing element; false when out of range or not an array
    fn set_index(&mut self, index: usize, value: Self) -> bool;
    /// Remove an element, shifting the following ones down
    fn remove_index(&mut self, index: usize) -> Option<Self>;
    fn append(&mut self, value: Self) -> bool;

    /// Kept as a [`Number`] so large integers compare exactly
    fn coerce_number(&self) -> Option<Number>;
    fn coerce_string(&self) -> Option<&str>;
    fn coerce_bool(&self) -> Option<bool>;
}

impl Document for Value {
    fn kind(&self) -> Kind {
        match self {
            Value::Null => Kind::Null,
            Value::Bool(_) | Value::Number(_) | Value::String(_) => Kind::Primitive,
            Value::Array(_) => Kind::Array,
            Value::Object(_) => Kind::Object,
        }
    }

    fn keys(&self) -> Vec<&str> {
        match self {
            Value::Object(map) => map.keys().map(String::as_str).collect(),
            _ => Vec::new(),
        }
    }

    fn get_key(&self, key: &str) -> Option<&Self> {
        self.as_object()?.get(key)
    }

    fn get_key_mut(&mut self, key: &str) -> Option<&mut Self> {
        self.as_object_mut()?.get_mut(key)
    }

    fn set_key(&mut self, key: &str, value: Self) -> bool {
        match self.as_object_mut() {
            Some(map) => {
                map.insert(key.to_string(), value);
                true
            }
            None => false,
        }
    }

    fn remove_key(&mut self, key: &str) -> Option<Self> {
        self.as_object_mut()?.shift_remove(key)
    }

    fn array_len(&self) -> Option<usize> {
        self.as_array().map(Vec::len)
    }

    fn get_index(&self, index: usize) -> Option<&Self> {
        self.as_array()?.get(index)
    }

    fn get_index_mut(&mut self, index: usize) -> Option<&mut Self> {
        self.as_array_mut()?.get_mut(index)
    }

    fn set_index(&mut self, index: usize, value: Self) -> bool {
        match self.get_index_mut(index) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    fn remove_index(&mut self, index: usize) -> Option<Self> {
        let arr = self.as_array_mut()?;
        (index < arr.len()).then(|| arr.remove(index))
    }

    fn append(&mut self, value: Self) -> bool {
        match self.as_array_mut() {
            Some(arr) => {
                arr.push(value);
                true
            }
            None => false,
        }
    }

    fn coerce_number(&self) -> Option<Number> {
        match self {
            Value::Number(n) => Some(n.clone()),
            _ => None,
        }
    }

    fn coerce_string(&self) -> Option<&str> {
        self.as_str()
    }

    fn coerce_bool(&self) -> Option<bool> {
        self.as_bool()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_kind() {
        assert_eq!(json!({}).kind(), Kind::Object);
        assert_eq!(json!([]).kind(), Kind::Array);
        assert_eq!(json!(1).kind(), Kind::Primitive);
        assert_eq!(json!("a").kind(), Kind::Primitive);
        assert_eq!(json!(null).kind(), Kind::Null);
    }

    #[test]
    fn test_keys_keep_insertion_order() {
        let doc = json!({"z": 1, "a": 2, "m": 3});
        assert_eq!(doc.keys(), vec!["z", "a", "m"]);
        assert!(json!([1]).keys().is_empty());
    }

    #[test]
    fn test_remove_key_keeps_order() {
        let mut doc = json!({"a": 1, "b": 2, "c": 3});
        assert_eq!(doc.remove_key("a"), Some(json!(1)));
        assert_eq!(doc.keys(), vec!["b", "c"]);
        assert_eq!(doc.remove_key("a"), None);
    }

    #[test]
    fn test_object_ops_on_non_object() {
        let mut doc = json!([1, 2]);
        assert!(!doc.set_key("a", json!(1)));
        assert!(doc.get_key("a").is_none());
        assert!(doc.remove_key("a").is_none());
    }

    #[test]
    fn test_array_ops() {
        let mut doc = json!([1, 2, 3]);
        assert_eq!(doc.array_len(), Some(3));
        assert!(doc.set_index(1, json!(20)));
        assert!(!doc.set_index(5, json!(0)));
        assert_eq!(doc.remove_index(0), Some(json!(1)));
        assert_eq!(doc.remove_index(9), None);
        assert!(doc.append(json!(4)));
        assert_eq!(doc, json!([20, 3, 4]));
        assert!(!json!({}).append(json!(1)));
    }

    #[test]
    fn test_coercions_are_strict() {
        assert_eq!(json!(2.5).coerce_number().and_then(|n| n.as_f64()), Some(2.5));
        assert_eq!(json!(u64::MAX).coerce_number().and_then(|n| n.as_u64()), Some(u64::MAX));
        assert_eq!(json!("2.5").coerce_number(), None);
        assert_eq!(json!("x").coerce_string(), Some("x"));
        assert_eq!(json!(true).coerce_bool(), Some(true));
        assert_eq!(json!(1).coerce_bool(), None);
    }
}
