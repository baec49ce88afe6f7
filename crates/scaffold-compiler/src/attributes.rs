// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Open attribute storage for configurable implementations.

Structured fields of a section are read into typed struct fields by the
section loaders. Every other key is kept, unchanged, in an [`Attributes`] map
on the instance so implementations can read configuration the compiler has no
schema for.

Built-in components declare their own expectations with a small [`Schema`]
(defaults, required keys, numeric casts) applied during validation.
*/

use std::fmt;

use serde_json::{Map, Value};

use crate::document::parser::value_kind;
use crate::types::{CompileError, CompileResult, NodePath};

/// Unmodelled configuration keys of an instance
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Attributes(Map<String, Value>);

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.0.get_mut(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.0.insert(key.into(), value)
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Insert `value` under `key` unless the key is already present
    pub fn set_default(&mut self, key: &str, value: Value) {
        if !self.0.contains_key(key) {
            self.0.insert(key.to_string(), value);
        }
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.0.get(key).and_then(Value::as_bool)
    }

    pub fn get_f64(&self, key: &str) -> Option<f64> {
        self.0.get(key).and_then(Value::as_f64)
    }

    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.0.get(key).and_then(Value::as_i64)
    }

    pub fn get_map(&self, key: &str) -> Option<&Map<String, Value>> {
        self.0.get(key).and_then(Value::as_object)
    }

    /// Value of a required key
    pub fn require(&self, key: &str, node: &NodePath) -> CompileResult<&Value> {
        self.0.get(key).ok_or_else(|| CompileError::missing_field(node, key))
    }

    /// Value of a required key that must be a mapping
    pub fn require_map(&self, key: &str, node: &NodePath) -> CompileResult<&Map<String, Value>> {
        match self.require(key, node)? {
            Value::Object(map) => Ok(map),
            other => Err(CompileError::configuration(
                &node.child(key),
                format!("Expected a mapping, found {}", value_kind(other)),
            )),
        }
    }

    /// Value of a required key that must be a string
    pub fn require_str(&self, key: &str, node: &NodePath) -> CompileResult<&str> {
        match self.require(key, node)? {
            Value::String(s) => Ok(s),
            other => Err(CompileError::configuration(
                &node.child(key),
                format!("Expected a string, found {}", value_kind(other)),
            )),
        }
    }

    /// Replace the value under `key` by its float coercion, if present
    pub fn cast_f64(&mut self, key: &str, node: &NodePath) -> CompileResult<()> {
        if let Some(value) = self.0.get_mut(key) {
            let cast = coerce_f64(value, &node.child(key))?;
            *value = float_value(cast);
        }
        Ok(())
    }

    /// Replace the value under `key` by its integer coercion, if present
    pub fn cast_i64(&mut self, key: &str, node: &NodePath) -> CompileResult<()> {
        if let Some(value) = self.0.get_mut(key) {
            let cast = coerce_i64(value, &node.child(key))?;
            *value = Value::from(cast);
        }
        Ok(())
    }
}

impl From<Map<String, Value>> for Attributes {
    fn from(map: Map<String, Value>) -> Self {
        Attributes(map)
    }
}

/// JSON number for a float, `null` for non-finite values
pub(crate) fn float_value(value: f64) -> Value {
    serde_json::Number::from_f64(value)
        .map(Value::Number)
        .unwrap_or(Value::Null)
}

/// Coerce a number or numeric string to `f64`
pub fn coerce_f64(value: &Value, node: &NodePath) -> CompileResult<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.ok_or_else(|| {
        CompileError::configuration(
            node,
            format!("Could not convert {} '{}' to a float", value_kind(value), value),
        )
    })
}

/// Coerce a number or numeric string to `i64`, truncating fractional values
pub fn coerce_i64(value: &Value, node: &NodePath) -> CompileResult<i64> {
    let parsed = match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().map(|f| f.trunc() as i64))
        }
        _ => None,
    };
    parsed.ok_or_else(|| {
        CompileError::configuration(
            node,
            format!("Could not convert {} '{}' to an integer", value_kind(value), value),
        )
    })
}

/// Copy every key of `section` onto `target` except the `excluded` ones
///
/// Returns the number of keys copied.
pub fn copy_attributes(target: &mut Attributes, section: &Map<String, Value>, excluded: &[&str]) -> usize {
    let mut copied = 0;
    for (key, value) in section {
        if excluded.contains(&key.as_str()) {
            continue;
        }
        target.insert(key.clone(), value.clone());
        copied += 1;
    }
    copied
}

/// Fixed defaults, required keys and numeric casts of a component
#[derive(Debug, Clone, Default)]
pub struct Schema {
    defaults: Vec<(&'static str, Value)>,
    required: Vec<&'static str>,
    float_casts: Vec<&'static str>,
    int_casts: Vec<&'static str>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn default_value(mut self, key: &'static str, value: Value) -> Self {
        self.defaults.push((key, value));
        self
    }

    pub fn required(mut self, keys: &[&'static str]) -> Self {
        self.required.extend_from_slice(keys);
        self
    }

    pub fn cast_float(mut self, keys: &[&'static str]) -> Self {
        self.float_casts.extend_from_slice(keys);
        self
    }

    pub fn cast_int(mut self, keys: &[&'static str]) -> Self {
        self.int_casts.extend_from_slice(keys);
        self
    }

    /// Fill in defaults, check required keys, then apply the casts
    pub fn apply(&self, attributes: &mut Attributes, node: &NodePath) -> CompileResult<()> {
        for (key, value) in &self.defaults {
            attributes.set_default(key, value.clone());
        }
        for key in &self.required {
            attributes.require(key, node)?;
        }
        for key in &self.float_casts {
            attributes.cast_f64(key, node)?;
        }
        for key in &self.int_casts {
            attributes.cast_i64(key, node)?;
        }
        Ok(())
    }

    /// Every key the schema knows about
    pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.defaults
            .iter()
            .map(|(k, _)| *k)
            .chain(self.required.iter().copied())
            .chain(self.float_casts.iter().copied())
            .chain(self.int_casts.iter().copied())
    }
}

/// An instance created from a configuration section
///
/// Every capability trait extends this one.
pub trait Configurable: fmt::Debug + Send + Sync {
    /// Logical name assigned when the instance was resolved
    fn name(&self) -> &str;

    fn set_name(&mut self, name: &str);

    fn attributes(&self) -> &Attributes;

    fn attributes_mut(&mut self) -> &mut Attributes;

    /// Registered identifier of the implementation
    fn class_name(&self) -> &'static str;

    /// Attribute keys the implementation understands
    ///
    /// `None` means the implementation accepts any key. Used to report unknown
    /// keys when strict attribute checking is enabled.
    fn known_attributes(&self) -> Option<&'static [&'static str]> {
        None
    }

    /// Check and normalise the copied attributes
    fn validate(&mut self, _node: &NodePath) -> CompileResult<()> {
        Ok(())
    }
}

/// Attribute keys of `target` that it does not declare as known
pub fn unknown_attributes<T: Configurable + ?Sized>(target: &T) -> Vec<String> {
    match target.known_attributes() {
        Some(known) => target
            .attributes()
            .keys()
            .filter(|k| !known.contains(k))
            .map(str::to_string)
            .collect(),
        None => Vec::new(),
    }
}

/// Implement [`Configurable`] for a struct with `name: String` and
/// `attributes: Attributes` fields
///
/// Extra trait items (`validate`, `known_attributes`) may be passed in a
/// trailing block.
#[macro_export]
macro_rules! impl_configurable {
    ($ty:ty, $class:literal) => {
        $crate::impl_configurable!($ty, $class, {});
    };
    ($ty:ty, $class:literal, { $($body:tt)* }) => {
        impl $crate::attributes::Configurable for $ty {
            fn name(&self) -> &str {
                &self.name
            }

            fn set_name(&mut self, name: &str) {
                self.name = name.to_string();
            }

            fn attributes(&self) -> &$crate::attributes::Attributes {
                &self.attributes
            }

            fn attributes_mut(&mut self) -> &mut $crate::attributes::Attributes {
                &mut self.attributes
            }

            fn class_name(&self) -> &'static str {
                $class
            }

            $($body)*
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn section(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_copy_skips_reserved_keys() {
        let mut attrs = Attributes::new();
        let copied = copy_attributes(
            &mut attrs,
            &section(json!({"class": "x", "layer": "granular", "seed": 4, "spread": [1, 2]})),
            &["class", "layer"],
        );
        assert_eq!(copied, 2);
        assert!(!attrs.contains("class"));
        assert_eq!(attrs.get_i64("seed"), Some(4));
        assert_eq!(attrs.get("spread"), Some(&json!([1, 2])));
    }

    #[test]
    fn test_float_coercion() {
        let node = NodePath::of("n");
        assert_eq!(coerce_f64(&json!(3), &node).unwrap(), 3.0);
        assert_eq!(coerce_f64(&json!("2.5"), &node).unwrap(), 2.5);
        assert!(coerce_f64(&json!(true), &node).is_err());
        assert!(coerce_f64(&json!("wide"), &node).is_err());
    }

    #[test]
    fn test_int_coercion_truncates() {
        let node = NodePath::of("n");
        assert_eq!(coerce_i64(&json!(4.9), &node).unwrap(), 4);
        assert_eq!(coerce_i64(&json!("8"), &node).unwrap(), 8);
        assert!(coerce_i64(&json!([8]), &node).is_err());
    }

    #[test]
    fn test_schema_applies_defaults_before_required_check() {
        let schema = Schema::new()
            .default_value("threads", json!(1))
            .required(&["duration"])
            .cast_int(&["threads"])
            .cast_float(&["duration"]);

        let node = NodePath::of("simulations").child("test");
        let mut attrs = Attributes::from(section(json!({"threads": "4", "duration": 100})));
        schema.apply(&mut attrs, &node).unwrap();
        assert_eq!(attrs.get_i64("threads"), Some(4));
        assert_eq!(attrs.get("duration"), Some(&json!(100.0)));

        let mut attrs = Attributes::new();
        let err = schema.apply(&mut attrs, &node).unwrap_err();
        assert_eq!(err.to_string(), "Missing 'duration' attribute in simulations.test");
        assert_eq!(attrs.get_i64("threads"), Some(1));
    }
}
