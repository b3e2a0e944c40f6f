//! Typed custom properties attached to maps, layers, objects and tiles
//!
//! A [`Properties`] bag keeps one bucket per value type, so the same name may
//! exist as both a string and an int. The `set_*_checked` setters remove the
//! name from every other bucket first when a single typed entry is wanted.

use crate::color::Color;
use crate::error::PropertyError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The value type of a property
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyType {
    #[default]
    String,
    Int,
    Float,
    Bool,
    Color,
}

impl PropertyType {
    pub const ALL: [PropertyType; 5] = [
        PropertyType::String,
        PropertyType::Int,
        PropertyType::Float,
        PropertyType::Bool,
        PropertyType::Color,
    ];

    /// Get the name used in error messages and documents
    pub fn name(&self) -> &'static str {
        match self {
            PropertyType::String => "string",
            PropertyType::Int => "int",
            PropertyType::Float => "float",
            PropertyType::Bool => "bool",
            PropertyType::Color => "color",
        }
    }
}

/// A single property value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Bool(bool),
    Int(i32),
    Float(f32),
    Color(Color),
    String(String),
}

impl PropertyValue {
    pub fn property_type(&self) -> PropertyType {
        match self {
            PropertyValue::String(_) => PropertyType::String,
            PropertyValue::Int(_) => PropertyType::Int,
            PropertyValue::Float(_) => PropertyType::Float,
            PropertyValue::Bool(_) => PropertyType::Bool,
            PropertyValue::Color(_) => PropertyType::Color,
        }
    }

    pub fn as_string(&self) -> Option<&str> {
        match self {
            PropertyValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i32> {
        match self {
            PropertyValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f32> {
        match self {
            PropertyValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PropertyValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_color(&self) -> Option<Color> {
        match self {
            PropertyValue::Color(c) => Some(*c),
            _ => None,
        }
    }

    /// Convert to serde_json::Value. Colors become `#rrggbb[aa]` strings.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            PropertyValue::String(s) => serde_json::Value::String(s.clone()),
            PropertyValue::Int(i) => serde_json::json!(*i),
            PropertyValue::Float(f) => serde_json::json!(*f),
            PropertyValue::Bool(b) => serde_json::Value::Bool(*b),
            PropertyValue::Color(c) => serde_json::Value::String(c.to_string()),
        }
    }
}

impl From<String> for PropertyValue {
    fn from(s: String) -> Self {
        PropertyValue::String(s)
    }
}

impl From<&str> for PropertyValue {
    fn from(s: &str) -> Self {
        PropertyValue::String(s.to_string())
    }
}

impl From<i32> for PropertyValue {
    fn from(i: i32) -> Self {
        PropertyValue::Int(i)
    }
}

impl From<f32> for PropertyValue {
    fn from(f: f32) -> Self {
        PropertyValue::Float(f)
    }
}

impl From<bool> for PropertyValue {
    fn from(b: bool) -> Self {
        PropertyValue::Bool(b)
    }
}

impl From<Color> for PropertyValue {
    fn from(c: Color) -> Self {
        PropertyValue::Color(c)
    }
}

/// Typed property bag
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Properties {
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    strings: HashMap<String, String>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    ints: HashMap<String, i32>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    floats: HashMap<String, f32>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    bools: HashMap<String, bool>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    colors: HashMap<String, Color>,
}

macro_rules! copy_accessors {
    ($ty:ty, $kind:expr, $field:ident, $has:ident, $get:ident, $get_or:ident, $set:ident, $set_checked:ident) => {
        pub fn $has(&self, name: &str) -> bool {
            self.$field.contains_key(name)
        }

        pub fn $get(&self, name: &str) -> Result<$ty, PropertyError> {
            self.$field
                .get(name)
                .copied()
                .ok_or_else(|| self.missing(name, $kind))
        }

        /// Get the value, or `default` when no entry of this type exists
        pub fn $get_or(&self, name: &str, default: $ty) -> $ty {
            self.$field.get(name).copied().unwrap_or(default)
        }

        pub fn $set(&mut self, name: impl Into<String>, value: $ty) {
            self.$field.insert(name.into(), value);
        }

        /// Set the value after removing `name` from every other type
        pub fn $set_checked(&mut self, name: impl Into<String>, value: $ty) {
            let name = name.into();
            self.remove_all(&name);
            self.$field.insert(name, value);
        }
    };
}

impl Properties {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of entries across all types
    pub fn len(&self) -> usize {
        self.strings.len() + self.ints.len() + self.floats.len() + self.bools.len() + self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether `name` exists under any type
    pub fn contains(&self, name: &str) -> bool {
        !self.types_of(name).is_empty()
    }

    /// Every type `name` is stored under
    pub fn types_of(&self, name: &str) -> Vec<PropertyType> {
        PropertyType::ALL
            .into_iter()
            .filter(|ty| self.has_typed(name, *ty))
            .collect()
    }

    fn has_typed(&self, name: &str, ty: PropertyType) -> bool {
        match ty {
            PropertyType::String => self.strings.contains_key(name),
            PropertyType::Int => self.ints.contains_key(name),
            PropertyType::Float => self.floats.contains_key(name),
            PropertyType::Bool => self.bools.contains_key(name),
            PropertyType::Color => self.colors.contains_key(name),
        }
    }

    fn missing(&self, name: &str, expected: PropertyType) -> PropertyError {
        match self.types_of(name).first() {
            Some(actual) => PropertyError::TypeMismatch {
                name: name.to_string(),
                expected: expected.name(),
                actual: actual.name(),
            },
            None => PropertyError::NotFound {
                name: name.to_string(),
            },
        }
    }

    fn remove_all(&mut self, name: &str) {
        self.strings.remove(name);
        self.ints.remove(name);
        self.floats.remove(name);
        self.bools.remove(name);
        self.colors.remove(name);
    }

    pub fn has_string(&self, name: &str) -> bool {
        self.strings.contains_key(name)
    }

    pub fn get_string(&self, name: &str) -> Result<&str, PropertyError> {
        self.strings
            .get(name)
            .map(String::as_str)
            .ok_or_else(|| self.missing(name, PropertyType::String))
    }

    /// Get the value, or `default` when no string entry exists
    pub fn get_string_or<'a>(&'a self, name: &str, default: &'a str) -> &'a str {
        self.strings.get(name).map(String::as_str).unwrap_or(default)
    }

    pub fn set_string(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.strings.insert(name.into(), value.into());
    }

    /// Set the value after removing `name` from every other type
    pub fn set_string_checked(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        self.remove_all(&name);
        self.strings.insert(name, value.into());
    }

    copy_accessors!(i32, PropertyType::Int, ints, has_int, get_int, get_int_or, set_int, set_int_checked);
    copy_accessors!(f32, PropertyType::Float, floats, has_float, get_float, get_float_or, set_float, set_float_checked);
    copy_accessors!(bool, PropertyType::Bool, bools, has_bool, get_bool, get_bool_or, set_bool, set_bool_checked);
    copy_accessors!(Color, PropertyType::Color, colors, has_color, get_color, get_color_or, set_color, set_color_checked);

    /// Insert a value into the bucket matching its type
    pub fn insert(&mut self, name: impl Into<String>, value: PropertyValue) {
        let name = name.into();
        match value {
            PropertyValue::String(s) => self.set_string(name, s),
            PropertyValue::Int(i) => self.set_int(name, i),
            PropertyValue::Float(f) => self.set_float(name, f),
            PropertyValue::Bool(b) => self.set_bool(name, b),
            PropertyValue::Color(c) => self.set_color(name, c),
        }
    }

    /// Iterate over every entry, bucket by bucket
    pub fn iter(&self) -> impl Iterator<Item = (&str, PropertyValue)> + '_ {
        let strings = self
            .strings
            .iter()
            .map(|(k, v)| (k.as_str(), PropertyValue::String(v.clone())));
        let ints = self.ints.iter().map(|(k, v)| (k.as_str(), PropertyValue::Int(*v)));
        let floats = self.floats.iter().map(|(k, v)| (k.as_str(), PropertyValue::Float(*v)));
        let bools = self.bools.iter().map(|(k, v)| (k.as_str(), PropertyValue::Bool(*v)));
        let colors = self.colors.iter().map(|(k, v)| (k.as_str(), PropertyValue::Color(*v)));
        strings.chain(ints).chain(floats).chain(bools).chain(colors)
    }

    /// Convert to a JSON object. A name stored under several types keeps the
    /// value of the last bucket in [`PropertyType::ALL`] order.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Object(
            self.iter()
                .map(|(name, value)| (name.to_string(), value.to_json()))
                .collect(),
        )
    }

    /// Build a bag from a JSON object. Integers that fit in `i32` become ints,
    /// any other number a float. Colors cannot be told apart from strings.
    pub fn from_json(json: &serde_json::Value) -> Self {
        let mut props = Properties::new();
        if let serde_json::Value::Object(map) = json {
            for (name, value) in map {
                match value {
                    serde_json::Value::Bool(b) => props.set_bool(name.clone(), *b),
                    serde_json::Value::Number(n) => {
                        match n.as_i64().and_then(|i| i32::try_from(i).ok()) {
                            Some(i) => props.set_int(name.clone(), i),
                            None => props.set_float(name.clone(), n.as_f64().unwrap_or(0.0) as f32),
                        }
                    }
                    serde_json::Value::String(s) => props.set_string(name.clone(), s.clone()),
                    _ => {}
                }
            }
        }
        props
    }
}
