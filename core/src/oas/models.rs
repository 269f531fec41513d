#![deny(missing_docs)]

//! # OpenAPI Models
//!
//! Borrowed, typed views over the raw document tree.
//!
//! The compiler works directly on `serde_json::Value` so that unknown keys and
//! vendor extensions survive splitting untouched. These views only give the
//! known keys a name.

use serde_json::{Map, Number, Value};
use std::fmt;

/// Read-only view over a Schema Object.
#[derive(Debug, Clone, Copy)]
pub struct SchemaNode<'a>(pub &'a Value);

impl<'a> SchemaNode<'a> {
    /// Wraps a raw schema value.
    pub fn new(value: &'a Value) -> Self {
        Self(value)
    }

    fn str_field(&self, key: &str) -> Option<&'a str> {
        self.0.get(key).and_then(Value::as_str)
    }

    fn array_field(&self, key: &str) -> Option<&'a Vec<Value>> {
        self.0.get(key).and_then(Value::as_array)
    }

    /// `$ref`
    pub fn reference(&self) -> Option<&'a str> {
        self.str_field("$ref")
    }

    /// `allOf`
    pub fn all_of(&self) -> Option<&'a Vec<Value>> {
        self.array_field("allOf")
    }

    /// `oneOf`
    pub fn one_of(&self) -> Option<&'a Vec<Value>> {
        self.array_field("oneOf")
    }

    /// `anyOf`
    pub fn any_of(&self) -> Option<&'a Vec<Value>> {
        self.array_field("anyOf")
    }

    /// `discriminator`, when present as an object.
    pub fn discriminator(&self) -> Option<Discriminator<'a>> {
        self.0
            .get("discriminator")
            .and_then(Value::as_object)
            .map(Discriminator)
    }

    /// `type`
    pub fn type_name(&self) -> Option<&'a str> {
        self.str_field("type")
    }

    /// `format`
    pub fn format(&self) -> Option<&'a str> {
        self.str_field("format")
    }

    /// `properties`
    pub fn properties(&self) -> Option<&'a Map<String, Value>> {
        self.0.get("properties").and_then(Value::as_object)
    }

    /// Names listed in `required`. Non-string entries are skipped.
    pub fn required(&self) -> impl Iterator<Item = &'a str> {
        self.array_field("required")
            .into_iter()
            .flatten()
            .filter_map(Value::as_str)
    }

    /// `items`
    pub fn items(&self) -> Option<&'a Value> {
        self.0.get("items")
    }

    /// Raw `enum` value, if the key is present at all.
    pub fn enum_values(&self) -> Option<&'a Value> {
        self.0.get("enum")
    }

    /// `nullable: true`
    pub fn nullable(&self) -> bool {
        self.0
            .get("nullable")
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    /// `description`
    pub fn description(&self) -> Option<&'a str> {
        self.str_field("description")
    }

    /// `minimum`
    pub fn minimum(&self) -> Option<&'a Number> {
        self.0.get("minimum").and_then(Value::as_number)
    }

    /// `maximum`
    pub fn maximum(&self) -> Option<&'a Number> {
        self.0.get("maximum").and_then(Value::as_number)
    }
}

/// View over a Discriminator Object.
#[derive(Debug, Clone, Copy)]
pub struct Discriminator<'a>(&'a Map<String, Value>);

impl<'a> Discriminator<'a> {
    /// `propertyName`
    pub fn property_name(&self) -> Option<&'a str> {
        self.0.get("propertyName").and_then(Value::as_str)
    }

    /// Finds the tag value whose mapping target equals `reference`.
    ///
    /// Mappings are small, so this is a plain linear scan.
    pub fn tag_for(&self, reference: &str) -> Option<&'a str> {
        self.0
            .get("mapping")
            .and_then(Value::as_object)?
            .iter()
            .find(|(_, target)| target.as_str() == Some(reference))
            .map(|(tag, _)| tag.as_str())
    }
}

/// Location of a Parameter Object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamLocation {
    /// `in: path`
    Path,
    /// `in: query`
    Query,
    /// `in: header`
    Header,
    /// `in: cookie`
    Cookie,
}

impl ParamLocation {
    /// Parses the `in` field.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "path" => Some(Self::Path),
            "query" => Some(Self::Query),
            "header" => Some(Self::Header),
            "cookie" => Some(Self::Cookie),
            _ => None,
        }
    }
}

impl fmt::Display for ParamLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Path => "path",
            Self::Query => "query",
            Self::Header => "header",
            Self::Cookie => "cookie",
        };
        write!(f, "{}", s)
    }
}
