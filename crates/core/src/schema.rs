// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Declarative attribute schemas for the provider and its resources.
//!
//! A [`Schema`] is plain data: it is serialized for the plugin host, used to
//! fill defaults before decoding, to validate raw configuration at plan
//! time, and to decide which attribute changes force replacement.
//!
//! ```ignore
//! let block = Block::new()
//!     .attr("name", Attribute::string().required().force_new())
//!     .attr("restart", Attribute::string().optional().default("no"));
//! ```

use crate::diagnostic::{AttrPath, Diagnostic};
use crate::validate::Validator;
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::{Map, Value};

/// Versioned schema for a provider or resource type.
#[derive(Debug, Clone, Serialize)]
pub struct Schema {
    pub version: u32,
    pub block: Block,
}

impl Schema {
    pub fn v0(block: Block) -> Self {
        Self { version: 0, block }
    }
}

/// Attribute value kinds.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Kind {
    String,
    Int,
    Bool,
    List(Elem),
    Set(Elem),
    Map(Elem),
}

/// Element type of a collection attribute.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Elem {
    Scalar(Box<Kind>),
    Block(Box<Block>),
}

impl Kind {
    fn name(&self) -> &'static str {
        match self {
            Kind::String => "string",
            Kind::Int => "integer",
            Kind::Bool => "bool",
            Kind::List(_) => "list",
            Kind::Set(_) => "set",
            Kind::Map(_) => "map",
        }
    }

    fn nested_block(&self) -> Option<&Block> {
        match self {
            Kind::List(Elem::Block(block)) | Kind::Set(Elem::Block(block)) => Some(block),
            _ => None,
        }
    }
}

/// Default read from an environment variable, with a fallback.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnvDefault {
    pub var: &'static str,
    pub fallback: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Attribute {
    pub kind: Kind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<&'static str>,
    pub required: bool,
    pub optional: bool,
    pub computed: bool,
    pub force_new: bool,
    pub sensitive: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub env_default: Option<EnvDefault>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_items: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validator: Option<Validator>,
    /// Empty values compare equal to this value when diffing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suppress_empty_as: Option<&'static str>,
}

impl Attribute {
    pub fn new(kind: Kind) -> Self {
        Self {
            kind,
            description: None,
            required: false,
            optional: false,
            computed: false,
            force_new: false,
            sensitive: false,
            default: None,
            env_default: None,
            max_items: None,
            validator: None,
            suppress_empty_as: None,
        }
    }

    pub fn string() -> Self {
        Self::new(Kind::String)
    }

    pub fn int() -> Self {
        Self::new(Kind::Int)
    }

    pub fn bool() -> Self {
        Self::new(Kind::Bool)
    }

    pub fn list_of(kind: Kind) -> Self {
        Self::new(Kind::List(Elem::Scalar(Box::new(kind))))
    }

    pub fn set_of(kind: Kind) -> Self {
        Self::new(Kind::Set(Elem::Scalar(Box::new(kind))))
    }

    pub fn map_of(kind: Kind) -> Self {
        Self::new(Kind::Map(Elem::Scalar(Box::new(kind))))
    }

    pub fn list_of_blocks(block: Block) -> Self {
        Self::new(Kind::List(Elem::Block(Box::new(block))))
    }

    pub fn set_of_blocks(block: Block) -> Self {
        Self::new(Kind::Set(Elem::Block(Box::new(block))))
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn computed(mut self) -> Self {
        self.computed = true;
        self
    }

    pub fn force_new(mut self) -> Self {
        self.force_new = true;
        self
    }

    pub fn sensitive(mut self) -> Self {
        self.sensitive = true;
        self
    }

    pub fn default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn env_default(mut self, var: &'static str, fallback: &'static str) -> Self {
        self.env_default = Some(EnvDefault { var, fallback });
        self
    }

    pub fn max_items(mut self, n: usize) -> Self {
        self.max_items = Some(n);
        self
    }

    pub fn validate(mut self, validator: Validator) -> Self {
        self.validator = Some(validator);
        self
    }

    pub fn describe(mut self, description: &'static str) -> Self {
        self.description = Some(description);
        self
    }

    pub fn suppress_empty_as(mut self, value: &'static str) -> Self {
        self.suppress_empty_as = Some(value);
        self
    }

    /// Computed-only attributes are outputs the user may not set.
    fn is_output_only(&self) -> bool {
        self.computed && !self.optional && !self.required
    }

    fn resolve_default(&self) -> Option<Value> {
        if let Some(default) = &self.default {
            return Some(default.clone());
        }
        self.env_default.as_ref().map(|env| {
            let value = std::env::var(env.var).unwrap_or_else(|_| env.fallback.to_string());
            Value::String(value)
        })
    }
}

/// An object-shaped group of named attributes.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Block {
    pub attributes: IndexMap<String, Attribute>,
}

impl Block {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attr(mut self, name: impl Into<String>, attribute: Attribute) -> Self {
        self.attributes.insert(name.into(), attribute);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Attribute> {
        self.attributes.get(name)
    }

    /// Fill schema and environment defaults for absent or null attributes,
    /// recursing into nested blocks.
    pub fn apply_defaults(&self, value: &mut Value) {
        let Some(obj) = value.as_object_mut() else {
            return;
        };
        for (name, attribute) in &self.attributes {
            let absent = obj.get(name).map_or(true, Value::is_null);
            if absent {
                if let Some(default) = attribute.resolve_default() {
                    obj.insert(name.clone(), default);
                }
                continue;
            }
            if let (Some(block), Some(Value::Array(items))) =
                (attribute.kind.nested_block(), obj.get_mut(name))
            {
                for item in items {
                    block.apply_defaults(item);
                }
            }
        }
    }

    /// Wrap single nested blocks written as objects into one-element lists.
    ///
    /// HCL decoding yields an object for a block that appears once and an
    /// array when it is repeated.
    pub fn normalize_blocks(&self, value: &mut Value) {
        let Some(obj) = value.as_object_mut() else {
            return;
        };
        for (name, attribute) in &self.attributes {
            let Some(block) = attribute.kind.nested_block() else {
                continue;
            };
            let Some(slot) = obj.get_mut(name) else {
                continue;
            };
            if slot.is_object() {
                let single = slot.take();
                *slot = Value::Array(vec![single]);
            }
            if let Value::Array(items) = slot {
                for item in items {
                    block.normalize_blocks(item);
                }
            }
        }
    }

    /// Validate raw configuration against this block.
    pub fn validate(&self, value: &Value) -> Vec<Diagnostic> {
        let mut diags = Vec::new();
        self.validate_at(value, &AttrPath::root(), &mut diags);
        diags
    }

    fn validate_at(&self, value: &Value, path: &AttrPath, diags: &mut Vec<Diagnostic>) {
        let Some(obj) = value.as_object() else {
            diags.push(Diagnostic::error("expected an object").at(path.clone()));
            return;
        };

        for key in obj.keys() {
            if !self.attributes.contains_key(key) {
                diags.push(
                    Diagnostic::error(format!("unsupported argument {:?}", key))
                        .at(path.push_attr(key)),
                );
            }
        }

        for (name, attribute) in &self.attributes {
            let attr_path = path.push_attr(name);
            match obj.get(name) {
                None | Some(Value::Null) => {
                    if attribute.required {
                        diags.push(
                            Diagnostic::error(format!("the argument {:?} is required", name))
                                .at(attr_path),
                        );
                    }
                }
                Some(_) if attribute.is_output_only() => {
                    diags.push(
                        Diagnostic::error(format!("{:?} is computed and cannot be set", name))
                            .at(attr_path),
                    );
                }
                Some(v) => {
                    check_kind(&attribute.kind, attribute.max_items, v, &attr_path, diags);
                    if let Some(validator) = &attribute.validator {
                        diags.extend(validator.check(v, &attr_path));
                    }
                }
            }
        }
    }

    /// Top-level force-new attributes whose values differ between `prior`
    /// and `proposed`.
    pub fn requires_replace(&self, prior: &Value, proposed: &Value) -> Vec<AttrPath> {
        self.attributes
            .iter()
            .filter(|(_, attribute)| attribute.force_new)
            .filter(|(name, attribute)| {
                let old = canonical(&attribute.kind, attribute.suppress_empty_as, prior.get(*name));
                let new =
                    canonical(&attribute.kind, attribute.suppress_empty_as, proposed.get(*name));
                old != new
            })
            .map(|(name, _)| AttrPath::attr(name))
            .collect()
    }
}

fn check_kind(
    kind: &Kind,
    max_items: Option<usize>,
    value: &Value,
    path: &AttrPath,
    diags: &mut Vec<Diagnostic>,
) {
    let mismatch = || {
        Diagnostic::error(format!("expected a {} value", kind.name())).at(path.clone())
    };
    match kind {
        Kind::String if !value.is_string() => diags.push(mismatch()),
        Kind::Int if !(value.is_i64() || value.is_u64()) => diags.push(mismatch()),
        Kind::Bool if !value.is_boolean() => diags.push(mismatch()),
        Kind::String | Kind::Int | Kind::Bool => {}
        Kind::List(elem) | Kind::Set(elem) => {
            let Some(items) = value.as_array() else {
                diags.push(mismatch());
                return;
            };
            if let Some(max) = max_items {
                if items.len() > max {
                    diags.push(
                        Diagnostic::error(format!("at most {} item(s) allowed, got {}", max, items.len()))
                            .at(path.clone()),
                    );
                }
            }
            for (i, item) in items.iter().enumerate() {
                check_elem(elem, item, &path.push_index(i), diags);
            }
        }
        Kind::Map(elem) => {
            let Some(entries) = value.as_object() else {
                diags.push(mismatch());
                return;
            };
            for (key, item) in entries {
                check_elem(elem, item, &path.push_key(key), diags);
            }
        }
    }
}

fn check_elem(elem: &Elem, value: &Value, path: &AttrPath, diags: &mut Vec<Diagnostic>) {
    match elem {
        Elem::Scalar(kind) if value.is_null() => {
            diags.push(
                Diagnostic::error(format!("null {} element is not allowed", kind.name()))
                    .at(path.clone()),
            );
        }
        Elem::Scalar(kind) => check_kind(kind, None, value, path, diags),
        Elem::Block(block) => block.validate_at(value, path, diags),
    }
}

/// Comparable form of a value: zero values collapse to null and set
/// elements are ordered.
fn canonical(kind: &Kind, suppress_empty_as: Option<&str>, value: Option<&Value>) -> Value {
    let value = value.cloned().unwrap_or(Value::Null);
    if let Some(empty_as) = suppress_empty_as {
        if is_zero(&value) {
            return Value::String(empty_as.to_string());
        }
    }
    if is_zero(&value) {
        return Value::Null;
    }
    match (kind, value) {
        (Kind::List(elem), Value::Array(items)) => {
            Value::Array(items.iter().map(|item| canonical_elem(elem, item)).collect())
        }
        (Kind::Set(elem), Value::Array(items)) => {
            let mut items: Vec<Value> = items.iter().map(|item| canonical_elem(elem, item)).collect();
            items.sort_by_cached_key(|item| item.to_string());
            Value::Array(items)
        }
        (_, other) => other,
    }
}

fn canonical_elem(elem: &Elem, value: &Value) -> Value {
    match (elem, value) {
        (Elem::Block(block), Value::Object(obj)) => {
            let mut out = Map::new();
            for (name, attribute) in &block.attributes {
                let v = canonical(&attribute.kind, attribute.suppress_empty_as, obj.get(name));
                if !v.is_null() {
                    out.insert(name.clone(), v);
                }
            }
            Value::Object(out)
        }
        (Elem::Scalar(kind), v) => canonical(kind, None, Some(v)),
        (_, other) => other.clone(),
    }
}

fn is_zero(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(obj) => obj.is_empty(),
    }
}

#[cfg(test)]
#[path = "schema_tests.rs"]
mod tests;
