//! Copy-on-write overlays over borrowed JSON values.
//!
//! An overlay records edits next to a base value it only borrows. Reads see
//! the edits first and fall back to the base. Nothing is written back: the
//! caller materializes a new value with [`EditableObject::materialize`], which
//! is exactly `merge_objects(base, changes)`.

use chrono::{DateTime, Utc};
use serde_json::Value;

use super::{
    JsonError, Object, binary_value, date_value, decode_binary, decode_date, merge_arrays,
    merge_objects,
};

/// Pending edits over a borrowed object.
///
/// Setting a field twice keeps the field where it was first set and the value
/// from the last call. There is no removal; set a field to null instead and
/// the merge records an explicit null.
///
/// ```
/// use serde_json::json;
/// use tabula::json::EditableObject;
///
/// let base = json!({ "name": "Jane", "address": { "city": "Springfield" } });
/// let base = base.as_object().unwrap();
///
/// let mut edit = EditableObject::new(base);
/// edit.add("address", json!({ "city": "Memphis" }));
/// assert_eq!(edit.get("name"), Some(&json!("Jane")));
///
/// let updated = edit.materialize()?;
/// assert_eq!(updated["address"]["city"], "Memphis");
/// assert_eq!(base["address"]["city"], "Springfield");
/// # Ok::<(), tabula::json::JsonError>(())
/// ```
#[derive(Debug, Clone)]
pub struct EditableObject<'a> {
    base: &'a Object,
    changes: Object,
}

impl<'a> EditableObject<'a> {
    pub fn new(base: &'a Object) -> Self {
        Self {
            base,
            changes: Object::new(),
        }
    }

    /// The untouched base object.
    pub fn base(&self) -> &'a Object {
        self.base
    }

    /// Pending edits in the order they were first made.
    pub fn changes(&self) -> &Object {
        &self.changes
    }

    pub fn has_changes(&self) -> bool {
        !self.changes.is_empty()
    }

    /// Set `name` to `value`.
    pub fn add(&mut self, name: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.changes.insert(name.into(), value.into());
        self
    }

    /// Set `name` to an explicit null.
    pub fn add_null(&mut self, name: impl Into<String>) -> &mut Self {
        self.add(name, Value::Null)
    }

    /// Set `name` to binary data, stored as base64 text.
    pub fn add_binary(&mut self, name: impl Into<String>, data: &[u8]) -> &mut Self {
        self.add(name, binary_value(data))
    }

    /// Set `name` to a date, stored as epoch milliseconds.
    pub fn add_date(&mut self, name: impl Into<String>, date: DateTime<Utc>) -> &mut Self {
        self.add(name, date_value(date))
    }

    /// Current value of `name`: the pending edit if any, else the base field.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.changes.get(name).or_else(|| self.base.get(name))
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// True when the field is present and null.
    pub fn is_null(&self, name: &str) -> bool {
        self.get(name).is_some_and(Value::is_null)
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_str)
    }

    pub fn get_i64(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(Value::as_i64)
    }

    pub fn get_f64(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(Value::as_f64)
    }

    pub fn get_bool(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(Value::as_bool)
    }

    pub fn get_object(&self, name: &str) -> Option<&Object> {
        self.get(name).and_then(Value::as_object)
    }

    pub fn get_array(&self, name: &str) -> Option<&Vec<Value>> {
        self.get(name).and_then(Value::as_array)
    }

    /// Decode a binary field. A missing field is `Ok(None)`.
    pub fn get_binary(&self, name: &str) -> Result<Option<Vec<u8>>, JsonError> {
        self.get(name)
            .map(|value| decode_binary(name, value))
            .transpose()
    }

    /// Decode a date field. A missing field is `Ok(None)`.
    pub fn get_date(&self, name: &str) -> Result<Option<DateTime<Utc>>, JsonError> {
        self.get(name)
            .map(|value| decode_date(name, value))
            .transpose()
    }

    /// Field names: base fields in base order, then newly added ones.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.base.keys().map(String::as_str).chain(
            self.changes
                .keys()
                .filter(|name| !self.base.contains_key(*name))
                .map(String::as_str),
        )
    }

    /// Fields with their current values, in [`keys`](Self::keys) order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.keys()
            .filter_map(|name| self.get(name).map(|value| (name, value)))
    }

    /// Number of distinct fields across base and edits.
    pub fn len(&self) -> usize {
        self.base.len()
            + self
                .changes
                .keys()
                .filter(|name| !self.base.contains_key(*name))
                .count()
    }

    pub fn is_empty(&self) -> bool {
        self.base.is_empty() && self.changes.is_empty()
    }

    /// Build the edited object: `merge_objects(base, changes)`.
    pub fn materialize(&self) -> Result<Object, JsonError> {
        merge_objects(self.base, &self.changes)
    }

    /// Materialize and then merge `other` on top.
    pub fn merge(&self, other: &Object) -> Result<Object, JsonError> {
        merge_objects(&self.materialize()?, other)
    }
}

/// Pending appends over a borrowed array.
///
/// Arrays merge by concatenation, so the only edit is appending. Indices past
/// the end of the base address the appended values.
#[derive(Debug, Clone)]
pub struct EditableArray<'a> {
    base: &'a [Value],
    appended: Vec<Value>,
}

impl<'a> EditableArray<'a> {
    pub fn new(base: &'a [Value]) -> Self {
        Self {
            base,
            appended: Vec::new(),
        }
    }

    pub fn base(&self) -> &'a [Value] {
        self.base
    }

    /// Values appended so far.
    pub fn changes(&self) -> &[Value] {
        &self.appended
    }

    pub fn has_changes(&self) -> bool {
        !self.appended.is_empty()
    }

    pub fn add(&mut self, value: impl Into<Value>) -> &mut Self {
        self.appended.push(value.into());
        self
    }

    pub fn add_null(&mut self) -> &mut Self {
        self.add(Value::Null)
    }

    pub fn add_binary(&mut self, data: &[u8]) -> &mut Self {
        self.add(binary_value(data))
    }

    pub fn add_date(&mut self, date: DateTime<Utc>) -> &mut Self {
        self.add(date_value(date))
    }

    pub fn get(&self, index: usize) -> Option<&Value> {
        match index.checked_sub(self.base.len()) {
            None => self.base.get(index),
            Some(offset) => self.appended.get(offset),
        }
    }

    pub fn is_null(&self, index: usize) -> bool {
        self.get(index).is_some_and(Value::is_null)
    }

    pub fn get_str(&self, index: usize) -> Option<&str> {
        self.get(index).and_then(Value::as_str)
    }

    pub fn get_i64(&self, index: usize) -> Option<i64> {
        self.get(index).and_then(Value::as_i64)
    }

    pub fn get_f64(&self, index: usize) -> Option<f64> {
        self.get(index).and_then(Value::as_f64)
    }

    pub fn get_bool(&self, index: usize) -> Option<bool> {
        self.get(index).and_then(Value::as_bool)
    }

    pub fn get_object(&self, index: usize) -> Option<&Object> {
        self.get(index).and_then(Value::as_object)
    }

    pub fn get_array(&self, index: usize) -> Option<&Vec<Value>> {
        self.get(index).and_then(Value::as_array)
    }

    pub fn get_binary(&self, index: usize) -> Result<Option<Vec<u8>>, JsonError> {
        self.get(index)
            .map(|value| decode_binary(&index.to_string(), value))
            .transpose()
    }

    pub fn get_date(&self, index: usize) -> Result<Option<DateTime<Utc>>, JsonError> {
        self.get(index)
            .map(|value| decode_date(&index.to_string(), value))
            .transpose()
    }

    pub fn len(&self) -> usize {
        self.base.len() + self.appended.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = &Value> {
        self.base.iter().chain(self.appended.iter())
    }

    /// Build the edited array: base followed by the appended values.
    pub fn materialize(&self) -> Vec<Value> {
        merge_arrays(self.base, &self.appended)
    }

    /// Materialize and then append `other`.
    pub fn merge(&self, other: &[Value]) -> Vec<Value> {
        merge_arrays(&self.materialize(), other)
    }
}
