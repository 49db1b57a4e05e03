//! Records, their values, and the column descriptors describing how a
//! dataset is shown.

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const NULL: &Value = &Value::Null;

/// A single field value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Free text or an enumerated string
    Text(String),
    Number(f64),
    Timestamp(DateTime<Utc>),
    List(Vec<String>),
    Null,
}

impl Value {
    /// String form used for display, search and export.
    pub fn display(&self) -> String {
        match self {
            Value::Text(s) => s.clone(),
            Value::Number(n) => format!("{n}"),
            Value::Timestamp(ts) => ts.format(TIMESTAMP_FORMAT).to_string(),
            Value::List(items) => items.join(", "),
            Value::Null => String::new(),
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    fn rank(&self) -> u8 {
        match self {
            Value::Number(n) if n.is_nan() => 3,
            Value::Number(_) => 0,
            Value::Timestamp(_) => 1,
            Value::Text(_) | Value::List(_) => 2,
            Value::Null => 3,
        }
    }

    /// Natural ordering for sorting a column.
    ///
    /// Numbers compare numerically, timestamps chronologically, text and
    /// lists by their string form. Across kinds numbers come first, then
    /// timestamps, then text. NaN ranks with nulls, after everything else.
    pub fn compare(&self, other: &Value) -> Ordering {
        match (self, other) {
            (a, b) if a.rank() != b.rank() => a.rank().cmp(&b.rank()),
            (Value::Number(a), Value::Number(b)) if !a.is_nan() => a.total_cmp(b),
            (Value::Timestamp(a), Value::Timestamp(b)) => a.cmp(b),
            (Value::Text(a), Value::Text(b)) => a.cmp(b),
            (a, b) if a.rank() == 2 => a.display().cmp(&b.display()),
            _ => Ordering::Equal,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(f64::from(n))
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(ts: DateTime<Utc>) -> Self {
        Value::Timestamp(ts)
    }
}

impl From<Vec<String>> for Value {
    fn from(items: Vec<String>) -> Self {
        Value::List(items)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

/// A structured data item: named fields in insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: Vec<(String, Value)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder style field setter.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(name, value);
        self
    }

    /// Sets a field, replacing an existing value in place.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        let name = name.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(n, _)| *n == name) {
            Some((_, v)) => *v = value,
            None => self.fields.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.fields.iter().map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// True if the string form of any field contains `needle`.
    /// `needle` has to be lower-cased already.
    pub fn matches(&self, needle: &str) -> bool {
        needle.is_empty()
            || self
                .values()
                .any(|v| v.display().to_lowercase().contains(needle))
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = Record::new();
        for (k, v) in iter {
            record.set(k, v);
        }
        record
    }
}

pub type Render = Arc<dyn Fn(&Value) -> String + Send + Sync>;

/// How one field of a dataset is labeled and shown.
#[derive(Clone)]
pub struct ColumnDescriptor {
    /// Field name, or a synthetic id for computed columns
    pub key: String,
    pub header: String,
    pub render: Option<Render>,
}

impl ColumnDescriptor {
    pub fn new(key: impl Into<String>, header: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            header: header.into(),
            render: None,
        }
    }

    pub fn with_render(mut self, render: impl Fn(&Value) -> String + Send + Sync + 'static) -> Self {
        self.render = Some(Arc::new(render));
        self
    }

    /// Display string of this column for `record`.
    pub fn display(&self, record: &Record) -> String {
        let value = record.get(&self.key).unwrap_or(NULL);
        match &self.render {
            Some(render) => render(value),
            None => value.display(),
        }
    }
}

impl fmt::Debug for ColumnDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColumnDescriptor")
            .field("key", &self.key)
            .field("header", &self.header)
            .field("render", &self.render.is_some())
            .finish()
    }
}
