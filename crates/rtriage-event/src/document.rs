//! Event document with pointer-path field access.
//!
//! Provides an owned wrapper around `serde_json::Value` addressed by JSON
//! pointer paths (`/a/b`). Typed readers return `None` when the path is
//! missing or the stored type differs; writers create missing intermediate
//! objects and fail without mutating when an existing intermediate is not
//! an object.

use serde_json::{Map, Value};

use crate::error::{DocumentError, Result};

/// The JSON kind stored at a path.
///
/// Numbers are split into `Int` (representable as `i64`) and `Double`
/// (stored as floating point); the two never coerce into each other
/// through the typed readers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Null,
    Bool,
    Int,
    Double,
    String,
    Array,
    Object,
}

/// An event flowing through the router: a JSON tree with pointer access.
///
/// Documents are owned values; they move from the ingress queue through a
/// router worker into the downstream environment and are never shared
/// between workers.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    value: Value,
}

impl Default for Document {
    fn default() -> Self {
        Document::new()
    }
}

impl From<Value> for Document {
    fn from(value: Value) -> Self {
        Document { value }
    }
}

impl Document {
    /// Create an empty event (object root).
    pub fn new() -> Self {
        Document {
            value: Value::Object(Map::new()),
        }
    }

    /// Parse an ingress payload into a document.
    pub fn from_json_str(payload: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(payload)?;
        Ok(Document { value })
    }

    /// Access the underlying JSON value.
    pub fn as_value(&self) -> &Value {
        &self.value
    }

    /// Consume the document, yielding the underlying JSON value.
    pub fn into_value(self) -> Value {
        self.value
    }

    // -----------------------------------------------------------------
    // Readers
    // -----------------------------------------------------------------

    /// Get the node at `path`, if any. `""` addresses the root.
    pub fn get(&self, path: &str) -> Option<&Value> {
        self.value.pointer(path)
    }

    /// True when `path` resolves to any node.
    pub fn exists(&self, path: &str) -> bool {
        self.get(path).is_some()
    }

    /// The kind of the node at `path`, if it resolves.
    pub fn kind(&self, path: &str) -> Option<ValueKind> {
        self.get(path).map(|v| match v {
            Value::Null => ValueKind::Null,
            Value::Bool(_) => ValueKind::Bool,
            Value::Number(n) if n.is_f64() => ValueKind::Double,
            Value::Number(_) => ValueKind::Int,
            Value::String(_) => ValueKind::String,
            Value::Array(_) => ValueKind::Array,
            Value::Object(_) => ValueKind::Object,
        })
    }

    /// Integer at `path`. A number stored as floating point never coerces.
    pub fn get_int(&self, path: &str) -> Option<i64> {
        self.get(path).and_then(Value::as_i64)
    }

    /// Floating-point number at `path`. An integer-stored number is absent.
    pub fn get_double(&self, path: &str) -> Option<f64> {
        match self.get(path) {
            Some(Value::Number(n)) if n.is_f64() => n.as_f64(),
            _ => None,
        }
    }

    /// String at `path`.
    pub fn get_string(&self, path: &str) -> Option<&str> {
        self.get(path).and_then(Value::as_str)
    }

    /// Array at `path`.
    pub fn get_array(&self, path: &str) -> Option<&Vec<Value>> {
        match self.get(path) {
            Some(Value::Array(arr)) => Some(arr),
            _ => None,
        }
    }

    /// Object at `path`.
    pub fn get_object(&self, path: &str) -> Option<&Map<String, Value>> {
        match self.get(path) {
            Some(Value::Object(map)) => Some(map),
            _ => None,
        }
    }

    /// Clone of the JSON node at `path`, whatever its kind.
    pub fn get_json(&self, path: &str) -> Option<Value> {
        self.get(path).cloned()
    }

    pub fn is_int(&self, path: &str) -> bool {
        matches!(self.kind(path), Some(ValueKind::Int))
    }

    pub fn is_double(&self, path: &str) -> bool {
        matches!(self.kind(path), Some(ValueKind::Double))
    }

    pub fn is_string(&self, path: &str) -> bool {
        matches!(self.kind(path), Some(ValueKind::String))
    }

    pub fn is_array(&self, path: &str) -> bool {
        matches!(self.kind(path), Some(ValueKind::Array))
    }

    pub fn is_object(&self, path: &str) -> bool {
        matches!(self.kind(path), Some(ValueKind::Object))
    }

    /// Canonical serialization of the subtree at `path`.
    pub fn to_string_at(&self, path: &str) -> Option<String> {
        self.get(path).map(|v| v.to_string())
    }

    // -----------------------------------------------------------------
    // Writers
    // -----------------------------------------------------------------

    pub fn set_int(&mut self, path: &str, value: i64) -> Result<()> {
        self.set_json(path, Value::from(value))
    }

    pub fn set_double(&mut self, path: &str, value: f64) -> Result<()> {
        self.set_json(path, Value::from(value))
    }

    pub fn set_string(&mut self, path: &str, value: impl Into<String>) -> Result<()> {
        self.set_json(path, Value::String(value.into()))
    }

    /// Create-or-overwrite the node at `path`, creating missing
    /// intermediate objects. Fails without mutating when an existing
    /// intermediate is not an object.
    pub fn set_json(&mut self, path: &str, value: Value) -> Result<()> {
        let slot = self.entry_mut(path)?;
        *slot = value;
        Ok(())
    }

    /// Append a string element to the array at `path`, creating the array
    /// when the path is absent.
    pub fn append_string(&mut self, path: &str, value: impl Into<String>) -> Result<()> {
        self.append_json(path, Value::String(value.into()))
    }

    /// Append a JSON element to the array at `path`, creating the array
    /// when the path is absent. Fails when the path holds a non-array.
    pub fn append_json(&mut self, path: &str, value: Value) -> Result<()> {
        let slot = self.entry_mut(path)?;
        match slot {
            Value::Array(arr) => arr.push(value),
            Value::Null => *slot = Value::Array(vec![value]),
            _ => {
                return Err(DocumentError::NotAnArray {
                    path: path.to_string(),
                });
            }
        }
        Ok(())
    }

    /// Remove the node at `path`; returns whether a removal occurred.
    ///
    /// Erasing the root resets the document to an empty object and reports
    /// whether it held anything.
    pub fn erase(&mut self, path: &str) -> bool {
        if path.is_empty() {
            let had_content = match &self.value {
                Value::Object(map) => !map.is_empty(),
                Value::Null => false,
                _ => true,
            };
            self.value = Value::Object(Map::new());
            return had_content;
        }
        let Some(idx) = path.rfind('/') else {
            return false;
        };
        let token = unescape(&path[idx + 1..]);
        let parent = if idx == 0 {
            Some(&mut self.value)
        } else {
            self.value.pointer_mut(&path[..idx])
        };
        match parent {
            Some(Value::Object(map)) => map.remove(&token).is_some(),
            Some(Value::Array(arr)) => match token.parse::<usize>() {
                Ok(i) if i < arr.len() => {
                    arr.remove(i);
                    true
                }
                _ => false,
            },
            _ => false,
        }
    }

    /// Merge the subtree at `src_path` into `dst_path`.
    ///
    /// Both endpoints must exist and share the same composite kind: object
    /// keys from the source overwrite the destination's, array elements
    /// are appended. The merge is destructive: the source node is removed
    /// afterwards.
    pub fn merge(&mut self, src_path: &str, dst_path: &str) -> Result<()> {
        let src = self
            .get_json(src_path)
            .ok_or_else(|| DocumentError::Missing(src_path.to_string()))?;
        let dst = self
            .value
            .pointer_mut(dst_path)
            .ok_or_else(|| DocumentError::Missing(dst_path.to_string()))?;
        match (src, dst) {
            (Value::Object(s), Value::Object(d)) => {
                for (k, v) in s {
                    d.insert(k, v);
                }
            }
            (Value::Array(s), Value::Array(d)) => {
                d.extend(s);
            }
            _ => {
                return Err(DocumentError::MergeKindMismatch {
                    src: src_path.to_string(),
                    dst: dst_path.to_string(),
                });
            }
        }
        self.erase(src_path);
        Ok(())
    }

    // -----------------------------------------------------------------
    // Path descent
    // -----------------------------------------------------------------

    /// Mutable slot at `path`, creating missing intermediate objects and a
    /// `Null` placeholder for a missing leaf.
    ///
    /// Creation only happens past the deepest existing node, so a failed
    /// descent (existing non-object intermediate) leaves the tree
    /// untouched.
    fn entry_mut(&mut self, path: &str) -> Result<&mut Value> {
        if path.is_empty() {
            return Ok(&mut self.value);
        }
        if !path.starts_with('/') {
            return Err(DocumentError::InvalidPointer(path.to_string()));
        }
        let tokens: Vec<String> = path[1..].split('/').map(unescape).collect();
        let mut cur = &mut self.value;
        for token in &tokens[..tokens.len() - 1] {
            match cur {
                Value::Object(map) => {
                    cur = map
                        .entry(token.clone())
                        .or_insert_with(|| Value::Object(Map::new()));
                }
                _ => {
                    return Err(DocumentError::IntermediateNotObject {
                        path: path.to_string(),
                    });
                }
            }
        }
        match cur {
            Value::Object(map) => {
                let leaf = &tokens[tokens.len() - 1];
                Ok(map.entry(leaf.clone()).or_insert(Value::Null))
            }
            _ => Err(DocumentError::IntermediateNotObject {
                path: path.to_string(),
            }),
        }
    }
}

/// Undo JSON pointer token escaping (`~1` → `/`, `~0` → `~`).
fn unescape(token: &str) -> String {
    token.replace("~1", "/").replace("~0", "~")
}
