//! Evaluation context assembly
//!
//! Contexts are layered maps rendered down into a single `minijinja::Value`:
//! the caller's base data, then column-loop bindings captured during column
//! expansion, then row-loop bindings. Inner layers shadow outer ones, and the
//! row axis shadows the column axis.
//!
//! Loop metadata is exposed under `loop` for the innermost enclosing loop and
//! additionally under `col_loop` for the innermost column loop, so cross-axis
//! cells can address both iterations at once.

use std::collections::BTreeMap;

use minijinja::Value;

use crate::directive::Axis;

/// Build the metadata record for one loop iteration.
///
/// `index0` is the zero-based position, `length` the total element count.
pub fn loop_meta(index0: usize, length: usize) -> Value {
    let index = index0 + 1;
    let mut map: BTreeMap<&str, Value> = BTreeMap::new();
    map.insert("index", Value::from(index));
    map.insert("index0", Value::from(index0));
    map.insert("first", Value::from(index0 == 0));
    map.insert("last", Value::from(index == length));
    map.insert("is_first", Value::from(index0 == 0));
    map.insert("is_last", Value::from(index == length));
    map.insert("length", Value::from(length));
    map.insert("revindex", Value::from(length - index0));
    map.insert("revindex0", Value::from(length - index));
    Value::from_serialize(&map)
}

/// Loop context captured for one surviving column during column expansion.
///
/// Tags are carried through row expansion untouched and merged into each
/// cell's context at render time.
#[derive(Debug, Clone, Default)]
pub struct ColumnTag {
    /// Variable bindings from enclosing column loops, outermost first
    pub bindings: Vec<(String, Value)>,
    /// Metadata of the innermost enclosing column loop, if any
    pub meta: Option<Value>,
}

impl ColumnTag {
    /// True if the column sits inside at least one column loop
    pub fn in_loop(&self) -> bool {
        self.meta.is_some()
    }
}

/// Flatten a map-shaped `Value` into owned key/value pairs.
///
/// Non-map values (and non-string keys) produce an empty base, matching the
/// behaviour of rendering with no ambient data.
pub fn value_to_map(value: &Value) -> BTreeMap<String, Value> {
    let mut map = BTreeMap::new();
    if let Ok(keys) = value.try_iter() {
        for key in keys {
            if let Some(name) = key.as_str() {
                if let Ok(item) = value.get_item(&key) {
                    map.insert(name.to_string(), item);
                }
            }
        }
    }
    map
}

/// Context for evaluating a directive payload (iterable or condition) during
/// expansion of one axis.
pub fn eval_context(
    base: &BTreeMap<String, Value>,
    bindings: &[(String, Value)],
    meta: Option<&Value>,
    axis: Axis,
) -> Value {
    let mut map = base.clone();
    for (name, value) in bindings {
        map.insert(name.clone(), value.clone());
    }
    if let Some(meta) = meta {
        map.insert("loop".to_string(), meta.clone());
        if axis == Axis::Column {
            map.insert("col_loop".to_string(), meta.clone());
        }
    }
    Value::from_serialize(&map)
}

/// Context for rendering one cell: base data, the cell's column tag, then the
/// row-loop bindings and metadata.
///
/// When the cell is inside both axes, `loop` refers to the row iteration and
/// `col_loop` to the column iteration. In a column-only cell the column
/// metadata is reachable under both names.
pub fn cell_context(
    base: &BTreeMap<String, Value>,
    tag: Option<&ColumnTag>,
    row_bindings: &[(String, Value)],
    row_meta: Option<&Value>,
) -> Value {
    let mut map = base.clone();
    if let Some(tag) = tag {
        for (name, value) in &tag.bindings {
            map.insert(name.clone(), value.clone());
        }
        if let Some(meta) = &tag.meta {
            map.insert("loop".to_string(), meta.clone());
            map.insert("col_loop".to_string(), meta.clone());
        }
    }
    for (name, value) in row_bindings {
        map.insert(name.clone(), value.clone());
    }
    if let Some(meta) = row_meta {
        map.insert("loop".to_string(), meta.clone());
    }
    Value::from_serialize(&map)
}
