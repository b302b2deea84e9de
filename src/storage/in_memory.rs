//! In-memory implementation of RecordStore for testing and development

use crate::core::error::StorageError;
use crate::core::spec::{OrderBy, QuerySpec, SELECT_ALL};
use crate::core::store::{RecordStore, StoreResponse};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use regex::{Regex, RegexBuilder};
use serde_json::{Map, Value};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

const BACKEND: &str = "in-memory";

/// In-memory record store
///
/// Collections are vectors of JSON rows kept in insertion order, which is
/// the natural order when a query has no ordering clause. Uses RwLock for
/// thread-safe access.
#[derive(Clone, Default)]
pub struct InMemoryRecordStore {
    collections: Arc<RwLock<HashMap<String, Vec<Value>>>>,
}

impl InMemoryRecordStore {
    /// Create a new in-memory record store
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `collection` queryable, even if it stays empty
    pub fn create_collection(&self, collection: &str) -> Result<(), StorageError> {
        let mut collections = self.write()?;
        collections.entry(collection.to_string()).or_default();
        Ok(())
    }

    /// Append a row to `collection`, creating it if needed
    pub fn insert(&self, collection: &str, row: Value) -> Result<(), StorageError> {
        let mut collections = self.write()?;
        collections
            .entry(collection.to_string())
            .or_default()
            .push(row);
        Ok(())
    }

    /// Append many rows to `collection`
    pub fn extend<I>(&self, collection: &str, rows: I) -> Result<(), StorageError>
    where
        I: IntoIterator<Item = Value>,
    {
        let mut collections = self.write()?;
        collections
            .entry(collection.to_string())
            .or_default()
            .extend(rows);
        Ok(())
    }

    /// Number of rows stored in `collection`
    pub fn len(&self, collection: &str) -> Result<usize, StorageError> {
        let collections = self.read()?;
        Ok(collections.get(collection).map_or(0, Vec::len))
    }

    pub fn is_empty(&self, collection: &str) -> Result<bool, StorageError> {
        Ok(self.len(collection)? == 0)
    }

    fn read(
        &self,
    ) -> Result<std::sync::RwLockReadGuard<'_, HashMap<String, Vec<Value>>>, StorageError> {
        self.collections.read().map_err(|e| lock_error(e.to_string()))
    }

    fn write(
        &self,
    ) -> Result<std::sync::RwLockWriteGuard<'_, HashMap<String, Vec<Value>>>, StorageError> {
        self.collections
            .write()
            .map_err(|e| lock_error(e.to_string()))
    }
}

fn lock_error(message: String) -> StorageError {
    StorageError::ConnectionError {
        backend: BACKEND.to_string(),
        message: format!("Failed to acquire lock: {}", message),
    }
}

fn query_error(message: impl Into<String>) -> StorageError {
    StorageError::QueryError {
        backend: BACKEND.to_string(),
        message: message.into(),
    }
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn execute(&self, spec: &QuerySpec) -> Result<StoreResponse, StorageError> {
        let patterns = spec
            .search
            .iter()
            .flat_map(|group| &group.matches)
            .map(|m| ilike_regex(&m.pattern).map(|regex| (m.column.as_str(), regex)))
            .collect::<Result<Vec<_>, StorageError>>()?;

        let mut matching: Vec<Value> = {
            let collections = self.read()?;
            let rows = collections.get(&spec.collection).ok_or_else(|| {
                query_error(format!("relation \"{}\" does not exist", spec.collection))
            })?;

            rows.iter()
                .filter(|row| {
                    spec.equalities.iter().all(|eq| {
                        scalar_text(&row[eq.column.as_str()]).as_deref() == Some(eq.value.as_str())
                    })
                })
                .filter(|row| {
                    patterns.is_empty()
                        || patterns.iter().any(|(column, regex)| {
                            scalar_text(&row[*column]).is_some_and(|text| regex.is_match(&text))
                        })
                })
                .cloned()
                .collect()
        };

        let count = matching.len() as u64;

        if let Some(order) = &spec.order {
            sort_rows(&mut matching, order);
        }

        let window: Vec<Value> = match spec.range {
            Some(range) => matching
                .into_iter()
                .skip(usize::try_from(range.from).unwrap_or(usize::MAX))
                .take(usize::try_from(range.capacity()).unwrap_or(usize::MAX))
                .collect(),
            None => matching,
        };

        let rows = window
            .into_iter()
            .map(|row| project(row, &spec.projection))
            .collect();

        Ok(StoreResponse {
            rows,
            count: Some(count),
        })
    }
}

/// Text form of a scalar JSON value; `None` for null, arrays and objects
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Compile an ILIKE pattern into an anchored, case-insensitive regex
fn ilike_regex(pattern: &str) -> Result<Regex, StorageError> {
    let mut source = String::with_capacity(pattern.len() + 8);
    source.push('^');
    for c in pattern.chars() {
        match c {
            '%' => source.push_str(".*"),
            '_' => source.push('.'),
            c => source.push_str(&regex::escape(c.encode_utf8(&mut [0; 4]))),
        }
    }
    source.push('$');

    RegexBuilder::new(&source)
        .case_insensitive(true)
        .dot_matches_new_line(true)
        .build()
        .map_err(|e| query_error(format!("invalid pattern {:?}: {}", pattern, e)))
}

/// Stable sort; nulls last ascending and first descending, as PostgreSQL does
fn sort_rows(rows: &mut [Value], order: &OrderBy) {
    let column = order.column.as_str();
    rows.sort_by(|a, b| {
        let (a, b) = (&a[column], &b[column]);
        let ordering = match (a.is_null(), b.is_null()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Greater,
            (false, true) => Ordering::Less,
            (false, false) => compare_values(a, b),
        };
        if order.ascending {
            ordering
        } else {
            ordering.reverse()
        }
    });
}

fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => {
            let (x, y) = (x.as_f64().unwrap_or(0.0), y.as_f64().unwrap_or(0.0));
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Value::String(x), Value::String(y)) => match (parse_timestamp(x), parse_timestamp(y)) {
            (Some(x), Some(y)) => x.cmp(&y),
            _ => x.cmp(y),
        },
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        _ => a.to_string().cmp(&b.to_string()),
    }
}

fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Apply a projection such as `*`, `id,plate`, `id,owner:owner_id` or
/// `*,driver:employees(name)`
///
/// Embedded relations are resolved from a nested value stored under the
/// relation name, if the row carries one.
fn project(row: Value, projection: &str) -> Value {
    let items = split_projection(projection);
    if items.iter().all(|item| *item == SELECT_ALL) {
        return row;
    }

    let Value::Object(source) = row else {
        return row;
    };

    let mut out = Map::new();
    for item in items {
        if item == SELECT_ALL {
            out.extend(source.iter().map(|(k, v)| (k.clone(), v.clone())));
            continue;
        }

        let (alias, expr) = match item.split_once(':') {
            Some((alias, expr)) => (Some(alias.trim()), expr.trim()),
            None => (None, item),
        };
        let column = expr.split('(').next().unwrap_or(expr).trim();
        let column = column.trim_end_matches('!').trim();
        let key = alias.unwrap_or(column);

        if let Some(value) = source.get(column) {
            out.insert(key.to_string(), value.clone());
        }
    }

    Value::Object(out)
}

/// Split a projection on top-level commas
fn split_projection(projection: &str) -> Vec<&str> {
    let mut items = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;

    for (i, c) in projection.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                items.push(projection[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    items.push(projection[start..].trim());
    items.retain(|item| !item.is_empty());

    if items.is_empty() {
        items.push(SELECT_ALL);
    }
    items
}
