//! Immutable description of a composed list query
//!
//! A [`QuerySpec`] is built by successive pure transformations and handed to a
//! [`RecordStore`](crate::core::store::RecordStore) in one `execute` call.
//! Stores translate it into their own dialect; nothing here talks to a store.

use crate::core::query::RowRange;
use serde::{Deserialize, Serialize};

/// Projection used when a list does not name one
pub const SELECT_ALL: &str = "*";

/// How the store should count matching rows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CountMode {
    /// Exact count of the filtered set, ignoring the row window
    Exact,
}

/// A single `column = value` restriction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Equality {
    pub column: String,
    pub value: String,
}

/// One case-insensitive partial match inside a search group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternMatch {
    pub column: String,

    /// ILIKE pattern, `%` for any run and `_` for any single character
    pub pattern: String,
}

/// Columns matched with OR against one search term
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchGroup {
    pub term: String,
    pub matches: Vec<PatternMatch>,
}

impl SearchGroup {
    /// Build the OR group for `term` over `columns`, wildcard-wrapping the term
    pub fn over<S: AsRef<str>>(term: &str, columns: &[S]) -> Self {
        let pattern = format!("%{}%", term);
        Self {
            term: term.to_string(),
            matches: columns
                .iter()
                .map(|c| PatternMatch {
                    column: c.as_ref().to_string(),
                    pattern: pattern.clone(),
                })
                .collect(),
        }
    }
}

/// Ordering clause
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderBy {
    pub column: String,
    pub ascending: bool,
}

impl OrderBy {
    pub fn asc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            ascending: true,
        }
    }

    pub fn desc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            ascending: false,
        }
    }
}

/// The full query a store is asked to run
///
/// Semantics: rows of `collection` where every equality holds AND (any match
/// of the search group, if present), ordered by `order` (store default when
/// `None`), restricted to `range`, with `count` over the unrestricted set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuerySpec {
    pub collection: String,
    pub projection: String,
    pub count: CountMode,
    pub equalities: Vec<Equality>,
    pub search: Option<SearchGroup>,
    pub order: Option<OrderBy>,
    pub range: Option<RowRange>,
}

impl QuerySpec {
    /// Base query over a collection, requesting an exact count
    pub fn select(collection: impl Into<String>, projection: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            projection: projection.into(),
            count: CountMode::Exact,
            equalities: Vec::new(),
            search: None,
            order: None,
            range: None,
        }
    }

    pub fn with_equality(mut self, column: impl Into<String>, value: impl Into<String>) -> Self {
        self.equalities.push(Equality {
            column: column.into(),
            value: value.into(),
        });
        self
    }

    /// Set the OR search group; a group without columns is dropped
    pub fn with_search(mut self, group: SearchGroup) -> Self {
        self.search = if group.matches.is_empty() {
            None
        } else {
            Some(group)
        };
        self
    }

    pub fn with_order(mut self, order: OrderBy) -> Self {
        self.order = Some(order);
        self
    }

    pub fn with_range(mut self, range: RowRange) -> Self {
        self.range = Some(range);
        self
    }

    /// Equality value on `column`, if any
    pub fn equality_on(&self, column: &str) -> Option<&str> {
        self.equalities
            .iter()
            .find(|e| e.column == column)
            .map(|e| e.value.as_str())
    }
}
