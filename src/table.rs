//! Ordered table type for TOML documents.
//!
//! This module provides [`Table`], an insertion-ordered mapping from string
//! keys to [`Value`]s. A `Table` is a *shared handle*: cloning it produces
//! another handle to the same underlying storage, the way mapping objects
//! behave in dynamic languages a decoder may be ported from. Shared handles
//! are what make cyclic inputs representable at all, and the encoder's cycle
//! guard rejects them by handle identity rather than looping forever.
//!
//! ## Why IndexMap?
//!
//! Output must preserve the input's key iteration order at every level; the
//! encoder never reorders or sorts keys. [`IndexMap`] gives deterministic,
//! insertion-ordered iteration.
//!
//! ## Examples
//!
//! ```rust
//! use toml_emit::{Table, Value};
//!
//! let table = Table::new();
//! table.insert("name", "Alice");
//! table.insert("age", 30);
//!
//! assert_eq!(table.len(), 2);
//! assert_eq!(table.keys(), vec!["name", "age"]);
//! ```

use crate::Value;
use indexmap::IndexMap;
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Debug, Default)]
struct TableData {
    entries: IndexMap<String, Value>,
    inline: bool,
}

/// An insertion-ordered map of string keys to TOML values.
///
/// `Table` is a cheaply clonable handle; all clones observe the same
/// entries. The `inline` marker is a property of the table *instance*:
/// when the encoder is constructed with
/// [`with_inline_tables`](crate::TomlEncoder::with_inline_tables), a marked
/// table renders as a single-line `{ k = v, ... }` construct instead of
/// being promoted to its own `[header]` block.
///
/// # Examples
///
/// ```rust
/// use toml_emit::Table;
///
/// let table = Table::new();
/// table.insert("first", 1);
/// table.insert("second", 2);
///
/// // Iteration maintains insertion order.
/// let keys = table.keys();
/// assert_eq!(keys, vec!["first", "second"]);
/// ```
#[derive(Clone, Debug, Default)]
pub struct Table(Rc<RefCell<TableData>>);

impl Table {
    /// Creates an empty `Table`.
    #[must_use]
    pub fn new() -> Self {
        Table(Rc::new(RefCell::new(TableData::default())))
    }

    /// Creates an empty `Table` carrying the inline-table marker.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use toml_emit::Table;
    ///
    /// let table = Table::inline();
    /// assert!(table.is_inline());
    /// ```
    #[must_use]
    pub fn inline() -> Self {
        let table = Table::new();
        table.set_inline(true);
        table
    }

    /// Inserts a key-value pair, returning the previous value for the key.
    ///
    /// Re-inserting an existing key keeps its original position.
    pub fn insert(&self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.borrow_mut().entries.insert(key.into(), value.into())
    }

    /// Removes a key, preserving the order of the remaining entries.
    pub fn remove(&self, key: &str) -> Option<Value> {
        self.0.borrow_mut().entries.shift_remove(key)
    }

    /// Returns a clone of the value for `key`, if present.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<Value> {
        self.0.borrow().entries.get(key).cloned()
    }

    /// Returns `true` if the table contains `key`.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.borrow().entries.contains_key(key)
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.borrow().entries.len()
    }

    /// Returns `true` if the table has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.borrow().entries.is_empty()
    }

    /// Returns the keys in insertion order.
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        self.0.borrow().entries.keys().cloned().collect()
    }

    /// Returns a snapshot of the entries in insertion order.
    ///
    /// Values are clones; cloning a nested `Table` clones the handle, not
    /// the storage.
    #[must_use]
    pub fn entries(&self) -> Vec<(String, Value)> {
        self.0
            .borrow()
            .entries
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// Returns `true` if this instance carries the inline-table marker.
    #[must_use]
    pub fn is_inline(&self) -> bool {
        self.0.borrow().inline
    }

    /// Sets or clears the inline-table marker on this instance.
    pub fn set_inline(&self, inline: bool) {
        self.0.borrow_mut().inline = inline;
    }

    /// Stable identity of the underlying storage, used by the cycle guard.
    pub(crate) fn id(&self) -> usize {
        Rc::as_ptr(&self.0) as *const () as usize
    }
}

thread_local! {
    // Pairs currently being compared, so structural equality terminates on
    // distinct cyclic tables: re-encountering a pair already on the stack
    // treats it as equal, and any real difference still surfaces elsewhere.
    static EQ_STACK: RefCell<Vec<(usize, usize)>> = RefCell::new(Vec::new());
}

impl PartialEq for Table {
    fn eq(&self, other: &Self) -> bool {
        if Rc::ptr_eq(&self.0, &other.0) {
            return true;
        }
        let pair = (
            self.id().min(other.id()),
            self.id().max(other.id()),
        );
        let entered = EQ_STACK.with(|stack| {
            let mut stack = stack.borrow_mut();
            if stack.contains(&pair) {
                false
            } else {
                stack.push(pair);
                true
            }
        });
        if !entered {
            return true;
        }
        let equal = self.0.borrow().entries == other.0.borrow().entries;
        EQ_STACK.with(|stack| {
            stack.borrow_mut().pop();
        });
        equal
    }
}

impl FromIterator<(String, Value)> for Table {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        let table = Table::new();
        for (key, value) in iter {
            table.insert(key, value);
        }
        table
    }
}

impl serde::Serialize for Table {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeMap;
        let data = self.0.borrow();
        let mut map = serializer.serialize_map(Some(data.entries.len()))?;
        for (k, v) in data.entries.iter() {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}
