//! The TOML encoder: value dispatch, table flattening, and cycle detection.
//!
//! ## Overview
//!
//! [`TomlEncoder`] holds one immutable configuration: the inline-table and
//! comment toggles, the array separator, and two dispatch tables for
//! extension scalars (an exact-type table and an ordered probe list). A
//! configuration is set up once and may back any number of renders; a render
//! allocates only transient bookkeeping (the visited-identity set and the
//! per-layer work queues) that is discarded when it returns.
//!
//! ## Flattening
//!
//! Rendering a document is a layered, breadth-first walk rather than
//! unbounded recursive descent: [`TomlEncoder::encode`] flattens the root
//! into its immediate assignments plus a residual map of deferred
//! sub-tables, then repeatedly expands that residual one nesting depth at a
//! time, so headers are always written before their descendants' and
//! document depth is bounded by memory, not call-stack depth.
//! Array-of-tables elements recurse one controlled level each, bounded by
//! the document's own nesting.
//!
//! ## Cycle detection
//!
//! Tables are shared handles, so a table can (transitively) contain itself.
//! Before expanding each layer the encoder checks every table about to be
//! flattened against the identities of all tables flattened in previous
//! layers and aborts with [`Error::Cycle`] on a match, returning no partial
//! output.
//!
//! ## Usage
//!
//! Most users should use the crate-root functions:
//!
//! ```rust
//! use toml_emit::{to_string_with, Table, TomlEncoder};
//!
//! let table = Table::new();
//! table.insert("values", vec![1, 2, 3]);
//!
//! let encoder = TomlEncoder::new().with_array_separator(",\t").unwrap();
//! assert_eq!(to_string_with(&table, &encoder).unwrap(), "values = [ 1,\t 2,\t 3,\t]\n");
//! ```

use crate::fmt;
use crate::table::Table;
use crate::value::{Scalar, Value};
use crate::{Error, Result};
use indexmap::IndexMap;
use std::any::{Any, TypeId};
use std::collections::{HashMap, HashSet};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::path::PathBuf;

/// An exact-type formatter for one concrete extension scalar type.
pub type ScalarFormatter = Box<dyn Fn(&dyn Scalar) -> String>;

/// A capability probe: returns the formatted text if it recognizes the
/// scalar, `None` to let the next probe try.
pub type ScalarProbe = Box<dyn Fn(&dyn Scalar) -> Option<String>>;

/// A configurable TOML encoder.
///
/// The default configuration renders plain TOML: nested tables become
/// `[header]` blocks, arrays use a comma separator, inline markers and
/// comments are ignored. Variants are built by toggling one extension point
/// at a time; the flattening algorithm itself is never altered:
///
/// - [`with_inline_tables`](Self::with_inline_tables) honors the per-table
///   inline marker,
/// - [`with_array_separator`](Self::with_array_separator) changes the list
///   separator (validated at construction),
/// - [`with_comments`](Self::with_comments) re-attaches stored comment text,
/// - [`with_numeric_scalars`](Self::with_numeric_scalars) registers
///   formatters for the fixed-width numeric primitives,
/// - [`register_scalar`](Self::register_scalar) /
///   [`register_probe`](Self::register_probe) are the open extension
///   surface for anything else.
pub struct TomlEncoder {
    preserve_inline_tables: bool,
    preserve_comments: bool,
    separator: String,
    by_type: HashMap<TypeId, ScalarFormatter>,
    probes: Vec<ScalarProbe>,
}

impl Default for TomlEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl TomlEncoder {
    /// Creates the default encoder configuration.
    ///
    /// Filesystem paths and network addresses are pre-registered as
    /// capability probes and render as quoted strings.
    #[must_use]
    pub fn new() -> Self {
        let mut encoder = TomlEncoder {
            preserve_inline_tables: false,
            preserve_comments: false,
            separator: ",".to_string(),
            by_type: HashMap::new(),
            probes: Vec::new(),
        };
        encoder.register_probe(|scalar| {
            scalar
                .as_any()
                .downcast_ref::<PathBuf>()
                .map(|p| fmt::format_string(&p.display().to_string()))
        });
        encoder.register_probe(|scalar| {
            let any = scalar.as_any();
            if let Some(addr) = any.downcast_ref::<Ipv4Addr>() {
                return Some(fmt::format_string(&addr.to_string()));
            }
            if let Some(addr) = any.downcast_ref::<Ipv6Addr>() {
                return Some(fmt::format_string(&addr.to_string()));
            }
            if let Some(addr) = any.downcast_ref::<IpAddr>() {
                return Some(fmt::format_string(&addr.to_string()));
            }
            if let Some(addr) = any.downcast_ref::<SocketAddr>() {
                return Some(fmt::format_string(&addr.to_string()));
            }
            None
        });
        encoder
    }

    /// Honors the inline-table marker: marked tables render on one line as
    /// `{ k = v, ... }` instead of being promoted to a `[header]` block.
    #[must_use]
    pub fn with_inline_tables(mut self) -> Self {
        self.preserve_inline_tables = true;
        self
    }

    /// Re-attaches the comment text stored on
    /// [`Value::Commented`] wrappers verbatim after the wrapped value's
    /// rendered text. Without this, comments are dropped.
    #[must_use]
    pub fn with_comments(mut self) -> Self {
        self.preserve_comments = true;
        self
    }

    /// Sets the array separator.
    ///
    /// A separator must be a comma plus optional surrounding whitespace. A
    /// whitespace-only separator is normalized by prefixing a comma; any
    /// other character is rejected at construction.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidSeparator`] if `separator` contains anything
    /// other than commas and whitespace.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use toml_emit::TomlEncoder;
    ///
    /// assert!(TomlEncoder::new().with_array_separator(",\t").is_ok());
    /// assert!(TomlEncoder::new().with_array_separator(";").is_err());
    /// ```
    pub fn with_array_separator(mut self, separator: &str) -> Result<Self> {
        let stripped: String = separator
            .chars()
            .filter(|c| !matches!(c, ' ' | '\t' | '\n' | '\r' | ','))
            .collect();
        if !stripped.is_empty() {
            return Err(Error::InvalidSeparator(separator.to_string()));
        }
        self.separator = if separator.trim().is_empty() {
            format!(",{}", separator)
        } else {
            separator.to_string()
        };
        Ok(self)
    }

    /// Registers exact-type formatters for the fixed-width numeric
    /// primitives, routing them through the existing integer and float
    /// formatting rules.
    #[must_use]
    pub fn with_numeric_scalars(mut self) -> Self {
        self.register_scalar::<f32>(|v| fmt::format_float(f64::from(*v)));
        self.register_scalar::<i8>(|v| fmt::format_integer(i64::from(*v)));
        self.register_scalar::<i16>(|v| fmt::format_integer(i64::from(*v)));
        self.register_scalar::<i32>(|v| fmt::format_integer(i64::from(*v)));
        self.register_scalar::<u8>(|v| fmt::format_integer(i64::from(*v)));
        self.register_scalar::<u16>(|v| fmt::format_integer(i64::from(*v)));
        self.register_scalar::<u32>(|v| fmt::format_integer(i64::from(*v)));
        self.register_scalar::<u64>(|v| v.to_string());
        self.register_scalar::<i128>(|v| v.to_string());
        self.register_scalar::<u128>(|v| v.to_string());
        self
    }

    /// Registers an exact-type formatter for extension scalars of type `T`.
    ///
    /// Exact-type lookup runs before the capability probes; registering a
    /// type again replaces its formatter without affecting dispatch order
    /// for other entries.
    pub fn register_scalar<T: Scalar>(&mut self, format: impl Fn(&T) -> String + 'static) {
        self.by_type.insert(
            TypeId::of::<T>(),
            Box::new(move |scalar: &dyn Scalar| match scalar.as_any().downcast_ref::<T>() {
                Some(v) => format(v),
                None => fmt::format_string(&scalar.text()),
            }),
        );
    }

    /// Appends a capability probe. Probes run in registration order after
    /// exact-type lookup; the first probe returning `Some` wins.
    pub fn register_probe<F>(&mut self, probe: F)
    where
        F: Fn(&dyn Scalar) -> Option<String> + 'static,
    {
        self.probes.push(Box::new(probe));
    }

    /// Formats a single value to its TOML text.
    ///
    /// Tables reached through this entry render in inline `{ ... }` syntax;
    /// the flattening driver is responsible for promoting tables to header
    /// blocks.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Cycle`] if a table reachable from `value` contains
    /// itself.
    pub fn format_value(&self, value: &Value) -> Result<String> {
        self.format_value_inner(value, &mut HashSet::new())
    }

    fn format_value_inner(&self, value: &Value, path: &mut HashSet<usize>) -> Result<String> {
        Ok(match value {
            Value::Null => fmt::format_string("null"),
            Value::Bool(b) => fmt::format_bool(*b).to_string(),
            Value::Integer(i) => fmt::format_integer(*i),
            Value::BigInt(i) => i.to_string(),
            Value::Float(f) => fmt::format_float(*f),
            Value::String(s) => fmt::format_string(s),
            Value::Date(d) => fmt::format_date(d),
            Value::Time(t) => fmt::format_time(t),
            Value::Datetime(dt) => fmt::format_datetime(dt),
            Value::Array(items) => self.format_array(items, path)?,
            Value::Table(table) => self.format_inline_table_inner(table, path)?,
            Value::Commented(c) => {
                let body = self.format_value_inner(&c.value, path)?;
                if self.preserve_comments {
                    format!("{}{}", body, c.comment)
                } else {
                    body
                }
            }
            Value::Ext(scalar) => self.format_scalar(scalar.as_ref()),
        })
    }

    /// Resolves an extension scalar: exact type, then probes, then the
    /// string fallback. Never fails.
    fn format_scalar(&self, scalar: &dyn Scalar) -> String {
        if let Some(format) = self.by_type.get(&Any::type_id(scalar.as_any())) {
            return format(scalar);
        }
        for probe in &self.probes {
            if let Some(text) = probe(scalar) {
                return text;
            }
        }
        fmt::format_string(&scalar.text())
    }

    fn format_array(&self, items: &[Value], path: &mut HashSet<usize>) -> Result<String> {
        let mut out = String::from("[");
        for item in items {
            out.push(' ');
            out.push_str(&self.format_value_inner(item, path)?);
            out.push_str(&self.separator);
        }
        out.push(']');
        Ok(out)
    }

    /// Renders a table in single-line `{ k = v, ... }` syntax.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Cycle`] if the table contains itself.
    pub fn format_inline_table(&self, table: &Table) -> Result<String> {
        self.format_inline_table_inner(table, &mut HashSet::new())
    }

    fn format_inline_table_inner(
        &self,
        table: &Table,
        path: &mut HashSet<usize>,
    ) -> Result<String> {
        if !path.insert(table.id()) {
            return Err(Error::Cycle);
        }
        let mut parts = Vec::new();
        for (key, value) in table.entries() {
            if value.is_null() {
                continue;
            }
            parts.push(format!(
                "{} = {}",
                fmt::format_key(&key),
                self.format_value_inner(&value, path)?
            ));
        }
        path.remove(&table.id());
        Ok(format!("{{ {} }}", parts.join(", ")))
    }

    /// Flattens one table layer: the text of its immediate assignments
    /// (including fully expanded array-of-tables blocks) plus the residual
    /// map of nested tables still needing their own headers.
    fn flatten(
        &self,
        table: &Table,
        prefix: &str,
        visited: &mut HashSet<usize>,
    ) -> Result<(String, IndexMap<String, Table>)> {
        let sup = if prefix.is_empty() || prefix.ends_with('.') {
            prefix.to_string()
        } else {
            format!("{}.", prefix)
        };
        let mut assignments = String::new();
        let mut array_blocks = String::new();
        let mut residual: IndexMap<String, Table> = IndexMap::new();
        for (key, value) in table.entries() {
            let qkey = fmt::format_key(&key);
            match value {
                Value::Null => {}
                Value::Table(sub) => {
                    if self.preserve_inline_tables && sub.is_inline() {
                        let inline = self.format_inline_table(&sub)?;
                        assignments.push_str(&format!("{} = {}\n", qkey, inline));
                    } else {
                        residual.insert(qkey, sub);
                    }
                }
                Value::Array(ref items)
                    if items.iter().any(|v| matches!(v, Value::Table(_))) =>
                {
                    self.flatten_array_of_tables(items, &sup, &qkey, visited, &mut array_blocks)?;
                }
                other => {
                    assignments
                        .push_str(&format!("{} = {}\n", qkey, self.format_value(&other)?));
                }
            }
        }
        assignments.push_str(&array_blocks);
        Ok((assignments, residual))
    }

    /// Expands one `[[key]]` block per element, each element's own nesting
    /// flattened layer by layer like the top-level driver.
    fn flatten_array_of_tables(
        &self,
        items: &[Value],
        sup: &str,
        qkey: &str,
        visited: &HashSet<usize>,
        out: &mut String,
    ) -> Result<()> {
        for item in items {
            let element = match item {
                Value::Table(t) => t,
                _ => {
                    return Err(Error::custom(format!(
                        "array of tables {}{} contains a non-table element",
                        sup, qkey
                    )))
                }
            };
            if visited.contains(&element.id()) {
                return Err(Error::Cycle);
            }
            // Each element descends with its own visited set so repeated
            // sibling elements stay legal while ancestor recurrence fails.
            let mut elem_visited = visited.clone();
            elem_visited.insert(element.id());

            out.push_str(&format!("[[{}{}]]\n", sup, qkey));
            let (body, mut layer) =
                self.flatten(element, &format!("{}{}", sup, qkey), &mut elem_visited)?;
            let mut tail = String::from("\n");
            if !body.is_empty() {
                if body.starts_with('[') {
                    tail.push_str(&body);
                } else {
                    out.push_str(&body);
                }
            }
            while !layer.is_empty() {
                for sub in layer.values() {
                    if elem_visited.contains(&sub.id()) {
                        return Err(Error::Cycle);
                    }
                }
                for sub in layer.values() {
                    elem_visited.insert(sub.id());
                }
                let mut next: IndexMap<String, Table> = IndexMap::new();
                for (name, sub) in &layer {
                    let qualified = format!("{}{}.{}", sup, qkey, name);
                    let (sub_body, deeper) = self.flatten(sub, &qualified, &mut elem_visited)?;
                    if !sub_body.is_empty() {
                        tail.push_str(&format!("[{}]\n", qualified));
                        tail.push_str(&sub_body);
                    }
                    for (deeper_name, deeper_table) in deeper {
                        next.insert(format!("{}.{}", name, deeper_name), deeper_table);
                    }
                }
                layer = next;
            }
            out.push_str(&tail);
        }
        Ok(())
    }

    /// Renders a complete TOML document for `root`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Cycle`] if any container is reachable from itself;
    /// no partial text is returned.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use toml_emit::{Table, TomlEncoder};
    ///
    /// let table = Table::new();
    /// table.insert("a", "I'm a string");
    /// table.insert("b", vec!["I'm", "a", "list"]);
    /// table.insert("c", 2400);
    ///
    /// let text = TomlEncoder::new().encode(&table).unwrap();
    /// assert_eq!(text, "a = \"I'm a string\"\nb = [ \"I'm\", \"a\", \"list\",]\nc = 2400\n");
    /// ```
    pub fn encode(&self, root: &Table) -> Result<String> {
        let mut visited: HashSet<usize> = HashSet::new();
        visited.insert(root.id());
        let (body, mut sections) = self.flatten(root, "", &mut visited)?;
        let mut out = body;
        while !sections.is_empty() {
            for table in sections.values() {
                if visited.contains(&table.id()) {
                    return Err(Error::Cycle);
                }
            }
            for table in sections.values() {
                visited.insert(table.id());
            }
            let mut next: IndexMap<String, Table> = IndexMap::new();
            for (name, table) in &sections {
                let (body, residual) = self.flatten(table, name, &mut visited)?;
                // A header is written when the table has assignments of its
                // own, or is a leaf; a bodiless table with deferred children
                // is declared implicitly by its descendants' headers.
                if !body.is_empty() || residual.is_empty() {
                    if !out.is_empty() && !out.ends_with("\n\n") {
                        out.push('\n');
                    }
                    out.push_str(&format!("[{}]\n", name));
                    out.push_str(&body);
                }
                for (child, table) in residual {
                    next.insert(format!("{}.{}", name, child), table);
                }
            }
            sections = next;
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(entries: &[(&str, Value)]) -> Table {
        let t = Table::new();
        for (k, v) in entries {
            t.insert(*k, v.clone());
        }
        t
    }

    #[test]
    fn flat_assignments() {
        let t = table(&[
            ("a", Value::from("I'm a string")),
            ("b", Value::from(vec!["I'm", "a", "list"])),
            ("c", Value::from(2400)),
        ]);
        assert_eq!(
            TomlEncoder::new().encode(&t).unwrap(),
            "a = \"I'm a string\"\nb = [ \"I'm\", \"a\", \"list\",]\nc = 2400\n"
        );
    }

    #[test]
    fn nested_tables_layer_breadth_first() {
        let u = table(&[("c", Value::from(3))]);
        let t = table(&[("b", Value::from(2)), ("u", Value::Table(u))]);
        let s = table(&[("d", Value::from(4))]);
        let root = table(&[
            ("a", Value::from(1)),
            ("t", Value::Table(t)),
            ("s", Value::Table(s)),
        ]);
        assert_eq!(
            TomlEncoder::new().encode(&root).unwrap(),
            "a = 1\n\n[t]\nb = 2\n\n[s]\nd = 4\n\n[t.u]\nc = 3\n"
        );
    }

    #[test]
    fn empty_tables() {
        let root = table(&[
            ("t", Value::Table(Table::new())),
            ("u", Value::Table(table(&[("v", Value::Table(Table::new()))]))),
        ]);
        assert_eq!(TomlEncoder::new().encode(&root).unwrap(), "[t]\n\n[u.v]\n");
    }

    #[test]
    fn deep_chain_emits_only_leaf_header() {
        let est = table(&[("x", Value::from(1))]);
        let er = table(&[("est", Value::Table(est))]);
        let root = table(&[("deep", Value::Table(table(&[("er", Value::Table(er))])))]);
        assert_eq!(
            TomlEncoder::new().encode(&root).unwrap(),
            "[deep.er.est]\nx = 1\n"
        );
    }

    #[test]
    fn array_of_tables_layout() {
        let y = table(&[("z", Value::from(3))]);
        let e1 = table(&[("x", Value::from(1))]);
        let e2 = table(&[("x", Value::from(2)), ("y", Value::Table(y))]);
        let root = table(&[(
            "arr",
            Value::Array(vec![Value::Table(e1), Value::Table(e2)]),
        )]);
        assert_eq!(
            TomlEncoder::new().encode(&root).unwrap(),
            "[[arr]]\nx = 1\n\n[[arr]]\nx = 2\n\n[arr.y]\nz = 3\n"
        );
    }

    #[test]
    fn array_of_tables_deep_element() {
        let w = table(&[("q", Value::from(4))]);
        let y = table(&[("z", Value::from(3)), ("w", Value::Table(w))]);
        let e = table(&[("x", Value::from(1)), ("y", Value::Table(y))]);
        let root = table(&[("arr2", Value::Array(vec![Value::Table(e)]))]);
        assert_eq!(
            TomlEncoder::new().encode(&root).unwrap(),
            "[[arr2]]\nx = 1\n\n[arr2.y]\nz = 3\n[arr2.y.w]\nq = 4\n"
        );
    }

    #[test]
    fn array_of_tables_inside_section() {
        let e = table(&[("x", Value::from(1))]);
        let top = table(&[("arr", Value::Array(vec![Value::Table(e)]))]);
        let root = table(&[("top", Value::Table(top))]);
        assert_eq!(
            TomlEncoder::new().encode(&root).unwrap(),
            "[top]\n[[top.arr]]\nx = 1\n\n"
        );
    }

    #[test]
    fn repeated_sibling_elements_are_legal() {
        let shared = table(&[("x", Value::from(1))]);
        let root = table(&[(
            "arr",
            Value::Array(vec![
                Value::Table(shared.clone()),
                Value::Table(shared.clone()),
            ]),
        )]);
        assert_eq!(
            TomlEncoder::new().encode(&root).unwrap(),
            "[[arr]]\nx = 1\n\n[[arr]]\nx = 1\n\n"
        );
    }

    #[test]
    fn mixed_array_of_tables_is_an_error() {
        let e = table(&[("x", Value::from(1))]);
        let root = table(&[("mixed", Value::Array(vec![Value::Table(e), Value::from(5)]))]);
        assert!(matches!(
            TomlEncoder::new().encode(&root),
            Err(Error::Message(_))
        ));
    }

    #[test]
    fn self_referential_table_is_a_cycle() {
        let b = Table::new();
        b.insert("self", b.clone());
        let a = table(&[("b", Value::Table(b.clone()))]);
        assert!(matches!(TomlEncoder::new().encode(&a), Err(Error::Cycle)));
        assert!(matches!(TomlEncoder::new().encode(&b), Err(Error::Cycle)));
    }

    #[test]
    fn cycle_through_array_of_tables() {
        let root = Table::new();
        let element = Table::new();
        element.insert("back", root.clone());
        root.insert("arr", Value::Array(vec![Value::Table(element)]));
        assert!(matches!(
            TomlEncoder::new().encode(&root),
            Err(Error::Cycle)
        ));
    }

    #[test]
    fn cycle_through_inline_array() {
        let root = Table::new();
        root.insert(
            "a",
            Value::Array(vec![Value::Array(vec![Value::Table(root.clone())])]),
        );
        assert!(matches!(
            TomlEncoder::new().encode(&root),
            Err(Error::Cycle)
        ));
    }

    #[test]
    fn nested_plain_arrays() {
        let root = table(&[(
            "nested",
            Value::Array(vec![Value::from(vec![1, 2]), Value::from(vec![3])]),
        )]);
        assert_eq!(
            TomlEncoder::new().encode(&root).unwrap(),
            "nested = [ [ 1, 2,], [ 3,],]\n"
        );
    }

    #[test]
    fn null_values_are_omitted() {
        let root = table(&[("n", Value::Null), ("after", Value::from(2))]);
        assert_eq!(TomlEncoder::new().encode(&root).unwrap(), "after = 2\n");
    }

    #[test]
    fn separator_validation() {
        assert!(TomlEncoder::new().with_array_separator(",").is_ok());
        assert!(TomlEncoder::new().with_array_separator(",\t").is_ok());
        assert!(TomlEncoder::new().with_array_separator(";").is_err());
        assert!(TomlEncoder::new().with_array_separator(", x").is_err());

        // Whitespace-only separators get a comma prefixed.
        let enc = TomlEncoder::new().with_array_separator("  ").unwrap();
        assert_eq!(enc.separator, ",  ");
    }

    #[test]
    fn inline_marker_requires_the_variant() {
        let d = Table::inline();
        d.insert("x", "abc");
        let root = table(&[("d", Value::Table(d)), ("n", Value::from(1))]);

        let inline = TomlEncoder::new().with_inline_tables();
        assert_eq!(
            inline.encode(&root).unwrap(),
            "d = { x = \"abc\" }\nn = 1\n"
        );
        assert_eq!(
            TomlEncoder::new().encode(&root).unwrap(),
            "n = 1\n\n[d]\nx = \"abc\"\n"
        );
    }

    #[test]
    fn exact_type_beats_probes() {
        let mut encoder = TomlEncoder::new();
        encoder.register_probe(|s| {
            s.as_any().downcast_ref::<char>().map(|_| "\"probe\"".to_string())
        });
        encoder.register_scalar::<char>(|c| fmt::format_string(&c.to_string()));
        let root = table(&[("c", Value::ext('x'))]);
        assert_eq!(encoder.encode(&root).unwrap(), "c = \"x\"\n");
    }

    #[test]
    fn unmatched_scalars_fall_back_to_strings() {
        let root = table(&[("c", Value::ext('x'))]);
        assert_eq!(TomlEncoder::new().encode(&root).unwrap(), "c = \"x\"\n");
    }
}
