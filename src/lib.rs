//! # toml_emit
//!
//! A TOML document encoder: turns ordered, possibly-shared tables of
//! dynamically-typed values into TOML text.
//!
//! ## Features
//!
//! - **Order-preserving**: output follows the input's key order at every
//!   level; nothing is sorted
//! - **Layered flattening**: nested tables become `[dotted.headers]`,
//!   written breadth-first one depth at a time, so document depth never
//!   translates into call-stack depth
//! - **Array-of-tables**: arrays whose elements are tables render as
//!   repeated `[[key]]` blocks
//! - **Cycle detection**: tables are shared handles; self-containing
//!   documents fail with [`Error::Cycle`] instead of looping, and a failed
//!   render never returns partial text
//! - **Encoder variants**: inline tables, preserved comments, custom array
//!   separators, and extension-scalar formatters, each an independent
//!   toggle on [`TomlEncoder`]
//! - **Serde bridge**: [`to_table`] builds a document from any
//!   [`serde::Serialize`] type
//!
//! ## Quick Start
//!
//! ```rust
//! use toml_emit::Table;
//!
//! let owner = Table::new();
//! owner.insert("name", "Alice");
//!
//! let doc = Table::new();
//! doc.insert("title", "example");
//! doc.insert("owner", owner);
//!
//! let text = toml_emit::to_string(&doc).unwrap();
//! assert_eq!(text, "title = \"example\"\n\n[owner]\nname = \"Alice\"\n");
//! ```
//!
//! Writing to a file or stream goes through [`dump`], which renders the
//! whole document first and only then performs the terminal write:
//!
//! ```rust,no_run
//! use toml_emit::Table;
//!
//! let doc = Table::new();
//! doc.insert("port", 8080);
//! toml_emit::dump(&doc, "config.toml").unwrap();
//! ```
//!
//! ## Encoder variants
//!
//! ```rust
//! use toml_emit::{Table, TomlEncoder};
//!
//! let doc = Table::new();
//! doc.insert("values", vec![1, 2, 3]);
//!
//! let encoder = TomlEncoder::new().with_array_separator(", ").unwrap();
//! let text = toml_emit::to_string_with(&doc, &encoder).unwrap();
//! assert_eq!(text, "values = [ 1,  2,  3, ]\n");
//! ```

pub mod encode;
pub mod error;
pub mod fmt;
mod macros;
pub mod ser;
pub mod table;
pub mod value;

pub use encode::{ScalarFormatter, ScalarProbe, TomlEncoder};
pub use error::{Error, Result};
pub use ser::{to_table, to_value};
pub use table::Table;
pub use value::{Commented, Scalar, Value};

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Renders `root` as a TOML document with the default encoder.
///
/// # Errors
///
/// Returns [`Error::Cycle`] if the document contains a container reachable
/// from itself.
///
/// # Examples
///
/// ```rust
/// use toml_emit::Table;
///
/// let doc = Table::new();
/// doc.insert("a", 1);
/// assert_eq!(toml_emit::to_string(&doc).unwrap(), "a = 1\n");
/// ```
pub fn to_string(root: &Table) -> Result<String> {
    TomlEncoder::new().encode(root)
}

/// Renders `root` as a TOML document with a configured encoder.
///
/// # Errors
///
/// Returns [`Error::Cycle`] if the document contains a container reachable
/// from itself.
pub fn to_string_with(root: &Table, encoder: &TomlEncoder) -> Result<String> {
    encoder.encode(root)
}

/// Where [`dump`] writes a rendered document.
///
/// Built via `Into` from path-like and writer-like arguments: `&str`,
/// `String`, [`&Path`](Path) and [`PathBuf`] name a file to create or
/// truncate; `&[u8]` and `Vec<u8>` are byte paths validated as UTF-8 at
/// write time; `&mut W` for any [`Write`] implementor streams into the
/// writer.
pub enum Destination<'a> {
    /// A filesystem path; the file is created or truncated.
    Path(PathBuf),
    /// A path given as raw bytes, validated as UTF-8 before use.
    RawPath(Vec<u8>),
    /// An open writer.
    Writer(&'a mut dyn Write),
}

impl From<&str> for Destination<'_> {
    fn from(path: &str) -> Self {
        Destination::Path(PathBuf::from(path))
    }
}

impl From<String> for Destination<'_> {
    fn from(path: String) -> Self {
        Destination::Path(PathBuf::from(path))
    }
}

impl From<&Path> for Destination<'_> {
    fn from(path: &Path) -> Self {
        Destination::Path(path.to_path_buf())
    }
}

impl From<PathBuf> for Destination<'_> {
    fn from(path: PathBuf) -> Self {
        Destination::Path(path)
    }
}

impl From<&[u8]> for Destination<'_> {
    fn from(path: &[u8]) -> Self {
        Destination::RawPath(path.to_vec())
    }
}

impl From<Vec<u8>> for Destination<'_> {
    fn from(path: Vec<u8>) -> Self {
        Destination::RawPath(path)
    }
}

impl<'a, W: Write> From<&'a mut W> for Destination<'a> {
    fn from(writer: &'a mut W) -> Self {
        Destination::Writer(writer)
    }
}

/// Renders `root` with the default encoder and writes it to `dest`,
/// returning the rendered text.
///
/// The document is rendered completely before anything is written, so a
/// render failure leaves the destination untouched.
///
/// # Errors
///
/// Returns [`Error::Cycle`] if rendering fails, [`Error::InvalidDestination`]
/// for a byte path that is not valid UTF-8, and [`Error::Io`] if the write
/// itself fails.
///
/// # Examples
///
/// ```rust
/// use toml_emit::Table;
///
/// let doc = Table::new();
/// doc.insert("a", 1);
///
/// let mut buf = Vec::new();
/// let text = toml_emit::dump(&doc, &mut buf).unwrap();
/// assert_eq!(buf, text.as_bytes());
/// ```
pub fn dump<'a>(root: &Table, dest: impl Into<Destination<'a>>) -> Result<String> {
    dump_with(root, dest, &TomlEncoder::new())
}

/// Renders `root` with a configured encoder and writes it to `dest`,
/// returning the rendered text.
///
/// # Errors
///
/// As for [`dump`].
pub fn dump_with<'a>(
    root: &Table,
    dest: impl Into<Destination<'a>>,
    encoder: &TomlEncoder,
) -> Result<String> {
    let text = encoder.encode(root)?;
    match dest.into() {
        Destination::Path(path) => {
            fs::write(&path, &text).map_err(|e| Error::io(&e.to_string()))?;
        }
        Destination::RawPath(bytes) => {
            let path = std::str::from_utf8(&bytes).map_err(|_| {
                Error::InvalidDestination(format!("path bytes are not valid UTF-8: {:?}", bytes))
            })?;
            fs::write(path, &text).map_err(|e| Error::io(&e.to_string()))?;
        }
        Destination::Writer(writer) => {
            writer
                .write_all(text.as_bytes())
                .map_err(|e| Error::io(&e.to_string()))?;
        }
    }
    Ok(text)
}
