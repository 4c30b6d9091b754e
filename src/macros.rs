/// Builds a [`Value`](crate::Value) from TOML-ish literal syntax.
///
/// Objects become [`Table`](crate::Table)s in the written order; anything
/// that is not recognized literal syntax falls through to
/// [`Value::from`](crate::Value).
///
/// # Examples
///
/// ```rust
/// use toml_emit::toml;
///
/// let doc = toml!({
///     "title": "example",
///     "owner": { "name": "Alice" },
///     "ports": [8001, 8002],
/// });
///
/// let table = doc.as_table().unwrap();
/// let text = toml_emit::to_string(table).unwrap();
/// assert_eq!(
///     text,
///     "title = \"example\"\nports = [ 8001, 8002,]\n\n[owner]\nname = \"Alice\"\n"
/// );
/// ```
#[macro_export]
macro_rules! toml {
    // Handle null
    (null) => {
        $crate::Value::Null
    };

    // Handle true
    (true) => {
        $crate::Value::Bool(true)
    };

    // Handle false
    (false) => {
        $crate::Value::Bool(false)
    };

    // Handle empty array
    ([]) => {
        $crate::Value::Array(vec![])
    };

    // Handle non-empty array
    ([ $($elem:tt),* $(,)? ]) => {
        $crate::Value::Array(vec![$($crate::toml!($elem)),*])
    };

    // Handle empty table
    ({}) => {
        $crate::Value::Table($crate::Table::new())
    };

    // Handle non-empty table
    ({ $($key:literal : $value:tt),* $(,)? }) => {{
        let table = $crate::Table::new();
        $(
            table.insert($key, $crate::toml!($value));
        )*
        $crate::Value::Table(table)
    }};

    // Fallback for any other expression
    ($other:expr) => {
        $crate::Value::from($other)
    };
}
