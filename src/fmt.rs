//! Scalar formatting: pure functions turning one scalar value into its TOML
//! textual form.
//!
//! These are the leaves of the encoder; each function is a pure function of
//! its input and is shared by every encoder variant. The dispatch layer in
//! [`crate::encode`] decides *which* of these runs for a given value.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, SecondsFormat};

/// Formats a string as a double-quoted TOML basic string.
///
/// Backslashes and double quotes are escaped, LF/CR/TAB use their short
/// escapes, and any other control character becomes a four-digit `\u00NN`
/// escape. A literal backslash followed by `x` in the source text is
/// therefore emitted as `\\x` and survives a round trip, while a genuine
/// control byte is rewritten as a unicode escape — the two can never
/// collide in the output.
///
/// # Examples
///
/// ```rust
/// use toml_emit::fmt::format_string;
///
/// assert_eq!(format_string("hello"), "\"hello\"");
/// assert_eq!(format_string("\\x64"), "\"\\\\x64\"");
/// assert_eq!(format_string("\u{10}"), "\"\\u0010\"");
/// ```
#[must_use]
pub fn format_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for ch in s.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => {
                // Control characters are all in the BMP; four digits suffice.
                out.push_str(&format!("\\u{:04x}", c as u32));
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Formats a boolean as lowercase `true`/`false`.
#[must_use]
pub fn format_bool(v: bool) -> &'static str {
    if v {
        "true"
    } else {
        "false"
    }
}

/// Formats an integer as plain decimal digits.
#[must_use]
pub fn format_integer(v: i64) -> String {
    v.to_string()
}

/// Formats a float as a TOML float.
///
/// Special values map to `nan`/`inf`/`-inf`. Magnitudes at or above `1e16`,
/// or below `1e-4`, use exponent notation with an explicit sign and no
/// leading zeros in the exponent; everything else is plain decimal with
/// `.0` appended to integral values so the text re-parses as a float.
///
/// # Examples
///
/// ```rust
/// use toml_emit::fmt::format_float;
///
/// assert_eq!(format_float(1.0), "1.0");
/// assert_eq!(format_float(1e16), "1e+16");
/// assert_eq!(format_float(1e-5), "1e-5");
/// ```
#[must_use]
pub fn format_float(v: f64) -> String {
    if v.is_nan() {
        return "nan".to_string();
    }
    if v.is_infinite() {
        return if v.is_sign_positive() { "inf" } else { "-inf" }.to_string();
    }
    let abs = v.abs();
    let mut s = if abs != 0.0 && (abs >= 1e16 || abs < 1e-4) {
        let mut exp = format!("{:e}", v);
        // `{:e}` leaves positive exponents unsigned; TOML texts
        // conventionally carry the sign.
        if let Some(pos) = exp.find('e') {
            if exp.as_bytes().get(pos + 1).is_some_and(|b| b.is_ascii_digit()) {
                exp.insert(pos + 1, '+');
            }
        }
        exp
    } else {
        format!("{}", v)
    };
    if !s.contains('.') && !s.contains('e') {
        s.push_str(".0");
    }
    normalize_exponent(&s)
}

/// Strips leading zeros from the exponent of a float's textual form
/// (`1e+05` becomes `1e+5`).
#[must_use]
pub fn normalize_exponent(s: &str) -> String {
    let Some(pos) = s.find(['e', 'E']) else {
        return s.to_string();
    };
    let (mantissa, exp) = s.split_at(pos + 1);
    let (sign, digits) = if let Some(rest) = exp.strip_prefix('+') {
        ("+", rest)
    } else if let Some(rest) = exp.strip_prefix('-') {
        ("-", rest)
    } else {
        ("", exp)
    };
    let trimmed = digits.trim_start_matches('0');
    let digits = if trimmed.is_empty() { "0" } else { trimmed };
    format!("{mantissa}{sign}{digits}")
}

/// Formats an offset date-time as RFC 3339, with a literal `Z` suffix when
/// the zone offset is exactly UTC.
#[must_use]
pub fn format_datetime(dt: &DateTime<FixedOffset>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

/// Formats a calendar date as `YYYY-MM-DD`.
#[must_use]
pub fn format_date(d: &NaiveDate) -> String {
    d.to_string()
}

/// Formats a local time as ISO 8601, never with a zone offset.
#[must_use]
pub fn format_time(t: &NaiveTime) -> String {
    t.to_string()
}

/// Returns `true` if `key` may be emitted unquoted.
#[must_use]
pub fn is_bare_key(key: &str) -> bool {
    !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

/// Formats a table or array-of-tables key, quoting it unless it is bare.
///
/// # Examples
///
/// ```rust
/// use toml_emit::fmt::format_key;
///
/// assert_eq!(format_key("server-1"), "server-1");
/// assert_eq!(format_key("a b"), "\"a b\"");
/// assert_eq!(format_key("c.d"), "\"c.d\"");
/// ```
#[must_use]
pub fn format_key(key: &str) -> String {
    if is_bare_key(key) {
        key.to_string()
    } else {
        format_string(key)
    }
}
