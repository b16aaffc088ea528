use std::fmt;

use serde_json::{Number, Value};

/// Shape of a value as far as row encoding is concerned.
///
/// Only [`RecordKind::Mapping`] and [`RecordKind::Sequence`] can be encoded
/// as a row; the other kinds are rejected with the observed kind attached to
/// the error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Mapping,
    Sequence,
    Scalar(ScalarKind),
    Null,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarKind {
    Boolean,
    Number,
    String,
}

impl RecordKind {
    /// Classifies a structured value.
    ///
    /// # Examples
    ///
    /// ```
    /// use csv_builder_rs::encoder::value::RecordKind;
    /// use serde_json::json;
    ///
    /// assert_eq!(RecordKind::of(&json!({"a": 1})), RecordKind::Mapping);
    /// assert!(RecordKind::of(&json!([1, 2])).is_encodable());
    /// assert!(!RecordKind::of(&json!(42)).is_encodable());
    /// assert_eq!(RecordKind::of(&json!(null)).to_string(), "null");
    /// ```
    pub fn of(value: &Value) -> RecordKind {
        match value {
            Value::Object(_) => RecordKind::Mapping,
            Value::Array(_) => RecordKind::Sequence,
            Value::Bool(_) => RecordKind::Scalar(ScalarKind::Boolean),
            Value::Number(_) => RecordKind::Scalar(ScalarKind::Number),
            Value::String(_) => RecordKind::Scalar(ScalarKind::String),
            Value::Null => RecordKind::Null,
        }
    }

    pub fn is_encodable(&self) -> bool {
        matches!(self, RecordKind::Mapping | RecordKind::Sequence)
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RecordKind::Mapping => "object",
            RecordKind::Sequence => "array",
            RecordKind::Scalar(ScalarKind::Boolean) => "boolean",
            RecordKind::Scalar(ScalarKind::Number) => "number",
            RecordKind::Scalar(ScalarKind::String) => "string",
            RecordKind::Null => "null",
        };
        f.write_str(name)
    }
}

/// Renders a value as the unquoted text of a single field.
///
/// Null renders as the empty string, numbers use the locale-free
/// `serde_json` representation (whole floats without their `.0`), arrays
/// join their elements with `,` and objects fall back to compact JSON.
pub fn field_text(value: &Value) -> String {
    let mut out = String::new();
    push_field_text(&mut out, value);
    out
}

fn push_field_text(out: &mut String, value: &Value) {
    match value {
        Value::Null => {}
        Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Number(n) => push_number(out, n),
        Value::String(s) => out.push_str(s),
        Value::Array(items) => {
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                push_field_text(out, item);
            }
        }
        // Display on Value is compact JSON and cannot fail.
        Value::Object(_) => out.push_str(&value.to_string()),
    }
}

// Whole floats below 1e21 render without a fraction, so `7.0` and `1e2`
// come out as `7` and `100`.
fn push_number(out: &mut String, n: &Number) {
    match n.as_f64() {
        Some(f) if n.is_f64() && f.is_finite() && f.fract() == 0.0 && f.abs() < 1e21 => {
            out.push_str(&(f as i128).to_string())
        }
        _ => out.push_str(&n.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{RecordKind, ScalarKind, field_text};

    #[test]
    fn kinds_should_be_classified() {
        assert_eq!(RecordKind::of(&json!([])), RecordKind::Sequence);
        assert_eq!(
            RecordKind::of(&json!("x")),
            RecordKind::Scalar(ScalarKind::String)
        );
        assert_eq!(
            RecordKind::of(&json!(true)),
            RecordKind::Scalar(ScalarKind::Boolean)
        );
        assert_eq!(RecordKind::of(&json!(null)), RecordKind::Null);
        assert!(!RecordKind::Null.is_encodable());
        assert_eq!(RecordKind::of(&json!(1.5)).to_string(), "number");
    }

    #[test]
    fn scalars_should_render_locale_free() {
        assert_eq!(field_text(&json!(null)), "");
        assert_eq!(field_text(&json!(true)), "true");
        assert_eq!(field_text(&json!(false)), "false");
        assert_eq!(field_text(&json!(0)), "0");
        assert_eq!(field_text(&json!(1234567)), "1234567");
        assert_eq!(field_text(&json!(-1.5)), "-1.5");
        assert_eq!(field_text(&json!(7.0)), "7");
        assert_eq!(field_text(&json!(1e2)), "100");
        assert_eq!(field_text(&json!(-0.0)), "0");
        assert_eq!(field_text(&json!(-12.0)), "-12");
        assert_eq!(field_text(&json!(u64::MAX)), "18446744073709551615");
        assert_ne!(field_text(&json!(1e21)), "1000000000000000000000");
        assert_eq!(field_text(&json!("a \"b\"")), "a \"b\"");
    }

    #[test]
    fn containers_should_render_flat() {
        assert_eq!(field_text(&json!(["foo", 1, null, true])), "foo,1,,true");
        assert_eq!(field_text(&json!([["a", "b"], "c"])), "a,b,c");
        assert_eq!(field_text(&json!({"a": 1})), r#"{"a":1}"#);
    }
}
