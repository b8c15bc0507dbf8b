//! Conversions from configuration values to environment variable text.

use serde_json::Value;

/// Plain string form of a value.
///
/// Scalars render as text, floats in plain decimal without exponent or a
/// trailing `.0`; `null`, arrays and objects have no plain form and
/// render as the empty string.
pub fn string_form(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => match n.as_f64() {
            Some(f) if n.is_f64() => f.to_string(),
            _ => n.to_string(),
        },
        Value::Null | Value::Array(_) | Value::Object(_) => String::new(),
    }
}

/// Text exported for a value, or `None` when the key should not be exported.
///
/// Falls back to JSON when the plain form is empty but the value is not null,
/// so an empty list exports as `[]` and an empty string as `""`.
pub fn export_form(value: &Value) -> Result<Option<String>, serde_json::Error> {
    let plain = string_form(value);
    if !plain.is_empty() {
        return Ok(Some(plain));
    }

    if value.is_null() {
        return Ok(None);
    }

    serde_json::to_string(value).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_string_form_scalars() {
        assert_eq!(string_form(&json!("hello world")), "hello world");
        assert_eq!(string_form(&json!(true)), "true");
        assert_eq!(string_form(&json!(42)), "42");
        assert_eq!(string_form(&json!(3.8)), "3.8");
    }

    #[test]
    fn test_string_form_floats_use_plain_decimal() {
        assert_eq!(string_form(&json!(5.0)), "5");
        assert_eq!(string_form(&json!(1e21)), "1000000000000000000000");
        assert_eq!(string_form(&json!(-0.25)), "-0.25");
        assert_eq!(string_form(&json!(1e-7)), "0.0000001");
        assert_eq!(string_form(&json!(u64::MAX)), "18446744073709551615");
    }

    #[test]
    fn test_string_form_composites_are_empty() {
        assert_eq!(string_form(&Value::Null), "");
        assert_eq!(string_form(&json!([1, 2])), "");
        assert_eq!(string_form(&json!({"a": 1})), "");
    }

    #[test]
    fn test_export_form_prefers_plain_text() {
        assert_eq!(
            export_form(&json!("golang:1.15-buster")).unwrap(),
            Some("golang:1.15-buster".to_string())
        );
    }

    #[test]
    fn test_export_form_falls_back_to_json() {
        assert_eq!(export_form(&json!([])).unwrap(), Some("[]".to_string()));
        assert_eq!(
            export_form(&json!(["a", "b"])).unwrap(),
            Some(r#"["a","b"]"#.to_string())
        );
        assert_eq!(export_form(&json!({})).unwrap(), Some("{}".to_string()));
        assert_eq!(export_form(&json!("")).unwrap(), Some(r#""""#.to_string()));
    }

    #[test]
    fn test_export_form_skips_null() {
        assert_eq!(export_form(&Value::Null).unwrap(), None);
    }
}
