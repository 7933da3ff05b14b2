//! # Configuration Values
//!
//! Configuration dictionaries map property names to JSON values. A
//! `Value::String` is a *textual* entry (as written in a descriptor or a
//! configuration file); every other value is *already typed* and is injected
//! as-is.

use crate::error::{LifecycleError, Result};
use serde_json::{Number, Value};
use std::collections::BTreeMap;

/// Keyed configuration or service property set
pub type Dictionary = BTreeMap<String, Value>;

/// Whether a configuration entry is textual (needs conversion) or already typed
pub fn is_textual(value: &Value) -> bool {
    value.is_string()
}

/// Name of the type carried by a value, used when no field type is known
pub fn infer_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_f64() => "double",
        Value::Number(_) => "long",
        Value::String(_) => "java.lang.String",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Convert textual `raw` into a value of `type_name`.
///
/// Array types are written `T[]` and take the literal form `{a, b, c}`.
/// Unknown type names keep the text unchanged.
pub fn convert(type_name: &str, raw: &str) -> Result<Value> {
    let type_name = type_name.trim();

    if let Some(element_type) = type_name.strip_suffix("[]") {
        let inner = raw
            .trim()
            .strip_prefix('{')
            .and_then(|s| s.strip_suffix('}'))
            .ok_or_else(|| conversion_error(raw, type_name))?;
        if inner.trim().is_empty() {
            return Ok(Value::Array(Vec::new()));
        }
        let items = inner
            .split(',')
            .map(|item| convert(element_type, item.trim()))
            .collect::<Result<Vec<_>>>()?;
        return Ok(Value::Array(items));
    }

    let text = raw.trim();
    match type_name {
        "int" | "long" | "short" | "byte" | "i8" | "i16" | "i32" | "i64" | "isize"
        | "java.lang.Integer" | "java.lang.Long" | "java.lang.Short" | "java.lang.Byte" => text
            .parse::<i64>()
            .map(|n| Value::Number(n.into()))
            .map_err(|_| conversion_error(raw, type_name)),
        "u8" | "u16" | "u32" | "u64" | "usize" => text
            .parse::<u64>()
            .map(|n| Value::Number(n.into()))
            .map_err(|_| conversion_error(raw, type_name)),
        "float" | "double" | "f32" | "f64" | "java.lang.Float" | "java.lang.Double" => text
            .parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(Value::Number)
            .ok_or_else(|| conversion_error(raw, type_name)),
        "boolean" | "bool" | "java.lang.Boolean" => match text.to_ascii_lowercase().as_str() {
            "true" => Ok(Value::Bool(true)),
            "false" => Ok(Value::Bool(false)),
            _ => Err(conversion_error(raw, type_name)),
        },
        "char" | "java.lang.Character" => {
            let mut chars = text.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Ok(Value::String(c.to_string())),
                _ => Err(conversion_error(raw, type_name)),
            }
        }
        // Strings and unknown types keep the raw text
        _ => Ok(Value::String(raw.to_string())),
    }
}

/// Render a value the way it appears in a component description
pub fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Array(items) => {
            let rendered: Vec<String> = items.iter().map(render).collect();
            format!("{{{}}}", rendered.join(", "))
        }
        other => other.to_string(),
    }
}

fn conversion_error(raw: &str, type_name: &str) -> LifecycleError {
    LifecycleError::ConversionError {
        value: raw.to_string(),
        target_type: type_name.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_textual_detection() {
        assert!(is_textual(&json!("1")));
        assert!(!is_textual(&json!(1)));
        assert!(!is_textual(&json!({"rich": true})));
    }

    #[test]
    fn test_convert_scalars() {
        assert_eq!(convert("int", "42").unwrap(), json!(42));
        assert_eq!(convert("boolean", "TRUE").unwrap(), json!(true));
        assert_eq!(convert("double", "1.5").unwrap(), json!(1.5));
        assert_eq!(convert("java.lang.String", " padded ").unwrap(), json!(" padded "));
        assert_eq!(convert("char", "x").unwrap(), json!("x"));
    }

    #[test]
    fn test_convert_arrays() {
        assert_eq!(convert("int[]", "{1, 2, 3}").unwrap(), json!([1, 2, 3]));
        assert_eq!(convert("java.lang.String[]", "{}").unwrap(), json!([]));
        assert!(convert("int[]", "1, 2").is_err());
    }

    #[test]
    fn test_convert_rejects_malformed() {
        assert!(matches!(
            convert("int", "one"),
            Err(LifecycleError::ConversionError { .. })
        ));
        assert!(convert("boolean", "yes").is_err());
        assert!(convert("char", "xy").is_err());
    }

    #[test]
    fn test_unknown_type_keeps_text() {
        assert_eq!(convert("com.acme.Mode", "fast").unwrap(), json!("fast"));
    }

    #[test]
    fn test_render() {
        assert_eq!(render(&json!("celsius")), "celsius");
        assert_eq!(render(&json!(3)), "3");
        assert_eq!(render(&json!([1, 2])), "{1, 2}");
    }

    #[test]
    fn test_infer_type() {
        assert_eq!(infer_type(&json!("a")), "java.lang.String");
        assert_eq!(infer_type(&json!(true)), "boolean");
        assert_eq!(infer_type(&json!(7)), "long");
    }
}
