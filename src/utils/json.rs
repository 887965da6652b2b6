use serde_json::Value;

/// Distinguishes a key missing from a patch body from a key present with
/// an explicit `null`.
pub enum NullableValue {
    Omitted,
    Null,
    String(String),
}

pub fn classify_nullable(optional_value: Option<&Value>) -> Result<NullableValue, String> {
    match optional_value {
        None => Ok(NullableValue::Omitted),
        Some(Value::Null) => Ok(NullableValue::Null),
        Some(Value::String(s)) => Ok(NullableValue::String(s.to_owned())),
        Some(other) => Err(format!("expected string or null, got {other}")),
    }
}

pub enum ListValue {
    Omitted,
    Null,
    Items(Vec<String>),
}

pub fn classify_string_list(optional_value: Option<&Value>) -> Result<ListValue, String> {
    match optional_value {
        None => Ok(ListValue::Omitted),
        Some(Value::Null) => Ok(ListValue::Null),
        Some(Value::Array(values)) => {
            let mut items = Vec::with_capacity(values.len());
            for value in values {
                match value {
                    Value::String(s) => items.push(s.to_owned()),
                    other => return Err(format!("expected string element, got {other}")),
                }
            }
            Ok(ListValue::Items(items))
        }
        Some(other) => Err(format!("expected array or null, got {other}")),
    }
}
