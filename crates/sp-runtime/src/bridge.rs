use std::collections::BTreeMap;

use rhai::{Array, Dynamic, ImmutableString, Map, FLOAT, INT};
use sp_core::{ParticipantError, Value};

pub fn value_to_dynamic(value: &Value) -> Dynamic {
    match value {
        Value::Unit => Dynamic::UNIT,
        Value::Bool(value) => Dynamic::from_bool(*value),
        Value::Int(value) => Dynamic::from_int(*value as INT),
        Value::Number(value) => Dynamic::from_float(*value as FLOAT),
        Value::String(value) => Dynamic::from(value.clone()),
        Value::Array(values) => {
            Dynamic::from_array(values.iter().map(value_to_dynamic).collect::<Array>())
        }
        Value::Map(values) => {
            let mut map = Map::new();
            for (key, value) in values {
                map.insert(key.as_str().into(), value_to_dynamic(value));
            }
            Dynamic::from_map(map)
        }
    }
}

pub fn dynamic_to_value(value: Dynamic) -> Result<Value, ParticipantError> {
    if value.is_unit() {
        return Ok(Value::Unit);
    }
    if value.is::<bool>() {
        return Ok(Value::Bool(value.cast::<bool>()));
    }
    if value.is::<INT>() {
        return Ok(Value::Int(value.cast::<INT>()));
    }
    if value.is::<FLOAT>() {
        return Ok(Value::Number(value.cast::<FLOAT>()));
    }
    if value.is::<ImmutableString>() {
        return Ok(Value::String(value.cast::<ImmutableString>().to_string()));
    }
    if value.is::<char>() {
        return Ok(Value::String(value.cast::<char>().to_string()));
    }
    if value.is::<Array>() {
        let array = value.cast::<Array>();
        let mut out = Vec::with_capacity(array.len());
        for item in array {
            out.push(dynamic_to_value(item)?);
        }
        return Ok(Value::Array(out));
    }
    if value.is::<Map>() {
        let map = value.cast::<Map>();
        let mut out = BTreeMap::new();
        for (key, value) in map {
            out.insert(key.to_string(), dynamic_to_value(value)?);
        }
        return Ok(Value::Map(out));
    }

    Err(ParticipantError::execution(
        "EXEC_VALUE_UNSUPPORTED",
        format!(
            "Rhai value of type '{}' cannot be stored in a transaction context.",
            value.type_name()
        ),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_values_survive_the_bridge() {
        let value = Value::Map(BTreeMap::from([
            ("amount".to_string(), Value::Int(1200)),
            ("rate".to_string(), Value::Number(0.25)),
            ("approved".to_string(), Value::Bool(true)),
            ("none".to_string(), Value::Unit),
            (
                "tags".to_string(),
                Value::Array(vec![Value::from("a"), Value::from("b")]),
            ),
        ]));
        let back = dynamic_to_value(value_to_dynamic(&value)).expect("bridge back");
        assert_eq!(back, value);
    }

    #[test]
    fn chars_become_strings() {
        assert_eq!(
            dynamic_to_value(Dynamic::from('x')).expect("char converts"),
            Value::from("x")
        );
    }

    #[test]
    fn custom_types_are_rejected() {
        #[derive(Clone)]
        struct Opaque;
        let error = dynamic_to_value(Dynamic::from(Opaque)).expect_err("opaque value fails");
        assert_eq!(error.code, "EXEC_VALUE_UNSUPPORTED");
    }
}
