//! JSON mapping of dynamic values.
//!
//! Structs are objects keyed by member wire name; decoding starts from the
//! struct's defaults and fills the keys that are present. Enums are numbers.
//! Maps whose key is a string, an integer or an enum become objects (integer
//! keys as decimal strings); other maps become arrays of `[key, value]`
//! pairs.

use serde_json::{Map as JsonMap, Number, Value as Json};

use super::dynamic::{integer_value, mismatch, TarsCodec};
use crate::codec::{DecodeError, EncodeError};
use crate::types::{NamedCategory, Primitive, VarType};
use crate::value::{StructValue, Value};

/// Whether maps keyed by `key` are written as JSON objects.
pub fn is_object_key(key: &VarType) -> bool {
    match key {
        VarType::Primitive { primitive } => {
            primitive.is_integer() || *primitive == Primitive::String
        }
        VarType::Named { category, .. } => *category == NamedCategory::Enum,
        _ => false,
    }
}

fn shape_error(ty: &VarType, json: &Json) -> DecodeError {
    DecodeError::Json(format!("expected {ty}, found {json}"))
}

impl TarsCodec<'_> {
    /// Convert `value` of type `ty` to JSON.
    pub fn to_json(&self, ty: &VarType, value: &Value) -> Result<Json, EncodeError> {
        match (ty, value) {
            (_, Value::Bool(b)) => Ok(Json::Bool(*b)),
            (_, Value::String(s)) => Ok(Json::String(s.clone())),
            (_, Value::F32(v)) => float_json(f64::from(*v)),
            (_, Value::F64(v)) => float_json(*v),
            (VarType::Vector { elem } | VarType::Array { elem, .. }, Value::List(items)) => items
                .iter()
                .map(|item| self.to_json(elem, item))
                .collect::<Result<Vec<_>, _>>()
                .map(Json::Array),
            (VarType::Map { key, value: val_ty }, Value::Map(pairs)) => {
                if is_object_key(key) {
                    let mut object = JsonMap::new();
                    for (k, v) in pairs {
                        let name = match k {
                            Value::String(s) => s.clone(),
                            other => other
                                .as_integer()
                                .map(|n| n.to_string())
                                .ok_or_else(|| mismatch(key, other))?,
                        };
                        object.insert(name, self.to_json(val_ty, v)?);
                    }
                    Ok(Json::Object(object))
                } else {
                    pairs
                        .iter()
                        .map(|(k, v)| {
                            Ok(Json::Array(vec![
                                self.to_json(key, k)?,
                                self.to_json(val_ty, v)?,
                            ]))
                        })
                        .collect::<Result<Vec<_>, EncodeError>>()
                        .map(Json::Array)
                }
            }
            (VarType::Named { name, .. }, Value::Struct(sv)) => self.struct_to_json(name, sv),
            (_, other) => match other.as_integer() {
                Some(n) => integer_json(n).ok_or_else(|| mismatch(ty, value)),
                None => Err(mismatch(ty, value)),
            },
        }
    }

    fn struct_to_json(&self, name: &str, value: &StructValue) -> Result<Json, EncodeError> {
        let codec = self
            .struct_codec(name)
            .ok_or_else(|| EncodeError::UnknownType(name.to_string()))?;
        let mut object = JsonMap::new();
        for member in &codec.info().members {
            let json = match value.get(&member.wire_name) {
                Some(v) => self.to_json(&member.ty, v)?,
                None => {
                    let defaults = codec.reset_to_defaults();
                    let v = defaults
                        .get(&member.wire_name)
                        .cloned()
                        .unwrap_or_else(|| self.default_value(&member.ty));
                    self.to_json(&member.ty, &v)?
                }
            };
            object.insert(member.wire_name.clone(), json);
        }
        Ok(Json::Object(object))
    }

    /// Convert JSON to a value of type `ty`. A missing or `null` input
    /// yields the type's default.
    pub fn from_json(&self, ty: &VarType, json: Option<&Json>) -> Result<Value, DecodeError> {
        let json = match json {
            None | Some(Json::Null) => return Ok(self.default_value(ty)),
            Some(json) => json,
        };
        match ty {
            VarType::Primitive { primitive } => primitive_from_json(*primitive, ty, json),
            VarType::Vector { elem } => {
                let items = json.as_array().ok_or_else(|| shape_error(ty, json))?;
                items
                    .iter()
                    .map(|item| self.from_json(elem, Some(item)))
                    .collect::<Result<Vec<_>, _>>()
                    .map(Value::List)
            }
            VarType::Array { elem, len } => {
                let items = json.as_array().ok_or_else(|| shape_error(ty, json))?;
                if items.len() != *len {
                    return Err(DecodeError::ArrayLength {
                        expected: *len,
                        actual: items.len(),
                    });
                }
                items
                    .iter()
                    .map(|item| self.from_json(elem, Some(item)))
                    .collect::<Result<Vec<_>, _>>()
                    .map(Value::List)
            }
            VarType::Map { key, value } => {
                let mut pairs = Vec::new();
                if let (true, Json::Object(object)) = (is_object_key(key), json) {
                    for (k, v) in object {
                        pairs.push((map_key_from_str(key, k)?, self.from_json(value, Some(v))?));
                    }
                } else {
                    let entries = json.as_array().ok_or_else(|| shape_error(ty, json))?;
                    for entry in entries {
                        let pair = entry.as_array().filter(|p| p.len() == 2);
                        let (Some(k), Some(v)) = (
                            pair.and_then(|p| p.first()),
                            pair.and_then(|p| p.get(1)),
                        ) else {
                            return Err(shape_error(ty, entry));
                        };
                        pairs.push((self.from_json(key, Some(k))?, self.from_json(value, Some(v))?));
                    }
                }
                Ok(Value::Map(pairs))
            }
            VarType::Named {
                category: NamedCategory::Enum,
                ..
            } => json
                .as_i64()
                .and_then(|n| i32::try_from(n).ok())
                .map(Value::Enum)
                .ok_or_else(|| shape_error(ty, json)),
            VarType::Named { name, .. } => {
                let codec = self
                    .struct_codec(name)
                    .ok_or_else(|| DecodeError::InvalidValue(format!("unknown struct '{name}'")))?;
                let object = json.as_object().ok_or_else(|| shape_error(ty, json))?;
                let mut value = codec.reset_to_defaults();
                for member in &codec.info().members {
                    if let Some(field) = object.get(&member.wire_name) {
                        value.set(&member.wire_name, self.from_json(&member.ty, Some(field))?);
                    }
                }
                Ok(Value::Struct(value))
            }
        }
    }
}

fn float_json(v: f64) -> Result<Json, EncodeError> {
    Number::from_f64(v)
        .map(Json::Number)
        .ok_or_else(|| EncodeError::Json(format!("{v} has no JSON representation")))
}

fn integer_json(n: i128) -> Option<Json> {
    if let Ok(v) = i64::try_from(n) {
        return Some(Json::Number(v.into()));
    }
    u64::try_from(n).ok().map(|v| Json::Number(v.into()))
}

fn json_integer(json: &Json) -> Option<i128> {
    json.as_i64()
        .map(i128::from)
        .or_else(|| json.as_u64().map(i128::from))
}

fn primitive_from_json(p: Primitive, ty: &VarType, json: &Json) -> Result<Value, DecodeError> {
    let value = match p {
        Primitive::Bool => json.as_bool().map(Value::Bool),
        Primitive::String => json.as_str().map(|s| Value::String(s.to_string())),
        Primitive::Float => json.as_f64().map(|v| Value::F32(v as f32)),
        Primitive::Double => json.as_f64().map(Value::F64),
        _ => json_integer(json).and_then(|n| integer_value(p, n)),
    };
    value.ok_or_else(|| shape_error(ty, json))
}

fn map_key_from_str(key: &VarType, text: &str) -> Result<Value, DecodeError> {
    let bad = || DecodeError::Json(format!("invalid {key} map key '{text}'"));
    match key {
        VarType::Primitive {
            primitive: Primitive::String,
        } => Ok(Value::String(text.to_string())),
        VarType::Primitive { primitive } => text
            .parse::<i128>()
            .ok()
            .and_then(|n| integer_value(*primitive, n))
            .ok_or_else(bad),
        VarType::Named { .. } => text.parse::<i32>().map(Value::Enum).map_err(|_| bad()),
        _ => Err(bad()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::compile_str;
    use serde_json::json;

    const IDL: &str = r#"
module Demo {
    struct Point { 0 require int x; 1 optional int y = 7; };
    struct Shape {
        0 require string name;
        1 optional map<int, string> labels;
        2 optional map<Point, int> weights;
        3 optional vector<unsigned byte> data;
    };
};
"#;

    #[test]
    fn test_missing_keys_take_defaults() {
        let compilation = compile_str("demo.tars", IDL).unwrap();
        let codec = TarsCodec::new(&compilation.schema);
        let ty = VarType::named("Demo::Point", NamedCategory::Struct);

        let value = codec.from_json(&ty, Some(&json!({ "x": 3 }))).unwrap();
        let point = value.as_struct().unwrap();
        assert_eq!(point.get("x"), Some(&Value::I32(3)));
        assert_eq!(point.get("y"), Some(&Value::I32(7)));

        // Even a required member falls back to its default in JSON.
        let empty = codec.from_json(&ty, Some(&json!({}))).unwrap();
        assert_eq!(empty.as_struct().unwrap().get("x"), Some(&Value::I32(0)));
    }

    #[test]
    fn test_map_shapes() {
        let compilation = compile_str("demo.tars", IDL).unwrap();
        let codec = TarsCodec::new(&compilation.schema);
        let ty = VarType::named("Demo::Shape", NamedCategory::Struct);
        let input = json!({
            "name": "s",
            "labels": { "1": "one", "-2": "minus two" },
            "weights": [[{ "x": 1, "y": 2 }, 10]],
            "data": [1, 255]
        });

        let value = codec.from_json(&ty, Some(&input)).unwrap();
        let out = codec.to_json(&ty, &value).unwrap();
        assert_eq!(out, input);
    }

    #[test]
    fn test_wrong_shape() {
        let compilation = compile_str("demo.tars", IDL).unwrap();
        let codec = TarsCodec::new(&compilation.schema);
        let ty = VarType::primitive(Primitive::Int8);
        assert!(codec.from_json(&ty, Some(&json!(300))).is_err());
        assert!(codec.from_json(&ty, Some(&json!("1"))).is_err());
    }
}
