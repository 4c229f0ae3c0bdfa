//! JSON form of field values, shared by generated code and the JSON payload.
//!
//! The mapping matches the schema-driven one in `codegen::json`: maps keyed
//! by a string, an integer or an enum are objects, every other map is an
//! array of `[key, value]` pairs, and `null` reads as the type's default at
//! any depth. Generated structs route each member through this module with
//! `#[serde(with = "tars_idl::rpc::json_field")]`.

use std::collections::BTreeMap;

use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map as JsonMap, Number};

pub use serde_json::{Error as JsonError, Value as Json};

/// A value with a JSON form. `from_json` never sees `null`; callers go
/// through [`JsonField::from_json_or_default`].
pub trait JsonField: Default + Sized {
    /// Whether maps keyed by this type are JSON objects.
    const OBJECT_KEY: bool = false;

    fn to_json(&self) -> Result<Json, JsonError>;

    fn from_json(json: Json) -> Result<Self, JsonError>;

    fn from_json_or_default(json: Json) -> Result<Self, JsonError> {
        match json {
            Json::Null => Ok(Self::default()),
            json => Self::from_json(json),
        }
    }

    /// Object key text for this value.
    fn to_key(&self) -> Result<String, JsonError> {
        match self.to_json()? {
            Json::String(s) => Ok(s),
            Json::Number(n) => Ok(n.to_string()),
            other => Err(invalid(format!("{other} is not a map key"))),
        }
    }

    /// Parse object key text. Integer and enum keys arrive as decimal
    /// strings.
    fn from_key(text: &str) -> Result<Self, JsonError> {
        Self::from_json(Json::String(text.to_string())).or_else(|e| {
            match serde_json::from_str::<Number>(text) {
                Ok(n) => Self::from_json(Json::Number(n)),
                Err(_) => Err(e),
            }
        })
    }
}

fn invalid(message: String) -> JsonError {
    <JsonError as serde::de::Error>::custom(message)
}

/// `to_json` for types that derive `Serialize`.
pub fn to_json_serde<T: Serialize>(value: &T) -> Result<Json, JsonError> {
    serde_json::to_value(value)
}

/// `from_json` for types that derive `Deserialize`.
pub fn from_json_serde<T: DeserializeOwned>(json: Json) -> Result<T, JsonError> {
    serde_json::from_value(json)
}

/// `serialize_with` half of the member attribute.
pub fn serialize<T: JsonField, S: Serializer>(value: &T, serializer: S) -> Result<S::Ok, S::Error> {
    value
        .to_json()
        .map_err(<S::Error as serde::ser::Error>::custom)?
        .serialize(serializer)
}

/// `deserialize_with` half of the member attribute.
pub fn deserialize<'de, T: JsonField, D: Deserializer<'de>>(deserializer: D) -> Result<T, D::Error> {
    let json = Json::deserialize(deserializer)?;
    T::from_json_or_default(json).map_err(D::Error::custom)
}

macro_rules! impl_serde_json_field {
    ($object_key:literal => $($ty:ty),*) => {
        $(
            impl JsonField for $ty {
                const OBJECT_KEY: bool = $object_key;

                fn to_json(&self) -> Result<Json, JsonError> {
                    to_json_serde(self)
                }

                fn from_json(json: Json) -> Result<Self, JsonError> {
                    from_json_serde(json)
                }
            }
        )*
    };
}

impl_serde_json_field!(true => i8, u8, i16, u16, i32, u32, i64, u64, String);
impl_serde_json_field!(false => bool);

macro_rules! impl_float_json_field {
    ($($ty:ty),*) => {
        $(
            impl JsonField for $ty {
                fn to_json(&self) -> Result<Json, JsonError> {
                    Number::from_f64(f64::from(*self))
                        .map(Json::Number)
                        .ok_or_else(|| invalid(format!("{self} has no JSON representation")))
                }

                fn from_json(json: Json) -> Result<Self, JsonError> {
                    from_json_serde(json)
                }
            }
        )*
    };
}

impl_float_json_field!(f32, f64);

fn expect_array(json: Json) -> Result<Vec<Json>, JsonError> {
    match json {
        Json::Array(items) => Ok(items),
        other => Err(invalid(format!("expected an array, found {other}"))),
    }
}

impl<T: JsonField> JsonField for Vec<T> {
    fn to_json(&self) -> Result<Json, JsonError> {
        self.iter()
            .map(JsonField::to_json)
            .collect::<Result<Vec<_>, _>>()
            .map(Json::Array)
    }

    fn from_json(json: Json) -> Result<Self, JsonError> {
        expect_array(json)?
            .into_iter()
            .map(T::from_json_or_default)
            .collect()
    }
}

impl<T: JsonField, const N: usize> JsonField for [T; N]
where
    [T; N]: Default,
{
    fn to_json(&self) -> Result<Json, JsonError> {
        self.iter()
            .map(JsonField::to_json)
            .collect::<Result<Vec<_>, _>>()
            .map(Json::Array)
    }

    fn from_json(json: Json) -> Result<Self, JsonError> {
        let items = expect_array(json)?
            .into_iter()
            .map(T::from_json_or_default)
            .collect::<Result<Vec<T>, _>>()?;
        let actual = items.len();
        items.try_into().map_err(|_| {
            invalid(format!("expected {N} array elements, found {actual}"))
        })
    }
}

impl<K, V> JsonField for BTreeMap<K, V>
where
    K: JsonField + Ord,
    V: JsonField,
{
    fn to_json(&self) -> Result<Json, JsonError> {
        if K::OBJECT_KEY {
            let mut object = JsonMap::new();
            for (k, v) in self {
                object.insert(k.to_key()?, v.to_json()?);
            }
            return Ok(Json::Object(object));
        }
        self.iter()
            .map(|(k, v)| Ok(Json::Array(vec![k.to_json()?, v.to_json()?])))
            .collect::<Result<Vec<_>, JsonError>>()
            .map(Json::Array)
    }

    /// Object-keyed maps also accept the pair form.
    fn from_json(json: Json) -> Result<Self, JsonError> {
        if let (true, Json::Object(object)) = (K::OBJECT_KEY, &json) {
            return object
                .iter()
                .map(|(k, v)| Ok((K::from_key(k)?, V::from_json_or_default(v.clone())?)))
                .collect();
        }
        let mut map = BTreeMap::new();
        for entry in expect_array(json)? {
            let mut pair = match entry {
                Json::Array(pair) if pair.len() == 2 => pair.into_iter(),
                other => {
                    return Err(invalid(format!(
                        "expected a [key, value] pair, found {other}"
                    )));
                }
            };
            let k = pair.next().unwrap_or(Json::Null);
            let v = pair.next().unwrap_or(Json::Null);
            map.insert(K::from_json_or_default(k)?, V::from_json_or_default(v)?);
        }
        Ok(map)
    }
}
