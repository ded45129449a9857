//! `serde` interface of the engine's value and error types
//!
//! The serializer proper lives with the caller; these impls define the wire
//! shapes. Response objects serialize in insertion (source) order, while
//! input objects serialize with lexicographic key order so that the wire
//! form of a coerced input value is deterministic.

use std::fmt;

use indexmap::IndexMap;
use serde::{
    de,
    ser::{self, SerializeMap},
    Deserialize, Serialize,
};

use crate::{
    ast::InputValue,
    executor::{ExecutionError, PathSegment},
    span::SourcePosition,
    value::{Object, ScalarValue, Value},
    GraphQLError,
};

#[derive(Serialize)]
struct SerializeHelper {
    message: &'static str,
}

impl<T> ser::Serialize for ExecutionError<T>
where
    T: ScalarValue,
{
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: ser::Serializer,
    {
        let mut map = serializer.serialize_map(Some(4))?;

        map.serialize_key("message")?;
        map.serialize_value(self.error().message())?;

        // The origin position doubles as "no position information": errors
        // from programmatically built documents carry no locations.
        if *self.location() != SourcePosition::new_origin() {
            let locations = vec![self.location()];
            map.serialize_key("locations")?;
            map.serialize_value(&locations)?;
        }

        map.serialize_key("path")?;
        map.serialize_value(self.path())?;

        if !self.error().extensions().is_null() {
            map.serialize_key("extensions")?;
            map.serialize_value(self.error().extensions())?;
        }

        map.end()
    }
}

impl ser::Serialize for GraphQLError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: ser::Serializer,
    {
        match self {
            GraphQLError::NoOperationProvided => [SerializeHelper {
                message: "Must provide an operation",
            }]
            .serialize(serializer),
            GraphQLError::MultipleOperationsProvided => [SerializeHelper {
                message: "Must provide operation name \
                          if query contains multiple operations",
            }]
            .serialize(serializer),
            GraphQLError::UnknownOperationName => [SerializeHelper {
                message: "Unknown operation",
            }]
            .serialize(serializer),
            GraphQLError::NoMutationType => [SerializeHelper {
                message: "Schema is not configured for mutations",
            }]
            .serialize(serializer),
            GraphQLError::CoercionError(err) => {
                let mut map = IndexMap::with_capacity(1);
                map.insert("message", err.to_string());
                [map].serialize(serializer)
            }
        }
    }
}

impl ser::Serialize for PathSegment {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: ser::Serializer,
    {
        match self {
            PathSegment::Field(name) => serializer.serialize_str(name),
            PathSegment::Index(index) => serializer.serialize_u64(*index as u64),
        }
    }
}

impl ser::Serialize for SourcePosition {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: ser::Serializer,
    {
        let mut map = serializer.serialize_map(Some(2))?;

        let line = self.line() + 1;
        map.serialize_key("line")?;
        map.serialize_value(&line)?;

        let column = self.column() + 1;
        map.serialize_key("column")?;
        map.serialize_value(&column)?;

        map.end()
    }
}

impl<'de, S> Deserialize<'de> for InputValue<S>
where
    S: ScalarValue,
{
    fn deserialize<D>(deserializer: D) -> Result<InputValue<S>, D::Error>
    where
        D: de::Deserializer<'de>,
    {
        struct InputValueVisitor<S>(std::marker::PhantomData<S>);

        impl<'de, S> de::Visitor<'de> for InputValueVisitor<S>
        where
            S: ScalarValue,
        {
            type Value = InputValue<S>;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a valid input value")
            }

            fn visit_bool<E: de::Error>(self, value: bool) -> Result<InputValue<S>, E> {
                Ok(InputValue::scalar(value))
            }

            fn visit_i64<E: de::Error>(self, value: i64) -> Result<InputValue<S>, E> {
                if value >= i64::from(i32::MIN) && value <= i64::from(i32::MAX) {
                    Ok(InputValue::scalar(value as i32))
                } else {
                    // Numbers without a fractional part that exceed the
                    // `Int` range travel as floats.
                    Ok(InputValue::scalar(value as f64))
                }
            }

            fn visit_u64<E: de::Error>(self, value: u64) -> Result<InputValue<S>, E> {
                if value <= i32::MAX as u64 {
                    Ok(InputValue::scalar(value as i32))
                } else {
                    Ok(InputValue::scalar(value as f64))
                }
            }

            fn visit_f64<E: de::Error>(self, value: f64) -> Result<InputValue<S>, E> {
                Ok(InputValue::scalar(value))
            }

            fn visit_str<E: de::Error>(self, value: &str) -> Result<InputValue<S>, E> {
                self.visit_string(value.into())
            }

            fn visit_string<E: de::Error>(self, value: String) -> Result<InputValue<S>, E> {
                Ok(InputValue::scalar(value))
            }

            fn visit_none<E: de::Error>(self) -> Result<InputValue<S>, E> {
                Ok(InputValue::null())
            }

            fn visit_unit<E: de::Error>(self) -> Result<InputValue<S>, E> {
                Ok(InputValue::null())
            }

            fn visit_seq<V>(self, mut visitor: V) -> Result<InputValue<S>, V::Error>
            where
                V: de::SeqAccess<'de>,
            {
                let mut values = Vec::new();

                while let Some(el) = visitor.next_element()? {
                    values.push(el);
                }

                Ok(InputValue::list(values))
            }

            fn visit_map<V>(self, mut visitor: V) -> Result<InputValue<S>, V::Error>
            where
                V: de::MapAccess<'de>,
            {
                let mut object = IndexMap::<String, InputValue<S>>::with_capacity(
                    visitor.size_hint().unwrap_or(0),
                );

                while let Some((key, value)) = visitor.next_entry()? {
                    object.insert(key, value);
                }

                Ok(InputValue::object(object))
            }
        }

        deserializer.deserialize_any(InputValueVisitor(std::marker::PhantomData))
    }
}

impl<T> ser::Serialize for InputValue<T>
where
    T: ScalarValue,
{
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: ser::Serializer,
    {
        match self {
            InputValue::Null | InputValue::Variable(_) => serializer.serialize_unit(),
            InputValue::Scalar(s) => s.serialize(serializer),
            InputValue::Enum(v) => serializer.serialize_str(v),
            InputValue::List(v) => v
                .iter()
                .map(|x| &x.item)
                .collect::<Vec<_>>()
                .serialize(serializer),
            InputValue::Object(v) => {
                let mut fields = v
                    .iter()
                    .map(|(k, v)| (k.item.as_str(), &v.item))
                    .collect::<Vec<_>>();
                fields.sort_by_key(|(k, _)| *k);

                let mut map = serializer.serialize_map(Some(fields.len()))?;
                for (k, v) in fields {
                    map.serialize_key(k)?;
                    map.serialize_value(v)?;
                }
                map.end()
            }
        }
    }
}

impl<T> ser::Serialize for Object<T>
where
    T: ser::Serialize,
{
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: ser::Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.field_count()))?;

        for (f, v) in self.iter() {
            map.serialize_key(f)?;
            map.serialize_value(v)?;
        }

        map.end()
    }
}

impl<T> ser::Serialize for Value<T>
where
    T: ser::Serialize,
{
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: ser::Serializer,
    {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Scalar(s) => s.serialize(serializer),
            Value::List(v) => v.serialize(serializer),
            Value::Object(v) => v.serialize(serializer),
        }
    }
}
