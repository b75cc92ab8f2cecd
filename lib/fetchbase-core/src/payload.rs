//! Per-call request payloads.

use serde_json::{Map, Value};

use crate::{Error, Form, Result};

/// The payload of a call.
///
/// The variant decides how the payload combines with the client's global
/// payload:
/// - [`Payload::Map`] is merged over it, per-call keys winning;
/// - [`Payload::Sequence`] replaces it entirely;
/// - [`Payload::Form`] is sent untouched.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// Key/value entries.
    Map(Map<String, Value>),
    /// An ordered sequence, sent as an opaque JSON array.
    Sequence(Vec<Value>),
    /// A ready-made multipart form.
    Form(Form),
}

impl Payload {
    /// Build a payload from any serializable value.
    ///
    /// Objects become [`Payload::Map`], arrays [`Payload::Sequence`] and
    /// `null` an empty map.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails or the value is a scalar.
    ///
    /// # Example
    ///
    /// ```
    /// use fetchbase_core::Payload;
    /// use serde_json::json;
    ///
    /// let payload = Payload::json(&json!({ "name": "Tom" })).expect("payload");
    /// assert!(matches!(payload, Payload::Map(_)));
    ///
    /// let payload = Payload::json(&vec![1, 2, 3]).expect("payload");
    /// assert!(matches!(payload, Payload::Sequence(_)));
    /// ```
    pub fn json<T: serde::Serialize + ?Sized>(value: &T) -> Result<Self> {
        match serde_json::to_value(value)? {
            Value::Object(map) => Ok(Self::Map(map)),
            Value::Array(items) => Ok(Self::Sequence(items)),
            Value::Null => Ok(Self::Map(Map::new())),
            other => Err(Error::invalid_request(format!(
                "payload must be an object or an array, got `{other}`"
            ))),
        }
    }
}

impl From<Map<String, Value>> for Payload {
    fn from(map: Map<String, Value>) -> Self {
        Self::Map(map)
    }
}

impl From<Vec<Value>> for Payload {
    fn from(items: Vec<Value>) -> Self {
        Self::Sequence(items)
    }
}

impl From<Form> for Payload {
    fn from(form: Form) -> Self {
        Self::Form(form)
    }
}

#[cfg(test)]
mod tests {
    use assert2::let_assert;
    use serde_json::json;

    use super::*;

    #[test]
    fn struct_becomes_map() {
        #[derive(serde::Serialize)]
        struct Vote {
            image_id: String,
            value: i8,
        }

        let vote = Vote {
            image_id: "abc".to_string(),
            value: 1,
        };
        let_assert!(Ok(Payload::Map(map)) = Payload::json(&vote));
        assert_eq!(map.get("image_id"), Some(&json!("abc")));
        assert_eq!(map.get("value"), Some(&json!(1)));
    }

    #[test]
    fn null_is_an_empty_map() {
        let_assert!(Ok(Payload::Map(map)) = Payload::json(&()));
        assert!(map.is_empty());
    }

    #[test]
    fn scalars_are_rejected() {
        let_assert!(Err(Error::InvalidRequest(message)) = Payload::json("hello"));
        assert!(message.contains("object or an array"), "{message}");
    }
}
