use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("failed to encode message: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("failed to decode message: {0}")]
    Decode(#[source] serde_json::Error),
}

/// Wire format of socket messages. Only structured JSON is supported.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    #[default]
    Json,
}

impl Format {
    pub fn encode<T: Serialize + ?Sized>(self, value: &T) -> Result<String, CodecError> {
        match self {
            Format::Json => serde_json::to_string(value).map_err(CodecError::Encode),
        }
    }

    pub fn decode<T: DeserializeOwned>(self, text: &str) -> Result<T, CodecError> {
        match self {
            Format::Json => serde_json::from_str(text).map_err(CodecError::Decode),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use serde_json::json;

    use super::*;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    #[serde(tag = "method", rename_all = "snake_case")]
    enum Command {
        Led { led: u8, r: u8, g: u8, b: u8 },
    }

    #[test]
    fn encodes_tagged_objects() {
        let text = Format::Json
            .encode(&Command::Led { led: 1, r: 255, g: 0, b: 16 })
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value, json!({"method": "led", "led": 1, "r": 255, "g": 0, "b": 16}));
    }

    #[test]
    fn decodes_server_replies() {
        let reply: serde_json::Value = Format::Json.decode(r#"{"success":true}"#).unwrap();
        assert_eq!(reply["success"], true);
    }

    #[test]
    fn non_serializable_value_fails_at_encode() {
        // JSON object keys must be strings.
        let mut map = HashMap::new();
        map.insert(vec![1u8, 2], "x");
        let err = Format::Json.encode(&map).unwrap_err();
        assert!(matches!(err, CodecError::Encode(_)));
    }

    #[test]
    fn malformed_text_fails_at_decode() {
        let err = Format::Json.decode::<Command>("{not json").unwrap_err();
        assert!(matches!(err, CodecError::Decode(_)));
        assert!(err.to_string().starts_with("failed to decode message"));
    }
}
