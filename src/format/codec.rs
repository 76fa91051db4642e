use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use super::SaveFormat;

/// Errors converting between file bytes and the save-data envelope.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("Invalid JSON document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("SVG data is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("Invalid base64 image data: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("Save data is missing the '{0}' field")]
    MissingField(&'static str),
}

/// Argument of the editor's `loadSaveData` call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "format")]
pub enum LoadPayload {
    #[serde(rename = "json")]
    Structured { data: Value },
    #[serde(rename = "svg")]
    VectorImage { blob: String },
    #[serde(rename = "png")]
    RasterImage { base64: String },
}

impl LoadPayload {
    pub fn format(&self) -> SaveFormat {
        match self {
            LoadPayload::Structured { .. } => SaveFormat::Structured,
            LoadPayload::VectorImage { .. } => SaveFormat::VectorImage,
            LoadPayload::RasterImage { .. } => SaveFormat::RasterImage,
        }
    }
}

/// Wraps file contents for delivery to the editor.
pub fn encode(format: SaveFormat, bytes: &[u8]) -> Result<LoadPayload, CodecError> {
    Ok(match format {
        SaveFormat::Structured => LoadPayload::Structured {
            data: serde_json::from_slice(bytes)?,
        },
        SaveFormat::VectorImage => LoadPayload::VectorImage {
            blob: String::from_utf8(bytes.to_vec())?,
        },
        SaveFormat::RasterImage => LoadPayload::RasterImage {
            base64: STANDARD.encode(bytes),
        },
    })
}

/// Extracts the bytes to write to disk from a `getSaveData` response.
///
/// Structured documents are written compact with their keys in the editor's
/// order. A loaded document therefore round-trips at the JSON value level;
/// bytes are only reproduced exactly for compact input.
pub fn decode(format: SaveFormat, response: &Value) -> Result<Vec<u8>, CodecError> {
    match format {
        SaveFormat::Structured => Ok(serde_json::to_vec(response)?),
        SaveFormat::VectorImage => {
            let text = string_field(response, "blob")
                .or_else(|| string_field(response, "text"))
                .ok_or(CodecError::MissingField("blob"))?;
            Ok(text.as_bytes().to_vec())
        }
        SaveFormat::RasterImage => {
            let encoded =
                string_field(response, "base64").ok_or(CodecError::MissingField("base64"))?;
            Ok(STANDARD.decode(encoded)?)
        }
    }
}

fn string_field<'a>(value: &'a Value, name: &str) -> Option<&'a str> {
    value.get(name).and_then(Value::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    /// What the editor would answer for a payload it was just given.
    fn echo(payload: &LoadPayload) -> Value {
        match payload {
            LoadPayload::Structured { data } => data.clone(),
            LoadPayload::VectorImage { blob } => json!({ "blob": blob }),
            LoadPayload::RasterImage { base64 } => json!({ "base64": base64 }),
        }
    }

    #[test]
    fn structured_round_trip_preserves_bytes() {
        let bytes = br#"{"type":"excalidraw","version":2,"elements":[],"appState":{"gridSize":null}}"#;
        let payload = encode(SaveFormat::Structured, bytes).unwrap();
        assert_eq!(decode(SaveFormat::Structured, &echo(&payload)).unwrap(), bytes);
    }

    #[test]
    fn pretty_structured_document_round_trips_as_value() {
        let pretty = b"{\n  \"type\": \"excalidraw\",\n  \"elements\": [\n    {\n      \"id\": \"a\"\n    }\n  ]\n}\n";
        let payload = encode(SaveFormat::Structured, pretty).unwrap();
        let written = decode(SaveFormat::Structured, &echo(&payload)).unwrap();

        assert_eq!(written, br#"{"type":"excalidraw","elements":[{"id":"a"}]}"#);
        let before: Value = serde_json::from_slice(pretty).unwrap();
        let after: Value = serde_json::from_slice(&written).unwrap();
        assert_eq!(before, after);
    }

    #[test]
    fn raster_round_trip_preserves_bytes() {
        let bytes = [0x89, b'P', b'N', b'G', 0, 255, 13, 10];
        let payload = encode(SaveFormat::RasterImage, &bytes).unwrap();
        assert_eq!(decode(SaveFormat::RasterImage, &echo(&payload)).unwrap(), bytes);
    }

    #[test]
    fn vector_round_trip_preserves_text() {
        let text = "<svg><!-- päint --></svg>";
        let payload = encode(SaveFormat::VectorImage, text.as_bytes()).unwrap();
        let bytes = decode(SaveFormat::VectorImage, &echo(&payload)).unwrap();
        assert_eq!(String::from_utf8(bytes).unwrap(), text);
    }

    #[test]
    fn load_payload_serializes_with_format_tag() {
        let payload = encode(SaveFormat::Structured, br#"{"elements":[]}"#).unwrap();
        assert_eq!(
            serde_json::to_value(&payload).unwrap(),
            json!({ "format": "json", "data": { "elements": [] } })
        );

        let payload = encode(SaveFormat::RasterImage, b"hello").unwrap();
        assert_eq!(
            serde_json::to_value(&payload).unwrap(),
            json!({ "format": "png", "base64": "aGVsbG8=" })
        );
    }

    #[test]
    fn decode_accepts_text_alias_for_svg() {
        let bytes = decode(SaveFormat::VectorImage, &json!({ "text": "<svg/>" })).unwrap();
        assert_eq!(bytes, b"<svg/>");
    }

    #[test]
    fn malformed_input_is_an_error() {
        assert!(matches!(
            encode(SaveFormat::Structured, b"{not json"),
            Err(CodecError::Json(_))
        ));
        assert!(matches!(
            encode(SaveFormat::VectorImage, &[0xff, 0xfe]),
            Err(CodecError::Utf8(_))
        ));
        assert!(matches!(
            decode(SaveFormat::RasterImage, &json!({ "base64": "***" })),
            Err(CodecError::Base64(_))
        ));
        assert!(matches!(
            decode(SaveFormat::VectorImage, &json!({})),
            Err(CodecError::MissingField("blob"))
        ));
    }
}
