//! Save format negotiation and the save-data codec.
//!
//! A drawing is persisted in one of three formats, picked from the target
//! file name. The codec converts between the bytes on disk and the JSON
//! envelope exchanged with the embedded editor.

mod codec;

pub use codec::{CodecError, LoadPayload, decode, encode};

use serde::{Deserialize, Serialize};
use std::fmt;

/// Suffix marking a file as an Excalidraw document.
pub const DOMAIN_SUFFIX: &str = ".excalidraw";
/// Suffix of vector image saves (`name.excalidraw.svg` or `name.svg`).
pub const VECTOR_SUFFIX: &str = ".svg";
/// Suffix of raster image saves (`name.excalidraw.png` or `name.png`).
pub const RASTER_SUFFIX: &str = ".png";

/// On-disk representation of a drawing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SaveFormat {
    /// The whole save-data object as UTF-8 JSON.
    #[serde(rename = "json")]
    Structured,
    /// SVG text with the document embedded as metadata by the editor.
    #[serde(rename = "svg")]
    VectorImage,
    /// PNG bytes; base64 only while crossing the message channel.
    #[serde(rename = "png")]
    RasterImage,
}

impl SaveFormat {
    /// Classifies a file name or URI by suffix, ignoring case.
    ///
    /// Compound names such as `a.excalidraw.png` classify by their last
    /// suffix; anything unrecognised is [`SaveFormat::Structured`].
    pub fn from_name(name: &str) -> Self {
        let name = name.to_lowercase();
        if name.ends_with(RASTER_SUFFIX) {
            SaveFormat::RasterImage
        } else if name.ends_with(VECTOR_SUFFIX) {
            SaveFormat::VectorImage
        } else {
            SaveFormat::Structured
        }
    }

    /// Like [`SaveFormat::from_name`], with no name meaning `Structured`.
    pub fn from_optional_name(name: Option<&str>) -> Self {
        name.map(Self::from_name).unwrap_or(SaveFormat::Structured)
    }

    /// Format name understood by the editor's `getSaveData`/`loadSaveData`.
    pub fn js_name(self) -> &'static str {
        match self {
            SaveFormat::Structured => "json",
            SaveFormat::VectorImage => "svg",
            SaveFormat::RasterImage => "png",
        }
    }

    /// Label and glob shown in file choosers.
    pub fn filter(self) -> (&'static str, &'static str) {
        match self {
            SaveFormat::Structured => ("Excalidraw JSON", "*.excalidraw"),
            SaveFormat::VectorImage => ("Excalidraw SVG", "*.excalidraw.svg"),
            SaveFormat::RasterImage => ("Excalidraw PNG", "*.excalidraw.png"),
        }
    }
}

impl fmt::Display for SaveFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.js_name())
    }
}

/// Removes a trailing `.excalidraw`, `.svg`/`.png` or `.excalidraw.svg`/`.png`.
pub fn strip_known_suffixes(name: &str) -> &str {
    let without_image = strip_suffix_ignore_case(name, RASTER_SUFFIX)
        .or_else(|| strip_suffix_ignore_case(name, VECTOR_SUFFIX))
        .unwrap_or(name);
    strip_suffix_ignore_case(without_image, DOMAIN_SUFFIX).unwrap_or(without_image)
}

fn strip_suffix_ignore_case<'a>(name: &'a str, suffix: &str) -> Option<&'a str> {
    let split = name.len().checked_sub(suffix.len())?;
    if !name.is_char_boundary(split) {
        return None;
    }
    let (head, tail) = name.split_at(split);
    tail.eq_ignore_ascii_case(suffix).then_some(head)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification_ignores_case() {
        assert_eq!(SaveFormat::from_name("A.EXCALIDRAW.PNG"), SaveFormat::RasterImage);
        assert_eq!(SaveFormat::from_name("a.excalidraw.svg"), SaveFormat::VectorImage);
        assert_eq!(SaveFormat::from_name("a.txt"), SaveFormat::Structured);
        assert_eq!(SaveFormat::from_optional_name(None), SaveFormat::Structured);
    }

    #[test]
    fn classification_accepts_plain_and_compound_suffixes() {
        assert_eq!(SaveFormat::from_name("photo.png"), SaveFormat::RasterImage);
        assert_eq!(SaveFormat::from_name("file:///tmp/x.Svg"), SaveFormat::VectorImage);
        assert_eq!(SaveFormat::from_name("drawing.excalidraw"), SaveFormat::Structured);
        assert_eq!(SaveFormat::from_name("png"), SaveFormat::Structured);
    }

    #[test]
    fn js_names_match_serde_names() {
        for format in [
            SaveFormat::Structured,
            SaveFormat::VectorImage,
            SaveFormat::RasterImage,
        ] {
            let json = serde_json::to_value(format).unwrap();
            assert_eq!(json, serde_json::Value::from(format.js_name()));
        }
    }

    #[test]
    fn strips_domain_and_image_suffixes() {
        assert_eq!(strip_known_suffixes("/tmp/a.excalidraw.svg"), "/tmp/a");
        assert_eq!(strip_known_suffixes("/tmp/a.EXCALIDRAW.PNG"), "/tmp/a");
        assert_eq!(strip_known_suffixes("/tmp/a.excalidraw"), "/tmp/a");
        assert_eq!(strip_known_suffixes("/tmp/a.svg"), "/tmp/a");
        assert_eq!(strip_known_suffixes("/tmp/a.txt"), "/tmp/a.txt");
        assert_eq!(strip_known_suffixes(".svg"), "");
    }
}
