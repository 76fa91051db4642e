//! File chooser requests for the save, open and export actions.

use crate::format::{RASTER_SUFFIX, SaveFormat, VECTOR_SUFFIX, strip_known_suffixes};
use crate::native::{ChooserAction, ChooserRequest, FileFilter, SaveLocation};

/// Filters offered for documents, most convenient first.
const DOCUMENT_FORMATS: [SaveFormat; 3] = [
    SaveFormat::VectorImage,
    SaveFormat::RasterImage,
    SaveFormat::Structured,
];

/// Chooser for "Open" and "Save As", preselecting the current location.
pub fn document_request(
    action: ChooserAction,
    current: Option<&SaveLocation>,
    untitled_name: &str,
) -> ChooserRequest {
    let filters = DOCUMENT_FORMATS
        .iter()
        .map(|format| {
            let (name, pattern) = format.filter();
            FileFilter::new(name, pattern)
        })
        .collect();

    let current_name = match (current, action) {
        (None, ChooserAction::Save) => Some(untitled_name.to_string()),
        _ => None,
    };

    ChooserRequest {
        action,
        accept_label: match action {
            ChooserAction::Open => "Open".to_string(),
            ChooserAction::Save => "Save As".to_string(),
        },
        filters,
        initial_uri: current.map(SaveLocation::uri),
        current_name,
        confirm_overwrite: true,
    }
}

/// Chooser for "Export", defaulting to the previous export target or a name
/// derived from the current save location.
pub fn export_request(
    last_export: Option<&SaveLocation>,
    current: Option<&SaveLocation>,
    untitled_name: &str,
    fallback_stem: &str,
) -> ChooserRequest {
    let (initial_uri, current_name) = match (last_export, current) {
        (Some(last), _) => (Some(last.uri()), None),
        (None, Some(current)) => (Some(export_name_for(current, fallback_stem).uri()), None),
        (None, None) => (None, Some(untitled_name.to_string())),
    };

    ChooserRequest {
        action: ChooserAction::Save,
        accept_label: "Export".to_string(),
        filters: vec![
            FileFilter::new("svg", &format!("*{}", VECTOR_SUFFIX)),
            FileFilter::new("png", &format!("*{}", RASTER_SUFFIX)),
        ],
        initial_uri,
        current_name,
        confirm_overwrite: true,
    }
}

/// `dir/name.excalidraw.png` becomes `dir/name.svg`.
pub fn export_name_for(location: &SaveLocation, fallback_stem: &str) -> SaveLocation {
    let file_name = location.file_name().unwrap_or_default();
    let stem = match strip_known_suffixes(&file_name) {
        "" => fallback_stem,
        stem => stem,
    };
    let path = location
        .path()
        .with_file_name(format!("{}{}", stem, VECTOR_SUFFIX));
    // Same directory as an absolute location, so this cannot fail to resolve.
    SaveLocation::from_path(&path).unwrap_or_else(|_| location.clone())
}

/// Export targets are raster only when named so; everything else is SVG.
pub fn export_format_for(target: &SaveLocation) -> SaveFormat {
    match SaveFormat::from_name(&target.uri()) {
        SaveFormat::RasterImage => SaveFormat::RasterImage,
        _ => SaveFormat::VectorImage,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn location(path: &str) -> SaveLocation {
        SaveLocation::from_path(path).unwrap()
    }

    #[test]
    fn document_filters_put_svg_first() {
        let request = document_request(ChooserAction::Save, None, "Untitled.excalidraw.svg");
        let patterns: Vec<_> = request.filters.iter().map(|f| f.pattern.as_str()).collect();
        assert_eq!(
            patterns,
            vec!["*.excalidraw.svg", "*.excalidraw.png", "*.excalidraw"]
        );
        assert_eq!(request.current_name.as_deref(), Some("Untitled.excalidraw.svg"));
        assert_eq!(request.initial_uri, None);
    }

    #[test]
    fn document_request_preselects_current_location() {
        let current = location("/tmp/a.excalidraw");
        let request = document_request(ChooserAction::Open, Some(&current), "Untitled");
        assert_eq!(request.initial_uri.as_deref(), Some("file:///tmp/a.excalidraw"));
        assert_eq!(request.current_name, None);

        let request = document_request(ChooserAction::Open, None, "Untitled");
        assert_eq!(request.current_name, None);
    }

    #[test]
    fn export_defaults_follow_priority() {
        let last = location("/tmp/last.png");
        let current = location("/home/u/plan.excalidraw.svg");

        let request = export_request(Some(&last), Some(&current), "Untitled", "output");
        assert_eq!(request.initial_uri.as_deref(), Some("file:///tmp/last.png"));

        let request = export_request(None, Some(&current), "Untitled", "output");
        assert_eq!(request.initial_uri.as_deref(), Some("file:///home/u/plan.svg"));

        let request = export_request(None, None, "Untitled.excalidraw.svg", "output");
        assert_eq!(request.initial_uri, None);
        assert_eq!(request.current_name.as_deref(), Some("Untitled.excalidraw.svg"));
    }

    #[test]
    fn export_name_falls_back_for_empty_stems() {
        let derived = export_name_for(&location("/tmp/.excalidraw"), "output");
        assert_eq!(derived.path(), std::path::Path::new("/tmp/output.svg"));
    }

    #[test]
    fn export_format_defaults_to_svg() {
        assert_eq!(export_format_for(&location("/tmp/pic.PNG")), SaveFormat::RasterImage);
        assert_eq!(export_format_for(&location("/tmp/pic.svg")), SaveFormat::VectorImage);
        assert_eq!(export_format_for(&location("/tmp/pic")), SaveFormat::VectorImage);
        assert_eq!(
            export_format_for(&location("/tmp/pic.excalidraw")),
            SaveFormat::VectorImage
        );
    }
}
