use roxmltree::Document;

/// Text of the first element named `tag` anywhere in the document.
///
/// An element with no text content yields an empty string, so callers can
/// tell "present but empty" apart from "absent".
pub(crate) fn element_text(doc: &Document<'_>, tag: &str) -> Option<String> {
    doc.descendants()
        .find(|node| node.has_tag_name(tag))
        .map(|node| node.text().unwrap_or_default().to_string())
}

pub(crate) fn error_message(doc: &Document<'_>) -> Option<String> {
    element_text(doc, "ErrorMessage")
}
