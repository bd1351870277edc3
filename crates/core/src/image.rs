//! Image reference resolution for `img` elements.

use crate::parse::Element;

/// Attributes holding an image URL, lazy-load sources first.
pub const IMAGE_ATTRIBUTES: &[&str] = &["data-src", "src", "data-url", "data-backh-src", "data-original"];

/// Pick the best URL for an image element.
///
/// Returns the first non-empty value among [`IMAGE_ATTRIBUTES`].
/// Protocol-relative values get an `https:` prefix; nothing else is
/// validated.
pub fn resolve_image(element: &Element) -> Option<String> {
    let value = IMAGE_ATTRIBUTES
        .iter()
        .filter_map(|name| element.attr(name))
        .map(str::trim)
        .find(|value| !value.is_empty())?;

    Some(normalize_image_url(value))
}

/// Prefix protocol-relative URLs with `https:`.
pub fn normalize_image_url(url: &str) -> String {
    if url.starts_with("//") { format!("https:{}", url) } else { url.to_string() }
}
