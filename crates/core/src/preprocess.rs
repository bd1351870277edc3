//! Markup cleanup before parsing.
//!
//! Runs streaming rewrites with `lol_html`: non-content elements and
//! comments are dropped and relative image references are made absolute.
//! Hidden elements are deliberately left alone; article bodies are often
//! shipped with `visibility: hidden` and revealed by script.

use regex::Regex;
use std::sync::LazyLock;
use url::Url;

use crate::image::IMAGE_ATTRIBUTES;

static COMMENT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->").unwrap());

/// Configuration for HTML preprocessing
#[derive(Debug, Clone)]
pub struct PreprocessConfig {
    /// Whether to remove script tags
    pub remove_scripts: bool,
    /// Whether to remove style tags
    pub remove_styles: bool,
    /// Whether to remove noscript and template tags
    pub remove_noscript: bool,
    /// Whether to strip HTML comments
    pub remove_comments: bool,
    /// Whether to resolve relative image references
    pub convert_urls: bool,
    /// Base URL for resolving relative image references
    pub base_url: Option<Url>,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            remove_scripts: true,
            remove_styles: true,
            remove_noscript: true,
            remove_comments: true,
            convert_urls: true,
            base_url: None,
        }
    }
}

/// Preprocess HTML according to `config`.
///
/// Rewrite failures leave the markup unchanged; preprocessing never fails.
pub fn preprocess_html(html: &str, config: &PreprocessConfig) -> String {
    let mut processed = remove_unwanted_tags(html, config);

    if config.remove_comments {
        processed = remove_comments(&processed);
    }

    if config.convert_urls
        && let Some(base_url) = &config.base_url
    {
        processed = convert_relative_image_urls(&processed, base_url);
    }

    processed
}

/// Tags dropped by [`remove_unwanted_tags`] under `config`.
fn unwanted_tags(config: &PreprocessConfig) -> Vec<&'static str> {
    let mut tags = Vec::new();
    if config.remove_scripts {
        tags.push("script");
    }
    if config.remove_styles {
        tags.push("style");
    }
    if config.remove_noscript {
        tags.extend(["noscript", "template"]);
    }
    tags
}

/// Remove script, style, noscript and template elements with their content
fn remove_unwanted_tags(html: &str, config: &PreprocessConfig) -> String {
    let tags = unwanted_tags(config);
    if tags.is_empty() {
        return html.to_string();
    }

    let selector = tags.join(", ");
    let mut output = Vec::new();
    let mut rewriter = lol_html::HtmlRewriter::new(
        lol_html::Settings {
            element_content_handlers: vec![lol_html::element!(selector, |el| {
                el.remove();
                Ok(())
            })],
            ..Default::default()
        },
        |c: &[u8]| output.extend_from_slice(c),
    );

    if rewriter.write(html.as_bytes()).is_err() || rewriter.end().is_err() {
        return html.to_string();
    }

    into_markup(output, html)
}

/// Remove HTML comments from the document
fn remove_comments(html: &str) -> String {
    COMMENT.replace_all(html, "").to_string()
}

/// Resolve relative image references against `base_url`.
///
/// Every attribute in [`IMAGE_ATTRIBUTES`] is rewritten. Protocol-relative
/// values are left for image resolution, which forces `https:` on them.
pub fn convert_relative_image_urls(html: &str, base_url: &Url) -> String {
    let mut output = Vec::new();
    let mut rewriter = lol_html::HtmlRewriter::new(
        lol_html::Settings {
            element_content_handlers: vec![lol_html::element!("img", |el| {
                for name in IMAGE_ATTRIBUTES {
                    if let Some(value) = el.get_attribute(name)
                        && let Some(absolute) = absolutize(&value, base_url)
                    {
                        el.set_attribute(name, &absolute).ok();
                    }
                }
                Ok(())
            })],
            ..Default::default()
        },
        |c: &[u8]| output.extend_from_slice(c),
    );

    if rewriter.write(html.as_bytes()).is_err() || rewriter.end().is_err() {
        return html.to_string();
    }

    into_markup(output, html)
}

/// Rewriter output as a string; chunks may split UTF-8 sequences, so bytes
/// are only decoded once complete.
fn into_markup(output: Vec<u8>, original: &str) -> String {
    if output.is_empty() {
        return original.to_string();
    }
    String::from_utf8(output).unwrap_or_else(|e| String::from_utf8_lossy(e.as_bytes()).into_owned())
}

fn absolutize(value: &str, base_url: &Url) -> Option<String> {
    let value = value.trim();
    if value.is_empty() || value.starts_with("//") || value.starts_with("data:") {
        return None;
    }
    if Url::parse(value).is_ok() {
        return None;
    }
    base_url.join(value).ok().map(String::from)
}
