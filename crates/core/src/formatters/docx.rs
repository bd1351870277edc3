//! DOCX (WordprocessingML) writer.
//!
//! Builds the package by hand: XML parts are rendered as strings and
//! written with embedded media into a zip container. Only the subset of
//! WordprocessingML needed for articles is produced: a title, an optional
//! byline, headings, paragraphs with line breaks, inline pictures with
//! captions and bullet/numbered lists.

use std::fs::File;
use std::io::{Seek, Write};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use quick_xml::escape::escape;
use regex::Regex;
use zip::CompressionMethod;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use crate::Result;
use crate::article::ExtractionResult;
use crate::block::{ContentBlock, ListStyle};
use crate::media::{ImageFormat, image_dimensions};

const EMU_PER_INCH: u64 = 914_400;

/// Characters replaced in output file names.
const UNSAFE_FILENAME_CHARS: &[char] = &['\\', '/', '*', '?', ':', '"', '<', '>', '|'];

/// Leading `YYYY-MM-DD` of an ISO-8601 date.
static ISO_DATE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(\d{4}-\d{2}-\d{2})").unwrap());

const NS_W: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
const NS_R: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const NS_WP: &str = "http://schemas.openxmlformats.org/drawingml/2006/wordprocessingDrawing";
const NS_A: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";
const NS_PIC: &str = "http://schemas.openxmlformats.org/drawingml/2006/picture";
const REL_BASE: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

const ROOT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties" Target="docProps/core.xml"/><Relationship Id="rId3" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/extended-properties" Target="docProps/app.xml"/></Relationships>"#;

const APP_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Properties xmlns="http://schemas.openxmlformats.org/officeDocument/2006/extended-properties"><Application>folio</Application></Properties>"#;

/// Configuration for DOCX output.
#[derive(Debug, Clone)]
pub struct DocxConfig {
    /// Width of embedded images in inches (default: 5.5).
    pub image_width_in: f64,
    /// Added to block heading levels; the title occupies level 0 (default: 1).
    pub heading_offset: u8,
    /// Whether non-empty alt text is written as a caption below images (default: true).
    pub captions: bool,
    /// Whether the author/date line is written below the title (default: true).
    pub byline: bool,
    /// Latin body font (default: "Calibri").
    pub font: String,
    /// East Asian body font (default: "Microsoft YaHei").
    pub east_asia_font: String,
    /// Body font size in points (default: 11).
    pub font_size_pt: u32,
}

impl Default for DocxConfig {
    fn default() -> Self {
        Self {
            image_width_in: 5.5,
            heading_offset: 1,
            captions: true,
            byline: true,
            font: "Calibri".to_string(),
            east_asia_font: "Microsoft YaHei".to_string(),
            font_size_pt: 11,
        }
    }
}

/// Writes articles as DOCX files.
#[derive(Debug, Clone, Default)]
pub struct DocxWriter {
    config: DocxConfig,
}

/// Document-level properties for one package.
struct Header<'a> {
    title: &'a str,
    byline: Option<String>,
    creator: Option<&'a str>,
    created: Option<String>,
}

impl DocxWriter {
    pub fn new(config: DocxConfig) -> Self {
        Self { config }
    }

    /// Writes an extraction result, byline and document properties included.
    ///
    /// `resolve_image` maps an image URL to a local file; images it cannot
    /// resolve, or whose files are unreadable or in an unsupported format,
    /// are skipped.
    pub fn write_result<F>(&self, result: &ExtractionResult, resolve_image: F, path: &Path) -> Result<PathBuf>
    where
        F: FnMut(&str) -> Option<PathBuf>,
    {
        let byline = self.config.byline.then(|| match &result.date {
            Some(date) => format!("{} · {}", result.author_or_default(), date),
            None => result.author_or_default().to_string(),
        });
        let header = Header {
            title: &result.title,
            byline,
            creator: result.author.as_deref(),
            created: result.date.as_deref().and_then(w3c_date),
        };

        self.write_file(&header, &result.blocks, resolve_image, path)
    }

    /// Writes a titled block sequence without byline.
    pub fn write_blocks<F>(&self, title: &str, blocks: &[ContentBlock], resolve_image: F, path: &Path) -> Result<PathBuf>
    where
        F: FnMut(&str) -> Option<PathBuf>,
    {
        let header = Header { title, byline: None, creator: None, created: None };
        self.write_file(&header, blocks, resolve_image, path)
    }

    fn write_file<F>(&self, header: &Header<'_>, blocks: &[ContentBlock], resolve_image: F, path: &Path) -> Result<PathBuf>
    where
        F: FnMut(&str) -> Option<PathBuf>,
    {
        let file = File::create(path)?;
        self.write_package(header, blocks, resolve_image, file)?;
        tracing::info!(path = %path.display(), blocks = blocks.len(), "wrote document");
        Ok(path.to_path_buf())
    }

    fn write_package<W, F>(&self, header: &Header<'_>, blocks: &[ContentBlock], resolve_image: F, writer: W) -> Result<()>
    where
        W: Write + Seek,
        F: FnMut(&str) -> Option<PathBuf>,
    {
        let mut body = Body::new(&self.config, resolve_image);
        body.title(header.title);
        if let Some(byline) = &header.byline {
            body.byline(byline);
        }
        for block in blocks {
            body.block(block);
        }

        let mut zip = ZipWriter::new(writer);
        let deflated = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .compression_level(Some(6));
        let stored = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);

        zip.start_file("[Content_Types].xml", deflated)?;
        zip.write_all(content_types(&body.media).as_bytes())?;

        zip.start_file("_rels/.rels", deflated)?;
        zip.write_all(ROOT_RELS.as_bytes())?;

        zip.start_file("docProps/core.xml", deflated)?;
        zip.write_all(core_xml(header).as_bytes())?;

        zip.start_file("docProps/app.xml", deflated)?;
        zip.write_all(APP_XML.as_bytes())?;

        zip.start_file("word/_rels/document.xml.rels", deflated)?;
        zip.write_all(document_rels(&body.media).as_bytes())?;

        zip.start_file("word/styles.xml", deflated)?;
        zip.write_all(styles_xml(&self.config).as_bytes())?;

        zip.start_file("word/numbering.xml", deflated)?;
        zip.write_all(numbering_xml(&body.lists).as_bytes())?;

        let media = std::mem::take(&mut body.media);
        zip.start_file("word/document.xml", deflated)?;
        zip.write_all(body.finish().as_bytes())?;

        for media in &media {
            zip.start_file(format!("word/media/{}", media.name), stored)?;
            zip.write_all(&media.data)?;
        }

        zip.finish()?;
        Ok(())
    }
}

/// Writes `blocks` under `title` to `path` with the default configuration.
///
/// Returns the path written.
pub fn write_document<F>(title: &str, blocks: &[ContentBlock], image_resolver: F, path: &Path) -> Result<PathBuf>
where
    F: FnMut(&str) -> Option<PathBuf>,
{
    DocxWriter::default().write_blocks(title, blocks, image_resolver, path)
}

/// File name derived from an article title.
///
/// Unsafe characters and spaces become `_`, the name is cut to 50
/// characters and `.docx` is appended.
///
/// ```rust
/// use folio_core::formatters::docx::default_output_name;
///
/// assert_eq!(default_output_name("A/B: c?"), "A_B__c_.docx");
/// ```
pub fn default_output_name(title: &str) -> String {
    let mut name: String = title
        .trim()
        .chars()
        .map(|c| if UNSAFE_FILENAME_CHARS.contains(&c) || c.is_whitespace() { '_' } else { c })
        .take(50)
        .collect();
    if name.is_empty() {
        name.push_str("article");
    }
    format!("{}.docx", name)
}

/// `YYYY-MM-DDT00:00:00Z` for ISO-shaped dates, `None` otherwise.
fn w3c_date(date: &str) -> Option<String> {
    ISO_DATE
        .captures(date.trim())
        .map(|caps| format!("{}T00:00:00Z", &caps[1]))
}

/// An image part embedded in the package.
struct Media {
    name: String,
    rel_id: String,
    format: ImageFormat,
    data: Vec<u8>,
}

/// Accumulates `word/document.xml` body content plus the media and list
/// numbering instances it references.
struct Body<'c, F> {
    config: &'c DocxConfig,
    resolve_image: F,
    xml: String,
    media: Vec<Media>,
    lists: Vec<ListStyle>,
}

impl<'c, F> Body<'c, F>
where
    F: FnMut(&str) -> Option<PathBuf>,
{
    fn new(config: &'c DocxConfig, resolve_image: F) -> Self {
        Self { config, resolve_image, xml: String::new(), media: Vec::new(), lists: Vec::new() }
    }

    fn title(&mut self, title: &str) {
        self.xml.push_str(r#"<w:p><w:pPr><w:pStyle w:val="Title"/><w:jc w:val="center"/></w:pPr>"#);
        self.xml.push_str(&runs(title));
        self.xml.push_str("</w:p>");
    }

    fn byline(&mut self, byline: &str) {
        self.xml.push_str(r#"<w:p><w:pPr><w:pStyle w:val="Byline"/><w:jc w:val="center"/></w:pPr>"#);
        self.xml.push_str(&runs(byline));
        self.xml.push_str("</w:p>");
    }

    fn block(&mut self, block: &ContentBlock) {
        match block {
            ContentBlock::Heading { level, text } => {
                let level = level.saturating_add(self.config.heading_offset).clamp(1, 6);
                self.xml
                    .push_str(&format!(r#"<w:p><w:pPr><w:pStyle w:val="Heading{}"/></w:pPr>"#, level));
                self.xml.push_str(&runs(text));
                self.xml.push_str("</w:p>");
            }
            ContentBlock::Paragraph { text } => {
                self.xml.push_str("<w:p>");
                self.xml.push_str(&runs(text));
                self.xml.push_str("</w:p>");
            }
            ContentBlock::Image { url, alt } => self.image(url, alt),
            ContentBlock::List { style, items } => {
                self.lists.push(*style);
                let num_id = self.lists.len();
                for item in items {
                    self.xml.push_str(&format!(
                        r#"<w:p><w:pPr><w:pStyle w:val="ListParagraph"/><w:numPr><w:ilvl w:val="0"/><w:numId w:val="{}"/></w:numPr></w:pPr>"#,
                        num_id
                    ));
                    self.xml.push_str(&runs(item));
                    self.xml.push_str("</w:p>");
                }
            }
        }
    }

    fn image(&mut self, url: &str, alt: &str) {
        let Some(path) = (self.resolve_image)(url) else {
            tracing::debug!(url, "image not resolved, skipping");
            return;
        };
        let data = match std::fs::read(&path) {
            Ok(data) => data,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "unreadable image, skipping");
                return;
            }
        };
        let Some(format) = ImageFormat::sniff(&data) else {
            tracing::warn!(url, "unsupported image format, skipping");
            return;
        };

        let cx = (self.config.image_width_in * EMU_PER_INCH as f64) as u64;
        let cy = match image_dimensions(&data) {
            Some((w, h)) if w > 0 && h > 0 => cx * h as u64 / w as u64,
            _ => cx * 3 / 4,
        };

        let index = self.media.len() + 1;
        let name = format!("image{}.{}", index, format.extension());
        let rel_id = format!("rIdImg{}", index);
        let descr = escape(xml_safe(alt).as_str()).into_owned();

        self.xml.push_str(&format!(
            concat!(
                r#"<w:p><w:pPr><w:jc w:val="center"/></w:pPr><w:r><w:drawing>"#,
                r#"<wp:inline distT="0" distB="0" distL="0" distR="0"><wp:extent cx="{cx}" cy="{cy}"/>"#,
                r#"<wp:docPr id="{id}" name="Picture {id}" descr="{descr}"/>"#,
                r#"<wp:cNvGraphicFramePr><a:graphicFrameLocks noChangeAspect="1"/></wp:cNvGraphicFramePr>"#,
                r#"<a:graphic><a:graphicData uri="{ns_pic}"><pic:pic>"#,
                r#"<pic:nvPicPr><pic:cNvPr id="{id}" name="{name}"/><pic:cNvPicPr/></pic:nvPicPr>"#,
                r#"<pic:blipFill><a:blip r:embed="{rel}"/><a:stretch><a:fillRect/></a:stretch></pic:blipFill>"#,
                r#"<pic:spPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="{cx}" cy="{cy}"/></a:xfrm>"#,
                r#"<a:prstGeom prst="rect"><a:avLst/></a:prstGeom></pic:spPr>"#,
                r#"</pic:pic></a:graphicData></a:graphic></wp:inline></w:drawing></w:r></w:p>"#
            ),
            cx = cx,
            cy = cy,
            id = index,
            descr = descr,
            ns_pic = NS_PIC,
            name = name,
            rel = rel_id,
        ));

        if self.config.captions && !alt.trim().is_empty() {
            self.xml.push_str(r#"<w:p><w:pPr><w:pStyle w:val="Caption"/><w:jc w:val="center"/></w:pPr>"#);
            self.xml.push_str(&runs(alt));
            self.xml.push_str("</w:p>");
        }

        self.media.push(Media { name, rel_id, format, data });
    }

    fn finish(self) -> String {
        format!(
            concat!(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
                "\n",
                r#"<w:document xmlns:w="{w}" xmlns:r="{r}" xmlns:wp="{wp}" xmlns:a="{a}" xmlns:pic="{pic}">"#,
                "<w:body>{body}",
                r#"<w:sectPr><w:pgSz w:w="11906" w:h="16838"/>"#,
                r#"<w:pgMar w:top="1440" w:right="1440" w:bottom="1440" w:left="1440" w:header="708" w:footer="708" w:gutter="0"/>"#,
                "</w:sectPr></w:body></w:document>"
            ),
            w = NS_W,
            r = NS_R,
            wp = NS_WP,
            a = NS_A,
            pic = NS_PIC,
            body = self.xml,
        )
    }
}

/// Runs for `text`, with `\n` rendered as line breaks.
fn runs(text: &str) -> String {
    let mut xml = String::from("<w:r>");
    for (i, line) in text.split('\n').enumerate() {
        if i > 0 {
            xml.push_str("<w:br/>");
        }
        xml.push_str(r#"<w:t xml:space="preserve">"#);
        xml.push_str(&escape(xml_safe(line).as_str()));
        xml.push_str("</w:t>");
    }
    xml.push_str("</w:r>");
    xml
}

/// Drops characters XML 1.0 cannot carry.
fn xml_safe(text: &str) -> String {
    text.chars()
        .filter(|&c| matches!(c, '\t' | '\n' | '\r') || (c >= ' ' && c != '\u{fffe}' && c != '\u{ffff}'))
        .collect()
}

fn content_types(media: &[Media]) -> String {
    let mut defaults = String::new();
    let mut seen: Vec<ImageFormat> = Vec::new();
    for item in media {
        if !seen.contains(&item.format) {
            seen.push(item.format);
            defaults.push_str(&format!(
                r#"<Default Extension="{}" ContentType="{}"/>"#,
                item.format.extension(),
                item.format.media_type()
            ));
        }
    }

    format!(
        concat!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
            "\n",
            r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#,
            r#"<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>"#,
            r#"<Default Extension="xml" ContentType="application/xml"/>{defaults}"#,
            r#"<Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/>"#,
            r#"<Override PartName="/word/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml"/>"#,
            r#"<Override PartName="/word/numbering.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.numbering+xml"/>"#,
            r#"<Override PartName="/docProps/core.xml" ContentType="application/vnd.openxmlformats-package.core-properties+xml"/>"#,
            r#"<Override PartName="/docProps/app.xml" ContentType="application/vnd.openxmlformats-officedocument.extended-properties+xml"/>"#,
            "</Types>"
        ),
        defaults = defaults
    )
}

fn document_rels(media: &[Media]) -> String {
    let mut rels = format!(
        concat!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
            "\n",
            r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
            r#"<Relationship Id="rIdStyles" Type="{base}/styles" Target="styles.xml"/>"#,
            r#"<Relationship Id="rIdNumbering" Type="{base}/numbering" Target="numbering.xml"/>"#
        ),
        base = REL_BASE
    );
    for item in media {
        rels.push_str(&format!(
            r#"<Relationship Id="{}" Type="{}/image" Target="media/{}"/>"#,
            item.rel_id, REL_BASE, item.name
        ));
    }
    rels.push_str("</Relationships>");
    rels
}

fn core_xml(header: &Header<'_>) -> String {
    let mut props = format!("<dc:title>{}</dc:title>", escape(xml_safe(header.title).as_str()));
    if let Some(creator) = header.creator {
        props.push_str(&format!("<dc:creator>{}</dc:creator>", escape(xml_safe(creator).as_str())));
    }
    if let Some(created) = &header.created {
        props.push_str(&format!(r#"<dcterms:created xsi:type="dcterms:W3CDTF">{}</dcterms:created>"#, created));
    }

    format!(
        concat!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
            "\n",
            r#"<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" "#,
            r#"xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/" "#,
            r#"xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">{props}</cp:coreProperties>"#
        ),
        props = props
    )
}

fn styles_xml(config: &DocxConfig) -> String {
    let font = escape(config.font.as_str()).into_owned();
    let east_asia = escape(config.east_asia_font.as_str()).into_owned();
    let body_size = config.font_size_pt * 2;

    let mut styles = format!(
        concat!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
            "\n",
            r#"<w:styles xmlns:w="{w}"><w:docDefaults><w:rPrDefault><w:rPr>"#,
            r#"<w:rFonts w:ascii="{font}" w:hAnsi="{font}" w:cs="{font}" w:eastAsia="{east_asia}"/>"#,
            r#"<w:sz w:val="{size}"/><w:szCs w:val="{size}"/></w:rPr></w:rPrDefault>"#,
            r#"<w:pPrDefault><w:pPr><w:spacing w:after="160" w:line="300" w:lineRule="auto"/></w:pPr></w:pPrDefault>"#,
            "</w:docDefaults>",
            r#"<w:style w:type="paragraph" w:default="1" w:styleId="Normal"><w:name w:val="Normal"/><w:qFormat/></w:style>"#,
            r#"<w:style w:type="paragraph" w:styleId="Title"><w:name w:val="Title"/><w:basedOn w:val="Normal"/>"#,
            r#"<w:next w:val="Normal"/><w:qFormat/><w:pPr><w:spacing w:after="240"/></w:pPr>"#,
            r#"<w:rPr><w:b/><w:sz w:val="40"/><w:szCs w:val="40"/></w:rPr></w:style>"#,
            r#"<w:style w:type="paragraph" w:styleId="Byline"><w:name w:val="Byline"/><w:basedOn w:val="Normal"/>"#,
            r#"<w:rPr><w:i/><w:color w:val="666666"/></w:rPr></w:style>"#,
            r#"<w:style w:type="paragraph" w:styleId="Caption"><w:name w:val="caption"/><w:basedOn w:val="Normal"/>"#,
            r#"<w:qFormat/><w:rPr><w:i/><w:color w:val="595959"/><w:sz w:val="18"/><w:szCs w:val="18"/></w:rPr></w:style>"#,
            r#"<w:style w:type="paragraph" w:styleId="ListParagraph"><w:name w:val="List Paragraph"/>"#,
            r#"<w:basedOn w:val="Normal"/><w:qFormat/><w:pPr><w:ind w:left="720"/><w:contextualSpacing/></w:pPr></w:style>"#
        ),
        w = NS_W,
        font = font,
        east_asia = east_asia,
        size = body_size,
    );

    for (level, size) in (1..=6).zip([32, 28, 26, 24, 22, 22]) {
        styles.push_str(&format!(
            concat!(
                r#"<w:style w:type="paragraph" w:styleId="Heading{level}"><w:name w:val="heading {level}"/>"#,
                r#"<w:basedOn w:val="Normal"/><w:next w:val="Normal"/><w:qFormat/>"#,
                r#"<w:pPr><w:keepNext/><w:spacing w:before="240" w:after="120"/><w:outlineLvl w:val="{outline}"/></w:pPr>"#,
                r#"<w:rPr><w:b/><w:sz w:val="{size}"/><w:szCs w:val="{size}"/></w:rPr></w:style>"#
            ),
            level = level,
            outline = level - 1,
            size = size,
        ));
    }

    styles.push_str("</w:styles>");
    styles
}

/// Abstract definitions 0 (bullet) and 1 (decimal), plus one instance per
/// list so that every numbered list restarts at 1.
fn numbering_xml(lists: &[ListStyle]) -> String {
    let mut xml = format!(
        concat!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
            "\n",
            r#"<w:numbering xmlns:w="{w}">"#,
            r#"<w:abstractNum w:abstractNumId="0"><w:multiLevelType w:val="singleLevel"/>"#,
            r#"<w:lvl w:ilvl="0"><w:start w:val="1"/><w:numFmt w:val="bullet"/><w:lvlText w:val="•"/>"#,
            r#"<w:lvlJc w:val="left"/><w:pPr><w:ind w:left="720" w:hanging="360"/></w:pPr></w:lvl></w:abstractNum>"#,
            r#"<w:abstractNum w:abstractNumId="1"><w:multiLevelType w:val="singleLevel"/>"#,
            r#"<w:lvl w:ilvl="0"><w:start w:val="1"/><w:numFmt w:val="decimal"/><w:lvlText w:val="%1."/>"#,
            r#"<w:lvlJc w:val="left"/><w:pPr><w:ind w:left="720" w:hanging="360"/></w:pPr></w:lvl></w:abstractNum>"#
        ),
        w = NS_W
    );

    for (index, style) in lists.iter().enumerate() {
        let num_id = index + 1;
        match style {
            ListStyle::Bullet => {
                xml.push_str(&format!(r#"<w:num w:numId="{}"><w:abstractNumId w:val="0"/></w:num>"#, num_id))
            }
            ListStyle::Numbered => xml.push_str(&format!(
                concat!(
                    r#"<w:num w:numId="{}"><w:abstractNumId w:val="1"/>"#,
                    r#"<w:lvlOverride w:ilvl="0"><w:startOverride w:val="1"/></w:lvlOverride></w:num>"#
                ),
                num_id
            )),
        }
    }

    xml.push_str("</w:numbering>");
    xml
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::samples;
    use quick_xml::Reader;
    use quick_xml::events::Event;
    use std::io::Read;

    fn read_part(path: &Path, name: &str) -> String {
        let mut archive = zip::ZipArchive::new(File::open(path).unwrap()).unwrap();
        let mut part = archive.by_name(name).unwrap();
        let mut xml = String::new();
        part.read_to_string(&mut xml).unwrap();
        xml
    }

    fn assert_well_formed(xml: &str) {
        let mut reader = Reader::from_str(xml);
        loop {
            match reader.read_event() {
                Ok(Event::Eof) => break,
                Ok(_) => {}
                Err(e) => panic!("malformed XML at {}: {}", reader.buffer_position(), e),
            }
        }
    }

    fn sample_result() -> ExtractionResult {
        ExtractionResult {
            title: "Tea & <Biscuits>".to_string(),
            author: Some("Ann".to_string()),
            date: Some("2024-03-01".to_string()),
            source_url: None,
            blocks: vec![
                ContentBlock::Heading { level: 1, text: "Intro".into() },
                ContentBlock::Paragraph { text: "line one\nline two".into() },
                ContentBlock::Image { url: "https://x/a.png".into(), alt: "A chart".into() },
                ContentBlock::Image { url: "https://x/missing.png".into(), alt: "lost".into() },
                ContentBlock::List { style: ListStyle::Numbered, items: vec!["first".into(), "second".into()] },
                ContentBlock::List { style: ListStyle::Bullet, items: vec!["dot".into()] },
                ContentBlock::List { style: ListStyle::Numbered, items: vec!["again".into()] },
            ],
        }
    }

    #[test]
    fn test_write_result_package() {
        let dir = tempfile::tempdir().unwrap();
        let image = dir.path().join("a.png");
        std::fs::write(&image, samples::png(200, 100)).unwrap();
        let out = dir.path().join("out.docx");

        let resolver = |url: &str| (url == "https://x/a.png").then(|| image.clone());
        let written = DocxWriter::default().write_result(&sample_result(), resolver, &out).unwrap();
        assert_eq!(written, out);

        let document = read_part(&out, "word/document.xml");
        assert_well_formed(&document);
        assert!(document.contains("Tea &amp; &lt;Biscuits&gt;"));
        assert!(document.contains("Ann · 2024-03-01"));
        assert!(document.contains(r#"<w:pStyle w:val="Heading2"/>"#));
        assert!(document.contains("line one</w:t><w:br/>"));
        assert!(document.contains(r#"r:embed="rIdImg1""#));
        assert!(document.contains(r#"cx="5029200" cy="2514600""#));
        assert!(document.contains(">A chart<"));
        assert!(!document.contains("lost"));
        assert_eq!(document.matches(r#"<w:numId w:val="1"/>"#).count(), 2);
        assert!(document.contains(r#"<w:numId w:val="3"/>"#));

        let numbering = read_part(&out, "word/numbering.xml");
        assert_well_formed(&numbering);
        assert_eq!(numbering.matches("<w:startOverride").count(), 2);

        let core = read_part(&out, "docProps/core.xml");
        assert!(core.contains("<dc:creator>Ann</dc:creator>"));
        assert!(core.contains("2024-03-01T00:00:00Z"));

        let types = read_part(&out, "[Content_Types].xml");
        assert!(types.contains(r#"Extension="png""#));

        for part in ["word/styles.xml", "word/_rels/document.xml.rels", "_rels/.rels"] {
            assert_well_formed(&read_part(&out, part));
        }

        let mut archive = zip::ZipArchive::new(File::open(&out).unwrap()).unwrap();
        let mut embedded = Vec::new();
        archive.by_name("word/media/image1.png").unwrap().read_to_end(&mut embedded).unwrap();
        assert_eq!(embedded, samples::png(200, 100));
    }

    #[test]
    fn test_write_document_without_byline() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("plain.docx");
        let blocks = vec![ContentBlock::Paragraph { text: "Body".into() }];

        write_document("Plain", &blocks, |_| None, &out).unwrap();

        let document = read_part(&out, "word/document.xml");
        assert!(document.contains(">Plain<"));
        assert!(!document.contains("Byline"));
        assert!(!read_part(&out, "docProps/core.xml").contains("dc:creator"));
    }

    #[test]
    fn test_unknown_author_byline() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("anon.docx");
        let result = ExtractionResult { author: None, date: None, ..sample_result() };

        DocxWriter::default().write_result(&result, |_| None, &out).unwrap();
        assert!(read_part(&out, "word/document.xml").contains("Unknown Author"));
    }

    #[test]
    fn test_unsupported_image_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let image = dir.path().join("a.webp");
        std::fs::write(&image, b"RIFF\0\0\0\0WEBPVP8 ").unwrap();
        let out = dir.path().join("webp.docx");
        let blocks = vec![ContentBlock::Image { url: "u".into(), alt: String::new() }];

        write_document("T", &blocks, |_| Some(image.clone()), &out).unwrap();
        assert!(!read_part(&out, "word/document.xml").contains("w:drawing"));
    }

    #[test]
    fn test_heading_levels_clamped() {
        let config = DocxConfig::default();
        let mut body = Body::new(&config, |_: &str| None);
        body.block(&ContentBlock::Heading { level: 6, text: "deep".into() });
        body.block(&ContentBlock::Heading { level: 1, text: "top".into() });

        assert!(body.xml.contains("Heading6"));
        assert!(body.xml.contains("Heading2"));
        assert!(!body.xml.contains("Heading7"));
    }

    #[test]
    fn test_default_output_name() {
        assert_eq!(default_output_name("Hello World"), "Hello_World.docx");
        assert_eq!(default_output_name(r#"a\b*c"d<e>f|g"#), "a_b_c_d_e_f_g.docx");
        assert_eq!(default_output_name(&"x".repeat(80)), format!("{}.docx", "x".repeat(50)));
        assert_eq!(default_output_name("   "), "article.docx");
        assert_eq!(default_output_name("中文标题"), "中文标题.docx");
    }

    #[test]
    fn test_w3c_date() {
        assert_eq!(w3c_date("2024-03-01 08:00"), Some("2024-03-01T00:00:00Z".to_string()));
        assert_eq!(w3c_date("2024年3月1日"), None);
    }

    #[test]
    fn test_xml_safe() {
        assert_eq!(xml_safe("a\u{0}b\u{1b}c\td"), "abc\td");
    }
}
