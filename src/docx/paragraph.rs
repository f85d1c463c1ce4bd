/// Paragraph and paragraph item structures for Word documents.
use crate::common::error::{Error, Result};
use crate::docx::enums::{BreakType, FieldReferenceType};
use crate::docx::properties::{ParagraphProperties, RunProperties};
use crate::docx::section::Section;
use crate::docx::table::TableId;
use aho_corasick::AhoCorasick;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Range;

/// A text run (`<w:r>` with `<w:t>` content).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TextRun {
    pub text: String,
    /// Character style (`w:rStyle`)
    pub style_id: Option<String>,
    /// Direct run formatting
    pub properties: RunProperties,
}

impl TextRun {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    pub fn with_properties(mut self, properties: RunProperties) -> Self {
        self.properties = properties;
        self
    }

    pub fn with_style(mut self, style_id: impl Into<String>) -> Self {
        self.style_id = Some(style_id.into());
        self
    }
}

/// An inline picture (`<w:drawing>` with a `pic:pic` graphic).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Picture {
    /// Width in points
    pub width: f64,
    /// Height in points
    pub height: f64,
    /// Name from `wp:docPr/@name`
    pub name: Option<String>,
    /// Formatting of the owning run
    pub properties: RunProperties,
}

impl Picture {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            ..Default::default()
        }
    }
}

/// A break (`<w:br>`).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Break {
    pub kind: BreakType,
    pub properties: RunProperties,
}

impl Break {
    pub fn new(kind: BreakType) -> Self {
        Self {
            kind,
            properties: RunProperties::default(),
        }
    }

    #[inline]
    pub fn page() -> Self {
        Self::new(BreakType::Page)
    }
}

/// A footnote or endnote reference mark.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldReference {
    pub kind: FieldReferenceType,
    pub id: i64,
    /// Text rendered for the mark, usually the note number
    pub display: String,
    pub properties: RunProperties,
}

/// Content of a paragraph, in document order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ParagraphItem {
    Run(TextRun),
    Picture(Picture),
    Break(Break),
    FieldReference(FieldReference),
}

impl ParagraphItem {
    /// Direct run formatting of the run carrying this item.
    pub fn run_properties(&self) -> &RunProperties {
        match self {
            Self::Run(r) => &r.properties,
            Self::Picture(p) => &p.properties,
            Self::Break(b) => &b.properties,
            Self::FieldReference(f) => &f.properties,
        }
    }

    pub fn run_properties_mut(&mut self) -> &mut RunProperties {
        match self {
            Self::Run(r) => &mut r.properties,
            Self::Picture(p) => &mut p.properties,
            Self::Break(b) => &mut b.properties,
            Self::FieldReference(f) => &mut f.properties,
        }
    }

    /// Character style of the run carrying this item.
    pub fn style_id(&self) -> Option<&str> {
        match self {
            Self::Run(r) => r.style_id.as_deref(),
            _ => None,
        }
    }

    /// Whether this item occupies space on a line.
    #[inline]
    pub fn is_content(&self) -> bool {
        !matches!(self, Self::Break(_))
    }
}

impl From<TextRun> for ParagraphItem {
    fn from(run: TextRun) -> Self {
        Self::Run(run)
    }
}

impl From<Picture> for ParagraphItem {
    fn from(picture: Picture) -> Self {
        Self::Picture(picture)
    }
}

impl From<Break> for ParagraphItem {
    fn from(br: Break) -> Self {
        Self::Break(br)
    }
}

impl From<FieldReference> for ParagraphItem {
    fn from(reference: FieldReference) -> Self {
        Self::FieldReference(reference)
    }
}

/// Index of a paragraph inside its document's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ParagraphId(pub usize);

/// Any object of the document model, for APIs that accept mixed content.
#[derive(Debug, Clone)]
pub enum DocumentObject {
    Paragraph(ParagraphId),
    Table(TableId),
    Section(Section),
    Item(ParagraphItem),
}

impl DocumentObject {
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Paragraph(_) => "Paragraph",
            Self::Table(_) => "Table",
            Self::Section(_) => "Section",
            Self::Item(ParagraphItem::Run(_)) => "TextRun",
            Self::Item(ParagraphItem::Picture(_)) => "Picture",
            Self::Item(ParagraphItem::Break(_)) => "Break",
            Self::Item(ParagraphItem::FieldReference(_)) => "FieldReference",
        }
    }
}

impl TryFrom<DocumentObject> for ParagraphItem {
    type Error = Error;

    fn try_from(obj: DocumentObject) -> Result<Self> {
        match obj {
            DocumentObject::Item(item) => Ok(item),
            other => Err(Error::invalid_argument(format!(
                "{} is not a paragraph item",
                other.type_name()
            ))),
        }
    }
}

/// A paragraph in a Word document.
///
/// Represents a `<w:p>` element: its direct formatting, the formatting of
/// its paragraph mark, its items and, when it ends a section, the section
/// properties it carries.
///
/// # Example
///
/// ```rust
/// use longan::docx::paragraph::{Paragraph, TextRun};
///
/// let mut para = Paragraph::new();
/// para.add_item(TextRun::new("Hello, "));
/// para.add_item(TextRun::new("world"));
/// assert_eq!(para.text(), "Hello, world");
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Paragraph {
    pub(crate) style_id: Option<String>,
    pub(crate) properties: ParagraphProperties,
    pub(crate) mark: RunProperties,
    pub(crate) items: Vec<ParagraphItem>,
    pub(crate) section: Option<Section>,
}

/// A match of [`Paragraph::find`], as a range of character indices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextMatch {
    pub range: Range<usize>,
}

impl Paragraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a paragraph holding a single run of text.
    pub fn with_text(text: impl Into<String>) -> Self {
        let mut para = Self::new();
        para.items.push(ParagraphItem::Run(TextRun::new(text)));
        para
    }

    /// Builder-style setter for the paragraph style.
    pub fn with_style(mut self, style_id: impl Into<String>) -> Self {
        self.style_id = Some(style_id.into());
        self
    }

    /// Builder-style setter for the direct formatting.
    pub fn with_properties(mut self, properties: ParagraphProperties) -> Self {
        self.properties = properties;
        self
    }

    /// Paragraph style id (`w:pStyle`), if any.
    #[inline]
    pub fn style_id(&self) -> Option<&str> {
        self.style_id.as_deref()
    }

    pub fn set_style_id(&mut self, style_id: Option<String>) {
        self.style_id = style_id;
    }

    /// Direct paragraph formatting.
    #[inline]
    pub fn properties(&self) -> &ParagraphProperties {
        &self.properties
    }

    /// Direct formatting of the paragraph mark.
    #[inline]
    pub fn mark_properties(&self) -> &RunProperties {
        &self.mark
    }

    pub fn mark_properties_mut(&mut self) -> &mut RunProperties {
        &mut self.mark
    }

    /// Section properties carried by this paragraph, if it ends a section.
    #[inline]
    pub fn section(&self) -> Option<&Section> {
        self.section.as_ref()
    }

    /// The paragraph's items in document order.
    #[inline]
    pub fn items(&self) -> &[ParagraphItem] {
        &self.items
    }

    /// Append an item.
    pub fn add_item(&mut self, item: impl Into<ParagraphItem>) {
        self.items.push(item.into());
    }

    /// Insert an item before `index`; `index == len` appends.
    pub fn insert_item(&mut self, index: usize, item: impl Into<ParagraphItem>) -> Result<()> {
        if index > self.items.len() {
            return Err(Error::invalid_argument(format!(
                "item index {} out of range for paragraph with {} items",
                index,
                self.items.len()
            )));
        }
        self.items.insert(index, item.into());
        Ok(())
    }

    /// Append an arbitrary document object, which must be a paragraph item.
    pub fn add_object(&mut self, obj: DocumentObject) -> Result<()> {
        let item = ParagraphItem::try_from(obj)?;
        self.items.push(item);
        Ok(())
    }

    /// Insert an arbitrary document object, which must be a paragraph item.
    pub fn insert_object(&mut self, index: usize, obj: DocumentObject) -> Result<()> {
        let item = ParagraphItem::try_from(obj)?;
        self.insert_item(index, item)
    }

    /// Remove and return the item at `index`.
    pub fn remove_item(&mut self, index: usize) -> Result<ParagraphItem> {
        if index >= self.items.len() {
            return Err(Error::invalid_argument(format!(
                "item index {} out of range for paragraph with {} items",
                index,
                self.items.len()
            )));
        }
        Ok(self.items.remove(index))
    }

    /// Get the text content of this paragraph.
    ///
    /// Concatenates the text of all runs.
    pub fn text(&self) -> String {
        let mut out = String::new();
        for item in &self.items {
            if let ParagraphItem::Run(run) = item {
                out.push_str(&run.text);
            }
        }
        out
    }

    /// Replace every text run with a single run holding `text`.
    ///
    /// Pictures, breaks and note references are kept.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.items.retain(|item| !matches!(item, ParagraphItem::Run(_)));
        self.items.push(ParagraphItem::Run(TextRun::new(text)));
    }

    /// Whether the paragraph has anything that occupies a line besides breaks.
    pub fn has_content(&self) -> bool {
        self.items.iter().any(|item| match item {
            ParagraphItem::Run(run) => !run.text.is_empty(),
            ParagraphItem::Picture(_) | ParagraphItem::FieldReference(_) => true,
            ParagraphItem::Break(_) => false,
        })
    }

    /// Find the first occurrence of `pattern` in the paragraph text.
    pub fn find(&self, pattern: &str) -> Result<Option<TextMatch>> {
        Ok(self.find_all(pattern)?.into_iter().next())
    }

    /// Find all non-overlapping occurrences of `pattern` in the paragraph text.
    pub fn find_all(&self, pattern: &str) -> Result<Vec<TextMatch>> {
        if pattern.is_empty() {
            return Ok(Vec::new());
        }
        let text = self.text();
        let matcher = AhoCorasick::new([pattern])
            .map_err(|e| Error::invalid_argument(format!("invalid search pattern: {}", e)))?;
        Ok(char_ranges(&text, matcher.find_iter(&text).map(|m| m.range())))
    }

    /// Find the first match of a regular expression in the paragraph text.
    pub fn find_regex(&self, pattern: &Regex) -> Option<TextMatch> {
        let text = self.text();
        let m = pattern.find(&text)?;
        char_ranges(&text, std::iter::once(m.range())).pop()
    }

    /// Find all non-overlapping matches of a regular expression in the
    /// paragraph text.
    pub fn find_all_regex(&self, pattern: &Regex) -> Vec<TextMatch> {
        let text = self.text();
        char_ranges(&text, pattern.find_iter(&text).map(|m| m.range()))
    }
}

/// Convert ascending, non-overlapping byte ranges of `text` into character
/// ranges.
fn char_ranges(text: &str, byte_ranges: impl Iterator<Item = Range<usize>>) -> Vec<TextMatch> {
    let mut matches = Vec::new();
    let mut chars_before = 0usize;
    let mut scanned = 0usize;
    for range in byte_ranges {
        chars_before += text[scanned..range.start].chars().count();
        let len = text[range.clone()].chars().count();
        matches.push(TextMatch {
            range: chars_before..chars_before + len,
        });
        chars_before += len;
        scanned = range.end;
    }
    matches
}

impl fmt::Display for Paragraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text())
    }
}
