//! WordprocessingML object model and formatting resolution.
//!
//! A [`Document`] owns paragraphs, tables, sections, styles, numbering and
//! document defaults. Effective formatting is resolved through a cascade:
//! direct formatting, table style regions, the paragraph style chain, the
//! default paragraph style and finally the document defaults.
//!
//! # Example
//!
//! ```rust
//! use longan::docx::{Document, Paragraph, Style};
//! use longan::docx::enums::{IndentationUnit, Justification, StyleType};
//! use longan::docx::properties::ParagraphProperties;
//!
//! let mut doc = Document::new();
//! let body = ParagraphProperties {
//!     justification: Some(Justification::Center),
//!     ..Default::default()
//! };
//! doc.styles_mut().insert(
//!     Style::new("Body", StyleType::Paragraph).with_paragraph_properties(body),
//! );
//!
//! let id = doc.add_paragraph(Paragraph::with_text("Hello").with_style("Body"));
//! assert_eq!(doc.format(id).justification(), Justification::Center);
//!
//! doc.format_mut(id).set_left_indent(2.0, IndentationUnit::Character)?;
//! assert_eq!(doc.format(id).left_indent().value, 2.0);
//! # Ok::<(), longan::Error>(())
//! ```

pub mod document;
pub mod enums;
pub mod format;
pub mod numbering;
pub mod paragraph;
pub mod paragraph_format;
pub mod properties;
pub mod reader;
pub mod resolve;
pub mod section;
pub mod styles;
pub mod table;
pub mod writer;

pub use document::{Block, DocDefaults, Document};
pub use format::{Indentation, LineSpacing, Spacing, SpecialIndentation};
pub use numbering::{AbstractNum, Num, Numbering, NumberingLevel};
pub use paragraph::{
    Break, DocumentObject, FieldReference, Paragraph, ParagraphId, ParagraphItem, Picture,
    TextMatch, TextRun,
};
pub use paragraph_format::{
    CharacterFormat, CharacterFormatMut, ListLabel, ParagraphFormat, ParagraphFormatMut,
};
pub use properties::{
    ParagraphProperties, ParagraphPropertyKey, PropertyValue, RunProperties, RunPropertyKey,
};
pub use reader::{read_document_into, read_numbering, read_styles};
pub use resolve::{PropertyResolver, ResolutionContext};
pub use section::{GridSettings, PageMargins, Section};
pub use styles::{BaseChain, Style, StyleTable, TableRegionStyle};
pub use table::{CellWidth, Table, TableCell, TableId, TableLook, TableRow};
pub use writer::{write_document, write_paragraph, write_paragraph_properties, write_run_properties};
