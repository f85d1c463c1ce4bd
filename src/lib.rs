//! Longan - formatting resolution and paragraph layout for WordprocessingML
//!
//! This library provides an object model for Word (.docx) document content,
//! resolves the effective formatting of paragraphs and runs the way Word
//! does, and lays paragraphs out into lines of measured boxes.
//!
//! # Features
//!
//! - **Formatting cascade**: direct formatting, table style regions, style
//!   inheritance chains and document defaults, with cycle-safe base chains
//! - **Editing**: typed getters and setters for indentation, spacing, line
//!   spacing and numbering that keep Word's paired unit storage consistent
//! - **Line layout**: greedy line breaking with document grid snapping,
//!   first-line and hanging indentation, list labels and page breaks
//! - **XML parts**: readers for `styles.xml`, `numbering.xml` and
//!   `document.xml`, and a writer for the body
//!
//! # Example - Resolving formatting
//!
//! ```rust
//! use longan::docx::{Document, Paragraph};
//! use longan::docx::enums::{SpacingUnit, LineSpacingRule};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut doc = Document::new();
//! let id = doc.add_paragraph(Paragraph::with_text("Hello, world"));
//!
//! doc.format_mut(id).set_before_spacing(0.5, SpacingUnit::Line)?;
//! doc.format_mut(id).set_line_spacing(1.5, LineSpacingRule::Multiple)?;
//!
//! let format = doc.format(id);
//! assert_eq!(format.before_spacing().value, 0.5);
//! assert_eq!(format.line_spacing().value, 1.5);
//! # Ok(())
//! # }
//! ```
//!
//! # Example - Laying out a paragraph
//!
//! ```rust
//! use longan::docx::{Document, Paragraph};
//! use longan::layout::LayoutOptions;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut doc = Document::new();
//! let id = doc.add_paragraph(Paragraph::with_text("Lines are filled greedily."));
//!
//! let layout = doc.layout_paragraph(id, &LayoutOptions::default())?;
//! for line in &layout.lines {
//!     println!("{:>6.1}px  {}", line.height, line.text());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Example - Reading document parts
//!
//! ```no_run
//! use longan::docx::Document;
//! use longan::layout::{LayoutOptions, layout_document};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let document = std::fs::read("word/document.xml")?;
//! let styles = std::fs::read("word/styles.xml")?;
//! let doc = Document::from_xml_parts(&document, Some(&styles), None)?;
//!
//! let layouts = layout_document(&doc, &LayoutOptions::default())?;
//! println!("{} paragraphs laid out", layouts.len());
//! # Ok(())
//! # }
//! ```

/// Shared error and unit types
pub mod common;

/// WordprocessingML object model and formatting resolution
///
/// Paragraphs, runs, tables, sections, styles and numbering, plus the
/// property cascade and the paragraph/character format editors.
pub mod docx;

/// Paragraph line layout
pub mod layout;

// Re-export commonly used types for convenience
pub use common::{Error, Result};
pub use docx::{Document, Paragraph, ParagraphId, ResolutionContext};
pub use layout::{LayoutOptions, ParagraphLayout};
