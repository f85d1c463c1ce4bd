//! Paragraph line layout.
//!
//! Breaks a paragraph into lines of measured boxes for a given width and
//! document grid. Formatting comes from the resolved paragraph and run
//! properties of [`crate::docx`]; character advances come from a
//! [`CharMeasure`] implementation.
//!
//! # Example
//!
//! ```
//! use longan::docx::{Document, Paragraph};
//! use longan::layout::LayoutOptions;
//!
//! let mut doc = Document::new();
//! let id = doc.add_paragraph(Paragraph::with_text("Hello"));
//! let layout = doc.layout_paragraph(id, &LayoutOptions::default()).unwrap();
//! assert_eq!(layout.lines.len(), 1);
//! assert_eq!(layout.lines[0].text(), "Hello");
//! ```

pub mod geometry;
pub mod grid;
pub mod item;
pub mod line;
pub mod measure;
pub mod options;
pub mod paragraph;

pub use geometry::Margin;
pub use grid::DocGrid;
pub use item::{ItemContent, LineItem};
pub use line::{LineBuilder, LineMetrics, ParagraphLine};
pub use measure::{ApproximateMeasure, CharMeasure};
pub use options::LayoutOptions;
pub use paragraph::{ParagraphLayout, layout_document, layout_paragraph, layout_paragraph_with};
