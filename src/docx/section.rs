/// Section - page setup and document grid of a run of body content.
use crate::common::unit::{CHAR_SPACE_DIVISOR, pt_to_px};
use crate::docx::enums::{DocGridType, SectionBreakType};
use crate::layout::grid::DocGrid;
use serde::{Deserialize, Serialize};

/// Letter paper, Word's built-in fallback when `w:pgSz` is absent.
const DEFAULT_PAGE_WIDTH_PT: f64 = 612.0;
const DEFAULT_PAGE_HEIGHT_PT: f64 = 792.0;
const DEFAULT_MARGIN_PT: f64 = 72.0;
/// Line pitch used when `w:docGrid` has no `w:linePitch` (360 twips).
pub const DEFAULT_LINE_PITCH_PT: f64 = 18.0;

/// Page margins for a section, in points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageMargins {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
    /// Header distance from top edge
    pub header: f64,
    /// Footer distance from bottom edge
    pub footer: f64,
    /// Gutter margin (for binding)
    pub gutter: f64,
}

impl Default for PageMargins {
    fn default() -> Self {
        Self {
            top: DEFAULT_MARGIN_PT,
            right: DEFAULT_MARGIN_PT,
            bottom: DEFAULT_MARGIN_PT,
            left: DEFAULT_MARGIN_PT,
            header: 36.0,
            footer: 36.0,
            gutter: 0.0,
        }
    }
}

/// Raw `w:docGrid` settings as stored in the section.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GridSettings {
    pub grid_type: DocGridType,
    /// `w:linePitch`, in points
    pub line_pitch: Option<f64>,
    /// `w:charSpace`, in 4096ths of a point over the default font size
    pub char_space: Option<i64>,
}

/// A section of a Word document.
///
/// Represents a `<w:sectPr>` element: page size, margins, break type and
/// document grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub page_width: f64,
    pub page_height: f64,
    pub margins: PageMargins,
    /// Kind of break that starts this section (`w:type`); `None` is next page.
    pub break_type: Option<SectionBreakType>,
    pub grid: GridSettings,
}

impl Default for Section {
    fn default() -> Self {
        Self {
            page_width: DEFAULT_PAGE_WIDTH_PT,
            page_height: DEFAULT_PAGE_HEIGHT_PT,
            margins: PageMargins::default(),
            break_type: None,
            grid: GridSettings::default(),
        }
    }
}

impl Section {
    pub fn new() -> Self {
        Self::default()
    }

    /// Width available to body text, in points.
    #[inline]
    pub fn content_width(&self) -> f64 {
        (self.page_width - self.margins.left - self.margins.right - self.margins.gutter).max(0.0)
    }

    /// Section start type, defaulting to a new page.
    #[inline]
    pub fn start_type(&self) -> SectionBreakType {
        self.break_type.unwrap_or_default()
    }

    /// Character pitch in points for the given default font size.
    ///
    /// Word stores the pitch as a delta over the default paragraph font size.
    pub fn char_pitch_pt(&self, default_font_size_pt: f64) -> f64 {
        default_font_size_pt + self.grid.char_space.unwrap_or(0) as f64 / CHAR_SPACE_DIVISOR
    }

    /// Line pitch in points.
    #[inline]
    pub fn line_pitch_pt(&self) -> f64 {
        self.grid.line_pitch.unwrap_or(DEFAULT_LINE_PITCH_PT)
    }

    /// Layout grid of this section in pixels at the given DPI.
    pub fn doc_grid(&self, default_font_size_pt: f64, dpi: f64) -> DocGrid {
        DocGrid::new(
            self.grid.grid_type,
            pt_to_px(self.char_pitch_pt(default_font_size_pt), dpi),
            pt_to_px(self.line_pitch_pt(), dpi),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_width() {
        let mut s = Section::new();
        assert_eq!(s.content_width(), 468.0);
        s.margins.gutter = 18.0;
        assert_eq!(s.content_width(), 450.0);
        s.margins.left = 1000.0;
        assert_eq!(s.content_width(), 0.0);
    }

    #[test]
    fn test_char_pitch_from_char_space() {
        let mut s = Section::new();
        assert_eq!(s.char_pitch_pt(10.5), 10.5);
        s.grid.char_space = Some(4096);
        assert_eq!(s.char_pitch_pt(10.5), 11.5);
        s.grid.char_space = Some(-2048);
        assert_eq!(s.char_pitch_pt(10.5), 10.0);
    }

    #[test]
    fn test_doc_grid_pixels() {
        let mut s = Section::new();
        s.grid = GridSettings {
            grid_type: DocGridType::LinesAndChars,
            line_pitch: Some(15.6),
            char_space: Some(0),
        };
        let grid = s.doc_grid(12.0, 96.0);
        assert_eq!(grid.grid_type, DocGridType::LinesAndChars);
        assert!((grid.char_pitch - 16.0).abs() < 1e-9);
        assert!((grid.line_pitch - 20.8).abs() < 1e-9);
    }
}
