//! Character measurement.
//!
//! The layout engine never reads font files. It asks a [`CharMeasure`] for
//! the advance of each character and the natural height of a line of text;
//! [`ApproximateMeasure`] answers from fixed ratios, treating East Asian
//! wide characters as square and everything else as half as wide.
use crate::docx::enums::DocGridType;
use crate::layout::grid::DocGrid;

/// Source of character advances and line heights, in pixels.
pub trait CharMeasure {
    /// Advance width of `c` set at `font_px`.
    ///
    /// `normal_font_px` is the size of normal text, which the character grid
    /// is defined against.
    fn char_width(&self, c: char, font_px: f64, grid: &DocGrid, normal_font_px: f64) -> f64;

    /// Natural height of a line of text set at `font_px`.
    fn line_height(&self, font_px: f64) -> f64;
}

/// Fixed-ratio character measurement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ApproximateMeasure {
    /// Width of a narrow character relative to a wide one
    pub narrow_ratio: f64,
    /// Line height relative to the font size
    pub line_height_ratio: f64,
}

impl Default for ApproximateMeasure {
    fn default() -> Self {
        Self {
            narrow_ratio: 0.5,
            line_height_ratio: 1.2,
        }
    }
}

impl ApproximateMeasure {
    pub fn new(line_height_ratio: f64) -> Self {
        Self {
            line_height_ratio,
            ..Default::default()
        }
    }

    /// Advance of a full-width character, with the grid applied.
    fn wide_width(&self, font_px: f64, grid: &DocGrid, normal_font_px: f64) -> f64 {
        match grid.grid_type {
            DocGridType::LinesAndChars if grid.char_pitch > 0.0 => {
                grid.char_pitch + (font_px - normal_font_px)
            },
            DocGridType::SnapToChars => grid.snap(font_px),
            _ => font_px,
        }
    }
}

impl CharMeasure for ApproximateMeasure {
    fn char_width(&self, c: char, font_px: f64, grid: &DocGrid, normal_font_px: f64) -> f64 {
        let wide = self.wide_width(font_px, grid, normal_font_px).max(0.0);
        match c {
            '\t' => wide * 2.0,
            c if c.is_control() => 0.0,
            c if is_wide(c) => wide,
            _ => wide * self.narrow_ratio,
        }
    }

    #[inline]
    fn line_height(&self, font_px: f64) -> f64 {
        font_px * self.line_height_ratio
    }
}

/// Whether a character is East Asian wide or fullwidth.
pub fn is_wide(c: char) -> bool {
    matches!(
        c as u32,
        0x1100..=0x115F
            | 0x2E80..=0x303E
            | 0x3041..=0x33FF
            | 0x3400..=0x4DBF
            | 0x4E00..=0x9FFF
            | 0xA000..=0xA4CF
            | 0xAC00..=0xD7A3
            | 0xF900..=0xFAFF
            | 0xFE30..=0xFE4F
            | 0xFF00..=0xFF60
            | 0xFFE0..=0xFFE6
            | 0x20000..=0x2FFFD
            | 0x30000..=0x3FFFD
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_wide() {
        assert!(is_wide('中'));
        assert!(is_wide('，'));
        assert!(is_wide('한'));
        assert!(!is_wide('a'));
        assert!(!is_wide(' '));
    }

    #[test]
    fn test_widths_without_grid() {
        let m = ApproximateMeasure::default();
        let g = DocGrid::none();
        assert_eq!(m.char_width('中', 14.0, &g, 14.0), 14.0);
        assert_eq!(m.char_width('a', 14.0, &g, 14.0), 7.0);
        assert_eq!(m.char_width('\t', 14.0, &g, 14.0), 28.0);
        assert_eq!(m.char_width('\u{7}', 14.0, &g, 14.0), 0.0);
        assert_eq!(m.line_height(10.0), 12.0);
    }

    #[test]
    fn test_widths_on_grid() {
        let m = ApproximateMeasure::default();
        let chars = DocGrid::new(DocGridType::LinesAndChars, 15.0, 20.0);
        assert_eq!(m.char_width('中', 16.0, &chars, 14.0), 17.0);
        assert_eq!(m.char_width('a', 14.0, &chars, 14.0), 7.5);

        let snap = DocGrid::new(DocGridType::SnapToChars, 15.0, 20.0);
        assert_eq!(m.char_width('中', 16.0, &snap, 14.0), 30.0);
        assert_eq!(m.char_width('中', 14.0, &snap, 14.0), 15.0);
    }
}
