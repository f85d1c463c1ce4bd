//! Document grid conversions.
//!
//! A section's `w:docGrid` changes how character-based lengths become
//! pixels. With a character grid, one character of indentation is one
//! character pitch; with snapping, lengths are rounded up to whole pitches.
//! All values here are in pixels.
use crate::docx::enums::{DocGridType, LineSpacingRule};
use crate::docx::format::LineSpacing;
use serde::{Deserialize, Serialize};

/// Resolved grid of a section, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DocGrid {
    pub grid_type: DocGridType,
    /// Character pitch in pixels
    pub char_pitch: f64,
    /// Line pitch in pixels
    pub line_pitch: f64,
}

impl Default for DocGrid {
    fn default() -> Self {
        Self::none()
    }
}

impl DocGrid {
    #[inline]
    pub const fn new(grid_type: DocGridType, char_pitch: f64, line_pitch: f64) -> Self {
        Self {
            grid_type,
            char_pitch,
            line_pitch,
        }
    }

    /// No grid: character lengths follow the font size.
    #[inline]
    pub const fn none() -> Self {
        Self::new(DocGridType::None, 0.0, 0.0)
    }

    /// Round `value` up to a whole number of character pitches.
    ///
    /// Zero stays zero; a non-positive pitch leaves the value unchanged.
    #[inline]
    pub fn snap(&self, value: f64) -> f64 {
        if self.char_pitch <= 0.0 {
            return value;
        }
        (value / self.char_pitch).ceil() * self.char_pitch
    }

    /// Left or right indentation given in characters.
    pub fn chars_indent(&self, chars: f64, normal_font_px: f64) -> f64 {
        match self.grid_type {
            DocGridType::LinesAndChars => self.char_pitch * chars,
            DocGridType::SnapToChars => self.char_pitch * chars.ceil(),
            DocGridType::None | DocGridType::Lines => normal_font_px * chars,
        }
    }

    /// Left or right indentation given in points, already in pixels.
    pub fn points_indent(&self, px: f64) -> f64 {
        match self.grid_type {
            DocGridType::SnapToChars => self.snap(px),
            _ => px,
        }
    }

    /// Magnitude of a first-line or hanging indentation given in characters.
    ///
    /// On a character grid a character is one pitch plus however much the
    /// first character is larger than normal text.
    pub fn chars_special_indent(&self, chars: f64, first_char_px: f64, normal_font_px: f64) -> f64 {
        let per_char = self.char_pitch + (first_char_px - normal_font_px);
        match self.grid_type {
            DocGridType::LinesAndChars => per_char * chars,
            DocGridType::SnapToChars => self.snap(per_char * chars),
            DocGridType::None | DocGridType::Lines => first_char_px * chars,
        }
    }

    /// Magnitude of a first-line or hanging indentation given in points,
    /// already in pixels.
    pub fn points_special_indent(&self, px: f64) -> f64 {
        self.points_indent(px)
    }

    /// Height of one line of before/after spacing.
    ///
    /// On a line grid a multiple scales the line pitch and an exact or
    /// minimum height is used as is (`value_px` is the line spacing value in
    /// pixels). Without a line grid the nominal height applies.
    pub fn spacing_line_height(
        &self,
        line_spacing: LineSpacing,
        value_px: f64,
        nominal_px: f64,
    ) -> f64 {
        if !self.grid_type.has_line_grid() {
            return nominal_px;
        }
        match line_spacing.rule {
            LineSpacingRule::Multiple => self.line_pitch * line_spacing.value,
            LineSpacingRule::Exact | LineSpacingRule::AtLeast => value_px,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn grid(grid_type: DocGridType) -> DocGrid {
        DocGrid::new(grid_type, 12.0, 20.0)
    }

    #[test]
    fn test_snap() {
        let g = grid(DocGridType::SnapToChars);
        assert_eq!(g.snap(10.0), 12.0);
        assert_eq!(g.snap(12.0), 12.0);
        assert_eq!(g.snap(12.5), 24.0);
        assert_eq!(g.snap(0.0), 0.0);
        assert_eq!(DocGrid::none().snap(7.0), 7.0);
    }

    #[test]
    fn test_chars_indent() {
        assert_eq!(grid(DocGridType::LinesAndChars).chars_indent(1.5, 14.0), 18.0);
        assert_eq!(grid(DocGridType::SnapToChars).chars_indent(1.5, 14.0), 24.0);
        assert_eq!(grid(DocGridType::Lines).chars_indent(2.0, 14.0), 28.0);
        assert_eq!(grid(DocGridType::None).chars_indent(2.0, 14.0), 28.0);
    }

    #[test]
    fn test_points_indent() {
        assert_eq!(grid(DocGridType::SnapToChars).points_indent(10.0), 12.0);
        assert_eq!(grid(DocGridType::LinesAndChars).points_indent(10.0), 10.0);
    }

    #[test]
    fn test_chars_special_indent() {
        // first character 2px larger than normal text
        let lc = grid(DocGridType::LinesAndChars);
        assert_eq!(lc.chars_special_indent(2.0, 16.0, 14.0), 28.0);
        let snap = grid(DocGridType::SnapToChars);
        assert_eq!(snap.chars_special_indent(2.0, 16.0, 14.0), 36.0);
        let none = DocGrid::none();
        assert_eq!(none.chars_special_indent(2.0, 16.0, 14.0), 32.0);
    }

    #[test]
    fn test_spacing_line_height() {
        let single = LineSpacing::new(1.0, LineSpacingRule::Multiple);
        let one_and_half = LineSpacing::new(1.5, LineSpacingRule::Multiple);
        let exact = LineSpacing::new(30.0, LineSpacingRule::Exact);
        let lines = grid(DocGridType::Lines);
        assert_eq!(lines.spacing_line_height(single, 1.0, 16.0), 20.0);
        assert_eq!(lines.spacing_line_height(one_and_half, 1.5, 16.0), 30.0);
        assert_eq!(lines.spacing_line_height(exact, 40.0, 16.0), 40.0);
        assert_eq!(grid(DocGridType::None).spacing_line_height(exact, 40.0, 16.0), 16.0);
    }

    proptest! {
        #[test]
        fn prop_snap_is_smallest_multiple_not_below(value in 0.0f64..1000.0, pitch in 1.0f64..50.0) {
            let g = DocGrid::new(DocGridType::SnapToChars, pitch, 0.0);
            let snapped = g.snap(value);
            prop_assert!(snapped >= value - 1e-9);
            prop_assert!(snapped - value < pitch + 1e-9);
            let steps = snapped / pitch;
            prop_assert!((steps - steps.round()).abs() < 1e-6);
        }
    }
}
