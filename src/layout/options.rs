use crate::common::unit::{DEFAULT_DPI, DEFAULT_FONT_SIZE_PT, LINE_SPACING_UNIT, pt_to_px};

/// Configuration for paragraph layout.
///
/// These options control the constants the layout engine needs but the
/// document does not carry: output resolution, the nominal line height used
/// for line-based spacing without a grid, the natural line height of text,
/// and how a tab after a list label is rendered.
///
/// # Examples
///
/// ```rust
/// use longan::layout::LayoutOptions;
///
/// // Create with defaults
/// let options = LayoutOptions::default();
/// assert_eq!(options.dpi, 96.0);
///
/// // Or customize
/// let options = LayoutOptions::new()
///     .with_dpi(144.0)
///     .with_tab_suffix("\t");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutOptions {
    /// Output resolution in pixels per inch
    pub dpi: f64,
    /// Height of one "line" of before/after spacing when no grid is set, in points
    pub nominal_line_height_pt: f64,
    /// Font size used when neither styles nor defaults set one, in points
    pub default_font_size_pt: f64,
    /// Text appended to a list label whose level suffix is a tab
    pub tab_suffix: String,
    /// Natural line height of text as a multiple of the font size
    pub line_height_ratio: f64,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            dpi: DEFAULT_DPI,
            nominal_line_height_pt: LINE_SPACING_UNIT,
            default_font_size_pt: DEFAULT_FONT_SIZE_PT,
            tab_suffix: "    ".to_string(),
            line_height_ratio: 1.2,
        }
    }
}

impl LayoutOptions {
    /// Create a new `LayoutOptions` with default values.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the output resolution.
    ///
    /// Non-positive values fall back to 96 DPI.
    #[inline]
    pub fn with_dpi(mut self, dpi: f64) -> Self {
        self.dpi = if dpi > 0.0 {
            dpi
        } else {
            DEFAULT_DPI
        };
        self
    }

    /// Set the nominal line height for line-based spacing without a grid.
    #[inline]
    pub fn with_nominal_line_height(mut self, points: f64) -> Self {
        self.nominal_line_height_pt = points;
        self
    }

    /// Set the fallback font size.
    #[inline]
    pub fn with_default_font_size(mut self, points: f64) -> Self {
        self.default_font_size_pt = points;
        self
    }

    /// Set the text that replaces a tab suffix after a list label.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use longan::layout::LayoutOptions;
    ///
    /// let options = LayoutOptions::new().with_tab_suffix("  ");
    /// assert_eq!(options.tab_suffix, "  ");
    /// ```
    #[inline]
    pub fn with_tab_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.tab_suffix = suffix.into();
        self
    }

    /// Set the natural line height ratio.
    #[inline]
    pub fn with_line_height_ratio(mut self, ratio: f64) -> Self {
        self.line_height_ratio = ratio;
        self
    }

    /// Convert points to pixels at the configured resolution.
    #[inline]
    pub fn px(&self, points: f64) -> f64 {
        pt_to_px(points, self.dpi)
    }
}
