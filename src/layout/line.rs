//! Line building.
//!
//! A [`LineBuilder`] fills lines greedily: an item goes on the current line
//! if it fits in the remaining width, otherwise the line is closed and a new
//! one started. An empty line accepts any item, so an item wider than the
//! available width gets a line of its own instead of looping forever.
use crate::docx::enums::LineSpacingRule;
use crate::layout::geometry::Margin;
use crate::layout::item::LineItem;
use serde::{Deserialize, Serialize};

/// Tolerance for width and pitch comparisons, in pixels.
const EPSILON: f64 = 1e-9;

/// One laid-out line of a paragraph, in pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParagraphLine {
    /// Width given to the line, before its own padding
    pub width: f64,
    /// Paragraph spacing carried by this line (top for the first, bottom for the last)
    pub margin: Margin,
    /// First-line or hanging offset of this line
    pub padding: Margin,
    pub items: Vec<LineItem>,
    pub ends_with_page_break: bool,
    /// Line height after line spacing
    pub height: f64,
}

impl ParagraphLine {
    pub fn new(width: f64) -> Self {
        Self {
            width,
            margin: Margin::zero(),
            padding: Margin::zero(),
            items: Vec::new(),
            ends_with_page_break: false,
            height: 0.0,
        }
    }

    /// Width left for items once padding is taken off.
    #[inline]
    pub fn available_width(&self) -> f64 {
        (self.width - self.padding.horizontal()).max(0.0)
    }

    /// Sum of item widths.
    pub fn used_width(&self) -> f64 {
        self.items.iter().map(|i| i.width).sum()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Height including the margins.
    #[inline]
    pub fn outer_height(&self) -> f64 {
        self.margin.top + self.height + self.margin.bottom
    }

    /// Characters on the line; pictures are skipped.
    pub fn text(&self) -> String {
        self.items.iter().filter_map(LineItem::as_char).collect()
    }
}

/// How tall a line is, given its items.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineMetrics {
    pub rule: LineSpacingRule,
    /// Factor for `Multiple`, pixels for `Exact` and `AtLeast`
    pub value: f64,
    /// Line pitch to snap natural heights to, when the paragraph follows a line grid
    pub grid_pitch: Option<f64>,
    /// Natural height of a line without items
    pub empty_height: f64,
}

impl LineMetrics {
    /// Height of a line whose tallest item is `tallest` pixels.
    pub fn height(&self, tallest: f64) -> f64 {
        let natural = match self.grid_pitch {
            Some(pitch) if pitch > 0.0 => ((tallest / pitch) - EPSILON).ceil().max(1.0) * pitch,
            _ => tallest,
        };
        match self.rule {
            LineSpacingRule::Multiple => natural * self.value,
            LineSpacingRule::Exact => self.value,
            LineSpacingRule::AtLeast => self.value.max(natural),
        }
    }
}

/// Greedy line filler for one paragraph.
#[derive(Debug, Clone)]
pub struct LineBuilder {
    width: f64,
    /// Signed special indentation: positive first-line, negative hanging
    special_indent: f64,
    metrics: LineMetrics,
    current: ParagraphLine,
    lines: Vec<ParagraphLine>,
}

impl LineBuilder {
    /// Start the first line of a paragraph whose content is `width` pixels wide.
    pub fn new(width: f64, special_indent: f64, metrics: LineMetrics) -> Self {
        let mut builder = Self {
            width,
            special_indent,
            metrics,
            current: ParagraphLine::new(width),
            lines: Vec::new(),
        };
        builder.current = builder.first_line();
        builder
    }

    fn first_line(&self) -> ParagraphLine {
        let mut line = ParagraphLine::new(self.width);
        if self.special_indent > 0.0 {
            line.padding.left = self.special_indent;
        }
        line
    }

    fn continuation_line(&self) -> ParagraphLine {
        let mut line = ParagraphLine::new(self.width);
        if self.special_indent < 0.0 {
            line.padding.left = self.special_indent.abs();
        }
        line
    }

    /// The line being filled.
    #[inline]
    pub fn current(&self) -> &ParagraphLine {
        &self.current
    }

    /// Lines closed so far.
    #[inline]
    pub fn lines(&self) -> &[ParagraphLine] {
        &self.lines
    }

    /// Put `item` on the current line if it fits.
    ///
    /// An empty line always accepts the item.
    pub fn try_append(&mut self, item: &LineItem) -> bool {
        let fits = self.current.used_width() + item.width
            <= self.current.available_width() + EPSILON;
        if fits || self.current.is_empty() {
            self.current.items.push(item.clone());
            true
        } else {
            false
        }
    }

    /// Put `item` on the current line, wrapping as needed.
    pub fn append(&mut self, item: LineItem) {
        while !self.try_append(&item) {
            self.wrap();
        }
    }

    /// Close the current line and continue on a new one.
    pub fn wrap(&mut self) {
        let next = self.continuation_line();
        let line = self.finish_line(next);
        self.lines.push(line);
    }

    /// Handle a page break item.
    ///
    /// The current line is marked; a break that is the paragraph's last item
    /// does not open a new line, and one that is its first item opens a line
    /// that still carries the first-line indentation.
    pub fn page_break(&mut self, is_first: bool, is_last: bool) {
        self.current.ends_with_page_break = true;
        if is_last {
            return;
        }
        let next = if is_first {
            self.first_line()
        } else {
            self.continuation_line()
        };
        let line = self.finish_line(next);
        self.lines.push(line);
    }

    /// Close the current line, replacing it with `next`, and return it with
    /// its height computed.
    pub fn finish_line(&mut self, next: ParagraphLine) -> ParagraphLine {
        let mut line = std::mem::replace(&mut self.current, next);
        let tallest = line
            .items
            .iter()
            .map(|i| i.height)
            .reduce(f64::max)
            .unwrap_or(self.metrics.empty_height);
        line.height = self.metrics.height(tallest);
        line
    }

    /// Close the last line and return every line.
    pub fn finish(mut self) -> Vec<ParagraphLine> {
        let next = ParagraphLine::new(self.width);
        let last = self.finish_line(next);
        self.lines.push(last);
        self.lines
    }
}
