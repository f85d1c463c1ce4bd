//! Paragraph layout.
//!
//! Turns a paragraph of the document model into lines of measured boxes:
//! indentation becomes padding, before/after spacing becomes margins, and the
//! list label, text, pictures and breaks are fed through a [`LineBuilder`].
//! Lengths are resolved in points and converted to pixels here, with the
//! section's document grid applied.
use crate::common::error::Result;
use crate::docx::document::Document;
use crate::docx::enums::{
    BreakType, HorizontalAlignment, IndentationUnit, Justification, LevelSuffix, LineSpacingRule,
    SpacingUnit, SpecialIndentationType,
};
use crate::docx::format::{Indentation, Spacing};
use crate::docx::paragraph::{ParagraphId, ParagraphItem, TextRun};
use crate::docx::properties::RunProperties;
use crate::docx::resolve::PropertyResolver;
use crate::layout::geometry::Margin;
use crate::layout::grid::DocGrid;
use crate::layout::item::LineItem;
use crate::layout::line::{LineBuilder, LineMetrics, ParagraphLine};
use crate::layout::measure::{ApproximateMeasure, CharMeasure};
use crate::layout::options::LayoutOptions;
use serde::{Deserialize, Serialize};

/// A laid-out paragraph, in pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParagraphLayout {
    /// Width the paragraph was laid out in
    pub width: f64,
    /// Before and after spacing; also carried by the first and last line
    pub margin: Margin,
    /// Left and right indentation
    pub padding: Margin,
    pub lines: Vec<ParagraphLine>,
}

impl ParagraphLayout {
    /// Total height: every line with its margins.
    pub fn height(&self) -> f64 {
        self.lines.iter().map(ParagraphLine::outer_height).sum()
    }

    /// Width available to lines once margins and padding are taken off.
    #[inline]
    pub fn content_width(&self) -> f64 {
        (self.width - self.margin.horizontal() - self.padding.horizontal()).max(0.0)
    }

    /// Text of each line.
    pub fn line_texts(&self) -> Vec<String> {
        self.lines.iter().map(ParagraphLine::text).collect()
    }
}

/// Run formatting needed to measure characters, in pixels.
#[derive(Debug, Clone, Copy)]
struct RunMetrics {
    font_px: f64,
    scale: f64,
    spacing_px: f64,
}

/// Per-paragraph state shared by every measured item.
struct Measurer<'a, M: CharMeasure + ?Sized> {
    resolver: PropertyResolver<'a>,
    paragraph: ParagraphId,
    grid: &'a DocGrid,
    options: &'a LayoutOptions,
    measure: &'a M,
    normal_font_px: f64,
    alignment: HorizontalAlignment,
}

impl<M: CharMeasure + ?Sized> Measurer<'_, M> {
    fn font_size_pt(&self, item: Option<usize>) -> f64 {
        self.resolver
            .run_levels(self.paragraph, item)
            .iter()
            .find_map(|level| level.font_size)
            .unwrap_or(self.options.default_font_size_pt)
    }

    fn run_metrics(&self, item: Option<usize>) -> RunMetrics {
        let levels = self.resolver.run_levels(self.paragraph, item);
        let pick = |field: fn(&RunProperties) -> Option<f64>, default: f64| {
            levels.iter().find_map(|level| field(level)).unwrap_or(default)
        };
        RunMetrics {
            font_px: self
                .options
                .px(pick(|r| r.font_size, self.options.default_font_size_pt)),
            scale: pick(|r| r.character_scale, 100.0) / 100.0,
            spacing_px: self.options.px(pick(|r| r.character_spacing, 0.0)),
        }
    }

    fn character(&self, c: char, run: RunMetrics) -> LineItem {
        let advance = self
            .measure
            .char_width(c, run.font_px, self.grid, self.normal_font_px);
        let width = (advance * run.scale + run.spacing_px).max(0.0);
        LineItem::character(c, width, self.measure.line_height(run.font_px))
            .with_alignment(self.alignment)
    }

    fn indent(&self, ind: Indentation) -> f64 {
        match ind.unit {
            IndentationUnit::Character => self.grid.chars_indent(ind.value, self.normal_font_px),
            IndentationUnit::Point => self.grid.points_indent(self.options.px(ind.value)),
        }
    }

    fn spacing(&self, spacing: Spacing, line_px: f64) -> f64 {
        match spacing.unit {
            SpacingUnit::Line => spacing.value * line_px,
            SpacingUnit::Point => self.options.px(spacing.value),
        }
    }
}

fn item_alignment(justification: Justification) -> HorizontalAlignment {
    match justification {
        Justification::Center => HorizontalAlignment::Center,
        Justification::Right => HorizontalAlignment::Right,
        Justification::Left | Justification::Both | Justification::Distribute => {
            HorizontalAlignment::Left
        },
    }
}

/// Lay out a paragraph with [`ApproximateMeasure`].
///
/// `width` is the width available to the paragraph in pixels and `grid` the
/// document grid of its section.
pub fn layout_paragraph(
    doc: &Document,
    paragraph: ParagraphId,
    width: f64,
    grid: &DocGrid,
    options: &LayoutOptions,
) -> Result<ParagraphLayout> {
    let measure = ApproximateMeasure::new(options.line_height_ratio);
    layout_paragraph_with(doc, paragraph, width, grid, options, &measure)
}

/// Lay out a paragraph with a custom character measure.
///
/// Fails only when `paragraph` is not in `doc`; malformed or missing
/// formatting falls back to defaults.
pub fn layout_paragraph_with<M: CharMeasure + ?Sized>(
    doc: &Document,
    paragraph: ParagraphId,
    width: f64,
    grid: &DocGrid,
    options: &LayoutOptions,
    measure: &M,
) -> Result<ParagraphLayout> {
    let para = doc.paragraph(paragraph)?;
    let fmt = doc.format(paragraph);
    let resolver = doc.resolver();
    let normal_font_px = options.px(resolver.normal_font_size_or(options.default_font_size_pt));

    let m = Measurer {
        resolver,
        paragraph,
        grid,
        options,
        measure,
        normal_font_px,
        alignment: item_alignment(fmt.justification()),
    };

    let first_char_px = match para.items.first() {
        Some(ParagraphItem::Run(_) | ParagraphItem::Picture(_)) => options.px(m.font_size_pt(Some(0))),
        _ => options.px(m.font_size_pt(None)),
    };

    let left_px = m.indent(fmt.left_indent());
    let right_px = m.indent(fmt.right_indent());
    let special = fmt.special_indentation();
    let special_magnitude = match special.unit {
        IndentationUnit::Character => {
            grid.chars_special_indent(special.value, first_char_px, normal_font_px)
        },
        IndentationUnit::Point => grid.points_special_indent(options.px(special.value)),
    };
    let special_px = match special.kind {
        SpecialIndentationType::FirstLine => special_magnitude,
        SpecialIndentationType::Hanging => -special_magnitude,
        SpecialIndentationType::None => 0.0,
    };

    let line_spacing = fmt.line_spacing();
    let spacing_line_px = grid.spacing_line_height(
        line_spacing,
        options.px(line_spacing.value),
        options.px(options.nominal_line_height_pt),
    );
    let before_px = m.spacing(fmt.before_spacing(), spacing_line_px);
    let after_px = m.spacing(fmt.after_spacing(), spacing_line_px);

    let margin = Margin::new(0.0, before_px, 0.0, after_px);
    let padding = Margin::new(left_px, 0.0, right_px, 0.0);
    let content_width = (width - margin.horizontal() - padding.horizontal()).max(0.0);

    let mark = m.run_metrics(None);
    let snaps_to_grid =
        fmt.snap_to_grid() && grid.grid_type.has_line_grid() && grid.line_pitch > 0.0;
    let metrics = LineMetrics {
        rule: line_spacing.rule,
        value: match line_spacing.rule {
            LineSpacingRule::Multiple => line_spacing.value,
            LineSpacingRule::Exact | LineSpacingRule::AtLeast => options.px(line_spacing.value),
        },
        grid_pitch: snaps_to_grid.then_some(grid.line_pitch),
        empty_height: measure.line_height(mark.font_px),
    };
    let mut builder = LineBuilder::new(content_width, special_px, metrics);

    if let Some(label) = doc.list_label(paragraph)?
        && !label.text.is_empty()
    {
        let suffix = match label.suffix {
            LevelSuffix::Tab => options.tab_suffix.as_str(),
            LevelSuffix::Space => " ",
            LevelSuffix::Nothing => "",
        };
        for c in label.text.chars().chain(suffix.chars()) {
            builder.append(m.character(c, mark));
        }
    }

    // An empty paragraph still occupies one line, sized by its mark.
    let placeholder;
    let mut items: Vec<(Option<usize>, &ParagraphItem)> =
        Vec::with_capacity(para.items.len() + 1);
    if !para.has_content() {
        placeholder = ParagraphItem::Run(TextRun::new(" "));
        items.push((None, &placeholder));
    }
    items.extend(para.items.iter().enumerate().map(|(i, item)| (Some(i), item)));

    let last = items.len().saturating_sub(1);
    for (pos, (index, item)) in items.iter().enumerate() {
        match item {
            ParagraphItem::Run(run) => {
                let metrics = m.run_metrics(*index);
                for c in run.text.chars() {
                    builder.append(m.character(c, metrics));
                }
            },
            ParagraphItem::FieldReference(field) => {
                let metrics = m.run_metrics(*index);
                for c in field.display.chars() {
                    builder.append(m.character(c, metrics));
                }
            },
            ParagraphItem::Picture(picture) => {
                builder.append(
                    LineItem::picture(
                        picture.name.clone(),
                        options.px(picture.width),
                        options.px(picture.height),
                    )
                    .with_alignment(m.alignment),
                );
            },
            ParagraphItem::Break(br) => match br.kind {
                BreakType::Page => builder.page_break(pos == 0, pos == last),
                BreakType::Column | BreakType::TextWrapping => builder.wrap(),
            },
        }
    }

    let mut lines = builder.finish();
    if let Some(first) = lines.first_mut() {
        first.margin.top = before_px;
    }
    if let Some(last) = lines.last_mut() {
        last.margin.bottom = after_px;
    }
    log::trace!("paragraph {} laid out in {} lines", paragraph.0, lines.len());

    Ok(ParagraphLayout {
        width,
        margin,
        padding,
        lines,
    })
}

impl Document {
    /// Lay out a paragraph in the content width of its section (or of its
    /// table cell), using the section's document grid.
    pub fn layout_paragraph(
        &self,
        paragraph: ParagraphId,
        options: &LayoutOptions,
    ) -> Result<ParagraphLayout> {
        let section = self.owning_section(paragraph).cloned().unwrap_or_default();
        let normal_font = self
            .resolver()
            .normal_font_size_or(options.default_font_size_pt);
        let grid = section.doc_grid(normal_font, options.dpi);

        let width_pt = match self.table_containing(paragraph) {
            Some((table, row, col)) => self
                .table(table)?
                .cell_width(row, col)
                .unwrap_or_else(|| section.content_width()),
            None => section.content_width(),
        };
        layout_paragraph(self, paragraph, options.px(width_pt), &grid, options)
    }
}

/// Lay out every paragraph of the body in document order.
pub fn layout_document(doc: &Document, options: &LayoutOptions) -> Result<Vec<ParagraphLayout>> {
    doc.paragraph_ids()
        .into_iter()
        .map(|id| doc.layout_paragraph(id, options))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::docx::enums::{DocGridType, FieldReferenceType, NumberFormat, StyleType};
    use crate::docx::numbering::{AbstractNum, Num, NumberingLevel};
    use crate::docx::paragraph::{Break, FieldReference, Paragraph, Picture};
    use crate::docx::styles::Style;
    use proptest::prelude::*;

    /// Normal text is 10.5pt, i.e. 14px; a CJK character is 14px wide and a
    /// line of text 16.8px tall.
    fn base_doc() -> Document {
        let mut doc = Document::new();
        doc.styles_mut()
            .insert(Style::new("Normal", StyleType::Paragraph).with_default(true));
        doc
    }

    fn lay(doc: &Document, id: ParagraphId, width: f64) -> ParagraphLayout {
        layout_paragraph(doc, id, width, &DocGrid::none(), &LayoutOptions::default()).unwrap()
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn test_page_break_splits_lines() {
        let mut doc = base_doc();
        let mut para = Paragraph::with_text("AB");
        para.add_item(Break::page());
        para.add_item(TextRun::new("CD"));
        let id = doc.add_paragraph(para);

        let layout = lay(&doc, id, 600.0);
        assert_eq!(layout.line_texts(), ["AB", "CD"]);
        assert!(layout.lines[0].ends_with_page_break);
        assert!(!layout.lines[1].ends_with_page_break);
    }

    #[test]
    fn test_trailing_page_break_keeps_one_line() {
        let mut doc = base_doc();
        let mut para = Paragraph::with_text("AB");
        para.add_item(Break::page());
        let id = doc.add_paragraph(para);

        let layout = lay(&doc, id, 600.0);
        assert_eq!(layout.lines.len(), 1);
        assert!(layout.lines[0].ends_with_page_break);
    }

    #[test]
    fn test_text_wrapping_break_starts_new_line() {
        let mut doc = base_doc();
        let mut para = Paragraph::with_text("AB");
        para.add_item(Break::new(BreakType::TextWrapping));
        para.add_item(TextRun::new("CD"));
        let id = doc.add_paragraph(para);

        let layout = lay(&doc, id, 600.0);
        assert_eq!(layout.line_texts(), ["AB", "CD"]);
        assert!(!layout.lines[0].ends_with_page_break);
    }

    #[test]
    fn test_empty_paragraph_has_one_line() {
        let mut doc = base_doc();
        let id = doc.add_paragraph(Paragraph::new());
        let layout = lay(&doc, id, 600.0);
        assert_eq!(layout.line_texts(), [" "]);
        assert!(approx(layout.lines[0].height, 16.8));
        assert!(approx(layout.height(), 16.8));
        assert!(doc.paragraph(id).unwrap().items().is_empty());
    }

    #[test]
    fn test_wraps_at_width() {
        let mut doc = base_doc();
        let id = doc.add_paragraph(Paragraph::with_text("一二三四五六七八九十甲乙"));
        let layout = lay(&doc, id, 70.0);
        assert_eq!(layout.line_texts(), ["一二三四五", "六七八九十", "甲乙"]);
        for line in &layout.lines {
            assert!(line.used_width() <= line.available_width() + 1e-6);
        }
    }

    #[test]
    fn test_height_follows_line_spacing() {
        let mut doc = base_doc();
        let id = doc.add_paragraph(Paragraph::with_text("一二三四五六"));
        let single = lay(&doc, id, 42.0);
        assert_eq!(single.lines.len(), 2);
        assert!(approx(single.height(), 2.0 * 16.8));

        doc.format_mut(id)
            .set_line_spacing(2.0, LineSpacingRule::Multiple)
            .unwrap();
        let double = lay(&doc, id, 42.0);
        assert!(approx(double.height(), 2.0 * single.height()));

        doc.format_mut(id)
            .set_line_spacing(30.0, LineSpacingRule::Exact)
            .unwrap();
        let exact = lay(&doc, id, 42.0);
        assert!(approx(exact.height(), 2.0 * 40.0));
    }

    #[test]
    fn test_before_and_after_spacing() {
        let mut doc = base_doc();
        let id = doc.add_paragraph(Paragraph::with_text("一二三四五六"));
        doc.format_mut(id).set_before_spacing(1.0, SpacingUnit::Line).unwrap();
        doc.format_mut(id).set_after_spacing(6.0, SpacingUnit::Point).unwrap();

        let layout = lay(&doc, id, 42.0);
        assert_eq!(layout.margin, Margin::new(0.0, 16.0, 0.0, 8.0));
        assert_eq!(layout.lines[0].margin.top, 16.0);
        assert_eq!(layout.lines[0].margin.bottom, 0.0);
        assert_eq!(layout.lines[1].margin.bottom, 8.0);
        assert!(approx(layout.height(), 16.0 + 2.0 * 16.8 + 8.0));
    }

    #[test]
    fn test_spacing_lines_on_grid() {
        let mut doc = base_doc();
        let id = doc.add_paragraph(Paragraph::with_text("一"));
        doc.format_mut(id).set_before_spacing(0.5, SpacingUnit::Line).unwrap();
        let grid = DocGrid::new(DocGridType::Lines, 14.0, 20.8);
        let layout =
            layout_paragraph(&doc, id, 600.0, &grid, &LayoutOptions::default()).unwrap();
        assert!(approx(layout.margin.top, 10.4));
        // natural 16.8px snaps up to one 20.8px pitch
        assert!(approx(layout.lines[0].height, 20.8));

        doc.format_mut(id).set_snap_to_grid(false).unwrap();
        let layout =
            layout_paragraph(&doc, id, 600.0, &grid, &LayoutOptions::default()).unwrap();
        assert!(approx(layout.lines[0].height, 16.8));
    }

    #[test]
    fn test_indentation_padding() {
        let mut doc = base_doc();
        let id = doc.add_paragraph(Paragraph::with_text("一二三四五六七八"));
        doc.format_mut(id)
            .set_left_indent(2.0, IndentationUnit::Character)
            .unwrap();
        doc.format_mut(id)
            .set_right_indent(18.0, IndentationUnit::Point)
            .unwrap();
        doc.format_mut(id)
            .set_special_indentation(SpecialIndentationType::Hanging, 1.0, IndentationUnit::Character)
            .unwrap();

        let layout = lay(&doc, id, 122.0);
        assert_eq!(layout.padding, Margin::new(28.0, 0.0, 24.0, 0.0));
        assert!(approx(layout.content_width(), 70.0));
        assert_eq!(layout.lines[0].padding.left, 0.0);
        assert_eq!(layout.lines[1].padding.left, 14.0);
        assert_eq!(layout.line_texts(), ["一二三四五", "六七八"]);
    }

    #[test]
    fn test_oversized_character_gets_one_line() {
        let mut doc = base_doc();
        let id = doc.add_paragraph(Paragraph::with_text("中"));
        let layout = lay(&doc, id, 5.0);
        assert_eq!(layout.line_texts(), ["中"]);
    }

    #[test]
    fn test_hanging_points_pad_later_lines() {
        let mut doc = base_doc();
        let id = doc.add_paragraph(Paragraph::with_text("一二三四五六"));
        doc.format_mut(id)
            .set_special_indentation(SpecialIndentationType::Hanging, 5.0, IndentationUnit::Point)
            .unwrap();
        let special = doc.format(id).special_indentation();
        assert_eq!(special.kind, SpecialIndentationType::Hanging);
        assert_eq!(special.value, 5.0);

        // 5pt hanging is 20/3 px; left indent stays at zero
        let layout = lay(&doc, id, 42.0);
        assert_eq!(layout.padding.left, 0.0);
        assert_eq!(layout.lines[0].padding.left, 0.0);
        assert!(approx(layout.lines[1].padding.left, 20.0 / 3.0));
        assert_eq!(layout.line_texts(), ["一二三", "四五", "六"]);
    }

    #[test]
    fn test_first_line_indent_on_snap_grid() {
        let mut doc = base_doc();
        let id = doc.add_paragraph(Paragraph::with_text("一二三"));
        doc.format_mut(id)
            .set_special_indentation(SpecialIndentationType::FirstLine, 7.5, IndentationUnit::Point)
            .unwrap();
        doc.format_mut(id)
            .set_left_indent(7.5, IndentationUnit::Point)
            .unwrap();
        let grid = DocGrid::new(DocGridType::SnapToChars, 12.0, 0.0);
        let layout =
            layout_paragraph(&doc, id, 600.0, &grid, &LayoutOptions::default()).unwrap();
        assert_eq!(layout.padding.left, 12.0);
        assert_eq!(layout.lines[0].padding.left, 12.0);
    }

    #[test]
    fn test_list_label_prefix() {
        let mut doc = base_doc();
        doc.numbering_mut().add_abstract_num(
            AbstractNum::new(0).with_level(NumberingLevel::new(0, NumberFormat::Decimal, "%1.")),
        );
        doc.numbering_mut().add_num(Num {
            id: 3,
            abstract_num_id: 0,
        });
        let first = doc.add_paragraph(Paragraph::with_text("a"));
        let second = doc.add_paragraph(Paragraph::with_text("b"));
        for id in [first, second] {
            doc.format_mut(id).set_numbering(Some((3, 0))).unwrap();
        }

        let layout = lay(&doc, second, 600.0);
        assert_eq!(layout.line_texts(), ["2.    b"]);

        let options = LayoutOptions::new().with_tab_suffix("\t");
        let layout =
            layout_paragraph(&doc, first, 600.0, &DocGrid::none(), &options).unwrap();
        assert_eq!(layout.line_texts(), ["1.\ta"]);
    }

    #[test]
    fn test_pictures_and_field_references() {
        let mut doc = base_doc();
        let mut para = Paragraph::with_text("x");
        para.add_item(Picture::new(36.0, 72.0));
        para.add_item(FieldReference {
            kind: FieldReferenceType::Footnote,
            id: 1,
            display: "1".to_string(),
            properties: RunProperties::default(),
        });
        let id = doc.add_paragraph(para);

        let layout = lay(&doc, id, 600.0);
        assert_eq!(layout.lines.len(), 1);
        let items = &layout.lines[0].items;
        assert_eq!(items.len(), 3);
        assert!(items[1].is_picture());
        assert_eq!(items[1].width, 48.0);
        assert_eq!(layout.lines[0].height, 96.0);
        assert_eq!(items[2].as_char(), Some('1'));
    }

    #[test]
    fn test_alignment_follows_justification() {
        let mut doc = base_doc();
        let id = doc.add_paragraph(Paragraph::with_text("ab"));
        doc.format_mut(id).set_justification(Justification::Center).unwrap();
        let layout = lay(&doc, id, 600.0);
        assert!(layout.lines[0]
            .items
            .iter()
            .all(|i| i.alignment == HorizontalAlignment::Center));
    }

    #[test]
    fn test_document_layout_uses_section_width() {
        let mut doc = base_doc();
        let id = doc.add_paragraph(Paragraph::with_text("text"));
        let layout = doc.layout_paragraph(id, &LayoutOptions::default()).unwrap();
        assert_eq!(layout.width, 624.0);

        let table = doc.add_table(1, 2, 90.0);
        let cell = doc.cell_paragraph(table, 0, 1).unwrap();
        let layout = doc.layout_paragraph(cell, &LayoutOptions::default()).unwrap();
        assert_eq!(layout.width, 120.0);

        assert_eq!(layout_document(&doc, &LayoutOptions::default()).unwrap().len(), 3);
        assert!(doc.layout_paragraph(ParagraphId(99), &LayoutOptions::default()).is_err());
    }

    proptest! {
        #[test]
        fn prop_layout_places_every_character(
            text in "[a-z一-龥 ]{0,80}",
            width in 0.0f64..300.0,
            breaks in proptest::collection::vec(0usize..80, 0..4),
        ) {
            let mut doc = base_doc();
            let mut para = Paragraph::new();
            let chars: Vec<char> = text.chars().collect();
            let mut start = 0;
            let mut cuts: Vec<usize> = breaks.into_iter().filter(|b| *b <= chars.len()).collect();
            cuts.sort_unstable();
            for cut in cuts {
                para.add_item(TextRun::new(chars[start..cut].iter().collect::<String>()));
                para.add_item(Break::page());
                start = cut;
            }
            para.add_item(TextRun::new(chars[start..].iter().collect::<String>()));
            let has_content = para.has_content();
            let id = doc.add_paragraph(para);

            let layout = lay(&doc, id, width);
            let placed: String = layout.line_texts().concat();
            if has_content {
                prop_assert_eq!(placed, text);
            } else {
                prop_assert_eq!(placed, " ");
            }
            prop_assert!(!layout.lines.is_empty());
            for line in &layout.lines {
                prop_assert!(line.items.len() <= 1 || line.used_width() <= line.available_width() + 1e-6);
            }
            let sum: f64 = layout.lines.iter().map(|l| l.margin.top + l.height + l.margin.bottom).sum();
            prop_assert!((layout.height() - sum).abs() < 1e-9);
        }
    }
}
