//! Typed views over the formatting cascade.
//!
//! [`ParagraphFormat`] reads resolved paragraph formatting for any
//! [`ResolutionContext`]; [`ParagraphFormatMut`] writes to the most specific
//! level of that context. [`CharacterFormat`] does the same for run
//! formatting of a paragraph item or of the paragraph mark.
//!
//! Indentation and spacing are stored twice, once in points and once in
//! characters or lines. The getters prefer the character/line value when it
//! is non-zero; the setters keep both in step, writing 5pt per character
//! or line into the point copy.
use crate::common::error::{Error, Result};
use crate::common::unit::{CHARS_TO_POINTS, LINE_SPACING_UNIT};
use crate::docx::document::Document;
use crate::docx::enums::{
    IndentationUnit, Justification, LevelSuffix, LineSpacingRule, OutlineLevel, SpacingUnit,
    SpecialIndentationType, TextAlignment, VerticalPosition,
};
use crate::docx::format::{Indentation, LineSpacing, Spacing, SpecialIndentation};
use crate::docx::paragraph::ParagraphId;
use crate::docx::properties::{ParagraphProperties, RunProperties};
use crate::docx::resolve::{PropertyResolver, ResolutionContext};
use std::collections::HashMap;

/// Highest list level Word supports (`w:ilvl` 0..=8).
const MAX_LIST_LEVEL: usize = 8;

#[inline]
fn non_zero(value: Option<f64>) -> Option<f64> {
    value.filter(|v| *v != 0.0)
}

/// Resolved paragraph formatting of one context.
#[derive(Debug, Clone)]
pub struct ParagraphFormat<'a> {
    doc: &'a Document,
    ctx: ResolutionContext,
}

/// Writable paragraph formatting of one context.
#[derive(Debug)]
pub struct ParagraphFormatMut<'a> {
    doc: &'a mut Document,
    ctx: ResolutionContext,
}

macro_rules! resolved_paragraph_properties {
    ($( $(#[$meta:meta])* $field:ident / $setter:ident : $ty:ty ),+ $(,)?) => {
        impl ParagraphFormat<'_> {
            $(
                $(#[$meta])*
                pub fn $field(&self) -> $ty {
                    self.resolve(|p| p.$field.clone())
                }
            )+
        }

        impl ParagraphFormatMut<'_> {
            $(
                $(#[$meta])*
                pub fn $setter(&mut self, value: $ty) -> Result<()> {
                    self.target()?.$field = Some(value);
                    Ok(())
                }
            )+
        }
    };
}

resolved_paragraph_properties! {
    /// Horizontal alignment (`w:jc`).
    justification / set_justification: Justification,
    /// Outline level (`w:outlineLvl`).
    outline_level / set_outline_level: OutlineLevel,
    mirror_indents / set_mirror_indents: bool,
    /// Adjust the right indent to the character grid (`w:adjustRightInd`).
    adjust_right_indent / set_adjust_right_indent: bool,
    before_auto_spacing / set_before_auto_spacing: bool,
    after_auto_spacing / set_after_auto_spacing: bool,
    /// Ignore spacing between paragraphs of the same style.
    contextual_spacing / set_contextual_spacing: bool,
    /// Use the document grid for line pitch (`w:snapToGrid`).
    snap_to_grid / set_snap_to_grid: bool,
    widow_control / set_widow_control: bool,
    keep_next / set_keep_next: bool,
    keep_lines / set_keep_lines: bool,
    page_break_before / set_page_break_before: bool,
    suppress_line_numbers / set_suppress_line_numbers: bool,
    suppress_auto_hyphens / set_suppress_auto_hyphens: bool,
    /// East Asian line breaking rules.
    kinsoku / set_kinsoku: bool,
    word_wrap / set_word_wrap: bool,
    overflow_punctuation / set_overflow_punctuation: bool,
    top_line_punctuation / set_top_line_punctuation: bool,
    /// Space between Latin and East Asian text.
    auto_space_de / set_auto_space_de: bool,
    /// Space between digits and East Asian text.
    auto_space_dn / set_auto_space_dn: bool,
    /// Vertical alignment of characters on a line (`w:textAlignment`).
    text_alignment / set_text_alignment: TextAlignment,
}

impl<'a> ParagraphFormat<'a> {
    pub fn new(doc: &'a Document, ctx: ResolutionContext) -> Self {
        Self { doc, ctx }
    }

    #[inline]
    pub fn context(&self) -> &ResolutionContext {
        &self.ctx
    }

    #[inline]
    fn resolver(&self) -> PropertyResolver<'a> {
        PropertyResolver::new(self.doc)
    }

    #[inline]
    fn resolve<T: Default>(&self, field: impl Fn(&ParagraphProperties) -> Option<T>) -> T {
        self.resolver().resolve_with(&self.ctx, field)
    }

    #[inline]
    fn first_set<T>(&self, field: impl Fn(&ParagraphProperties) -> Option<T>) -> Option<T> {
        self.resolver().first_set(&self.ctx, field)
    }

    /// Hanging amount in points folded into the stored left indent.
    fn hanging_points(&self) -> f64 {
        self.resolver()
            .special_indentation_level(&self.ctx)
            .and_then(|level| non_zero(level.hanging_indent))
            .unwrap_or(0.0)
    }

    /// Left indentation, without the hanging amount.
    pub fn left_indent(&self) -> Indentation {
        if let Some(chars) = non_zero(self.first_set(|p| p.left_chars_indent)) {
            return Indentation::chars(chars);
        }
        match self.first_set(|p| p.left_indent) {
            Some(points) => Indentation::points(points - self.hanging_points()),
            None => Indentation::chars(0.0),
        }
    }

    /// Right indentation.
    pub fn right_indent(&self) -> Indentation {
        if let Some(chars) = non_zero(self.first_set(|p| p.right_chars_indent)) {
            return Indentation::chars(chars);
        }
        match self.first_set(|p| p.right_indent) {
            Some(points) => Indentation::points(points),
            None => Indentation::chars(0.0),
        }
    }

    /// First-line or hanging indentation.
    ///
    /// The four special indentation fields are resolved as a group: the most
    /// specific level that sets any of them decides the result.
    pub fn special_indentation(&self) -> SpecialIndentation {
        let Some(level) = self.resolver().special_indentation_level(&self.ctx) else {
            return SpecialIndentation::none();
        };
        if let Some(chars) = non_zero(level.first_line_chars_indent) {
            SpecialIndentation::new(SpecialIndentationType::FirstLine, chars, IndentationUnit::Character)
        } else if let Some(chars) = non_zero(level.hanging_chars_indent) {
            SpecialIndentation::new(SpecialIndentationType::Hanging, chars, IndentationUnit::Character)
        } else if let Some(points) = non_zero(level.first_line_indent) {
            SpecialIndentation::new(SpecialIndentationType::FirstLine, points, IndentationUnit::Point)
        } else if let Some(points) = non_zero(level.hanging_indent) {
            SpecialIndentation::new(SpecialIndentationType::Hanging, points, IndentationUnit::Point)
        } else {
            SpecialIndentation::none()
        }
    }

    fn spacing(&self, lines: Option<f64>, points: Option<f64>) -> Spacing {
        if let Some(lines) = non_zero(lines) {
            Spacing::lines(lines)
        } else if let Some(points) = non_zero(points) {
            Spacing::points(points)
        } else {
            Spacing::lines(0.0)
        }
    }

    /// Spacing above the paragraph.
    pub fn before_spacing(&self) -> Spacing {
        self.spacing(
            self.first_set(|p| p.before_lines_spacing),
            self.first_set(|p| p.before_spacing),
        )
    }

    /// Spacing below the paragraph.
    pub fn after_spacing(&self) -> Spacing {
        self.spacing(
            self.first_set(|p| p.after_lines_spacing),
            self.first_set(|p| p.after_spacing),
        )
    }

    /// Spacing between lines.
    ///
    /// A stored value without a rule is read as a multiple; nothing stored
    /// at all is single spacing.
    pub fn line_spacing(&self) -> LineSpacing {
        let value = self.first_set(|p| p.line_spacing);
        let rule = self.first_set(|p| p.line_spacing_rule);
        match (value, rule) {
            (Some(v), Some(LineSpacingRule::Multiple)) | (Some(v), None) => {
                LineSpacing::multiple(v / LINE_SPACING_UNIT)
            },
            (Some(v), Some(rule)) => LineSpacing::new(v, rule),
            (None, _) => LineSpacing::single(),
        }
    }

    /// Numbering instance and level, if the paragraph is a list item.
    pub fn numbering(&self) -> Option<(u32, u32)> {
        let num_id = self.resolve(|p| p.numbering_id);
        (num_id != 0).then(|| (num_id, self.resolve(|p| p.numbering_level)))
    }
}

impl<'a> ParagraphFormatMut<'a> {
    pub fn new(doc: &'a mut Document, ctx: ResolutionContext) -> Self {
        Self { doc, ctx }
    }

    /// Read-only view of the same context.
    pub fn view(&self) -> ParagraphFormat<'_> {
        ParagraphFormat::new(self.doc, self.ctx.clone())
    }

    fn target(&mut self) -> Result<&mut ParagraphProperties> {
        self.doc.properties_mut(&self.ctx)
    }

    /// Set the left indentation.
    ///
    /// The stored point value includes the current hanging amount.
    pub fn set_left_indent(&mut self, value: f64, unit: IndentationUnit) -> Result<()> {
        let hanging = self.view().hanging_points();
        let target = self.target()?;
        match unit {
            IndentationUnit::Character => {
                target.left_indent = Some(value * CHARS_TO_POINTS + hanging);
                target.left_chars_indent = Some(value);
            },
            IndentationUnit::Point => {
                target.left_chars_indent = Some(0.0);
                target.left_indent = Some(value + hanging);
            },
        }
        Ok(())
    }

    /// Set the right indentation.
    pub fn set_right_indent(&mut self, value: f64, unit: IndentationUnit) -> Result<()> {
        let target = self.target()?;
        match unit {
            IndentationUnit::Character => {
                target.right_indent = Some(value * CHARS_TO_POINTS);
                target.right_chars_indent = Some(value);
            },
            IndentationUnit::Point => {
                target.right_chars_indent = Some(0.0);
                target.right_indent = Some(value);
            },
        }
        Ok(())
    }

    /// Set first-line or hanging indentation.
    ///
    /// A left indent in points keeps its visible position: the hanging
    /// amount folded into it is replaced by the new one.
    pub fn set_special_indentation(
        &mut self,
        kind: SpecialIndentationType,
        value: f64,
        unit: IndentationUnit,
    ) -> Result<()> {
        let view = self.view();
        let left = view.left_indent();
        let refold_left = left.unit == IndentationUnit::Point
            && view.first_set(|p| p.left_indent).is_some();

        let target = self.target()?;
        match kind {
            SpecialIndentationType::FirstLine => {
                target.hanging_indent = None;
                target.hanging_chars_indent = None;
                match unit {
                    IndentationUnit::Character => {
                        target.first_line_indent = Some(value * CHARS_TO_POINTS);
                        target.first_line_chars_indent = Some(value);
                    },
                    IndentationUnit::Point => {
                        target.first_line_chars_indent = Some(0.0);
                        target.first_line_indent = Some(value);
                    },
                }
            },
            SpecialIndentationType::Hanging => {
                target.first_line_indent = None;
                target.first_line_chars_indent = None;
                match unit {
                    IndentationUnit::Character => {
                        target.hanging_indent = Some(value * CHARS_TO_POINTS);
                        target.hanging_chars_indent = Some(value);
                    },
                    IndentationUnit::Point => {
                        target.hanging_chars_indent = Some(0.0);
                        target.hanging_indent = Some(value);
                    },
                }
            },
            SpecialIndentationType::None => {
                target.hanging_indent = None;
                target.hanging_chars_indent = None;
                target.first_line_chars_indent = Some(0.0);
                target.first_line_indent = Some(0.0);
            },
        }

        if refold_left {
            self.set_left_indent(left.value, IndentationUnit::Point)?;
        }
        Ok(())
    }

    /// Set the spacing above the paragraph.
    pub fn set_before_spacing(&mut self, value: f64, unit: SpacingUnit) -> Result<()> {
        let target = self.target()?;
        match unit {
            SpacingUnit::Line => {
                target.before_spacing = Some(value * CHARS_TO_POINTS);
                target.before_lines_spacing = Some(value);
            },
            SpacingUnit::Point => {
                target.before_lines_spacing = Some(0.0);
                target.before_spacing = Some(value);
            },
        }
        Ok(())
    }

    /// Set the spacing below the paragraph.
    pub fn set_after_spacing(&mut self, value: f64, unit: SpacingUnit) -> Result<()> {
        let target = self.target()?;
        match unit {
            SpacingUnit::Line => {
                target.after_spacing = Some(value * CHARS_TO_POINTS);
                target.after_lines_spacing = Some(value);
            },
            SpacingUnit::Point => {
                target.after_lines_spacing = Some(0.0);
                target.after_spacing = Some(value);
            },
        }
        Ok(())
    }

    /// Set the spacing between lines.
    ///
    /// For [`LineSpacingRule::Multiple`] `value` is a factor; otherwise a
    /// height in points.
    pub fn set_line_spacing(&mut self, value: f64, rule: LineSpacingRule) -> Result<()> {
        let target = self.target()?;
        target.line_spacing = Some(match rule {
            LineSpacingRule::Multiple => value * LINE_SPACING_UNIT,
            _ => value,
        });
        target.line_spacing_rule = Some(rule);
        Ok(())
    }

    /// Attach the paragraph to a list, or detach it with `None`.
    pub fn set_numbering(&mut self, numbering: Option<(u32, u32)>) -> Result<()> {
        let target = self.target()?;
        match numbering {
            Some((num_id, level)) => {
                if level as usize > MAX_LIST_LEVEL {
                    return Err(Error::invalid_argument(format!(
                        "list level {} is out of range 0..={}",
                        level, MAX_LIST_LEVEL
                    )));
                }
                target.numbering_id = Some(num_id);
                target.numbering_level = Some(level);
            },
            None => {
                target.numbering_id = Some(0);
                target.numbering_level = None;
            },
        }
        Ok(())
    }

    /// Remove every value set at this level.
    ///
    /// Only the most specific level of the context is touched; a paragraph
    /// keeps its style reference.
    pub fn clear_formatting(&mut self) -> Result<()> {
        self.target()?.clear();
        Ok(())
    }
}

/// Resolved run formatting of a paragraph item or paragraph mark.
#[derive(Debug, Clone)]
pub struct CharacterFormat<'a> {
    doc: &'a Document,
    paragraph: ParagraphId,
    item: Option<usize>,
}

/// Writable direct run formatting of a paragraph item or paragraph mark.
#[derive(Debug)]
pub struct CharacterFormatMut<'a> {
    doc: &'a mut Document,
    paragraph: ParagraphId,
    item: Option<usize>,
}

macro_rules! resolved_run_properties {
    ($( $(#[$meta:meta])* $field:ident / $setter:ident : $ty:ty ),+ $(,)?) => {
        impl CharacterFormat<'_> {
            $(
                $(#[$meta])*
                pub fn $field(&self) -> $ty {
                    self.resolve(|r| r.$field.clone())
                }
            )+
        }

        impl CharacterFormatMut<'_> {
            $(
                $(#[$meta])*
                pub fn $setter(&mut self, value: $ty) -> Result<()> {
                    self.target()?.$field = Some(value);
                    Ok(())
                }
            )+
        }
    };
}

resolved_run_properties! {
    /// Font size in points.
    font_size / set_font_size: f64,
    /// Complex script font size in points.
    font_size_cs / set_font_size_cs: f64,
    bold / set_bold: bool,
    italic / set_italic: bool,
    font_name_ascii / set_font_name_ascii: String,
    font_name_east_asia / set_font_name_east_asia: String,
    /// Horizontal scale in percent.
    character_scale / set_character_scale: f64,
    /// Extra space between characters in points.
    character_spacing / set_character_spacing: f64,
    position / set_position: f64,
    vertical_position / set_vertical_position: VerticalPosition,
}

impl<'a> CharacterFormat<'a> {
    pub fn new(doc: &'a Document, paragraph: ParagraphId, item: Option<usize>) -> Self {
        Self {
            doc,
            paragraph,
            item,
        }
    }

    fn resolve<T: Default>(&self, field: impl Fn(&RunProperties) -> Option<T>) -> T {
        PropertyResolver::new(self.doc)
            .run_levels(self.paragraph, self.item)
            .iter()
            .find_map(|level| field(level))
            .or_else(|| field(RunProperties::hard_defaults()))
            .unwrap_or_default()
    }
}

impl<'a> CharacterFormatMut<'a> {
    pub fn new(doc: &'a mut Document, paragraph: ParagraphId, item: Option<usize>) -> Self {
        Self {
            doc,
            paragraph,
            item,
        }
    }

    pub fn view(&self) -> CharacterFormat<'_> {
        CharacterFormat::new(self.doc, self.paragraph, self.item)
    }

    fn target(&mut self) -> Result<&mut RunProperties> {
        let para = self.doc.paragraph_mut(self.paragraph)?;
        match self.item {
            None => Ok(&mut para.mark),
            Some(index) => {
                let len = para.items.len();
                para.items
                    .get_mut(index)
                    .map(|item| item.run_properties_mut())
                    .ok_or_else(|| {
                        Error::invalid_argument(format!(
                            "item index {} out of range for paragraph with {} items",
                            index, len
                        ))
                    })
            },
        }
    }

    /// Remove the direct run formatting.
    pub fn clear_formatting(&mut self) -> Result<()> {
        self.target()?.clear();
        Ok(())
    }
}

/// Rendered list label of a paragraph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListLabel {
    pub text: String,
    pub suffix: LevelSuffix,
}

impl Document {
    /// Resolved paragraph formatting of a paragraph or style.
    pub fn format(&self, ctx: impl Into<ResolutionContext>) -> ParagraphFormat<'_> {
        ParagraphFormat::new(self, ctx.into())
    }

    /// Writable paragraph formatting of a paragraph or style.
    pub fn format_mut(&mut self, ctx: impl Into<ResolutionContext>) -> ParagraphFormatMut<'_> {
        ParagraphFormatMut::new(self, ctx.into())
    }

    /// Run formatting of an item, or of the paragraph mark when `item` is `None`.
    pub fn character_format(&self, paragraph: ParagraphId, item: Option<usize>) -> CharacterFormat<'_> {
        CharacterFormat::new(self, paragraph, item)
    }

    pub fn character_format_mut(
        &mut self,
        paragraph: ParagraphId,
        item: Option<usize>,
    ) -> CharacterFormatMut<'_> {
        CharacterFormatMut::new(self, paragraph, item)
    }

    /// List label of a paragraph.
    ///
    /// Counters run per numbering instance over the paragraphs before it in
    /// document order; a level restarts whenever a shallower level advances.
    ///
    /// Each call rescans the body up to `paragraph` and resolves every list
    /// paragraph on the way, so labelling a whole list of `n` paragraphs is
    /// O(n²). Callers labelling many paragraphs should expect that cost.
    pub fn list_label(&self, paragraph: ParagraphId) -> Result<Option<ListLabel>> {
        self.paragraph(paragraph)?;
        let Some((num_id, level)) = self.format(paragraph).numbering() else {
            return Ok(None);
        };
        let Some(abstract_num) = self.numbering.abstract_for(num_id) else {
            return Ok(None);
        };
        let Some(definition) = abstract_num.level(level) else {
            return Ok(None);
        };

        let mut counters: HashMap<u32, [Option<u32>; MAX_LIST_LEVEL + 1]> = HashMap::new();
        for id in self.paragraph_ids() {
            let Some((other_num, other_level)) = self.format(id).numbering() else {
                continue;
            };
            let Some(other_abstract) = self.numbering.abstract_for(other_num) else {
                continue;
            };
            let lvl = (other_level as usize).min(MAX_LIST_LEVEL);
            let slots = counters.entry(other_num).or_insert([None; MAX_LIST_LEVEL + 1]);
            slots[lvl] = Some(match slots[lvl] {
                None => other_abstract.level(lvl as u32).map_or(1, |l| l.start),
                Some(n) => n.saturating_add(1),
            });
            for deeper in &mut slots[lvl + 1..] {
                *deeper = None;
            }
            if id == paragraph {
                break;
            }
        }

        let slots = counters
            .get(&num_id)
            .copied()
            .unwrap_or([None; MAX_LIST_LEVEL + 1]);
        let values: Vec<u32> = (0..=level.min(MAX_LIST_LEVEL as u32))
            .map(|k| {
                slots[k as usize].unwrap_or_else(|| abstract_num.level(k).map_or(1, |l| l.start))
            })
            .collect();

        Ok(Some(ListLabel {
            text: abstract_num.render_label(level, &values),
            suffix: definition.suffix,
        }))
    }
}

impl From<&str> for ResolutionContext {
    fn from(style_id: &str) -> Self {
        Self::Style(style_id.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::docx::enums::{NumberFormat, StyleType};
    use crate::docx::numbering::{AbstractNum, Num, NumberingLevel};
    use crate::docx::paragraph::{Paragraph, TextRun};
    use crate::docx::styles::Style;
    use proptest::prelude::*;

    fn doc_with_normal() -> Document {
        let mut doc = Document::new();
        doc.styles_mut()
            .insert(Style::new("Normal", StyleType::Paragraph).with_default(true));
        doc
    }

    #[test]
    fn test_simple_property_round_trip() {
        let mut doc = doc_with_normal();
        let p = doc.add_paragraph(Paragraph::new());
        assert_eq!(doc.format(p).justification(), Justification::Both);
        assert!(doc.format(p).snap_to_grid());

        doc.format_mut(p).set_justification(Justification::Center).unwrap();
        doc.format_mut(p).set_keep_next(true).unwrap();
        assert_eq!(doc.format(p).justification(), Justification::Center);
        assert!(doc.format(p).keep_next());
        assert!(!doc.format("Normal").keep_next());
    }

    #[test]
    fn test_left_indent_units() {
        let mut doc = doc_with_normal();
        let p = doc.add_paragraph(Paragraph::new());
        assert_eq!(doc.format(p).left_indent(), Indentation::chars(0.0));

        doc.format_mut(p).set_left_indent(2.0, IndentationUnit::Character).unwrap();
        assert_eq!(doc.format(p).left_indent(), Indentation::chars(2.0));
        assert_eq!(doc.paragraph(p).unwrap().properties().left_indent, Some(10.0));

        doc.format_mut(p).set_left_indent(36.0, IndentationUnit::Point).unwrap();
        assert_eq!(doc.format(p).left_indent(), Indentation::points(36.0));
    }

    #[test]
    fn test_hanging_is_folded_into_left() {
        let mut doc = doc_with_normal();
        let p = doc.add_paragraph(Paragraph::new());
        doc.format_mut(p).set_left_indent(20.0, IndentationUnit::Point).unwrap();
        doc.format_mut(p)
            .set_special_indentation(SpecialIndentationType::Hanging, 15.0, IndentationUnit::Point)
            .unwrap();

        let props = doc.paragraph(p).unwrap().properties().clone();
        assert_eq!(props.left_indent, Some(35.0));
        assert_eq!(doc.format(p).left_indent(), Indentation::points(20.0));
        assert_eq!(
            doc.format(p).special_indentation(),
            SpecialIndentation::new(SpecialIndentationType::Hanging, 15.0, IndentationUnit::Point)
        );

        doc.format_mut(p).set_left_indent(10.0, IndentationUnit::Point).unwrap();
        assert_eq!(doc.paragraph(p).unwrap().properties().left_indent, Some(25.0));

        doc.format_mut(p)
            .set_special_indentation(SpecialIndentationType::FirstLine, 2.0, IndentationUnit::Character)
            .unwrap();
        assert_eq!(doc.format(p).left_indent(), Indentation::points(10.0));
        assert_eq!(doc.paragraph(p).unwrap().properties().left_indent, Some(10.0));
    }

    #[test]
    fn test_special_indentation_resolves_as_group() {
        let mut doc = Document::new();
        doc.styles_mut().insert(
            Style::new("Body", StyleType::Paragraph).with_paragraph_properties(ParagraphProperties {
                hanging_chars_indent: Some(2.0),
                hanging_indent: Some(10.0),
                ..Default::default()
            }),
        );
        let p = doc.add_paragraph(Paragraph::new().with_style("Body"));
        assert_eq!(
            doc.format(p).special_indentation(),
            SpecialIndentation::new(SpecialIndentationType::Hanging, 2.0, IndentationUnit::Character)
        );

        doc.paragraph_mut(p).unwrap().properties.first_line_indent = Some(12.0);
        assert_eq!(
            doc.format(p).special_indentation(),
            SpecialIndentation::new(SpecialIndentationType::FirstLine, 12.0, IndentationUnit::Point)
        );
        assert_eq!(doc.format(p).special_indentation().signed_value(), 12.0);

        doc.format_mut(p)
            .set_special_indentation(SpecialIndentationType::None, 0.0, IndentationUnit::Character)
            .unwrap();
        assert_eq!(
            doc.format(p).special_indentation().kind,
            SpecialIndentationType::None
        );
    }

    #[test]
    fn test_spacing_prefers_lines() {
        let mut doc = doc_with_normal();
        let p = doc.add_paragraph(Paragraph::new());
        assert_eq!(doc.format(p).before_spacing(), Spacing::lines(0.0));

        doc.format_mut(p).set_before_spacing(0.5, SpacingUnit::Line).unwrap();
        doc.format_mut(p).set_after_spacing(6.0, SpacingUnit::Point).unwrap();
        assert_eq!(doc.format(p).before_spacing(), Spacing::lines(0.5));
        assert_eq!(doc.format(p).after_spacing(), Spacing::points(6.0));

        doc.format_mut(p).set_before_spacing(3.0, SpacingUnit::Point).unwrap();
        assert_eq!(doc.format(p).before_spacing(), Spacing::points(3.0));
    }

    #[test]
    fn test_line_spacing_normalization() {
        let mut doc = doc_with_normal();
        let p = doc.add_paragraph(Paragraph::new());
        assert_eq!(doc.format(p).line_spacing(), LineSpacing::single());

        doc.paragraph_mut(p).unwrap().properties.line_spacing = Some(18.0);
        assert_eq!(doc.format(p).line_spacing(), LineSpacing::multiple(1.5));

        doc.format_mut(p).set_line_spacing(20.0, LineSpacingRule::Exact).unwrap();
        assert_eq!(doc.format(p).line_spacing(), LineSpacing::exact(20.0));

        doc.format_mut(p).set_line_spacing(2.0, LineSpacingRule::Multiple).unwrap();
        assert_eq!(doc.format(p).line_spacing(), LineSpacing::multiple(2.0));
        assert_eq!(doc.paragraph(p).unwrap().properties().line_spacing, Some(24.0));
    }

    #[test]
    fn test_style_context_writes_style() {
        let mut doc = doc_with_normal();
        let p = doc.add_paragraph(Paragraph::new());
        doc.format_mut("Normal")
            .set_right_indent(1.0, IndentationUnit::Character)
            .unwrap();
        assert_eq!(doc.format(p).right_indent(), Indentation::chars(1.0));
        assert!(doc.paragraph(p).unwrap().properties().is_empty());
        assert!(matches!(
            doc.format_mut("Missing").set_keep_lines(true),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn test_clear_formatting_matches_fresh_paragraph() {
        let mut doc = doc_with_normal();
        let edited = doc.add_paragraph(Paragraph::new().with_style("Normal"));
        let fresh = doc.add_paragraph(Paragraph::new().with_style("Normal"));
        {
            let mut fmt = doc.format_mut(edited);
            fmt.set_justification(Justification::Right).unwrap();
            fmt.set_left_indent(3.0, IndentationUnit::Character).unwrap();
            fmt.set_line_spacing(30.0, LineSpacingRule::AtLeast).unwrap();
            fmt.clear_formatting().unwrap();
            fmt.clear_formatting().unwrap();
        }
        let a = doc.format(edited);
        let b = doc.format(fresh);
        assert_eq!(a.justification(), b.justification());
        assert_eq!(a.left_indent(), b.left_indent());
        assert_eq!(a.line_spacing(), b.line_spacing());
        assert_eq!(a.special_indentation(), b.special_indentation());
    }

    #[test]
    fn test_character_format() {
        let mut doc = doc_with_normal();
        if let Some(normal) = doc.styles_mut().get_mut("Normal") {
            normal.run.font_size = Some(12.0);
        }
        let mut para = Paragraph::new();
        para.add_item(TextRun::new("abc"));
        let p = doc.add_paragraph(para);

        assert_eq!(doc.character_format(p, Some(0)).font_size(), 12.0);
        doc.character_format_mut(p, Some(0)).set_font_size(16.0).unwrap();
        assert_eq!(doc.character_format(p, Some(0)).font_size(), 16.0);
        assert_eq!(doc.character_format(p, None).font_size(), 12.0);
        assert_eq!(doc.character_format(p, None).character_scale(), 100.0);
        assert!(matches!(
            doc.character_format_mut(p, Some(5)).set_bold(true),
            Err(Error::InvalidArgument(_))
        ));
    }

    fn list_doc() -> (Document, Vec<ParagraphId>) {
        let mut doc = doc_with_normal();
        doc.numbering_mut().add_abstract_num(
            AbstractNum::new(0)
                .with_level(NumberingLevel::new(0, NumberFormat::Decimal, "%1."))
                .with_level(
                    NumberingLevel::new(1, NumberFormat::LowerLetter, "%1.%2")
                        .with_suffix(LevelSuffix::Space),
                ),
        );
        doc.numbering_mut().add_num(Num {
            id: 1,
            abstract_num_id: 0,
        });
        let levels = [Some(0), Some(1), Some(1), None, Some(0), Some(1)];
        let ids = levels
            .iter()
            .map(|level| {
                let id = doc.add_paragraph(Paragraph::with_text("item"));
                if let Some(level) = level {
                    doc.format_mut(id).set_numbering(Some((1, *level))).unwrap();
                }
                id
            })
            .collect();
        (doc, ids)
    }

    #[test]
    fn test_list_labels_count_and_restart() {
        let (doc, ids) = list_doc();
        let labels: Vec<_> = ids
            .iter()
            .map(|id| doc.list_label(*id).unwrap().map(|l| l.text))
            .collect();
        assert_eq!(
            labels,
            [
                Some("1.".to_string()),
                Some("1.a".to_string()),
                Some("1.b".to_string()),
                None,
                Some("2.".to_string()),
                Some("2.a".to_string()),
            ]
        );
        assert_eq!(
            doc.list_label(ids[1]).unwrap().map(|l| l.suffix),
            Some(LevelSuffix::Space)
        );
    }

    fn single_level_list(start: u32, count: usize) -> (Document, Vec<ParagraphId>) {
        let mut doc = doc_with_normal();
        doc.numbering_mut().add_abstract_num(
            AbstractNum::new(0)
                .with_level(NumberingLevel::new(0, NumberFormat::Decimal, "%1.").with_start(start)),
        );
        doc.numbering_mut().add_num(Num {
            id: 1,
            abstract_num_id: 0,
        });
        let ids = (0..count)
            .map(|_| {
                let id = doc.add_paragraph(Paragraph::with_text("item"));
                doc.format_mut(id).set_numbering(Some((1, 0))).unwrap();
                id
            })
            .collect();
        (doc, ids)
    }

    #[test]
    fn test_list_starting_at_zero_counts_up() {
        let (doc, ids) = single_level_list(0, 3);
        let labels: Vec<_> = ids
            .iter()
            .map(|id| doc.list_label(*id).unwrap().map(|l| l.text))
            .collect();
        assert_eq!(
            labels,
            [
                Some("0.".to_string()),
                Some("1.".to_string()),
                Some("2.".to_string()),
            ]
        );
    }

    #[test]
    fn test_list_counter_saturates() {
        let (doc, ids) = single_level_list(u32::MAX, 2);
        let expected = format!("{}.", u32::MAX);
        assert_eq!(doc.list_label(ids[1]).unwrap().map(|l| l.text), Some(expected));
    }

    #[test]
    fn test_set_numbering_rejects_deep_level() {
        let mut doc = doc_with_normal();
        let p = doc.add_paragraph(Paragraph::new());
        assert!(doc.format_mut(p).set_numbering(Some((1, 9))).is_err());
        doc.format_mut(p).set_numbering(Some((1, 0))).unwrap();
        doc.format_mut(p).set_numbering(None).unwrap();
        assert_eq!(doc.format(p).numbering(), None);
    }

    fn right(value: Option<f64>) -> ParagraphProperties {
        ParagraphProperties {
            right_indent: value,
            ..Default::default()
        }
    }

    proptest! {
        #[test]
        fn prop_resolution_precedence(
            direct in proptest::option::of(1.0f64..100.0),
            style in proptest::option::of(1.0f64..100.0),
            base in proptest::option::of(1.0f64..100.0),
            normal in proptest::option::of(1.0f64..100.0),
            defaults in proptest::option::of(1.0f64..100.0),
        ) {
            let mut doc = Document::new();
            doc.defaults_mut().paragraph = right(defaults);
            doc.styles_mut().insert(
                Style::new("Normal", StyleType::Paragraph)
                    .with_default(true)
                    .with_paragraph_properties(right(normal)),
            );
            doc.styles_mut().insert(
                Style::new("Base", StyleType::Paragraph).with_paragraph_properties(right(base)),
            );
            doc.styles_mut().insert(
                Style::new("Body", StyleType::Paragraph)
                    .with_based_on("Base")
                    .with_paragraph_properties(right(style)),
            );
            let p = doc.add_paragraph(
                Paragraph::new().with_style("Body").with_properties(right(direct)),
            );

            let expected = direct
                .or(style)
                .or(base)
                .or(normal)
                .or(defaults)
                .map_or(Indentation::chars(0.0), Indentation::points);
            prop_assert_eq!(doc.format(p).right_indent(), expected);

            doc.format_mut(p).clear_formatting().unwrap();
            let cleared = style
                .or(base)
                .or(normal)
                .or(defaults)
                .map_or(Indentation::chars(0.0), Indentation::points);
            prop_assert_eq!(doc.format(p).right_indent(), cleared);
        }

        #[test]
        fn prop_hanging_never_shifts_left(left in 0.0f64..200.0, hanging in 0.5f64..100.0) {
            let mut doc = doc_with_normal();
            let p = doc.add_paragraph(Paragraph::new());
            doc.format_mut(p).set_left_indent(left, IndentationUnit::Point).unwrap();
            doc.format_mut(p)
                .set_special_indentation(SpecialIndentationType::Hanging, hanging, IndentationUnit::Point)
                .unwrap();
            let fmt = doc.format(p);
            prop_assert!((fmt.left_indent().value - left).abs() < 1e-9);
            prop_assert!(fmt.special_indentation().signed_value() < 0.0);
        }
    }
}
