//! Formatting resolution: the cascade of property levels.
//!
//! A value is looked up level by level, most specific first, and the first
//! level that sets it wins. For a paragraph the order is:
//!
//! 1. direct formatting (`w:pPr` of the paragraph)
//! 2. table style regions of the enclosing cell, most specific region first
//! 3. the paragraph style and its base styles
//! 4. the default paragraph style and its base styles, minus styles already visited
//! 5. document defaults (`w:pPrDefault`)
//! 6. hard-coded schema defaults
//!
//! Missing styles and base-style cycles shorten the chain; they never fail.
use crate::common::error::{Error, Result};
use crate::common::unit::DEFAULT_FONT_SIZE_PT;
use crate::docx::document::Document;
use crate::docx::enums::{StyleType, TableRegionType};
use crate::docx::paragraph::ParagraphId;
use crate::docx::properties::{
    ParagraphProperties, ParagraphPropertyKey, PropertyValue, RunProperties, RunPropertyKey,
};
use crate::docx::styles::Style;
use smallvec::SmallVec;

/// Where a formatting lookup starts.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ResolutionContext {
    /// A paragraph of the document.
    Paragraph(ParagraphId),
    /// A style definition.
    Style(String),
    /// One conditional region of a table style.
    TableRegionStyle {
        style_id: String,
        region: TableRegionType,
    },
}

impl ResolutionContext {
    #[inline]
    pub fn style(style_id: impl Into<String>) -> Self {
        Self::Style(style_id.into())
    }

    #[inline]
    pub fn table_region(style_id: impl Into<String>, region: TableRegionType) -> Self {
        Self::TableRegionStyle {
            style_id: style_id.into(),
            region,
        }
    }
}

impl From<ParagraphId> for ResolutionContext {
    fn from(id: ParagraphId) -> Self {
        Self::Paragraph(id)
    }
}

/// Holders of one cascade, most specific first.
pub type Levels<'a, T> = SmallVec<[&'a T; 8]>;

/// Walks the formatting cascade of a document.
#[derive(Debug, Clone, Copy)]
pub struct PropertyResolver<'a> {
    doc: &'a Document,
}

impl<'a> PropertyResolver<'a> {
    #[inline]
    pub fn new(doc: &'a Document) -> Self {
        Self { doc }
    }

    #[inline]
    fn doc_ref(&self) -> &'a Document {
        self.doc
    }

    /// Push a style chain followed by the default paragraph style chain.
    fn push_style_chains<T: 'a>(
        &self,
        style_id: Option<&str>,
        with_default: bool,
        levels: &mut Levels<'a, T>,
        pick: impl Fn(&'a Style) -> &'a T,
    ) {
        let styles = &self.doc_ref().styles;
        let mut chain = styles.base_chain(style_id.unwrap_or_default());
        for style in chain.by_ref() {
            levels.push(pick(style));
        }
        if !with_default {
            return;
        }
        if let Some(default) = styles.default_style(StyleType::Paragraph) {
            for style in styles
                .base_chain(default.style_id())
                .skipping(chain.visited())
            {
                levels.push(pick(style));
            }
        }
    }

    /// Table style regions that apply to a paragraph in a table cell.
    fn push_table_regions<T: 'a>(
        &self,
        paragraph: ParagraphId,
        levels: &mut Levels<'a, T>,
        pick: impl Fn(&'a Style, TableRegionType) -> Option<&'a T>,
        pick_style: impl Fn(&'a Style) -> &'a T,
    ) {
        let Some((tid, row, col)) = self.doc.table_containing(paragraph) else {
            return;
        };
        let Ok(table) = self.doc.table(tid) else {
            return;
        };
        let Some(style_id) = table.style_id() else {
            return;
        };
        let styles = &self.doc_ref().styles;
        for region in table.regions_for(row, col) {
            for style in styles.base_chain(style_id) {
                if let Some(holder) = pick(style, region) {
                    levels.push(holder);
                }
            }
        }
        for style in styles.base_chain(style_id) {
            levels.push(pick_style(style));
        }
    }

    /// Paragraph property levels for a context, most specific first.
    ///
    /// Document defaults are the last level; schema defaults are not
    /// included.
    pub fn paragraph_levels(&self, ctx: &ResolutionContext) -> Levels<'a, ParagraphProperties> {
        let mut levels = Levels::new();
        match ctx {
            ResolutionContext::Paragraph(id) => match self.doc.paragraph(*id) {
                Ok(para) => {
                    levels.push(&para.properties);
                    self.push_table_regions(
                        *id,
                        &mut levels,
                        |s, r| s.region(r).map(|h| &h.paragraph),
                        |s| &s.paragraph,
                    );
                    self.push_style_chains(para.style_id(), true, &mut levels, |s| &s.paragraph);
                },
                Err(_) => log::debug!("resolving formatting of unknown paragraph {}", id.0),
            },
            ResolutionContext::Style(style_id) => {
                let is_paragraph_style = self
                    .doc
                    .styles
                    .get(style_id)
                    .is_none_or(|s| s.style_type() == StyleType::Paragraph);
                self.push_style_chains(
                    Some(style_id),
                    is_paragraph_style,
                    &mut levels,
                    |s| &s.paragraph,
                );
            },
            ResolutionContext::TableRegionStyle { style_id, region } => {
                for style in self.doc_ref().styles.base_chain(style_id) {
                    if let Some(holder) = style.region(*region) {
                        levels.push(&holder.paragraph);
                    }
                }
                self.push_style_chains(Some(style_id), false, &mut levels, |s| &s.paragraph);
            },
        }
        levels.push(&self.doc_ref().defaults.paragraph);
        levels
    }

    /// Run property levels for a paragraph item, most specific first.
    ///
    /// With `item` `None` the levels of the paragraph mark are returned.
    pub fn run_levels(&self, paragraph: ParagraphId, item: Option<usize>) -> Levels<'a, RunProperties> {
        let mut levels = Levels::new();
        if let Ok(para) = self.doc.paragraph(paragraph) {
            let item = item.and_then(|i| para.items.get(i));
            match item {
                Some(item) => {
                    levels.push(item.run_properties());
                    if let Some(char_style) = item.style_id() {
                        self.push_style_chains(Some(char_style), false, &mut levels, |s| &s.run);
                    }
                },
                None => levels.push(&para.mark),
            }
            self.push_table_regions(
                paragraph,
                &mut levels,
                |s, r| s.region(r).map(|h| &h.run),
                |s| &s.run,
            );
            self.push_style_chains(para.style_id(), true, &mut levels, |s| &s.run);
        }
        levels.push(&self.doc_ref().defaults.run);
        levels
    }

    /// Run property levels of a style.
    pub fn style_run_levels(&self, style_id: &str) -> Levels<'a, RunProperties> {
        let mut levels = Levels::new();
        let with_default = self
            .doc
            .styles
            .get(style_id)
            .is_none_or(|s| s.style_type() == StyleType::Paragraph);
        self.push_style_chains(Some(style_id), with_default, &mut levels, |s| &s.run);
        levels.push(&self.doc_ref().defaults.run);
        levels
    }

    /// Resolve one paragraph property dynamically.
    pub fn resolve(&self, ctx: &ResolutionContext, key: ParagraphPropertyKey) -> PropertyValue {
        self.paragraph_levels(ctx)
            .iter()
            .find_map(|level| level.get(key))
            .unwrap_or_else(|| key.default_value())
    }

    /// Resolve one run property of a paragraph item (or its mark).
    pub fn resolve_run(
        &self,
        paragraph: ParagraphId,
        item: Option<usize>,
        key: RunPropertyKey,
    ) -> PropertyValue {
        self.run_levels(paragraph, item)
            .iter()
            .find_map(|level| level.get(key))
            .unwrap_or_else(|| key.default_value())
    }

    /// First value set by any level, without schema defaults.
    pub fn first_set<T>(
        &self,
        ctx: &ResolutionContext,
        field: impl Fn(&ParagraphProperties) -> Option<T>,
    ) -> Option<T> {
        self.paragraph_levels(ctx).iter().find_map(|level| field(level))
    }

    /// Typed resolution falling back to schema defaults.
    pub fn resolve_with<T: Default>(
        &self,
        ctx: &ResolutionContext,
        field: impl Fn(&ParagraphProperties) -> Option<T>,
    ) -> T {
        self.first_set(ctx, &field)
            .or_else(|| field(ParagraphProperties::hard_defaults()))
            .unwrap_or_default()
    }

    /// Most specific level that sets any special indentation field.
    pub fn special_indentation_level(
        &self,
        ctx: &ResolutionContext,
    ) -> Option<&'a ParagraphProperties> {
        self.paragraph_levels(ctx)
            .into_iter()
            .find(|level| level.has_special_indentation())
    }

    /// Font size of normal text: the default paragraph style's size, else
    /// the run defaults, else 10.5pt.
    pub fn normal_font_size(&self) -> f64 {
        self.normal_font_size_or(DEFAULT_FONT_SIZE_PT)
    }

    /// Font size of normal text, with an explicit last-resort fallback.
    pub fn normal_font_size_or(&self, fallback: f64) -> f64 {
        let levels = match self.doc_ref().styles.default_style(StyleType::Paragraph) {
            Some(style) => self.style_run_levels(style.style_id()),
            None => {
                let mut levels = Levels::new();
                levels.push(&self.doc_ref().defaults.run);
                levels
            },
        };
        levels
            .iter()
            .find_map(|level| level.font_size)
            .unwrap_or(fallback)
    }
}

impl Document {
    /// Resolver over this document's cascade.
    #[inline]
    pub fn resolver(&self) -> PropertyResolver<'_> {
        PropertyResolver::new(self)
    }

    /// The level that setters write to: the most specific one of `ctx`.
    pub fn properties_mut(&mut self, ctx: &ResolutionContext) -> Result<&mut ParagraphProperties> {
        match ctx {
            ResolutionContext::Paragraph(id) => Ok(&mut self.paragraph_mut(*id)?.properties),
            ResolutionContext::Style(style_id) => self
                .styles
                .get_mut(style_id)
                .map(|s| &mut s.paragraph)
                .ok_or_else(|| Error::NotFound(format!("style '{}'", style_id))),
            ResolutionContext::TableRegionStyle { style_id, region } => self
                .styles
                .get_mut(style_id)
                .map(|s| &mut s.region_mut(*region).paragraph)
                .ok_or_else(|| Error::NotFound(format!("style '{}'", style_id))),
        }
    }

    /// Resolve one paragraph property dynamically.
    pub fn resolve(&self, ctx: &ResolutionContext, key: ParagraphPropertyKey) -> PropertyValue {
        self.resolver().resolve(ctx, key)
    }

    /// Set one paragraph property at the most specific level of `ctx`.
    pub fn set_property(
        &mut self,
        ctx: &ResolutionContext,
        key: ParagraphPropertyKey,
        value: Option<PropertyValue>,
    ) -> Result<()> {
        self.properties_mut(ctx)?.set(key, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::docx::enums::Justification;
    use crate::docx::paragraph::{Paragraph, TextRun};

    fn justified(j: Justification) -> ParagraphProperties {
        ParagraphProperties {
            justification: Some(j),
            ..Default::default()
        }
    }

    fn styled_doc() -> Document {
        let mut doc = Document::new();
        doc.styles_mut().insert(
            Style::new("Normal", StyleType::Paragraph)
                .with_default(true)
                .with_paragraph_properties(ParagraphProperties {
                    keep_lines: Some(true),
                    ..Default::default()
                }),
        );
        doc.styles_mut().insert(
            Style::new("Heading1", StyleType::Paragraph)
                .with_based_on("Normal")
                .with_paragraph_properties(justified(Justification::Center)),
        );
        doc
    }

    fn justification(doc: &Document, ctx: &ResolutionContext) -> PropertyValue {
        doc.resolve(ctx, ParagraphPropertyKey::Justification)
    }

    #[test]
    fn test_precedence_direct_style_default() {
        let mut doc = styled_doc();
        let plain = doc.add_paragraph(Paragraph::new());
        let heading = doc.add_paragraph(Paragraph::new().with_style("Heading1"));
        let direct = doc.add_paragraph(
            Paragraph::new()
                .with_style("Heading1")
                .with_properties(justified(Justification::Right)),
        );

        assert_eq!(
            justification(&doc, &plain.into()),
            PropertyValue::Justification(Justification::Both)
        );
        assert_eq!(
            justification(&doc, &heading.into()),
            PropertyValue::Justification(Justification::Center)
        );
        assert_eq!(
            justification(&doc, &direct.into()),
            PropertyValue::Justification(Justification::Right)
        );
        assert_eq!(
            doc.resolve(&heading.into(), ParagraphPropertyKey::KeepLines),
            PropertyValue::Bool(true)
        );
    }

    #[test]
    fn test_document_defaults_before_schema_defaults() {
        let mut doc = Document::new();
        doc.defaults_mut().paragraph.justification = Some(Justification::Left);
        let p = doc.add_paragraph(Paragraph::new());
        assert_eq!(
            justification(&doc, &p.into()),
            PropertyValue::Justification(Justification::Left)
        );
    }

    #[test]
    fn test_dangling_style_falls_back_to_default_style() {
        let mut doc = styled_doc();
        let p = doc.add_paragraph(Paragraph::new().with_style("Missing"));
        assert_eq!(
            doc.resolve(&p.into(), ParagraphPropertyKey::KeepLines),
            PropertyValue::Bool(true)
        );
    }

    #[test]
    fn test_base_style_cycle_terminates() {
        let mut doc = Document::new();
        doc.styles_mut().insert(
            Style::new("A", StyleType::Paragraph)
                .with_based_on("B")
                .with_paragraph_properties(ParagraphProperties {
                    keep_next: Some(true),
                    ..Default::default()
                }),
        );
        doc.styles_mut().insert(
            Style::new("B", StyleType::Paragraph)
                .with_based_on("A")
                .with_paragraph_properties(justified(Justification::Center)),
        );
        let p = doc.add_paragraph(Paragraph::new().with_style("A"));
        let ctx = p.into();
        assert_eq!(
            justification(&doc, &ctx),
            PropertyValue::Justification(Justification::Center)
        );
        assert_eq!(
            doc.resolve(&ctx, ParagraphPropertyKey::KeepNext),
            PropertyValue::Bool(true)
        );
        assert_eq!(
            doc.resolve(&ctx, ParagraphPropertyKey::WidowControl),
            PropertyValue::Bool(false)
        );
    }

    #[test]
    fn test_table_region_between_direct_and_style() {
        let mut doc = styled_doc();
        let mut grid = Style::new("Grid", StyleType::Table);
        grid.region_mut(TableRegionType::FirstRow).paragraph = justified(Justification::Right);
        grid.region_mut(TableRegionType::WholeTable).paragraph.keep_next = Some(true);
        doc.styles_mut().insert(grid);

        let table = doc.add_table(2, 1, 100.0);
        doc.table_mut(table)
            .unwrap()
            .set_style_id(Some("Grid".to_string()));
        let header = doc.cell_paragraph(table, 0, 0).unwrap();
        let body = doc.cell_paragraph(table, 1, 0).unwrap();
        doc.paragraph_mut(body)
            .unwrap()
            .set_style_id(Some("Heading1".to_string()));

        assert_eq!(
            justification(&doc, &header.into()),
            PropertyValue::Justification(Justification::Right)
        );
        assert_eq!(
            justification(&doc, &body.into()),
            PropertyValue::Justification(Justification::Center)
        );
        assert_eq!(
            doc.resolve(&body.into(), ParagraphPropertyKey::KeepNext),
            PropertyValue::Bool(true)
        );

        doc.paragraph_mut(header).unwrap().properties = justified(Justification::Left);
        assert_eq!(
            justification(&doc, &header.into()),
            PropertyValue::Justification(Justification::Left)
        );
    }

    #[test]
    fn test_table_region_style_context() {
        let mut doc = Document::new();
        let mut grid = Style::new("Grid", StyleType::Table)
            .with_paragraph_properties(justified(Justification::Center));
        grid.region_mut(TableRegionType::LastRow).paragraph = justified(Justification::Right);
        doc.styles_mut().insert(grid);

        let last = ResolutionContext::table_region("Grid", TableRegionType::LastRow);
        let first = ResolutionContext::table_region("Grid", TableRegionType::FirstRow);
        assert_eq!(
            justification(&doc, &last),
            PropertyValue::Justification(Justification::Right)
        );
        assert_eq!(
            justification(&doc, &first),
            PropertyValue::Justification(Justification::Center)
        );
    }

    #[test]
    fn test_set_property_writes_most_specific_level() {
        let mut doc = styled_doc();
        let p = doc.add_paragraph(Paragraph::new().with_style("Heading1"));
        doc.set_property(
            &ResolutionContext::style("Heading1"),
            ParagraphPropertyKey::Justification,
            Some(PropertyValue::Justification(Justification::Distribute)),
        )
        .unwrap();
        assert!(doc.paragraph(p).unwrap().properties().is_empty());
        assert_eq!(
            justification(&doc, &p.into()),
            PropertyValue::Justification(Justification::Distribute)
        );

        let err = doc
            .set_property(
                &ResolutionContext::style("Nope"),
                ParagraphPropertyKey::KeepNext,
                Some(PropertyValue::Bool(true)),
            )
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[test]
    fn test_run_levels_cascade() {
        let mut doc = styled_doc();
        doc.defaults_mut().run.font_size = Some(12.0);
        doc.styles_mut().insert(
            Style::new("Emphasis", StyleType::Character).with_run_properties(RunProperties {
                italic: Some(true),
                ..Default::default()
            }),
        );
        let mut para = Paragraph::new();
        para.add_item(TextRun::new("x").with_style("Emphasis"));
        let p = doc.add_paragraph(para);

        let resolver = doc.resolver();
        assert_eq!(
            resolver.resolve_run(p, Some(0), RunPropertyKey::Italic),
            PropertyValue::Bool(true)
        );
        assert_eq!(
            resolver.resolve_run(p, None, RunPropertyKey::Italic),
            PropertyValue::Bool(false)
        );
        assert_eq!(
            resolver.resolve_run(p, Some(0), RunPropertyKey::FontSize),
            PropertyValue::Float(12.0)
        );
        assert_eq!(resolver.normal_font_size(), 12.0);
    }

    #[test]
    fn test_normal_font_size_default() {
        let doc = Document::new();
        assert_eq!(doc.resolver().normal_font_size(), 10.5);
    }
}
