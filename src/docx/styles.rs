/// Styles - document styles and formatting definitions.
use crate::docx::enums::{StyleType, TableRegionType};
use crate::docx::properties::{ParagraphProperties, RunProperties};
use fixedbitset::FixedBitSet;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Conditional formatting of one table style region (`w:tblStylePr`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableRegionStyle {
    pub region: TableRegionType,
    pub paragraph: ParagraphProperties,
    pub run: RunProperties,
}

impl TableRegionStyle {
    #[inline]
    pub fn new(region: TableRegionType) -> Self {
        Self {
            region,
            paragraph: ParagraphProperties::default(),
            run: RunProperties::default(),
        }
    }
}

/// A single style definition in a Word document.
///
/// Represents a `<w:style>` element with its properties.
/// Can be a paragraph, character, table, or list style.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Style {
    /// Style identifier (required)
    style_id: String,
    /// UI-visible name
    name: Option<String>,
    /// Type of style (paragraph, character, table, or list)
    style_type: StyleType,
    /// Whether this is the default style for its type
    is_default: bool,
    /// Whether this is a custom (user-defined) style
    is_custom: bool,
    /// ID of the style this is based on
    based_on: Option<String>,
    /// UI priority for display ordering
    priority: Option<i32>,
    /// Paragraph properties set directly on the style
    pub(crate) paragraph: ParagraphProperties,
    /// Run properties set directly on the style
    pub(crate) run: RunProperties,
    /// Table style region overrides
    pub(crate) regions: Vec<TableRegionStyle>,
}

impl Style {
    /// Create a style with no formatting.
    pub fn new(style_id: impl Into<String>, style_type: StyleType) -> Self {
        Self {
            style_id: style_id.into(),
            name: None,
            style_type,
            is_default: false,
            is_custom: false,
            based_on: None,
            priority: None,
            paragraph: ParagraphProperties::default(),
            run: RunProperties::default(),
            regions: Vec::new(),
        }
    }

    /// Builder-style setter for the UI name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Builder-style setter for the base style.
    pub fn with_based_on(mut self, based_on: impl Into<String>) -> Self {
        self.based_on = Some(based_on.into());
        self
    }

    /// Builder-style setter for the default flag.
    pub fn with_default(mut self, is_default: bool) -> Self {
        self.is_default = is_default;
        self
    }

    /// Builder-style setter for the direct paragraph properties.
    pub fn with_paragraph_properties(mut self, props: ParagraphProperties) -> Self {
        self.paragraph = props;
        self
    }

    /// Builder-style setter for the direct run properties.
    pub fn with_run_properties(mut self, props: RunProperties) -> Self {
        self.run = props;
        self
    }

    /// Get the style identifier.
    #[inline]
    pub fn style_id(&self) -> &str {
        &self.style_id
    }

    /// Get the style name.
    ///
    /// Returns `None` if no name is defined.
    #[inline]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub(crate) fn set_name(&mut self, name: Option<String>) {
        self.name = name;
    }

    /// Get the style type.
    #[inline]
    pub fn style_type(&self) -> StyleType {
        self.style_type
    }

    /// Check if this is the default style for its type.
    #[inline]
    pub fn is_default(&self) -> bool {
        self.is_default
    }

    /// Check if this is a custom (user-defined) style.
    #[inline]
    pub fn is_custom(&self) -> bool {
        self.is_custom
    }

    pub(crate) fn set_custom(&mut self, is_custom: bool) {
        self.is_custom = is_custom;
    }

    /// Get the ID of the style this is based on.
    #[inline]
    pub fn based_on(&self) -> Option<&str> {
        self.based_on.as_deref()
    }

    /// Change the base style. `None` detaches the style from its parent.
    pub fn set_based_on(&mut self, based_on: Option<String>) {
        self.based_on = based_on;
    }

    /// Get the UI priority for this style.
    #[inline]
    pub fn priority(&self) -> Option<i32> {
        self.priority
    }

    pub(crate) fn set_priority(&mut self, priority: Option<i32>) {
        self.priority = priority;
    }

    /// Paragraph properties set directly on this style.
    #[inline]
    pub fn paragraph_properties(&self) -> &ParagraphProperties {
        &self.paragraph
    }

    /// Run properties set directly on this style.
    #[inline]
    pub fn run_properties(&self) -> &RunProperties {
        &self.run
    }

    /// Overrides of a table style region, if this style defines it.
    pub fn region(&self, region: TableRegionType) -> Option<&TableRegionStyle> {
        self.regions.iter().find(|r| r.region == region)
    }

    /// Overrides of a table style region, created empty if missing.
    pub fn region_mut(&mut self, region: TableRegionType) -> &mut TableRegionStyle {
        let pos = match self.regions.iter().position(|r| r.region == region) {
            Some(pos) => pos,
            None => {
                self.regions.push(TableRegionStyle::new(region));
                self.regions.len() - 1
            },
        };
        &mut self.regions[pos]
    }

    /// All table style regions this style defines.
    #[inline]
    pub fn regions(&self) -> &[TableRegionStyle] {
        &self.regions
    }
}

/// Index of a style inside a [`StyleTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StyleIndex(pub usize);

/// Arena of style definitions, addressed by style id.
///
/// # Examples
///
/// ```rust
/// use longan::docx::enums::StyleType;
/// use longan::docx::styles::{Style, StyleTable};
///
/// let mut styles = StyleTable::new();
/// styles.insert(Style::new("Normal", StyleType::Paragraph).with_default(true));
/// styles.insert(Style::new("Heading1", StyleType::Paragraph).with_based_on("Normal"));
///
/// let chain: Vec<_> = styles.base_chain("Heading1").map(|s| s.style_id()).collect();
/// assert_eq!(chain, ["Heading1", "Normal"]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct StyleTable {
    styles: Vec<Style>,
    by_id: HashMap<String, StyleIndex>,
}

impl StyleTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the number of styles.
    #[inline]
    pub fn len(&self) -> usize {
        self.styles.len()
    }

    /// Check if there are no styles defined.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.styles.is_empty()
    }

    /// Get an iterator over all styles.
    pub fn iter(&self) -> std::slice::Iter<'_, Style> {
        self.styles.iter()
    }

    /// Add a style, replacing any style with the same id.
    ///
    /// Marking the style as default clears the flag on the other styles of
    /// the same type, so that at most one default exists per type.
    pub fn insert(&mut self, style: Style) -> StyleIndex {
        if style.is_default {
            for other in self
                .styles
                .iter_mut()
                .filter(|s| s.style_type == style.style_type && s.style_id != style.style_id)
            {
                other.is_default = false;
            }
        }
        match self.by_id.get(&style.style_id) {
            Some(&idx) => {
                self.styles[idx.0] = style;
                idx
            },
            None => {
                let idx = StyleIndex(self.styles.len());
                self.by_id.insert(style.style_id.clone(), idx);
                self.styles.push(style);
                idx
            },
        }
    }

    /// Look up the arena index of a style id.
    #[inline]
    pub fn index_of(&self, style_id: &str) -> Option<StyleIndex> {
        self.by_id.get(style_id).copied()
    }

    /// Get a style by its ID.
    ///
    /// Returns `None` if no style with the given ID is found.
    #[inline]
    pub fn get(&self, style_id: &str) -> Option<&Style> {
        self.index_of(style_id).map(|idx| &self.styles[idx.0])
    }

    /// Get a mutable style by its ID.
    pub fn get_mut(&mut self, style_id: &str) -> Option<&mut Style> {
        let idx = self.index_of(style_id)?;
        self.styles.get_mut(idx.0)
    }

    /// Get a style by its name and type.
    pub fn find_by_name(&self, name: &str, style_type: StyleType) -> Option<&Style> {
        self.styles
            .iter()
            .find(|s| s.style_type == style_type && s.name.as_deref() == Some(name))
    }

    /// Get the default style for a given style type.
    ///
    /// Returns `None` if no default style is defined for that type.
    pub fn default_style(&self, style_type: StyleType) -> Option<&Style> {
        self.styles
            .iter()
            .find(|s| s.is_default && s.style_type == style_type)
    }

    /// Walk a style and its base styles, most specific first.
    ///
    /// A dangling id yields an empty chain. A base-style cycle ends the walk
    /// at the first repeated style and logs a warning.
    pub fn base_chain<'a>(&'a self, style_id: &str) -> BaseChain<'a> {
        BaseChain {
            table: self,
            next: self.index_of(style_id),
            visited: FixedBitSet::with_capacity(self.styles.len()),
        }
    }
}

/// Iterator over a style's base-style chain.
///
/// See [`StyleTable::base_chain`].
pub struct BaseChain<'a> {
    table: &'a StyleTable,
    next: Option<StyleIndex>,
    visited: FixedBitSet,
}

impl<'a> BaseChain<'a> {
    /// Mark styles as already walked so the chain stops before them.
    ///
    /// Used when walking a fallback chain after a more specific one.
    pub(crate) fn skipping(mut self, visited: &FixedBitSet) -> Self {
        self.visited.union_with(visited);
        if self.next.is_some_and(|idx| self.visited.contains(idx.0)) {
            self.next = None;
        }
        self
    }

    /// Styles yielded so far.
    pub(crate) fn visited(&self) -> &FixedBitSet {
        &self.visited
    }
}

impl<'a> Iterator for BaseChain<'a> {
    type Item = &'a Style;

    fn next(&mut self) -> Option<Self::Item> {
        let idx = self.next.take()?;
        self.visited.insert(idx.0);
        let style = &self.table.styles[idx.0];

        if let Some(base_id) = style.based_on.as_deref() {
            match self.table.index_of(base_id) {
                Some(base) if self.visited.contains(base.0) => {
                    log::warn!(
                        "base style cycle detected at style '{}' -> '{}'; ignoring the rest of the chain",
                        style.style_id,
                        base_id
                    );
                },
                Some(base) => self.next = Some(base),
                None => {
                    log::debug!(
                        "style '{}' is based on unknown style '{}'",
                        style.style_id,
                        base_id
                    );
                },
            }
        }
        Some(style)
    }
}
