//! Property holders: typed bags of optional formatting values.
//!
//! A holder is attached to one level of the formatting cascade (a
//! paragraph's `w:pPr`, a style's `w:pPr`, a table style region, or the
//! document defaults). Every field is optional; `None` means "not set at this
//! level", never "set to the default".
//!
//! Both holders are generated from a single schema table so that the typed
//! fields, the dynamic [`ParagraphPropertyKey`]/[`RunPropertyKey`] access and
//! the hard-coded fallback defaults cannot drift apart.
use crate::common::error::{Error, Result};
use crate::common::unit::DEFAULT_FONT_SIZE_PT;
use crate::docx::enums::{
    Justification, LineSpacingRule, OutlineLevel, TextAlignment, VerticalPosition,
};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// A dynamically typed property value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PropertyValue {
    Bool(bool),
    Float(f64),
    Index(u32),
    Text(String),
    Justification(Justification),
    OutlineLevel(OutlineLevel),
    TextAlignment(TextAlignment),
    LineSpacingRule(LineSpacingRule),
    VerticalPosition(VerticalPosition),
}

impl PropertyValue {
    fn type_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "Bool",
            Self::Float(_) => "Float",
            Self::Index(_) => "Index",
            Self::Text(_) => "Text",
            Self::Justification(_) => "Justification",
            Self::OutlineLevel(_) => "OutlineLevel",
            Self::TextAlignment(_) => "TextAlignment",
            Self::LineSpacingRule(_) => "LineSpacingRule",
            Self::VerticalPosition(_) => "VerticalPosition",
        }
    }
}

macro_rules! property_schema {
    (
        $(#[$smeta:meta])*
        pub struct $name:ident;
        $(#[$kmeta:meta])*
        pub enum $key:ident {
            $(
                $(#[$fmeta:meta])*
                $variant:ident => $field:ident : $ty:ty as $vkind:ident = $default:expr
            ),+ $(,)?
        }
    ) => {
        $(#[$smeta])*
        #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
        pub struct $name {
            $(
                $(#[$fmeta])*
                pub $field: Option<$ty>,
            )+
        }

        $(#[$kmeta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $key {
            $($variant,)+
        }

        impl $key {
            /// Every key, in schema order.
            pub const ALL: &'static [$key] = &[$($key::$variant,)+];

            /// Schema name of the key.
            pub const fn name(self) -> &'static str {
                match self {
                    $($key::$variant => stringify!($variant),)+
                }
            }

            /// Hard-coded fallback used when no level of the cascade sets the value.
            pub fn default_value(self) -> PropertyValue {
                match self {
                    $($key::$variant => PropertyValue::$vkind($default),)+
                }
            }
        }

        impl $name {
            /// Create an empty holder.
            #[inline]
            pub fn new() -> Self {
                Self::default()
            }

            /// Whether no value is set at this level.
            pub fn is_empty(&self) -> bool {
                true $(&& self.$field.is_none())+
            }

            /// Unset every value at this level.
            pub fn clear(&mut self) {
                *self = Self::default();
            }

            /// Get the value set at this level, if any.
            pub fn get(&self, key: $key) -> Option<PropertyValue> {
                match key {
                    $($key::$variant => self.$field.clone().map(PropertyValue::$vkind),)+
                }
            }

            /// Set (or with `None`, unset) the value at this level.
            ///
            /// Fails with [`Error::InvalidArgument`] if the value has the wrong
            /// type for the key.
            pub fn set(&mut self, key: $key, value: Option<PropertyValue>) -> Result<()> {
                match key {
                    $(
                        $key::$variant => match value {
                            None => self.$field = None,
                            Some(PropertyValue::$vkind(v)) => self.$field = Some(v),
                            Some(other) => {
                                return Err(Error::invalid_argument(format!(
                                    "{} expects a {} value, got {}",
                                    key.name(),
                                    stringify!($vkind),
                                    other.type_name()
                                )));
                            },
                        },
                    )+
                }
                Ok(())
            }

            /// A holder with every value set to its hard-coded default.
            pub fn hard_defaults() -> &'static $name {
                static DEFAULTS: Lazy<$name> = Lazy::new(|| $name {
                    $($field: Some($default),)+
                });
                &DEFAULTS
            }

            /// Fill every unset value from `other`.
            pub fn fill_missing_from(&mut self, other: &$name) {
                $(
                    if self.$field.is_none() {
                        self.$field = other.$field.clone();
                    }
                )+
            }
        }
    };
}

property_schema! {
    /// Paragraph properties (`w:pPr`) at one level of the cascade.
    ///
    /// Lengths are in points, character counts in characters and line counts
    /// in lines; the XML reader and writer convert from and to Word's
    /// integer units.
    pub struct ParagraphProperties;

    /// Key of a paragraph property, for dynamic access.
    pub enum ParagraphPropertyKey {
        Justification => justification: Justification as Justification = Justification::Both,
        OutlineLevel => outline_level: OutlineLevel as OutlineLevel = OutlineLevel::BodyText,
        MirrorIndents => mirror_indents: bool as Bool = false,
        AdjustRightIndent => adjust_right_indent: bool as Bool = true,
        BeforeAutoSpacing => before_auto_spacing: bool as Bool = false,
        AfterAutoSpacing => after_auto_spacing: bool as Bool = false,
        ContextualSpacing => contextual_spacing: bool as Bool = false,
        SnapToGrid => snap_to_grid: bool as Bool = true,
        WidowControl => widow_control: bool as Bool = false,
        KeepNext => keep_next: bool as Bool = false,
        KeepLines => keep_lines: bool as Bool = false,
        PageBreakBefore => page_break_before: bool as Bool = false,
        SuppressLineNumbers => suppress_line_numbers: bool as Bool = false,
        SuppressAutoHyphens => suppress_auto_hyphens: bool as Bool = false,
        Kinsoku => kinsoku: bool as Bool = true,
        WordWrap => word_wrap: bool as Bool = true,
        OverflowPunctuation => overflow_punctuation: bool as Bool = true,
        TopLinePunctuation => top_line_punctuation: bool as Bool = false,
        AutoSpaceDE => auto_space_de: bool as Bool = true,
        AutoSpaceDN => auto_space_dn: bool as Bool = true,
        TextAlignment => text_alignment: TextAlignment as TextAlignment = TextAlignment::Auto,
        /// `w:ind/@w:left`, hanging amount included.
        LeftIndent => left_indent: f64 as Float = 0.0,
        LeftCharsIndent => left_chars_indent: f64 as Float = 0.0,
        RightIndent => right_indent: f64 as Float = 0.0,
        RightCharsIndent => right_chars_indent: f64 as Float = 0.0,
        FirstLineIndent => first_line_indent: f64 as Float = 0.0,
        FirstLineCharsIndent => first_line_chars_indent: f64 as Float = 0.0,
        HangingIndent => hanging_indent: f64 as Float = 0.0,
        HangingCharsIndent => hanging_chars_indent: f64 as Float = 0.0,
        BeforeSpacing => before_spacing: f64 as Float = 0.0,
        BeforeLinesSpacing => before_lines_spacing: f64 as Float = 0.0,
        AfterSpacing => after_spacing: f64 as Float = 0.0,
        AfterLinesSpacing => after_lines_spacing: f64 as Float = 0.0,
        /// `w:spacing/@w:line` in points; a multiple of 1.0 is stored as 12.
        LineSpacing => line_spacing: f64 as Float = 12.0,
        LineSpacingRule => line_spacing_rule: LineSpacingRule as LineSpacingRule = LineSpacingRule::Multiple,
        NumberingId => numbering_id: u32 as Index = 0,
        NumberingLevel => numbering_level: u32 as Index = 0,
    }
}

impl ParagraphProperties {
    /// Whether any of the four special indentation fields is set.
    #[inline]
    pub fn has_special_indentation(&self) -> bool {
        self.first_line_indent.is_some()
            || self.first_line_chars_indent.is_some()
            || self.hanging_indent.is_some()
            || self.hanging_chars_indent.is_some()
    }
}

property_schema! {
    /// Run properties (`w:rPr`) at one level of the cascade.
    pub struct RunProperties;

    /// Key of a run property, for dynamic access.
    pub enum RunPropertyKey {
        /// Font size in points (`w:sz` is in half-points).
        FontSize => font_size: f64 as Float = DEFAULT_FONT_SIZE_PT,
        FontSizeCs => font_size_cs: f64 as Float = DEFAULT_FONT_SIZE_PT,
        Bold => bold: bool as Bool = false,
        Italic => italic: bool as Bool = false,
        FontNameAscii => font_name_ascii: String as Text = String::new(),
        FontNameEastAsia => font_name_east_asia: String as Text = String::new(),
        /// Horizontal scale in percent (`w:w`).
        CharacterScale => character_scale: f64 as Float = 100.0,
        /// Extra space between characters in points (`w:spacing`).
        CharacterSpacing => character_spacing: f64 as Float = 0.0,
        /// Baseline raise in points (`w:position`).
        Position => position: f64 as Float = 0.0,
        VerticalPosition => vertical_position: VerticalPosition as VerticalPosition = VerticalPosition::Baseline,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_holder_is_empty() {
        let props = ParagraphProperties::new();
        assert!(props.is_empty());
        for key in ParagraphPropertyKey::ALL {
            assert_eq!(props.get(*key), None);
        }
    }

    #[test]
    fn test_dynamic_set_and_get() {
        let mut props = ParagraphProperties::new();
        props
            .set(
                ParagraphPropertyKey::Justification,
                Some(PropertyValue::Justification(Justification::Center)),
            )
            .unwrap();
        assert_eq!(props.justification, Some(Justification::Center));
        assert_eq!(
            props.get(ParagraphPropertyKey::Justification),
            Some(PropertyValue::Justification(Justification::Center))
        );
        assert!(!props.is_empty());

        props.set(ParagraphPropertyKey::Justification, None).unwrap();
        assert!(props.is_empty());
    }

    #[test]
    fn test_set_rejects_wrong_type() {
        let mut props = ParagraphProperties::new();
        let err = props
            .set(ParagraphPropertyKey::KeepNext, Some(PropertyValue::Float(1.0)))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
        assert_eq!(props.keep_next, None);
    }

    #[test]
    fn test_defaults_follow_schema() {
        assert_eq!(
            ParagraphPropertyKey::Justification.default_value(),
            PropertyValue::Justification(Justification::Both)
        );
        assert_eq!(
            ParagraphPropertyKey::SnapToGrid.default_value(),
            PropertyValue::Bool(true)
        );
        assert_eq!(
            RunPropertyKey::FontSize.default_value(),
            PropertyValue::Float(10.5)
        );
    }

    #[test]
    fn test_hard_defaults_are_complete() {
        let defaults = ParagraphProperties::hard_defaults();
        for key in ParagraphPropertyKey::ALL {
            assert_eq!(defaults.get(*key), Some(key.default_value()));
        }
        assert_eq!(RunProperties::hard_defaults().character_scale, Some(100.0));
    }

    #[test]
    fn test_fill_missing_from() {
        let mut direct = RunProperties {
            bold: Some(true),
            ..Default::default()
        };
        let style = RunProperties {
            bold: Some(false),
            font_size: Some(14.0),
            ..Default::default()
        };
        direct.fill_missing_from(&style);
        assert_eq!(direct.bold, Some(true));
        assert_eq!(direct.font_size, Some(14.0));
    }

    #[test]
    fn test_clear() {
        let mut props = ParagraphProperties {
            keep_lines: Some(true),
            left_indent: Some(12.0),
            ..Default::default()
        };
        assert!(!props.has_special_indentation());
        props.clear();
        assert!(props.is_empty());
    }
}
