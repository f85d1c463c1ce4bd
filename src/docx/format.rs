//! Resolved formatting value types returned by the paragraph format getters.
use crate::docx::enums::{IndentationUnit, LineSpacingRule, SpacingUnit, SpecialIndentationType};
use serde::{Deserialize, Serialize};

/// Left or right indentation.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Indentation {
    pub value: f64,
    pub unit: IndentationUnit,
}

impl Indentation {
    #[inline]
    pub const fn new(value: f64, unit: IndentationUnit) -> Self {
        Self { value, unit }
    }

    #[inline]
    pub const fn chars(value: f64) -> Self {
        Self::new(value, IndentationUnit::Character)
    }

    #[inline]
    pub const fn points(value: f64) -> Self {
        Self::new(value, IndentationUnit::Point)
    }
}

/// First-line or hanging indentation.
///
/// The value is always a non-negative magnitude; the kind says which
/// direction it applies in.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SpecialIndentation {
    pub kind: SpecialIndentationType,
    pub value: f64,
    pub unit: IndentationUnit,
}

impl SpecialIndentation {
    #[inline]
    pub const fn new(kind: SpecialIndentationType, value: f64, unit: IndentationUnit) -> Self {
        Self { kind, value, unit }
    }

    /// No special indentation.
    #[inline]
    pub const fn none() -> Self {
        Self::new(SpecialIndentationType::None, 0.0, IndentationUnit::Character)
    }

    /// Value with the layout sign applied: positive for first-line,
    /// negative for hanging, zero otherwise.
    #[inline]
    pub fn signed_value(&self) -> f64 {
        match self.kind {
            SpecialIndentationType::FirstLine => self.value,
            SpecialIndentationType::Hanging => -self.value,
            SpecialIndentationType::None => 0.0,
        }
    }
}

/// Spacing before or after a paragraph.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Spacing {
    pub value: f64,
    pub unit: SpacingUnit,
}

impl Spacing {
    #[inline]
    pub const fn new(value: f64, unit: SpacingUnit) -> Self {
        Self { value, unit }
    }

    #[inline]
    pub const fn lines(value: f64) -> Self {
        Self::new(value, SpacingUnit::Line)
    }

    #[inline]
    pub const fn points(value: f64) -> Self {
        Self::new(value, SpacingUnit::Point)
    }
}

/// Spacing between lines of a paragraph.
///
/// For [`LineSpacingRule::Multiple`] the value is a factor (1.0 = single);
/// for the other rules it is a height in points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LineSpacing {
    pub value: f64,
    pub rule: LineSpacingRule,
}

impl LineSpacing {
    #[inline]
    pub const fn new(value: f64, rule: LineSpacingRule) -> Self {
        Self { value, rule }
    }

    #[inline]
    pub const fn single() -> Self {
        Self::new(1.0, LineSpacingRule::Multiple)
    }

    #[inline]
    pub const fn multiple(factor: f64) -> Self {
        Self::new(factor, LineSpacingRule::Multiple)
    }

    #[inline]
    pub const fn exact(points: f64) -> Self {
        Self::new(points, LineSpacingRule::Exact)
    }

    #[inline]
    pub const fn at_least(points: f64) -> Self {
        Self::new(points, LineSpacingRule::AtLeast)
    }
}

impl Default for LineSpacing {
    fn default() -> Self {
        Self::single()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signed_special_value() {
        let hanging = SpecialIndentation::new(
            SpecialIndentationType::Hanging,
            5.0,
            IndentationUnit::Point,
        );
        assert_eq!(hanging.value, 5.0);
        assert_eq!(hanging.signed_value(), -5.0);
        assert_eq!(SpecialIndentation::none().signed_value(), 0.0);
    }

    #[test]
    fn test_line_spacing_default_is_single() {
        assert_eq!(LineSpacing::default(), LineSpacing::multiple(1.0));
    }
}
