/// Enumerations for WordprocessingML formatting values.
///
/// Each enumeration maps to the attribute values used in the XML and offers
/// `from_xml`/`to_xml` conversions. Unknown values are reported as `None`
/// by `from_xml` so the readers can fall back instead of failing.
use serde::{Deserialize, Serialize};
use std::fmt;

/// Implements `to_xml`, `from_xml` and `Display` for a fieldless enum.
///
/// The first XML spelling of each variant is the one written back; extra
/// spellings are accepted on read only.
macro_rules! xml_enum {
    ($name:ident { $($variant:ident => $xml:literal $(| $alias:literal)*),+ $(,)? }) => {
        impl $name {
            /// Convert to the XML attribute value.
            #[inline]
            pub const fn to_xml(self) -> &'static str {
                match self {
                    $(Self::$variant => $xml,)+
                }
            }

            /// Parse from an XML attribute value.
            ///
            /// Returns `None` if the value is not recognized.
            #[inline]
            pub fn from_xml(s: &str) -> Option<Self> {
                match s {
                    $($xml $(| $alias)* => Some(Self::$variant),)+
                    _ => None,
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.to_xml())
            }
        }
    };
}

/// Paragraph justification (`w:jc`).
///
/// # Examples
///
/// ```rust
/// use longan::docx::enums::Justification;
///
/// assert_eq!(Justification::from_xml("both"), Some(Justification::Both));
/// assert_eq!(Justification::from_xml("start"), Some(Justification::Left));
/// assert_eq!(Justification::Center.to_xml(), "center");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Justification {
    Left,
    Center,
    Right,
    /// Justified on both sides, Word's default for body text.
    #[default]
    Both,
    Distribute,
}

xml_enum!(Justification {
    Left => "left" | "start",
    Center => "center",
    Right => "right" | "end",
    Both => "both",
    Distribute => "distribute",
});

/// Outline level of a paragraph (`w:outlineLvl`).
///
/// Stored in XML as a zero-based integer; `9` means body text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum OutlineLevel {
    Level1,
    Level2,
    Level3,
    Level4,
    Level5,
    Level6,
    Level7,
    Level8,
    Level9,
    #[default]
    BodyText,
}

impl OutlineLevel {
    const ALL: [Self; 10] = [
        Self::Level1,
        Self::Level2,
        Self::Level3,
        Self::Level4,
        Self::Level5,
        Self::Level6,
        Self::Level7,
        Self::Level8,
        Self::Level9,
        Self::BodyText,
    ];

    /// Zero-based index as written in `w:outlineLvl/@w:val`.
    #[inline]
    pub fn to_index(self) -> u8 {
        Self::ALL.iter().position(|l| *l == self).unwrap_or(9) as u8
    }

    /// Parse from the zero-based index. Out-of-range values are body text.
    #[inline]
    pub fn from_index(index: u8) -> Self {
        Self::ALL.get(index as usize).copied().unwrap_or(Self::BodyText)
    }
}

/// Vertical alignment of characters on a line (`w:textAlignment`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TextAlignment {
    #[default]
    Auto,
    Top,
    Center,
    Baseline,
    Bottom,
}

xml_enum!(TextAlignment {
    Auto => "auto",
    Top => "top",
    Center => "center",
    Baseline => "baseline",
    Bottom => "bottom",
});

/// Type of a style definition (`w:style/@w:type`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum StyleType {
    #[default]
    Paragraph,
    Character,
    Table,
    Numbering,
}

xml_enum!(StyleType {
    Paragraph => "paragraph",
    Character => "character",
    Table => "table",
    Numbering => "numbering",
});

/// Document grid type of a section (`w:docGrid/@w:type`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DocGridType {
    /// No grid.
    #[default]
    None,
    /// Line grid only.
    Lines,
    /// Line and character grid; characters advance by the exact pitch.
    LinesAndChars,
    /// Characters snap up to whole multiples of the pitch.
    SnapToChars,
}

xml_enum!(DocGridType {
    None => "default",
    Lines => "lines",
    LinesAndChars => "linesAndChars",
    SnapToChars => "snapToChars",
});

impl DocGridType {
    /// Whether a line grid is in effect.
    #[inline]
    pub fn has_line_grid(self) -> bool {
        !matches!(self, Self::None)
    }
}

/// Unit of an indentation value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum IndentationUnit {
    #[default]
    Character,
    Point,
}

/// Unit of a before/after spacing value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SpacingUnit {
    #[default]
    Line,
    Point,
}

/// Line spacing rule (`w:spacing/@w:lineRule`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum LineSpacingRule {
    /// Proportional to the natural line height.
    #[default]
    Multiple,
    /// Fixed height in points.
    Exact,
    /// Minimum height in points; taller content grows the line.
    AtLeast,
}

xml_enum!(LineSpacingRule {
    Multiple => "auto",
    Exact => "exact",
    AtLeast => "atLeast",
});

/// Kind of special indentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SpecialIndentationType {
    #[default]
    None,
    FirstLine,
    Hanging,
}

/// Conditional formatting region of a table style (`w:tblStylePr/@w:type`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TableRegionType {
    WholeTable,
    FirstRow,
    LastRow,
    FirstColumn,
    LastColumn,
    OddRowBanding,
    EvenRowBanding,
    OddColumnBanding,
    EvenColumnBanding,
    TopLeftCell,
    TopRightCell,
    BottomLeftCell,
    BottomRightCell,
}

xml_enum!(TableRegionType {
    WholeTable => "wholeTable",
    FirstRow => "firstRow",
    LastRow => "lastRow",
    FirstColumn => "firstCol",
    LastColumn => "lastCol",
    OddRowBanding => "band1Horz",
    EvenRowBanding => "band2Horz",
    OddColumnBanding => "band1Vert",
    EvenColumnBanding => "band2Vert",
    TopLeftCell => "nwCell",
    TopRightCell => "neCell",
    BottomLeftCell => "swCell",
    BottomRightCell => "seCell",
});

/// Type of a `w:br` element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BreakType {
    Page,
    Column,
    /// Plain line break (Shift+Enter).
    #[default]
    TextWrapping,
}

xml_enum!(BreakType {
    Page => "page",
    Column => "column",
    TextWrapping => "textWrapping",
});

/// Character following a numbering label (`w:suff`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum LevelSuffix {
    #[default]
    Tab,
    Space,
    Nothing,
}

xml_enum!(LevelSuffix {
    Tab => "tab",
    Space => "space",
    Nothing => "nothing",
});

/// Number format of a numbering level (`w:numFmt`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum NumberFormat {
    #[default]
    Decimal,
    DecimalZero,
    UpperRoman,
    LowerRoman,
    UpperLetter,
    LowerLetter,
    Bullet,
    ChineseCounting,
    ChineseCountingThousand,
    JapaneseCounting,
    None,
}

xml_enum!(NumberFormat {
    Decimal => "decimal",
    DecimalZero => "decimalZero",
    UpperRoman => "upperRoman",
    LowerRoman => "lowerRoman",
    UpperLetter => "upperLetter",
    LowerLetter => "lowerLetter",
    Bullet => "bullet",
    ChineseCounting => "chineseCounting",
    ChineseCountingThousand => "chineseCountingThousand",
    JapaneseCounting => "japaneseCounting",
    None => "none",
});

impl NumberFormat {
    /// Render a counter value in this format.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use longan::docx::enums::NumberFormat;
    ///
    /// assert_eq!(NumberFormat::Decimal.format_value(3), "3");
    /// assert_eq!(NumberFormat::LowerRoman.format_value(4), "iv");
    /// assert_eq!(NumberFormat::UpperLetter.format_value(28), "BB");
    /// assert_eq!(NumberFormat::ChineseCounting.format_value(12), "十二");
    /// ```
    pub fn format_value(self, value: u32) -> String {
        match self {
            Self::Decimal => value.to_string(),
            Self::DecimalZero => format!("{:02}", value),
            Self::UpperRoman => to_roman(value),
            Self::LowerRoman => to_roman(value).to_lowercase(),
            Self::UpperLetter => to_letters(value),
            Self::LowerLetter => to_letters(value).to_lowercase(),
            Self::ChineseCounting | Self::ChineseCountingThousand | Self::JapaneseCounting => {
                to_cjk_counting(value)
            },
            Self::Bullet | Self::None => String::new(),
        }
    }
}

fn to_roman(mut value: u32) -> String {
    const TABLE: [(u32, &str); 13] = [
        (1000, "M"),
        (900, "CM"),
        (500, "D"),
        (400, "CD"),
        (100, "C"),
        (90, "XC"),
        (50, "L"),
        (40, "XL"),
        (10, "X"),
        (9, "IX"),
        (5, "V"),
        (4, "IV"),
        (1, "I"),
    ];
    let mut out = String::new();
    for &(n, s) in TABLE.iter() {
        while value >= n {
            out.push_str(s);
            value -= n;
        }
    }
    out
}

/// Word list letters: 1 → A, 26 → Z, 27 → AA, 28 → BB.
///
/// The letter repeats once per pass through the alphabet; Word wraps back to
/// `A` after 780 (thirty passes).
fn to_letters(value: u32) -> String {
    if value == 0 {
        return String::new();
    }
    let index = (value - 1) % 780;
    let letter = (b'A' + (index % 26) as u8) as char;
    std::iter::repeat_n(letter, (index / 26 + 1) as usize).collect()
}

fn to_cjk_counting(value: u32) -> String {
    const DIGITS: [char; 10] = ['〇', '一', '二', '三', '四', '五', '六', '七', '八', '九'];
    if value == 0 {
        return DIGITS[0].to_string();
    }
    if value >= 100 {
        return value
            .to_string()
            .chars()
            .filter_map(|c| c.to_digit(10).map(|d| DIGITS[d as usize]))
            .collect();
    }
    let tens = value / 10;
    let ones = value % 10;
    let mut out = String::new();
    if tens > 1 {
        out.push(DIGITS[tens as usize]);
    }
    if tens > 0 {
        out.push('十');
    }
    if ones > 0 {
        out.push(DIGITS[ones as usize]);
    }
    out
}

/// Section break kind written to `w:sectPr/w:type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SectionBreakType {
    #[default]
    NextPage,
    Continuous,
    EvenPage,
    OddPage,
    NextColumn,
}

xml_enum!(SectionBreakType {
    NextPage => "nextPage",
    Continuous => "continuous",
    EvenPage => "evenPage",
    OddPage => "oddPage",
    NextColumn => "nextColumn",
});

/// Measurement type of a table column width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CellWidthType {
    #[default]
    Point,
    Percent,
}

/// Superscript/subscript position of a run (`w:vertAlign`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum VerticalPosition {
    #[default]
    Baseline,
    Superscript,
    Subscript,
}

xml_enum!(VerticalPosition {
    Baseline => "baseline",
    Superscript => "superscript",
    Subscript => "subscript",
});

/// Kind of note referenced from a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldReferenceType {
    Footnote,
    Endnote,
}

/// Horizontal alignment of a placed box on a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum HorizontalAlignment {
    #[default]
    Left,
    Center,
    Right,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_justification_default() {
        assert_eq!(Justification::default(), Justification::Both);
        assert_eq!(Justification::from_xml("end"), Some(Justification::Right));
        assert_eq!(Justification::from_xml("bogus"), None);
    }

    #[test]
    fn test_outline_level_index() {
        assert_eq!(OutlineLevel::from_index(0), OutlineLevel::Level1);
        assert_eq!(OutlineLevel::from_index(9), OutlineLevel::BodyText);
        assert_eq!(OutlineLevel::from_index(42), OutlineLevel::BodyText);
        assert_eq!(OutlineLevel::Level3.to_index(), 2);
    }

    #[test]
    fn test_doc_grid_type() {
        assert_eq!(DocGridType::from_xml("default"), Some(DocGridType::None));
        assert_eq!(DocGridType::SnapToChars.to_xml(), "snapToChars");
        assert!(!DocGridType::None.has_line_grid());
        assert!(DocGridType::Lines.has_line_grid());
    }

    #[test]
    fn test_number_format_rendering() {
        assert_eq!(NumberFormat::Decimal.format_value(1), "1");
        assert_eq!(NumberFormat::DecimalZero.format_value(7), "07");
        assert_eq!(NumberFormat::UpperRoman.format_value(1994), "MCMXCIV");
        assert_eq!(NumberFormat::LowerLetter.format_value(1), "a");
        assert_eq!(NumberFormat::UpperLetter.format_value(26), "Z");
        assert_eq!(NumberFormat::LowerLetter.format_value(27), "aa");
        assert_eq!(NumberFormat::LowerLetter.format_value(28), "bb");
        assert_eq!(NumberFormat::UpperLetter.format_value(53), "AAA");
        assert_eq!(NumberFormat::UpperLetter.format_value(781), "A");
        assert_eq!(NumberFormat::ChineseCounting.format_value(1), "一");
        assert_eq!(NumberFormat::ChineseCounting.format_value(10), "十");
        assert_eq!(NumberFormat::ChineseCounting.format_value(25), "二十五");
        assert_eq!(NumberFormat::Bullet.format_value(3), "");
    }

    #[test]
    fn test_table_region_xml() {
        assert_eq!(
            TableRegionType::from_xml("band1Horz"),
            Some(TableRegionType::OddRowBanding)
        );
        assert_eq!(TableRegionType::FirstColumn.to_xml(), "firstCol");
    }
}
