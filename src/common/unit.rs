//! Unit conversion utilities.
//!
//! WordprocessingML stores lengths in a handful of integer units (twentieths
//! of a point, half-points, hundredths of a character or line, 240ths of a
//! line). The document model keeps everything in points and character/line
//! counts; the layout engine works in device pixels.
//!
//! The Word-specific multipliers below are kept as named constants rather than
//! re-derived, since their only contract is matching what Word writes.

pub const POINTS_PER_INCH: f64 = 72.0;
pub const DEFAULT_DPI: f64 = 96.0;
pub const TWIPS_PER_POINT: f64 = 20.0;
pub const HALF_POINTS_PER_POINT: f64 = 2.0;
/// `w:leftChars`, `w:beforeLines` and friends are stored in hundredths.
pub const HUNDREDTHS: f64 = 100.0;
/// `w:spacing/@w:line` for the `auto` rule is stored in 240ths of a line,
/// which is 12 once divided by [`TWIPS_PER_POINT`].
pub const LINE_SPACING_UNIT: f64 = 12.0;
/// Point value written next to a character- or line-unit value so that
/// consumers ignoring the `*Chars`/`*Lines` attributes still see an indent.
pub const CHARS_TO_POINTS: f64 = 5.0;
/// Word's `w:docGrid/@w:charSpace` is a delta over the default font size
/// expressed in 4096ths of a point.
pub const CHAR_SPACE_DIVISOR: f64 = 4096.0;
/// Font size used when neither styles nor document defaults specify one.
pub const DEFAULT_FONT_SIZE_PT: f64 = 10.5;

#[inline]
pub fn pt_to_px(pt: f64, dpi: f64) -> f64 {
    pt / POINTS_PER_INCH * dpi
}

#[inline]
pub fn px_to_pt(px: f64, dpi: f64) -> f64 {
    px * POINTS_PER_INCH / dpi
}

#[inline]
pub fn pt_to_px_96(pt: f64) -> f64 {
    pt_to_px(pt, DEFAULT_DPI)
}

#[inline]
pub fn twips_to_pt(twips: i64) -> f64 {
    twips as f64 / TWIPS_PER_POINT
}

#[inline]
pub fn pt_to_twips(pt: f64) -> i64 {
    (pt * TWIPS_PER_POINT).round() as i64
}

#[inline]
pub fn half_points_to_pt(half_points: i64) -> f64 {
    half_points as f64 / HALF_POINTS_PER_POINT
}

#[inline]
pub fn pt_to_half_points(pt: f64) -> i64 {
    (pt * HALF_POINTS_PER_POINT).round() as i64
}

#[inline]
pub fn hundredths_to_units(value: i64) -> f64 {
    value as f64 / HUNDREDTHS
}

#[inline]
pub fn units_to_hundredths(units: f64) -> i64 {
    (units * HUNDREDTHS).round() as i64
}

/// English Metric Units per point, for `wp:extent` sizes of inline pictures.
pub const EMUS_PER_PT: i64 = 12_700;

#[inline]
pub fn emu_to_pt(emu: i64) -> f64 {
    emu as f64 / EMUS_PER_PT as f64
}

#[inline]
pub fn pt_to_emu(pt: f64) -> i64 {
    (pt * EMUS_PER_PT as f64).round() as i64
}

/// Format a float for an XML attribute without a trailing `.0`.
pub(crate) fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
        let mut buffer = itoa::Buffer::new();
        buffer.format(value as i64).to_string()
    } else {
        let mut buffer = ryu::Buffer::new();
        buffer.format(value).to_string()
    }
}
