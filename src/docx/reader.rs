//! WordprocessingML part readers.
//!
//! Streaming quick-xml readers for the three parts the formatting engine
//! consumes: `word/styles.xml`, `word/numbering.xml` and
//! `word/document.xml`. Word's integer units are converted on the way in:
//! twips and half-points become points, `*Chars`/`*Lines` hundredths become
//! characters and lines, EMUs become points.
//!
//! Unknown elements are skipped and unparsable attribute values are ignored,
//! so the property falls through to the next level of the cascade instead of
//! failing the whole read.
use crate::common::error::Result;
use crate::common::unit::{emu_to_pt, half_points_to_pt, twips_to_pt};
use crate::docx::document::{DocDefaults, Document};
use crate::docx::enums::{
    BreakType, CellWidthType, DocGridType, FieldReferenceType, Justification, LevelSuffix,
    LineSpacingRule, NumberFormat, OutlineLevel, SectionBreakType, StyleType, TableRegionType,
    TextAlignment, VerticalPosition,
};
use crate::docx::numbering::{AbstractNum, Num, Numbering, NumberingLevel};
use crate::docx::paragraph::{Break, FieldReference, Paragraph, ParagraphItem, Picture, TextRun};
use crate::docx::properties::{ParagraphProperties, RunProperties};
use crate::docx::section::Section;
use crate::docx::styles::{Style, StyleTable};
use crate::docx::table::{CellWidth, Table, TableCell, TableLook, TableRow};
use quick_xml::Reader;
use quick_xml::encoding::Decoder;
use quick_xml::escape::resolve_predefined_entity;
use quick_xml::events::{BytesRef, BytesStart, Event};

/// Value of the attribute with the given local name.
fn attr(e: &BytesStart<'_>, decoder: Decoder, name: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.local_name().as_ref() == name)
        .and_then(|a| a.decode_and_unescape_value(decoder).ok().map(|v| v.into_owned()))
}

#[inline]
fn val(e: &BytesStart<'_>, decoder: Decoder) -> Option<String> {
    attr(e, decoder, b"val")
}

fn float_attr(e: &BytesStart<'_>, decoder: Decoder, name: &[u8]) -> Option<f64> {
    attr(e, decoder, name).and_then(|s| fast_float2::parse(s.trim()).ok())
}

fn int_attr(e: &BytesStart<'_>, decoder: Decoder, name: &[u8]) -> Option<i64> {
    let s = attr(e, decoder, name)?;
    atoi_simd::parse::<i64, false, false>(s.trim().as_bytes())
        .ok()
        .or_else(|| fast_float2::parse::<f64, _>(s.trim()).ok().map(|f| f.round() as i64))
}

fn id_attr(e: &BytesStart<'_>, decoder: Decoder, name: &[u8]) -> Option<u32> {
    let s = attr(e, decoder, name)?;
    atoi_simd::parse::<u32, false, false>(s.trim().as_bytes()).ok()
}

/// On/off element: absent `w:val` means on.
fn toggle(e: &BytesStart<'_>, decoder: Decoder) -> bool {
    !matches!(val(e, decoder).as_deref(), Some("0" | "false" | "off"))
}

/// Twips attribute in points.
fn twips(e: &BytesStart<'_>, decoder: Decoder, name: &[u8]) -> Option<f64> {
    int_attr(e, decoder, name).map(twips_to_pt)
}

/// Hundredths attribute (`w:leftChars`, `w:beforeLines`) in whole units.
fn hundredths(e: &BytesStart<'_>, decoder: Decoder, name: &[u8]) -> Option<f64> {
    float_attr(e, decoder, name).map(|v| v / 100.0)
}

/// Apply one child element of `w:pPr` to a holder. Other elements are
/// ignored.
fn apply_paragraph_property(props: &mut ParagraphProperties, e: &BytesStart<'_>, decoder: Decoder) {
    match e.local_name().as_ref() {
        b"jc" => {
            if let Some(v) = val(e, decoder).and_then(|v| Justification::from_xml(&v)) {
                props.justification = Some(v);
            }
        },
        b"outlineLvl" => {
            if let Some(v) = int_attr(e, decoder, b"val") {
                props.outline_level = Some(OutlineLevel::from_index(v.clamp(0, 9) as u8));
            }
        },
        b"textAlignment" => {
            if let Some(v) = val(e, decoder).and_then(|v| TextAlignment::from_xml(&v)) {
                props.text_alignment = Some(v);
            }
        },
        b"ind" => {
            if let Some(v) = twips(e, decoder, b"left").or_else(|| twips(e, decoder, b"start")) {
                props.left_indent = Some(v);
            }
            if let Some(v) = hundredths(e, decoder, b"leftChars")
                .or_else(|| hundredths(e, decoder, b"startChars"))
            {
                props.left_chars_indent = Some(v);
            }
            if let Some(v) = twips(e, decoder, b"right").or_else(|| twips(e, decoder, b"end")) {
                props.right_indent = Some(v);
            }
            if let Some(v) = hundredths(e, decoder, b"rightChars")
                .or_else(|| hundredths(e, decoder, b"endChars"))
            {
                props.right_chars_indent = Some(v);
            }
            if let Some(v) = twips(e, decoder, b"firstLine") {
                props.first_line_indent = Some(v);
            }
            if let Some(v) = hundredths(e, decoder, b"firstLineChars") {
                props.first_line_chars_indent = Some(v);
            }
            if let Some(v) = twips(e, decoder, b"hanging") {
                props.hanging_indent = Some(v);
            }
            if let Some(v) = hundredths(e, decoder, b"hangingChars") {
                props.hanging_chars_indent = Some(v);
            }
        },
        b"spacing" => {
            if let Some(v) = twips(e, decoder, b"before") {
                props.before_spacing = Some(v);
            }
            if let Some(v) = hundredths(e, decoder, b"beforeLines") {
                props.before_lines_spacing = Some(v);
            }
            if let Some(v) = twips(e, decoder, b"after") {
                props.after_spacing = Some(v);
            }
            if let Some(v) = hundredths(e, decoder, b"afterLines") {
                props.after_lines_spacing = Some(v);
            }
            if let Some(v) = twips(e, decoder, b"line") {
                props.line_spacing = Some(v);
            }
            if let Some(v) = attr(e, decoder, b"lineRule").and_then(|v| LineSpacingRule::from_xml(&v)) {
                props.line_spacing_rule = Some(v);
            }
            if let Some(v) = attr(e, decoder, b"beforeAutospacing") {
                props.before_auto_spacing = Some(!matches!(v.as_str(), "0" | "false" | "off"));
            }
            if let Some(v) = attr(e, decoder, b"afterAutospacing") {
                props.after_auto_spacing = Some(!matches!(v.as_str(), "0" | "false" | "off"));
            }
        },
        b"ilvl" => {
            if let Some(v) = id_attr(e, decoder, b"val") {
                props.numbering_level = Some(v);
            }
        },
        b"numId" => {
            if let Some(v) = id_attr(e, decoder, b"val") {
                props.numbering_id = Some(v);
            }
        },
        b"mirrorIndents" => props.mirror_indents = Some(toggle(e, decoder)),
        b"adjustRightInd" => props.adjust_right_indent = Some(toggle(e, decoder)),
        b"contextualSpacing" => props.contextual_spacing = Some(toggle(e, decoder)),
        b"snapToGrid" => props.snap_to_grid = Some(toggle(e, decoder)),
        b"widowControl" => props.widow_control = Some(toggle(e, decoder)),
        b"keepNext" => props.keep_next = Some(toggle(e, decoder)),
        b"keepLines" => props.keep_lines = Some(toggle(e, decoder)),
        b"pageBreakBefore" => props.page_break_before = Some(toggle(e, decoder)),
        b"suppressLineNumbers" => props.suppress_line_numbers = Some(toggle(e, decoder)),
        b"suppressAutoHyphens" => props.suppress_auto_hyphens = Some(toggle(e, decoder)),
        b"kinsoku" => props.kinsoku = Some(toggle(e, decoder)),
        b"wordWrap" => props.word_wrap = Some(toggle(e, decoder)),
        b"overflowPunct" => props.overflow_punctuation = Some(toggle(e, decoder)),
        b"topLinePunct" => props.top_line_punctuation = Some(toggle(e, decoder)),
        b"autoSpaceDE" => props.auto_space_de = Some(toggle(e, decoder)),
        b"autoSpaceDN" => props.auto_space_dn = Some(toggle(e, decoder)),
        _ => {},
    }
}

/// Apply one child element of `w:rPr` to a holder.
fn apply_run_property(props: &mut RunProperties, e: &BytesStart<'_>, decoder: Decoder) {
    match e.local_name().as_ref() {
        b"sz" => {
            if let Some(v) = int_attr(e, decoder, b"val") {
                props.font_size = Some(half_points_to_pt(v));
            }
        },
        b"szCs" => {
            if let Some(v) = int_attr(e, decoder, b"val") {
                props.font_size_cs = Some(half_points_to_pt(v));
            }
        },
        b"b" => props.bold = Some(toggle(e, decoder)),
        b"i" => props.italic = Some(toggle(e, decoder)),
        b"rFonts" => {
            if let Some(v) = attr(e, decoder, b"ascii") {
                props.font_name_ascii = Some(v);
            }
            if let Some(v) = attr(e, decoder, b"eastAsia") {
                props.font_name_east_asia = Some(v);
            }
        },
        b"w" => {
            if let Some(v) = float_attr(e, decoder, b"val") {
                props.character_scale = Some(v);
            }
        },
        b"spacing" => {
            if let Some(v) = twips(e, decoder, b"val") {
                props.character_spacing = Some(v);
            }
        },
        b"position" => {
            if let Some(v) = int_attr(e, decoder, b"val") {
                props.position = Some(half_points_to_pt(v));
            }
        },
        b"vertAlign" => {
            if let Some(v) = val(e, decoder).and_then(|v| VerticalPosition::from_xml(&v)) {
                props.vertical_position = Some(v);
            }
        },
        _ => {},
    }
}

/// Apply one child element of `w:sectPr` to a section.
fn apply_section_property(section: &mut Section, e: &BytesStart<'_>, decoder: Decoder) {
    match e.local_name().as_ref() {
        b"pgSz" => {
            if let Some(v) = twips(e, decoder, b"w") {
                section.page_width = v;
            }
            if let Some(v) = twips(e, decoder, b"h") {
                section.page_height = v;
            }
        },
        b"pgMar" => {
            let margins = &mut section.margins;
            for (name, slot) in [
                (&b"top"[..], &mut margins.top),
                (b"right", &mut margins.right),
                (b"bottom", &mut margins.bottom),
                (b"left", &mut margins.left),
                (b"header", &mut margins.header),
                (b"footer", &mut margins.footer),
                (b"gutter", &mut margins.gutter),
            ] {
                if let Some(v) = twips(e, decoder, name) {
                    *slot = v;
                }
            }
        },
        b"type" => {
            section.break_type = val(e, decoder).and_then(|v| SectionBreakType::from_xml(&v));
        },
        b"docGrid" => {
            if let Some(v) = attr(e, decoder, b"type").and_then(|v| DocGridType::from_xml(&v)) {
                section.grid.grid_type = v;
            }
            if let Some(v) = twips(e, decoder, b"linePitch") {
                section.grid.line_pitch = Some(v);
            }
            if let Some(v) = int_attr(e, decoder, b"charSpace") {
                section.grid.char_space = Some(v);
            }
        },
        _ => {},
    }
}

/// Elements whose content is never read: revision records carry a stale
/// copy of the properties, text boxes and markup fallbacks carry paragraphs
/// of their own.
fn is_skipped(name: &[u8]) -> bool {
    matches!(
        name,
        b"pPrChange" | b"rPrChange" | b"sectPrChange" | b"tblPrChange" | b"txbxContent" | b"Fallback"
    )
}

/// State of the `word/styles.xml` reader.
#[derive(Default)]
struct StylesReader {
    styles: StyleTable,
    defaults: DocDefaults,
    current: Option<Style>,
    region: Option<TableRegionType>,
    in_ppr_default: bool,
    in_rpr_default: bool,
    in_ppr: bool,
    in_rpr: bool,
}

impl StylesReader {
    fn start(&mut self, e: &BytesStart<'_>, decoder: Decoder, is_start: bool) {
        match e.local_name().as_ref() {
            b"pPrDefault" => self.in_ppr_default = is_start,
            b"rPrDefault" => self.in_rpr_default = is_start,
            b"pPr" => self.in_ppr = is_start,
            b"rPr" => self.in_rpr = is_start,
            b"style" => {
                let style_type = attr(e, decoder, b"type")
                    .and_then(|v| StyleType::from_xml(&v))
                    .unwrap_or(StyleType::Paragraph);
                let flag = |name: &[u8]| attr(e, decoder, name).is_some_and(|v| v == "1" || v == "true");
                let mut style = Style::new(attr(e, decoder, b"styleId").unwrap_or_default(), style_type)
                    .with_default(flag(b"default"));
                style.set_custom(flag(b"customStyle"));
                if is_start {
                    self.current = Some(style);
                } else {
                    self.styles.insert(style);
                }
            },
            b"tblStylePr" if is_start => {
                self.region = attr(e, decoder, b"type").and_then(|v| TableRegionType::from_xml(&v));
            },
            name => self.property(name, e, decoder),
        }
    }

    fn property(&mut self, name: &[u8], e: &BytesStart<'_>, decoder: Decoder) {
        let Some(style) = self.current.as_mut() else {
            if self.in_ppr_default && self.in_ppr {
                apply_paragraph_property(&mut self.defaults.paragraph, e, decoder);
            } else if self.in_rpr_default && self.in_rpr {
                apply_run_property(&mut self.defaults.run, e, decoder);
            }
            return;
        };
        match name {
            b"name" => style.set_name(val(e, decoder)),
            b"basedOn" => style.set_based_on(val(e, decoder)),
            b"uiPriority" => style.set_priority(int_attr(e, decoder, b"val").map(|v| v as i32)),
            _ if self.in_ppr => {
                let props = match self.region {
                    Some(r) => &mut style.region_mut(r).paragraph,
                    None => &mut style.paragraph,
                };
                apply_paragraph_property(props, e, decoder);
            },
            _ if self.in_rpr => {
                let props = match self.region {
                    Some(r) => &mut style.region_mut(r).run,
                    None => &mut style.run,
                };
                apply_run_property(props, e, decoder);
            },
            _ => {},
        }
    }

    fn end(&mut self, name: &[u8]) {
        match name {
            b"pPrDefault" => self.in_ppr_default = false,
            b"rPrDefault" => self.in_rpr_default = false,
            b"pPr" => self.in_ppr = false,
            b"rPr" => self.in_rpr = false,
            b"tblStylePr" => self.region = None,
            b"style" => {
                if let Some(style) = self.current.take() {
                    self.styles.insert(style);
                }
            },
            _ => {},
        }
    }
}

/// Read `word/styles.xml`.
///
/// Returns the style table and the document defaults.
pub fn read_styles(xml: &[u8]) -> Result<(StyleTable, DocDefaults)> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(true);
    let decoder = reader.decoder();

    let mut state = StylesReader::default();
    let mut buf = Vec::with_capacity(1024);
    let mut skip_buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) if is_skipped(e.local_name().as_ref()) => {
                reader.read_to_end_into(e.name(), &mut skip_buf)?;
                skip_buf.clear();
            },
            Event::Start(e) => state.start(&e, decoder, true),
            Event::Empty(e) => state.start(&e, decoder, false),
            Event::End(e) => state.end(e.local_name().as_ref()),
            Event::Eof => break,
            _ => {},
        }
        buf.clear();
    }

    log::debug!("read {} styles", state.styles.len());
    Ok((state.styles, state.defaults))
}

/// Read `word/numbering.xml`.
pub fn read_numbering(xml: &[u8]) -> Result<Numbering> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(true);
    let decoder = reader.decoder();

    let mut numbering = Numbering::new();
    let mut abstract_num: Option<AbstractNum> = None;
    let mut level: Option<NumberingLevel> = None;
    let mut num_id: Option<u32> = None;
    let mut buf = Vec::with_capacity(1024);

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) | Event::Empty(e) => match e.local_name().as_ref() {
                b"abstractNum" => {
                    abstract_num = id_attr(&e, decoder, b"abstractNumId").map(AbstractNum::new);
                },
                b"lvl" if abstract_num.is_some() => {
                    let ilvl = id_attr(&e, decoder, b"ilvl").unwrap_or(0);
                    level = Some(NumberingLevel::new(ilvl, NumberFormat::Decimal, ""));
                },
                b"start" => {
                    if let Some(lvl) = level.as_mut()
                        && let Some(v) = id_attr(&e, decoder, b"val")
                    {
                        lvl.start = v;
                    }
                },
                b"numFmt" => {
                    if let Some(lvl) = level.as_mut()
                        && let Some(v) = val(&e, decoder).and_then(|v| NumberFormat::from_xml(&v))
                    {
                        lvl.format = v;
                    }
                },
                b"lvlText" => {
                    if let Some(lvl) = level.as_mut() {
                        lvl.text = val(&e, decoder).unwrap_or_default();
                    }
                },
                b"suff" => {
                    if let Some(lvl) = level.as_mut()
                        && let Some(v) = val(&e, decoder).and_then(|v| LevelSuffix::from_xml(&v))
                    {
                        lvl.suffix = v;
                    }
                },
                b"num" if abstract_num.is_none() => {
                    num_id = id_attr(&e, decoder, b"numId");
                },
                b"abstractNumId" => {
                    if let Some(id) = num_id.take()
                        && let Some(abstract_id) = id_attr(&e, decoder, b"val")
                    {
                        numbering.add_num(Num {
                            id,
                            abstract_num_id: abstract_id,
                        });
                    }
                },
                _ => {},
            },
            Event::End(e) => match e.local_name().as_ref() {
                b"lvl" => {
                    if let (Some(def), Some(lvl)) = (abstract_num.as_mut(), level.take()) {
                        def.levels.push(lvl);
                    }
                },
                b"abstractNum" => {
                    if let Some(def) = abstract_num.take() {
                        numbering.add_abstract_num(def);
                    }
                },
                b"num" => num_id = None,
                _ => {},
            },
            Event::Eof => break,
            _ => {},
        }
        buf.clear();
    }

    Ok(numbering)
}

/// A table being read, with its open row and cell.
#[derive(Default)]
struct TableBuilder {
    table: Table,
    row: Option<TableRow>,
    cell: Option<TableCell>,
}

/// A run being read: its formatting and not yet flushed text.
#[derive(Default)]
struct RunState {
    style_id: Option<String>,
    properties: RunProperties,
    text: String,
}

impl RunState {
    fn flush(&mut self, paragraph: &mut Paragraph) {
        if self.text.is_empty() {
            return;
        }
        let mut run = TextRun::new(std::mem::take(&mut self.text))
            .with_properties(self.properties.clone());
        run.style_id = self.style_id.clone();
        paragraph.items.push(ParagraphItem::Run(run));
    }
}

/// State of the `word/document.xml` reader.
struct BodyReader<'d> {
    doc: &'d mut Document,
    decoder: Decoder,
    tables: Vec<TableBuilder>,
    paragraph: Option<Paragraph>,
    run: Option<RunState>,
    picture: Option<Picture>,
    section: Option<Section>,
    in_ppr: bool,
    in_rpr: bool,
    in_text: bool,
    in_tbl_grid: bool,
}

impl<'d> BodyReader<'d> {
    fn new(doc: &'d mut Document, decoder: Decoder) -> Self {
        Self {
            doc,
            decoder,
            tables: Vec::new(),
            paragraph: None,
            run: None,
            picture: None,
            section: None,
            in_ppr: false,
            in_rpr: false,
            in_text: false,
            in_tbl_grid: false,
        }
    }

    fn start(&mut self, e: &BytesStart<'_>, is_start: bool) {
        let decoder = self.decoder;
        match e.local_name().as_ref() {
            b"p" => {
                self.paragraph = Some(Paragraph::new());
                if !is_start {
                    self.end_paragraph();
                }
            },
            b"pPr" if self.paragraph.is_some() => self.in_ppr = is_start,
            b"rPr" => self.in_rpr = is_start,
            b"r" if is_start && self.paragraph.is_some() => self.run = Some(RunState::default()),
            b"t" if self.run.is_some() => self.in_text = is_start,
            b"sectPr" => {
                self.section = Some(Section::default());
                if !is_start {
                    self.end_section();
                }
            },
            b"tbl" if is_start => self.tables.push(TableBuilder::default()),
            b"tblGrid" => self.in_tbl_grid = is_start,
            b"tr" => {
                if let Some(t) = self.tables.last_mut() {
                    t.row = Some(TableRow::default());
                }
                if !is_start {
                    self.end_row();
                }
            },
            b"tc" => {
                if let Some(t) = self.tables.last_mut() {
                    t.cell = Some(TableCell::default());
                }
                if !is_start {
                    self.end_cell();
                }
            },
            b"drawing" if is_start && self.run.is_some() => self.picture = Some(Picture::default()),
            name => self.leaf(name, e, decoder),
        }
    }

    /// Elements whose meaning does not depend on their content.
    fn leaf(&mut self, name: &[u8], e: &BytesStart<'_>, decoder: Decoder) {
        if let Some(section) = self.section.as_mut() {
            apply_section_property(section, e, decoder);
            return;
        }

        if let Some(picture) = self.picture.as_mut() {
            match name {
                b"extent" => {
                    if let Some(cx) = int_attr(e, decoder, b"cx") {
                        picture.width = emu_to_pt(cx);
                    }
                    if let Some(cy) = int_attr(e, decoder, b"cy") {
                        picture.height = emu_to_pt(cy);
                    }
                },
                b"docPr" => picture.name = attr(e, decoder, b"name"),
                _ => {},
            }
            return;
        }

        if let Some(run) = self.run.as_mut() {
            if self.in_rpr {
                if name == b"rStyle" {
                    run.style_id = val(e, decoder);
                } else {
                    apply_run_property(&mut run.properties, e, decoder);
                }
                return;
            }
            let Some(paragraph) = self.paragraph.as_mut() else {
                return;
            };
            match name {
                b"tab" => run.text.push('\t'),
                b"cr" => {
                    run.flush(paragraph);
                    let mut br = Break::new(BreakType::TextWrapping);
                    br.properties = run.properties.clone();
                    paragraph.items.push(ParagraphItem::Break(br));
                },
                b"br" => {
                    run.flush(paragraph);
                    let kind = attr(e, decoder, b"type")
                        .and_then(|v| BreakType::from_xml(&v))
                        .unwrap_or(BreakType::TextWrapping);
                    let mut br = Break::new(kind);
                    br.properties = run.properties.clone();
                    paragraph.items.push(ParagraphItem::Break(br));
                },
                b"footnoteReference" | b"endnoteReference" => {
                    run.flush(paragraph);
                    let kind = if name == b"footnoteReference" {
                        FieldReferenceType::Footnote
                    } else {
                        FieldReferenceType::Endnote
                    };
                    let id = int_attr(e, decoder, b"id").unwrap_or(0);
                    paragraph.items.push(ParagraphItem::FieldReference(FieldReference {
                        kind,
                        id,
                        display: id.to_string(),
                        properties: run.properties.clone(),
                    }));
                },
                _ => {},
            }
            return;
        }

        if let Some(paragraph) = self.paragraph.as_mut() {
            if !self.in_ppr {
                return;
            }
            if self.in_rpr {
                apply_run_property(&mut paragraph.mark, e, decoder);
            } else if name == b"pStyle" {
                paragraph.style_id = val(e, decoder);
            } else {
                apply_paragraph_property(&mut paragraph.properties, e, decoder);
            }
            return;
        }

        let Some(builder) = self.tables.last_mut() else {
            return;
        };
        match name {
            b"tblStyle" => builder.table.style_id = val(e, decoder),
            b"gridCol" if self.in_tbl_grid => {
                builder.table.grid.push(twips(e, decoder, b"w").unwrap_or(0.0));
            },
            b"tblLook" => builder.table.look = read_table_look(e, decoder),
            b"tcW" => {
                if let Some(cell) = builder.cell.as_mut() {
                    cell.width = read_cell_width(e, decoder);
                }
            },
            _ => {},
        }
    }

    fn text(&mut self, text: &str) {
        if self.in_text
            && let Some(run) = self.run.as_mut()
        {
            run.text.push_str(text);
        }
    }

    fn end(&mut self, name: &[u8]) {
        match name {
            b"p" => self.end_paragraph(),
            b"pPr" => self.in_ppr = false,
            b"rPr" => self.in_rpr = false,
            b"t" => self.in_text = false,
            b"r" => {
                if let (Some(mut run), Some(paragraph)) = (self.run.take(), self.paragraph.as_mut()) {
                    run.flush(paragraph);
                }
            },
            b"drawing" => {
                if let (Some(picture), Some(run), Some(paragraph)) =
                    (self.picture.take(), self.run.as_mut(), self.paragraph.as_mut())
                {
                    run.flush(paragraph);
                    paragraph.items.push(ParagraphItem::Picture(Picture {
                        properties: run.properties.clone(),
                        ..picture
                    }));
                }
            },
            b"sectPr" => self.end_section(),
            b"tblGrid" => self.in_tbl_grid = false,
            b"tc" => self.end_cell(),
            b"tr" => self.end_row(),
            b"tbl" => self.end_table(),
            _ => {},
        }
    }

    fn end_section(&mut self) {
        let Some(section) = self.section.take() else {
            return;
        };
        match self.paragraph.as_mut() {
            Some(paragraph) => paragraph.section = Some(section),
            None => self.doc.set_final_section(Some(section)),
        }
    }

    fn end_paragraph(&mut self) {
        let Some(paragraph) = self.paragraph.take() else {
            return;
        };
        self.in_ppr = false;
        match self.tables.last_mut() {
            Some(builder) => {
                let id = self.doc.alloc_paragraph(paragraph);
                match builder.cell.as_mut() {
                    Some(cell) => cell.paragraphs.push(id),
                    None => log::debug!("paragraph {} outside a table cell dropped", id.0),
                }
            },
            None => {
                self.doc.add_paragraph(paragraph);
            },
        }
    }

    fn end_cell(&mut self) {
        if let Some(builder) = self.tables.last_mut()
            && let Some(cell) = builder.cell.take()
            && let Some(row) = builder.row.as_mut()
        {
            row.cells.push(cell);
        }
    }

    fn end_row(&mut self) {
        if let Some(builder) = self.tables.last_mut()
            && let Some(row) = builder.row.take()
        {
            builder.table.rows.push(row);
        }
    }

    fn end_table(&mut self) {
        let Some(builder) = self.tables.pop() else {
            return;
        };
        match self.tables.last_mut().and_then(|outer| outer.cell.as_mut()) {
            // Cells hold paragraphs only; a nested table is flattened into
            // its enclosing cell.
            Some(cell) => {
                log::debug!("flattening nested table into its cell");
                cell.paragraphs.extend(builder.table.paragraph_ids());
            },
            None => {
                self.doc.push_table(builder.table);
            },
        }
    }
}

fn read_table_look(e: &BytesStart<'_>, decoder: Decoder) -> TableLook {
    let flag = |name: &[u8]| attr(e, decoder, name).map(|v| v == "1" || v == "true");
    // Older files only carry the hex bit mask.
    let mut look = match attr(e, decoder, b"val").and_then(|v| u16::from_str_radix(&v, 16).ok()) {
        Some(bits) => TableLook {
            first_row: bits & 0x0020 != 0,
            last_row: bits & 0x0040 != 0,
            first_column: bits & 0x0080 != 0,
            last_column: bits & 0x0100 != 0,
            no_horizontal_banding: bits & 0x0200 != 0,
            no_vertical_banding: bits & 0x0400 != 0,
        },
        None => TableLook::default(),
    };
    for (name, slot) in [
        (&b"firstRow"[..], &mut look.first_row),
        (b"lastRow", &mut look.last_row),
        (b"firstColumn", &mut look.first_column),
        (b"lastColumn", &mut look.last_column),
        (b"noHBand", &mut look.no_horizontal_banding),
        (b"noVBand", &mut look.no_vertical_banding),
    ] {
        if let Some(v) = flag(name) {
            *slot = v;
        }
    }
    look
}

fn read_cell_width(e: &BytesStart<'_>, decoder: Decoder) -> Option<CellWidth> {
    let w = float_attr(e, decoder, b"w")?;
    match attr(e, decoder, b"type").as_deref() {
        Some("pct") => Some(CellWidth {
            // fiftieths of a percent
            value: w / 50.0,
            kind: CellWidthType::Percent,
        }),
        Some("dxa") | None => Some(CellWidth {
            value: w / 20.0,
            kind: CellWidthType::Point,
        }),
        _ => None,
    }
}

/// Text of an entity or character reference inside `w:t`.
fn resolve_reference(r: &BytesRef<'_>) -> Option<String> {
    if let Ok(Some(c)) = r.resolve_char_ref() {
        return Some(c.to_string());
    }
    let name = r.decode().ok()?;
    resolve_predefined_entity(&name).map(str::to_owned)
}

/// Read the body of `word/document.xml` into `doc`, after any content it
/// already has.
///
/// A body-level `w:sectPr` replaces the document's final section.
pub fn read_document_into(xml: &[u8], doc: &mut Document) -> Result<()> {
    let mut reader = Reader::from_reader(xml);
    let decoder = reader.decoder();
    let mut body = BodyReader::new(doc, decoder);
    let mut buf = Vec::with_capacity(4096);
    let mut skip_buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) if is_skipped(e.local_name().as_ref()) => {
                reader.read_to_end_into(e.name(), &mut skip_buf)?;
                skip_buf.clear();
            },
            Event::Start(e) => body.start(&e, true),
            Event::Empty(e) => body.start(&e, false),
            Event::Text(e) => {
                let text = std::str::from_utf8(e.as_ref())?;
                body.text(text);
            },
            Event::CData(e) => {
                let text = std::str::from_utf8(e.as_ref())?;
                body.text(text);
            },
            Event::GeneralRef(r) => {
                if let Some(text) = resolve_reference(&r) {
                    body.text(&text);
                }
            },
            Event::End(e) => body.end(e.local_name().as_ref()),
            Event::Eof => break,
            _ => {},
        }
        buf.clear();
    }

    Ok(())
}

impl Document {
    /// Build a document from the XML of its parts.
    ///
    /// `styles` and `numbering` are optional because a package may omit
    /// them; the final section defaults to Letter with one-inch margins when
    /// the body has no `w:sectPr`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use longan::docx::Document;
    ///
    /// let xml = br#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
    ///   <w:body><w:p><w:r><w:t>Hello</w:t></w:r></w:p></w:body>
    /// </w:document>"#;
    /// let doc = Document::from_xml_parts(xml, None, None).unwrap();
    /// assert_eq!(doc.paragraph_ids().len(), 1);
    /// ```
    pub fn from_xml_parts(
        document: &[u8],
        styles: Option<&[u8]>,
        numbering: Option<&[u8]>,
    ) -> Result<Self> {
        let mut doc = Document::new();
        if let Some(xml) = styles {
            let (table, defaults) = read_styles(xml)?;
            doc.styles = table;
            doc.defaults = defaults;
        }
        if let Some(xml) = numbering {
            doc.numbering = read_numbering(xml)?;
        }
        read_document_into(document, &mut doc)?;
        Ok(doc)
    }
}
