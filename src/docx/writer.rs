//! WordprocessingML serialization.
//!
//! Writes property holders, paragraphs, tables and the body back as
//! `w:`-prefixed XML fragments, converting points back to Word's integer
//! units. Child elements follow the schema order of `CT_PPr` and `CT_RPr`
//! so the output is accepted by Word.
use crate::common::error::{Error, Result};
use crate::common::unit::{
    format_number, pt_to_emu, pt_to_half_points, pt_to_twips, units_to_hundredths,
};
use crate::docx::document::{Block, Document};
use crate::docx::enums::{BreakType, CellWidthType, DocGridType, FieldReferenceType};
use crate::docx::paragraph::{Paragraph, ParagraphItem, TextRun};
use crate::docx::properties::{ParagraphProperties, RunProperties};
use crate::docx::section::Section;
use crate::docx::table::{CellWidth, Table};
use quick_xml::escape::escape;
use std::fmt::Write as FmtWrite;

const W_NAMESPACE: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
const WP_NAMESPACE: &str =
    "http://schemas.openxmlformats.org/drawingml/2006/wordprocessingDrawing";

fn fmt_err(e: std::fmt::Error) -> Error {
    Error::Xml(e.to_string())
}

/// `<w:name w:val="..."/>`
fn write_val(xml: &mut String, name: &str, value: &str) -> Result<()> {
    write!(xml, "<w:{} w:val=\"{}\"/>", name, escape(value)).map_err(fmt_err)
}

/// On/off element; `true` is written without a value.
fn write_toggle(xml: &mut String, name: &str, value: Option<bool>) -> Result<()> {
    match value {
        Some(true) => write!(xml, "<w:{}/>", name).map_err(fmt_err),
        Some(false) => write!(xml, "<w:{} w:val=\"0\"/>", name).map_err(fmt_err),
        None => Ok(()),
    }
}

/// Append ` w:name="value"` when the value is set.
fn write_attr(xml: &mut String, name: &str, value: Option<String>) -> Result<()> {
    match value {
        Some(v) => write!(xml, " w:{}=\"{}\"", name, v).map_err(fmt_err),
        None => Ok(()),
    }
}

#[inline]
fn twips(pt: Option<f64>) -> Option<String> {
    pt.map(|v| pt_to_twips(v).to_string())
}

#[inline]
fn hundredths(units: Option<f64>) -> Option<String> {
    units.map(|v| units_to_hundredths(v).to_string())
}

/// Write a `w:rPr` element, or nothing when the holder is empty.
pub fn write_run_properties(
    xml: &mut String,
    props: &RunProperties,
    style_id: Option<&str>,
) -> Result<()> {
    if props.is_empty() && style_id.is_none() {
        return Ok(());
    }
    xml.push_str("<w:rPr>");
    if let Some(id) = style_id {
        write_val(xml, "rStyle", id)?;
    }
    if props.font_name_ascii.is_some() || props.font_name_east_asia.is_some() {
        xml.push_str("<w:rFonts");
        if let Some(name) = &props.font_name_ascii {
            write!(xml, " w:ascii=\"{}\" w:hAnsi=\"{}\"", escape(name), escape(name))
                .map_err(fmt_err)?;
        }
        if let Some(name) = &props.font_name_east_asia {
            write!(xml, " w:eastAsia=\"{}\"", escape(name)).map_err(fmt_err)?;
        }
        xml.push_str("/>");
    }
    write_toggle(xml, "b", props.bold)?;
    write_toggle(xml, "i", props.italic)?;
    if let Some(v) = props.character_spacing {
        write_val(xml, "spacing", &pt_to_twips(v).to_string())?;
    }
    if let Some(v) = props.character_scale {
        write_val(xml, "w", &format_number(v.round()))?;
    }
    if let Some(v) = props.position {
        write_val(xml, "position", &pt_to_half_points(v).to_string())?;
    }
    if let Some(v) = props.font_size {
        write_val(xml, "sz", &pt_to_half_points(v).to_string())?;
    }
    if let Some(v) = props.font_size_cs {
        write_val(xml, "szCs", &pt_to_half_points(v).to_string())?;
    }
    if let Some(v) = props.vertical_position {
        write_val(xml, "vertAlign", v.to_xml())?;
    }
    xml.push_str("</w:rPr>");
    Ok(())
}

/// Write a `w:pPr` element, or nothing when there is nothing to write.
///
/// `mark` becomes the nested `w:rPr` and `section` the nested `w:sectPr`.
pub fn write_paragraph_properties(
    xml: &mut String,
    props: &ParagraphProperties,
    style_id: Option<&str>,
    mark: &RunProperties,
    section: Option<&Section>,
) -> Result<()> {
    if props.is_empty() && style_id.is_none() && mark.is_empty() && section.is_none() {
        return Ok(());
    }
    xml.push_str("<w:pPr>");
    if let Some(id) = style_id {
        write_val(xml, "pStyle", id)?;
    }
    write_toggle(xml, "keepNext", props.keep_next)?;
    write_toggle(xml, "keepLines", props.keep_lines)?;
    write_toggle(xml, "pageBreakBefore", props.page_break_before)?;
    write_toggle(xml, "widowControl", props.widow_control)?;
    if props.numbering_id.is_some() || props.numbering_level.is_some() {
        xml.push_str("<w:numPr>");
        if let Some(level) = props.numbering_level {
            write_val(xml, "ilvl", &level.to_string())?;
        }
        if let Some(id) = props.numbering_id {
            write_val(xml, "numId", &id.to_string())?;
        }
        xml.push_str("</w:numPr>");
    }
    write_toggle(xml, "suppressLineNumbers", props.suppress_line_numbers)?;
    write_toggle(xml, "suppressAutoHyphens", props.suppress_auto_hyphens)?;
    write_toggle(xml, "kinsoku", props.kinsoku)?;
    write_toggle(xml, "wordWrap", props.word_wrap)?;
    write_toggle(xml, "overflowPunct", props.overflow_punctuation)?;
    write_toggle(xml, "topLinePunct", props.top_line_punctuation)?;
    write_toggle(xml, "autoSpaceDE", props.auto_space_de)?;
    write_toggle(xml, "autoSpaceDN", props.auto_space_dn)?;
    write_toggle(xml, "adjustRightInd", props.adjust_right_indent)?;
    write_toggle(xml, "snapToGrid", props.snap_to_grid)?;

    let spacing = [
        props.before_spacing,
        props.before_lines_spacing,
        props.after_spacing,
        props.after_lines_spacing,
        props.line_spacing,
    ];
    if spacing.iter().any(Option::is_some)
        || props.line_spacing_rule.is_some()
        || props.before_auto_spacing.is_some()
        || props.after_auto_spacing.is_some()
    {
        xml.push_str("<w:spacing");
        write_attr(xml, "before", twips(props.before_spacing))?;
        write_attr(xml, "beforeLines", hundredths(props.before_lines_spacing))?;
        write_attr(
            xml,
            "beforeAutospacing",
            props.before_auto_spacing.map(|b| if b { "1" } else { "0" }.to_string()),
        )?;
        write_attr(xml, "after", twips(props.after_spacing))?;
        write_attr(xml, "afterLines", hundredths(props.after_lines_spacing))?;
        write_attr(
            xml,
            "afterAutospacing",
            props.after_auto_spacing.map(|b| if b { "1" } else { "0" }.to_string()),
        )?;
        write_attr(xml, "line", twips(props.line_spacing))?;
        write_attr(
            xml,
            "lineRule",
            props.line_spacing_rule.map(|r| r.to_xml().to_string()),
        )?;
        xml.push_str("/>");
    }

    let indents = [
        props.left_indent,
        props.left_chars_indent,
        props.right_indent,
        props.right_chars_indent,
        props.first_line_indent,
        props.first_line_chars_indent,
        props.hanging_indent,
        props.hanging_chars_indent,
    ];
    if indents.iter().any(Option::is_some) {
        xml.push_str("<w:ind");
        write_attr(xml, "left", twips(props.left_indent))?;
        write_attr(xml, "leftChars", hundredths(props.left_chars_indent))?;
        write_attr(xml, "right", twips(props.right_indent))?;
        write_attr(xml, "rightChars", hundredths(props.right_chars_indent))?;
        write_attr(xml, "firstLine", twips(props.first_line_indent))?;
        write_attr(xml, "firstLineChars", hundredths(props.first_line_chars_indent))?;
        write_attr(xml, "hanging", twips(props.hanging_indent))?;
        write_attr(xml, "hangingChars", hundredths(props.hanging_chars_indent))?;
        xml.push_str("/>");
    }

    write_toggle(xml, "contextualSpacing", props.contextual_spacing)?;
    write_toggle(xml, "mirrorIndents", props.mirror_indents)?;
    if let Some(jc) = props.justification {
        write_val(xml, "jc", jc.to_xml())?;
    }
    if let Some(v) = props.text_alignment {
        write_val(xml, "textAlignment", v.to_xml())?;
    }
    if let Some(v) = props.outline_level {
        write_val(xml, "outlineLvl", &v.to_index().to_string())?;
    }
    write_run_properties(xml, mark, None)?;
    if let Some(section) = section {
        write_section(xml, section)?;
    }
    xml.push_str("</w:pPr>");
    Ok(())
}

/// Write a `w:sectPr` element.
pub fn write_section(xml: &mut String, section: &Section) -> Result<()> {
    xml.push_str("<w:sectPr>");
    if let Some(kind) = section.break_type {
        write_val(xml, "type", kind.to_xml())?;
    }
    write!(
        xml,
        "<w:pgSz w:w=\"{}\" w:h=\"{}\"/>",
        pt_to_twips(section.page_width),
        pt_to_twips(section.page_height)
    )
    .map_err(fmt_err)?;
    let m = &section.margins;
    write!(
        xml,
        "<w:pgMar w:top=\"{}\" w:right=\"{}\" w:bottom=\"{}\" w:left=\"{}\" w:header=\"{}\" w:footer=\"{}\" w:gutter=\"{}\"/>",
        pt_to_twips(m.top),
        pt_to_twips(m.right),
        pt_to_twips(m.bottom),
        pt_to_twips(m.left),
        pt_to_twips(m.header),
        pt_to_twips(m.footer),
        pt_to_twips(m.gutter)
    )
    .map_err(fmt_err)?;
    let grid = &section.grid;
    if grid.grid_type != DocGridType::None || grid.line_pitch.is_some() || grid.char_space.is_some() {
        xml.push_str("<w:docGrid");
        if grid.grid_type != DocGridType::None {
            write!(xml, " w:type=\"{}\"", grid.grid_type.to_xml()).map_err(fmt_err)?;
        }
        write_attr(xml, "linePitch", twips(grid.line_pitch))?;
        write_attr(xml, "charSpace", grid.char_space.map(|v| v.to_string()))?;
        xml.push_str("/>");
    }
    xml.push_str("</w:sectPr>");
    Ok(())
}

/// Text of a run, with tabs as `w:tab` elements.
fn write_run_text(xml: &mut String, run: &TextRun) -> Result<()> {
    for (i, segment) in run.text.split('\t').enumerate() {
        if i > 0 {
            xml.push_str("<w:tab/>");
        }
        if !segment.is_empty() {
            write!(xml, "<w:t xml:space=\"preserve\">{}</w:t>", escape(segment)).map_err(fmt_err)?;
        }
    }
    Ok(())
}

fn write_item(xml: &mut String, item: &ParagraphItem, picture_id: &mut u32) -> Result<()> {
    xml.push_str("<w:r>");
    write_run_properties(xml, item.run_properties(), item.style_id())?;
    match item {
        ParagraphItem::Run(run) => write_run_text(xml, run)?,
        ParagraphItem::Break(br) => match br.kind {
            BreakType::TextWrapping => xml.push_str("<w:br/>"),
            kind => write!(xml, "<w:br w:type=\"{}\"/>", kind.to_xml()).map_err(fmt_err)?,
        },
        ParagraphItem::Picture(picture) => {
            *picture_id += 1;
            write!(
                xml,
                "<w:drawing><wp:inline><wp:extent cx=\"{}\" cy=\"{}\"/><wp:docPr id=\"{}\" name=\"{}\"/></wp:inline></w:drawing>",
                pt_to_emu(picture.width),
                pt_to_emu(picture.height),
                picture_id,
                escape(picture.name.as_deref().unwrap_or_default())
            )
            .map_err(fmt_err)?;
        },
        ParagraphItem::FieldReference(field) => {
            let name = match field.kind {
                FieldReferenceType::Footnote => "footnoteReference",
                FieldReferenceType::Endnote => "endnoteReference",
            };
            write!(xml, "<w:{} w:id=\"{}\"/>", name, field.id).map_err(fmt_err)?;
        },
    }
    xml.push_str("</w:r>");
    Ok(())
}

fn write_paragraph_into(xml: &mut String, paragraph: &Paragraph, picture_id: &mut u32) -> Result<()> {
    xml.push_str("<w:p>");
    write_paragraph_properties(
        xml,
        &paragraph.properties,
        paragraph.style_id(),
        &paragraph.mark,
        paragraph.section(),
    )?;
    for item in paragraph.items() {
        write_item(xml, item, picture_id)?;
    }
    xml.push_str("</w:p>");
    Ok(())
}

/// Serialize one paragraph as a `w:p` element.
pub fn write_paragraph(paragraph: &Paragraph) -> Result<String> {
    let mut xml = String::with_capacity(256);
    let mut picture_id = 0;
    write_paragraph_into(&mut xml, paragraph, &mut picture_id)?;
    Ok(xml)
}

fn write_cell_width(xml: &mut String, width: &CellWidth) -> Result<()> {
    let (w, kind) = match width.kind {
        CellWidthType::Point => (pt_to_twips(width.value), "dxa"),
        CellWidthType::Percent => ((width.value * 50.0).round() as i64, "pct"),
    };
    write!(xml, "<w:tcPr><w:tcW w:w=\"{}\" w:type=\"{}\"/></w:tcPr>", w, kind).map_err(fmt_err)
}

fn write_table(xml: &mut String, doc: &Document, table: &Table, picture_id: &mut u32) -> Result<()> {
    xml.push_str("<w:tbl><w:tblPr>");
    if let Some(id) = table.style_id() {
        write_val(xml, "tblStyle", id)?;
    }
    let look = &table.look;
    let bit = |b: bool| if b { 1 } else { 0 };
    write!(
        xml,
        "<w:tblLook w:firstRow=\"{}\" w:lastRow=\"{}\" w:firstColumn=\"{}\" w:lastColumn=\"{}\" w:noHBand=\"{}\" w:noVBand=\"{}\"/>",
        bit(look.first_row),
        bit(look.last_row),
        bit(look.first_column),
        bit(look.last_column),
        bit(look.no_horizontal_banding),
        bit(look.no_vertical_banding)
    )
    .map_err(fmt_err)?;
    xml.push_str("</w:tblPr><w:tblGrid>");
    for width in table.column_widths() {
        write!(xml, "<w:gridCol w:w=\"{}\"/>", pt_to_twips(*width)).map_err(fmt_err)?;
    }
    xml.push_str("</w:tblGrid>");
    for row in table.rows() {
        xml.push_str("<w:tr>");
        for cell in row.cells() {
            xml.push_str("<w:tc>");
            if let Some(width) = &cell.width {
                write_cell_width(xml, width)?;
            }
            if cell.paragraphs().is_empty() {
                // a cell must end with a paragraph
                xml.push_str("<w:p/>");
            }
            for id in cell.paragraphs() {
                write_paragraph_into(xml, doc.paragraph(*id)?, picture_id)?;
            }
            xml.push_str("</w:tc>");
        }
        xml.push_str("</w:tr>");
    }
    xml.push_str("</w:tbl>");
    Ok(())
}

/// Serialize the body as a complete `word/document.xml` part.
///
/// Reading the output back with [`Document::from_xml_parts`] gives the same
/// paragraphs, tables and sections.
pub fn write_document(doc: &Document) -> Result<String> {
    let mut xml = String::with_capacity(4096);
    write!(
        xml,
        "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n<w:document xmlns:w=\"{}\" xmlns:wp=\"{}\"><w:body>",
        W_NAMESPACE, WP_NAMESPACE
    )
    .map_err(fmt_err)?;
    let mut picture_id = 0;
    for block in doc.body() {
        match *block {
            Block::Paragraph(id) => write_paragraph_into(&mut xml, doc.paragraph(id)?, &mut picture_id)?,
            Block::Table(id) => write_table(&mut xml, doc, doc.table(id)?, &mut picture_id)?,
        }
    }
    if let Some(section) = doc.final_section() {
        write_section(&mut xml, section)?;
    }
    xml.push_str("</w:body></w:document>");
    Ok(xml)
}

impl Document {
    /// Serialize the body as `word/document.xml`. See [`write_document`].
    pub fn to_document_xml(&self) -> Result<String> {
        write_document(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::docx::enums::{
        IndentationUnit, Justification, LineSpacingRule, SpacingUnit, SpecialIndentationType,
    };
    use crate::docx::paragraph::{Break, Picture};

    #[test]
    fn test_empty_holders_write_nothing() {
        let mut xml = String::new();
        write_run_properties(&mut xml, &RunProperties::default(), None).unwrap();
        write_paragraph_properties(
            &mut xml,
            &ParagraphProperties::default(),
            None,
            &RunProperties::default(),
            None,
        )
        .unwrap();
        assert!(xml.is_empty());
        assert_eq!(write_paragraph(&Paragraph::new()).unwrap(), "<w:p></w:p>");
    }

    #[test]
    fn test_write_paragraph_properties() {
        let props = ParagraphProperties {
            justification: Some(Justification::Center),
            left_indent: Some(36.0),
            hanging_indent: Some(18.0),
            before_lines_spacing: Some(0.5),
            before_spacing: Some(2.5),
            line_spacing: Some(24.0),
            line_spacing_rule: Some(LineSpacingRule::Multiple),
            snap_to_grid: Some(false),
            numbering_id: Some(2),
            numbering_level: Some(1),
            ..Default::default()
        };
        let mut xml = String::new();
        write_paragraph_properties(&mut xml, &props, Some("Body"), &RunProperties::default(), None)
            .unwrap();
        assert_eq!(
            xml,
            "<w:pPr><w:pStyle w:val=\"Body\"/>\
             <w:numPr><w:ilvl w:val=\"1\"/><w:numId w:val=\"2\"/></w:numPr>\
             <w:snapToGrid w:val=\"0\"/>\
             <w:spacing w:before=\"50\" w:beforeLines=\"50\" w:line=\"480\" w:lineRule=\"auto\"/>\
             <w:ind w:left=\"720\" w:hanging=\"360\"/>\
             <w:jc w:val=\"center\"/></w:pPr>"
        );
    }

    #[test]
    fn test_write_run_properties() {
        let props = RunProperties {
            bold: Some(true),
            italic: Some(false),
            font_size: Some(10.5),
            font_name_ascii: Some("A&B".to_string()),
            ..Default::default()
        };
        let mut xml = String::new();
        write_run_properties(&mut xml, &props, Some("Strong")).unwrap();
        assert_eq!(
            xml,
            "<w:rPr><w:rStyle w:val=\"Strong\"/><w:rFonts w:ascii=\"A&amp;B\" w:hAnsi=\"A&amp;B\"/>\
             <w:b/><w:i w:val=\"0\"/><w:sz w:val=\"21\"/></w:rPr>"
        );
    }

    #[test]
    fn test_write_paragraph_items() {
        let mut para = Paragraph::with_text("a\t<b>");
        para.add_item(Break::page());
        para.add_item(Break::new(BreakType::TextWrapping));
        para.add_item(Picture::new(36.0, 72.0));
        let xml = write_paragraph(&para).unwrap();
        assert_eq!(
            xml,
            "<w:p><w:r><w:t xml:space=\"preserve\">a</w:t><w:tab/><w:t xml:space=\"preserve\">&lt;b&gt;</w:t></w:r>\
             <w:r><w:br w:type=\"page\"/></w:r><w:r><w:br/></w:r>\
             <w:r><w:drawing><wp:inline><wp:extent cx=\"457200\" cy=\"914400\"/><wp:docPr id=\"1\" name=\"\"/></wp:inline></w:drawing></w:r></w:p>"
        );
    }

    #[test]
    fn test_document_round_trip() {
        let mut doc = Document::new();
        let first = doc.add_paragraph(Paragraph::with_text("Title"));
        doc.format_mut(first)
            .set_special_indentation(SpecialIndentationType::FirstLine, 2.0, IndentationUnit::Character)
            .unwrap();
        doc.format_mut(first)
            .set_before_spacing(1.0, SpacingUnit::Line)
            .unwrap();
        doc.format_mut(first)
            .set_line_spacing(1.5, LineSpacingRule::Multiple)
            .unwrap();
        doc.character_format_mut(first, Some(0)).set_bold(true).unwrap();
        doc.insert_section_break(first, crate::docx::enums::SectionBreakType::Continuous)
            .unwrap();
        let table = doc.add_table(1, 2, 100.0);
        let cell = doc.cell_paragraph(table, 0, 1).unwrap();
        doc.paragraph_mut(cell).unwrap().set_text("cell");
        doc.set_column_width(table, 0, 50.0, CellWidthType::Percent).unwrap();

        let xml = doc.to_document_xml().unwrap();
        let back = Document::from_xml_parts(xml.as_bytes(), None, None).unwrap();

        let ids = back.paragraph_ids();
        assert_eq!(ids.len(), doc.paragraph_ids().len());
        for (a, b) in doc.paragraph_ids().into_iter().zip(ids.iter().copied()) {
            assert_eq!(doc.paragraph(a).unwrap(), back.paragraph(b).unwrap());
        }
        assert_eq!(back.sections().len(), doc.sections().len());
        let fmt = back.format(ids[0]);
        assert_eq!(fmt.line_spacing().value, 1.5);
        assert_eq!(fmt.special_indentation().value, 2.0);
        let (tid, _, _) = back.table_containing(cell).unwrap();
        assert_eq!(back.table(tid).unwrap().column_widths(), doc.table(table).unwrap().column_widths());
    }
}
