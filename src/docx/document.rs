/// Document - the arena that owns paragraphs, tables, sections and styles.
use crate::common::error::{Error, Result};
use crate::docx::enums::{CellWidthType, SectionBreakType};
use crate::docx::numbering::Numbering;
use crate::docx::paragraph::{Paragraph, ParagraphId};
use crate::docx::properties::{ParagraphProperties, RunProperties};
use crate::docx::section::Section;
use crate::docx::styles::StyleTable;
use crate::docx::table::{Table, TableCell, TableId, TableRow};

/// Document-wide formatting defaults (`w:docDefaults`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocDefaults {
    /// `w:pPrDefault`
    pub paragraph: ParagraphProperties,
    /// `w:rPrDefault`
    pub run: RunProperties,
}

/// A top-level block of the document body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Block {
    Paragraph(ParagraphId),
    Table(TableId),
}

/// Location of the section properties that govern a paragraph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SectionSlot {
    /// Carried by a body paragraph.
    Paragraph(ParagraphId),
    /// The body's final `w:sectPr`.
    Final,
}

/// A Word document.
///
/// Paragraphs and tables live in arenas and are addressed by
/// [`ParagraphId`] and [`TableId`]; the body is an ordered list of blocks.
/// A section is delimited by the paragraph that carries its properties, or
/// by the end of the body for the final section.
///
/// # Example
///
/// ```rust
/// use longan::docx::document::Document;
/// use longan::docx::paragraph::Paragraph;
///
/// let mut doc = Document::new();
/// let id = doc.add_paragraph(Paragraph::with_text("Hello"));
/// assert_eq!(doc.paragraph(id).unwrap().text(), "Hello");
/// assert!(doc.owning_section(id).is_some());
/// ```
#[derive(Debug, Clone, Default)]
pub struct Document {
    pub(crate) styles: StyleTable,
    pub(crate) defaults: DocDefaults,
    pub(crate) numbering: Numbering,
    paragraphs: Vec<Paragraph>,
    tables: Vec<Table>,
    body: Vec<Block>,
    final_section: Option<Section>,
}

impl Document {
    /// Create an empty document with a default final section.
    pub fn new() -> Self {
        Self {
            final_section: Some(Section::default()),
            ..Default::default()
        }
    }

    #[inline]
    pub fn styles(&self) -> &StyleTable {
        &self.styles
    }

    #[inline]
    pub fn styles_mut(&mut self) -> &mut StyleTable {
        &mut self.styles
    }

    #[inline]
    pub fn defaults(&self) -> &DocDefaults {
        &self.defaults
    }

    #[inline]
    pub fn defaults_mut(&mut self) -> &mut DocDefaults {
        &mut self.defaults
    }

    #[inline]
    pub fn numbering(&self) -> &Numbering {
        &self.numbering
    }

    #[inline]
    pub fn numbering_mut(&mut self) -> &mut Numbering {
        &mut self.numbering
    }

    /// Top-level blocks of the body in order.
    #[inline]
    pub fn body(&self) -> &[Block] {
        &self.body
    }

    /// Get a paragraph by id.
    pub fn paragraph(&self, id: ParagraphId) -> Result<&Paragraph> {
        self.paragraphs
            .get(id.0)
            .ok_or_else(|| Error::NotFound(format!("paragraph {}", id.0)))
    }

    pub fn paragraph_mut(&mut self, id: ParagraphId) -> Result<&mut Paragraph> {
        self.paragraphs
            .get_mut(id.0)
            .ok_or_else(|| Error::NotFound(format!("paragraph {}", id.0)))
    }

    /// Get a table by id.
    pub fn table(&self, id: TableId) -> Result<&Table> {
        self.tables
            .get(id.0)
            .ok_or_else(|| Error::NotFound(format!("table {}", id.0)))
    }

    pub fn table_mut(&mut self, id: TableId) -> Result<&mut Table> {
        self.tables
            .get_mut(id.0)
            .ok_or_else(|| Error::NotFound(format!("table {}", id.0)))
    }

    /// Store a paragraph without placing it in the body.
    pub(crate) fn alloc_paragraph(&mut self, paragraph: Paragraph) -> ParagraphId {
        let id = ParagraphId(self.paragraphs.len());
        self.paragraphs.push(paragraph);
        id
    }

    /// Append an already built table, whose cell paragraphs are allocated,
    /// to the body.
    pub(crate) fn push_table(&mut self, table: Table) -> TableId {
        let id = TableId(self.tables.len());
        self.tables.push(table);
        self.body.push(Block::Table(id));
        id
    }

    /// Append a paragraph to the body.
    pub fn add_paragraph(&mut self, paragraph: Paragraph) -> ParagraphId {
        let id = self.alloc_paragraph(paragraph);
        self.body.push(Block::Paragraph(id));
        id
    }

    /// Insert a paragraph right after `after`, in the body or in its cell.
    pub fn insert_paragraph_after(
        &mut self,
        after: ParagraphId,
        paragraph: Paragraph,
    ) -> Result<ParagraphId> {
        if let Some(index) = self
            .body
            .iter()
            .position(|b| *b == Block::Paragraph(after))
        {
            let id = self.alloc_paragraph(paragraph);
            self.body.insert(index + 1, Block::Paragraph(id));
            return Ok(id);
        }
        let Some((table, row, col)) = self.table_containing(after) else {
            return Err(Error::NotFound(format!("paragraph {}", after.0)));
        };
        let id = self.alloc_paragraph(paragraph);
        let cell = &mut self.tables[table.0].rows[row].cells[col];
        let pos = cell
            .paragraphs
            .iter()
            .position(|p| *p == after)
            .map_or(cell.paragraphs.len(), |p| p + 1);
        cell.paragraphs.insert(pos, id);
        Ok(id)
    }

    /// Append a table of empty cells to the body.
    ///
    /// Each cell gets one empty paragraph; every grid column is
    /// `column_width` points wide.
    pub fn add_table(&mut self, rows: usize, cols: usize, column_width: f64) -> TableId {
        let mut table = Table {
            grid: vec![column_width; cols],
            ..Default::default()
        };
        for _ in 0..rows {
            let mut row = TableRow::default();
            for _ in 0..cols {
                let id = self.alloc_paragraph(Paragraph::new());
                row.cells.push(TableCell {
                    paragraphs: vec![id],
                    width: None,
                });
            }
            table.rows.push(row);
        }
        self.push_table(table)
    }

    /// First paragraph of a cell.
    pub fn cell_paragraph(&self, table: TableId, row: usize, col: usize) -> Result<ParagraphId> {
        self.table(table)?
            .cell(row, col)
            .and_then(|c| c.paragraphs.first().copied())
            .ok_or_else(|| Error::NotFound(format!("cell ({}, {}) of table {}", row, col, table.0)))
    }

    /// Find the table cell that holds a paragraph.
    pub fn table_containing(&self, paragraph: ParagraphId) -> Option<(TableId, usize, usize)> {
        self.body.iter().find_map(|block| match *block {
            Block::Table(tid) => self.tables[tid.0]
                .locate(paragraph)
                .map(|(row, col)| (tid, row, col)),
            Block::Paragraph(_) => None,
        })
    }

    /// Every paragraph reachable from the body, in document order.
    pub fn paragraph_ids(&self) -> Vec<ParagraphId> {
        let mut ids = Vec::with_capacity(self.paragraphs.len());
        for block in &self.body {
            match *block {
                Block::Paragraph(id) => ids.push(id),
                Block::Table(tid) => ids.extend(self.tables[tid.0].paragraph_ids()),
            }
        }
        ids
    }

    fn block_index(&self, paragraph: ParagraphId) -> Option<usize> {
        self.body.iter().position(|block| match *block {
            Block::Paragraph(id) => id == paragraph,
            Block::Table(tid) => self.tables[tid.0].locate(paragraph).is_some(),
        })
    }

    fn section_slot(&self, paragraph: ParagraphId) -> Option<SectionSlot> {
        let start = self.block_index(paragraph)?;
        let carrier = self.body[start..].iter().find_map(|block| match *block {
            Block::Paragraph(id) if self.paragraphs[id.0].section.is_some() => Some(id),
            _ => None,
        });
        match carrier {
            Some(id) => Some(SectionSlot::Paragraph(id)),
            None if self.final_section.is_some() => Some(SectionSlot::Final),
            None => None,
        }
    }

    fn section_at(&self, slot: SectionSlot) -> Option<&Section> {
        match slot {
            SectionSlot::Paragraph(id) => self.paragraphs[id.0].section.as_ref(),
            SectionSlot::Final => self.final_section.as_ref(),
        }
    }

    fn section_at_mut(&mut self, slot: SectionSlot) -> Option<&mut Section> {
        match slot {
            SectionSlot::Paragraph(id) => self.paragraphs[id.0].section.as_mut(),
            SectionSlot::Final => self.final_section.as_mut(),
        }
    }

    /// The section a paragraph belongs to: the first section break at or
    /// after it in body order, else the final section.
    pub fn owning_section(&self, paragraph: ParagraphId) -> Option<&Section> {
        self.section_slot(paragraph)
            .and_then(|slot| self.section_at(slot))
    }

    /// All sections in body order.
    pub fn sections(&self) -> Vec<&Section> {
        let mut sections: Vec<&Section> = self
            .body
            .iter()
            .filter_map(|block| match *block {
                Block::Paragraph(id) => self.paragraphs[id.0].section.as_ref(),
                Block::Table(_) => None,
            })
            .collect();
        sections.extend(self.final_section.as_ref());
        sections
    }

    #[inline]
    pub fn final_section(&self) -> Option<&Section> {
        self.final_section.as_ref()
    }

    pub fn set_final_section(&mut self, section: Option<Section>) {
        self.final_section = section;
    }

    /// Attach section properties to a body paragraph, making it the end of
    /// a section.
    pub fn set_paragraph_section(
        &mut self,
        paragraph: ParagraphId,
        section: Option<Section>,
    ) -> Result<()> {
        if section.is_some() && !self.body.contains(&Block::Paragraph(paragraph)) {
            return Err(Error::precondition(format!(
                "paragraph {} is not a body paragraph and cannot end a section",
                paragraph.0
            )));
        }
        self.paragraph_mut(paragraph)?.section = section;
        Ok(())
    }

    /// End a section at `paragraph`.
    ///
    /// The section that owned the paragraph is split in two: the part up to
    /// and including the paragraph keeps the original start type, the part
    /// after it starts with `kind`. Both halves share page setup.
    ///
    /// Returns the section now ending at `paragraph`, for further editing.
    pub fn insert_section_break(
        &mut self,
        paragraph: ParagraphId,
        kind: SectionBreakType,
    ) -> Result<&mut Section> {
        self.paragraph(paragraph)?;
        if !self.body.contains(&Block::Paragraph(paragraph)) {
            return Err(Error::precondition(format!(
                "paragraph {} is inside a table; section breaks need a body paragraph",
                paragraph.0
            )));
        }
        let slot = self.section_slot(paragraph).ok_or_else(|| {
            Error::precondition(format!("paragraph {} does not belong to a section", paragraph.0))
        })?;
        let Some(owner) = self.section_at_mut(slot) else {
            return Err(Error::precondition(format!(
                "paragraph {} does not belong to a section",
                paragraph.0
            )));
        };

        let ending = owner.clone();
        owner.break_type = match kind {
            SectionBreakType::NextPage => None,
            other => Some(other),
        };

        if slot == SectionSlot::Paragraph(paragraph) {
            let moved = self.paragraphs[paragraph.0].section.take();
            let mut carrier = Paragraph::new();
            carrier.section = moved;
            self.insert_paragraph_after(paragraph, carrier)?;
        }
        log::debug!("inserted {} section break after paragraph {}", kind, paragraph.0);
        Ok(self.paragraphs[paragraph.0].section.insert(ending))
    }

    /// Set the width of a table column.
    ///
    /// A percentage is taken of the content width of the last section.
    pub fn set_column_width(
        &mut self,
        table: TableId,
        index: usize,
        width: f64,
        kind: CellWidthType,
    ) -> Result<()> {
        let width_pt = match kind {
            CellWidthType::Point => width,
            CellWidthType::Percent => {
                let total = self
                    .sections()
                    .last()
                    .map_or_else(|| Section::default().content_width(), |s| s.content_width());
                total * width / 100.0
            },
        };
        self.table_mut(table)?.set_column_width(index, width_pt)
    }
}
