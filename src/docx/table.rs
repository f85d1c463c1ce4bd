/// Table, Row, and Cell structures for Word documents.
use crate::common::error::{Error, Result};
use crate::docx::enums::{CellWidthType, TableRegionType};
use crate::docx::paragraph::ParagraphId;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Index of a table inside its document's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TableId(pub usize);

/// Which conditional regions of the table style are enabled (`w:tblLook`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableLook {
    pub first_row: bool,
    pub last_row: bool,
    pub first_column: bool,
    pub last_column: bool,
    pub no_horizontal_banding: bool,
    pub no_vertical_banding: bool,
}

impl Default for TableLook {
    /// Word's default look (`04A0`).
    fn default() -> Self {
        Self {
            first_row: true,
            last_row: false,
            first_column: true,
            last_column: false,
            no_horizontal_banding: false,
            no_vertical_banding: true,
        }
    }
}

/// Preferred width of a cell (`w:tcW`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CellWidth {
    pub value: f64,
    pub kind: CellWidthType,
}

/// A table cell holding one or more paragraphs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableCell {
    pub(crate) paragraphs: Vec<ParagraphId>,
    pub width: Option<CellWidth>,
}

impl TableCell {
    /// Paragraphs of the cell in order.
    #[inline]
    pub fn paragraphs(&self) -> &[ParagraphId] {
        &self.paragraphs
    }
}

/// A table row.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableRow {
    pub(crate) cells: Vec<TableCell>,
}

impl TableRow {
    #[inline]
    pub fn cells(&self) -> &[TableCell] {
        &self.cells
    }

    #[inline]
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }
}

/// A table in a Word document.
///
/// Represents a `<w:tbl>` element. Tables contain rows, which contain cells,
/// which reference paragraphs stored in the document arena.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Table {
    pub(crate) style_id: Option<String>,
    pub look: TableLook,
    /// Grid column widths in points (`w:tblGrid`)
    pub(crate) grid: Vec<f64>,
    pub(crate) rows: Vec<TableRow>,
}

impl Table {
    /// Table style id (`w:tblStyle`), if any.
    #[inline]
    pub fn style_id(&self) -> Option<&str> {
        self.style_id.as_deref()
    }

    pub fn set_style_id(&mut self, style_id: Option<String>) {
        self.style_id = style_id;
    }

    #[inline]
    pub fn rows(&self) -> &[TableRow] {
        &self.rows
    }

    /// Get the number of rows in this table.
    #[inline]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Get the number of columns in this table.
    ///
    /// Uses the grid when present, else the first row.
    pub fn column_count(&self) -> usize {
        if !self.grid.is_empty() {
            return self.grid.len();
        }
        self.rows.first().map_or(0, TableRow::cell_count)
    }

    /// Grid column widths in points.
    #[inline]
    pub fn column_widths(&self) -> &[f64] {
        &self.grid
    }

    /// Get a cell by position.
    pub fn cell(&self, row: usize, col: usize) -> Option<&TableCell> {
        self.rows.get(row)?.cells.get(col)
    }

    /// Set the width of one grid column in points.
    ///
    /// Every cell in that column gets the same preferred width.
    pub fn set_column_width(&mut self, index: usize, width_pt: f64) -> Result<()> {
        if index >= self.column_count() {
            return Err(Error::invalid_argument(format!(
                "column index {} out of range for table with {} columns",
                index,
                self.column_count()
            )));
        }
        if self.grid.len() < self.column_count() {
            self.grid.resize(self.column_count(), 0.0);
        }
        self.grid[index] = width_pt;
        for row in &mut self.rows {
            if let Some(cell) = row.cells.get_mut(index) {
                cell.width = Some(CellWidth {
                    value: width_pt,
                    kind: CellWidthType::Point,
                });
            }
        }
        Ok(())
    }

    /// Find the cell that holds a paragraph.
    pub fn locate(&self, paragraph: ParagraphId) -> Option<(usize, usize)> {
        self.rows.iter().enumerate().find_map(|(r, row)| {
            row.cells
                .iter()
                .position(|cell| cell.paragraphs.contains(&paragraph))
                .map(|c| (r, c))
        })
    }

    /// Iterate over every paragraph of the table, row by row.
    pub fn paragraph_ids(&self) -> impl Iterator<Item = ParagraphId> + '_ {
        self.rows
            .iter()
            .flat_map(|row| row.cells.iter())
            .flat_map(|cell| cell.paragraphs.iter().copied())
    }

    /// Width of a cell in points, from its preferred width or the grid.
    pub fn cell_width(&self, row: usize, col: usize) -> Option<f64> {
        match self.cell(row, col)?.width {
            Some(CellWidth {
                value,
                kind: CellWidthType::Point,
            }) => Some(value),
            _ => self.grid.get(col).copied().filter(|w| *w > 0.0),
        }
    }

    /// Table style regions that apply to a cell, most specific first.
    ///
    /// Corner cells beat header rows and columns, which beat banding, which
    /// beats the whole-table region.
    pub fn regions_for(&self, row: usize, col: usize) -> SmallVec<[TableRegionType; 6]> {
        let mut regions = SmallVec::new();
        let last_row = self.rows.len().saturating_sub(1);
        let last_col = self
            .rows
            .get(row)
            .map_or(0, |r| r.cells.len().saturating_sub(1));
        let look = self.look;

        let in_first_row = look.first_row && row == 0;
        let in_last_row = look.last_row && row == last_row;
        let in_first_col = look.first_column && col == 0;
        let in_last_col = look.last_column && col == last_col;

        if in_first_row && in_first_col {
            regions.push(TableRegionType::TopLeftCell);
        }
        if in_first_row && in_last_col {
            regions.push(TableRegionType::TopRightCell);
        }
        if in_last_row && in_first_col {
            regions.push(TableRegionType::BottomLeftCell);
        }
        if in_last_row && in_last_col {
            regions.push(TableRegionType::BottomRightCell);
        }
        if in_first_row {
            regions.push(TableRegionType::FirstRow);
        }
        if in_last_row {
            regions.push(TableRegionType::LastRow);
        }
        if in_first_col {
            regions.push(TableRegionType::FirstColumn);
        }
        if in_last_col {
            regions.push(TableRegionType::LastColumn);
        }

        if !look.no_horizontal_banding && !in_first_row && !in_last_row {
            let band = row - usize::from(look.first_row);
            regions.push(if band % 2 == 0 {
                TableRegionType::OddRowBanding
            } else {
                TableRegionType::EvenRowBanding
            });
        }
        if !look.no_vertical_banding && !in_first_col && !in_last_col {
            let band = col - usize::from(look.first_column);
            regions.push(if band % 2 == 0 {
                TableRegionType::OddColumnBanding
            } else {
                TableRegionType::EvenColumnBanding
            });
        }

        regions.push(TableRegionType::WholeTable);
        regions
    }
}
