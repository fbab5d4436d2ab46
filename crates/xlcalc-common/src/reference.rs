use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ReferenceError {
    #[error("row and column indices must be 1-based")]
    ZeroIndex,
    #[error("range must be ordered: start <= end")]
    Unordered,
}

/// A single cell, 1-based. `sheet == None` means "the sheet being evaluated".
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CellRef {
    pub sheet: Option<String>,
    pub row: u32,
    pub col: u32,
}

impl CellRef {
    pub fn new(row: u32, col: u32) -> Result<Self, ReferenceError> {
        if row == 0 || col == 0 {
            return Err(ReferenceError::ZeroIndex);
        }
        Ok(Self {
            sheet: None,
            row,
            col,
        })
    }

    pub fn on_sheet(mut self, sheet: impl Into<String>) -> Self {
        self.sheet = Some(sheet.into());
        self
    }
}

/// A rectangular block of cells, 1-based and inclusive on both ends.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct RangeRef {
    pub sheet: Option<String>,
    pub start_row: u32,
    pub start_col: u32,
    pub end_row: u32,
    pub end_col: u32,
}

impl RangeRef {
    pub fn new(
        start_row: u32,
        start_col: u32,
        end_row: u32,
        end_col: u32,
    ) -> Result<Self, ReferenceError> {
        if start_row == 0 || start_col == 0 || end_row == 0 || end_col == 0 {
            return Err(ReferenceError::ZeroIndex);
        }
        if start_row > end_row || start_col > end_col {
            return Err(ReferenceError::Unordered);
        }
        Ok(Self {
            sheet: None,
            start_row,
            start_col,
            end_row,
            end_col,
        })
    }

    pub fn on_sheet(mut self, sheet: impl Into<String>) -> Self {
        self.sheet = Some(sheet.into());
        self
    }

    pub fn width(&self) -> u32 {
        self.end_col - self.start_col + 1
    }

    pub fn height(&self) -> u32 {
        self.end_row - self.start_row + 1
    }

    pub fn is_single_cell(&self) -> bool {
        self.width() == 1 && self.height() == 1
    }

    pub fn top_left(&self) -> CellRef {
        CellRef {
            sheet: self.sheet.clone(),
            row: self.start_row,
            col: self.start_col,
        }
    }

    /// Cells in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = CellRef> + '_ {
        (self.start_row..=self.end_row).flat_map(move |row| {
            (self.start_col..=self.end_col).map(move |col| CellRef {
                sheet: self.sheet.clone(),
                row,
                col,
            })
        })
    }
}

impl From<CellRef> for RangeRef {
    fn from(c: CellRef) -> Self {
        RangeRef {
            sheet: c.sheet,
            start_row: c.row,
            start_col: c.col,
            end_row: c.row,
            end_col: c.col,
        }
    }
}

fn column_letters(mut col: u32, out: &mut String) {
    let mut buf = Vec::new();
    while col > 0 {
        let rem = (col - 1) % 26;
        buf.push(b'A' + rem as u8);
        col = (col - 1) / 26;
    }
    out.extend(buf.iter().rev().map(|&b| b as char));
}

impl fmt::Display for CellRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = String::new();
        if let Some(sheet) = &self.sheet {
            s.push_str(sheet);
            s.push('!');
        }
        column_letters(self.col, &mut s);
        write!(f, "{s}{}", self.row)
    }
}

impl fmt::Display for RangeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = String::new();
        if let Some(sheet) = &self.sheet {
            s.push_str(sheet);
            s.push('!');
        }
        column_letters(self.start_col, &mut s);
        s.push_str(&self.start_row.to_string());
        if !self.is_single_cell() {
            s.push(':');
            column_letters(self.end_col, &mut s);
            s.push_str(&self.end_row.to_string());
        }
        f.write_str(&s)
    }
}
