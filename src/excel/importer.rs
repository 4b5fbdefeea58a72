//! Excel importer implementation - Excel (.xlsx/.xlsm) bytes → Workbook

use crate::error::{RevueError, RevueResult};
use crate::types::{Cell, CellValue, NumberFormat, Sheet, Workbook};
use calamine::{open_workbook_from_rs, Data, Range, Reader, Xlsx};
use std::io::Cursor;
use std::path::Path;
use tracing::{debug, warn};

/// Excel importer for turning raw workbook bytes into a [`Workbook`]
pub struct ExcelImporter {
    bytes: Vec<u8>,
}

impl ExcelImporter {
    /// Create an importer over an in-memory buffer
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: bytes.into(),
        }
    }

    /// Read a file fully into memory before any parsing
    pub fn from_path<P: AsRef<Path>>(path: P) -> RevueResult<Self> {
        let bytes = std::fs::read(path.as_ref())?;
        Ok(Self::from_bytes(bytes))
    }

    /// Decode every sheet, keeping the workbook's tab order
    pub fn import(&self) -> RevueResult<Workbook> {
        let cursor = Cursor::new(self.bytes.as_slice());
        let mut workbook: Xlsx<_> = open_workbook_from_rs(cursor)
            .map_err(|e| RevueError::Decode(format!("Failed to open Excel file: {}", e)))?;

        let sheet_names = workbook.sheet_names().to_vec();
        let mut sheets = Vec::with_capacity(sheet_names.len());

        for sheet_name in sheet_names {
            match workbook.worksheet_range(&sheet_name) {
                Ok(range) => {
                    // Formulas are optional: a sheet whose formulas cannot be
                    // read still keeps its cached values
                    let formulas = workbook
                        .worksheet_formula(&sheet_name)
                        .map_err(|e| debug!(sheet = %sheet_name, error = %e, "no formulas read"))
                        .ok();
                    sheets.push(self.convert_sheet(&sheet_name, &range, formulas.as_ref()));
                }
                Err(e) => {
                    // Chart sheets and the like have no cell range
                    warn!(sheet = %sheet_name, error = %e, "sheet has no readable cells");
                    sheets.push(Sheet::new(sheet_name));
                }
            }
        }

        debug!(sheets = sheets.len(), "workbook decoded");
        Ok(Workbook::from_sheets(sheets))
    }

    /// Copy a calamine range into a sparse sheet at absolute positions,
    /// then attach each formula to its cell
    fn convert_sheet(
        &self,
        sheet_name: &str,
        range: &Range<Data>,
        formulas: Option<&Range<String>>,
    ) -> Sheet {
        let mut sheet = Sheet::new(sheet_name);

        if let Some((start_row, start_col)) = range.start() {
            for (row, col, data) in range.used_cells() {
                let Some((row, col)) = Self::absolute(start_row, start_col, row, col) else {
                    continue;
                };
                let mut cell = Cell::new(Self::convert_cell(data));
                if matches!(data, Data::DateTime(dt) if dt.is_datetime()) {
                    cell = cell.with_format(NumberFormat::Date);
                }
                sheet.set_cell(row, col, cell);
            }
        }

        let Some(formulas) = formulas else {
            return sheet;
        };
        let Some((start_row, start_col)) = formulas.start() else {
            return sheet;
        };
        for (row, col, formula) in formulas.used_cells() {
            let Some((row, col)) = Self::absolute(start_row, start_col, row, col) else {
                continue;
            };
            let cell = sheet
                .get(row, col)
                .cloned()
                .unwrap_or_else(|| Cell::new(CellValue::Empty))
                .with_formula(formula.trim_start_matches('='));
            sheet.set_cell(row, col, cell);
        }

        sheet
    }

    fn absolute(start_row: u32, start_col: u32, row: usize, col: usize) -> Option<(u32, u16)> {
        let row = u32::try_from(start_row as usize + row).ok()?;
        let col = u16::try_from(start_col as usize + col).ok()?;
        Some((row, col))
    }

    /// Map calamine data onto the model's value kinds
    fn convert_cell(cell: &Data) -> CellValue {
        match cell {
            Data::Empty => CellValue::Empty,
            Data::Float(f) => CellValue::Number(*f),
            Data::Int(i) => CellValue::Number(*i as f64),
            Data::Bool(b) => CellValue::Bool(*b),
            Data::String(s) => CellValue::Text(s.clone()),
            // Dates keep their serial number so they survive re-encoding
            Data::DateTime(dt) => CellValue::Number(dt.as_f64()),
            Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Text(s.clone()),
            Data::Error(e) => CellValue::Text(e.to_string()),
        }
    }
}
