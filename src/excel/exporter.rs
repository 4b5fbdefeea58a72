//! Excel exporter implementation - Workbook → Excel (.xlsx) bytes

use crate::error::{RevueError, RevueResult};
use crate::types::{Cell, CellValue, NumberFormat, Sheet, Workbook};
use rust_xlsxwriter::{Format, Formula, Workbook as XlsxWorkbook, Worksheet};
use std::path::Path;

/// MIME type of an Office Open XML spreadsheet
pub const XLSX_MIME_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Excel exporter for [`Workbook`] values
pub struct ExcelExporter<'a> {
    workbook: &'a Workbook,
    currency_format: Format,
    percent_format: Format,
    date_format: Format,
}

impl<'a> ExcelExporter<'a> {
    /// Create a new Excel exporter
    pub fn new(workbook: &'a Workbook) -> Self {
        Self {
            workbook,
            currency_format: Format::new().set_num_format(NumberFormat::Currency.pattern()),
            percent_format: Format::new().set_num_format(NumberFormat::Percent.pattern()),
            date_format: Format::new().set_num_format(NumberFormat::Date.pattern()),
        }
    }

    /// Serialize the workbook to .xlsx bytes
    pub fn to_bytes(&self) -> RevueResult<Vec<u8>> {
        let mut xlsx = self.build()?;
        xlsx.save_to_buffer()
            .map_err(|e| RevueError::Encode(format!("Failed to serialize workbook: {}", e)))
    }

    /// Write the workbook to an .xlsx file
    pub fn export(&self, output_path: &Path) -> RevueResult<()> {
        let mut xlsx = self.build()?;
        xlsx.save(output_path)
            .map_err(|e| RevueError::Encode(format!("Failed to save Excel file: {}", e)))
    }

    fn build(&self) -> RevueResult<XlsxWorkbook> {
        let mut xlsx = XlsxWorkbook::new();
        for sheet in self.workbook.sheets() {
            self.export_sheet(&mut xlsx, sheet)?;
        }
        Ok(xlsx)
    }

    /// Export a single sheet to a worksheet
    fn export_sheet(&self, xlsx: &mut XlsxWorkbook, sheet: &Sheet) -> RevueResult<()> {
        let worksheet = xlsx.add_worksheet();
        worksheet
            .set_name(sheet.name())
            .map_err(|e| RevueError::Encode(format!("Failed to set worksheet name: {}", e)))?;

        for ((row, col), cell) in sheet.cells() {
            self.write_cell(worksheet, row, col, cell)?;
        }

        Ok(())
    }

    fn write_cell(&self, worksheet: &mut Worksheet, row: u32, col: u16, cell: &Cell) -> RevueResult<()> {
        let result = match (&cell.formula, &cell.value) {
            // Formula cells carry their cached value as the stored result
            (Some(formula), value) => {
                let formula = Formula::new(formula).set_result(value.to_text());
                match self.format_for(cell.format) {
                    Some(format) => worksheet.write_formula_with_format(row, col, formula, format),
                    None => worksheet.write_formula(row, col, formula),
                }
            }
            (None, CellValue::Empty) => return Ok(()),
            (None, CellValue::Number(n)) => match self.format_for(cell.format) {
                Some(format) => worksheet.write_number_with_format(row, col, *n, format),
                None => worksheet.write_number(row, col, *n),
            },
            (None, CellValue::Text(s)) => worksheet.write_string(row, col, s),
            (None, CellValue::Bool(b)) => worksheet.write_boolean(row, col, *b),
        };

        result
            .map(|_| ())
            .map_err(|e| RevueError::Encode(format!("Failed to write cell ({}, {}): {}", row, col, e)))
    }

    fn format_for(&self, format: Option<NumberFormat>) -> Option<&Format> {
        match format? {
            NumberFormat::Currency => Some(&self.currency_format),
            NumberFormat::Percent => Some(&self.percent_format),
            NumberFormat::Date => Some(&self.date_format),
        }
    }
}
