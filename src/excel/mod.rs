//! Excel decode/encode adapters
//!
//! - Import: .xlsx/.xlsm bytes → [`Workbook`](crate::types::Workbook) via calamine
//! - Export: [`Workbook`](crate::types::Workbook) → .xlsx bytes via rust_xlsxwriter

mod exporter;
mod importer;

pub use exporter::{ExcelExporter, XLSX_MIME_TYPE};
pub use importer::ExcelImporter;
