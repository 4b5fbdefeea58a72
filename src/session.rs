//! Report generation entry points and explicit session state
//!
//! [`load_workbook`] and [`generate_report`] are the two operations a
//! front end calls. [`Session`] carries what a front end would otherwise
//! keep as ambient state: the loaded file, its sheets, the two period
//! selections and the last user-facing message.

use crate::error::{RevueError, RevueResult};
use crate::excel::{ExcelExporter, ExcelImporter, XLSX_MIME_TYPE};
use crate::reader::{read_balances, BalanceColumns};
use crate::reconcile::reconcile;
use crate::report::{
    build_report, ensure_supported_file_name, output_file_name, REPORT_SHEET_NAME,
};
use crate::types::{ComparisonRow, Workbook};
use serde::Serialize;
use tracing::{error, info};

pub const MISSING_FILE_MESSAGE: &str = "Please select an Excel file.";
pub const MISSING_SELECTION_MESSAGE: &str =
    "Please choose the sheets for periods N and N-1.";

/// A decoded input workbook and its tab names
#[derive(Debug, Clone)]
pub struct LoadedWorkbook {
    pub workbook: Workbook,
    pub sheet_names: Vec<String>,
}

/// Output of one generation run
#[derive(Debug, Clone)]
pub struct GeneratedReport {
    pub bytes: Vec<u8>,
    pub file_name: String,
    pub mime_type: &'static str,
    pub rows: Vec<ComparisonRow>,
}

/// Decode raw workbook bytes
pub fn load_workbook(bytes: &[u8]) -> RevueResult<LoadedWorkbook> {
    let workbook = ExcelImporter::from_bytes(bytes).import()?;
    let sheet_names = workbook.sheet_names();
    Ok(LoadedWorkbook {
        workbook,
        sheet_names,
    })
}

/// Reconcile two sheets of `workbook` and encode the augmented workbook
pub fn generate_report(
    workbook: &Workbook,
    sheet_current: &str,
    sheet_prior: &str,
    input_file_name: &str,
    columns: &BalanceColumns,
) -> RevueResult<GeneratedReport> {
    let current = read_balances(workbook, sheet_current, columns);
    let prior = read_balances(workbook, sheet_prior, columns);
    let rows = reconcile(&current, &prior);

    let report = build_report(workbook, &rows, sheet_current, sheet_prior);
    let bytes = ExcelExporter::new(&report).to_bytes()?;

    info!(
        current = sheet_current,
        prior = sheet_prior,
        accounts = rows.len(),
        size = bytes.len(),
        "report generated"
    );

    Ok(GeneratedReport {
        bytes,
        file_name: output_file_name(input_file_name),
        mime_type: XLSX_MIME_TYPE,
        rows,
    })
}

/// Front-end state, created on file load and reset on a new load or on request
#[derive(Debug, Clone, Default, Serialize)]
pub struct Session {
    pub file_name: Option<String>,
    #[serde(skip)]
    workbook: Option<Workbook>,
    pub sheet_names: Vec<String>,
    pub selected_current: String,
    pub selected_prior: String,
    pub info_message: String,
    pub error_message: String,
    #[serde(skip)]
    columns: BalanceColumns,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_columns(columns: BalanceColumns) -> Self {
        Self {
            columns,
            ..Self::default()
        }
    }

    /// Replace whatever was loaded with a new file. Only .xlsx/.xlsm names
    /// are accepted.
    pub fn load(&mut self, file_name: impl Into<String>, bytes: &[u8]) -> RevueResult<&[String]> {
        self.reset();
        let file_name = file_name.into();

        if let Err(e) = ensure_supported_file_name(&file_name) {
            self.error_message = e.user_message();
            return Err(e);
        }

        match load_workbook(bytes) {
            Ok(loaded) => {
                info!(file = %file_name, sheets = loaded.sheet_names.len(), "workbook loaded");
                self.file_name = Some(file_name);
                self.workbook = Some(loaded.workbook);
                self.sheet_names = loaded.sheet_names;
                Ok(&self.sheet_names)
            }
            Err(e) => {
                error!(file = %file_name, error = %e, "failed to load workbook");
                self.error_message = e.user_message();
                Err(e)
            }
        }
    }

    pub fn select_current(&mut self, sheet: impl Into<String>) {
        self.selected_current = sheet.into();
    }

    pub fn select_prior(&mut self, sheet: impl Into<String>) {
        self.selected_prior = sheet.into();
    }

    pub fn workbook(&self) -> Option<&Workbook> {
        self.workbook.as_ref()
    }

    /// Clear file, selections and messages. Column configuration survives.
    pub fn reset(&mut self) {
        let columns = std::mem::take(&mut self.columns);
        *self = Self::with_columns(columns);
    }

    /// Validate the session and run generation, recording the outcome message
    pub fn generate(&mut self) -> RevueResult<GeneratedReport> {
        self.info_message.clear();
        self.error_message.clear();

        match self.try_generate() {
            Ok(report) => {
                self.info_message =
                    format!("Sheet \"{}\" generated successfully.", REPORT_SHEET_NAME);
                Ok(report)
            }
            Err(e) => {
                if !e.is_missing_input() {
                    error!(error = %e, "report generation failed");
                }
                self.error_message = e.user_message();
                Err(e)
            }
        }
    }

    fn try_generate(&self) -> RevueResult<GeneratedReport> {
        let (Some(file_name), Some(workbook)) = (&self.file_name, &self.workbook) else {
            return Err(RevueError::MissingInput(MISSING_FILE_MESSAGE.to_string()));
        };
        if self.selected_current.is_empty() || self.selected_prior.is_empty() {
            return Err(RevueError::MissingInput(MISSING_SELECTION_MESSAGE.to_string()));
        }

        generate_report(
            workbook,
            &self.selected_current,
            &self.selected_prior,
            file_name,
            &self.columns,
        )
    }
}
