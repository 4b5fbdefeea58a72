//! Revue - analytical review of account balances
//!
//! Reads a workbook holding balances for two periods, reconciles the accounts
//! of both periods and adds a "Revue analytique" comparison sheet with
//! absolute and percentage variances.
//!
//! # Pipeline
//!
//! bytes → [`excel::ExcelImporter`] → [`reader::read_balances`] (×2)
//! → [`reconcile::reconcile`] → [`report::build_report`]
//! → [`excel::ExcelExporter`] → bytes
//!
//! # Example
//!
//! ```no_run
//! use revue_analytique::reader::BalanceColumns;
//! use revue_analytique::session::{generate_report, load_workbook};
//!
//! let bytes = std::fs::read("Balances_2024.xlsx")?;
//! let loaded = load_workbook(&bytes)?;
//! println!("Sheets: {:?}", loaded.sheet_names);
//!
//! let report = generate_report(
//!     &loaded.workbook,
//!     "2024",
//!     "2023",
//!     "Balances_2024.xlsx",
//!     &BalanceColumns::default(),
//! )?;
//! std::fs::write(&report.file_name, &report.bytes)?;
//! # Ok::<(), revue_analytique::error::RevueError>(())
//! ```

pub mod api;
pub mod cli;
pub mod error;
pub mod excel;
pub mod reader;
pub mod reconcile;
pub mod report;
pub mod session;
pub mod types;

// Re-export commonly used types
pub use error::{RevueError, RevueResult};
pub use types::{AccountRecord, BalanceMap, ComparisonRow, Sheet, Workbook};
