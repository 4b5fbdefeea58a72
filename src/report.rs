//! Report writer: comparison rows → "Revue analytique" sheet
//!
//! The report is added to a copy of the input workbook. Display formats are
//! presentation metadata only; underlying values are never touched.

use crate::error::{RevueError, RevueResult};
use crate::types::{
    column_letter_to_index, same_sheet_name, CellValue, ComparisonRow, NumberFormat, Sheet,
    Workbook,
};
use regex::Regex;
use std::sync::OnceLock;

/// Name of the generated comparison sheet
pub const REPORT_SHEET_NAME: &str = "Revue analytique";

/// Suffix appended to the input file stem for the output file
pub const OUTPUT_SUFFIX: &str = "_revue_analytique.xlsx";

/// Column holding the balance in the source sheets
pub const SOURCE_BALANCE_COLUMN: &str = "C";

const CURRENCY_COLUMNS: [&str; 3] = ["C", "D", "E"];
const PERCENT_COLUMN: &str = "F";

/// Header row of the report sheet
pub fn report_header(label_current: &str, label_prior: &str) -> Vec<String> {
    vec![
        "Account".to_string(),
        "Label".to_string(),
        strip_whitespace(label_current),
        strip_whitespace(label_prior),
        "Variance (absolute)".to_string(),
        "Variance (%)".to_string(),
    ]
}

fn strip_whitespace(s: &str) -> String {
    s.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Lay out the comparison rows as an unformatted sheet
pub fn report_sheet(rows: &[ComparisonRow], label_current: &str, label_prior: &str) -> Sheet {
    let header: Vec<CellValue> = report_header(label_current, label_prior)
        .into_iter()
        .map(CellValue::Text)
        .collect();

    let body = rows.iter().map(|row| {
        vec![
            CellValue::Text(row.account.clone()),
            CellValue::Text(row.label.clone()),
            CellValue::Number(row.balance_current),
            CellValue::Number(row.balance_prior),
            CellValue::Number(row.variance_absolute),
            row.variance_percent.into(),
        ]
    });

    Sheet::from_rows(REPORT_SHEET_NAME, std::iter::once(header).chain(body).collect())
}

/// Return a new workbook holding the report sheet plus formatted source sheets.
///
/// An existing sheet named [`REPORT_SHEET_NAME`], in any letter case, is
/// replaced in place. The input
/// workbook is left as it was.
pub fn build_report(
    workbook: &Workbook,
    rows: &[ComparisonRow],
    label_current: &str,
    label_prior: &str,
) -> Workbook {
    let report = report_sheet(rows, label_current, label_prior);
    let with_report = workbook.with_sheet(report);
    apply_report_formats(&with_report)
}

/// Currency on column C of every source sheet; currency on C..E and a
/// one-decimal percentage on F of the report sheet. Idempotent.
pub fn apply_report_formats(workbook: &Workbook) -> Workbook {
    let mut formatted = workbook.clone();

    for name in workbook.sheet_names() {
        if same_sheet_name(&name, REPORT_SHEET_NAME) {
            continue;
        }
        formatted = format_column(&formatted, &name, SOURCE_BALANCE_COLUMN, NumberFormat::Currency);
    }

    for letter in CURRENCY_COLUMNS {
        formatted = format_column(&formatted, REPORT_SHEET_NAME, letter, NumberFormat::Currency);
    }
    format_column(&formatted, REPORT_SHEET_NAME, PERCENT_COLUMN, NumberFormat::Percent)
}

fn format_column(workbook: &Workbook, sheet: &str, letter: &str, format: NumberFormat) -> Workbook {
    match column_letter_to_index(letter) {
        Some(col) => workbook.with_column_format(sheet, col, format),
        None => workbook.clone(),
    }
}

fn extension_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\.xls[xm]$").expect("valid extension regex"))
}

/// True for names ending in .xlsx or .xlsm, any case
pub fn is_supported_file_name(file_name: &str) -> bool {
    extension_regex().is_match(file_name)
}

/// Reject names that are not .xlsx/.xlsm before any decoding
pub fn ensure_supported_file_name(file_name: &str) -> RevueResult<()> {
    if is_supported_file_name(file_name) {
        Ok(())
    } else {
        Err(RevueError::MissingInput(format!(
            "Input must be an .xlsx or .xlsm file: {}",
            file_name
        )))
    }
}

/// Output name: input name without its .xlsx/.xlsm extension plus the report suffix
pub fn output_file_name(input_file_name: &str) -> String {
    let stem = extension_regex().replace(input_file_name, "");
    format!("{}{}", stem, OUTPUT_SUFFIX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reconcile::compare;
    use pretty_assertions::assert_eq;

    fn rows() -> Vec<ComparisonRow> {
        vec![
            compare("A1".to_string(), "Cash".to_string(), 1000.0, 800.0),
            compare("A2".to_string(), "Debt".to_string(), -500.0, 0.0),
        ]
    }

    fn source_workbook() -> Workbook {
        Workbook::from_sheets(vec![
            Sheet::from_rows(
                "2024",
                vec![
                    vec!["Account".into(), "Label".into(), "Balance".into()],
                    vec!["A1".into(), "Cash".into(), 1000.0.into()],
                ],
            ),
            Sheet::from_rows(
                "2023",
                vec![
                    vec!["Account".into(), "Label".into(), "Balance".into()],
                    vec!["A1".into(), "Cash".into(), 800.0.into()],
                ],
            ),
        ])
    }

    #[test]
    fn test_header_strips_whitespace_from_sheet_names() {
        assert_eq!(
            report_header("Balance 2024 ", " N - 1"),
            vec![
                "Account",
                "Label",
                "Balance2024",
                "N-1",
                "Variance (absolute)",
                "Variance (%)"
            ]
        );
    }

    #[test]
    fn test_report_sheet_layout() {
        let sheet = report_sheet(&rows(), "2024", "2023");

        assert_eq!(sheet.name(), REPORT_SHEET_NAME);
        assert_eq!(sheet.value(1, 0), Some(&CellValue::Text("A1".to_string())));
        assert_eq!(sheet.value(1, 4), Some(&CellValue::Number(200.0)));
        assert_eq!(sheet.value(1, 5), Some(&CellValue::Number(0.25)));
        assert_eq!(sheet.value(2, 5), None);
    }

    #[test]
    fn test_build_report_appends_sheet() {
        let source = source_workbook();
        let report = build_report(&source, &rows(), "2024", "2023");

        assert_eq!(report.sheet_names(), vec!["2024", "2023", REPORT_SHEET_NAME]);
        assert_eq!(source.sheet_names(), vec!["2024", "2023"]);
    }

    #[test]
    fn test_build_report_replaces_existing_report() {
        let source = source_workbook().with_sheet(Sheet::new(REPORT_SHEET_NAME));
        let once = build_report(&source, &rows(), "2024", "2023");
        let twice = build_report(&once, &rows(), "2024", "2023");

        let count = twice
            .sheet_names()
            .iter()
            .filter(|n| n.as_str() == REPORT_SHEET_NAME)
            .count();
        assert_eq!(count, 1);
        assert_eq!(twice.len(), 3);
    }

    #[test]
    fn test_formats_on_report_and_sources() {
        let report = build_report(&source_workbook(), &rows(), "2024", "2023");

        let source = report.sheet("2024").unwrap();
        assert_eq!(source.format(1, 2), Some(NumberFormat::Currency));
        assert_eq!(source.format(0, 2), None);

        let sheet = report.sheet(REPORT_SHEET_NAME).unwrap();
        for col in 2..=4 {
            assert_eq!(sheet.format(1, col), Some(NumberFormat::Currency));
        }
        assert_eq!(sheet.format(1, 5), Some(NumberFormat::Percent));
        assert_eq!(sheet.format(1, 0), None);
        assert_eq!(sheet.format(0, 2), None);
    }

    #[test]
    fn test_input_workbook_not_mutated() {
        let source = source_workbook();
        let snapshot = source.clone();

        let _ = build_report(&source, &rows(), "2024", "2023");

        assert_eq!(source, snapshot);
        assert_eq!(source.sheet("2024").unwrap().format(1, 2), None);
    }

    #[test]
    fn test_formatting_twice_is_identical() {
        let report = build_report(&source_workbook(), &rows(), "2024", "2023");
        let again = apply_report_formats(&report);

        assert_eq!(again, report);
        for name in report.sheet_names() {
            assert!(again.shares_sheet_with(&report, &name));
        }
    }

    #[test]
    fn test_output_file_name() {
        assert_eq!(
            output_file_name("Balances_2024.xlsm"),
            "Balances_2024_revue_analytique.xlsx"
        );
        assert_eq!(output_file_name("book.XLSX"), "book_revue_analytique.xlsx");
        assert_eq!(output_file_name("noext"), "noext_revue_analytique.xlsx");
        assert_eq!(
            output_file_name("a.xlsx.xlsx"),
            "a.xlsx_revue_analytique.xlsx"
        );
    }

    #[test]
    fn test_build_report_replaces_case_variant_report_sheet() {
        let stale = Sheet::from_rows("REVUE ANALYTIQUE", vec![vec!["stale".into()]]);
        let source = source_workbook().with_sheet(stale);

        let report = build_report(&source, &rows(), "2024", "2023");

        assert_eq!(report.sheet_names(), vec!["2024", "2023", REPORT_SHEET_NAME]);
        let sheet = report.sheet(REPORT_SHEET_NAME).unwrap();
        assert_eq!(sheet.value(0, 0), Some(&CellValue::Text("Account".to_string())));
        assert_eq!(sheet.format(1, 5), Some(NumberFormat::Percent));
    }

    #[test]
    fn test_ensure_supported_file_name() {
        assert!(ensure_supported_file_name("Balances.xlsm").is_ok());
        let err = ensure_supported_file_name("x.csv").unwrap_err();
        assert!(err.is_missing_input());
        assert!(err.user_message().contains("x.csv"));
    }

    #[test]
    fn test_supported_file_names() {
        assert!(is_supported_file_name("a.xlsx"));
        assert!(is_supported_file_name("a.XLSM"));
        assert!(!is_supported_file_name("a.xls"));
        assert!(!is_supported_file_name("a.csv"));
    }
}
