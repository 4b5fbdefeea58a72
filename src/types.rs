use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

//==============================================================================
// Cells
//==============================================================================

/// Raw value held by a cell
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum CellValue {
    Empty,
    Number(f64),
    Text(String),
    Bool(bool),
}

impl CellValue {
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    pub fn is_number(&self) -> bool {
        matches!(self, CellValue::Number(_))
    }

    /// Text rendering used for identifiers and labels.
    ///
    /// Whole numbers render without a fractional part so that an account
    /// code stored as `401000.0` reads back as `"401000"`.
    pub fn to_text(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::Text(s) => s.clone(),
            CellValue::Bool(b) => b.to_string().to_uppercase(),
            CellValue::Number(n) => format_number(*n),
        }
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

impl From<Option<f64>> for CellValue {
    fn from(n: Option<f64>) -> Self {
        n.map(CellValue::Number).unwrap_or(CellValue::Empty)
    }
}

fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

/// Display format tag attached to a cell. Never changes the value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NumberFormat {
    Currency,
    Percent,
    /// Date serial number read from a date-formatted source cell
    Date,
}

impl NumberFormat {
    /// Excel number format code
    pub fn pattern(&self) -> &'static str {
        match self {
            NumberFormat::Currency => "_-* #,##0.00_-;\\-* #,##0.00_-;_-* \"-\"??_-;_-@_-",
            NumberFormat::Percent => "0.0%",
            NumberFormat::Date => "yyyy-mm-dd",
        }
    }
}

/// One cell: its value (the cached result for formula cells), an optional
/// display format and the source formula, if any, without the leading `=`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Cell {
    pub value: CellValue,
    pub format: Option<NumberFormat>,
    pub formula: Option<String>,
}

impl Cell {
    pub fn new(value: CellValue) -> Self {
        Self {
            value,
            format: None,
            formula: None,
        }
    }

    pub fn with_format(mut self, format: NumberFormat) -> Self {
        self.format = Some(format);
        self
    }

    pub fn with_formula(mut self, formula: impl Into<String>) -> Self {
        self.formula = Some(formula.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty() && self.formula.is_none()
    }
}

//==============================================================================
// Cell addressing
//==============================================================================

/// Convert Excel column letter to index (A→0, Z→25, AA→26).
/// Returns None for anything that is not a column letter.
pub fn column_letter_to_index(letters: &str) -> Option<u16> {
    if letters.is_empty() {
        return None;
    }

    let mut index: u32 = 0;
    for c in letters.chars() {
        if !c.is_ascii_alphabetic() {
            return None;
        }
        let digit = (c.to_ascii_uppercase() as u8 - b'A') as u32 + 1;
        index = index.checked_mul(26)?.checked_add(digit)?;
    }

    u16::try_from(index - 1).ok()
}

//==============================================================================
// Sheets
//==============================================================================

/// Sparse grid of cells addressed by zero-based (row, column)
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Sheet {
    name: String,
    cells: BTreeMap<(u32, u16), Cell>,
}

impl Sheet {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cells: BTreeMap::new(),
        }
    }

    /// Build a sheet from a row-major grid starting at A1
    pub fn from_rows(name: impl Into<String>, rows: Vec<Vec<CellValue>>) -> Self {
        let mut sheet = Self::new(name);
        for (row_idx, row) in rows.into_iter().enumerate() {
            for (col_idx, value) in row.into_iter().enumerate() {
                sheet.set(row_idx as u32, col_idx as u16, value);
            }
        }
        sheet
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn get(&self, row: u32, col: u16) -> Option<&Cell> {
        self.cells.get(&(row, col))
    }

    pub fn value(&self, row: u32, col: u16) -> Option<&CellValue> {
        self.get(row, col).map(|cell| &cell.value)
    }

    pub fn format(&self, row: u32, col: u16) -> Option<NumberFormat> {
        self.get(row, col).and_then(|cell| cell.format)
    }

    /// Set a value, dropping the cell entirely when the value is empty
    pub fn set(&mut self, row: u32, col: u16, value: CellValue) {
        if value.is_empty() {
            self.cells.remove(&(row, col));
        } else {
            self.cells.insert((row, col), Cell::new(value));
        }
    }

    /// Store a full cell. Cells with neither value nor formula are dropped.
    pub fn set_cell(&mut self, row: u32, col: u16, cell: Cell) {
        if cell.is_empty() {
            self.cells.remove(&(row, col));
        } else {
            self.cells.insert((row, col), cell);
        }
    }

    pub fn formula(&self, row: u32, col: u16) -> Option<&str> {
        self.get(row, col).and_then(|cell| cell.formula.as_deref())
    }

    /// Non-empty cells in row-major order
    pub fn cells(&self) -> impl Iterator<Item = ((u32, u16), &Cell)> {
        self.cells.iter().map(|(pos, cell)| (*pos, cell))
    }

    /// Used range as (first_row, first_col, last_row, last_col)
    pub fn bounds(&self) -> Option<(u32, u16, u32, u16)> {
        let first_row = self.cells.keys().next()?.0;
        let last_row = self.cells.keys().next_back()?.0;
        let first_col = self.cells.keys().map(|(_, c)| *c).min()?;
        let last_col = self.cells.keys().map(|(_, c)| *c).max()?;
        Some((first_row, first_col, last_row, last_col))
    }

    /// Values of one row across the used column span
    pub fn row_values(&self, row: u32) -> Vec<CellValue> {
        let Some((_, first_col, _, last_col)) = self.bounds() else {
            return Vec::new();
        };
        (first_col..=last_col)
            .map(|col| self.value(row, col).cloned().unwrap_or(CellValue::Empty))
            .collect()
    }

    /// Copy of this sheet with `format` applied to every numeric cell of
    /// `col` below the first used row. Returns None when nothing would change.
    pub fn with_column_format(&self, col: u16, format: NumberFormat) -> Option<Sheet> {
        let (first_row, _, _, _) = self.bounds()?;

        let targets: Vec<(u32, u16)> = self
            .cells
            .iter()
            .filter(|((row, c), cell)| {
                *c == col
                    && *row > first_row
                    && cell.value.is_number()
                    && cell.format != Some(format)
            })
            .map(|(pos, _)| *pos)
            .collect();

        if targets.is_empty() {
            return None;
        }

        let mut sheet = self.clone();
        for pos in targets {
            if let Some(cell) = sheet.cells.get_mut(&pos) {
                cell.format = Some(format);
            }
        }
        Some(sheet)
    }
}

//==============================================================================
// Workbooks
//==============================================================================

/// Excel treats sheet names case-insensitively: "Data" and "DATA" collide.
pub fn same_sheet_name(a: &str, b: &str) -> bool {
    a == b || a.to_lowercase() == b.to_lowercase()
}

/// Ordered, copy-on-write collection of uniquely named sheets.
/// Names are unique under [`same_sheet_name`].
///
/// Sheets sit behind `Arc`, so every transformation returns a new workbook
/// that shares the untouched sheets with its source.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Workbook {
    sheets: Vec<Arc<Sheet>>,
}

impl Workbook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from sheets in tab order. A repeated name, in any case, replaces
    /// the earlier sheet.
    pub fn from_sheets(sheets: Vec<Sheet>) -> Self {
        sheets
            .into_iter()
            .fold(Self::new(), |workbook, sheet| workbook.with_sheet(sheet))
    }

    pub fn len(&self) -> usize {
        self.sheets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty()
    }

    pub fn sheet_names(&self) -> Vec<String> {
        self.sheets.iter().map(|s| s.name().to_string()).collect()
    }

    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets
            .iter()
            .find(|s| same_sheet_name(s.name(), name))
            .map(|s| s.as_ref())
    }

    pub fn sheets(&self) -> impl Iterator<Item = &Sheet> {
        self.sheets.iter().map(|s| s.as_ref())
    }

    /// New workbook with `sheet` replacing the same-named sheet in place,
    /// or appended after the last tab. The replaced tab takes the new
    /// sheet's spelling of the name.
    pub fn with_sheet(&self, sheet: Sheet) -> Workbook {
        let mut sheets = self.sheets.clone();
        match sheets.iter().position(|s| same_sheet_name(s.name(), sheet.name())) {
            Some(idx) => sheets[idx] = Arc::new(sheet),
            None => sheets.push(Arc::new(sheet)),
        }
        Workbook { sheets }
    }

    /// New workbook with a display format applied to one column of one
    /// sheet. Unknown names and no-op formatting return a plain copy.
    pub fn with_column_format(&self, sheet_name: &str, col: u16, format: NumberFormat) -> Workbook {
        let mut sheets = self.sheets.clone();
        for slot in sheets
            .iter_mut()
            .filter(|s| same_sheet_name(s.name(), sheet_name))
        {
            if let Some(formatted) = slot.with_column_format(col, format) {
                *slot = Arc::new(formatted);
            }
        }
        Workbook { sheets }
    }

    /// True when both workbooks hold the very same sheet allocation for `name`
    pub fn shares_sheet_with(&self, other: &Workbook, name: &str) -> bool {
        let find = |wb: &Workbook| {
            wb.sheets
                .iter()
                .find(|s| same_sheet_name(s.name(), name))
                .cloned()
        };
        match (find(self), find(other)) {
            (Some(a), Some(b)) => Arc::ptr_eq(&a, &b),
            _ => false,
        }
    }
}

//==============================================================================
// Reconciliation records
//==============================================================================

/// One account of one period, after aggregation of its rows
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccountRecord {
    pub account: String,
    pub label: String,
    pub balance: f64,
}

/// Account key → record for one period
pub type BalanceMap = HashMap<String, AccountRecord>;

/// One line of the comparison between the current and prior period
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonRow {
    pub account: String,
    pub label: String,
    pub balance_current: f64,
    pub balance_prior: f64,
    pub variance_absolute: f64,
    /// None when the prior balance is zero
    pub variance_percent: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_column_letters_to_index() {
        assert_eq!(column_letter_to_index("A"), Some(0));
        assert_eq!(column_letter_to_index("c"), Some(2));
        assert_eq!(column_letter_to_index("AA"), Some(26));
        assert_eq!(column_letter_to_index("AAA"), Some(702));
        assert_eq!(column_letter_to_index(""), None);
        assert_eq!(column_letter_to_index("C3"), None);
    }

    #[test]
    fn test_cell_value_to_text() {
        assert_eq!(CellValue::Number(401000.0).to_text(), "401000");
        assert_eq!(CellValue::Number(-12.5).to_text(), "-12.5");
        assert_eq!(CellValue::Text("A1".to_string()).to_text(), "A1");
        assert_eq!(CellValue::Bool(true).to_text(), "TRUE");
        assert_eq!(CellValue::Empty.to_text(), "");
    }

    #[test]
    fn test_sheet_set_empty_removes_cell() {
        let mut sheet = Sheet::new("S");
        sheet.set(0, 0, "x".into());
        assert!(!sheet.is_empty());
        sheet.set(0, 0, CellValue::Empty);
        assert!(sheet.is_empty());
        assert_eq!(sheet.bounds(), None);
    }

    #[test]
    fn test_sheet_bounds_and_row_values() {
        let mut sheet = Sheet::new("S");
        sheet.set(2, 1, "Account".into());
        sheet.set(2, 3, "Balance".into());
        sheet.set(4, 2, 10.0.into());

        assert_eq!(sheet.bounds(), Some((2, 1, 4, 3)));
        assert_eq!(
            sheet.row_values(2),
            vec![
                CellValue::Text("Account".to_string()),
                CellValue::Empty,
                CellValue::Text("Balance".to_string()),
            ]
        );
    }

    #[test]
    fn test_column_format_skips_header_and_text() {
        let sheet = Sheet::from_rows(
            "S",
            vec![
                vec!["a".into(), "b".into(), "Solde".into()],
                vec!["x".into(), "y".into(), 10.0.into()],
                vec!["x".into(), "y".into(), "n/a".into()],
            ],
        );

        let formatted = sheet
            .with_column_format(2, NumberFormat::Currency)
            .expect("one numeric cell to format");

        assert_eq!(formatted.format(0, 2), None);
        assert_eq!(formatted.format(1, 2), Some(NumberFormat::Currency));
        assert_eq!(formatted.format(2, 2), None);
        assert_eq!(formatted.value(1, 2), Some(&CellValue::Number(10.0)));
    }

    #[test]
    fn test_column_format_is_idempotent() {
        let sheet = Sheet::from_rows(
            "S",
            vec![vec!["h".into()], vec![1.0.into()], vec![2.0.into()]],
        );

        let once = sheet.with_column_format(0, NumberFormat::Percent).unwrap();
        assert!(once.with_column_format(0, NumberFormat::Percent).is_none());
    }

    #[test]
    fn test_workbook_with_sheet_replaces_in_place() {
        let wb = Workbook::from_sheets(vec![Sheet::new("A"), Sheet::new("B")]);
        let mut replacement = Sheet::new("A");
        replacement.set(0, 0, 1.0.into());

        let updated = wb.with_sheet(replacement);

        assert_eq!(updated.sheet_names(), vec!["A", "B"]);
        assert!(updated.sheet("A").unwrap().value(0, 0).is_some());
        assert!(wb.sheet("A").unwrap().is_empty());
        assert!(updated.shares_sheet_with(&wb, "B"));
        assert!(!updated.shares_sheet_with(&wb, "A"));
    }

    #[test]
    fn test_workbook_from_sheets_deduplicates_names() {
        let wb = Workbook::from_sheets(vec![Sheet::new("A"), Sheet::new("A")]);
        assert_eq!(wb.len(), 1);
    }

    #[test]
    fn test_workbook_column_format_leaves_source_untouched() {
        let wb = Workbook::from_sheets(vec![Sheet::from_rows(
            "A",
            vec![vec!["h".into()], vec![5.0.into()]],
        )]);

        let formatted = wb.with_column_format("A", 0, NumberFormat::Currency);

        assert_eq!(wb.sheet("A").unwrap().format(1, 0), None);
        assert_eq!(
            formatted.sheet("A").unwrap().format(1, 0),
            Some(NumberFormat::Currency)
        );
    }

    #[test]
    fn test_sheet_names_match_case_insensitively() {
        assert!(same_sheet_name("Revue analytique", "REVUE ANALYTIQUE"));
        assert!(same_sheet_name("Bilan été", "BILAN ÉTÉ"));
        assert!(!same_sheet_name("2024", "2023"));
    }

    #[test]
    fn test_with_sheet_replaces_case_variant_in_place() {
        let wb = Workbook::from_sheets(vec![Sheet::new("DATA"), Sheet::new("B")]);

        let updated = wb.with_sheet(Sheet::new("Data"));

        assert_eq!(updated.sheet_names(), vec!["Data", "B"]);
        assert!(updated.sheet("data").is_some());
    }

    #[test]
    fn test_formula_cell_without_cached_value_is_kept() {
        let mut sheet = Sheet::new("S");
        sheet.set_cell(3, 2, Cell::new(CellValue::Empty).with_formula("SUM(C2:C3)"));
        sheet.set_cell(4, 2, Cell::new(CellValue::Empty));

        assert_eq!(sheet.formula(3, 2), Some("SUM(C2:C3)"));
        assert_eq!(sheet.value(3, 2), Some(&CellValue::Empty));
        assert!(sheet.get(4, 2).is_none());
    }
}
