//! Sheet reader: one sheet of balances → account map
//!
//! Each data row is resolved once into a typed [`BalanceRow`] through a
//! header lookup, then folded into a [`BalanceMap`]. Malformed rows never
//! fail the read: rows without an account are skipped and unparseable
//! balances count as zero.

use crate::types::{AccountRecord, BalanceMap, CellValue, Sheet, Workbook};
use serde::{Deserialize, Serialize};
use std::collections::hash_map::Entry;
use tracing::debug;

/// Header names accepted for each column of a balance sheet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceColumns {
    /// Matched exactly
    pub account: Vec<String>,
    /// Matched exactly
    pub label: Vec<String>,
    /// Matched after trimming surrounding whitespace from the header
    pub balance: Vec<String>,
}

impl Default for BalanceColumns {
    fn default() -> Self {
        Self {
            account: vec!["Account".to_string(), "Compte".to_string()],
            label: vec!["Label".to_string(), "Libellé".to_string()],
            balance: vec!["Balance".to_string(), "Solde".to_string()],
        }
    }
}

impl BalanceColumns {
    pub fn with_account(mut self, header: impl Into<String>) -> Self {
        self.account = vec![header.into()];
        self
    }

    pub fn with_label(mut self, header: impl Into<String>) -> Self {
        self.label = vec![header.into()];
        self
    }

    pub fn with_balance(mut self, header: impl Into<String>) -> Self {
        self.balance = vec![header.into()];
        self
    }
}

/// Column positions found in a sheet's header row
#[derive(Debug, Clone, Copy, PartialEq)]
struct HeaderLayout {
    header_row: u32,
    account: Option<u16>,
    label: Option<u16>,
    balance: Option<u16>,
}

impl HeaderLayout {
    /// Use the first row of the used range as the header row.
    /// When a name appears twice, the leftmost column wins.
    fn resolve(sheet: &Sheet, columns: &BalanceColumns) -> Option<Self> {
        let (header_row, first_col, _, last_col) = sheet.bounds()?;

        let headers: Vec<(u16, String)> = (first_col..=last_col)
            .filter_map(|col| sheet.value(header_row, col).map(|v| (col, v.to_text())))
            .collect();

        let find = |names: &[String], trim: bool| {
            headers
                .iter()
                .find(|(_, header)| {
                    let header = if trim { header.trim() } else { header.as_str() };
                    names.iter().any(|name| name == header)
                })
                .map(|(col, _)| *col)
        };

        Some(Self {
            header_row,
            account: find(&columns.account, false),
            label: find(&columns.label, false),
            balance: find(&columns.balance, true),
        })
    }
}

/// One data row after header resolution
#[derive(Debug, Clone, PartialEq)]
struct BalanceRow {
    account: Option<String>,
    label: String,
    balance: f64,
}

impl BalanceRow {
    fn from_sheet(sheet: &Sheet, layout: &HeaderLayout, row: u32) -> Self {
        let cell = |col: Option<u16>| col.and_then(|c| sheet.value(row, c));

        let account = cell(layout.account)
            .map(CellValue::to_text)
            .filter(|account| !account.trim().is_empty());
        let label = cell(layout.label).map(CellValue::to_text).unwrap_or_default();
        let balance = parse_balance(cell(layout.balance));

        Self {
            account,
            label,
            balance,
        }
    }
}

/// Read the balances of `sheet_name`, aggregated per account.
///
/// A missing sheet yields an empty map: it means "no data for that period".
pub fn read_balances(workbook: &Workbook, sheet_name: &str, columns: &BalanceColumns) -> BalanceMap {
    let mut balances = BalanceMap::new();

    let Some(sheet) = workbook.sheet(sheet_name) else {
        debug!(sheet = sheet_name, "sheet not found, treating period as empty");
        return balances;
    };
    let Some(layout) = HeaderLayout::resolve(sheet, columns) else {
        return balances;
    };
    if layout.account.is_none() {
        debug!(sheet = sheet_name, "no account column in header row");
    }

    let Some((_, _, last_row, _)) = sheet.bounds() else {
        return balances;
    };

    for row in (layout.header_row + 1)..=last_row {
        let parsed = BalanceRow::from_sheet(sheet, &layout, row);
        let Some(account) = parsed.account else {
            continue;
        };

        match balances.entry(account) {
            Entry::Occupied(mut entry) => {
                let record = entry.get_mut();
                record.balance += parsed.balance;
                if record.label.is_empty() && !parsed.label.is_empty() {
                    record.label = parsed.label;
                }
            }
            Entry::Vacant(entry) => {
                let account = entry.key().clone();
                entry.insert(AccountRecord {
                    account,
                    label: parsed.label,
                    balance: parsed.balance,
                });
            }
        }
    }

    debug!(sheet = sheet_name, accounts = balances.len(), "balances read");
    balances
}

/// Coerce a balance cell to a number.
///
/// Numbers pass through. Text has all whitespace removed (thousands
/// separators rendered as spaces) and its first comma turned into a decimal
/// point. Anything that still does not parse counts as zero.
pub fn parse_balance(value: Option<&CellValue>) -> f64 {
    match value {
        Some(CellValue::Number(n)) if n.is_finite() => *n,
        Some(CellValue::Number(_)) | None | Some(CellValue::Empty) => 0.0,
        Some(other) => parse_balance_text(&other.to_text()),
    }
}

fn parse_balance_text(raw: &str) -> f64 {
    let compact: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    if compact.is_empty() {
        return 0.0;
    }

    match compact.replacen(',', ".", 1).parse::<f64>() {
        Ok(n) if n.is_finite() => n,
        _ => {
            debug!(value = raw, "unparseable balance coerced to 0");
            0.0
        }
    }
}
