//! Shared fixtures: balance workbooks built in memory

#![allow(dead_code)]

use rust_xlsxwriter::Workbook;

/// One balance sheet: header row then (account, label, balance) rows
pub struct BalanceSheet<'a> {
    pub name: &'a str,
    pub headers: [&'a str; 3],
    pub rows: Vec<(&'a str, &'a str, Balance<'a>)>,
}

/// Balance cell as typed by a user: a number or free text
pub enum Balance<'a> {
    Number(f64),
    Text(&'a str),
}

pub fn build_workbook(sheets: &[BalanceSheet]) -> Vec<u8> {
    let mut book = Workbook::new();
    for fixture in sheets {
        let sheet = book.add_worksheet();
        sheet.set_name(fixture.name).unwrap();
        for (col, header) in fixture.headers.iter().enumerate() {
            sheet.write_string(0, col as u16, *header).unwrap();
        }
        for (idx, (account, label, balance)) in fixture.rows.iter().enumerate() {
            let row = idx as u32 + 1;
            if !account.is_empty() {
                sheet.write_string(row, 0, *account).unwrap();
            }
            if !label.is_empty() {
                sheet.write_string(row, 1, *label).unwrap();
            }
            match balance {
                Balance::Number(n) => sheet.write_number(row, 2, *n).unwrap(),
                Balance::Text(t) => sheet.write_string(row, 2, *t).unwrap(),
            };
        }
    }
    book.save_to_buffer().unwrap()
}

/// "2024": A1 Cash 1000, A2 Debt -500 / "2023": A1 Cash 800
pub fn reference_workbook() -> Vec<u8> {
    build_workbook(&[
        BalanceSheet {
            name: "2024",
            headers: ["Compte", "Libellé", " Solde "],
            rows: vec![
                ("A1", "Cash", Balance::Number(1000.0)),
                ("A2", "Debt", Balance::Number(-500.0)),
            ],
        },
        BalanceSheet {
            name: "2023",
            headers: ["Compte", "Libellé", "Solde"],
            rows: vec![("A1", "Cash", Balance::Number(800.0))],
        },
    ])
}
