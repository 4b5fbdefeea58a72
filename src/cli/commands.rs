use crate::error::RevueResult;
use crate::excel::ExcelImporter;
use crate::reader::BalanceColumns;
use crate::report::ensure_supported_file_name;
use crate::session::Session;
use crate::types::ComparisonRow;
use colored::Colorize;
use std::fs;
use std::path::{Path, PathBuf};

/// Format a number for display, removing unnecessary decimal places
fn format_number(n: f64) -> String {
    // Balances are cents at most; 6 places hides float noise from subtraction
    let rounded = (n * 1e6).round() / 1e6;
    if rounded.fract() == 0.0 {
        // +0.0 avoids printing "-0"
        return format!("{:.0}", rounded + 0.0);
    }
    format!("{:.6}", rounded)
        .trim_end_matches('0')
        .trim_end_matches('.')
        .to_string()
}

fn format_percent(pct: Option<f64>) -> String {
    match pct {
        Some(p) => format!("{:.1}%", p * 100.0),
        None => "-".to_string(),
    }
}

fn file_name_of(path: &Path) -> RevueResult<String> {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default()
        .to_string();

    ensure_supported_file_name(&name)?;
    Ok(name)
}

/// Execute the sheets command - list tabs in order
pub fn sheets(input: PathBuf) -> RevueResult<Vec<String>> {
    file_name_of(&input)?;
    let workbook = ExcelImporter::from_path(&input)?.import()?;
    let names = workbook.sheet_names();

    println!("{}", "📒 Revue - Sheets".bold().green());
    println!("   File: {}\n", input.display());
    for (idx, name) in names.iter().enumerate() {
        println!("   {:>3}. {}", idx + 1, name.bright_blue());
    }

    Ok(names)
}

/// Execute the generate command - build the "Revue analytique" workbook
pub fn generate(
    input: PathBuf,
    current: String,
    prior: String,
    output: Option<PathBuf>,
    columns: BalanceColumns,
    verbose: bool,
) -> RevueResult<PathBuf> {
    println!("{}", "📒 Revue - Analytical Review".bold().green());
    println!("   Input:     {}", input.display());
    println!("   Period N:   {}", current);
    println!("   Period N-1: {}\n", prior);

    let file_name = file_name_of(&input)?;

    if verbose {
        println!("{}", "📖 Reading Excel file...".cyan());
    }
    let bytes = fs::read(&input)?;

    let mut session = Session::with_columns(columns);
    session.load(file_name, &bytes)?;
    session.select_current(current);
    session.select_prior(prior);

    if verbose {
        println!("   Found {} sheets", session.sheet_names.len());
        println!("{}", "🧮 Reconciling balances...".cyan());
    }

    let report = session.generate()?;
    let output_path = resolve_output_path(&input, output, &report.file_name);
    fs::write(&output_path, &report.bytes)?;

    if verbose {
        print_comparison_table(&report.rows);
    }

    println!("{}", format!("✅ {}", session.info_message).bold().green());
    println!("   Excel file: {}", output_path.display());
    println!("   Accounts:   {}\n", report.rows.len());

    Ok(output_path)
}

/// Explicit file paths win; directories receive the derived file name
fn resolve_output_path(input: &Path, output: Option<PathBuf>, file_name: &str) -> PathBuf {
    match output {
        Some(path) if path.is_dir() => path.join(file_name),
        Some(path) => path,
        None => input
            .parent()
            .map(|dir| dir.join(file_name))
            .unwrap_or_else(|| PathBuf::from(file_name)),
    }
}

/// Print comparison rows as a table
fn print_comparison_table(rows: &[ComparisonRow]) {
    println!("\n{}", "📊 Period N vs N-1:".bold().cyan());
    println!("{}", "─".repeat(92));

    println!(
        "{:<12} {:<28} {:>14} {:>14} {:>14} {:>8}",
        "Account".bold(),
        "Label".bold(),
        "N".bold(),
        "N-1".bold(),
        "Variance".bold(),
        "Var %".bold()
    );
    println!("{}", "─".repeat(92));

    for row in rows {
        let var_str = format_number(row.variance_absolute);
        let var_colored = if row.variance_absolute >= 0.0 {
            var_str.green()
        } else {
            var_str.red()
        };

        println!(
            "{:<12} {:<28} {:>14} {:>14} {:>14} {:>8}",
            row.account.bright_blue(),
            row.label,
            format_number(row.balance_current),
            format_number(row.balance_prior),
            var_colored,
            format_percent(row.variance_percent)
        );
    }

    println!("{}", "─".repeat(92));
}
