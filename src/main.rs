use clap::{Parser, Subcommand};
use colored::Colorize;
use revue_analytique::cli;
use revue_analytique::reader::BalanceColumns;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "revue")]
#[command(about = "Analytical review: reconcile two periods of account balances into an Excel report.")]
#[command(long_about = "Revue - Analytical review of account balances

Reads an Excel workbook (.xlsx/.xlsm) holding balances for two periods,
matches accounts across both sheets and adds a 'Revue analytique' sheet
with N, N-1, absolute variance and percentage variance.

COMMANDS:
  sheets     - List the sheets of a workbook
  generate   - Build the 'Revue analytique' workbook

EXAMPLES:
  revue sheets Balances_2024.xlsx
  revue generate Balances_2024.xlsx --current 2024 --prior 2023
  revue generate Balances.xlsm -c \"Balance N\" -p \"Balance N-1\" -o out/")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the sheets of a workbook in tab order
    Sheets {
        /// Path to Excel file (.xlsx or .xlsm)
        input: PathBuf,
    },

    #[command(long_about = "Build the 'Revue analytique' workbook.

Each chosen sheet needs a header row with an account column (Account or
Compte), an optional label column (Label or Libellé) and a balance column
(Balance or Solde, surrounding spaces ignored).

Rows without an account are skipped. Repeated accounts are summed.
Balances that cannot be read as numbers count as 0.

OUTPUT:
  Defaults to <input name>_revue_analytique.xlsx next to the input.
  If --output is a directory, the file is written inside it.")]
    /// Build the 'Revue analytique' workbook
    Generate {
        /// Path to Excel file (.xlsx or .xlsm)
        input: PathBuf,

        /// Sheet holding the current period (N)
        #[arg(short, long)]
        current: String,

        /// Sheet holding the prior period (N-1)
        #[arg(short, long)]
        prior: String,

        /// Output file or directory
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Header of the account column (replaces the defaults)
        #[arg(long)]
        account_header: Option<String>,

        /// Header of the label column (replaces the defaults)
        #[arg(long)]
        label_header: Option<String>,

        /// Header of the balance column (replaces the defaults)
        #[arg(long)]
        balance_header: Option<String>,

        /// Print the comparison table
        #[arg(short, long)]
        verbose: bool,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "revue_analytique=warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Sheets { input } => cli::sheets(input).map(|_| ()),

        Commands::Generate {
            input,
            current,
            prior,
            output,
            account_header,
            label_header,
            balance_header,
            verbose,
        } => {
            let mut columns = BalanceColumns::default();
            if let Some(header) = account_header {
                columns = columns.with_account(header);
            }
            if let Some(header) = label_header {
                columns = columns.with_label(header);
            }
            if let Some(header) = balance_header {
                columns = columns.with_balance(header);
            }
            cli::generate(input, current, prior, output, columns, verbose).map(|_| ())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "command failed");
            eprintln!("{}", format!("❌ {}", e.user_message()).bold().red());
            ExitCode::FAILURE
        }
    }
}
