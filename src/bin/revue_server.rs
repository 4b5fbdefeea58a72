//! Revue API Server binary
//!
//! HTTP front end for the analytical review: upload a workbook, pick the two
//! period sheets, download the report.

use clap::Parser;
use revue_analytique::api::{run_api_server, server::ApiConfig};

#[derive(Parser, Debug)]
#[command(name = "revue-server")]
#[command(version)]
#[command(author = "RoyalBit Inc. <admin@royalbit.ca>")]
#[command(about = "Revue API Server - HTTP front end for the analytical review report")]
#[command(long_about = r#"
Revue API Server - HTTP front end for the analytical review report

Endpoints:
  - POST /api/v1/sheets   - Body: workbook bytes. Returns the sheet names.
  - POST /api/v1/report   - Body: workbook bytes.
                            Query: current=<sheet>&prior=<sheet>&file_name=<name>
                            Returns the .xlsx report as an attachment.

Additional endpoints:
  - GET  /health           - Health check
  - GET  /version          - Server version info
  - GET  /                 - API documentation

Example usage:
  revue-server                           # Start on localhost:8080
  revue-server --host 0.0.0.0 --port 3000

  curl -X POST --data-binary @Balances_2024.xlsx \
    "http://localhost:8080/api/v1/report?current=2024&prior=2023&file_name=Balances_2024.xlsx" \
    -o Balances_2024_revue_analytique.xlsx
"#)]
struct Args {
    /// Host address to bind to (use 0.0.0.0 for all interfaces)
    #[arg(short = 'H', long, default_value = "127.0.0.1", env = "REVUE_HOST")]
    host: String,

    /// Port to listen on
    #[arg(short, long, default_value = "8080", env = "REVUE_PORT")]
    port: u16,

    /// Largest accepted upload, in megabytes
    #[arg(long, default_value = "20", env = "REVUE_MAX_UPLOAD_MB")]
    max_upload_mb: usize,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = ApiConfig {
        host: args.host,
        port: args.port,
        max_upload_bytes: args.max_upload_mb * 1024 * 1024,
    };

    run_api_server(config).await
}
