//! SCL command line
//!
//! Parses, checks, formats and runs SCL and YAML workflows.

use scl_core::cli;

#[tokio::main]
async fn main() {
    if let Err(e) = cli::run_cli().await {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
