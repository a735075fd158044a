mod aggregate;
mod extract;
mod io;

use std::path::Path;

use reopens_common::{ReopenError, ReopenResult};
use reopens_config::{init_tracing, ReportConfig};

fn main() {
    init_tracing("info");
    let _ = dotenvy::dotenv();

    tracing::info!(service = "reopens-report", "starting");

    if let Err(e) = run() {
        tracing::error!(error = %e, "report failed");
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn run() -> ReopenResult<()> {
    let config = ReportConfig::from_env()?;

    std::fs::create_dir_all(&config.reports_dir)
        .map_err(|e| ReopenError::Io(format!("cannot create {}: {e}", config.reports_dir)))?;

    let out_user = Path::new(&config.reports_dir).join("reopens_by_user.csv");
    let out_ticket = Path::new(&config.reports_dir).join("reopens_by_ticket.csv");
    let out_user = out_user.to_string_lossy();
    let out_ticket = out_ticket.to_string_lossy();

    let (users, tickets) = io::process(
        &config.export_path,
        &out_user,
        &out_ticket,
        &config.month,
    )?;

    tracing::info!(
        month = %config.month,
        by_user = %out_user,
        by_ticket = %out_ticket,
        user_rows = users,
        ticket_rows = tickets,
        "wrote reports"
    );
    Ok(())
}
