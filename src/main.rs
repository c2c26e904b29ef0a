//! sqldesk - SQL console core CLI.

use std::sync::Arc;

use sqldesk::cli::Cli;
use sqldesk::config::Config;
use sqldesk::coordinator::{
    ExecutionMode, ExecutionRequest, QueryCoordinator, ResultRecord, SubmitOutcome,
};
use sqldesk::error::Result;
use sqldesk::logging;
use sqldesk::remote::{HttpExecutor, HttpExecutorConfig};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    logging::init_stderr_logging();

    match run().await {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            error!("{}: {}", e.category(), e);
            std::process::exit(1);
        }
    }
}

/// Runs one submission. Returns false when any statement errored.
async fn run() -> Result<bool> {
    let cli = Cli::parse_args();

    let config_path = cli.config_path();
    let config = Config::load_from_file(&config_path)?;
    let endpoint = cli.resolve_endpoint(&config)?;
    info!("Endpoint: {}", endpoint.url);

    let sql = cli.read_sql()?;

    let executor = HttpExecutor::new(
        HttpExecutorConfig::new(&endpoint.url).with_timeout(endpoint.timeout_secs),
    )?;
    let coordinator = QueryCoordinator::new(Arc::new(executor));

    let request = match cli.execution_mode() {
        ExecutionMode::Multi => ExecutionRequest::multi(sql, cli.continue_on_error),
        ExecutionMode::Raw => ExecutionRequest::raw(sql),
    };

    let outcome = coordinator.submit(request).await?;
    let records = match outcome {
        SubmitOutcome::Completed(records) => records,
        SubmitOutcome::Cancelled => {
            println!("cancelled");
            return Ok(true);
        }
    };

    let mut clean = true;
    for (index, record) in records.iter().enumerate() {
        match record {
            ResultRecord::Success { rows, elapsed } => {
                println!(
                    "[{}] ok: {} row(s) in {}ms",
                    index + 1,
                    rows.row_count,
                    elapsed.as_millis()
                );
            }
            ResultRecord::Error { message, elapsed } => {
                clean = false;
                println!(
                    "[{}] error: {} ({}ms)",
                    index + 1,
                    message,
                    elapsed.as_millis()
                );
            }
            ResultRecord::Skipped => {
                println!("[{}] skipped", index + 1);
            }
        }
    }

    let totals = coordinator.counters();
    println!("{} executed, {} errored", totals.executed, totals.errored);

    Ok(clean)
}
