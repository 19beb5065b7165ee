//! Chip2Chip job wrapper
//!
//! Entry point for the application.

use std::process::ExitCode;

use clap::Parser;
use tokio::sync::watch;
use tracing::error;

use chip2chip::cli::Args;
use chip2chip::core::{ExternalTool, forward_shutdown_signals, run_job};

#[tokio::main]
async fn main() -> ExitCode {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) if e.use_stderr() => {
            let _ = e.print();
            return ExitCode::from(1);
        }
        // --help and --version
        Err(e) => e.exit(),
    };

    chip2chip::logging::init();

    let code = match run(args).await {
        Ok(code) => code,
        Err(e) => {
            error!("{e:#}");
            1
        }
    };
    ExitCode::from(u8::try_from(code).unwrap_or(1))
}

async fn run(args: Args) -> anyhow::Result<i32> {
    let config = args.into_job_config()?;
    let tool = ExternalTool::new(config.tool.clone());

    // Ctrl-C or SIGTERM stops the tool; results are still collected on the way out.
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    forward_shutdown_signals(shutdown_tx)?;

    let outcome = run_job(&config, &tool, shutdown_rx).await?;
    Ok(outcome.exit_code())
}

