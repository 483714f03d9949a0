use clap::Parser;
use facility_merger::cli::{args::Args, commands};
use std::process;

fn main() {
    let args = Args::parse();

    let runtime = tokio::runtime::Runtime::new().unwrap_or_else(|e| {
        eprintln!("Failed to create async runtime: {}", e);
        process::exit(1);
    });

    let result: anyhow::Result<_> = runtime.block_on(async {
        // Interactive prompts block on stdin, so Ctrl+C must win the race
        let shutdown_signal = async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                eprintln!("Failed to install CTRL+C signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        };

        tokio::select! {
            result = commands::run_with_context(args) => result,
            _ = shutdown_signal => {
                eprintln!("\nReceived CTRL+C, shutting down");
                Err(facility_merger::Error::processing_interrupted(
                    "Processing interrupted by user"
                )
                .into())
            }
        }
    });

    match result {
        Ok(_summary) => process::exit(0),
        Err(error) => {
            eprintln!("Error: {:#}", error);
            process::exit(1);
        }
    }
}
