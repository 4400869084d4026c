// src/main.rs

use std::process::ExitCode;

use mineru_host::{cli, logging, run};

#[tokio::main]
async fn main() -> ExitCode {
    let args = cli::parse();
    if let Err(err) = logging::init_logging(args.log_level) {
        eprintln!("mineru-host error: {err:?}");
        return ExitCode::FAILURE;
    }

    match run(args).await {
        Ok(Some(_)) => {
            println!("Application stopped.");
            ExitCode::SUCCESS
        }
        Ok(None) => ExitCode::SUCCESS,
        Err(err) if err.is_session_failure() => {
            eprintln!("Application failed with error: {err}");
            ExitCode::from(err.exit_code())
        }
        Err(err) => {
            eprintln!("mineru-host error: {err}");
            ExitCode::from(err.exit_code())
        }
    }
}
