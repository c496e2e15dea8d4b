use std::process::ExitCode;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use windmill::Startup;

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn main() -> ExitCode {
    let (config, verbose) = match Startup::from_args(std::env::args_os()) {
        Startup::Run { config, verbose } => (config, verbose),
        Startup::Exit { code: 0, message } => {
            print!("{message}");
            return ExitCode::SUCCESS;
        }
        Startup::Exit { code, message } => {
            eprintln!("{message}");
            return ExitCode::from(code);
        }
    };

    init_tracing(verbose);

    match windmill::run(config).context("windmill renderer failed") {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}
