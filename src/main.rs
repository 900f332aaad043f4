use clap::Parser;
use oasguard::cli::{run_cli, Cli};
use oasguard::logging::{init_logging_with_config, LogConfig};
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut log_config = LogConfig::from_env();
    if cli.verbose {
        log_config.log_level = "debug".to_string();
    }
    if let Err(e) = init_logging_with_config(&log_config) {
        eprintln!("warning: {e:#}");
    }

    let code = run_cli(&cli, &mut std::io::stdout(), &mut std::io::stderr());
    ExitCode::from(code)
}
