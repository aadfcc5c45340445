use clap::Parser;
use qubo_portfolio::cli::{Cli, run};
use tracing_subscriber::filter::LevelFilter;

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();

    let level = match cli.log_level.parse::<LevelFilter>() {
        Ok(level) => level,
        Err(_) => {
            eprintln!(
                "error: invalid log level '{}' (expected error, warn, info, debug or trace)",
                cli.log_level
            );
            return std::process::ExitCode::from(2);
        }
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    run(cli)
}
