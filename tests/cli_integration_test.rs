//! CLI integration tests.
//!
//! Tests cover:
//! - Argument parsing for every subcommand
//! - Solver and dataset port construction from config
//! - `solve --dry-run`, `validate`, `convert` and `inspect` exit codes
//! - A full `solve` run against a dataset file on disk
//! - End-to-end against the public OR-Library file (#[ignore])

mod common;

use clap::Parser;
use common::*;
use qubo_portfolio::cli::{self, Cli, Command};
use qubo_portfolio::domain::config_validation::{DatasetSource, SolverKind, SolverSettings};
use std::io::Write;
use std::process::ExitCode;

fn write_temp(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

// ExitCode has no PartialEq; compare the Debug rendering instead.
fn code(exit: ExitCode) -> String {
    format!("{exit:?}")
}

fn run_args(args: &[&str]) -> String {
    code(cli::run(Cli::try_parse_from(args).unwrap()))
}

fn config_for(dataset: &std::path::Path, solver: &str) -> String {
    format!(
        r#"
[dataset]
path = {}

[model]
penalty_weight = 10
target_count = 1
return_weight = 0
sense = maximize

[solver]
kind = {}
agents = 4
steps = 200
time_step = 0.1
seed = 11
"#,
        dataset.display(),
        solver
    )
}

mod parsing {
    use super::*;

    #[test]
    fn solve_arguments() {
        let cli = Cli::try_parse_from([
            "qubo-portfolio",
            "solve",
            "-c",
            "cfg.ini",
            "--matrix-out",
            "q.csv",
            "--dry-run",
        ])
        .unwrap();
        assert_eq!(cli.log_level, "warn");
        match cli.command {
            Command::Solve {
                config,
                dataset,
                matrix_out,
                dry_run,
            } => {
                assert_eq!(config.to_str(), Some("cfg.ini"));
                assert!(dataset.is_none());
                assert_eq!(matrix_out.unwrap().to_str(), Some("q.csv"));
                assert!(dry_run);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn convert_generators_split_on_commas() {
        let cli = Cli::try_parse_from([
            "qubo-portfolio",
            "--log-level",
            "debug",
            "convert",
            "-e",
            "x1*x2",
            "--generators",
            "x2,x1",
        ])
        .unwrap();
        assert_eq!(cli.log_level, "debug");
        match cli.command {
            Command::Convert { expr, generators } => {
                assert_eq!(expr, "x1*x2");
                assert_eq!(generators, Some(vec!["x2".to_string(), "x1".to_string()]));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn inspect_rejects_both_sources() {
        let result = Cli::try_parse_from([
            "qubo-portfolio",
            "inspect",
            "--dataset",
            "a.txt",
            "--url",
            "http://example.com/a.txt",
        ]);
        assert!(result.is_err());
    }
}

mod construction {
    use super::*;

    #[test]
    fn build_solver_by_kind() {
        let mut settings = SolverSettings {
            kind: SolverKind::Bifurcation,
            agents: 2,
            steps: 10,
            time_step: 0.1,
            seed: Some(1),
        };
        assert_eq!(cli::build_solver(&settings).name(), "bifurcation");
        settings.kind = SolverKind::Exhaustive;
        assert_eq!(cli::build_solver(&settings).name(), "exhaustive");
    }

    #[test]
    fn file_port_reads_dataset() {
        let file = write_temp(THREE_ASSETS);
        let source = DatasetSource::Path(file.path().display().to_string());
        let port = cli::dataset_port(&source).unwrap();
        assert_eq!(port.load().unwrap().asset_count(), 3);
    }

    #[cfg(feature = "http")]
    #[test]
    fn url_source_uses_http_port() {
        let source = DatasetSource::Url("http://example.com/port1.txt".to_string());
        let port = cli::dataset_port(&source).unwrap();
        assert_eq!(port.source_name(), "http://example.com/port1.txt");
    }
}

mod commands {
    use super::*;

    #[test]
    fn dry_run_valid_config_succeeds() {
        let ini = write_temp(&config_for(std::path::Path::new("unused.txt"), "bifurcation"));
        let path = ini.path().to_str().unwrap();
        assert_eq!(
            run_args(&["qubo-portfolio", "solve", "-c", path, "--dry-run"]),
            code(ExitCode::SUCCESS)
        );
    }

    #[test]
    fn missing_config_file_is_io_error() {
        assert_eq!(
            run_args(&["qubo-portfolio", "validate", "-c", "/nonexistent/config.ini"]),
            code(ExitCode::from(1))
        );
    }

    #[test]
    fn invalid_config_exits_with_config_code() {
        let ini = write_temp("[dataset]\npath = a.txt\n[model]\npenalty_weight = -1\n");
        let path = ini.path().to_str().unwrap();
        assert_eq!(
            run_args(&["qubo-portfolio", "validate", "-c", path]),
            code(ExitCode::from(2))
        );
        assert_eq!(
            run_args(&["qubo-portfolio", "solve", "-c", path, "--dry-run"]),
            code(ExitCode::from(2))
        );
    }

    #[test]
    fn solve_with_exhaustive_solver_succeeds() {
        let data = write_temp(THREE_ASSETS);
        let ini = write_temp(&config_for(data.path(), "exhaustive"));
        let dir = tempfile::tempdir().unwrap();
        let matrix = dir.path().join("matrix.csv");
        assert_eq!(
            run_args(&[
                "qubo-portfolio",
                "solve",
                "-c",
                ini.path().to_str().unwrap(),
                "--matrix-out",
                matrix.to_str().unwrap(),
            ]),
            code(ExitCode::SUCCESS)
        );
        assert!(matrix.exists());
    }

    #[test]
    fn dataset_flag_overrides_config() {
        let data = write_temp(FIVE_ASSETS);
        let ini = write_temp(&config_for(std::path::Path::new("/nonexistent/data.txt"), "bifurcation"));
        assert_eq!(
            run_args(&[
                "qubo-portfolio",
                "solve",
                "-c",
                ini.path().to_str().unwrap(),
                "--dataset",
                data.path().to_str().unwrap(),
            ]),
            code(ExitCode::SUCCESS)
        );
    }

    #[test]
    fn malformed_dataset_exits_with_dataset_code() {
        let data = write_temp("3\n0.1 0.2\n");
        let ini = write_temp(&config_for(data.path(), "exhaustive"));
        assert_eq!(
            run_args(&["qubo-portfolio", "solve", "-c", ini.path().to_str().unwrap()]),
            code(ExitCode::from(3))
        );
    }

    #[test]
    fn convert_valid_expression() {
        assert_eq!(
            run_args(&["qubo-portfolio", "convert", "-e", "x1 + 2*x1*x2 - 5"]),
            code(ExitCode::SUCCESS)
        );
    }

    #[test]
    fn convert_parse_error_exits_with_expression_code() {
        assert_eq!(
            run_args(&["qubo-portfolio", "convert", "-e", "x1 + * x2"]),
            code(ExitCode::from(4))
        );
    }

    #[test]
    fn inspect_file() {
        let data = write_temp(THREE_ASSETS);
        assert_eq!(
            run_args(&[
                "qubo-portfolio",
                "inspect",
                "--dataset",
                data.path().to_str().unwrap(),
            ]),
            code(ExitCode::SUCCESS)
        );
    }

    #[test]
    fn inspect_without_source_fails() {
        assert_eq!(
            run_args(&["qubo-portfolio", "inspect"]),
            code(ExitCode::from(2))
        );
    }
}

mod end_to_end {
    use super::*;

    #[test]
    #[ignore] // requires network access
    fn solve_or_library_port1() {
        let ini = write_temp(
            r#"
[dataset]
url = http://people.brunel.ac.uk/~mastjjb/jeb/orlib/files/port1.txt

[solver]
kind = bifurcation
agents = 16
steps = 2000
seed = 42
"#,
        );
        assert_eq!(
            run_args(&["qubo-portfolio", "solve", "-c", ini.path().to_str().unwrap()]),
            code(ExitCode::SUCCESS)
        );
    }
}
