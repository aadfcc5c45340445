//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::adapters::bifurcation_solver::BifurcationSolver;
use crate::adapters::exhaustive_solver::ExhaustiveSolver;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::file_dataset_adapter::FileDatasetAdapter;
use crate::adapters::matrix_csv_adapter::write_matrix_file;
use crate::domain::config_validation::{
    DatasetSource, SolverKind, SolverSettings, dataset_source, matrix_output, model_params,
    solver_settings, validate_config,
};
use crate::domain::dataset::AssetDataset;
use crate::domain::error::QuboError;
use crate::domain::generators::Generators;
use crate::domain::poly_parser;
use crate::domain::portfolio::{
    ModelParams, PortfolioQubo, PortfolioSelection, build_portfolio_qubo, interpret,
};
use crate::domain::problem::Solution;
use crate::domain::qubo::to_qubo;
use crate::ports::dataset_port::DatasetPort;
use crate::ports::solver_port::QuboSolver;

#[derive(Parser, Debug)]
#[command(
    name = "qubo-portfolio",
    about = "Portfolio selection as a quadratic unconstrained binary optimization"
)]
pub struct Cli {
    /// Log level: error, warn, info, debug or trace
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Build the portfolio QUBO and solve it
    Solve {
        #[arg(short, long)]
        config: PathBuf,
        /// Local dataset file, overriding the configured source
        #[arg(long)]
        dataset: Option<PathBuf>,
        /// Write the combined matrix as CSV
        #[arg(long)]
        matrix_out: Option<PathBuf>,
        #[arg(long)]
        dry_run: bool,
    },
    /// Convert a polynomial expression to a QUBO matrix
    Convert {
        #[arg(short, long)]
        expr: String,
        /// Comma-separated decision variables; inferred from the expression when omitted
        #[arg(short, long, value_delimiter = ',')]
        generators: Option<Vec<String>>,
    },
    /// Summarize a dataset
    Inspect {
        #[arg(long, conflicts_with = "url")]
        dataset: Option<PathBuf>,
        #[arg(long)]
        url: Option<String>,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Solve {
            config,
            dataset,
            matrix_out,
            dry_run,
        } => run_solve(&config, dataset.as_deref(), matrix_out.as_deref(), dry_run),
        Command::Convert { expr, generators } => run_convert(&expr, generators),
        Command::Inspect { dataset, url } => run_inspect(dataset.as_deref(), url.as_deref()),
        Command::Validate { config } => run_validate(&config),
    }
}

fn fail(err: &QuboError) -> ExitCode {
    eprintln!("error: {err}");
    err.into()
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|e| fail(&e))
}

pub fn build_solver(settings: &SolverSettings) -> Box<dyn QuboSolver> {
    match settings.kind {
        SolverKind::Bifurcation => Box::new(BifurcationSolver {
            agents: settings.agents,
            steps: settings.steps,
            time_step: settings.time_step,
            seed: settings.seed,
        }),
        SolverKind::Exhaustive => Box::new(ExhaustiveSolver),
    }
}

pub fn dataset_port(source: &DatasetSource) -> Result<Box<dyn DatasetPort>, QuboError> {
    match source {
        DatasetSource::Path(path) => Ok(Box::new(FileDatasetAdapter::new(PathBuf::from(path)))),
        #[cfg(feature = "http")]
        DatasetSource::Url(url) => Ok(Box::new(
            crate::adapters::http_dataset_adapter::HttpDatasetAdapter::new(url.clone()),
        )),
        #[cfg(not(feature = "http"))]
        DatasetSource::Url(_) => Err(QuboError::ConfigInvalid {
            section: "dataset".into(),
            key: "url".into(),
            reason: "built without the http feature; use path instead".into(),
        }),
    }
}

pub struct SolveOutcome {
    pub dataset: AssetDataset,
    pub qubo: PortfolioQubo,
    pub solution: Solution,
    pub selection: PortfolioSelection,
}

/// Load, build, optionally export and solve.
pub fn run_solve_pipeline(
    port: &dyn DatasetPort,
    params: &ModelParams,
    solver: &dyn QuboSolver,
    matrix_out: Option<&Path>,
) -> Result<SolveOutcome, QuboError> {
    let dataset = port.load()?;
    eprintln!(
        "Loaded {} assets from {}",
        dataset.asset_count(),
        port.source_name()
    );

    let qubo = build_portfolio_qubo(&dataset, params)?;
    for warning in &qubo.warnings {
        eprintln!("warning: {warning}");
    }

    if let Some(path) = matrix_out {
        write_matrix_file(path, &qubo.problem.matrix, qubo.generators.names())?;
        eprintln!("Matrix written to: {}", path.display());
    }

    eprintln!(
        "Solving {} variables with the {} solver ({})",
        qubo.problem.size(),
        solver.name(),
        params.sense
    );
    let solution = solver.solve(&qubo.problem)?;
    let selection = interpret(&solution, &dataset, &qubo.covariance, params);

    Ok(SolveOutcome {
        dataset,
        qubo,
        solution,
        selection,
    })
}

fn run_solve(
    config_path: &Path,
    dataset_override: Option<&Path>,
    matrix_override: Option<&Path>,
    dry_run: bool,
) -> ExitCode {
    // Stage 1: Load and validate config
    eprintln!("Loading config from {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };
    if let Err(e) = validate_config(&adapter) {
        return fail(&e);
    }

    // Stage 2: Typed settings
    let params = match model_params(&adapter) {
        Ok(p) => p,
        Err(e) => return fail(&e),
    };
    let settings = match solver_settings(&adapter) {
        Ok(s) => s,
        Err(e) => return fail(&e),
    };
    let source = match dataset_override {
        Some(path) => DatasetSource::Path(path.display().to_string()),
        None => match dataset_source(&adapter) {
            Ok(s) => s,
            Err(e) => return fail(&e),
        },
    };
    let matrix_out = matrix_override
        .map(Path::to_path_buf)
        .or_else(|| matrix_output(&adapter).map(PathBuf::from));

    if dry_run {
        print_settings(&source, &params, &settings, matrix_out.as_deref());
        eprintln!("\nDry run complete: configuration is valid");
        return ExitCode::SUCCESS;
    }

    // Stage 3: Pipeline
    let port = match dataset_port(&source) {
        Ok(p) => p,
        Err(e) => return fail(&e),
    };
    let solver = build_solver(&settings);
    let outcome = match run_solve_pipeline(port.as_ref(), &params, solver.as_ref(), matrix_out.as_deref())
    {
        Ok(o) => o,
        Err(e) => return fail(&e),
    };

    // Stage 4: Report
    print_selection(&outcome);
    ExitCode::SUCCESS
}

fn print_settings(
    source: &DatasetSource,
    params: &ModelParams,
    settings: &SolverSettings,
    matrix_out: Option<&Path>,
) {
    eprintln!("\nDataset:");
    match source {
        DatasetSource::Path(p) => eprintln!("  path: {}", p),
        DatasetSource::Url(u) => eprintln!("  url:  {}", u),
    }
    eprintln!("\nModel:");
    eprintln!("  penalty_weight: {}", params.penalty_weight);
    eprintln!("  target_count:   {}", params.target_count);
    eprintln!("  return_weight:  {}", params.return_weight);
    eprintln!("  sense:          {}", params.sense);
    eprintln!("\nSolver:");
    eprintln!("  kind: {}", settings.kind);
    if settings.kind == SolverKind::Bifurcation {
        eprintln!("  agents:    {}", settings.agents);
        eprintln!("  steps:     {}", settings.steps);
        eprintln!("  time_step: {}", settings.time_step);
        match settings.seed {
            Some(seed) => eprintln!("  seed:      {}", seed),
            None => eprintln!("  seed:      (random)"),
        }
    }
    if let Some(path) = matrix_out {
        eprintln!("\nMatrix output: {}", path.display());
    }
}

fn print_selection(outcome: &SolveOutcome) {
    let selection = &outcome.selection;
    let names = outcome.qubo.generators.names();

    println!("=== Selection ===");
    if selection.assets.is_empty() {
        println!("No assets selected");
    }
    for &i in &selection.assets {
        println!(
            "  {}  mean {:.6}  sd {:.6}",
            names[i], outcome.dataset.mean_returns[i], outcome.dataset.std_devs[i]
        );
    }
    println!("Objective:        {:.6}", outcome.solution.value);
    println!("Expected return:  {:.6}", selection.expected_return);
    println!("Variance:         {:.6}", selection.variance);
    println!(
        "Cardinality:      {} ({})",
        selection.assets.len(),
        if selection.satisfies_target {
            "target met"
        } else {
            "target missed"
        }
    );
}

fn run_convert(expr: &str, generators: Option<Vec<String>>) -> ExitCode {
    let poly = match poly_parser::parse(expr) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("error: {}", e.display_with_context(expr));
            return (&QuboError::from(e)).into();
        }
    };
    eprintln!("Parsed: {}", poly);

    let declared = generators.map(Generators::declared);
    let conversion = to_qubo(&poly, declared.as_ref());
    for warning in &conversion.warnings {
        eprintln!("warning: {warning}");
    }

    let model = &conversion.model;
    println!("{}", model.generators.names().join(","));
    for row in model.matrix.rows() {
        let cells: Vec<String> = row.iter().map(|v| v.to_string()).collect();
        println!("{}", cells.join(","));
    }
    println!("constant: {}", model.constant);
    ExitCode::SUCCESS
}

fn run_inspect(dataset: Option<&Path>, url: Option<&str>) -> ExitCode {
    let source = match (dataset, url) {
        (Some(path), _) => DatasetSource::Path(path.display().to_string()),
        (None, Some(url)) => DatasetSource::Url(url.to_string()),
        (None, None) => {
            eprintln!("error: one of --dataset or --url is required");
            return ExitCode::from(2);
        }
    };
    let port = match dataset_port(&source) {
        Ok(p) => p,
        Err(e) => return fail(&e),
    };
    let data = match port.load() {
        Ok(d) => d,
        Err(e) => return fail(&e),
    };

    println!("Source: {}", port.source_name());
    println!("Assets: {}", data.asset_count());
    println!("{:>5}  {:>12}  {:>12}", "asset", "mean", "sd");
    for (i, (mean, sd)) in data.mean_returns.iter().zip(&data.std_devs).enumerate() {
        println!("{:>5}  {:>12.6}  {:>12.6}", i + 1, mean, sd);
    }
    println!("Undefined correlations: {}", data.undefined_correlations());
    ExitCode::SUCCESS
}

fn run_validate(config_path: &Path) -> ExitCode {
    eprintln!("Validating config: {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };
    if let Err(e) = validate_config(&adapter) {
        return fail(&e);
    }
    eprintln!("Configuration is valid.");
    ExitCode::SUCCESS
}
