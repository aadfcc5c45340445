//! Configuration validation and typed settings.
//!
//! Every value is checked before any data is fetched. Missing numeric keys
//! take their defaults; present but unparsable values are rejected rather
//! than silently replaced.

use crate::domain::error::QuboError;
use crate::domain::portfolio::ModelParams;
use crate::domain::problem::Sense;
use crate::ports::config_port::ConfigPort;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolverKind {
    Bifurcation,
    Exhaustive,
}

impl FromStr for SolverKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "bifurcation" | "sb" => Ok(SolverKind::Bifurcation),
            "exhaustive" | "brute_force" => Ok(SolverKind::Exhaustive),
            other => Err(format!(
                "unknown solver '{}' (expected bifurcation or exhaustive)",
                other
            )),
        }
    }
}

impl fmt::Display for SolverKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolverKind::Bifurcation => write!(f, "bifurcation"),
            SolverKind::Exhaustive => write!(f, "exhaustive"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SolverSettings {
    pub kind: SolverKind,
    pub agents: usize,
    pub steps: usize,
    pub time_step: f64,
    pub seed: Option<u64>,
}

/// Where the dataset comes from. A file path wins over a URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatasetSource {
    Path(String),
    Url(String),
}

pub fn validate_config(config: &dyn ConfigPort) -> Result<(), QuboError> {
    dataset_source(config)?;
    model_params(config)?;
    solver_settings(config)?;
    Ok(())
}

pub fn dataset_source(config: &dyn ConfigPort) -> Result<DatasetSource, QuboError> {
    let non_empty = |key: &str| {
        config
            .get_string("dataset", key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };
    match (non_empty("path"), non_empty("url")) {
        (Some(path), _) => Ok(DatasetSource::Path(path)),
        (None, Some(url)) => Ok(DatasetSource::Url(url)),
        (None, None) => Err(QuboError::ConfigMissing {
            section: "dataset".to_string(),
            key: "url".to_string(),
        }),
    }
}

pub fn model_params(config: &dyn ConfigPort) -> Result<ModelParams, QuboError> {
    let defaults = ModelParams::default();

    let penalty_weight: f64 = parse_value(config, "model", "penalty_weight", defaults.penalty_weight)?;
    if !(penalty_weight > 0.0 && penalty_weight.is_finite()) {
        return Err(invalid("model", "penalty_weight", "penalty_weight must be positive"));
    }

    let target_count: i64 = parse_value(config, "model", "target_count", defaults.target_count as i64)?;
    if target_count < 1 {
        return Err(invalid("model", "target_count", "target_count must be at least 1"));
    }

    let return_weight: f64 = parse_value(config, "model", "return_weight", defaults.return_weight)?;
    if !(return_weight >= 0.0 && return_weight.is_finite()) {
        return Err(invalid("model", "return_weight", "return_weight must be non-negative"));
    }

    let sense: Sense = parse_value(config, "model", "sense", defaults.sense)?;

    Ok(ModelParams {
        penalty_weight,
        target_count: target_count as usize,
        return_weight,
        sense,
    })
}

pub fn solver_settings(config: &dyn ConfigPort) -> Result<SolverSettings, QuboError> {
    let kind: SolverKind = parse_value(config, "solver", "kind", SolverKind::Bifurcation)?;

    let agents: i64 = parse_value(config, "solver", "agents", 128)?;
    if agents < 1 {
        return Err(invalid("solver", "agents", "agents must be at least 1"));
    }

    let steps: i64 = parse_value(config, "solver", "steps", 10_000)?;
    if steps < 1 {
        return Err(invalid("solver", "steps", "steps must be at least 1"));
    }

    let time_step: f64 = parse_value(config, "solver", "time_step", 0.1)?;
    if !(time_step > 0.0 && time_step.is_finite()) {
        return Err(invalid("solver", "time_step", "time_step must be positive"));
    }

    let seed = match config.get_string("solver", "seed") {
        Some(raw) if !raw.trim().is_empty() => Some(
            raw.trim()
                .parse::<u64>()
                .map_err(|e| invalid("solver", "seed", &format!("invalid seed '{}': {}", raw.trim(), e)))?,
        ),
        _ => None,
    };

    Ok(SolverSettings {
        kind,
        agents: agents as usize,
        steps: steps as usize,
        time_step,
        seed,
    })
}

/// Optional CSV destination for the combined matrix.
pub fn matrix_output(config: &dyn ConfigPort) -> Option<String> {
    config
        .get_string("output", "matrix_csv")
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_value<T>(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: T,
) -> Result<T, QuboError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    match config.get_string(section, key) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map_err(|e| invalid(section, key, &format!("invalid value '{}': {}", raw.trim(), e))),
        _ => Ok(default),
    }
}

fn invalid(section: &str, key: &str, reason: &str) -> QuboError {
    QuboError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.to_string(),
    }
}
