//! Core domain types and logic.

pub mod config_validation;
pub mod covariance;
pub mod dataset;
pub mod error;
pub mod generators;
pub mod penalty;
pub mod poly_parser;
pub mod polynomial;
pub mod portfolio;
pub mod problem;
pub mod qubo;
