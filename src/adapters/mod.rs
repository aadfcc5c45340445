//! Concrete adapter implementations for ports.

pub mod bifurcation_solver;
pub mod exhaustive_solver;
pub mod file_config_adapter;
pub mod file_dataset_adapter;
#[cfg(feature = "http")]
pub mod http_dataset_adapter;
pub mod matrix_csv_adapter;
