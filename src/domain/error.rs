//! Domain error types.

/// A parse error with position information for polynomial expressions.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("parse error at position {position}: {message}")]
pub struct ParseError {
    pub message: String,
    pub position: usize,
}

impl ParseError {
    /// Format the error with a caret pointing at the error position in the input.
    pub fn display_with_context(&self, input: &str) -> String {
        // `position` is a byte offset; the caret goes under the matching char.
        let column = input
            .char_indices()
            .take_while(|(i, _)| *i < self.position)
            .count();
        let caret = " ".repeat(column) + "^";
        format!(
            "{input}\n{caret}\n{err}",
            input = input,
            caret = caret,
            err = self
        )
    }
}

/// Top-level error type for qubo-portfolio.
#[derive(Debug, thiserror::Error)]
pub enum QuboError {
    #[error("failed to fetch dataset from {source_name}: {reason}")]
    DatasetFetch { source_name: String, reason: String },

    #[error("dataset parse error on line {line}: {reason}")]
    DatasetParse { line: usize, reason: String },

    #[error("correlation between assets {i} and {j} is undefined")]
    MissingCorrelation { i: usize, j: usize },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error(transparent)]
    ExpressionParse(#[from] ParseError),

    #[error("polynomials belong to different rings: [{left}] vs [{right}]")]
    RingMismatch { left: String, right: String },

    #[error("unknown variable '{name}'")]
    UnknownVariable { name: String },

    #[error("coefficient overflow in {operation}")]
    CoefficientOverflow { operation: String },

    #[error("matrix shape mismatch: {left:?} vs {right:?}")]
    ShapeMismatch {
        left: (usize, usize),
        right: (usize, usize),
    },

    #[error("solver error: {reason}")]
    Solver { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&QuboError> for std::process::ExitCode {
    fn from(err: &QuboError) -> Self {
        let code: u8 = match err {
            QuboError::Io(_) => 1,
            QuboError::ConfigParse { .. }
            | QuboError::ConfigMissing { .. }
            | QuboError::ConfigInvalid { .. } => 2,
            QuboError::DatasetFetch { .. } | QuboError::DatasetParse { .. } => 3,
            QuboError::ExpressionParse(_) => 4,
            QuboError::MissingCorrelation { .. }
            | QuboError::RingMismatch { .. }
            | QuboError::UnknownVariable { .. }
            | QuboError::CoefficientOverflow { .. }
            | QuboError::ShapeMismatch { .. } => 5,
            QuboError::Solver { .. } => 6,
        };
        std::process::ExitCode::from(code)
    }
}
