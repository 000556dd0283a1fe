//! Error type shared by the input, inference, and statistics layers.

use thiserror::Error;

/// Everything that can go wrong before rendering starts.
#[derive(Debug, Error)]
pub enum FleurError {
    #[error("If x and y are column names, `data` argument must be passed.")]
    MissingData,

    #[error("`x` and/or `y` not found in `data` columns.")]
    ColumnNotFound,

    #[error("`x` and `y` must have the same length, not {x_len} and {y_len}")]
    LengthMismatch { x_len: usize, y_len: usize },

    #[error(
        "`x` and `y` must be both column names, both series, or both arrays. Not x={x_kind} and y={y_kind}"
    )]
    UnsupportedInput {
        x_kind: &'static str,
        y_kind: &'static str,
    },

    #[error(
        "Either both columns are categorical or both are numerical. Function requires one categorical and one numerical column."
    )]
    AmbiguousTypes,

    #[error("Column `{0}` must be numerical")]
    NotNumeric(String),

    #[error("You must have at least 2 distinct categories in your category column")]
    TooFewCategories,

    #[error("Paired tests require groups of equal size, got sizes {0:?}")]
    UnequalPairs(Vec<usize>),

    #[error("Repeated measures ANOVA has not been implemented yet.")]
    RepeatedMeasuresAnova,

    #[error("`{name}` must be one of: {allowed}")]
    InvalidOption {
        name: &'static str,
        allowed: &'static str,
    },

    #[error("dataset_name must be one of: {0}")]
    UnknownDataset(String),

    #[error("Fisher's exact test can only be used with 2x2 contingency tables, got {rows}x{cols}")]
    FisherNot2x2 { rows: usize, cols: usize },

    #[error("`colors` argument must have at least {needed} elements, not {given}")]
    TooFewColors { needed: usize, given: usize },

    #[error("invalid color `{0}`")]
    InvalidColor(String),

    #[error("ci must be strictly between 0 and 100, not {0}")]
    InvalidConfidence(f64),

    #[error("cannot run {test}: {reason}")]
    Degenerate {
        test: &'static str,
        reason: &'static str,
    },

    #[error("column `{0}` has a different length than the frame")]
    RaggedColumn(String),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, FleurError>;
