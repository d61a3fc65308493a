//! Error types for beanclass

/// Result type alias using beanclass's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for beanclass operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Single-record form input was rejected
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Batch source could not be turned into a feature matrix
    #[error(transparent)]
    Source(#[from] SourceError),

    /// Model artifact missing, unreadable, or structurally invalid
    #[error("model load error: {0}")]
    ModelLoad(String),

    /// The classifier failed while running inference
    #[error("model invocation failed: {0}")]
    Invocation(String),

    /// Prediction was requested for a matrix with no rows
    #[error("no feature rows to predict")]
    EmptyInput,

    /// Filesystem errors
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// CSV writer/reader errors outside of batch-source parsing
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// Generic internal errors
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a new model load error
    pub fn model_load(msg: impl Into<String>) -> Self {
        Self::ModelLoad(msg.into())
    }

    /// Create a new invocation error
    pub fn invocation(msg: impl Into<String>) -> Self {
        Self::Invocation(msg.into())
    }

    /// Create a new internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Whether the user can fix this by resubmitting different input.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::Validation(_) | Self::Source(_) | Self::EmptyInput
        )
    }
}

/// Rejections of a single-record form submission.
///
/// Messages are the inline warnings shown to the user, so they stay generic
/// and never name the offending field.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("One or more fields are left blank!")]
    MissingField,

    #[error("Only int or float values are allowed!")]
    NotNumeric,

    #[error("expected {expected} feature values, got {found}")]
    FieldCount { expected: usize, found: usize },

    #[error("unknown feature field: {0}")]
    UnknownField(String),
}

/// Failures turning an uploaded or fetched CSV into a feature matrix.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SourceError {
    #[error("could not read CSV: {0}")]
    Unreadable(String),

    #[error("could not fetch CSV: {0}")]
    Fetch(String),

    /// `row` is 1-based and counts data rows only
    #[error("row {row} has {found} columns, at least 16 are required")]
    MissingColumns { row: usize, found: usize },

    #[error("row {row}, column {column}: value is not a number")]
    NonNumeric { row: usize, column: String },
}

impl SourceError {
    pub fn unreadable(msg: impl Into<String>) -> Self {
        Self::Unreadable(msg.into())
    }

    pub fn fetch(msg: impl Into<String>) -> Self {
        Self::Fetch(msg.into())
    }
}
