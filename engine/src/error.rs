/// Failures of the template merge
///
/// A merge either returns the whole template or one of these, never a partial result.
#[derive(Debug, thiserror::Error)]
pub enum MergeError {
    #[error("No templates given")]
    NoTemplates,

    #[error("Error decoding file '{source_name}' (Key: {key}): {reason}")]
    InvalidJson {
        source_name: String,
        key: String,
        reason: String,
        line: usize,
        column: usize,
    },

    #[error("Invalid AWSTemplateFormatVersion in '{source_name}': {found:?}")]
    InvalidFormatVersion {
        source_name: String,
        found: Option<String>,
    },

    #[error("Duplicate key '{key}' found in '{section}'")]
    DuplicateKey { key: String, section: String },

    #[error("Template too big: {size} bytes (must be smaller than {limit} bytes)")]
    TooLarge { size: usize, limit: usize },

    #[error("Failed to serialize merged template: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Merge(#[from] MergeError),

    /// Opaque failure of the stack API, passed through as is
    #[error(transparent)]
    Api(#[from] eyre::Report),

    #[error("{what} '{key}' not found in stack '{stack}'")]
    NotFound {
        what: &'static str,
        stack: String,
        key: String,
    },

    #[error("Stack '{0}' not found")]
    StackNotFound(String),

    #[error("Environment variable '{0}' not found")]
    EnvVarNotFound(String),

    #[error("Invalid on-failure policy '{0}', expected ROLLBACK, DO_NOTHING or DELETE")]
    InvalidOnFailure(String),

    #[error("Stack '{stack}' can't be updated right now. Status: {status}")]
    StackBusy { stack: String, status: String },

    #[error("Observation cancelled")]
    Cancelled,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
