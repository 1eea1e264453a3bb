use thiserror::Error;

/// Reasons a payment is excluded from a batch before matching.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InputError {
    #[error("Payment {payment_id}: amount must be positive, got {amount_minor}")]
    NonPositiveAmount { payment_id: i64, amount_minor: i64 },

    #[error("Payment {payment_id}: bank name is missing")]
    MissingBankName { payment_id: i64 },

    #[error("Payment {payment_id}: unparsable timestamp {value:?}")]
    InvalidTimestamp { payment_id: i64, value: String },
}

impl InputError {
    pub fn payment_id(&self) -> i64 {
        match self {
            Self::NonPositiveAmount { payment_id, .. }
            | Self::MissingBankName { payment_id }
            | Self::InvalidTimestamp { payment_id, .. } => *payment_id,
        }
    }
}

/// Failure reading a rule or entity table file.
#[derive(Error, Debug)]
pub enum TableLoadError {
    #[error("Cannot read table {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed row in {path}: {source}")]
    Csv {
        path: String,
        #[source]
        source: csv::Error,
    },
}

#[derive(Error, Debug)]
pub enum MatcherError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    TableLoad(#[from] TableLoadError),

    #[error("Export failed: {0}")]
    Export(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Matching task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

pub type MatcherResult<T> = Result<T, MatcherError>;
