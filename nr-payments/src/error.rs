use diesel_async::pooled_connection::PoolError;

pub type Result<T> = std::result::Result<T, PaymentError>;

#[derive(Debug, thiserror::Error)]
pub enum PaymentError {
    /// More than one row carries a token that lookups treat as unique.
    #[error("payment token {token} matches {count} payments")]
    AmbiguousPaymentToken { token: String, count: usize },

    #[error("unknown payment action: {0}")]
    UnknownAction(String),

    #[error("database error: {0}")]
    Database(#[from] diesel::result::Error),

    #[error("connection pool error: {0}")]
    Pool(#[from] bb8::RunError<PoolError>),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("failed to publish to {topic}: {reason}")]
    Publish { topic: String, reason: String },
}
