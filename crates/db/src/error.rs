use thiserror::Error;

/// Failures surfaced by the storage gateway.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store could not hand out a connection: unreachable, misconfigured, timed out
    /// waiting for the pool, or already closed.
    #[error("store unavailable: {0}")]
    Unavailable(#[source] sqlx::Error),

    /// The statement itself failed: malformed SQL, constraint violation, bad parameter.
    #[error("statement failed: {0}")]
    Statement(#[source] sqlx::Error),
}

impl StoreError {
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}
