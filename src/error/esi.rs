use thiserror::Error;

#[derive(Error, Debug)]
pub enum EsiError {
    /// Transport-level failure (connection refused, timeout, DNS).
    ///
    /// Transient; the scheduler retries on the next tick rather than in a
    /// tight loop within the same tick.
    #[error(transparent)]
    Request(#[from] reqwest::Error),
    /// ESI answered with a non-success status code.
    #[error("ESI request failed with status {status}: {body}")]
    Status { status: u16, body: String },
    /// A 2xx response whose body did not match the expected shape.
    #[error("Unexpected ESI response shape: {0}")]
    MalformedResponse(String),
}
