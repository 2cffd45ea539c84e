/// Terminal failure produced by the request executor.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum NetworkError {
    /// Transport reported neither a payload nor an error. Never retried.
    #[error("transport returned no data")]
    NoData,
    /// Transport kept failing until the retry budget ran out.
    #[error("connection failure")]
    ConnectionFailure,
    /// Every attempt hit its deadline.
    #[error("request timed out")]
    Timeout,
    /// Richer transport detail attached by a collaborator layer.
    #[error("transport error: {0}")]
    Transport(String),
}

/// Error type returned by the client facade.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Request execution failed after retries.
    #[error(transparent)]
    Network(#[from] NetworkError),
    /// Service descriptor resolved to a malformed URL.
    #[error("invalid url: {0}")]
    InvalidUrl(String),
    /// Request body could not be serialised.
    #[error("serialize error: {0}")]
    Serialize(String),
    /// Non-success HTTP status code with raw response body.
    #[error("http error {status}: {body}")]
    Http { status: u16, body: String },
    /// API answered with an envelope carrying a message but no data.
    #[error("server error: {message}")]
    Server { message: String },
    /// Response decoding or shape validation error.
    #[error("decode error: {0}")]
    Decode(String),
}
