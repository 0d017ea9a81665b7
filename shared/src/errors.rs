use thiserror::Error;

/// Failure classes an upstream call can end in after the retry budget is
/// spent. Rate limiting and blocking are kept distinct from plain
/// unavailability so the aggregator can log and react to them separately.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("{endpoint}: upstream unavailable after {attempts} attempt(s): {reason}")]
    Unavailable {
        endpoint: String,
        attempts: u32,
        reason: String,
    },

    #[error("{endpoint}: rate limited (HTTP 429) after {attempts} attempt(s)")]
    RateLimited { endpoint: String, attempts: u32 },

    #[error("{endpoint}: access blocked (HTTP 403) after {attempts} attempt(s)")]
    Forbidden { endpoint: String, attempts: u32 },

    #[error("{endpoint}: response did not match the expected schema: {reason}")]
    Schema { endpoint: String, reason: String },
}

impl UpstreamError {
    pub fn endpoint(&self) -> &str {
        match self {
            Self::Unavailable { endpoint, .. }
            | Self::RateLimited { endpoint, .. }
            | Self::Forbidden { endpoint, .. }
            | Self::Schema { endpoint, .. } => endpoint,
        }
    }

    /// True for the block signals (403/429) that should widen backoff.
    pub fn is_block_signal(&self) -> bool {
        matches!(self, Self::RateLimited { .. } | Self::Forbidden { .. })
    }
}
