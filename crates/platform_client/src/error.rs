/// Failure of a single platform request.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The platform answered with a non-success status.
    #[error("request to {endpoint} failed with status {status}: {body}")]
    Status {
        endpoint: String,
        status: u16,
        body: String,
    },

    /// The request never produced a response.
    #[error("failed to send request to {endpoint}")]
    Transport {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    /// The response body did not match the expected shape.
    #[error("failed to parse response from {endpoint}")]
    Decode {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to create HTTP client")]
    Build(#[source] reqwest::Error),
}

impl ClientError {
    /// Returns the upstream HTTP status, if the platform answered.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Transport { .. } | Self::Decode { .. } | Self::Build(_) => None,
        }
    }

    /// Returns true if the platform rejected the credential.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self.status(), Some(401 | 403))
    }
}
