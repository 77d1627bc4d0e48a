use platform_client::ClientError;

/// Failures that stop a bridge operation.
///
/// Failures of enrichment steps (curated lookups, single schema probes,
/// status polls, the dataset fetch) are absorbed where they happen and never
/// reach this type.
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    #[error("an API token is required for this operation")]
    MissingCredential,

    #[error("{operation} failed: {source}")]
    UpstreamUnavailable {
        operation: &'static str,
        status: Option<u16>,
        #[source]
        source: ClientError,
    },

    #[error("failed to start a run of actor {actor_id}: {source}")]
    ExecutionSubmitFailure {
        actor_id: String,
        status: Option<u16>,
        #[source]
        source: ClientError,
    },
}

impl BridgeError {
    pub(crate) fn upstream(operation: &'static str, source: ClientError) -> Self {
        Self::UpstreamUnavailable {
            operation,
            status: source.status(),
            source,
        }
    }

    /// Returns the upstream HTTP status behind this error, if any.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::MissingCredential => None,
            Self::UpstreamUnavailable { status, .. }
            | Self::ExecutionSubmitFailure { status, .. } => *status,
        }
    }
}
