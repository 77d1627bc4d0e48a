//! Envelope-returning operations consumed by the UI.
//!
//! Every operation reports failures in the `error` field of its response
//! instead of returning them.

use std::sync::Arc;

use actor_structs::{Actor, DatasetItem, InputSchema, Record, Run, RunRequestOptions};
use config::Config;
use platform_client::{ActorPlatform, ClientError, PlatformClient};
use serde::Serialize;
use tracing::warn;

use crate::executor::{CancelSignal, Clock, PollOutcome, PollPolicy, RunExecutor, TokioClock};
use crate::schema::{SchemaOverrides, SchemaResolver, SchemaSource};
use crate::{BridgeError, CatalogMerger};

/// Opens a platform handle for a credential.
pub trait PlatformConnector: Send + Sync {
    /// # Errors
    ///
    /// Returns an error if the handle cannot be created.
    fn connect(&self, token: &str) -> Result<Arc<dyn ActorPlatform>, ClientError>;
}

/// Connects to the platform over HTTP.
pub struct HttpConnector {
    config: Config,
}

impl HttpConnector {
    #[must_use]
    pub const fn new(config: Config) -> Self {
        Self { config }
    }
}

impl PlatformConnector for HttpConnector {
    fn connect(&self, token: &str) -> Result<Arc<dyn ActorPlatform>, ClientError> {
        let client: Arc<dyn ActorPlatform> = Arc::new(PlatformClient::new(&self.config, token)?);
        Ok(client)
    }
}

/// Outcome of a credential check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResponse {
    pub valid: bool,

    /// Account the credential belongs to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActorsResponse {
    pub actors: Vec<Actor>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaResponse {
    pub schema: Option<InputSchema>,

    /// Cascade step that produced the schema
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<SchemaSource>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionResponse {
    /// Absent only when the run could not be started
    pub run: Option<Run>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub results: Option<Vec<DatasetItem>>,

    /// Why polling stopped; `ceiling_reached` means the run may still be going
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<PollOutcome>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Entry point wiring the catalog, schema and run components together.
pub struct ActorBridge {
    connector: Arc<dyn PlatformConnector>,
    overrides: Arc<SchemaOverrides>,
    curated_ids: Vec<String>,
    policy: PollPolicy,
    clock: Arc<dyn Clock>,
}

impl ActorBridge {
    #[must_use]
    pub fn new(
        connector: Arc<dyn PlatformConnector>,
        overrides: SchemaOverrides,
        curated_ids: Vec<String>,
        policy: PollPolicy,
    ) -> Self {
        Self {
            connector,
            overrides: Arc::new(overrides),
            curated_ids,
            policy,
            clock: Arc::new(TokioClock),
        }
    }

    /// Creates a bridge talking HTTP to the configured platform.
    #[must_use]
    pub fn from_config(config: &Config, overrides: SchemaOverrides) -> Self {
        Self::new(
            Arc::new(HttpConnector::new(config.clone())),
            overrides,
            config.curated_actor_ids.clone(),
            PollPolicy::from(config),
        )
    }

    /// Replaces the clock driving the poll loop.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    fn connect(&self, credential: Option<&str>) -> Result<Arc<dyn ActorPlatform>, BridgeError> {
        let token = credential
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or(BridgeError::MissingCredential)?;

        self.connector
            .connect(token)
            .map_err(|error| BridgeError::upstream("client setup", error))
    }

    pub async fn validate_credential(&self, credential: Option<&str>) -> ValidationResponse {
        let platform = match self.connect(credential) {
            Ok(platform) => platform,
            Err(error) => return ValidationResponse::invalid(error.to_string()),
        };

        match platform.current_user().await {
            Ok(user) => ValidationResponse {
                valid: true,
                username: Some(user.username),
                error: None,
            },
            Err(error) if error.is_unauthorized() => {
                ValidationResponse::invalid("The API token was rejected".to_owned())
            }
            Err(error) => {
                warn!("Credential check failed: {error}");
                ValidationResponse::invalid(error.to_string())
            }
        }
    }

    pub async fn list_actors(&self, credential: Option<&str>) -> ActorsResponse {
        let result = match self.connect(credential) {
            Ok(platform) => {
                CatalogMerger::new(platform, self.curated_ids.clone())
                    .list()
                    .await
            }
            Err(error) => Err(error),
        };

        match result {
            Ok(actors) => ActorsResponse {
                actors,
                error: None,
            },
            Err(error) => ActorsResponse {
                actors: Vec::new(),
                error: Some(report(&error)),
            },
        }
    }

    pub async fn get_schema(&self, credential: Option<&str>, actor_id: &str) -> SchemaResponse {
        let result = match self.connect(credential) {
            Ok(platform) => {
                SchemaResolver::new(platform, Arc::clone(&self.overrides))
                    .resolve(actor_id)
                    .await
            }
            Err(error) => Err(error),
        };

        match result {
            Ok(resolution) => SchemaResponse {
                schema: Some(resolution.schema),
                source: Some(resolution.source),
                error: None,
            },
            Err(error) => SchemaResponse {
                schema: None,
                source: None,
                error: Some(report(&error)),
            },
        }
    }

    pub async fn execute(
        &self,
        credential: Option<&str>,
        actor_id: &str,
        input: &Record,
        options: &RunRequestOptions,
        cancel: &CancelSignal,
    ) -> ExecutionResponse {
        let result = match self.connect(credential) {
            Ok(platform) => {
                RunExecutor::new(platform, Arc::clone(&self.clock), self.policy)
                    .execute(actor_id, input, options, cancel)
                    .await
            }
            Err(error) => Err(error),
        };

        match result {
            Ok(execution) => ExecutionResponse {
                run: Some(execution.run),
                results: execution.results,
                outcome: Some(execution.outcome),
                error: None,
            },
            Err(error) => ExecutionResponse {
                run: None,
                results: None,
                outcome: None,
                error: Some(report(&error)),
            },
        }
    }
}

impl ValidationResponse {
    const fn invalid(error: String) -> Self {
        Self {
            valid: false,
            username: None,
            error: Some(error),
        }
    }
}

/// Logs a failed operation and renders it for the envelope.
fn report(error: &BridgeError) -> String {
    warn!(status = ?error.status(), "Operation failed: {error}");
    error.to_string()
}
