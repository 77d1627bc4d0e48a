//! Ordered cascade of schema lookups ending in a synthesized fallback.

use std::sync::Arc;

use actor_structs::{ActorDetail, InputSchema, SchemaPayload};
use platform_client::{ActorPlatform, ClientError};
use serde::Serialize;
use tracing::{debug, info, warn};

use super::{SchemaOverrides, synthesizer};
use crate::BridgeError;

/// Where a resolved schema came from, in cascade order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SchemaSource {
    /// Most recent version embedded in the actor detail
    VersionEmbedded,
    /// Dedicated most-recent-version query
    VersionListing,
    /// Build tagged `latest`
    LatestBuild,
    /// Dedicated most-recent-build query
    BuildListing,
    /// Synthesized from the recorded example input
    ExampleInput,
    /// Hand-written override table
    StaticOverride,
    /// Synthesized from title, description, categories and pricing
    Metadata,
}

impl SchemaSource {
    /// Probes tried before falling back to [`SchemaSource::Metadata`].
    pub const PROBES: [Self; 6] = [
        Self::VersionEmbedded,
        Self::VersionListing,
        Self::LatestBuild,
        Self::BuildListing,
        Self::ExampleInput,
        Self::StaticOverride,
    ];
}

/// A schema together with the probe that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub schema: InputSchema,
    pub source: SchemaSource,
}

/// Produces an input schema for any actor whose detail can be fetched.
pub struct SchemaResolver {
    platform: Arc<dyn ActorPlatform>,
    overrides: Arc<SchemaOverrides>,
}

impl SchemaResolver {
    #[must_use]
    pub fn new(platform: Arc<dyn ActorPlatform>, overrides: Arc<SchemaOverrides>) -> Self {
        Self {
            platform,
            overrides,
        }
    }

    /// Resolves the schema of an actor.
    ///
    /// Probes run in [`SchemaSource::PROBES`] order and the first one that
    /// yields a schema with at least one property wins. A failing probe
    /// counts as a miss.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::UpstreamUnavailable`] if the actor detail
    /// itself cannot be fetched.
    pub async fn resolve(&self, actor_id: &str) -> Result<Resolution, BridgeError> {
        let detail = self
            .platform
            .get_actor(actor_id)
            .await
            .map_err(|error| BridgeError::upstream("actor detail lookup", error))?;

        for source in SchemaSource::PROBES {
            match self.probe(source, actor_id, &detail).await {
                Some(schema) if !schema.properties.is_empty() => {
                    info!(
                        actor_id,
                        source = %source,
                        properties = schema.properties.len(),
                        "Resolved input schema"
                    );
                    return Ok(Resolution { schema, source });
                }
                Some(_) => {
                    debug!(actor_id, source = %source, "Skipping schema without properties");
                }
                None => debug!(actor_id, source = %source, "No schema from probe"),
            }
        }

        info!(actor_id, "Synthesizing input schema from actor metadata");

        Ok(Resolution {
            schema: synthesizer::from_metadata(&detail),
            source: SchemaSource::Metadata,
        })
    }

    /// Runs a single probe against an already fetched actor detail.
    pub async fn probe(
        &self,
        source: SchemaSource,
        requested_id: &str,
        detail: &ActorDetail,
    ) -> Option<InputSchema> {
        let actor_id = detail.actor.id.as_str();

        match source {
            SchemaSource::VersionEmbedded => detail
                .versions
                .last()
                .and_then(|version| version.input_schema.clone())
                .and_then(SchemaPayload::into_schema),
            SchemaSource::VersionListing => {
                let versions = absorb(
                    source,
                    actor_id,
                    self.platform.list_versions(actor_id, 1).await,
                )?;
                versions
                    .into_iter()
                    .next()?
                    .input_schema?
                    .into_schema()
            }
            SchemaSource::LatestBuild => {
                let build_id = detail.latest_build_id()?;
                let build = absorb(source, actor_id, self.platform.get_build(build_id).await)?;
                build.input_schema?.into_schema()
            }
            SchemaSource::BuildListing => {
                let builds = absorb(
                    source,
                    actor_id,
                    self.platform.list_builds(actor_id, 1).await,
                )?;
                builds.into_iter().next()?.input_schema?.into_schema()
            }
            SchemaSource::ExampleInput => {
                let example = detail.example_run_input.as_ref()?.parse_record()?;
                if example.is_empty() {
                    return None;
                }
                Some(synthesizer::from_example(
                    detail.actor.display_title(),
                    &example,
                ))
            }
            SchemaSource::StaticOverride => {
                self.overrides.lookup(requested_id, detail).cloned()
            }
            SchemaSource::Metadata => Some(synthesizer::from_metadata(detail)),
        }
    }
}

/// Turns a failed probe request into a miss.
fn absorb<T>(source: SchemaSource, actor_id: &str, result: Result<T, ClientError>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(error) => {
            warn!(actor_id, source = %source, "Schema probe failed: {error}");
            None
        }
    }
}
