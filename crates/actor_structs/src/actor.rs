use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};

use crate::{Record, SchemaPayload};

/// Pricing model identifier used by free actors.
pub const FREE_PRICING_MODEL: &str = "FREE";

/// An actor as listed by the platform.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Actor {
    /// Unique actor ID
    pub id: String,

    /// Actor name, unique within its owner
    pub name: String,

    /// Owner username
    #[serde(default)]
    pub username: Option<String>,

    /// Display title
    #[serde(default)]
    pub title: Option<String>,

    /// Short description
    #[serde(default)]
    pub description: Option<String>,

    /// Whether the actor is published to the store
    #[serde(default)]
    pub is_public: bool,

    /// Usage statistics
    #[serde(default)]
    pub stats: Option<ActorStats>,

    /// When the actor was created
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,

    /// When the actor was last modified
    #[serde(default)]
    pub modified_at: Option<DateTime<Utc>>,
}

impl Actor {
    /// Returns the owner-qualified `username~name` form of the actor id.
    #[must_use]
    pub fn qualified_name(&self) -> Option<String> {
        self.username
            .as_ref()
            .map(|username| format!("{username}~{}", self.name))
    }

    /// Returns the title to display, falling back to the name.
    #[must_use]
    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.name)
    }

    /// Returns true if `reference` names this actor, either by id or by
    /// `username~name` / `username/name`.
    #[must_use]
    pub fn is_referenced_by(&self, reference: &str) -> bool {
        if self.id == reference {
            return true;
        }
        let normalized = reference.replace('/', "~");
        self.qualified_name()
            .is_some_and(|qualified| qualified == normalized)
    }
}

/// Actor usage statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActorStats {
    /// Number of runs across all users
    #[serde(default)]
    pub total_runs: u64,

    /// Number of distinct users
    #[serde(default)]
    pub total_users: Option<u64>,
}

/// Full actor record returned by the detail endpoint.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActorDetail {
    #[serde(flatten)]
    pub actor: Actor,

    /// Source versions, oldest first
    #[serde(default, deserialize_with = "null_as_default")]
    pub versions: Vec<ActorVersion>,

    /// Builds addressable by tag (e.g. `latest`)
    #[serde(default, deserialize_with = "null_as_default")]
    pub tagged_builds: IndexMap<String, TaggedBuild>,

    /// Example input recorded by the author
    #[serde(default)]
    pub example_run_input: Option<ExampleRunInput>,

    /// Store categories (e.g. `JOBS`, `LEAD_GENERATION`)
    #[serde(default, deserialize_with = "null_as_default")]
    pub categories: Vec<String>,

    /// Pricing history, the last entry is current
    #[serde(default, deserialize_with = "null_as_default")]
    pub pricing_infos: Vec<PricingInfo>,
}

impl ActorDetail {
    /// Returns the pricing entry in force, if the actor is paid.
    #[must_use]
    pub fn paid_pricing(&self) -> Option<&PricingInfo> {
        self.pricing_infos
            .last()
            .filter(|pricing| pricing.pricing_model != FREE_PRICING_MODEL)
    }

    /// Returns the id of the build tagged `latest`.
    #[must_use]
    pub fn latest_build_id(&self) -> Option<&str> {
        self.tagged_builds
            .get("latest")
            .and_then(|build| build.build_id.as_deref())
    }
}

/// One source version of an actor.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActorVersion {
    /// Version number (e.g. "0.1")
    pub version_number: String,

    /// Tag assigned to builds of this version
    #[serde(default)]
    pub build_tag: Option<String>,

    /// Input schema declared by this version
    #[serde(default)]
    pub input_schema: Option<SchemaPayload>,
}

/// Reference to a build from the actor's tag table.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaggedBuild {
    #[serde(default)]
    pub build_id: Option<String>,

    #[serde(default)]
    pub build_number: Option<String>,

    #[serde(default)]
    pub finished_at: Option<DateTime<Utc>>,
}

/// A compiled artifact of an actor version.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Build {
    /// Unique build ID
    pub id: String,

    /// Owning actor
    #[serde(default)]
    pub act_id: Option<String>,

    /// Build status (e.g. `SUCCEEDED`)
    #[serde(default)]
    pub status: Option<String>,

    /// Build number (e.g. "0.1.23")
    #[serde(default)]
    pub build_number: Option<String>,

    /// Input schema baked into the build
    #[serde(default)]
    pub input_schema: Option<SchemaPayload>,
}

/// Example input attached to an actor.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExampleRunInput {
    /// Raw body, usually a JSON document
    #[serde(default)]
    pub body: Option<String>,

    /// MIME type of the body
    #[serde(default)]
    pub content_type: Option<String>,
}

impl ExampleRunInput {
    /// Parses the body as a JSON object.
    ///
    /// Returns `None` if the body is missing, not JSON, or not an object.
    #[must_use]
    pub fn parse_record(&self) -> Option<Record> {
        let body = self.body.as_deref()?;
        serde_json::from_str::<Record>(body).ok()
    }
}

/// A pricing entry of a store actor.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingInfo {
    /// Pricing model (e.g. `FREE`, `FLAT_PRICE_PER_MONTH`, `PRICE_PER_DATASET_ITEM`)
    pub pricing_model: String,

    /// Price in USD per unit
    #[serde(default)]
    pub price_per_unit_usd: Option<f64>,

    /// Length of the free trial
    #[serde(default)]
    pub trial_minutes: Option<u32>,

    /// What a unit is (e.g. "result")
    #[serde(default)]
    pub unit_name: Option<String>,
}

/// Deserializes `null` as the default value of the target type.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    const DETAIL: &str = r#"{
        "id": "moJRLRc85AitArpNN",
        "name": "web-scraper",
        "username": "apify",
        "title": "Web Scraper",
        "isPublic": true,
        "stats": {"totalRuns": 1200},
        "createdAt": "2019-03-05T11:12:13.000Z",
        "versions": [{"versionNumber": "0.1", "buildTag": "latest"}],
        "taggedBuilds": {"latest": {"buildId": "b1", "buildNumber": "0.1.7"}},
        "exampleRunInput": {"body": "{\"startUrls\": []}", "contentType": "application/json"},
        "categories": null,
        "pricingInfos": [{"pricingModel": "FREE"}]
    }"#;

    #[test]
    fn test_detail_parses() {
        let detail: ActorDetail = serde_json::from_str(DETAIL).unwrap();
        assert_eq!(detail.actor.id, "moJRLRc85AitArpNN");
        assert_eq!(detail.actor.stats.as_ref().unwrap().total_runs, 1200);
        assert_eq!(detail.latest_build_id(), Some("b1"));
        assert!(detail.categories.is_empty());
        assert!(detail.paid_pricing().is_none());
        assert!(detail.example_run_input.unwrap().parse_record().is_some());
    }

    #[test]
    fn test_is_referenced_by() {
        let detail: ActorDetail = serde_json::from_str(DETAIL).unwrap();
        let actor = detail.actor;
        assert!(actor.is_referenced_by("moJRLRc85AitArpNN"));
        assert!(actor.is_referenced_by("apify~web-scraper"));
        assert!(actor.is_referenced_by("apify/web-scraper"));
        assert!(!actor.is_referenced_by("apify~cheerio-scraper"));
    }

    #[test]
    fn test_paid_pricing_uses_last_entry() {
        let mut detail: ActorDetail = serde_json::from_str(DETAIL).unwrap();
        detail.pricing_infos.push(PricingInfo {
            pricing_model: "FLAT_PRICE_PER_MONTH".to_owned(),
            price_per_unit_usd: Some(25.0),
            trial_minutes: Some(120),
            unit_name: None,
        });
        assert_eq!(
            detail.paid_pricing().map(|pricing| pricing.pricing_model.as_str()),
            Some("FLAT_PRICE_PER_MONTH")
        );
    }
}
