//! Merged actor catalog: owned, then accessible, then curated actors.

use std::collections::HashSet;
use std::sync::Arc;

use actor_structs::Actor;
use platform_client::{ActorPlatform, ActorScope};
use tracing::{info, warn};

use crate::BridgeError;

/// Builds one deduplicated actor listing from several sources.
pub struct CatalogMerger {
    platform: Arc<dyn ActorPlatform>,
    curated_ids: Vec<String>,
}

impl CatalogMerger {
    #[must_use]
    pub fn new(platform: Arc<dyn ActorPlatform>, curated_ids: Vec<String>) -> Self {
        Self {
            platform,
            curated_ids,
        }
    }

    /// Lists every actor available to the caller.
    ///
    /// Order is owned actors, then accessible actors not already listed,
    /// then curated actors not already listed, each in source order.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::UpstreamUnavailable`] carrying the owned
    /// listing's failure if both listings fail.
    pub async fn list(&self) -> Result<Vec<Actor>, BridgeError> {
        let (owned, accessible) = tokio::join!(
            self.platform.list_actors(ActorScope::Owned),
            self.platform.list_actors(ActorScope::Accessible),
        );

        let mut catalog = Catalog::default();

        match (owned, accessible) {
            (Err(owned_error), Err(accessible_error)) => {
                warn!("Accessible actor listing failed: {accessible_error}");
                return Err(BridgeError::upstream("actor listing", owned_error));
            }
            (owned, accessible) => {
                let listings = [
                    (ActorScope::Owned, owned),
                    (ActorScope::Accessible, accessible),
                ];
                for (scope, listing) in listings {
                    match listing {
                        Ok(actors) => catalog.extend(actors),
                        Err(error) => warn!(scope = ?scope, "Actor listing failed: {error}"),
                    }
                }
            }
        }

        let listed = catalog.actors.len();

        for curated_id in &self.curated_ids {
            if catalog.references(curated_id) {
                continue;
            }
            match self.platform.get_actor(curated_id).await {
                Ok(detail) => {
                    catalog.push(detail.actor);
                }
                Err(error) => {
                    warn!(actor_id = %curated_id, "Skipping curated actor: {error}");
                }
            }
        }

        info!(
            listed,
            curated = catalog.actors.len() - listed,
            "Merged actor catalog"
        );

        Ok(catalog.actors)
    }
}

/// Insertion-ordered actor list with id uniqueness.
#[derive(Default)]
struct Catalog {
    actors: Vec<Actor>,
    ids: HashSet<String>,
}

impl Catalog {
    fn push(&mut self, actor: Actor) {
        if self.ids.insert(actor.id.clone()) {
            self.actors.push(actor);
        }
    }

    fn extend(&mut self, actors: Vec<Actor>) {
        for actor in actors {
            self.push(actor);
        }
    }

    fn references(&self, reference: &str) -> bool {
        self.ids.contains(reference)
            || self
                .actors
                .iter()
                .any(|actor| actor.is_referenced_by(reference))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakePlatform, actor, detail};

    fn ids(actors: &[Actor]) -> Vec<&str> {
        actors.iter().map(|actor| actor.id.as_str()).collect()
    }

    fn make_merger(
        platform: FakePlatform,
        curated: &[&str],
    ) -> (CatalogMerger, Arc<FakePlatform>) {
        let platform = Arc::new(platform);
        let curated = curated.iter().map(|id| (*id).to_owned()).collect();
        (CatalogMerger::new(platform.clone(), curated), platform)
    }

    #[tokio::test]
    async fn test_owned_then_accessible_exclusive() {
        let platform = FakePlatform {
            owned: Some(Ok(vec![actor("A"), actor("B")])),
            accessible: Some(Ok(vec![actor("B"), actor("C")])),
            ..FakePlatform::default()
        };
        let (merger, _) = make_merger(platform, &[]);
        let actors = merger.list().await.unwrap();
        assert_eq!(ids(&actors), ["A", "B", "C"]);
    }

    #[tokio::test]
    async fn test_failing_curated_lookups_are_dropped() {
        let platform = FakePlatform {
            owned: Some(Ok(vec![actor("A"), actor("B")])),
            accessible: Some(Ok(vec![actor("B"), actor("C")])),
            ..FakePlatform::default()
        };
        let (merger, platform) = make_merger(
            platform,
            &["apify~web-scraper", "apify~google-search-scraper"],
        );
        let actors = merger.list().await.unwrap();
        assert_eq!(ids(&actors), ["A", "B", "C"]);
        assert_eq!(platform.calls().get_actor.len(), 2);
    }

    #[tokio::test]
    async fn test_curated_appended_and_deduplicated() {
        let mut platform = FakePlatform {
            owned: Some(Err(500)),
            accessible: Some(Ok(vec![actor("A")])),
            ..FakePlatform::default()
        };
        platform.details.insert("Z".to_owned(), detail("Z"));
        platform.details.insert("Y".to_owned(), detail("Y"));

        // "tester~a" names A, which is already listed
        let (merger, platform) = make_merger(platform, &["Z", "tester~a", "A", "Y", "missing"]);
        let actors = merger.list().await.unwrap();
        assert_eq!(ids(&actors), ["A", "Z", "Y"]);
        assert_eq!(platform.calls().get_actor, ["Z", "Y", "missing"]);
    }

    #[tokio::test]
    async fn test_both_listings_failing() {
        let platform = FakePlatform {
            owned: Some(Err(401)),
            accessible: Some(Err(503)),
            ..FakePlatform::default()
        };
        let (merger, platform) = make_merger(platform, &["Z"]);
        let error = merger.list().await.unwrap_err();
        assert_eq!(error.status(), Some(401));
        assert!(platform.calls().get_actor.is_empty());
    }
}
