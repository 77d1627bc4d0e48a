use actor_structs::{
    Actor, ActorDetail, ActorVersion, Build, DatasetItem, Record, Run, RunRequestOptions,
};
use async_trait::async_trait;

use crate::{ClientError, User};

/// Which actors a listing query returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActorScope {
    /// Actors created by the caller
    Owned,
    /// Every actor the caller may run
    Accessible,
}

/// Endpoints of the remote platform used by the bridge.
#[async_trait]
pub trait ActorPlatform: Send + Sync {
    /// Returns the account the credential belongs to.
    async fn current_user(&self) -> Result<User, ClientError>;

    async fn list_actors(&self, scope: ActorScope) -> Result<Vec<Actor>, ClientError>;

    async fn get_actor(&self, actor_id: &str) -> Result<ActorDetail, ClientError>;

    /// Lists versions, most recent first.
    async fn list_versions(
        &self,
        actor_id: &str,
        limit: u32,
    ) -> Result<Vec<ActorVersion>, ClientError>;

    async fn get_build(&self, build_id: &str) -> Result<Build, ClientError>;

    /// Lists builds, most recent first.
    async fn list_builds(&self, actor_id: &str, limit: u32) -> Result<Vec<Build>, ClientError>;

    async fn start_run(
        &self,
        actor_id: &str,
        input: &Record,
        options: &RunRequestOptions,
    ) -> Result<Run, ClientError>;

    async fn get_run(&self, run_id: &str) -> Result<Run, ClientError>;

    /// Fetches the run's default dataset in its cleaned representation.
    async fn dataset_items(&self, run_id: &str) -> Result<Vec<DatasetItem>, ClientError>;
}
