//! Scripted platform and clock for driving the bridge in tests.

use core::sync::atomic::{AtomicU64, Ordering};
use core::time::Duration;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use actor_structs::{
    Actor, ActorDetail, ActorVersion, Build, DatasetItem, Record, Run, RunOptions,
    RunRequestOptions, RunStats, RunStatus,
};
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use platform_client::{ActorPlatform, ActorScope, ClientError, User};
use tokio::time::Instant;

use crate::executor::Clock;

pub fn status_error(status: u16) -> ClientError {
    ClientError::Status {
        endpoint: "test".to_owned(),
        status,
        body: String::new(),
    }
}

pub fn actor(id: &str) -> Actor {
    Actor {
        id: id.to_owned(),
        name: id.to_lowercase(),
        username: Some("tester".to_owned()),
        title: Some(format!("Actor {id}")),
        description: None,
        is_public: false,
        stats: None,
        created_at: None,
        modified_at: None,
    }
}

pub fn detail(id: &str) -> ActorDetail {
    ActorDetail {
        actor: actor(id),
        versions: Vec::new(),
        tagged_builds: indexmap::IndexMap::new(),
        example_run_input: None,
        categories: Vec::new(),
        pricing_infos: Vec::new(),
    }
}

pub fn run(status: RunStatus) -> Run {
    Run {
        id: "run-1".to_owned(),
        act_id: "A".to_owned(),
        status,
        started_at: Utc.with_ymd_and_hms(2024, 1, 2, 10, 0, 0).unwrap(),
        finished_at: None,
        stats: RunStats::default(),
        options: RunOptions::default(),
        default_dataset_id: Some("dataset-1".to_owned()),
    }
}

/// Poll answers in order; the last one repeats.
pub fn scripted_polls<const N: usize>(
    answers: [Result<Run, u16>; N],
) -> Mutex<VecDeque<Result<Run, u16>>> {
    Mutex::new(VecDeque::from(answers))
}

/// Call counters of a [`FakePlatform`].
#[derive(Debug, Default, Clone)]
pub struct Calls {
    pub get_actor: Vec<String>,
    pub list_versions: usize,
    pub get_build: usize,
    pub list_builds: usize,
    pub start_run: usize,
    pub get_run: usize,
    pub dataset_items: usize,
}

/// In-memory platform with scripted answers.
#[derive(Default)]
pub struct FakePlatform {
    pub user: Option<Result<User, u16>>,
    pub owned: Option<Result<Vec<Actor>, u16>>,
    pub accessible: Option<Result<Vec<Actor>, u16>>,
    pub details: HashMap<String, ActorDetail>,
    pub versions: Vec<ActorVersion>,
    pub builds: HashMap<String, Build>,
    pub build_listing: Vec<Build>,
    pub submit: Option<Result<Run, u16>>,
    pub polls: Mutex<VecDeque<Result<Run, u16>>>,
    pub dataset: Option<Result<Vec<DatasetItem>, u16>>,
    pub calls: Mutex<Calls>,
}

impl FakePlatform {
    pub fn calls(&self) -> Calls {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, update: impl FnOnce(&mut Calls)) {
        update(&mut self.calls.lock().unwrap());
    }
}

fn scripted<T: Clone>(answer: Option<&Result<T, u16>>) -> Result<T, ClientError> {
    match answer {
        Some(Ok(value)) => Ok(value.clone()),
        Some(Err(status)) => Err(status_error(*status)),
        None => Err(status_error(404)),
    }
}

#[async_trait]
impl ActorPlatform for FakePlatform {
    async fn current_user(&self) -> Result<User, ClientError> {
        scripted(self.user.as_ref())
    }

    async fn list_actors(&self, scope: ActorScope) -> Result<Vec<Actor>, ClientError> {
        match scope {
            ActorScope::Owned => scripted(self.owned.as_ref()),
            ActorScope::Accessible => scripted(self.accessible.as_ref()),
        }
    }

    async fn get_actor(&self, actor_id: &str) -> Result<ActorDetail, ClientError> {
        self.record(|calls| calls.get_actor.push(actor_id.to_owned()));
        self.details
            .get(actor_id)
            .cloned()
            .ok_or_else(|| status_error(404))
    }

    async fn list_versions(
        &self,
        _actor_id: &str,
        limit: u32,
    ) -> Result<Vec<ActorVersion>, ClientError> {
        self.record(|calls| calls.list_versions += 1);
        Ok(self.versions.iter().take(limit as usize).cloned().collect())
    }

    async fn get_build(&self, build_id: &str) -> Result<Build, ClientError> {
        self.record(|calls| calls.get_build += 1);
        self.builds
            .get(build_id)
            .cloned()
            .ok_or_else(|| status_error(404))
    }

    async fn list_builds(&self, _actor_id: &str, limit: u32) -> Result<Vec<Build>, ClientError> {
        self.record(|calls| calls.list_builds += 1);
        Ok(self.build_listing.iter().take(limit as usize).cloned().collect())
    }

    async fn start_run(
        &self,
        _actor_id: &str,
        _input: &Record,
        _options: &RunRequestOptions,
    ) -> Result<Run, ClientError> {
        self.record(|calls| calls.start_run += 1);
        scripted(self.submit.as_ref())
    }

    async fn get_run(&self, _run_id: &str) -> Result<Run, ClientError> {
        self.record(|calls| calls.get_run += 1);
        let mut polls = self.polls.lock().unwrap();
        // The last scripted answer repeats forever.
        let answer = if polls.len() > 1 {
            polls.pop_front()
        } else {
            polls.front().cloned()
        };
        scripted(answer.as_ref())
    }

    async fn dataset_items(&self, _run_id: &str) -> Result<Vec<DatasetItem>, ClientError> {
        self.record(|calls| calls.dataset_items += 1);
        scripted(self.dataset.as_ref())
    }
}

/// Clock whose time only moves when something sleeps on it.
pub struct ManualClock {
    origin: Instant,
    elapsed_millis: AtomicU64,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            elapsed_millis: AtomicU64::new(0),
        }
    }

    pub fn elapsed(&self) -> Duration {
        Duration::from_millis(self.elapsed_millis.load(Ordering::SeqCst))
    }
}

#[async_trait]
impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.origin + self.elapsed()
    }

    async fn sleep(&self, duration: Duration) {
        let millis = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX);
        self.elapsed_millis.fetch_add(millis, Ordering::SeqCst);
    }
}
