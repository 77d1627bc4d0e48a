//! Actor Bridge
//!
//! Lets a UI list the actors a user can run on a remote platform, obtain an
//! input schema for any of them (discovered or synthesized), and execute one
//! with a bounded wait for its results.

mod catalog;
mod error;
pub mod executor;
pub mod schema;
pub mod service;

#[cfg(test)]
mod testing;

pub use catalog::CatalogMerger;
pub use error::BridgeError;
pub use executor::{
    CancelSignal, Clock, Execution, PollOutcome, PollPolicy, RunExecutor, TokioClock,
    cancel_signal,
};
pub use schema::{Resolution, SchemaOverrides, SchemaResolver, SchemaSource};
pub use service::{
    ActorBridge, ActorsResponse, ExecutionResponse, HttpConnector, PlatformConnector,
    SchemaResponse, ValidationResponse,
};
