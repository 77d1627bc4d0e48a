//! Common structs for actors, input schemas and runs shared across crates.

mod actor;
mod run;
mod schema;
mod value;

pub use actor::*;
pub use run::*;
pub use schema::*;
pub use value::*;
