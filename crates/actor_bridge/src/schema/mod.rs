//! Input schema discovery for arbitrary actors.

mod overrides;
mod resolver;
pub mod synthesizer;

pub use overrides::SchemaOverrides;
pub use resolver::{Resolution, SchemaResolver, SchemaSource};
