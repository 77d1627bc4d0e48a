//! HTTP implementation of the platform endpoints.

pub mod client;
pub mod models;
