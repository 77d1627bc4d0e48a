//! API response types for the platform.

use serde::{Deserialize, Serialize};

/// Wrapper around every single-object response.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DataEnvelope<T> {
    pub data: T,
}

/// One page of a listing endpoint.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PageList<T> {
    /// Items on this page
    pub items: Vec<T>,

    /// Total number of items across all pages
    #[serde(default)]
    pub total: u64,

    /// Number of items on this page
    #[serde(default)]
    pub count: u64,

    #[serde(default)]
    pub offset: u64,

    #[serde(default)]
    pub limit: u64,
}

/// Account a credential belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique user ID
    pub id: String,

    /// Username
    pub username: String,

    /// Contact email, only returned for the caller's own account
    #[serde(default)]
    pub email: Option<String>,
}
