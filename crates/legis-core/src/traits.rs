//! Core traits for legis-catalog abstractions.
//!
//! The loader talks to remote listings only through [`JsonSource`], so the
//! reqwest client can be swapped for a scripted source in tests.

use async_trait::async_trait;
use serde_json::Value as JsonValue;

use crate::error::Result;

/// A remote endpoint that answers GET requests with a JSON document.
#[async_trait]
pub trait JsonSource: Send + Sync {
    /// Fetch `{base_url}{endpoint}` with the given query parameters.
    ///
    /// Transport failures and non-success statuses are reported as
    /// `Error::Transport`; a body that is not JSON as `Error::Shape`.
    async fn get_json(
        &self,
        base_url: &str,
        endpoint: &str,
        params: &[(String, String)],
    ) -> Result<JsonValue>;
}
