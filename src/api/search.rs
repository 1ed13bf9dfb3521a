//! Cross-entity search.

use planboard_common::{SearchKind, SearchResults};

use super::ApiClient;
use crate::errors::GatewayResult;

pub const DEFAULT_LIMIT: u32 = 20;

pub async fn query(
    client: &ApiClient,
    text: &str,
    kind: Option<SearchKind>,
    limit: Option<u32>,
) -> GatewayResult<SearchResults> {
    let mut params = vec![
        ("q", text.to_string()),
        ("limit", limit.unwrap_or(DEFAULT_LIMIT).to_string()),
    ];
    if let Some(kind) = kind {
        params.push(("kind", kind.as_str().to_string()));
    }
    client.get_json_with_query("/search", &params).await
}
