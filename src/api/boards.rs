//! Boards and their transition rules.

use planboard_common::{Board, TransitionRules};
use uuid::Uuid;

use super::ApiClient;
use crate::errors::GatewayResult;

pub async fn list(client: &ApiClient) -> GatewayResult<Vec<Board>> {
    client.get_json("/boards").await
}

pub async fn get(client: &ApiClient, id: Uuid) -> GatewayResult<Board> {
    client.get_json(&format!("/boards/{}", id)).await
}

pub async fn transition_rules(client: &ApiClient, id: Uuid) -> GatewayResult<TransitionRules> {
    client
        .get_json(&format!("/boards/{}/transitions", id))
        .await
}

/// Replace the board's rules with `rules`; returns what the backend stored.
pub async fn save_transition_rules(
    client: &ApiClient,
    id: Uuid,
    rules: &TransitionRules,
) -> GatewayResult<TransitionRules> {
    client
        .put_json(&format!("/boards/{}/transitions", id), rules)
        .await
}
