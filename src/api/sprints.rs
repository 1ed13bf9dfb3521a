//! Sprint planning endpoints.

use planboard_common::{NewSprint, Sprint, SprintState, SprintUpdate};
use uuid::Uuid;

use super::ApiClient;
use crate::errors::GatewayResult;

pub async fn list(client: &ApiClient, state: Option<SprintState>) -> GatewayResult<Vec<Sprint>> {
    match state {
        Some(state) => {
            client
                .get_json_with_query("/sprints", &[("state", state.as_str())])
                .await
        }
        None => client.get_json("/sprints").await,
    }
}

pub async fn create(client: &ApiClient, sprint: &NewSprint) -> GatewayResult<Sprint> {
    client.post_json("/sprints", sprint).await
}

pub async fn update(
    client: &ApiClient,
    id: Uuid,
    update: &SprintUpdate,
) -> GatewayResult<Sprint> {
    client.patch_json(&format!("/sprints/{}", id), update).await
}

pub async fn start(client: &ApiClient, id: Uuid) -> GatewayResult<Sprint> {
    set_state(client, id, SprintState::Active).await
}

pub async fn complete(client: &ApiClient, id: Uuid) -> GatewayResult<Sprint> {
    set_state(client, id, SprintState::Completed).await
}

async fn set_state(client: &ApiClient, id: Uuid, state: SprintState) -> GatewayResult<Sprint> {
    let update = SprintUpdate {
        state: Some(state),
        ..Default::default()
    };
    self::update(client, id, &update).await
}
