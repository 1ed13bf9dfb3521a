//! User endpoints.

use planboard_common::User;

use super::ApiClient;
use crate::errors::GatewayResult;

/// The signed-in user.
pub async fn me(client: &ApiClient) -> GatewayResult<User> {
    client.get_json("/users/me").await
}

/// Members of the currently selected tenant.
pub async fn list(client: &ApiClient) -> GatewayResult<Vec<User>> {
    client.get_json("/users").await
}
