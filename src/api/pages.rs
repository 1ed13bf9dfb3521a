//! Knowledge-base pages.

use planboard_common::{NewPage, Page, PageUpdate};
use uuid::Uuid;

use super::ApiClient;
use crate::errors::GatewayResult;

pub async fn list(client: &ApiClient) -> GatewayResult<Vec<Page>> {
    client.get_json("/pages").await
}

pub async fn get(client: &ApiClient, id: Uuid) -> GatewayResult<Page> {
    client.get_json(&format!("/pages/{}", id)).await
}

pub async fn create(client: &ApiClient, page: &NewPage) -> GatewayResult<Page> {
    client.post_json("/pages", page).await
}

pub async fn update(client: &ApiClient, id: Uuid, update: &PageUpdate) -> GatewayResult<Page> {
    client.patch_json(&format!("/pages/{}", id), update).await
}

pub async fn delete(client: &ApiClient, id: Uuid) -> GatewayResult<()> {
    client.delete(&format!("/pages/{}", id)).await
}
