//! Tenant listing, creation and invitations.
//!
//! Listing and creation are usable before any tenant is selected; the
//! gateway simply leaves out the tenant header in that case.

use planboard_common::{InviteAcceptance, NewTenant, Tenant};

use super::{ApiClient, segment};
use crate::errors::GatewayResult;

/// Tenants the signed-in user belongs to.
pub async fn list(client: &ApiClient) -> GatewayResult<Vec<Tenant>> {
    client.get_json("/tenants").await
}

pub async fn create(client: &ApiClient, tenant: &NewTenant) -> GatewayResult<Tenant> {
    client.post_json("/tenants", tenant).await
}

/// Accept an invitation and join its tenant.
pub async fn accept_invite(client: &ApiClient, token: &str) -> GatewayResult<InviteAcceptance> {
    client
        .post_json(
            &format!("/tenants/invites/{}/accept", segment(token)?),
            &serde_json::json!({}),
        )
        .await
}
