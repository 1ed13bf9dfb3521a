//! Issue tracking endpoints.

use planboard_common::{Issue, IssueFilter, IssueUpdate, NewIssue, TransitionRules};

use super::{ApiClient, segment};
use crate::errors::{GatewayError, GatewayResult};

/// List issues in the current tenant, optionally filtered.
pub async fn list(client: &ApiClient, filter: &IssueFilter) -> GatewayResult<Vec<Issue>> {
    client
        .get_json_with_query("/issues", &filter.to_query())
        .await
}

/// Fetch one issue by id or key (`PLAT-42`).
pub async fn get(client: &ApiClient, issue_ref: &str) -> GatewayResult<Issue> {
    client
        .get_json(&format!("/issues/{}", segment(issue_ref)?))
        .await
}

pub async fn create(client: &ApiClient, issue: &NewIssue) -> GatewayResult<Issue> {
    client.post_json("/issues", issue).await
}

pub async fn update(
    client: &ApiClient,
    issue_ref: &str,
    update: &IssueUpdate,
) -> GatewayResult<Issue> {
    client
        .patch_json(&format!("/issues/{}", segment(issue_ref)?), update)
        .await
}

pub async fn delete(client: &ApiClient, issue_ref: &str) -> GatewayResult<()> {
    client
        .delete(&format!("/issues/{}", segment(issue_ref)?))
        .await
}

/// Move an issue to `status`.
///
/// When `rules` is given the move is checked client-side first, the way the
/// kanban view refuses a drop onto a column the board does not allow.
pub async fn transition(
    client: &ApiClient,
    issue_ref: &str,
    status: &str,
    rules: Option<&TransitionRules>,
) -> GatewayResult<Issue> {
    if let Some(rules) = rules {
        let current = get(client, issue_ref).await?;
        if current.status == status {
            return Ok(current);
        }
        if !rules.is_allowed(&current.status, status) {
            return Err(GatewayError::TransitionNotAllowed {
                issue: current.key,
                from: current.status,
                to: status.to_string(),
            });
        }
    }

    let update = IssueUpdate {
        status: Some(status.to_string()),
        ..Default::default()
    };
    self::update(client, issue_ref, &update).await
}
