//! CLI command implementations.
//!
//! | Module    | Commands handled                      |
//! |-----------|---------------------------------------|
//! | `auth`    | `Login`, `Logout`, `Whoami`           |
//! | `tenant`  | `Tenant`                              |
//! | `work`    | `Issues`, `Pages`, `Sprints`, `Search`|
//! | `board`   | `Board`                               |
//! | `config`  | `Config`                              |

pub mod auth;
pub mod board;
pub mod config;
pub mod tenant;
pub mod work;

use std::sync::Arc;

use anyhow::{Context, Result};
use planboard::ApiClient;
use planboard::config::PlanboardConfig;
use planboard::credentials::CredentialFileProvider;
use planboard::gateway::{Gateway, SessionCache, TenantStore};
use serde::Serialize;

pub use auth::{cmd_login, cmd_logout, cmd_whoami};
pub use board::cmd_board;
pub use config::cmd_config;
pub use tenant::cmd_tenant;
pub use work::{cmd_issues, cmd_pages, cmd_search, cmd_sprints};

/// Everything a command needs to talk to the backend.
pub struct Connection {
    pub client: ApiClient,
    pub tenants: Arc<TenantStore>,
}

pub fn credential_provider(config: &PlanboardConfig) -> CredentialFileProvider {
    CredentialFileProvider::new(config.credentials_file(), config.toml.auth.login_url.clone())
        .with_open_browser(config.toml.auth.open_browser)
}

/// Wire provider, tenant store, gateway and client from configuration.
pub fn connect(config: &PlanboardConfig) -> Result<Connection> {
    let provider = Arc::new(credential_provider(config));
    let tenants = Arc::new(TenantStore::load(&config.tenant_file())?);
    let sessions = SessionCache::with_ttl(provider, config.session_ttl());
    let gateway = Gateway::new(sessions, tenants.clone());
    let client = ApiClient::new(&config.api_settings(), gateway)
        .context("Failed to set up API client")?;

    Ok(Connection { client, tenants })
}

pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!(
        "{}",
        serde_json::to_string_pretty(value).context("Failed to serialize output")?
    );
    Ok(())
}
