//! Tenant selection commands — `planboard tenant`.

use anyhow::Result;
use console::style;
use planboard::api::tenants;
use planboard::config::PlanboardConfig;
use planboard::gateway::TenantStore;
use planboard_common::NewTenant;

use super::super::TenantCommands;
use super::{connect, print_json};

pub async fn cmd_tenant(
    config: &PlanboardConfig,
    command: TenantCommands,
    json: bool,
) -> Result<()> {
    match command {
        TenantCommands::Show => {
            let store = TenantStore::load(&config.tenant_file())?;
            match store.current() {
                Some(id) => println!("{}", id),
                None => println!("No tenant selected"),
            }
        }
        TenantCommands::Use { tenant_id } => {
            config.ensure_home()?;
            let store = TenantStore::load(&config.tenant_file())?;
            store.select(tenant_id.trim())?;
            println!("Selected tenant {}", style(tenant_id.trim()).cyan());
        }
        TenantCommands::Clear => {
            let store = TenantStore::load(&config.tenant_file())?;
            store.clear()?;
            println!("Cleared tenant selection");
        }
        TenantCommands::List => {
            let conn = connect(config)?;
            let list = tenants::list(&conn.client).await?;
            if json {
                return print_json(&list);
            }
            if list.is_empty() {
                println!("You are not a member of any tenant yet.");
                return Ok(());
            }
            let current = conn.tenants.current();
            for tenant in &list {
                let id = tenant.id.to_string();
                let marker = if current.as_deref() == Some(id.as_str()) {
                    "*"
                } else {
                    " "
                };
                println!(
                    "{} {}  {} ({}){}",
                    marker,
                    id,
                    style(&tenant.name).bold(),
                    tenant.slug,
                    tenant
                        .role
                        .as_deref()
                        .map(|r| format!(" [{}]", r))
                        .unwrap_or_default()
                );
            }
        }
        TenantCommands::Create { name, slug } => {
            let conn = connect(config)?;
            let tenant = tenants::create(&conn.client, &NewTenant { name, slug }).await?;
            if json {
                return print_json(&tenant);
            }
            println!("Created tenant {} ({})", style(&tenant.name).bold(), tenant.id);
        }
        TenantCommands::Accept { token } => {
            let conn = connect(config)?;
            // On failure the previous selection stays in place.
            let accepted = tenants::accept_invite(&conn.client, &token).await?;
            conn.tenants.select(accepted.tenant.id.to_string())?;
            if json {
                return print_json(&accepted);
            }
            println!(
                "Joined {} as {}; it is now the selected tenant",
                style(&accepted.tenant.name).bold(),
                accepted.role
            );
        }
    }

    Ok(())
}
