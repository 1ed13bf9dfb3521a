//! Sign-in state commands: `planboard login`, `logout`, `whoami`.

use anyhow::{Context, Result};
use console::style;
use planboard::api::users;
use planboard::config::PlanboardConfig;
use planboard::gateway::Session;

use super::{connect, credential_provider, print_json};

pub fn cmd_login(config: &PlanboardConfig, token: &str, subject: Option<&str>) -> Result<()> {
    let token = token.trim();
    if token.is_empty() {
        anyhow::bail!("Token must not be empty");
    }
    config.ensure_home()?;

    let mut session = Session::new(token);
    if let Some(subject) = subject {
        session = session.with_subject(subject);
    }
    let provider = credential_provider(config);
    provider.store(&session)?;

    println!(
        "Stored credentials at {}",
        style(provider.path().display()).cyan()
    );
    Ok(())
}

pub async fn cmd_logout(config: &PlanboardConfig) -> Result<()> {
    let conn = connect(config)?;
    conn.client
        .gateway()
        .logout()
        .await
        .context("Failed to sign out")?;
    Ok(())
}

pub async fn cmd_whoami(config: &PlanboardConfig, json: bool) -> Result<()> {
    let conn = connect(config)?;
    let user = users::me(&conn.client).await?;

    if json {
        return print_json(&user);
    }
    println!("{} <{}>", style(user.label()).bold(), user.email);
    match conn.tenants.current() {
        Some(tenant) => println!("Tenant: {}", tenant),
        None => println!("Tenant: {}", style("none selected").dim()),
    }
    Ok(())
}
