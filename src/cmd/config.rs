//! Configuration view and validation commands — `planboard config`.

use anyhow::Result;
use planboard::config::{PlanboardConfig, PlanboardToml};

use super::super::ConfigCommands;

pub fn cmd_config(config: &PlanboardConfig, command: Option<ConfigCommands>) -> Result<()> {
    let config_path = config.config_file();

    match command {
        None | Some(ConfigCommands::Show) => {
            println!();
            println!("Planboard Configuration");
            println!("=======================");
            println!();

            if config_path.exists() {
                println!("Config file: {}", config_path.display());
            } else {
                println!("No planboard.toml found at {}", config_path.display());
                println!("Using default configuration.");
            }
            println!();

            let toml = &config.toml;
            println!("[api]");
            if let Some(url) = &toml.api.base_url {
                println!("  base_url = \"{}\"", url);
            }
            println!("  timeout_secs = {}", toml.api.timeout_secs);
            println!();
            println!("[auth]");
            println!("  session_ttl_secs = {}", toml.auth.session_ttl_secs);
            println!("  login_url = \"{}\"", toml.auth.login_url);
            println!("  open_browser = {}", toml.auth.open_browser);
            println!();

            println!("Effective values (with env/CLI overrides):");
            println!("  base_url = \"{}\"", config.base_url());
            println!("  home = \"{}\"", config.home.display());
            println!();
        }
        Some(ConfigCommands::Validate) => {
            println!();
            println!("Validating configuration...");
            println!();

            if !config_path.exists() {
                println!("No planboard.toml found. Using defaults (valid).");
                return Ok(());
            }

            let warnings = config.validate();
            if warnings.is_empty() {
                println!("Configuration is valid.");
            } else {
                println!("Configuration warnings:");
                for warning in warnings {
                    println!("  - {}", warning);
                }
            }
            println!();
        }
        Some(ConfigCommands::Init) => {
            if config_path.exists() {
                println!("planboard.toml already exists at {}", config_path.display());
                println!("Delete it first if you want to recreate it.");
                return Ok(());
            }

            config.ensure_home()?;
            PlanboardToml::default().save(&config_path)?;

            println!("Created planboard.toml at {}", config_path.display());
            println!();
            println!("You can now customize:");
            println!("  - [api] base_url, timeout_secs");
            println!("  - [auth] session_ttl_secs, login_url, open_browser");
            println!();
        }
    }

    Ok(())
}
