//! Board transition-rule commands — `planboard board`.

use anyhow::Result;
use console::style;
use planboard::ApiClient;
use planboard::api::boards;
use planboard::config::PlanboardConfig;
use planboard_common::TransitionRules;
use uuid::Uuid;

use super::super::BoardCommands;
use super::{connect, print_json};

pub async fn cmd_board(config: &PlanboardConfig, command: BoardCommands, json: bool) -> Result<()> {
    let conn = connect(config)?;
    let client = &conn.client;

    match command {
        BoardCommands::List => {
            let list = boards::list(client).await?;
            if json {
                return print_json(&list);
            }
            for board in &list {
                println!(
                    "{}  {}  [{}]",
                    board.id,
                    style(&board.name).bold(),
                    board.statuses.join(" → ")
                );
            }
        }
        BoardCommands::Rules { board } => {
            let rules = boards::transition_rules(client, board).await?;
            if json {
                return print_json(&rules);
            }
            print_rules(&rules);
        }
        BoardCommands::Allow { board, from, to } => {
            edit_rules(client, board, json, |rules| {
                if !rules.allow(&from, &to)? {
                    println!("{} -> {} is already allowed", from, to);
                    return Ok(false);
                }
                Ok(true)
            })
            .await?;
        }
        BoardCommands::Disallow { board, from, to } => {
            edit_rules(client, board, json, |rules| {
                if !rules.disallow(&from, &to) {
                    println!("{} -> {} was not allowed", from, to);
                    return Ok(false);
                }
                Ok(true)
            })
            .await?;
        }
    }

    Ok(())
}

/// Load the stored rules, apply `edit`, warn about unknown statuses and save.
///
/// `edit` returns whether it changed anything; nothing is saved otherwise.
async fn edit_rules<F>(client: &ApiClient, board_id: Uuid, json: bool, edit: F) -> Result<()>
where
    F: FnOnce(&mut TransitionRules) -> Result<bool>,
{
    let board = boards::get(client, board_id).await?;
    let mut rules = boards::transition_rules(client, board_id).await?;
    if !edit(&mut rules)? {
        return Ok(());
    }

    for warning in rules.validate(&board.statuses) {
        eprintln!("{} {}", style("warning:").yellow(), warning);
    }

    let saved = boards::save_transition_rules(client, board_id, &rules).await?;
    if json {
        return print_json(&saved);
    }
    print_rules(&saved);
    Ok(())
}

fn print_rules(rules: &TransitionRules) {
    if rules.is_empty() {
        println!("No transitions allowed.");
        return;
    }
    for (from, to) in rules.iter() {
        println!("{} -> {}", from, to);
    }
}
