//! Issue, page, sprint and search commands.

use anyhow::{Result, anyhow};
use console::style;
use planboard::api::{boards, issues, pages, search, sprints};
use planboard::config::PlanboardConfig;
use planboard_common::{Issue, IssueFilter, NewIssue, Priority, SearchKind, SprintState};

use super::super::{IssueCommands, PageCommands, SprintCommands};
use super::{connect, print_json};

fn print_issue_row(issue: &Issue) {
    println!(
        "{:<12} {:<14} {:<8} {}",
        style(&issue.key).cyan(),
        issue.status,
        issue.priority,
        issue.title
    );
}

pub async fn cmd_issues(config: &PlanboardConfig, command: IssueCommands, json: bool) -> Result<()> {
    let conn = connect(config)?;
    let client = &conn.client;

    match command {
        IssueCommands::List {
            status,
            sprint,
            assignee,
        } => {
            let filter = IssueFilter {
                status,
                sprint_id: sprint,
                assignee_id: assignee,
            };
            let list = issues::list(client, &filter).await?;
            if json {
                return print_json(&list);
            }
            if list.is_empty() {
                println!("No issues found.");
            }
            for issue in &list {
                print_issue_row(issue);
            }
        }
        IssueCommands::Show { issue } => {
            let issue = issues::get(client, &issue).await?;
            if json {
                return print_json(&issue);
            }
            println!("{} {}", style(&issue.key).cyan().bold(), style(&issue.title).bold());
            println!("Status:   {}", issue.status);
            println!("Priority: {}", issue.priority);
            println!("Updated:  {}", issue.updated_at.format("%Y-%m-%d %H:%M UTC"));
            if let Some(description) = &issue.description {
                println!();
                println!("{}", description);
            }
        }
        IssueCommands::Create {
            title,
            description,
            priority,
            status,
        } => {
            let priority = priority
                .map(|p| p.parse::<Priority>())
                .transpose()
                .map_err(|e| anyhow!(e))?;
            let new_issue = NewIssue {
                description,
                priority,
                status,
                ..NewIssue::titled(title)
            };
            let issue = issues::create(client, &new_issue).await?;
            if json {
                return print_json(&issue);
            }
            println!("Created {}", style(&issue.key).cyan());
        }
        IssueCommands::Move {
            issue,
            status,
            board,
        } => {
            let rules = match board {
                Some(board) => Some(boards::transition_rules(client, board).await?),
                None => None,
            };
            let issue = issues::transition(client, &issue, &status, rules.as_ref()).await?;
            if json {
                return print_json(&issue);
            }
            println!("{} is now {}", style(&issue.key).cyan(), issue.status);
        }
        IssueCommands::Delete { issue } => {
            issues::delete(client, &issue).await?;
            println!("Deleted {}", issue);
        }
    }

    Ok(())
}

pub async fn cmd_pages(config: &PlanboardConfig, command: PageCommands, json: bool) -> Result<()> {
    let conn = connect(config)?;

    match command {
        PageCommands::List => {
            let list = pages::list(&conn.client).await?;
            if json {
                return print_json(&list);
            }
            for page in &list {
                println!(
                    "{}  {}  {}",
                    page.id,
                    page.updated_at.format("%Y-%m-%d"),
                    page.title
                );
            }
        }
        PageCommands::Show { id } => {
            let page = pages::get(&conn.client, id).await?;
            if json {
                return print_json(&page);
            }
            println!("{}", style(&page.title).bold());
            println!();
            println!("{}", page.content.as_deref().unwrap_or(""));
        }
    }

    Ok(())
}

pub async fn cmd_sprints(
    config: &PlanboardConfig,
    command: SprintCommands,
    json: bool,
) -> Result<()> {
    let conn = connect(config)?;

    let sprint = match command {
        SprintCommands::List { state } => {
            let state = state
                .map(|s| s.parse::<SprintState>())
                .transpose()
                .map_err(|e| anyhow!(e))?;
            let list = sprints::list(&conn.client, state).await?;
            if json {
                return print_json(&list);
            }
            for sprint in &list {
                let dates = match (sprint.start_date, sprint.end_date) {
                    (Some(start), Some(end)) => format!("{} → {}", start, end),
                    _ => String::new(),
                };
                println!(
                    "{}  {:<10} {:<24} {}",
                    sprint.id, sprint.state, sprint.name, dates
                );
            }
            return Ok(());
        }
        SprintCommands::Start { id } => sprints::start(&conn.client, id).await?,
        SprintCommands::Complete { id } => sprints::complete(&conn.client, id).await?,
    };

    if json {
        return print_json(&sprint);
    }
    println!("{} is now {}", style(&sprint.name).bold(), sprint.state);
    Ok(())
}

pub async fn cmd_search(
    config: &PlanboardConfig,
    query: &str,
    kind: Option<&str>,
    limit: Option<u32>,
    json: bool,
) -> Result<()> {
    let kind = kind
        .map(|k| k.parse::<SearchKind>())
        .transpose()
        .map_err(|e| anyhow!(e))?;
    let conn = connect(config)?;
    let results = search::query(&conn.client, query, kind, limit).await?;

    if json {
        return print_json(&results);
    }
    if results.hits.is_empty() {
        println!("No results for '{}'.", query);
        return Ok(());
    }
    for hit in &results.hits {
        println!("{:<7} {}  {}", hit.kind, hit.id, style(&hit.title).bold());
        if let Some(snippet) = &hit.snippet {
            println!("        {}", style(snippet).dim());
        }
    }
    println!();
    println!("{} of {} results", results.hits.len(), results.total);
    Ok(())
}
