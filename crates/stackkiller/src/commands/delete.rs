use crate::cloud;
use colored::Colorize;
use stackkiller_cloud::{CancellationToken, DeletionOutcome, StackStatus};
use stackkiller_config::Settings;
use std::process::ExitCode;
use std::time::Duration;

pub async fn handle(
    settings: &Settings,
    stack: &str,
    local: bool,
    force: bool,
    max_wait: Option<u64>,
    json: bool,
    cancel: &CancellationToken,
) -> anyhow::Result<ExitCode> {
    let max_wait = max_wait
        .map(Duration::from_secs)
        .unwrap_or_else(|| settings.max_wait());

    if !json {
        println!("{}", format!("Deleting stack {}...", stack).yellow());
        println!(
            "  target: {}  force: {}  max wait: {}s",
            cloud::target(settings, local).to_string().cyan(),
            force,
            max_wait.as_secs()
        );
    }

    let deleter = cloud::init_deleter(settings, local).await?;
    let outcome = deleter.delete_stack(stack, force, max_wait, cancel).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        print_outcome(&outcome, force);
    }

    Ok(if outcome.is_deleted() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn print_outcome(outcome: &DeletionOutcome, force: bool) {
    println!();
    if !outcome.retained.is_empty() {
        println!(
            "{}",
            format!("Retained resources ({}):", outcome.retained.len()).bold()
        );
        for id in &outcome.retained {
            println!("  • {}", id.cyan());
        }
        println!();
    }

    match outcome.status {
        StackStatus::DeleteComplete => {
            println!(
                "{}",
                format!("✓ Stack {} deleted successfully.", outcome.stack)
                    .green()
                    .bold()
            );
        }
        StackStatus::Nonexistent => {
            println!(
                "{}",
                format!("✓ Stack {} does not exist.", outcome.stack)
                    .green()
                    .bold()
            );
        }
        StackStatus::DeleteInProgress => {
            println!(
                "{}",
                format!(
                    "⚠ Stack {} is still being deleted. Check again later.",
                    outcome.stack
                )
                .yellow()
            );
        }
        StackStatus::DeleteFailed => {
            println!(
                "{}",
                format!(
                    "✗ Stack {} could not be deleted ({}).",
                    outcome.stack, outcome.status
                )
                .red()
                .bold()
            );
            if force {
                println!(
                    "{}",
                    "  Inspect the blocking resources with: stackkiller resources --failed".dimmed()
                );
            } else {
                println!(
                    "{}",
                    "  Retry with --force to retain the resources that fail to delete".dimmed()
                );
            }
        }
        StackStatus::DifferentState => {
            println!(
                "{}",
                format!(
                    "✗ Stack {} is not in a deletable state ({}).",
                    outcome.stack, outcome.status
                )
                .red()
            );
        }
    }
}
