use crate::cloud;
use colored::Colorize;
use stackkiller_cloud::StackStatus;
use stackkiller_config::Settings;
use std::process::ExitCode;

pub async fn handle(
    settings: &Settings,
    stack: &str,
    local: bool,
    json: bool,
) -> anyhow::Result<ExitCode> {
    let deleter = cloud::init_deleter(settings, local).await?;
    let status = deleter.status(stack).await?;

    if json {
        println!(
            "{}",
            serde_json::json!({ "stack": stack, "status": status })
        );
        return Ok(ExitCode::SUCCESS);
    }

    let label = match status {
        StackStatus::DeleteComplete | StackStatus::Nonexistent => status.to_string().green(),
        StackStatus::DeleteInProgress => status.to_string().yellow(),
        StackStatus::DeleteFailed => status.to_string().red().bold(),
        StackStatus::DifferentState => status.to_string().normal(),
    };
    println!("{}: {}", stack.cyan(), label);

    Ok(ExitCode::SUCCESS)
}
