use crate::cloud;
use colored::Colorize;
use stackkiller_cloud::StackResource;
use stackkiller_config::Settings;
use std::process::ExitCode;

pub async fn handle(
    settings: &Settings,
    stack: &str,
    local: bool,
    failed_only: bool,
    json: bool,
) -> anyhow::Result<ExitCode> {
    let deleter = cloud::init_deleter(settings, local).await?;
    let resources = if failed_only {
        deleter.failed_resources(stack).await?
    } else {
        deleter.list_stack_resources(stack).await?
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&resources)?);
        return Ok(ExitCode::SUCCESS);
    }

    let heading = if failed_only {
        format!("Resources in DELETE_FAILED ({}):", resources.len())
    } else {
        format!("Resources ({}):", resources.len())
    };
    println!("{}", heading.bold());

    if resources.is_empty() {
        println!("  {}", "(none)".dimmed());
    }
    for resource in &resources {
        print_resource(resource);
    }

    Ok(ExitCode::SUCCESS)
}

fn print_resource(resource: &StackResource) {
    let status = if resource.is_delete_failed() {
        resource.status.red().bold()
    } else {
        resource.status.normal()
    };

    println!(
        "  • {} [{}] {}",
        resource.physical_id.cyan(),
        status,
        resource.resource_type.as_deref().unwrap_or("-").dimmed()
    );
    if let Some(logical_id) = &resource.logical_id {
        println!("      logical id: {}", logical_id);
    }
}
