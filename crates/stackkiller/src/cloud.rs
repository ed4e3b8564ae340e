use stackkiller_cloud::{DeleteSettings, StackDeleter};
use stackkiller_cloud_aws::{CloudFormationClient, Target};
use stackkiller_config::Settings;
use std::sync::Arc;

/// Endpoint selection from `--local`
pub fn target(settings: &Settings, local: bool) -> Target {
    if local {
        Target::local(settings.local.endpoint_url.clone())
    } else {
        Target::Production
    }
}

pub fn delete_settings(settings: &Settings) -> DeleteSettings {
    DeleteSettings {
        poll_interval: settings.poll_interval(),
        max_delete_attempts: settings.retry.max_delete_attempts,
        max_pages: settings.listing.max_pages,
    }
}

/// Connect to CloudFormation and wrap the client in a deleter
pub async fn init_deleter(
    settings: &Settings,
    local: bool,
) -> anyhow::Result<StackDeleter<CloudFormationClient>> {
    let target = target(settings, local);
    tracing::debug!("Connecting to {}", target);

    let client = CloudFormationClient::connect(&target, settings.region.clone()).await?;
    Ok(StackDeleter::new(Arc::new(client), delete_settings(settings)))
}
