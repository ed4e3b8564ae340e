mod cloud;
mod commands;

use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use stackkiller_cloud::{CancellationToken, StackError};
use std::path::PathBuf;
use std::process::ExitCode;

/// Exit code for a run interrupted with Ctrl-C
const EXIT_CANCELLED: u8 = 130;

#[derive(Parser)]
#[command(name = "stackkiller")]
#[command(
    about = "Deletes an AWS stack along with all the resources that are related to it.",
    long_about = None
)]
struct Cli {
    /// Print debug logs
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Settings file (default: STACKKILLER_CONFIG_PATH, ./stackkiller.yaml, ~/.config/stackkiller/config.yaml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Stack selection shared by every stack command
#[derive(Args, Debug, Clone)]
struct StackArgs {
    /// The name of the stack
    #[arg(short = 's', long = "stack", env = "STACKKILLER_STACK")]
    stack: String,

    /// Talk to the local endpoint (LocalStack) instead of AWS
    #[arg(short, long)]
    local: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Delete a stack and wait until it is gone
    Delete {
        #[command(flatten)]
        target: StackArgs,
        /// Retain resources that fail to delete and try again (default)
        #[arg(short = 'f', long = "force", overrides_with = "no_force")]
        force: bool,
        /// Make a single delete attempt and report the result
        #[arg(long = "no-force", overrides_with = "force")]
        no_force: bool,
        /// Maximum time to wait for the deletion, in seconds
        #[arg(long = "max-wait", value_name = "SECONDS")]
        max_wait: Option<u64>,
        /// Print the outcome as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the deletion status of a stack
    Status {
        #[command(flatten)]
        target: StackArgs,
        /// Print the status as JSON
        #[arg(long)]
        json: bool,
    },
    /// List the resources of a stack
    Resources {
        #[command(flatten)]
        target: StackArgs,
        /// Only show resources in DELETE_FAILED
        #[arg(long)]
        failed: bool,
        /// Print the resources as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show version information
    Version,
}

/// Force deletion unless `--no-force` was the last of the two flags
fn force_deletion(force: bool, no_force: bool) -> bool {
    force || !no_force
}

fn init_tracing(verbose: bool) {
    let default_directive = if verbose {
        "warn,stackkiller=debug,stackkiller_cloud=debug,stackkiller_cloud_aws=debug,stackkiller_config=debug"
    } else {
        "warn,stackkiller=info,stackkiller_cloud=info,stackkiller_cloud_aws=info"
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_directive));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // version needs neither settings nor logging
    if matches!(cli.command, Commands::Version) {
        println!("stackkiller {}", env!("CARGO_PKG_VERSION"));
        return ExitCode::SUCCESS;
    }

    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{} {:#}", "Error:".red().bold(), e);
            match e.downcast_ref::<StackError>() {
                Some(StackError::Cancelled { .. }) => ExitCode::from(EXIT_CANCELLED),
                _ => ExitCode::FAILURE,
            }
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let settings = stackkiller_config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Delete {
            target,
            force,
            no_force,
            max_wait,
            json,
        } => {
            let cancel = CancellationToken::new();
            let on_interrupt = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    tracing::warn!("Interrupted, stopping the wait");
                    on_interrupt.cancel();
                }
            });

            commands::delete::handle(
                &settings,
                &target.stack,
                target.local,
                force_deletion(force, no_force),
                max_wait,
                json,
                &cancel,
            )
            .await
        }
        Commands::Status { target, json } => {
            commands::status::handle(&settings, &target.stack, target.local, json).await
        }
        Commands::Resources {
            target,
            failed,
            json,
        } => {
            commands::resources::handle(&settings, &target.stack, target.local, failed, json)
                .await
        }
        Commands::Version => Ok(ExitCode::SUCCESS),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_delete(args: &[&str]) -> (String, bool, bool, Option<u64>) {
        let cli = Cli::try_parse_from(args).unwrap();
        match cli.command {
            Commands::Delete {
                target,
                force,
                no_force,
                max_wait,
                ..
            } => (
                target.stack,
                force_deletion(force, no_force),
                target.local,
                max_wait,
            ),
            _ => panic!("Expected delete command"),
        }
    }

    #[test]
    fn test_force_is_default() {
        let (stack, force, local, max_wait) =
            parse_delete(&["stackkiller", "delete", "--stack", "demo"]);
        assert_eq!(stack, "demo");
        assert!(force);
        assert!(!local);
        assert_eq!(max_wait, None);
    }

    #[test]
    fn test_no_force_flag() {
        let (_, force, _, _) = parse_delete(&["stackkiller", "delete", "-s", "demo", "--no-force"]);
        assert!(!force);
    }

    #[test]
    fn test_last_force_flag_wins() {
        let (_, force, _, _) =
            parse_delete(&["stackkiller", "delete", "-s", "demo", "--no-force", "--force"]);
        assert!(force);

        let (_, force, _, _) =
            parse_delete(&["stackkiller", "delete", "-s", "demo", "-f", "--no-force"]);
        assert!(!force);
    }

    #[test]
    fn test_local_and_max_wait() {
        let (_, _, local, max_wait) = parse_delete(&[
            "stackkiller",
            "delete",
            "-s",
            "demo",
            "--local",
            "--max-wait",
            "120",
        ]);
        assert!(local);
        assert_eq!(max_wait, Some(120));
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "stackkiller",
            "status",
            "-s",
            "demo",
            "-v",
            "--config",
            "custom.yaml",
        ])
        .unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.config, Some(PathBuf::from("custom.yaml")));
    }
}
