use anyhow::Context;
use clap::{Parser, Subcommand};

use bookit_kernel::settings::Settings;

/// BookIT books service
#[derive(Debug, Parser)]
#[command(name = "bookit-cli", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Create the database and apply migrations, then exit
    Setup,
    /// Run the HTTP server
    Serve,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let settings = Settings::load().with_context(|| "failed to load BookIT settings")?;
    let _log_guard = bookit_telemetry::init(&settings.telemetry)?;

    tracing::info!(env = ?settings.environment, command = ?cli.command, "bookit-cli starting");

    match cli.command {
        Command::Setup => {
            let applied = bookit_app::setup(&settings).await?;
            println!(
                "database '{}' ready ({} migrations applied)",
                settings.database.path, applied
            );
            Ok(())
        }
        Command::Serve => bookit_app::serve(settings).await,
    }
}
