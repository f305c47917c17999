use anyhow::Context;
use clap::{Parser, Subcommand};
use shelf_kernel::settings::Settings;

/// Book catalogue service
#[derive(Debug, Parser)]
#[command(name = "shelf-cli", version, about)]
struct Cli {
    /// Override the database URL from configuration
    #[arg(long, global = true)]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP server
    Serve {
        /// Override the listen port
        #[arg(long)]
        port: Option<u16>,
    },
    /// Create the database and the books table, then exit
    InitDb,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut settings = Settings::load().with_context(|| "failed to load shelf settings")?;
    if let Some(url) = cli.database_url {
        settings.database.url = url;
    }

    shelf_telemetry::init(&settings.telemetry)?;
    tracing::info!(env = ?settings.environment, command = ?cli.command, "shelf-cli starting");

    match cli.command {
        Command::Serve { port } => {
            if let Some(port) = port {
                settings.server.port = port;
            }
            shelf_app::serve(settings).await
        }
        Command::InitDb => shelf_app::init_database(settings).await,
    }
}
