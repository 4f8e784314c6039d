use anyhow::Context;
use bookshelf_kernel::settings::Settings;
use clap::{Parser, Subcommand};

/// Book catalog service
#[derive(Debug, Parser)]
#[command(name = "bookshelf", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP service
    Serve,
    /// Create the book table if it does not exist, then exit
    InitDb,
    /// Print the resolved settings
    Config,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let settings = Settings::load().with_context(|| "failed to load bookshelf settings")?;

    match cli.command {
        Command::Serve => {
            bookshelf_telemetry::init(&settings.telemetry)?;
            bookshelf_app::run(settings).await
        }
        Command::InitDb => {
            bookshelf_telemetry::init(&settings.telemetry)?;
            let (db, registry) = bookshelf_app::bootstrap(&settings).await?;
            tracing::info!(
                migrations = registry.collect_migrations().len(),
                url = %settings.database.url,
                "schema ready"
            );
            db.close().await;
            Ok(())
        }
        Command::Config => {
            println!("{settings:#?}");
            Ok(())
        }
    }
}
