use anyhow::Context;
use bookshelf_app::{app::App, modules};
use bookshelf_kernel::settings::Settings;
use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "bookshelf-cli", version, about = "Operate the bookshelf service")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP server until Ctrl-C
    Serve,
    /// Apply pending database migrations and exit
    Migrate,
    /// Print book suggestions for a user as JSON
    Suggest {
        /// Id of the user to compute suggestions for
        #[arg(long)]
        user: i64,
        /// Print every unfavorited book, ignoring `catalog.suggestion_limit`
        #[arg(long)]
        unfiltered: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let settings = Settings::load().with_context(|| "failed to load bookshelf settings")?;
    bookshelf_telemetry::init(&settings.telemetry)?;

    match cli.command {
        Command::Serve => App::prepare(settings).await?.serve().await,
        Command::Migrate => migrate(settings).await,
        Command::Suggest { user, unfiltered } => {
            let app = App::prepare(settings).await?;
            let engine = app.suggestion_engine();
            let books = if unfiltered {
                engine.unfavorited_books(user).await
            } else {
                engine.suggest_unfavorited_books(user).await
            }
            .with_context(|| format!("failed to compute suggestions for user {user}"))?;

            println!("{}", serde_json::to_string_pretty(&books)?);
            app.shutdown().await
        }
    }
}

/// Migrate without initializing modules, so a fresh database is enough.
async fn migrate(settings: Settings) -> anyhow::Result<()> {
    let pool = bookshelf_db::connect(&settings.database).await?;
    let registry = modules::build_registry(pool.clone(), &settings);
    let applied = bookshelf_db::migrate_registry(&pool, &registry).await?;
    tracing::info!(applied, "migrations complete");
    println!("applied {applied} migration(s)");
    pool.close().await;
    Ok(())
}
