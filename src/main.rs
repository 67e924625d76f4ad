use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use graze::cli::App;
use graze::config::Config;
use graze::storage::Database;

#[derive(Parser, Debug)]
#[command(name = "graze", about = "A personal RSS aggregator", version)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Register a new user and log in as them
    Register { name: String },
    /// Switch the current user
    Login { name: String },
    /// List all registered users
    Users,
    /// Remove all users (and with them all feeds, follows, and posts)
    Reset,
    /// Register a feed and follow it
    Addfeed { name: String, url: String },
    /// List all registered feeds
    Feeds,
    /// Follow an already-registered feed by URL
    Follow { url: String },
    /// Stop following a feed by URL
    Unfollow { url: String },
    /// List the feeds the current user follows
    Following,
    /// Show the most recent posts from followed feeds
    Browse {
        #[arg(default_value_t = 2)]
        limit: i64,
    },
    /// Poll feeds on an interval (e.g. "30s", "5m") until interrupted
    Poll { interval: String },
}

/// Get the config directory path (~/.config/graze/)
fn config_dir() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME environment variable not set")?;
    Ok(PathBuf::from(home).join(".config").join("graze"))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    let config_dir = config_dir()?;
    let config_path = config_dir.join("config.toml");
    let config = Config::load(&config_path).context("unable to load the configuration")?;

    let db_path = config.database_path(&config_dir);
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent).context("unable to create the config directory")?;
    }
    let db_path_str = db_path
        .to_str()
        .context("invalid UTF-8 in the database path")?;
    let db = Database::open(db_path_str)
        .await
        .context("unable to open the database")?;

    let mut app = App {
        db,
        config,
        config_path,
    };

    match args.command {
        Command::Register { name } => app.register(&name).await,
        Command::Login { name } => app.login(&name).await,
        Command::Users => app.users().await,
        Command::Reset => app.reset().await,
        Command::Addfeed { name, url } => app.add_feed(&name, &url).await,
        Command::Feeds => app.feeds().await,
        Command::Follow { url } => app.follow(&url).await,
        Command::Unfollow { url } => app.unfollow(&url).await,
        Command::Following => app.following().await,
        Command::Browse { limit } => app.browse(limit).await,
        Command::Poll { interval } => app.poll(&interval).await,
    }
}
