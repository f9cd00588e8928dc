use clap::{
    CommandFactory, Parser, Subcommand,
    builder::{
        Styles,
        styling::{AnsiColor, Effects},
    },
};
use clap_complete::{Shell, generate};
use tracing_subscriber::{
    EnvFilter, filter::LevelFilter, layer::SubscriberExt, util::SubscriberInitExt,
};

use wayfinder::{cli, config, error};

fn styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::White.on_default() | Effects::BOLD)
        .usage(AnsiColor::White.on_default() | Effects::BOLD)
        .literal(AnsiColor::BrightBlue.on_default())
        .placeholder(AnsiColor::BrightGreen.on_default())
}

#[derive(Parser, Debug, Clone)]
#[clap(
  version = env!("CARGO_PKG_VERSION"),
  name=env!("CARGO_PKG_NAME"),
  bin_name=env!("CARGO_PKG_NAME"),
  author=env!("CARGO_PKG_AUTHORS"),
  about=env!("CARGO_PKG_DESCRIPTION"),
  styles=styles(),
)]
struct Cli {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Run the HTTP server (login flow and scrape trigger)
    Serve,

    /// Scrape the library of the token's owner
    Scrape(ScrapeOptions),

    /// Show the progress record of a user
    Status(UserOptions),

    /// List the stored tracks of a user
    Tracks(TracksOptions),

    /// List saved albums and playlists
    Collections(ScrapeOptions),

    /// Exchange a refresh token for a new access token
    Refresh(RefreshOptions),

    /// Get shell completions
    Completions(CompletionsOption),
}

#[derive(Parser, Debug, Clone)]
pub struct ScrapeOptions {
    /// Spotify access token
    #[clap(long, env = "SPOTIFY_ACCESS_TOKEN", hide_env_values = true)]
    pub token: String,
}

#[derive(Parser, Debug, Clone)]
pub struct UserOptions {
    /// Spotify user id
    #[clap(long)]
    pub user: String,
}

#[derive(Parser, Debug, Clone)]
pub struct TracksOptions {
    /// Spotify user id
    #[clap(long)]
    pub user: String,

    /// Only tracks whose name or artist contains this
    #[clap(long)]
    pub search: Option<String>,

    /// Only tracks carrying a matching genre
    #[clap(long)]
    pub genre: Option<String>,
}

#[derive(Parser, Debug, Clone)]
pub struct RefreshOptions {
    #[clap(long)]
    pub refresh_token: String,
}

#[derive(Parser, Debug, Clone)]
pub struct CompletionsOption {
    shell: Shell,
}

fn init_tracing() {
    let _ = tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init();
}

#[tokio::main]
async fn main() {
    if let Err(e) = config::load_env().await {
        error!("Cannot load environment. Err: {}", e);
    }
    init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Command::Serve => cli::serve().await,
        Command::Scrape(opt) => cli::scrape(opt.token).await,
        Command::Status(opt) => cli::status(opt.user).await,
        Command::Tracks(opt) => cli::tracks(opt.user, opt.search, opt.genre).await,
        Command::Collections(opt) => cli::collections(opt.token).await,
        Command::Refresh(opt) => cli::refresh(opt.refresh_token).await,
        Command::Completions(opt) => {
            let mut cmd = Cli::command_for_update();
            let name = cmd.get_name().to_string();
            generate(opt.shell, &mut cmd, name, &mut std::io::stdout())
        }
    }
}
