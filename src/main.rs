use clap::{Parser, Subcommand};
use movie_scout::{app, cli, config::Config};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "movie-scout")]
#[command(about = "Find movies you'll enjoy without the hassle", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the JSON API (default)
    Serve,
    /// Search interactively from the terminal
    Browse,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so browse output on stdout stays clean
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "movie_scout=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();
    let config = Config::from_env()?;

    match args.command.unwrap_or(Command::Serve) {
        Command::Serve => app::serve(config).await,
        Command::Browse => cli::browse::run(config).await,
    }
}
