use clap::Parser;
use log::info;
use server::network::{Server, ServerConfig};
use shared::DEFAULT_MAX_MISSES;
use std::path::PathBuf;

/// Main-method of the application.
/// Parses command-line arguments, then binds the HTTP listener and serves the game.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // Command line arguments
    #[derive(Parser, Debug)]
    #[clap(author, version, about)]
    struct Args {
        /// Server IP address to bind to
        #[clap(short = 'H', long, default_value = "0.0.0.0")]
        host: String,
        /// Server port to listen on
        #[clap(short, long, default_value = "8000")]
        port: u16,
        /// Directory the web front-end is served from
        #[clap(short, long, default_value = "web")]
        web_root: PathBuf,
        /// Misses allowed before the round ends
        #[clap(short, long, default_value_t = DEFAULT_MAX_MISSES, value_parser = clap::value_parser!(u32).range(1..))]
        max_misses: u32,
        /// Seed for the mole position generator
        #[clap(short, long)]
        seed: Option<u64>,
    }

    env_logger::init();

    if std::env::var("RUST_LOG").is_err() {
        eprintln!("Set RUST_LOG=info for detailed logging");
    }

    // Parse command line arguments
    let args = Args::parse();

    let config = ServerConfig {
        addr: format!("{}:{}", args.host, args.port),
        web_root: args.web_root,
        max_misses: args.max_misses,
        seed: args.seed,
    };

    info!("Serving static files from {}", config.web_root.display());
    if let Some(seed) = config.seed {
        info!("Mole positions seeded with {}", seed);
    }

    let server = Server::bind(config).await?;
    server.run().await?;

    Ok(())
}
