use clap::Parser;
use client::api::GameClient;
use client::driver::{Driver, DriverConfig, DEFAULT_ROUND_SECS};
use log::info;
use shared::Difficulty;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Server origin to play against
    #[arg(short = 's', long, default_value = "http://127.0.0.1:8000")]
    server: String,

    /// Difficulty: easy, medium or hard
    #[arg(short = 'd', long, default_value = "medium")]
    difficulty: Difficulty,

    /// Chance of swinging at the right hole (0.0 - 1.0)
    #[arg(short = 'a', long, default_value = "0.8", value_parser = parse_accuracy)]
    accuracy: f64,

    /// Round length in seconds
    #[arg(short = 'r', long, default_value_t = DEFAULT_ROUND_SECS)]
    round_secs: u32,

    /// Delay between swings in milliseconds
    #[arg(long, default_value = "250")]
    reaction_ms: u64,

    /// Pause once this many seconds into the round (1 or more)
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pause_at: Option<u32>,

    /// How long the pause lasts in milliseconds
    #[arg(long, default_value = "1000")]
    pause_for_ms: u64,

    /// Seed for the swing accuracy rolls
    #[arg(long)]
    seed: Option<u64>,
}

fn parse_accuracy(value: &str) -> Result<f64, String> {
    let accuracy: f64 = value
        .parse()
        .map_err(|_| format!("'{}' is not a number", value))?;
    if (0.0..=1.0).contains(&accuracy) {
        Ok(accuracy)
    } else {
        Err(format!("accuracy must be between 0.0 and 1.0, got {}", accuracy))
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    if std::env::var("RUST_LOG").is_err() {
        eprintln!("Set RUST_LOG=info for detailed logging");
    }

    let args = Args::parse();

    let config = DriverConfig {
        difficulty: args.difficulty,
        accuracy: args.accuracy,
        round_secs: args.round_secs,
        reaction: Duration::from_millis(args.reaction_ms),
        pause_at: args.pause_at,
        pause_for: Duration::from_millis(args.pause_for_ms),
        seed: args.seed,
    };

    info!("Starting driver...");
    info!("Playing against: {}", args.server);

    let mut driver = Driver::new(GameClient::new(&args.server), config);
    info!(
        "Accuracy {:.0}%, reaction {:?}",
        driver.config().accuracy * 100.0,
        driver.config().reaction
    );

    let summary = driver.play_round().await?;

    println!(
        "Final score: {} ({} hits, {} misses)",
        summary.score, summary.hits, summary.misses
    );
    if !summary.badges.is_empty() {
        println!("Badges earned: {}", summary.badge_names().join(", "));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["client"]).unwrap();
        assert_eq!(args.server, "http://127.0.0.1:8000");
        assert_eq!(args.difficulty, Difficulty::Medium);
        assert_eq!(args.round_secs, DEFAULT_ROUND_SECS);
        assert!(args.pause_at.is_none());
    }

    #[test]
    fn test_pause_at_starts_from_one() {
        assert!(Args::try_parse_from(["client", "--pause-at", "0"]).is_err());

        let args = Args::try_parse_from(["client", "--pause-at", "1"]).unwrap();
        assert_eq!(args.pause_at, Some(1));
    }

    #[test]
    fn test_accuracy_range() {
        assert!(parse_accuracy("1.5").is_err());
        assert!(parse_accuracy("abc").is_err());
        assert_eq!(parse_accuracy("0.25"), Ok(0.25));
    }
}
