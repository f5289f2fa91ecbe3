//! # Whack-a-Mole Server Library
//!
//! Authoritative server for a single-player whack-a-mole game. It keeps one
//! session in memory, answers the browser's command requests over HTTP and
//! serves the front-end's static files.
//!
//! ## Core Responsibilities
//!
//! ### Session State
//! One mole is visible at a time among nine holes. The server tracks score,
//! hits, misses, the running combo, difficulty, pause state and badges, and
//! decides whether each swing is a hit, a miss or the end of the round.
//!
//! ### Externally Timed Spawning
//! The server never schedules anything on its own. The front-end calls
//! `/spawn` at the cadence of the chosen difficulty and the server refuses
//! while paused or once the round is over.
//!
//! ### Serialized Access
//! Requests are handled concurrently, but every command goes through a
//! channel to a single game loop task that owns the state. Each transition
//! is therefore atomic with respect to every other one.
//!
//! ## Module Organization
//!
//! ### Game Module (`game`)
//! The `GameState` record and its transitions: spawn, reset, hit resolution,
//! difficulty, pause/resume and the guarded timer spawn.
//!
//! ### Router Module (`router`)
//! Turns a request path and form body into a `Command`, and applies a
//! `Command` to the state. Malformed input falls back softly instead of
//! failing.
//!
//! ### Network Module (`network`)
//! The axum router: one route per game command, accepting any method, with
//! the web root served by `tower_http`'s `ServeDir` as the fallback. Also
//! owns the listener and the game loop.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use server::network::{Server, ServerConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
//!     let server = Server::bind(ServerConfig {
//!         addr: "127.0.0.1:8000".to_string(),
//!         ..ServerConfig::default()
//!     })
//!     .await?;
//!
//!     // Runs until Ctrl+C
//!     server.run().await?;
//!     Ok(())
//! }
//! ```

pub mod game;
pub mod network;
pub mod router;
mod utils;
