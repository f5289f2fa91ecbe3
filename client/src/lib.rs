//! # Whack-a-Mole Driver Client
//!
//! A headless player for the whack-a-mole server. It takes over the jobs the
//! browser front-end normally does: keeping the round clock, calling `/spawn`
//! at the cadence of the selected difficulty, and swinging at moles.
//!
//! ## Module Organization
//!
//! ### API Module (`api`)
//! `GameClient`, a typed async wrapper over every server command. Replies
//! are parsed into the `shared` outcome enums and `GameSnapshot`.
//!
//! ### Driver Module (`driver`)
//! The round loop: a spawn timer, a one-second round clock that stops while
//! paused, and a reaction timer that polls the board and swings with a
//! configurable accuracy.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use client::api::GameClient;
//! use client::driver::{Driver, DriverConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = GameClient::new("http://127.0.0.1:8000");
//!     let mut driver = Driver::new(client, DriverConfig::default());
//!
//!     let summary = driver.play_round().await?;
//!     println!("Final score: {}", summary.score);
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod driver;
