//! Headless player that stands in for the browser front-end
//!
//! The server never spawns moles on its own schedule, so whoever plays has to
//! call `/spawn` at the difficulty's cadence and keep the round clock. The
//! driver does both, and swings at whatever mole it sees.

use crate::api::{ApiResult, GameClient};
use log::{debug, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use shared::{Badge, Difficulty, GameSnapshot, HitOutcome, HOLE_COUNT};
use std::time::Duration;
use tokio::time::{interval, sleep, Interval, MissedTickBehavior};

pub const DEFAULT_ROUND_SECS: u32 = 30;

/// Countdown for one round, in whole seconds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundClock {
    total_secs: u32,
    remaining_secs: u32,
    paused: bool,
}

impl RoundClock {
    pub fn new(total_secs: u32) -> Self {
        Self {
            total_secs,
            remaining_secs: total_secs,
            paused: false,
        }
    }

    /// Advances one second. Ticks are ignored while paused.
    /// Returns true once time has run out.
    pub fn tick(&mut self) -> bool {
        if !self.paused {
            self.remaining_secs = self.remaining_secs.saturating_sub(1);
        }
        self.is_expired()
    }

    pub fn is_expired(&self) -> bool {
        self.remaining_secs == 0
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn remaining_secs(&self) -> u32 {
        self.remaining_secs
    }

    pub fn elapsed_secs(&self) -> u32 {
        self.total_secs - self.remaining_secs
    }

    /// Value the server stores as `timeLeft`
    pub fn remaining_ms(&self) -> i64 {
        i64::from(self.remaining_secs) * 1000
    }

    pub fn pause(&mut self) -> i64 {
        self.paused = true;
        self.remaining_ms()
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundEnd {
    GameOver,
    TimeUp,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RoundSummary {
    pub end: RoundEnd,
    pub score: u32,
    pub hits: u32,
    pub misses: u32,
    pub badges: Vec<Badge>,
}

impl RoundSummary {
    pub fn from_snapshot(end: RoundEnd, snapshot: &GameSnapshot) -> Self {
        Self {
            end,
            score: snapshot.score,
            hits: snapshot.hits,
            misses: snapshot.misses,
            badges: snapshot.badge_set().earned().collect(),
        }
    }

    /// Fraction of swings that connected; 0 when nothing was swung at
    pub fn accuracy(&self) -> f64 {
        let swings = self.hits + self.misses;
        if swings == 0 {
            0.0
        } else {
            f64::from(self.hits) / f64::from(swings)
        }
    }

    pub fn badge_names(&self) -> Vec<&'static str> {
        self.badges.iter().map(|badge| badge.name()).collect()
    }
}

#[derive(Debug, Clone)]
pub struct DriverConfig {
    pub difficulty: Difficulty,
    /// Probability of swinging at the right hole, clamped to 0.0..=1.0
    pub accuracy: f64,
    pub round_secs: u32,
    pub reaction: Duration,
    /// Elapsed second at which to pause once; the first clock tick is second 1
    pub pause_at: Option<u32>,
    pub pause_for: Duration,
    pub seed: Option<u64>,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            difficulty: Difficulty::default(),
            accuracy: 0.8,
            round_secs: DEFAULT_ROUND_SECS,
            reaction: Duration::from_millis(250),
            pause_at: None,
            pause_for: Duration::from_secs(1),
            seed: None,
        }
    }
}

/// Picks the hole to swing at: the mole with probability `accuracy`,
/// otherwise some other hole.
pub fn choose_target<R: Rng>(rng: &mut R, mole: usize, accuracy: f64) -> usize {
    let accuracy = if accuracy.is_nan() {
        0.0
    } else {
        accuracy.clamp(0.0, 1.0)
    };

    if rng.gen_bool(accuracy) {
        mole
    } else {
        (mole + rng.gen_range(1..HOLE_COUNT)) % HOLE_COUNT
    }
}

fn skipping_interval(period: Duration) -> Interval {
    let mut timer = interval(period.max(Duration::from_millis(1)));
    timer.set_missed_tick_behavior(MissedTickBehavior::Skip);
    timer
}

pub struct Driver {
    client: GameClient,
    config: DriverConfig,
    rng: StdRng,
}

impl Driver {
    pub fn new(client: GameClient, config: DriverConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            client,
            config,
            rng,
        }
    }

    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    /// Plays one round from reset until game over or the clock runs out
    pub async fn play_round(&mut self) -> ApiResult<RoundSummary> {
        let difficulty = self.config.difficulty;
        self.client.reset().await?;
        self.client.set_difficulty(difficulty).await?;
        info!(
            "Round started on {} ({} s, spawn every {} ms)",
            difficulty,
            self.config.round_secs,
            difficulty.spawn_interval_ms()
        );

        let mut clock = RoundClock::new(self.config.round_secs);
        let mut paused_once = false;

        let mut spawn_timer = skipping_interval(difficulty.spawn_interval());
        let mut clock_timer = skipping_interval(Duration::from_secs(1));
        let mut reaction_timer = skipping_interval(self.config.reaction);

        // Skip the first ticks since they fire immediately
        spawn_timer.tick().await;
        clock_timer.tick().await;
        reaction_timer.tick().await;

        let end = loop {
            tokio::select! {
                _ = spawn_timer.tick() => {
                    let outcome = self.client.spawn().await?;
                    debug!("Spawn: {}", outcome.as_str());
                },
                _ = clock_timer.tick() => {
                    if clock.tick() {
                        break RoundEnd::TimeUp;
                    }
                    if !paused_once && self.config.pause_at == Some(clock.elapsed_secs()) {
                        paused_once = true;
                        self.take_break(&mut clock).await?;
                    }
                },
                _ = reaction_timer.tick() => {
                    let snapshot = self.client.game_state().await?;
                    if snapshot.is_over() {
                        break RoundEnd::GameOver;
                    }
                    let Some(mole) = snapshot.active_mole() else {
                        continue;
                    };

                    let target = choose_target(&mut self.rng, mole, self.config.accuracy);
                    match self.client.hit(target).await? {
                        HitOutcome::Hit => debug!("Hit mole at {}", target),
                        HitOutcome::Miss => debug!("Missed at {} (mole at {})", target, mole),
                        HitOutcome::GameOver => break RoundEnd::GameOver,
                    }
                },
            }
        };

        let snapshot = self.client.game_state().await?;
        let summary = RoundSummary::from_snapshot(end, &snapshot);
        info!(
            "Round over ({:?}): score {}, {} hits, {} misses, {:.0}% accuracy, badges: {:?}",
            summary.end,
            summary.score,
            summary.hits,
            summary.misses,
            summary.accuracy() * 100.0,
            summary.badge_names()
        );
        Ok(summary)
    }

    async fn take_break(&self, clock: &mut RoundClock) -> ApiResult<()> {
        let time_left_ms = clock.pause();
        self.client.pause(time_left_ms).await?;
        info!(
            "Paused with {} ms left for {:?}",
            time_left_ms, self.config.pause_for
        );

        sleep(self.config.pause_for).await;

        self.client.resume().await?;
        clock.resume();
        info!("Resumed");
        Ok(())
    }
}
