//! Authoritative whack-a-mole session state
//!
//! A single `GameState` lives for the whole process. Every transition is a
//! synchronous mutation; the network layer makes sure only one runs at a time.

use crate::utils::get_timestamp;
use log::{debug, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use shared::{
    Badge, BadgeSet, Difficulty, GameSnapshot, HitOutcome, SpawnOutcome, COMBO_MASTER_THRESHOLD,
    DEFAULT_PAUSED_TIME_LEFT_MS, HIT_REWARD, HOLE_COUNT, NO_MOLE,
};

#[derive(Debug, Clone)]
pub struct GameState {
    active_mole: Option<usize>,
    score: u32,
    hits: u32,
    misses: u32,
    max_misses: u32,
    combo_count: u32,
    difficulty: Difficulty,
    is_paused: bool,
    paused_time_left: i64,
    badges: BadgeSet,
    is_first_play: bool,
    // Never raised by any transition; kept so a future high-score rule has somewhere to live.
    best_score: u32,
    round_started_at: Option<u64>,
    rng: StdRng,
}

impl GameState {
    /// Creates the session and puts the first mole up.
    ///
    /// `seed` pins the mole sequence; without it the generator is seeded from
    /// OS entropy. A `max_misses` of zero is raised to one.
    pub fn new(max_misses: u32, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let mut state = Self {
            active_mole: None,
            score: 0,
            hits: 0,
            misses: 0,
            max_misses: max_misses.max(1),
            combo_count: 0,
            difficulty: Difficulty::default(),
            is_paused: false,
            paused_time_left: DEFAULT_PAUSED_TIME_LEFT_MS,
            badges: BadgeSet::new(),
            is_first_play: true,
            best_score: 0,
            round_started_at: None,
            rng,
        };
        state.spawn_mole();
        state
    }

    pub fn active_mole(&self) -> Option<usize> {
        self.active_mole
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn hits(&self) -> u32 {
        self.hits
    }

    pub fn misses(&self) -> u32 {
        self.misses
    }

    pub fn max_misses(&self) -> u32 {
        self.max_misses
    }

    pub fn combo_count(&self) -> u32 {
        self.combo_count
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn is_paused(&self) -> bool {
        self.is_paused
    }

    pub fn paused_time_left(&self) -> i64 {
        self.paused_time_left
    }

    pub fn badges(&self) -> BadgeSet {
        self.badges
    }

    pub fn is_first_play(&self) -> bool {
        self.is_first_play
    }

    pub fn best_score(&self) -> u32 {
        self.best_score
    }

    pub fn round_started_at(&self) -> Option<u64> {
        self.round_started_at
    }

    pub fn is_round_over(&self) -> bool {
        self.misses >= self.max_misses
    }

    /// Moves the single mole to a uniformly random hole
    pub fn spawn_mole(&mut self) -> usize {
        let hole = self.rng.gen_range(0..HOLE_COUNT);
        self.active_mole = Some(hole);
        debug!("Mole up at hole {}", hole);
        hole
    }

    /// Starts a new round in place.
    ///
    /// Everything except difficulty, the miss budget and the first-play
    /// bookkeeping goes back to its starting value. The starter badge is
    /// handed out on the first reset of the process only.
    pub fn reset(&mut self) {
        self.active_mole = None;
        self.score = 0;
        self.hits = 0;
        self.misses = 0;
        self.combo_count = 0;
        self.is_paused = false;
        self.paused_time_left = DEFAULT_PAUSED_TIME_LEFT_MS;
        self.round_started_at = Some(get_timestamp());
        self.badges.clear();

        if self.is_first_play {
            self.badges.award(Badge::StarterBadge);
            self.is_first_play = false;
            info!("First round of the session, starter badge awarded");
        }

        self.spawn_mole();
        info!(
            "Round reset (difficulty {}, best score {})",
            self.difficulty, self.best_score
        );
    }

    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            moles: vec![self.active_mole.map_or(NO_MOLE, |hole| hole as i64)],
            score: self.score,
            hits: self.hits,
            misses: self.misses,
            paused: u8::from(self.is_paused),
            difficulty: self.difficulty.spawn_interval_ms(),
            max_misses: self.max_misses,
            combo: self.combo_count,
            badges: self.badges.to_flags(),
        }
    }

    /// Resolves a swing at `hole`.
    ///
    /// `None` stands for a hole the router could not parse and always counts
    /// as a miss, as does any index outside the board. Pausing does not block
    /// this; callers are expected to hold hits back while paused.
    pub fn resolve_hit(&mut self, hole: Option<i64>) -> HitOutcome {
        if self.is_round_over() {
            debug!("Hit at {:?} ignored, round is over", hole);
            return HitOutcome::GameOver;
        }

        let on_target = matches!(
            (self.active_mole, hole),
            (Some(mole), Some(hole)) if mole as i64 == hole
        );

        if on_target {
            self.score += HIT_REWARD;
            self.hits += 1;
            self.combo_count += 1;
            if self.combo_count >= COMBO_MASTER_THRESHOLD && !self.badges.has(Badge::ComboMaster)
            {
                self.badges.award(Badge::ComboMaster);
                info!("Combo master badge awarded at combo {}", self.combo_count);
            }
            self.spawn_mole();
            return HitOutcome::Hit;
        }

        self.misses += 1;
        self.combo_count = 0;

        if self.misses >= self.max_misses {
            self.active_mole = None;
            info!(
                "Game over: {} misses, final score {} ({} hits)",
                self.misses, self.score, self.hits
            );
            HitOutcome::GameOver
        } else {
            debug!("Miss at {:?} ({}/{})", hole, self.misses, self.max_misses);
            HitOutcome::Miss
        }
    }

    /// Stores `level`; `None` keeps the current difficulty.
    pub fn set_difficulty(&mut self, level: Option<Difficulty>) {
        match level {
            Some(level) => {
                self.difficulty = level;
                info!("Difficulty set to {}", level);
            }
            None => debug!("Unrecognized difficulty ignored, keeping {}", self.difficulty),
        }
    }

    pub fn pause(&mut self, time_left_ms: Option<i64>) {
        self.is_paused = true;
        if let Some(time_left_ms) = time_left_ms {
            self.paused_time_left = time_left_ms;
        }
        debug!("Paused with {} ms left", self.paused_time_left);
    }

    pub fn resume(&mut self) {
        self.is_paused = false;
        debug!("Resumed");
    }

    /// Timer-driven spawn; refused while paused or once the round is over
    pub fn maybe_spawn(&mut self) -> SpawnOutcome {
        if self.is_paused || self.is_round_over() {
            return SpawnOutcome::PausedOrOver;
        }
        self.spawn_mole();
        SpawnOutcome::Ok
    }
}
