use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

pub const HOLE_COUNT: usize = 9;
pub const HIT_REWARD: u32 = 5;
pub const DEFAULT_MAX_MISSES: u32 = 5;
pub const COMBO_MASTER_THRESHOLD: u32 = 3;
pub const DEFAULT_PAUSED_TIME_LEFT_MS: i64 = 30_000;
pub const BADGE_COUNT: usize = 5;

/// Wire value for "no mole is up"
pub const NO_MOLE: i64 = -1;

/// Spawn cadence selected by the player.
///
/// The server only stores this; whoever drives `/spawn` is expected to
/// call it every `spawn_interval()`.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    pub fn spawn_interval_ms(self) -> u64 {
        match self {
            Difficulty::Easy => 1000,
            Difficulty::Medium => 600,
            Difficulty::Hard => 300,
        }
    }

    pub fn spawn_interval(self) -> Duration {
        Duration::from_millis(self.spawn_interval_ms())
    }

    /// Exact, case-sensitive match on the wire token
    pub fn from_token(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|level| level.as_str() == token)
    }

    pub fn from_interval_ms(ms: u64) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|level| level.spawn_interval_ms() == ms)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_token(s).ok_or_else(|| format!("unknown difficulty '{}'", s))
    }
}

/// Achievement flags, in wire order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Badge {
    FastPlayer,
    AccuracyStar,
    ComboMaster,
    StarterBadge,
    HighScore,
}

impl Badge {
    pub const ALL: [Badge; BADGE_COUNT] = [
        Badge::FastPlayer,
        Badge::AccuracyStar,
        Badge::ComboMaster,
        Badge::StarterBadge,
        Badge::HighScore,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            Badge::FastPlayer => "Fast Player",
            Badge::AccuracyStar => "Accuracy Star",
            Badge::ComboMaster => "Combo Master",
            Badge::StarterBadge => "Starter",
            Badge::HighScore => "High Score",
        }
    }
}

/// One-way badge flags for a single round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BadgeSet {
    flags: [bool; BADGE_COUNT],
}

impl BadgeSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_flags(flags: [u8; BADGE_COUNT]) -> Self {
        let mut set = Self::new();
        for badge in Badge::ALL {
            set.flags[badge.index()] = flags[badge.index()] != 0;
        }
        set
    }

    pub fn award(&mut self, badge: Badge) {
        self.flags[badge.index()] = true;
    }

    pub fn has(&self, badge: Badge) -> bool {
        self.flags[badge.index()]
    }

    pub fn clear(&mut self) {
        self.flags = [false; BADGE_COUNT];
    }

    pub fn earned(&self) -> impl Iterator<Item = Badge> + '_ {
        Badge::ALL.into_iter().filter(|badge| self.has(*badge))
    }

    pub fn to_flags(&self) -> [u8; BADGE_COUNT] {
        self.flags.map(u8::from)
    }
}

/// Result of a `/hit` request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitOutcome {
    Hit,
    Miss,
    GameOver,
}

impl HitOutcome {
    pub fn as_str(self) -> &'static str {
        match self {
            HitOutcome::Hit => "hit",
            HitOutcome::Miss => "miss",
            HitOutcome::GameOver => "gameOver",
        }
    }

    pub fn from_reply(reply: &str) -> Option<Self> {
        match reply {
            "hit" => Some(HitOutcome::Hit),
            "miss" => Some(HitOutcome::Miss),
            "gameOver" => Some(HitOutcome::GameOver),
            _ => None,
        }
    }
}

/// Result of a `/spawn` request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpawnOutcome {
    Ok,
    PausedOrOver,
}

impl SpawnOutcome {
    pub fn as_str(self) -> &'static str {
        match self {
            SpawnOutcome::Ok => "ok",
            SpawnOutcome::PausedOrOver => "paused_or_over",
        }
    }

    pub fn from_reply(reply: &str) -> Option<Self> {
        match reply {
            "ok" => Some(SpawnOutcome::Ok),
            "paused_or_over" => Some(SpawnOutcome::PausedOrOver),
            _ => None,
        }
    }
}

/// JSON body of `/game_state`.
///
/// Field order is part of the wire format. Flags are sent as 0/1 and
/// `difficulty` as the spawn interval in milliseconds.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GameSnapshot {
    pub moles: Vec<i64>,
    pub score: u32,
    pub hits: u32,
    pub misses: u32,
    pub paused: u8,
    pub difficulty: u64,
    pub max_misses: u32,
    pub combo: u32,
    pub badges: [u8; BADGE_COUNT],
}

impl GameSnapshot {
    pub fn active_mole(&self) -> Option<usize> {
        self.moles
            .first()
            .copied()
            .filter(|mole| (0..HOLE_COUNT as i64).contains(mole))
            .map(|mole| mole as usize)
    }

    pub fn is_paused(&self) -> bool {
        self.paused != 0
    }

    pub fn is_over(&self) -> bool {
        self.misses >= self.max_misses
    }

    pub fn difficulty_level(&self) -> Option<Difficulty> {
        Difficulty::from_interval_ms(self.difficulty)
    }

    pub fn badge_set(&self) -> BadgeSet {
        BadgeSet::from_flags(self.badges)
    }
}
