//! Typed wrapper over the game server's HTTP commands

use log::debug;
use shared::{Difficulty, GameSnapshot, HitOutcome, SpawnOutcome};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("unexpected reply to {path}: {body:?}")]
    UnexpectedReply { path: String, body: String },
}

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Clone)]
pub struct GameClient {
    http: reqwest::Client,
    base_url: String,
}

impl GameClient {
    /// `base_url` is the server origin, e.g. `http://127.0.0.1:8000`
    pub fn new(base_url: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// POSTs `body` to `path` and returns the reply text as-is
    pub async fn send(&self, path: &str, body: &str) -> ApiResult<String> {
        let reply = self
            .http
            .post(self.url(path))
            .header("Content-Type", "application/x-www-form-urlencoded")
            .body(body.to_string())
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        debug!("{} [{}] -> {}", path, body, reply);
        Ok(reply)
    }

    async fn expect_reply(&self, path: &str, body: &str, expected: &str) -> ApiResult<()> {
        let reply = self.send(path, body).await?;
        if reply == expected {
            Ok(())
        } else {
            Err(unexpected(path, reply))
        }
    }

    pub async fn reset(&self) -> ApiResult<()> {
        self.expect_reply("/reset", "", "reset").await
    }

    pub async fn game_state(&self) -> ApiResult<GameSnapshot> {
        let snapshot = self
            .http
            .get(self.url("/game_state"))
            .send()
            .await?
            .error_for_status()?
            .json::<GameSnapshot>()
            .await?;
        Ok(snapshot)
    }

    pub async fn hit(&self, hole: usize) -> ApiResult<HitOutcome> {
        let reply = self.send("/hit", &format!("hole={}", hole)).await?;
        HitOutcome::from_reply(&reply).ok_or_else(|| unexpected("/hit", reply))
    }

    pub async fn set_difficulty(&self, level: Difficulty) -> ApiResult<()> {
        self.expect_reply("/set_difficulty", &format!("level={}", level), "ok")
            .await
    }

    pub async fn pause(&self, time_left_ms: i64) -> ApiResult<()> {
        self.expect_reply("/pause", &format!("timeLeft={}", time_left_ms), "paused")
            .await
    }

    pub async fn resume(&self) -> ApiResult<()> {
        self.expect_reply("/resume", "", "resumed").await
    }

    pub async fn spawn(&self) -> ApiResult<SpawnOutcome> {
        let reply = self.send("/spawn", "").await?;
        SpawnOutcome::from_reply(&reply).ok_or_else(|| unexpected("/spawn", reply))
    }
}

fn unexpected(path: &str, body: String) -> ApiError {
    ApiError::UnexpectedReply {
        path: path.to_string(),
        body,
    }
}
