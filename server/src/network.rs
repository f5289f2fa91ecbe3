//! Server network layer: the axum router, the listener and the game loop
//! that owns the session

use crate::game::GameState;
use crate::router::{dispatch, Command, Reply, COMMAND_PATHS};
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::any;
use axum::{Json, Router};
use log::{debug, error, info};
use shared::DEFAULT_MAX_MISSES;
use std::future::Future;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use tokio::net::TcpListener;
use tokio::sync::{mpsc, oneshot};
use tower_http::services::ServeDir;

pub type ServerResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

const COMMAND_QUEUE_DEPTH: usize = 1000;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub addr: String,
    pub web_root: PathBuf,
    pub max_misses: u32,
    pub seed: Option<u64>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: "0.0.0.0:8000".to_string(),
            web_root: PathBuf::from("web"),
            max_misses: DEFAULT_MAX_MISSES,
            seed: None,
        }
    }
}

/// Messages sent from request handlers to the game loop
#[derive(Debug)]
pub enum GameMessage {
    Command {
        command: Command,
        reply: oneshot::Sender<Reply>,
    },
}

/// Cloneable handle for submitting commands to the game loop
#[derive(Debug, Clone)]
pub struct GameHandle {
    game_tx: mpsc::Sender<GameMessage>,
}

impl GameHandle {
    /// Runs `command` against the session; `None` if the game loop is gone
    pub async fn execute(&self, command: Command) -> Option<Reply> {
        let (reply, reply_rx) = oneshot::channel();
        if let Err(e) = self
            .game_tx
            .send(GameMessage::Command { command, reply })
            .await
        {
            error!("Failed to queue command for game loop: {}", e);
            return None;
        }
        reply_rx.await.ok()
    }
}

/// Spawns the task that owns `state` and applies commands one at a time
pub fn spawn_game_loop(mut state: GameState) -> GameHandle {
    let (game_tx, mut game_rx) = mpsc::channel::<GameMessage>(COMMAND_QUEUE_DEPTH);

    tokio::spawn(async move {
        while let Some(message) = game_rx.recv().await {
            match message {
                GameMessage::Command { command, reply } => {
                    let name = command.name();
                    let result = dispatch(&mut state, command);
                    if reply.send(result).is_err() {
                        debug!("Client went away before the {} reply", name);
                    }
                }
            }
        }
        info!("Game loop stopped");
    });

    GameHandle { game_tx }
}

/// Builds the HTTP routes: one per game command, any method, with the web
/// root behind everything else.
pub fn app(game: GameHandle, web_root: &Path) -> Router {
    let mut router = Router::new();
    for path in COMMAND_PATHS {
        router = router.route(path, any(handle_command));
    }
    router
        .fallback_service(ServeDir::new(web_root))
        .with_state(game)
}

async fn handle_command(State(game): State<GameHandle>, uri: Uri, body: Bytes) -> Response {
    let body = String::from_utf8_lossy(&body);
    let Some(command) = Command::from_request(uri.path(), &body) else {
        return StatusCode::NOT_FOUND.into_response();
    };
    debug!("{} [{}]", uri.path(), body);

    match game.execute(command).await {
        Some(Reply::Text(text)) => text.into_response(),
        Some(Reply::State(snapshot)) => Json(snapshot).into_response(),
        None => {
            error!("Game loop unavailable for {}", uri.path());
            (StatusCode::SERVICE_UNAVAILABLE, "unavailable").into_response()
        }
    }
}

/// HTTP front door for the game session
pub struct Server {
    listener: TcpListener,
    app: Router,
}

impl Server {
    pub async fn bind(config: ServerConfig) -> ServerResult<Self> {
        let listener = TcpListener::bind(&config.addr).await?;
        info!("Server listening on {}", listener.local_addr()?);

        let state = GameState::new(config.max_misses, config.seed);
        if let Some(mole) = state.active_mole() {
            info!("Initial mole at hole {}", mole);
        }

        Ok(Server {
            listener,
            app: app(spawn_game_loop(state), &config.web_root),
        })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Serves until Ctrl+C
    pub async fn run(self) -> ServerResult<()> {
        self.run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("Failed to listen for Ctrl+C: {}", e);
                std::future::pending::<()>().await;
            }
            info!("Received Ctrl+C, shutting down gracefully...");
        })
        .await
    }

    /// Serves until `shutdown` completes
    pub async fn run_until<F>(self, shutdown: F) -> ServerResult<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        info!("Server started successfully");
        axum::serve(self.listener, self.app)
            .with_graceful_shutdown(shutdown)
            .await?;
        info!("Server shut down");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::header::CONTENT_TYPE;
    use axum::http::Request;
    use shared::{GameSnapshot, HOLE_COUNT};
    use std::time::{SystemTime, UNIX_EPOCH};
    use tower::ServiceExt;

    struct Captured {
        status: StatusCode,
        content_type: Option<String>,
        body: Vec<u8>,
    }

    async fn send(app: &Router, method: &str, path: &str, body: Vec<u8>) -> Captured {
        let request = Request::builder()
            .method(method)
            .uri(path)
            .body(Body::from(body))
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();

        let status = response.status();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        Captured {
            status,
            content_type,
            body: body.to_vec(),
        }
    }

    async fn post(app: &Router, path: &str, body: &str) -> Captured {
        send(app, "POST", path, body.as_bytes().to_vec()).await
    }

    fn snapshot_of(reply: &Captured) -> GameSnapshot {
        assert_eq!(reply.status, StatusCode::OK);
        assert_eq!(reply.content_type.as_deref(), Some("application/json"));
        serde_json::from_slice(&reply.body).unwrap()
    }

    fn test_app(seed: u64) -> Router {
        let game = spawn_game_loop(GameState::new(DEFAULT_MAX_MISSES, Some(seed)));
        app(game, Path::new("no-such-web-root"))
    }

    fn temp_web_root() -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let dir = std::env::temp_dir().join(format!(
            "whack-a-mole-web-{}-{}",
            std::process::id(),
            nanos
        ));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.addr, "0.0.0.0:8000");
        assert_eq!(config.web_root, PathBuf::from("web"));
        assert_eq!(config.max_misses, DEFAULT_MAX_MISSES);
        assert!(config.seed.is_none());
    }

    #[tokio::test]
    async fn test_game_loop_serializes_commands() {
        let game = spawn_game_loop(GameState::new(DEFAULT_MAX_MISSES, Some(11)));

        assert_eq!(
            game.execute(Command::Reset).await,
            Some(Reply::Text("reset"))
        );

        let handles: Vec<_> = (0..HOLE_COUNT as i64)
            .map(|hole| {
                let game = game.clone();
                tokio::spawn(async move { game.execute(Command::Hit { hole: Some(hole) }).await })
            })
            .collect();
        for handle in handles {
            assert!(handle.await.unwrap().is_some());
        }

        match game.execute(Command::QueryState).await {
            Some(Reply::State(snapshot)) => {
                let resolved = snapshot.hits + snapshot.misses;
                assert!(resolved > 0 && resolved <= HOLE_COUNT as u32);
                assert_eq!(snapshot.score, snapshot.hits * 5);
                assert!(snapshot.misses <= snapshot.max_misses);
            }
            other => panic!("Unexpected reply: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_routes_commands() {
        let app = test_app(5);

        let reply = post(&app, "/reset", "").await;
        assert_eq!(reply.status, StatusCode::OK);
        assert_eq!(reply.body, b"reset");

        let snapshot = snapshot_of(&post(&app, "/game_state", "").await);
        assert_eq!(snapshot.badges, [0, 0, 0, 1, 0]);
        let mole = snapshot.active_mole().unwrap();

        let reply = post(&app, "/hit", &format!("hole={}", mole)).await;
        assert_eq!(reply.body, b"hit");

        let reply = post(&app, "/set_difficulty", "level=bogus").await;
        assert_eq!(reply.body, b"ok");

        let snapshot = snapshot_of(&post(&app, "/game_state", "").await);
        assert_eq!(snapshot.score, 5);
        assert_eq!(snapshot.combo, 1);
        assert_eq!(snapshot.difficulty, 600);
    }

    #[tokio::test]
    async fn test_commands_ignore_method_and_query() {
        let app = test_app(6);

        let reply = send(&app, "GET", "/reset?from=test", Vec::new()).await;
        assert_eq!(reply.body, b"reset");

        let reply = send(&app, "PUT", "/pause", b"timeLeft=12000".to_vec()).await;
        assert_eq!(reply.body, b"paused");

        let snapshot = snapshot_of(&send(&app, "DELETE", "/game_state", Vec::new()).await);
        assert!(snapshot.is_paused());
    }

    #[tokio::test]
    async fn test_invalid_utf8_body_is_a_miss() {
        let app = test_app(7);
        post(&app, "/reset", "").await;

        let reply = send(&app, "POST", "/hit", b"hole=\xff\xfe".to_vec()).await;
        assert_eq!(reply.status, StatusCode::OK);
        assert_eq!(reply.body, b"miss");
    }

    #[tokio::test]
    async fn test_falls_back_to_web_root() {
        let root = temp_web_root();
        std::fs::write(root.join("index.html"), "<h1>Whack!</h1>").unwrap();
        std::fs::write(root.join("my sprite.png"), [0x89, b'P', b'N', b'G']).unwrap();

        let game = spawn_game_loop(GameState::new(DEFAULT_MAX_MISSES, Some(8)));
        let app = app(game, &root);

        let reply = send(&app, "GET", "/", Vec::new()).await;
        assert_eq!(reply.status, StatusCode::OK);
        assert!(reply.content_type.unwrap().starts_with("text/html"));
        assert_eq!(reply.body, b"<h1>Whack!</h1>");

        let reply = send(&app, "GET", "/my%20sprite.png", Vec::new()).await;
        assert_eq!(reply.status, StatusCode::OK);
        assert_eq!(reply.content_type.as_deref(), Some("image/png"));

        let reply = send(&app, "GET", "/missing.js", Vec::new()).await;
        assert_eq!(reply.status, StatusCode::NOT_FOUND);

        let reply = send(&app, "GET", "/../Cargo.toml", Vec::new()).await;
        assert_eq!(reply.status, StatusCode::NOT_FOUND);

        let _ = std::fs::remove_dir_all(&root);
    }

    #[tokio::test]
    async fn test_stopped_game_loop_is_unavailable() {
        let (game_tx, game_rx) = mpsc::channel::<GameMessage>(1);
        drop(game_rx);
        let game = GameHandle { game_tx };

        assert_eq!(game.execute(Command::Spawn).await, None);

        let app = app(game, Path::new("web"));
        let reply = post(&app, "/spawn", "").await;
        assert_eq!(reply.status, StatusCode::SERVICE_UNAVAILABLE);
    }
}
