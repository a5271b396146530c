//! Axum-based HTTP channel — serves the garden API under `/api/`.
//!
//! `run()` drives the axum event loop; a [`CancellationToken`] is wired to
//! axum's graceful shutdown so Ctrl-C drains in-flight requests.
//!
//! ## URL layout
//!
//! ```text
//! GET  /api                          → liveness body
//! GET  /api/gardens                  → list stored garden names
//! POST /api/gardens                  → create a new empty garden
//! GET  /api/gardens/{name}           → full garden record
//! POST /api/gardens/{name}/review    → run a seasonal review
//! POST /api/chat                     → journal a message and return advice
//! POST /api/analyze                  → analyze a plant image into the journal
//! ```

mod api;

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::config::{LlmConfig, ProviderKeys};
use crate::error::AppError;
use crate::memory::store::GardenStore;

// ── Shared request state ──────────────────────────────────────────────────────

/// Axum router state injected into every handler via [`axum::extract::State`].
///
/// Cheap to clone — all fields are reference-counted.
#[derive(Clone)]
pub struct HttpState {
    pub store: Arc<GardenStore>,
    pub keys: Arc<ProviderKeys>,
    pub llm: Arc<LlmConfig>,
    /// Per-garden-name locks. Two mutating requests for the same garden
    /// serialize within this process, closing the load/mutate/save race.
    /// Entries accumulate per name for the process lifetime — gardens are
    /// few and named by humans, so the map stays small.
    locks: Arc<Mutex<HashMap<String, Arc<Mutex<()>>>>>,
}

impl HttpState {
    pub fn new(store: GardenStore, keys: ProviderKeys, llm: LlmConfig) -> Self {
        Self {
            store: Arc::new(store),
            keys: Arc::new(keys),
            llm: Arc::new(llm),
            locks: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// The lock guarding mutations of one garden's record.
    pub(crate) async fn garden_lock(&self, name: &str) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().await;
        locks
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}

// ── Router / serve ────────────────────────────────────────────────────────────

/// Build the API router over the given state.
pub fn router(state: HttpState) -> Router {
    Router::new()
        .route("/api", get(api::root))
        .route("/api/gardens", get(api::list_gardens).post(api::create_garden))
        .route("/api/gardens/{name}", get(api::fetch_garden))
        .route("/api/gardens/{name}/review", post(api::review))
        .route("/api/chat", post(api::chat))
        .route("/api/analyze", post(api::analyze))
        .with_state(state)
}

/// Bind and serve until the shutdown token fires.
pub async fn run(
    bind_addr: &str,
    state: HttpState,
    shutdown: CancellationToken,
) -> Result<(), AppError> {
    let app = router(state);
    let listener = TcpListener::bind(bind_addr)
        .await
        .map_err(|e| AppError::Config(format!("cannot bind {bind_addr}: {e}")))?;
    info!(%bind_addr, "http channel listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
        .map_err(AppError::Io)?;

    info!("http channel stopped");
    Ok(())
}
