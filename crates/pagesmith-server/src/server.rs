//! Live preview server implementation.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use tokio::sync::RwLock;

use pagesmith_blocks::BlockRegistry;
use pagesmith_export::{ExportBundle, ExportConfig, Exporter};
use pagesmith_page::{FileStore, PageSnapshot, PersistenceStore, DEFAULT_STATE_KEY};

use crate::watcher::{FileWatcher, WatchEvent};
use crate::websocket::{reload_client_script, ReloadHub, ReloadMessage};

const RELOAD_SOCKET: &str = "/__reload";
const RELOAD_SCRIPT: &str = "/__reload.js";

/// Configuration for the preview server.
#[derive(Debug, Clone)]
pub struct PreviewConfig {
    /// Directory holding saved page state
    pub state_dir: PathBuf,

    /// Key the page state is saved under
    pub state_key: String,

    /// Extra block catalogs
    pub blocks_dir: Option<PathBuf>,

    /// Options for rendering the page
    pub export: ExportConfig,

    /// Port to listen on
    pub port: u16,

    /// Host to bind to
    pub host: String,

    /// Open browser on start
    pub open: bool,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            state_dir: PathBuf::from(".pagesmith"),
            state_key: DEFAULT_STATE_KEY.to_string(),
            blocks_dir: None,
            export: ExportConfig::default(),
            port: 7777,
            host: "127.0.0.1".to_string(),
            open: true,
        }
    }
}

/// Errors that can occur with the server.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Invalid address {0}")]
    InvalidAddress(String),

    #[error("Failed to bind to {0}: {1}")]
    BindError(SocketAddr, String),

    #[error("File watch error: {0}")]
    WatchError(String),

    #[error("Render error: {0}")]
    RenderError(String),
}

/// Shared server state.
struct PreviewState {
    config: PreviewConfig,
    store: FileStore,
    registry: Arc<BlockRegistry>,
    exporter: Arc<Exporter>,
    hub: ReloadHub,
}

impl PreviewState {
    fn new(config: PreviewConfig) -> Self {
        Self {
            store: FileStore::new(&config.state_dir),
            registry: Arc::new(load_registry(&config)),
            exporter: Arc::new(Exporter::new(config.export.clone())),
            hub: ReloadHub::new(),
            config,
        }
    }

    /// Everything needed to render the page, detached from the lock.
    fn renderer(&self) -> Renderer {
        Renderer {
            store: self.store.clone(),
            state_key: self.config.state_key.clone(),
            registry: Arc::clone(&self.registry),
            exporter: Arc::clone(&self.exporter),
        }
    }
}

/// Renders the saved page with the registry current at request time.
struct Renderer {
    store: FileStore,
    state_key: String,
    registry: Arc<BlockRegistry>,
    exporter: Arc<Exporter>,
}

impl Renderer {
    /// Render the saved page. A missing or unreadable snapshot renders as
    /// an empty page. Reads the file system, so call it off the async workers.
    fn render(&self) -> Result<ExportBundle, ServerError> {
        let blocks = match self.store.load(&self.state_key) {
            Ok(Some(bytes)) => match PageSnapshot::decode(&bytes) {
                Ok(snapshot) => snapshot.blocks,
                Err(e) => {
                    tracing::warn!("Ignoring saved page state: {}", e);
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::warn!("Failed to read saved page state: {}", e);
                Vec::new()
            }
        };

        self.exporter
            .export(&self.registry, &blocks)
            .map_err(|e| ServerError::RenderError(e.to_string()))
    }
}

/// Render on the blocking pool without holding the state lock.
async fn render_page(state: &SharedState) -> Result<ExportBundle, ServerError> {
    let renderer = state.read().await.renderer();

    tokio::task::spawn_blocking(move || renderer.render())
        .await
        .map_err(|e| ServerError::RenderError(e.to_string()))?
}

fn load_registry(config: &PreviewConfig) -> BlockRegistry {
    match &config.blocks_dir {
        Some(dir) => BlockRegistry::with_catalog_dir(dir),
        None => BlockRegistry::with_defaults(),
    }
}

type SharedState = Arc<RwLock<PreviewState>>;

/// Live preview server.
pub struct PreviewServer {
    config: PreviewConfig,
}

impl PreviewServer {
    /// Create a new preview server.
    pub fn new(config: PreviewConfig) -> Self {
        Self { config }
    }

    /// Start serving. Runs until the listener fails.
    pub async fn start(self) -> Result<(), ServerError> {
        let address = format!("{}:{}", self.config.host, self.config.port);
        let addr: SocketAddr = address
            .parse()
            .map_err(|_| ServerError::InvalidAddress(address.clone()))?;

        // The first save may come after startup; watch the directory from the start.
        std::fs::create_dir_all(&self.config.state_dir)
            .map_err(|e| ServerError::WatchError(e.to_string()))?;

        let mut watch_paths = vec![self.config.state_dir.clone()];
        if let Some(dir) = &self.config.blocks_dir {
            watch_paths.push(dir.clone());
        }

        let state = Arc::new(RwLock::new(PreviewState::new(self.config.clone())));

        let (watcher, mut rx) =
            FileWatcher::new(&watch_paths).map_err(|e| ServerError::WatchError(e.to_string()))?;

        let state_clone = Arc::clone(&state);
        tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                handle_watch_event(&state_clone, event).await;
            }
            // Keep watcher alive
            drop(watcher);
        });

        let app = router(state);

        tracing::info!("Previewing page at http://{}", addr);

        if self.config.open {
            let url = format!("http://{}", addr);
            if let Err(e) = open::that(&url) {
                tracing::debug!("Could not open browser: {}", e);
            }
        }

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| ServerError::BindError(addr, e.to_string()))?;

        axum::serve(listener, app)
            .await
            .map_err(|e| ServerError::BindError(addr, e.to_string()))?;

        Ok(())
    }
}

fn router(state: SharedState) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/index.html", get(index_handler))
        .route("/style.css", get(style_handler))
        .route("/script.js", get(script_handler))
        .route(RELOAD_SOCKET, get(ws_handler))
        .route(RELOAD_SCRIPT, get(reload_script_handler))
        .with_state(state)
}

/// Handle file watch events.
async fn handle_watch_event(state: &SharedState, event: WatchEvent) {
    match event {
        WatchEvent::StateChanged(path) => {
            tracing::info!("Page state changed: {}", path.display());
            state.read().await.hub.send(ReloadMessage::Reload);
        }

        WatchEvent::CatalogChanged(path) => {
            tracing::info!("Block catalog changed: {}", path.display());

            let mut state = state.write().await;
            state.registry = Arc::new(load_registry(&state.config));
            state.hub.send(ReloadMessage::Reload);
        }
    }
}

/// Put the reload client into a rendered document.
///
/// The tag goes at the end of `<head>` so the exported document's body keeps
/// its own script order.
fn inject_reload_script(document: &str) -> String {
    let tag = format!(r#"<script src="{RELOAD_SCRIPT}"></script>"#);

    match document.find("</head>") {
        Some(at) => format!("{}  {}\n{}", &document[..at], tag, &document[at..]),
        None => format!("{tag}\n{document}"),
    }
}

fn render_error(err: ServerError) -> Response {
    tracing::error!("{}", err);
    (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()).into_response()
}

/// Handler for the page itself.
async fn index_handler(State(state): State<SharedState>) -> Response {
    match render_page(&state).await {
        Ok(bundle) => Html(inject_reload_script(&bundle.document_markup)).into_response(),
        Err(e) => render_error(e),
    }
}

async fn style_handler(State(state): State<SharedState>) -> Response {
    match render_page(&state).await {
        Ok(bundle) => ([(header::CONTENT_TYPE, "text/css")], bundle.stylesheet).into_response(),
        Err(e) => render_error(e),
    }
}

async fn script_handler(State(state): State<SharedState>) -> Response {
    match render_page(&state).await {
        Ok(bundle) => (
            [(header::CONTENT_TYPE, "application/javascript")],
            bundle.behavior_script,
        )
            .into_response(),
        Err(e) => render_error(e),
    }
}

/// Handler for the reload WebSocket endpoint.
async fn ws_handler(ws: WebSocketUpgrade, State(state): State<SharedState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_ws(socket, state))
}

/// Forward reload messages to one client until it disconnects.
async fn handle_ws(mut socket: WebSocket, state: SharedState) {
    let mut rx = state.read().await.hub.subscribe();

    if !send_message(&mut socket, &ReloadMessage::Connected).await {
        return;
    }

    while let Ok(msg) = rx.recv().await {
        if !send_message(&mut socket, &msg).await {
            break;
        }
    }
}

async fn send_message(socket: &mut WebSocket, msg: &ReloadMessage) -> bool {
    let json = match serde_json::to_string(msg) {
        Ok(json) => json,
        Err(e) => {
            tracing::warn!("Failed to encode reload message: {}", e);
            return false;
        }
    };

    socket.send(Message::Text(json.into())).await.is_ok()
}

async fn reload_script_handler() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "application/javascript")],
        reload_client_script(RELOAD_SOCKET),
    )
}
