//! Development server with live reload.
//!
//! Serves the built output directory over HTTP, polls the content and static
//! trees for changes, rebuilds, and tells connected browsers to reload via a
//! server-sent-events stream at `GET /__reload`.
//!
//! All mutable state lives in a [`ServerContext`] shared through an `Arc`:
//! the reload broadcast channel plus the two flags that keep rebuilds from
//! overlapping. A change that arrives while a rebuild is running sets the
//! pending flag, and exactly one follow-up rebuild runs afterwards.

use crate::config::RosterConfig;
use crate::generate::{self, BuildSummary, GenerateError};
use crate::watch::Snapshot;
use axum::Router;
use axum::extract::State;
use axum::http::{StatusCode, Uri, header};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use percent_encoding::percent_decode_str;
use std::convert::Infallible;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::broadcast;
use tokio_stream::StreamExt as _;
use tokio_stream::wrappers::BroadcastStream;
use tower_http::trace::TraceLayer;

const LIVE_RELOAD_JS: &str = include_str!("../theme/live-reload.js");

/// Path of the server-sent-events endpoint.
pub const RELOAD_PATH: &str = "/__reload";

/// Runs one full build. [`generate::build_site`] outside of tests.
pub type Builder =
    dyn Fn(&RosterConfig) -> Result<BuildSummary, GenerateError> + Send + Sync;

/// Shared state for handlers, the watcher and the rebuild task.
pub struct ServerContext {
    config: RosterConfig,
    builder: Arc<Builder>,
    /// Base path of the last successful build, stripped from request paths.
    base_path: RwLock<String>,
    reload_tx: broadcast::Sender<()>,
    rebuilding: AtomicBool,
    pending: AtomicBool,
}

impl ServerContext {
    pub fn new(config: RosterConfig) -> Arc<Self> {
        Self::with_builder(config, Arc::new(generate::build_site))
    }

    pub fn with_builder(config: RosterConfig, builder: Arc<Builder>) -> Arc<Self> {
        let (reload_tx, _) = broadcast::channel(16);
        Arc::new(Self {
            config,
            builder,
            base_path: RwLock::new(String::new()),
            reload_tx,
            rebuilding: AtomicBool::new(false),
            pending: AtomicBool::new(false),
        })
    }

    pub fn config(&self) -> &RosterConfig {
        &self.config
    }

    pub fn output_dir(&self) -> &Path {
        &self.config.paths.output
    }

    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.reload_tx.subscribe()
    }

    fn base_path(&self) -> String {
        self.base_path
            .read()
            .map(|p| p.clone())
            .unwrap_or_default()
    }

    fn set_base_path(&self, base_path: String) {
        if let Ok(mut current) = self.base_path.write() {
            *current = base_path;
        }
    }

    fn watch_roots(&self) -> Vec<PathBuf> {
        vec![
            self.config.paths.content.clone(),
            self.config.paths.static_dir.clone(),
        ]
    }
}

// ============================================================================
// Router
// ============================================================================

/// Build the axum Router: the reload stream plus a static-file fallback.
pub fn build_router(ctx: Arc<ServerContext>) -> Router {
    Router::new()
        .route(RELOAD_PATH, get(reload_events))
        .fallback(static_handler)
        .layer(TraceLayer::new_for_http())
        .with_state(ctx)
}

/// GET /__reload: SSE stream that emits `reload` after every successful rebuild.
async fn reload_events(State(ctx): State<Arc<ServerContext>>) -> impl IntoResponse {
    let rx = ctx.subscribe();
    let stream = BroadcastStream::new(rx).filter_map(|msg| {
        msg.ok()
            .map(|_| Ok::<Event, Infallible>(Event::default().event("reload").data("reload")))
    });
    Sse::new(stream).keep_alive(KeepAlive::default())
}

async fn static_handler(State(ctx): State<Arc<ServerContext>>, uri: Uri) -> Response {
    let relative = match resolve_request_path(&ctx.base_path(), uri.path()) {
        Ok(relative) => relative,
        Err(e) => {
            tracing::warn!("rejected request for {}: {e}", uri.path());
            return (StatusCode::FORBIDDEN, e.to_string()).into_response();
        }
    };

    let mut path = ctx.output_dir().join(&relative);
    if tokio::fs::metadata(&path)
        .await
        .map(|m| m.is_dir())
        .unwrap_or(false)
    {
        path.push("index.html");
    }

    match tokio::fs::read(&path).await {
        Ok(bytes) => file_response(StatusCode::OK, &path, bytes),
        Err(_) => not_found(ctx.output_dir()).await,
    }
}

async fn not_found(output_dir: &Path) -> Response {
    let page = output_dir.join("404.html");
    match tokio::fs::read(&page).await {
        Ok(bytes) => file_response(StatusCode::NOT_FOUND, &page, bytes),
        Err(_) => (StatusCode::NOT_FOUND, "404 Not Found").into_response(),
    }
}

fn file_response(status: StatusCode, path: &Path, bytes: Vec<u8>) -> Response {
    let mime = mime_guess::from_path(path).first_or_octet_stream();
    let is_html = mime.subtype() == mime_guess::mime::HTML;
    let body = if is_html {
        inject_reload_script(&String::from_utf8_lossy(&bytes)).into_bytes()
    } else {
        bytes
    };
    let content_type = if is_html {
        "text/html; charset=utf-8".to_string()
    } else {
        mime.to_string()
    };
    (
        status,
        [
            (header::CONTENT_TYPE, content_type),
            (header::CACHE_CONTROL, "no-store".to_string()),
        ],
        body,
    )
        .into_response()
}

// ============================================================================
// Request paths
// ============================================================================

#[derive(Error, Debug, PartialEq, Eq)]
pub enum RequestPathError {
    #[error("request path is not valid UTF-8")]
    InvalidEncoding,
    #[error("request path escapes the output directory")]
    Traversal,
}

/// Map a request path to a file path relative to the output directory.
///
/// Percent-decodes first so `%2e%2e` cannot sneak past the `..` check. The
/// site's base path is stripped when present. Paths ending in `/` map to
/// `index.html`.
pub fn resolve_request_path(base_path: &str, request_path: &str) -> Result<PathBuf, RequestPathError> {
    let decoded = percent_decode_str(request_path)
        .decode_utf8()
        .map_err(|_| RequestPathError::InvalidEncoding)?;
    let mut path: &str = &decoded;

    if !base_path.is_empty() {
        if path == base_path {
            path = "/";
        } else if let Some(rest) = path.strip_prefix(base_path) {
            if rest.starts_with('/') {
                path = rest;
            }
        }
    }

    let mut relative = PathBuf::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => return Err(RequestPathError::Traversal),
            s if s.contains('\\') || s.contains('\0') => {
                return Err(RequestPathError::Traversal);
            }
            s => relative.push(s),
        }
    }
    if path.ends_with('/') || relative.as_os_str().is_empty() {
        relative.push("index.html");
    }
    Ok(relative)
}

/// Insert the live-reload client before the last `</body>`, or append it.
pub fn inject_reload_script(html: &str) -> String {
    let script = format!("<script>{LIVE_RELOAD_JS}</script>");
    match html.rfind("</body>") {
        Some(idx) => format!("{}{}{}", &html[..idx], script, &html[idx..]),
        None => format!("{html}{script}"),
    }
}

// ============================================================================
// Rebuilds
// ============================================================================

/// Rebuild now, or queue one follow-up if a rebuild is already running.
pub async fn request_rebuild(ctx: Arc<ServerContext>) {
    if ctx.rebuilding.swap(true, Ordering::SeqCst) {
        ctx.pending.store(true, Ordering::SeqCst);
        tracing::debug!("rebuild in progress, queued a follow-up");
        return;
    }
    loop {
        ctx.pending.store(false, Ordering::SeqCst);
        rebuild_once(&ctx).await;
        if ctx.pending.load(Ordering::SeqCst) {
            continue;
        }
        ctx.rebuilding.store(false, Ordering::SeqCst);
        // A trigger may have landed between the check and the release.
        if ctx.pending.load(Ordering::SeqCst) && !ctx.rebuilding.swap(true, Ordering::SeqCst) {
            continue;
        }
        break;
    }
}

/// Run one build on the blocking pool. Returns whether it succeeded.
async fn rebuild_once(ctx: &Arc<ServerContext>) -> bool {
    let config = ctx.config.clone();
    let builder = Arc::clone(&ctx.builder);
    match tokio::task::spawn_blocking(move || builder(&config)).await {
        Ok(Ok(summary)) => {
            ctx.set_base_path(summary.base_path);
            let clients = ctx.reload_tx.send(()).unwrap_or(0);
            tracing::info!(
                pages = summary.pages.len(),
                clients,
                "rebuilt site"
            );
            true
        }
        Ok(Err(e)) => {
            tracing::error!("rebuild failed: {e}");
            false
        }
        Err(e) => {
            tracing::error!("rebuild task panicked: {e}");
            false
        }
    }
}

async fn take_snapshot(roots: Vec<PathBuf>) -> Snapshot {
    tokio::task::spawn_blocking(move || {
        let refs: Vec<&Path> = roots.iter().map(PathBuf::as_path).collect();
        Snapshot::take(&refs)
    })
    .await
    .unwrap_or_default()
}

/// Poll the content and static trees and trigger rebuilds on change.
pub fn spawn_watcher(ctx: Arc<ServerContext>) -> tokio::task::JoinHandle<()> {
    let poll = Duration::from_millis(ctx.config.serve.poll_interval_ms);
    let debounce = Duration::from_millis(ctx.config.serve.debounce_ms);
    tokio::spawn(async move {
        let roots = ctx.watch_roots();
        let mut last = take_snapshot(roots.clone()).await;
        tracing::debug!(files = last.len(), "watching for changes");

        let mut ticker = tokio::time::interval(poll);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            let current = take_snapshot(roots.clone()).await;
            let changes = last.diff(&current);
            if changes.is_empty() {
                continue;
            }
            // Let a burst of saves settle into one rebuild.
            tokio::time::sleep(debounce).await;
            last = take_snapshot(roots.clone()).await;
            tracing::info!(changed = changes.len(), "change detected, rebuilding");
            tokio::spawn(request_rebuild(ctx.clone()));
        }
    })
}

// ============================================================================
// Entry points
// ============================================================================

/// Bind `127.0.0.1:<port>` and serve until interrupted.
pub async fn serve(config: RosterConfig, port: u16) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(("127.0.0.1", port)).await?;
    serve_on(config, listener).await
}

/// Serve on a pre-bound listener.
///
/// Runs an initial build first; a failing build is logged and the server
/// starts anyway so fixing the content triggers a rebuild.
pub async fn serve_on(config: RosterConfig, listener: tokio::net::TcpListener) -> anyhow::Result<()> {
    let port = listener.local_addr()?.port();
    let ctx = ServerContext::new(config);

    request_rebuild(ctx.clone()).await;
    spawn_watcher(ctx.clone());

    let app = build_router(ctx);
    tracing::info!("dev server listening on http://localhost:{port}");
    axum::serve(listener, app).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::ContentFixture;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use std::fs;
    use std::sync::atomic::AtomicUsize;
    use tower::ServiceExt;

    async fn get_path(ctx: Arc<ServerContext>, uri: &str) -> (StatusCode, String, String) {
        let response = build_router(ctx)
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .map(|v| v.to_str().unwrap().to_string())
            .unwrap_or_default();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        (status, content_type, String::from_utf8_lossy(&body).into_owned())
    }

    fn built_context(fixture: &crate::test_helpers::WrittenFixture) -> Arc<ServerContext> {
        let config = fixture.config();
        generate::build_site(&config).unwrap();
        ServerContext::new(config)
    }

    #[test]
    fn resolve_maps_directories_to_index() {
        assert_eq!(resolve_request_path("", "/").unwrap(), PathBuf::from("index.html"));
        assert_eq!(
            resolve_request_path("", "/artists/ana-lee/").unwrap(),
            PathBuf::from("artists/ana-lee/index.html")
        );
        assert_eq!(
            resolve_request_path("", "/robots.txt").unwrap(),
            PathBuf::from("robots.txt")
        );
    }

    #[test]
    fn resolve_rejects_traversal() {
        assert_eq!(
            resolve_request_path("", "/../etc/passwd"),
            Err(RequestPathError::Traversal)
        );
        assert_eq!(
            resolve_request_path("", "/assets/%2e%2e/%2e%2e/secret"),
            Err(RequestPathError::Traversal)
        );
        assert_eq!(
            resolve_request_path("", "/..%2f..%2fsecret"),
            Err(RequestPathError::Traversal)
        );
    }

    #[test]
    fn resolve_decodes_percent_escapes() {
        assert_eq!(
            resolve_request_path("", "/assets/my%20photo.jpg").unwrap(),
            PathBuf::from("assets/my photo.jpg")
        );
    }

    #[test]
    fn resolve_strips_base_path() {
        assert_eq!(
            resolve_request_path("/roster", "/roster/artists/").unwrap(),
            PathBuf::from("artists/index.html")
        );
        assert_eq!(
            resolve_request_path("/roster", "/roster").unwrap(),
            PathBuf::from("index.html")
        );
        assert_eq!(
            resolve_request_path("/roster", "/rosterx/a.txt").unwrap(),
            PathBuf::from("rosterx/a.txt")
        );
    }

    #[test]
    fn inject_before_closing_body() {
        let html = "<html><body><p>x</p></body></html>";
        let injected = inject_reload_script(html);
        assert!(injected.contains("EventSource('/__reload')"));
        assert!(injected.find("<script>").unwrap() < injected.find("</body>").unwrap());
        assert!(injected.ends_with("</body></html>"));
    }

    #[test]
    fn inject_appends_without_body() {
        let injected = inject_reload_script("<p>fragment</p>");
        assert!(injected.starts_with("<p>fragment</p><script>"));
    }

    #[tokio::test]
    async fn serves_home_with_reload_client() {
        let fixture = ContentFixture::new().write();
        let ctx = built_context(&fixture);
        let (status, content_type, body) = get_path(ctx, "/").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(content_type, "text/html; charset=utf-8");
        assert!(body.contains("Test Agency"));
        assert!(body.contains("/__reload"));
    }

    #[tokio::test]
    async fn directory_without_slash_serves_index() {
        let fixture = ContentFixture::new().write();
        let ctx = built_context(&fixture);
        let (status, _, body) = get_path(ctx, "/artists/ana-lee").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("<h1>Ana Lee</h1>"));
    }

    #[tokio::test]
    async fn guesses_content_type() {
        let fixture = ContentFixture::new().write();
        let ctx = built_context(&fixture);
        let (status, content_type, _) =
            get_path(ctx.clone(), "/assets/images/placeholder-artist.svg").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(content_type, "image/svg+xml");
        let (_, content_type, body) = get_path(ctx, "/robots.txt").await;
        assert_eq!(content_type, "text/plain");
        assert!(!body.contains("<script>"));
    }

    #[tokio::test]
    async fn unknown_path_serves_built_404() {
        let fixture = ContentFixture::new().write();
        let ctx = built_context(&fixture);
        let (status, _, body) = get_path(ctx, "/nobody/here/").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body.contains("Page not found"));
    }

    #[tokio::test]
    async fn plain_404_without_build() {
        let fixture = ContentFixture::new().write();
        let ctx = ServerContext::new(fixture.config());
        let (status, _, body) = get_path(ctx, "/").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, "404 Not Found");
    }

    #[tokio::test]
    async fn traversal_is_forbidden() {
        let fixture = ContentFixture::new().write();
        let ctx = built_context(&fixture);
        let (status, _, _) = get_path(ctx, "/%2e%2e/content/site.json").await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn reload_endpoint_is_event_stream() {
        let fixture = ContentFixture::new().write();
        let ctx = ServerContext::new(fixture.config());
        let response = build_router(ctx)
            .oneshot(Request::builder().uri(RELOAD_PATH).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "text/event-stream"
        );
    }

    #[tokio::test]
    async fn successful_rebuild_notifies_subscribers() {
        let fixture = ContentFixture::new().write();
        let ctx = ServerContext::new(fixture.config());
        let mut rx = ctx.subscribe();

        request_rebuild(ctx.clone()).await;
        assert!(rx.try_recv().is_ok());
        assert!(fixture.output_dir().join("index.html").exists());
        assert!(!ctx.rebuilding.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn failed_rebuild_keeps_output_and_stays_quiet() {
        let fixture = ContentFixture::new().write();
        let ctx = built_context(&fixture);
        let mut rx = ctx.subscribe();
        fs::write(fixture.content_dir().join("artists.json"), "[{").unwrap();

        request_rebuild(ctx.clone()).await;
        assert!(rx.try_recv().is_err());
        assert!(fixture.output_dir().join("index.html").exists());
    }

    #[tokio::test]
    async fn triggers_during_rebuild_coalesce_into_one_follow_up() {
        let fixture = ContentFixture::new().write();
        let (started_tx, started_rx) = std::sync::mpsc::channel::<()>();
        let (release_tx, release_rx) = std::sync::mpsc::channel::<()>();
        let gate = std::sync::Mutex::new((started_tx, release_rx));
        let calls = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&calls);
        let builder = move |_: &RosterConfig| {
            // hold the first build open until the test releases it
            if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                let gate = gate.lock().unwrap();
                gate.0.send(()).unwrap();
                gate.1.recv().unwrap();
            }
            Ok::<_, GenerateError>(BuildSummary::default())
        };
        let ctx = ServerContext::with_builder(fixture.config(), Arc::new(builder));
        let mut reloads = ctx.subscribe();

        let first = tokio::spawn(request_rebuild(ctx.clone()));
        tokio::task::spawn_blocking(move || started_rx.recv())
            .await
            .unwrap()
            .unwrap();

        request_rebuild(ctx.clone()).await;
        request_rebuild(ctx.clone()).await;
        assert!(ctx.pending.load(Ordering::SeqCst));
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        release_tx.send(()).unwrap();
        first.await.unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert!(reloads.try_recv().is_ok());
        assert!(reloads.try_recv().is_ok());
        assert!(matches!(
            reloads.try_recv(),
            Err(broadcast::error::TryRecvError::Empty)
        ));
        assert!(!ctx.rebuilding.load(Ordering::SeqCst));
        assert!(!ctx.pending.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn idle_trigger_runs_exactly_one_build() {
        let fixture = ContentFixture::new().write();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let builder = move |_: &RosterConfig| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok::<_, GenerateError>(BuildSummary::default())
        };
        let ctx = ServerContext::with_builder(fixture.config(), Arc::new(builder));

        request_rebuild(ctx.clone()).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(!ctx.rebuilding.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn serves_under_base_path_after_rebuild() {
        let fixture = ContentFixture::new().write();
        let mut config = fixture.config();
        config.site.base_path = Some("/roster".into());
        let ctx = ServerContext::new(config);
        request_rebuild(ctx.clone()).await;

        let (status, _, body) = get_path(ctx, "/roster/artists/").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains(r#"href="/roster/artists/ana-lee/""#));
    }
}
