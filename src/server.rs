//! HTTP server setup: router, handlers, and resolver failure mapping.
//!
//! ## Routes
//!
//! - `GET /` — redirect (307) to `/view/{slug}` with a fresh time-based slug,
//!   so every visit gets a URL browsers won't serve from history cache.
//! - `GET /view/{slug}` — HTML page embedding a freshly picked random image.
//!   The slug itself is unused input; only its freshness matters.
//! - `GET /image/{filename}` — the image bytes, with the full anti-cache
//!   header set. The filename is untrusted and goes through
//!   [`ImageResolver::resolve_requested_image`] before any read.
//! - `GET /settings` — client-side settings page.
//! - `GET /health` — JSON liveness probe.
//!
//! ## Failure mapping
//!
//! The resolver never decides user-visible behavior; each of its failure
//! kinds maps to one status here (enumeration failure → 500, empty library →
//! 404, traversal attempt → 400, missing file → 404) and renders as an error
//! page. A file deleted between validation and read is the tolerated race
//! and surfaces as 404.

use axum::Router;
use axum::extract::{Path, State};
use axum::http::{HeaderName, StatusCode, header};
use axum::response::{Html, IntoResponse, Json, Redirect, Response};
use axum::routing::get;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tower_http::trace::TraceLayer;

use crate::config::ServerConfig;
use crate::mime;
use crate::render;
use crate::resolver::{ImageResolver, ResolveError};

/// Shared per-process state: the resolver and the Open Graph URL prefix.
pub struct AppState {
    pub resolver: ImageResolver,
    pub og_prefix: String,
}

/// Build the application router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/view/{slug}", get(view))
        .route("/image/{filename}", get(image))
        .route("/settings", get(settings))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Load the resolver from config and serve until the process is stopped.
pub async fn run(config: ServerConfig) -> anyhow::Result<()> {
    let addr = config.bind_addr()?;
    let resolver = ImageResolver::new(&config.image_root)?;
    let state = Arc::new(AppState {
        og_prefix: config.og_prefix().to_string(),
        resolver,
    });

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(
        %addr,
        root = %state.resolver.root().display(),
        "shufflepic listening"
    );
    axum::serve(listener, router(state)).await?;
    Ok(())
}

// -- Handlers --

async fn home() -> Redirect {
    Redirect::temporary(&format!("/view/{}", fresh_slug()))
}

async fn view(State(state): State<Arc<AppState>>) -> Response {
    // The walk re-runs per request and can block on filesystem I/O for a
    // large tree; keep it off the async workers.
    let picker = state.clone();
    let picked = tokio::task::spawn_blocking(move || picker.resolver.pick_random_image()).await;

    let path = match picked {
        Ok(Ok(path)) => path,
        Ok(Err(err)) => return failure_response(&err),
        Err(join_err) => {
            let err = ResolveError::Enumeration(std::io::Error::other(join_err));
            return failure_response(&err);
        }
    };

    let filename = match path.file_name() {
        Some(name) => name.to_string_lossy().into_owned(),
        None => return failure_response(&ResolveError::NotFound),
    };
    tracing::debug!(%filename, "picked random image");

    let image_url = format!("/image/{filename}?t={}", unix_seconds());
    let og_image_url = format!("{}{image_url}", state.og_prefix);
    let page = render::view_page(&image_url, &og_image_url);

    (
        StatusCode::OK,
        [(header::CACHE_CONTROL, "no-store")],
        Html(page.into_string()),
    )
        .into_response()
}

async fn image(State(state): State<Arc<AppState>>, Path(filename): Path<String>) -> Response {
    let resolved = match state.resolver.resolve_requested_image(&filename) {
        Ok(path) => path,
        Err(err) => return failure_response(&err),
    };

    let bytes = match tokio::fs::read(&resolved).await {
        Ok(bytes) => bytes,
        // Deleted between validation and read: the tolerated race.
        Err(_) => return failure_response(&ResolveError::NotFound),
    };

    let name = resolved
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, mime::content_type(&resolved).to_string()),
            (
                header::CACHE_CONTROL,
                "no-store, no-cache, must-revalidate, proxy-revalidate".to_string(),
            ),
            (header::PRAGMA, "no-cache".to_string()),
            (header::EXPIRES, "0".to_string()),
            (
                HeaderName::from_static("surrogate-control"),
                "no-store".to_string(),
            ),
            (
                header::CONTENT_DISPOSITION,
                format!("inline; filename=\"{name}\""),
            ),
        ],
        bytes,
    )
        .into_response()
}

async fn settings() -> Html<String> {
    Html(render::settings_page().into_string())
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

// -- Failure mapping --

fn failure_response(err: &ResolveError) -> Response {
    let (status, message) = match err {
        ResolveError::Enumeration(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Could not read the image library",
        ),
        ResolveError::NoImagesFound => (StatusCode::NOT_FOUND, "No images to serve"),
        ResolveError::InvalidFilename => (StatusCode::BAD_REQUEST, "Invalid filename"),
        ResolveError::NotFound => (StatusCode::NOT_FOUND, "Image not found"),
    };

    if status.is_server_error() {
        tracing::error!(error = %err, "resolver failure");
    } else {
        tracing::warn!(error = %err, "request rejected");
    }

    (
        status,
        Html(render::error_page(status.as_u16(), message).into_string()),
    )
        .into_response()
}

// -- Slugs --

/// Unix-nanos timestamp in base-36: a short, unique-enough slug so each
/// redirect lands on a URL the browser has never cached.
fn fresh_slug() -> String {
    base36(unix_nanos())
}

fn unix_nanos() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default()
}

fn unix_seconds() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

fn base36(mut n: u128) -> String {
    const DIGITS: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if n == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while n > 0 {
        out.push(DIGITS[(n % 36) as usize]);
        n /= 36;
    }
    out.reverse();
    // Digits are ASCII, so this cannot fail.
    String::from_utf8(out).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::image_tree;

    fn test_state(tmp: &tempfile::TempDir) -> Arc<AppState> {
        Arc::new(AppState {
            resolver: ImageResolver::with_seed(tmp.path(), 11).unwrap(),
            og_prefix: String::new(),
        })
    }

    // =========================================================================
    // Slugs
    // =========================================================================

    #[test]
    fn base36_encodes_known_values() {
        assert_eq!(base36(0), "0");
        assert_eq!(base36(35), "z");
        assert_eq!(base36(36), "10");
        assert_eq!(base36(36 * 36 + 1), "101");
    }

    #[test]
    fn fresh_slug_is_lowercase_alphanumeric() {
        let slug = fresh_slug();
        assert!(!slug.is_empty());
        assert!(slug.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
    }

    // =========================================================================
    // Failure mapping
    // =========================================================================

    #[test]
    fn each_failure_kind_maps_to_its_status() {
        let io = std::io::Error::other("walk aborted");
        let cases = [
            (ResolveError::Enumeration(io), StatusCode::INTERNAL_SERVER_ERROR),
            (ResolveError::NoImagesFound, StatusCode::NOT_FOUND),
            (ResolveError::InvalidFilename, StatusCode::BAD_REQUEST),
            (ResolveError::NotFound, StatusCode::NOT_FOUND),
        ];
        for (err, expected) in cases {
            assert_eq!(failure_response(&err).status(), expected, "{err}");
        }
    }

    // =========================================================================
    // Handlers
    // =========================================================================

    #[tokio::test]
    async fn home_redirects_to_a_view_url() {
        let response = home().await.into_response();
        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
        let location = response.headers().get(header::LOCATION).unwrap();
        assert!(location.to_str().unwrap().starts_with("/view/"));
    }

    #[tokio::test]
    async fn view_embeds_a_serving_url_and_disables_caching() {
        let tmp = image_tree(&["cat1.jpg"]);
        let response = view(State(test_state(&tmp))).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CACHE_CONTROL).unwrap(),
            "no-store"
        );

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let html = String::from_utf8(body.to_vec()).unwrap();
        assert!(html.contains("/image/cat1.jpg?t="));
    }

    #[tokio::test]
    async fn view_of_empty_library_is_404() {
        let tmp = image_tree(&["notes.txt"]);
        let response = view(State(test_state(&tmp))).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn image_serves_bytes_with_anti_cache_headers() {
        let tmp = image_tree(&["cat1.jpg"]);
        let response = image(State(test_state(&tmp)), Path("cat1.jpg".to_string())).await;
        assert_eq!(response.status(), StatusCode::OK);

        let headers = response.headers();
        assert_eq!(headers.get(header::CONTENT_TYPE).unwrap(), "image/jpeg");
        assert_eq!(
            headers.get(header::CACHE_CONTROL).unwrap(),
            "no-store, no-cache, must-revalidate, proxy-revalidate"
        );
        assert_eq!(headers.get(header::PRAGMA).unwrap(), "no-cache");
        assert_eq!(headers.get(header::EXPIRES).unwrap(), "0");
        assert_eq!(headers.get("surrogate-control").unwrap(), "no-store");
        assert_eq!(
            headers.get(header::CONTENT_DISPOSITION).unwrap(),
            r#"inline; filename="cat1.jpg""#
        );

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(body.as_ref(), b"fake image");
    }

    #[tokio::test]
    async fn image_rejects_traversal_with_400() {
        let tmp = image_tree(&["cat1.jpg"]);
        for name in ["../cat1.jpg", "..", "a/b.jpg", "a\\b.jpg"] {
            let response = image(State(test_state(&tmp)), Path(name.to_string())).await;
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{name:?}");
        }
    }

    #[tokio::test]
    async fn image_missing_file_is_404() {
        let tmp = image_tree(&["cat1.jpg"]);
        let response = image(State(test_state(&tmp)), Path("missing.png".to_string())).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let response = health().await.into_response();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
