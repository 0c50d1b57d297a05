//! HTTP routes: the wiki app descriptor, lifecycle hooks, editor and renderer
//! pages, the playground pages, and the built assets.

use crate::config::ServerConfig;
use axum::{
    Json, Router,
    body::Bytes,
    extract::{Path, Request, State},
    http::{HeaderMap, StatusCode, Uri, header},
    middleware::{self, Next},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use serde::Deserialize;
use serde_json::{Value, json};
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};
use tracing::{info, warn};

pub const DESCRIPTOR_FILE: &str = "atlassian-connect.json";

pub type AppState = Arc<ServerConfig>;

pub fn router(config: ServerConfig) -> Router {
    let canonical = config.canonical_host.clone();
    let static_dir = config.dist_path("static");
    let images_dir = config.dist_path("images");
    let fallback = ServeDir::new(&config.dist_dir);
    let state: AppState = Arc::new(config);

    let app = Router::new()
        .route("/confluence/atlassian-connect.json", get(descriptor))
        .route("/confluence/lifecycle/installed", post(installed))
        .route("/confluence/lifecycle/uninstalled", post(uninstalled))
        .route("/excalidraw/editor", get(editor_page))
        .route("/excalidraw/renderer", get(renderer_page))
        .route("/playground/", get(playground_list))
        .route("/playground/{id}/", get(playground_detail))
        .route("/playground/{id}/edit", get(playground_edit))
        .route("/health", get(health))
        .nest_service("/static", ServeDir::new(static_dir))
        .nest_service("/images", ServeDir::new(images_dir))
        .fallback_service(fallback)
        .with_state(state);

    let app = match canonical {
        Some(host) => app.layer(middleware::from_fn_with_state(
            Arc::new(host),
            canonical_redirect,
        )),
        None => app,
    };

    app.layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

async fn health() -> &'static str {
    "ok"
}

/// Places the descriptor may live, in lookup order.
fn descriptor_candidates(config: &ServerConfig) -> [PathBuf; 2] {
    [config.dist_path(DESCRIPTOR_FILE), PathBuf::from(DESCRIPTOR_FILE)]
}

async fn descriptor(State(config): State<AppState>) -> Response {
    for path in descriptor_candidates(&config) {
        if let Ok(body) = tokio::fs::read(&path).await {
            return ([(header::CONTENT_TYPE, "application/json")], body).into_response();
        }
    }
    (StatusCode::NOT_FOUND, "atlassian-connect.json not found").into_response()
}

/// Body of an install or uninstall callback. The shared secret is accepted
/// but never logged.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LifecyclePayload {
    pub client_key: String,
    #[allow(dead_code)]
    pub shared_secret: String,
    pub base_url: String,
}

fn lifecycle_ok() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

// The platform expects success even when the payload can't be read.
async fn installed(body: Bytes) -> Json<Value> {
    match serde_json::from_slice::<LifecyclePayload>(&body) {
        Ok(p) => info!(client_key = %p.client_key, base_url = %p.base_url, "App installed"),
        Err(e) => warn!("Failed to decode installed payload: {}", e),
    }
    lifecycle_ok()
}

async fn uninstalled(body: Bytes) -> Json<Value> {
    match serde_json::from_slice::<LifecyclePayload>(&body) {
        Ok(p) => info!(client_key = %p.client_key, "App uninstalled"),
        Err(e) => warn!("Failed to decode uninstalled payload: {}", e),
    }
    lifecycle_ok()
}

async fn read_page(config: &ServerConfig, dir: &str, name: &str) -> Option<String> {
    let path = config.dist_path(dir).join(name);
    tokio::fs::read_to_string(&path).await.ok()
}

async fn html_page(config: &ServerConfig, name: &str, missing: &'static str) -> Response {
    match read_page(config, "excalidraw", name).await {
        Some(html) => Html(html).into_response(),
        None => (StatusCode::NOT_FOUND, missing).into_response(),
    }
}

async fn editor_page(State(config): State<AppState>) -> Response {
    html_page(&config, "editor.html", "Editor not found").await
}

async fn renderer_page(State(config): State<AppState>) -> Response {
    html_page(&config, "renderer.html", "Renderer not found").await
}

/// Hand `id` to the page scripts as `window.PLAYGROUND_DRAWING_ID`.
///
/// The script goes just before `</head>`, or first when the page has no head.
pub fn inject_drawing_id(html: &str, id: &str) -> String {
    // `<` is escaped so an id can't close the script element.
    let literal = Value::String(id.to_string())
        .to_string()
        .replace('<', "\\u003c");
    let script = format!("<script>window.PLAYGROUND_DRAWING_ID = {};</script>", literal);
    match html.find("</head>") {
        Some(at) => format!("{}{}{}", &html[..at], script, &html[at..]),
        None => format!("{}{}", script, html),
    }
}

async fn playground_page(config: &ServerConfig, name: &str, id: Option<&str>) -> Response {
    match read_page(config, "playground", name).await {
        Some(html) => match id {
            Some(id) => Html(inject_drawing_id(&html, id)).into_response(),
            None => Html(html).into_response(),
        },
        None => (StatusCode::NOT_FOUND, "Playground page not found").into_response(),
    }
}

async fn playground_list(State(config): State<AppState>) -> Response {
    playground_page(&config, "index.html", None).await
}

async fn playground_detail(State(config): State<AppState>, Path(id): Path<String>) -> Response {
    playground_page(&config, "detail.html", Some(&id)).await
}

async fn playground_edit(State(config): State<AppState>, Path(id): Path<String>) -> Response {
    playground_page(&config, "edit.html", Some(&id)).await
}

/// Where a request should be sent instead, if anywhere. `www.` is dropped from
/// any host, and plain http to the canonical host is upgraded.
pub fn canonical_redirect_target(
    host: &str,
    proto: &str,
    path_and_query: &str,
    canonical: &str,
) -> Option<String> {
    let (target_host, stripped) = match host.strip_prefix("www.") {
        Some(rest) => (rest, true),
        None => (host, false),
    };
    let insecure = proto.eq_ignore_ascii_case("http") && host.contains(canonical);

    if stripped || insecure {
        Some(format!("https://{}{}", target_host, path_and_query))
    } else {
        None
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

fn path_and_query(uri: &Uri) -> &str {
    uri.path_and_query().map(|p| p.as_str()).unwrap_or("/")
}

async fn canonical_redirect(
    State(canonical): State<Arc<String>>,
    request: Request,
    next: Next,
) -> Response {
    let headers = request.headers();
    let host = header_str(headers, header::HOST.as_str()).unwrap_or_default();
    let proto = header_str(headers, "x-forwarded-proto").unwrap_or("http");

    match canonical_redirect_target(host, proto, path_and_query(request.uri()), &canonical) {
        Some(target) => {
            (StatusCode::MOVED_PERMANENTLY, [(header::LOCATION, target)]).into_response()
        }
        None => next.run(request).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn config_in(dir: &TempDir) -> AppState {
        Arc::new(ServerConfig {
            dist_dir: dir.path().to_path_buf(),
            ..ServerConfig::default()
        })
    }

    async fn body_text(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[test]
    fn test_canonical_redirects() {
        let c = "excaliframe.com";
        assert_eq!(
            canonical_redirect_target("www.excaliframe.com", "https", "/a?b=1", c).as_deref(),
            Some("https://excaliframe.com/a?b=1")
        );
        assert_eq!(
            canonical_redirect_target("excaliframe.com", "http", "/", c).as_deref(),
            Some("https://excaliframe.com/")
        );
        assert_eq!(canonical_redirect_target("excaliframe.com", "https", "/", c), None);
        // Local development stays on http.
        assert_eq!(canonical_redirect_target("localhost:3000", "http", "/", c), None);
    }

    #[tokio::test]
    async fn test_descriptor_from_dist() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(DESCRIPTOR_FILE), r#"{"key":"excaliframe"}"#).unwrap();

        let response = descriptor(State(config_in(&dir))).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/json"
        );
        assert_eq!(body_text(response).await, r#"{"key":"excaliframe"}"#);
    }

    #[tokio::test]
    async fn test_descriptor_missing() {
        let dir = TempDir::new().unwrap();
        let response = descriptor(State(config_in(&dir))).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_lifecycle_always_ok() {
        let good = Bytes::from_static(
            br#"{"clientKey":"k","sharedSecret":"s","baseUrl":"https://wiki.example"}"#,
        );
        assert_eq!(installed(good).await.0, json!({ "status": "ok" }));
        assert_eq!(
            installed(Bytes::from_static(b"not json")).await.0,
            json!({ "status": "ok" })
        );
        assert_eq!(
            uninstalled(Bytes::new()).await.0,
            json!({ "status": "ok" })
        );
    }

    #[tokio::test]
    async fn test_editor_and_renderer_pages() {
        let dir = TempDir::new().unwrap();
        let config = config_in(&dir);

        let response = editor_page(State(config.clone())).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_text(response).await, "Editor not found");

        std::fs::create_dir_all(dir.path().join("excalidraw")).unwrap();
        std::fs::write(dir.path().join("excalidraw/renderer.html"), "<html>r</html>").unwrap();

        let response = renderer_page(State(config)).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "<html>r</html>");
    }

    fn write_playground(dir: &TempDir, name: &str, html: &str) {
        std::fs::create_dir_all(dir.path().join("playground")).unwrap();
        std::fs::write(dir.path().join("playground").join(name), html).unwrap();
    }

    #[test]
    fn test_inject_drawing_id() {
        assert_eq!(
            inject_drawing_id("<html><head><title>t</title></head></html>", "abc"),
            r#"<html><head><title>t</title><script>window.PLAYGROUND_DRAWING_ID = "abc";</script></head></html>"#
        );
        assert_eq!(
            inject_drawing_id("<body></body>", "x"),
            r#"<script>window.PLAYGROUND_DRAWING_ID = "x";</script><body></body>"#
        );

        let hostile = inject_drawing_id("", r#"</script>""#);
        assert_eq!(
            hostile,
            r#"<script>window.PLAYGROUND_DRAWING_ID = "\u003c/script>\"";</script>"#
        );
    }

    #[tokio::test]
    async fn test_playground_pages() {
        let dir = TempDir::new().unwrap();
        let config = config_in(&dir);
        write_playground(&dir, "index.html", "<head></head>list");
        write_playground(&dir, "detail.html", "<head></head>detail");
        write_playground(&dir, "edit.html", "<head></head>edit");

        let response = playground_list(State(config.clone())).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "<head></head>list");

        let response = playground_detail(State(config.clone()), Path("d1".to_string())).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_text(response).await,
            r#"<head><script>window.PLAYGROUND_DRAWING_ID = "d1";</script></head>detail"#
        );

        let response = playground_edit(State(config), Path("d2".to_string())).await;
        let body = body_text(response).await;
        assert!(body.contains(r#"window.PLAYGROUND_DRAWING_ID = "d2";"#));
        assert!(body.ends_with("edit"));
    }

    #[tokio::test]
    async fn test_playground_page_missing() {
        let dir = TempDir::new().unwrap();
        let response = playground_edit(State(config_in(&dir)), Path("d1".to_string())).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_text(response).await, "Playground page not found");
    }

    #[test]
    fn test_router_builds_with_redirect() {
        let _ = router(ServerConfig {
            canonical_host: Some("excaliframe.com".to_string()),
            ..ServerConfig::default()
        });
    }
}
