use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use tracing::{error, info, warn};

use crate::error::ServiceError;
use crate::http::server::AppState;
use crate::http::types::{ExtractBody, ExtractQuery, ExtractResponse};
use crate::utils::{fetch, pdf};

/// Handles `GET`/`POST /`: downloads the PDF named by `fileURL` and returns
/// its embedded text as a JSON envelope.
///
/// The file location is taken from the query string if present, otherwise
/// from the JSON request body. Every outcome, expected or not, maps onto
/// exactly one envelope: 200 with text, 400 for caller mistakes, 500 for
/// everything else.
pub async fn extract_text(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ExtractQuery>,
    body: Bytes,
) -> (StatusCode, Json<ExtractResponse>) {
    let file_url = query.file_url.or_else(|| file_url_from_body(&body));

    let Some(file_url) = file_url else {
        warn!("Request without fileURL parameter");
        return (
            StatusCode::BAD_REQUEST,
            Json(ExtractResponse::error(
                ServiceError::MissingFileUrl.to_string(),
            )),
        );
    };

    info!("Extracting text from PDF at: {}", file_url);
    match run_pipeline(&state, &file_url).await {
        Ok(text) => (StatusCode::OK, Json(ExtractResponse::success(text))),
        Err(err) => {
            let status = err.status_code();
            if status.is_server_error() {
                error!("Extraction failed for {}: {}", file_url, err);
            } else {
                warn!("Refusing request for {}: {}", file_url, err);
            }
            (status, Json(ExtractResponse::error(err.to_string())))
        }
    }
}

/// A body that is absent, empty, or not valid JSON simply yields no
/// parameter; the missing-parameter response covers those cases.
fn file_url_from_body(body: &Bytes) -> Option<String> {
    if body.is_empty() {
        return None;
    }
    serde_json::from_slice::<ExtractBody>(body)
        .ok()
        .and_then(|b| b.file_url)
}

async fn run_pipeline(state: &AppState, file_url: &str) -> Result<String, ServiceError> {
    let fetched =
        fetch::fetch_remote_file(&state.http_client, file_url, state.max_pdf_bytes).await?;

    let head_len = fetched.bytes.len().min(512);
    if !pdf::is_pdf(fetched.content_type.as_deref(), &fetched.bytes[..head_len]) {
        warn!(
            url = %file_url,
            ct = ?fetched.content_type,
            "Content does not look like a PDF; attempting extraction anyway"
        );
    }

    pdf::extract_trimmed_text(&fetched.bytes)
}

#[cfg(test)]
mod tests {
    use std::net::SocketAddr;
    use std::sync::Arc;
    use std::time::Duration;

    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use axum::routing::get;
    use axum::Router;
    use tower::ServiceExt;

    use crate::http::server::{build_router, AppState, ServerConfig};
    use crate::http::types::ExtractResponse;
    use crate::utils::pdf::tests::{pdf_with_text, pdf_without_text};

    fn test_app() -> Router {
        let config = ServerConfig {
            addr: "127.0.0.1:0".parse().unwrap(),
            fetch_timeout: Duration::from_secs(10),
            max_pdf_bytes: 8 * 1024 * 1024,
        };
        build_router(Arc::new(AppState::new(&config).unwrap()))
    }

    /// Spawns a throwaway listener that plays the remote file host.
    async fn spawn_upstream() -> SocketAddr {
        let app = Router::new()
            .route("/ok.pdf", get(|| async { pdf_with_text("Hello World") }))
            .route(
                "/padded.pdf",
                get(|| async { pdf_with_text("  Hello World  ") }),
            )
            .route("/scan.pdf", get(|| async { pdf_without_text() }))
            .route("/notes.txt", get(|| async { "plain text, not a PDF" }))
            .route(
                "/missing.pdf",
                get(|| async { (StatusCode::NOT_FOUND, "no such file") }),
            )
            .route(
                "/broken.pdf",
                get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "origin exploded") }),
            );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        addr
    }

    async fn call(request: Request<Body>) -> (StatusCode, ExtractResponse) {
        let response = test_app().oneshot(request).await.unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    fn get_request(file_url: &str) -> Request<Body> {
        Request::builder()
            .uri(format!("/?fileURL={}", file_url))
            .body(Body::empty())
            .unwrap()
    }

    fn post_request(body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/")
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap()
    }

    #[tokio::test]
    async fn missing_parameter_is_a_client_error() {
        let (status, envelope) = call(Request::builder().uri("/").body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(!envelope.ok);
        assert_eq!(envelope.error.as_deref(), Some("Missing fileURL parameter"));
        assert!(envelope.text.is_none());
    }

    #[tokio::test]
    async fn missing_parameter_in_posted_body_is_a_client_error() {
        let (status, envelope) = call(post_request(serde_json::json!({}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(envelope.error.as_deref(), Some("Missing fileURL parameter"));
    }

    #[tokio::test]
    async fn extracts_text_from_query_parameter_url() {
        let upstream = spawn_upstream().await;
        let (status, envelope) = call(get_request(&format!("http://{}/ok.pdf", upstream))).await;
        assert_eq!(status, StatusCode::OK);
        assert!(envelope.ok);
        assert_eq!(envelope.text.as_deref(), Some("Hello World"));
        assert!(envelope.error.is_none());
    }

    #[tokio::test]
    async fn extracts_text_from_body_url() {
        let upstream = spawn_upstream().await;
        let (status, envelope) = call(post_request(serde_json::json!({
            "fileURL": format!("http://{}/ok.pdf", upstream)
        })))
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(envelope.text.as_deref(), Some("Hello World"));
    }

    #[tokio::test]
    async fn query_parameter_wins_over_body() {
        let upstream = spawn_upstream().await;
        let request = Request::builder()
            .method("POST")
            .uri(format!("/?fileURL=http://{}/ok.pdf", upstream))
            .header("content-type", "application/json")
            .body(Body::from(
                serde_json::to_vec(&serde_json::json!({
                    "fileURL": format!("http://{}/missing.pdf", upstream)
                }))
                .unwrap(),
            ))
            .unwrap();
        let (status, envelope) = call(request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(envelope.text.as_deref(), Some("Hello World"));
    }

    #[tokio::test]
    async fn extracted_text_is_trimmed() {
        let upstream = spawn_upstream().await;
        let (status, envelope) =
            call(get_request(&format!("http://{}/padded.pdf", upstream))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(envelope.text.as_deref(), Some("Hello World"));
    }

    #[tokio::test]
    async fn pdf_without_text_layer_is_an_empty_success() {
        let upstream = spawn_upstream().await;
        let (status, envelope) = call(get_request(&format!("http://{}/scan.pdf", upstream))).await;
        assert_eq!(status, StatusCode::OK);
        assert!(envelope.ok);
        assert_eq!(envelope.text.as_deref(), Some(""));
    }

    #[tokio::test]
    async fn upstream_not_found_is_a_client_error() {
        let upstream = spawn_upstream().await;
        let (status, envelope) =
            call(get_request(&format!("http://{}/missing.pdf", upstream))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            envelope.error.as_deref(),
            Some("Unable to fetch file from provided URL")
        );
    }

    #[tokio::test]
    async fn upstream_server_error_is_a_client_error() {
        let upstream = spawn_upstream().await;
        let (status, envelope) =
            call(get_request(&format!("http://{}/broken.pdf", upstream))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            envelope.error.as_deref(),
            Some("Unable to fetch file from provided URL")
        );
    }

    #[tokio::test]
    async fn non_pdf_content_is_a_server_error() {
        let upstream = spawn_upstream().await;
        let (status, envelope) =
            call(get_request(&format!("http://{}/notes.txt", upstream))).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!envelope.ok);
        assert!(!envelope.error.unwrap().is_empty());
    }

    #[tokio::test]
    async fn unreachable_upstream_is_a_server_error() {
        // Bind a port and release it so the connect below fails.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let (status, envelope) = call(get_request(&format!("http://{}/ok.pdf", addr))).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!envelope.ok);
        assert!(!envelope.error.unwrap().is_empty());
    }
}
