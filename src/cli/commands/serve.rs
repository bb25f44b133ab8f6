//! HTTP API server for the browser extensions and other clients.
//!
//! Provides REST endpoints for document upload, grounded questions, risk
//! reports, document management and video questions.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::error::DocentError;
use crate::orchestrator::{IngestResult, Orchestrator};
use crate::store::DocumentInfo;
use axum::{
    extract::{
        multipart::MultipartRejection, rejection::JsonRejection,
        DefaultBodyLimit, Multipart, Path, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info};

/// Shared application state.
pub struct AppState {
    orchestrator: Orchestrator,
}

impl AppState {
    pub fn new(orchestrator: Orchestrator) -> Self {
        Self { orchestrator }
    }
}

/// Run the HTTP API server.
pub async fn run_serve(host: Option<String>, port: Option<u16>, settings: Settings) -> anyhow::Result<()> {
    if let Err(e) = preflight::check(Operation::Serve, &settings) {
        Output::error(&format!("{}", e));
        Output::info("Run 'docent doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let host = host.unwrap_or_else(|| settings.server.host.clone());
    let port = port.unwrap_or(settings.server.port);
    let max_upload_bytes = settings.server.max_upload_bytes;

    let state = Arc::new(AppState::new(Orchestrator::new(settings)?));
    let app = router(state, max_upload_bytes);

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on {}", addr);

    Output::header("Docent API Server");
    println!();
    Output::success(&format!("Listening on http://{}", addr));
    println!();
    println!("Endpoints:");
    Output::kv("Health", "GET    /health");
    Output::kv("Upload", "POST   /upload");
    Output::kv("Ask", "POST   /ask");
    Output::kv("Risk report", "POST   /analyze_risk");
    Output::kv("List documents", "GET    /documents");
    Output::kv("Delete document", "DELETE /documents/{id}");
    Output::kv("Ask about video", "POST   /video/ask");
    println!();
    Output::info("Press Ctrl+C to stop the server.");

    axum::serve(listener, app).await?;

    Ok(())
}

/// Build the API router.
pub fn router(state: Arc<AppState>, max_upload_bytes: usize) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/upload", post(upload))
        .route("/ask", post(ask))
        .route("/analyze_risk", post(analyze_risk))
        .route("/documents", get(list_documents))
        .route("/documents/{document_id}", delete(delete_document))
        .route("/video/ask", post(ask_video))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// === Request/Response Types ===

#[derive(Deserialize)]
struct AskRequest {
    document_id: String,
    question: String,
}

#[derive(Deserialize)]
struct RiskRequest {
    document_id: String,
}

#[derive(Deserialize)]
struct VideoAskRequest {
    video_id: String,
    question: String,
}

#[derive(Serialize)]
struct UploadResponse {
    #[serde(flatten)]
    ingested: IngestResult,
    message: String,
}

#[derive(Serialize)]
struct DocumentListResponse {
    documents: Vec<DocumentInfo>,
}

#[derive(Serialize)]
struct MessageResponse {
    message: String,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    detail: String,
}

/// A pipeline error rendered as a JSON response.
struct ApiError(DocentError);

impl From<DocentError> for ApiError {
    fn from(e: DocentError) -> Self {
        Self(e)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self(DocentError::InvalidInput(rejection.body_text()))
    }
}

impl From<MultipartRejection> for ApiError {
    fn from(rejection: MultipartRejection) -> Self {
        Self(DocentError::InvalidInput(rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let code = self.0.code();
        let status = match code {
            "invalid_input" | "transcript_unavailable" => StatusCode::BAD_REQUEST,
            "not_found" => StatusCode::NOT_FOUND,
            "extraction_failed" => StatusCode::UNPROCESSABLE_ENTITY,
            "analysis_failed" | "malformed_model_output" => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            error!(code, "Request failed: {}", self.0);
        } else {
            debug!(code, "Request rejected: {}", self.0);
        }

        (
            status,
            Json(ErrorResponse {
                error: code.to_string(),
                detail: self.0.to_string(),
            }),
        )
            .into_response()
    }
}

type ApiResult<T> = std::result::Result<Json<T>, ApiError>;

// === Handlers ===

async fn root() -> impl IntoResponse {
    Json(serde_json::json!({
        "message": "Docent API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "/upload": "POST - Upload PDF/TXT document",
            "/ask": "POST - Ask question about document",
            "/analyze_risk": "POST - Get comprehensive risk report",
            "/documents": "GET - List uploaded documents",
            "/documents/{id}": "DELETE - Delete document",
            "/video/ask": "POST - Ask question about a YouTube video",
        }
    }))
}

async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "documents": state.orchestrator.store().len(),
    }))
}

async fn upload(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<UploadResponse> {
    let mut multipart = multipart?;
    let invalid = |e: axum::extract::multipart::MultipartError| {
        DocentError::InvalidInput(format!("Malformed upload: {}", e))
    };

    while let Some(field) = multipart.next_field().await.map_err(invalid)? {
        if field.name() != Some("file") {
            continue;
        }

        let filename = field
            .file_name()
            .map(str::to_string)
            .ok_or_else(|| DocentError::InvalidInput("Uploaded file has no filename".into()))?;
        let bytes = field.bytes().await.map_err(invalid)?;

        let ingested = state.orchestrator.ingest(&filename, bytes.to_vec()).await?;
        return Ok(Json(UploadResponse {
            ingested,
            message: "Document uploaded and processed successfully".to_string(),
        }));
    }

    Err(DocentError::InvalidInput("Missing multipart field 'file'".into()).into())
}

async fn ask(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<AskRequest>, JsonRejection>,
) -> ApiResult<crate::orchestrator::QueryAnswer> {
    let Json(req) = payload?;
    Ok(Json(state.orchestrator.ask(&req.document_id, &req.question).await?))
}

async fn analyze_risk(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<RiskRequest>, JsonRejection>,
) -> ApiResult<crate::risk::RiskReport> {
    let Json(req) = payload?;
    Ok(Json(state.orchestrator.assess_risk(&req.document_id).await?))
}

async fn list_documents(State(state): State<Arc<AppState>>) -> Json<DocumentListResponse> {
    Json(DocumentListResponse {
        documents: state.orchestrator.list_documents(),
    })
}

async fn delete_document(
    State(state): State<Arc<AppState>>,
    Path(document_id): Path<String>,
) -> ApiResult<MessageResponse> {
    state.orchestrator.delete_document(&document_id)?;
    Ok(Json(MessageResponse {
        message: format!("Document {} deleted successfully", document_id),
    }))
}

async fn ask_video(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<VideoAskRequest>, JsonRejection>,
) -> ApiResult<crate::orchestrator::VideoAnswer> {
    let Json(req) = payload?;
    Ok(Json(state.orchestrator.ask_video(&req.video_id, &req.question).await?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Prompts;
    use crate::embedding::HashingEmbedder;
    use crate::store::DocumentStore;
    use crate::testing::{CannedTranscripts, GroundedStubModel, ScriptedModel};
    use crate::llm::LanguageModel;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request};
    use serde_json::Value;
    use tower::ServiceExt;

    const BOUNDARY: &str = "docent-test-boundary";
    const LEASE: &str = "The tenant shall pay $500 monthly rent on the first of each month.";

    fn app_with(llm: Arc<dyn LanguageModel>) -> Router {
        let transcripts = CannedTranscripts::default()
            .with("dQw4w9WgXcQ", "The oven must be at 250 degrees.");
        let orchestrator = Orchestrator::with_components(
            Settings::default(),
            Prompts::default(),
            Arc::new(HashingEmbedder::new(384)),
            llm,
            Arc::new(transcripts),
            Arc::new(DocumentStore::new()),
        )
        .unwrap();
        router(Arc::new(AppState::new(orchestrator)), 1024 * 1024)
    }

    fn app() -> Router {
        let not_found = Prompts::default().rag.document.not_found;
        app_with(Arc::new(GroundedStubModel::new(&not_found)))
    }

    fn upload_request(filename: &str, content: &str) -> Request<Body> {
        let body = format!(
            "--{b}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{f}\"\r\nContent-Type: text/plain\r\n\r\n{c}\r\n--{b}--\r\n",
            b = BOUNDARY,
            f = filename,
            c = content
        );
        Request::builder()
            .method("POST")
            .uri("/upload")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .body(Body::from(body))
            .unwrap()
    }

    fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = send(
            &app(),
            Request::builder().uri("/health").body(Body::empty()).unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_upload_ask_list_delete() {
        let app = app();

        let (status, body) = send(&app, upload_request("lease.txt", LEASE)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["document_id"], "lease_txt");
        assert_eq!(body["filename"], "lease.txt");
        assert_eq!(body["num_chunks"], 1);

        let (status, body) = send(
            &app,
            json_request(
                "POST",
                "/ask",
                serde_json::json!({"document_id": "lease_txt", "question": "How much is the rent?"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["answer"].as_str().unwrap().contains("500"));
        assert_eq!(body["filename"], "lease.txt");

        let (status, body) = send(
            &app,
            Request::builder().uri("/documents").body(Body::empty()).unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["documents"][0]["document_id"], "lease_txt");

        let delete = Request::builder()
            .method("DELETE")
            .uri("/documents/lease_txt")
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(&app, delete).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Document lease_txt deleted successfully");

        let delete_again = Request::builder()
            .method("DELETE")
            .uri("/documents/lease_txt")
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(&app, delete_again).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "not_found");
    }

    #[tokio::test]
    async fn test_upload_rejects_unsupported_type() {
        let (status, body) = send(&app(), upload_request("lease.docx", LEASE)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "invalid_input");
        assert_eq!(body["detail"], "Invalid input: Only PDF and TXT files are supported");
    }

    #[tokio::test]
    async fn test_malformed_json_bodies_are_invalid_input() {
        let app = app();

        let (status, body) = send(
            &app,
            json_request("POST", "/ask", serde_json::json!({"document_id": "x"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "invalid_input");
        assert!(body["detail"].as_str().unwrap().contains("question"));

        let not_json = Request::builder()
            .method("POST")
            .uri("/analyze_risk")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{document_id"))
            .unwrap();
        let (status, body) = send(&app, not_json).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "invalid_input");

        let no_content_type = Request::builder()
            .method("POST")
            .uri("/video/ask")
            .body(Body::from(r#"{"video_id": "dQw4w9WgXcQ", "question": "Why?"}"#))
            .unwrap();
        let (status, body) = send(&app, no_content_type).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "invalid_input");
    }

    #[tokio::test]
    async fn test_upload_without_multipart_is_invalid_input() {
        let (status, body) = send(
            &app(),
            json_request("POST", "/upload", serde_json::json!({"file": "lease.txt"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "invalid_input");
        assert!(body["detail"].as_str().unwrap().starts_with("Invalid input: "));
    }

    #[tokio::test]
    async fn test_ask_unknown_document() {
        let (status, body) = send(
            &app(),
            json_request(
                "POST",
                "/ask",
                serde_json::json!({"document_id": "missing", "question": "Anything?"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "not_found");
    }

    #[tokio::test]
    async fn test_malformed_risk_reply_is_bad_gateway() {
        let app = app_with(Arc::new(ScriptedModel::replying("not json")));
        send(&app, upload_request("lease.txt", LEASE)).await;

        let (status, body) = send(
            &app,
            json_request("POST", "/analyze_risk", serde_json::json!({"document_id": "lease_txt"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["error"], "malformed_model_output");
    }

    #[tokio::test]
    async fn test_video_ask() {
        let not_found = Prompts::default().rag.video.not_found;
        let app = app_with(Arc::new(GroundedStubModel::new(&not_found)));

        let (status, body) = send(
            &app,
            json_request(
                "POST",
                "/video/ask",
                serde_json::json!({"video_id": "dQw4w9WgXcQ", "question": "How hot is the oven?"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["video_id"], "dQw4w9WgXcQ");
        assert!(body["answer"].as_str().unwrap().contains("250"));

        let (status, body) = send(
            &app,
            json_request(
                "POST",
                "/video/ask",
                serde_json::json!({"video_id": "aaaaaaaaaaa", "question": "What happens?"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "transcript_unavailable");
    }
}
