use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::Bytes,
    extract::{
        multipart::MultipartRejection,
        rejection::{JsonRejection, PathRejection, QueryRejection},
        DefaultBodyLimit, FromRequest, FromRequestParts, Multipart, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::json;
use tower_http::cors::CorsLayer;
use tracing::{error, info, warn};

use crate::config::AppConfig;
use crate::fetch::HttpFetcher;
use crate::history::{HistoryEntry, HistoryStore, NewEntry};
use crate::metrics::Metrics;
use crate::pdf;
use crate::research::{is_placeholder_topic, ResearchAgent, ResultItem};
use crate::summarize::{summarize, summarize_with, DEFAULT_MAX_SENTENCES};

pub const SERVICE_NAME: &str = "research-agent-api";

/// Upload cap for `/api/pdf` (axum's default of 2 MB is too small for documents).
const UPLOAD_LIMIT_BYTES: usize = 25 * 1024 * 1024;
const CONTENT_SAMPLE_CHARS: usize = 500;

#[derive(Clone)]
pub struct AppState {
    agent: ResearchAgent,
    history: Arc<HistoryStore>,
    default_depth: i64,
}

impl AppState {
    pub fn new(agent: ResearchAgent, history: Arc<HistoryStore>, default_depth: i64) -> Self {
        Self {
            agent,
            history,
            default_depth,
        }
    }

    /// Live state: HTTP fetcher plus the file-backed history from `cfg`.
    pub fn from_config(cfg: &AppConfig) -> anyhow::Result<Self> {
        let fetcher = HttpFetcher::new()?;
        let history = HistoryStore::open(&cfg.history_path);
        Ok(Self::new(
            ResearchAgent::new(Arc::new(fetcher)),
            Arc::new(history),
            cfg.default_depth,
        ))
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }
}

/// Build the full application router from configuration.
pub fn create_router(cfg: &AppConfig) -> anyhow::Result<Router> {
    let state = AppState::from_config(cfg)?;
    let mut app = router(state);
    if cfg.metrics_route {
        let metrics = Metrics::init()?;
        app = app.merge(metrics.router());
    }
    Ok(app)
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/research", get(research).post(research))
        .route("/api/prompt", get(prompt).post(prompt))
        .route("/api/history", get(history_all))
        .route("/api/history/{id}", get(history_by_id))
        .route("/api/topics", get(topics))
        .route("/api/summarize", post(summarize_text))
        .route("/api/pdf", post(upload_pdf))
        .layer(DefaultBodyLimit::max(UPLOAD_LIMIT_BYTES))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

// ------------------------------------------------------------
// Errors
// ------------------------------------------------------------

/// HTTP error rendered as `{"detail": "..."}`.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    detail: String,
}

impl ApiError {
    fn new(status: StatusCode, detail: impl Into<String>) -> Self {
        Self {
            status,
            detail: detail.into(),
        }
    }

    fn bad_request(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, detail)
    }

    fn not_found(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, detail)
    }

    fn unprocessable(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, detail)
    }

    fn internal(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, detail)
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(e: anyhow::Error) -> Self {
        error!(error = ?e, "request failed");
        Self::internal(format!("{e:#}"))
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(e: tokio::task::JoinError) -> Self {
        error!(error = %e, "background task failed");
        Self::internal(e.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(r: JsonRejection) -> Self {
        let status = match &r {
            JsonRejection::JsonDataError(_) | JsonRejection::JsonSyntaxError(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            _ => r.status(),
        };
        Self::new(status, r.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(r: QueryRejection) -> Self {
        Self::bad_request(r.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(r: PathRejection) -> Self {
        Self::new(r.status(), r.body_text())
    }
}

impl From<MultipartRejection> for ApiError {
    fn from(r: MultipartRejection) -> Self {
        Self::new(r.status(), r.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "detail": self.detail }))).into_response()
    }
}

// Extractors whose rejections render as `ApiError`.

#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
struct JsonBody<T>(T);

#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
struct QueryParams<T>(T);

#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
struct PathParam<T>(T);

// ------------------------------------------------------------
// Handlers
// ------------------------------------------------------------

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "healthy", "service": SERVICE_NAME }))
}

#[derive(Deserialize)]
struct ResearchQuery {
    topic: Option<String>,
    depth: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct ResearchBody {
    topic: Option<String>,
    depth: Option<i64>,
}

#[derive(Deserialize)]
struct PromptQuery {
    prompt: Option<String>,
    depth: Option<i64>,
}

#[derive(Deserialize)]
struct PromptBody {
    prompt: Option<String>,
    depth: Option<i64>,
}

#[derive(Debug, Serialize)]
struct ResearchResponse {
    research_id: u64,
    topic: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    prompt: Option<String>,
    results: Vec<ResultItem>,
    result_count: usize,
    processing_time: f64,
}

/// GET (query) or POST (JSON body, falling back to query when the body is empty).
async fn research(
    State(state): State<AppState>,
    QueryParams(q): QueryParams<ResearchQuery>,
    body: Bytes,
) -> Result<Json<ResearchResponse>, ApiError> {
    let (topic, depth) = match parse_body::<ResearchBody>(&body)? {
        Some(b) => match b.topic.filter(|t| !is_placeholder_topic(t)) {
            Some(t) => (t, b.depth),
            None => {
                return Err(ApiError::bad_request(
                    "Missing or invalid topic parameter in request body",
                ))
            }
        },
        None => match q.topic.filter(|t| !is_placeholder_topic(t)) {
            Some(t) => (t, q.depth),
            None => {
                return Err(ApiError::bad_request(
                    "Missing or invalid topic parameter in query",
                ))
            }
        },
    };

    let topic = topic.trim().to_string();
    let depth = depth.unwrap_or(state.default_depth);
    info!(%topic, depth, "research request");

    run_and_record(&state, topic, None, depth).await.map(Json)
}

/// Same as `research`, but the prompt is used verbatim as the topic.
async fn prompt(
    State(state): State<AppState>,
    QueryParams(q): QueryParams<PromptQuery>,
    body: Bytes,
) -> Result<Json<ResearchResponse>, ApiError> {
    let (prompt, depth) = match parse_body::<PromptBody>(&body)? {
        Some(b) => (b.prompt, b.depth),
        None => (q.prompt, q.depth),
    };
    let Some(prompt) = prompt.filter(|p| !is_placeholder_topic(p)) else {
        return Err(ApiError::bad_request("Missing prompt parameter"));
    };

    let depth = depth.unwrap_or(state.default_depth);
    info!(%prompt, depth, "prompt request");

    run_and_record(&state, prompt.clone(), Some(prompt), depth)
        .await
        .map(Json)
}

async fn run_and_record(
    state: &AppState,
    topic: String,
    prompt: Option<String>,
    depth: i64,
) -> Result<ResearchResponse, ApiError> {
    let t0 = Instant::now();
    let results = state.agent.research(&topic, depth).await;
    let processing_time = round2(t0.elapsed().as_secs_f64());

    let history = state.history.clone();
    let entry = tokio::task::spawn_blocking(move || {
        history.append(NewEntry {
            topic,
            prompt,
            results,
        })
    })
    .await??;

    Ok(ResearchResponse {
        research_id: entry.id,
        topic: entry.topic,
        prompt: entry.prompt,
        result_count: entry.result_count,
        results: entry.results,
        processing_time,
    })
}

async fn history_all(State(state): State<AppState>) -> Json<Vec<HistoryEntry>> {
    Json(state.history.all())
}

async fn history_by_id(
    State(state): State<AppState>,
    PathParam(id): PathParam<u64>,
) -> Result<Json<HistoryEntry>, ApiError> {
    state
        .history
        .get(id)
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Research not found"))
}

async fn topics(State(state): State<AppState>) -> Json<Vec<String>> {
    Json(state.history.topics())
}

fn default_max_sentences() -> usize {
    DEFAULT_MAX_SENTENCES
}

#[derive(Deserialize)]
struct SummarizeReq {
    text: String,
    #[serde(default = "default_max_sentences")]
    max_sentences: usize,
}

#[derive(Serialize)]
struct SummaryResp {
    original_length: usize,
    summary: String,
    summary_length: usize,
    processing_time: f64,
}

async fn summarize_text(JsonBody(body): JsonBody<SummarizeReq>) -> Json<SummaryResp> {
    let t0 = Instant::now();
    let summary = summarize_with(&body.text, body.max_sentences);
    Json(SummaryResp {
        original_length: body.text.chars().count(),
        summary_length: summary.chars().count(),
        summary,
        processing_time: round2(t0.elapsed().as_secs_f64()),
    })
}

#[derive(Debug, Serialize)]
struct PdfResponse {
    filename: String,
    content_sample: String,
    summary: String,
}

/// Multipart upload, field `file`. Only the summarizer is involved.
async fn upload_pdf(
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<PdfResponse>, ApiError> {
    let mut multipart = multipart?;
    let mut upload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("Invalid multipart body: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field.file_name().unwrap_or_default().to_string();
        if !filename.to_lowercase().ends_with(".pdf") {
            return Err(ApiError::bad_request(
                "Invalid file format. Only PDF files are accepted.",
            ));
        }
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::bad_request(format!("Could not read upload: {e}")))?;
        upload = Some((filename, bytes));
        break;
    }

    let Some((filename, bytes)) = upload else {
        return Err(ApiError::unprocessable("Missing 'file' upload field"));
    };
    if bytes.is_empty() {
        return Err(ApiError::bad_request("The PDF file appears to be empty"));
    }

    info!(%filename, size = bytes.len(), "pdf upload");
    let extracted = tokio::task::spawn_blocking(move || pdf::extract_text(&bytes)).await?;
    let text = match extracted {
        Ok(t) if !t.trim().is_empty() => t,
        Ok(_) => {
            warn!(%filename, "pdf contains no extractable text");
            return Err(unextractable_pdf());
        }
        Err(e) => {
            warn!(%filename, error = ?e, "pdf text extraction failed");
            return Err(unextractable_pdf());
        }
    };

    Ok(Json(PdfResponse {
        filename,
        summary: summarize(&text),
        content_sample: content_sample(&text),
    }))
}

fn unextractable_pdf() -> ApiError {
    ApiError::unprocessable(
        "Could not extract text from the PDF. It may be encrypted, damaged, or contain only images.",
    )
}

// ------------------------------------------------------------
// Helpers
// ------------------------------------------------------------

/// `None` for an empty (or whitespace) body; malformed JSON is a 422.
fn parse_body<T: DeserializeOwned>(body: &Bytes) -> Result<Option<T>, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    serde_json::from_slice(body)
        .map(Some)
        .map_err(|e| ApiError::unprocessable(format!("Invalid JSON body: {e}")))
}

fn content_sample(text: &str) -> String {
    match text.char_indices().nth(CONTENT_SAMPLE_CHARS) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

fn round2(secs: f64) -> f64 {
    (secs * 100.0).round() / 100.0
}
