use crate::config::Config;
use crate::error::{IngestError, SelectError, ServerError};
use crate::ingest::{Ingestor, Notifier};
use crate::selector::{epoch, select_daily_record, select_random_record};
use crate::store::{PuzzleKind, Record};
use axum::{
    body::{Body, Bytes},
    extract::{Path, State},
    http::{Request, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use chrono::Local;
use log::{debug, error, info, warn};
use std::path::Path as FilePath;
use std::sync::Arc;
use std::time::Instant;
use tower_http::cors::CorsLayer;
use tower_http::trace::{self, TraceLayer};
use tracing::Level as TracingLevel;

/// Prefix that marks a failed reply; anything else is a success.
pub const ERROR_PREFIX: &str = "ERROR:";

pub struct AppState {
    pub config: Config,
    pub ingestor: Ingestor,
}

impl AppState {
    pub fn new(config: Config, notifier: Arc<dyn Notifier>) -> Self {
        let ingestor = Ingestor::new(
            config.upload_dir.clone(),
            config.max_upload_puzzles,
            notifier,
        );
        Self { config, ingestor }
    }
}

pub type SharedState = Arc<AppState>;

/// Builds the router with request logging and tracing layers.
pub fn app(state: SharedState) -> Router {
    Router::new()
        .route("/", get(|| async { "Sudoku Server Running!" }))
        .route("/daily", post(daily_handler))
        .route("/random", post(random_handler))
        .route("/upload/:kind", post(upload_handler))
        .layer(middleware::map_response(log_response))
        .layer(middleware::from_fn(log_request_response))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(trace::DefaultMakeSpan::new().level(TracingLevel::INFO))
                .on_request(trace::DefaultOnRequest::new().level(TracingLevel::INFO))
                .on_response(trace::DefaultOnResponse::new().level(TracingLevel::INFO)),
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn log_request_response(req: Request<Body>, next: Next) -> Response {
    let path = req.uri().path().to_owned();
    let method = req.method().clone();
    let start = Instant::now();

    info!(">> Request started: {} {}", method, path);

    let response = next.run(req).await;

    info!(
        "<< Request completed: {} {} - Status: {} - Duration: {:.2?}",
        method,
        path,
        response.status(),
        start.elapsed()
    );

    response
}

async fn log_response(response: Response) -> Response {
    debug!("Sending response: Status={}", response.status());
    response
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let message = match &self {
            ServerError::Select(err) => {
                warn!("Record selection failed: {}", err);
                err.public_message().to_string()
            }
            ServerError::Ingest(IngestError::Io(err)) => {
                error!("Upload could not be stored: {}", err);
                "upload could not be stored".to_string()
            }
            ServerError::Ingest(err) => {
                warn!("Upload rejected: {}", err);
                err.to_string()
            }
            ServerError::BadSelector => {
                debug!("Bad puzzle type selector");
                self.to_string()
            }
            ServerError::Config(_) | ServerError::Task(_) | ServerError::Io(_) => {
                error!("Request failed: {}", self);
                "internal error".to_string()
            }
        };
        // Clients only look at the body prefix, so failures stay 200.
        (StatusCode::OK, format!("{} {}", ERROR_PREFIX, message)).into_response()
    }
}

async fn daily_handler(
    State(state): State<SharedState>,
    body: Bytes,
) -> Result<Vec<u8>, ServerError> {
    let today = Local::now().date_naive();
    serve_record(&state, &body, move |path| {
        select_daily_record(path, epoch(), today)
    })
    .await
}

async fn random_handler(
    State(state): State<SharedState>,
    body: Bytes,
) -> Result<Vec<u8>, ServerError> {
    serve_record(&state, &body, |path| {
        select_random_record(path, &mut rand::thread_rng())
    })
    .await
}

async fn serve_record<F>(state: &AppState, body: &[u8], pick: F) -> Result<Vec<u8>, ServerError>
where
    F: FnOnce(&FilePath) -> Result<Record, SelectError> + Send + 'static,
{
    let kind = PuzzleKind::from_selector(body).ok_or(ServerError::BadSelector)?;
    let path = kind.store_path(&state.config.data_dir);
    debug!(
        "Selecting {} puzzle (selector '{}') from {}",
        kind,
        kind.selector() as char,
        path.display()
    );

    let record = tokio::task::spawn_blocking(move || pick(&path))
        .await
        .map_err(|e| ServerError::Task(e.to_string()))??;
    Ok(record.to_vec())
}

async fn upload_handler(
    State(state): State<SharedState>,
    Path(kind): Path<String>,
    body: Bytes,
) -> Result<String, ServerError> {
    let kind = PuzzleKind::from_selector(kind.as_bytes()).ok_or(ServerError::BadSelector)?;
    let now = Local::now().naive_local();
    info!("Upload of {} bytes for {} puzzles", body.len(), kind);

    let receipt = tokio::task::spawn_blocking(move || state.ingestor.ingest(kind, &body, now))
        .await
        .map_err(|e| ServerError::Task(e.to_string()))??;
    Ok(format!("OK: {} puzzle(s) received", receipt.puzzles))
}
