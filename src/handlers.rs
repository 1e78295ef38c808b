use crate::config::Config;
use crate::consultation;
use crate::errors::AppError;
use crate::lookup_client::LookupClient;
use crate::models::*;
use crate::notifier::WebhookNotifier;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::Html,
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Maximum accepted request body.
pub const BODY_LIMIT_BYTES: usize = 64 * 1024;

/// Shared application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Config,
    /// Client for the upstream lookup API.
    pub lookup_client: LookupClient,
    /// Webhook notifier (`None` when `WEBHOOK_URL` is unset).
    pub notifier: Option<WebhookNotifier>,
}

impl AppState {
    pub fn from_config(config: Config) -> Result<Self, AppError> {
        let lookup_client = LookupClient::from_config(&config)?;
        let notifier = WebhookNotifier::from_config(&config)?;
        Ok(Self {
            config,
            lookup_client,
            notifier,
        })
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(health, consult_cpf, consult_phone, consult_name),
    components(schemas(
        CpfQuery,
        PhoneQuery,
        NameQuery,
        PersonRecord,
        PhoneRecord,
        PersonResponse,
        PhoneListResponse,
        ErrorResponse
    )),
    tags((name = "consultas", description = "CPF, phone and name lookups"))
)]
pub struct ApiDoc;

/// Routes without rate limiting: frontend, health check and API docs.
pub fn public_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
}

/// Lookup endpoints under `/api`.
pub fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/cpf", post(consult_cpf))
        .route("/api/consultar", post(consult_cpf))
        .route("/api/telefone", post(consult_phone))
        .route("/api/nome", post(consult_name))
}

/// Adds the fallback, state and shared middleware to assembled routes.
pub fn finish_router(routes: Router<Arc<AppState>>, state: Arc<AppState>) -> Router {
    routes
        .fallback(not_found)
        .with_state(state)
        .layer(RequestBodyLimitLayer::new(BODY_LIMIT_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Full application router without per-IP rate limiting.
pub fn router(state: Arc<AppState>) -> Router {
    finish_router(public_routes().merge(api_routes()), state)
}

/// GET /
///
/// Serves the bundled frontend.
pub async fn index() -> Html<&'static str> {
    Html(include_str!("../static/index.html"))
}

/// Health check endpoint.
///
/// Returns the service status and version.
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is healthy")),
    tag = "consultas"
)]
pub async fn health() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "service": env!("CARGO_PKG_NAME"),
            "version": env!("CARGO_PKG_VERSION")
        })),
    )
}

/// Unwraps a JSON body, turning extractor rejections into the API's error envelope.
fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    payload.map(|Json(value)| value).map_err(|rejection| {
        tracing::warn!("Rejected request body: {}", rejection.body_text());
        AppError::BadRequest("Corpo da requisição inválido.".to_string())
    })
}

/// POST /api/cpf (also served at /api/consultar)
///
/// Looks up a person by CPF. The phone is completed from the phones-by-CPF
/// lookup when the main report has none.
#[utoipa::path(
    post,
    path = "/api/cpf",
    request_body = CpfQuery,
    responses(
        (status = 200, description = "Person found", body = PersonResponse),
        (status = 400, description = "Invalid CPF", body = ErrorResponse),
        (status = 404, description = "CPF not found upstream", body = ErrorResponse),
        (status = 429, description = "Upstream rate limit", body = ErrorResponse),
        (status = 502, description = "Upstream failure", body = ErrorResponse)
    ),
    tag = "consultas"
)]
pub async fn consult_cpf(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CpfQuery>, JsonRejection>,
) -> Result<Json<ApiResponse<PersonRecord>>, AppError> {
    let query = body(payload)?;
    tracing::info!("POST /api/cpf");

    let record = consultation::consult_cpf(&state, query.cpf.as_deref()).await?;
    Ok(Json(ApiResponse::ok(record)))
}

/// POST /api/telefone
#[utoipa::path(
    post,
    path = "/api/telefone",
    request_body = PhoneQuery,
    responses(
        (status = 200, description = "Lines registered to the number", body = PhoneListResponse),
        (status = 400, description = "Invalid phone", body = ErrorResponse),
        (status = 404, description = "Phone not found upstream", body = ErrorResponse),
        (status = 429, description = "Upstream rate limit", body = ErrorResponse),
        (status = 502, description = "Upstream failure", body = ErrorResponse)
    ),
    tag = "consultas"
)]
pub async fn consult_phone(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<PhoneQuery>, JsonRejection>,
) -> Result<Json<ApiResponse<Vec<PhoneRecord>>>, AppError> {
    let query = body(payload)?;
    tracing::info!("POST /api/telefone");

    let records = consultation::consult_phone(&state, query.telefone.as_deref()).await?;
    Ok(Json(ApiResponse::ok(records)))
}

/// POST /api/nome
#[utoipa::path(
    post,
    path = "/api/nome",
    request_body = NameQuery,
    responses(
        (status = 200, description = "Person found", body = PersonResponse),
        (status = 400, description = "Invalid name", body = ErrorResponse),
        (status = 404, description = "Name not found upstream", body = ErrorResponse),
        (status = 429, description = "Upstream rate limit", body = ErrorResponse),
        (status = 502, description = "Upstream failure", body = ErrorResponse)
    ),
    tag = "consultas"
)]
pub async fn consult_name(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<NameQuery>, JsonRejection>,
) -> Result<Json<ApiResponse<PersonRecord>>, AppError> {
    let query = body(payload)?;
    tracing::info!("POST /api/nome");

    let record = consultation::consult_name(&state, query.nome.as_deref()).await?;
    Ok(Json(ApiResponse::ok(record)))
}

pub async fn not_found() -> AppError {
    AppError::NotFound("Rota não encontrada".to_string())
}
