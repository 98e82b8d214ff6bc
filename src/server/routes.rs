use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use crate::server::AppState;
use crate::query::QuoteEngine;
use crate::quote::{NewQuote, Quote, ValidationError};
use crate::storage::{DbStats, SourceCount};
use crate::Error;
use std::sync::Arc;

/// Default page size for `/search`
const SEARCH_LIMIT: usize = 50;

/// Fields posted to create or edit a quote. Missing fields are reported per field.
#[derive(Deserialize)]
pub struct QuoteForm {
    pub text: Option<String>,
    pub source: Option<String>,
    pub weight: Option<i64>,
}

impl TryFrom<QuoteForm> for NewQuote {
    type Error = ValidationError;

    fn try_from(form: QuoteForm) -> Result<Self, Self::Error> {
        let text = form.text.ok_or(ValidationError::Required("text"))?;
        let source = form.source.ok_or(ValidationError::Required("source"))?;
        let weight = form.weight.ok_or(ValidationError::Required("weight"))?;
        Ok(NewQuote::new(text, source, weight))
    }
}

const FORM_FIELDS: [&str; 3] = ["text", "source", "weight"];

/// Field named by a body deserialization error, e.g. `weight: invalid type: ...`
fn rejected_field(message: &str) -> Option<&'static str> {
    let detail = message.rsplit_once("target type: ").map_or(message, |(_, rest)| rest);
    let path = detail.split_once(": ")?.0;
    FORM_FIELDS.into_iter().find(|field| *field == path)
}

/// Unwrap a posted form, turning a malformed body into a JSON error
fn parse_form(payload: Result<Json<QuoteForm>, JsonRejection>) -> ApiResult<NewQuote> {
    let Json(form) = payload?;
    NewQuote::try_from(form).map_err(|e| ApiError::Core(e.into()))
}

#[derive(Deserialize)]
pub struct PopularParams {
    pub source: Option<String>,
    pub limit: Option<usize>,
}

#[derive(Deserialize)]
pub struct SearchParams {
    pub q: String,
    pub limit: Option<usize>,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<&'static str>,
}

/// Error returned by handlers, mapped to a status code per error kind
pub enum ApiError {
    Core(Error),
    Body(JsonRejection),
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        ApiError::Core(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Body(rejection)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, field) = match self {
            ApiError::Core(Error::Validation(v)) => (StatusCode::UNPROCESSABLE_ENTITY, v.to_string(), v.field()),
            ApiError::Core(err @ Error::QuoteNotFound(_)) => (StatusCode::NOT_FOUND, err.to_string(), None),
            ApiError::Core(err) => {
                tracing::error!("Request failed: {}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, err.to_string(), None)
            }
            ApiError::Body(rejection) => {
                let message = rejection.body_text();
                tracing::debug!("Rejected request body: {}", message);
                let field = rejected_field(&message);
                (rejection.status(), message, field)
            }
        };

        (status, Json(ErrorResponse { error, field })).into_response()
    }
}

type ApiResult<T> = Result<T, ApiError>;

pub async fn random_quote(State(state): State<Arc<AppState>>) -> ApiResult<Response> {
    let engine = QuoteEngine::new(&state.store);

    match engine.display_random_quote()? {
        Some(quote) => Ok(Json(quote).into_response()),
        None => Ok((
            StatusCode::NOT_FOUND,
            Json(ErrorResponse { error: "No quotes available".to_string(), field: None }),
        )
            .into_response()),
    }
}

pub async fn add_quote(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<QuoteForm>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Quote>)> {
    let new = parse_form(payload)?;
    let engine = QuoteEngine::new(&state.store);
    let quote = engine.add_quote(&new)?;
    Ok((StatusCode::CREATED, Json(quote)))
}

pub async fn get_quote(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Quote>> {
    let engine = QuoteEngine::new(&state.store);
    Ok(Json(engine.get_quote(id)?))
}

pub async fn edit_quote(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    payload: Result<Json<QuoteForm>, JsonRejection>,
) -> ApiResult<Json<Quote>> {
    let new = parse_form(payload)?;
    let engine = QuoteEngine::new(&state.store);
    Ok(Json(engine.edit_quote(id, &new)?))
}

pub async fn delete_quote(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    let engine = QuoteEngine::new(&state.store);
    engine.delete_quote(id)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn like_quote(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Quote>> {
    let engine = QuoteEngine::new(&state.store);
    Ok(Json(engine.like_quote(id)?))
}

pub async fn dislike_quote(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Quote>> {
    let engine = QuoteEngine::new(&state.store);
    Ok(Json(engine.dislike_quote(id)?))
}

pub async fn popular(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PopularParams>,
) -> ApiResult<Json<Vec<Quote>>> {
    let limit = params.limit.unwrap_or(state.popular_limit);
    let engine = QuoteEngine::new(&state.store);
    Ok(Json(engine.list_popular(params.source.as_deref(), limit)?))
}

pub async fn sources(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<SourceCount>>> {
    let engine = QuoteEngine::new(&state.store);
    Ok(Json(engine.sources()?))
}

pub async fn search(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> ApiResult<Json<Vec<Quote>>> {
    let limit = params.limit.unwrap_or(SEARCH_LIMIT);
    let engine = QuoteEngine::new(&state.store);
    Ok(Json(engine.search(&params.q, limit)?))
}

pub async fn stats(State(state): State<Arc<AppState>>) -> ApiResult<Json<DbStats>> {
    let engine = QuoteEngine::new(&state.store);
    Ok(Json(engine.stats()?))
}

pub async fn health(State(state): State<Arc<AppState>>) -> (StatusCode, Json<serde_json::Value>) {
    match state.store.ping() {
        Ok(()) => (
            StatusCode::OK,
            Json(serde_json::json!({"status": "ok", "database": "ok"})),
        ),
        Err(e) => {
            tracing::warn!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(serde_json::json!({"status": "error", "database": e.to_string()})),
            )
        }
    }
}
