use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use lexicon_db::LexemeStore;
use lexicon_xref::{Definition, Expander, PhraseMatcher};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::index::{MAX_MATCHES, PrefixIndex};
use crate::render::{not_found, render_definition};

#[derive(Clone)]
pub struct AppState {
    pub index: Arc<PrefixIndex>,
    pub store: Arc<LexemeStore>,
    pub phrases: Arc<PhraseMatcher>,
    pub max_page_size: usize,
    pub disable_cache: bool,
}

#[derive(Deserialize)]
pub struct MatchesQuery {
    pub prefix: Option<String>,
    pub limit: Option<usize>,
}

#[derive(Deserialize)]
pub struct DefineQuery {
    pub word: String,
    pub format: Option<String>,
}

#[derive(Deserialize)]
pub struct ReverseQuery {
    pub meaning: String,
    pub limit: Option<usize>,
}

#[derive(Serialize)]
pub struct MatchesResponse {
    prefix: String,
    limit: usize,
    items: Vec<String>,
}

#[derive(Serialize)]
pub struct DefineResponse<'a> {
    #[serde(flatten)]
    definition: Definition<'a>,
    text: String,
}

#[derive(Serialize)]
pub struct ReverseResponse<'a> {
    meaning: String,
    total: usize,
    has_more: bool,
    items: Vec<&'a str>,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/v1/matches", get(matches))
        .route("/v1/define", get(define))
        .route("/v1/reverse", get(reverse))
        .with_state(state)
}

async fn healthz() -> impl IntoResponse {
    "ok"
}

async fn matches(
    State(state): State<AppState>,
    Query(params): Query<MatchesQuery>,
) -> Result<Response, ApiError> {
    let limit = params.limit.unwrap_or(MAX_MATCHES);
    if limit == 0 {
        return Err(ApiError::bad_request("limit must be >= 1"));
    }
    let limit = limit.min(MAX_MATCHES);

    // An empty prefix means the user has not typed anything yet.
    let prefix = params.prefix.unwrap_or_default();
    let items = state.index.find_matches_limited(&prefix, limit);
    debug!("prefix {prefix:?} matched {} words", items.len());

    let response = MatchesResponse {
        prefix,
        limit,
        items,
    };
    Ok(with_cache(&state, Json(response)))
}

async fn define(
    State(state): State<AppState>,
    Query(params): Query<DefineQuery>,
) -> Result<Response, ApiError> {
    let word = params.word.trim();
    if word.is_empty() {
        return Err(ApiError::bad_request("word is required"));
    }
    let format = OutputFormat::parse(params.format.as_deref())?;

    let expander = Expander::new(state.store.as_ref(), state.phrases.as_ref());
    let Some(definition) = expander.define(word) else {
        return Err(ApiError::NotFound(not_found(word)));
    };
    let text = render_definition(&definition);

    let response = match format {
        OutputFormat::Text => with_cache(
            &state,
            (
                [(
                    header::CONTENT_TYPE,
                    HeaderValue::from_static("text/plain; charset=utf-8"),
                )],
                text,
            ),
        ),
        OutputFormat::Json => with_cache(&state, Json(DefineResponse { definition, text })),
    };
    Ok(response)
}

async fn reverse(
    State(state): State<AppState>,
    Query(params): Query<ReverseQuery>,
) -> Result<Response, ApiError> {
    let meaning = params.meaning.trim();
    if meaning.is_empty() {
        return Err(ApiError::bad_request("meaning is required"));
    }
    let mut limit = params.limit.unwrap_or(MAX_MATCHES);
    if limit == 0 {
        return Err(ApiError::bad_request("limit must be >= 1"));
    }
    if limit > state.max_page_size {
        limit = state.max_page_size;
    }

    let found = state.store.reverse_find(meaning);
    let total = found.len();
    let items: Vec<&str> = found.into_iter().take(limit).collect();

    let response = ReverseResponse {
        meaning: meaning.to_string(),
        total,
        has_more: items.len() < total,
        items,
    };
    Ok(with_cache(&state, Json(response)))
}

enum OutputFormat {
    Json,
    Text,
}

impl OutputFormat {
    fn parse(raw: Option<&str>) -> Result<Self, ApiError> {
        match raw.map(str::to_ascii_lowercase).as_deref() {
            None | Some("json") => Ok(OutputFormat::Json),
            Some("text") => Ok(OutputFormat::Text),
            Some(other) => Err(ApiError::bad_request(format!(
                "unsupported format: {other}"
            ))),
        }
    }
}

fn with_cache(state: &AppState, body: impl IntoResponse) -> Response {
    if state.disable_cache {
        return body.into_response();
    }
    (
        [(
            header::CACHE_CONTROL,
            HeaderValue::from_static("public, max-age=300"),
        )],
        body,
    )
        .into_response()
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    NotFound(String),
}

impl ApiError {
    fn bad_request<T: Into<String>>(msg: T) -> Self {
        ApiError::BadRequest(msg.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
        };
        let body = Json(ErrorResponse {
            error: self.to_string(),
        });
        (status, body).into_response()
    }
}
