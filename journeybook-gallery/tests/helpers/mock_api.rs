//! Local stand-in for an OpenAI-compatible API
//!
//! Serves `/v1/chat/completions`, `/v1/images/generations` and
//! `/files/{name}` on an ephemeral port and records every request body.

use std::sync::{Arc, Mutex};

use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

use super::PNG_1X1;

/// What the chat endpoint answers
#[derive(Debug, Clone)]
pub enum ChatBehavior {
    Describe(String),
    Status(u16),
    NoChoices,
}

/// What the image endpoints answer
#[derive(Debug, Clone)]
pub enum ImageBehavior {
    Png,
    NoData,
    EmptyDownload,
}

#[derive(Clone)]
struct MockState {
    base_url: String,
    api_key: String,
    chat: ChatBehavior,
    image: ImageBehavior,
    requests: Arc<Mutex<Vec<Value>>>,
}

pub struct MockApi {
    pub base_url: String,
    pub api_key: String,
    requests: Arc<Mutex<Vec<Value>>>,
}

impl MockApi {
    pub fn chat_url(&self) -> String {
        format!("{}/v1/chat/completions", self.base_url)
    }

    pub fn images_url(&self) -> String {
        format!("{}/v1/images/generations", self.base_url)
    }

    /// JSON bodies received so far, in arrival order
    pub fn requests(&self) -> Vec<Value> {
        self.requests.lock().unwrap().clone()
    }
}

fn authorized(state: &MockState, headers: &HeaderMap) -> bool {
    let expected = format!("Bearer {}", state.api_key);
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(|v| v == expected)
        .unwrap_or(false)
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "error": { "message": "invalid api key" } })),
    )
        .into_response()
}

async fn chat_completions(
    State(state): State<MockState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    state.requests.lock().unwrap().push(body);
    if !authorized(&state, &headers) {
        return unauthorized();
    }

    match state.chat {
        ChatBehavior::Describe(text) => Json(json!({
            "choices": [{ "index": 0, "message": { "role": "assistant", "content": text } }]
        }))
        .into_response(),
        ChatBehavior::Status(code) => (
            StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            "upstream unavailable",
        )
            .into_response(),
        ChatBehavior::NoChoices => Json(json!({ "id": "empty" })).into_response(),
    }
}

async fn image_generations(
    State(state): State<MockState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    state.requests.lock().unwrap().push(body);
    if !authorized(&state, &headers) {
        return unauthorized();
    }

    match state.image {
        ImageBehavior::NoData => Json(json!({ "created": 0, "data": [] })).into_response(),
        ImageBehavior::Png | ImageBehavior::EmptyDownload => Json(json!({
            "created": 0,
            "data": [{ "url": format!("{}/files/generated.png", state.base_url) }]
        }))
        .into_response(),
    }
}

async fn download(State(state): State<MockState>, Path(name): Path<String>) -> Response {
    match (name.as_str(), &state.image) {
        ("generated.png", ImageBehavior::EmptyDownload) => {
            ([(header::CONTENT_TYPE, "image/png")], Vec::<u8>::new()).into_response()
        }
        ("generated.png", _) => {
            ([(header::CONTENT_TYPE, "image/png")], PNG_1X1.to_vec()).into_response()
        }
        _ => StatusCode::NOT_FOUND.into_response(),
    }
}

/// Start a mock API accepting `api_key` as its bearer token
pub async fn spawn_mock_api(api_key: &str, chat: ChatBehavior, image: ImageBehavior) -> MockApi {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());
    let requests = Arc::new(Mutex::new(Vec::new()));

    let state = MockState {
        base_url: base_url.clone(),
        api_key: api_key.to_string(),
        chat,
        image,
        requests: requests.clone(),
    };

    let app = Router::new()
        .route("/v1/chat/completions", post(chat_completions))
        .route("/v1/images/generations", post(image_generations))
        .route("/files/:name", get(download))
        .with_state(state);

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    MockApi {
        base_url,
        api_key: api_key.to_string(),
        requests,
    }
}
