#![allow(dead_code)]

use axum::{
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post, MethodRouter},
    Json, Router,
};
use falbench::prelude::*;
use serde_json::{json, Value};
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

pub const API_KEY: &str = "test-key";
pub const IMAGE_LEN: usize = 20_000;
pub const V3_LEN: usize = 100;
pub const V4_LEN: usize = 50;

/// Local stand-in for fal: `m/a` succeeds, `m/b` fails, `m/empty` returns no images
/// `m/broken-link` points at a missing file and `m/blank-file` at an empty one.
/// `x/same/name/v3` and `x/same/name/v4` share a display name but serve different images.
pub struct FakeFal {
    pub base_url: String,
    pub calls: Arc<AtomicUsize>,
}

impl FakeFal {
    pub async fn start() -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        let calls = Arc::new(AtomicUsize::new(0));

        let image_url = format!("{base_url}/files/a.jpg");
        let counter = calls.clone();

        let app = Router::new()
            .route(
                "/m/a",
                post(move |headers: HeaderMap, Json(body): Json<Value>| {
                    let url = image_url.clone();
                    async move {
                        if let Err(e) = check_request(&headers, &body) {
                            return e.into_response();
                        }
                        Json(json!({
                            "images": [{ "url": url, "width": 1024, "height": 1024 }],
                            "seed": 42
                        }))
                        .into_response()
                    }
                }),
            )
            .route(
                "/m/b",
                post(move || {
                    counter.fetch_add(1, Ordering::SeqCst);
                    async {
                        (
                            StatusCode::INTERNAL_SERVER_ERROR,
                            Json(json!({ "detail": "model exploded" })),
                        )
                    }
                }),
            )
            .route("/m/empty", post(|| async { Json(json!({ "images": [] })) }))
            .route("/m/broken-link", image_at(format!("{base_url}/files/missing.jpg")))
            .route("/m/blank-file", image_at(format!("{base_url}/files/blank.jpg")))
            .route("/x/same/name/v3", image_at(format!("{base_url}/files/v3.jpg")))
            .route("/x/same/name/v4", image_at(format!("{base_url}/files/v4.jpg")))
            .route("/files/a.jpg", get(|| async { image_bytes() }))
            .route("/files/blank.jpg", get(|| async { Vec::<u8>::new() }))
            .route("/files/v3.jpg", get(|| async { vec![1u8; V3_LEN] }))
            .route("/files/v4.jpg", get(|| async { vec![2u8; V4_LEN] }));

        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
        return Self { base_url, calls };
    }

    pub fn client(&self) -> Client {
        let http = reqwest::Client::builder().no_proxy().build().unwrap();
        Client::new(Some(API_KEY))
            .unwrap()
            .with_base_url(&self.base_url)
            .with_http_client(http)
    }

    /// Number of requests received by `m/b`
    pub fn failing_calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

/// Endpoint answering every request with a single image at `url`
fn image_at(url: String) -> MethodRouter {
    post(move || {
        let url = url.clone();
        async move { Json(json!({ "images": [{ "url": url }] })) }
    })
}

pub fn image_bytes() -> Vec<u8> {
    (0..IMAGE_LEN).map(|i| (i % 251) as u8).collect()
}

fn check_request(headers: &HeaderMap, body: &Value) -> Result<(), (StatusCode, Json<Value>)> {
    let auth = headers
        .get("authorization")
        .and_then(|x| x.to_str().ok())
        .unwrap_or_default();
    if auth != format!("Key {API_KEY}") {
        return Err((
            StatusCode::UNAUTHORIZED,
            Json(json!({ "detail": "Unauthorized" })),
        ));
    }

    if body["num_images"] != 1 || !body["prompt"].is_string() {
        return Err((
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({ "detail": "bad arguments" })),
        ));
    }
    return Ok(());
}
