//! Cat API Example
//!
//! Demonstrates an API-specific client built on top of `Fetch`.

// Example-specific lint allowances
#![allow(missing_docs)]
#![allow(clippy::print_stdout)]

use fetchbase::prelude::*;
use serde_json::{Map, Value};

const BASE_URL: &str = "https://api.thecatapi.com";

// ============================================================================
// Data Types
// ============================================================================

/// A cat picture.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatInfo {
    pub id: String,
    pub url: String,
    pub width: u32,
    pub height: u32,
}

/// Answer to an upload.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Uploaded {
    pub id: String,
    pub approved: u8,
}

// ============================================================================
// Client
// ============================================================================

/// Client for `TheCatAPI`.
#[derive(Debug)]
pub struct CatApi {
    fetch: Fetch<HyperClient>,
}

impl CatApi {
    /// Create a client for `base_url` authenticated with `token`.
    pub fn new(base_url: &str, token: &str) -> Result<Self> {
        let client = HyperClient::builder().with_logging().build();
        let mut fetch = Fetch::new(client, base_url)?;
        fetch
            .set_options(RequestOptions::new().credentials(Credentials::SameOrigin))
            .set_auth_token("Bearer", token)?;

        Ok(Self { fetch })
    }

    /// Register a callback run when the token is rejected.
    pub fn on_unauthorized<F>(&mut self, callback: F) -> &mut Self
    where
        F: Fn(&Response) + Send + Sync + 'static,
    {
        self.fetch
            .set_error_middleware(ErrorKind::Unauthorized, callback);
        self
    }

    /// A random cat.
    pub async fn random(&self) -> Result<Vec<CatInfo>> {
        let elements = RequestElements::new()
            .options(RequestOptions::new().credentials(Credentials::SameOrigin));
        self.fetch.get("/v1/images/search", elements).await
    }

    /// An endpoint that rejects the request.
    pub async fn bad_request(&self) -> Result<Value> {
        self.fetch
            .get("/v1/images/unknown", RequestElements::new())
            .await
    }

    /// An endpoint that does not exist.
    pub async fn not_found(&self) -> Result<Value> {
        self.fetch.get("/v1/404", RequestElements::new()).await
    }

    /// Upload a picture, tagged with the caller's sub id.
    pub async fn upload(&self, file_name: &str, image: Vec<u8>, sub_id: &str) -> Result<Uploaded> {
        let form = Form::new()
            .part(Part::file("file", file_name, image))
            .text("sub_id", sub_id);
        let elements = RequestElements::new().payload(form);
        self.fetch.post("/v1/images/upload", elements).await
    }

    /// Vote for a picture; the vote is sent as multipart form data.
    pub async fn vote(&self, image_id: &str, value: i8) -> Result<Value> {
        let mut payload = Map::new();
        payload.insert("image_id".to_string(), Value::from(image_id));
        payload.insert("value".to_string(), Value::from(value));
        self.fetch.post_form("/v1/votes", payload).await
    }
}

// ============================================================================
// Main: Demonstrate usage
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let mut cats = CatApi::new(BASE_URL, "fhsofu023elkqjr09iqldjaw-edowqaoeu09fa")?;
    cats.on_unauthorized(|response| {
        println!("token rejected with status {}", response.status());
    });

    match cats.random().await {
        Ok(info) => println!("Random cats: {info:?}"),
        Err(err) => println!("Could not fetch a cat: {err}"),
    }

    match cats.not_found().await {
        Err(err) => println!("Expected failure: {err} (kind: {:?})", err.kind()),
        Ok(value) => println!("Unexpected answer: {value}"),
    }

    Ok(())
}

// ============================================================================
// Tests using wiremock
// ============================================================================

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use assert2::let_assert;
    use serde_json::json;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{header, method, path},
    };

    use super::*;

    const TOKEN: &str = "fhsofu023elkqjr09iqldjaw-edowqaoeu09fa";

    #[tokio::test]
    async fn test_random() {
        let mock_server = MockServer::start().await;

        let cats = vec![CatInfo {
            id: "abc".to_string(),
            url: "https://cdn2.thecatapi.com/images/abc.jpg".to_string(),
            width: 640,
            height: 480,
        }];

        Mock::given(method("GET"))
            .and(path("/v1/images/search"))
            .and(header("Authorization", format!("Bearer {TOKEN}").as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_json(&cats))
            .mount(&mock_server)
            .await;

        let api = CatApi::new(&mock_server.uri(), TOKEN).expect("client");
        let result = api.random().await.expect("cats");

        assert_eq!(result, cats);
    }

    #[tokio::test]
    async fn test_bad_request() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/images/unknown"))
            .respond_with(
                ResponseTemplate::new(400).set_body_json(json!({ "message": "invalid id" })),
            )
            .mount(&mock_server)
            .await;

        let api = CatApi::new(&mock_server.uri(), TOKEN).expect("client");
        let err = api.bad_request().await.expect_err("400");

        assert_eq!(err.status(), Some(400));
        assert_eq!(err.kind(), Some(ErrorKind::BadRequest));
    }

    #[tokio::test]
    async fn test_not_found() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/404"))
            .respond_with(ResponseTemplate::new(404).set_body_string("Not Found"))
            .mount(&mock_server)
            .await;

        let api = CatApi::new(&mock_server.uri(), TOKEN).expect("client");
        let err = api.not_found().await.expect_err("404");

        assert_eq!(err.status(), Some(404));
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_unauthorized_callback() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/images/search"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&mock_server)
            .await;

        let calls = Arc::new(AtomicUsize::new(0));
        let mut api = CatApi::new(&mock_server.uri(), TOKEN).expect("client");
        let counter = Arc::clone(&calls);
        api.on_unauthorized(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        let_assert!(Err(err) = api.random().await);
        assert!(err.is_unauthorized());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_upload_is_multipart() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/images/upload"))
            .respond_with(
                ResponseTemplate::new(201).set_body_json(json!({ "id": "xyz", "approved": 1 })),
            )
            .mount(&mock_server)
            .await;

        let api = CatApi::new(&mock_server.uri(), TOKEN).expect("client");
        let uploaded = api
            .upload("tom.png", vec![0x89, 0x50], "user-1")
            .await
            .expect("uploaded");
        assert_eq!(uploaded.id, "xyz");

        let received = mock_server.received_requests().await.expect("recording");
        let_assert!([request] = received.as_slice());
        let content_type = request
            .headers
            .get("content-type")
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default();
        assert!(content_type.starts_with("multipart/form-data; boundary="));
        let body = String::from_utf8_lossy(&request.body);
        assert!(body.contains("filename=\"tom.png\""));
        assert!(body.contains("Content-Type: image/png"));
    }

    #[tokio::test]
    async fn test_vote_sends_form_fields() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/votes"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "message": "SUCCESS" })))
            .mount(&mock_server)
            .await;

        let api = CatApi::new(&mock_server.uri(), TOKEN).expect("client");
        let answer = api.vote("abc", 1).await.expect("vote");
        assert_eq!(answer, json!({ "message": "SUCCESS" }));

        let received = mock_server.received_requests().await.expect("recording");
        let_assert!([request] = received.as_slice());
        let body = String::from_utf8_lossy(&request.body);
        assert!(body.contains("name=\"image_id\"\r\n\r\nabc\r\n"), "{body}");
        assert!(body.contains("name=\"value\"\r\n\r\n1\r\n"), "{body}");
    }
}
