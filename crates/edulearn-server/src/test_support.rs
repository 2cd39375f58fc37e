//! Router harness for handler tests.

use crate::AppConfig;
use crate::app::create_router;
use crate::auth::{TokenConfig, TokenType};
use axum::Router;
use axum::body::Body;
use edulearn_core::llm_config::LlmConfig;
use edulearn_core::tts::config::TTSConfig;
use edulearn_test_helpers::schema::memory_db;
use edulearn_utils::media::MediaStore;
use edulearn_worker::{Task, TaskQueue};
use http::{Method, Request, StatusCode, header};
use http_body_util::BodyExt;
use sea_orm::DatabaseConnection;
use serde_json::Value;
use std::sync::Arc;
use tempfile::TempDir;
use tokio::sync::mpsc::UnboundedReceiver;
use tower::ServiceExt;
use uuid::Uuid;

const BOUNDARY: &str = "edulearn-test-boundary";

pub(crate) struct TestApp {
    pub(crate) conn: DatabaseConnection,
    pub(crate) config: AppConfig,
    pub(crate) tasks: UnboundedReceiver<Task>,
    router: Router,
    _media: TempDir,
}

impl TestApp {
    pub(crate) async fn new() -> Self {
        Self::with_tts(None).await
    }

    pub(crate) async fn with_tts(tts_config: Option<TTSConfig>) -> Self {
        let conn = memory_db().await.unwrap();
        let media = tempfile::tempdir().unwrap();
        let (queue, tasks) = TaskQueue::new();
        let config = AppConfig::new(
            Arc::new(LlmConfig::default()),
            tts_config,
            MediaStore::new(media.path().to_path_buf(), "/media/"),
            TokenConfig::new("test-secret", 60, 1),
            queue,
        );
        let router = create_router(config.clone(), &[], "/media/", conn.clone()).unwrap();
        Self {
            conn,
            config,
            tasks,
            router,
            _media: media,
        }
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };
        (status, body)
    }

    pub(crate) async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .unwrap();
        self.send(request).await
    }

    /// Posts a single file field as `multipart/form-data`.
    pub(crate) async fn upload(&self, uri: &str, token: &str, field: &str, content: &[u8]) -> (StatusCode, Value) {
        let mut body = format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"audio.wav\"\r\nContent-Type: audio/wav\r\n\r\n"
        )
        .into_bytes();
        body.extend_from_slice(content);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

        let request = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={BOUNDARY}"))
            .body(Body::from(body))
            .unwrap();
        self.send(request).await
    }
}

pub(crate) fn bearer(app: &TestApp, user_id: Uuid) -> String {
    app.config.tokens().issue(user_id, TokenType::Access).unwrap()
}
