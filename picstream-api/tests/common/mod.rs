//! Common test utilities for integration tests
//!
//! This module provides shared infrastructure for integration tests:
//! - In-memory database with migrations applied
//! - In-memory media store
//! - Test user creation and JWT token generation
//! - Request helpers

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Request, StatusCode};
use picstream_api::app::{build_router, AppState};
use picstream_api::config::Config;
use picstream_shared::auth::jwt::{create_token, Claims, TokenType};
use picstream_shared::auth::password::hash_password;
use picstream_shared::db::{
    migrations::run_migrations,
    pool::{create_pool, DatabaseConfig},
};
use picstream_shared::media::InMemoryMediaStore;
use picstream_shared::models::user::{CreateUser, UpdateUser, User};
use serde_json::Value;
use sqlx::SqlitePool;
use std::sync::Arc;
use tower::ServiceExt;

/// Password every test user is created with
pub const TEST_PASSWORD: &str = "picstream2024";

pub const MULTIPART_BOUNDARY: &str = "picstream-test-boundary";

/// Test context containing all necessary resources
pub struct TestContext {
    pub db: SqlitePool,
    pub media: InMemoryMediaStore,
    pub app: axum::Router,
    pub config: Config,
}

/// A registered user with a valid access token
pub struct TestUser {
    pub user: User,
    pub token: String,
}

impl TestUser {
    /// Returns authorization header value
    pub fn auth_header(&self) -> String {
        format!("Bearer {}", self.token)
    }
}

/// Response status and decoded JSON body (Null when empty)
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestContext {
    /// Creates a new test context with a fresh database
    pub async fn new() -> Self {
        let config = Config::for_testing();

        let db = create_pool(DatabaseConfig::in_memory())
            .await
            .expect("Failed to create pool");
        run_migrations(&db).await.expect("Failed to run migrations");

        let media = InMemoryMediaStore::new();
        let state = AppState::new(db.clone(), config.clone(), Arc::new(media.clone()));
        let app = build_router(state);

        Self {
            db,
            media,
            app,
            config,
        }
    }

    /// Creates a user directly in the database
    pub async fn create_user(&self, email: &str) -> TestUser {
        let user = User::create(
            &self.db,
            CreateUser {
                email: email.to_string(),
                hashed_password: hash_password(TEST_PASSWORD).unwrap(),
            },
        )
        .await
        .unwrap();

        let token = self.token_for(&user.id);
        TestUser { user, token }
    }

    pub async fn create_superuser(&self, email: &str) -> TestUser {
        let mut test_user = self.create_user(email).await;
        test_user.user = User::update(
            &self.db,
            &test_user.user.id,
            UpdateUser {
                is_superuser: Some(true),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .unwrap();
        test_user
    }

    pub fn token_for(&self, user_id: &str) -> String {
        create_token(&Claims::new(user_id, TokenType::Access), &self.config.jwt.secret).unwrap()
    }

    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };

        TestResponse { status, body }
    }

    /// Request without a body
    pub async fn call(&self, method: &str, uri: &str, user: Option<&TestUser>) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(user) = user {
            builder = builder.header("authorization", user.auth_header());
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }

    pub async fn json(
        &self,
        method: &str,
        uri: &str,
        user: Option<&TestUser>,
        body: Value,
    ) -> TestResponse {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json");
        if let Some(user) = user {
            builder = builder.header("authorization", user.auth_header());
        }
        self.send(builder.body(Body::from(body.to_string())).unwrap())
            .await
    }

    /// urlencoded form; values must not need escaping
    pub async fn form(
        &self,
        uri: &str,
        user: Option<&TestUser>,
        fields: &[(&str, &str)],
    ) -> TestResponse {
        let encoded = fields
            .iter()
            .map(|(k, v)| format!("{}={}", k, v.replace(' ', "+")))
            .collect::<Vec<_>>()
            .join("&");

        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/x-www-form-urlencoded");
        if let Some(user) = user {
            builder = builder.header("authorization", user.auth_header());
        }
        self.send(builder.body(Body::from(encoded)).unwrap()).await
    }

    /// Uploads a file through `POST /upload`
    pub async fn upload(
        &self,
        user: &TestUser,
        file: Option<(&str, &str, &[u8])>,
        caption: Option<&str>,
    ) -> TestResponse {
        let request = Request::builder()
            .method("POST")
            .uri("/upload")
            .header("authorization", user.auth_header())
            .header(
                "content-type",
                format!("multipart/form-data; boundary={}", MULTIPART_BOUNDARY),
            )
            .body(Body::from(multipart_body(file, caption)))
            .unwrap();

        self.send(request).await
    }

    /// Uploads an image and returns the new post's id
    pub async fn create_post(&self, user: &TestUser, caption: &str) -> String {
        let response = self
            .upload(user, Some(("photo.jpg", "image/jpeg", &b"jpeg bytes"[..])), Some(caption))
            .await;
        assert_eq!(response.status, StatusCode::OK, "{}", response.body);
        response.body["id"].as_str().unwrap().to_string()
    }
}

/// Builds a multipart body with optional `file` and `caption` parts
pub fn multipart_body(file: Option<(&str, &str, &[u8])>, caption: Option<&str>) -> Vec<u8> {
    let mut body = Vec::new();

    if let Some(caption) = caption {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"caption\"\r\n\r\n{}\r\n",
                MULTIPART_BOUNDARY, caption
            )
            .as_bytes(),
        );
    }

    if let Some((file_name, content_type, bytes)) = file {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                MULTIPART_BOUNDARY, file_name, content_type
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }

    body.extend_from_slice(format!("--{}--\r\n", MULTIPART_BOUNDARY).as_bytes());
    body
}
