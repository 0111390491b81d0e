use std::net::SocketAddr;

use reqwest::{Client, StatusCode};
use serde_json::{Value, json};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use uuid::Uuid;
use wiremock::matchers::{method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

use voxvid::config::{Config, DidConfig, HeyGenConfig, StorageConfig};

/// A running test server with a dedicated test database plus mock servers
/// standing in for the vendor APIs and the S3 endpoint.
pub struct TestApp {
    pub addr: SocketAddr,
    pub pool: PgPool,
    pub client: Client,
    pub db_name: String,
    pub vendor: MockServer,
    pub s3: MockServer,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Prefix every owned-storage URL starts with.
    pub fn owned_prefix(&self) -> String {
        format!("{}/voxvid-test", self.s3.uri())
    }

    /// Accept object PUTs so media transfers into "owned storage" succeed.
    pub async fn mock_s3_accepts_puts(&self, expected: u64) {
        Mock::given(method("PUT"))
            .and(path_regex("^/voxvid-test/.*"))
            .respond_with(ResponseTemplate::new(200).insert_header("ETag", "\"test\""))
            .expect(expected)
            .mount(&self.s3)
            .await;
    }

    /// A finished video hosted on the vendor's transient domain.
    pub async fn mock_vendor_file(&self, file_path: &str) -> String {
        Mock::given(method("GET"))
            .and(path(file_path.to_string()))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("Content-Type", "video/mp4")
                    .set_body_bytes(b"fake mp4 bytes".to_vec()),
            )
            .mount(&self.vendor)
            .await;
        format!("{}{}", self.vendor.uri(), file_path)
    }

    pub async fn register(&self, username: &str, email: &str, password: &str) -> (Value, StatusCode) {
        let resp = self
            .client
            .post(self.url("/api/v1/auth/register"))
            .json(&json!({ "username": username, "email": email, "password": password }))
            .send()
            .await
            .expect("register request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    pub async fn login(&self, username_or_email: &str, password: &str) -> (Value, StatusCode) {
        let resp = self
            .client
            .post(self.url("/api/v1/auth/login"))
            .json(&json!({ "username_or_email": username_or_email, "password": password }))
            .send()
            .await
            .expect("login request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    /// Register a default user, return the access token.
    pub async fn bootstrap(&self) -> String {
        let (body, status) = self.register("alice", "alice@test.com", "password123").await;
        assert_eq!(status, StatusCode::CREATED, "bootstrap register failed: {body}");
        body["access_token"].as_str().unwrap().to_string()
    }

    /// Mock a D-ID submission and create a video job from a pre-hosted
    /// source URL. Returns the created record.
    pub async fn create_did_video(&self, token: &str, talk_id: &str) -> Value {
        Mock::given(method("POST"))
            .and(path("/talks"))
            .respond_with(
                ResponseTemplate::new(201)
                    .set_body_json(json!({ "id": talk_id, "status": "created" })),
            )
            .mount(&self.vendor)
            .await;

        let (body, status) = self
            .post_auth(
                "/api/v1/videos/create",
                token,
                &json!({
                    "name": "My talk",
                    "script_input": "Hello world",
                    "source_url": "https://example.com/face.jpg",
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "create video failed: {body}");
        body
    }

    pub async fn get_auth(&self, path: &str, token: &str) -> (Value, StatusCode) {
        let resp = self
            .client
            .get(self.url(path))
            .bearer_auth(token)
            .send()
            .await
            .expect("get request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    pub async fn post_auth(&self, path: &str, token: &str, body: &Value) -> (Value, StatusCode) {
        let resp = self
            .client
            .post(self.url(path))
            .bearer_auth(token)
            .json(body)
            .send()
            .await
            .expect("post request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    /// Read the latest password reset code stored for an email, retrying
    /// briefly because issuance happens on a spawned task.
    pub async fn wait_for_reset_code(&self, email: &str) -> String {
        for _ in 0..100 {
            let row: Option<(String,)> = sqlx::query_as(
                "SELECT code FROM password_reset_codes
                 WHERE email = $1 ORDER BY created_at DESC LIMIT 1",
            )
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .expect("query reset code failed");

            if let Some((code,)) = row {
                return code;
            }
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        }
        panic!("no reset code issued for {email}");
    }
}

/// Spawn a test app with a fresh temporary database and mock vendors.
pub async fn spawn_app() -> TestApp {
    spawn_app_inner(true).await
}

/// Same harness, but with no object storage configured — the degraded mode
/// small deployments run in.
pub async fn spawn_app_without_storage() -> TestApp {
    spawn_app_inner(false).await
}

async fn spawn_app_inner(with_storage: bool) -> TestApp {
    let _ = dotenvy::dotenv();

    let base_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for tests");

    let db_name = format!("voxvid_test_{}", Uuid::now_v7().to_string().replace('-', ""));

    let admin_url = base_url
        .rsplit_once('/')
        .map(|(base, _)| format!("{base}/postgres"))
        .unwrap_or_else(|| base_url.clone());

    let admin_pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&admin_url)
        .await
        .expect("Failed to connect to postgres for test DB creation");

    sqlx::query(&format!("CREATE DATABASE \"{db_name}\""))
        .execute(&admin_pool)
        .await
        .expect("Failed to create test database");

    admin_pool.close().await;

    let test_url = base_url
        .rsplit_once('/')
        .map(|(base, _)| format!("{base}/{db_name}"))
        .unwrap_or_else(|| base_url.clone());

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&test_url)
        .await
        .expect("Failed to connect to test database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations on test database");

    let vendor = MockServer::start().await;
    let s3 = MockServer::start().await;

    let config = Config {
        database_url: test_url,
        jwt_secret: "test-jwt-secret-that-is-long-enough".to_string(),
        host: "127.0.0.1".parse().unwrap(),
        port: 0, // unused, we bind to a random port
        max_body_size: 26_214_400,
        log_level: "warn".to_string(),
        did: Some(DidConfig {
            api_key: "test-did-key".to_string(),
            api_url: vendor.uri(),
        }),
        heygen: Some(HeyGenConfig {
            api_key: "test-heygen-key".to_string(),
            api_url: vendor.uri(),
        }),
        storage: with_storage.then(|| StorageConfig {
            endpoint_url: s3.uri(),
            access_key_id: "test".to_string(),
            secret_access_key: "test".to_string(),
            bucket: "voxvid-test".to_string(),
            region: "auto".to_string(),
            public_base_url: format!("{}/voxvid-test", s3.uri()),
        }),
        smtp: None,
    };

    let app = voxvid::build_app(pool.clone(), config);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind to random port");
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .expect("Server failed");
    });

    let client = Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap();

    TestApp {
        addr,
        pool,
        client,
        db_name,
        vendor,
        s3,
    }
}

/// Drop the test database after tests complete.
pub async fn cleanup(app: TestApp) {
    let db_name = app.db_name.clone();
    app.pool.close().await;

    let base_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for tests");
    let admin_url = base_url
        .rsplit_once('/')
        .map(|(base, _)| format!("{base}/postgres"))
        .unwrap_or_else(|| base_url.clone());

    let admin_pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&admin_url)
        .await
        .expect("Failed to connect for cleanup");

    let _ = sqlx::query(&format!("DROP DATABASE IF EXISTS \"{db_name}\" WITH (FORCE)"))
        .execute(&admin_pool)
        .await;

    admin_pool.close().await;
}
