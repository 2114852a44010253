//! Shared setup for the HTTP tests
#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Request, Response, StatusCode},
    Router,
};
use backend_lib::{
    config::{HashingSettings, Settings},
    router::create_router,
    storage::FlatFileStorage,
    validation::Registration,
    AppState,
};
use complaint_desk_common::{Role, User};
use tempfile::TempDir;
use tower::ServiceExt;

pub const PASSWORD: &str = "correct-horse";

/// App state on a temp data dir with cheap scrypt parameters. Keep the
/// `TempDir` alive for the duration of the test.
pub fn setup_test_env() -> (Arc<AppState<FlatFileStorage>>, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let mut settings = Settings::default();
    settings.data_dir = temp_dir.path().to_path_buf();
    settings.password_hashing = HashingSettings { log_n: 4, r: 8, p: 1 };

    let state = Arc::new(AppState::from_settings(&settings).unwrap());
    (state, temp_dir)
}

/// Register a user directly through the auth service
pub async fn seed_user(
    state: &AppState<FlatFileStorage>,
    username: &str,
    role: Role,
    department: &str,
) -> User {
    state
        .auth
        .register(Registration {
            name: format!("{username} name"),
            username: username.to_string(),
            email: format!("{username}@example.edu"),
            password: PASSWORD.to_string(),
            role,
            department: department.to_string(),
        })
        .await
        .unwrap()
}

/// Percent-encode form fields
pub fn form(fields: &[(&str, &str)]) -> String {
    fields
        .iter()
        .map(|(k, v)| format!("{}={}", encode(k), encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

fn encode(value: &str) -> String {
    value
        .bytes()
        .map(|b| match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                (b as char).to_string()
            },
            b' ' => "+".to_string(),
            _ => format!("%{b:02X}"),
        })
        .collect()
}

/// A browser stand-in that remembers the session cookie
pub struct TestClient {
    pub router: Router,
    pub cookie: Option<String>,
}

impl TestClient {
    pub fn new(state: Arc<AppState<FlatFileStorage>>) -> Self {
        Self {
            router: create_router(state),
            cookie: None,
        }
    }

    async fn send(&mut self, request: Request<Body>) -> Response<Body> {
        let response = self.router.clone().oneshot(request).await.unwrap();
        if let Some(set) = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
        {
            self.cookie = set.split(';').next().map(str::to_string);
        }
        response
    }

    fn request(&self, method: &str, uri: &str) -> axum::http::request::Builder {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(cookie) = &self.cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        builder
    }

    pub async fn get(&mut self, uri: &str) -> Response<Body> {
        let request = self.request("GET", uri).body(Body::empty()).unwrap();
        self.send(request).await
    }

    pub async fn post(&mut self, uri: &str, fields: &[(&str, &str)]) -> Response<Body> {
        let request = self
            .request("POST", uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(form(fields)))
            .unwrap();
        self.send(request).await
    }

    pub async fn post_with_referer(
        &mut self,
        uri: &str,
        referer: &str,
        fields: &[(&str, &str)],
    ) -> Response<Body> {
        let request = self
            .request("POST", uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .header(header::REFERER, referer)
            .body(Body::from(form(fields)))
            .unwrap();
        self.send(request).await
    }

    /// GET a page and return its body, asserting 200
    pub async fn page(&mut self, uri: &str) -> String {
        let response = self.get(uri).await;
        assert_eq!(response.status(), StatusCode::OK, "GET {uri}");
        body_text(response).await
    }

    /// Log in and return where the login redirected to
    pub async fn login(&mut self, username: &str, password: &str) -> String {
        let response = self
            .post("/login", &[("username", username), ("password", password)])
            .await;
        location(&response)
    }
}

pub fn location(response: &Response<Body>) -> String {
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap()
        .to_string()
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}
