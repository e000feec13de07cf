//! End-to-end test support for the bookstore client.
//!
//! [`FakeBackend`] is a small axum server bound to an ephemeral port that
//! answers with canned responses and records every request it sees, so tests
//! can drive the real storefront and back-office services over HTTP.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p bookstore-integration-tests
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]
#![allow(clippy::missing_panics_doc, clippy::unwrap_used)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri, header};
use axum::response::{IntoResponse, Response};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use bookstore_admin::AdminClient;
use bookstore_client::{ApiClient, ApiConfig};
use bookstore_core::clock::{Clock, ManualClock};
use bookstore_core::storage::{KeyValueStore, MemoryStore};
use bookstore_storefront::Storefront;
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde_json::{Value, json};
use tokio::net::TcpListener;

/// A request as the fake backend received it.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: Method,
    /// Path without the leading slash, e.g. `orders/7/cancel`.
    pub path: String,
    pub query: Option<String>,
    pub authorization: Option<String>,
    /// Parsed JSON body; `Null` when empty or not JSON.
    pub body: Value,
}

#[derive(Debug, Clone)]
struct Canned {
    status: StatusCode,
    body: String,
}

#[derive(Default)]
struct Inner {
    routes: HashMap<(Method, String), Canned>,
    requests: Vec<Recorded>,
}

type Shared = Arc<Mutex<Inner>>;

/// Canned-response HTTP backend.
pub struct FakeBackend {
    base_url: String,
    inner: Shared,
}

impl FakeBackend {
    /// Start serving on `127.0.0.1` with an OS-assigned port.
    pub async fn start() -> Self {
        let inner: Shared = Arc::default();
        let app = Router::new().fallback(handle).with_state(Arc::clone(&inner));

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{addr}/api/"),
            inner,
        }
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Answer `method path` with `status` and a raw body.
    pub fn respond_raw(&self, method: Method, path: &str, status: u16, body: impl Into<String>) {
        self.lock().routes.insert(
            (method, path.trim_matches('/').to_string()),
            Canned {
                status: StatusCode::from_u16(status).unwrap(),
                body: body.into(),
            },
        );
    }

    /// Answer with `body` as JSON, unwrapped.
    pub fn respond(&self, method: Method, path: &str, status: u16, body: &Value) {
        self.respond_raw(method, path, status, body.to_string());
    }

    /// Answer 200 with `result` inside the backend's `{code, result}` envelope.
    pub fn ok(&self, method: Method, path: &str, result: &Value) {
        self.respond(method, path, 200, &envelope(result));
    }

    /// Answer with an error envelope.
    pub fn fail(&self, method: Method, path: &str, status: u16, message: &str) {
        self.respond(
            method,
            path,
            status,
            &json!({ "code": i32::from(status) * 10, "message": message }),
        );
    }

    /// Every request received so far.
    #[must_use]
    pub fn requests(&self) -> Vec<Recorded> {
        self.lock().requests.clone()
    }

    /// Requests matching `method path`.
    #[must_use]
    pub fn requests_to(&self, method: &Method, path: &str) -> Vec<Recorded> {
        self.requests()
            .into_iter()
            .filter(|r| r.method == *method && r.path == path)
            .collect()
    }

    #[must_use]
    pub fn api(&self) -> ApiClient {
        ApiClient::new(&ApiConfig::new(&self.base_url).unwrap()).unwrap()
    }
}

async fn handle(
    State(inner): State<Shared>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let path = uri
        .path()
        .trim_start_matches('/')
        .trim_start_matches("api/")
        .to_string();
    let recorded = Recorded {
        method: method.clone(),
        path: path.clone(),
        query: uri.query().map(str::to_string),
        authorization: headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        body: serde_json::from_slice(&body).unwrap_or(Value::Null),
    };

    let canned = {
        let mut inner = inner.lock().unwrap_or_else(PoisonError::into_inner);
        inner.requests.push(recorded);
        inner.routes.get(&(method, path)).cloned()
    };

    match canned {
        Some(canned) => (
            canned.status,
            [(header::CONTENT_TYPE, "application/json")],
            canned.body,
        )
            .into_response(),
        None => (
            StatusCode::NOT_FOUND,
            [(header::CONTENT_TYPE, "application/json")],
            json!({ "code": 4040, "message": "Không tìm thấy" }).to_string(),
        )
            .into_response(),
    }
}

/// Wrap `result` the way the backend does.
#[must_use]
pub fn envelope(result: &Value) -> Value {
    json!({ "code": 1000, "result": result })
}

/// Unsigned JWT carrying only an `exp` claim.
#[must_use]
pub fn jwt(exp: DateTime<Utc>) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS512"}"#);
    let payload = URL_SAFE_NO_PAD.encode(json!({ "exp": exp.timestamp() }).to_string());
    format!("{header}.{payload}.signature")
}

/// Fixed start time for tests: 2025-05-23 09:00 UTC.
#[must_use]
pub fn test_clock() -> Arc<ManualClock> {
    Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2025, 5, 23, 9, 0, 0).unwrap(),
    ))
}

/// A storefront, its storage and clock, all pointed at `backend`.
pub struct StorefrontHarness {
    pub storefront: Storefront,
    pub store: Arc<MemoryStore>,
    pub clock: Arc<ManualClock>,
}

impl StorefrontHarness {
    #[must_use]
    pub fn new(backend: &FakeBackend) -> Self {
        let store = Arc::new(MemoryStore::new());
        let clock = test_clock();
        let storefront = Storefront::new(
            backend.api(),
            Arc::clone(&store) as Arc<dyn KeyValueStore>,
            Arc::clone(&clock) as Arc<dyn Clock>,
        );
        Self {
            storefront,
            store,
            clock,
        }
    }

    /// Canned login for `user`, with a token valid for a day.
    pub fn expect_login(&self, backend: &FakeBackend, user: &Value) -> String {
        let token = jwt(self.clock.now() + Duration::days(1));
        backend.ok(
            Method::POST,
            "auth/login",
            &json!({ "token": token, "authenticated": true }),
        );
        backend.ok(Method::GET, "users/my-info", user);
        token
    }
}

/// Back-office client over fresh storage.
#[must_use]
pub fn admin_client(backend: &FakeBackend) -> (AdminClient, Arc<ManualClock>) {
    let clock = test_clock();
    let admin = AdminClient::new(
        backend.api(),
        Arc::new(MemoryStore::new()),
        Arc::clone(&clock) as Arc<dyn Clock>,
    );
    (admin, clock)
}

// ============================================================================
// Fixtures
// ============================================================================

#[must_use]
pub fn customer() -> Value {
    json!({
        "id": 7,
        "email": "reader@example.com",
        "full_name": "Nguyễn Văn A",
        "phone_number": "0912345678",
        "role": "USER",
        "date_of_birth": [1995, 4, 12]
    })
}

#[must_use]
pub fn administrator() -> Value {
    json!({
        "id": 1,
        "email": "admin@example.com",
        "full_name": "Quản trị viên",
        "role": "ADMIN"
    })
}

#[must_use]
pub fn book(id: i64, price: i64, stock: u32) -> Value {
    json!({
        "id": id,
        "name": format!("Sách {id}"),
        "author": "Tô Hoài",
        "price": price,
        "stock_quantity": stock,
        "category_id": 3
    })
}

#[must_use]
pub fn page_of(content: &Value, total: u64) -> Value {
    json!({
        "content": content,
        "total_pages": 1,
        "total_elements": total,
        "number": 0,
        "size": 10
    })
}
