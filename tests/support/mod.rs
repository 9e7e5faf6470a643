//! In-process fake of the school management API
//!
//! Serves the endpoints the harness uses from memory on an ephemeral port.
//! `Quirks` switch on specific misbehaviours so tests can check that the
//! harness notices them.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Map, Value};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use edu_smoke::Config;

const COLLECTIONS: [&str; 5] = ["students", "teachers", "classes", "subjects", "teacher-assignments"];

/// Deliberate deviations from the contract
#[derive(Debug, Clone, Default)]
pub struct Quirks {
    /// Added to the count reported by `attendance/bulk`
    pub bulk_count_offset: i64,
    /// PUT replaces the record with the patch instead of merging
    pub update_drops_unpatched: bool,
    /// Valid token with the wrong role gets 403 instead of 401
    pub forbidden_for_wrong_role: bool,
    /// Nobody has notifications
    pub no_notifications: bool,
    /// `auth/me` reports this role for every account
    pub misreported_role: Option<String>,
}

#[derive(Default)]
struct Store {
    users: Vec<Map<String, Value>>,
    tokens: HashMap<String, usize>,
    collections: HashMap<String, Vec<Map<String, Value>>>,
    attendance: Vec<Value>,
    notifications: Vec<Value>,
    next_id: u64,
}

impl Store {
    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{}-{}", prefix, self.next_id)
    }

    fn issue_token(&mut self, user: usize) -> String {
        let token = self.next_id("tok");
        self.tokens.insert(token.clone(), user);
        token
    }
}

struct Inner {
    store: Store,
    quirks: Quirks,
}

type Shared = Arc<Mutex<Inner>>;

pub struct FakeApi {
    pub base_url: String,
    state: Shared,
    handle: JoinHandle<()>,
}

impl FakeApi {
    pub async fn start() -> Self {
        Self::with_quirks(Quirks::default()).await
    }

    pub async fn with_quirks(quirks: Quirks) -> Self {
        let state: Shared = Arc::new(Mutex::new(Inner {
            store: Store::default(),
            quirks,
        }));

        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind fake api");
        let addr = listener.local_addr().expect("local addr");
        let app = router(state.clone());
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.expect("fake api server");
        });

        Self {
            base_url: format!("http://{}/api", addr),
            state,
            handle,
        }
    }

    /// Default config pointed at this server
    pub fn config(&self) -> Config {
        Config {
            timeout_secs: 5,
            ..Config::default()
        }
        .with_base_url(self.base_url.clone())
    }

    pub fn count(&self, collection: &str) -> usize {
        let inner = self.state.lock().unwrap();
        inner
            .store
            .collections
            .get(collection)
            .map_or(0, Vec::len)
    }

    /// Store a record as if another client had created it
    pub fn seed(&self, collection: &str, record: Value) {
        let mut inner = self.state.lock().unwrap();
        match collection {
            "attendance" => inner.store.attendance.push(record),
            _ => {
                let Value::Object(record) = record else {
                    panic!("seeded record must be an object");
                };
                inner
                    .store
                    .collections
                    .entry(collection.to_string())
                    .or_default()
                    .push(record);
            }
        }
    }

    pub fn attendance_count(&self) -> usize {
        self.state.lock().unwrap().store.attendance.len()
    }
}

impl Drop for FakeApi {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn router(state: Shared) -> Router {
    Router::new()
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
        .route("/api/auth/me", get(me))
        .route("/api/attendance", get(list_attendance).post(mark_attendance))
        .route("/api/attendance/bulk", post(bulk_attendance))
        .route("/api/notifications", get(list_notifications))
        .route("/api/notifications/mark-read", post(mark_read))
        .route("/api/dashboard/stats", get(stats))
        .route("/api/parent/students", get(parent_students))
        .route(
            "/api/{collection}",
            get(list_records)
                .post(create_record)
                .put(update_record)
                .delete(delete_record),
        )
        .with_state(state)
}

fn reply(status: StatusCode, body: Value) -> Response {
    (status, Json(body)).into_response()
}

fn unauthorized() -> Response {
    reply(StatusCode::UNAUTHORIZED, json!({"error": "Unauthorized"}))
}

fn public_user(user: &Map<String, Value>) -> Value {
    let mut user = user.clone();
    user.remove("password");
    Value::Object(user)
}

/// Resolve the bearer token and check the caller's role
fn authorize(inner: &Inner, headers: &HeaderMap, allowed: &[&str]) -> Result<Map<String, Value>, Response> {
    let token = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or_else(unauthorized)?;
    let index = *inner.store.tokens.get(token).ok_or_else(unauthorized)?;
    let user = inner.store.users[index].clone();

    let role = user.get("role").and_then(Value::as_str).unwrap_or_default();
    if !allowed.is_empty() && !allowed.contains(&role) {
        if inner.quirks.forbidden_for_wrong_role {
            return Err(reply(StatusCode::FORBIDDEN, json!({"error": "Forbidden"})));
        }
        return Err(unauthorized());
    }
    Ok(user)
}

async fn register(State(state): State<Shared>, Json(body): Json<Value>) -> Response {
    let mut inner = state.lock().unwrap();
    let email = body["email"].as_str().unwrap_or_default().to_string();
    if inner.store.users.iter().any(|u| u["email"] == email) {
        return reply(StatusCode::BAD_REQUEST, json!({"error": "Email already exists"}));
    }

    let role = match body["role"].as_str() {
        Some("admin") => "school_admin",
        Some(role) => role,
        None => return reply(StatusCode::BAD_REQUEST, json!({"error": "All fields required"})),
    }
    .to_string();

    let id = inner.store.next_id("user");
    let mut user = Map::new();
    user.insert("id".into(), json!(id));
    user.insert("role".into(), json!(role));
    user.insert("name".into(), body["name"].clone());
    user.insert("email".into(), json!(email));
    user.insert("password".into(), body["password"].clone());
    inner.store.users.push(user.clone());
    let index = inner.store.users.len() - 1;

    let notification_id = inner.store.next_id("note");
    inner.store.notifications.push(json!({
        "id": notification_id,
        "userId": id,
        "title": "Welcome",
        "read": false,
    }));

    let token = inner.store.issue_token(index);
    reply(StatusCode::OK, json!({"token": token, "user": public_user(&user)}))
}

async fn login(State(state): State<Shared>, Json(body): Json<Value>) -> Response {
    let mut inner = state.lock().unwrap();
    let found = inner
        .store
        .users
        .iter()
        .position(|u| u["email"] == body["email"] && u["password"] == body["password"]);

    match found {
        Some(index) => {
            let token = inner.store.issue_token(index);
            let user = public_user(&inner.store.users[index]);
            reply(StatusCode::OK, json!({"token": token, "user": user}))
        }
        None => reply(StatusCode::UNAUTHORIZED, json!({"error": "Invalid credentials"})),
    }
}

async fn me(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let inner = state.lock().unwrap();
    match authorize(&inner, &headers, &[]) {
        Ok(mut user) => {
            if let Some(role) = &inner.quirks.misreported_role {
                user.insert("role".into(), json!(role));
            }
            reply(StatusCode::OK, public_user(&user))
        }
        Err(response) => response,
    }
}

fn readers(collection: &str) -> &'static [&'static str] {
    match collection {
        "teachers" => &["school_admin"],
        _ => &["school_admin", "teacher"],
    }
}

async fn list_records(
    State(state): State<Shared>,
    Path(collection): Path<String>,
    headers: HeaderMap,
) -> Response {
    if !COLLECTIONS.contains(&collection.as_str()) {
        return reply(StatusCode::NOT_FOUND, json!({"error": "Route not found"}));
    }
    let inner = state.lock().unwrap();
    if let Err(response) = authorize(&inner, &headers, readers(&collection)) {
        return response;
    }
    let records = inner
        .store
        .collections
        .get(&collection)
        .cloned()
        .unwrap_or_default();
    reply(StatusCode::OK, json!(records))
}

async fn create_record(
    State(state): State<Shared>,
    Path(collection): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if !COLLECTIONS.contains(&collection.as_str()) {
        return reply(StatusCode::NOT_FOUND, json!({"error": "Route not found"}));
    }
    let mut inner = state.lock().unwrap();
    if let Err(response) = authorize(&inner, &headers, &["school_admin"]) {
        return response;
    }
    let Value::Object(mut record) = body else {
        return reply(StatusCode::BAD_REQUEST, json!({"error": "Expected an object"}));
    };

    let id = inner.store.next_id(&collection);
    record.insert("id".into(), json!(id));
    record.insert("createdAt".into(), json!("2024-01-15T08:00:00Z"));
    inner
        .store
        .collections
        .entry(collection)
        .or_default()
        .push(record.clone());
    reply(StatusCode::OK, Value::Object(record))
}

async fn update_record(
    State(state): State<Shared>,
    Path(collection): Path<String>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let mut inner = state.lock().unwrap();
    if let Err(response) = authorize(&inner, &headers, &["school_admin"]) {
        return response;
    }
    let Some(id) = query.get("id") else {
        return reply(StatusCode::BAD_REQUEST, json!({"error": "id required"}));
    };
    let Value::Object(patch) = body else {
        return reply(StatusCode::BAD_REQUEST, json!({"error": "Expected an object"}));
    };

    let drop_unpatched = inner.quirks.update_drops_unpatched;
    let records = inner.store.collections.entry(collection).or_default();
    let Some(record) = records.iter_mut().find(|r| r["id"] == json!(id)) else {
        return reply(StatusCode::NOT_FOUND, json!({"error": "Not found"}));
    };

    if drop_unpatched {
        let mut replaced = patch;
        replaced.insert("id".into(), json!(id));
        *record = replaced;
    } else {
        for (key, value) in patch {
            record.insert(key, value);
        }
    }
    reply(StatusCode::OK, json!({"success": true}))
}

async fn delete_record(
    State(state): State<Shared>,
    Path(collection): Path<String>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    let mut inner = state.lock().unwrap();
    if let Err(response) = authorize(&inner, &headers, &["school_admin"]) {
        return response;
    }
    let Some(id) = query.get("id") else {
        return reply(StatusCode::BAD_REQUEST, json!({"error": "id required"}));
    };

    let records = inner.store.collections.entry(collection).or_default();
    let before = records.len();
    records.retain(|r| r["id"] != json!(id));
    if records.len() == before {
        return reply(StatusCode::NOT_FOUND, json!({"error": "Not found"}));
    }
    reply(StatusCode::OK, json!({"success": true}))
}

async fn mark_attendance(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(mut body): Json<Value>,
) -> Response {
    let mut inner = state.lock().unwrap();
    if let Err(response) = authorize(&inner, &headers, &["school_admin", "teacher"]) {
        return response;
    }
    let id = inner.store.next_id("attendance");
    body["id"] = json!(id);
    inner.store.attendance.push(body.clone());
    reply(StatusCode::OK, body)
}

async fn list_attendance(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let inner = state.lock().unwrap();
    if let Err(response) = authorize(&inner, &headers, &["school_admin", "teacher", "parent"]) {
        return response;
    }
    reply(StatusCode::OK, json!(inner.store.attendance))
}

async fn bulk_attendance(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let mut inner = state.lock().unwrap();
    if let Err(response) = authorize(&inner, &headers, &["school_admin", "teacher"]) {
        return response;
    }
    let entries = body["attendanceList"].as_array().cloned().unwrap_or_default();
    let count = entries.len() as i64 + inner.quirks.bulk_count_offset;
    inner.store.attendance.extend(entries);
    reply(StatusCode::OK, json!({"success": true, "count": count}))
}

async fn list_notifications(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let inner = state.lock().unwrap();
    let user = match authorize(&inner, &headers, &[]) {
        Ok(user) => user,
        Err(response) => return response,
    };
    if inner.quirks.no_notifications {
        return reply(StatusCode::OK, json!([]));
    }
    let mine: Vec<Value> = inner
        .store
        .notifications
        .iter()
        .filter(|n| n["userId"] == user["id"])
        .cloned()
        .collect();
    reply(StatusCode::OK, json!(mine))
}

async fn mark_read(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let mut inner = state.lock().unwrap();
    if let Err(response) = authorize(&inner, &headers, &[]) {
        return response;
    }
    let id = body["notificationId"].clone();
    match inner.store.notifications.iter_mut().find(|n| n["id"] == id) {
        Some(notification) => {
            notification["read"] = json!(true);
            reply(StatusCode::OK, json!({"success": true}))
        }
        None => reply(StatusCode::NOT_FOUND, json!({"error": "Notification not found"})),
    }
}

async fn stats(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let inner = state.lock().unwrap();
    let user = match authorize(&inner, &headers, &[]) {
        Ok(user) => user,
        Err(response) => return response,
    };
    let students = inner.store.collections.get("students").map_or(0, Vec::len);
    reply(
        StatusCode::OK,
        json!({"role": user["role"], "totalStudents": students}),
    )
}

async fn parent_students(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let inner = state.lock().unwrap();
    let user = match authorize(&inner, &headers, &["parent"]) {
        Ok(user) => user,
        Err(response) => return response,
    };
    let children: Vec<&Map<String, Value>> = inner
        .store
        .collections
        .get("students")
        .map(|students| {
            students
                .iter()
                .filter(|s| s.get("parentId") == user.get("id"))
                .collect()
        })
        .unwrap_or_default();
    reply(StatusCode::OK, json!(children))
}

/// A base URL on which nothing is listening
pub async fn closed_base_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);
    format!("http://{}/api", addr)
}
