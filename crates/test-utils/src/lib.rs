//! In-memory stand-in for the PostgREST table surface.
//!
//! Serves `/rest/v1/{table}` on an ephemeral localhost port, keeps rows in
//! memory, enforces the `apikey` header, and can be told to fail a table.

use std::{
    collections::{HashMap, HashSet},
    net::SocketAddr,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex, MutexGuard,
    },
};

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::{json, Map, Value};
use tokio::task::JoinHandle;
use uuid::{NoContext, Timestamp, Uuid};

type Params = Vec<(String, String)>;

struct FakeState {
    api_key: String,
    tables: Mutex<HashMap<String, Vec<Value>>>,
    failing: Mutex<HashSet<String>>,
    requests: AtomicUsize,
}

impl FakeState {
    fn tables(&self) -> MutexGuard<'_, HashMap<String, Vec<Value>>> {
        self.tables.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn failing(&self) -> MutexGuard<'_, HashSet<String>> {
        self.failing.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Count the request and run the auth and failure checks shared by all verbs.
    fn admit(&self, table: &str, headers: &HeaderMap) -> Result<(), Response> {
        self.requests.fetch_add(1, Ordering::SeqCst);

        let api_key = headers.get("apikey").and_then(|v| v.to_str().ok());
        let bearer = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "));
        if api_key != Some(self.api_key.as_str()) || bearer != Some(self.api_key.as_str()) {
            return Err(error(
                StatusCode::UNAUTHORIZED,
                "PGRST301",
                "Invalid API key",
            ));
        }

        if self.failing().contains(table) {
            return Err(error(
                StatusCode::NOT_FOUND,
                "42P01",
                &format!("relation \"public.{}\" does not exist", table),
            ));
        }

        Ok(())
    }
}

/// Running fake server. Stops when dropped.
pub struct FakePostgrest {
    addr: SocketAddr,
    state: Arc<FakeState>,
    handle: JoinHandle<()>,
}

impl FakePostgrest {
    /// Bind to `127.0.0.1:0` and start serving.
    pub async fn start(api_key: impl Into<String>) -> std::io::Result<Self> {
        let state = Arc::new(FakeState {
            api_key: api_key.into(),
            tables: Mutex::new(HashMap::new()),
            failing: Mutex::new(HashSet::new()),
            requests: AtomicUsize::new(0),
        });

        let app = Router::new()
            .route(
                "/rest/v1/{table}",
                get(select_rows)
                    .post(insert_rows)
                    .patch(update_rows)
                    .delete(delete_rows),
            )
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                tracing::error!(error = %e, "fake postgrest server failed");
            }
        });

        Ok(Self {
            addr,
            state,
            handle,
        })
    }

    /// Project URL to hand to the client (without the REST prefix).
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn api_key(&self) -> &str {
        &self.state.api_key
    }

    /// Make every request against `table` fail with a missing-relation error.
    pub fn fail_table(&self, table: &str) {
        self.state.failing().insert(table.to_string());
    }

    /// Number of requests received so far, including rejected ones.
    pub fn request_count(&self) -> usize {
        self.state.requests.load(Ordering::SeqCst)
    }

    /// Snapshot of the rows currently stored in `table`.
    pub fn rows(&self, table: &str) -> Vec<Value> {
        self.state.tables().get(table).cloned().unwrap_or_default()
    }

    /// Store `row` directly, bypassing HTTP.
    pub fn seed(&self, table: &str, row: Value) {
        self.state
            .tables()
            .entry(table.to_string())
            .or_default()
            .push(row);
    }
}

impl Drop for FakePostgrest {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn error(status: StatusCode, code: &str, message: &str) -> Response {
    (
        status,
        Json(json!({
            "code": code,
            "message": message,
            "details": null,
            "hint": null,
        })),
    )
        .into_response()
}

/// Only `eq.` filters are understood; anything else is a bad request.
fn parse_filters(params: &Params) -> Result<Vec<(String, String)>, Response> {
    params
        .iter()
        .filter(|(column, _)| column != "select")
        .map(|(column, expr)| match expr.strip_prefix("eq.") {
            Some(value) => Ok((column.clone(), value.to_string())),
            None => Err(error(
                StatusCode::BAD_REQUEST,
                "PGRST100",
                &format!("unsupported filter '{}={}'", column, expr),
            )),
        })
        .collect()
}

fn matches(row: &Value, filters: &[(String, String)]) -> bool {
    filters.iter().all(|(column, expected)| match row.get(column) {
        Some(Value::String(s)) => s == expected,
        Some(other) => other.to_string() == *expected,
        None => false,
    })
}

async fn select_rows(
    State(state): State<Arc<FakeState>>,
    Path(table): Path<String>,
    Query(params): Query<Params>,
    headers: HeaderMap,
) -> Response {
    if let Err(rejection) = state.admit(&table, &headers) {
        return rejection;
    }
    let filters = match parse_filters(&params) {
        Ok(filters) => filters,
        Err(rejection) => return rejection,
    };

    let rows: Vec<Value> = state
        .tables()
        .get(&table)
        .map(|rows| rows.iter().filter(|r| matches(r, &filters)).cloned().collect())
        .unwrap_or_default();

    (StatusCode::OK, Json(Value::Array(rows))).into_response()
}

async fn insert_rows(
    State(state): State<Arc<FakeState>>,
    Path(table): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if let Err(rejection) = state.admit(&table, &headers) {
        return rejection;
    }

    let records = match body {
        Value::Array(records) => records,
        record => vec![record],
    };

    let mut inserted = Vec::with_capacity(records.len());
    for record in records {
        let Value::Object(mut fields) = record else {
            return error(
                StatusCode::BAD_REQUEST,
                "PGRST102",
                "all inserted records must be JSON objects",
            );
        };
        fields
            .entry("id")
            .or_insert_with(|| Value::String(Uuid::new_v7(Timestamp::now(NoContext)).to_string()));
        inserted.push(Value::Object(fields));
    }

    state
        .tables()
        .entry(table)
        .or_default()
        .extend(inserted.iter().cloned());

    (StatusCode::CREATED, Json(Value::Array(inserted))).into_response()
}

async fn update_rows(
    State(state): State<Arc<FakeState>>,
    Path(table): Path<String>,
    Query(params): Query<Params>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if let Err(rejection) = state.admit(&table, &headers) {
        return rejection;
    }
    let filters = match parse_filters(&params) {
        Ok(filters) => filters,
        Err(rejection) => return rejection,
    };
    let Value::Object(patch) = body else {
        return error(
            StatusCode::BAD_REQUEST,
            "PGRST102",
            "update body must be a JSON object",
        );
    };

    let mut updated = Vec::new();
    if let Some(rows) = state.tables().get_mut(&table) {
        for row in rows.iter_mut().filter(|r| matches(r, &filters)) {
            if let Value::Object(fields) = row {
                merge(fields, &patch);
            }
            updated.push(row.clone());
        }
    }

    (StatusCode::OK, Json(Value::Array(updated))).into_response()
}

async fn delete_rows(
    State(state): State<Arc<FakeState>>,
    Path(table): Path<String>,
    Query(params): Query<Params>,
    headers: HeaderMap,
) -> Response {
    if let Err(rejection) = state.admit(&table, &headers) {
        return rejection;
    }
    let filters = match parse_filters(&params) {
        Ok(filters) => filters,
        Err(rejection) => return rejection,
    };

    let mut removed = Vec::new();
    if let Some(rows) = state.tables().get_mut(&table) {
        let (gone, kept): (Vec<Value>, Vec<Value>) =
            rows.drain(..).partition(|r| matches(r, &filters));
        *rows = kept;
        removed = gone;
    }

    (StatusCode::OK, Json(Value::Array(removed))).into_response()
}

fn merge(fields: &mut Map<String, Value>, patch: &Map<String, Value>) {
    for (key, value) in patch {
        fields.insert(key.clone(), value.clone());
    }
}
