//! HTTP API endpoints for the Gradebook server.
//!
//! Students sign up, log in and read their record; a teacher posts test,
//! attendance and homework results. Every endpoint reads the store, applies
//! at most one record change, and writes the store back.
//!
//! # Endpoints
//!
//! - `POST /api/students/signup` - Create a student record
//! - `POST /api/students/login` - Check a student's credentials
//! - `GET /api/students/:id` - Get one student record
//! - `GET /api/students` - Get every student record
//! - `POST /api/teacher/test` - Record a test percentage
//! - `POST /api/teacher/attendance` - Record attendance
//! - `POST /api/teacher/homework` - Record homework completion
//!
//! # Example
//!
//! ```no_run
//! use gradebook_api::{create_router, AppState, Config};
//!
//! # async fn example() {
//! let config = Config::default();
//! let state = AppState::from_config(&config);
//!
//! let router = create_router(state);
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:4000").await.unwrap();
//! axum::serve(listener, router).await.unwrap();
//! # }
//! ```

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{error, info, warn};

use crate::{
    Config, GradebookError, JsonFileStore, MemoryStore, RecordStore, StudentRecord, Students,
};

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for the signup endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SignupRequest {
    /// Student id chosen by the student.
    #[serde(default)]
    pub id: Option<String>,
    /// Display name.
    #[serde(default)]
    pub name: Option<String>,
    /// Plaintext password.
    #[serde(default)]
    pub password: Option<String>,
}

/// Response body for the signup endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignupResponse {
    /// Confirmation message.
    pub message: String,
}

/// Request body for the login endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginRequest {
    /// Student id.
    #[serde(default)]
    pub id: Option<String>,
    /// Plaintext password.
    #[serde(default)]
    pub password: Option<String>,
}

/// Response body for the login endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    /// Student id.
    pub id: String,
    /// Display name.
    pub name: String,
}

/// Request body for the test score endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TestScoreRequest {
    /// Student id.
    #[serde(default)]
    pub id: Option<String>,
    /// Test percentage in `[0, 100]`.
    #[serde(default)]
    pub score: Option<f64>,
}

/// Request body for the attendance endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AttendanceRequest {
    /// Student id.
    #[serde(default)]
    pub id: Option<String>,
    /// Sessions attended.
    #[serde(default)]
    pub present: Option<i64>,
    /// Sessions held.
    #[serde(default)]
    pub total: Option<i64>,
}

/// Request body for the homework endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HomeworkRequest {
    /// Student id.
    #[serde(default)]
    pub id: Option<String>,
    /// Assignments completed.
    #[serde(default)]
    pub done: Option<i64>,
    /// Assignments set.
    #[serde(default)]
    pub total: Option<i64>,
}

/// Error response body returned on failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Description of the error.
    pub error: String,
}

// ============================================================================
// Application State
// ============================================================================

/// Record store shared between request handlers.
pub type SharedStore = Arc<Mutex<dyn RecordStore>>;

/// Shared application state for the HTTP server.
///
/// The store mutex is held for each request's whole read-modify-write
/// cycle, so requests served by this process never overwrite each other.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Student record store.
    pub store: SharedStore,
}

impl AppState {
    /// Creates a new `AppState` over the given store.
    #[must_use]
    pub fn new(store: impl RecordStore + 'static) -> Self {
        let store: SharedStore = Arc::new(Mutex::new(store));
        Self { store }
    }

    /// Creates an `AppState` persisting to the configured data file.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        let store = JsonFileStore::new(config.data_path());
        info!(path = %store.path().display(), "Using student data file");
        Self::new(store)
    }

    /// Creates an `AppState` backed by an empty in-memory store.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(MemoryStore::new())
    }
}

// ============================================================================
// API Error Type
// ============================================================================

/// Internal error type for API handlers.
#[derive(Debug)]
enum ApiError {
    /// Missing, malformed or out-of-range input.
    InvalidInput(String),
    /// Unknown id or wrong password.
    Unauthorized(String),
    /// No record for the requested id.
    NotFound(String),
    /// A record already exists for the id.
    Conflict(String),
    /// The store could not be written.
    Store(GradebookError),
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::InvalidInput(rejection.body_text())
    }
}

impl From<GradebookError> for ApiError {
    fn from(err: GradebookError) -> Self {
        Self::Store(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg),
            Self::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            Self::Conflict(msg) => (StatusCode::CONFLICT, msg),
            Self::Store(err) => {
                error!(error = %err, "Failed to persist student data");
                (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
            }
        };

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}

// ============================================================================
// Router Setup
// ============================================================================

/// Creates the HTTP router with all API endpoints.
///
/// The router carries permissive CORS, so a browser front end served from
/// another origin can call it, and traces every request.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        .route("/students/signup", post(handle_signup))
        .route("/students/login", post(handle_login))
        .route("/students", get(handle_get_all))
        .route("/students/:id", get(handle_get_one))
        .route("/teacher/test", post(handle_test))
        .route("/teacher/attendance", post(handle_attendance))
        .route("/teacher/homework", post(handle_homework));

    Router::new()
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(Arc::new(state))
}

// ============================================================================
// Handlers
// ============================================================================

/// Returns the value if it is present and non-empty.
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Handler for `POST /api/students/signup`.
async fn handle_signup(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SignupRequest>, JsonRejection>,
) -> Result<Json<SignupResponse>, ApiError> {
    let Json(request) = payload?;

    let (Some(id), Some(name), Some(password)) = (
        non_empty(request.id),
        non_empty(request.name),
        non_empty(request.password),
    ) else {
        warn!("Signup rejected: missing fields");
        return Err(ApiError::InvalidInput("Missing fields".to_string()));
    };

    let mut store = state.store.lock().await;
    if store.exists(&id) {
        warn!(id = %id, "Signup rejected: student already exists");
        return Err(ApiError::Conflict("Student already exists".to_string()));
    }

    store.set(&id, StudentRecord::new(name, password))?;
    info!(id = %id, "Student created");

    Ok(Json(SignupResponse {
        message: "Student created".to_string(),
    }))
}

/// Handler for `POST /api/students/login`.
///
/// Unknown ids and wrong passwords get the same response.
async fn handle_login(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, ApiError> {
    let Json(request) = payload?;
    let id = request.id.unwrap_or_default();

    let record = state.store.lock().await.get(&id);
    match record {
        Some(record) if request.password.as_deref() == Some(record.password.as_str()) => {
            info!(id = %id, "Student logged in");
            Ok(Json(LoginResponse {
                id,
                name: record.name,
            }))
        }
        _ => {
            warn!(id = %id, "Login rejected");
            Err(ApiError::Unauthorized("Invalid credentials".to_string()))
        }
    }
}

/// Handler for `GET /api/students/:id`.
async fn handle_get_one(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<StudentRecord>, ApiError> {
    state
        .store
        .lock()
        .await
        .get(&id)
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Not found".to_string()))
}

/// Handler for `GET /api/students`.
async fn handle_get_all(State(state): State<Arc<AppState>>) -> Json<Students> {
    Json(state.store.lock().await.list_all())
}

/// Handler for `POST /api/teacher/test`.
async fn handle_test(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<TestScoreRequest>, JsonRejection>,
) -> Result<Json<StudentRecord>, ApiError> {
    let Json(request) = payload?;
    let id = request.id.unwrap_or_default();

    let mut store = state.store.lock().await;
    let mut record = find_student(&*store, &id)?;

    let score = request
        .score
        .filter(|s| (0.0..=100.0).contains(s))
        .ok_or_else(|| {
            warn!(id = %id, score = ?request.score, "Test score rejected");
            ApiError::InvalidInput("Score must be 0–100".to_string())
        })?;

    record.record_test(score);
    store.set(&id, record.clone())?;
    info!(id = %id, score, academic = ?record.academic(), "Test score saved");

    Ok(Json(record))
}

/// Handler for `POST /api/teacher/attendance`.
async fn handle_attendance(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<AttendanceRequest>, JsonRejection>,
) -> Result<Json<StudentRecord>, ApiError> {
    let Json(request) = payload?;
    let id = request.id.unwrap_or_default();

    let mut store = state.store.lock().await;
    let mut record = find_student(&*store, &id)?;

    let (present, total) = checked_ratio(request.present, request.total).ok_or_else(|| {
        warn!(id = %id, present = ?request.present, total = ?request.total, "Attendance rejected");
        ApiError::InvalidInput("Bad attendance values".to_string())
    })?;

    record.record_attendance(present, total);
    store.set(&id, record.clone())?;
    info!(id = %id, present, total, academic = ?record.academic(), "Attendance saved");

    Ok(Json(record))
}

/// Handler for `POST /api/teacher/homework`.
async fn handle_homework(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<HomeworkRequest>, JsonRejection>,
) -> Result<Json<StudentRecord>, ApiError> {
    let Json(request) = payload?;
    let id = request.id.unwrap_or_default();

    let mut store = state.store.lock().await;
    let mut record = find_student(&*store, &id)?;

    let (done, total) = checked_ratio(request.done, request.total).ok_or_else(|| {
        warn!(id = %id, done = ?request.done, total = ?request.total, "Homework rejected");
        ApiError::InvalidInput("Bad homework values".to_string())
    })?;

    record.record_homework(done, total);
    store.set(&id, record.clone())?;
    info!(id = %id, done, total, academic = ?record.academic(), "Homework saved");

    Ok(Json(record))
}

/// Looks up the record a teacher update applies to.
fn find_student(store: &dyn RecordStore, id: &str) -> Result<StudentRecord, ApiError> {
    store.get(id).ok_or_else(|| {
        warn!(id = %id, "Teacher update for unknown student");
        ApiError::NotFound("Student not found".to_string())
    })
}

/// Accepts `part` out of `total` when `total > 0` and `0 <= part <= total`.
fn checked_ratio(part: Option<i64>, total: Option<i64>) -> Option<(u32, u32)> {
    let (part, total) = (part?, total?);
    if total <= 0 || part < 0 || part > total {
        return None;
    }
    Some((u32::try_from(part).ok()?, u32::try_from(total).ok()?))
}

// ============================================================================
// Tests
// ============================================================================
