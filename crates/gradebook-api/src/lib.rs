//! Gradebook API
//!
//! Student records, the academic score calculator, record persistence and
//! the HTTP API served by the `gradebook` binary.

pub mod api;
pub mod config;
pub mod error;
pub mod record;
pub mod score;
pub mod store;

pub use api::{
    create_router, AppState, AttendanceRequest, ErrorResponse, HomeworkRequest, LoginRequest,
    LoginResponse, SharedStore, SignupRequest, SignupResponse, TestScoreRequest,
};
pub use config::{Config, CONFIG_FILE_NAME};
pub use error::{GradebookError, Result};
pub use record::{StudentRecord, Students};
pub use score::{academic_score, calc_academic, percent};
pub use store::{JsonFileStore, MemoryStore, RecordStore};
