//! Backend access.
//!
//! The REST service is reached through three small traits, one per record
//! family. [`HttpBackend`] talks to the real service; [`MemoryBackend`]
//! keeps everything in process for `--demo` and tests.

mod error;
mod http;
mod memory;
mod payload;

pub use error::{ApiError, ApiErrorCode};
pub use http::HttpBackend;
pub use memory::MemoryBackend;
pub use payload::{PayloadPart, ResortPayload};

use serde::Serialize;

use crate::record::{RecordId, Resort, SkiPass, User, UserUpdate};

/// Default backend address.
pub const DEFAULT_API_URL: &str = "http://localhost:3000";

/// Body of a scrape-and-ingest request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScrapeRequest {
    pub name: String,
    pub url: String,
}

pub trait ResortApi: Send + Sync {
    fn fetch_resorts(&self) -> Result<Vec<Resort>, ApiError>;

    /// Create a resort; returns the stored record with its new id.
    fn create_resort(&self, resort: &Resort) -> Result<Resort, ApiError>;

    /// Replace a resort with `resort`; returns the stored record.
    fn update_resort(&self, resort: &Resort) -> Result<Resort, ApiError>;

    fn delete_resort(&self, id: &RecordId) -> Result<(), ApiError>;

    /// Ask the backend to scrape `request.url` and store the result.
    fn scrape_and_ingest(&self, request: &ScrapeRequest) -> Result<Resort, ApiError>;
}

pub trait SkiPassApi: Send + Sync {
    fn fetch_ski_passes(&self) -> Result<Vec<SkiPass>, ApiError>;

    /// Create a ski pass; returns the stored record with its new id.
    fn create_ski_pass(&self, pass: &SkiPass) -> Result<SkiPass, ApiError>;

    /// Replace the ski pass with `pass.id`; returns the stored record.
    fn update_ski_pass(&self, pass: &SkiPass) -> Result<SkiPass, ApiError>;

    fn delete_ski_pass(&self, id: &RecordId) -> Result<(), ApiError>;
}

pub trait UserApi: Send + Sync {
    fn fetch_users(&self) -> Result<Vec<User>, ApiError>;
    fn update_user(&self, id: &RecordId, update: &UserUpdate) -> Result<User, ApiError>;
    fn delete_user(&self, id: &RecordId) -> Result<(), ApiError>;
}

/// Everything the console needs from a backend.
pub trait Backend: ResortApi + SkiPassApi + UserApi {}

impl<T: ResortApi + SkiPassApi + UserApi> Backend for T {}
