//! crates/diabetes_education_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! The language-model provider, the preference log and the document renderer
//! all sit behind these traits, so the core stays independent of the concrete
//! client libraries the service wires in.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::preferences::PreferenceRecord;

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for the store and renderer ports.
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Log columns {found:?} do not match the expected columns {expected:?}")]
    SchemaDrift {
        expected: Vec<String>,
        found: Vec<String>,
    },
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

/// Failure kinds of the language-model call. Each one is surfaced to the
/// patient with its own message.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GenerationError {
    #[error("The language model rejected our credentials: {0}")]
    Authentication(String),
    #[error("The language model quota or rate limit was exceeded: {0}")]
    QuotaExceeded(String),
    #[error("The language model did not answer within {0} seconds")]
    Timeout(u64),
    #[error("The language model request failed: {0}")]
    Other(String),
}

impl GenerationError {
    /// A stable machine-readable tag for the failure kind.
    pub fn kind(&self) -> &'static str {
        match self {
            GenerationError::Authentication(_) => "authentication",
            GenerationError::QuotaExceeded(_) => "quota_exceeded",
            GenerationError::Timeout(_) => "timeout",
            GenerationError::Other(_) => "generation_failed",
        }
    }
}

//=========================================================================================
// Port Payloads
//=========================================================================================

/// What the language model receives: fixed instructions plus the profile text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryRequest {
    pub system_instructions: String,
    pub user_profile: String,
}

/// Plain summary text plus the light metadata a renderer needs.
#[derive(Debug, Clone)]
pub struct SummaryDocument {
    pub title: String,
    pub generated_at: DateTime<Utc>,
    pub text: String,
}

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait SummaryGenerationService: Send + Sync {
    /// Generates the education summary text for a prepared request.
    async fn generate_summary(&self, request: &SummaryRequest) -> Result<String, GenerationError>;
}

#[async_trait]
pub trait PreferenceStore: Send + Sync {
    /// Durably appends one record. The store is created with a header row on first use.
    async fn append_record(&self, record: PreferenceRecord) -> PortResult<()>;

    /// Returns every record in append order.
    async fn read_records(&self) -> PortResult<Vec<PreferenceRecord>>;
}

pub trait DocumentRenderer: Send + Sync {
    /// Renders a summary into a downloadable byte stream.
    fn render_summary(&self, document: &SummaryDocument) -> PortResult<Vec<u8>>;

    /// The MIME type of the rendered bytes.
    fn content_type(&self) -> &'static str;
}
