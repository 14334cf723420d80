//! crates/enrollment_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the engine's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of specific external implementations like databases or APIs.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Course, EnrollmentEntry, Section};
use crate::workflow::ModificationRequest;

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., database, network).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Unauthorized")]
    Unauthorized,
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Collaborator-Supplied Shapes
//=========================================================================================

/// Raw catalog data for one student, as supplied by the backing store.
/// Validated once through `Catalog::new` before the engine touches it.
#[derive(Debug, Clone)]
pub struct CatalogSource {
    pub courses: Vec<Course>,
    pub sections: Vec<Section>,
}

/// Per-operation gates decided by period administration. The engine only
/// consumes the booleans; opening and closing windows is external.
#[derive(Debug, Clone, Copy)]
pub struct Gates {
    pub enrollment_open: bool,
    pub modification_open: bool,
}

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// The authoritative store behind the engine: catalog and enrollment reads,
/// gate flags, and the modification-request records.
///
/// Implementations must guarantee at most one pending request per student;
/// `insert_request` returns `PortError::Conflict` when a racing insert
/// would break that invariant.
#[async_trait]
pub trait EnrollmentStore: Send + Sync {
    // --- Catalog and enrollment reads ---
    async fn offerings(&self, student_id: Uuid) -> PortResult<CatalogSource>;

    async fn current_enrollment(&self, student_id: Uuid) -> PortResult<Vec<EnrollmentEntry>>;

    async fn credit_ceiling(&self, student_id: Uuid) -> PortResult<u32>;

    async fn gates(&self, student_id: Uuid) -> PortResult<Gates>;

    // --- Modification requests ---
    async fn pending_request(&self, student_id: Uuid)
        -> PortResult<Option<ModificationRequest>>;

    async fn insert_request(&self, request: &ModificationRequest) -> PortResult<()>;

    async fn request_by_id(&self, request_id: Uuid) -> PortResult<ModificationRequest>;

    async fn requests_for_student(
        &self,
        student_id: Uuid,
    ) -> PortResult<Vec<ModificationRequest>>;

    /// The reviewer queue: every pending request, oldest first.
    async fn pending_requests(&self) -> PortResult<Vec<ModificationRequest>>;

    async fn update_request(&self, request: &ModificationRequest) -> PortResult<()>;
}
