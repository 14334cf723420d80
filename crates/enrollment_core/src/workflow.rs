//! crates/enrollment_core/src/workflow.rs
//!
//! The modification-request lifecycle: a student submits the staged
//! selection as a reviewable request, a reviewer approves or rejects it.
//! Requests snapshot denormalized course/section data so the record stays
//! meaningful even when catalog data later changes. A student can hold at
//! most one pending request; resolution is terminal.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::ports::{EnrollmentStore, PortError};

/// Lifecycle state of a modification request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestState {
    Pending,
    Approved,
    Rejected,
}

impl RequestState {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestState::Pending => "pending",
            RequestState::Approved => "approved",
            RequestState::Rejected => "rejected",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(RequestState::Pending),
            "approved" => Some(RequestState::Approved),
            "rejected" => Some(RequestState::Rejected),
            _ => None,
        }
    }
}

/// Denormalized record of a section the student asked to add.
#[derive(Debug, Clone, PartialEq)]
pub struct SectionSnapshot {
    pub section_id: Uuid,
    pub course_id: Uuid,
    pub course_code: String,
    pub course_name: String,
    pub section_code: String,
    pub instructor: Option<String>,
    pub credits: u32,
}

/// Denormalized record of an enrollment entry the student asked to drop.
#[derive(Debug, Clone, PartialEq)]
pub struct DropSnapshot {
    pub history_id: Uuid,
    pub course_id: Uuid,
    pub section_id: Uuid,
    pub course_code: String,
    pub course_name: String,
    pub credits: u32,
}

/// The validated, snapshotted content of a submission, produced by the
/// selection session at the moment of submission.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestDraft {
    pub adds: Vec<SectionSnapshot>,
    pub drops: Vec<DropSnapshot>,
}

/// A student's reviewable unit of enrollment change.
#[derive(Debug, Clone, PartialEq)]
pub struct ModificationRequest {
    pub id: Uuid,
    pub student_id: Uuid,
    pub adds: Vec<SectionSnapshot>,
    pub drops: Vec<DropSnapshot>,
    pub state: RequestState,
    pub submitted_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
    /// Reviewer text; present exactly when the request was rejected.
    pub observation: Option<String>,
}

/// Why a submission was refused. The ledger is left untouched in every
/// case; the student may retry after addressing the cause.
#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    #[error("nothing selected: stage at least one add or drop before submitting")]
    EmptySelection,
    #[error("course {code} must be repeated this term but is not part of the selection")]
    MandatoryRepeatMissing { code: String },
    #[error("course {code} must be repeated this term and no section has seats available")]
    MandatoryRepeatUnseated { code: String },
    #[error("a modification request is already pending for this student")]
    DuplicateRequest,
    #[error(transparent)]
    Store(PortError),
}

/// Why a resolution attempt failed.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("modification request not found")]
    NotFound,
    #[error("an observation is required to reject a request")]
    MissingObservation,
    #[error("request was already resolved")]
    InvalidTransition,
    #[error(transparent)]
    Store(PortError),
}

/// The reviewer's verdict on a pending request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewDecision {
    Approved,
    Rejected,
}

impl ModificationRequest {
    /// Creates a new pending request from a validated draft.
    pub fn submit(student_id: Uuid, draft: RequestDraft, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            student_id,
            adds: draft.adds,
            drops: draft.drops,
            state: RequestState::Pending,
            submitted_at: now,
            resolved_at: None,
            observation: None,
        }
    }

    /// `pending -> approved`. The backend applies the snapshotted changes;
    /// this engine only records the outcome.
    pub fn approve(&mut self, now: DateTime<Utc>) -> Result<(), ResolveError> {
        if self.state != RequestState::Pending {
            return Err(ResolveError::InvalidTransition);
        }
        self.state = RequestState::Approved;
        self.resolved_at = Some(now);
        Ok(())
    }

    /// `pending -> rejected`; requires non-empty observation text.
    pub fn reject(&mut self, observation: &str, now: DateTime<Utc>) -> Result<(), ResolveError> {
        if self.state != RequestState::Pending {
            return Err(ResolveError::InvalidTransition);
        }
        let observation = observation.trim();
        if observation.is_empty() {
            return Err(ResolveError::MissingObservation);
        }
        self.state = RequestState::Rejected;
        self.resolved_at = Some(now);
        self.observation = Some(observation.to_string());
        Ok(())
    }

    pub fn is_pending(&self) -> bool {
        self.state == RequestState::Pending
    }
}

/// Submits a draft on behalf of `student_id`, enforcing the
/// single-outstanding-request rule against the authoritative store.
///
/// The pre-insert lookup gives a friendly answer; the store's own
/// uniqueness guarantee remains the arbiter under races, and a losing
/// insert surfaces as the same `DuplicateRequest`.
pub async fn submit_request(
    store: &dyn EnrollmentStore,
    student_id: Uuid,
    draft: RequestDraft,
    now: DateTime<Utc>,
) -> Result<ModificationRequest, SubmitError> {
    let pending = store
        .pending_request(student_id)
        .await
        .map_err(SubmitError::Store)?;
    if pending.is_some() {
        return Err(SubmitError::DuplicateRequest);
    }

    let request = ModificationRequest::submit(student_id, draft, now);
    match store.insert_request(&request).await {
        Ok(()) => Ok(request),
        Err(PortError::Conflict(_)) => Err(SubmitError::DuplicateRequest),
        Err(err) => Err(SubmitError::Store(err)),
    }
}

/// Applies a reviewer decision to a stored request.
pub async fn resolve_request(
    store: &dyn EnrollmentStore,
    request_id: Uuid,
    decision: ReviewDecision,
    observation: Option<&str>,
    now: DateTime<Utc>,
) -> Result<ModificationRequest, ResolveError> {
    let mut request = match store.request_by_id(request_id).await {
        Ok(request) => request,
        Err(PortError::NotFound(_)) => return Err(ResolveError::NotFound),
        Err(err) => return Err(ResolveError::Store(err)),
    };

    match decision {
        ReviewDecision::Approved => request.approve(now)?,
        ReviewDecision::Rejected => request.reject(observation.unwrap_or(""), now)?,
    }

    store
        .update_request(&request)
        .await
        .map_err(ResolveError::Store)?;
    Ok(request)
}
