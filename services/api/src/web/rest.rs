//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the REST API endpoints and the master
//! definition for the OpenAPI specification. The client-side selection is
//! advisory: every proposal is replayed through a fresh engine session
//! built from store data, so the server never trusts a client ledger.

use crate::web::middleware::{ReviewerId, StudentId};
use crate::web::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use chrono::{DateTime, Utc};
use enrollment_core::ports::{EnrollmentStore, PortError};
use enrollment_core::workflow::{
    self, ModificationRequest, ResolveError, ReviewDecision, SubmitError,
};
use enrollment_core::{
    Catalog, RejectReason, ScheduleSource, SelectionSession, TimeBlock,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::error;
use utoipa::{OpenApi, ToSchema};
use uuid::Uuid;

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        eligibility_handler,
        offerings_handler,
        schedule_handler,
        check_add_handler,
        check_drop_handler,
        validate_selection_handler,
        submit_request_handler,
        list_requests_handler,
        pending_requests_handler,
        resolve_request_handler,
    ),
    components(schemas(
        EligibilityResponse,
        WindowDecision,
        OfferingsResponse,
        CourseDto,
        SectionDto,
        RequisiteDto,
        TimeBlockDto,
        EnrollmentEntryDto,
        CreditSummaryDto,
        ScheduleResponse,
        ScheduleItemDto,
        CheckAddBody,
        CheckDropBody,
        DecisionDto,
        SelectionProposal,
        ValidateResponse,
        ItemDecisionDto,
        ModificationRequestDto,
        AddSnapshotDto,
        DropSnapshotDto,
        ResolveBody,
    )),
    tags(
        (name = "Enrollment API", description = "Self-registration endpoints: selection validation and modification requests.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// API Response and Payload Structs
//=========================================================================================

/// Whether one registration window is open for the caller.
#[derive(Serialize, ToSchema)]
pub struct WindowDecision {
    pub allowed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct EligibilityResponse {
    pub enrollment: WindowDecision,
    pub modification: WindowDecision,
}

#[derive(Serialize, ToSchema)]
pub struct TimeBlockDto {
    pub day: String,
    /// Wall-clock start, `HH:MM`.
    pub start: String,
    pub end: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub room: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct SectionDto {
    pub id: Uuid,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instructor: Option<String>,
    pub seats_available: u32,
    pub seats_max: u32,
    pub time_blocks: Vec<TimeBlockDto>,
}

#[derive(Serialize, ToSchema)]
pub struct RequisiteDto {
    pub course_id: Uuid,
    pub kind: String,
    pub satisfied: bool,
}

#[derive(Serialize, ToSchema)]
pub struct CourseDto {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    pub credits: u32,
    pub category: String,
    pub state: String,
    pub requisites: Vec<RequisiteDto>,
    pub sections: Vec<SectionDto>,
}

#[derive(Serialize, ToSchema)]
pub struct EnrollmentEntryDto {
    pub history_id: Uuid,
    pub course_id: Uuid,
    pub section_id: Uuid,
    pub course_code: String,
    pub course_name: String,
    pub section_code: String,
    pub credits: u32,
    pub withdrawable: bool,
}

#[derive(Serialize, ToSchema)]
pub struct CreditSummaryDto {
    pub base: u32,
    pub delta: i64,
    pub ceiling: u32,
    pub projected: i64,
    pub remaining: u32,
}

#[derive(Serialize, ToSchema)]
pub struct OfferingsResponse {
    pub courses: Vec<CourseDto>,
    pub enrollment: Vec<EnrollmentEntryDto>,
    pub credits: CreditSummaryDto,
}

#[derive(Serialize, ToSchema)]
pub struct ScheduleItemDto {
    pub course_code: String,
    pub course_name: String,
    pub section_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instructor: Option<String>,
    /// `enrolled` or `staged`.
    pub source: String,
    pub blocks: Vec<TimeBlockDto>,
}

#[derive(Serialize, ToSchema)]
pub struct ScheduleResponse {
    pub items: Vec<ScheduleItemDto>,
}

#[derive(Deserialize, ToSchema)]
pub struct CheckAddBody {
    pub section_id: Uuid,
}

#[derive(Deserialize, ToSchema)]
pub struct CheckDropBody {
    pub history_id: Uuid,
}

/// The wire shape of an accept/reject decision with its reason.
#[derive(Serialize, ToSchema)]
pub struct DecisionDto {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl DecisionDto {
    fn accepted() -> Self {
        Self {
            ok: true,
            reason_code: None,
            reason: None,
        }
    }

    fn rejected(reason: &RejectReason) -> Self {
        Self {
            ok: false,
            reason_code: Some(reason.code().to_string()),
            reason: Some(reason.to_string()),
        }
    }
}

/// A full proposed selection, replayed server-side in order: drops first,
/// then adds, so freed seats/credits/blocks count for the adds.
#[derive(Deserialize, ToSchema)]
pub struct SelectionProposal {
    #[serde(default)]
    pub adds: Vec<Uuid>,
    #[serde(default)]
    pub drops: Vec<Uuid>,
}

#[derive(Serialize, ToSchema)]
pub struct ItemDecisionDto {
    /// `add` or `drop`.
    pub kind: String,
    pub id: Uuid,
    pub decision: DecisionDto,
}

#[derive(Serialize, ToSchema)]
pub struct ValidateResponse {
    pub decisions: Vec<ItemDecisionDto>,
    pub credits: CreditSummaryDto,
    /// Monotonic token for the replayed session; a client that interleaves
    /// validations discards responses carrying an older revision.
    pub revision: u64,
}

#[derive(Serialize, ToSchema)]
pub struct AddSnapshotDto {
    pub section_id: Uuid,
    pub course_id: Uuid,
    pub course_code: String,
    pub course_name: String,
    pub section_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instructor: Option<String>,
    pub credits: u32,
}

#[derive(Serialize, ToSchema)]
pub struct DropSnapshotDto {
    pub history_id: Uuid,
    pub course_id: Uuid,
    pub section_id: Uuid,
    pub course_code: String,
    pub course_name: String,
    pub credits: u32,
}

#[derive(Serialize, ToSchema)]
pub struct ModificationRequestDto {
    pub id: Uuid,
    pub student_id: Uuid,
    pub state: String,
    pub submitted_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolved_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observation: Option<String>,
    pub sections_to_add: Vec<AddSnapshotDto>,
    pub entries_to_drop: Vec<DropSnapshotDto>,
}

#[derive(Deserialize, ToSchema)]
pub struct ResolveBody {
    /// `approved` or `rejected`.
    pub decision: String,
    #[serde(default)]
    pub observation: Option<String>,
}

//=========================================================================================
// DTO Conversions
//=========================================================================================

fn time_block_dto(block: &TimeBlock) -> TimeBlockDto {
    TimeBlockDto {
        day: block.day.as_str().to_string(),
        start: block.start.format("%H:%M").to_string(),
        end: block.end.format("%H:%M").to_string(),
        room: block.room.clone(),
    }
}

fn request_dto(request: &ModificationRequest) -> ModificationRequestDto {
    ModificationRequestDto {
        id: request.id,
        student_id: request.student_id,
        state: request.state.as_str().to_string(),
        submitted_at: request.submitted_at,
        resolved_at: request.resolved_at,
        observation: request.observation.clone(),
        sections_to_add: request
            .adds
            .iter()
            .map(|a| AddSnapshotDto {
                section_id: a.section_id,
                course_id: a.course_id,
                course_code: a.course_code.clone(),
                course_name: a.course_name.clone(),
                section_code: a.section_code.clone(),
                instructor: a.instructor.clone(),
                credits: a.credits,
            })
            .collect(),
        entries_to_drop: request
            .drops
            .iter()
            .map(|d| DropSnapshotDto {
                history_id: d.history_id,
                course_id: d.course_id,
                section_id: d.section_id,
                course_code: d.course_code.clone(),
                course_name: d.course_name.clone(),
                credits: d.credits,
            })
            .collect(),
    }
}

fn credit_summary_dto(session: &SelectionSession) -> CreditSummaryDto {
    let summary = session.credit_summary();
    CreditSummaryDto {
        base: summary.base,
        delta: summary.delta,
        ceiling: summary.ceiling,
        projected: summary.projected,
        remaining: summary.remaining,
    }
}

//=========================================================================================
// Shared Handler Helpers
//=========================================================================================

type HandlerError = (StatusCode, String);

fn port_error(context: &str, err: PortError) -> HandlerError {
    let status = match &err {
        PortError::NotFound(_) => StatusCode::NOT_FOUND,
        PortError::Conflict(_) => StatusCode::CONFLICT,
        PortError::Unauthorized => StatusCode::UNAUTHORIZED,
        PortError::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    error!("{context}: {err:?}");
    (status, err.to_string())
}

/// Builds a fresh engine session for the student from store data. All
/// collaborator shapes are validated here, once, via `Catalog::new`.
async fn load_session(state: &AppState, student_id: Uuid) -> Result<SelectionSession, HandlerError> {
    let source = state
        .store
        .offerings(student_id)
        .await
        .map_err(|e| port_error("Failed to load offerings", e))?;
    let catalog = Catalog::new(source.courses, source.sections).map_err(|e| {
        error!("Catalog data failed boundary validation: {e}");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Invalid catalog data".to_string(),
        )
    })?;
    let enrollment = state
        .store
        .current_enrollment(student_id)
        .await
        .map_err(|e| port_error("Failed to load enrollment", e))?;
    let ceiling = state
        .store
        .credit_ceiling(student_id)
        .await
        .map_err(|e| port_error("Failed to load credit ceiling", e))?;
    Ok(SelectionSession::new(catalog, enrollment, ceiling))
}

/// Replays a proposed selection through the session. Drops are applied
/// before adds so that freed time blocks and credits are available to the
/// additions, matching how the editing screen accumulates changes.
fn replay_proposal(
    session: &mut SelectionSession,
    proposal: &SelectionProposal,
) -> Vec<ItemDecisionDto> {
    let mut decisions = Vec::with_capacity(proposal.adds.len() + proposal.drops.len());
    for history_id in &proposal.drops {
        let decision = match session.drop_entry(*history_id) {
            Ok(()) => DecisionDto::accepted(),
            Err(reason) => DecisionDto::rejected(&reason),
        };
        decisions.push(ItemDecisionDto {
            kind: "drop".to_string(),
            id: *history_id,
            decision,
        });
    }
    for section_id in &proposal.adds {
        let decision = match session.add(*section_id) {
            Ok(()) => DecisionDto::accepted(),
            Err(reason) => DecisionDto::rejected(&reason),
        };
        decisions.push(ItemDecisionDto {
            kind: "add".to_string(),
            id: *section_id,
            decision,
        });
    }
    decisions
}

//=========================================================================================
// Student Handlers
//=========================================================================================

/// Report whether the enrollment and modification windows are open.
#[utoipa::path(
    get,
    path = "/enrollment/eligibility",
    responses(
        (status = 200, description = "Gate decision for both windows", body = EligibilityResponse),
        (status = 401, description = "Missing or invalid identity")
    )
)]
pub async fn eligibility_handler(
    State(state): State<Arc<AppState>>,
    Extension(StudentId(student_id)): Extension<StudentId>,
) -> Result<impl IntoResponse, HandlerError> {
    let gates = state
        .store
        .gates(student_id)
        .await
        .map_err(|e| port_error("Failed to load gates", e))?;

    let closed = |name: &str| Some(format!("The {name} window is not open for your program."));
    Ok(Json(EligibilityResponse {
        enrollment: WindowDecision {
            allowed: gates.enrollment_open,
            reason: if gates.enrollment_open {
                None
            } else {
                closed("enrollment")
            },
        },
        modification: WindowDecision {
            allowed: gates.modification_open,
            reason: if gates.modification_open {
                None
            } else {
                closed("modification")
            },
        },
    }))
}

/// The course catalog, current enrollment and credit summary for the
/// authenticated student.
#[utoipa::path(
    get,
    path = "/enrollment/offerings",
    responses(
        (status = 200, description = "Offerings and enrollment", body = OfferingsResponse),
        (status = 403, description = "No registration window is open"),
        (status = 401, description = "Missing or invalid identity")
    )
)]
pub async fn offerings_handler(
    State(state): State<Arc<AppState>>,
    Extension(StudentId(student_id)): Extension<StudentId>,
) -> Result<impl IntoResponse, HandlerError> {
    let gates = state
        .store
        .gates(student_id)
        .await
        .map_err(|e| port_error("Failed to load gates", e))?;
    if !gates.enrollment_open && !gates.modification_open {
        return Err((
            StatusCode::FORBIDDEN,
            "No registration window is open for your program.".to_string(),
        ));
    }

    let session = load_session(&state, student_id).await?;
    let catalog = session.catalog();

    let mut courses: Vec<CourseDto> = catalog
        .courses()
        .map(|course| CourseDto {
            id: course.id,
            code: course.code.clone(),
            name: course.name.clone(),
            credits: course.credits,
            category: course.category.as_str().to_string(),
            state: course.state.as_str().to_string(),
            requisites: course
                .requisites
                .iter()
                .map(|r| RequisiteDto {
                    course_id: r.course_id,
                    kind: match r.kind {
                        enrollment_core::RequisiteKind::Prerequisite => "prerequisite",
                        enrollment_core::RequisiteKind::Corequisite => "corequisite",
                    }
                    .to_string(),
                    satisfied: r.satisfied,
                })
                .collect(),
            sections: catalog
                .sections_of(course.id)
                .map(|section| SectionDto {
                    id: section.id,
                    code: section.code.clone(),
                    instructor: section.instructor.clone(),
                    seats_available: section.seats_available,
                    seats_max: section.seats_max,
                    time_blocks: section.time_blocks.iter().map(time_block_dto).collect(),
                })
                .collect(),
        })
        .collect();
    courses.sort_by(|a, b| a.code.cmp(&b.code));

    let enrollment = session
        .enrollment()
        .iter()
        .map(|entry| {
            let course = catalog.course(entry.course_id);
            let section = catalog.section(entry.section_id);
            EnrollmentEntryDto {
                history_id: entry.history_id,
                course_id: entry.course_id,
                section_id: entry.section_id,
                course_code: course.map(|c| c.code.clone()).unwrap_or_default(),
                course_name: course.map(|c| c.name.clone()).unwrap_or_default(),
                section_code: section.map(|s| s.code.clone()).unwrap_or_default(),
                credits: entry.credits,
                withdrawable: entry.withdrawable,
            }
        })
        .collect();

    let credits = credit_summary_dto(&session);
    Ok(Json(OfferingsResponse {
        courses,
        enrollment,
        credits,
    }))
}

/// The student's current weekly schedule.
#[utoipa::path(
    get,
    path = "/enrollment/schedule",
    responses(
        (status = 200, description = "Current weekly schedule", body = ScheduleResponse),
        (status = 401, description = "Missing or invalid identity")
    )
)]
pub async fn schedule_handler(
    State(state): State<Arc<AppState>>,
    Extension(StudentId(student_id)): Extension<StudentId>,
) -> Result<impl IntoResponse, HandlerError> {
    let session = load_session(&state, student_id).await?;
    let items = session
        .schedule_view()
        .iter()
        .map(|item| ScheduleItemDto {
            course_code: item.course_code.clone(),
            course_name: item.course_name.clone(),
            section_code: item.section_code.clone(),
            instructor: item.instructor.clone(),
            source: match item.source {
                ScheduleSource::Enrolled => "enrolled",
                ScheduleSource::Staged => "staged",
            }
            .to_string(),
            blocks: item.blocks.iter().map(time_block_dto).collect(),
        })
        .collect();
    Ok(Json(ScheduleResponse { items }))
}

/// Decide whether one section could be added to an empty selection.
#[utoipa::path(
    post,
    path = "/selection/check-add",
    request_body = CheckAddBody,
    responses(
        (status = 200, description = "Accept/reject decision", body = DecisionDto),
        (status = 401, description = "Missing or invalid identity")
    )
)]
pub async fn check_add_handler(
    State(state): State<Arc<AppState>>,
    Extension(StudentId(student_id)): Extension<StudentId>,
    Json(body): Json<CheckAddBody>,
) -> Result<impl IntoResponse, HandlerError> {
    let mut session = load_session(&state, student_id).await?;
    let decision = match session.add(body.section_id) {
        Ok(()) => DecisionDto::accepted(),
        Err(reason) => DecisionDto::rejected(&reason),
    };
    Ok(Json(decision))
}

/// Decide whether one enrollment entry could be dropped.
#[utoipa::path(
    post,
    path = "/selection/check-drop",
    request_body = CheckDropBody,
    responses(
        (status = 200, description = "Accept/reject decision", body = DecisionDto),
        (status = 401, description = "Missing or invalid identity")
    )
)]
pub async fn check_drop_handler(
    State(state): State<Arc<AppState>>,
    Extension(StudentId(student_id)): Extension<StudentId>,
    Json(body): Json<CheckDropBody>,
) -> Result<impl IntoResponse, HandlerError> {
    let mut session = load_session(&state, student_id).await?;
    let decision = match session.drop_entry(body.history_id) {
        Ok(()) => DecisionDto::accepted(),
        Err(reason) => DecisionDto::rejected(&reason),
    };
    Ok(Json(decision))
}

/// Replay a whole proposed selection and report per-item decisions plus
/// the projected credit summary.
#[utoipa::path(
    post,
    path = "/selection/validate",
    request_body = SelectionProposal,
    responses(
        (status = 200, description = "Per-item decisions", body = ValidateResponse),
        (status = 401, description = "Missing or invalid identity")
    )
)]
pub async fn validate_selection_handler(
    State(state): State<Arc<AppState>>,
    Extension(StudentId(student_id)): Extension<StudentId>,
    Json(proposal): Json<SelectionProposal>,
) -> Result<impl IntoResponse, HandlerError> {
    let mut session = load_session(&state, student_id).await?;
    let decisions = replay_proposal(&mut session, &proposal);
    let credits = credit_summary_dto(&session);
    let revision = session.revision();
    Ok(Json(ValidateResponse {
        decisions,
        credits,
        revision,
    }))
}

/// Submit the proposed selection as a modification request.
#[utoipa::path(
    post,
    path = "/requests",
    request_body = SelectionProposal,
    responses(
        (status = 201, description = "Pending request created", body = ModificationRequestDto),
        (status = 403, description = "Modification window closed"),
        (status = 409, description = "A request is already pending"),
        (status = 422, description = "Selection invalid or empty"),
        (status = 401, description = "Missing or invalid identity")
    )
)]
pub async fn submit_request_handler(
    State(state): State<Arc<AppState>>,
    Extension(StudentId(student_id)): Extension<StudentId>,
    Json(proposal): Json<SelectionProposal>,
) -> Result<impl IntoResponse, HandlerError> {
    let gates = state
        .store
        .gates(student_id)
        .await
        .map_err(|e| port_error("Failed to load gates", e))?;
    if !gates.modification_open {
        return Err((
            StatusCode::FORBIDDEN,
            "The modification window is not open for your program.".to_string(),
        ));
    }

    let mut session = load_session(&state, student_id).await?;
    let decisions = replay_proposal(&mut session, &proposal);
    if let Some(refused) = decisions.iter().find(|d| !d.decision.ok) {
        let reason = refused
            .decision
            .reason
            .clone()
            .unwrap_or_else(|| "selection rejected".to_string());
        return Err((StatusCode::UNPROCESSABLE_ENTITY, reason));
    }

    let draft = session.draft_request().map_err(|e| match &e {
        SubmitError::EmptySelection
        | SubmitError::MandatoryRepeatMissing { .. }
        | SubmitError::MandatoryRepeatUnseated { .. } => {
            (StatusCode::UNPROCESSABLE_ENTITY, e.to_string())
        }
        _ => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    })?;

    match workflow::submit_request(state.store.as_ref(), student_id, draft, Utc::now()).await {
        Ok(request) => Ok((StatusCode::CREATED, Json(request_dto(&request)))),
        Err(SubmitError::DuplicateRequest) => Err((
            StatusCode::CONFLICT,
            "A modification request is already pending; wait for its resolution.".to_string(),
        )),
        Err(err) => {
            error!("Failed to submit modification request: {err:?}");
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to submit modification request".to_string(),
            ))
        }
    }
}

/// The student's own modification requests, newest first.
#[utoipa::path(
    get,
    path = "/requests",
    responses(
        (status = 200, description = "Requests for the student", body = [ModificationRequestDto]),
        (status = 401, description = "Missing or invalid identity")
    )
)]
pub async fn list_requests_handler(
    State(state): State<Arc<AppState>>,
    Extension(StudentId(student_id)): Extension<StudentId>,
) -> Result<impl IntoResponse, HandlerError> {
    let requests = state
        .store
        .requests_for_student(student_id)
        .await
        .map_err(|e| port_error("Failed to list requests", e))?;
    let dtos: Vec<ModificationRequestDto> = requests.iter().map(request_dto).collect();
    Ok(Json(dtos))
}

//=========================================================================================
// Reviewer Handlers
//=========================================================================================

/// The reviewer queue: all pending requests, oldest first.
#[utoipa::path(
    get,
    path = "/requests/pending",
    responses(
        (status = 200, description = "Pending requests", body = [ModificationRequestDto]),
        (status = 401, description = "Missing or invalid identity")
    )
)]
pub async fn pending_requests_handler(
    State(state): State<Arc<AppState>>,
    Extension(ReviewerId(_reviewer_id)): Extension<ReviewerId>,
) -> Result<impl IntoResponse, HandlerError> {
    let requests = state
        .store
        .pending_requests()
        .await
        .map_err(|e| port_error("Failed to load pending requests", e))?;
    let dtos: Vec<ModificationRequestDto> = requests.iter().map(request_dto).collect();
    Ok(Json(dtos))
}

/// Approve or reject a pending request. Rejection requires an observation.
#[utoipa::path(
    post,
    path = "/requests/{id}/resolve",
    request_body = ResolveBody,
    params(("id" = Uuid, Path, description = "Modification request id")),
    responses(
        (status = 200, description = "Resolved request", body = ModificationRequestDto),
        (status = 404, description = "Unknown request"),
        (status = 409, description = "Request already resolved"),
        (status = 422, description = "Observation missing on rejection"),
        (status = 401, description = "Missing or invalid identity")
    )
)]
pub async fn resolve_request_handler(
    State(state): State<Arc<AppState>>,
    Extension(ReviewerId(_reviewer_id)): Extension<ReviewerId>,
    Path(request_id): Path<Uuid>,
    Json(body): Json<ResolveBody>,
) -> Result<impl IntoResponse, HandlerError> {
    let decision = match body.decision.as_str() {
        "approved" => ReviewDecision::Approved,
        "rejected" => ReviewDecision::Rejected,
        other => {
            return Err((
                StatusCode::BAD_REQUEST,
                format!("Unknown decision '{other}'; expected 'approved' or 'rejected'."),
            ))
        }
    };

    let result = workflow::resolve_request(
        state.store.as_ref(),
        request_id,
        decision,
        body.observation.as_deref(),
        Utc::now(),
    )
    .await;

    match result {
        Ok(request) => Ok(Json(request_dto(&request))),
        Err(ResolveError::NotFound) => Err((
            StatusCode::NOT_FOUND,
            "Modification request not found.".to_string(),
        )),
        Err(ResolveError::MissingObservation) => Err((
            StatusCode::UNPROCESSABLE_ENTITY,
            "An observation is required to reject a request.".to_string(),
        )),
        Err(ResolveError::InvalidTransition) => Err((
            StatusCode::CONFLICT,
            "Request was already resolved; refresh to see its final state.".to_string(),
        )),
        Err(err) => {
            error!("Failed to resolve request {request_id}: {err:?}");
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to resolve modification request".to_string(),
            ))
        }
    }
}
