//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete implementation
//! of the `EnrollmentStore` port from the `core` crate. It handles all interactions
//! with the PostgreSQL database using `sqlx`.

use async_trait::async_trait;
use chrono::{DateTime, NaiveTime, Utc};
use enrollment_core::domain::{
    Course, CourseCategory, CourseState, EnrollmentEntry, Requisite, RequisiteKind, Section,
};
use enrollment_core::ports::{CatalogSource, EnrollmentStore, Gates, PortError, PortResult};
use enrollment_core::schedule::{TimeBlock, Weekday};
use enrollment_core::workflow::{
    DropSnapshot, ModificationRequest, RequestState, SectionSnapshot,
};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `EnrollmentStore` port.
#[derive(Clone)]
pub struct DbAdapter {
    pool: PgPool,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::Error> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

fn unexpected(err: sqlx::Error) -> PortError {
    PortError::Unexpected(err.to_string())
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct CourseRecord {
    course_id: Uuid,
    code: String,
    name: String,
    credits: i32,
    category: String,
    state: String,
}

impl CourseRecord {
    fn to_domain(self, requisites: Vec<Requisite>) -> PortResult<Course> {
        let category = CourseCategory::parse(&self.category).ok_or_else(|| {
            PortError::Unexpected(format!("unknown course category '{}'", self.category))
        })?;
        let state = CourseState::parse(&self.state).ok_or_else(|| {
            PortError::Unexpected(format!("unknown course state '{}'", self.state))
        })?;
        Ok(Course {
            id: self.course_id,
            code: self.code,
            name: self.name,
            credits: self.credits as u32,
            category,
            state,
            requisites,
        })
    }
}

#[derive(FromRow)]
struct RequisiteRecord {
    course_id: Uuid,
    requisite_course_id: Uuid,
    kind: String,
    satisfied: bool,
}

impl RequisiteRecord {
    fn to_domain(self) -> PortResult<Requisite> {
        let kind = match self.kind.as_str() {
            "prerequisite" => RequisiteKind::Prerequisite,
            "corequisite" => RequisiteKind::Corequisite,
            other => {
                return Err(PortError::Unexpected(format!(
                    "unknown requisite kind '{other}'"
                )))
            }
        };
        Ok(Requisite {
            course_id: self.requisite_course_id,
            kind,
            satisfied: self.satisfied,
        })
    }
}

#[derive(FromRow)]
struct SectionRecord {
    id: Uuid,
    course_id: Uuid,
    code: String,
    instructor: Option<String>,
    seats_available: i32,
    seats_max: i32,
}

impl SectionRecord {
    fn to_domain(self, time_blocks: Vec<TimeBlock>) -> Section {
        Section {
            id: self.id,
            course_id: self.course_id,
            code: self.code,
            instructor: self.instructor,
            seats_available: self.seats_available.max(0) as u32,
            seats_max: self.seats_max.max(0) as u32,
            time_blocks,
        }
    }
}

#[derive(FromRow)]
struct TimeBlockRecord {
    section_id: Uuid,
    day: String,
    start_time: NaiveTime,
    end_time: NaiveTime,
    room: Option<String>,
}

impl TimeBlockRecord {
    fn to_domain(self) -> PortResult<(Uuid, TimeBlock)> {
        let day = Weekday::parse(&self.day)
            .ok_or_else(|| PortError::Unexpected(format!("unknown weekday '{}'", self.day)))?;
        if self.start_time >= self.end_time {
            return Err(PortError::Unexpected(format!(
                "time block for section {} starts after it ends",
                self.section_id
            )));
        }
        Ok((
            self.section_id,
            TimeBlock::new(day, self.start_time, self.end_time, self.room),
        ))
    }
}

#[derive(FromRow)]
struct EnrollmentRecord {
    history_id: Uuid,
    course_id: Uuid,
    section_id: Uuid,
    credits: i32,
    withdrawable: bool,
}

impl EnrollmentRecord {
    fn to_domain(self) -> EnrollmentEntry {
        EnrollmentEntry {
            history_id: self.history_id,
            course_id: self.course_id,
            section_id: self.section_id,
            credits: self.credits.max(0) as u32,
            withdrawable: self.withdrawable,
        }
    }
}

#[derive(FromRow)]
struct RequestRecord {
    id: Uuid,
    student_id: Uuid,
    state: String,
    submitted_at: DateTime<Utc>,
    resolved_at: Option<DateTime<Utc>>,
    observation: Option<String>,
    sections_to_add: serde_json::Value,
    entries_to_drop: serde_json::Value,
}

/// JSON shape of an add snapshot inside `modification_requests`.
#[derive(Serialize, Deserialize)]
struct AddSnapshotJson {
    section_id: Uuid,
    course_id: Uuid,
    course_code: String,
    course_name: String,
    section_code: String,
    instructor: Option<String>,
    credits: u32,
}

/// JSON shape of a drop snapshot inside `modification_requests`.
#[derive(Serialize, Deserialize)]
struct DropSnapshotJson {
    history_id: Uuid,
    course_id: Uuid,
    section_id: Uuid,
    course_code: String,
    course_name: String,
    credits: u32,
}

impl RequestRecord {
    fn to_domain(self) -> PortResult<ModificationRequest> {
        let state = RequestState::parse(&self.state).ok_or_else(|| {
            PortError::Unexpected(format!("unknown request state '{}'", self.state))
        })?;
        let adds: Vec<AddSnapshotJson> = serde_json::from_value(self.sections_to_add)
            .map_err(|e| PortError::Unexpected(format!("bad add snapshot: {e}")))?;
        let drops: Vec<DropSnapshotJson> = serde_json::from_value(self.entries_to_drop)
            .map_err(|e| PortError::Unexpected(format!("bad drop snapshot: {e}")))?;
        Ok(ModificationRequest {
            id: self.id,
            student_id: self.student_id,
            adds: adds
                .into_iter()
                .map(|a| SectionSnapshot {
                    section_id: a.section_id,
                    course_id: a.course_id,
                    course_code: a.course_code,
                    course_name: a.course_name,
                    section_code: a.section_code,
                    instructor: a.instructor,
                    credits: a.credits,
                })
                .collect(),
            drops: drops
                .into_iter()
                .map(|d| DropSnapshot {
                    history_id: d.history_id,
                    course_id: d.course_id,
                    section_id: d.section_id,
                    course_code: d.course_code,
                    course_name: d.course_name,
                    credits: d.credits,
                })
                .collect(),
            state,
            submitted_at: self.submitted_at,
            resolved_at: self.resolved_at,
            observation: self.observation,
        })
    }
}

fn snapshots_to_json(request: &ModificationRequest) -> (serde_json::Value, serde_json::Value) {
    let adds: Vec<AddSnapshotJson> = request
        .adds
        .iter()
        .map(|a| AddSnapshotJson {
            section_id: a.section_id,
            course_id: a.course_id,
            course_code: a.course_code.clone(),
            course_name: a.course_name.clone(),
            section_code: a.section_code.clone(),
            instructor: a.instructor.clone(),
            credits: a.credits,
        })
        .collect();
    let drops: Vec<DropSnapshotJson> = request
        .drops
        .iter()
        .map(|d| DropSnapshotJson {
            history_id: d.history_id,
            course_id: d.course_id,
            section_id: d.section_id,
            course_code: d.course_code.clone(),
            course_name: d.course_name.clone(),
            credits: d.credits,
        })
        .collect();
    (
        serde_json::to_value(adds).unwrap_or_else(|_| serde_json::Value::Array(vec![])),
        serde_json::to_value(drops).unwrap_or_else(|_| serde_json::Value::Array(vec![])),
    )
}

//=========================================================================================
// Port Implementation
//=========================================================================================

#[async_trait]
impl EnrollmentStore for DbAdapter {
    async fn offerings(&self, student_id: Uuid) -> PortResult<CatalogSource> {
        let course_rows = sqlx::query_as::<_, CourseRecord>(
            r#"
            SELECT course_id, code, name, credits, category, state
            FROM course_offerings
            WHERE student_id = $1
            ORDER BY code
            "#,
        )
        .bind(student_id)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;

        let requisite_rows = sqlx::query_as::<_, RequisiteRecord>(
            r#"
            SELECT course_id, requisite_course_id, kind, satisfied
            FROM course_requisites
            WHERE student_id = $1
            ORDER BY course_id, position
            "#,
        )
        .bind(student_id)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;

        let mut requisites_by_course: std::collections::HashMap<Uuid, Vec<Requisite>> =
            std::collections::HashMap::new();
        for row in requisite_rows {
            let course_id = row.course_id;
            requisites_by_course
                .entry(course_id)
                .or_default()
                .push(row.to_domain()?);
        }

        let mut courses = Vec::with_capacity(course_rows.len());
        for row in course_rows {
            let requisites = requisites_by_course.remove(&row.course_id).unwrap_or_default();
            courses.push(row.to_domain(requisites)?);
        }

        let section_rows = sqlx::query_as::<_, SectionRecord>(
            r#"
            SELECT id, course_id, code, instructor, seats_available, seats_max
            FROM sections
            WHERE course_id IN (
                SELECT course_id FROM course_offerings WHERE student_id = $1
            )
            ORDER BY code
            "#,
        )
        .bind(student_id)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;

        let block_rows = sqlx::query_as::<_, TimeBlockRecord>(
            r#"
            SELECT section_id, day, start_time, end_time, room
            FROM section_time_blocks
            WHERE section_id IN (
                SELECT id FROM sections WHERE course_id IN (
                    SELECT course_id FROM course_offerings WHERE student_id = $1
                )
            )
            "#,
        )
        .bind(student_id)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;

        let mut blocks_by_section: std::collections::HashMap<Uuid, Vec<TimeBlock>> =
            std::collections::HashMap::new();
        for row in block_rows {
            let (section_id, block) = row.to_domain()?;
            blocks_by_section.entry(section_id).or_default().push(block);
        }

        let sections = section_rows
            .into_iter()
            .map(|row| {
                let blocks = blocks_by_section.remove(&row.id).unwrap_or_default();
                row.to_domain(blocks)
            })
            .collect();

        Ok(CatalogSource { courses, sections })
    }

    async fn current_enrollment(&self, student_id: Uuid) -> PortResult<Vec<EnrollmentEntry>> {
        let rows = sqlx::query_as::<_, EnrollmentRecord>(
            r#"
            SELECT history_id, course_id, section_id, credits, withdrawable
            FROM enrollment_entries
            WHERE student_id = $1
            ORDER BY history_id
            "#,
        )
        .bind(student_id)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(rows.into_iter().map(EnrollmentRecord::to_domain).collect())
    }

    async fn credit_ceiling(&self, student_id: Uuid) -> PortResult<u32> {
        let ceiling: Option<(i32,)> =
            sqlx::query_as("SELECT ceiling FROM credit_ceilings WHERE student_id = $1")
                .bind(student_id)
                .fetch_optional(&self.pool)
                .await
                .map_err(unexpected)?;
        match ceiling {
            Some((value,)) => Ok(value.max(0) as u32),
            None => Err(PortError::NotFound(format!(
                "credit ceiling for student {student_id}"
            ))),
        }
    }

    async fn gates(&self, student_id: Uuid) -> PortResult<Gates> {
        let row: Option<(bool, bool)> = sqlx::query_as(
            r#"
            SELECT enrollment_open, modification_open
            FROM enrollment_gates
            WHERE student_id = $1
            "#,
        )
        .bind(student_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;
        match row {
            Some((enrollment_open, modification_open)) => Ok(Gates {
                enrollment_open,
                modification_open,
            }),
            // No configured window means nothing is open for this student.
            None => Ok(Gates {
                enrollment_open: false,
                modification_open: false,
            }),
        }
    }

    async fn pending_request(
        &self,
        student_id: Uuid,
    ) -> PortResult<Option<ModificationRequest>> {
        let row = sqlx::query_as::<_, RequestRecord>(
            r#"
            SELECT id, student_id, state, submitted_at, resolved_at, observation,
                   sections_to_add, entries_to_drop
            FROM modification_requests
            WHERE student_id = $1 AND state = 'pending'
            "#,
        )
        .bind(student_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;
        row.map(RequestRecord::to_domain).transpose()
    }

    async fn insert_request(&self, request: &ModificationRequest) -> PortResult<()> {
        let (adds, drops) = snapshots_to_json(request);
        let result = sqlx::query(
            r#"
            INSERT INTO modification_requests
                (id, student_id, state, submitted_at, resolved_at, observation,
                 sections_to_add, entries_to_drop)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(request.id)
        .bind(request.student_id)
        .bind(request.state.as_str())
        .bind(request.submitted_at)
        .bind(request.resolved_at)
        .bind(request.observation.as_deref())
        .bind(adds)
        .bind(drops)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            // The partial unique index is the authoritative arbiter of the
            // single-pending-request invariant.
            Err(sqlx::Error::Database(db))
                if db.constraint() == Some("one_pending_request_per_student") =>
            {
                Err(PortError::Conflict(
                    "a pending modification request already exists".to_string(),
                ))
            }
            Err(err) => Err(unexpected(err)),
        }
    }

    async fn request_by_id(&self, request_id: Uuid) -> PortResult<ModificationRequest> {
        let row = sqlx::query_as::<_, RequestRecord>(
            r#"
            SELECT id, student_id, state, submitted_at, resolved_at, observation,
                   sections_to_add, entries_to_drop
            FROM modification_requests
            WHERE id = $1
            "#,
        )
        .bind(request_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;
        match row {
            Some(record) => record.to_domain(),
            None => Err(PortError::NotFound(format!(
                "modification request {request_id}"
            ))),
        }
    }

    async fn requests_for_student(
        &self,
        student_id: Uuid,
    ) -> PortResult<Vec<ModificationRequest>> {
        let rows = sqlx::query_as::<_, RequestRecord>(
            r#"
            SELECT id, student_id, state, submitted_at, resolved_at, observation,
                   sections_to_add, entries_to_drop
            FROM modification_requests
            WHERE student_id = $1
            ORDER BY submitted_at DESC
            "#,
        )
        .bind(student_id)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;
        rows.into_iter().map(RequestRecord::to_domain).collect()
    }

    async fn pending_requests(&self) -> PortResult<Vec<ModificationRequest>> {
        let rows = sqlx::query_as::<_, RequestRecord>(
            r#"
            SELECT id, student_id, state, submitted_at, resolved_at, observation,
                   sections_to_add, entries_to_drop
            FROM modification_requests
            WHERE state = 'pending'
            ORDER BY submitted_at ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;
        rows.into_iter().map(RequestRecord::to_domain).collect()
    }

    async fn update_request(&self, request: &ModificationRequest) -> PortResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE modification_requests
            SET state = $2, resolved_at = $3, observation = $4
            WHERE id = $1
            "#,
        )
        .bind(request.id)
        .bind(request.state.as_str())
        .bind(request.resolved_at)
        .bind(request.observation.as_deref())
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;

        if result.rows_affected() == 0 {
            return Err(PortError::NotFound(format!(
                "modification request {}",
                request.id
            )));
        }
        Ok(())
    }
}
