//! crates/enrollment_core/src/domain.rs
//!
//! Defines the pure, core data structures for the enrollment engine.
//! These structs are independent of any database or serialization format;
//! course states and requisite flags arrive already computed from the
//! curriculum collaborator and are never derived here.

use uuid::Uuid;

use crate::schedule::TimeBlock;

/// The externally-computed standing of a course for the current student.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CourseState {
    /// Offered and selectable this term.
    Active,
    /// The student is enrolled in it for the active term.
    EnrolledCurrent,
    /// Approved in a previous term; immutable for selection.
    Passed,
    /// Failed before; repeating is recommended but optional.
    PendingRepeat,
    /// Failed before; must be part of every submitted selection.
    MandatoryRepeat,
}

impl CourseState {
    pub fn as_str(&self) -> &'static str {
        match self {
            CourseState::Active => "active",
            CourseState::EnrolledCurrent => "enrolled_current",
            CourseState::Passed => "passed",
            CourseState::PendingRepeat => "pending_repeat",
            CourseState::MandatoryRepeat => "mandatory_repeat",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "active" => Some(CourseState::Active),
            "enrolled_current" => Some(CourseState::EnrolledCurrent),
            "passed" => Some(CourseState::Passed),
            "pending_repeat" => Some(CourseState::PendingRepeat),
            "mandatory_repeat" => Some(CourseState::MandatoryRepeat),
            _ => None,
        }
    }
}

/// Curriculum placement of a course.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CourseCategory {
    Core,
    Elective,
    /// Shared-core course offered across programs.
    CrossProgram,
}

impl CourseCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            CourseCategory::Core => "core",
            CourseCategory::Elective => "elective",
            CourseCategory::CrossProgram => "cross_program",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "core" => Some(CourseCategory::Core),
            "elective" => Some(CourseCategory::Elective),
            "cross_program" => Some(CourseCategory::CrossProgram),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequisiteKind {
    /// Must already be satisfied before the dependent course is taken.
    Prerequisite,
    /// May instead be taken alongside the dependent course.
    Corequisite,
}

/// A dependency of a course on another course, with the satisfaction flag
/// already computed by the curriculum collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requisite {
    pub course_id: Uuid,
    pub kind: RequisiteKind,
    pub satisfied: bool,
}

/// A course as offered to the current student.
#[derive(Debug, Clone, PartialEq)]
pub struct Course {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    /// Credit weight; positive, enforced at catalog construction.
    pub credits: u32,
    pub category: CourseCategory,
    pub state: CourseState,
    pub requisites: Vec<Requisite>,
}

/// A scheduled offering ("grupo") of a course. Read-only catalog data.
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub id: Uuid,
    pub course_id: Uuid,
    pub code: String,
    pub instructor: Option<String>,
    pub seats_available: u32,
    pub seats_max: u32,
    pub time_blocks: Vec<TimeBlock>,
}

impl Section {
    pub fn has_seats(&self) -> bool {
        self.seats_available > 0
    }
}

/// A course+section the student is enrolled in for the active term.
///
/// `withdrawable` is supplied externally; entries for overdue or failed
/// courses arrive with it already cleared.
#[derive(Debug, Clone, PartialEq)]
pub struct EnrollmentEntry {
    pub history_id: Uuid,
    pub course_id: Uuid,
    pub section_id: Uuid,
    pub credits: u32,
    pub withdrawable: bool,
}
