//! crates/enrollment_core/src/session.rs
//!
//! The editing-session facade over catalog, enrollment, accountant and
//! ledger. Every mutation is validated by the checker first and only an
//! accepted decision touches the ledger; an accepted mutation bumps the
//! session revision so callers can discard stale asynchronous responses.

use uuid::Uuid;

use crate::catalog::Catalog;
use crate::checker::{EligibilityChecker, RejectReason};
use crate::credits::CreditAccountant;
use crate::domain::{CourseState, EnrollmentEntry};
use crate::ledger::SelectionLedger;
use crate::schedule::TimeBlock;
use crate::workflow::{DropSnapshot, RequestDraft, SectionSnapshot, SubmitError};

/// Where a scheduled item comes from in the merged weekly view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleSource {
    /// An existing enrollment entry not staged for drop.
    Enrolled,
    /// A section staged to add in this session.
    Staged,
}

/// One section on the merged weekly grid.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduledSection {
    pub course_code: String,
    pub course_name: String,
    pub section_code: String,
    pub instructor: Option<String>,
    pub source: ScheduleSource,
    pub blocks: Vec<TimeBlock>,
}

/// Credit totals for the summary panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CreditSummary {
    pub base: u32,
    pub delta: i64,
    pub ceiling: u32,
    pub projected: i64,
    pub remaining: u32,
}

/// Outcome of a toggle call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    Selected,
    Deselected,
}

/// One student's in-progress selection against their enrolled schedule.
///
/// Owned exclusively by the active editing screen; created empty on mount,
/// cleared on submission or cancel. There is no concurrent writer.
#[derive(Debug, Clone)]
pub struct SelectionSession {
    catalog: Catalog,
    enrollment: Vec<EnrollmentEntry>,
    accountant: CreditAccountant,
    ledger: SelectionLedger,
    revision: u64,
}

impl SelectionSession {
    pub fn new(catalog: Catalog, enrollment: Vec<EnrollmentEntry>, ceiling: u32) -> Self {
        let base = enrollment.iter().map(|e| e.credits).sum();
        Self {
            catalog,
            enrollment,
            accountant: CreditAccountant::new(base, ceiling),
            ledger: SelectionLedger::new(),
            revision: 0,
        }
    }

    /// Monotonically increasing token, bumped on every accepted mutation.
    /// Responses computed against an older revision are stale.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn ledger(&self) -> &SelectionLedger {
        &self.ledger
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn enrollment(&self) -> &[EnrollmentEntry] {
        &self.enrollment
    }

    /// Validates and, on acceptance, stages a section to add.
    pub fn add(&mut self, section_id: Uuid) -> Result<(), RejectReason> {
        let checker = EligibilityChecker::new(&self.catalog, &self.enrollment);
        checker.check_add(&self.ledger, &self.accountant, section_id)?;
        let credits = self
            .catalog
            .course_of(section_id)
            .map(|c| c.credits)
            .unwrap_or(0);
        self.ledger.stage_add(section_id, credits);
        self.revision += 1;
        Ok(())
    }

    /// Validates and, on acceptance, stages an enrollment entry to drop.
    pub fn drop_entry(&mut self, history_id: Uuid) -> Result<(), RejectReason> {
        let checker = EligibilityChecker::new(&self.catalog, &self.enrollment);
        checker.check_drop(history_id)?;
        let credits = self
            .enrollment
            .iter()
            .find(|e| e.history_id == history_id)
            .map(|e| e.credits)
            .unwrap_or(0);
        self.ledger.stage_drop(history_id, credits);
        self.revision += 1;
        Ok(())
    }

    /// Selects the section if unstaged, deselects it if staged. Calling it
    /// twice returns the session to its prior state.
    pub fn toggle_section(&mut self, section_id: Uuid) -> Result<Toggle, RejectReason> {
        if self.ledger.contains_add(section_id) {
            let credits = self
                .catalog
                .course_of(section_id)
                .map(|c| c.credits)
                .unwrap_or(0);
            self.ledger.unstage_add(section_id, credits);
            self.revision += 1;
            Ok(Toggle::Deselected)
        } else {
            self.add(section_id)?;
            Ok(Toggle::Selected)
        }
    }

    /// Stages the entry for drop, or un-stages it when already staged.
    pub fn toggle_entry(&mut self, history_id: Uuid) -> Result<Toggle, RejectReason> {
        if self.ledger.contains_drop(history_id) {
            let credits = self
                .enrollment
                .iter()
                .find(|e| e.history_id == history_id)
                .map(|e| e.credits)
                .unwrap_or(0);
            self.ledger.unstage_drop(history_id, credits);
            self.revision += 1;
            Ok(Toggle::Deselected)
        } else {
            self.drop_entry(history_id)?;
            Ok(Toggle::Selected)
        }
    }

    /// The merged weekly grid: existing non-dropped entries plus staged
    /// adds, each with resolved time blocks.
    pub fn schedule_view(&self) -> Vec<ScheduledSection> {
        let mut view = Vec::new();
        for entry in &self.enrollment {
            if self.ledger.contains_drop(entry.history_id) {
                continue;
            }
            if let (Some(section), Some(course)) = (
                self.catalog.section(entry.section_id),
                self.catalog.course(entry.course_id),
            ) {
                view.push(ScheduledSection {
                    course_code: course.code.clone(),
                    course_name: course.name.clone(),
                    section_code: section.code.clone(),
                    instructor: section.instructor.clone(),
                    source: ScheduleSource::Enrolled,
                    blocks: section.time_blocks.clone(),
                });
            }
        }
        for section_id in self.ledger.adds() {
            if let (Some(section), Some(course)) = (
                self.catalog.section(section_id),
                self.catalog.course_of(section_id),
            ) {
                view.push(ScheduledSection {
                    course_code: course.code.clone(),
                    course_name: course.name.clone(),
                    section_code: section.code.clone(),
                    instructor: section.instructor.clone(),
                    source: ScheduleSource::Staged,
                    blocks: section.time_blocks.clone(),
                });
            }
        }
        view
    }

    pub fn credit_summary(&self) -> CreditSummary {
        let delta = self.ledger.credit_delta();
        CreditSummary {
            base: self.accountant.base(),
            delta,
            ceiling: self.accountant.ceiling(),
            projected: self.accountant.projected(delta),
            remaining: self.accountant.remaining(delta),
        }
    }

    /// Discards the working set.
    pub fn clear(&mut self) {
        self.ledger.clear();
        self.revision += 1;
    }

    /// Packages the ledger into a snapshotted draft, enforcing the
    /// submission-time rules: a non-empty selection, and every
    /// mandatory-repeat course either carried or provably blocked.
    pub fn draft_request(&self) -> Result<RequestDraft, SubmitError> {
        if self.ledger.is_empty() {
            return Err(SubmitError::EmptySelection);
        }

        for course in self.catalog.courses() {
            if course.state != CourseState::MandatoryRepeat {
                continue;
            }
            let carried = self
                .enrollment
                .iter()
                .any(|e| e.course_id == course.id && !self.ledger.contains_drop(e.history_id))
                || self.ledger.adds().any(|id| {
                    self.catalog
                        .section(id)
                        .is_some_and(|s| s.course_id == course.id)
                });
            if carried {
                continue;
            }
            if self.catalog.sections_of(course.id).any(|s| s.has_seats()) {
                return Err(SubmitError::MandatoryRepeatMissing {
                    code: course.code.clone(),
                });
            }
            // No seat anywhere: the student cannot register for anything
            // until one opens.
            return Err(SubmitError::MandatoryRepeatUnseated {
                code: course.code.clone(),
            });
        }

        let mut adds = Vec::new();
        for section_id in self.ledger.adds() {
            if let (Some(section), Some(course)) = (
                self.catalog.section(section_id),
                self.catalog.course_of(section_id),
            ) {
                adds.push(SectionSnapshot {
                    section_id,
                    course_id: course.id,
                    course_code: course.code.clone(),
                    course_name: course.name.clone(),
                    section_code: section.code.clone(),
                    instructor: section.instructor.clone(),
                    credits: course.credits,
                });
            }
        }

        let mut drops = Vec::new();
        for history_id in self.ledger.drops() {
            if let Some(entry) = self.enrollment.iter().find(|e| e.history_id == history_id) {
                let course = self.catalog.course(entry.course_id);
                drops.push(DropSnapshot {
                    history_id,
                    course_id: entry.course_id,
                    section_id: entry.section_id,
                    course_code: course.map(|c| c.code.clone()).unwrap_or_default(),
                    course_name: course.map(|c| c.name.clone()).unwrap_or_default(),
                    credits: entry.credits,
                });
            }
        }

        Ok(RequestDraft { adds, drops })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Course, CourseCategory, Section};
    use crate::schedule::Weekday;
    use chrono::NaiveTime;

    fn t(h: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, 0, 0).unwrap()
    }

    fn course(code: &str, credits: u32, state: CourseState) -> Course {
        Course {
            id: Uuid::new_v4(),
            code: code.into(),
            name: code.into(),
            credits,
            category: CourseCategory::Core,
            state,
            requisites: vec![],
        }
    }

    fn section(course: &Course, seats: u32, blocks: Vec<TimeBlock>) -> Section {
        Section {
            id: Uuid::new_v4(),
            course_id: course.id,
            code: format!("{}-01", course.code),
            instructor: Some("A. Docent".into()),
            seats_available: seats,
            seats_max: 30,
            time_blocks: blocks,
        }
    }

    fn entry(course: &Course, section: &Section) -> EnrollmentEntry {
        EnrollmentEntry {
            history_id: Uuid::new_v4(),
            course_id: course.id,
            section_id: section.id,
            credits: course.credits,
            withdrawable: true,
        }
    }

    /// Enrolled: MATH101 Mon 08:00-10:00. Offered: PHYS101 Mon 10:00-12:00.
    fn session() -> (SelectionSession, Uuid, Uuid) {
        let math = course("MATH101", 3, CourseState::EnrolledCurrent);
        let math_sec = section(
            &math,
            10,
            vec![TimeBlock::new(Weekday::Monday, t(8), t(10), None)],
        );
        let phys = course("PHYS101", 4, CourseState::Active);
        let phys_sec = section(
            &phys,
            10,
            vec![TimeBlock::new(Weekday::Monday, t(10), t(12), None)],
        );
        let enrolled = entry(&math, &math_sec);
        let history_id = enrolled.history_id;
        let phys_sec_id = phys_sec.id;
        let catalog = Catalog::new(vec![math, phys], vec![math_sec, phys_sec]).unwrap();
        (
            SelectionSession::new(catalog, vec![enrolled], 18),
            phys_sec_id,
            history_id,
        )
    }

    #[test]
    fn test_accepted_add_updates_ledger_and_revision() {
        let (mut session, phys_sec, _) = session();
        let before = session.revision();
        session.add(phys_sec).unwrap();
        assert!(session.ledger().contains_add(phys_sec));
        assert_eq!(session.revision(), before + 1);
        assert_eq!(session.credit_summary().projected, 7);
    }

    #[test]
    fn test_rejected_add_leaves_session_untouched() {
        let (mut session, phys_sec, _) = session();
        session.add(phys_sec).unwrap();
        let revision = session.revision();
        let ledger = session.ledger().clone();

        // A second section of the same course is refused.
        let result = session.add(phys_sec);
        assert!(result.is_err());
        assert_eq!(session.revision(), revision);
        assert_eq!(session.ledger(), &ledger);
    }

    #[test]
    fn test_toggle_is_idempotent() {
        let (mut session, phys_sec, history_id) = session();
        let initial = session.ledger().clone();

        assert_eq!(session.toggle_section(phys_sec).unwrap(), Toggle::Selected);
        assert_eq!(
            session.toggle_section(phys_sec).unwrap(),
            Toggle::Deselected
        );
        assert_eq!(session.ledger(), &initial);

        assert_eq!(session.toggle_entry(history_id).unwrap(), Toggle::Selected);
        assert_eq!(
            session.toggle_entry(history_id).unwrap(),
            Toggle::Deselected
        );
        assert_eq!(session.ledger(), &initial);
    }

    #[test]
    fn test_schedule_view_merges_enrolled_and_staged() {
        let (mut session, phys_sec, history_id) = session();
        session.add(phys_sec).unwrap();

        let view = session.schedule_view();
        assert_eq!(view.len(), 2);
        assert!(view
            .iter()
            .any(|s| s.course_code == "MATH101" && s.source == ScheduleSource::Enrolled));
        assert!(view
            .iter()
            .any(|s| s.course_code == "PHYS101" && s.source == ScheduleSource::Staged));

        // No two blocks on the accepted schedule overlap.
        let blocks: Vec<_> = view.iter().flat_map(|s| s.blocks.clone()).collect();
        for (i, a) in blocks.iter().enumerate() {
            for b in &blocks[i + 1..] {
                assert!(!a.conflicts_with(b));
            }
        }

        session.toggle_entry(history_id).unwrap();
        let view = session.schedule_view();
        assert_eq!(view.len(), 1);
        assert_eq!(view[0].course_code, "PHYS101");
    }

    #[test]
    fn test_empty_draft_rejected() {
        let (session, _, _) = session();
        assert!(matches!(
            session.draft_request(),
            Err(SubmitError::EmptySelection)
        ));
    }

    #[test]
    fn test_draft_snapshots_denormalized_data() {
        let (mut session, phys_sec, history_id) = session();
        session.add(phys_sec).unwrap();
        session.drop_entry(history_id).unwrap();

        let draft = session.draft_request().unwrap();
        assert_eq!(draft.adds.len(), 1);
        assert_eq!(draft.adds[0].course_code, "PHYS101");
        assert_eq!(draft.adds[0].credits, 4);
        assert_eq!(draft.drops.len(), 1);
        assert_eq!(draft.drops[0].course_code, "MATH101");
        assert_eq!(draft.drops[0].credits, 3);
    }

    #[test]
    fn test_mandatory_repeat_must_be_carried() {
        let repeat = course("PROG200", 3, CourseState::MandatoryRepeat);
        let repeat_sec = section(&repeat, 5, vec![]);
        let other = course("ART110", 2, CourseState::Active);
        let other_sec = section(&other, 5, vec![]);
        let repeat_sec_id = repeat_sec.id;
        let other_sec_id = other_sec.id;
        let catalog =
            Catalog::new(vec![repeat, other], vec![repeat_sec, other_sec]).unwrap();
        let mut session = SelectionSession::new(catalog, vec![], 18);

        session.add(other_sec_id).unwrap();
        assert!(matches!(
            session.draft_request(),
            Err(SubmitError::MandatoryRepeatMissing { .. })
        ));

        session.add(repeat_sec_id).unwrap();
        assert!(session.draft_request().is_ok());
    }

    #[test]
    fn test_mandatory_repeat_without_seats_blocks_submission() {
        let repeat = course("PROG200", 3, CourseState::MandatoryRepeat);
        let full_sec = section(&repeat, 0, vec![]);
        let other = course("ART110", 2, CourseState::Active);
        let other_sec = section(&other, 5, vec![]);
        let other_sec_id = other_sec.id;
        let catalog = Catalog::new(vec![repeat, other], vec![full_sec, other_sec]).unwrap();
        let mut session = SelectionSession::new(catalog, vec![], 18);

        session.add(other_sec_id).unwrap();
        assert!(matches!(
            session.draft_request(),
            Err(SubmitError::MandatoryRepeatUnseated { .. })
        ));
    }

    #[test]
    fn test_clear_discards_working_set() {
        let (mut session, phys_sec, history_id) = session();
        session.add(phys_sec).unwrap();
        session.drop_entry(history_id).unwrap();
        session.clear();
        assert!(session.ledger().is_empty());
        assert_eq!(session.credit_summary().delta, 0);
    }

    #[test]
    fn test_credit_ceiling_invariant_holds_for_accepted_states() {
        let (mut session, phys_sec, _) = session();
        session.add(phys_sec).unwrap();
        let summary = session.credit_summary();
        assert!(summary.projected <= i64::from(summary.ceiling));
    }
}
