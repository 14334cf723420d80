//! crates/enrollment_core/src/checker.rs
//!
//! Single authority for deciding whether a proposed add or drop is legal
//! against the current ledger and the student's existing enrollment. The
//! checker only decides; it never mutates the ledger.

use uuid::Uuid;

use crate::catalog::Catalog;
use crate::credits::CreditAccountant;
use crate::domain::{CourseState, EnrollmentEntry, RequisiteKind, Section};
use crate::ledger::SelectionLedger;

/// Why a proposed add or drop was refused. Recoverable: surfaced to the
/// student as an inline reason, with the ledger left unchanged.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RejectReason {
    #[error("section is not part of the current offering")]
    UnknownSection,
    #[error("enrollment entry not found for the active term")]
    UnknownEntry,
    #[error("course {0} is already passed and cannot be selected again")]
    CoursePassed(String),
    #[error("already enrolled in course {0}")]
    AlreadyEnrolled(String),
    #[error("only one section per course can be selected")]
    DuplicateCourseSelection,
    #[error("section has no seats available")]
    SectionFull,
    #[error("requisite course {0} is not satisfied")]
    RequisiteUnsatisfied(String),
    #[error("schedule conflict with an enrolled or selected section")]
    TimeConflict,
    #[error("selection would exceed the credit limit of {0}")]
    CreditCeilingExceeded(u32),
    #[error("entry cannot be withdrawn")]
    NotWithdrawable,
    #[error("course {0} is under mandatory repeat and cannot be dropped")]
    MandatoryRepeat(String),
}

impl RejectReason {
    /// Stable machine-readable code for the wire `Decision` shape.
    pub fn code(&self) -> &'static str {
        match self {
            RejectReason::UnknownSection => "unknown_section",
            RejectReason::UnknownEntry => "unknown_entry",
            RejectReason::CoursePassed(_) => "course_passed",
            RejectReason::AlreadyEnrolled(_) => "already_enrolled",
            RejectReason::DuplicateCourseSelection => "duplicate_course_selection",
            RejectReason::SectionFull => "section_full",
            RejectReason::RequisiteUnsatisfied(_) => "requisite_unsatisfied",
            RejectReason::TimeConflict => "time_conflict",
            RejectReason::CreditCeilingExceeded(_) => "credit_ceiling_exceeded",
            RejectReason::NotWithdrawable => "not_withdrawable",
            RejectReason::MandatoryRepeat(_) => "mandatory_repeat",
        }
    }
}

/// Validates proposed mutations against catalog, enrollment and ledger.
pub struct EligibilityChecker<'a> {
    catalog: &'a Catalog,
    enrollment: &'a [EnrollmentEntry],
}

impl<'a> EligibilityChecker<'a> {
    pub fn new(catalog: &'a Catalog, enrollment: &'a [EnrollmentEntry]) -> Self {
        Self { catalog, enrollment }
    }

    /// Decides whether `section_id` may be staged for addition. Checks run
    /// in the order the rules are announced to students: course state,
    /// duplicate course, seats, requisites, schedule, credits.
    pub fn check_add(
        &self,
        ledger: &SelectionLedger,
        accountant: &CreditAccountant,
        section_id: Uuid,
    ) -> Result<(), RejectReason> {
        let section = self
            .catalog
            .section(section_id)
            .ok_or(RejectReason::UnknownSection)?;
        let course = self
            .catalog
            .course(section.course_id)
            .ok_or(RejectReason::UnknownSection)?;

        if course.state == CourseState::Passed {
            return Err(RejectReason::CoursePassed(course.code.clone()));
        }

        if self
            .active_entries(ledger)
            .any(|entry| entry.course_id == course.id)
        {
            return Err(RejectReason::AlreadyEnrolled(course.code.clone()));
        }

        // One section per course, counting the section itself: a repeated
        // pick is refused rather than silently replaced.
        let same_course_staged = ledger.adds().any(|staged| {
            self.catalog
                .section(staged)
                .is_some_and(|s| s.course_id == course.id)
        });
        if same_course_staged {
            return Err(RejectReason::DuplicateCourseSelection);
        }

        if !section.has_seats() {
            return Err(RejectReason::SectionFull);
        }

        self.check_requisites(ledger, course.id)?;

        if self.conflicts_with_schedule(ledger, section) {
            return Err(RejectReason::TimeConflict);
        }

        if accountant.would_exceed(ledger.credit_delta() + i64::from(course.credits)) {
            return Err(RejectReason::CreditCeilingExceeded(accountant.ceiling()));
        }

        Ok(())
    }

    /// Decides whether the enrollment entry may be staged for withdrawal.
    pub fn check_drop(&self, history_id: Uuid) -> Result<(), RejectReason> {
        let entry = self
            .enrollment
            .iter()
            .find(|e| e.history_id == history_id)
            .ok_or(RejectReason::UnknownEntry)?;

        if !entry.withdrawable {
            return Err(RejectReason::NotWithdrawable);
        }

        if let Some(course) = self.catalog.course(entry.course_id) {
            if course.state == CourseState::MandatoryRepeat {
                return Err(RejectReason::MandatoryRepeat(course.code.clone()));
            }
        }

        Ok(())
    }

    /// Requisite rule: prerequisites need their supplied satisfied flag;
    /// corequisites are also met when their course is enrolled (and not
    /// being dropped) or part of the same selection.
    fn check_requisites(
        &self,
        ledger: &SelectionLedger,
        course_id: Uuid,
    ) -> Result<(), RejectReason> {
        let course = match self.catalog.course(course_id) {
            Some(course) => course,
            None => return Ok(()),
        };

        for requisite in &course.requisites {
            if requisite.satisfied {
                continue;
            }
            let display = self
                .catalog
                .course(requisite.course_id)
                .map(|c| c.code.clone())
                .unwrap_or_else(|| requisite.course_id.to_string());
            match requisite.kind {
                RequisiteKind::Prerequisite => {
                    return Err(RejectReason::RequisiteUnsatisfied(display));
                }
                RequisiteKind::Corequisite => {
                    let carried = self
                        .active_entries(ledger)
                        .any(|entry| entry.course_id == requisite.course_id)
                        || ledger.adds().any(|staged| {
                            self.catalog
                                .section(staged)
                                .is_some_and(|s| s.course_id == requisite.course_id)
                        });
                    if !carried {
                        return Err(RejectReason::RequisiteUnsatisfied(display));
                    }
                }
            }
        }

        Ok(())
    }

    fn conflicts_with_schedule(&self, ledger: &SelectionLedger, candidate: &Section) -> bool {
        // Existing entries still on the schedule (not staged for drop).
        for entry in self.active_entries(ledger) {
            if let Some(section) = self.catalog.section(entry.section_id) {
                if Self::sections_conflict(candidate, section) {
                    return true;
                }
            }
        }
        // Sections already staged to add.
        for staged in ledger.adds() {
            if let Some(section) = self.catalog.section(staged) {
                if Self::sections_conflict(candidate, section) {
                    return true;
                }
            }
        }
        false
    }

    fn sections_conflict(a: &Section, b: &Section) -> bool {
        a.time_blocks
            .iter()
            .any(|block| b.time_blocks.iter().any(|other| block.conflicts_with(other)))
    }

    /// Enrollment entries not currently staged for drop.
    fn active_entries<'b>(
        &'b self,
        ledger: &'b SelectionLedger,
    ) -> impl Iterator<Item = &'b EnrollmentEntry> + 'b {
        self.enrollment
            .iter()
            .filter(move |entry| !ledger.contains_drop(entry.history_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Course, CourseCategory, Requisite};
    use crate::schedule::{TimeBlock, Weekday};
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
            instructor: None,
            seats_available: seats,
            seats_max: seats.max(30),
            time_blocks: blocks,
        }
    }

    fn entry(course: &Course, section: &Section, withdrawable: bool) -> EnrollmentEntry {
        EnrollmentEntry {
            history_id: Uuid::new_v4(),
            course_id: course.id,
            section_id: section.id,
            credits: course.credits,
            withdrawable,
        }
    }

    struct Fixture {
        catalog: Catalog,
        enrollment: Vec<EnrollmentEntry>,
        accountant: CreditAccountant,
    }

    impl Fixture {
        fn checker(&self) -> EligibilityChecker<'_> {
            EligibilityChecker::new(&self.catalog, &self.enrollment)
        }
    }

    /// MATH101 enrolled Mon 08:00-10:00 (3 credits), ceiling 18.
    fn base_fixture() -> (Fixture, Course, Section) {
        let math = course("MATH101", 3, CourseState::EnrolledCurrent);
        let math_sec = section(
            &math,
            10,
            vec![TimeBlock::new(Weekday::Monday, t(8), t(10), None)],
        );
        let enrolled = entry(&math, &math_sec, true);
        let fixture = Fixture {
            catalog: Catalog::new(vec![math.clone()], vec![math_sec.clone()]).unwrap(),
            enrollment: vec![enrolled],
            accountant: CreditAccountant::new(3, 18),
        };
        (fixture, math, math_sec)
    }

    fn with_extra(fixture: Fixture, courses: Vec<Course>, sections: Vec<Section>) -> Fixture {
        let mut all_courses: Vec<Course> = fixture.catalog.courses().cloned().collect();
        let mut all_sections: Vec<Section> = fixture
            .enrollment
            .iter()
            .filter_map(|e| fixture.catalog.section(e.section_id).cloned())
            .collect();
        all_courses.extend(courses);
        all_sections.extend(sections);
        Fixture {
            catalog: Catalog::new(all_courses, all_sections).unwrap(),
            enrollment: fixture.enrollment,
            accountant: fixture.accountant,
        }
    }

    #[test]
    fn test_overlap_with_enrolled_section_rejected() {
        let (fixture, _, _) = base_fixture();
        let phys = course("PHYS101", 4, CourseState::Active);
        let overlapping = section(
            &phys,
            10,
            vec![TimeBlock::new(Weekday::Monday, t(9), t(11), None)],
        );
        let fixture = with_extra(fixture, vec![phys], vec![overlapping.clone()]);

        let ledger = SelectionLedger::new();
        let result = fixture
            .checker()
            .check_add(&ledger, &fixture.accountant, overlapping.id);
        assert_eq!(result, Err(RejectReason::TimeConflict));
    }

    #[test]
    fn test_back_to_back_section_accepted() {
        let (fixture, _, _) = base_fixture();
        let phys = course("PHYS101", 4, CourseState::Active);
        let adjacent = section(
            &phys,
            10,
            vec![TimeBlock::new(Weekday::Monday, t(10), t(12), None)],
        );
        let fixture = with_extra(fixture, vec![phys], vec![adjacent.clone()]);

        let ledger = SelectionLedger::new();
        let result = fixture
            .checker()
            .check_add(&ledger, &fixture.accountant, adjacent.id);
        assert_eq!(result, Ok(()));
    }

    #[test]
    fn test_passed_course_always_rejected() {
        let (fixture, _, _) = base_fixture();
        let done = course("HIST100", 2, CourseState::Passed);
        let open_section = section(&done, 25, vec![]);
        let fixture = with_extra(fixture, vec![done], vec![open_section.clone()]);

        let ledger = SelectionLedger::new();
        let result = fixture
            .checker()
            .check_add(&ledger, &fixture.accountant, open_section.id);
        assert!(matches!(result, Err(RejectReason::CoursePassed(_))));
    }

    #[test]
    fn test_full_section_rejected() {
        let (fixture, _, _) = base_fixture();
        let phys = course("PHYS101", 4, CourseState::Active);
        let full = section(&phys, 0, vec![]);
        let fixture = with_extra(fixture, vec![phys], vec![full.clone()]);

        let ledger = SelectionLedger::new();
        let result = fixture
            .checker()
            .check_add(&ledger, &fixture.accountant, full.id);
        assert_eq!(result, Err(RejectReason::SectionFull));
    }

    #[test]
    fn test_second_section_of_same_course_rejected() {
        let (fixture, _, _) = base_fixture();
        let phys = course("PHYS101", 4, CourseState::Active);
        let first = section(&phys, 10, vec![]);
        let second = section(&phys, 10, vec![]);
        let fixture = with_extra(fixture, vec![phys.clone()], vec![first.clone(), second.clone()]);

        let mut ledger = SelectionLedger::new();
        ledger.stage_add(first.id, phys.credits);
        let result = fixture
            .checker()
            .check_add(&ledger, &fixture.accountant, second.id);
        assert_eq!(result, Err(RejectReason::DuplicateCourseSelection));
    }

    #[test]
    fn test_enrolled_course_cannot_be_added_again() {
        let (fixture, math, _) = base_fixture();
        let other_sec = section(&math, 10, vec![]);
        let fixture = with_extra(fixture, vec![], vec![other_sec.clone()]);

        let ledger = SelectionLedger::new();
        let result = fixture
            .checker()
            .check_add(&ledger, &fixture.accountant, other_sec.id);
        assert!(matches!(result, Err(RejectReason::AlreadyEnrolled(_))));
    }

    #[test]
    fn test_credit_ceiling_enforced_before_staging() {
        // Ceiling 18, base 16: 4 credits refused, 2 credits accepted.
        let math = course("MATH101", 16, CourseState::EnrolledCurrent);
        let math_sec = section(&math, 10, vec![]);
        let enrolled = entry(&math, &math_sec, true);
        let heavy = course("PHYS301", 4, CourseState::Active);
        let heavy_sec = section(&heavy, 10, vec![]);
        let light = course("ART110", 2, CourseState::Active);
        let light_sec = section(&light, 10, vec![]);
        let fixture = Fixture {
            catalog: Catalog::new(
                vec![math, heavy, light],
                vec![math_sec, heavy_sec.clone(), light_sec.clone()],
            )
            .unwrap(),
            enrollment: vec![enrolled],
            accountant: CreditAccountant::new(16, 18),
        };

        let ledger = SelectionLedger::new();
        assert_eq!(
            fixture
                .checker()
                .check_add(&ledger, &fixture.accountant, heavy_sec.id),
            Err(RejectReason::CreditCeilingExceeded(18))
        );
        assert_eq!(
            fixture
                .checker()
                .check_add(&ledger, &fixture.accountant, light_sec.id),
            Ok(())
        );
    }

    #[test]
    fn test_dropping_an_entry_frees_credits_and_schedule() {
        let (fixture, math, _) = base_fixture();
        let phys = course("PHYS101", 4, CourseState::Active);
        let clashing = section(
            &phys,
            10,
            vec![TimeBlock::new(Weekday::Monday, t(8), t(10), None)],
        );
        let fixture = with_extra(fixture, vec![phys], vec![clashing.clone()]);

        let mut ledger = SelectionLedger::new();
        let history_id = fixture.enrollment[0].history_id;
        ledger.stage_drop(history_id, math.credits);

        let result = fixture
            .checker()
            .check_add(&ledger, &fixture.accountant, clashing.id);
        assert_eq!(result, Ok(()));
    }

    #[test]
    fn test_unsatisfied_prerequisite_rejected() {
        let (fixture, _, _) = base_fixture();
        let algebra = course("ALG200", 3, CourseState::Active);
        let mut calc = course("CALC300", 3, CourseState::Active);
        calc.requisites.push(Requisite {
            course_id: algebra.id,
            kind: RequisiteKind::Prerequisite,
            satisfied: false,
        });
        let calc_sec = section(&calc, 10, vec![]);
        let fixture = with_extra(fixture, vec![algebra, calc], vec![calc_sec.clone()]);

        let ledger = SelectionLedger::new();
        let result = fixture
            .checker()
            .check_add(&ledger, &fixture.accountant, calc_sec.id);
        assert!(matches!(result, Err(RejectReason::RequisiteUnsatisfied(_))));
    }

    #[test]
    fn test_corequisite_met_by_co_selection() {
        let (fixture, _, _) = base_fixture();
        let lab = course("CHEM110L", 1, CourseState::Active);
        let lab_sec = section(&lab, 10, vec![]);
        let mut chem = course("CHEM110", 3, CourseState::Active);
        chem.requisites.push(Requisite {
            course_id: lab.id,
            kind: RequisiteKind::Corequisite,
            satisfied: false,
        });
        let chem_sec = section(&chem, 10, vec![]);
        let fixture = with_extra(
            fixture,
            vec![lab.clone(), chem],
            vec![lab_sec.clone(), chem_sec.clone()],
        );

        let mut ledger = SelectionLedger::new();
        assert!(matches!(
            fixture
                .checker()
                .check_add(&ledger, &fixture.accountant, chem_sec.id),
            Err(RejectReason::RequisiteUnsatisfied(_))
        ));

        ledger.stage_add(lab_sec.id, lab.credits);
        assert_eq!(
            fixture
                .checker()
                .check_add(&ledger, &fixture.accountant, chem_sec.id),
            Ok(())
        );
    }

    #[test]
    fn test_drop_rules() {
        let math = course("MATH101", 3, CourseState::EnrolledCurrent);
        let math_sec = section(&math, 10, vec![]);
        let locked = course("PROG200", 3, CourseState::MandatoryRepeat);
        let locked_sec = section(&locked, 10, vec![]);
        let frozen = course("ECON101", 3, CourseState::EnrolledCurrent);
        let frozen_sec = section(&frozen, 10, vec![]);

        let enrollment = vec![
            entry(&math, &math_sec, true),
            entry(&locked, &locked_sec, true),
            entry(&frozen, &frozen_sec, false),
        ];
        let catalog = Catalog::new(
            vec![math, locked, frozen],
            vec![math_sec, locked_sec, frozen_sec],
        )
        .unwrap();
        let checker = EligibilityChecker::new(&catalog, &enrollment);

        assert_eq!(checker.check_drop(enrollment[0].history_id), Ok(()));
        assert!(matches!(
            checker.check_drop(enrollment[1].history_id),
            Err(RejectReason::MandatoryRepeat(_))
        ));
        assert_eq!(
            checker.check_drop(enrollment[2].history_id),
            Err(RejectReason::NotWithdrawable)
        );
        assert_eq!(
            checker.check_drop(Uuid::new_v4()),
            Err(RejectReason::UnknownEntry)
        );
    }
}
