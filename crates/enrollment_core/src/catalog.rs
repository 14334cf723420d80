//! crates/enrollment_core/src/catalog.rs
//!
//! Read-only directory of the courses and sections offered to one student.
//! Collaborator data is validated exactly once here, when the catalog is
//! built; the engine never re-checks shapes downstream.

use std::collections::HashMap;

use uuid::Uuid;

use crate::domain::{Course, Section};

/// A structural problem in collaborator-supplied catalog data.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("duplicate course id {0}")]
    DuplicateCourse(Uuid),
    #[error("duplicate section id {0}")]
    DuplicateSection(Uuid),
    #[error("section {section} references unknown course {course}")]
    UnknownCourse { section: Uuid, course: Uuid },
    #[error("course {0} has zero credits")]
    ZeroCredits(Uuid),
    #[error("section {0} has more seats available than capacity")]
    SeatCountInvalid(Uuid),
}

/// Indexed, immutable view of the offered courses and their sections.
#[derive(Debug, Clone)]
pub struct Catalog {
    courses: HashMap<Uuid, Course>,
    sections: HashMap<Uuid, Section>,
    sections_by_course: HashMap<Uuid, Vec<Uuid>>,
}

impl Catalog {
    pub fn new(courses: Vec<Course>, sections: Vec<Section>) -> Result<Self, CatalogError> {
        let mut course_map = HashMap::with_capacity(courses.len());
        for course in courses {
            if course.credits == 0 {
                return Err(CatalogError::ZeroCredits(course.id));
            }
            if course_map.contains_key(&course.id) {
                return Err(CatalogError::DuplicateCourse(course.id));
            }
            course_map.insert(course.id, course);
        }

        let mut section_map = HashMap::with_capacity(sections.len());
        let mut sections_by_course: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
        for section in sections {
            if !course_map.contains_key(&section.course_id) {
                return Err(CatalogError::UnknownCourse {
                    section: section.id,
                    course: section.course_id,
                });
            }
            if section.seats_available > section.seats_max {
                return Err(CatalogError::SeatCountInvalid(section.id));
            }
            if section_map.contains_key(&section.id) {
                return Err(CatalogError::DuplicateSection(section.id));
            }
            sections_by_course
                .entry(section.course_id)
                .or_default()
                .push(section.id);
            section_map.insert(section.id, section);
        }

        Ok(Self {
            courses: course_map,
            sections: section_map,
            sections_by_course,
        })
    }

    pub fn course(&self, course_id: Uuid) -> Option<&Course> {
        self.courses.get(&course_id)
    }

    pub fn section(&self, section_id: Uuid) -> Option<&Section> {
        self.sections.get(&section_id)
    }

    /// The course a section belongs to.
    pub fn course_of(&self, section_id: Uuid) -> Option<&Course> {
        self.section(section_id)
            .and_then(|s| self.course(s.course_id))
    }

    pub fn sections_of(&self, course_id: Uuid) -> impl Iterator<Item = &Section> {
        self.sections_by_course
            .get(&course_id)
            .into_iter()
            .flatten()
            .filter_map(|id| self.sections.get(id))
    }

    pub fn courses(&self) -> impl Iterator<Item = &Course> {
        self.courses.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CourseCategory, CourseState};

    fn course(id: Uuid, credits: u32) -> Course {
        Course {
            id,
            code: "C".into(),
            name: "Course".into(),
            credits,
            category: CourseCategory::Core,
            state: CourseState::Active,
            requisites: vec![],
        }
    }

    fn section(id: Uuid, course_id: Uuid, available: u32, max: u32) -> Section {
        Section {
            id,
            course_id,
            code: "S".into(),
            instructor: None,
            seats_available: available,
            seats_max: max,
            time_blocks: vec![],
        }
    }

    #[test]
    fn test_catalog_indexes_sections_by_course() {
        let c = Uuid::new_v4();
        let s1 = Uuid::new_v4();
        let s2 = Uuid::new_v4();
        let catalog = Catalog::new(
            vec![course(c, 3)],
            vec![section(s1, c, 5, 30), section(s2, c, 0, 30)],
        )
        .unwrap();

        assert_eq!(catalog.sections_of(c).count(), 2);
        assert_eq!(catalog.course_of(s1).unwrap().id, c);
        assert!(catalog.section(Uuid::new_v4()).is_none());
    }

    #[test]
    fn test_orphan_section_rejected() {
        let result = Catalog::new(vec![], vec![section(Uuid::new_v4(), Uuid::new_v4(), 1, 1)]);
        assert!(matches!(result, Err(CatalogError::UnknownCourse { .. })));
    }

    #[test]
    fn test_zero_credit_course_rejected() {
        let result = Catalog::new(vec![course(Uuid::new_v4(), 0)], vec![]);
        assert!(matches!(result, Err(CatalogError::ZeroCredits(_))));
    }

    #[test]
    fn test_overfull_section_rejected() {
        let c = Uuid::new_v4();
        let result = Catalog::new(vec![course(c, 3)], vec![section(Uuid::new_v4(), c, 31, 30)]);
        assert!(matches!(result, Err(CatalogError::SeatCountInvalid(_))));
    }
}
