pub mod catalog;
pub mod checker;
pub mod credits;
pub mod domain;
pub mod ledger;
pub mod ports;
pub mod schedule;
pub mod session;
pub mod workflow;

pub use catalog::{Catalog, CatalogError};
pub use checker::{EligibilityChecker, RejectReason};
pub use credits::CreditAccountant;
pub use domain::{
    Course, CourseCategory, CourseState, EnrollmentEntry, Requisite, RequisiteKind, Section,
};
pub use ledger::SelectionLedger;
pub use ports::{CatalogSource, EnrollmentStore, Gates, PortError, PortResult};
pub use schedule::{TimeBlock, Weekday};
pub use session::{
    CreditSummary, ScheduleSource, ScheduledSection, SelectionSession, Toggle,
};
pub use workflow::{
    DropSnapshot, ModificationRequest, RequestDraft, RequestState, ResolveError, ReviewDecision,
    SectionSnapshot, SubmitError,
};
