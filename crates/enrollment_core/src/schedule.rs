//! crates/enrollment_core/src/schedule.rs
//!
//! The weekly time model: days of the week and recurring time blocks.
//! A block is a half-open interval on one day; two blocks conflict only
//! when they share the day and their intervals overlap.

use chrono::NaiveTime;

/// A day of the week for a recurring section meeting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Weekday {
    pub fn as_str(&self) -> &'static str {
        match self {
            Weekday::Monday => "monday",
            Weekday::Tuesday => "tuesday",
            Weekday::Wednesday => "wednesday",
            Weekday::Thursday => "thursday",
            Weekday::Friday => "friday",
            Weekday::Saturday => "saturday",
            Weekday::Sunday => "sunday",
        }
    }

    /// Parses the lowercase day name used in storage and on the wire.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "monday" => Some(Weekday::Monday),
            "tuesday" => Some(Weekday::Tuesday),
            "wednesday" => Some(Weekday::Wednesday),
            "thursday" => Some(Weekday::Thursday),
            "friday" => Some(Weekday::Friday),
            "saturday" => Some(Weekday::Saturday),
            "sunday" => Some(Weekday::Sunday),
            _ => None,
        }
    }
}

/// A weekly recurring meeting interval of a section.
///
/// `start < end` is a construction precondition: collaborator data is
/// validated once at the boundary, so a malformed block reaching this
/// constructor is a programmer error and fails fast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeBlock {
    pub day: Weekday,
    pub start: NaiveTime,
    pub end: NaiveTime,
    pub room: Option<String>,
}

impl TimeBlock {
    pub fn new(day: Weekday, start: NaiveTime, end: NaiveTime, room: Option<String>) -> Self {
        assert!(start < end, "time block must start before it ends");
        Self { day, start, end, room }
    }

    /// Half-open overlap test: blocks that touch end-to-start do not
    /// conflict.
    pub fn conflicts_with(&self, other: &TimeBlock) -> bool {
        self.day == other.day && self.start < other.end && other.start < self.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn block(day: Weekday, start: (u32, u32), end: (u32, u32)) -> TimeBlock {
        TimeBlock::new(day, t(start.0, start.1), t(end.0, end.1), None)
    }

    #[test]
    fn test_overlapping_blocks_conflict() {
        let a = block(Weekday::Monday, (8, 0), (10, 0));
        let b = block(Weekday::Monday, (9, 0), (11, 0));
        assert!(a.conflicts_with(&b));
        assert!(b.conflicts_with(&a));
    }

    #[test]
    fn test_back_to_back_blocks_do_not_conflict() {
        let a = block(Weekday::Monday, (8, 0), (10, 0));
        let b = block(Weekday::Monday, (10, 0), (12, 0));
        assert!(!a.conflicts_with(&b));
        assert!(!b.conflicts_with(&a));
    }

    #[test]
    fn test_different_days_never_conflict() {
        let a = block(Weekday::Monday, (8, 0), (10, 0));
        let b = block(Weekday::Tuesday, (8, 0), (10, 0));
        assert!(!a.conflicts_with(&b));
    }

    #[test]
    fn test_contained_block_conflicts() {
        let a = block(Weekday::Friday, (8, 0), (12, 0));
        let b = block(Weekday::Friday, (9, 0), (10, 0));
        assert!(a.conflicts_with(&b));
        assert!(b.conflicts_with(&a));
    }

    #[test]
    #[should_panic]
    fn test_inverted_block_panics() {
        block(Weekday::Monday, (10, 0), (8, 0));
    }

    #[test]
    fn test_weekday_round_trip() {
        for day in [
            Weekday::Monday,
            Weekday::Tuesday,
            Weekday::Wednesday,
            Weekday::Thursday,
            Weekday::Friday,
            Weekday::Saturday,
            Weekday::Sunday,
        ] {
            assert_eq!(Weekday::parse(day.as_str()), Some(day));
        }
        assert_eq!(Weekday::parse("MONDAY"), None);
    }
}
