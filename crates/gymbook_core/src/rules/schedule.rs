//! Weekly schedule overlap checks.
//!
//! Windows are half-open `[start, end)` on a single day, so a class ending at
//! 08:00 does not collide with one starting at 08:00.

use chrono::{NaiveTime, Timelike};
use std::fmt::{Display, Formatter};

/// Integrity error for persisted schedule values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScheduleError {
    #[error("malformed time of day `{0}`; expected HH:MM or HH:MM:SS")]
    MalformedTime(String),
    #[error("schedule window `{start}`-`{end}` is empty or inverted")]
    EmptyWindow { start: String, end: String },
    #[error("day of week {0} is outside 0..=6")]
    DayOutOfRange(u8),
}

/// One weekly recurring time window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeeklyWindow {
    day_of_week: u8,
    start: NaiveTime,
    end: NaiveTime,
}

impl WeeklyWindow {
    /// Parses and validates a `(day, start, end)` triple.
    pub fn parse(day_of_week: u8, start: &str, end: &str) -> Result<Self, ScheduleError> {
        if day_of_week > 6 {
            return Err(ScheduleError::DayOutOfRange(day_of_week));
        }
        let start_time = parse_time_of_day(start)?;
        let end_time = parse_time_of_day(end)?;
        if start_time >= end_time {
            return Err(ScheduleError::EmptyWindow {
                start: start.to_string(),
                end: end.to_string(),
            });
        }
        Ok(Self {
            day_of_week,
            start: start_time,
            end: end_time,
        })
    }

    pub fn day_of_week(&self) -> u8 {
        self.day_of_week
    }

    /// Same day and `start_a < end_b && start_b < end_a`.
    pub fn overlaps(&self, other: &WeeklyWindow) -> bool {
        self.day_of_week == other.day_of_week && self.start < other.end && other.start < self.end
    }
}

impl Display for WeeklyWindow {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "day={} {}-{}",
            self.day_of_week,
            self.start.format("%H:%M"),
            self.end.format("%H:%M")
        )
    }
}

/// Parses a zero-padded wall-clock `HH:MM` (or `HH:MM:SS`) value.
///
/// Persisted times are compared lexically by the catalog queries, so only the
/// exact fixed-width shape is accepted.
pub fn parse_time_of_day(value: &str) -> Result<NaiveTime, ScheduleError> {
    let malformed = || ScheduleError::MalformedTime(value.to_string());
    let format = match value.len() {
        5 => "%H:%M",
        8 => "%H:%M:%S",
        _ => return Err(malformed()),
    };
    let well_shaped = value.bytes().enumerate().all(|(index, byte)| {
        if index % 3 == 2 {
            byte == b':'
        } else {
            byte.is_ascii_digit()
        }
    });
    if !well_shaped {
        return Err(malformed());
    }

    let time = NaiveTime::parse_from_str(value, format).map_err(|_| malformed())?;
    // chrono represents a leap second as nanosecond >= 1e9.
    if time.nanosecond() >= 1_000_000_000 {
        return Err(malformed());
    }
    Ok(time)
}

/// Decides overlap between two raw weekly windows.
///
/// Different days never overlap and are not parsed; same-day values must be
/// well formed.
pub fn schedules_overlap(
    day_a: u8,
    start_a: &str,
    end_a: &str,
    day_b: u8,
    start_b: &str,
    end_b: &str,
) -> Result<bool, ScheduleError> {
    if day_a != day_b {
        return Ok(false);
    }
    let window_a = WeeklyWindow::parse(day_a, start_a, end_a)?;
    let window_b = WeeklyWindow::parse(day_b, start_b, end_b)?;
    Ok(window_a.overlaps(&window_b))
}

#[cfg(test)]
mod tests {
    use super::{parse_time_of_day, schedules_overlap, ScheduleError, WeeklyWindow};
    use rstest::rstest;

    #[rstest]
    #[case("07:00", "08:00", "07:30", "08:30", true)]
    #[case("07:00", "08:00", "08:00", "09:00", false)]
    #[case("08:00", "09:00", "07:00", "08:00", false)]
    #[case("07:00", "09:00", "07:30", "08:00", true)]
    #[case("07:30", "08:00", "07:00", "09:00", true)]
    #[case("07:00", "08:00", "07:00", "08:00", true)]
    #[case("07:00", "08:00", "10:00", "11:00", false)]
    fn same_day_overlap_is_half_open(
        #[case] start_a: &str,
        #[case] end_a: &str,
        #[case] start_b: &str,
        #[case] end_b: &str,
        #[case] expected: bool,
    ) {
        let overlap = schedules_overlap(1, start_a, end_a, 1, start_b, end_b).unwrap();
        assert_eq!(overlap, expected);
    }

    #[test]
    fn different_days_never_overlap() {
        assert!(!schedules_overlap(1, "07:00", "08:00", 2, "07:00", "08:00").unwrap());
    }

    #[test]
    fn different_days_short_circuit_before_parsing() {
        assert_eq!(
            schedules_overlap(1, "garbage", "08:00", 2, "07:00", "08:00"),
            Ok(false)
        );
    }

    #[rstest]
    #[case("")]
    #[case("7.30")]
    #[case("25:00")]
    #[case("ab:cd")]
    #[case("07:60")]
    #[case("7:5")]
    #[case("7:30")]
    #[case(" 07:30 ")]
    #[case("07:30:60")]
    #[case("07:30:")]
    #[case("07-30")]
    fn malformed_times_fail_fast(#[case] value: &str) {
        let err = schedules_overlap(3, value, "23:00", 3, "07:00", "08:00").unwrap_err();
        assert_eq!(err, ScheduleError::MalformedTime(value.to_string()));
    }

    #[test]
    fn seconds_are_accepted() {
        let time = parse_time_of_day("07:30:00").unwrap();
        assert_eq!(time, parse_time_of_day("07:30").unwrap());
    }

    #[test]
    fn inverted_or_empty_window_is_rejected() {
        assert!(matches!(
            WeeklyWindow::parse(0, "09:00", "09:00"),
            Err(ScheduleError::EmptyWindow { .. })
        ));
        assert!(matches!(
            WeeklyWindow::parse(0, "10:00", "09:00"),
            Err(ScheduleError::EmptyWindow { .. })
        ));
    }

    #[test]
    fn day_out_of_range_is_rejected() {
        assert_eq!(
            WeeklyWindow::parse(7, "07:00", "08:00"),
            Err(ScheduleError::DayOutOfRange(7))
        );
    }

    #[test]
    fn window_display_is_compact() {
        let window = WeeklyWindow::parse(1, "07:00:00", "08:30").unwrap();
        assert_eq!(window.to_string(), "day=1 07:00-08:30");
    }
}
