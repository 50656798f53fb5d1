use carrent_catalog::AvailabilityChecker;
use carrent_shared::BookedPeriod;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

pub const MS_PER_DAY: i64 = 86_400_000;

/// Formats accepted for date-time inputs without an offset; read as UTC.
const NAIVE_DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Invalid date: {0:?}")]
    InvalidDateFormat(String),

    #[error("End date must be after start date.")]
    OrderingError,

    #[error("Booking must be for at least one day.")]
    MinimumDurationError,

    #[error("The car is already booked for: {}", list_periods(.0))]
    OverlapError(Vec<BookedPeriod>),
}

fn list_periods(periods: &[BookedPeriod]) -> String {
    periods
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// A checked rental window and its billable day count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidatedRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub days: i64,
}

/// Parses an RFC 3339 timestamp, a local date-time (`2024-03-10T10:00`) or a
/// bare date (`2024-03-10`, midnight). Values without an offset are UTC.
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, ValidationError> {
    let raw = raw.trim();

    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }

    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| ValidationError::InvalidDateFormat(raw.to_string()))
}

/// `ceil((end - start) / 24h)`: any started day is billed as a full day.
pub fn day_count(start: DateTime<Utc>, end: DateTime<Utc>) -> i64 {
    let ms = (end - start).num_milliseconds();
    let whole = ms / MS_PER_DAY;
    if ms % MS_PER_DAY > 0 {
        whole + 1
    } else {
        whole
    }
}

/// Date/duration validation against a vehicle's booked periods.
pub struct DateRangeValidator<'a> {
    checker: AvailabilityChecker<'a>,
}

impl<'a> DateRangeValidator<'a> {
    pub fn new(booked: &'a [BookedPeriod]) -> Self {
        Self {
            checker: AvailabilityChecker::new(booked),
        }
    }

    /// Parse, then check ordering, duration and availability, in that order.
    pub fn validate(&self, raw_start: &str, raw_end: &str) -> Result<ValidatedRange, ValidationError> {
        let start = parse_timestamp(raw_start)?;
        let end = parse_timestamp(raw_end)?;
        self.validate_range(start, end)
    }

    pub fn validate_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<ValidatedRange, ValidationError> {
        if start >= end {
            return Err(ValidationError::OrderingError);
        }

        let days = day_count(start, end);
        if days < 1 {
            return Err(ValidationError::MinimumDurationError);
        }

        let conflicts = self.checker.conflicts(start, end);
        if !conflicts.is_empty() {
            tracing::debug!(
                %start,
                %end,
                conflicts = conflicts.len(),
                "Requested dates overlap existing bookings"
            );
            return Err(ValidationError::OverlapError(conflicts));
        }

        Ok(ValidatedRange { start, end, days })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, d, h, 0, 0).unwrap()
    }

    #[test]
    fn test_parse_accepted_formats() {
        assert_eq!(parse_timestamp("2024-03-10").unwrap(), at(10, 0));
        assert_eq!(parse_timestamp("2024-03-10T10:00").unwrap(), at(10, 10));
        assert_eq!(parse_timestamp("2024-03-10T10:00:00").unwrap(), at(10, 10));
        assert_eq!(parse_timestamp("2024-03-10 10:00").unwrap(), at(10, 10));
        assert_eq!(parse_timestamp("2024-03-10T11:00:00+01:00").unwrap(), at(10, 10));
        assert_eq!(parse_timestamp(" 2024-03-10T10:00:00Z ").unwrap(), at(10, 10));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        for raw in ["", "tomorrow", "2024-13-01", "10/03/2024"] {
            assert_eq!(
                parse_timestamp(raw),
                Err(ValidationError::InvalidDateFormat(raw.to_string()))
            );
        }
    }

    #[test]
    fn test_day_count_rounds_up() {
        assert_eq!(day_count(at(10, 0), at(10, 14)), 1);
        assert_eq!(day_count(at(10, 0), at(11, 0)), 1);
        assert_eq!(day_count(at(10, 0), at(11, 1)), 2);
        assert_eq!(day_count(at(10, 10), at(13, 10)), 3);
        assert_eq!(
            day_count(at(10, 0), at(10, 0) + chrono::Duration::milliseconds(1)),
            1
        );
    }

    #[test]
    fn test_day_count_at_least_one_for_any_ordered_pair() {
        let start = at(1, 0);
        for minutes in [1, 59, 60 * 23, 60 * 24, 60 * 24 + 1, 60 * 24 * 9] {
            let end = start + chrono::Duration::minutes(minutes);
            assert!(day_count(start, end) >= 1);
        }
    }

    #[test]
    fn test_end_before_start_is_ordering_error() {
        let validator = DateRangeValidator::new(&[]);
        assert_eq!(
            validator.validate("2024-03-10T10:00", "2024-03-08T10:00"),
            Err(ValidationError::OrderingError)
        );
    }

    #[test]
    fn test_equal_start_and_end_is_ordering_error() {
        let validator = DateRangeValidator::new(&[]);
        assert_eq!(
            validator.validate("2024-03-10", "2024-03-10"),
            Err(ValidationError::OrderingError)
        );
    }

    #[test]
    fn test_invalid_format_reported_before_ordering() {
        let validator = DateRangeValidator::new(&[]);
        assert!(matches!(
            validator.validate("2024-03-10", "soon"),
            Err(ValidationError::InvalidDateFormat(raw)) if raw == "soon"
        ));
    }

    #[test]
    fn test_overlap_carries_conflicting_periods() {
        let booked = vec![
            BookedPeriod::new(at(11, 0), at(13, 0)),
            BookedPeriod::new(at(20, 0), at(22, 0)),
        ];
        let validator = DateRangeValidator::new(&booked);

        assert_eq!(
            validator.validate("2024-03-10", "2024-03-12"),
            Err(ValidationError::OverlapError(vec![BookedPeriod::new(at(11, 0), at(13, 0))]))
        );
    }

    #[test]
    fn test_back_to_back_booking_is_valid() {
        let booked = vec![BookedPeriod::new(at(11, 0), at(13, 0))];
        let validator = DateRangeValidator::new(&booked);

        let range = validator.validate("2024-03-13", "2024-03-15").unwrap();
        assert_eq!(range.days, 2);
        assert_eq!(range.start, at(13, 0));
    }

    #[test]
    fn test_overlap_message_lists_periods() {
        let err = ValidationError::OverlapError(vec![BookedPeriod::new(at(11, 0), at(13, 0))]);
        assert_eq!(
            err.to_string(),
            "The car is already booked for: 2024-03-11 00:00 → 2024-03-13 00:00"
        );
    }
}
