use carrent_shared::BookedPeriod;
use chrono::{DateTime, Utc};

/// Checks a candidate rental window against the periods already booked for
/// one vehicle.
///
/// Intervals are half-open, so a booking may start exactly when another one
/// ends.
pub struct AvailabilityChecker<'a> {
    booked: &'a [BookedPeriod],
}

impl<'a> AvailabilityChecker<'a> {
    pub fn new(booked: &'a [BookedPeriod]) -> Self {
        Self { booked }
    }

    /// `[start, end)` and `period` overlap unless one ends before the other starts.
    pub fn overlaps(start: DateTime<Utc>, end: DateTime<Utc>, period: &BookedPeriod) -> bool {
        !(end <= period.start || start >= period.end)
    }

    /// True when any stored period overlaps the candidate.
    pub fn is_blocked(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        self.booked
            .iter()
            .any(|period| Self::overlaps(start, end, period))
    }

    /// Every stored period overlapping the candidate, in stored order.
    pub fn conflicts(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Vec<BookedPeriod> {
        self.booked
            .iter()
            .filter(|period| Self::overlaps(start, end, period))
            .copied()
            .collect()
    }

    pub fn booked(&self) -> &'a [BookedPeriod] {
        self.booked
    }
}
