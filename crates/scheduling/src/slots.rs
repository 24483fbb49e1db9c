//! Slot arithmetic
//!
//! Pure interval computation over a doctor's availability windows. All
//! intervals are half-open `[start, end)`: slots that touch end-to-start do
//! not conflict.

use crate::types::{SlotRule, TimeSlot};
use chrono::{Datelike, Duration, NaiveDate, NaiveTime};

/// Half-open interval overlap test.
pub fn overlaps(
    a_start: NaiveTime,
    a_end: NaiveTime,
    b_start: NaiveTime,
    b_end: NaiveTime,
) -> bool {
    a_start < b_end && b_start < a_end
}

/// Whether an availability window applies to a calendar date.
pub fn window_applies(slot: &TimeSlot, date: NaiveDate) -> bool {
    if !slot.is_active {
        return false;
    }
    match slot.rule {
        SlotRule::Weekly(weekday) => date.weekday() == weekday,
        SlotRule::Dated(slot_date) => slot_date == date,
    }
}

/// Enumerate free fixed-duration intervals inside one window.
///
/// Walks from the window start in `duration_minutes` increments until the
/// next increment would exceed the window end. An increment is free unless
/// it overlaps any interval in `taken`.
pub fn free_intervals(
    date: NaiveDate,
    window_start: NaiveTime,
    window_end: NaiveTime,
    duration_minutes: u32,
    taken: &[(NaiveTime, NaiveTime)],
) -> Vec<(NaiveTime, NaiveTime)> {
    let mut free = Vec::new();
    if duration_minutes == 0 {
        return free;
    }

    // Walk on full datetimes so a window touching midnight cannot wrap.
    let step = Duration::minutes(i64::from(duration_minutes));
    let window_end = date.and_time(window_end);
    let mut cursor = date.and_time(window_start);

    while cursor + step <= window_end {
        let start = cursor.time();
        let end = (cursor + step).time();

        let is_taken = taken
            .iter()
            .any(|&(taken_start, taken_end)| overlaps(start, end, taken_start, taken_end));
        if !is_taken {
            free.push((start, end));
        }

        cursor += step;
    }

    free
}
