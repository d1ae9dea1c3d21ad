//! Academic score calculation.
//!
//! The academic score is a 0–10 figure derived from three weighted
//! percentages:
//!
//! | Component  | Weight | Percentage                      |
//! |------------|--------|---------------------------------|
//! | Test       | 50%    | the test result as recorded     |
//! | Attendance | 30%    | `att / attTotal * 100`          |
//! | Homework   | 20%    | `hw / hwTotal * 100`            |
//!
//! The weighted percentage is rescaled to 0–10, raised to 1 if the student
//! has any non-zero input, capped at 10, and rounded to 2 decimal places.

use crate::record::StudentRecord;

/// Weight of the test percentage.
pub const TEST_WEIGHT: f64 = 0.5;

/// Weight of the attendance percentage.
pub const ATTENDANCE_WEIGHT: f64 = 0.3;

/// Weight of the homework percentage.
pub const HOMEWORK_WEIGHT: f64 = 0.2;

/// Lowest score given to a student with any recorded activity.
pub const MIN_ACTIVE_SCORE: f64 = 1.0;

/// Highest possible score.
pub const MAX_SCORE: f64 = 10.0;

/// Returns `done` as a percentage of `total`, or 0 when `total` is zero.
#[must_use]
pub fn percent(done: u32, total: u32) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (f64::from(done) / f64::from(total)) * 100.0
}

/// Computes the academic score for a record's current inputs.
#[must_use]
pub fn academic_score(record: &StudentRecord) -> f64 {
    let test_pct = record.test.unwrap_or(0.0);
    let att_pct = percent(record.att, record.att_total);
    let hw_pct = percent(record.hw, record.hw_total);

    let overall_pct =
        TEST_WEIGHT * test_pct + ATTENDANCE_WEIGHT * att_pct + HOMEWORK_WEIGHT * hw_pct;
    let mut score = (overall_pct / 100.0) * 10.0;

    if score < MIN_ACTIVE_SCORE && has_activity(record) {
        score = MIN_ACTIVE_SCORE;
    }
    if score > MAX_SCORE {
        score = MAX_SCORE;
    }

    round_to_cents(score)
}

/// Recomputes and stores `record.academic`.
pub fn calc_academic(record: &mut StudentRecord) {
    record.academic = Some(academic_score(record));
}

/// Returns `true` if any of test, attendance or homework is non-zero.
///
/// A missing test and a test of 0 both count as no activity; totals are not
/// considered.
fn has_activity(record: &StudentRecord) -> bool {
    record.test.is_some_and(|t| t != 0.0) || record.att != 0 || record.hw != 0
}

/// Rounds to 2 decimal places, taking the larger candidate on an exact tie.
///
/// An exact tie needs `value * 100` to end in `.5` with no representation
/// error, which only happens for multiples of 1/8. Everything else is rounded
/// from its exact decimal expansion by the formatter.
fn round_to_cents(value: f64) -> f64 {
    if (value * 8.0).fract() == 0.0 {
        return (value * 100.0).round() / 100.0;
    }
    format!("{value:.2}").parse().unwrap_or(value)
}
