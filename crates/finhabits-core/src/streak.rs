//! Current-streak calculation
//!
//! A streak is the number of consecutive calendar days, ending today or
//! yesterday, on which a habit was completed. Ending at yesterday is a grace
//! period: a streak stays alive through the current day until the user logs
//! it.

use chrono::NaiveDate;

use crate::models::{HabitCompletionRecord, StreakResult};

/// Length of the unbroken run of completion dates ending today or yesterday.
///
/// The dates may arrive in any order and may contain duplicates; they are
/// sorted newest-first before the walk. Dates after `today` never count.
pub fn compute_streak(dates: &[NaiveDate], today: NaiveDate) -> u32 {
    let Some(yesterday) = today.pred_opt() else {
        return 0;
    };

    let mut sorted = dates.to_vec();
    sorted.sort_unstable_by(|a, b| b.cmp(a));

    let mut streak = 0u32;
    let mut expected: Option<NaiveDate> = None;

    for date in sorted {
        match expected {
            None => {
                if date < yesterday {
                    break;
                }
                let anchor = if date == yesterday { yesterday } else { today };
                if date == anchor {
                    streak = 1;
                    expected = anchor.pred_opt();
                    if expected.is_none() {
                        break;
                    }
                }
                // otherwise the date is in the future: skip it
            }
            Some(want) => {
                if date == want {
                    streak += 1;
                    expected = want.pred_opt();
                    if expected.is_none() {
                        break;
                    }
                } else if date < want {
                    break;
                }
                // date > want: same day seen twice
            }
        }
    }

    streak
}

/// Streak over raw habit-log records; only completed records count
pub fn compute_streak_from_records(records: &[HabitCompletionRecord], today: NaiveDate) -> u32 {
    let dates: Vec<NaiveDate> = records
        .iter()
        .filter(|r| r.completed)
        .map(|r| r.date)
        .collect();
    compute_streak(&dates, today)
}

pub fn streak_result(
    habit_id: i64,
    records: &[HabitCompletionRecord],
    today: NaiveDate,
) -> StreakResult {
    let relevant: Vec<HabitCompletionRecord> = records
        .iter()
        .filter(|r| r.habit_id == habit_id)
        .copied()
        .collect();
    StreakResult {
        habit_id,
        current_streak: compute_streak_from_records(&relevant, today),
    }
}

/// Longest current streak across habits, 0 when there are none
pub fn longest_current_streak<'a, I>(streaks: I) -> u32
where
    I: IntoIterator<Item = &'a StreakResult>,
{
    streaks
        .into_iter()
        .map(|s| s.current_streak)
        .max()
        .unwrap_or(0)
}
