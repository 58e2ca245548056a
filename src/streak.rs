//! Habit streak rules.
//!
//! Pure calendar-day arithmetic: the store loads a habit, asks this module
//! what marking it done "now" means, then persists the answer. Days are
//! counted in the user's zone, not in elapsed hours: finishing at 23:50 and
//! again at 00:10 the next day is two consecutive days.

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use std::fmt;

/// Outcome of marking a habit done today.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreakAdvance {
    /// Already completed on this local date. No write, no log row.
    AlreadyDoneToday { streak: u32 },
    /// First-ever completion.
    Started,
    /// Completed on the day right after the previous completion.
    Extended { streak: u32 },
    /// A gap of two or more days broke the chain. There is no grace day:
    /// any miss resets to 1.
    Reset,
}

impl StreakAdvance {
    /// Streak value to persist (and to show the user).
    pub fn streak(&self, previous: u32) -> u32 {
        match self {
            StreakAdvance::AlreadyDoneToday { streak } => *streak,
            StreakAdvance::Started | StreakAdvance::Reset => 1,
            StreakAdvance::Extended { .. } => previous + 1,
        }
    }

    /// Whether the habit row (and a log entry) should be written.
    pub fn mutates(&self) -> bool {
        !matches!(self, StreakAdvance::AlreadyDoneToday { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreakError {
    /// `last_completed_at` is in the future relative to "today": clock or
    /// timezone misconfiguration. Treated as an error, never clamped.
    ClockSkew {
        last_date: NaiveDate,
        today: NaiveDate,
    },
}

impl fmt::Display for StreakError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreakError::ClockSkew { last_date, today } => write!(
                f,
                "last completion {} is after today {}; check the clock or configured timezone",
                last_date, today
            ),
        }
    }
}

impl std::error::Error for StreakError {}

/// Compute what marking the habit done today does to its streak.
///
/// `last_completed_at` is the stored UTC instant of the previous completion;
/// `today` must already be the current date in `tz`.
pub fn advance(
    last_completed_at: Option<DateTime<Utc>>,
    current_streak: u32,
    today: NaiveDate,
    tz: Tz,
) -> Result<StreakAdvance, StreakError> {
    let Some(last) = last_completed_at else {
        return Ok(StreakAdvance::Started);
    };

    let last_date = last.with_timezone(&tz).date_naive();
    let delta_days = (today - last_date).num_days();

    match delta_days {
        d if d < 0 => Err(StreakError::ClockSkew { last_date, today }),
        0 => Ok(StreakAdvance::AlreadyDoneToday {
            streak: current_streak,
        }),
        1 => Ok(StreakAdvance::Extended {
            streak: current_streak + 1,
        }),
        _ => Ok(StreakAdvance::Reset),
    }
}

/// New `longest_streak` after a completion. Monotonically non-decreasing.
pub fn new_longest(longest: u32, new_streak: u32) -> u32 {
    longest.max(new_streak)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use chrono_tz::America::Caracas;

    fn at_local(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Caracas
            .with_ymd_and_hms(y, m, d, h, 0, 0)
            .unwrap()
            .with_timezone(&Utc)
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn first_completion_starts_at_one() {
        let adv = advance(None, 0, day(2026, 5, 10), Caracas).unwrap();
        assert_eq!(adv, StreakAdvance::Started);
        assert_eq!(adv.streak(0), 1);
        assert!(adv.mutates());
    }

    #[test]
    fn same_day_is_a_noop() {
        let adv = advance(Some(at_local(2026, 5, 10, 8)), 4, day(2026, 5, 10), Caracas).unwrap();
        assert_eq!(adv, StreakAdvance::AlreadyDoneToday { streak: 4 });
        assert_eq!(adv.streak(4), 4);
        assert!(!adv.mutates());
    }

    #[test]
    fn next_day_extends_by_one() {
        let adv = advance(Some(at_local(2026, 5, 10, 22)), 4, day(2026, 5, 11), Caracas).unwrap();
        assert_eq!(adv, StreakAdvance::Extended { streak: 5 });
        assert_eq!(adv.streak(4), 5);
    }

    #[test]
    fn two_day_gap_resets_to_one() {
        let adv = advance(Some(at_local(2026, 5, 10, 9)), 9, day(2026, 5, 12), Caracas).unwrap();
        assert_eq!(adv, StreakAdvance::Reset);
        assert_eq!(adv.streak(9), 1);
    }

    #[test]
    fn long_gap_also_resets() {
        let adv = advance(Some(at_local(2026, 1, 1, 9)), 30, day(2026, 5, 12), Caracas).unwrap();
        assert_eq!(adv, StreakAdvance::Reset);
    }

    #[test]
    fn late_night_to_early_morning_counts_as_consecutive() {
        // 23:50 local then next day: calendar days, not elapsed hours.
        let last = Caracas
            .with_ymd_and_hms(2026, 5, 10, 23, 50, 0)
            .unwrap()
            .with_timezone(&Utc);
        let adv = advance(Some(last), 2, day(2026, 5, 11), Caracas).unwrap();
        assert_eq!(adv, StreakAdvance::Extended { streak: 3 });
    }

    #[test]
    fn utc_instant_is_projected_into_user_zone() {
        // 02:00 UTC on the 11th is 22:00 on the 10th in Caracas, so marking
        // done on the 11th (local) is consecutive, not same-day.
        let last = Utc.with_ymd_and_hms(2026, 5, 11, 2, 0, 0).unwrap();
        let adv = advance(Some(last), 1, day(2026, 5, 11), Caracas).unwrap();
        assert_eq!(adv, StreakAdvance::Extended { streak: 2 });
    }

    #[test]
    fn future_completion_is_clock_skew() {
        let err = advance(Some(at_local(2026, 5, 12, 9)), 3, day(2026, 5, 10), Caracas)
            .unwrap_err();
        assert!(matches!(err, StreakError::ClockSkew { .. }));
    }

    #[test]
    fn longest_streak_never_decreases() {
        assert_eq!(new_longest(10, 3), 10);
        assert_eq!(new_longest(10, 11), 11);
        assert_eq!(new_longest(0, 1), 1);
    }

    mod proptest_streak {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Over any sequence of day gaps, longest is monotone and always
            /// at least the current streak.
            #[test]
            fn longest_is_monotone_over_sequences(gaps in prop::collection::vec(0i64..5, 1..40)) {
                let mut date = day(2026, 1, 1);
                let mut last: Option<DateTime<Utc>> = None;
                let mut streak = 0u32;
                let mut longest = 0u32;

                for gap in gaps {
                    date += chrono::Duration::days(gap);
                    let adv = advance(last, streak, date, Caracas).unwrap();
                    let next = adv.streak(streak);
                    if adv.mutates() {
                        last = Some(
                            Caracas
                                .from_local_datetime(&date.and_hms_opt(12, 0, 0).unwrap())
                                .unwrap()
                                .with_timezone(&Utc),
                        );
                    }
                    let next_longest = new_longest(longest, next);
                    prop_assert!(next_longest >= longest);
                    prop_assert!(next_longest >= next);
                    streak = next;
                    longest = next_longest;
                }
            }

            #[test]
            fn streak_is_always_positive_after_mutation(gap in 0i64..400) {
                let last = at_local(2026, 1, 1, 12);
                let today = day(2026, 1, 1) + chrono::Duration::days(gap);
                let adv = advance(Some(last), 7, today, Caracas).unwrap();
                prop_assert!(adv.streak(7) >= 1);
            }
        }
    }
}
