//! Focus timer state machine.
//!
//! Timers live only in memory; the countdown is recomputed from wall-clock
//! reads on every poll, so correctness needs no server-side tick. Only a
//! finished timer ever gets persisted (as a focus session, by the caller).
//!
//! Transitions: Running -> Paused -> Running, Running -> Completed. Completed
//! is terminal and set explicitly once the expiry has been acknowledged, so
//! completion side effects fire once.

use chrono::{DateTime, Duration, Utc};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerStatus {
    Running,
    Paused,
    Completed,
}

/// Built-in durations mirroring the timer page presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerPreset {
    Pomodoro,
    ShortBreak,
    LongBreak,
    DeepWork,
    Custom(u32),
}

impl TimerPreset {
    pub fn minutes(&self) -> u32 {
        match self {
            TimerPreset::Pomodoro => 25,
            TimerPreset::ShortBreak => 5,
            TimerPreset::LongBreak => 15,
            TimerPreset::DeepWork => 60,
            TimerPreset::Custom(minutes) => *minutes,
        }
    }

    /// Label stored in `focus_sessions.timer_type`.
    pub fn label(&self) -> &'static str {
        match self {
            TimerPreset::Pomodoro => "pomodoro",
            TimerPreset::ShortBreak => "short_break",
            TimerPreset::LongBreak => "long_break",
            TimerPreset::DeepWork => "deep_work",
            TimerPreset::Custom(_) => "custom",
        }
    }
}

/// Snapshot returned to the polling client.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RemainingTime {
    pub minutes: i64,
    pub seconds: i64,
    pub total_seconds: i64,
    pub percentage: f64,
    pub is_finished: bool,
}

impl RemainingTime {
    fn finished() -> Self {
        Self {
            minutes: 0,
            seconds: 0,
            total_seconds: 0,
            percentage: 100.0,
            is_finished: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct FocusTimer {
    pub task_name: String,
    pub duration_minutes: u32,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub status: TimerStatus,
    pub paused_at: Option<DateTime<Utc>>,
}

impl FocusTimer {
    pub fn new(duration_minutes: u32, task_name: impl Into<String>) -> Self {
        Self::new_at(duration_minutes, task_name, Utc::now())
    }

    pub fn new_at(duration_minutes: u32, task_name: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            task_name: task_name.into(),
            duration_minutes,
            start_time: now,
            end_time: now + Duration::minutes(i64::from(duration_minutes)),
            status: TimerStatus::Running,
            paused_at: None,
        }
    }

    pub fn remaining(&self) -> RemainingTime {
        self.remaining_at(Utc::now())
    }

    pub fn remaining_at(&self, now: DateTime<Utc>) -> RemainingTime {
        if self.status == TimerStatus::Completed {
            return RemainingTime::finished();
        }

        let remaining = match self.status {
            // Frozen at the instant of the pause.
            TimerStatus::Paused => match self.paused_at {
                Some(paused_at) => self.end_time - paused_at,
                None => self.end_time - now,
            },
            _ => self.end_time - now,
        };

        let remaining_seconds = remaining.num_seconds();
        if remaining_seconds <= 0 {
            return RemainingTime::finished();
        }

        let total = i64::from(self.duration_minutes) * 60;
        let percentage = if total > 0 {
            (total - remaining_seconds) as f64 / total as f64 * 100.0
        } else {
            100.0
        };

        RemainingTime {
            minutes: remaining_seconds / 60,
            seconds: remaining_seconds % 60,
            total_seconds: remaining_seconds,
            percentage: (percentage * 10.0).round() / 10.0,
            is_finished: false,
        }
    }

    /// Pause a running timer. A no-op in any other state.
    pub fn pause(&mut self) {
        self.pause_at(Utc::now());
    }

    pub fn pause_at(&mut self, now: DateTime<Utc>) {
        if self.status == TimerStatus::Running {
            self.status = TimerStatus::Paused;
            self.paused_at = Some(now);
        }
    }

    /// Resume a paused timer, extending `end_time` by the pause span so the
    /// configured remaining duration is preserved.
    pub fn resume(&mut self) {
        self.resume_at(Utc::now());
    }

    pub fn resume_at(&mut self, now: DateTime<Utc>) {
        if self.status == TimerStatus::Paused {
            if let Some(paused_at) = self.paused_at.take() {
                self.end_time += now - paused_at;
            }
            self.status = TimerStatus::Running;
        }
    }

    /// Mark the timer done after its expiry has been acknowledged. Terminal.
    pub fn complete(&mut self) {
        self.status = TimerStatus::Completed;
    }

    /// "MM:SS" for the live display, or the completion banner once finished.
    pub fn display(&self) -> String {
        self.display_at(Utc::now())
    }

    pub fn display_at(&self, now: DateTime<Utc>) -> String {
        let remaining = self.remaining_at(now);
        if remaining.is_finished {
            return "Time's up!".to_string();
        }
        format!("{:02}:{:02}", remaining.minutes, remaining.seconds)
    }
}

/// One-line summary for a completed session, tiered by how long it ran.
pub fn session_stats_line(duration_minutes: u32) -> String {
    if duration_minutes >= 60 {
        format!("Deep work: {} minutes completed", duration_minutes)
    } else if duration_minutes >= 25 {
        format!("Pomodoro: {} minutes completed", duration_minutes)
    } else {
        format!("Focus: {} minutes completed", duration_minutes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 5, 10, 9, 0, 0).unwrap()
    }

    #[test]
    fn new_timer_runs_until_start_plus_duration() {
        let timer = FocusTimer::new_at(25, "write spec", t0());
        assert_eq!(timer.status, TimerStatus::Running);
        assert_eq!(timer.end_time, t0() + Duration::minutes(25));

        let remaining = timer.remaining_at(t0());
        assert_eq!(remaining.total_seconds, 25 * 60);
        assert!(!remaining.is_finished);
        assert_eq!(remaining.percentage, 0.0);
    }

    #[test]
    fn remaining_counts_down_with_wall_clock() {
        let timer = FocusTimer::new_at(25, "x", t0());
        let remaining = timer.remaining_at(t0() + Duration::seconds(90));
        assert_eq!(remaining.minutes, 23);
        assert_eq!(remaining.seconds, 30);
        assert_eq!(remaining.total_seconds, 25 * 60 - 90);
        assert!(remaining.percentage > 5.0 && remaining.percentage < 7.0);
    }

    #[test]
    fn pause_freezes_remaining() {
        let mut timer = FocusTimer::new_at(25, "x", t0());
        timer.pause_at(t0() + Duration::minutes(5));

        let frozen_early = timer.remaining_at(t0() + Duration::minutes(6));
        let frozen_late = timer.remaining_at(t0() + Duration::minutes(20));
        assert_eq!(frozen_early, frozen_late);
        assert_eq!(frozen_early.total_seconds, 20 * 60);
    }

    #[test]
    fn resume_shifts_end_by_pause_span() {
        let mut timer = FocusTimer::new_at(25, "x", t0());
        let original_end = timer.end_time;

        timer.pause_at(t0() + Duration::seconds(30));
        let before_pause = timer.remaining_at(t0() + Duration::seconds(30));

        // Ten simulated seconds of pause.
        timer.resume_at(t0() + Duration::seconds(40));
        assert_eq!(timer.end_time, original_end + Duration::seconds(10));
        assert_eq!(timer.status, TimerStatus::Running);
        assert_eq!(timer.paused_at, None);

        let after_resume = timer.remaining_at(t0() + Duration::seconds(40));
        assert_eq!(before_pause.total_seconds, after_resume.total_seconds);
    }

    #[test]
    fn pause_only_from_running_resume_only_from_paused() {
        let mut timer = FocusTimer::new_at(25, "x", t0());
        timer.resume_at(t0() + Duration::seconds(5));
        assert_eq!(timer.status, TimerStatus::Running);

        timer.complete();
        timer.pause_at(t0() + Duration::seconds(10));
        assert_eq!(timer.status, TimerStatus::Completed);
    }

    #[test]
    fn expiry_reports_finished_and_zero() {
        let timer = FocusTimer::new_at(1, "x", t0());
        let at_end = timer.remaining_at(t0() + Duration::minutes(1));
        assert!(at_end.is_finished);
        assert_eq!(at_end.total_seconds, 0);
        assert_eq!(at_end.percentage, 100.0);

        let past_end = timer.remaining_at(t0() + Duration::minutes(5));
        assert!(past_end.is_finished);
    }

    #[test]
    fn paused_timer_past_end_is_finished_too() {
        let mut timer = FocusTimer::new_at(1, "x", t0());
        timer.pause_at(t0() + Duration::minutes(2));
        assert!(timer.remaining_at(t0() + Duration::minutes(2)).is_finished);
    }

    #[test]
    fn completed_always_reports_finished() {
        let mut timer = FocusTimer::new_at(25, "x", t0());
        timer.complete();
        let remaining = timer.remaining_at(t0() + Duration::seconds(1));
        assert!(remaining.is_finished);
        assert_eq!(remaining.total_seconds, 0);
    }

    #[test]
    fn display_formats_mm_ss() {
        let timer = FocusTimer::new_at(25, "x", t0());
        assert_eq!(timer.display_at(t0() + Duration::seconds(90)), "23:30");

        let mut done = FocusTimer::new_at(1, "x", t0());
        done.complete();
        assert_eq!(done.display_at(t0()), "Time's up!");
    }

    #[test]
    fn presets_match_page_defaults() {
        assert_eq!(TimerPreset::Pomodoro.minutes(), 25);
        assert_eq!(TimerPreset::ShortBreak.minutes(), 5);
        assert_eq!(TimerPreset::LongBreak.minutes(), 15);
        assert_eq!(TimerPreset::DeepWork.minutes(), 60);
        assert_eq!(TimerPreset::Custom(42).minutes(), 42);
        assert_eq!(TimerPreset::DeepWork.label(), "deep_work");
    }

    #[test]
    fn stats_line_tiers_by_duration() {
        assert!(session_stats_line(60).starts_with("Deep work"));
        assert!(session_stats_line(25).starts_with("Pomodoro"));
        assert!(session_stats_line(10).starts_with("Focus"));
    }
}
