//! # momentum
//!
//! Core library for a dual-identity productivity coach: a single user logs
//! three priority tasks per period (morning/afternoon persona), keeps habit
//! streaks alive, runs focus timers, and talks to an LLM coaching agent that
//! sees the day's tracking state.
//!
//! The library owns the tracking/streak rules, the timer state machine, the
//! SQLite-backed stores, and the agent; rendering is left to whatever shell
//! consumes it (the bundled binary is a minimal line-oriented harness).

pub mod agent;
pub mod clock;
pub mod config;
pub mod core;
pub mod error;
pub mod providers;
pub mod state;
pub mod streak;
pub mod timer;
pub mod tracking;
pub mod traits;

#[cfg(test)]
mod testing;

pub use crate::agent::CoachAgent;
pub use crate::clock::UserClock;
pub use crate::config::AppConfig;
pub use crate::core::CoachContext;
pub use crate::error::{CoachError, CoachErrorKind};
pub use crate::streak::{advance as advance_streak, StreakAdvance, StreakError};
pub use crate::timer::{FocusTimer, RemainingTime, TimerPreset, TimerStatus};
pub use crate::tracking::{TaskEntry, WeeklyStats, TASKS_PER_PERIOD};
pub use crate::traits::{ChatMessage, DailyTrackingRecord, Habit, Period, UserSettings};
