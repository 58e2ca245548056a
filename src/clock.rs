//! User-timezone clock.
//!
//! All calendar-day comparisons in the streak engine and tracking store are
//! relative to the user's configured IANA zone, never the host zone. An
//! unparseable zone name falls back to the default rather than failing the
//! request; an unknown name is a recoverable misconfiguration.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use chrono_tz::Tz;
use tracing::warn;

/// Zone used when the configured timezone string does not parse.
pub const DEFAULT_TIMEZONE: &str = "America/Caracas";

#[derive(Debug, Clone, Copy)]
pub struct UserClock {
    tz: Tz,
}

impl UserClock {
    /// Build a clock for a named IANA zone, falling back to
    /// [`DEFAULT_TIMEZONE`] when the name does not parse.
    pub fn new(tz_name: &str) -> Self {
        let tz = match tz_name.parse::<Tz>() {
            Ok(tz) => tz,
            Err(_) => {
                warn!(tz_name, "Unknown timezone, falling back to {}", DEFAULT_TIMEZONE);
                DEFAULT_TIMEZONE
                    .parse::<Tz>()
                    .expect("default timezone must parse")
            }
        };
        Self { tz }
    }

    pub fn timezone(&self) -> Tz {
        self.tz
    }

    /// Wall-clock "now" in the user's zone.
    pub fn now(&self) -> DateTime<Tz> {
        Utc::now().with_timezone(&self.tz)
    }

    /// Current calendar date in the user's zone.
    pub fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }

    /// Today's date as the ISO string the tracking table keys on.
    pub fn today_iso(&self) -> String {
        self.today().format("%Y-%m-%d").to_string()
    }

    /// English weekday name for the `day_of_week` column.
    pub fn day_of_week(&self) -> String {
        self.now().format("%A").to_string()
    }

    /// "HH:MM" in the user's zone, for `code_commit_time` defaults.
    pub fn current_time_hhmm(&self) -> String {
        self.now().format("%H:%M").to_string()
    }

    /// Saturday or Sunday in the user's zone.
    pub fn is_weekend(&self) -> bool {
        self.now().weekday().number_from_monday() >= 6
    }

    /// Project a UTC instant onto the user's calendar.
    pub fn local_date_of(&self, instant: DateTime<Utc>) -> NaiveDate {
        instant.with_timezone(&self.tz).date_naive()
    }
}

impl Default for UserClock {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEZONE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn valid_zone_parses() {
        let clock = UserClock::new("America/New_York");
        assert_eq!(clock.timezone(), chrono_tz::America::New_York);
    }

    #[test]
    fn invalid_zone_falls_back_to_default() {
        let clock = UserClock::new("Not/AZone");
        assert_eq!(clock.timezone(), chrono_tz::America::Caracas);
    }

    #[test]
    fn local_date_respects_zone_offset() {
        // 02:00 UTC is still the previous day in Caracas (UTC-4).
        let clock = UserClock::new("America/Caracas");
        let instant = Utc.with_ymd_and_hms(2026, 3, 10, 2, 0, 0).unwrap();
        assert_eq!(
            clock.local_date_of(instant),
            NaiveDate::from_ymd_opt(2026, 3, 9).unwrap()
        );
    }

    #[test]
    fn today_iso_is_dash_separated() {
        let iso = UserClock::default().today_iso();
        assert_eq!(iso.len(), 10);
        assert_eq!(iso.as_bytes()[4], b'-');
    }
}
