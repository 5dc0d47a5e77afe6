#![forbid(unsafe_code)]

//! Host-driven clock.
//!
//! The monotonic half works like a deterministic backend clock: the host
//! advances it explicitly and nothing reads the system time behind its back.
//! The wall-clock half is anchored by the host (`set_wall`) and then moves
//! with the monotonic time, so chat timestamps and mail dates stay consistent
//! with the timers that produced them.

use chrono::{NaiveDateTime, TimeDelta};
use web_time::Duration;

/// Deterministic clock controlled by the host.
#[derive(Debug, Clone, Default)]
pub struct HostClock {
    now: Duration,
    wall_base: NaiveDateTime,
    wall_anchor: Duration,
}

impl HostClock {
    /// Create a clock at monotonic `0` whose wall time reads `wall`.
    #[must_use]
    pub fn new(wall: NaiveDateTime) -> Self {
        Self {
            now: Duration::ZERO,
            wall_base: wall,
            wall_anchor: Duration::ZERO,
        }
    }

    /// Create a clock anchored at the local system time.
    #[cfg(not(target_arch = "wasm32"))]
    #[must_use]
    pub fn from_system() -> Self {
        Self::new(chrono::Local::now().naive_local())
    }

    /// Current monotonic time.
    #[must_use]
    pub const fn now(&self) -> Duration {
        self.now
    }

    /// Set current monotonic time. Time never moves backwards.
    pub fn set(&mut self, now: Duration) {
        self.now = self.now.max(now);
    }

    /// Advance monotonic time by `dt`.
    pub fn advance(&mut self, dt: Duration) {
        self.now = self.now.saturating_add(dt);
    }

    /// Re-anchor the wall clock at the current monotonic instant.
    pub fn set_wall(&mut self, wall: NaiveDateTime) {
        self.wall_base = wall;
        self.wall_anchor = self.now;
    }

    /// Current wall-clock time.
    #[must_use]
    pub fn wall_now(&self) -> NaiveDateTime {
        let elapsed = self.now.saturating_sub(self.wall_anchor);
        i64::try_from(elapsed.as_millis())
            .ok()
            .and_then(TimeDelta::try_milliseconds)
            .and_then(|delta| self.wall_base.checked_add_signed(delta))
            .unwrap_or(self.wall_base)
    }

    /// Current wall-clock time as milliseconds since the Unix epoch.
    #[must_use]
    pub fn epoch_ms(&self) -> i64 {
        self.wall_now().and_utc().timestamp_millis()
    }
}

/// `h:mm:ss AM/PM`, used for chat message stamps and the terminal `time` command.
#[must_use]
pub fn format_long_time(at: NaiveDateTime) -> String {
    at.format("%-I:%M:%S %p").to_string()
}

/// `h:mm AM/PM`, used by the taskbar clock.
#[must_use]
pub fn format_short_time(at: NaiveDateTime) -> String {
    at.format("%-I:%M %p").to_string()
}

/// `M/D/YYYY`, used by the terminal `date` command.
#[must_use]
pub fn format_short_date(at: NaiveDateTime) -> String {
    at.format("%-m/%-d/%Y").to_string()
}

const MAIL_DATE_FORMAT: &str = "%b %d, %Y %-I:%M %p";
const MAIL_DATE_PARSE: &str = "%b %d, %Y %I:%M %p";

/// `Mon DD, YYYY h:mm AM/PM`, the mail list date column.
#[must_use]
pub fn format_mail_date(at: NaiveDateTime) -> String {
    at.format(MAIL_DATE_FORMAT).to_string()
}

/// Parse a mail list date back to epoch milliseconds.
#[must_use]
pub fn parse_mail_date_ms(text: &str) -> Option<i64> {
    NaiveDateTime::parse_from_str(text.trim(), MAIL_DATE_PARSE)
        .ok()
        .map(|at| at.and_utc().timestamp_millis())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(1999, 10, 19)
            .and_then(|d| d.and_hms_opt(h, m, s))
            .expect("valid test date")
    }

    #[test]
    fn wall_clock_moves_with_monotonic_time() {
        let mut clock = HostClock::new(at(15, 47, 0));
        clock.advance(Duration::from_secs(90));
        assert_eq!(clock.wall_now(), at(15, 48, 30));
        clock.set_wall(at(9, 0, 0));
        clock.advance(Duration::from_millis(1_500));
        assert_eq!(format_long_time(clock.wall_now()), "9:00:01 AM");
    }

    #[test]
    fn set_never_rewinds() {
        let mut clock = HostClock::default();
        clock.set(Duration::from_millis(500));
        clock.set(Duration::from_millis(100));
        assert_eq!(clock.now(), Duration::from_millis(500));
    }

    #[test]
    fn time_formats_use_twelve_hour_clock() {
        assert_eq!(format_long_time(at(0, 5, 9)), "12:05:09 AM");
        assert_eq!(format_long_time(at(13, 5, 9)), "1:05:09 PM");
        assert_eq!(format_short_time(at(12, 0, 0)), "12:00 PM");
        assert_eq!(format_short_date(at(1, 0, 0)), "10/19/1999");
    }

    #[test]
    fn mail_dates_round_trip_through_parser() {
        let text = format_mail_date(at(9, 13, 0));
        assert_eq!(text, "Oct 19, 1999 9:13 AM");
        assert_eq!(
            parse_mail_date_ms(&text),
            Some(at(9, 13, 0).and_utc().timestamp_millis())
        );
        let earlier = parse_mail_date_ms("Aug 14, 1995 9:13 AM").expect("seed date parses");
        let later = parse_mail_date_ms("Jan 09, 1999 8:02 PM").expect("seed date parses");
        assert!(earlier < later);
        assert_eq!(parse_mail_date_ms("not a date"), None);
    }
}
