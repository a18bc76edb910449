//! Best-before parsing and the live freshness countdown.
//!
//! Donors give a freshness window such as `"12 hours"`; the clock starts when
//! the NGO completes the pickup. Every stock view (NGO food stock, orphanage
//! food requests, deliveries) evaluates items through [`Freshness::evaluate`].

use std::fmt;
use std::sync::LazyLock;

use chrono::{DateTime, TimeDelta, Utc};
use regex::Regex;

use saveplate_types::StockItem;

static BEST_BEFORE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d+(?:\.\d+)?)\s*hour").expect("best-before pattern compiles")
});

const MS_PER_HOUR: f64 = 3_600_000.0;

/// Parse `"<number> hour(s)"` into a duration. Zero or unparseable input is `None`.
pub fn parse_best_before(text: &str) -> Option<TimeDelta> {
    let caps = BEST_BEFORE.captures(text)?;
    let hours: f64 = caps.get(1)?.as_str().parse().ok()?;
    let ms = hours * MS_PER_HOUR;
    if !ms.is_finite() || ms < 1.0 {
        return None;
    }
    TimeDelta::try_milliseconds(ms as i64)
}

/// `start + duration - now`, saturating instead of overflowing.
pub fn remaining(start: DateTime<Utc>, duration: TimeDelta, now: DateTime<Utc>) -> TimeDelta {
    (start - now).checked_add(&duration).unwrap_or(TimeDelta::MAX)
}

/// `"3h 12m"`, `"4m 9s"` or `"42s"`. Non-positive durations have no text.
pub fn format_remaining(d: TimeDelta) -> Option<String> {
    let ms = d.num_milliseconds();
    if ms <= 0 {
        return None;
    }
    let h = ms / 3_600_000;
    let m = (ms % 3_600_000) / 60_000;
    let s = (ms % 60_000) / 1000;
    Some(if h > 0 {
        format!("{h}h {m}m")
    } else if m > 0 {
        format!("{m}m {s}s")
    } else {
        format!("{s}s")
    })
}

/// How close an item is to spoiling, by fraction of its window left.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Urgency {
    /// under 20% left
    Critical,
    /// under 50% left
    Warning,
    Good,
}

impl Urgency {
    /// Integer comparison keeps the 20% and 50% boundaries exact.
    fn classify(remaining: TimeDelta, duration: TimeDelta) -> Self {
        let rem = remaining.num_milliseconds() as i128 * 100;
        let dur = duration.num_milliseconds() as i128;
        if rem < dur * 20 {
            Urgency::Critical
        } else if rem < dur * 50 {
            Urgency::Warning
        } else {
            Urgency::Good
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Urgency::Critical => "critical",
            Urgency::Warning => "warning",
            Urgency::Good => "good",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    /// Start time or best-before missing: nothing to count down.
    Unknown,
    /// The window has elapsed. Terminal.
    Spoiled,
    Fresh {
        remaining: TimeDelta,
        duration: TimeDelta,
        urgency: Urgency,
    },
}

impl Freshness {
    pub fn evaluate(
        start: Option<DateTime<Utc>>,
        best_before: Option<&str>,
        now: DateTime<Utc>,
    ) -> Self {
        let (Some(start), Some(duration)) = (start, best_before.and_then(parse_best_before))
        else {
            return Freshness::Unknown;
        };
        let remaining = remaining(start, duration, now);
        if remaining <= TimeDelta::zero() {
            return Freshness::Spoiled;
        }
        Freshness::Fresh {
            remaining,
            duration,
            urgency: Urgency::classify(remaining, duration),
        }
    }

    pub fn of_item(item: &StockItem, now: DateTime<Utc>) -> Self {
        Self::evaluate(item.completed_at, item.best_before.as_deref(), now)
    }

    /// Share of the window left, 0.0 to 100.0. Unknown and spoiled report 0.
    pub fn percent(&self) -> f64 {
        match self {
            Freshness::Fresh {
                remaining,
                duration,
                ..
            } => {
                let pct = remaining.num_milliseconds() as f64 / duration.num_milliseconds() as f64
                    * 100.0;
                pct.clamp(0.0, 100.0)
            }
            _ => 0.0,
        }
    }

    pub fn urgency(&self) -> Option<Urgency> {
        match self {
            Freshness::Fresh { urgency, .. } => Some(*urgency),
            _ => None,
        }
    }

    pub fn is_spoiled(&self) -> bool {
        matches!(self, Freshness::Spoiled)
    }

    /// Fixed-width fill bar for terminals.
    pub fn bar(&self, width: usize) -> String {
        let filled = ((self.percent() / 100.0) * width as f64).round() as usize;
        let filled = filled.min(width);
        format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
    }
}

impl fmt::Display for Freshness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Freshness::Unknown => f.write_str("—"),
            Freshness::Spoiled => f.write_str("Spoiled"),
            Freshness::Fresh { remaining, .. } => {
                f.write_str(format_remaining(*remaining).as_deref().unwrap_or("0s"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 10, 12, 0, 0).unwrap()
    }

    #[test]
    fn parses_whole_and_fractional_hours() {
        assert_eq!(parse_best_before("12 hours"), Some(TimeDelta::hours(12)));
        assert_eq!(parse_best_before("1 Hour"), Some(TimeDelta::hours(1)));
        assert_eq!(parse_best_before("1.5hours"), Some(TimeDelta::minutes(90)));
        assert_eq!(parse_best_before("within 6 hours of cooking"), Some(TimeDelta::hours(6)));
    }

    #[test]
    fn rejects_missing_or_zero_durations() {
        assert_eq!(parse_best_before(""), None);
        assert_eq!(parse_best_before("2 days"), None);
        assert_eq!(parse_best_before("0 hours"), None);
        assert_eq!(parse_best_before("hours"), None);
    }

    #[test]
    fn missing_inputs_render_placeholder() {
        assert_eq!(Freshness::evaluate(None, Some("4 hours"), t0()), Freshness::Unknown);
        assert_eq!(Freshness::evaluate(Some(t0()), None, t0()), Freshness::Unknown);
        assert_eq!(Freshness::evaluate(Some(t0()), Some("soon"), t0()), Freshness::Unknown);
        assert_eq!(Freshness::Unknown.to_string(), "—");
    }

    #[test]
    fn remaining_decreases_monotonically() {
        let duration = TimeDelta::hours(3);
        let mut last = remaining(t0(), duration, t0());
        for step in 1..=200 {
            let now = t0() + TimeDelta::seconds(step * 97);
            let r = remaining(t0(), duration, now);
            assert!(r < last);
            last = r;
        }
    }

    #[test]
    fn spoiled_at_and_after_deadline() {
        let deadline = t0() + TimeDelta::hours(2);
        assert_eq!(
            Freshness::evaluate(Some(t0()), Some("2 hours"), deadline),
            Freshness::Spoiled
        );
        assert_eq!(
            Freshness::evaluate(Some(t0()), Some("2 hours"), deadline + TimeDelta::days(3)),
            Freshness::Spoiled
        );
        let just_before = deadline - TimeDelta::milliseconds(1);
        assert!(!Freshness::evaluate(Some(t0()), Some("2 hours"), just_before).is_spoiled());
    }

    #[test]
    fn urgency_boundaries_are_exact() {
        let at_left = |left: TimeDelta| {
            let now = t0() + TimeDelta::hours(10) - left;
            Freshness::evaluate(Some(t0()), Some("10 hours"), now).urgency()
        };
        assert_eq!(at_left(TimeDelta::hours(2)), Some(Urgency::Warning));
        assert_eq!(
            at_left(TimeDelta::hours(2) - TimeDelta::milliseconds(1)),
            Some(Urgency::Critical)
        );
        assert_eq!(at_left(TimeDelta::hours(5)), Some(Urgency::Good));
        assert_eq!(
            at_left(TimeDelta::hours(5) - TimeDelta::milliseconds(1)),
            Some(Urgency::Warning)
        );
        assert_eq!(at_left(TimeDelta::hours(10)), Some(Urgency::Good));
    }

    #[test]
    fn formats_by_largest_unit() {
        assert_eq!(format_remaining(TimeDelta::minutes(192)).as_deref(), Some("3h 12m"));
        assert_eq!(format_remaining(TimeDelta::seconds(249)).as_deref(), Some("4m 9s"));
        assert_eq!(format_remaining(TimeDelta::milliseconds(42_900)).as_deref(), Some("42s"));
        assert_eq!(format_remaining(TimeDelta::zero()), None);
        assert_eq!(format_remaining(TimeDelta::seconds(-5)), None);
    }

    #[test]
    fn bar_tracks_fraction_left() {
        let now = t0() + TimeDelta::hours(3);
        let f = Freshness::evaluate(Some(t0()), Some("4 hours"), now);
        assert_eq!(f.percent(), 25.0);
        assert_eq!(f.bar(8), "██░░░░░░");
        assert_eq!(Freshness::Spoiled.bar(4), "░░░░");
    }
}
