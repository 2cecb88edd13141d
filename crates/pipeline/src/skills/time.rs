//! Clock and calendar skill.
//!
//! Handles "time now", "date today", "days until YYYY-MM-DD", "what day
//! is YYYY-MM-DD", and "add 2h 30m to 14:10". The date-relative answers
//! are pure functions of an injected "today" so they test without a
//! clock.

use std::sync::LazyLock;

use async_trait::async_trait;
use chrono::{Duration, Local, NaiveDate, NaiveTime};
use regex::Regex;

use super::Skill;

static NOW_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*(?:what(?:'s| is)\s+)?(?:the\s+)?time\s*(?:now)?\s*\?*\s*$").unwrap());
static TODAY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*(?:what(?:'s| is)\s+)?(?:the\s+)?date\s*(?:today)?\s*\?*\s*$").unwrap());
static UNTIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*days?\s+until\s+(\d{4}-\d{2}-\d{2})\s*$").unwrap());
static WEEKDAY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*what\s+day\s+is\s+(\d{4}-\d{2}-\d{2})\s*$").unwrap());
static ADD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*add\s+((?:\d+\s*h)?\s*(?:\d+\s*m)?\s*(?:\d+\s*s)?)\s+to\s+(\d{1,2}:\d{2})\s*$").unwrap()
});
static PART_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)(\d+)\s*([hms])").unwrap());

fn parse_hms(spec: &str) -> Duration {
    let mut out = Duration::zero();
    for caps in PART_RE.captures_iter(spec) {
        let n: i64 = caps[1].parse().unwrap_or(0);
        out += match &caps[2].to_lowercase()[..] {
            "h" => Duration::hours(n),
            "m" => Duration::minutes(n),
            _ => Duration::seconds(n),
        };
    }
    out
}

fn days_until(target: NaiveDate, today: NaiveDate) -> String {
    format!("- days until {}: {}", target, (target - today).num_days())
}

fn weekday_of(date: NaiveDate) -> String {
    format!("- {} is a {}", date, date.format("%A"))
}

fn add_to_clock(spec: &str, clock: &str) -> Option<String> {
    let (h, m) = clock.split_once(':')?;
    let h: u32 = h.parse().ok()?;
    let m: u32 = m.parse().ok()?;
    let base = NaiveTime::from_hms_opt(h % 24, m % 60, 0)?;
    let out = base + parse_hms(spec);
    Some(format!("- {} + {} = {}", clock, spec.trim(), out.format("%H:%M:%S")))
}

fn try_time(query: &str) -> Option<String> {
    if NOW_RE.is_match(query) {
        return Some(format!("- now: {}", Local::now().format("%Y-%m-%d %H:%M:%S")));
    }
    if TODAY_RE.is_match(query) {
        return Some(format!("- today: {}", Local::now().date_naive()));
    }
    if let Some(caps) = UNTIL_RE.captures(query) {
        let target = NaiveDate::parse_from_str(&caps[1], "%Y-%m-%d").ok()?;
        return Some(days_until(target, Local::now().date_naive()));
    }
    if let Some(caps) = WEEKDAY_RE.captures(query) {
        let date = NaiveDate::parse_from_str(&caps[1], "%Y-%m-%d").ok()?;
        return Some(weekday_of(date));
    }
    if let Some(caps) = ADD_RE.captures(query) {
        return add_to_clock(&caps[1], &caps[2]);
    }
    None
}

pub struct TimeSkill;

#[async_trait]
impl Skill for TimeSkill {
    fn name(&self) -> &'static str {
        "time"
    }

    async fn try_handle(&self, query: &str) -> Option<String> {
        try_time(query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_now_and_today_match() {
        assert!(try_time("what's the time now?").unwrap().starts_with("- now: "));
        assert!(try_time("date today").unwrap().starts_with("- today: "));
    }

    #[test]
    fn test_days_until() {
        let today = NaiveDate::from_ymd_opt(2026, 8, 28).unwrap();
        let target = NaiveDate::from_ymd_opt(2026, 9, 1).unwrap();
        assert_eq!(days_until(target, today), "- days until 2026-09-01: 4");
    }

    #[test]
    fn test_weekday() {
        let date = NaiveDate::from_ymd_opt(2025, 10, 21).unwrap();
        assert_eq!(weekday_of(date), "- 2025-10-21 is a Tuesday");
    }

    #[test]
    fn test_add_to_clock() {
        assert_eq!(add_to_clock("2h 30m", "14:10").unwrap(), "- 14:10 + 2h 30m = 16:40:00");
        assert_eq!(add_to_clock("45s", "23:59").unwrap(), "- 23:59 + 45s = 23:59:45");
    }

    #[test]
    fn test_add_wraps_midnight() {
        assert_eq!(add_to_clock("2h", "23:30").unwrap(), "- 23:30 + 2h = 01:30:00");
    }

    #[test]
    fn test_bad_date_rejected() {
        assert!(try_time("days until 2026-13-40").is_none());
        assert!(try_time("what time should I leave").is_none());
    }
}
