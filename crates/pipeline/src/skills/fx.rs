//! Currency conversion skill.
//!
//! Matches `AMOUNT CCY to CCY` with three-letter ISO codes from a fixed
//! allowlist, so data-size conversions like "2 GiB to MiB" never land
//! here. When a live rate client is configured it is tried first with its
//! own short timeout; otherwise a small fixture table answers, marked
//! "(fixture)" so the reader knows the rate is not live.

use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;

use super::Skill;
use kestrel_client::RateClient;

/// ISO-4217 codes this skill will recognize at all.
const CODES: &[&str] = &[
    "USD", "EUR", "GBP", "JPY", "AUD", "CAD", "CHF", "CNY", "INR", "MXN", "BRL", "KRW", "SEK", "NOK", "NZD", "ZAR",
    "RUB", "HKD", "SGD", "TRY",
];

/// Offline rates relative to USD, the fixture fallback.
const FIXTURE: &[(&str, f64)] = &[("USD", 1.0), ("EUR", 0.92), ("GBP", 0.79), ("JPY", 150.0)];

static CONVERT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b([0-9][0-9_,]*(?:\.[0-9]+)?)\s*([A-Za-z]{3})\s*(?:to|in|->|→)\s*([A-Za-z]{3})\b").unwrap()
});

/// Tokens that mark a query as some other skill's business.
const BLOCKED: &[&str] = &["weather", "forecast", "time", "date", "hello", "hi"];

pub struct FxSkill {
    rates: Option<RateClient>,
}

impl FxSkill {
    pub fn new(rates: Option<RateClient>) -> Self {
        Self { rates }
    }

    fn parse(query: &str) -> Option<(f64, String, String)> {
        let ql = query.to_lowercase();
        if BLOCKED.iter().any(|tok| ql.contains(tok)) {
            return None;
        }

        let caps = CONVERT_RE.captures(query)?;
        let amount: f64 = caps[1].replace([',', '_'], "").parse().ok()?;
        let src = caps[2].to_uppercase();
        let dst = caps[3].to_uppercase();

        if !CODES.contains(&src.as_str()) || !CODES.contains(&dst.as_str()) {
            return None;
        }
        Some((amount, src, dst))
    }
}

fn fixture_rate(code: &str) -> Option<f64> {
    FIXTURE.iter().find(|(c, _)| *c == code).map(|(_, r)| *r)
}

fn fixture_convert(amount: f64, src: &str, dst: &str) -> Option<String> {
    let out = amount * fixture_rate(dst)? / fixture_rate(src)?;
    Some(format!("- {:.2} {} ≈ {:.2} {} (fixture)", amount, src, out, dst))
}

#[async_trait]
impl Skill for FxSkill {
    fn name(&self) -> &'static str {
        "fx"
    }

    async fn try_handle(&self, query: &str) -> Option<String> {
        let (amount, src, dst) = Self::parse(query)?;

        if src == dst {
            return Some(format!("- {:.2} {} ≈ {:.2} {} (fixture)", amount, src, amount, dst));
        }

        if let Some(rates) = &self.rates
            && let Some(out) = rates.convert(amount, &src, &dst).await
        {
            return Some(format!("- {:.2} {} ≈ {:.2} {} (live)", amount, src, out, dst));
        }

        fixture_convert(amount, &src, &dst)
    }
}
