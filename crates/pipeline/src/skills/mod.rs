//! Deterministic intent skills.
//!
//! Each skill answers one narrow query shape and exposes the single typed
//! capability `try_handle`; there is no scoring or merging across skills.
//! Dispatch order is fixed: currency first so ISO codes are never parsed
//! as physical units, then units, math, time, and weather last. A skill
//! fault is swallowed and treated as "no match".

use async_trait::async_trait;

pub mod fx;
pub mod math;
pub mod time;
pub mod units;
pub mod weather;

pub use fx::FxSkill;
pub use math::MathSkill;
pub use time::TimeSkill;
pub use units::UnitsSkill;
pub use weather::WeatherSkill;

/// One narrow intent handler.
#[async_trait]
pub trait Skill: Send + Sync {
    fn name(&self) -> &'static str;

    /// Handle `query` if it matches this skill's shape. `None` means "not
    /// mine"; a skill must never fail outward.
    async fn try_handle(&self, query: &str) -> Option<String>;
}

/// Ordered skill list with first-match-wins dispatch.
pub struct SkillSet {
    skills: Vec<Box<dyn Skill>>,
}

impl SkillSet {
    /// The standard stack in its fixed order. Live lookups (fx rate,
    /// weather) activate only when the corresponding client is provided.
    pub fn standard(rates: Option<kestrel_client::RateClient>, weather: Option<kestrel_client::WeatherClient>) -> Self {
        Self {
            skills: vec![
                Box::new(FxSkill::new(rates)),
                Box::new(UnitsSkill),
                Box::new(MathSkill),
                Box::new(TimeSkill),
                Box::new(WeatherSkill::new(weather)),
            ],
        }
    }

    /// First non-empty skill result, with the winning skill's name.
    pub async fn dispatch(&self, query: &str) -> Option<(String, &'static str)> {
        for skill in &self.skills {
            if let Some(text) = skill.try_handle(query).await
                && !text.is_empty()
            {
                tracing::debug!("skill {} handled query", skill.name());
                return Some((text, skill.name()));
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offline() -> SkillSet {
        SkillSet::standard(None, None)
    }

    #[tokio::test]
    async fn test_fx_wins_over_units() {
        // "usd" must never be parsed as a physical unit.
        let (text, name) = offline().dispatch("100 USD to EUR").await.unwrap();
        assert_eq!(name, "fx");
        assert!(text.contains("EUR"));
    }

    #[tokio::test]
    async fn test_units_handles_data_codes() {
        let (_, name) = offline().dispatch("2 GiB to MiB").await.unwrap();
        assert_eq!(name, "units");
    }

    #[tokio::test]
    async fn test_math_dispatch() {
        let (text, name) = offline().dispatch("2+2").await.unwrap();
        assert_eq!(name, "math");
        assert!(text.contains("= 4"));
    }

    #[tokio::test]
    async fn test_no_match_falls_through() {
        assert!(offline().dispatch("write a poem about autumn").await.is_none());
    }

    #[tokio::test]
    async fn test_dispatch_deterministic() {
        // Same offline input, byte-identical output across runs.
        let set = offline();
        let a = set.dispatch("5 km to mi").await.unwrap();
        let b = set.dispatch("5 km to mi").await.unwrap();
        assert_eq!(a, b);
    }
}
