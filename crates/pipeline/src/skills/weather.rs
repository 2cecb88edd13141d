//! Weather skill.
//!
//! Matches "weather in PLACE" phrasing. A bare "weather" with no place is
//! deliberately not handled so it can flow to later stages. With a live
//! client configured the answer comes from the lookup; otherwise, or on
//! any lookup failure, a friendly offline text is returned.

use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;

use super::Skill;
use kestrel_client::WeatherClient;

static PLACE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(?:what(?:'s| is)\s+)?(?:the\s+)?(?:weather|forecast)\s+(?:in|for|at)\s+(.+?)\s*\??\s*$")
        .unwrap()
});
static BARE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)^\s*(?:weather|forecast)\b\s*\??\s*$").unwrap());

fn offline_text(place: &str) -> String {
    format!(
        "- Weather lookup for \"{}\" did not return results.\n\
         - Tip: try a more specific place (city plus state/country), or enable live lookups.",
        place
    )
}

pub struct WeatherSkill {
    client: Option<WeatherClient>,
}

impl WeatherSkill {
    pub fn new(client: Option<WeatherClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Skill for WeatherSkill {
    fn name(&self) -> &'static str {
        "weather"
    }

    async fn try_handle(&self, query: &str) -> Option<String> {
        if BARE_RE.is_match(query) {
            return None;
        }

        let place = PLACE_RE.captures(query)?.get(1)?.as_str().trim().to_string();
        if place.is_empty() {
            return None;
        }

        if let Some(client) = &self.client
            && let Some(report) = client.current(&place).await
        {
            return Some(report);
        }

        Some(offline_text(&place))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn handle(q: &str) -> Option<String> {
        WeatherSkill::new(None).try_handle(q).await
    }

    #[tokio::test]
    async fn test_place_extracted() {
        let out = handle("what's the weather in Oslo?").await.unwrap();
        assert!(out.contains("\"Oslo\""));
    }

    #[tokio::test]
    async fn test_forecast_phrasing() {
        assert!(handle("forecast for new york").await.is_some());
    }

    #[tokio::test]
    async fn test_bare_weather_not_handled() {
        assert!(handle("weather").await.is_none());
        assert!(handle("weather?").await.is_none());
    }

    #[tokio::test]
    async fn test_unrelated_query() {
        assert!(handle("how do clouds form").await.is_none());
    }
}
