//! Weather lookup via wttr.in.
//!
//! Fetches the `j1` JSON report for a place and formats it as concise
//! bullets. Used by the weather skill when live lookups are enabled; any
//! failure is `None` and the skill produces its offline text instead.

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;

#[derive(Deserialize, Default)]
struct WttrReport {
    #[serde(default)]
    nearest_area: Vec<Area>,
    #[serde(default)]
    current_condition: Vec<Condition>,
    #[serde(default)]
    weather: Vec<Day>,
}

#[derive(Deserialize, Default)]
struct Area {
    #[serde(rename = "areaName", default)]
    area_name: Vec<Value>,
    #[serde(default)]
    country: Vec<Value>,
}

#[derive(Deserialize, Default)]
struct Value {
    #[serde(default)]
    value: String,
}

#[derive(Deserialize, Default)]
struct Condition {
    #[serde(rename = "temp_C", default)]
    temp_c: String,
    #[serde(rename = "temp_F", default)]
    temp_f: String,
    #[serde(rename = "FeelsLikeC", default)]
    feels_c: String,
    #[serde(rename = "FeelsLikeF", default)]
    feels_f: String,
    #[serde(rename = "windspeedKmph", default)]
    wind_kph: String,
    #[serde(rename = "windspeedMiles", default)]
    wind_mph: String,
    #[serde(default)]
    humidity: String,
    #[serde(rename = "weatherDesc", default)]
    desc: Vec<Value>,
}

#[derive(Deserialize, Default)]
struct Day {
    #[serde(rename = "maxtempC", default)]
    max_c: String,
    #[serde(rename = "mintempC", default)]
    min_c: String,
    #[serde(rename = "maxtempF", default)]
    max_f: String,
    #[serde(rename = "mintempF", default)]
    min_f: String,
}

/// wttr.in weather client.
#[derive(Debug, Clone)]
pub struct WeatherClient {
    http: Client,
}

impl WeatherClient {
    pub fn new(user_agent: &str) -> Option<Self> {
        Client::builder()
            .user_agent(user_agent)
            .timeout(Duration::from_secs(8))
            .build()
            .ok()
            .map(|http| Self { http })
    }

    /// Current conditions for `place` as bullet lines, or `None` on any
    /// failure.
    pub async fn current(&self, place: &str) -> Option<String> {
        let url = format!("https://wttr.in/{}?format=j1", urlencode(place));
        let response = self.http.get(&url).send().await.ok()?;
        if !response.status().is_success() {
            tracing::debug!("weather lookup returned status {}", response.status());
            return None;
        }
        let report: WttrReport = response.json().await.ok()?;
        format_report(&report, place)
    }
}

fn format_report(report: &WttrReport, place: &str) -> Option<String> {
    let cur = report.current_condition.first()?;

    let loc = report
        .nearest_area
        .first()
        .map(|a| {
            a.area_name
                .iter()
                .chain(a.country.iter())
                .map(|v| v.value.as_str())
                .filter(|v| !v.is_empty())
                .collect::<Vec<_>>()
                .join(", ")
        })
        .filter(|l| !l.is_empty())
        .unwrap_or_else(|| place.to_string());

    let desc = cur.desc.first().map(|v| v.value.as_str()).unwrap_or("");

    let mut lines = vec![
        format!("- {}", loc),
        format!(
            "- Now: {}°C/{}°F (feels {}°C/{}°F); {}",
            cur.temp_c, cur.temp_f, cur.feels_c, cur.feels_f, desc
        ),
    ];
    if !cur.humidity.is_empty() {
        lines.push(format!("- Humidity: {}%", cur.humidity));
    }
    if !cur.wind_kph.is_empty() || !cur.wind_mph.is_empty() {
        lines.push(format!("- Wind: {} km/h ({} mph)", cur.wind_kph, cur.wind_mph));
    }
    if let Some(day) = report.weather.first() {
        lines.push(format!(
            "- Today: high {}°C/{}°F, low {}°C/{}°F",
            day.max_c, day.max_f, day.min_c, day.min_f
        ));
    }
    Some(lines.join("\n"))
}

/// Percent-encode a place name for the wttr.in path.
fn urlencode(s: &str) -> String {
    s.chars()
        .flat_map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '~') {
                vec![c.to_string()]
            } else {
                c.to_string().bytes().map(|b| format!("%{:02X}", b)).collect()
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "nearest_area": [{"areaName": [{"value": "Oslo"}], "country": [{"value": "Norway"}]}],
        "current_condition": [{
            "temp_C": "4", "temp_F": "39", "FeelsLikeC": "1", "FeelsLikeF": "34",
            "windspeedKmph": "13", "windspeedMiles": "8", "humidity": "81",
            "weatherDesc": [{"value": "Light rain"}]
        }],
        "weather": [{"maxtempC": "6", "mintempC": "2", "maxtempF": "43", "mintempF": "36"}]
    }"#;

    #[test]
    fn test_format_report() {
        let report: WttrReport = serde_json::from_str(SAMPLE).unwrap();
        let text = format_report(&report, "oslo").unwrap();
        assert!(text.starts_with("- Oslo, Norway"));
        assert!(text.contains("4°C/39°F"));
        assert!(text.contains("Humidity: 81%"));
        assert!(text.contains("high 6°C/43°F"));
    }

    #[test]
    fn test_format_report_empty() {
        let report = WttrReport::default();
        assert!(format_report(&report, "nowhere").is_none());
    }

    #[test]
    fn test_urlencode() {
        assert_eq!(urlencode("new york"), "new%20york");
        assert_eq!(urlencode("oslo"), "oslo");
    }
}
