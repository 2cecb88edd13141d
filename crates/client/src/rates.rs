//! Live currency rate lookup via frankfurter.app.
//!
//! Used by the fx skill when live lookups are enabled. Any failure,
//! including a missing rate in the response, is `None`; the skill falls
//! back to its offline fixture table.

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;

#[derive(Deserialize)]
struct RatesResponse {
    #[serde(default)]
    rates: std::collections::HashMap<String, f64>,
}

/// Frankfurter rate client.
#[derive(Debug, Clone)]
pub struct RateClient {
    http: Client,
}

impl RateClient {
    /// Build a client with a short, bounded timeout; a rate lookup should
    /// never hold up the skill pass.
    pub fn new(user_agent: &str) -> Option<Self> {
        Client::builder()
            .user_agent(user_agent)
            .timeout(Duration::from_millis(1500))
            .build()
            .ok()
            .map(|http| Self { http })
    }

    /// Convert `amount` from `src` to `dst`, returning the converted value.
    pub async fn convert(&self, amount: f64, src: &str, dst: &str) -> Option<f64> {
        let url = format!(
            "https://api.frankfurter.app/latest?amount={}&from={}&to={}",
            amount,
            src.to_uppercase(),
            dst.to_uppercase()
        );

        let response = self.http.get(&url).send().await.ok()?;
        if !response.status().is_success() {
            tracing::debug!("rate lookup returned status {}", response.status());
            return None;
        }

        let body: RatesResponse = response.json().await.ok()?;
        body.rates.get(&dst.to_uppercase()).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_builds() {
        assert!(RateClient::new("kestrel/0.1").is_some());
    }

    #[test]
    fn test_response_shape() {
        let body: RatesResponse = serde_json::from_str(r#"{"amount":100.0,"base":"USD","rates":{"EUR":92.3}}"#).unwrap();
        assert_eq!(body.rates.get("EUR").copied(), Some(92.3));
    }
}
