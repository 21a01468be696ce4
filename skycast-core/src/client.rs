use anyhow::{Context, Result, anyhow, bail};
use reqwest::Client;
use serde::Deserialize;
use std::{fmt, time::Duration};

use crate::{
    adapter::normalize,
    config::{Config, DEFAULT_BASE_URL, DEFAULT_FORECAST_DAYS},
    model::NormalizedSnapshot,
    raw::RawProviderPayload,
};

/// What to ask the provider for: a place name or a coordinate pair.
#[derive(Debug, Clone, PartialEq)]
pub enum LocationQuery {
    City(String),
    Coordinates { lat: f64, lon: f64 },
}

impl LocationQuery {
    /// `"lat,lon"` becomes coordinates; anything else is treated as a city.
    pub fn parse(input: &str) -> Result<Self> {
        let input = input.trim();
        if input.is_empty() {
            bail!("Missing city or coordinates");
        }

        if let Some((lat, lon)) = input.split_once(',') {
            if let (Ok(lat), Ok(lon)) = (lat.trim().parse::<f64>(), lon.trim().parse::<f64>()) {
                return Ok(LocationQuery::Coordinates { lat, lon });
            }
        }

        Ok(LocationQuery::City(input.to_string()))
    }
}

impl fmt::Display for LocationQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocationQuery::City(name) => f.write_str(name),
            LocationQuery::Coordinates { lat, lon } => write!(f, "{lat},{lon}"),
        }
    }
}

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Fetches `forecast.json` (current + forecast + air quality) from WeatherAPI.com.
#[derive(Debug, Clone)]
pub struct WeatherApiClient {
    api_key: String,
    base_url: String,
    days: u8,
    http: Client,
}

impl WeatherApiClient {
    pub fn new(api_key: String) -> Result<Self> {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(api_key: String, base_url: &str) -> Result<Self> {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            days: DEFAULT_FORECAST_DAYS,
            http,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let mut client = Self::with_base_url(config.resolve_api_key()?, config.base_url())?;
        client.days = config.forecast_days();
        Ok(client)
    }

    pub async fn fetch_raw(&self, query: &LocationQuery) -> Result<RawProviderPayload> {
        let url = format!("{}/forecast.json", self.base_url);
        let q = query.to_string();
        let days = self.days.to_string();

        tracing::debug!(%url, query = %q, days = self.days, "Requesting forecast");

        let res = self
            .http
            .get(&url)
            .query(&[
                ("key", self.api_key.as_str()),
                ("q", q.as_str()),
                ("days", days.as_str()),
                ("aqi", "yes"),
                ("alerts", "no"),
            ])
            .send()
            .await
            .context("Failed to send request to WeatherAPI.com (forecast)")?;

        let status = res.status();
        let body = res.text().await.context("Failed to read WeatherAPI forecast response body")?;

        tracing::debug!(%status, bytes = body.len(), "Forecast response received");

        if !status.is_success() {
            return Err(anyhow!(
                "WeatherAPI forecast request failed with status {}: {}",
                status,
                provider_message(&body).unwrap_or_else(|| truncate_body(&body)),
            ));
        }

        Ok(RawProviderPayload::from_json(&body)?)
    }

    pub async fn fetch_snapshot(&self, query: &LocationQuery) -> Result<NormalizedSnapshot> {
        let raw = self.fetch_raw(query).await?;
        Ok(normalize(&raw)?)
    }
}

#[derive(Debug, Deserialize)]
struct WaErrorBody {
    error: WaErrorDetail,
}

#[derive(Debug, Deserialize)]
struct WaErrorDetail {
    message: String,
}

fn provider_message(body: &str) -> Option<String> {
    serde_json::from_str::<WaErrorBody>(body).ok().map(|b| b.error.message)
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.chars().count() > MAX {
        format!("{}...", body.chars().take(MAX).collect::<String>())
    } else {
        body.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AdapterError;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn minimal_payload() -> serde_json::Value {
        let day = |epoch: i64| {
            json!({
                "date_epoch": epoch,
                "day": { "maxtemp_c": 14.0, "mintemp_c": 6.0, "condition": { "text": "Sunny", "code": 1000 } },
                "hour": [
                    { "time_epoch": epoch + 3600, "temp_c": 7.0, "is_day": 0, "condition": { "text": "Clear", "code": 1000 } }
                ]
            })
        };
        json!({
            "location": { "name": "Oslo", "region": "Oslo", "country": "Norway" },
            "current": {
                "last_updated_epoch": 1_700_000_000,
                "temp_c": 8.0, "feelslike_c": 6.5, "humidity": 70, "pressure_mb": 1020.0,
                "wind_kph": 18.0, "is_day": 1,
                "condition": { "text": "Sunny", "code": 1000 }
            },
            "forecast": { "forecastday": [day(1_700_000_000), day(1_700_086_400)] }
        })
    }

    #[test]
    fn parse_location_queries() {
        assert_eq!(
            LocationQuery::parse(" London ").unwrap(),
            LocationQuery::City("London".to_string())
        );
        assert_eq!(
            LocationQuery::parse("51.5, -0.12").unwrap(),
            LocationQuery::Coordinates { lat: 51.5, lon: -0.12 }
        );
        assert_eq!(
            LocationQuery::parse("Washington, DC").unwrap(),
            LocationQuery::City("Washington, DC".to_string())
        );
        assert!(LocationQuery::parse("   ").is_err());
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        let body = "é".repeat(300);
        let out = truncate_body(&body);
        assert!(out.ends_with("..."));
        assert_eq!(out.chars().count(), 203);
    }

    #[tokio::test]
    async fn fetch_snapshot_normalizes_response() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/forecast.json"))
            .and(query_param("key", "TEST"))
            .and(query_param("q", "Oslo"))
            .and(query_param("days", "7"))
            .and(query_param("aqi", "yes"))
            .respond_with(ResponseTemplate::new(200).set_body_json(minimal_payload()))
            .mount(&server)
            .await;

        let client = WeatherApiClient::with_base_url("TEST".into(), &server.uri()).unwrap();
        let snapshot = client.fetch_snapshot(&LocationQuery::City("Oslo".into())).await.unwrap();

        assert_eq!(snapshot.current.location_name, "Oslo");
        assert_eq!(snapshot.current.wind_speed, 5.0);
        assert_eq!(snapshot.hourly.len(), 2);
        assert_eq!(snapshot.daily.len(), 2);
    }

    #[tokio::test]
    async fn provider_error_message_is_surfaced() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/forecast.json"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": { "code": 1006, "message": "No matching location found." }
            })))
            .mount(&server)
            .await;

        let client = WeatherApiClient::with_base_url("TEST".into(), &server.uri()).unwrap();
        let err = client.fetch_raw(&LocationQuery::City("Nowhere".into())).await.unwrap_err();

        let msg = err.to_string();
        assert!(msg.contains("400"));
        assert!(msg.contains("No matching location found."));
    }

    #[tokio::test]
    async fn structurally_broken_payload_keeps_adapter_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/forecast.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "location": {} })))
            .mount(&server)
            .await;

        let client = WeatherApiClient::with_base_url("TEST".into(), &server.uri()).unwrap();
        let err = client.fetch_snapshot(&LocationQuery::City("Oslo".into())).await.unwrap_err();

        assert!(matches!(
            err.downcast_ref::<AdapterError>(),
            Some(AdapterError::MalformedUpstreamPayload { .. })
        ));
    }

    #[tokio::test]
    async fn from_config_honors_base_url_and_days() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/forecast.json"))
            .and(query_param("days", "3"))
            .respond_with(ResponseTemplate::new(200).set_body_json(minimal_payload()))
            .expect(1)
            .mount(&server)
            .await;

        let config = Config {
            api_key: Some("FROM-FILE".into()),
            base_url: Some(format!("{}/", server.uri())),
            forecast_days: Some(3),
            ..Default::default()
        };
        let client = WeatherApiClient::from_config(&config).unwrap();
        let snapshot = client.fetch_snapshot(&LocationQuery::City("Oslo".into())).await.unwrap();

        assert_eq!(snapshot.daily.len(), 2);
    }

    #[test]
    fn client_construction_returns_result() {
        let client = WeatherApiClient::new("KEY".into()).unwrap();
        assert_eq!(client.base_url, DEFAULT_BASE_URL);
        assert_eq!(client.days, DEFAULT_FORECAST_DAYS);
    }
}
