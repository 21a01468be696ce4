//! Serde model of the WeatherAPI.com `forecast.json` response.
//!
//! Only the fields the adapter reads are declared. The two blocks the
//! adapter cannot work without (`current` and `forecast.forecastday`) are
//! optional here so their absence is reported as an [`AdapterError`]
//! rather than a generic serde failure.
//!
//! Everything optional is read leniently: an optional block that does not
//! parse becomes `None`, numbers may arrive as numeric strings, and a
//! forecast day or hour entry that cannot be read is dropped from its list
//! instead of failing the payload.

use serde::{Deserialize, Deserializer, de::DeserializeOwned};
use serde_json::Value;

use crate::error::AdapterError;

#[derive(Debug, Clone, Deserialize)]
pub struct RawProviderPayload {
    #[serde(default, deserialize_with = "or_none")]
    pub location: Option<WaLocation>,
    #[serde(default)]
    pub current: Option<WaCurrent>,
    #[serde(default)]
    pub forecast: Option<WaForecast>,
}

impl RawProviderPayload {
    pub fn from_json(body: &str) -> Result<Self, AdapterError> {
        serde_json::from_str(body).map_err(|e| {
            tracing::warn!("Rejecting upstream payload: {e}");
            AdapterError::malformed(e.to_string())
        })
    }

    pub fn from_value(value: Value) -> Result<Self, AdapterError> {
        serde_json::from_value(value).map_err(|e| {
            tracing::warn!("Rejecting upstream payload: {e}");
            AdapterError::malformed(e.to_string())
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WaLocation {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WaCondition {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub code: Option<Value>,
}

impl WaCondition {
    /// Upstream code, if it is an integral number that fits `i32`.
    pub fn code(&self) -> Option<i32> {
        lenient_number(self.code.as_ref())
            .filter(|c| c.fract() == 0.0 && *c >= i32::MIN as f64 && *c <= i32::MAX as f64)
            .map(|c| c as i32)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct WaAirQuality {
    #[serde(rename = "us-epa-index", default)]
    pub us_epa_index: Option<Value>,
}

impl WaAirQuality {
    /// US EPA index rounded to 1..=6; anything outside that range is ignored.
    pub fn epa_index(&self) -> Option<u8> {
        lenient_number(self.us_epa_index.as_ref())
            .map(f64::round)
            .filter(|i| (1.0..=6.0).contains(i))
            .map(|i| i as u8)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct WaCurrent {
    pub last_updated_epoch: i64,
    pub temp_c: f64,
    pub feelslike_c: f64,
    pub humidity: f64,
    pub pressure_mb: f64,
    pub wind_kph: f64,
    #[serde(default)]
    pub vis_km: Option<Value>,
    #[serde(default)]
    pub is_day: Option<Value>,
    #[serde(default, deserialize_with = "or_none")]
    pub condition: Option<WaCondition>,
    #[serde(default, deserialize_with = "or_none")]
    pub air_quality: Option<WaAirQuality>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WaForecast {
    #[serde(default, deserialize_with = "readable_entries")]
    pub forecastday: Option<Vec<WaForecastDay>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WaForecastDay {
    pub date_epoch: i64,
    pub day: WaDay,
    #[serde(default, deserialize_with = "readable_entries")]
    pub hour: Option<Vec<WaForecastHour>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WaDay {
    pub maxtemp_c: f64,
    pub mintemp_c: f64,
    /// Number or numeric string depending on API version.
    #[serde(default)]
    pub daily_chance_of_rain: Option<Value>,
    #[serde(default, deserialize_with = "or_none")]
    pub condition: Option<WaCondition>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WaForecastHour {
    pub time_epoch: i64,
    pub temp_c: f64,
    #[serde(default)]
    pub is_day: Option<Value>,
    #[serde(default, deserialize_with = "or_none")]
    pub condition: Option<WaCondition>,
    /// Number or numeric string depending on API version.
    #[serde(default)]
    pub chance_of_rain: Option<Value>,
}

/// A number, or a string holding one.
pub fn lenient_number(value: Option<&Value>) -> Option<f64> {
    let parsed = match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|n| n.is_finite())
}

/// WeatherAPI sends `is_day` as 0/1. Absent or unreadable means day.
pub fn is_daytime(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(b)) => *b,
        other => lenient_number(other).is_none_or(|n| n != 0.0),
    }
}

fn or_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| match serde_json::from_value(v) {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            tracing::debug!("Ignoring unreadable optional block: {e}");
            None
        }
    }))
}

fn readable_entries<'de, D, T>(deserializer: D) -> Result<Option<Vec<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let entries = Option::<Vec<Value>>::deserialize(deserializer)?;
    Ok(entries.map(|entries| {
        entries
            .into_iter()
            .filter_map(|entry| match serde_json::from_value(entry) {
                Ok(parsed) => Some(parsed),
                Err(e) => {
                    tracing::debug!("Skipping unreadable forecast entry: {e}");
                    None
                }
            })
            .collect()
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn missing_blocks_deserialize_as_none() {
        let raw = RawProviderPayload::from_value(json!({})).expect("empty object is accepted");
        assert!(raw.location.is_none());
        assert!(raw.current.is_none());
        assert!(raw.forecast.is_none());
    }

    #[test]
    fn wrong_type_in_required_field_is_malformed() {
        let err = RawProviderPayload::from_json(r#"{"current": {"temp_c": "hot"}}"#).unwrap_err();
        assert!(err.to_string().contains("Malformed upstream payload"));
    }

    #[test]
    fn not_json_is_malformed() {
        let err = RawProviderPayload::from_json("<html>").unwrap_err();
        assert!(matches!(err, AdapterError::MalformedUpstreamPayload { .. }));
    }

    #[test]
    fn epa_index_accepts_floats_and_strings() {
        let read = |v: Value| {
            serde_json::from_value::<WaAirQuality>(json!({ "us-epa-index": v, "pm2_5": 12.4 }))
                .unwrap()
                .epa_index()
        };
        assert_eq!(read(json!(3)), Some(3));
        assert_eq!(read(json!(2.0)), Some(2));
        assert_eq!(read(json!("4")), Some(4));
        assert_eq!(read(json!(0)), None);
        assert_eq!(read(json!(9)), None);
        assert_eq!(read(json!("bad")), None);
        assert_eq!(read(Value::Null), None);
    }

    #[test]
    fn condition_code_must_be_integral() {
        let cond = |code: Value| WaCondition { text: None, code: Some(code) }.code();
        assert_eq!(cond(json!(1183)), Some(1183));
        assert_eq!(cond(json!(1000.0)), Some(1000));
        assert_eq!(cond(json!("1003")), Some(1003));
        assert_eq!(cond(json!(1.5)), None);
        assert_eq!(cond(json!(1e12)), None);
        assert_eq!(cond(json!({})), None);
    }

    #[test]
    fn day_flag_parsing() {
        assert!(is_daytime(None));
        assert!(is_daytime(Some(&json!(1))));
        assert!(!is_daytime(Some(&json!(0))));
        assert!(!is_daytime(Some(&json!(false))));
        assert!(is_daytime(Some(&json!("?"))));
    }

    #[test]
    fn unreadable_optional_blocks_become_none() {
        let raw = RawProviderPayload::from_value(json!({
            "location": "London",
            "current": {
                "last_updated_epoch": 1, "temp_c": 1.0, "feelslike_c": 1.0, "humidity": 1,
                "pressure_mb": 1.0, "wind_kph": 1.0,
                "condition": [1, 2],
                "air_quality": 7
            },
            "forecast": { "forecastday": [] }
        }))
        .unwrap();

        assert!(raw.location.is_none());
        let current = raw.current.unwrap();
        assert!(current.condition.is_none());
        assert!(current.air_quality.is_none());
    }

    #[test]
    fn unreadable_entries_are_dropped() {
        let forecast: WaForecast = serde_json::from_value(json!({
            "forecastday": [
                { "date_epoch": 10, "day": { "maxtemp_c": 3.0, "mintemp_c": 1.0 },
                  "hour": [ { "time_epoch": 11, "temp_c": 2.0 }, { "temp_c": 2.0 }, null ] },
                { "date_epoch": "tomorrow" },
            ]
        }))
        .unwrap();

        let days = forecast.forecastday.unwrap();
        assert_eq!(days.len(), 1);
        assert_eq!(days[0].hour.as_ref().map(Vec::len), Some(1));
        assert!(days[0].day.condition.is_none());
    }
}
