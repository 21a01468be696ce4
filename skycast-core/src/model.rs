use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::icon::IconCode;

/// Visibility assumed when the provider does not report one, in metres.
pub const DEFAULT_VISIBILITY_M: f64 = 10_000.0;

/// Air-quality index assumed when the provider does not report one.
pub const DEFAULT_AIR_QUALITY_INDEX: u8 = 1;

/// Current conditions in SI units. Wind is always m/s.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedCurrent {
    pub temperature: f64,
    pub feels_like: f64,
    pub humidity: u8,
    pub pressure: f64,
    pub wind_speed: f64,
    /// Metres.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility: Option<f64>,
    pub icon_code: IconCode,
    pub condition_text: String,
    pub location_name: String,
    pub region: String,
    pub country_code: String,
    /// US EPA index, 1..=6.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub air_quality_index: Option<u8>,
    pub observed_at_epoch: i64,
}

impl NormalizedCurrent {
    pub fn visibility_or_default(&self) -> f64 {
        self.visibility.unwrap_or(DEFAULT_VISIBILITY_M)
    }

    pub fn air_quality_or_default(&self) -> u8 {
        self.air_quality_index.unwrap_or(DEFAULT_AIR_QUALITY_INDEX)
    }

    pub fn observed_at(&self) -> Option<DateTime<Utc>> {
        DateTime::<Utc>::from_timestamp(self.observed_at_epoch, 0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HourlyPoint {
    pub epoch_seconds: i64,
    pub temperature: f64,
    pub icon_code: IconCode,
    pub precipitation_probability: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyPoint {
    /// Date anchor of the forecast day.
    pub epoch_seconds: i64,
    pub min_temp: f64,
    pub max_temp: f64,
    pub icon_code: IconCode,
    pub condition_text: String,
    pub precipitation_probability: u8,
}

/// Provider-independent output of the forecast adapter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedSnapshot {
    pub current: NormalizedCurrent,
    pub hourly: Vec<HourlyPoint>,
    pub daily: Vec<DailyPoint>,
}
