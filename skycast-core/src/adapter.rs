//! Reshapes one raw provider payload into a [`NormalizedSnapshot`].
//!
//! Only a payload without a `current` block or without a
//! `forecast.forecastday` array is rejected. Everything else degrades to
//! documented defaults: visibility 10 000 m, precipitation chance 0,
//! empty region, and an empty hourly window when fewer than two forecast
//! days are present.

use serde_json::Value;

use crate::{
    error::AdapterError,
    icon::{FALLBACK_CATEGORY, IconCode, map_condition_to_icon},
    model::{DailyPoint, HourlyPoint, NormalizedCurrent, NormalizedSnapshot},
    raw::{RawProviderPayload, WaCondition, WaCurrent, WaForecastDay, WaLocation, is_daytime, lenient_number},
};

/// Length of the rolling hourly window.
pub const HOURLY_WINDOW: usize = 24;

/// Upper bound on daily entries.
pub const MAX_DAILY_POINTS: usize = 7;

const KPH_PER_MPS: f64 = 3.6;

pub fn normalize(raw: &RawProviderPayload) -> Result<NormalizedSnapshot, AdapterError> {
    let current = raw
        .current
        .as_ref()
        .ok_or_else(|| AdapterError::malformed("missing current conditions block"))?;
    let days = raw
        .forecast
        .as_ref()
        .and_then(|f| f.forecastday.as_deref())
        .ok_or_else(|| AdapterError::malformed("missing forecast day array"))?;

    let location = raw.location.clone().unwrap_or_default();
    let current = normalize_current(current, &location);
    let hourly = hourly_window(days, current.observed_at_epoch);
    let daily = daily_series(days);

    tracing::debug!(
        location = %current.location_name,
        hourly = hourly.len(),
        daily = daily.len(),
        "Normalized upstream payload"
    );

    Ok(NormalizedSnapshot { current, hourly, daily })
}

/// Parse and normalize a JSON body in one step.
pub fn normalize_json(body: &str) -> Result<NormalizedSnapshot, AdapterError> {
    normalize(&RawProviderPayload::from_json(body)?)
}

fn normalize_current(raw: &WaCurrent, location: &WaLocation) -> NormalizedCurrent {
    let visibility_km = lenient_number(raw.vis_km.as_ref());
    if visibility_km.is_none() {
        tracing::debug!("Upstream visibility missing or unreadable; consumers fall back to the default");
    }

    NormalizedCurrent {
        temperature: raw.temp_c,
        feels_like: raw.feelslike_c,
        humidity: raw.humidity.round().clamp(0.0, 100.0) as u8,
        pressure: raw.pressure_mb,
        wind_speed: (raw.wind_kph / KPH_PER_MPS).max(0.0),
        visibility: visibility_km.map(|km| km.max(0.0) * 1000.0),
        icon_code: icon_for(raw.condition.as_ref(), is_daytime(raw.is_day.as_ref())),
        condition_text: condition_text(raw.condition.as_ref()),
        location_name: location.name.clone().unwrap_or_default(),
        region: location.region.clone().unwrap_or_default(),
        country_code: location.country.clone().unwrap_or_default(),
        air_quality_index: raw.air_quality.as_ref().and_then(|aq| aq.epa_index()),
        observed_at_epoch: raw.last_updated_epoch,
    }
}

/// A missing or non-integral code gets the fallback category.
fn icon_for(condition: Option<&WaCondition>, is_day: bool) -> IconCode {
    match condition.and_then(WaCondition::code) {
        Some(code) => map_condition_to_icon(code, is_day),
        None => IconCode::new(FALLBACK_CATEGORY, is_day),
    }
}

fn condition_text(condition: Option<&WaCondition>) -> String {
    condition.and_then(|c| c.text.clone()).unwrap_or_default()
}

/// Next 24 hours after `observed_at`, drawn from today and tomorrow.
fn hourly_window(days: &[WaForecastDay], observed_at: i64) -> Vec<HourlyPoint> {
    let [today, tomorrow, ..] = days else {
        tracing::debug!(days = days.len(), "Fewer than two forecast days; hourly window is empty");
        return Vec::new();
    };

    let mut points: Vec<HourlyPoint> = [today, tomorrow]
        .into_iter()
        .flat_map(|day| day.hour.as_deref().unwrap_or_default())
        .filter(|h| h.time_epoch > observed_at)
        .map(|h| HourlyPoint {
            epoch_seconds: h.time_epoch,
            temperature: h.temp_c,
            icon_code: icon_for(h.condition.as_ref(), is_daytime(h.is_day.as_ref())),
            precipitation_probability: percent_or_zero(h.chance_of_rain.as_ref()),
        })
        .collect();

    // Upstream hours are chronological already; this keeps the window strict
    // if a provider ever repeats or reorders an hour.
    points.sort_by_key(|p| p.epoch_seconds);
    points.dedup_by_key(|p| p.epoch_seconds);
    points.truncate(HOURLY_WINDOW);
    points
}

/// Daily summaries always carry the day icon.
fn daily_series(days: &[WaForecastDay]) -> Vec<DailyPoint> {
    days.iter()
        .take(MAX_DAILY_POINTS)
        .map(|d| DailyPoint {
            epoch_seconds: d.date_epoch,
            min_temp: d.day.mintemp_c,
            max_temp: d.day.maxtemp_c,
            icon_code: icon_for(d.day.condition.as_ref(), true),
            condition_text: condition_text(d.day.condition.as_ref()),
            precipitation_probability: percent_or_zero(d.day.daily_chance_of_rain.as_ref()),
        })
        .collect()
}

/// Accepts a number or a numeric string; anything else counts as 0.
fn percent_or_zero(value: Option<&Value>) -> u8 {
    match lenient_number(value) {
        Some(p) => p.round().clamp(0.0, 100.0) as u8,
        None => {
            if let Some(v) = value.filter(|v| !v.is_null()) {
                tracing::debug!("Ignoring non-numeric precipitation chance: {v}");
            }
            0
        }
    }
}
