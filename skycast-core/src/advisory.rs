//! Rule-based activity ratings and weather alerts.
//!
//! Every classification is an ordered list of `(predicate, outcome)` rules
//! evaluated top to bottom; the first match wins. Reordering a table
//! changes behaviour.
//!
//! Precipitation and storm state come only from the condition text. The
//! substring tests live in [`Conditions`] so the matching strategy can be
//! changed in one place.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::NormalizedCurrent;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityKind {
    Running,
    Jogging,
    Cycling,
    Hiking,
}

impl ActivityKind {
    pub const fn all() -> &'static [ActivityKind] {
        &[ActivityKind::Running, ActivityKind::Jogging, ActivityKind::Cycling, ActivityKind::Hiking]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityKind::Running => "running",
            ActivityKind::Jogging => "jogging",
            ActivityKind::Cycling => "cycling",
            ActivityKind::Hiking => "hiking",
        }
    }
}

impl std::fmt::Display for ActivityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActivityRating {
    Good,
    Fair,
    Poor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AlertSeverity {
    Severe,
    Moderate,
    Minor,
    Safe,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alert {
    pub severity: AlertSeverity,
    pub title: String,
    pub description: String,
}

/// Dust and dander outlook derived from the air-quality index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AllergyLevel {
    Low,
    Moderate,
    High,
    Extreme,
}

/// Values the rules look at, computed once per classification.
#[derive(Debug, Clone, Copy)]
struct Conditions {
    temp: f64,
    wind: f64,
    humidity: u8,
    visibility: f64,
    raining: bool,
    light: bool,
    stormy: bool,
    thunderstorm: bool,
    snowy: bool,
    clear: bool,
    overcast: bool,
}

impl Conditions {
    fn from_current(current: &NormalizedCurrent) -> Self {
        let text = current.condition_text.to_lowercase();
        let has = |needle: &str| text.contains(needle);

        Self {
            temp: current.temperature,
            wind: current.wind_speed,
            humidity: current.humidity,
            visibility: current.visibility_or_default(),
            raining: has("rain"),
            light: has("light"),
            stormy: has("thunder") || has("storm"),
            thunderstorm: has("thunderstorm"),
            snowy: has("snow"),
            clear: has("clear"),
            overcast: has("cloud") || has("overcast") || has("mist") || has("fog"),
        }
    }
}

type Rule<T> = (fn(&Conditions) -> bool, T);

const RUNNING_LADDER: &[Rule<ActivityRating>] = &[
    (|c| c.raining || c.temp > 30.0 || c.temp < 0.0 || c.wind > 10.0, ActivityRating::Poor),
    (|c| c.temp > 25.0 || c.temp < 5.0 || c.wind > 7.0, ActivityRating::Fair),
];

const CYCLING_LADDER: &[Rule<ActivityRating>] = &[
    (|c| c.raining || c.wind > 9.0 || c.temp > 35.0 || c.temp < 2.0, ActivityRating::Poor),
    (|c| c.wind > 6.0 || c.temp > 30.0 || c.temp < 8.0, ActivityRating::Fair),
];

const HIKING_LADDER: &[Rule<ActivityRating>] = &[
    (
        |c| c.raining || c.visibility < 2000.0 || c.temp > 32.0 || c.temp < 0.0,
        ActivityRating::Poor,
    ),
    (|c| c.visibility < 5000.0 || c.temp > 28.0 || c.temp < 5.0, ActivityRating::Fair),
];

fn ladder(kind: ActivityKind) -> &'static [Rule<ActivityRating>] {
    match kind {
        ActivityKind::Running | ActivityKind::Jogging => RUNNING_LADDER,
        ActivityKind::Cycling => CYCLING_LADDER,
        ActivityKind::Hiking => HIKING_LADDER,
    }
}

fn first_match<T: Copy>(rules: &[Rule<T>], conditions: &Conditions) -> Option<T> {
    rules.iter().find(|(applies, _)| applies(conditions)).map(|(_, outcome)| *outcome)
}

fn rate_with(kind: ActivityKind, conditions: &Conditions) -> ActivityRating {
    first_match(ladder(kind), conditions).unwrap_or(ActivityRating::Good)
}

pub fn rate_activity(kind: ActivityKind, current: &NormalizedCurrent) -> ActivityRating {
    rate_with(kind, &Conditions::from_current(current))
}

pub fn rate_activities(current: &NormalizedCurrent) -> BTreeMap<ActivityKind, ActivityRating> {
    let conditions = Conditions::from_current(current);
    ActivityKind::all().iter().map(|kind| (*kind, rate_with(*kind, &conditions))).collect()
}

/// Which optional alert rules participate in classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AlertRuleSet {
    /// Emit a Minor alert for cloudy or misty conditions.
    pub cloud_advisory: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AlertKind {
    ExtremeTemperature,
    HighWind,
    Thunderstorm,
    LowVisibility,
    TemperatureAdvisory,
    HeavyRain,
    Windy,
    HighHumidity,
    Overcast,
    PerfectWeather,
}

const ALERT_CASCADE: &[Rule<AlertKind>] = &[
    (|c| c.temp > 40.0 || c.temp < -5.0, AlertKind::ExtremeTemperature),
    (|c| c.wind > 15.0, AlertKind::HighWind),
    (|c| c.stormy, AlertKind::Thunderstorm),
    (|c| c.visibility < 1000.0, AlertKind::LowVisibility),
    (|c| c.temp > 35.0 || c.temp < 5.0, AlertKind::TemperatureAdvisory),
    (|c| c.raining && !c.light, AlertKind::HeavyRain),
    (|c| c.wind > 10.0, AlertKind::Windy),
    (|c| c.humidity > 85, AlertKind::HighHumidity),
    (|c| c.overcast, AlertKind::Overcast),
    (
        |c| (18.0..=28.0).contains(&c.temp) && c.wind < 5.0 && !c.raining,
        AlertKind::PerfectWeather,
    ),
];

impl AlertKind {
    fn enabled(&self, rules: &AlertRuleSet) -> bool {
        match self {
            AlertKind::Overcast => rules.cloud_advisory,
            _ => true,
        }
    }

    fn into_alert(self, c: &Conditions) -> Alert {
        let (severity, title, description) = match self {
            AlertKind::ExtremeTemperature => (
                AlertSeverity::Severe,
                "Extreme Temperature",
                if c.temp > 40.0 {
                    "Dangerously hot conditions. Stay indoors, stay hydrated, and avoid outdoor activities."
                } else {
                    "Extreme cold conditions. Bundle up and limit outdoor exposure."
                },
            ),
            AlertKind::HighWind => (
                AlertSeverity::Severe,
                "High Wind",
                "Strong winds detected. Secure loose objects and avoid outdoor activities.",
            ),
            AlertKind::Thunderstorm => (
                AlertSeverity::Severe,
                "Thunderstorm Warning",
                "Thunderstorm activity detected. Stay indoors and avoid open areas.",
            ),
            AlertKind::LowVisibility => (
                AlertSeverity::Severe,
                "Low Visibility",
                "Severe fog or mist. Drive carefully and use headlights.",
            ),
            AlertKind::TemperatureAdvisory => (
                AlertSeverity::Moderate,
                "Temperature Advisory",
                if c.temp > 35.0 {
                    "Very hot weather. Stay hydrated and limit sun exposure."
                } else {
                    "Cold weather. Dress warmly when going outside."
                },
            ),
            AlertKind::HeavyRain => (
                AlertSeverity::Moderate,
                "Heavy Rain Advisory",
                "Heavy rainfall expected. Carry an umbrella and drive carefully.",
            ),
            AlertKind::Windy => (
                AlertSeverity::Moderate,
                "Windy Conditions",
                "Moderate winds. Secure lightweight outdoor items.",
            ),
            AlertKind::HighHumidity => (
                AlertSeverity::Moderate,
                "High Humidity",
                "Very humid conditions. Stay cool and hydrated.",
            ),
            AlertKind::Overcast => (
                AlertSeverity::Minor,
                "Overcast Skies",
                "Cloudy or misty conditions. Light may be limited outdoors.",
            ),
            AlertKind::PerfectWeather => (
                AlertSeverity::Safe,
                "Perfect Weather",
                "Ideal conditions for outdoor activities. Enjoy your day!",
            ),
        };

        Alert { severity, title: title.to_string(), description: description.to_string() }
    }
}

/// Highest-priority alert under the default rule set.
pub fn classify_alert(current: &NormalizedCurrent) -> Option<Alert> {
    classify_alert_with(current, &AlertRuleSet::default())
}

pub fn classify_alert_with(current: &NormalizedCurrent, rules: &AlertRuleSet) -> Option<Alert> {
    let conditions = Conditions::from_current(current);

    ALERT_CASCADE
        .iter()
        .filter(|(_, kind)| kind.enabled(rules))
        .find(|(applies, _)| applies(&conditions))
        .map(|(_, kind)| kind.into_alert(&conditions))
}

pub fn allergy_level(current: &NormalizedCurrent) -> AllergyLevel {
    match current.air_quality_or_default() {
        i if i >= 4 => AllergyLevel::Extreme,
        3 => AllergyLevel::High,
        2 => AllergyLevel::Moderate,
        _ => AllergyLevel::Low,
    }
}

const INSIGHTS: &[Rule<&str>] = &[
    (
        |c| c.temp > 30.0,
        "High temperatures expected; precautionary hydration and sun protection recommended.",
    ),
    (|c| c.temp > 25.0, "Conditions are favorable for outdoor activities."),
    (|c| c.temp < 0.0, "Freezing conditions detected; ensure adequate thermal protection."),
    (|c| c.temp < 10.0, "Temperatures are low; warm clothing is advisable."),
    (|c| c.raining, "Precipitation expected; carrying an umbrella is recommended."),
    (|c| c.snowy, "Snowfall likely; exercise caution on slippery surfaces."),
    (|c| c.clear, "Visibility is good; optimal conditions for photography/outdoor work."),
    (|c| c.thunderstorm, "Storm activity detected; remaining indoors is safer."),
    (|c| c.wind > 10.0, "High wind speeds detected; secure loose items."),
];

/// One line of general advice for the day.
pub fn daily_insight(current: &NormalizedCurrent) -> &'static str {
    first_match(INSIGHTS, &Conditions::from_current(current)).unwrap_or("Conditions are stable.")
}

/// Everything the advisory engine derives from one snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Advisory {
    pub activity_ratings: BTreeMap<ActivityKind, ActivityRating>,
    pub alert: Option<Alert>,
    pub allergy: AllergyLevel,
    pub insight: String,
}

pub fn advise(current: &NormalizedCurrent) -> Advisory {
    advise_with(current, &AlertRuleSet::default())
}

pub fn advise_with(current: &NormalizedCurrent, rules: &AlertRuleSet) -> Advisory {
    Advisory {
        activity_ratings: rate_activities(current),
        alert: classify_alert_with(current, rules),
        allergy: allergy_level(current),
        insight: daily_insight(current).to_string(),
    }
}
