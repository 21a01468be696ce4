//! Core library for the `skycast` CLI.
//!
//! This crate defines:
//! - Condition-code to icon mapping
//! - The forecast adapter that turns one WeatherAPI.com response into a
//!   provider-agnostic snapshot
//! - The advisory engine (activity ratings, alerts, allergy outlook)
//! - Settings documents, configuration and the upstream client
//!
//! Normalization and advisory functions are pure and synchronous. Only
//! [`client`] performs I/O.

pub mod adapter;
pub mod advisory;
pub mod client;
pub mod config;
pub mod error;
pub mod icon;
pub mod model;
pub mod raw;
pub mod settings;
pub mod units;

pub use adapter::{normalize, normalize_json};
pub use advisory::{
    ActivityKind, ActivityRating, Advisory, Alert, AlertRuleSet, AlertSeverity, AllergyLevel,
    advise, classify_alert, rate_activities,
};
pub use client::{LocationQuery, WeatherApiClient};
pub use config::Config;
pub use error::{AdapterError, SettingsError};
pub use icon::{ConditionCategory, IconCode, map_condition_to_icon};
pub use model::{DailyPoint, HourlyPoint, NormalizedCurrent, NormalizedSnapshot};
pub use raw::RawProviderPayload;
pub use settings::{SettingsBook, SettingsDocument, SettingsPatch, UpdatePeriod};
pub use units::UnitSystem;
