//! Mapping from WeatherAPI.com condition codes to the internal icon vocabulary.
//!
//! The vocabulary is a two-digit category plus a `d`/`n` suffix (`"10d"`,
//! `"01n"`, ...). Codes are partitioned by an ordered table; the first
//! category listing a code wins, and anything not listed falls back to
//! [`ConditionCategory::PartlyCloudy`].
//!
//! Sleet and ice pellets have no icon of their own and are folded into the
//! snow category (`"13"`). The collapse is lossy on purpose.
//! See <https://www.weatherapi.com/docs/weather_conditions.json>.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Closed set of icon categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConditionCategory {
    Clear,
    PartlyCloudy,
    Cloudy,
    Drizzle,
    Rain,
    Thunder,
    Snow,
    Mist,
}

impl ConditionCategory {
    pub fn code(&self) -> &'static str {
        match self {
            ConditionCategory::Clear => "01",
            ConditionCategory::PartlyCloudy => "02",
            ConditionCategory::Cloudy => "04",
            ConditionCategory::Drizzle => "09",
            ConditionCategory::Rain => "10",
            ConditionCategory::Thunder => "11",
            ConditionCategory::Snow => "13",
            ConditionCategory::Mist => "50",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        let category = match code {
            "01" => ConditionCategory::Clear,
            "02" => ConditionCategory::PartlyCloudy,
            "04" => ConditionCategory::Cloudy,
            "09" => ConditionCategory::Drizzle,
            "10" => ConditionCategory::Rain,
            "11" => ConditionCategory::Thunder,
            "13" => ConditionCategory::Snow,
            "50" => ConditionCategory::Mist,
            _ => return None,
        };
        Some(category)
    }
}

/// Ordered partition of the known upstream codes.
const CONDITION_TABLE: &[(&[i32], ConditionCategory)] = &[
    (&[1000], ConditionCategory::Clear),
    (&[1003], ConditionCategory::PartlyCloudy),
    (&[1006, 1009], ConditionCategory::Cloudy),
    (&[1030, 1135, 1147], ConditionCategory::Mist),
    (
        &[1063, 1180, 1183, 1186, 1189, 1192, 1195, 1240, 1243, 1246],
        ConditionCategory::Rain,
    ),
    (&[1150, 1153, 1168, 1171], ConditionCategory::Drizzle),
    (&[1087, 1273, 1276, 1279, 1282], ConditionCategory::Thunder),
    (
        &[1066, 1114, 1117, 1210, 1213, 1216, 1219, 1222, 1225, 1237, 1255, 1258],
        ConditionCategory::Snow,
    ),
    // sleet / ice
    (
        &[1069, 1072, 1198, 1201, 1204, 1207, 1249, 1252, 1261, 1264],
        ConditionCategory::Snow,
    ),
];

/// Category used for any code missing from the table.
pub const FALLBACK_CATEGORY: ConditionCategory = ConditionCategory::PartlyCloudy;

/// Category plus day/night suffix, e.g. `"10d"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IconCode {
    pub category: ConditionCategory,
    pub is_day: bool,
}

impl IconCode {
    pub fn new(category: ConditionCategory, is_day: bool) -> Self {
        Self { category, is_day }
    }

    pub fn suffix(&self) -> char {
        if self.is_day { 'd' } else { 'n' }
    }

    /// Parse a wire token such as `"13n"`.
    pub fn parse(token: &str) -> Option<Self> {
        let (category, suffix) = (token.get(..2)?, token.get(2..)?);
        let category = ConditionCategory::from_code(category)?;
        match suffix {
            "d" => Some(Self::new(category, true)),
            "n" => Some(Self::new(category, false)),
            _ => None,
        }
    }
}

impl fmt::Display for IconCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.category.code(), self.suffix())
    }
}

impl Serialize for IconCode {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for IconCode {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let token = String::deserialize(deserializer)?;
        IconCode::parse(&token)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid icon code '{token}'")))
    }
}

/// Look up the category for an upstream condition code. Total over `i32`.
pub fn category_for_code(code: i32) -> ConditionCategory {
    CONDITION_TABLE
        .iter()
        .find(|(codes, _)| codes.contains(&code))
        .map(|(_, category)| *category)
        .unwrap_or(FALLBACK_CATEGORY)
}

/// Map an upstream condition code and day flag to an icon code.
pub fn map_condition_to_icon(code: i32, is_day: bool) -> IconCode {
    IconCode::new(category_for_code(code), is_day)
}

#[cfg(test)]
mod tests {
    use super::*;

    const RAIN_CODES: &[i32] = &[1063, 1180, 1183, 1186, 1189, 1192, 1195, 1240, 1243, 1246];

    #[test]
    fn clear_day_and_night() {
        assert_eq!(map_condition_to_icon(1000, true).to_string(), "01d");
        assert_eq!(map_condition_to_icon(1000, false).to_string(), "01n");
    }

    #[test]
    fn cloudy_and_overcast_share_category() {
        assert_eq!(map_condition_to_icon(1006, true).to_string(), "04d");
        assert_eq!(map_condition_to_icon(1009, true).to_string(), "04d");
    }

    #[test]
    fn mist_drizzle_thunder() {
        assert_eq!(map_condition_to_icon(1135, false).to_string(), "50n");
        assert_eq!(map_condition_to_icon(1153, true).to_string(), "09d");
        assert_eq!(map_condition_to_icon(1276, true).to_string(), "11d");
    }

    #[test]
    fn rain_suffix_follows_day_flag() {
        for code in RAIN_CODES {
            let day = map_condition_to_icon(*code, true).to_string();
            let night = map_condition_to_icon(*code, false).to_string();
            assert_eq!(day, "10d");
            assert_eq!(night, "10n");
        }
    }

    #[test]
    fn sleet_collapses_into_snow() {
        assert_eq!(map_condition_to_icon(1069, true), map_condition_to_icon(1066, true));
        assert_eq!(map_condition_to_icon(1264, false).to_string(), "13n");
    }

    #[test]
    fn unknown_codes_fall_back_to_partly_cloudy() {
        for code in [i32::MIN, -1, 0, 999, 1001, 1290, i32::MAX] {
            assert_eq!(map_condition_to_icon(code, true).to_string(), "02d");
            assert_eq!(map_condition_to_icon(code, false).to_string(), "02n");
        }
    }

    #[test]
    fn icon_code_parse_and_serde() {
        let icon = IconCode::parse("13n").expect("valid token");
        assert_eq!(icon.category, ConditionCategory::Snow);
        assert!(!icon.is_day);

        assert!(IconCode::parse("03d").is_none());
        assert!(IconCode::parse("01x").is_none());
        assert!(IconCode::parse("1").is_none());

        let json = serde_json::to_string(&icon).unwrap();
        assert_eq!(json, "\"13n\"");
        let back: IconCode = serde_json::from_str(&json).unwrap();
        assert_eq!(back, icon);
    }
}
