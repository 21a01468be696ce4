//! Plain-text report. Unit conversion happens here and nowhere earlier.

use chrono::DateTime;
use std::fmt::{self, Write};

use skycast_core::{
    ActivityKind, ActivityRating, Advisory, AlertSeverity, AllergyLevel, NormalizedSnapshot,
    SettingsDocument, UnitSystem, units::format_visibility,
};

const HOURS_SHOWN: usize = 12;

/// Writes the text report. Hourly rows follow the session's update period,
/// so a period of 3 lists every third hour.
pub fn report(
    out: &mut impl Write,
    snapshot: &NormalizedSnapshot,
    advisory: &Advisory,
    prefs: &SettingsDocument,
    units: UnitSystem,
) -> fmt::Result {
    let c = &snapshot.current;
    let w = &prefs.widgets;

    writeln!(out, "{}", place(&c.location_name, &c.region, &c.country_code))?;
    write!(
        out,
        "  {} ({})  {}",
        c.condition_text,
        c.icon_code,
        units.format_temperature(c.temperature)
    )?;
    if w.feels_like {
        write!(out, ", feels like {}", units.format_temperature(c.feels_like))?;
    }
    writeln!(out)?;

    let mut details = Vec::new();
    if w.wind {
        details.push(format!("Wind {}", units.format_speed(c.wind_speed)));
    }
    if w.humidity {
        details.push(format!("Humidity {}%", c.humidity));
    }
    if w.visibility {
        details.push(format!("Visibility {}", format_visibility(c.visibility_or_default())));
    }
    if w.pressure {
        details.push(format!("Pressure {:.0} hPa", c.pressure));
    }
    // Only a reported index is shown; the default is for the advisory rules.
    if let Some(aqi) = c.air_quality_index.filter(|_| w.aqi) {
        details.push(format!("AQI {aqi}"));
    }
    if !details.is_empty() {
        writeln!(out, "  {}", details.join("   "))?;
    }
    if let Some(observed) = c.observed_at() {
        writeln!(out, "  Updated {}", observed.format("%Y-%m-%d %H:%M UTC"))?;
    }

    if let Some(alert) = &advisory.alert {
        writeln!(
            out,
            "\n[{}] {}: {}",
            severity_label(alert.severity),
            alert.title,
            alert.description
        )?;
    }

    let activities: Vec<String> = ActivityKind::all()
        .iter()
        .filter(|kind| prefs.activities.is_visible(**kind))
        .filter_map(|kind| {
            advisory.activity_ratings.get(kind).map(|r| format!("{kind} {}", rating_label(*r)))
        })
        .collect();
    if !activities.is_empty() {
        writeln!(out, "\nActivities: {}", activities.join(", "))?;
    }
    writeln!(out, "Allergies (dust and dander): {}", allergy_label(advisory.allergy))?;
    writeln!(out, "Insight: {}", advisory.insight)?;

    if !snapshot.hourly.is_empty() {
        writeln!(out, "\nNext hours:")?;
        let stride = usize::from(prefs.update_period.hours()).max(1);
        for h in snapshot.hourly.iter().step_by(stride).take(HOURS_SHOWN) {
            write!(
                out,
                "  {}  {:>5}  {}",
                clock(h.epoch_seconds, "%H:%M"),
                units.format_temperature(h.temperature),
                h.icon_code
            )?;
            if w.precipitation {
                write!(out, "  {:>3}%", h.precipitation_probability)?;
            }
            writeln!(out)?;
        }
    }

    if !snapshot.daily.is_empty() {
        writeln!(out, "\nForecast:")?;
        for d in &snapshot.daily {
            write!(
                out,
                "  {}  {:>5} / {:<5}  {}  {}",
                clock(d.epoch_seconds, "%a %d %b"),
                units.format_temperature(d.min_temp),
                units.format_temperature(d.max_temp),
                d.icon_code,
                d.condition_text
            )?;
            if w.precipitation {
                write!(out, "  {}%", d.precipitation_probability)?;
            }
            writeln!(out)?;
        }
    }

    Ok(())
}

fn place(name: &str, region: &str, country: &str) -> String {
    [name, region, country]
        .iter()
        .filter(|part| !part.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(", ")
}

fn clock(epoch: i64, format: &str) -> String {
    DateTime::from_timestamp(epoch, 0)
        .map(|dt| dt.format(format).to_string())
        .unwrap_or_else(|| "--".to_string())
}

fn severity_label(severity: AlertSeverity) -> &'static str {
    match severity {
        AlertSeverity::Severe => "SEVERE",
        AlertSeverity::Moderate => "ADVISORY",
        AlertSeverity::Minor => "NOTICE",
        AlertSeverity::Safe => "OK",
    }
}

fn rating_label(rating: ActivityRating) -> &'static str {
    match rating {
        ActivityRating::Good => "Good",
        ActivityRating::Fair => "Fair",
        ActivityRating::Poor => "Poor",
    }
}

fn allergy_label(level: AllergyLevel) -> &'static str {
    match level {
        AllergyLevel::Low => "Low",
        AllergyLevel::Moderate => "Moderate",
        AllergyLevel::High => "High",
        AllergyLevel::Extreme => "Extreme",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};
    use skycast_core::{UpdatePeriod, advise, normalize_json};

    const START: i64 = 1_700_006_400; // midnight UTC

    fn payload(forecastday: Value) -> Value {
        json!({
            "location": { "name": "Madrid", "region": "", "country": "Spain" },
            "current": {
                "last_updated_epoch": START,
                "temp_c": 22.0, "feelslike_c": 21.0, "humidity": 40, "pressure_mb": 1015.0,
                "wind_kph": 7.2, "vis_km": 10.0, "is_day": 1,
                "condition": { "text": "Sunny", "code": 1000 }
            },
            "forecast": { "forecastday": forecastday }
        })
    }

    fn two_days() -> Value {
        let day = |index: i64| {
            let date_epoch = START + index * 86_400;
            let hours: Vec<Value> = (0..24)
                .map(|h| {
                    json!({
                        "time_epoch": date_epoch + h * 3600,
                        "temp_c": 15.0, "is_day": 1, "chance_of_rain": 0,
                        "condition": { "text": "Sunny", "code": 1000 }
                    })
                })
                .collect();
            json!({
                "date_epoch": date_epoch,
                "day": { "maxtemp_c": 25.0, "mintemp_c": 12.0, "daily_chance_of_rain": 10,
                         "condition": { "text": "Sunny", "code": 1000 } },
                "hour": hours
            })
        };
        json!([day(0), day(1)])
    }

    fn render(body: Value, prefs: &SettingsDocument, units: UnitSystem) -> String {
        let snapshot = normalize_json(&body.to_string()).unwrap();
        let advisory = advise(&snapshot.current);
        let mut text = String::new();
        report(&mut text, &snapshot, &advisory, prefs, units).unwrap();
        text
    }

    fn hour_rows(text: &str) -> Vec<&str> {
        text.split("Next hours:\n")
            .nth(1)
            .unwrap_or_default()
            .lines()
            .take_while(|line| !line.is_empty())
            .map(|line| line.trim_start().split_whitespace().next().unwrap())
            .collect()
    }

    #[test]
    fn report_respects_units_and_visibility_toggles() {
        let mut prefs = SettingsDocument::default_document();
        prefs.widgets.pressure = false;
        prefs.activities.hiking = false;

        let text = render(payload(json!([])), &prefs, UnitSystem::Imperial);

        assert!(text.starts_with("Madrid, Spain\n"));
        assert!(text.contains("72°F"));
        assert!(text.contains("Wind 4.5 mph"));
        assert!(!text.contains("Pressure"));
        assert!(text.contains("[OK] Perfect Weather"));
        assert!(text.contains("running Good"));
        assert!(!text.contains("hiking"));
        assert!(!text.contains("Next hours"));
    }

    #[test]
    fn aqi_is_shown_only_when_reported() {
        let prefs = SettingsDocument::default_document();

        let text = render(payload(json!([])), &prefs, UnitSystem::Metric);
        assert!(!text.contains("AQI"));

        let mut body = payload(json!([]));
        body["current"]["air_quality"] = json!({ "us-epa-index": 3 });
        let text = render(body.clone(), &prefs, UnitSystem::Metric);
        assert!(text.contains("AQI 3"));

        let mut hidden = SettingsDocument::default_document();
        hidden.widgets.aqi = false;
        assert!(!render(body, &hidden, UnitSystem::Metric).contains("AQI"));
    }

    #[test]
    fn hourly_rows_follow_update_period() {
        let mut prefs = SettingsDocument::default_document();
        prefs.update_period = UpdatePeriod::try_from(1u8).unwrap();
        let hourly = hour_rows(&render(payload(two_days()), &prefs, UnitSystem::Metric)).len();
        assert_eq!(hourly, 12);

        prefs.update_period = UpdatePeriod::try_from(3u8).unwrap();
        let text = render(payload(two_days()), &prefs, UnitSystem::Metric);
        assert_eq!(hour_rows(&text), ["01:00", "04:00", "07:00", "10:00", "13:00", "16:00", "19:00", "22:00"]);

        prefs.update_period = UpdatePeriod::try_from(2u8).unwrap();
        let text = render(payload(two_days()), &prefs, UnitSystem::Metric);
        let rows = hour_rows(&text);
        assert_eq!(rows.len(), 12);
        assert_eq!(rows[..3], ["01:00", "03:00", "05:00"]);
    }

    #[test]
    fn place_skips_empty_parts() {
        assert_eq!(place("Leeds", "", "UK"), "Leeds, UK");
        assert_eq!(place("", "", ""), "");
    }
}
