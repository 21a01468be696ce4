use anyhow::{Context, anyhow, bail};
use clap::{Parser, Subcommand};
use std::{fs, path::PathBuf};

use skycast_core::{
    AlertRuleSet, Config, LocationQuery, NormalizedSnapshot, SettingsBook, SettingsDocument,
    SettingsPatch, UnitSystem, UpdatePeriod, WeatherApiClient, advisory::advise_with,
    normalize_json, settings::parse_activity,
};

use crate::render;

const DEFAULT_SESSION: &str = "local";

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "skycast", version, about = "Forecast and outdoor advisory CLI")]
pub struct Cli {
    /// Log debug output to stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Options shared by the commands that print a report.
#[derive(Debug, clap::Args)]
pub struct ReportArgs {
    /// Display units; defaults to the session's saved preference.
    #[arg(long)]
    units: Option<UnitSystem>,

    /// Settings session to read preferences from.
    #[arg(long, default_value = DEFAULT_SESSION)]
    session: String,

    /// Print `{snapshot, advisory}` as JSON instead of text.
    #[arg(long)]
    json: bool,

    /// Also raise a minor alert for cloudy or misty skies.
    #[arg(long)]
    cloud_advisory: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the WeatherAPI.com key and a default location.
    Configure,

    /// Fetch and show weather for a city or "lat,lon".
    Show {
        /// City name or coordinates; falls back to the configured default.
        location: Option<String>,

        #[command(flatten)]
        report: ReportArgs,
    },

    /// Normalize and advise on a saved forecast.json payload.
    Inspect {
        /// Path to a WeatherAPI.com forecast response.
        payload: PathBuf,

        #[command(flatten)]
        report: ReportArgs,
    },

    /// Read or change per-session preferences.
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },
}

#[derive(Debug, Subcommand)]
pub enum SettingsAction {
    /// Print the session's settings document as JSON.
    Show {
        #[arg(long, default_value = DEFAULT_SESSION)]
        session: String,
    },

    /// Update only the given fields.
    Set {
        #[arg(long, default_value = DEFAULT_SESSION)]
        session: String,

        #[arg(long)]
        units: Option<UnitSystem>,

        /// Refresh period in hours (1, 2 or 3).
        #[arg(long)]
        update_period: Option<u8>,

        #[arg(long)]
        add_location: Vec<String>,

        #[arg(long)]
        remove_location: Vec<String>,

        /// Widget key, e.g. "feelsLike" or "aqi".
        #[arg(long)]
        hide_widget: Vec<String>,

        #[arg(long)]
        show_widget: Vec<String>,

        /// Activity name: running, jogging, cycling or hiking.
        #[arg(long)]
        hide_activity: Vec<String>,

        #[arg(long)]
        show_activity: Vec<String>,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Show { location, report } => {
                let config = Config::load()?;
                let location = location.or_else(|| config.default_location.clone()).ok_or_else(
                    || {
                        anyhow!(
                            "No location given.\n\
                             Hint: pass a location or run `skycast configure` to set a default."
                        )
                    },
                )?;
                let query = LocationQuery::parse(&location)?;
                tracing::debug!(%query, "Resolved location");
                let client = WeatherApiClient::from_config(&config)?;
                let snapshot = client.fetch_snapshot(&query).await?;
                print_report(&snapshot, &report)
            }
            Command::Inspect { payload, report } => {
                let body = fs::read_to_string(&payload)
                    .with_context(|| format!("Failed to read payload: {}", payload.display()))?;
                let snapshot = normalize_json(&body)?;
                print_report(&snapshot, &report)
            }
            Command::Settings { action } => settings(action),
        }
    }
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let api_key = inquire::Password::new("WeatherAPI.com API key:")
        .without_confirmation()
        .with_display_mode(inquire::PasswordDisplayMode::Masked)
        .prompt()
        .context("Failed to read API key")?;
    if api_key.trim().is_empty() {
        bail!("API key must not be empty");
    }
    config.set_api_key(api_key);

    let location = inquire::Text::new("Default location (optional):")
        .prompt_skippable()
        .context("Failed to read default location")?;
    config.set_default_location(location);

    config.save()?;
    println!("Configuration saved to {}", Config::config_file_path()?.display());
    Ok(())
}

fn session_document(session: &str) -> anyhow::Result<SettingsDocument> {
    let mut book = SettingsBook::load()?;
    let is_new = book.get(session).is_none();
    let doc = book.fetch_or_create(session).clone();
    if is_new {
        tracing::debug!(session, "Persisting new settings session");
        book.save()?;
    }
    Ok(doc)
}

fn print_report(snapshot: &NormalizedSnapshot, args: &ReportArgs) -> anyhow::Result<()> {
    let prefs = SettingsBook::load()?.get_or_default(&args.session);
    let rules = AlertRuleSet { cloud_advisory: args.cloud_advisory };
    let advisory = advise_with(&snapshot.current, &rules);

    if args.json {
        let out = serde_json::json!({ "snapshot": snapshot, "advisory": advisory });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        let units = args.units.unwrap_or(prefs.units);
        let mut text = String::new();
        render::report(&mut text, snapshot, &advisory, &prefs, units)?;
        print!("{text}");
    }
    Ok(())
}

fn settings(action: SettingsAction) -> anyhow::Result<()> {
    match action {
        SettingsAction::Show { session } => {
            let doc = session_document(&session)?;
            println!("{}", serde_json::to_string_pretty(&doc)?);
        }
        SettingsAction::Set {
            session,
            units,
            update_period,
            add_location,
            remove_location,
            hide_widget,
            show_widget,
            hide_activity,
            show_activity,
        } => {
            let mut book = SettingsBook::load()?;
            let mut current = book.fetch_or_create(&session).clone();

            let mut patch = SettingsPatch {
                units,
                update_period: update_period.map(UpdatePeriod::try_from).transpose()?,
                ..Default::default()
            };

            if !add_location.is_empty() || !remove_location.is_empty() {
                for city in &add_location {
                    current.add_location(city);
                }
                for city in &remove_location {
                    current.remove_location(city);
                }
                patch.saved_locations = Some(current.saved_locations.clone());
            }

            if !hide_widget.is_empty() || !show_widget.is_empty() {
                for key in &hide_widget {
                    current.widgets.set(key, false)?;
                }
                for key in &show_widget {
                    current.widgets.set(key, true)?;
                }
                patch.widgets = Some(current.widgets.clone());
            }

            if !hide_activity.is_empty() || !show_activity.is_empty() {
                for name in &hide_activity {
                    current.activities.set(parse_activity(name)?, false);
                }
                for name in &show_activity {
                    current.activities.set(parse_activity(name)?, true);
                }
                patch.activities = Some(current.activities.clone());
            }

            if patch.is_empty() {
                bail!("Nothing to update. See `skycast settings set --help`.");
            }

            let updated = book.upsert(&session, patch).clone();
            book.save()?;
            println!("{}", serde_json::to_string_pretty(&updated)?);
        }
    }

    Ok(())
}
