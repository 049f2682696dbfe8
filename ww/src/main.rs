//! Weekend Wanderer - AI weekend trip planner
//!
//! CLI entry point: opens the TUI by default, or runs one of the batch
//! subcommands.

use std::fs;
use std::sync::Arc;

use clap::Parser;
use colored::*;
use eyre::{Context, Result, eyre};
use tracing::{debug, info};

use weekendwanderer::cli::{Cli, Command, OutputFormat, TripsCommand, get_log_path};
use weekendwanderer::config::Config;
use weekendwanderer::controller::Controller;
use weekendwanderer::domain::{GeneratedItinerary, NO_PLACES_TEXT, PlaceCard, TripPreferences};
use weekendwanderer::llm::create_client;
use weekendwanderer::planner::ItineraryPlanner;
use weekendwanderer::prompts::PromptLoader;
use weekendwanderer::store::TripStore;
use weekendwanderer::tui;

fn setup_logging(cli_log_level: Option<&str>, config_log_level: Option<&str>) -> Result<()> {
    // Note: Can't log params here since logging isn't initialized yet
    let log_path = get_log_path();
    if let Some(log_dir) = log_path.parent() {
        fs::create_dir_all(log_dir).context("Failed to create log directory")?;
    }

    // Priority: CLI --log-level > config file > default (INFO)
    let level = match cli_log_level.or(config_log_level) {
        Some(s) => match s.to_uppercase().as_str() {
            "TRACE" => tracing::Level::TRACE,
            "DEBUG" => tracing::Level::DEBUG,
            "INFO" => tracing::Level::INFO,
            "WARN" | "WARNING" => tracing::Level::WARN,
            "ERROR" => tracing::Level::ERROR,
            _ => {
                eprintln!("Warning: Unknown log-level '{}', defaulting to INFO", s);
                tracing::Level::INFO
            }
        },
        None => tracing::Level::INFO,
    };

    let log_file = fs::File::create(&log_path).context("Failed to create log file")?;

    // The terminal belongs to the TUI, so logs only go to the file
    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_ansi(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    info!("Logging initialized (level: {:?})", level);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load log level from config file early (before full config load)
    let config_log_level = Config::load_log_level(cli.config.as_ref());
    setup_logging(cli.log_level.as_deref(), config_log_level.as_deref()).context("Failed to setup logging")?;

    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    info!(model = %config.llm.model, trips = ?config.storage.trips_path(), "Weekend Wanderer loaded config");

    debug!(command = ?cli.command, "main: dispatching command");
    match cli.command {
        None => cmd_tui(&config).await,
        Some(Command::Plan {
            destination,
            vibe,
            budget,
            no_save,
        }) => {
            let prefs = TripPreferences::new(destination, vibe, budget)
                .ok_or_else(|| eyre!("Destination must not be empty"))?;
            cmd_plan(&config, prefs, no_save).await
        }
        Some(Command::Trips { command }) => match command {
            TripsCommand::List { format } => cmd_trips_list(&config, format),
            TripsCommand::Show { id } => cmd_trips_show(&config, &id),
            TripsCommand::Delete { id } => cmd_trips_delete(&config, &id),
        },
        Some(Command::Config) => {
            print!("{}", config.to_yaml()?);
            Ok(())
        }
    }
}

fn build_planner(config: &Config) -> Result<ItineraryPlanner> {
    let llm = create_client(&config.llm).context("Failed to create LLM client")?;
    let prompts = Arc::new(PromptLoader::new(config.prompts.override_path()));
    Ok(ItineraryPlanner::new(llm, prompts).with_temperature(config.llm.temperature))
}

async fn cmd_tui(config: &Config) -> Result<()> {
    let planner = build_planner(config)?;
    let controller = Controller::new(TripStore::load(config.storage.trips_path()));
    tui::run(controller, planner, config.llm.model.clone()).await
}

async fn cmd_plan(config: &Config, prefs: TripPreferences, no_save: bool) -> Result<()> {
    let planner = build_planner(config)?;
    eprintln!(
        "{} Planning a {} weekend in {} ({})...",
        "→".cyan(),
        prefs.vibe,
        prefs.destination.bold(),
        prefs.budget.symbol()
    );

    let itinerary = planner.request_itinerary(&prefs).await?;
    let trip = GeneratedItinerary::new(prefs, itinerary.text, itinerary.grounding_metadata);
    print_trip(&trip);
    if no_save {
        debug!(id = %trip.id, "cmd_plan: --no-save, not storing");
        return Ok(());
    }

    let mut store = TripStore::load(config.storage.trips_path());
    let id = trip.id.clone();
    store
        .try_append(trip)
        .with_context(|| format!("Failed to save trip to {}", store.path().display()))?;
    eprintln!("{} Saved trip {}", "✓".green(), short_id(&id).cyan());
    Ok(())
}

fn cmd_trips_list(config: &Config, format: OutputFormat) -> Result<()> {
    let store = TripStore::load(config.storage.trips_path());
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(store.trips())?);
        }
        OutputFormat::Text => {
            if store.is_empty() {
                println!("No planned trips yet.");
                return Ok(());
            }
            for trip in store.trips() {
                println!(
                    "{}  {}  {:<30} {} · {}",
                    short_id(&trip.id).cyan(),
                    trip.created_date().dimmed(),
                    trip.title().bold(),
                    trip.preferences.vibe.label(),
                    trip.preferences.budget.symbol()
                );
            }
        }
    }
    Ok(())
}

fn cmd_trips_show(config: &Config, id: &str) -> Result<()> {
    let store = TripStore::load(config.storage.trips_path());
    let trip = store.find(id).ok_or_else(|| eyre!("No trip matches '{}'", id))?;
    print_trip(trip);
    Ok(())
}

fn cmd_trips_delete(config: &Config, id: &str) -> Result<()> {
    let mut store = TripStore::load(config.storage.trips_path());
    let trip_id = store
        .find(id)
        .map(|t| t.id.clone())
        .ok_or_else(|| eyre!("No trip matches '{}'", id))?;
    store
        .try_remove(&trip_id)
        .with_context(|| format!("Failed to delete trip {}", trip_id))?;
    println!("{} Deleted trip: {}", "✓".green(), trip_id);
    Ok(())
}

fn print_trip(trip: &GeneratedItinerary) {
    println!("{}", trip.title().bold().cyan());
    println!(
        "{}",
        format!(
            "{} · {} {} · {}",
            trip.preferences.vibe.label(),
            trip.preferences.budget.symbol(),
            trip.preferences.budget.label(),
            trip.created_date()
        )
        .dimmed()
    );
    println!();
    println!("{}", trip.text.trim_end());

    println!();
    println!("{}", "Places".bold());
    let places = trip.places();
    if places.is_empty() {
        println!("  {}", NO_PLACES_TEXT.dimmed());
    }
    for place in &places {
        print_place(place);
    }
}

fn print_place(place: &PlaceCard) {
    println!("  {}", place.title.bold());
    match &place.uri {
        Some(uri) => println!("    {} {}", place.link_label().blue(), uri.dimmed()),
        None => println!("    {}", place.link_label().blue()),
    }
    if let Some(rating) = place.rating_line() {
        println!("    {}", rating.yellow());
    }
}

/// Id prefix long enough to cover the v7 timestamp, e.g. "0199a1b2-c3d4"
fn short_id(id: &str) -> &str {
    let end = id.char_indices().nth(13).map(|(i, _)| i).unwrap_or(id.len());
    &id[..end]
}
