//! TripMind CLI entry point

use std::fs;
use std::sync::Arc;

use clap::Parser;
use colored::Colorize;
use eyre::{Context, Result};
use tracing::info;

use tripmind::cli::{Cli, Command};
use tripmind::config::Config;
use tripmind::domain::{TransportPriority, TripPlan, TripRequest, generate_id};
use tripmind::followup::{FollowUpEngine, FollowUpKind};
use tripmind::llm::create_client;
use tripmind::pipeline::Pipeline;
use tripmind::prompts::PromptLoader;
use planstore::{SqliteStore, VersionStore};

fn setup_logging(cli_log_level: Option<&str>) -> Result<()> {
    let level = match cli_log_level.map(str::to_uppercase).as_deref() {
        Some("TRACE") => tracing::Level::TRACE,
        Some("DEBUG") => tracing::Level::DEBUG,
        Some("WARN") | Some("WARNING") => tracing::Level::WARN,
        Some("ERROR") => tracing::Level::ERROR,
        Some(other) => {
            eprintln!("Warning: unknown log-level '{other}', defaulting to INFO");
            tracing::Level::INFO
        }
        None | Some("INFO") => tracing::Level::INFO,
    };

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();
    Ok(())
}

fn open_store(config: &Config) -> Result<SqliteStore> {
    if let Some(parent) = config.storage.db_path.parent() {
        fs::create_dir_all(parent).context("Failed to create storage directory")?;
    }
    SqliteStore::open(&config.storage.db_path).context("Failed to open plan store")
}

fn build_pipeline(config: &Config) -> Result<Pipeline> {
    config.validate()?;
    let client = create_client(&config.generation)?;
    let prompts = PromptLoader::new(config.prompts.override_dir.clone());
    Ok(Pipeline::new(client, config.retry.policy(), prompts))
}

fn parse_priority(s: &str) -> Result<TransportPriority> {
    match s.to_lowercase().as_str() {
        "cheapest" => Ok(TransportPriority::Cheapest),
        "fastest" => Ok(TransportPriority::Fastest),
        "greenest" => Ok(TransportPriority::Greenest),
        "balanced" => Ok(TransportPriority::Balanced),
        other => Err(eyre::eyre!("unknown priority '{other}' (expected cheapest, fastest, greenest or balanced)")),
    }
}

fn print_plan(plan: &TripPlan, trip: &str, version: u32) {
    println!("{} {} (version {})", "Trip".bold(), trip.cyan(), version);
    if let Some(destination) = &plan.request.destination {
        println!("  Destination: {destination}");
    }
    println!(
        "  {} days, {} traveler(s), status: {}",
        plan.request.duration_days, plan.request.travelers, plan.status
    );
    if let Some(lodging) = &plan.selected_lodging {
        println!("  {} {} (${:.2}/night)", "Lodging:".bold(), lodging.name, lodging.price_per_night);
    }
    if let Some(recommended) = plan.transportation.iter().find(|c| c.recommended) {
        println!(
            "  {} {} via {} (${:.2}){}",
            "Transport:".bold(),
            recommended.mode,
            recommended.provider,
            recommended.price,
            recommended
                .recommendation_reason
                .as_deref()
                .map(|r| format!(" - {r}"))
                .unwrap_or_default()
        );
    }
    println!(
        "  {} {} restaurants, {} activities, {} airport transfer option(s)",
        "Found:".bold(),
        plan.dining.len(),
        plan.activities.len(),
        plan.airport_transfers.len()
    );
    println!("  {} ${:.2}", "Budget:".bold(), plan.budget.total);
    for day in &plan.itinerary {
        println!(
            "  Day {} ({}): {} activities, {} meals",
            day.day,
            day.date,
            day.activities.len(),
            day.meals.len()
        );
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.log_level.as_deref())?;
    let config = Config::load(cli.config.as_ref())?;

    match cli.command {
        Command::Plan {
            prompt,
            owner,
            trip,
            priority,
        } => {
            let pipeline = build_pipeline(&config)?;
            let store = open_store(&config)?;

            let mut request = TripRequest::from_prompt(&prompt, owner.clone());
            if let Some(priority) = priority {
                request.priority = parse_priority(&priority)?;
            }

            let trip = trip.unwrap_or_else(|| generate_id("trip"));
            info!(%owner, %trip, "planning trip");

            let plan = pipeline.run(&request).await?;
            let value = serde_json::to_value(&plan).context("Failed to serialize plan")?;
            let version = store.append(&owner, &trip, &value, &owner)?;

            print_plan(&plan, &trip, version);
        }

        Command::FollowUp {
            owner,
            trip,
            utterance,
            modified_by,
        } => {
            let pipeline = Arc::new(build_pipeline(&config)?);
            let store: Arc<dyn VersionStore> = Arc::new(open_store(&config)?);
            let engine = FollowUpEngine::new(pipeline, store);

            let outcome = engine
                .handle(&owner, &trip, &utterance, modified_by.as_deref())
                .await?;

            match outcome.kind {
                FollowUpKind::Query | FollowUpKind::Chat => {
                    if let Some(answer) = &outcome.answer {
                        println!("{answer}");
                    }
                }
                FollowUpKind::Modification => {
                    println!("{}", outcome.message);
                    if let (Some(plan), Some(version)) = (&outcome.plan, outcome.version) {
                        print_plan(plan, &trip, version);
                    }
                }
            }
        }

        Command::Versions { owner, trip } => {
            let store = open_store(&config)?;
            let versions = store.list_versions(&owner, &trip)?;
            if versions.is_empty() {
                println!("No versions found for {owner}/{trip}");
            }
            for v in versions {
                println!(
                    "v{}  by {}  at {}",
                    v.version.to_string().cyan(),
                    v.modified_by,
                    v.created_at.format("%Y-%m-%d %H:%M:%S UTC")
                );
            }
        }

        Command::Show { owner, trip, version } => {
            let store = open_store(&config)?;
            match store.get(&owner, &trip, version)? {
                Some(value) => println!("{}", serde_json::to_string_pretty(&value)?),
                None => println!("No plan found for {owner}/{trip}"),
            }
        }
    }

    Ok(())
}
