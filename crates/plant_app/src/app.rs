use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use tracing::info;

use plant_domain::medium::{FileMedium, PersistenceMedium};
use plant_domain::notifications::IntervalScheduler;
use plant_domain::plant::{Plant, RepeatEvery, WaterFrequency};
use plant_domain::{profile, PlantStore};

use crate::cli::{AddArgs, Cli, Commands, RepeatArg};

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub data_dir: PathBuf,
}

impl AppConfig {
    pub fn resolve(cli_dir: Option<PathBuf>) -> Self {
        let data_dir = cli_dir
            .or_else(|| std::env::var_os("REGADOR_DATA_DIR").map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from("regador-data"));
        Self { data_dir }
    }
}

pub fn run(cli: Cli) -> Result<()> {
    let config = AppConfig::resolve(cli.data_dir);
    info!(data_dir = %config.data_dir.display(), "opening plant collection");

    let medium = Arc::new(FileMedium::new(&config.data_dir)?);
    let store = PlantStore::builder()
        .with_medium(Box::new(medium.clone()))
        .with_scheduler(Box::new(IntervalScheduler::default()))
        .build()?;

    match cli.command.unwrap_or(Commands::List) {
        Commands::List => list(&store, medium.as_ref()),
        Commands::Add(args) => add(&store, args),
        Commands::Remove { id } => remove(&store, &id),
        Commands::SetUser { name } => {
            profile::save_user_name(medium.as_ref(), &name)?;
            println!("Hello, {name}!");
            Ok(())
        }
    }
}

fn list(store: &PlantStore, medium: &dyn PersistenceMedium) -> Result<()> {
    let user = profile::load_user_name(medium)?.unwrap_or_else(|| "there".to_string());
    println!("Hi, {user}!");

    let plants = store.load()?;
    let Some(next) = plants.first() else {
        println!("No plants saved yet.");
        return Ok(());
    };

    println!(
        "Water your {} {}.",
        next.name,
        countdown(next.date_time_notification, Utc::now())
    );
    println!();
    println!("Next waterings:");
    for plant in &plants {
        println!(
            "  {:>5}  {} ({})",
            plant.hour,
            plant.name,
            countdown(plant.date_time_notification, Utc::now())
        );
    }
    Ok(())
}

fn add(store: &PlantStore, args: AddArgs) -> Result<()> {
    let environments = args
        .environments
        .split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect();
    let id = args.id;
    let plant = Plant {
        id: id.clone(),
        name: args.name,
        about: args.about,
        water_tip: args.water_tip,
        photo: args.photo,
        environments,
        frequency: WaterFrequency {
            times: args.times.max(1),
            repeat_every: args.repeat_every.into(),
        },
        // Not ahead of the store's clock, so the first reminder instant is
        // computed from the frequency.
        date_time_notification: Utc::now(),
        hour: String::new(),
    };
    store.save(plant)?;

    let plants = store.load()?;
    if let Some(saved) = plants.iter().find(|p| p.id == id) {
        println!(
            "Saved {}. First reminder {}.",
            saved.name,
            countdown(saved.date_time_notification, Utc::now())
        );
    }
    Ok(())
}

fn remove(store: &PlantStore, id: &str) -> Result<()> {
    let outcome = store.remove(id)?;
    match outcome.cancel_warning {
        Some(warning) => println!("Removed {id}, but its reminder could not be disarmed: {warning}"),
        None => println!("Removed {id}."),
    }
    Ok(())
}

impl From<RepeatArg> for RepeatEvery {
    fn from(arg: RepeatArg) -> Self {
        match arg {
            RepeatArg::Day => RepeatEvery::Day,
            RepeatArg::Week => RepeatEvery::Week,
        }
    }
}

fn countdown(fire_at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let remaining = fire_at - now;
    if remaining <= Duration::zero() {
        return "now".to_string();
    }
    let days = remaining.num_days();
    if days >= 1 {
        return format!("in {days} day{}", plural(days));
    }
    let hours = remaining.num_hours();
    if hours >= 1 {
        return format!("in {hours} hour{}", plural(hours));
    }
    let minutes = remaining.num_minutes().max(1);
    format!("in {minutes} minute{}", plural(minutes))
}

fn plural(count: i64) -> &'static str {
    if count == 1 {
        ""
    } else {
        "s"
    }
}
