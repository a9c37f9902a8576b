use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "regador")]
#[command(about = "Watering reminders for your saved plants")]
pub struct Cli {
    /// Directory the plant collection lives in (falls back to
    /// REGADOR_DATA_DIR, then ./regador-data)
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the greeting and every saved plant, next watering first
    List,
    /// Save a plant and arm its watering reminder
    Add(AddArgs),
    /// Remove a saved plant and disarm its reminder
    Remove {
        /// ID of the plant to remove
        #[arg(long)]
        id: String,
    },
    /// Save the name shown by the greeting
    SetUser {
        name: String,
    },
}

#[derive(Args, Debug)]
pub struct AddArgs {
    /// Stable plant id
    #[arg(long)]
    pub id: String,
    /// Display name
    #[arg(short = 'n', long)]
    pub name: String,
    /// Short description
    #[arg(long, default_value = "")]
    pub about: String,
    /// Watering tip shown with the plant
    #[arg(long, default_value = "")]
    pub water_tip: String,
    /// Image reference
    #[arg(long, default_value = "")]
    pub photo: String,
    /// Environment tags, comma separated
    #[arg(short = 'e', long, default_value = "")]
    pub environments: String,
    /// Waterings per repeat period
    #[arg(long, default_value_t = 1)]
    pub times: u32,
    /// Repeat period
    #[arg(long, value_enum, default_value_t = RepeatArg::Week)]
    pub repeat_every: RepeatArg,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum RepeatArg {
    Day,
    Week,
}
