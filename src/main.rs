mod db;
mod dispatch;
mod error;
mod parser;
mod pipeline;
mod settings;
mod writer;

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::settings::Settings;

#[derive(Parser)]
#[command(
    name = "company_profile_etl",
    about = "Extract structured company profiles from stored HTML pages"
)]
struct Cli {
    /// Settings file (TOML, JSON or YAML). `ETL_*` env vars override it.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the input and output tables if they are missing
    Init,
    /// Parse every stored page and write the profiles
    Run {
        /// Max input records to read (default: all)
        #[arg(short = 'n', long)]
        limit: Option<usize>,
        /// Worker threads (overrides settings; 1 runs sequentially)
        #[arg(short, long)]
        workers: Option<usize>,
    },
    /// Show input/output counts
    Stats,
    /// Print one stored profile as JSON
    Show {
        company_id: String,
    },
}

fn init_tracing(default_level: &str) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .try_init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut settings = Settings::load(cli.config.as_deref()).context("Failed to load settings")?;
    init_tracing(&settings.log_level);

    match cli.command {
        Commands::Init => {
            let input = db::connect(&settings.input_db)?;
            db::init_input_schema(&input, &settings.input_table)?;
            let output = db::connect(&settings.output_db)?;
            db::init_output_schema(&output, &settings.output_table)?;
            println!(
                "Ready: {:?}:{} -> {:?}:{}",
                settings.input_db, settings.input_table, settings.output_db, settings.output_table
            );
        }
        Commands::Run { limit, workers } => {
            if let Some(w) = workers {
                settings.workers = w;
                settings.validate()?;
            }
            let input = db::connect_input(&settings.input_db)?;
            let output = db::connect(&settings.output_db)?;
            let summary = pipeline::run(&input, &output, &settings, limit)?;
            println!(
                "Inserted {} of {} records ({} skipped) in {}",
                summary.inserted,
                summary.read,
                summary.skipped,
                format_duration(summary.elapsed)
            );
        }
        Commands::Stats => {
            let input = db::connect_input(&settings.input_db)?;
            let output = db::connect(&settings.output_db)?;
            db::init_output_schema(&output, &settings.output_table)?;
            let s = db::get_stats(&input, &settings.input_table, &output, &settings.output_table)?;
            println!("Input:      {}", s.input_total);
            println!("With HTML:  {}", s.input_with_html);
            println!("Output:     {}", s.output_total);
        }
        Commands::Show { company_id } => {
            let output = db::connect_input(&settings.output_db)?;
            match db::fetch_output(&output, &settings.output_table, &company_id)? {
                Some(record) => println!("{}", serde_json::to_string_pretty(&record)?),
                None => println!("No profile stored for {}", company_id),
            }
        }
    }
    Ok(())
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
