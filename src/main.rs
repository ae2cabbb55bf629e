use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde_json::Value;
use tracing::{debug, info};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use setasia_schedule::scraper::schedule_url;
use setasia_schedule::{AppConfig, Location, Schedule, ScheduleOptions};

#[derive(Parser)]
#[command(name = "setasia-schedule", about = "SET Asia programme schedule scraper", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Command {
    /// Fetch a day's schedule and print its listings
    Show {
        #[command(flatten)]
        request: RequestArgs,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },

    /// Print the schedule page URL without fetching it
    Url {
        #[command(flatten)]
        request: RequestArgs,
    },

    /// List supported location codes
    Locations,
}

#[derive(Args)]
struct RequestArgs {
    /// Location code, e.g. en-gb
    #[arg(short, long)]
    location: Option<String>,

    /// Year; give all of --yyyy/--mm/--dd or none (today)
    #[arg(long)]
    yyyy: Option<i32>,

    #[arg(long)]
    mm: Option<u32>,

    #[arg(long)]
    dd: Option<u32>,

    /// Request as a JSON object: '{"location":"en-gb","yyyy":2011,"mm":4,"dd":7}'
    #[arg(long, conflicts_with_all = ["location", "yyyy", "mm", "dd"])]
    params: Option<String>,
}

impl RequestArgs {
    fn options(&self) -> Result<ScheduleOptions> {
        if let Some(raw) = &self.params {
            let value: Value = serde_json::from_str(raw).context("--params is not valid JSON")?;
            return Ok(ScheduleOptions::from_value(&value)?);
        }

        Ok(ScheduleOptions::from_parts(
            self.location.clone(),
            self.yyyy,
            self.mm,
            self.dd,
        ))
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Text,
    Json,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "setasia_schedule=info,warn",
        1 => "setasia_schedule=debug,info",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .compact()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .with(EnvFilter::new(filter))
        .init();

    let config = AppConfig::load().context("Failed to load configuration")?;
    debug!("Base URL: {}", config.scraper.base_url);

    match cli.command {
        Command::Show { request, format } => {
            let options = request.options()?;
            let schedule = Schedule::from_config(&options, &config)?;

            let out = match format {
                Format::Text => schedule.render().await?,
                Format::Json => schedule.to_json().await? + "\n",
            };
            info!(
                "{} listings for {}",
                schedule.cached_listings().await?.len(),
                schedule.request().location.display_name()
            );
            print!("{out}");
        }

        Command::Url { request } => {
            let req = request.options()?.validate()?;
            println!(
                "{}",
                schedule_url(&config.scraper.base_url, req.location, req.year, req.month, req.day)
            );
        }

        Command::Locations => {
            for loc in Location::ALL {
                println!("  {:<6} {}", loc.code(), loc.display_name());
            }
        }
    }

    Ok(())
}
