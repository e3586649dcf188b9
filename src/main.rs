//! OwnMyHealth CLI
//!
//! Upload a health export to the backend, then explore it:
//! - Dashboard after upload
//! - Heart health insights and charts
//! - Nightly sleep totals (from the backend or a local export)
//! - Raw data table
//!
//! Logs go to stderr (or the configured file) so stdout stays parseable.

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use ownmyhealth::client::{ApiClient, TimeseriesImage};
use ownmyhealth::config::{generate_default_config, Config, LoggingConfig};
use ownmyhealth::import::import_export;
use ownmyhealth::pages::{PageContext, RecordsQuery, Route};
use ownmyhealth::records::{HealthRecord, Page, ReportZone, DEFAULT_PER_PAGE};
use ownmyhealth::sleep::NightAggregator;
use ownmyhealth::store::RecordStore;
use ownmyhealth::view::{
    render_dashboard, render_header, render_heart, render_records, render_sleep, DashboardView,
    HeartView, SleepView,
};

#[derive(Parser)]
#[command(name = "ownmyhealth")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Visualize your health data")]
#[command(long_about = "OwnMyHealth uploads a health export to your backend.\nExplore heart health insights, nightly sleep and the raw records from the terminal.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Backend URL (overrides config)
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table, global = true)]
    pub format: OutputFormat,

    /// Config file (default: ~/.config/ownmyhealth/config.toml or ./config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Upload a health export and start a session
    Upload {
        /// Export file (e.g. export.zip)
        file: PathBuf,
    },

    /// Show the dashboard for the current session
    Dashboard,

    /// Heart health insights
    Heart {
        /// Write the timeseries charts as PNG files into this directory
        #[arg(long)]
        save_images: Option<PathBuf>,
    },

    /// Nightly sleep totals
    Sleep {
        /// Read a local Apple Health export instead of the backend
        #[arg(long)]
        from_export: Option<PathBuf>,
        /// Number of most recent nights
        #[arg(short, long)]
        nights: Option<usize>,
        /// Use UTC for night dates
        #[arg(long)]
        utc: bool,
    },

    /// Raw data table
    Records {
        /// Page number (1-based)
        #[arg(short, long, default_value_t = 1)]
        page: usize,
        /// Rows per page
        #[arg(long, default_value_t = DEFAULT_PER_PAGE)]
        per_page: usize,
        /// Only records of this type (e.g. HeartRate)
        #[arg(short = 't', long = "type")]
        record_type: Option<String>,
    },

    /// End the session
    Logout,

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load_with_env(path)?,
        None => Config::load_default(),
    };
    if let Some(url) = &cli.api_url {
        config.api.base_url = url.clone();
    }

    init_logging(&config.logging)?;
    tracing::debug!(api = %config.api.base_url, "ownmyhealth v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Commands::Config { output } => {
            let content = generate_default_config();
            match output {
                Some(path) => {
                    std::fs::write(&path, content)
                        .with_context(|| format!("writing {}", path.display()))?;
                    println!("Config written to {}", path.display());
                }
                None => print!("{}", content),
            }
            Ok(())
        }

        Commands::Sleep {
            from_export: Some(path),
            nights,
            utc,
        } => {
            let aggregator = sleep_aggregator(&config, nights, utc)?;
            let result = import_export(&path)
                .with_context(|| format!("importing {}", path.display()))?;
            if result.skipped > 0 {
                tracing::warn!(skipped = result.skipped, "Some export records could not be read");
            }

            let view = SleepView::new(&aggregator.aggregate(&result.records));
            print_sleep(&view, cli.format)
        }

        command => {
            let nights_override = match &command {
                Commands::Sleep { nights, utc, .. } => Some((*nights, *utc)),
                _ => None,
            };
            let aggregator = match nights_override {
                Some((nights, utc)) => sleep_aggregator(&config, nights, utc)?,
                None => NightAggregator::from_config(&config.sleep)?,
            };

            let store = RecordStore::open(config.session.path())?;
            let gateway = ApiClient::new(&config.api)?;
            let ctx = PageContext::new(store, gateway, aggregator);

            run(&ctx, command, cli.format).await
        }
    }
}

async fn run(ctx: &PageContext<ApiClient>, command: Commands, format: OutputFormat) -> anyhow::Result<()> {
    match command {
        Commands::Upload { file } => {
            let view = ctx.upload(&file).await?;
            print_dashboard(&view, format)
        }

        Commands::Dashboard => {
            let view = ctx.dashboard()?;
            print_dashboard(&view, format)
        }

        Commands::Heart { save_images } => {
            let view = ctx.heart_health().await?;
            if let Some(dir) = save_images {
                save_heart_images(&view, &dir)?;
            }
            print_heart(&view, format)
        }

        Commands::Sleep { .. } => {
            let view = ctx.sleep_health().await?;
            print_sleep(&view, format)
        }

        Commands::Records {
            page,
            per_page,
            record_type,
        } => {
            let query = RecordsQuery {
                page,
                per_page,
                record_type,
            };
            let page = ctx.records(&query).await?;
            print_records(&page, format)
        }

        Commands::Logout => {
            ctx.logout()?;
            println!("Signed out.");
            Ok(())
        }

        Commands::Config { .. } => Ok(()),
    }
}

fn init_logging(config: &LoggingConfig) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("ownmyhealth={}", config.level)));

    let writer = match &config.file {
        Some(path) => {
            let file = File::options()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("opening log file {}", path))?;
            BoxMakeWriter::new(Arc::new(file))
        }
        None => BoxMakeWriter::new(std::io::stderr),
    };

    let layer = tracing_subscriber::fmt::layer().with_writer(writer);
    let registry = tracing_subscriber::registry().with(filter);

    if config.format == "json" {
        registry.with(layer.json()).init();
    } else {
        registry.with(layer).init();
    }
    Ok(())
}

fn sleep_aggregator(config: &Config, nights: Option<usize>, utc: bool) -> anyhow::Result<NightAggregator> {
    let mut aggregator = NightAggregator::from_config(&config.sleep)?;
    if let Some(nights) = nights {
        aggregator = aggregator.with_max_nights(nights);
    }
    if utc {
        aggregator = aggregator.with_zone(ReportZone::Utc);
    }
    Ok(aggregator)
}

fn save_heart_images(view: &HeartView, dir: &Path) -> anyhow::Result<()> {
    std::fs::create_dir_all(dir)?;

    let images: [(&str, &TimeseriesImage); 2] = [
        ("heartrate.png", &view.heart_rate_image),
        ("resting_heartrate.png", &view.resting_heart_rate_image),
    ];

    for (name, image) in images {
        match image.png_bytes().with_context(|| format!("decoding {}", name))? {
            Some(bytes) => {
                let path = dir.join(name);
                std::fs::write(&path, bytes)?;
                eprintln!("Saved {}", path.display());
            }
            None => eprintln!("No image available for {}", name),
        }
    }
    Ok(())
}

fn print_dashboard(view: &DashboardView, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(view)?),
        OutputFormat::Csv => {
            let mut writer = csv::Writer::from_writer(std::io::stdout());
            writer.write_record(["upload_message", "cached_records"])?;
            writer.write_record([
                view.upload_message.clone().unwrap_or_default(),
                view.cached_records.to_string(),
            ])?;
            writer.flush()?;
        }
        OutputFormat::Table => {
            print!("{}", render_header(Route::Dashboard));
            print!("{}", render_dashboard(view));
        }
    }
    Ok(())
}

fn print_heart(view: &HeartView, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(view)?),
        OutputFormat::Csv => {
            let mut writer = csv::Writer::from_writer(std::io::stdout());
            writer.write_record(["section", "field", "value"])?;
            writer.write_record(["risk", "score", view.risk.score.as_str()])?;
            writer.write_record(["risk", "category", view.risk.category.as_str()])?;
            for rec in &view.risk.recommendations {
                writer.write_record(["risk", "recommendation", rec.as_str()])?;
            }
            for card in &view.insights {
                writer.write_record(["insight", card.title.as_str(), card.message.as_str()])?;
            }
            writer.write_record(["summary", "fitness_level", view.summary.fitness_level.as_str()])?;
            writer.write_record([
                "summary",
                "data_completeness",
                view.summary.data_completeness.as_str(),
            ])?;
            writer.write_record(["summary", "last_updated", view.summary.last_updated.as_str()])?;
            writer.write_record([
                "training",
                "recommendation",
                view.training.recommendation.as_str(),
            ])?;
            for zone in &view.training.focus_zones {
                writer.write_record(["training", "focus_zone", zone.as_str()])?;
            }
            writer.flush()?;
        }
        OutputFormat::Table => {
            print!("{}", render_header(Route::HeartHealth));
            print!("{}", render_heart(view));
        }
    }
    Ok(())
}

fn print_sleep(view: &SleepView, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(view)?),
        OutputFormat::Csv => {
            let mut writer = csv::Writer::from_writer(std::io::stdout());
            writer.write_record(["date", "hours"])?;
            for night in &view.nights {
                writer.write_record([night.date_key(), format!("{:.2}", night.hours)])?;
            }
            writer.flush()?;
        }
        OutputFormat::Table => {
            print!("{}", render_header(Route::SleepHealth));
            print!("{}", render_sleep(view));
        }
    }
    Ok(())
}

fn print_records(page: &Page<HealthRecord>, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(page)?),
        OutputFormat::Csv => {
            let mut writer = csv::Writer::from_writer(std::io::stdout());
            writer.write_record(["type", "value", "startDate", "endDate", "date"])?;
            for record in &page.items {
                writer.write_record([
                    record.record_type.clone(),
                    record.value.as_ref().map(|v| v.to_string()).unwrap_or_default(),
                    record.start_date.clone().unwrap_or_default(),
                    record.end_date.clone().unwrap_or_default(),
                    record.date.clone().unwrap_or_default(),
                ])?;
            }
            writer.flush()?;
        }
        OutputFormat::Table => {
            print!("{}", render_header(Route::Records));
            print!("{}", render_records(page));
        }
    }
    Ok(())
}
