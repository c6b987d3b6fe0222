use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::{error, info, warn};

use report_pipeline::collectors::{ApiCollector, SourceCollector, SpreadsheetCollector};
use report_pipeline::config::Config;
use report_pipeline::error::{ReportError, Result};
use report_pipeline::logging;
use report_pipeline::messaging::WhatsAppSender;
use report_pipeline::pipeline::Processor;
use report_pipeline::render::HtmlRenderer;
use report_pipeline::table::Table;

#[derive(Parser)]
#[command(name = "report_pipeline")]
#[command(about = "Multi-source report generator: spreadsheet + REST API unified into one table")]
#[command(version = "0.1.0")]
struct Cli {
    /// Path to the configuration file
    #[arg(long, default_value = "config.toml")]
    config: String,

    /// Enable extra-verbose logging
    #[arg(long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Collect both sources, process, render and deliver the report
    Run {
        /// Spreadsheet path (overrides fonte1.file from the config)
        #[arg(long)]
        file: Option<PathBuf>,
        /// Render only; skip WhatsApp delivery
        #[arg(long)]
        skip_send: bool,
    },
    /// Offline run: local spreadsheet plus a captured API JSON file
    Process {
        /// Spreadsheet path
        #[arg(long)]
        file: PathBuf,
        /// JSON file holding the fonte 2 records
        #[arg(long)]
        api_data: PathBuf,
    },
}

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    let cli = Cli::parse();
    logging::init_logging(cli.verbose);

    let config = Config::load(&cli.config)?;

    let outcome = match cli.command {
        Commands::Run { file, skip_send } => run(&config, file, skip_send).await,
        Commands::Process { file, api_data } => process_offline(&config, file, api_data).await,
    };

    if let Err(e) = outcome {
        error!("run failed: {}", e);
        println!("❌ Run failed: {}", e);
        return Err(e.into());
    }
    Ok(())
}

async fn run(config: &Config, file: Option<PathBuf>, skip_send: bool) -> Result<()> {
    println!("🚀 Running full report pipeline...");

    let spreadsheet_path = file
        .or_else(|| config.fonte1.file.clone().map(PathBuf::from))
        .ok_or_else(|| {
            ReportError::Config("no spreadsheet path configured (fonte1.file or --file)".into())
        })?;

    let spreadsheet = SpreadsheetCollector::new(spreadsheet_path).collect().await?;
    let api = ApiCollector::new(&config.fonte2)?.collect().await?;

    let artifact = generate_report(config, spreadsheet, api)?;

    if skip_send {
        info!("delivery skipped by flag");
        return Ok(());
    }
    match &config.whatsapp {
        Some(whatsapp) => {
            let sender = WhatsAppSender::new(whatsapp, config.processing.timezone()?)?;
            sender.send_report(&artifact).await?;
            println!("✅ Report delivered");
        }
        None => {
            warn!("no [whatsapp] section configured; skipping delivery");
            println!("⚠️  No [whatsapp] section configured; report not sent");
        }
    }
    Ok(())
}

async fn process_offline(config: &Config, file: PathBuf, api_data: PathBuf) -> Result<()> {
    println!("🔄 Processing local data...");

    let spreadsheet = SpreadsheetCollector::new(file).collect().await?;
    let records: Vec<serde_json::Value> =
        serde_json::from_str(&std::fs::read_to_string(api_data)?)?;
    let api = Table::from_json_records(&records)?;

    generate_report(config, spreadsheet, api)?;
    Ok(())
}

/// Shared tail of both commands: process, project, render.
fn generate_report(config: &Config, spreadsheet: Table, api: Table) -> Result<PathBuf> {
    let processor = Processor::new(&config.processing)?;

    let outcome = processor.run_full_pipeline(spreadsheet, api)?;
    let projection = processor.project(&outcome.table, None);
    for warning in &projection.warnings {
        warn!("{}", warning);
    }

    let renderer = HtmlRenderer::new(&config.report, &config.processing)?;
    let artifact = renderer.render(&projection.table)?;

    println!("\n📊 Report summary:");
    println!("   Records: {}", projection.table.row_count());
    println!("   Columns: {}", projection.table.columns().len());
    println!("   Artifact: {}", artifact.display());
    let warning_count = outcome.warnings.len() + projection.warnings.len();
    if warning_count > 0 {
        println!("   ⚠️  Warnings: {}", warning_count);
        for warning in outcome.warnings.iter().chain(projection.warnings.iter()) {
            println!("      - {}", warning);
        }
    }
    Ok(artifact)
}
