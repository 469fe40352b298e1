use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio::io::BufReader;
use tokio::sync::watch;
use tracing::{error, info, warn};

use lead_finder::classifier::LeadAnalyzer;
use lead_finder::config::AppConfig;
use lead_finder::db::Database;
use lead_finder::logging::init_logging;
use lead_finder::models::{LeadStatus, RuleConfiguration};
use lead_finder::service::LeadService;
use lead_finder::transport::{JsonLinesSource, LogNotifier};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify and store inbound events, notifying on leads
    Run {
        /// Path to the configuration file (JSON, YAML or TOML)
        #[arg(short, long, default_value = "config.json")]
        config: PathBuf,

        /// SQLite database path (overrides database.path)
        #[arg(long)]
        db: Option<String>,

        /// Newline-delimited JSON events, `-` for stdin
        #[arg(short, long, default_value = "-")]
        events: String,

        /// Write JSON logs to this file as well
        #[arg(long)]
        log_file: Option<PathBuf>,

        /// Enable debug logging
        #[arg(short, long)]
        verbose: bool,
    },
    /// Classify a single text and print the decision as JSON
    Analyze {
        /// Text to classify
        #[arg(short, long)]
        text: String,

        /// Configuration file; built-in rules are used when omitted
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Show counts from the database
    Stats {
        /// SQLite database path
        #[arg(long, default_value = "leads.db")]
        db: String,

        /// Also list the most recent leads
        #[arg(short, long, default_value = "0")]
        recent: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            db,
            events,
            log_file,
            verbose,
        } => run(&config, db, &events, log_file.as_deref(), verbose).await,
        Commands::Analyze { text, config } => analyze(&text, config.as_deref()),
        Commands::Stats { db, recent } => stats(&db, recent),
    }
}

/// Monitor events until the source ends or a shutdown signal arrives
async fn run(
    config_path: &Path,
    db_override: Option<String>,
    events: &str,
    log_file: Option<&Path>,
    verbose: bool,
) -> Result<()> {
    // Load configuration
    let config = AppConfig::load(config_path)
        .with_context(|| format!("Failed to load configuration from {}", config_path.display()))?;

    // Initialize logging
    let log_file = log_file.or_else(|| config.logging.file_path.as_deref().map(Path::new));
    let _guard = init_logging(
        Some(&config.get_log_level(verbose)),
        log_file,
        config.logging.format == "json",
    )?;

    info!("Starting lead-finder");

    let target = config.notification_target()?;
    let analyzer = LeadAnalyzer::new(config.rule_configuration())?;
    let db_path = db_override.unwrap_or_else(|| config.database.path.clone());
    let db = Database::new(&db_path)
        .with_context(|| format!("Failed to open database {db_path}"))?;

    let service = LeadService::new(analyzer, db, LogNotifier, target, config.processing.clone());

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        wait_for_signal().await;
        info!("Shutting down...");
        let _ = shutdown_tx.send(true);
    });

    let stats = if events == "-" {
        let mut source = JsonLinesSource::new(BufReader::new(tokio::io::stdin()));
        service.run(&mut source, shutdown_rx).await
    } else {
        let file = tokio::fs::File::open(events)
            .await
            .with_context(|| format!("Failed to open events file {events}"))?;
        let mut source = JsonLinesSource::new(BufReader::new(file));
        service.run(&mut source, shutdown_rx).await
    };

    info!(
        processed = stats.processed,
        leads = stats.leads,
        duplicates = stats.duplicates,
        errors = stats.errors,
        "Processed messages"
    );

    service.close()?;
    Ok(())
}

async fn wait_for_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {},
                    _ = sigterm.recv() => {},
                }
            },
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                if let Err(e) = tokio::signal::ctrl_c().await {
                    error!(error = %e, "Failed to listen for Ctrl+C");
                }
            },
        }
    }

    #[cfg(not(unix))]
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for Ctrl+C");
    }
}

/// Classify one text and print the decision
fn analyze(text: &str, config_path: Option<&Path>) -> Result<()> {
    let rules = match config_path {
        Some(path) => AppConfig::load(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?
            .rule_configuration(),
        None => RuleConfiguration::default(),
    };

    let analyzer = LeadAnalyzer::new(rules)?;
    let decision = analyzer.analyze(text);
    println!("{}", serde_json::to_string_pretty(&decision)?);
    Ok(())
}

/// Print store counts
fn stats(db_path: &str, recent: usize) -> Result<()> {
    let db = Database::open_read_only(db_path)
        .with_context(|| format!("Failed to open database {db_path}"))?;
    let stats = db.stats()?;

    println!("Total messages:  {}", stats.total_messages);
    println!("Leads:           {}", stats.leads);
    println!("Not leads:       {}", stats.not_leads);
    println!("Distinct texts:  {}", stats.distinct_texts);
    println!("Chats:           {}", stats.distinct_chats);

    if recent > 0 {
        for lead in db.messages_by_status(LeadStatus::Lead, recent)? {
            println!(
                "{} | {} | chat {} msg {} | {}",
                lead.created_at.format("%Y-%m-%d %H:%M:%S"),
                lead.category,
                lead.chat_id,
                lead.message_id,
                lead.message_text.lines().next().unwrap_or_default()
            );
        }
    }

    db.close()?;
    Ok(())
}
