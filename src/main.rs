use anyhow::Context;
use chrono::{Duration, Utc};
use clap::{Parser, Subcommand};
use log::{info, LevelFilter};
use lookout::chatops::ChatOps;
use lookout::classifier::AlertClassifier;
use lookout::config::Config;
use lookout::events::{
    AlertFilter, LogEntry, NewRule, RawAlert, Severity, SeverityTables, Timestamp,
};
use lookout::store::{LogStore, MemoryStore};
use lookout::summarizer::LogSummarizer;
use lookout::SummaryError;
use std::io::{BufRead, BufReader, Read};
use std::path::PathBuf;
use std::sync::Arc;

/// Command-line arguments for the network log triage engine
#[derive(Parser)]
#[command(
    name = "lookout",
    about = "Network log triage - alert classification and log summarization",
    long_about = "Ingests operational log events and raw alerts, turns them into \
                  prioritized, categorized alerts, and produces time-windowed summaries \
                  that highlight anomalous activity."
)]
struct Cli {
    /// Path to configuration file (TOML format)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Classify raw alerts given as JSON objects, one per line
    Classify {
        /// Read alerts from a file instead of stdin
        #[arg(short, long, value_name = "FILE")]
        file: Option<PathBuf>,

        /// JSON file with an array of classification rules to apply
        #[arg(long, value_name = "FILE")]
        rules: Option<PathBuf>,
    },

    /// Summarize log entries given as JSON objects, one per line
    Summarize {
        /// Read logs from a file instead of stdin
        #[arg(short, long, value_name = "FILE")]
        file: Option<PathBuf>,

        /// Summary window in hours ending now; defaults to the span of
        /// the input
        #[arg(long)]
        hours: Option<i64>,

        /// Print the human-readable summary text instead of JSON
        #[arg(long)]
        text: bool,
    },

    /// Answer a single chat command over seeded sample data
    Chat {
        /// The message, e.g. "status" or "summarize 2"
        message: Vec<String>,
    },

    /// Run an end-to-end showcase over seeded sample data
    Demo,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    env_logger::Builder::from_default_env()
        .filter_level(if cli.verbose {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        })
        .init();

    let config = Config::load_or_default(cli.config.as_deref());

    match cli.command {
        Command::Classify { file, rules } => classify(&config, file, rules),
        Command::Summarize { file, hours, text } => summarize(&config, file, hours, text),
        Command::Chat { message } => chat(&config, &message.join(" ")),
        Command::Demo => demo(&config),
    }
}

/// Wire the engines over a fresh in-memory store
fn build_engines(config: &Config) -> (Arc<MemoryStore>, Arc<AlertClassifier>, Arc<LogSummarizer>) {
    let store = Arc::new(MemoryStore::new());
    let classifier = Arc::new(AlertClassifier::new(
        store.clone(),
        store.clone(),
        SeverityTables::default(),
        config.classifier.clone(),
    ));
    let summarizer = Arc::new(LogSummarizer::new(
        store.clone(),
        store.clone(),
        SeverityTables::default(),
        &config.summarizer,
    ));
    (store, classifier, summarizer)
}

/// Read newline-delimited JSON values from a file or stdin
fn read_json_lines<T: serde::de::DeserializeOwned>(file: Option<PathBuf>) -> anyhow::Result<Vec<T>> {
    let reader: Box<dyn Read> = match file {
        Some(path) => Box::new(
            std::fs::File::open(&path)
                .with_context(|| format!("failed to open {}", path.display()))?,
        ),
        None => Box::new(std::io::stdin()),
    };

    let mut values = Vec::new();
    for (line_number, line) in BufReader::new(reader).lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let value = serde_json::from_str(&line)
            .with_context(|| format!("invalid JSON on line {}", line_number + 1))?;
        values.push(value);
    }
    Ok(values)
}

fn classify(
    config: &Config,
    file: Option<PathBuf>,
    rules_file: Option<PathBuf>,
) -> anyhow::Result<()> {
    let (_, classifier, _) = build_engines(config);

    if let Some(path) = rules_file {
        let contents = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to open {}", path.display()))?;
        let rules: Vec<NewRule> =
            serde_json::from_str(&contents).context("invalid rules file")?;
        for rule in rules {
            classifier.create_rule(rule)?;
        }
    }

    let raw_alerts: Vec<RawAlert> = read_json_lines(file)?;
    info!("Classifying {} alerts", raw_alerts.len());

    for raw in raw_alerts {
        let alert = classifier.classify(raw)?;
        println!("{}", serde_json::to_string(&alert)?);
    }
    Ok(())
}

fn summarize(
    config: &Config,
    file: Option<PathBuf>,
    hours: Option<i64>,
    text: bool,
) -> anyhow::Result<()> {
    let (store, _, summarizer) = build_engines(config);

    let entries: Vec<LogEntry> = read_json_lines(file)?;
    anyhow::ensure!(!entries.is_empty(), "no log entries provided");
    store.insert_logs(&entries)?;

    let (start, end): (Timestamp, Timestamp) = match hours {
        Some(hours) => {
            let end = Utc::now();
            (end - Duration::hours(hours), end)
        }
        None => {
            // Span of the input; logs_between is inclusive on both ends
            let first = entries[0].timestamp;
            entries.iter().fold((first, first), |(min, max), entry| {
                (min.min(entry.timestamp), max.max(entry.timestamp))
            })
        }
    };

    match summarizer.generate_summary(start, end) {
        Ok(summary) => {
            if text {
                println!("{}", summary.summary_text);
            } else {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            }
            Ok(())
        }
        Err(SummaryError::NoLogs { start, end }) => {
            println!("No logs between {} and {}", start, end);
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

fn chat(config: &Config, message: &str) -> anyhow::Result<()> {
    let (store, classifier, summarizer) = build_engines(config);
    seed(&store, &classifier)?;

    let chatops = ChatOps::new(
        classifier,
        summarizer,
        store,
        config.summarizer.default_window_hours,
    );
    println!("{}", chatops.process_message(message));
    Ok(())
}

fn demo(config: &Config) -> anyhow::Result<()> {
    let (store, classifier, summarizer) = build_engines(config);
    seed(&store, &classifier)?;

    println!("== Classified alerts ==");
    for alert in classifier.alerts(&AlertFilter::default())? {
        println!(
            "[{:.2}] {:9} {:12} {:13} {}",
            alert.priority_score, alert.severity, alert.category, alert.status, alert.title
        );
    }

    let critical = classifier.alerts(&AlertFilter {
        severity: Some(Severity::Critical),
        ..Default::default()
    })?;
    println!("\n== Critical alerts: {} ==", critical.len());

    let groups = classifier.group_similar_alerts(config.classifier.group_window_hours)?;
    println!("\n== Repeated alerts ==");
    for (title, members) in &groups {
        println!("{} occurrences: {}", members.len(), title);
    }

    let end = Utc::now();
    let summary = summarizer.generate_summary(end - Duration::hours(6), end)?;
    println!("\n== Summary of the last six hours ==");
    println!("{}", summary.summary_text);

    let chatops = ChatOps::new(
        classifier,
        summarizer,
        store,
        config.summarizer.default_window_hours,
    );
    println!("\n== chat: status ==");
    println!("{}", chatops.process_message("status"));

    Ok(())
}

/// Seed sample logs and alerts into a fresh store
fn seed(store: &Arc<MemoryStore>, classifier: &Arc<AlertClassifier>) -> anyhow::Result<()> {
    store.insert_logs(&lookout::demo::sample_logs(Utc::now()))?;
    for raw in lookout::demo::sample_alerts() {
        classifier.classify(raw)?;
    }
    Ok(())
}
