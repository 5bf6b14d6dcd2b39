//! convo-insight CLI: drive the analysis engine against a configured
//! evaluation backend from the command line.

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use convo_insight::analysis::{self, bloom, distribution, info_gain};
use convo_insight::client::{ApiClient, ConversationArtifact};
use convo_insight::config::Config;
use convo_insight::health::HealthMonitor;
use convo_insight::orchestrator::DeepAnalysis;
use convo_insight::schemas::{
    FlowAnalysisResult, MetricKind, QualityEvaluationResult, ReportMetadata, ReportRequest,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[derive(Parser)]
#[command(name = "convo-insight", about = "Conversation transcript analysis")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Check the evaluation backend's health
    Health,
    /// Upload a transcript and run quality evaluation plus flow analysis
    Analyze {
        /// Path to a conversations.json export
        #[arg(long)]
        file: PathBuf,
        /// Cap on evaluated QA pairs (defaults to the configured value)
        #[arg(long)]
        max_pairs: Option<u32>,
        /// Also generate an HTML report and write it to this path
        #[arg(long)]
        report: Option<PathBuf>,
    },
    /// Parse a transcript locally and print the cognitive distribution
    /// without contacting the backend
    Inspect {
        /// Path to a conversations.json export
        #[arg(long)]
        file: PathBuf,
        /// Emit the distribution as JSON instead of a table
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "convo_insight=info".into()),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::load()?;

    match cli.command {
        Command::Health => run_health(&config).await,
        Command::Analyze {
            file,
            max_pairs,
            report,
        } => run_analyze(&config, &file, max_pairs, report.as_deref()).await,
        Command::Inspect { file, json } => run_inspect(&file, json),
    }
}

async fn run_health(config: &Config) -> Result<()> {
    let client = Arc::new(ApiClient::from_config(config)?);
    let monitor = HealthMonitor::new(client);
    let status = monitor.check().await;

    println!(
        "backend: {}",
        if status.is_healthy { "healthy" } else { "unhealthy" }
    );
    println!("api key: {}", if status.has_api_key { "present" } else { "missing" });
    if let Some(message) = &status.error {
        println!("note: {}", message);
    }
    if !status.is_healthy {
        bail!("backend is not ready");
    }
    Ok(())
}

async fn run_analyze(
    config: &Config,
    file: &std::path::Path,
    max_pairs: Option<u32>,
    report_path: Option<&std::path::Path>,
) -> Result<()> {
    let artifact = ConversationArtifact::from_path(file)
        .with_context(|| format!("Failed to read transcript {}", file.display()))?;
    let client = Arc::new(ApiClient::from_config(config)?);
    let session = DeepAnalysis::new(client);
    let max_pairs = max_pairs.or(config.backend.max_pairs_default);

    info!(file = %file.display(), "starting deep analysis");
    let (quality, flow) = tokio::join!(
        session.run_quality_evaluation(&artifact, max_pairs),
        session.run_flow_analysis(&artifact),
    );

    // Each operation fails independently; report whatever came back
    if let Some(err) = session.quality_error() {
        eprintln!("quality evaluation failed: {}", err);
    }
    if let Some(err) = session.flow_error() {
        eprintln!("flow analysis failed: {}", err);
    }

    if let Ok(quality) = &quality {
        print_quality(quality);
    }
    if let Ok(flow) = &flow {
        print_flow(flow);
        if let Ok(quality) = &quality {
            let gain = info_gain::from_results(flow, quality);
            println!("\nInformation gain");
            println!("  DKL(P‖Q) = {:.4}", gain.dkl);
            println!(
                "  IG = {:.4} (R = {:.2}, C = {:.2})",
                gain.gain, gain.relevance, gain.confidence
            );
        }
    }

    if let (Some(path), Ok(quality), Ok(flow)) = (report_path, &quality, &flow) {
        let request = ReportRequest {
            quality_metrics: Some(quality.clone()),
            flow_analysis: Some(flow.clone()),
            metadata: Some(ReportMetadata {
                user_name: None,
                report_title: Some("Conversation analysis report".to_string()),
                generated_at: Some(chrono::Utc::now().to_rfc3339()),
            }),
        };
        let response = session.generate_report(&request).await?;
        match (response.html, response.download_url) {
            (Some(html), _) => {
                std::fs::write(path, html)
                    .with_context(|| format!("Failed to write report to {}", path.display()))?;
                println!("\nreport written to {}", path.display());
            }
            (None, Some(url)) => println!("\nreport available at {}", url),
            (None, None) => eprintln!("report generation returned no content"),
        }
    }

    if quality.is_err() && flow.is_err() {
        bail!("both analysis operations failed");
    }
    Ok(())
}

fn run_inspect(file: &std::path::Path, json: bool) -> Result<()> {
    let conversations = convo_insight::ingest::load_export(file)
        .with_context(|| format!("Failed to parse transcript {}", file.display()))?;
    let Some(conversation) = convo_insight::ingest::longest_conversation(&conversations) else {
        bail!("no usable conversation in {}", file.display());
    };

    if !json {
        println!(
            "conversation: {} ({} messages)",
            conversation.title,
            conversation.messages.len()
        );
    }

    let pairs = convo_insight::ingest::qa_pairs(conversation);
    let turns: Vec<convo_insight::schemas::ConversationTurn> = pairs
        .iter()
        .map(|pair| convo_insight::schemas::ConversationTurn {
            question: pair.question.clone(),
            answer: pair.answer.clone(),
            question_type: String::new(),
            turn_number: Some(pair.turn_index as u32),
            role: None,
            classification: None,
            analysis: None,
            timestamp: None,
        })
        .collect();

    let mut buckets = bloom::build_buckets(&turns);
    distribution::inject_fallback_examples(&mut buckets);
    let entries = analysis::normalize(&buckets, turns.len());
    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
    } else {
        print_distribution(&entries);
    }
    Ok(())
}

fn print_quality(quality: &QualityEvaluationResult) {
    println!("Quality evaluation ({} pairs)", quality.pairs_evaluated);
    for kind in MetricKind::ALL {
        println!(
            "  {:<12} {}",
            kind.key(),
            quality.metrics.metric(kind).describe()
        );
    }
    println!("  overall      {:.2}", quality.overall_score());
}

fn print_flow(flow: &FlowAnalysisResult) {
    println!("\nFlow analysis ({} turns)", flow.total_turns);
    let mut buckets = bloom::build_buckets(&flow.turns);
    distribution::inject_fallback_examples(&mut buckets);
    print_distribution(&analysis::normalize(&buckets, flow.turns.len()));
}

fn print_distribution(entries: &[analysis::DistributionEntry]) {
    println!("Cognitive-level distribution");
    for entry in entries {
        println!("  {:<12} {:>5.1}%", entry.label, entry.percent);
    }
}
