use std::{
    path::PathBuf,
    sync::Arc,
    time::{Duration, Instant},
};

use anyhow::{Context as _, Result};
use clap::Parser;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use pinocchio_core::{
    AcquisitionRequest, AcquisitionStage, AnalysisCache, AnalysisResult, Config, ContentDocument,
    ContentSource, ContentType, HttpTranscriptFetcher, NoPageState, ScoringClient,
    TranscriptAcquisition, TranscriptError, events::BusConfig, format_analysis_readable,
    workers::ContentSubmitted, youtube::publish_document,
};

use crate::{
    pipeline::start_pipeline,
    presenter::{AnalysisPresenter, FallbackPresenter, Presented, Presenter, SaveDocumentPresenter},
};

mod logging;
mod pipeline;
mod presenter;
mod workers;

fn format_elapsed(d: Duration) -> String {
    let secs = d.as_secs_f64();
    if secs < 60.0 {
        format!("{:.1}s", secs)
    } else {
        format!("{:.0}m {:.0}s", (secs / 60.0).floor(), secs % 60.0)
    }
}

#[derive(Parser)]
#[command(name = "pinocchio")]
#[command(about = "Score a YouTube transcript, a page, or a piece of text for misinformation")]
struct Cli {
    /// YouTube watch page URL, any other page URL, or text to check
    #[arg(required_unless_present = "file", conflicts_with = "file")]
    input: Option<String>,

    /// Check the contents of a text file
    #[arg(long, value_name = "PATH")]
    file: Option<PathBuf>,

    /// Treat INPUT as text selected on the page at this URL
    #[arg(long, value_name = "URL", requires = "input")]
    selected_from: Option<String>,

    /// Title of the page given with --selected-from
    #[arg(long, requires = "selected_from")]
    page_title: Option<String>,

    /// Scoring service base URL (overrides PINOCCHIO_API_URL)
    #[arg(long)]
    api_url: Option<String>,

    /// Ignore any cached analysis and score again
    #[arg(short, long)]
    force: bool,

    /// Save the document without scoring it
    #[arg(short, long, alias = "save-only")]
    transcript_only: bool,

    /// Print the analysis as JSON
    #[arg(long)]
    json: bool,
}

/// What the user asked to check.
enum Submission {
    Video(AcquisitionRequest),
    Content(ContentDocument),
}

impl Submission {
    fn cache_key(&self) -> String {
        match self {
            Submission::Video(request) => request.page_url.clone(),
            Submission::Content(document) => document.cache_key(),
        }
    }
}

async fn submission(cli: &Cli) -> Result<Submission> {
    if let Some(path) = &cli.file {
        let contents = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("read {}", path.display()))?;
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        return Ok(Submission::Content(ContentDocument::file(&name, contents)));
    }

    let input = cli.input.as_deref().context("nothing to check")?;
    if let Some(page_url) = &cli.selected_from {
        let title = cli.page_title.as_deref().unwrap_or(page_url);
        return Ok(Submission::Content(ContentDocument::selection(
            title, page_url, input,
        )));
    }

    if ContentType::of_input(input) == ContentType::Youtube {
        match AcquisitionRequest::from_page_url(input.trim()) {
            Ok(request) => return Ok(Submission::Video(request)),
            // short links and the like go to the service as plain URLs
            Err(err) => tracing::debug!(%err, "no video id, submitting the URL as is"),
        }
    }
    Ok(Submission::Content(ContentDocument::direct_input(input)))
}

/// Cached analysis for `key`. With `force` the entry is dropped instead.
async fn cached_analysis(cache: &AnalysisCache, key: &str, force: bool) -> Option<AnalysisResult> {
    if force {
        if let Err(err) = cache.invalidate(key).await {
            tracing::warn!(%err, "could not drop cached analysis");
        }
        return None;
    }
    cache.load(key).await
}

fn create_spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

fn stage_message(stage: AcquisitionStage) -> Option<&'static str> {
    match stage {
        AcquisitionStage::Idle | AcquisitionStage::FetchingState => Some("Fetching player state..."),
        AcquisitionStage::SelectingTrack => Some("Selecting caption track..."),
        AcquisitionStage::FetchingPayload => Some("Downloading captions..."),
        AcquisitionStage::Normalizing => Some("Normalizing transcript..."),
        AcquisitionStage::Formatting => Some("Formatting document..."),
        AcquisitionStage::Done | AcquisitionStage::Failed(_) => None,
    }
}

fn presenting_spinner(transcript_only: bool) -> ProgressBar {
    create_spinner(if transcript_only {
        "Saving document..."
    } else {
        "Analyzing content..."
    })
}

fn fail(message: impl std::fmt::Display) -> ! {
    eprintln!("{} {}", style("Error:").red().bold(), message);
    std::process::exit(1);
}

fn print_analysis(result: &AnalysisResult, json: bool) -> Result<()> {
    println!("{}", style("─".repeat(60)).dim());
    if json {
        println!("{}", serde_json::to_string_pretty(result)?);
    } else {
        println!("{}", format_analysis_readable(result));
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init()?;

    let mut config = Config::from_env().context("read configuration")?;
    if let Some(api_url) = &cli.api_url {
        config = config.with_api_base_url(api_url)?;
    }

    let submission = match submission(&cli).await {
        Ok(submission) => submission,
        Err(err) => fail(format!("{err:#}")),
    };

    println!(
        "\n{}  {}\n",
        style("pinocchio").cyan().bold(),
        style("Misinformation Checker").dim()
    );

    let cache = AnalysisCache::new(&config.cache_dir);
    if !cli.transcript_only {
        if let Some(result) = cached_analysis(&cache, &submission.cache_key(), cli.force).await {
            println!(
                "{} Analyzed {}",
                style("✓").green().bold(),
                style("(cached)").dim()
            );
            return print_analysis(&result, cli.json);
        }
    }

    let presenter: Arc<dyn Presenter> = if cli.transcript_only {
        Arc::new(SaveDocumentPresenter::new(cache.clone()))
    } else {
        Arc::new(FallbackPresenter::new(
            AnalysisPresenter::new(ScoringClient::new(&config)?, cache.clone()),
            SaveDocumentPresenter::new(cache.clone()),
        ))
    };

    let mut handle = start_pipeline(BusConfig::default(), presenter)?;

    let shutdown_tx = handle.shutdown_tx.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = shutdown_tx.send(());
        }
    });
    let mut shutdown_rx = handle.shutdown_tx.subscribe();

    println!("{}", style("─".repeat(60)).dim());
    let total_start = Instant::now();

    let (spinner, delivered) = match submission {
        Submission::Video(request) => {
            // Step 1: Transcript
            let spinner = create_spinner("Fetching player state...");
            let observer_spinner = spinner.clone();
            let fetcher = HttpTranscriptFetcher::new(&config, Arc::new(NoPageState))?;
            let acquisition =
                TranscriptAcquisition::new(fetcher).with_stage_observer(move |stage| {
                    if let Some(message) = stage_message(stage) {
                        observer_spinner.set_message(message);
                    }
                });

            let document = match acquisition.acquire_until(&request, &mut shutdown_rx).await {
                Ok(document) => document,
                Err(TranscriptError::Cancelled) => {
                    spinner.finish_with_message(format!("{} Cancelled", style("✗").yellow().bold()));
                    handle.shutdown();
                    std::process::exit(130);
                }
                Err(err) => {
                    spinner.finish_with_message(format!("{} Transcript", style("✗").red().bold()));
                    handle.shutdown();
                    fail(err);
                }
            };
            spinner.finish_with_message(format!(
                "{} Transcript: {} {}",
                style("✓").green().bold(),
                style(&document.metadata.title).yellow(),
                style(format!("[{}]", format_elapsed(total_start.elapsed()))).dim()
            ));

            // Step 2: Presentation
            let spinner = presenting_spinner(cli.transcript_only);
            let (_, delivered) = publish_document(&handle.bus, &request, document);
            (spinner, delivered)
        }
        Submission::Content(document) => {
            println!(
                "{} {}: {}",
                style("✓").green().bold(),
                style(document.content_type.as_str()).dim(),
                style(&document.title).yellow()
            );

            let spinner = presenting_spinner(cli.transcript_only);
            let delivered = handle.bus.publish(Arc::new(ContentSubmitted::new(
                Vec::new(),
                ContentSource::Selection,
                Arc::new(document),
            )));
            (spinner, delivered)
        }
    };
    let step_start = Instant::now();

    if delivered == 0 {
        spinner.finish_with_message(format!("{} Presentation", style("✗").red().bold()));
        handle.shutdown();
        fail("no worker accepted the content");
    }

    let completion = tokio::select! {
        done = &mut handle.done_rx => done.context("pipeline stopped before completing")?,
        _ = shutdown_rx.recv() => {
            spinner.finish_with_message(format!("{} Cancelled", style("✗").yellow().bold()));
            std::process::exit(130);
        }
    };
    handle.shutdown();

    let presented = match completion {
        Ok(presented) => presented,
        Err(failed) => {
            spinner.finish_with_message(format!("{} {}", style("✗").red().bold(), failed.stage));
            fail(failed.message);
        }
    };
    spinner.finish_with_message(format!(
        "{} Done {}",
        style("✓").green().bold(),
        style(format!("[{}]", format_elapsed(step_start.elapsed()))).dim()
    ));

    println!(
        "\n{} {}\n",
        style("Total time:").dim(),
        style(format_elapsed(total_start.elapsed())).cyan().bold()
    );

    match presented {
        Presented::Analysis { result } => print_analysis(&result, cli.json)?,
        Presented::Saved { path } => {
            if !cli.transcript_only {
                println!(
                    "{} scoring service unavailable, document saved instead",
                    style("!").yellow().bold()
                );
            }
            println!("{} {}", style("Saved:").dim(), style(path.display()).cyan());
        }
    }

    Ok(())
}
