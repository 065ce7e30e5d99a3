//! Subbatch - Batch Subtitle Generation and Translation
//!
//! Entry point for the subbatch CLI: generates transcribed and translated
//! subtitles for every video in a directory and embeds them back into the
//! videos, processing multiple files concurrently.

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing::{info, Level};
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use subbatch::cli::{Args, Commands};
use subbatch::config::Config;
use subbatch::error::SubbatchError;
use subbatch::job::{BatchReport, JobStatus};
use subbatch::keystore::KeyStore;
use subbatch::lang;
use subbatch::media::{MediaProcessorFactory, SubtitleTrack};
use subbatch::orchestrator::{BatchRequest, Orchestrator};
use subbatch::pipeline::Pipeline;
use subbatch::progress::{ConsoleProgress, NullProgress, ProgressSink};
use subbatch::transcribe::TranscriberFactory;
use subbatch::translate::{self, TranslatorFactory};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    setup_logging(args.verbose)?;

    let config = match &args.config {
        Some(config_path) => Config::from_file(config_path)?,
        None => {
            if Path::new("config.toml").exists() {
                info!("Found config.toml in current directory, loading...");
                Config::from_file("config.toml")?
            } else {
                Config::default()
            }
        }
    };

    match args.command {
        Commands::SetApiKey { key } => {
            info!("Validating API key before saving");
            translate::validate_api_key(&config.translate, &key).await?;

            let keystore = KeyStore::new()?;
            keystore.save_api_key(&key)?;
            println!("API key {} validated and saved", KeyStore::mask_api_key(&key));
        }
        Commands::Run {
            directory,
            output_directory,
            output_lang,
            input_lang,
            workers,
            quiet,
        } => {
            validate_language(&output_lang)?;
            if let Some(ref input_lang) = input_lang {
                validate_language(input_lang)?;
            }

            let keystore = KeyStore::new()?;
            let api_key = keystore.load_api_key()?;

            let media = MediaProcessorFactory::create_processor(config.media.clone());
            media.check_availability()?;

            let pipeline = Arc::new(Pipeline::new(
                Arc::from(TranscriberFactory::create_default(config.transcriber.clone())),
                Arc::from(TranslatorFactory::create_translator(
                    config.translate.clone(),
                    api_key,
                )),
                Arc::from(media),
            ));

            let progress: Arc<dyn ProgressSink> = if quiet {
                Arc::new(NullProgress)
            } else {
                Arc::new(ConsoleProgress::new())
            };

            let orchestrator = Orchestrator::new(
                pipeline,
                progress,
                config.batch.video_extensions.clone(),
            );

            let request = BatchRequest {
                input_dir: directory,
                output_dir: output_directory,
                target_lang: output_lang,
                source_lang: input_lang,
                workers: workers.unwrap_or(config.batch.workers),
            };

            let report = orchestrator.run(&request).await?;
            print_report(&report);

            if !report.all_succeeded() {
                std::process::exit(1);
            }
        }
        Commands::Extract { input, output } => {
            info!("Extracting audio from: {}", input.display());
            let media = MediaProcessorFactory::create_processor(config.media);
            media.extract_audio(&input, &output).await?;
            println!("Audio written to {}", output.display());
        }
        Commands::Embed {
            video,
            subtitles,
            output,
        } => {
            info!("Embedding subtitles into video: {}", video.display());
            let tracks: Vec<SubtitleTrack> = subtitles
                .iter()
                .map(|path| SubtitleTrack {
                    path: path.clone(),
                    language: subtitle_language(path),
                })
                .collect();

            let media = MediaProcessorFactory::create_processor(config.media);
            media.embed_subtitles(&video, &tracks, &output).await?;
            println!("Subtitled video written to {}", output.display());
        }
    }

    Ok(())
}

/// Setup logging to both console and file
fn setup_logging(verbose: bool) -> Result<()> {
    let log_dir = std::env::current_dir()?.join(".subbatch").join("log");
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = rolling::daily(&log_dir, "subbatch.log");
    let (non_blocking_file, guard) = non_blocking(file_appender);
    // Keep the guard alive for the duration of the program
    std::mem::forget(guard);

    let log_level = if verbose { Level::DEBUG } else { Level::INFO };

    let console_layer = fmt::layer().with_target(false);

    let file_layer = fmt::layer()
        .with_writer(non_blocking_file)
        .with_target(false)
        .with_thread_ids(true)
        .with_ansi(false);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    Ok(())
}

fn validate_language(code: &str) -> Result<()> {
    if lang::is_supported(code) {
        Ok(())
    } else {
        Err(SubbatchError::Config(format!("Unsupported language code: '{}'", code)).into())
    }
}

/// Derive a subtitle track language from a `name.<lang>.srt` filename.
/// Falls back to "und" (undetermined) when the name carries no code.
fn subtitle_language(path: &Path) -> String {
    path.file_stem()
        .and_then(|stem| Path::new(stem).extension())
        .and_then(|lang| lang.to_str())
        .filter(|lang| lang::is_supported(lang))
        .unwrap_or("und")
        .to_string()
}

fn print_report(report: &BatchReport) {
    let elapsed = report.finished_at - report.started_at;

    println!();
    println!(
        "Batch finished in {}s: {} succeeded, {} skipped, {} failed",
        elapsed.num_seconds(),
        report.succeeded(),
        report.skipped(),
        report.failed()
    );

    for result in &report.results {
        match &result.status {
            JobStatus::Success { outputs } => {
                println!("  ok      {}", result.source.display());
                for output in outputs {
                    println!("            -> {}", output.display());
                }
            }
            JobStatus::Skipped => {
                println!("  skipped {} (output exists)", result.source.display());
            }
            JobStatus::Failed { stage, error } => {
                println!(
                    "  FAILED  {} at {}: {}",
                    result.source.display(),
                    stage,
                    error
                );
            }
        }
    }
}
