use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Process all video files in a directory
    Run {
        /// Input directory containing video files
        #[arg(short = 'd', long)]
        directory: PathBuf,

        /// Output directory for subtitle files and subtitled videos
        #[arg(short = 'o', long)]
        output_directory: PathBuf,

        /// Target language code for translation
        #[arg(short = 'l', long = "output-lang")]
        output_lang: String,

        /// Source language code; omit to auto-detect per video
        #[arg(short = 's', long = "input-lang")]
        input_lang: Option<String>,

        /// Number of videos to process concurrently
        #[arg(short = 'w', long)]
        workers: Option<usize>,

        /// Disable the per-job progress display
        #[arg(short = 'q', long)]
        quiet: bool,
    },

    /// Store the translation API key
    SetApiKey {
        /// API key for the translation service
        key: String,
    },

    /// Extract audio from a video file
    Extract {
        /// Input video file
        #[arg(short, long)]
        input: PathBuf,

        /// Output audio file
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Embed subtitle files into a video file
    Embed {
        /// Input video file
        #[arg(long)]
        video: PathBuf,

        /// Subtitle files, named like `name.<lang>.srt`
        #[arg(short, long, num_args = 1..)]
        subtitles: Vec<PathBuf>,

        /// Output video file
        #[arg(short, long)]
        output: PathBuf,
    },
}
