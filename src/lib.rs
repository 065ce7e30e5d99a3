//! Subbatch - Batch Subtitle Generation and Translation
//!
//! A command-line pipeline that extracts audio from local video files,
//! transcribes speech, translates the transcript, and embeds the resulting
//! subtitles back into the video. Batches run across a directory with a
//! bounded worker pool; one video's failure never aborts the batch.

pub mod cli;
pub mod config;
pub mod error;
pub mod job;
pub mod keystore;
pub mod lang;
pub mod media;
pub mod orchestrator;
pub mod pipeline;
pub mod progress;
pub mod subtitle;
pub mod transcribe;
pub mod transcript;
pub mod translate;
