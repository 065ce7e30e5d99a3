use std::path::Path;
use std::process::Command;
use tracing::debug;

use crate::error::{Result, SubbatchError};
use super::SubtitleTrack;

/// Abstract media processing command representation
#[derive(Debug, Clone)]
pub struct MediaCommand {
    pub binary_path: String,
    pub args: Vec<String>,
    pub description: String,
}

impl MediaCommand {
    /// Create a new media processing command
    pub fn new<S1: Into<String>, S2: Into<String>>(binary_path: S1, description: S2) -> Self {
        Self {
            binary_path: binary_path.into(),
            args: Vec::new(),
            description: description.into(),
        }
    }

    /// Add an argument
    pub fn arg<S: Into<String>>(mut self, arg: S) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Add input file
    pub fn input<P: AsRef<Path>>(self, path: P) -> Self {
        self.arg("-i").arg(path.as_ref().to_string_lossy().to_string())
    }

    /// Add output file
    pub fn output<P: AsRef<Path>>(self, path: P) -> Self {
        self.arg(path.as_ref().to_string_lossy().to_string())
    }

    /// Force overwrite output
    pub fn overwrite(self) -> Self {
        self.arg("-y")
    }

    /// Set audio codec
    pub fn audio_codec<S: Into<String>>(self, codec: S) -> Self {
        self.arg("-c:a").arg(codec)
    }

    /// Disable video
    pub fn no_video(self) -> Self {
        self.arg("-vn")
    }

    /// Set audio sample rate
    pub fn audio_sample_rate(self, rate: u32) -> Self {
        self.arg("-ar").arg(rate.to_string())
    }

    /// Set audio channels
    pub fn audio_channels(self, channels: u32) -> Self {
        self.arg("-ac").arg(channels.to_string())
    }

    /// Execute the command, mapping failure through the given error kind
    pub async fn execute<F>(&self, to_error: F) -> Result<()>
    where
        F: Fn(String) -> SubbatchError,
    {
        debug!("Executing media command: {} {:?}", self.binary_path, self.args);

        let mut cmd = Command::new(&self.binary_path);
        cmd.args(&self.args);

        let output = cmd
            .output()
            .map_err(|e| to_error(format!("Failed to execute media tool: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(to_error(format!("{} failed: {}", self.description, stderr)));
        }

        Ok(())
    }
}

/// Builder for the media operations the pipeline needs
pub struct MediaCommandBuilder {
    binary_path: String,
}

impl MediaCommandBuilder {
    /// Create a new command builder
    pub fn new<S: Into<String>>(binary_path: S) -> Self {
        Self {
            binary_path: binary_path.into(),
        }
    }

    /// Build audio extraction command (mono 16 kHz PCM, what whisper wants)
    pub fn extract_audio<P: AsRef<Path>>(&self, video_path: P, audio_path: P) -> MediaCommand {
        MediaCommand::new(&self.binary_path, "Audio extraction")
            .input(video_path)
            .no_video()
            .audio_codec("pcm_s16le")
            .audio_sample_rate(16000)
            .audio_channels(1)
            .overwrite()
            .output(audio_path)
    }

    /// Build subtitle track embedding command. Video and audio streams are
    /// copied; each subtitle file becomes its own track tagged with its
    /// language code. MP4-family containers need mov_text, everything else
    /// takes srt directly.
    pub fn embed_subtitles<P: AsRef<Path>>(
        &self,
        video_path: P,
        tracks: &[SubtitleTrack],
        output_path: P,
        additional_options: &[String],
    ) -> MediaCommand {
        let subtitle_codec = match output_path
            .as_ref()
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .as_deref()
        {
            Some("mp4") | Some("mov") | Some("m4v") => "mov_text",
            _ => "srt",
        };

        let mut cmd = MediaCommand::new(&self.binary_path, "Subtitle embedding")
            .overwrite()
            .input(&video_path);

        for track in tracks {
            cmd = cmd.input(&track.path);
        }

        // Map the full source plus each subtitle input
        cmd = cmd.arg("-map").arg("0");
        for (idx, _) in tracks.iter().enumerate() {
            cmd = cmd.arg("-map").arg(format!("{}", idx + 1));
        }

        cmd = cmd
            .arg("-c").arg("copy")
            .arg("-c:s").arg(subtitle_codec);

        for (idx, track) in tracks.iter().enumerate() {
            cmd = cmd
                .arg(format!("-metadata:s:s:{}", idx))
                .arg(format!("language={}", track.language));
        }

        for option in additional_options {
            cmd = cmd.arg(option);
        }

        cmd.output(output_path)
    }

    /// Build version check command
    pub fn version_check(&self) -> MediaCommand {
        MediaCommand::new(&self.binary_path, "Version check").arg("-version")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_extract_audio_args() {
        let builder = MediaCommandBuilder::new("ffmpeg");
        let cmd = builder.extract_audio(Path::new("in.mp4"), Path::new("out.wav"));

        assert_eq!(cmd.binary_path, "ffmpeg");
        assert_eq!(
            cmd.args,
            vec![
                "-i", "in.mp4", "-vn", "-c:a", "pcm_s16le", "-ar", "16000", "-ac", "1",
                "-y", "out.wav"
            ]
        );
    }

    #[test]
    fn test_embed_two_tracks_mp4_uses_mov_text() {
        let builder = MediaCommandBuilder::new("ffmpeg");
        let tracks = vec![
            SubtitleTrack {
                path: PathBuf::from("a.en.srt"),
                language: "en".to_string(),
            },
            SubtitleTrack {
                path: PathBuf::from("a.es.srt"),
                language: "es".to_string(),
            },
        ];
        let cmd = builder.embed_subtitles(
            Path::new("a.mp4"),
            &tracks,
            Path::new("a.subtitled.mp4"),
            &[],
        );

        let args = cmd.args.join(" ");
        assert!(args.contains("-map 0 -map 1 -map 2"));
        assert!(args.contains("-c:s mov_text"));
        assert!(args.contains("-metadata:s:s:0 language=en"));
        assert!(args.contains("-metadata:s:s:1 language=es"));
    }

    #[test]
    fn test_embed_mkv_uses_srt_codec() {
        let builder = MediaCommandBuilder::new("ffmpeg");
        let tracks = vec![SubtitleTrack {
            path: PathBuf::from("a.es.srt"),
            language: "es".to_string(),
        }];
        let cmd = builder.embed_subtitles(
            Path::new("a.mkv"),
            &tracks,
            Path::new("a.subtitled.mkv"),
            &[],
        );
        assert!(cmd.args.join(" ").contains("-c:s srt"));
    }
}
