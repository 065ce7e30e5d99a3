use std::path::Path;
use tokio::fs;
use tracing::info;

use crate::error::{Result, SubbatchError};
use crate::transcript::TranscriptSegment;

/// Serialize timed segments to an SRT subtitle file.
pub async fn write_srt<P: AsRef<Path>>(segments: &[TranscriptSegment], output_path: P) -> Result<()> {
    let output_path = output_path.as_ref();
    info!("Writing SRT file: {}", output_path.display());

    let mut srt_content = String::new();

    for (index, segment) in segments.iter().enumerate() {
        let start_time = format_srt_time(segment.start);
        let end_time = format_srt_time(segment.end);

        srt_content.push_str(&format!(
            "{}\n{} --> {}\n{}\n\n",
            index + 1,
            start_time,
            end_time,
            segment.text.trim()
        ));
    }

    if let Some(parent) = output_path.parent() {
        fs::create_dir_all(parent)
            .await
            .map_err(|e| SubbatchError::SubtitleWrite(format!("Cannot create {}: {}", parent.display(), e)))?;
    }

    fs::write(output_path, srt_content)
        .await
        .map_err(|e| SubbatchError::SubtitleWrite(format!("Cannot write {}: {}", output_path.display(), e)))?;

    Ok(())
}

/// Format time in seconds to SRT time format (HH:MM:SS,mmm)
fn format_srt_time(seconds: f64) -> String {
    let total_milliseconds = (seconds * 1000.0) as u64;
    let hours = total_milliseconds / 3_600_000;
    let minutes = (total_milliseconds % 3_600_000) / 60_000;
    let secs = (total_milliseconds % 60_000) / 1_000;
    let millis = total_milliseconds % 1_000;

    format!("{:02}:{:02}:{:02},{:03}", hours, minutes, secs, millis)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transcript::TranscriptSegment;
    use tempfile::tempdir;

    #[test]
    fn test_format_srt_time() {
        assert_eq!(format_srt_time(0.0), "00:00:00,000");
        assert_eq!(format_srt_time(65.123), "00:01:05,123");
        assert_eq!(format_srt_time(3661.500), "01:01:01,500");
    }

    #[tokio::test]
    async fn test_write_srt() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.srt");

        let segments = vec![
            TranscriptSegment::new(0, 0.0, 1.5, "Hello there. ".to_string()).unwrap(),
            TranscriptSegment::new(1, 2.0, 3.25, "General greeting.".to_string()).unwrap(),
        ];

        write_srt(&segments, &path).await.unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            content,
            "1\n00:00:00,000 --> 00:00:01,500\nHello there.\n\n\
             2\n00:00:02,000 --> 00:00:03,250\nGeneral greeting.\n\n"
        );
    }

    #[tokio::test]
    async fn test_write_srt_creates_parent_dirs() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested/deeper/out.srt");
        let segments = vec![TranscriptSegment::new(0, 0.0, 1.0, "x".to_string()).unwrap()];

        write_srt(&segments, &path).await.unwrap();
        assert!(path.exists());
    }
}
