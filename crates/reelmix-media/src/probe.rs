//! FFprobe media information.

use serde::Deserialize;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;

use crate::command::check_ffprobe;
use crate::error::{MediaError, MediaResult};

#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    format: FfprobeFormat,
}

#[derive(Debug, Deserialize)]
struct FfprobeFormat {
    duration: Option<String>,
}

/// Get media duration in seconds from the container header.
pub async fn probe_duration(path: impl AsRef<Path>) -> MediaResult<f64> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(MediaError::FileNotFound(path.to_path_buf()));
    }

    check_ffprobe()?;

    let output = Command::new("ffprobe")
        .args(["-v", "quiet", "-print_format", "json", "-show_format"])
        .arg(path)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await?;

    if !output.status.success() {
        return Err(MediaError::FfprobeFailed {
            message: format!("FFprobe failed for {}", path.display()),
            stderr: Some(String::from_utf8_lossy(&output.stderr).to_string()),
        });
    }

    parse_probe_output(&output.stdout)
}

fn parse_probe_output(stdout: &[u8]) -> MediaResult<f64> {
    let probe: FfprobeOutput = serde_json::from_slice(stdout)?;

    probe
        .format
        .duration
        .as_deref()
        .and_then(|d| d.parse::<f64>().ok())
        .filter(|d| d.is_finite() && *d >= 0.0)
        .ok_or_else(|| MediaError::invalid_media("Missing or invalid duration"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_probe_output() {
        let json = br#"{
            "streams": [
                {"codec_type": "audio", "codec_name": "aac"},
                {"codec_type": "video", "codec_name": "h264", "width": 1080, "height": 1920}
            ],
            "format": {"duration": "12.480000", "format_name": "mov,mp4,m4a,3gp,3g2,mj2"}
        }"#;

        let duration = parse_probe_output(json).unwrap();
        assert!((duration - 12.48).abs() < 1e-6);
    }

    #[test]
    fn test_negative_duration_is_invalid() {
        let json = br#"{"format": {"duration": "-1.0"}}"#;
        assert!(matches!(
            parse_probe_output(json),
            Err(MediaError::InvalidMedia(_))
        ));
    }

    #[test]
    fn test_missing_duration_is_invalid() {
        let json = br#"{"streams": [], "format": {"format_name": "webm"}}"#;
        assert!(matches!(
            parse_probe_output(json),
            Err(MediaError::InvalidMedia(_))
        ));
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            parse_probe_output(b"not json"),
            Err(MediaError::JsonParse(_))
        ));
    }
}
