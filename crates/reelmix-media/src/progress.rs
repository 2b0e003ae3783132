//! FFmpeg progress parsing.

use serde::{Deserialize, Serialize};

/// Progress information from FFmpeg.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FfmpegProgress {
    /// Output time in milliseconds
    pub out_time_ms: i64,
    /// Total bytes written so far
    pub total_size: u64,
    /// Processing speed (e.g., 40.0 = 40x realtime for stream copy)
    pub speed: f64,
    /// Whether processing is complete
    pub is_complete: bool,
}

/// Parse one line of `-progress` output.
///
/// Returns `Some(line)` back to the caller when the line is not a progress
/// key, so diagnostics can be collected separately. Returns `None` for
/// progress keys; the `progress=` key completes a block and is reported via
/// `on_block`.
pub(crate) fn parse_progress_line<'a, F>(
    line: &'a str,
    current: &mut FfmpegProgress,
    mut on_block: F,
) -> Option<&'a str>
where
    F: FnMut(&FfmpegProgress),
{
    let trimmed = line.trim();
    let Some((key, value)) = trimmed.split_once('=') else {
        return Some(trimmed);
    };

    match key {
        "out_time_us" => {
            if let Ok(us) = value.parse::<i64>() {
                current.out_time_ms = us / 1000;
            }
        }
        // FFmpeg reports microseconds under this key too
        "out_time_ms" => {
            if let Ok(us) = value.parse::<i64>() {
                current.out_time_ms = us / 1000;
            }
        }
        "total_size" => {
            if let Ok(size) = value.parse() {
                current.total_size = size;
            }
        }
        "speed" => {
            if let Some(speed) = value.strip_suffix('x').and_then(|s| s.trim().parse().ok()) {
                current.speed = speed;
            }
        }
        "progress" => {
            if value == "end" {
                current.is_complete = true;
            }
            on_block(current);
        }
        "frame" | "fps" | "bitrate" | "out_time" | "dup_frames" | "drop_frames" => {}
        k if k.starts_with("stream_") => {}
        _ => return Some(trimmed),
    }

    None
}
