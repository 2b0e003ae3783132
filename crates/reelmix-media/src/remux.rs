//! Container rewrapping.
//!
//! Moves the streams of one container into another (e.g. MOV to MP4)
//! with stream copy, so uploaded clips share a container before they are
//! concatenated.

use std::path::Path;
use tracing::info;

use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::error::{MediaError, MediaResult};

/// Rewrap `input` into the container implied by `output`'s extension.
pub async fn rewrap_container(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    timeout_secs: u64,
) -> MediaResult<()> {
    let input = input.as_ref();
    let output = output.as_ref();

    if !input.exists() {
        return Err(MediaError::FileNotFound(input.to_path_buf()));
    }

    if let Some(parent) = output.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    info!(
        input = %input.display(),
        output = %output.display(),
        "Rewrapping container"
    );

    FfmpegRunner::new()
        .with_timeout(timeout_secs)
        .run(&rewrap_command(input, output))
        .await
}

/// Stream-copy command that never replaces an existing `output`.
fn rewrap_command(input: &Path, output: &Path) -> FfmpegCommand {
    let cmd = FfmpegCommand::new(input, output).no_overwrite().codec_copy();
    if is_mp4_family(output) {
        cmd.faststart()
    } else {
        cmd
    }
}

fn is_mp4_family(path: &Path) -> bool {
    matches!(
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .as_deref(),
        Some("mp4" | "m4v" | "mov")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mp4_family() {
        assert!(is_mp4_family(Path::new("a/b.MP4")));
        assert!(is_mp4_family(Path::new("b.mov")));
        assert!(!is_mp4_family(Path::new("b.webm")));
        assert!(!is_mp4_family(Path::new("b")));
    }

    #[test]
    fn test_rewrap_command() {
        let args = rewrap_command(Path::new("in.mov"), Path::new("out.mp4")).build_args();
        assert_eq!(args[0], "-n");
        assert!(args.windows(2).any(|w| w == ["-c", "copy"]));
        assert!(args.windows(2).any(|w| w == ["-movflags", "+faststart"]));

        let args = rewrap_command(Path::new("in.mov"), Path::new("out.webm")).build_args();
        assert!(!args.iter().any(|a| a == "-movflags"));
    }

    #[tokio::test]
    async fn test_missing_input() {
        let dir = tempfile::tempdir().unwrap();
        let err = rewrap_container(dir.path().join("in.mov"), dir.path().join("out.mp4"), 0)
            .await
            .unwrap_err();
        assert!(matches!(err, MediaError::FileNotFound(_)));
    }
}
