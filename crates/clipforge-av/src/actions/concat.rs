//! Video concatenation via the concat demuxer.

use super::run_ffmpeg;
use crate::{Error, Result};
use std::path::Path;

/// Render the concat demuxer manifest for a list of inputs.
fn build_manifest(inputs: &[&Path]) -> String {
    inputs
        .iter()
        .map(|p| format!("file '{}'\n", p.display()))
        .collect()
}

/// Concatenate videos into a single output file.
///
/// A stream-copy pass runs first; if the inputs have mismatched codecs or
/// parameters and the copy fails, a re-encode pass (libx264 / aac) is
/// attempted before giving up. The concat manifest is written into
/// `work_dir` and removed before returning, on success and failure alike.
pub async fn concat_videos(inputs: &[&Path], output: &Path, work_dir: &Path) -> Result<()> {
    if inputs.is_empty() {
        return Err(Error::invalid_input("No input videos to concatenate"));
    }

    let manifest_path = work_dir.join("concat-manifest.txt");
    tokio::fs::write(&manifest_path, build_manifest(inputs)).await?;

    let result = run_concat(&manifest_path, output).await;

    // Best effort; the manifest lives in a temp workspace anyway
    if let Err(err) = tokio::fs::remove_file(&manifest_path).await {
        tracing::debug!(error = %err, "Failed to remove concat manifest");
    }

    result
}

async fn run_concat(manifest: &Path, output: &Path) -> Result<()> {
    let copy_result = run_ffmpeg([
        "-y".as_ref(),
        "-f".as_ref(),
        "concat".as_ref(),
        "-safe".as_ref(),
        "0".as_ref(),
        "-i".as_ref(),
        manifest.as_os_str(),
        "-c".as_ref(),
        "copy".as_ref(),
        output.as_os_str(),
    ])
    .await;

    match copy_result {
        Ok(()) => Ok(()),
        Err(err) => {
            tracing::warn!(error = %err, "Stream-copy concat failed, re-encoding");
            run_ffmpeg([
                "-y".as_ref(),
                "-f".as_ref(),
                "concat".as_ref(),
                "-safe".as_ref(),
                "0".as_ref(),
                "-i".as_ref(),
                manifest.as_os_str(),
                "-c:v".as_ref(),
                "libx264".as_ref(),
                "-preset".as_ref(),
                "fast".as_ref(),
                "-c:a".as_ref(),
                "aac".as_ref(),
                output.as_os_str(),
            ])
            .await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_manifest_format() {
        let a = PathBuf::from("/tmp/a.mp4");
        let b = PathBuf::from("/tmp/b.mp4");
        let manifest = build_manifest(&[a.as_path(), b.as_path()]);
        assert_eq!(manifest, "file '/tmp/a.mp4'\nfile '/tmp/b.mp4'\n");
    }

    #[test]
    fn test_manifest_preserves_order() {
        let paths: Vec<PathBuf> = (0..4).map(|i| PathBuf::from(format!("/v/{i}.mp4"))).collect();
        let refs: Vec<&Path> = paths.iter().map(|p| p.as_path()).collect();
        let manifest = build_manifest(&refs);
        let lines: Vec<&str> = manifest.lines().collect();
        assert_eq!(lines[0], "file '/v/0.mp4'");
        assert_eq!(lines[3], "file '/v/3.mp4'");
    }

    #[tokio::test]
    async fn test_empty_input_list_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out.mp4");
        let result = concat_videos(&[], &out, dir.path()).await;
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }
}
