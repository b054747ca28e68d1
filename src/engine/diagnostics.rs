//! Maps yt-dlp stderr output onto the engine error taxonomy.
//!
//! yt-dlp exits non-zero for everything from a mistyped URL to a missing
//! ffmpeg, all distinguished only by message text. The patterns below are
//! verbatim fragments of its diagnostics; anything unrecognized falls
//! through to a generic failure carrying a summary of the output.

use std::process::ExitStatus;

use super::EngineError;

/// Fragments indicating the source URL is unusable: unreachable, gone,
/// access-restricted, or not a media page at all.
const INVALID_SOURCE_PATTERNS: &[&str] = &[
    "is not a valid URL",
    "Unsupported URL",
    "Unable to download webpage",
    "Video unavailable",
    "Private video",
    "This video is not available",
    "Incomplete YouTube ID",
    "HTTP Error 404",
    "HTTP Error 410",
];

/// Fragments indicating the media downloaded but conversion failed.
const TRANSCODE_PATTERNS: &[&str] = &[
    "Postprocessing:",
    "ffprobe and ffmpeg not found",
    "ffmpeg not found",
    "Conversion failed",
];

const NO_FORMAT_PATTERN: &str = "Requested format is not available";

const SUMMARY_LIMIT: usize = 300;

pub(super) fn classify_failure(stderr: &str, status: ExitStatus) -> EngineError {
    let summary = error_summary(stderr, status);

    if stderr.contains(NO_FORMAT_PATTERN) {
        return EngineError::NoMatchingFormat(summary);
    }
    if TRANSCODE_PATTERNS.iter().any(|p| stderr.contains(p)) {
        return EngineError::TranscodeFailed(summary);
    }
    if INVALID_SOURCE_PATTERNS.iter().any(|p| stderr.contains(p)) {
        return EngineError::InvalidSource(summary);
    }
    EngineError::Failed(summary)
}

/// Picks the most useful single line out of stderr: the last `ERROR:` line
/// if there is one, otherwise the last non-empty line, otherwise the exit
/// status. Truncated so a chatty engine cannot flood error responses.
pub(super) fn error_summary(stderr: &str, status: ExitStatus) -> String {
    let line = stderr
        .lines()
        .map(str::trim)
        .filter(|line| line.starts_with("ERROR:"))
        .next_back()
        .map(|line| line.trim_start_matches("ERROR:").trim())
        .or_else(|| stderr.lines().map(str::trim).filter(|l| !l.is_empty()).next_back());

    match line {
        Some(line) => truncate(line, SUMMARY_LIMIT),
        None => format!("engine exited with {status}"),
    }
}

fn truncate(line: &str, limit: usize) -> String {
    if line.len() <= limit {
        return line.to_string();
    }
    let mut cut = limit;
    while !line.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}...", &line[..cut])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(unix)]
    fn failed_status() -> ExitStatus {
        use std::os::unix::process::ExitStatusExt;
        ExitStatus::from_raw(256)
    }

    #[cfg(not(unix))]
    fn failed_status() -> ExitStatus {
        std::process::Command::new("cmd")
            .args(["/C", "exit 1"])
            .status()
            .unwrap()
    }

    #[test]
    fn unavailable_video_is_invalid_source() {
        let err = classify_failure(
            "ERROR: [youtube] dQw4w9WgXcQ: Video unavailable",
            failed_status(),
        );
        assert!(matches!(err, EngineError::InvalidSource(_)));
    }

    #[test]
    fn malformed_url_is_invalid_source() {
        let err = classify_failure(
            "ERROR: 'htp:/nope' is not a valid URL",
            failed_status(),
        );
        assert!(matches!(err, EngineError::InvalidSource(_)));
    }

    #[test]
    fn missing_format_is_classified() {
        let err = classify_failure(
            "ERROR: [youtube] abc: Requested format is not available",
            failed_status(),
        );
        assert!(matches!(err, EngineError::NoMatchingFormat(_)));
    }

    #[test]
    fn postprocessing_failure_is_transcode() {
        let err = classify_failure(
            "ERROR: Postprocessing: audio conversion failed",
            failed_status(),
        );
        assert!(matches!(err, EngineError::TranscodeFailed(_)));
    }

    #[test]
    fn missing_ffmpeg_is_transcode() {
        let err = classify_failure(
            "ERROR: You have requested merging of multiple formats but ffmpeg is not installed. ffprobe and ffmpeg not found",
            failed_status(),
        );
        assert!(matches!(err, EngineError::TranscodeFailed(_)));
    }

    #[test]
    fn unknown_output_falls_back_to_failed() {
        let err = classify_failure("something exploded", failed_status());
        match err {
            EngineError::Failed(summary) => assert_eq!(summary, "something exploded"),
            other => panic!("unexpected classification: {other:?}"),
        }
    }

    #[test]
    fn summary_prefers_last_error_line() {
        let stderr = "WARNING: throttled\nERROR: first\nprogress noise\nERROR: second problem\n";
        assert_eq!(error_summary(stderr, failed_status()), "second problem");
    }

    #[test]
    fn summary_uses_last_line_without_error_marker() {
        let stderr = "some noise\nfinal line\n";
        assert_eq!(error_summary(stderr, failed_status()), "final line");
    }

    #[test]
    fn summary_of_empty_stderr_reports_status() {
        let summary = error_summary("", failed_status());
        assert!(summary.starts_with("engine exited with"));
    }

    #[test]
    fn long_lines_are_truncated() {
        let stderr = format!("ERROR: {}", "x".repeat(1000));
        let summary = error_summary(&stderr, failed_status());
        assert!(summary.len() <= SUMMARY_LIMIT + 3);
        assert!(summary.ends_with("..."));
    }
}
