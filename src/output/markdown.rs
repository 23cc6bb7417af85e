//! Markdown summary generation
//!
//! Writes a human-readable report of a crawl session next to the images.

use crate::output::summary::{CrawlSummary, OutputResult};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Writes the markdown summary of a session to `output_path`
pub fn generate_markdown_summary(summary: &CrawlSummary, output_path: &Path) -> OutputResult<()> {
    let markdown = format_markdown_summary(summary);

    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let mut file = File::create(output_path)?;
    file.write_all(markdown.as_bytes())?;

    Ok(())
}

/// Formats a crawl summary as markdown
pub fn format_markdown_summary(summary: &CrawlSummary) -> String {
    let mut md = String::new();

    md.push_str("# Feed-Gleaner Crawl Summary\n\n");

    // Run metadata
    md.push_str("## Run Information\n\n");
    md.push_str(&format!("- **Started**: {}\n", summary.started_at.to_rfc3339()));
    md.push_str(&format!(
        "- **Finished**: {}\n",
        summary.finished_at.to_rfc3339()
    ));
    md.push_str(&format!(
        "- **Duration**: {} seconds\n",
        summary.duration_seconds()
    ));
    md.push_str(&format!("- **Status**: {}\n", summary.phase));
    if let Some(hash) = &summary.config_hash {
        md.push_str(&format!("- **Config Hash**: {}\n", hash));
    }
    md.push_str(&format!(
        "- **Download Root**: {}\n\n",
        summary.download_root.display()
    ));

    // Pages
    md.push_str("## Pages\n\n");
    match summary.page_bound {
        Some(bound) => md.push_str(&format!("- **Last Page With Images**: {}\n", bound)),
        None => md.push_str("- **Last Page With Images**: not found\n"),
    }
    if let Some((start, end)) = summary.page_range {
        md.push_str(&format!("- **Range**: {} to {}\n", start, end));
    }
    md.push_str(&format!("- **Crawled**: {}\n", summary.pages_crawled));
    md.push_str(&format!("- **Failed**: {}\n\n", summary.pages_failed));

    // Images
    md.push_str("## Images\n\n");
    md.push_str("| Outcome | Count |\n");
    md.push_str("|---------|-------|\n");
    md.push_str(&format!("| Downloaded | {} |\n", summary.downloaded));
    md.push_str(&format!(
        "| Already Present | {} |\n",
        summary.skipped_existing
    ));
    md.push_str(&format!("| Failed | {} |\n\n", summary.failed));
    md.push_str(&format!(
        "**Success Rate**: {:.2}%\n",
        summary.success_rate()
    ));

    md
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{CrawlPhase, CrawlState};
    use chrono::Utc;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn create_test_summary() -> CrawlSummary {
        let state = CrawlState {
            downloaded: 120,
            failed: 3,
            skipped_existing: 40,
            pages_crawled: 12,
            pages_failed: 1,
        };
        let mut summary = CrawlSummary::from_state(
            &state,
            CrawlPhase::Interrupted,
            Utc::now(),
            PathBuf::from("downloaded_images"),
        );
        summary.page_bound = Some(873);
        summary.page_range = Some((1, 873));
        summary.config_hash = Some("abc123".to_string());
        summary
    }

    #[test]
    fn test_format_markdown_summary() {
        let markdown = format_markdown_summary(&create_test_summary());

        assert!(markdown.contains("# Feed-Gleaner Crawl Summary"));
        assert!(markdown.contains("- **Status**: interrupted"));
        assert!(markdown.contains("- **Config Hash**: abc123"));
        assert!(markdown.contains("- **Last Page With Images**: 873"));
        assert!(markdown.contains("- **Range**: 1 to 873"));
    }

    #[test]
    fn test_markdown_contains_counts() {
        let markdown = format_markdown_summary(&create_test_summary());

        assert!(markdown.contains("| Downloaded | 120 |"));
        assert!(markdown.contains("| Already Present | 40 |"));
        assert!(markdown.contains("| Failed | 3 |"));
    }

    #[test]
    fn test_markdown_without_bound() {
        let mut summary = create_test_summary();
        summary.page_bound = None;
        summary.page_range = None;

        let markdown = format_markdown_summary(&summary);
        assert!(markdown.contains("not found"));
        assert!(!markdown.contains("**Range**"));
    }

    #[test]
    fn test_generate_markdown_summary_writes_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("reports").join("summary.md");

        generate_markdown_summary(&create_test_summary(), &path).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.starts_with("# Feed-Gleaner Crawl Summary"));
    }
}
