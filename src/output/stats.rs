//! Console reporting of crawl results

use crate::output::summary::CrawlSummary;

/// Prints the final results to stdout in a formatted manner
pub fn print_summary(summary: &CrawlSummary) {
    println!("\n=== Final Results ({}) ===\n", summary.phase);

    if !summary.phase.is_clean_exit() {
        println!("  No page with images was found; nothing was crawled.");
        println!("  Check the base URL, feed path and connectivity.\n");
    }

    if let Some(bound) = summary.page_bound {
        println!("  Last page with images: {}", bound);
    }
    if let Some((start, end)) = summary.page_range {
        println!("  Pages requested: {} to {}", start, end);
    }
    println!(
        "  Pages crawled: {} ({} failed)",
        summary.pages_crawled, summary.pages_failed
    );
    println!();

    println!("  Images downloaded: {}", summary.downloaded);
    println!("  Already present: {}", summary.skipped_existing);
    println!("  Downloads failed: {}", summary.failed);
    println!("  Images saved to: {}", summary.download_root.display());
    println!();

    println!(
        "Success Rate: {:.1}% in {}s",
        summary.success_rate(),
        summary.duration_seconds()
    );
}
