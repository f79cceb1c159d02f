use std::path::Path;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

/// Spinner on stderr while the checklist runs. Hidden automatically when stderr is not a tty.
pub fn suite_spinner(path: &Path) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"])
            .template("{spinner} [{elapsed}] {msg}")
            .expect("invalid spinner template"),
    );
    pb.set_message(format!("Checking {}...", path.display()));
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

/// Leave a one-line verdict in place of the spinner.
pub fn finish_suite_spinner(pb: &ProgressBar, valid: usize, total: usize) {
    let mark = if valid == total { "✓" } else { "✗" };
    pb.finish_with_message(format!("{mark} {} ({valid}/{total})", pb.message()));
}
