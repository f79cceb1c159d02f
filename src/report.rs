use std::fmt::Write;
use std::path::Path;

use console::Style;

use crate::checker::SuiteOutcome;

/// Human-readable breakdown of a run: one line per check, the tally, then either
/// a success line or the list of failures to fix.
pub fn render_report(path: &Path, outcome: &SuiteOutcome) -> String {
    let green = Style::new().green().bold();
    let red = Style::new().red().bold();
    let yellow = Style::new().yellow().bold();

    let mut out = String::new();
    let _ = writeln!(out, "\n📊 Results for {}:\n", path.display());

    for r in &outcome.results {
        let icon = if r.passed { "✅" } else { "❌" };
        let _ = writeln!(out, "{icon} {}: {}", r.name, r.message);
    }

    let valid = outcome.valid_count();
    let total = outcome.results.len();
    let tally = format!("{valid}/{total}");
    let tally = if valid == total {
        green.apply_to(tally)
    } else {
        red.apply_to(tally)
    };
    let _ = writeln!(out, "\n📈 Summary: {tally} checks passed");

    if valid == total {
        let _ = writeln!(out, "🎉 All checks passed!");
    } else {
        let _ = writeln!(out, "{}", yellow.apply_to("💡 Suggested fixes:"));
        for r in outcome.results.iter().filter(|r| !r.passed) {
            let _ = writeln!(out, "   - {}: {}", r.name, r.message);
        }
    }
    out
}

pub fn print_report(path: &Path, outcome: &SuiteOutcome) {
    print!("{}", render_report(path, outcome));
}
