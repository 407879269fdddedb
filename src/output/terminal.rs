//! One-line terminal report per round.

use colored::{ColoredString, Colorize};
use ctprobe_core::{Report, Verdict};

/// Format a report as a single dudect-style line.
///
/// ```text
/// meas:    0.03 M, max t:   +3.21, max tau: 1.07e-4, (5/tau)^2: 2.18e9. For the moment, maybe constant time.
/// ```
///
/// Colors follow the verdict; the `colored` crate drops them under
/// `NO_COLOR` or when stdout is not a terminal.
pub fn format_report(report: &Report) -> String {
    let meas = format!("meas: {:7.2} M, ", report.measurements_millions());

    let Some(stats) = report.statistics else {
        return format!("{}{}.", meas, sentence(&report.verdict).as_str().dimmed());
    };

    format!(
        "{}max t: {:+7.2}, max tau: {:.2e}, (5/tau)^2: {:.2e}. {}.",
        meas,
        stats.max_t,
        stats.max_tau,
        stats.needed,
        paint(&report.verdict)
    )
}

fn paint(verdict: &Verdict) -> ColoredString {
    let text = sentence(verdict);
    let text = text.as_str();
    match verdict {
        Verdict::DefinitelyNotConstantTime => text.red().bold(),
        Verdict::ProbablyNotConstantTime => text.yellow().bold(),
        Verdict::MaybeConstantTime => text.green(),
        Verdict::NotEnoughMeasurements { .. } => text.dimmed(),
    }
}

/// Verdict text with its first letter capitalized, except for the
/// "not enough measurements" notice.
fn sentence(verdict: &Verdict) -> String {
    let text = verdict.to_string();
    if matches!(verdict, Verdict::NotEnoughMeasurements { .. }) {
        return text;
    }
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => text,
    }
}
