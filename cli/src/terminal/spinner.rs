use std::time::Duration;

use colored::*;
use indicatif::ProgressStyle;
use tracing::{Span, info_span};
use tracing_indicatif::span_ext::IndicatifSpanExt;

const TICK_STRINGS: &[&str] = &[
    "▁▁▁▁▁",
    "▁▂▂▂▁",
    "▁▄▂▄▁",
    "▂▄▆▄▂",
    "▄▆█▆▄",
    "▂▄▆▄▂",
    "▁▄▂▄▁",
    "▁▂▂▂▁",
];
const TIP: &str = "You can press 'q' to finish early";

fn progress_style() -> ProgressStyle {
    ProgressStyle::with_template("{spinner:.blue} [{bar:30.green/black}] {pos}/{len} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .tick_strings(TICK_STRINGS)
        .progress_chars("■■·")
}

/// Span carrying the scan progress bar; the bar is drawn while the span is entered.
///
/// `quiet >= 2` yields a plain span without a bar.
pub fn scan_progress(total: usize, quiet: u8, show_tip: bool) -> Span {
    if quiet >= 2 {
        return info_span!("scan");
    }

    let span = info_span!("scan", indicatif.pb_show = true);
    span.pb_set_style(&progress_style());
    span.pb_set_length(total as u64);
    if show_tip {
        span.pb_set_message(&format!("{}", TIP.italic().white()));
    }
    span
}

/// How long a target is expected to take, shown once the scan starts.
pub fn estimate_message(total: usize, concurrency: usize, per_host: Duration) -> String {
    let waves = total.div_ceil(concurrency.max(1)) as u32;
    let upper = per_host.saturating_mul(waves);
    format!(
        "Scanning {} target(s), at most ~{:.0}s",
        total.to_string().green().bold(),
        upper.as_secs_f64().ceil()
    )
}
