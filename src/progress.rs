//! Progress bar and console rendering of reconciliation events.
//!
//! Events are printed as tagged lines (`[BAND] Vader [BAND_NOT_FOUND]`).
//! In log-only mode the progress bar is hidden and tags are not coloured,
//! which keeps the output tail-friendly.

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crate::reconcile::ReconcileEvent;

/// Global flag for log-only mode (set from args in main)
pub static LOG_ONLY: AtomicBool = AtomicBool::new(false);

const RED: &str = "91";
const GREEN: &str = "92";
const YELLOW: &str = "93";

/// Set log-only mode globally
pub fn set_log_only(value: bool) {
    LOG_ONLY.store(value, Ordering::Relaxed);
}

/// Check if log-only mode is enabled
pub fn is_log_only() -> bool {
    LOG_ONLY.load(Ordering::Relaxed)
}

/// Format duration in human-readable format
pub fn format_duration(d: Duration) -> String {
    let secs = d.as_secs_f64();
    if secs < 60.0 {
        format!("{:.1}s", secs)
    } else {
        let mins = secs / 60.0;
        format!("{:.1}m", mins)
    }
}

/// Create a progress bar with consistent styling.
/// In log-only mode, the progress bar is hidden.
pub fn create_progress_bar(len: u64, msg: &str) -> ProgressBar {
    let pb = ProgressBar::new(len);
    if is_log_only() {
        pb.set_draw_target(ProgressDrawTarget::hidden());
    } else if let Ok(style) = ProgressStyle::default_bar()
        .template("{msg} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} (ETA: {eta})")
    {
        pb.set_style(style.progress_chars("=> "));
    }
    pb.set_message(msg.to_string());
    pb
}

fn tag(label: &str, color: &str, colored: bool) -> String {
    if colored {
        format!("\x1b[{}m[{}]\x1b[0m", color, label)
    } else {
        format!("[{}]", label)
    }
}

/// Render an event as a single console line.
pub fn render_event(event: &ReconcileEvent, colored: bool) -> String {
    let band = event.band();
    match event {
        ReconcileEvent::BandFound { matches, .. } if *matches > 1 => {
            format!("[BAND] {} ({} catalog matches)", band, matches)
        }
        ReconcileEvent::BandFound { .. } => format!("[BAND] {}", band),
        ReconcileEvent::BandNotFound { .. } => {
            format!("[BAND] {} {}", band, tag("BAND_NOT_FOUND", RED, colored))
        }
        ReconcileEvent::BandSkipped { .. } => {
            format!("[BAND] {} {}", band, tag("BAND_SKIPPED", YELLOW, colored))
        }
        ReconcileEvent::AmbiguousName { .. } => {
            format!("[BAND] {} {}", band, tag("AMBIGUOUS_BAND_NAME", RED, colored))
        }
        ReconcileEvent::NoDisambiguationFound { .. } => {
            format!("[BAND] {} {}", band, tag("NO_DISAMBIGUATION_FOUND", RED, colored))
        }
        ReconcileEvent::SplitUp { id, .. } => {
            format!("[BAND] {} (id {}) {}", band, id, tag("SPLIT-UP", YELLOW, colored))
        }
        ReconcileEvent::Coverage {
            owned,
            listed,
            percent,
            ..
        } => format!("[BAND] {} [ALBUMS] {}/{} ({}%)", band, owned, listed, percent),
        ReconcileEvent::NewRelease(release) | ReconcileEvent::AlbumSkipped(release) => {
            let mut line = format!(
                "[BAND] {} {} {} ({}) [SCORE] {}% (of {} reviews)",
                band,
                tag("NEW_ALBUM", GREEN, colored),
                release.album,
                release.release_date,
                release.score.unwrap_or(0),
                release.review_count
            );
            if matches!(event, ReconcileEvent::AlbumSkipped(_)) {
                line.push(' ');
                line.push_str(&tag("ALBUM_SKIPPED", YELLOW, colored));
            }
            line
        }
    }
}

/// Print an event above the progress bar (or straight to stdout when hidden).
pub fn log_event(pb: &ProgressBar, event: &ReconcileEvent) {
    let line = render_event(event, !is_log_only());
    if pb.is_hidden() {
        println!("{}", line);
    } else {
        pb.println(line);
    }
}
