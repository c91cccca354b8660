//! Run statistics.

use serde::Serialize;

use crate::reconcile::{is_fully_collected, ReconcileEvent};

/// Outcome counters for one reconciliation run.
#[derive(Default, Debug, Clone, Serialize)]
pub struct ReconcileStats {
    pub bands_total: usize,
    pub bands_found: usize,
    pub bands_not_found: usize,
    pub bands_skipped: usize,
    pub ambiguous_names: usize,
    pub no_disambiguation_found: usize,
    pub split_up: usize,
    pub fully_collected: usize,
    pub new_releases: usize,
    pub albums_skipped: usize,

    // Timing
    pub elapsed_seconds: f64,
}

impl ReconcileStats {
    pub fn new(bands_total: usize) -> Self {
        Self {
            bands_total,
            ..Self::default()
        }
    }

    pub fn record(&mut self, event: &ReconcileEvent) {
        match event {
            ReconcileEvent::BandFound { .. } => self.bands_found += 1,
            ReconcileEvent::BandNotFound { .. } => self.bands_not_found += 1,
            ReconcileEvent::BandSkipped { .. } => self.bands_skipped += 1,
            ReconcileEvent::AmbiguousName { .. } => self.ambiguous_names += 1,
            ReconcileEvent::NoDisambiguationFound { .. } => self.no_disambiguation_found += 1,
            ReconcileEvent::SplitUp { .. } => self.split_up += 1,
            ReconcileEvent::Coverage { percent, .. } => {
                if is_fully_collected(*percent) {
                    self.fully_collected += 1;
                }
            }
            ReconcileEvent::NewRelease(_) => self.new_releases += 1,
            ReconcileEvent::AlbumSkipped(_) => self.albums_skipped += 1,
        }
    }

    /// Log stats to stderr in JSON format
    pub fn log_json(&self) {
        if let Ok(json) = serde_json::to_string_pretty(self) {
            eprintln!("[STATS]\n{}", json);
        }
    }

    /// Write stats to a JSON file
    pub fn write_to_file(&self, path: &std::path::Path) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CandidateRelease, CatalogId};
    use chrono::NaiveDate;

    #[test]
    fn test_record_counts_events() {
        let release = CandidateRelease {
            band: "Vader".to_string(),
            album: "Litany".to_string(),
            release_date: NaiveDate::from_ymd_opt(2000, 3, 1).unwrap(),
            score: None,
            review_count: 0,
        };
        let coverage = |percent| ReconcileEvent::Coverage {
            band: "Vader".to_string(),
            id: CatalogId::new("7"),
            owned: 1,
            listed: 1,
            percent,
        };

        let mut stats = ReconcileStats::new(3);
        stats.record(&ReconcileEvent::BandNotFound {
            band: "Nobody".to_string(),
        });
        stats.record(&coverage(100.0));
        stats.record(&coverage(50.0));
        stats.record(&ReconcileEvent::NewRelease(release.clone()));
        stats.record(&ReconcileEvent::AlbumSkipped(release));

        assert_eq!(stats.bands_total, 3);
        assert_eq!(stats.bands_not_found, 1);
        assert_eq!(stats.fully_collected, 1);
        assert_eq!(stats.new_releases, 1);
        assert_eq!(stats.albums_skipped, 1);
    }
}
