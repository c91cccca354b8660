//! Release reconciliation.
//!
//! For every owned band, in collection order:
//!
//! 1. search the catalog by name; no match is `BandNotFound`
//! 2. a fully skipped band stops here (`BandSkipped`)
//! 3. several matches without a disambiguation entry stop here (`AmbiguousName`)
//! 4. every accepted match has its full-lengths compared against the
//!    collection; unowned albums inside the interval and not in the future
//!    become new releases unless the skip list names them (`AlbumSkipped`)
//! 5. several matches, a disambiguation entry and no accepted match is
//!    reported as `NoDisambiguationFound`
//!
//! Per-band outcomes never abort the run. Catalog failures and a matched
//! band listing zero full-lengths do.

use chrono::{Datelike, NaiveDate};
use thiserror::Error;

use crate::catalog::{Catalog, CatalogError};
use crate::collection::{CollectionStore, SkipPolicy};
use crate::interval::ReleaseInterval;
use crate::models::{BandHandle, BandStatus, CandidateRelease, CatalogId, RELEASE_ALBUM_TYPE};

#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error("Catalog lookup failed for band {band:?}: {source}")]
    Catalog {
        band: String,
        #[source]
        source: CatalogError,
    },

    #[error("Band {band:?} (catalog id {id}) lists no full-length albums; ownership percentage is undefined")]
    NoFullLengthAlbums { band: String, id: CatalogId },
}

/// Observable per-band outcome, emitted while the run progresses
#[derive(Clone, Debug, PartialEq)]
pub enum ReconcileEvent {
    /// Band has at least one catalog match
    BandFound { band: String, matches: usize },
    BandNotFound { band: String },
    BandSkipped { band: String },
    /// Several catalog bands share the name and no disambiguation entry exists
    AmbiguousName { band: String, matches: usize },
    SplitUp { band: String, id: CatalogId },
    /// Owned vs listed full-lengths for one accepted catalog band
    Coverage {
        band: String,
        id: CatalogId,
        owned: usize,
        listed: usize,
        percent: f64,
    },
    NewRelease(CandidateRelease),
    AlbumSkipped(CandidateRelease),
    /// The recorded disambiguation id matched none of the catalog bands
    NoDisambiguationFound { band: String, matches: usize },
}

impl ReconcileEvent {
    pub fn band(&self) -> &str {
        match self {
            ReconcileEvent::BandFound { band, .. }
            | ReconcileEvent::BandNotFound { band }
            | ReconcileEvent::BandSkipped { band }
            | ReconcileEvent::AmbiguousName { band, .. }
            | ReconcileEvent::SplitUp { band, .. }
            | ReconcileEvent::Coverage { band, .. }
            | ReconcileEvent::NoDisambiguationFound { band, .. } => band,
            ReconcileEvent::NewRelease(release) | ReconcileEvent::AlbumSkipped(release) => {
                &release.band
            }
        }
    }
}

/// Releases plus every event observed while producing them
#[derive(Debug, Default)]
pub struct Reconciliation {
    pub releases: Vec<CandidateRelease>,
    pub events: Vec<ReconcileEvent>,
}

/// Percentage of listed albums that are owned, rounded to two decimals.
/// `None` when nothing is listed.
pub fn ownership_percent(owned: usize, listed: usize) -> Option<f64> {
    if listed == 0 {
        return None;
    }
    let percent = 100.0 * owned as f64 / listed as f64;
    Some((percent * 100.0).round() / 100.0)
}

/// Complete only when the truncated percentage is exactly 100.
pub fn is_fully_collected(percent: f64) -> bool {
    percent.trunc() == 100.0
}

pub struct Reconciler<'a, C> {
    store: &'a CollectionStore,
    catalog: C,
    interval: ReleaseInterval,
    today: NaiveDate,
}

impl<'a, C: Catalog> Reconciler<'a, C> {
    pub fn new(store: &'a CollectionStore, catalog: C, interval: ReleaseInterval, today: NaiveDate) -> Self {
        Self {
            store,
            catalog,
            interval,
            today,
        }
    }

    /// Reconcile every band, collecting the events alongside the releases.
    pub fn run(&self) -> Result<Reconciliation, ReconcileError> {
        let mut events = Vec::new();
        let releases = self.run_with(|event| events.push(event.clone()))?;
        Ok(Reconciliation { releases, events })
    }

    /// Reconcile every band, handing each event to `on_event` as it happens.
    pub fn run_with<F>(&self, mut on_event: F) -> Result<Vec<CandidateRelease>, ReconcileError>
    where
        F: FnMut(&ReconcileEvent),
    {
        let mut releases = Vec::new();
        for band in self.store.band_names() {
            self.reconcile_band(band, &mut on_event, &mut releases)?;
        }
        Ok(releases)
    }

    /// Reconcile a single band, appending its new releases to `releases`.
    pub fn reconcile_band<F>(
        &self,
        band: &str,
        on_event: &mut F,
        releases: &mut Vec<CandidateRelease>,
    ) -> Result<(), ReconcileError>
    where
        F: FnMut(&ReconcileEvent),
    {
        let matches = self
            .catalog
            .search_by_name(band)
            .map_err(|source| ReconcileError::Catalog {
                band: band.to_string(),
                source,
            })?;

        if matches.is_empty() {
            on_event(&ReconcileEvent::BandNotFound {
                band: band.to_string(),
            });
            return Ok(());
        }
        on_event(&ReconcileEvent::BandFound {
            band: band.to_string(),
            matches: matches.len(),
        });

        let skip = self.store.skip_policy(band);
        if skip.entirely_skipped {
            on_event(&ReconcileEvent::BandSkipped {
                band: band.to_string(),
            });
            return Ok(());
        }

        let has_disambiguation = self.store.has_disambiguation(band);
        if matches.len() > 1 && !has_disambiguation {
            on_event(&ReconcileEvent::AmbiguousName {
                band: band.to_string(),
                matches: matches.len(),
            });
            return Ok(());
        }

        let mut disambiguation_found = false;
        for handle in &matches {
            if self.store.needs_disambiguation(band, &handle.id) {
                continue;
            }
            disambiguation_found = true;

            self.reconcile_catalog_band(band, handle, &skip, on_event, releases)?;
        }

        if matches.len() > 1 && has_disambiguation && !disambiguation_found {
            on_event(&ReconcileEvent::NoDisambiguationFound {
                band: band.to_string(),
                matches: matches.len(),
            });
        }

        Ok(())
    }

    fn reconcile_catalog_band<F>(
        &self,
        band: &str,
        handle: &BandHandle,
        skip: &SkipPolicy,
        on_event: &mut F,
        releases: &mut Vec<CandidateRelease>,
    ) -> Result<(), ReconcileError>
    where
        F: FnMut(&ReconcileEvent),
    {
        let profile = self
            .catalog
            .fetch_profile(handle, RELEASE_ALBUM_TYPE)
            .map_err(|source| ReconcileError::Catalog {
                band: band.to_string(),
                source,
            })?;

        if profile.status == BandStatus::SplitUp {
            on_event(&ReconcileEvent::SplitUp {
                band: band.to_string(),
                id: handle.id.clone(),
            });
        }

        let owned = self.store.albums_owned(band);
        let listed = profile.albums.len();
        let percent = ownership_percent(owned.len(), listed).ok_or_else(|| {
            ReconcileError::NoFullLengthAlbums {
                band: band.to_string(),
                id: handle.id.clone(),
            }
        })?;
        on_event(&ReconcileEvent::Coverage {
            band: band.to_string(),
            id: handle.id.clone(),
            owned: owned.len(),
            listed,
            percent,
        });

        if is_fully_collected(percent) {
            return Ok(());
        }

        for album in &profile.albums {
            let year = album.release_date.year();
            if owned.contains_key(album.title.as_str())
                || !self.interval.contains(year)
                || album.release_date > self.today
            {
                continue;
            }

            let release = CandidateRelease::from_album(band, album);
            if skip.skips_album(&album.title, year) {
                on_event(&ReconcileEvent::AlbumSkipped(release));
            } else {
                on_event(&ReconcileEvent::NewRelease(release.clone()));
                releases.push(release);
            }
        }

        Ok(())
    }
}
