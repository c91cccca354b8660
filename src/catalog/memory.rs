//! In-memory catalog, loadable from a JSON snapshot.
//!
//! Snapshot format:
//!
//! ```json
//! [{"id": 141, "name": "Death", "status": "Split-up",
//!   "albums": [{"title": "Human", "type": "Full-length",
//!               "release_date": "1991-10-22", "score": 92, "review_count": 31}]}]
//! ```

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::Deserialize;
use std::cell::RefCell;
use std::path::Path;

use super::{Catalog, CatalogError};
use crate::models::{AlbumType, BandHandle, BandProfile, BandStatus, CatalogAlbum, CatalogId};

#[derive(Debug, Deserialize)]
struct SnapshotAlbum {
    title: String,
    #[serde(rename = "type", default = "default_album_type")]
    album_type: String,
    release_date: NaiveDate,
    #[serde(default)]
    score: Option<u32>,
    #[serde(default)]
    review_count: u32,
}

fn default_album_type() -> String {
    AlbumType::FullLength.label().to_string()
}

#[derive(Debug, Deserialize)]
struct SnapshotBand {
    id: CatalogId,
    name: String,
    #[serde(default)]
    status: String,
    #[serde(default)]
    albums: Vec<SnapshotAlbum>,
}

impl From<SnapshotBand> for BandProfile {
    fn from(band: SnapshotBand) -> Self {
        BandProfile {
            id: band.id,
            name: band.name,
            status: BandStatus::from(band.status.as_str()),
            albums: band
                .albums
                .into_iter()
                .map(|a| CatalogAlbum {
                    album_type: AlbumType::from(a.album_type.as_str()),
                    title: a.title,
                    release_date: a.release_date,
                    score: a.score,
                    review_count: a.review_count,
                })
                .collect(),
        }
    }
}

/// Catalog backed by a list of band profiles.
/// Every name search is recorded so callers can inspect which bands were queried.
#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    bands: Vec<BandProfile>,
    searches: RefCell<Vec<String>>,
}

impl InMemoryCatalog {
    pub fn new(bands: Vec<BandProfile>) -> Self {
        Self {
            bands,
            searches: RefCell::new(Vec::new()),
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let bands: Vec<SnapshotBand> = serde_json::from_str(json).context("Invalid catalog snapshot")?;
        Ok(Self::new(bands.into_iter().map(BandProfile::from).collect()))
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read catalog snapshot {:?}", path))?;
        Self::from_json_str(&text).with_context(|| format!("Failed to load catalog snapshot {:?}", path))
    }

    pub fn push(&mut self, band: BandProfile) {
        self.bands.push(band);
    }

    /// Names passed to `search_by_name`, in call order.
    pub fn searched_names(&self) -> Vec<String> {
        self.searches.borrow().clone()
    }
}

impl Catalog for InMemoryCatalog {
    fn search_by_name(&self, name: &str) -> Result<Vec<BandHandle>, CatalogError> {
        self.searches.borrow_mut().push(name.to_string());
        Ok(self
            .bands
            .iter()
            .filter(|b| b.name.eq_ignore_ascii_case(name))
            .map(|b| BandHandle {
                id: b.id.clone(),
                name: b.name.clone(),
            })
            .collect())
    }

    fn fetch_profile(
        &self,
        band: &BandHandle,
        album_type: AlbumType,
    ) -> Result<BandProfile, CatalogError> {
        let profile = self
            .bands
            .iter()
            .find(|b| b.id == band.id)
            .ok_or_else(|| CatalogError::UnknownBand(band.id.to_string()))?;
        Ok(BandProfile {
            albums: profile
                .albums
                .iter()
                .filter(|a| a.album_type == album_type)
                .cloned()
                .collect(),
            ..profile.clone()
        })
    }
}
