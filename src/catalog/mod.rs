//! Catalog lookups.
//!
//! The reconciler only talks to the catalog through [`Catalog`], so it can
//! run against the live Encyclopaedia Metallum client or against an
//! in-memory snapshot.

pub mod memory;
pub mod metallum;

use thiserror::Error;

use crate::models::{AlbumType, BandHandle, BandProfile};

pub use memory::InMemoryCatalog;
pub use metallum::MetallumClient;

/// Catalog errors
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Catalog returned HTTP {status} for {url}")]
    Status { status: u16, url: String },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Band not in catalog: {0}")]
    UnknownBand(String),
}

/// Band/album lookups against a music-metadata catalog.
pub trait Catalog {
    /// All catalog bands whose name matches `name`.
    fn search_by_name(&self, name: &str) -> Result<Vec<BandHandle>, CatalogError>;

    /// Status and the albums of `album_type` for one band.
    fn fetch_profile(
        &self,
        band: &BandHandle,
        album_type: AlbumType,
    ) -> Result<BandProfile, CatalogError>;
}

impl<C: Catalog + ?Sized> Catalog for &C {
    fn search_by_name(&self, name: &str) -> Result<Vec<BandHandle>, CatalogError> {
        (**self).search_by_name(name)
    }

    fn fetch_profile(
        &self,
        band: &BandHandle,
        album_type: AlbumType,
    ) -> Result<BandProfile, CatalogError> {
        (**self).fetch_profile(band, album_type)
    }
}

impl<C: Catalog + ?Sized> Catalog for Box<C> {
    fn search_by_name(&self, name: &str) -> Result<Vec<BandHandle>, CatalogError> {
        (**self).search_by_name(name)
    }

    fn fetch_profile(
        &self,
        band: &BandHandle,
        album_type: AlbumType,
    ) -> Result<BandProfile, CatalogError> {
        (**self).fetch_profile(band, album_type)
    }
}
