//! Core data models for new-release reconciliation.
//!
//! This module contains the records read from the collection files, the
//! records returned by the catalog, and the candidate releases produced
//! by a run, plus the hard-coded policy constants.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

// ============================================================================
// Policy Constants
// ============================================================================

/// Only bands with exactly this genre are checked against the catalog.
pub const METAL_GENRE: &str = "Metal";

/// Only catalog albums of this type count as releases.
pub const RELEASE_ALBUM_TYPE: AlbumType = AlbumType::FullLength;

// ============================================================================
// Collection Input Models
// ============================================================================

/// Album entry as it appears in the collection and skip files
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct AlbumEntry {
    pub album: String,
    #[serde(deserialize_with = "de_year")]
    pub year: i32,
}

/// Band entry from the collection file
#[derive(Clone, Debug, Deserialize)]
pub struct BandEntry {
    pub band: String,
    pub genre: String,
    #[serde(default)]
    pub albums: Vec<AlbumEntry>,
}

/// Disambiguation entry: the catalog id that is authoritative for a band name
#[derive(Clone, Debug, Deserialize)]
pub struct DisambiguationEntry {
    pub band: String,
    pub metallum_band_id: CatalogId,
}

/// Skip entry: an empty album list skips the whole band
#[derive(Clone, Debug, Deserialize)]
pub struct SkipEntry {
    pub band: String,
    #[serde(default)]
    pub albums: Vec<AlbumEntry>,
}

/// Years are written either as numbers or as numeric strings.
fn de_year<'de, D>(deserializer: D) -> Result<i32, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawYear {
        Number(i32),
        Text(String),
    }

    match RawYear::deserialize(deserializer)? {
        RawYear::Number(year) => Ok(year),
        RawYear::Text(text) => text
            .trim()
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("invalid year: {:?}", text))),
    }
}

// ============================================================================
// Catalog Models
// ============================================================================

/// Catalog band identifier (numeric in the catalog, compared as text)
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct CatalogId(pub String);

impl CatalogId {
    pub fn new(id: impl Into<String>) -> Self {
        CatalogId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CatalogId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for CatalogId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Number(u64),
            Text(String),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Number(id) => CatalogId(id.to_string()),
            RawId::Text(id) => CatalogId(id.trim().to_string()),
        })
    }
}

/// Band status as reported by the catalog
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BandStatus {
    Active,
    OnHold,
    SplitUp,
    ChangedName,
    Unknown,
    Other(String),
}

impl BandStatus {
    pub fn label(&self) -> &str {
        match self {
            BandStatus::Active => "Active",
            BandStatus::OnHold => "On hold",
            BandStatus::SplitUp => "Split-up",
            BandStatus::ChangedName => "Changed name",
            BandStatus::Unknown => "Unknown",
            BandStatus::Other(label) => label,
        }
    }
}

impl From<&str> for BandStatus {
    fn from(s: &str) -> Self {
        match s.trim() {
            "Active" => BandStatus::Active,
            "On hold" => BandStatus::OnHold,
            "Split-up" => BandStatus::SplitUp,
            "Changed name" => BandStatus::ChangedName,
            "Unknown" | "" => BandStatus::Unknown,
            other => BandStatus::Other(other.to_string()),
        }
    }
}

/// Catalog album type. Only full-lengths are reconciled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AlbumType {
    FullLength,
    Ep,
    Single,
    Demo,
    Split,
    Compilation,
    LiveAlbum,
    Video,
    BoxedSet,
    Other,
}

impl AlbumType {
    pub fn label(self) -> &'static str {
        match self {
            AlbumType::FullLength => "Full-length",
            AlbumType::Ep => "EP",
            AlbumType::Single => "Single",
            AlbumType::Demo => "Demo",
            AlbumType::Split => "Split",
            AlbumType::Compilation => "Compilation",
            AlbumType::LiveAlbum => "Live album",
            AlbumType::Video => "Video",
            AlbumType::BoxedSet => "Boxed set",
            AlbumType::Other => "Other",
        }
    }
}

impl From<&str> for AlbumType {
    fn from(s: &str) -> Self {
        match s.trim() {
            "Full-length" => AlbumType::FullLength,
            "EP" => AlbumType::Ep,
            "Single" => AlbumType::Single,
            "Demo" => AlbumType::Demo,
            "Split" | "Split video" => AlbumType::Split,
            "Compilation" => AlbumType::Compilation,
            "Live album" => AlbumType::LiveAlbum,
            "Video" => AlbumType::Video,
            "Boxed set" => AlbumType::BoxedSet,
            _ => AlbumType::Other,
        }
    }
}

/// Band returned by a catalog name search
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BandHandle {
    pub id: CatalogId,
    pub name: String,
}

/// Album as listed by the catalog
#[derive(Clone, Debug, PartialEq)]
pub struct CatalogAlbum {
    pub title: String,
    pub album_type: AlbumType,
    pub release_date: NaiveDate,
    pub score: Option<u32>, // average review score, 0-100
    pub review_count: u32,
}

/// Full band profile: status plus the albums of the requested type
#[derive(Clone, Debug)]
pub struct BandProfile {
    pub id: CatalogId,
    pub name: String,
    pub status: BandStatus,
    pub albums: Vec<CatalogAlbum>,
}

// ============================================================================
// Output Models
// ============================================================================

/// Album that is not owned yet and qualifies as a new release
#[derive(Clone, Debug, PartialEq)]
pub struct CandidateRelease {
    pub band: String,
    pub album: String,
    pub release_date: NaiveDate,
    pub score: Option<u32>,
    pub review_count: u32,
}

impl CandidateRelease {
    pub fn from_album(band: &str, album: &CatalogAlbum) -> Self {
        Self {
            band: band.to_string(),
            album: album.title.clone(),
            release_date: album.release_date,
            score: album.score,
            review_count: album.review_count,
        }
    }
}
