//! Collection store: owned bands and albums, disambiguations and skips.
//!
//! The genre filter is applied once, while loading; everything downstream
//! only ever sees Metal bands.

use anyhow::{Context, Result};
use rustc_hash::FxHashMap;
use serde::de::DeserializeOwned;
use std::path::Path;

use crate::models::{AlbumEntry, BandEntry, CatalogId, DisambiguationEntry, SkipEntry, METAL_GENRE};

/// Owned band kept after genre filtering
#[derive(Clone, Debug)]
pub struct Band {
    pub name: String,
    pub genre: String,
    pub albums: Vec<AlbumEntry>,
}

/// What to suppress for a band
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SkipPolicy {
    pub entirely_skipped: bool,
    pub skipped_albums: FxHashMap<String, i32>, // title -> year
}

impl SkipPolicy {
    /// True if this exact (title, year) pair is in the per-album skip set.
    pub fn skips_album(&self, title: &str, year: i32) -> bool {
        self.skipped_albums.get(title) == Some(&year)
    }
}

#[derive(Debug, Default)]
pub struct CollectionStore {
    bands: Vec<Band>,
    band_index: FxHashMap<String, usize>,
    disambiguations: FxHashMap<String, CatalogId>,
    skips: FxHashMap<String, SkipPolicy>,
}

fn read_json<T: DeserializeOwned>(path: &Path, what: &str) -> Result<T> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {} file {:?}", what, path))?;
    serde_json::from_str(&text).with_context(|| format!("Failed to parse {} file {:?}", what, path))
}

impl CollectionStore {
    /// Load the collection file plus the optional disambiguation and skip files.
    pub fn load(
        collection_path: &Path,
        disambiguation_path: Option<&Path>,
        skip_path: Option<&Path>,
    ) -> Result<Self> {
        let disambiguations: Vec<DisambiguationEntry> = match disambiguation_path {
            Some(path) => read_json(path, "disambiguation")?,
            None => Vec::new(),
        };
        let skips: Vec<SkipEntry> = match skip_path {
            Some(path) => read_json(path, "skip")?,
            None => Vec::new(),
        };
        let bands: Vec<BandEntry> = read_json(collection_path, "collection")?;

        Ok(Self::from_entries(bands, disambiguations, skips))
    }

    pub fn from_entries(
        bands: Vec<BandEntry>,
        disambiguations: Vec<DisambiguationEntry>,
        skips: Vec<SkipEntry>,
    ) -> Self {
        let mut store = Self::default();

        for entry in disambiguations {
            store.disambiguations.insert(entry.band, entry.metallum_band_id);
        }

        for entry in skips {
            let policy = SkipPolicy {
                entirely_skipped: entry.albums.is_empty(),
                skipped_albums: entry.albums.into_iter().map(|a| (a.album, a.year)).collect(),
            };
            store.skips.insert(entry.band, policy);
        }

        for entry in bands {
            if entry.genre != METAL_GENRE {
                continue;
            }
            let band = Band {
                name: entry.band,
                genre: entry.genre,
                albums: entry.albums,
            };
            // A repeated name replaces the earlier record in place
            match store.band_index.get(&band.name) {
                Some(&idx) => store.bands[idx] = band,
                None => {
                    store.band_index.insert(band.name.clone(), store.bands.len());
                    store.bands.push(band);
                }
            }
        }

        store
    }

    /// Owned bands in collection order.
    pub fn bands(&self) -> &[Band] {
        &self.bands
    }

    pub fn band_names(&self) -> impl Iterator<Item = &str> {
        self.bands.iter().map(|b| b.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.bands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bands.is_empty()
    }

    /// Owned album titles and their years; empty for unknown bands.
    pub fn albums_owned(&self, band: &str) -> FxHashMap<&str, i32> {
        self.band_index
            .get(band)
            .map(|&idx| {
                self.bands[idx]
                    .albums
                    .iter()
                    .map(|a| (a.album.as_str(), a.year))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn is_owned(&self, band: &str, album_title: &str) -> bool {
        self.albums_owned(band).contains_key(album_title)
    }

    pub fn has_disambiguation(&self, band: &str) -> bool {
        self.disambiguations.contains_key(band)
    }

    /// True when the band has a disambiguation entry and `catalog_id` is not the recorded one.
    pub fn needs_disambiguation(&self, band: &str, catalog_id: &CatalogId) -> bool {
        self.disambiguations
            .get(band)
            .is_some_and(|recorded| recorded != catalog_id)
    }

    pub fn skip_policy(&self, band: &str) -> SkipPolicy {
        self.skips.get(band).cloned().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn album(title: &str, year: i32) -> AlbumEntry {
        AlbumEntry {
            album: title.to_string(),
            year,
        }
    }

    fn band(name: &str, genre: &str, albums: Vec<AlbumEntry>) -> BandEntry {
        BandEntry {
            band: name.to_string(),
            genre: genre.to_string(),
            albums,
        }
    }

    fn sample_store() -> CollectionStore {
        CollectionStore::from_entries(
            vec![
                band("Vader", "Metal", vec![album("De Profundis", 1995), album("Litany", 2000)]),
                band("Portishead", "Trip Hop", vec![album("Dummy", 1994)]),
                band("Gojira", "metal", vec![album("Magma", 2016)]),
                band("Death", "Metal", vec![]),
            ],
            vec![DisambiguationEntry {
                band: "Death".to_string(),
                metallum_band_id: CatalogId::new("141"),
            }],
            vec![
                SkipEntry {
                    band: "Vader".to_string(),
                    albums: vec![album("Tibi et Igni", 2014)],
                },
                SkipEntry {
                    band: "Death".to_string(),
                    albums: vec![],
                },
            ],
        )
    }

    #[test]
    fn test_only_exact_metal_genre_is_kept() {
        let store = sample_store();
        let names: Vec<&str> = store.band_names().collect();
        assert_eq!(names, vec!["Vader", "Death"]);
        assert!(store.albums_owned("Portishead").is_empty());
        assert!(store.albums_owned("Gojira").is_empty());
    }

    #[test]
    fn test_albums_owned_and_is_owned_agree() {
        let store = sample_store();
        let owned = store.albums_owned("Vader");
        assert_eq!(owned.len(), 2);
        assert_eq!(owned.get("Litany"), Some(&2000));
        for title in ["De Profundis", "Litany", "Revelations", ""] {
            assert_eq!(store.is_owned("Vader", title), owned.contains_key(title));
        }
        assert!(!store.is_owned("Unknown Band", "Litany"));
    }

    #[test]
    fn test_needs_disambiguation() {
        let store = sample_store();
        assert!(!store.needs_disambiguation("Death", &CatalogId::new("141")));
        assert!(store.needs_disambiguation("Death", &CatalogId::new("999")));
        // Absent from the table: trust whatever the catalog returned
        assert!(!store.needs_disambiguation("Vader", &CatalogId::new("999")));
        assert!(store.has_disambiguation("Death"));
        assert!(!store.has_disambiguation("Vader"));
    }

    #[test]
    fn test_skip_policy() {
        let store = sample_store();
        assert!(store.skip_policy("Death").entirely_skipped);

        let vader = store.skip_policy("Vader");
        assert!(!vader.entirely_skipped);
        assert!(vader.skips_album("Tibi et Igni", 2014));
        assert!(!vader.skips_album("Tibi et Igni", 2015));

        assert_eq!(store.skip_policy("Nobody"), SkipPolicy::default());
    }

    #[test]
    fn test_duplicate_band_keeps_position() {
        let store = CollectionStore::from_entries(
            vec![
                band("A", "Metal", vec![album("One", 2001)]),
                band("B", "Metal", vec![]),
                band("A", "Metal", vec![album("Two", 2002)]),
            ],
            vec![],
            vec![],
        );
        let names: Vec<&str> = store.band_names().collect();
        assert_eq!(names, vec!["A", "B"]);
        assert!(store.is_owned("A", "Two"));
        assert!(!store.is_owned("A", "One"));
    }

    #[test]
    fn test_load_from_files() {
        let dir = tempfile::tempdir().unwrap();
        let collection = dir.path().join("albums.json");
        let skips = dir.path().join("skip.json");
        std::fs::File::create(&collection)
            .unwrap()
            .write_all(
                r#"[
                    {"band": "Vader", "genre": "Metal", "albums": [{"album": "Litany", "year": "2000"}]},
                    {"band": "Björk", "genre": "Pop", "albums": []}
                ]"#
                .as_bytes(),
            )
            .unwrap();
        std::fs::write(&skips, r#"[{"band": "Vader", "albums": []}]"#).unwrap();

        let store = CollectionStore::load(&collection, None, Some(&skips)).unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.albums_owned("Vader").get("Litany"), Some(&2000));
        assert!(store.skip_policy("Vader").entirely_skipped);
        assert!(!store.has_disambiguation("Vader"));
    }

    #[test]
    fn test_load_missing_collection_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = CollectionStore::load(&dir.path().join("missing.json"), None, None).unwrap_err();
        assert!(err.to_string().contains("Failed to read collection file"));
    }

    #[test]
    fn test_load_malformed_collection_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("albums.json");
        std::fs::write(&path, "{not json").unwrap();
        let err = CollectionStore::load(&path, None, None).unwrap_err();
        assert!(err.to_string().contains("Failed to parse collection file"));
    }
}
