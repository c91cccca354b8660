//! Encyclopaedia Metallum client.
//!
//! Blocking lookups over `ureq`: one request per band search, one for the
//! band page (status), one for the discography and one per album of the
//! requested type (full release date). No caching and no retries.

use chrono::{Month, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use std::time::Duration;

use super::{Catalog, CatalogError};
use crate::models::{AlbumType, BandHandle, BandProfile, BandStatus, CatalogAlbum, CatalogId};

pub const DEFAULT_BASE_URL: &str = "https://www.metal-archives.com";
const USER_AGENT: &str = concat!("new-releases/", env!("CARGO_PKG_VERSION"));

// ============================================================================
// Regex Patterns
// ============================================================================

static BAND_LINK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"<a href="[^"]*/bands/[^"/]*/(\d+)"[^>]*>([^<]*)</a>"#).unwrap());

static STATUS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<dt>\s*Status:\s*</dt>\s*<dd[^>]*>([^<]*)</dd>").unwrap());

static ALBUM_LINK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"<a href="([^"]*/albums/[^"]*)"[^>]*>([^<]*)</a>"#).unwrap());

/// Plain-text cells: album type and year
static TEXT_CELL: Lazy<Regex> = Lazy::new(|| Regex::new(r"<td[^>]*>([^<]*)</td>").unwrap());

/// "31 (92%)"
static REVIEWS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d+)\s*\((\d+)%\)").unwrap());

static RELEASE_DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<dt>\s*Release date:\s*</dt>\s*<dd[^>]*>([^<]*)</dd>").unwrap());

static NUMERIC_ENTITY: Lazy<Regex> = Lazy::new(|| Regex::new(r"&#(x?)([0-9a-fA-F]+);").unwrap());

// "October 22nd, 1991" / "October 1991" / "1991"
static FULL_DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([A-Za-z]+)\s+(\d{1,2})(?:st|nd|rd|th)?,\s*(\d{4})$").unwrap());
static MONTH_YEAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"^([A-Za-z]+)\s+(\d{4})$").unwrap());
static YEAR_ONLY: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d{4})$").unwrap());

// ============================================================================
// Parsing
// ============================================================================

/// Discography row before the album page is fetched
#[derive(Clone, Debug, PartialEq)]
pub struct DiscographyRow {
    pub title: String,
    pub url: String,
    pub album_type: AlbumType,
    pub year: i32,
    pub score: Option<u32>,
    pub review_count: u32,
}

pub fn decode_entities(text: &str) -> String {
    let numeric = NUMERIC_ENTITY.replace_all(text, |caps: &regex::Captures| {
        let radix = if caps[1].is_empty() { 10 } else { 16 };
        u32::from_str_radix(&caps[2], radix)
            .ok()
            .and_then(char::from_u32)
            .map(String::from)
            .unwrap_or_else(|| caps[0].to_string())
    });
    numeric
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
        .trim()
        .to_string()
}

/// Band handles from the `ajax-band-search` JSON response.
pub fn parse_search_results(response: &Value) -> Result<Vec<BandHandle>, CatalogError> {
    let rows = response
        .get("aaData")
        .and_then(Value::as_array)
        .ok_or_else(|| CatalogError::Parse("band search response has no aaData".to_string()))?;

    Ok(rows
        .iter()
        .filter_map(|row| row.get(0).and_then(Value::as_str))
        .filter_map(|cell| BAND_LINK.captures(cell))
        .map(|caps| BandHandle {
            id: CatalogId::new(&caps[1]),
            name: decode_entities(&caps[2]),
        })
        .collect())
}

pub fn parse_status(band_page: &str) -> BandStatus {
    STATUS
        .captures(band_page)
        .map(|caps| BandStatus::from(decode_entities(&caps[1]).as_str()))
        .unwrap_or(BandStatus::Unknown)
}

pub fn parse_discography(html: &str) -> Vec<DiscographyRow> {
    html.split("<tr")
        .filter_map(|row| {
            let link = ALBUM_LINK.captures(row)?;
            let cells: Vec<String> = TEXT_CELL
                .captures_iter(row)
                .map(|caps| decode_entities(&caps[1]))
                .filter(|cell| !cell.is_empty())
                .collect();
            let album_type = AlbumType::from(cells.first()?.as_str());
            let year = cells.get(1)?.parse().ok()?;
            let (review_count, score) = match REVIEWS.captures(row) {
                Some(caps) => (caps[1].parse().unwrap_or(0), caps[2].parse().ok()),
                None => (0, None),
            };
            Some(DiscographyRow {
                title: decode_entities(&link[2]),
                url: link[1].to_string(),
                album_type,
                year,
                score,
                review_count,
            })
        })
        .collect()
}

/// Parse the catalog's release date text; missing month or day default to 1.
pub fn parse_date_text(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    if let Some(caps) = FULL_DATE.captures(text) {
        let month = caps[1].parse::<Month>().ok()?.number_from_month();
        return NaiveDate::from_ymd_opt(caps[3].parse().ok()?, month, caps[2].parse().ok()?);
    }
    if let Some(caps) = MONTH_YEAR.captures(text) {
        let month = caps[1].parse::<Month>().ok()?.number_from_month();
        return NaiveDate::from_ymd_opt(caps[2].parse().ok()?, month, 1);
    }
    let caps = YEAR_ONLY.captures(text)?;
    NaiveDate::from_ymd_opt(caps[1].parse().ok()?, 1, 1)
}

/// Release date from an album page, falling back to January 1st of the discography year.
pub fn parse_release_date(album_page: &str, fallback_year: i32) -> Result<NaiveDate, CatalogError> {
    RELEASE_DATE
        .captures(album_page)
        .and_then(|caps| parse_date_text(&decode_entities(&caps[1])))
        .or_else(|| NaiveDate::from_ymd_opt(fallback_year, 1, 1))
        .ok_or_else(|| CatalogError::Parse(format!("invalid release year {}", fallback_year)))
}

// ============================================================================
// Client
// ============================================================================

pub struct MetallumClient {
    http_client: ureq::Agent,
    base_url: String,
}

impl MetallumClient {
    pub fn new(base_url: &str) -> Self {
        let http_client = ureq::AgentBuilder::new()
            .timeout_connect(Duration::from_secs(10))
            .timeout_read(Duration::from_secs(30))
            .user_agent(USER_AGENT)
            .build();
        Self {
            http_client,
            base_url: base_url.trim().trim_end_matches('/').to_string(),
        }
    }

    fn get(&self, url: &str) -> Result<ureq::Response, CatalogError> {
        self.http_client.get(url).call().map_err(|err| match err {
            ureq::Error::Status(status, _) => CatalogError::Status {
                status,
                url: url.to_string(),
            },
            ureq::Error::Transport(transport) => {
                CatalogError::Network(format!("{}: {}", url, transport))
            }
        })
    }

    fn get_text(&self, url: &str) -> Result<String, CatalogError> {
        self.get(url)?
            .into_string()
            .map_err(|err| CatalogError::Network(format!("{}: {}", url, err)))
    }

    fn search_url(&self, name: &str) -> String {
        format!(
            "{}/search/ajax-band-search/?field=name&query={}&exactBandMatch=1\
             &sEcho=1&iColumns=3&sColumns=&iDisplayStart=0&iDisplayLength=200",
            self.base_url,
            urlencoding::encode(name)
        )
    }
}

impl Catalog for MetallumClient {
    fn search_by_name(&self, name: &str) -> Result<Vec<BandHandle>, CatalogError> {
        let url = self.search_url(name);
        let response: Value = self
            .get(&url)?
            .into_json()
            .map_err(|err| CatalogError::Parse(format!("band search for {:?}: {}", name, err)))?;
        parse_search_results(&response)
    }

    fn fetch_profile(
        &self,
        band: &BandHandle,
        album_type: AlbumType,
    ) -> Result<BandProfile, CatalogError> {
        let band_page = self.get_text(&format!("{}/bands/_/{}", self.base_url, band.id))?;
        let discography = self.get_text(&format!(
            "{}/band/discography/id/{}/tab/all",
            self.base_url, band.id
        ))?;

        let mut albums = Vec::new();
        for row in parse_discography(&discography)
            .into_iter()
            .filter(|row| row.album_type == album_type)
        {
            let album_page = self.get_text(&row.url)?;
            albums.push(CatalogAlbum {
                release_date: parse_release_date(&album_page, row.year)?,
                title: row.title,
                album_type: row.album_type,
                score: row.score,
                review_count: row.review_count,
            });
        }

        Ok(BandProfile {
            id: band.id.clone(),
            name: band.name.clone(),
            status: parse_status(&band_page),
            albums,
        })
    }
}
