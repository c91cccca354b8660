//! `new_releases.json` writer.

use anyhow::{Context, Result};
use serde::Serialize;
use std::path::Path;

use crate::models::CandidateRelease;

pub const DEFAULT_OUTPUT_FILE: &str = "new_releases.json";

/// One entry of the output file. Every field is a string.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct NewReleaseRecord {
    pub band: String,
    pub album: String,
    pub release_date: String,  // YYYY-MM-DD
    pub average_score: String, // "92%"
    pub review_count: String,
}

impl From<&CandidateRelease> for NewReleaseRecord {
    fn from(release: &CandidateRelease) -> Self {
        Self {
            band: release.band.clone(),
            album: release.album.clone(),
            release_date: release.release_date.format("%Y-%m-%d").to_string(),
            average_score: format!("{}%", release.score.unwrap_or(0)),
            review_count: release.review_count.to_string(),
        }
    }
}

pub fn to_json(releases: &[CandidateRelease]) -> Result<String> {
    let records: Vec<NewReleaseRecord> = releases.iter().map(NewReleaseRecord::from).collect();
    Ok(serde_json::to_string_pretty(&records)?)
}

/// Write the releases to `path`. Nothing is written for an empty list.
/// Returns whether the file was written.
pub fn write_new_releases(path: &Path, releases: &[CandidateRelease]) -> Result<bool> {
    if releases.is_empty() {
        return Ok(false);
    }
    let json = to_json(releases)?;
    std::fs::write(path, json).with_context(|| format!("Failed to write {:?}", path))?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn release(score: Option<u32>, reviews: u32) -> CandidateRelease {
        CandidateRelease {
            band: "Vader".to_string(),
            album: "Tibi et Igni".to_string(),
            release_date: NaiveDate::from_ymd_opt(2014, 5, 30).unwrap(),
            score,
            review_count: reviews,
        }
    }

    #[test]
    fn test_record_shape() {
        let record = NewReleaseRecord::from(&release(Some(84), 5));
        assert_eq!(record.release_date, "2014-05-30");
        assert_eq!(record.average_score, "84%");
        assert_eq!(record.review_count, "5");

        let unreviewed = NewReleaseRecord::from(&release(None, 0));
        assert_eq!(unreviewed.average_score, "0%");
        assert_eq!(unreviewed.review_count, "0");
    }

    #[test]
    fn test_json_layout() {
        let json = to_json(&[release(Some(84), 5)]).unwrap();
        let expected = r#"[
  {
    "band": "Vader",
    "album": "Tibi et Igni",
    "release_date": "2014-05-30",
    "average_score": "84%",
    "review_count": "5"
  }
]"#;
        assert_eq!(json, expected);
    }

    #[test]
    fn test_empty_list_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DEFAULT_OUTPUT_FILE);
        assert!(!write_new_releases(&path, &[]).unwrap());
        assert!(!path.exists());

        assert!(write_new_releases(&path, &[release(Some(84), 5)]).unwrap());
        let written: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written[0]["album"], "Tibi et Igni");
    }
}
