pub mod cache;
pub mod clean;

use crate::error::{PlanscopeError, Result};
use crate::types::record::{RawRecord, Record, SubScore};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

const MISSING_MARKERS: [&str; 7] = ["nan", "NaN", "NA", "N/A", "null", "None", "NULL"];

/// Columns every award table must carry, as (header, accepted alias).
const REQUIRED_COLUMNS: [(&str, &str); 7] = [
    ("赛道分类", "track"),
    ("市场前景评分", "market_score"),
    ("技术创新评分", "tech_score"),
    ("团队实力评分", "team_score"),
    ("获奖等级", "award_tier"),
    ("项目名称", "project_name"),
    ("核心关键词", "keywords"),
];

#[derive(Debug, Deserialize)]
struct InputRow {
    #[serde(rename = "赛道分类", alias = "track")]
    track: Option<String>,
    #[serde(rename = "市场前景评分", alias = "market_score")]
    market_score: Option<String>,
    #[serde(rename = "技术创新评分", alias = "tech_score")]
    tech_score: Option<String>,
    #[serde(rename = "团队实力评分", alias = "team_score")]
    team_score: Option<String>,
    #[serde(rename = "获奖等级", alias = "award_tier")]
    award_tier: Option<String>,
    #[serde(rename = "项目名称", alias = "project_name")]
    project_name: Option<String>,
    #[serde(rename = "核心关键词", alias = "keywords")]
    keywords: Option<String>,
}

#[derive(Debug, Serialize)]
struct OutputRow<'a> {
    #[serde(rename = "赛道分类")]
    track: &'a str,
    #[serde(rename = "市场前景评分")]
    market_score: f64,
    #[serde(rename = "技术创新评分")]
    tech_score: f64,
    #[serde(rename = "团队实力评分")]
    team_score: f64,
    #[serde(rename = "获奖等级")]
    award_tier: &'a str,
    #[serde(rename = "项目名称")]
    project_name: &'a str,
    #[serde(rename = "核心关键词")]
    keywords: String,
    #[serde(rename = "总分")]
    composite: f64,
}

/// Reads the raw award table. Missing scores are kept as `None`.
pub fn load_raw(path: &Path) -> Result<Vec<RawRecord>> {
    let rows = read_rows(path)?;
    let mut records = Vec::with_capacity(rows.len());
    for (index, row) in rows.into_iter().enumerate() {
        // header is line 1
        let line = index + 2;
        records.push(RawRecord {
            track: row.track.unwrap_or_default(),
            market_score: parse_score(path, line, SubScore::Market, row.market_score)?,
            tech_score: parse_score(path, line, SubScore::Tech, row.tech_score)?,
            team_score: parse_score(path, line, SubScore::Team, row.team_score)?,
            award_tier: row.award_tier.unwrap_or_default().trim().to_string(),
            project_name: row.project_name.unwrap_or_default(),
            keywords: row.keywords.filter(|value| !is_missing(value)),
        });
    }
    tracing::info!(path = %path.display(), rows = records.len(), "loaded raw records");
    Ok(records)
}

/// Reads a cleaned table written by [`write_processed`].
///
/// Every score must be present; the stored composite column is ignored and
/// recomputed from the sub-scores.
pub fn load_processed(path: &Path, delimiter: char) -> Result<Vec<Record>> {
    let raw = load_raw(path)?;
    let mut records = Vec::with_capacity(raw.len());
    for (index, row) in raw.into_iter().enumerate() {
        let line = index + 2;
        let require = |which: SubScore| {
            row.score(which).ok_or_else(|| PlanscopeError::ReadFailure {
                path: path.display().to_string(),
                reason: format!(
                    "line {line}: column {} is empty in a cleaned table",
                    which.column()
                ),
            })
        };
        let market_score = require(SubScore::Market)?;
        let tech_score = require(SubScore::Tech)?;
        let team_score = require(SubScore::Team)?;
        records.push(Record {
            track: row.track,
            market_score,
            tech_score,
            team_score,
            award_tier: row.award_tier,
            project_name: row.project_name,
            keywords: clean::parse_keywords(row.keywords.as_deref(), delimiter),
        });
    }
    Ok(records)
}

pub fn write_processed(path: &Path, records: &[Record], delimiter: char) -> Result<()> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let mut writer = csv::Writer::from_path(path)?;
    let separator = delimiter.to_string();
    for record in records {
        writer.serialize(OutputRow {
            track: &record.track,
            market_score: record.market_score,
            tech_score: record.tech_score,
            team_score: record.team_score,
            award_tier: &record.award_tier,
            project_name: &record.project_name,
            keywords: record.keywords.join(&separator),
            composite: record.composite(),
        })?;
    }
    writer.flush()?;
    tracing::info!(path = %path.display(), rows = records.len(), "wrote cleaned table");
    Ok(())
}

fn read_rows(path: &Path) -> Result<Vec<InputRow>> {
    if !path.exists() {
        return Err(PlanscopeError::SourceNotFound(path.display().to_string()));
    }
    let read_failure = |reason: String| PlanscopeError::ReadFailure {
        path: path.display().to_string(),
        reason,
    };

    let bytes = fs::read(path).map_err(|e| read_failure(e.to_string()))?;
    let content = String::from_utf8(bytes).map_err(|e| read_failure(e.to_string()))?;
    let content = content.trim_start_matches('\u{feff}');

    // rows must match the header width; csv reports the offending line
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::Headers)
        .from_reader(content.as_bytes());
    let headers = reader
        .headers()
        .map_err(|e| read_failure(e.to_string()))?
        .clone();
    for (column, alias) in REQUIRED_COLUMNS {
        if !headers
            .iter()
            .any(|header| header == column || header == alias)
        {
            return Err(read_failure(format!("missing column {column}")));
        }
    }

    reader
        .deserialize::<InputRow>()
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| read_failure(e.to_string()))
}

fn is_missing(value: &str) -> bool {
    let trimmed = value.trim();
    trimmed.is_empty() || MISSING_MARKERS.contains(&trimmed)
}

fn parse_score(
    path: &Path,
    line: usize,
    which: SubScore,
    value: Option<String>,
) -> Result<Option<f64>> {
    let Some(value) = value.filter(|value| !is_missing(value)) else {
        return Ok(None);
    };
    match value.trim().parse::<f64>() {
        Ok(score) if score.is_nan() => Ok(None),
        Ok(score) if score.is_finite() => Ok(Some(score)),
        _ => Err(PlanscopeError::ReadFailure {
            path: path.display().to_string(),
            reason: format!(
                "line {line}: column {} has non-numeric value {value:?}",
                which.column()
            ),
        }),
    }
}
