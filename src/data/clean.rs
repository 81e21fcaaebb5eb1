use crate::types::record::{RawRecord, Record, SubScore};
use crate::types::report::{CleaningReport, ColumnFill};
use std::collections::HashSet;

/// Normalizes raw award rows into the canonical cleaned table.
///
/// Steps run in a fixed order: exact-duplicate removal, track-name
/// normalization, per-column median fill, keyword parsing. Rows that only
/// become identical after normalization or filling are collapsed at the end,
/// so cleaning an already-clean table is a no-op.
pub fn clean(raw: &[RawRecord], delimiter: char) -> (Vec<Record>, CleaningReport) {
    let mut rows = dedup_by(raw.to_vec(), raw_key);
    let rows_after_dedup = rows.len();

    for row in &mut rows {
        row.track = normalize_track(&row.track);
    }

    let mut fills = Vec::new();
    for which in SubScore::ALL {
        let missing = rows.iter().filter(|row| row.score(which).is_none()).count();
        if missing == 0 {
            continue;
        }
        let present = rows
            .iter()
            .filter_map(|row| row.score(which))
            .collect::<Vec<_>>();
        let median = match median(&present) {
            Some(median) => median,
            None => {
                tracing::warn!(
                    column = which.column(),
                    "column has no values to take a median from, filling with 0"
                );
                0.0
            }
        };
        for row in &mut rows {
            let slot = row.score_mut(which);
            if slot.is_none() {
                *slot = Some(median);
            }
        }
        tracing::info!(column = which.column(), missing, median, "filled missing scores");
        fills.push(ColumnFill {
            column: which,
            missing,
            median,
        });
    }

    let records = rows
        .into_iter()
        .map(|row| Record {
            market_score: row.market_score.unwrap_or_default(),
            tech_score: row.tech_score.unwrap_or_default(),
            team_score: row.team_score.unwrap_or_default(),
            keywords: parse_keywords(row.keywords.as_deref(), delimiter),
            track: row.track,
            award_tier: row.award_tier,
            project_name: row.project_name,
        })
        .collect::<Vec<_>>();
    let records = dedup_by(records, |record| {
        raw_key(&record.to_raw(delimiter))
    });

    let report = CleaningReport {
        rows_read: raw.len(),
        rows_after_dedup,
        rows_written: records.len(),
        fills,
        output: None,
    };
    (records, report)
}

/// Trims a track name, drops all whitespace (including U+3000), folds
/// full-width letters and digits to half-width and strips full-width
/// punctuation, so `"Ａ 赛道"` becomes `"A赛道"` and `"AI＋教育"` becomes
/// `"AI教育"`.
pub fn normalize_track(track: &str) -> String {
    track
        .chars()
        .filter(|c| !c.is_whitespace())
        .filter_map(|c| match c {
            '\u{FF10}'..='\u{FF19}' | '\u{FF21}'..='\u{FF3A}' | '\u{FF41}'..='\u{FF5A}' => {
                char::from_u32(c as u32 - 0xFEE0)
            }
            '\u{FF01}'..='\u{FF5E}' => None,
            _ => Some(c),
        })
        .collect()
}

/// Splits a keyword field into lower-case, trimmed, non-empty tokens.
pub fn parse_keywords(field: Option<&str>, delimiter: char) -> Vec<String> {
    field
        .map(|field| {
            field
                .split(delimiter)
                .map(|keyword| keyword.trim().to_lowercase())
                .filter(|keyword| !keyword.is_empty())
                .collect()
        })
        .unwrap_or_default()
}

/// Median of the given values; mean of the two middle values for even counts.
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

type RowKey = (String, [Option<u64>; 3], String, String, Option<String>);

fn raw_key(row: &RawRecord) -> RowKey {
    (
        row.track.clone(),
        SubScore::ALL.map(|which| row.score(which).map(f64::to_bits)),
        row.award_tier.clone(),
        row.project_name.clone(),
        row.keywords.clone(),
    )
}

fn dedup_by<T>(rows: Vec<T>, key: impl Fn(&T) -> RowKey) -> Vec<T> {
    let mut seen = HashSet::new();
    rows.into_iter().filter(|row| seen.insert(key(row))).collect()
}
