use super::kmeans::{self, KMeansParams};
use crate::error::{PlanscopeError, Result};
use crate::types::config::TrackParams;
use crate::types::record::Record;
use crate::types::report::{HeatTier, TrackAggregate};
use std::collections::BTreeMap;

#[derive(Default)]
struct TrackTotals {
    market: f64,
    tech: f64,
    team: f64,
    first_place: usize,
    count: usize,
}

/// Aggregates records per track and clusters the tracks into heat tiers.
///
/// Clusters are ranked by the sum of their centroid features (mean market
/// score, mean tech score, first-place count), hottest first, and labels are
/// assigned by that rank rather than by the raw cluster index.
pub fn analyze(records: &[Record], params: &TrackParams) -> Result<Vec<TrackAggregate>> {
    if records.is_empty() {
        tracing::warn!("no records to analyze, returning no tracks");
        return Ok(Vec::new());
    }

    let mut aggregates = aggregate(records, &params.top_tier);
    let k = params.cluster_count;
    if k == 0 || k > aggregates.len() {
        return Err(PlanscopeError::Validation(format!(
            "cluster count {k} must be between 1 and the number of distinct tracks ({})",
            aggregates.len()
        )));
    }

    let points = aggregates
        .iter()
        .map(TrackAggregate::cluster_features)
        .collect::<Vec<_>>();
    let fit = kmeans::fit(
        &points,
        KMeansParams {
            clusters: k,
            n_init: params.n_init,
            max_iter: params.max_iter,
            seed: params.seed,
        },
    );
    tracing::info!(tracks = aggregates.len(), clusters = k, inertia = fit.inertia, "clustered tracks");

    let tiers = rank_clusters(&fit.centroids);
    for (aggregate, &label) in aggregates.iter_mut().zip(&fit.labels) {
        aggregate.heat = tiers[label];
    }
    Ok(aggregates)
}

/// Maps each cluster index to a heat tier by ranking centroid feature sums.
fn rank_clusters(centroids: &[kmeans::Point]) -> Vec<HeatTier> {
    let mut order = (0..centroids.len()).collect::<Vec<_>>();
    order.sort_by(|&a, &b| {
        let heat_a: f64 = centroids[a].iter().sum();
        let heat_b: f64 = centroids[b].iter().sum();
        heat_b.total_cmp(&heat_a).then_with(|| a.cmp(&b))
    });

    let mut tiers = vec![HeatTier::Niche; centroids.len()];
    for (rank, cluster) in order.into_iter().enumerate() {
        tiers[cluster] = HeatTier::for_rank(rank, centroids.len());
    }
    tiers
}

fn aggregate(records: &[Record], top_tier: &str) -> Vec<TrackAggregate> {
    let mut groups: BTreeMap<&str, TrackTotals> = BTreeMap::new();
    for record in records {
        let totals = groups.entry(record.track.as_str()).or_default();
        totals.market += record.market_score;
        totals.tech += record.tech_score;
        totals.team += record.team_score;
        totals.count += 1;
        if record.award_tier == top_tier {
            totals.first_place += 1;
        }
    }

    groups
        .into_iter()
        .map(|(track, totals)| {
            let count = totals.count as f64;
            TrackAggregate {
                track: track.to_string(),
                mean_market: totals.market / count,
                mean_tech: totals.tech / count,
                mean_team: totals.team / count,
                first_place_count: totals.first_place,
                record_count: totals.count,
                heat: HeatTier::Niche,
            }
        })
        .collect()
}
