use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const TOLERANCE: f64 = 1e-4;

pub type Point = [f64; 3];

#[derive(Debug, Clone, PartialEq)]
pub struct KMeansFit {
    pub centroids: Vec<Point>,
    pub labels: Vec<usize>,
    pub inertia: f64,
}

#[derive(Debug, Clone, Copy)]
pub struct KMeansParams {
    pub clusters: usize,
    pub n_init: usize,
    pub max_iter: usize,
    pub seed: u64,
}

/// Lloyd's k-means with k-means++ seeding. Runs `n_init` seeded restarts
/// from one `StdRng` and keeps the lowest inertia, so the same input and
/// seed always give the same partition.
///
/// Callers guarantee `1 <= clusters <= points.len()`.
pub fn fit(points: &[Point], params: KMeansParams) -> KMeansFit {
    let mut rng = StdRng::seed_from_u64(params.seed);
    let mut best: Option<KMeansFit> = None;
    for run in 0..params.n_init.max(1) {
        let candidate = fit_once(points, params.clusters, params.max_iter, &mut rng);
        tracing::trace!(run, inertia = candidate.inertia, "k-means restart finished");
        if best
            .as_ref()
            .map_or(true, |current| candidate.inertia < current.inertia)
        {
            best = Some(candidate);
        }
    }
    best.unwrap_or_else(|| KMeansFit {
        centroids: Vec::new(),
        labels: Vec::new(),
        inertia: 0.0,
    })
}

fn fit_once(points: &[Point], k: usize, max_iter: usize, rng: &mut StdRng) -> KMeansFit {
    let mut centroids = seed_plus_plus(points, k, rng);
    let mut labels = vec![0usize; points.len()];

    for _ in 0..max_iter.max(1) {
        assign(points, &centroids, &mut labels);
        let updated = update(points, &labels, &centroids);
        let shift = centroids
            .iter()
            .zip(&updated)
            .map(|(old, new)| squared_distance(old, new))
            .sum::<f64>();
        centroids = updated;
        if shift <= TOLERANCE {
            break;
        }
    }
    assign(points, &centroids, &mut labels);

    let inertia = points
        .iter()
        .zip(&labels)
        .map(|(point, &label)| squared_distance(point, &centroids[label]))
        .sum();
    KMeansFit {
        centroids,
        labels,
        inertia,
    }
}

fn seed_plus_plus(points: &[Point], k: usize, rng: &mut StdRng) -> Vec<Point> {
    let mut centroids = Vec::with_capacity(k);
    centroids.push(points[rng.gen_range(0..points.len())]);

    while centroids.len() < k {
        let weights = points
            .iter()
            .map(|point| nearest(point, &centroids).1)
            .collect::<Vec<_>>();
        let total: f64 = weights.iter().sum();
        let chosen = if total > 0.0 {
            let mut target = rng.gen::<f64>() * total;
            let mut chosen = points.len() - 1;
            for (idx, weight) in weights.iter().enumerate() {
                if target < *weight {
                    chosen = idx;
                    break;
                }
                target -= weight;
            }
            chosen
        } else {
            // every point already coincides with a centroid
            rng.gen_range(0..points.len())
        };
        centroids.push(points[chosen]);
    }
    centroids
}

fn assign(points: &[Point], centroids: &[Point], labels: &mut [usize]) {
    for (point, label) in points.iter().zip(labels.iter_mut()) {
        *label = nearest(point, centroids).0;
    }
}

fn update(points: &[Point], labels: &[usize], previous: &[Point]) -> Vec<Point> {
    let k = previous.len();
    let mut sums = vec![[0.0; 3]; k];
    let mut counts = vec![0usize; k];
    for (point, &label) in points.iter().zip(labels) {
        counts[label] += 1;
        for (sum, value) in sums[label].iter_mut().zip(point) {
            *sum += value;
        }
    }

    let mut centroids = previous.to_vec();
    let mut taken = Vec::new();
    for cluster in 0..k {
        if counts[cluster] > 0 {
            centroids[cluster] = sums[cluster].map(|sum| sum / counts[cluster] as f64);
            continue;
        }
        // empty cluster: re-seed it with the point farthest from its centroid
        let farthest = points
            .iter()
            .enumerate()
            .filter(|(idx, _)| !taken.contains(idx))
            .map(|(idx, point)| (idx, squared_distance(point, &previous[labels[idx]])))
            .max_by(|a, b| a.1.total_cmp(&b.1).then_with(|| b.0.cmp(&a.0)));
        if let Some((idx, _)) = farthest {
            tracing::debug!(cluster, point = idx, "re-seeding empty k-means cluster");
            taken.push(idx);
            centroids[cluster] = points[idx];
        }
    }
    centroids
}

fn nearest(point: &Point, centroids: &[Point]) -> (usize, f64) {
    let mut best = (0, f64::INFINITY);
    for (idx, centroid) in centroids.iter().enumerate() {
        let distance = squared_distance(point, centroid);
        if distance < best.1 {
            best = (idx, distance);
        }
    }
    best
}

pub fn squared_distance(a: &Point, b: &Point) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}
