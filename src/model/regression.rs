use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

const PIVOT_EPSILON: f64 = 1e-10;

/// Shuffles `0..n` with a seeded RNG and splits off `ceil(n * test_size)`
/// indices as the held-out set. Returns `(train, test)`.
pub fn train_test_split(n: usize, test_size: f64, seed: u64) -> (Vec<usize>, Vec<usize>) {
    let mut indices = (0..n).collect::<Vec<_>>();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let n_test = ((n as f64) * test_size).ceil() as usize;
    let n_test = n_test.min(n);
    let train = indices.split_off(n_test);
    (train, indices)
}

/// Ordinary least squares with an intercept.
///
/// Solves the normal equations on centered features so the intercept drops
/// out; a degenerate pivot (a constant or collinear feature) pins that
/// coefficient to zero instead of failing.
pub fn fit_ols(features: &[[f64; 3]], targets: &[f64]) -> ([f64; 3], f64) {
    let n = features.len().min(targets.len());
    if n == 0 {
        return ([0.0; 3], 0.0);
    }
    let count = n as f64;

    let mut mean_x = [0.0; 3];
    for row in &features[..n] {
        for (mean, value) in mean_x.iter_mut().zip(row) {
            *mean += value / count;
        }
    }
    let mean_y = targets[..n].iter().sum::<f64>() / count;

    let mut gram = [[0.0; 3]; 3];
    let mut moment = [0.0; 3];
    for (row, &y) in features[..n].iter().zip(&targets[..n]) {
        let centered = [row[0] - mean_x[0], row[1] - mean_x[1], row[2] - mean_x[2]];
        for i in 0..3 {
            moment[i] += centered[i] * (y - mean_y);
            for j in 0..3 {
                gram[i][j] += centered[i] * centered[j];
            }
        }
    }

    let coefficients = solve_3x3(gram, moment);
    let intercept = mean_y
        - coefficients
            .iter()
            .zip(&mean_x)
            .map(|(beta, mean)| beta * mean)
            .sum::<f64>();
    (coefficients, intercept)
}

/// Gaussian elimination with partial pivoting.
fn solve_3x3(mut a: [[f64; 3]; 3], mut b: [f64; 3]) -> [f64; 3] {
    let scale = a
        .iter()
        .flat_map(|row| row.iter())
        .fold(0.0_f64, |acc, value| acc.max(value.abs()))
        .max(1.0);
    let mut pivot_cols = [None; 3];
    let mut row = 0;

    for col in 0..3 {
        let best = (row..3).max_by(|&x, &y| a[x][col].abs().total_cmp(&a[y][col].abs()));
        let Some(best) = best else { break };
        if a[best][col].abs() <= PIVOT_EPSILON * scale {
            tracing::warn!(feature = col, "degenerate regression feature, coefficient set to 0");
            continue;
        }
        a.swap(row, best);
        b.swap(row, best);
        for other in 0..3 {
            if other == row {
                continue;
            }
            let factor = a[other][col] / a[row][col];
            if factor == 0.0 {
                continue;
            }
            for k in col..3 {
                a[other][k] -= factor * a[row][k];
            }
            b[other] -= factor * b[row];
        }
        pivot_cols[row] = Some(col);
        row += 1;
    }

    let mut solution = [0.0; 3];
    for (r, pivot) in pivot_cols.iter().enumerate() {
        if let Some(col) = *pivot {
            let free: f64 = (0..3)
                .filter(|&k| k != col)
                .map(|k| a[r][k] * solution[k])
                .sum();
            solution[col] = (b[r] - free) / a[r][col];
        }
    }
    solution
}

pub fn mean_squared_error(actual: &[f64], predicted: &[f64]) -> f64 {
    if actual.is_empty() {
        return 0.0;
    }
    actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| (a - p) * (a - p))
        .sum::<f64>()
        / actual.len() as f64
}

/// Coefficient of determination. Constant targets score 1.0 when predicted
/// exactly and 0.0 otherwise.
pub fn r2_score(actual: &[f64], predicted: &[f64]) -> f64 {
    if actual.is_empty() {
        return 0.0;
    }
    let mean = actual.iter().sum::<f64>() / actual.len() as f64;
    let ss_res: f64 = actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| (a - p) * (a - p))
        .sum();
    let ss_tot: f64 = actual.iter().map(|a| (a - mean) * (a - mean)).sum();
    if ss_tot == 0.0 {
        if ss_res == 0.0 {
            1.0
        } else {
            0.0
        }
    } else {
        1.0 - ss_res / ss_tot
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_holds_out_ceiling_of_test_share() {
        let (train, test) = train_test_split(10, 0.2, 42);
        assert_eq!(train.len(), 8);
        assert_eq!(test.len(), 2);

        let (train, test) = train_test_split(11, 0.2, 42);
        assert_eq!(train.len(), 8);
        assert_eq!(test.len(), 3);

        let mut all = train.iter().chain(&test).copied().collect::<Vec<_>>();
        all.sort_unstable();
        assert_eq!(all, (0..11).collect::<Vec<_>>());
    }

    #[test]
    fn split_is_reproducible_for_a_seed() {
        assert_eq!(train_test_split(25, 0.2, 7), train_test_split(25, 0.2, 7));
    }

    #[test]
    fn recovers_exact_linear_relation() {
        let features = vec![
            [80.0, 90.0, 70.0],
            [60.0, 75.0, 85.0],
            [95.0, 60.0, 65.0],
            [70.0, 88.0, 92.0],
            [55.0, 66.0, 77.0],
            [90.0, 91.0, 60.0],
        ];
        let targets = features
            .iter()
            .map(|[m, t, s]| 2.0 * m - 0.5 * t + 0.25 * s + 3.0)
            .collect::<Vec<_>>();

        let (beta, intercept) = fit_ols(&features, &targets);
        assert!((beta[0] - 2.0).abs() < 1e-8);
        assert!((beta[1] + 0.5).abs() < 1e-8);
        assert!((beta[2] - 0.25).abs() < 1e-8);
        assert!((intercept - 3.0).abs() < 1e-6);
    }

    #[test]
    fn constant_feature_gets_zero_coefficient() {
        let features = vec![
            [80.0, 50.0, 70.0],
            [60.0, 50.0, 85.0],
            [95.0, 50.0, 65.0],
            [70.0, 50.0, 92.0],
        ];
        let targets = features
            .iter()
            .map(|row| row.iter().sum::<f64>() / 3.0)
            .collect::<Vec<_>>();

        let (beta, intercept) = fit_ols(&features, &targets);
        assert_eq!(beta[1], 0.0);
        for (row, target) in features.iter().zip(&targets) {
            let predicted = beta[0] * row[0] + beta[1] * row[1] + beta[2] * row[2] + intercept;
            assert!((predicted - target).abs() < 1e-8);
        }
    }

    #[test]
    fn metrics_match_hand_computation() {
        let actual = [1.0, 2.0, 3.0];
        let predicted = [1.0, 2.0, 4.0];
        assert!((mean_squared_error(&actual, &predicted) - 1.0 / 3.0).abs() < 1e-12);
        assert!((r2_score(&actual, &predicted) - 0.5).abs() < 1e-12);
        assert_eq!(r2_score(&[5.0, 5.0], &[5.0, 5.0]), 1.0);
        assert_eq!(r2_score(&[5.0, 5.0], &[4.0, 5.0]), 0.0);
    }
}
