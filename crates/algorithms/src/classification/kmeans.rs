//! K-means clustering of feature vectors
//!
//! Features are min-max normalized per dimension before clustering, with
//! constant dimensions mapped to zero. Centroids are seeded with k-means++
//! and refined by Lloyd iterations; the run with the lowest inertia over
//! `n_init` restarts wins. Labels are ordered by ascending centroid along
//! the first feature, so label 0 is always the lowest cluster.

use crate::maybe_rayon::*;
use lstanom_core::{Error, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Parameters for K-means clustering
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KmeansParams {
    /// Number of clusters
    pub k: usize,
    /// Maximum Lloyd iterations per run (default: 100)
    pub max_iterations: usize,
    /// Stop when no centroid moves more than this in normalized units (default: 0.001)
    pub convergence: f64,
    /// Random seed for centroid seeding. Required: `None` fails validation,
    /// and a missing `seed` key deserializes to `None`.
    #[serde(default)]
    pub seed: Option<u64>,
    /// Number of independently seeded runs (default: 4)
    pub n_init: usize,
}

impl Default for KmeansParams {
    fn default() -> Self {
        Self {
            k: 3,
            max_iterations: 100,
            convergence: 0.001,
            seed: Some(0),
            n_init: 4,
        }
    }
}

impl KmeansParams {
    pub fn validate(&self) -> Result<()> {
        if self.k == 0 {
            return Err(Error::InvalidParameter {
                name: "k",
                value: "0".into(),
                reason: "at least one cluster is required".into(),
            });
        }
        if self.max_iterations == 0 || self.n_init == 0 {
            return Err(Error::InvalidParameter {
                name: "max_iterations",
                value: format!("{}/{}", self.max_iterations, self.n_init),
                reason: "iterations and restarts must be at least 1".into(),
            });
        }
        if !(self.convergence.is_finite() && self.convergence >= 0.0) {
            return Err(Error::InvalidParameter {
                name: "convergence",
                value: self.convergence.to_string(),
                reason: "must be a non-negative number".into(),
            });
        }
        self.required_seed()?;
        Ok(())
    }

    /// The configured seed
    pub fn required_seed(&self) -> Result<u64> {
        self.seed.ok_or_else(|| Error::InvalidParameter {
            name: "clustering.seed",
            value: "<missing>".into(),
            reason: "a clustering seed must be configured explicitly".into(),
        })
    }
}

/// Outcome of a clustering run
#[derive(Debug, Clone, PartialEq)]
pub struct KmeansResult {
    /// Cluster label of each input row, in `0..k`
    pub labels: Vec<usize>,
    /// Cluster centroids in the original feature units
    pub centroids: Vec<Vec<f64>>,
    /// Within-cluster sum of squares in normalized units
    pub inertia: f64,
    /// Lloyd iterations of the winning run
    pub iterations: usize,
}

/// Cluster `features` (one row per observation) into `params.k` groups.
///
/// Fails with [`Error::InsufficientObservations`] when there are fewer
/// distinct feature vectors than clusters, so every cluster is non-empty.
pub fn kmeans(features: &[Vec<f64>], params: &KmeansParams) -> Result<KmeansResult> {
    params.validate()?;
    let seed = params.required_seed()?;
    if features.len() < params.k {
        return Err(Error::InsufficientObservations {
            requested: params.k,
            available: features.len(),
        });
    }
    let dims = features[0].len();
    if dims == 0 || features.iter().any(|f| f.len() != dims) {
        return Err(Error::InvalidParameter {
            name: "features",
            value: format!("{dims} dimensions"),
            reason: "every row needs the same non-zero number of features".into(),
        });
    }
    if features.iter().flatten().any(|v| !v.is_finite()) {
        return Err(Error::InvalidParameter {
            name: "features",
            value: "non-finite".into(),
            reason: "features must be finite".into(),
        });
    }

    let points = normalize(features, dims);
    let distinct = count_distinct(&points);
    if distinct < params.k {
        return Err(Error::InsufficientObservations {
            requested: params.k,
            available: distinct,
        });
    }
    let mut rng = StdRng::seed_from_u64(seed);

    let mut best: Option<Run> = None;
    for _ in 0..params.n_init {
        let seeds = kmeans_plus_plus(&points, params.k, &mut rng);
        let run = lloyd(&points, seeds, params);
        if run.has_empty_cluster(params.k) {
            continue;
        }
        if best.as_ref().is_none_or(|b| run.inertia < b.inertia) {
            best = Some(run);
        }
    }
    let best = best.ok_or_else(|| {
        Error::Algorithm(format!("every k-means run left one of {} clusters empty", params.k))
    })?;

    Ok(relabel(features, best, params.k, dims))
}

struct Run {
    labels: Vec<usize>,
    inertia: f64,
    iterations: usize,
}

impl Run {
    fn has_empty_cluster(&self, k: usize) -> bool {
        let mut used = vec![false; k];
        for &label in &self.labels {
            used[label] = true;
        }
        used.contains(&false)
    }
}

fn count_distinct(points: &[Vec<f64>]) -> usize {
    let mut sorted: Vec<&Vec<f64>> = points.iter().collect();
    sorted.sort_by(|a, b| {
        a.iter()
            .zip(b.iter())
            .map(|(x, y)| x.total_cmp(y))
            .find(|o| o.is_ne())
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    sorted.dedup();
    sorted.len()
}

/// Min-max scale each dimension to [0, 1]; constant dimensions become 0
fn normalize(features: &[Vec<f64>], dims: usize) -> Vec<Vec<f64>> {
    let ranges: Vec<(f64, f64)> = (0..dims)
        .map(|d| {
            features.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), f| {
                (lo.min(f[d]), hi.max(f[d]))
            })
        })
        .collect();

    features
        .iter()
        .map(|f| {
            f.iter()
                .zip(&ranges)
                .map(|(&v, &(lo, hi))| if hi > lo { (v - lo) / (hi - lo) } else { 0.0 })
                .collect()
        })
        .collect()
}

fn sq_dist(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}

/// Index and squared distance of the nearest centroid (lowest index on ties)
fn nearest(point: &[f64], centroids: &[Vec<f64>]) -> (usize, f64) {
    let mut best_dist = f64::INFINITY;
    let mut best_k = 0;
    for (k, c) in centroids.iter().enumerate() {
        let dist = sq_dist(point, c);
        if dist < best_dist {
            best_dist = dist;
            best_k = k;
        }
    }
    (best_k, best_dist)
}

/// k-means++ seeding: each new centroid is drawn with probability
/// proportional to its squared distance from the nearest chosen one
fn kmeans_plus_plus(points: &[Vec<f64>], k: usize, rng: &mut StdRng) -> Vec<Vec<f64>> {
    let mut centroids = vec![points[rng.random_range(0..points.len())].clone()];

    while centroids.len() < k {
        let weights: Vec<f64> = points.iter().map(|p| nearest(p, &centroids).1).collect();
        let total: f64 = weights.iter().sum();

        let idx = if total > 0.0 {
            let mut target = rng.random::<f64>() * total;
            let mut chosen = points.len() - 1;
            for (i, w) in weights.iter().enumerate() {
                if target < *w {
                    chosen = i;
                    break;
                }
                target -= w;
            }
            chosen
        } else {
            rng.random_range(0..points.len())
        };
        centroids.push(points[idx].clone());
    }

    centroids
}

fn lloyd(points: &[Vec<f64>], mut centroids: Vec<Vec<f64>>, params: &KmeansParams) -> Run {
    let k = centroids.len();
    let dims = centroids[0].len();
    let mut labels = vec![0usize; points.len()];
    let mut iterations = 0;

    for _ in 0..params.max_iterations {
        iterations += 1;

        // Assignment step
        labels = (0..points.len())
            .into_par_iter()
            .map(|i| nearest(&points[i], &centroids).0)
            .collect();

        // Update step
        let mut sums = vec![vec![0.0; dims]; k];
        let mut counts = vec![0usize; k];
        for (p, &label) in points.iter().zip(&labels) {
            for (s, v) in sums[label].iter_mut().zip(p) {
                *s += v;
            }
            counts[label] += 1;
        }

        let mut max_shift = 0.0_f64;
        for c in 0..k {
            if counts[c] == 0 {
                continue;
            }
            let updated: Vec<f64> = sums[c].iter().map(|s| s / counts[c] as f64).collect();
            max_shift = max_shift.max(sq_dist(&updated, &centroids[c]).sqrt());
            centroids[c] = updated;
        }

        if max_shift < params.convergence {
            break;
        }
    }

    let inertia = points
        .iter()
        .zip(&labels)
        .map(|(p, &l)| sq_dist(p, &centroids[l]))
        .sum();

    Run {
        labels,
        inertia,
        iterations,
    }
}

/// Reorder labels by ascending first-feature centroid and compute centroids
/// in original units
fn relabel(features: &[Vec<f64>], run: Run, k: usize, dims: usize) -> KmeansResult {
    let mut sums = vec![vec![0.0; dims]; k];
    let mut counts = vec![0usize; k];
    for (f, &label) in features.iter().zip(&run.labels) {
        for (s, v) in sums[label].iter_mut().zip(f) {
            *s += v;
        }
        counts[label] += 1;
    }
    let centroids: Vec<Vec<f64>> = sums
        .into_iter()
        .zip(&counts)
        .map(|(s, &n)| s.into_iter().map(|v| v / n.max(1) as f64).collect())
        .collect();

    let mut order: Vec<usize> = (0..k).collect();
    order.sort_by(|&a, &b| centroids[a][0].total_cmp(&centroids[b][0]));
    let mut rank = vec![0usize; k];
    for (new, &old) in order.iter().enumerate() {
        rank[old] = new;
    }

    KmeansResult {
        labels: run.labels.iter().map(|&l| rank[l]).collect(),
        centroids: order.iter().map(|&old| centroids[old].clone()).collect(),
        inertia: run.inertia,
        iterations: run.iterations,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn column(values: &[f64]) -> Vec<Vec<f64>> {
        values.iter().map(|&v| vec![v, 1.0]).collect()
    }

    #[test]
    fn test_two_sign_groups() {
        let features = column(&[-5.0, -5.1, 5.0, 5.2]);
        let result = kmeans(&features, &KmeansParams { k: 2, ..Default::default() }).unwrap();

        assert_eq!(result.labels, vec![0, 0, 1, 1]);
        assert_relative_eq!(result.centroids[0][0], -5.05, epsilon = 0.01);
        assert_relative_eq!(result.centroids[1][0], 5.1, epsilon = 0.01);
        // Constant outcome column stays at its value
        assert_relative_eq!(result.centroids[1][1], 1.0);
    }

    #[test]
    fn test_deterministic_for_seed() {
        let values: Vec<f64> = (0..60).map(|i| ((i * 37) % 23) as f64 * 0.7 - 4.0).collect();
        let features = column(&values);
        let params = KmeansParams { k: 3, seed: Some(11), ..Default::default() };

        let a = kmeans(&features, &params).unwrap();
        let b = kmeans(&features, &params).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_labels_ordered_by_centroid() {
        let features = column(&[10.0, 10.2, -3.0, -3.1, 2.0, 2.1]);
        let result = kmeans(&features, &KmeansParams { k: 3, ..Default::default() }).unwrap();

        assert_eq!(result.labels, vec![2, 2, 0, 0, 1, 1]);
        assert!(result.centroids.windows(2).all(|w| w[0][0] < w[1][0]));
    }

    #[test]
    fn test_k_too_large() {
        let features = column(&[1.0, 2.0, 3.0]);
        let result = kmeans(&features, &KmeansParams { k: 5, ..Default::default() });
        assert!(matches!(
            result,
            Err(Error::InsufficientObservations { requested: 5, available: 3 })
        ));
    }

    #[test]
    fn test_k_zero_and_ragged_rows() {
        let features = column(&[1.0, 2.0]);
        assert!(kmeans(&features, &KmeansParams { k: 0, ..Default::default() }).is_err());

        let ragged = vec![vec![1.0, 1.0], vec![2.0]];
        assert!(kmeans(&ragged, &KmeansParams { k: 1, ..Default::default() }).is_err());
    }

    #[test]
    fn test_single_cluster_of_identical_points() {
        let features = column(&[4.0, 4.0, 4.0]);
        let result = kmeans(&features, &KmeansParams { k: 1, ..Default::default() }).unwrap();
        assert_eq!(result.labels, vec![0, 0, 0]);
        assert_relative_eq!(result.centroids[0][0], 4.0);
        assert_relative_eq!(result.inertia, 0.0);
    }

    #[test]
    fn test_fewer_distinct_values_than_clusters() {
        let features = column(&[2.0, 2.0, 2.0, 2.0, 2.0]);
        let result = kmeans(&features, &KmeansParams::default());
        assert!(matches!(
            result,
            Err(Error::InsufficientObservations { requested: 3, available: 1 })
        ));

        let features = column(&[2.0, 2.0, 3.0, 3.0, 4.0]);
        let result = kmeans(&features, &KmeansParams::default()).unwrap();
        assert_eq!(result.labels, vec![0, 0, 1, 1, 2]);
        assert!(result.centroids.iter().flatten().all(|v| v.is_finite()));
    }

    #[test]
    fn test_missing_seed_rejected() {
        let params = KmeansParams { seed: None, ..Default::default() };
        assert!(matches!(
            kmeans(&column(&[1.0, 2.0, 3.0]), &params),
            Err(Error::InvalidParameter { name: "clustering.seed", .. })
        ));
    }
}
