//! Clustering of positive sample points by their LST anomaly

use super::kmeans::{kmeans, KmeansParams};
use crate::sampling::Observation;
use crate::statistics::{grouped_statistics, SummaryStats};
use lstanom_core::{Error, Result};
use std::collections::BTreeMap;
use tracing::info;

/// A positive observation with its cluster label
#[derive(Debug, Clone, PartialEq)]
pub struct ClusteredPoint {
    pub observation: Observation,
    /// Anomaly value of the observation
    pub anomaly: f64,
    /// Outcome value of the observation
    pub outcome: f64,
    pub cluster: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClusterResult {
    pub points: Vec<ClusteredPoint>,
    /// Cluster centroids as (anomaly, outcome), indexed by label
    pub centroids: Vec<Vec<f64>>,
    /// Anomaly statistics per cluster label
    pub cluster_stats: BTreeMap<usize, SummaryStats>,
}

/// Observations whose outcome equals 1 and whose anomaly is defined
pub fn positive_observations<'a>(
    observations: &'a [Observation],
    outcome_column: &'a str,
) -> impl Iterator<Item = (&'a Observation, f64)> + 'a {
    observations.iter().filter_map(move |o| {
        let value = o.value?;
        (o.attribute(outcome_column) == Some(1.0)).then_some((o, value))
    })
}

/// Cluster the positive observations on (anomaly, outcome).
///
/// Fails with [`Error::InsufficientObservations`] when there are fewer
/// positive observations, or fewer distinct anomaly values among them, than
/// clusters.
pub fn cluster_positives(
    observations: &[Observation],
    outcome_column: &str,
    params: &KmeansParams,
) -> Result<ClusterResult> {
    let positives: Vec<(&Observation, f64)> =
        positive_observations(observations, outcome_column).collect();
    if positives.len() < params.k {
        return Err(Error::InsufficientObservations {
            requested: params.k,
            available: positives.len(),
        });
    }

    let features: Vec<Vec<f64>> = positives.iter().map(|&(_, a)| vec![a, 1.0]).collect();
    let result = kmeans(&features, params)?;

    let points: Vec<ClusteredPoint> = positives
        .into_iter()
        .zip(&result.labels)
        .map(|((o, anomaly), &cluster)| ClusteredPoint {
            observation: o.clone(),
            anomaly,
            outcome: 1.0,
            cluster,
        })
        .collect();

    let cluster_stats = grouped_statistics(points.iter().map(|p| (p.cluster, p.anomaly)));
    info!(
        points = points.len(),
        clusters = params.k,
        iterations = result.iterations,
        "positive samples clustered"
    );

    Ok(ClusterResult {
        points,
        centroids: result.centroids,
        cluster_stats,
    })
}
