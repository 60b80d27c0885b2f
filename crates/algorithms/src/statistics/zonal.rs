//! Zonal statistics over point observations
//!
//! Zones are either the set of supplied points as a whole or groups keyed
//! by an attribute such as a cluster label.

use super::SummaryStats;
use crate::sampling::{defined, Observation};
use lstanom_core::{Error, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use std::collections::HashMap;
use std::hash::Hash;

/// Statistics of the anomaly and of an outcome attribute over supplied points
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PointZonalStats {
    /// Points with a defined anomaly value
    pub points: usize,
    pub anomaly: SummaryStats,
    /// `None` when no point carries a numeric outcome
    pub outcome: Option<SummaryStats>,
}

/// Statistics of the sampled values and the `outcome_column` attribute over
/// the observations with a defined value.
pub fn point_zonal_statistics(
    observations: &[Observation],
    outcome_column: &str,
) -> Result<PointZonalStats> {
    let with_value: Vec<&Observation> = defined(observations).collect();
    if with_value.is_empty() {
        return Err(Error::InsufficientData(
            "no supplied point has a defined anomaly value".into(),
        ));
    }

    let anomaly = SummaryStats::describe(with_value.iter().filter_map(|o| o.value))?;
    let outcome = SummaryStats::describe(
        with_value
            .iter()
            .filter_map(|o| o.attribute(outcome_column)),
    )
    .ok();

    Ok(PointZonalStats {
        points: with_value.len(),
        anomaly,
        outcome,
    })
}

/// Group `(key, value)` pairs and describe each group.
///
/// Non-finite values are skipped; groups left without values are omitted.
pub fn grouped_statistics<K, I>(items: I) -> BTreeMap<K, SummaryStats>
where
    K: Ord + Hash + Clone,
    I: IntoIterator<Item = (K, f64)>,
{
    let mut zone_values: HashMap<K, Vec<f64>> = HashMap::new();
    for (zone, val) in items {
        if val.is_nan() {
            continue;
        }
        zone_values.entry(zone).or_default().push(val);
    }

    zone_values
        .into_iter()
        .filter_map(|(zone, vals)| SummaryStats::describe(vals).ok().map(|s| (zone, s)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use lstanom_core::{AttributeValue, SamplePoint};

    fn obs(value: Option<f64>, positive: i64) -> Observation {
        Observation {
            point: SamplePoint::new("p", 0.0, 0.0)
                .with_property("Results Positive", AttributeValue::Int(positive)),
            value,
        }
    }

    #[test]
    fn test_point_zonal_statistics() {
        let observations = vec![obs(Some(1.0), 1), obs(Some(3.0), 0), obs(None, 1)];
        let stats = point_zonal_statistics(&observations, "Results Positive").unwrap();

        assert_eq!(stats.points, 2);
        assert_relative_eq!(stats.anomaly.mean, 2.0);
        assert_relative_eq!(stats.anomaly.std_dev, 1.0);
        let outcome = stats.outcome.unwrap();
        assert_relative_eq!(outcome.mean, 0.5);
        assert_eq!((outcome.min, outcome.max), (0.0, 1.0));

        assert!(point_zonal_statistics(&observations, "Species").unwrap().outcome.is_none());
        assert!(point_zonal_statistics(&[obs(None, 1)], "Results Positive").is_err());
    }

    #[test]
    fn test_grouped_statistics() {
        let groups = grouped_statistics(vec![(1, 2.0), (0, -1.0), (1, 4.0), (2, f64::NAN)]);
        assert_eq!(groups.len(), 2);
        assert_relative_eq!(groups[&1].mean, 3.0);
        assert_eq!(groups[&0].count, 1);
        assert!(!groups.contains_key(&2));
    }
}
