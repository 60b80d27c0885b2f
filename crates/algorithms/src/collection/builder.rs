//! Merged image time series across date ranges and sensors

use super::catalog::SceneCatalog;
use super::policy::{RangeSpec, SensorPolicy};
use lstanom_core::scene::{ensure_disjoint, DateRange, MonthWindow, SceneMetadata, Sensor};
use lstanom_core::{Error, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// What to collect.
#[derive(Debug, Clone)]
pub struct CollectionRequest {
    /// Disjoint date ranges, each with optional explicit sensors
    pub ranges: Vec<RangeSpec>,
    /// Calendar months kept within every range
    pub months: MonthWindow,
    /// Scenes must have cloud cover strictly below this percentage
    pub max_cloud_cover: f64,
    /// Maximum number of scenes kept after merging
    pub max_scenes: usize,
    /// Search extent (min_x, min_y, max_x, max_y)
    pub extent: (f64, f64, f64, f64),
}

/// Record of a cap applied to an oversized collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Truncation {
    pub available: usize,
    pub kept: usize,
}

/// A catalog query that returned an error
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FailedQuery {
    pub sensor: Sensor,
    pub range: String,
    pub reason: String,
}

/// A successful catalog query with no scene passing the filters
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmptyQuery {
    pub sensor: Sensor,
    pub range: String,
}

/// Bookkeeping of one collection build
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CollectionReport {
    /// Number of (range, sensor) queries issued
    pub queries: usize,
    /// Scenes passing the month and cloud filters, before de-duplication
    pub matched: usize,
    /// Scenes returned by more than one query
    pub duplicates: usize,
    pub failed_queries: Vec<FailedQuery>,
    pub empty_queries: Vec<EmptyQuery>,
}

/// Ordered scene metadata of one image time series.
///
/// Scenes are sorted by acquisition date, then scene id.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SceneCollection {
    pub scenes: Vec<SceneMetadata>,
    pub truncation: Option<Truncation>,
    pub report: CollectionReport,
}

impl SceneCollection {
    pub fn len(&self) -> usize {
        self.scenes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SceneMetadata> {
        self.scenes.iter()
    }
}

/// Builds a [`SceneCollection`] from a catalog.
#[derive(Debug, Clone, Default)]
pub struct CollectionBuilder {
    policy: SensorPolicy,
}

impl CollectionBuilder {
    pub fn new(policy: SensorPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &SensorPolicy {
        &self.policy
    }

    /// Check a request without querying anything
    pub fn validate(&self, request: &CollectionRequest) -> Result<Vec<DateRange>> {
        let ranges = request
            .ranges
            .iter()
            .map(RangeSpec::range)
            .collect::<Result<Vec<_>>>()?;
        if ranges.is_empty() {
            return Err(Error::InvalidParameter {
                name: "ranges",
                value: "[]".into(),
                reason: "at least one date range is required".into(),
            });
        }
        ensure_disjoint(&ranges)?;
        request.months.validate()?;
        if !(request.max_cloud_cover > 0.0 && request.max_cloud_cover <= 100.0) {
            return Err(Error::InvalidParameter {
                name: "max_cloud_cover",
                value: request.max_cloud_cover.to_string(),
                reason: "must be in (0, 100]".into(),
            });
        }
        if request.max_scenes == 0 {
            return Err(Error::InvalidParameter {
                name: "max_scenes",
                value: "0".into(),
                reason: "must be at least 1".into(),
            });
        }
        Ok(ranges)
    }

    /// Query every (range, sensor) pair, merge, filter, order and cap.
    ///
    /// A failing query is logged as a warning and an empty one at info level.
    /// Both are recorded in the report and the remaining queries proceed.
    pub fn build<C: SceneCatalog + ?Sized>(
        &self,
        catalog: &C,
        request: &CollectionRequest,
    ) -> Result<SceneCollection> {
        let ranges = self.validate(request)?;
        let mut report = CollectionReport::default();
        let mut merged: BTreeMap<String, SceneMetadata> = BTreeMap::new();

        for (spec, range) in request.ranges.iter().zip(&ranges) {
            for sensor in spec.sensors(&self.policy, range) {
                report.queries += 1;
                let found = match catalog.search(sensor, range, request.extent) {
                    Ok(found) => found,
                    Err(e) => {
                        warn!(%sensor, %range, error = %e, "scene query failed, skipping");
                        report.failed_queries.push(FailedQuery {
                            sensor,
                            range: range.to_string(),
                            reason: e.to_string(),
                        });
                        continue;
                    }
                };

                let matching: Vec<SceneMetadata> = found
                    .into_iter()
                    .filter(|m| {
                        m.sensor == sensor
                            && range.contains(m.acquired)
                            && request.months.contains(m.acquired)
                            && m.cloud_cover < request.max_cloud_cover
                    })
                    .collect();

                if matching.is_empty() {
                    info!(%sensor, %range, "no matching scenes");
                    report.empty_queries.push(EmptyQuery {
                        sensor,
                        range: range.to_string(),
                    });
                    continue;
                }

                debug!(%sensor, %range, scenes = matching.len(), "query matched");
                report.matched += matching.len();
                for meta in matching {
                    if merged.insert(meta.id.clone(), meta).is_some() {
                        report.duplicates += 1;
                    }
                }
            }
        }

        let mut scenes: Vec<SceneMetadata> = merged.into_values().collect();
        scenes.sort_by(|a, b| a.acquired.cmp(&b.acquired).then_with(|| a.id.cmp(&b.id)));

        let truncation = (scenes.len() > request.max_scenes).then(|| {
            let t = Truncation {
                available: scenes.len(),
                kept: request.max_scenes,
            };
            warn!(
                available = t.available,
                kept = t.kept,
                "collection exceeds scene cap, truncating"
            );
            scenes.truncate(request.max_scenes);
            t
        });

        info!(
            scenes = scenes.len(),
            queries = report.queries,
            failed = report.failed_queries.len(),
            empty = report.empty_queries.len(),
            "collection built"
        );

        Ok(SceneCollection {
            scenes,
            truncation,
            report,
        })
    }
}
