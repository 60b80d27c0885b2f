//! Sensor eligibility per date range

use chrono::NaiveDate;
use lstanom_core::scene::{DateRange, Sensor};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Operational window of one sensor.
///
/// A range is eligible when it starts on or after `starts_on_or_after` and
/// ends strictly before `ends_before` (either bound may be absent).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorRule {
    pub sensor: Sensor,
    #[serde(default)]
    pub starts_on_or_after: Option<NaiveDate>,
    #[serde(default)]
    pub ends_before: Option<NaiveDate>,
}

impl SensorRule {
    pub fn always(sensor: Sensor) -> Self {
        Self {
            sensor,
            starts_on_or_after: None,
            ends_before: None,
        }
    }

    pub fn allows(&self, range: &DateRange) -> bool {
        self.starts_on_or_after.is_none_or(|d| range.start >= d)
            && self.ends_before.is_none_or(|d| range.end < d)
    }
}

/// Table deciding which sensors are queried for a date range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SensorPolicy {
    rules: Vec<SensorRule>,
}

impl SensorPolicy {
    pub fn new(rules: Vec<SensorRule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[SensorRule] {
        &self.rules
    }

    /// Sensors eligible for `range`, each once, in mission order
    pub fn eligible(&self, range: &DateRange) -> Vec<Sensor> {
        self.rules
            .iter()
            .filter(|rule| rule.allows(range))
            .map(|rule| rule.sensor)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

impl Default for SensorPolicy {
    /// Landsat 5 until the end of 2012, Landsat 7 throughout, Landsat 8 from
    /// 2013 and Landsat 9 from 2021.
    fn default() -> Self {
        let jan_first = |year| NaiveDate::from_ymd_opt(year, 1, 1);
        Self::new(vec![
            SensorRule {
                sensor: Sensor::L5,
                starts_on_or_after: None,
                ends_before: jan_first(2013),
            },
            SensorRule::always(Sensor::L7),
            SensorRule {
                sensor: Sensor::L8,
                starts_on_or_after: jan_first(2013),
                ends_before: None,
            },
            SensorRule {
                sensor: Sensor::L9,
                starts_on_or_after: jan_first(2021),
                ends_before: None,
            },
        ])
    }
}

/// A date range to query, optionally restricted to an explicit sensor list
/// instead of the policy table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RangeSpec {
    pub start: NaiveDate,
    pub end: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sensors: Option<Vec<Sensor>>,
}

impl RangeSpec {
    pub fn new(range: DateRange) -> Self {
        Self {
            start: range.start,
            end: range.end,
            sensors: None,
        }
    }

    pub fn with_sensors(mut self, sensors: Vec<Sensor>) -> Self {
        self.sensors = Some(sensors);
        self
    }

    /// The validated date range
    pub fn range(&self) -> lstanom_core::Result<DateRange> {
        DateRange::new(self.start, self.end)
    }

    /// Sensors to query: the explicit list, or the policy's choice. Each
    /// sensor appears once.
    pub fn sensors(&self, policy: &SensorPolicy, range: &DateRange) -> Vec<Sensor> {
        match &self.sensors {
            Some(explicit) => explicit
                .iter()
                .copied()
                .collect::<BTreeSet<_>>()
                .into_iter()
                .collect(),
            None => policy.eligible(range),
        }
    }
}
