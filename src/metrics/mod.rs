//! Sources of metric family snapshots.

use std::collections::{btree_map::Entry, BTreeMap};

use async_trait::async_trait;
use metrics_util::debugging::{DebugValue, Snapshotter};
use snafu::Snafu;

use crate::event::{Metric, MetricFamily, MetricKind, MetricValue, StatisticKind};

/// Produces a point-in-time snapshot of metric families.
#[async_trait]
pub trait Gatherer: Send + Sync {
    async fn gather(&self) -> crate::Result<Vec<MetricFamily>>;
}

#[derive(Debug, Snafu, PartialEq, Eq)]
pub enum GatherError {
    #[snafu(display("Metric {name:?} is registered as both {first} and {second}"))]
    DuplicateRegistration {
        name: String,
        first: MetricKind,
        second: MetricKind,
    },
}

/// Gathers from an in-process `metrics` registry.
///
/// Counters become `COUNTER` families, gauges `GAUGE` families and histograms
/// `HISTOGRAM` families holding the raw observations. Families are ordered by
/// name, metrics within a family by labels. No timestamps are attached.
pub struct RegistryGatherer {
    snapshotter: Snapshotter,
}

impl RegistryGatherer {
    pub const fn new(snapshotter: Snapshotter) -> Self {
        Self { snapshotter }
    }

    pub fn snapshot(&self) -> Result<Vec<MetricFamily>, GatherError> {
        let mut families = BTreeMap::<String, MetricFamily>::new();

        for (key, _unit, description, value) in self.snapshotter.snapshot().into_vec() {
            let key = key.key();
            let (kind, value) = match value {
                DebugValue::Counter(value) => (
                    MetricKind::Counter,
                    MetricValue::Counter {
                        value: value as f64,
                    },
                ),
                DebugValue::Gauge(value) => (
                    MetricKind::Gauge,
                    MetricValue::Gauge {
                        value: value.into_inner(),
                    },
                ),
                DebugValue::Histogram(values) => (
                    MetricKind::Histogram,
                    MetricValue::Distribution {
                        samples: values.into_iter().map(|value| value.into_inner()).collect(),
                        statistic: StatisticKind::Histogram,
                    },
                ),
            };

            let family = match families.entry(key.name().to_owned()) {
                Entry::Vacant(entry) => entry.insert(MetricFamily::new(key.name(), kind)),
                Entry::Occupied(entry) if entry.get().kind != kind => {
                    return DuplicateRegistrationSnafu {
                        name: key.name(),
                        first: entry.get().kind,
                        second: kind,
                    }
                    .fail();
                }
                Entry::Occupied(entry) => entry.into_mut(),
            };

            if family.help.is_none() {
                family.help = description.map(|help| help.to_string());
            }

            family.metrics.push(Metric::new(value).with_labels(
                key.labels()
                    .map(|label| (label.key().to_owned(), label.value().to_owned())),
            ));
        }

        Ok(families
            .into_values()
            .map(|mut family| {
                family.metrics.sort_by(|a, b| a.labels.cmp(&b.labels));
                family
            })
            .collect())
    }
}

#[async_trait]
impl Gatherer for RegistryGatherer {
    async fn gather(&self) -> crate::Result<Vec<MetricFamily>> {
        Ok(self.snapshot()?)
    }
}
