//! The metric snapshot model handed over by a metrics registry.

pub mod metric;

pub use metric::{LabelPair, Metric, MetricFamily, MetricKind, MetricValue, StatisticKind};
