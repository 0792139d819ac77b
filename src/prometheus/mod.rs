//! Prometheus remote write wire types.

pub mod proto;

/// The label every remote write series must carry first, holding the metric name.
pub const METRIC_NAME_LABEL: &str = "__name__";
