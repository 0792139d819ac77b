use std::fmt;

use serde::{Deserialize, Serialize};

/// The declared type of a [`MetricFamily`].
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MetricKind {
    Counter,
    Gauge,
    Summary,
    Untyped,
    Histogram,
}

impl MetricKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Counter => "COUNTER",
            Self::Gauge => "GAUGE",
            Self::Summary => "SUMMARY",
            Self::Untyped => "UNTYPED",
            Self::Histogram => "HISTOGRAM",
        }
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StatisticKind {
    Histogram,
    Summary,
}

/// The type-specific value carried by one [`Metric`].
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricValue {
    Counter { value: f64 },
    Gauge { value: f64 },
    Untyped { value: f64 },
    /// Raw observations of a histogram or summary.
    Distribution {
        samples: Vec<f64>,
        statistic: StatisticKind,
    },
}

impl MetricValue {
    pub const fn kind(&self) -> MetricKind {
        match self {
            Self::Counter { .. } => MetricKind::Counter,
            Self::Gauge { .. } => MetricKind::Gauge,
            Self::Untyped { .. } => MetricKind::Untyped,
            Self::Distribution {
                statistic: StatisticKind::Histogram,
                ..
            } => MetricKind::Histogram,
            Self::Distribution {
                statistic: StatisticKind::Summary,
                ..
            } => MetricKind::Summary,
        }
    }
}

#[derive(Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct LabelPair {
    pub name: String,
    pub value: String,
}

impl LabelPair {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// One observation within a [`MetricFamily`].
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Metric {
    /// Label pairs in source order. Names are not re-validated for uniqueness.
    pub labels: Vec<LabelPair>,
    pub value: MetricValue,
    /// Milliseconds since the Unix epoch; `0` means the source gave none.
    #[serde(default)]
    pub timestamp_ms: i64,
}

impl Metric {
    pub const fn new(value: MetricValue) -> Self {
        Self {
            labels: Vec::new(),
            value,
            timestamp_ms: 0,
        }
    }

    pub fn gauge(value: f64) -> Self {
        Self::new(MetricValue::Gauge { value })
    }

    pub fn counter(value: f64) -> Self {
        Self::new(MetricValue::Counter { value })
    }

    #[must_use]
    pub fn with_label(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.push(LabelPair::new(name, value));
        self
    }

    #[must_use]
    pub fn with_labels(mut self, labels: impl IntoIterator<Item = (String, String)>) -> Self {
        self.labels
            .extend(labels.into_iter().map(|(name, value)| LabelPair { name, value }));
        self
    }

    #[must_use]
    pub const fn with_timestamp_ms(mut self, timestamp_ms: i64) -> Self {
        self.timestamp_ms = timestamp_ms;
        self
    }

    pub const fn has_timestamp(&self) -> bool {
        self.timestamp_ms != 0
    }
}

/// A named group of same-typed metrics, as exported by a metrics registry.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct MetricFamily {
    pub name: String,
    #[serde(default)]
    pub help: Option<String>,
    pub kind: MetricKind,
    #[serde(default)]
    pub metrics: Vec<Metric>,
}

impl MetricFamily {
    pub fn new(name: impl Into<String>, kind: MetricKind) -> Self {
        Self {
            name: name.into(),
            help: None,
            kind,
            metrics: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    #[must_use]
    pub fn with_metric(mut self, metric: Metric) -> Self {
        self.metrics.push(metric);
        self
    }

    #[must_use]
    pub fn with_metrics(mut self, metrics: impl IntoIterator<Item = Metric>) -> Self {
        self.metrics.extend(metrics);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_kind_matches_family_kind() {
        assert_eq!(MetricValue::Gauge { value: 1.0 }.kind(), MetricKind::Gauge);
        assert_eq!(MetricValue::Counter { value: 1.0 }.kind(), MetricKind::Counter);
        assert_eq!(
            MetricValue::Distribution {
                samples: vec![1.0],
                statistic: StatisticKind::Summary
            }
            .kind(),
            MetricKind::Summary
        );
    }

    #[test]
    fn builder_keeps_label_order() {
        let metric = Metric::gauge(1.0)
            .with_label("zone", "b")
            .with_label("account", "a");
        let names: Vec<_> = metric.labels.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, vec!["zone", "account"]);
        assert!(!metric.has_timestamp());
        assert!(metric.with_timestamp_ms(5).has_timestamp());
    }

    #[test]
    fn kind_displays_uppercase() {
        assert_eq!(MetricKind::Histogram.to_string(), "HISTOGRAM");
    }
}
