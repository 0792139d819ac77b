//! Conversion of metric family snapshots into remote write time series.

use snafu::Snafu;

use crate::{
    event::{Metric, MetricFamily, MetricKind, MetricValue},
    internal_events::{
        BackfillOrigin, PrometheusConversionError, PrometheusFamilyProcessed,
        PrometheusTimestampBackfilled,
    },
    prometheus::{
        proto::{Label, Sample, TimeSeries},
        METRIC_NAME_LABEL,
    },
};

#[derive(Debug, Snafu, PartialEq)]
pub enum ConvertError {
    #[snafu(display("Unsupported metric type {kind} for metric family {name:?}"))]
    UnsupportedMetricType { name: String, kind: MetricKind },

    #[snafu(display(
        "Metric family {name:?} is declared as {expected} but holds a {found} value"
    ))]
    MismatchedValue {
        name: String,
        expected: MetricKind,
        found: MetricKind,
    },
}

/// Converts a snapshot into one [`TimeSeries`] per metric, in traversal order.
///
/// Samples without a timestamp are back-filled from the last timestamped sample
/// seen earlier in this call, or with the wall clock reading taken once on entry
/// when no such sample exists yet. Fails as a whole on the first family whose
/// type isn't `COUNTER` or `GAUGE`.
pub fn convert(families: &[MetricFamily]) -> Result<Vec<TimeSeries>, ConvertError> {
    convert_at(families, chrono::Utc::now().timestamp_millis())
}

/// Like [`convert`], with the generated timestamp supplied by the caller.
pub fn convert_at(
    families: &[MetricFamily],
    generated_timestamp: i64,
) -> Result<Vec<TimeSeries>, ConvertError> {
    let mut backfill = TimestampBackfill::new(generated_timestamp);
    let capacity = families.iter().map(|family| family.metrics.len()).sum();
    let mut time_series = Vec::with_capacity(capacity);

    for family in families {
        if let Err(error) = encode_family(family, &mut backfill, &mut time_series) {
            emit!(PrometheusConversionError { error: &error });
            return Err(error);
        }
    }

    Ok(time_series)
}

fn encode_family(
    family: &MetricFamily,
    backfill: &mut TimestampBackfill,
    output: &mut Vec<TimeSeries>,
) -> Result<(), ConvertError> {
    emit!(PrometheusFamilyProcessed {
        name: &family.name,
        kind: family.kind,
        count: family.metrics.len(),
    });

    // Checked per family rather than per metric, so an empty HISTOGRAM or
    // SUMMARY family is rejected too.
    if !matches!(family.kind, MetricKind::Counter | MetricKind::Gauge) {
        return UnsupportedMetricTypeSnafu {
            name: family.name.clone(),
            kind: family.kind,
        }
        .fail();
    }

    for metric in &family.metrics {
        let value = sample_value(family, metric)?;
        let timestamp = backfill.resolve(metric.timestamp_ms);
        output.push(TimeSeries {
            labels: series_labels(&family.name, metric),
            samples: vec![Sample { value, timestamp }],
        });
    }

    Ok(())
}

fn sample_value(family: &MetricFamily, metric: &Metric) -> Result<f64, ConvertError> {
    match (family.kind, &metric.value) {
        (MetricKind::Gauge, MetricValue::Gauge { value })
        | (MetricKind::Counter, MetricValue::Counter { value }) => Ok(*value),
        (expected, found) => MismatchedValueSnafu {
            name: family.name.clone(),
            expected,
            found: found.kind(),
        }
        .fail(),
    }
}

fn series_labels(name: &str, metric: &Metric) -> Vec<Label> {
    std::iter::once(Label::new(METRIC_NAME_LABEL, name))
        .chain(
            metric
                .labels
                .iter()
                .map(|label| Label::new(label.name.as_str(), label.value.as_str())),
        )
        .collect()
}

/// Timestamp back-fill state for a single conversion call.
#[derive(Debug)]
struct TimestampBackfill {
    generated: i64,
    last_seen: Option<i64>,
}

impl TimestampBackfill {
    const fn new(generated: i64) -> Self {
        Self {
            generated,
            last_seen: None,
        }
    }

    fn resolve(&mut self, timestamp: i64) -> i64 {
        if timestamp != 0 {
            self.last_seen = Some(timestamp);
            return timestamp;
        }

        let (timestamp, origin) = match self.last_seen {
            Some(previous) => (previous, BackfillOrigin::Previous),
            None => (self.generated, BackfillOrigin::Generated),
        };
        emit!(PrometheusTimestampBackfilled { timestamp, origin });
        timestamp
    }
}

#[cfg(test)]
mod tests {
    use similar_asserts::assert_eq;

    use super::*;
    use crate::event::{LabelPair, StatisticKind};

    fn timestamps(series: &[TimeSeries]) -> Vec<i64> {
        series.iter().map(|ts| ts.samples[0].timestamp).collect()
    }

    #[test]
    fn empty_input_converts_to_nothing() {
        assert_eq!(convert(&[]), Ok(vec![]));
    }

    #[test]
    fn name_label_comes_first_then_source_labels_in_order() {
        let families = vec![MetricFamily::new("aws_ec2_cpuutilization_average", MetricKind::Gauge)
            .with_metric(
                Metric::gauge(1.0)
                    .with_label("name", "i-123")
                    .with_label("dimension_InstanceId", "i-123")
                    .with_label("account_id", "0000")
                    .with_label("name", "dup"),
            )];

        let series = convert_at(&families, 10).unwrap();

        assert_eq!(series.len(), 1);
        assert_eq!(
            series[0].labels,
            vec![
                Label::new("__name__", "aws_ec2_cpuutilization_average"),
                Label::new("name", "i-123"),
                Label::new("dimension_InstanceId", "i-123"),
                Label::new("account_id", "0000"),
                Label::new("name", "dup"),
            ]
        );
        assert_eq!(series[0].samples.len(), 1);
    }

    #[test]
    fn one_series_per_metric_in_traversal_order() {
        let families = vec![
            MetricFamily::new("b_total", MetricKind::Counter).with_metrics([
                Metric::counter(1.0).with_label("i", "0"),
                Metric::counter(2.0).with_label("i", "1"),
            ]),
            MetricFamily::new("a", MetricKind::Gauge).with_metric(Metric::gauge(3.0)),
        ];

        let series = convert_at(&families, 10).unwrap();

        let names: Vec<_> = series
            .iter()
            .map(|ts| (ts.labels[0].value.as_str(), ts.samples[0].value))
            .collect();
        assert_eq!(names, vec![("b_total", 1.0), ("b_total", 2.0), ("a", 3.0)]);
    }

    #[test]
    fn gauge_and_counter_values_are_exact() {
        let families = vec![
            MetricFamily::new("g", MetricKind::Gauge).with_metric(Metric::gauge(3.5)),
            MetricFamily::new("c", MetricKind::Counter).with_metric(Metric::counter(42.0)),
        ];

        let series = convert_at(&families, 10).unwrap();

        assert_eq!(series[0].samples[0].value, 3.5);
        assert_eq!(series[1].samples[0].value, 42.0);
    }

    #[test]
    fn missing_timestamp_inherits_previous_not_next() {
        let families = vec![MetricFamily::new("m", MetricKind::Gauge).with_metrics([
            Metric::gauge(1.0).with_timestamp_ms(1000),
            Metric::gauge(2.0),
            Metric::gauge(3.0).with_timestamp_ms(2000),
        ])];

        let series = convert_at(&families, 99_999).unwrap();

        assert_eq!(timestamps(&series), vec![1000, 1000, 2000]);
    }

    #[test]
    fn backfill_tracks_most_recent_timestamp_across_families() {
        let families = vec![
            MetricFamily::new("a", MetricKind::Gauge).with_metrics([
                Metric::gauge(1.0),
                Metric::gauge(1.0).with_timestamp_ms(1000),
            ]),
            MetricFamily::new("b", MetricKind::Counter).with_metrics([
                Metric::counter(1.0).with_timestamp_ms(2000),
                Metric::counter(1.0),
            ]),
            MetricFamily::new("c", MetricKind::Gauge).with_metric(Metric::gauge(1.0)),
        ];

        let series = convert_at(&families, 500).unwrap();

        assert_eq!(timestamps(&series), vec![500, 1000, 2000, 2000, 2000]);
    }

    #[test]
    fn generated_timestamp_is_recent_wall_clock() {
        let before = chrono::Utc::now().timestamp_millis();
        let families =
            vec![MetricFamily::new("helper", MetricKind::Gauge).with_metric(Metric::gauge(1.0))];

        let series = convert(&families).unwrap();
        let after = chrono::Utc::now().timestamp_millis();

        let timestamp = series[0].samples[0].timestamp;
        assert_ne!(timestamp, 0);
        assert!(timestamp >= before && timestamp <= after);
        assert!(after - timestamp < 5_000);
    }

    #[test]
    fn backfill_state_does_not_leak_between_calls() {
        let first = vec![
            MetricFamily::new("a", MetricKind::Gauge)
                .with_metric(Metric::gauge(1.0).with_timestamp_ms(1000)),
        ];
        let second =
            vec![MetricFamily::new("a", MetricKind::Gauge).with_metric(Metric::gauge(1.0))];

        convert_at(&first, 1).unwrap();
        let series = convert_at(&second, 7).unwrap();

        assert_eq!(timestamps(&series), vec![7]);
    }

    #[test]
    fn unsupported_type_fails_whole_call() {
        let families = vec![
            MetricFamily::new("ok", MetricKind::Gauge).with_metric(Metric::gauge(1.0)),
            MetricFamily::new("latency", MetricKind::Histogram).with_metric(Metric::new(
                MetricValue::Distribution {
                    samples: vec![0.1, 0.2],
                    statistic: StatisticKind::Histogram,
                },
            )),
        ];

        let error = convert_at(&families, 1).unwrap_err();

        assert_eq!(
            error,
            ConvertError::UnsupportedMetricType {
                name: "latency".into(),
                kind: MetricKind::Histogram,
            }
        );
        assert!(error.to_string().contains("HISTOGRAM"));
    }

    #[test]
    fn unsupported_type_fails_even_without_metrics() {
        let families = vec![MetricFamily::new("up", MetricKind::Untyped)];

        assert!(matches!(
            convert_at(&families, 1),
            Err(ConvertError::UnsupportedMetricType { .. })
        ));
    }

    #[test]
    fn untyped_values_are_unsupported() {
        let families = vec![MetricFamily::new("temperature", MetricKind::Untyped)
            .with_metric(Metric::new(MetricValue::Untyped { value: 21.5 }))];

        assert_eq!(
            convert_at(&families, 1),
            Err(ConvertError::UnsupportedMetricType {
                name: "temperature".into(),
                kind: MetricKind::Untyped,
            })
        );
    }

    #[test]
    fn value_must_match_family_kind() {
        let families =
            vec![MetricFamily::new("c", MetricKind::Counter).with_metric(Metric::gauge(1.0))];

        assert_eq!(
            convert_at(&families, 1),
            Err(ConvertError::MismatchedValue {
                name: "c".into(),
                expected: MetricKind::Counter,
                found: MetricKind::Gauge,
            })
        );
    }

    #[test]
    fn input_is_left_untouched() {
        let families = vec![MetricFamily::new("m", MetricKind::Gauge).with_metric(Metric {
            labels: vec![LabelPair::new("a", "b")],
            value: MetricValue::Gauge { value: 1.0 },
            timestamp_ms: 0,
        })];
        let before = families.clone();

        convert_at(&families, 1).unwrap();

        assert_eq!(families, before);
    }
}
