use metrics::counter;

use super::{error_stage, error_type, InternalEvent};
use crate::event::MetricKind;

#[derive(Debug)]
pub struct PrometheusFamilyProcessed<'a> {
    pub name: &'a str,
    pub kind: MetricKind,
    pub count: usize,
}

impl InternalEvent for PrometheusFamilyProcessed<'_> {
    fn emit(self) {
        debug!(
            message = "Processing metric family.",
            metric_name = %self.name,
            metric_type = %self.kind,
            count = %self.count,
        );
    }
}

/// Where a back-filled sample timestamp came from.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BackfillOrigin {
    /// The last non-zero timestamp seen earlier in the same conversion.
    Previous,
    /// The wall clock reading taken at the start of the conversion.
    Generated,
}

impl BackfillOrigin {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Previous => "previous",
            Self::Generated => "generated",
        }
    }
}

#[derive(Debug)]
pub struct PrometheusTimestampBackfilled {
    pub timestamp: i64,
    pub origin: BackfillOrigin,
}

impl InternalEvent for PrometheusTimestampBackfilled {
    fn emit(self) {
        trace!(
            message = "Back-filled missing sample timestamp.",
            timestamp = %self.timestamp,
            origin = self.origin.as_str(),
        );
        counter!(
            "prometheus_backfilled_timestamps_total",
            "origin" => self.origin.as_str(),
        )
        .increment(1);
    }
}

#[derive(Debug)]
pub struct PrometheusConversionError<'a> {
    pub error: &'a crate::convert::ConvertError,
}

impl InternalEvent for PrometheusConversionError<'_> {
    fn emit(self) {
        error!(
            message = "Failed to convert metric families.",
            error = %self.error,
            error_type = error_type::CONVERSION_FAILED,
            stage = error_stage::PROCESSING,
        );
        counter!(
            "component_errors_total",
            "error_type" => error_type::CONVERSION_FAILED,
            "stage" => error_stage::PROCESSING,
        )
        .increment(1);
    }
}

#[derive(Debug)]
pub struct PrometheusRemoteWriteRequestBuilt<'a> {
    pub endpoint: &'a http::Uri,
    pub count: usize,
    pub encoded_size: usize,
    pub compressed_size: usize,
}

impl InternalEvent for PrometheusRemoteWriteRequestBuilt<'_> {
    fn emit(self) {
        debug!(
            message = "Built remote write request.",
            endpoint = %self.endpoint,
            timeseries_count = %self.count,
            encoded_size = %self.encoded_size,
            body_size = %self.compressed_size,
        );
    }
}

#[derive(Debug)]
pub struct PrometheusRemoteWriteSent {
    pub count: usize,
    pub byte_size: usize,
}

impl InternalEvent for PrometheusRemoteWriteSent {
    fn emit(self) {
        debug!(
            message = "Remote write request delivered.",
            timeseries_count = %self.count,
            byte_size = %self.byte_size,
        );
        counter!("component_sent_events_total", "protocol" => "http").increment(self.count as u64);
        counter!("component_sent_bytes_total", "protocol" => "http")
            .increment(self.byte_size as u64);
    }
}

#[derive(Debug)]
pub struct PrometheusRemoteWriteError<'a> {
    pub error: &'a crate::sinks::prometheus::remote_write::PersistError,
    pub count: usize,
}

impl InternalEvent for PrometheusRemoteWriteError<'_> {
    fn emit(self) {
        use crate::sinks::prometheus::remote_write::PersistError;

        let kind = match self.error {
            PersistError::Compress { .. } | PersistError::BuildRequest { .. } => {
                error_type::ENCODER_FAILED
            }
            PersistError::CredentialResolutionFailed { .. }
            | PersistError::SigningFailed { .. } => error_type::CONFIGURATION_FAILED,
            PersistError::DeliveryFailed { .. } => error_type::REQUEST_FAILED,
        };
        error!(
            message = "Remote write request failed.",
            error = %self.error,
            timeseries_count = %self.count,
            error_type = kind,
            stage = error_stage::SENDING,
        );
        counter!(
            "component_errors_total",
            "error_type" => kind,
            "stage" => error_stage::SENDING,
        )
        .increment(1);
    }
}
