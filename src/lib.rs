#![deny(unused_extern_crates)]
#![deny(unused_allocation)]
#![deny(unused_assignments)]
#![deny(unused_comparisons)]
#![allow(clippy::float_cmp)]
#![allow(clippy::new_ret_no_self)]
#![allow(clippy::type_complexity)]

//! Ships point-in-time metric snapshots to a remote time-series store over the
//! [Prometheus remote write protocol][remote_write].
//!
//! A snapshot of [`MetricFamily`] values is turned into remote write time series by
//! [`convert`], then delivered by a [`RemoteWriteSink`] built from a
//! [`RemoteWriteConfig`]. The [`Pipeline`] ties a [`Gatherer`] to both.
//!
//! [remote_write]: https://prometheus.io/docs/concepts/remote_write_spec/
//! [`MetricFamily`]: event::MetricFamily
//! [`convert`]: convert::convert
//! [`RemoteWriteSink`]: sinks::prometheus::remote_write::RemoteWriteSink
//! [`RemoteWriteConfig`]: sinks::prometheus::remote_write::RemoteWriteConfig
//! [`Pipeline`]: pipeline::Pipeline
//! [`Gatherer`]: metrics::Gatherer

#[macro_use]
extern crate tracing;

#[macro_use]
pub mod internal_events;

pub mod aws;
pub mod convert;
pub mod event;
pub mod http;
pub mod metrics;
pub mod pipeline;
pub mod prometheus;
pub mod sensitive_string;
pub mod sinks;
#[cfg(test)]
pub mod test_util;
pub mod trace;

pub type Error = Box<dyn std::error::Error + Send + Sync + 'static>;

pub type Result<T> = std::result::Result<T, Error>;

pub fn get_version() -> String {
    format!(
        "{} ({})",
        env!("CARGO_PKG_VERSION"),
        std::env::consts::ARCH
    )
}
