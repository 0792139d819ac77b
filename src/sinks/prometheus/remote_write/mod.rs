//! The Prometheus remote write persister.
//!
//! Takes converted [`TimeSeries`] batches and delivers each one in a single
//! request via the [Prometheus Remote Write protocol][remote_write]: a protobuf
//! `WriteRequest`, snappy block compressed, optionally authenticated.
//!
//! [`TimeSeries`]: crate::prometheus::proto::TimeSeries
//! [remote_write]: https://prometheus.io/docs/concepts/remote_write_spec/

mod config;
mod service;


pub use config::{AuthType, BuildError, RemoteWriteConfig};
pub use service::{DeliveryError, PersistError, RemoteWriteSink};
