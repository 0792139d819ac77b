use bytes::Bytes;
use http::{header, StatusCode, Uri};
use hyper::Body;
use prost::Message;
use snafu::{ResultExt, Snafu};

use crate::{
    aws::AwsError,
    http::{self as http_client, HttpClient, HttpError},
    internal_events::{
        PrometheusRemoteWriteError, PrometheusRemoteWriteRequestBuilt, PrometheusRemoteWriteSent,
    },
    prometheus::proto::{TimeSeries, WriteRequest},
    sinks::prometheus::PrometheusRemoteWriteAuth,
};

const REMOTE_WRITE_VERSION_HEADER: &str = "X-Prometheus-Remote-Write-Version";
const REMOTE_WRITE_VERSION: &str = "0.1.0";
const CONTENT_TYPE_PROTOBUF: &str = "application/x-protobuf";
const CONTENT_ENCODING_SNAPPY: &str = "snappy";

#[derive(Debug, Snafu)]
pub enum PersistError {
    #[snafu(display("Failed to snappy compress write request: {}", source))]
    Compress { source: snap::Error },

    #[snafu(display("Failed to build HTTP request: {}", source))]
    BuildRequest { source: http::Error },

    #[snafu(display("Failed to resolve credentials: {}", source))]
    CredentialResolutionFailed { source: AwsError },

    #[snafu(display("Failed to sign request: {}", source))]
    SigningFailed { source: AwsError },

    #[snafu(display("Remote write delivery failed: {}", source))]
    DeliveryFailed { source: DeliveryError },
}

#[derive(Debug, Snafu)]
pub enum DeliveryError {
    #[snafu(display("{}", source))]
    Transport { source: HttpError },

    #[snafu(display("Server responded with {status}: {body}"))]
    UnexpectedStatus { status: StatusCode, body: String },
}

impl From<AwsError> for PersistError {
    fn from(source: AwsError) -> Self {
        match source {
            AwsError::CredentialsUnavailable { .. } | AwsError::MissingRegion => {
                Self::CredentialResolutionFailed { source }
            }
            _ => Self::SigningFailed { source },
        }
    }
}

/// Delivers converted batches to a remote write endpoint.
#[derive(Clone, Debug)]
pub struct RemoteWriteSink {
    endpoint: Uri,
    auth: Option<PrometheusRemoteWriteAuth>,
    client: HttpClient,
}

impl RemoteWriteSink {
    pub(super) const fn new(
        endpoint: Uri,
        auth: Option<PrometheusRemoteWriteAuth>,
        client: HttpClient,
    ) -> Self {
        Self {
            endpoint,
            auth,
            client,
        }
    }

    pub const fn endpoint(&self) -> &Uri {
        &self.endpoint
    }

    /// Sends `time_series` as one remote write request.
    ///
    /// An empty batch is still sent. Only a `200 OK` response counts as delivered,
    /// and nothing is retried.
    pub async fn persist(&self, time_series: Vec<TimeSeries>) -> Result<(), PersistError> {
        let count = time_series.len();

        let result = self.send(time_series).await;
        if let Err(error) = &result {
            emit!(PrometheusRemoteWriteError { error, count });
        }
        result
    }

    async fn send(&self, time_series: Vec<TimeSeries>) -> Result<(), PersistError> {
        let count = time_series.len();
        let mut request = self.build_request(time_series)?;
        let byte_size = request.body().len();

        if let Some(auth) = &self.auth {
            auth.apply(&mut request).await?;
        }

        let response = self
            .client
            .send(request.map(Body::from))
            .await
            .context(TransportSnafu)
            .context(DeliveryFailedSnafu)?;

        let status = response.status();
        if status != StatusCode::OK {
            // An unreadable body is reported as empty.
            let body = http_client::read_body(response.into_body())
                .await
                .map(|body| String::from_utf8_lossy(&body).into_owned())
                .unwrap_or_default();
            return Err(DeliveryError::UnexpectedStatus { status, body })
                .context(DeliveryFailedSnafu);
        }

        emit!(PrometheusRemoteWriteSent { count, byte_size });
        Ok(())
    }

    fn build_request(
        &self,
        timeseries: Vec<TimeSeries>,
    ) -> Result<http::Request<Bytes>, PersistError> {
        let count = timeseries.len();
        let encoded = WriteRequest { timeseries }.encode_to_vec();
        let body = snap_block(&encoded)?;

        emit!(PrometheusRemoteWriteRequestBuilt {
            endpoint: &self.endpoint,
            count,
            encoded_size: encoded.len(),
            compressed_size: body.len(),
        });

        http::Request::post(self.endpoint.clone())
            .header(header::CONTENT_TYPE, CONTENT_TYPE_PROTOBUF)
            .header(header::CONTENT_ENCODING, CONTENT_ENCODING_SNAPPY)
            .header(REMOTE_WRITE_VERSION_HEADER, REMOTE_WRITE_VERSION)
            .body(Bytes::from(body))
            .context(BuildRequestSnafu)
    }
}

fn snap_block(data: &[u8]) -> Result<Vec<u8>, PersistError> {
    snap::raw::Encoder::new()
        .compress_vec(data)
        .context(CompressSnafu)
}
