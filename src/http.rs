use std::{fmt, time::Instant};

use bytes::Bytes;
use futures::future::BoxFuture;
use headers::{Authorization, HeaderMapExt};
use http::{
    header::{ACCEPT_ENCODING, USER_AGENT},
    HeaderMap, HeaderValue, Request, Response,
};
use hyper::{
    client::{Client, HttpConnector},
    Body,
};
use hyper_openssl::HttpsConnector;
use openssl::ssl::{SslConnector, SslMethod};
use snafu::{ResultExt, Snafu};
use tracing::{Instrument, Span};

use crate::{
    internal_events::{AboutToSendHttpRequest, GotHttpError, GotHttpResponse},
    sensitive_string::SensitiveString,
};

#[derive(Debug, Snafu)]
pub enum HttpError {
    #[snafu(display("Failed to set up TLS: {}", source))]
    BuildTlsConnector { source: openssl::error::ErrorStack },

    #[snafu(display("Failed to set up the HTTPS connector: {}", source))]
    MakeHttpsConnector { source: openssl::error::ErrorStack },

    #[snafu(display("HTTP request failed: {}", source))]
    CallRequest { source: hyper::Error },

    #[snafu(display("Failed to read HTTP response body: {}", source))]
    ReadBody { source: hyper::Error },
}

type HttpsClient = Client<HttpsConnector<HttpConnector>, Body>;

/// A plain and TLS capable HTTP/1.1 and HTTP/2 client.
///
/// Every request gets a `User-Agent` and `Accept-Encoding: identity` unless the
/// caller already set them. Cheap to clone.
#[derive(Clone)]
pub struct HttpClient {
    client: HttpsClient,
    span: Span,
    user_agent: HeaderValue,
}

impl HttpClient {
    pub fn new() -> Result<Self, HttpError> {
        let mut connector = HttpConnector::new();
        // https:// URLs are handed to the TLS layer, not rejected here.
        connector.enforce_http(false);

        let tls = SslConnector::builder(SslMethod::tls()).context(BuildTlsConnectorSnafu)?;
        let connector =
            HttpsConnector::with_connector(connector, tls).context(MakeHttpsConnectorSnafu)?;

        Ok(Self {
            client: Client::builder().build(connector),
            span: info_span!("http_client"),
            user_agent: user_agent(),
        })
    }

    pub fn send(
        &self,
        mut request: Request<Body>,
    ) -> BoxFuture<'static, Result<Response<Body>, HttpError>> {
        let _entered = self.span.enter();

        insert_default_headers(request.headers_mut(), &self.user_agent);
        emit!(AboutToSendHttpRequest { request: &request });

        // Nothing goes out until the returned future is polled.
        let in_flight = self.client.request(request);

        Box::pin(
            async move {
                let started = Instant::now();
                let result = in_flight.await;
                let roundtrip = started.elapsed();

                match result {
                    Ok(response) => {
                        emit!(GotHttpResponse {
                            response: &response,
                            roundtrip,
                        });
                        Ok(response)
                    }
                    Err(error) => {
                        emit!(GotHttpError {
                            error: &error,
                            roundtrip,
                        });
                        Err(error).context(CallRequestSnafu)
                    }
                }
            }
            .instrument(self.span.clone()),
        )
    }
}

impl fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpClient")
            .field("user_agent", &self.user_agent)
            .finish_non_exhaustive()
    }
}

fn user_agent() -> HeaderValue {
    HeaderValue::try_from(format!("RemoteWriteShipper/{}", crate::get_version()))
        .unwrap_or_else(|_| HeaderValue::from_static("RemoteWriteShipper"))
}

fn insert_default_headers(headers: &mut HeaderMap, user_agent: &HeaderValue) {
    headers
        .entry(USER_AGENT)
        .or_insert_with(|| user_agent.clone());
    // Responses are never decompressed.
    headers
        .entry(ACCEPT_ENCODING)
        .or_insert_with(|| HeaderValue::from_static("identity"));
}

/// Drains a response body into memory.
pub async fn read_body(body: Body) -> Result<Bytes, HttpError> {
    hyper::body::to_bytes(body).await.context(ReadBodySnafu)
}

/// Static credentials sent in the `Authorization` header.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Auth {
    Basic {
        user: String,
        password: SensitiveString,
    },
    Bearer {
        token: SensitiveString,
    },
}

impl Auth {
    pub fn apply<B>(&self, request: &mut Request<B>) {
        self.apply_headers_map(request.headers_mut());
    }

    /// Sets `Authorization`, replacing any earlier value. A bearer token that is
    /// not a valid header value is logged and left out.
    pub fn apply_headers_map(&self, headers: &mut HeaderMap) {
        match self {
            Self::Basic { user, password } => {
                headers.typed_insert(Authorization::basic(user, password.inner()));
            }
            Self::Bearer { token } => match Authorization::bearer(token.inner()) {
                Ok(authorization) => headers.typed_insert(authorization),
                Err(error) => error!(
                    message = "Bearer token is not a valid header value.",
                    token = %token,
                    %error,
                ),
            },
        }
    }
}
