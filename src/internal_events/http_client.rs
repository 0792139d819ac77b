use std::{fmt, time::Duration};

use http::{HeaderMap, Request, Response};
use hyper::body::HttpBody;
use metrics::{counter, histogram};

use super::InternalEvent;

const SENSITIVE_HEADERS: [&str; 3] = [
    "authorization",
    "proxy-authorization",
    "x-amz-security-token",
];

/// Copy of `headers` with credentials flagged so `Debug` hides them.
fn redacted(headers: &HeaderMap) -> HeaderMap {
    let mut headers = headers.clone();
    for (name, value) in headers.iter_mut() {
        if SENSITIVE_HEADERS.contains(&name.as_str()) {
            value.set_sensitive(true);
        }
    }
    headers
}

/// Renders what is known about a body's length without touching its content.
struct BodySize<'a, B>(&'a B);

impl<B: HttpBody> fmt::Display for BodySize<'_, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hint = self.0.size_hint();
        match hint.exact() {
            Some(0) => f.write_str("empty"),
            Some(exact) => write!(f, "{exact} bytes"),
            None => match hint.upper() {
                Some(upper) => write!(f, "{}..={upper} bytes", hint.lower()),
                None => write!(f, "at least {} bytes", hint.lower()),
            },
        }
    }
}

#[derive(Debug)]
pub struct AboutToSendHttpRequest<'a, B> {
    pub request: &'a Request<B>,
}

impl<B: HttpBody> InternalEvent for AboutToSendHttpRequest<'_, B> {
    fn emit(self) {
        let request = self.request;
        debug!(
            message = "Sending HTTP request.",
            method = %request.method(),
            uri = %request.uri(),
            headers = ?redacted(request.headers()),
            body = %BodySize(request.body()),
        );
        counter!("http_client_requests_sent_total", "method" => request.method().to_string())
            .increment(1);
    }
}

#[derive(Debug)]
pub struct GotHttpResponse<'a, B> {
    pub response: &'a Response<B>,
    pub roundtrip: Duration,
}

impl<B: HttpBody> InternalEvent for GotHttpResponse<'_, B> {
    fn emit(self) {
        let status = self.response.status();
        debug!(
            message = "Received HTTP response.",
            %status,
            headers = ?redacted(self.response.headers()),
            body = %BodySize(self.response.body()),
            roundtrip_ms = %self.roundtrip.as_millis(),
        );
        counter!("http_client_responses_total", "status" => status.as_str().to_owned())
            .increment(1);
        histogram!("http_client_rtt_seconds").record(self.roundtrip);
    }
}

#[derive(Debug)]
pub struct GotHttpError<'a> {
    pub error: &'a hyper::Error,
    pub roundtrip: Duration,
}

impl InternalEvent for GotHttpError<'_> {
    fn emit(self) {
        let kind = if self.error.is_connect() {
            "connect"
        } else if self.error.is_timeout() {
            "timeout"
        } else {
            "other"
        };
        debug!(
            message = "HTTP request failed.",
            error = %self.error,
            error_kind = kind,
            roundtrip_ms = %self.roundtrip.as_millis(),
        );
        counter!("http_client_errors_total", "error_kind" => kind).increment(1);
        histogram!("http_client_rtt_seconds").record(self.roundtrip);
    }
}
