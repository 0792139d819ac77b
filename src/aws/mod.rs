//! AWS credential resolution and SigV4 request signing.

pub mod auth;

use std::time::SystemTime;

pub use auth::AwsAuthentication;
use aws_config::meta::region::ProvideRegion;
use aws_credential_types::{
    provider::{error::CredentialsError, ProvideCredentials, SharedCredentialsProvider},
    Credentials,
};
use aws_sigv4::{
    http_request::{sign, SignableBody, SignableRequest, SigningError, SigningSettings},
    sign::v4,
};
use aws_smithy_runtime_api::client::identity::Identity;
use aws_types::region::Region;
use bytes::Bytes;
use sha2::{Digest, Sha256};
use snafu::{ResultExt, Snafu};

use crate::internal_events::{AwsRequestSigned, AwsSigningError};

#[derive(Debug, Snafu)]
pub enum AwsError {
    #[snafu(display("Could not determine region from configuration or default providers"))]
    MissingRegion,

    #[snafu(display("Failed to resolve AWS credentials: {}", source))]
    CredentialsUnavailable { source: CredentialsError },

    #[snafu(display("Header {name:?} is not valid UTF-8 and can't be signed"))]
    InvalidHeader { name: String },

    #[snafu(display("Invalid signing parameters: {message}"))]
    SigningParams { message: String },

    #[snafu(display("Failed to sign request: {}", source))]
    Signing { source: SigningError },
}

pub async fn resolve_region(region: Option<Region>) -> Result<Region, AwsError> {
    match region {
        Some(region) => Ok(region),
        None => aws_config::default_provider::region::default_provider()
            .region()
            .await
            .ok_or(AwsError::MissingRegion),
    }
}

pub async fn load_credentials(
    credentials_provider: &SharedCredentialsProvider,
) -> Result<Credentials, AwsError> {
    credentials_provider
        .provide_credentials()
        .await
        .context(CredentialsUnavailableSnafu)
}

/// Signs `request` in place with SigV4.
///
/// The payload hash is the hex SHA-256 of the body, passed precomputed. Every
/// header already on the request is covered by the signature.
pub fn sign_request(
    service_name: &str,
    request: &mut http::Request<Bytes>,
    credentials: Credentials,
    region: &Region,
) -> Result<(), AwsError> {
    let temporary_credentials = credentials.session_token().is_some();

    signed(service_name, request, credentials, region)
        .inspect(|_| {
            emit!(AwsRequestSigned {
                service: service_name,
                region: region.as_ref(),
                temporary_credentials,
            })
        })
        .inspect_err(|error| emit!(AwsSigningError { error }))
}

fn signed(
    service_name: &str,
    request: &mut http::Request<Bytes>,
    credentials: Credentials,
    region: &Region,
) -> Result<(), AwsError> {
    let payload_hash = hex::encode(Sha256::digest(request.body()));

    let headers = request
        .headers()
        .iter()
        .map(|(name, value)| {
            std::str::from_utf8(value.as_bytes())
                .map(|value| (name.as_str(), value))
                .map_err(|_| AwsError::InvalidHeader {
                    name: name.to_string(),
                })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let signable_request = SignableRequest::new(
        request.method().as_str(),
        request.uri().to_string(),
        headers.into_iter(),
        SignableBody::Precomputed(payload_hash),
    )
    .context(SigningSnafu)?;

    let identity = Identity::new(credentials, None);
    let signing_params = v4::SigningParams::builder()
        .identity(&identity)
        .region(region.as_ref())
        .name(service_name)
        .time(SystemTime::now())
        .settings(SigningSettings::default())
        .build()
        .map_err(|error| AwsError::SigningParams {
            message: error.to_string(),
        })?;

    let (signing_instructions, _signature) = sign(signable_request, &signing_params.into())
        .context(SigningSnafu)?
        .into_parts();
    signing_instructions.apply_to_request_http0x(request);

    Ok(())
}
