use aws_credential_types::provider::SharedCredentialsProvider;
use aws_types::region::Region;
use bytes::Bytes;

use crate::{aws::AwsError, http::Auth, sensitive_string::SensitiveString};

pub mod remote_write;

/// Authentication strategies.
#[derive(Clone, Debug)]
pub enum PrometheusRemoteWriteAuth {
    /// HTTP Basic Authentication.
    Basic {
        user: String,
        password: SensitiveString,
    },

    /// Bearer authentication.
    ///
    /// A bearer token (OAuth2, JWT, etc) is passed as-is.
    Bearer { token: SensitiveString },

    /// Amazon Managed Service for Prometheus SigV4 signing.
    Aws {
        credentials_provider: SharedCredentialsProvider,
        /// Region the `aps` signature is scoped to.
        region: Region,
    },
}

impl PrometheusRemoteWriteAuth {
    pub const AWS_SERVICE_NAME: &'static str = "aps";

    /// Adds credentials to a fully built request.
    ///
    /// For AWS this signs every header present, so it must run last.
    pub async fn apply(&self, request: &mut http::Request<Bytes>) -> Result<(), AwsError> {
        match self {
            Self::Basic { user, password } => {
                Auth::Basic {
                    user: user.clone(),
                    password: password.clone(),
                }
                .apply(request);
                Ok(())
            }
            Self::Bearer { token } => {
                Auth::Bearer {
                    token: token.clone(),
                }
                .apply(request);
                Ok(())
            }
            Self::Aws {
                credentials_provider,
                region,
            } => {
                let credentials = crate::aws::load_credentials(credentials_provider).await?;
                crate::aws::sign_request(Self::AWS_SERVICE_NAME, request, credentials, region)
            }
        }
    }
}
