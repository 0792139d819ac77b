use std::time::Duration;

use aws_config::{default_provider::credentials::DefaultCredentialsChain, sts::AssumeRoleProvider};
use aws_credential_types::provider::SharedCredentialsProvider;
use aws_types::region::Region;

use crate::internal_events::{AwsAssumeRoleConfigured, AwsHostnameUnavailable};

// matches default load timeout from the SDK, but lets us confidently document the
// default rather than relying on the SDK default to not change
pub const DEFAULT_LOAD_TIMEOUT: Duration = Duration::from_secs(5);

const ROLE_SESSION_PREFIX: &str = "aws-sigv4-proxy-";

/// Strategy for obtaining the credentials used to sign requests.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum AwsAuthentication {
    /// Assume the given role ARN, on top of the default credentials chain.
    Role { assume_role: String },

    /// The default credentials chain: environment, profile files, web identity,
    /// ECS and EC2 instance metadata.
    Default,
}

impl AwsAuthentication {
    pub fn from_role_arn(role_arn: Option<&str>) -> Self {
        match role_arn.filter(|arn| !arn.is_empty()) {
            Some(arn) => Self::Role {
                assume_role: arn.to_owned(),
            },
            None => Self::Default,
        }
    }

    pub async fn credentials_provider(&self, region: Region) -> SharedCredentialsProvider {
        let base = default_credentials_provider(region.clone()).await;

        match self {
            Self::Default => base,
            Self::Role { assume_role } => {
                let session_name = role_session_name();
                emit!(AwsAssumeRoleConfigured {
                    role_arn: assume_role,
                    session_name: &session_name,
                });

                let provider = AssumeRoleProvider::builder(assume_role)
                    .session_name(session_name)
                    .region(region)
                    .build_from_provider(base)
                    .await;

                SharedCredentialsProvider::new(provider)
            }
        }
    }
}

async fn default_credentials_provider(region: Region) -> SharedCredentialsProvider {
    let chain = DefaultCredentialsChain::builder()
        .region(region)
        .load_timeout(DEFAULT_LOAD_TIMEOUT);

    SharedCredentialsProvider::new(chain.build().await)
}

/// `aws-sigv4-proxy-<hostname>`, with `unknown` standing in for an unreadable hostname.
pub fn role_session_name() -> String {
    let host = match hostname::get() {
        Ok(name) => name.to_string_lossy().into_owned(),
        Err(error) => {
            emit!(AwsHostnameUnavailable { error: &error });
            String::from("unknown")
        }
    };
    session_name_for(&host)
}

fn session_name_for(host: &str) -> String {
    format!("{ROLE_SESSION_PREFIX}{host}")
}
