use aws_types::region::Region;
use headers::Authorization;
use http::Uri;
use serde::{Deserialize, Serialize};
use snafu::{ResultExt, Snafu};

use super::service::RemoteWriteSink;
use crate::{
    aws::{self, AwsAuthentication},
    http::{HttpClient, HttpError},
    sensitive_string::SensitiveString,
    sinks::prometheus::PrometheusRemoteWriteAuth,
};

#[derive(Debug, Snafu)]
pub enum BuildError {
    #[snafu(display("Invalid remote write configuration: {reason}"))]
    InvalidConfig { reason: String },

    #[snafu(display("Failed to create HTTP client: {}", source))]
    Client { source: HttpError },
}

/// How outgoing requests are authenticated.
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, Eq, PartialEq)]
#[serde(rename_all = "UPPERCASE")]
pub enum AuthType {
    #[default]
    None,
    /// SigV4 signing for Amazon Managed Service for Prometheus.
    Aws,
    Basic,
    /// Bearer token.
    Token,
}

/// Configuration for the remote write persister.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RemoteWriteConfig {
    /// The remote write URL, e.g. `https://prometheus.example.com/api/v1/write`.
    pub endpoint: String,

    #[serde(default)]
    pub auth_type: AuthType,

    /// Basic authentication username.
    pub username: Option<String>,

    /// Basic authentication password.
    pub password: Option<SensitiveString>,

    /// The bearer token to send.
    pub auth_token: Option<SensitiveString>,

    /// Region credentials are resolved in. Falls back to the AWS default region chain.
    pub region: Option<String>,

    /// Region of the Prometheus workspace, used to scope the signature. Falls back to
    /// `region`.
    pub prometheus_region: Option<String>,

    /// Role to assume on top of the default credentials chain.
    pub aws_role_arn: Option<String>,
}

impl RemoteWriteConfig {
    /// Validates the configuration and builds a sink ready to persist batches.
    ///
    /// Nothing is sent. For AWS this resolves the credential region and sets up the
    /// credentials provider, but credentials themselves are only loaded per request.
    pub async fn build(&self) -> Result<RemoteWriteSink, BuildError> {
        let endpoint = self.endpoint()?;
        let auth = self.auth().await?;
        let client = HttpClient::new().context(ClientSnafu)?;

        Ok(RemoteWriteSink::new(endpoint, auth, client))
    }

    fn endpoint(&self) -> Result<Uri, BuildError> {
        if self.endpoint.is_empty() {
            return invalid("endpoint must not be empty");
        }

        let endpoint = self.endpoint.parse::<Uri>().map_err(|error| BuildError::InvalidConfig {
            reason: format!("endpoint {:?} is not a valid URL: {}", self.endpoint, error),
        })?;

        match (endpoint.scheme_str(), endpoint.host()) {
            (Some("http" | "https"), Some(_)) => Ok(endpoint),
            _ => invalid(format!(
                "endpoint {:?} must be an absolute http(s) URL",
                self.endpoint
            )),
        }
    }

    async fn auth(&self) -> Result<Option<PrometheusRemoteWriteAuth>, BuildError> {
        match self.auth_type {
            AuthType::None => Ok(None),
            AuthType::Basic => {
                let user = non_empty(self.username.as_deref());
                let password = self.password.as_ref().filter(|password| !password.is_empty());
                match (user, password) {
                    (Some(user), Some(password)) => Ok(Some(PrometheusRemoteWriteAuth::Basic {
                        user: user.to_owned(),
                        password: password.clone(),
                    })),
                    _ => invalid("BASIC authentication requires username and password"),
                }
            }
            AuthType::Token => match self.auth_token.as_ref().filter(|token| !token.is_empty()) {
                Some(token) if Authorization::bearer(token.inner()).is_err() => {
                    invalid("auth_token is not a valid HTTP header value")
                }
                Some(token) => Ok(Some(PrometheusRemoteWriteAuth::Bearer {
                    token: token.clone(),
                })),
                None => invalid("TOKEN authentication requires auth_token"),
            },
            AuthType::Aws => self.aws_auth().await.map(Some),
        }
    }

    async fn aws_auth(&self) -> Result<PrometheusRemoteWriteAuth, BuildError> {
        let region = non_empty(self.region.as_deref());
        let Some(signing_region) = non_empty(self.prometheus_region.as_deref()).or(region) else {
            return invalid("AWS authentication requires prometheus_region or region");
        };

        let credentials_region = aws::resolve_region(region.map(|r| Region::new(r.to_owned())))
            .await
            .map_err(|error| BuildError::InvalidConfig {
                reason: error.to_string(),
            })?;

        let credentials_provider =
            AwsAuthentication::from_role_arn(non_empty(self.aws_role_arn.as_deref()))
                .credentials_provider(credentials_region)
                .await;

        Ok(PrometheusRemoteWriteAuth::Aws {
            credentials_provider,
            region: Region::new(signing_region.to_owned()),
        })
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|value| !value.is_empty())
}

fn invalid<T>(reason: impl Into<String>) -> Result<T, BuildError> {
    InvalidConfigSnafu {
        reason: reason.into(),
    }
    .fail()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(config: &str) -> RemoteWriteConfig {
        toml::from_str(config).unwrap()
    }

    fn invalid_reason(result: Result<RemoteWriteSink, BuildError>) -> String {
        match result {
            Err(BuildError::InvalidConfig { reason }) => reason,
            other => panic!("expected InvalidConfig, got {other:?}"),
        }
    }

    #[test]
    fn parsing_minimal() {
        let config = parse(r#"endpoint = "http://localhost:9090/api/v1/write""#);

        assert_eq!(config.auth_type, AuthType::None);
        assert!(config.username.is_none());
        assert!(config.region.is_none());
    }

    #[test]
    fn parsing_auth_types() {
        for (raw, expected) in [
            ("NONE", AuthType::None),
            ("AWS", AuthType::Aws),
            ("BASIC", AuthType::Basic),
            ("TOKEN", AuthType::Token),
        ] {
            let config = parse(&format!(
                "endpoint = \"http://localhost/write\"\nauth_type = \"{raw}\""
            ));
            assert_eq!(config.auth_type, expected);
        }
    }

    #[test]
    fn parsing_rejects_unknown_fields() {
        let result = toml::from_str::<RemoteWriteConfig>(
            r#"
            endpoint = "http://localhost/write"
            tenant_id = "foo"
        "#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn secrets_are_redacted_in_debug() {
        let config = parse(
            r#"
            endpoint = "http://localhost/write"
            auth_type = "BASIC"
            username = "u"
            password = "hunter2"
        "#,
        );
        assert!(!format!("{config:?}").contains("hunter2"));
    }

    #[tokio::test]
    async fn empty_endpoint_is_invalid() {
        let config = RemoteWriteConfig::default();
        assert!(invalid_reason(config.build().await).contains("empty"));
    }

    #[tokio::test]
    async fn unparsable_endpoint_is_invalid() {
        for endpoint in ["not a url", "/api/v1/write", "ftp://host/write"] {
            let config = RemoteWriteConfig {
                endpoint: endpoint.into(),
                ..Default::default()
            };
            assert!(matches!(
                config.build().await,
                Err(BuildError::InvalidConfig { .. })
            ));
        }
    }

    #[tokio::test]
    async fn basic_requires_username_and_password() {
        let config = RemoteWriteConfig {
            endpoint: "http://localhost/write".into(),
            auth_type: AuthType::Basic,
            username: Some("u".into()),
            password: Some("".into()),
            ..Default::default()
        };
        assert!(invalid_reason(config.build().await).contains("BASIC"));

        let config = RemoteWriteConfig {
            password: Some("p".into()),
            username: None,
            ..config
        };
        assert!(invalid_reason(config.build().await).contains("BASIC"));
    }

    #[tokio::test]
    async fn token_requires_token() {
        let config = RemoteWriteConfig {
            endpoint: "http://localhost/write".into(),
            auth_type: AuthType::Token,
            ..Default::default()
        };
        assert!(invalid_reason(config.build().await).contains("TOKEN"));
    }

    #[tokio::test]
    async fn token_must_be_a_valid_header_value() {
        for token in ["t\n", "line\nbreak", "nul\0byte"] {
            let config = RemoteWriteConfig {
                endpoint: "http://localhost/write".into(),
                auth_type: AuthType::Token,
                auth_token: Some(token.into()),
                ..Default::default()
            };

            let reason = invalid_reason(config.build().await);
            assert!(reason.contains("auth_token"));
            assert!(!reason.contains(token));
        }
    }

    #[tokio::test]
    async fn aws_requires_a_region() {
        let config = RemoteWriteConfig {
            endpoint: "https://aps-workspaces.us-east-1.amazonaws.com/write".into(),
            auth_type: AuthType::Aws,
            region: Some("".into()),
            ..Default::default()
        };
        assert!(invalid_reason(config.build().await).contains("region"));
    }

    #[tokio::test]
    async fn aws_signing_region_prefers_prometheus_region() {
        let config = RemoteWriteConfig {
            endpoint: "https://aps-workspaces.us-west-2.amazonaws.com/write".into(),
            auth_type: AuthType::Aws,
            region: Some("us-east-1".into()),
            prometheus_region: Some("us-west-2".into()),
            ..Default::default()
        };

        match config.aws_auth().await.unwrap() {
            PrometheusRemoteWriteAuth::Aws { region, .. } => {
                assert_eq!(region.as_ref(), "us-west-2")
            }
            other => panic!("unexpected auth {other:?}"),
        }
    }

    #[tokio::test]
    async fn aws_signing_region_falls_back_to_region() {
        let config = RemoteWriteConfig {
            endpoint: "https://aps-workspaces.us-east-1.amazonaws.com/write".into(),
            auth_type: AuthType::Aws,
            region: Some("us-east-1".into()),
            ..Default::default()
        };

        match config.aws_auth().await.unwrap() {
            PrometheusRemoteWriteAuth::Aws { region, .. } => {
                assert_eq!(region.as_ref(), "us-east-1")
            }
            other => panic!("unexpected auth {other:?}"),
        }
    }

    #[tokio::test]
    async fn valid_configs_build() {
        let configs = [
            RemoteWriteConfig {
                endpoint: "http://localhost:9090/api/v1/write".into(),
                ..Default::default()
            },
            RemoteWriteConfig {
                endpoint: "https://localhost/api/v1/write".into(),
                auth_type: AuthType::Basic,
                username: Some("u".into()),
                password: Some("p".into()),
                ..Default::default()
            },
            RemoteWriteConfig {
                endpoint: "https://localhost/api/v1/write".into(),
                auth_type: AuthType::Token,
                auth_token: Some("t".into()),
                ..Default::default()
            },
        ];

        for config in configs {
            let sink = config.build().await.unwrap();
            assert_eq!(sink.endpoint().to_string(), config.endpoint);
        }
    }
}
