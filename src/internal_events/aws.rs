use metrics::counter;

use super::{error_stage, error_type, InternalEvent};

#[derive(Debug)]
pub struct AwsAssumeRoleConfigured<'a> {
    pub role_arn: &'a str,
    pub session_name: &'a str,
}

impl InternalEvent for AwsAssumeRoleConfigured<'_> {
    fn emit(self) {
        debug!(
            message = "Using AWS role.",
            role_arn = %self.role_arn,
            role_session_name = %self.session_name,
        );
    }
}

#[derive(Debug)]
pub struct AwsHostnameUnavailable<'a> {
    pub error: &'a std::io::Error,
}

impl InternalEvent for AwsHostnameUnavailable<'_> {
    fn emit(self) {
        warn!(
            message = "Could not read hostname for role session name; using fallback.",
            error = %self.error,
        );
    }
}

#[derive(Debug)]
pub struct AwsRequestSigned<'a> {
    pub service: &'a str,
    pub region: &'a str,
    pub temporary_credentials: bool,
}

impl InternalEvent for AwsRequestSigned<'_> {
    fn emit(self) {
        debug!(
            message = "Signed request with SigV4.",
            service = %self.service,
            region = %self.region,
            temporary_credentials = %self.temporary_credentials,
        );
    }
}

#[derive(Debug)]
pub struct AwsSigningError<'a> {
    pub error: &'a crate::aws::AwsError,
}

impl InternalEvent for AwsSigningError<'_> {
    fn emit(self) {
        error!(
            message = "Failed to sign request.",
            error = %self.error,
            error_type = error_type::CONFIGURATION_FAILED,
            stage = error_stage::SENDING,
        );
        counter!(
            "component_errors_total",
            "error_type" => error_type::CONFIGURATION_FAILED,
            "stage" => error_stage::SENDING,
        )
        .increment(1);
    }
}
