//! Construction of the AWS S3 client used by [`super::S3SnapshotSource`].

use std::time::Duration;

use aws_config::{BehaviorVersion, Region, SdkConfig};
use aws_sdk_s3::Client;
use aws_sdk_s3::config::timeout::TimeoutConfig;

/// Connection settings for the S3 client.
///
/// Credentials come from the standard AWS provider chain (environment,
/// shared profile, web identity, instance metadata).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct S3ClientSettings {
    /// Region the buckets live in.
    pub region: String,
    /// Endpoint override for S3-compatible stores; `None` uses AWS.
    pub endpoint: Option<String>,
    /// Address buckets as `{endpoint}/{bucket}` instead of a subdomain.
    pub force_path_style: bool,
    /// Upper bound on each storage operation, retries included.
    pub operation_timeout: Duration,
}

impl S3ClientSettings {
    /// Resolve credentials from the default provider chain and build a client.
    pub async fn load_client(&self) -> Client {
        let shared = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(self.region.clone()))
            .load()
            .await;
        self.client_from(&shared)
    }

    /// Build a client from an already loaded shared configuration, applying
    /// the endpoint, addressing, and timeout overrides.
    #[must_use]
    pub fn client_from(&self, shared: &SdkConfig) -> Client {
        let mut builder = aws_sdk_s3::config::Builder::from(shared)
            .force_path_style(self.force_path_style)
            .timeout_config(
                TimeoutConfig::builder()
                    .operation_timeout(self.operation_timeout)
                    .build(),
            );
        if let Some(endpoint) = self.endpoint.as_deref() {
            builder = builder.endpoint_url(endpoint);
        }
        Client::from_conf(builder.build())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aws_sdk_s3::config::Credentials;
    use rstest::rstest;

    fn shared() -> SdkConfig {
        SdkConfig::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new("eu-west-1"))
            .credentials_provider(aws_sdk_s3::config::SharedCredentialsProvider::new(
                Credentials::new("key", "secret", None, None, "static"),
            ))
            .build()
    }

    #[rstest]
    #[case(None, false)]
    #[case(Some("http://127.0.0.1:9000"), true)]
    fn builds_clients_with_and_without_an_endpoint_override(
        #[case] endpoint: Option<&str>,
        #[case] force_path_style: bool,
    ) {
        let settings = S3ClientSettings {
            region: "eu-west-1".to_owned(),
            endpoint: endpoint.map(str::to_owned),
            force_path_style,
            operation_timeout: Duration::from_secs(7),
        };
        let client = settings.client_from(&shared());
        let config = client.config();
        assert_eq!(
            config.region().map(ToString::to_string),
            Some("eu-west-1".to_owned())
        );
        assert_eq!(
            config
                .timeout_config()
                .and_then(TimeoutConfig::operation_timeout),
            Some(Duration::from_secs(7))
        );
    }
}
