use std::future::Future;

use aws_sdk_ssm as ssm;
use tokio::sync::OnceCell;

use crate::error::SecretError;


pub trait SecretSource: Send + Sync {
    fn fetch(&self, name: &str) -> impl Future<Output = Result<String, SecretError>> + Send;
}

/// Reads SecureString parameters from SSM Parameter Store.
pub struct SsmSecretSource {
    client: ssm::Client,
}

impl SsmSecretSource {
    pub fn new(config: &aws_config::SdkConfig) -> Self {
        SsmSecretSource { client: ssm::Client::new(config) }
    }
}

impl SecretSource for SsmSecretSource {
    async fn fetch(&self, name: &str) -> Result<String, SecretError> {
        let output = self.client
            .get_parameter()
            .name(name)
            .with_decryption(true)
            .send()
            .await
            .map_err(|err| SecretError::Request { name: name.to_string(), source: Box::new(err) })?;

        output.parameter()
            .and_then(|parameter| parameter.value())
            .map(str::to_string)
            .ok_or_else(|| SecretError::Empty(name.to_string()))
    }
}

/// Looks the webhook url up once and reuses it for the rest of the process.
///
/// A failed lookup is not remembered, the next invocation tries again.
pub struct WebhookResolver<S> {
    source: S,
    parameter: String,
    url: OnceCell<String>,
}

impl<S: SecretSource> WebhookResolver<S> {
    pub fn new(source: S, parameter: String) -> Self {
        WebhookResolver { source, parameter, url: OnceCell::new() }
    }

    pub async fn resolve(&self) -> Result<&str, SecretError> {
        let url = self.url
            .get_or_try_init(|| async {
                tracing::info!("Resolving webhook url from parameter {}", self.parameter);
                self.source.fetch(&self.parameter).await
            })
            .await?;

        Ok(url.as_str())
    }

    #[cfg(test)]
    pub(crate) fn source(&self) -> &S {
        &self.source
    }
}


#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// In-memory secret store counting how often it is asked.
    pub(crate) struct StaticSecret {
        pub value: Option<String>,
        pub calls: AtomicUsize,
    }

    impl StaticSecret {
        pub(crate) fn new(value: Option<&str>) -> Self {
            StaticSecret { value: value.map(str::to_string), calls: AtomicUsize::new(0) }
        }
    }

    impl SecretSource for StaticSecret {
        async fn fetch(&self, name: &str) -> Result<String, SecretError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.value.clone().ok_or_else(|| SecretError::Empty(name.to_string()))
        }
    }

    #[tokio::test]
    async fn resolves_once_and_caches() {
        let resolver = WebhookResolver::new(StaticSecret::new(Some("https://hooks.example.com/a")), "/hook".to_string());

        assert_eq!(resolver.resolve().await.unwrap(), "https://hooks.example.com/a");
        assert_eq!(resolver.resolve().await.unwrap(), "https://hooks.example.com/a");
        assert_eq!(resolver.source.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failures_are_retried() {
        let resolver = WebhookResolver::new(StaticSecret::new(None), "/hook".to_string());

        assert!(matches!(resolver.resolve().await, Err(SecretError::Empty(ref name)) if name == "/hook"));
        assert!(resolver.resolve().await.is_err());
        assert_eq!(resolver.source.calls.load(Ordering::SeqCst), 2);
    }
}
