use std::time::Duration;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(600);

/// Connection settings for the bucket (file storage) API
#[derive(Debug, Clone)]
pub struct BucketConfig {
    pub host: String,
    pub api_key: String,
    pub timeout: Duration,
}

impl BucketConfig {
    pub fn new<H: Into<String>, K: Into<String>>(host: H, api_key: K) -> Self {
        Self {
            host: host.into(),
            api_key: api_key.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Connection settings for one chat-completion deployment.
///
/// `endpoint` may contain a `{deployment}` placeholder which is replaced by
/// the deployment name.
#[derive(Debug, Clone)]
pub struct CompletionConfig {
    pub endpoint: String,
    pub deployment: String,
    pub api_key: String,
    pub timeout: Duration,
}

impl CompletionConfig {
    pub fn new<E: Into<String>, D: Into<String>, K: Into<String>>(
        endpoint: E,
        deployment: D,
        api_key: K,
    ) -> Self {
        Self {
            endpoint: endpoint.into(),
            deployment: deployment.into(),
            api_key: api_key.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn url(&self) -> String {
        self.endpoint.replace("{deployment}", &self.deployment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completion_url_substitutes_deployment() {
        let config = CompletionConfig::new(
            "https://ai-proxy.lab.epam.com/openai/deployments/{deployment}/chat/completions",
            "dall-e-3",
            "key",
        );
        assert_eq!(
            config.url(),
            "https://ai-proxy.lab.epam.com/openai/deployments/dall-e-3/chat/completions"
        );
    }

    #[test]
    fn test_completion_url_without_placeholder_is_used_as_is() {
        let config = CompletionConfig::new("http://localhost:8080/chat", "gpt-4o", "key");
        assert_eq!(config.url(), "http://localhost:8080/chat");
    }
}
