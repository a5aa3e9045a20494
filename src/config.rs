use serde::Deserialize;
use tokio::sync::Semaphore;

use crate::error::{AppError, Result};
use crate::plan::Overlay;

const ENV_PREFIX: &str = "SPACELIFT";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub spacelift: SpaceliftConfig,
    pub overlay: Overlay,
    pub execution: ExecutionConfig,
}

#[derive(Clone)]
pub struct SpaceliftConfig {
    pub domain: String,
    pub api_key_id: String,
    pub api_key_secret: String,
    /// Full GraphQL URL. Takes precedence over the domain-derived endpoint.
    pub endpoint: Option<String>,
}

// Manual Debug impl to avoid leaking the API key secret
impl std::fmt::Debug for SpaceliftConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpaceliftConfig")
            .field("domain", &self.domain)
            .field("api_key_id", &self.api_key_id)
            .field("api_key_secret", &"[REDACTED]")
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

impl SpaceliftConfig {
    pub fn endpoint(&self) -> String {
        match &self.endpoint {
            Some(endpoint) => endpoint.clone(),
            None => format!("https://{}.app.spacelift.io/graphql", self.domain),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ExecutionConfig {
    /// Upper bound on in-flight mutations. `None` launches every update at once.
    pub max_concurrency: Option<usize>,
    pub request_timeout_secs: u64,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            max_concurrency: None,
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

/// Flat view of every `SPACELIFT_*` key, split into sections after validation.
#[derive(Debug, Default, Deserialize)]
struct RawConfig {
    domain: Option<String>,
    api_key_id: Option<String>,
    api_key_secret: Option<String>,
    endpoint: Option<String>,

    administrative: Option<String>,
    name: Option<String>,
    branch: Option<String>,
    namespace: Option<String>,
    provider: Option<String>,
    repository: Option<String>,
    repository_url: Option<String>,
    project_root: Option<String>,
    space: Option<String>,
    labels: Option<String>,
    worker_pool_id: Option<String>,

    max_concurrency: Option<usize>,
    #[serde(default = "default_request_timeout_secs")]
    request_timeout_secs: u64,
}

fn default_request_timeout_secs() -> u64 {
    30
}

/// Empty values count as unset. Whitespace is a value.
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

fn required(value: Option<String>, key: &str) -> Result<String> {
    value.filter(|v| !v.trim().is_empty()).ok_or_else(|| {
        AppError::Config(format!(
            "{ENV_PREFIX}_{} environment variable is required",
            key.to_uppercase()
        ))
    })
}

/// Reject concurrency ceilings a semaphore cannot hold.
pub fn validate_max_concurrency(limit: usize) -> Result<usize> {
    if limit == 0 {
        return Err(AppError::Config(
            "max_concurrency must be greater than zero".to_string(),
        ));
    }
    if limit > Semaphore::MAX_PERMITS {
        return Err(AppError::Config(format!(
            "max_concurrency must not exceed {}",
            Semaphore::MAX_PERMITS
        )));
    }
    Ok(limit)
}

impl TryFrom<RawConfig> for AppConfig {
    type Error = AppError;

    fn try_from(raw: RawConfig) -> Result<Self> {
        let spacelift = SpaceliftConfig {
            domain: required(raw.domain, "domain")?,
            api_key_id: required(raw.api_key_id, "api_key_id")?,
            api_key_secret: required(raw.api_key_secret, "api_key_secret")?,
            endpoint: non_empty(raw.endpoint),
        };

        let overlay = Overlay {
            administrative: non_empty(raw.administrative),
            name: non_empty(raw.name),
            branch: non_empty(raw.branch),
            namespace: non_empty(raw.namespace),
            provider: non_empty(raw.provider),
            repository: non_empty(raw.repository),
            repository_url: non_empty(raw.repository_url),
            project_root: non_empty(raw.project_root),
            space: non_empty(raw.space),
            labels: non_empty(raw.labels),
            worker_pool_id: non_empty(raw.worker_pool_id),
        };

        let execution = ExecutionConfig {
            max_concurrency: raw.max_concurrency.map(validate_max_concurrency).transpose()?,
            request_timeout_secs: raw.request_timeout_secs,
        };

        Ok(Self {
            spacelift,
            overlay,
            execution,
        })
    }
}

impl AppConfig {
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let mut builder = config::Config::builder();

        // Load from file if specified
        if let Some(path) = config_path {
            builder = builder.add_source(config::File::with_name(path));
        } else {
            builder = builder.add_source(config::File::with_name("stackbulk").required(false));
        }

        // SPACELIFT_BRANCH -> branch, SPACELIFT_WORKER_POOL_ID -> worker_pool_id, ...
        builder = builder.add_source(config::Environment::with_prefix(ENV_PREFIX));

        let raw: RawConfig = builder.build()?.try_deserialize()?;
        raw.try_into()
    }

    pub fn api_key_secret(&self) -> &str {
        &self.spacelift.api_key_secret
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_with_credentials() -> RawConfig {
        RawConfig {
            domain: Some("acme".to_string()),
            api_key_id: Some("01HKEY".to_string()),
            api_key_secret: Some("s3cr3t".to_string()),
            request_timeout_secs: default_request_timeout_secs(),
            ..Default::default()
        }
    }

    #[test]
    fn test_missing_domain_is_config_error() {
        let raw = RawConfig {
            domain: None,
            ..raw_with_credentials()
        };
        let err = AppConfig::try_from(raw).unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
        assert!(err.to_string().contains("SPACELIFT_DOMAIN"));
    }

    #[test]
    fn test_empty_secret_counts_as_missing() {
        let raw = RawConfig {
            api_key_secret: Some(String::new()),
            ..raw_with_credentials()
        };
        let err = AppConfig::try_from(raw).unwrap_err();
        assert!(err.to_string().contains("SPACELIFT_API_KEY_SECRET"));
    }

    #[test]
    fn test_empty_overrides_are_dropped() {
        let raw = RawConfig {
            branch: Some(String::new()),
            provider: Some("GITLAB".to_string()),
            ..raw_with_credentials()
        };
        let config = AppConfig::try_from(raw).unwrap();
        assert_eq!(config.overlay.branch, None);
        assert_eq!(config.overlay.provider.as_deref(), Some("GITLAB"));
    }

    #[test]
    fn test_whitespace_overrides_are_kept_verbatim() {
        let raw = RawConfig {
            branch: Some(" ".to_string()),
            labels: Some("  ".to_string()),
            ..raw_with_credentials()
        };
        let config = AppConfig::try_from(raw).unwrap();
        assert_eq!(config.overlay.branch.as_deref(), Some(" "));
        assert_eq!(config.overlay.labels.as_deref(), Some("  "));
        assert_eq!(config.overlay.extra_labels(), vec![""]);
    }

    #[test]
    fn test_endpoint_derived_from_domain() {
        let config = AppConfig::try_from(raw_with_credentials()).unwrap();
        assert_eq!(
            config.spacelift.endpoint(),
            "https://acme.app.spacelift.io/graphql"
        );
    }

    #[test]
    fn test_explicit_endpoint_wins() {
        let raw = RawConfig {
            endpoint: Some("http://127.0.0.1:8080/graphql".to_string()),
            ..raw_with_credentials()
        };
        let config = AppConfig::try_from(raw).unwrap();
        assert_eq!(config.spacelift.endpoint(), "http://127.0.0.1:8080/graphql");
    }

    #[test]
    fn test_zero_concurrency_rejected() {
        let raw = RawConfig {
            max_concurrency: Some(0),
            ..raw_with_credentials()
        };
        assert!(AppConfig::try_from(raw).is_err());
    }

    #[test]
    fn test_oversized_concurrency_rejected() {
        let raw = RawConfig {
            max_concurrency: Some(usize::MAX),
            ..raw_with_credentials()
        };
        let err = AppConfig::try_from(raw).unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
        assert!(err.to_string().contains("must not exceed"));

        assert_eq!(
            validate_max_concurrency(Semaphore::MAX_PERMITS).unwrap(),
            Semaphore::MAX_PERMITS
        );
        assert!(validate_max_concurrency(Semaphore::MAX_PERMITS + 1).is_err());
    }

    #[test]
    fn test_debug_redacts_secret() {
        let config = AppConfig::try_from(raw_with_credentials()).unwrap();
        let rendered = format!("{:?}", config.spacelift);
        assert!(!rendered.contains("s3cr3t"));
        assert!(rendered.contains("[REDACTED]"));
    }

    #[test]
    fn test_load_from_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("stackbulk.toml");
        std::fs::write(
            &path,
            r#"
domain = "acme"
api_key_id = "01HKEY"
api_key_secret = "s3cr3t"
labels = "team:infra, tier:1"
max_concurrency = 4
request_timeout_secs = 10
"#,
        )
        .unwrap();

        let config = AppConfig::load(path.to_str()).unwrap();
        assert_eq!(config.spacelift.domain, "acme");
        assert_eq!(config.api_key_secret(), "s3cr3t");
        assert_eq!(config.overlay.labels.as_deref(), Some("team:infra, tier:1"));
        assert_eq!(config.execution.max_concurrency, Some(4));
        assert_eq!(config.execution.request_timeout_secs, 10);
    }
}
