use crate::S3Config;

/// Which backend holds fragment payload bytes.
///
/// Metadata always lives in memory; only the payload plane changes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum StoreConfig {
    /// Both planes in process memory
    #[default]
    Memory,

    /// Payload bytes in S3, metadata in memory
    S3(S3Config),
}

impl StoreConfig {
    /// Select a backend from environment-style lookups.
    ///
    /// `AWS_S3_BUCKET_NAME` switches the payload plane to S3; `AWS_REGION` and
    /// `AWS_S3_ENDPOINT_URL` refine it.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let Some(bucket) = non_empty("AWS_S3_BUCKET_NAME") else {
            return Self::Memory;
        };

        let mut s3 = S3Config::new(bucket);
        if let Some(region) = non_empty("AWS_REGION") {
            s3 = s3.with_region(region);
        }
        if let Some(endpoint) = non_empty("AWS_S3_ENDPOINT_URL") {
            s3 = s3.with_endpoint_url(endpoint);
        }
        Self::S3(s3)
    }

    /// Select a backend from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn name(&self) -> &'static str {
        match self {
            StoreConfig::Memory => "memory",
            StoreConfig::S3(_) => "s3",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn no_bucket_means_memory() {
        assert_eq!(StoreConfig::from_lookup(lookup(&[])), StoreConfig::Memory);
        assert_eq!(
            StoreConfig::from_lookup(lookup(&[("AWS_S3_BUCKET_NAME", "  ")])),
            StoreConfig::Memory
        );
    }

    #[test]
    fn bucket_selects_s3_with_overrides() {
        let config = StoreConfig::from_lookup(lookup(&[
            ("AWS_S3_BUCKET_NAME", "frags"),
            ("AWS_REGION", "ca-central-1"),
            ("AWS_S3_ENDPOINT_URL", "http://localhost:4566"),
        ]));

        assert_eq!(
            config,
            StoreConfig::S3(
                S3Config::new("frags")
                    .with_region("ca-central-1")
                    .with_endpoint_url("http://localhost:4566")
            )
        );
        assert_eq!(config.name(), "s3");
    }
}
