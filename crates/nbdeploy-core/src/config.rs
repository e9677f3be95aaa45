//! Run configuration: defaults, then environment, then CLI flags.

use std::fmt;
use std::path::PathBuf;

use crate::errors::{NbDeployError, NbResult};
use crate::grouping::{CodeStringMode, ProposerKind};

pub const DEFAULT_DESTINATION: &str = "src";
pub const DEFAULT_MODEL: &str = "gpt-4-turbo-preview";
pub const DEFAULT_SEED: i64 = 123;
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

#[derive(Clone, PartialEq, Eq)]
pub struct DeployConfig {
    pub destination: PathBuf,
    pub model: String,
    pub seed: i64,
    pub code_mode: CodeStringMode,
    pub proposer: ProposerKind,
    pub api_key: Option<String>,
    pub base_url: String,
    /// Where to dump the accepted-shape grouping before verification.
    pub save_grouping: Option<PathBuf>,
}

impl Default for DeployConfig {
    fn default() -> Self {
        Self {
            destination: PathBuf::from(DEFAULT_DESTINATION),
            model: DEFAULT_MODEL.to_string(),
            seed: DEFAULT_SEED,
            code_mode: CodeStringMode::default(),
            proposer: ProposerKind::default(),
            api_key: None,
            base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            save_grouping: None,
        }
    }
}

impl fmt::Debug for DeployConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeployConfig")
            .field("destination", &self.destination)
            .field("model", &self.model)
            .field("seed", &self.seed)
            .field("code_mode", &self.code_mode)
            .field("proposer", &self.proposer)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("save_grouping", &self.save_grouping)
            .finish()
    }
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl DeployConfig {
    /// Defaults overlaid with `OPENAI_*` and `NBDEPLOY_*` environment variables.
    pub fn from_env() -> NbResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an injectable variable source.
    pub fn from_lookup<F>(lookup: F) -> NbResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        config.api_key = non_empty(lookup("OPENAI_API_KEY"));
        if let Some(url) = non_empty(lookup("OPENAI_BASE_URL")) {
            config.base_url = url;
        }
        if let Some(model) = non_empty(lookup("NBDEPLOY_MODEL")) {
            config.model = model;
        }
        if let Some(seed) = non_empty(lookup("NBDEPLOY_SEED")) {
            config.seed = seed.trim().parse().map_err(|_| {
                NbDeployError::Config(format!("NBDEPLOY_SEED must be an integer, got '{seed}'"))
            })?;
        }
        if let Some(destination) = non_empty(lookup("NBDEPLOY_DESTINATION")) {
            config.destination = PathBuf::from(destination);
        }
        if lookup("NBDEPLOY_FULL_CODE_STRING").is_some_and(|v| is_truthy(&v)) {
            config.code_mode = CodeStringMode::FullSource;
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_without_environment() {
        let config = DeployConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config, DeployConfig::default());
        assert_eq!(config.destination, PathBuf::from("src"));
        assert_eq!(config.model, "gpt-4-turbo-preview");
        assert_eq!(config.seed, 123);
        assert_eq!(config.code_mode, CodeStringMode::Reconstructed);
    }

    #[test]
    fn environment_overrides() {
        let config = DeployConfig::from_lookup(lookup_from(&[
            ("OPENAI_API_KEY", "sk-abc"),
            ("OPENAI_BASE_URL", "http://localhost:8080/v1"),
            ("NBDEPLOY_MODEL", "gpt-4o"),
            ("NBDEPLOY_SEED", " 42 "),
            ("NBDEPLOY_DESTINATION", "out/pkg"),
            ("NBDEPLOY_FULL_CODE_STRING", "yes"),
        ]))
        .unwrap();
        assert_eq!(config.api_key.as_deref(), Some("sk-abc"));
        assert_eq!(config.base_url, "http://localhost:8080/v1");
        assert_eq!(config.model, "gpt-4o");
        assert_eq!(config.seed, 42);
        assert_eq!(config.destination, PathBuf::from("out/pkg"));
        assert_eq!(config.code_mode, CodeStringMode::FullSource);
    }

    #[test]
    fn bad_seed_is_config_error() {
        let err = DeployConfig::from_lookup(lookup_from(&[("NBDEPLOY_SEED", "abc")])).unwrap_err();
        assert!(matches!(err, NbDeployError::Config(_)));
    }

    #[test]
    fn falsy_flag_keeps_reconstructed_mode() {
        let config =
            DeployConfig::from_lookup(lookup_from(&[("NBDEPLOY_FULL_CODE_STRING", "off")])).unwrap();
        assert_eq!(config.code_mode, CodeStringMode::Reconstructed);
    }

    #[test]
    fn debug_redacts_api_key() {
        let config = DeployConfig {
            api_key: Some("sk-secret".into()),
            ..DeployConfig::default()
        };
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("sk-secret"));
        assert!(rendered.contains("<redacted>"));
    }
}
