use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::PathBuf;

/// Main configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub eval: EvalConfig,
    /// Per-dataset channel normalization constants. Kept as an explicit
    /// lookup table rather than process-wide globals; callers that prepare
    /// images for the upstream embedding model read them from here.
    #[serde(default = "default_datasets")]
    pub datasets: HashMap<String, DatasetStats>,
}

/// Evaluation configuration
#[derive(Debug, Clone, Deserialize)]
pub struct EvalConfig {
    /// Rank values to evaluate, e.g. [1, 2, 4, 8] for the standard
    /// metric-learning benchmarks.
    #[serde(default = "default_ranks")]
    pub ranks: Vec<usize>,
    /// Optional pass/fail threshold on recall at the first configured rank.
    #[serde(default)]
    pub min_recall: Option<f32>,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            ranks: default_ranks(),
            min_recall: None,
        }
    }
}

/// RGB mean/std for one dataset, used to normalize images before the
/// embedding model runs.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DatasetStats {
    pub mean: [f32; 3],
    pub std: [f32; 3],
}

fn default_ranks() -> Vec<usize> {
    vec![1, 2, 4, 8]
}

fn default_datasets() -> HashMap<String, DatasetStats> {
    [
        (
            "car",
            DatasetStats {
                mean: [0.4853, 0.4965, 0.4295],
                std: [0.2237, 0.2193, 0.2568],
            },
        ),
        (
            "cub",
            DatasetStats {
                mean: [0.4707, 0.4601, 0.4549],
                std: [0.2767, 0.2760, 0.2850],
            },
        ),
        (
            "sop",
            DatasetStats {
                mean: [0.5807, 0.5396, 0.5044],
                std: [0.2901, 0.2974, 0.3095],
            },
        ),
        (
            "isc",
            DatasetStats {
                mean: [0.8324, 0.8109, 0.8041],
                std: [0.2206, 0.2378, 0.2444],
            },
        ),
    ]
    .into_iter()
    .map(|(name, stats)| (name.to_string(), stats))
    .collect()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            eval: EvalConfig::default(),
            datasets: default_datasets(),
        }
    }
}

impl Config {
    /// Load configuration from file
    ///
    /// Loads environment variables from .env file (if present) before loading config.
    /// Looks for config file in this order:
    /// 1. Path specified in EMBEVAL_CONFIG environment variable
    /// 2. ./config.toml in current directory
    pub fn load() -> Result<Self> {
        // Load .env file if it exists (ignore errors - file is optional)
        let _ = dotenv::dotenv();

        let config_path = std::env::var("EMBEVAL_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("config.toml"));

        let config_str = std::fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;

        let config: Config =
            toml::from_str(&config_str).context("Failed to parse config.toml")?;

        config.validate()?;

        Ok(config)
    }

    /// Load configuration, falling back to defaults when no config file is
    /// present. An explicit EMBEVAL_CONFIG path must still exist.
    pub fn load_or_default() -> Result<Self> {
        let _ = dotenv::dotenv();

        if std::env::var("EMBEVAL_CONFIG").is_err()
            && !std::path::Path::new("config.toml").exists()
        {
            return Ok(Config::default());
        }
        Self::load()
    }

    /// Validate configuration values
    fn validate(&self) -> Result<()> {
        if self.eval.ranks.is_empty() {
            anyhow::bail!("eval.ranks must not be empty");
        }

        if self.eval.ranks.iter().any(|&r| r == 0) {
            anyhow::bail!("eval.ranks values must be greater than 0");
        }

        if let Some(threshold) = self.eval.min_recall {
            if !(0.0..=1.0).contains(&threshold) {
                anyhow::bail!("eval.min_recall must be between 0.0 and 1.0");
            }
        }

        for (name, stats) in &self.datasets {
            if stats.std.iter().any(|&s| s <= 0.0) {
                anyhow::bail!("datasets.{}.std channels must be positive", name);
            }
        }

        Ok(())
    }

    /// Normalization constants for a dataset, if configured.
    pub fn dataset_stats(&self, name: &str) -> Option<&DatasetStats> {
        self.datasets.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::sync::Mutex;
    use tempfile::TempDir;

    /// Serialize config tests that mutate process-wide env so they don't race.
    static CONFIG_TEST_LOCK: Mutex<()> = Mutex::new(());

    fn with_config_env(config_path: Option<&std::path::Path>, f: impl FnOnce()) {
        let original = std::env::var("EMBEVAL_CONFIG").ok();
        match config_path {
            Some(p) => std::env::set_var("EMBEVAL_CONFIG", p.to_str().unwrap()),
            None => std::env::remove_var("EMBEVAL_CONFIG"),
        }
        f();
        std::env::remove_var("EMBEVAL_CONFIG");
        if let Some(val) = original {
            std::env::set_var("EMBEVAL_CONFIG", val);
        }
    }

    #[test]
    fn test_config_load_success() {
        let _lock = CONFIG_TEST_LOCK.lock().unwrap();
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        fs::write(
            &config_path,
            r#"
[eval]
ranks = [1, 10, 100]
min_recall = 0.8

[datasets.cub]
mean = [0.4707, 0.4601, 0.4549]
std = [0.2767, 0.2760, 0.2850]
"#,
        )
        .unwrap();
        with_config_env(Some(&config_path), || {
            let config = Config::load();
            assert!(config.is_ok(), "Config::load() failed: {:?}", config.err());
            let config = config.unwrap();
            assert_eq!(config.eval.ranks, vec![1, 10, 100]);
            assert_eq!(config.eval.min_recall, Some(0.8));
            assert!(config.dataset_stats("cub").is_some());
        });
    }

    #[test]
    fn test_config_defaults() {
        let config = Config::default();
        assert_eq!(config.eval.ranks, vec![1, 2, 4, 8]);
        assert_eq!(config.eval.min_recall, None);
        // Standard benchmark tables ship by default
        for name in ["car", "cub", "sop", "isc"] {
            assert!(config.dataset_stats(name).is_some(), "missing {}", name);
        }
        assert!(config.dataset_stats("unknown").is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_rejects_empty_ranks() {
        let _lock = CONFIG_TEST_LOCK.lock().unwrap();
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        fs::write(&config_path, "[eval]\nranks = []\n").unwrap();
        with_config_env(Some(&config_path), || {
            let config = Config::load();
            assert!(config.is_err());
            assert!(config.unwrap_err().to_string().contains("ranks"));
        });
    }

    #[test]
    fn test_config_rejects_zero_rank() {
        let _lock = CONFIG_TEST_LOCK.lock().unwrap();
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        fs::write(&config_path, "[eval]\nranks = [1, 0]\n").unwrap();
        with_config_env(Some(&config_path), || {
            assert!(Config::load().is_err());
        });
    }

    #[test]
    fn test_config_rejects_bad_threshold() {
        let _lock = CONFIG_TEST_LOCK.lock().unwrap();
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        fs::write(&config_path, "[eval]\nmin_recall = 1.5\n").unwrap();
        with_config_env(Some(&config_path), || {
            assert!(Config::load().is_err());
        });
    }

    #[test]
    fn test_config_invalid_path() {
        let _lock = CONFIG_TEST_LOCK.lock().unwrap();
        with_config_env(Some(std::path::Path::new("nonexistent.toml")), || {
            assert!(Config::load().is_err());
        });
    }
}
