use crate::error::{GecError, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const LOCAL_CONFIG: &str = ".gecmark.toml";

/// Immutable settings shared by the dispatcher, the spell checkers and the
/// reconciler. Built once at startup, then only read.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub pool: PoolConfig,
    pub gibberish: GibberishConfig,
    pub spelling: SpellingConfig,
    pub engine: EngineConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    pub workers: usize,
    pub queue_capacity: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            workers: 1,
            queue_capacity: 250,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GibberishConfig {
    pub enabled: bool,
    pub clean_threshold: f32,
    pub mild_threshold: f32,
    pub noise_threshold: f32,
    pub salad_threshold: f32,
    pub single_letter_ratio: f64,
    pub max_batch: usize,
}

impl Default for GibberishConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            clean_threshold: 0.5,
            mild_threshold: 0.5,
            noise_threshold: 0.5,
            salad_threshold: 0.5,
            single_letter_ratio: 6.0,
            max_batch: 32,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpellingConfig {
    pub enabled: bool,
    pub language: String,
    pub personal_dictionary: Option<PathBuf>,
    pub custom_words: Option<PathBuf>,
    pub profanity_lists: Vec<PathBuf>,
    pub max_suggestions: usize,
    pub ignore_patterns: Vec<String>,
    pub ignore_collisions: bool,
}

impl Default for SpellingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            language: "en_US".to_string(),
            personal_dictionary: None,
            custom_words: None,
            profanity_lists: Vec::new(),
            max_suggestions: 5,
            ignore_patterns: vec![
                r"^[A-Z0-9_]{2,}$".to_string(),  // ALL_CAPS
                r"^https?://\S+".to_string(),    // URLs
                r"^[a-fA-F0-9]{32,}$".to_string(), // Hashes
            ],
            ignore_collisions: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub url: Option<String>,
    pub timeout_secs: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            url: None,
            timeout_secs: 30,
        }
    }
}

impl Config {
    /// Load configuration with priority: local config > global config > defaults.
    /// CLI flags are applied by the caller on the returned value.
    pub fn load(local: Option<&Path>) -> Result<Self> {
        let mut layers = Vec::new();
        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                layers.push(global_path);
            }
        }

        let local_path = local
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(LOCAL_CONFIG));
        if local_path.exists() {
            layers.push(local_path);
        }

        let mut config = Self::from_layers(&layers)?;
        if config.spelling.personal_dictionary.is_none() {
            config.spelling.personal_dictionary = Self::default_personal_dict_path();
        }

        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        Self::from_layers(&[path])
    }

    /// Stacks TOML files in order. A later file overrides only the keys it
    /// sets; everything else keeps the earlier value or the default.
    pub fn from_layers<P: AsRef<Path>>(paths: &[P]) -> Result<Self> {
        let mut merged = toml::Value::Table(toml::Table::new());
        for path in paths {
            merge_values(&mut merged, read_layer(path.as_ref())?);
        }
        merged
            .try_into()
            .map_err(|e| GecError::Config(format!("invalid configuration: {}", e)))
    }

    pub fn validate(&self) -> Result<()> {
        if self.pool.workers == 0 {
            return Err(GecError::Config("pool.workers must be at least 1".into()));
        }
        if self.pool.queue_capacity == 0 {
            return Err(GecError::Config("pool.queue_capacity must be at least 1".into()));
        }
        if self.gibberish.max_batch == 0 {
            return Err(GecError::Config("gibberish.max_batch must be at least 1".into()));
        }
        let g = &self.gibberish;
        let finite = [g.clean_threshold, g.mild_threshold, g.noise_threshold, g.salad_threshold]
            .iter()
            .all(|t| t.is_finite())
            && g.single_letter_ratio.is_finite();
        if !finite {
            return Err(GecError::Config("gibberish thresholds must be finite".into()));
        }
        Ok(())
    }

    pub fn global_config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "gecmark").map(|dirs| dirs.config_dir().join("config.toml"))
    }

    pub fn default_personal_dict_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "gecmark").map(|dirs| dirs.config_dir().join("personal.txt"))
    }

    pub fn data_dir() -> Option<PathBuf> {
        ProjectDirs::from("", "", "gecmark").map(|dirs| dirs.data_dir().to_path_buf())
    }
}

fn read_layer(path: &Path) -> Result<toml::Value> {
    let contents = fs::read_to_string(path)?;
    toml::from_str(&contents).map_err(|e| {
        GecError::Config(format!("failed to parse {}: {}", path.display(), e))
    })
}

/// Tables merge key by key; any other value is replaced outright.
fn merge_values(base: &mut toml::Value, overlay: toml::Value) {
    match (base, overlay) {
        (toml::Value::Table(base), toml::Value::Table(overlay)) => {
            for (key, value) in overlay {
                match base.get_mut(&key) {
                    Some(existing) => merge_values(existing, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.pool.workers, 1);
        assert_eq!(config.pool.queue_capacity, 250);
        assert_eq!(config.gibberish.single_letter_ratio, 6.0);
        assert!(!config.spelling.ignore_collisions);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_local_layer_overrides_only_its_keys() {
        let dir = tempdir().unwrap();
        let global = dir.path().join("global.toml");
        let local = dir.path().join("local.toml");
        fs::write(
            &global,
            "[spelling]\nenabled = false\nignore_collisions = true\nlanguage = \"en_GB\"\n\n\
             [gibberish]\nmax_batch = 8\n\n[pool]\nworkers = 4\n",
        )
        .unwrap();
        fs::write(
            &local,
            "[gibberish]\nnoise_threshold = 0.9\n\n[pool]\nworkers = 2\n",
        )
        .unwrap();

        let config = Config::from_layers(&[&global, &local]).unwrap();
        assert!(config.spelling.ignore_collisions);
        assert!(!config.spelling.enabled);
        assert_eq!(config.spelling.language, "en_GB");
        assert_eq!(config.gibberish.max_batch, 8);
        assert_eq!(config.gibberish.noise_threshold, 0.9);
        assert_eq!(config.gibberish.clean_threshold, 0.5);
        assert_eq!(config.pool.workers, 2);
        assert_eq!(config.pool.queue_capacity, 250);
    }

    #[test]
    fn test_no_layers_is_default() {
        let config = Config::from_layers::<&Path>(&[]).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_wrong_value_type_is_config_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[pool]\nworkers = \"many\"\n").unwrap();
        assert!(matches!(Config::from_file(&path), Err(GecError::Config(_))));
    }

    #[test]
    fn test_partial_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "[pool]\nqueue_capacity = 8\n\n[gibberish]\nenabled = false\n",
        )
        .unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.pool.queue_capacity, 8);
        assert_eq!(config.pool.workers, 1);
        assert!(!config.gibberish.enabled);
        assert_eq!(config.gibberish.max_batch, 32);
    }

    #[test]
    fn test_load_local_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(LOCAL_CONFIG);
        fs::write(&path, "[engine]\nurl = \"http://localhost:9000\"\n").unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.engine.url.as_deref(), Some("http://localhost:9000"));
    }

    #[test]
    fn test_invalid_pool_rejected() {
        let mut config = Config::default();
        config.pool.workers = 0;
        assert!(matches!(config.validate(), Err(GecError::Config(_))));
    }

    #[test]
    fn test_bad_toml_is_config_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        fs::write(&path, "[pool\nworkers = ").unwrap();
        assert!(matches!(Config::from_file(&path), Err(GecError::Config(_))));
    }
}
