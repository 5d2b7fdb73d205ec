use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use chipdeck_engine::session::DEFAULT_AUTOSAVE_DEBOUNCE_MS;

pub const CONFIG_ENV: &str = "CHIPDECK_CONFIG";
pub const SAVE_ENV: &str = "CHIPDECK_SAVE";
pub const SEED_ENV: &str = "CHIPDECK_SEED";
pub const AUTOSAVE_ENV: &str = "CHIPDECK_AUTOSAVE_MS";
pub const JOURNAL_ENV: &str = "CHIPDECK_JOURNAL";

pub const DEFAULT_SAVE_PATH: &str = "chipdeck-save.json";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    pub save_path: PathBuf,
    pub seed: Option<u64>,
    pub autosave_debounce_ms: u64,
    pub journal_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueSource {
    Default,
    File,
    Env,
    Flag,
}

#[derive(Debug, Clone, Copy)]
pub struct ConfigSources {
    pub save_path: ValueSource,
    pub seed: ValueSource,
    pub autosave_debounce_ms: ValueSource,
    pub journal_path: ValueSource,
}

impl Default for ConfigSources {
    fn default() -> Self {
        Self {
            save_path: ValueSource::Default,
            seed: ValueSource::Default,
            autosave_debounce_ms: ValueSource::Default,
            journal_path: ValueSource::Default,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ConfigResolved {
    pub config: Config,
    pub sources: ConfigSources,
}

impl ConfigResolved {
    /// Command-line flags win over every other layer.
    pub fn apply_flags(&mut self, save: Option<PathBuf>, seed: Option<u64>) -> Result<(), ConfigError> {
        if let Some(path) = save {
            self.config.save_path = path;
            self.sources.save_path = ValueSource::Flag;
        }
        if let Some(seed) = seed {
            self.config.seed = Some(seed);
            self.sources.seed = ValueSource::Flag;
        }
        validate(&self.config)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            save_path: PathBuf::from(DEFAULT_SAVE_PATH),
            seed: None,
            autosave_debounce_ms: DEFAULT_AUTOSAVE_DEBOUNCE_MS,
            journal_path: None,
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Invalid(String),
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}
impl From<toml::de::Error> for ConfigError {
    fn from(e: toml::de::Error) -> Self {
        ConfigError::Parse(e)
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "cannot read config file: {}", e),
            ConfigError::Parse(e) => write!(f, "cannot parse config file: {}", e),
            ConfigError::Invalid(msg) => write!(f, "{}", msg),
        }
    }
}

/// Environment lookup used while resolving configuration. The binary passes
/// [`process_env`]; tests pass a closure over a fixed map.
pub type EnvLookup<'a> = &'a dyn Fn(&str) -> Option<String>;

pub fn process_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Resolves defaults, then the TOML file named by `CHIPDECK_CONFIG`, then
/// the `CHIPDECK_*` variables, recording where every value came from.
pub fn load_with_sources(env: EnvLookup<'_>) -> Result<ConfigResolved, ConfigError> {
    let mut cfg = Config::default();
    let mut sources = ConfigSources::default();

    if let Some(path) = non_empty(env, CONFIG_ENV) {
        let s = fs::read_to_string(path)?;
        let f: FileConfig = toml::from_str(&s)?;
        if let Some(v) = f.save_path {
            cfg.save_path = v;
            sources.save_path = ValueSource::File;
        }
        if let Some(v) = f.seed {
            cfg.seed = Some(v);
            sources.seed = ValueSource::File;
        }
        if let Some(v) = f.autosave_debounce_ms {
            cfg.autosave_debounce_ms = v;
            sources.autosave_debounce_ms = ValueSource::File;
        }
        if let Some(v) = f.journal_path {
            cfg.journal_path = Some(v);
            sources.journal_path = ValueSource::File;
        }
    }

    if let Some(path) = non_empty(env, SAVE_ENV) {
        cfg.save_path = PathBuf::from(path);
        sources.save_path = ValueSource::Env;
    }
    if let Some(seed) = non_empty(env, SEED_ENV) {
        cfg.seed = Some(
            seed.parse()
                .map_err(|_| ConfigError::Invalid(format!("Invalid seed: {}", seed)))?,
        );
        sources.seed = ValueSource::Env;
    }
    if let Some(ms) = non_empty(env, AUTOSAVE_ENV) {
        cfg.autosave_debounce_ms = ms
            .parse()
            .map_err(|_| ConfigError::Invalid(format!("Invalid autosave delay: {}", ms)))?;
        sources.autosave_debounce_ms = ValueSource::Env;
    }
    if let Some(path) = non_empty(env, JOURNAL_ENV) {
        cfg.journal_path = Some(PathBuf::from(path));
        sources.journal_path = ValueSource::Env;
    }

    validate(&cfg)?;
    Ok(ConfigResolved {
        config: cfg,
        sources,
    })
}

fn non_empty(env: EnvLookup<'_>, key: &str) -> Option<String> {
    env(key).filter(|v| !v.is_empty())
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    #[serde(default)]
    save_path: Option<PathBuf>,
    #[serde(default)]
    seed: Option<u64>,
    #[serde(default)]
    autosave_debounce_ms: Option<u64>,
    #[serde(default)]
    journal_path: Option<PathBuf>,
}

fn validate(cfg: &Config) -> Result<(), ConfigError> {
    if cfg.autosave_debounce_ms == 0 {
        return Err(ConfigError::Invalid(
            "Invalid configuration: autosave_debounce_ms must be >0".into(),
        ));
    }
    if cfg.save_path.as_os_str().is_empty() {
        return Err(ConfigError::Invalid(
            "Invalid configuration: save_path must not be empty".into(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> + use<> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_without_any_source() {
        let env = env_of(&[]);
        let resolved = load_with_sources(&env).unwrap();
        assert_eq!(resolved.config, Config::default());
        assert_eq!(resolved.sources.save_path, ValueSource::Default);
        assert_eq!(resolved.config.autosave_debounce_ms, 500);
    }

    #[test]
    fn env_overrides_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("chipdeck.toml");
        fs::write(
            &file,
            "save_path = \"from-file.json\"\nseed = 3\nautosave_debounce_ms = 900\n",
        )
        .unwrap();
        let env = env_of(&[
            (CONFIG_ENV, file.to_str().unwrap()),
            (SEED_ENV, "77"),
        ]);
        let resolved = load_with_sources(&env).unwrap();
        assert_eq!(resolved.config.save_path, PathBuf::from("from-file.json"));
        assert_eq!(resolved.sources.save_path, ValueSource::File);
        assert_eq!(resolved.config.seed, Some(77));
        assert_eq!(resolved.sources.seed, ValueSource::Env);
        assert_eq!(resolved.config.autosave_debounce_ms, 900);
        assert_eq!(resolved.sources.autosave_debounce_ms, ValueSource::File);
    }

    #[test]
    fn flags_override_env() {
        let env = env_of(&[(SAVE_ENV, "env.json")]);
        let mut resolved = load_with_sources(&env).unwrap();
        resolved
            .apply_flags(Some(PathBuf::from("flag.json")), Some(5))
            .unwrap();
        assert_eq!(resolved.config.save_path, PathBuf::from("flag.json"));
        assert_eq!(resolved.sources.save_path, ValueSource::Flag);
        assert_eq!(resolved.sources.seed, ValueSource::Flag);
    }

    #[test]
    fn rejects_zero_debounce() {
        let env = env_of(&[(AUTOSAVE_ENV, "0")]);
        let err = load_with_sources(&env).unwrap_err();
        assert!(err.to_string().contains("autosave_debounce_ms"));
    }

    #[test]
    fn rejects_bad_seed() {
        let env = env_of(&[(SEED_ENV, "not-a-number")]);
        assert!(matches!(
            load_with_sources(&env),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn empty_env_values_are_ignored() {
        let env = env_of(&[(SAVE_ENV, ""), (SEED_ENV, "")]);
        let resolved = load_with_sources(&env).unwrap();
        assert_eq!(resolved.sources.save_path, ValueSource::Default);
        assert_eq!(resolved.config.seed, None);
    }

    #[test]
    fn unknown_file_key_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("bad.toml");
        fs::write(&file, "starting_stack = 10\n").unwrap();
        let env = env_of(&[(CONFIG_ENV, file.to_str().unwrap())]);
        assert!(matches!(load_with_sources(&env), Err(ConfigError::Parse(_))));
    }
}
