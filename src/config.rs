//! Configuration loading.
//!
//! The default configuration file is `sast-dispatch.toml` in the current
//! working directory. Every field has a default, so the file can be omitted
//! entirely:
//!
//! ```toml
//! [deep]
//! root = "/app/assets/Canary"
//! languages = ["java"]
//! fallback_to_lite = true
//! timeout_secs = 1800
//!
//! [lite]
//! program = "semgrep"
//! rule_template = "p/{rule}"
//!
//! [build]
//! timeout_secs = 900
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::ConfigError;
use crate::registry::Language;

/// Default config file looked up in the current directory.
pub const DEFAULT_CONFIG_FILE: &str = "sast-dispatch.toml";

#[derive(Debug, Clone, Default, serde::Deserialize, serde::Serialize)]
#[serde(default)]
pub struct Config {
    /// Build-aware deep-analysis engine (`max` mode).
    pub deep: DeepConfig,
    /// Lightweight engine (`lite` mode).
    pub lite: LiteConfig,
    /// Project build step run before deep analysis.
    pub build: BuildConfig,
}

/// Settings for [`BuildAwareEngine`](crate::scanners::build_aware::BuildAwareEngine).
#[derive(Debug, Clone, serde::Deserialize, serde::Serialize)]
#[serde(default)]
pub struct DeepConfig {
    /// Engine installation root, passed as the first positional argument.
    pub root: PathBuf,
    /// Launcher script, relative to `root`.
    pub launcher: String,
    /// Interpreter used to run the launcher.
    pub shell: String,
    /// Provenance tag stamped on results.
    pub prefix: String,
    /// Languages that get a `max` scanner.
    pub languages: Vec<Language>,
    /// Register `[deep, lite]` as a chain instead of `deep` alone.
    pub fallback_to_lite: bool,
    /// Deadline for the analysis binary; `0` disables it.
    pub timeout_secs: u64,
    /// Parent directory for per-scan scratch directories; system temp dir
    /// when unset.
    pub scratch_root: Option<PathBuf>,
}

/// Settings for [`LightweightEngine`](crate::scanners::lite::LightweightEngine).
#[derive(Debug, Clone, serde::Deserialize, serde::Serialize)]
#[serde(default)]
pub struct LiteConfig {
    /// semgrep-compatible binary.
    pub program: String,
    /// Provenance tag stamped on results.
    pub prefix: String,
    /// `--config` selector; `{rule}` is replaced with the request's rule key.
    pub rule_template: String,
    /// Languages that get a `lite` scanner.
    pub languages: Vec<Language>,
    /// Deadline for the binary; `0` disables it.
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Default, serde::Deserialize, serde::Serialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Deadline for `mvn` / `gradle`; `0` disables it.
    pub timeout_secs: u64,
}

impl Default for DeepConfig {
    fn default() -> Self {
        DeepConfig {
            root: PathBuf::from("/app/assets/Canary"),
            launcher: "corax_cmd.sh".to_string(),
            shell: "sh".to_string(),
            prefix: "corax".to_string(),
            languages: vec![Language::Java],
            fallback_to_lite: true,
            timeout_secs: 0,
            scratch_root: None,
        }
    }
}

impl Default for LiteConfig {
    fn default() -> Self {
        LiteConfig {
            program: "semgrep".to_string(),
            prefix: "semgrep".to_string(),
            rule_template: "p/{rule}".to_string(),
            languages: Language::ALL.to_vec(),
            timeout_secs: 0,
        }
    }
}

impl DeepConfig {
    pub fn timeout(&self) -> Option<Duration> {
        timeout(self.timeout_secs)
    }

    /// Full path of the launcher script.
    pub fn launcher_path(&self) -> PathBuf {
        self.root.join(&self.launcher)
    }
}

impl LiteConfig {
    pub fn timeout(&self) -> Option<Duration> {
        timeout(self.timeout_secs)
    }

    /// Expands [`rule_template`](LiteConfig::rule_template) for `rule`.
    pub fn rule_selector(&self, rule: &str) -> String {
        self.rule_template.replace("{rule}", rule)
    }
}

impl BuildConfig {
    pub fn timeout(&self) -> Option<Duration> {
        timeout(self.timeout_secs)
    }
}

fn timeout(secs: u64) -> Option<Duration> {
    (secs > 0).then(|| Duration::from_secs(secs))
}

impl Config {
    /// Loads configuration from a TOML file.
    ///
    /// Resolution order:
    /// 1. If `path` is `Some`, load from that file (error if missing).
    /// 2. If `path` is `None`, try `sast-dispatch.toml` in the current directory.
    /// 3. If that file does not exist either, return [`Config::default()`].
    pub fn load(path: Option<&Path>) -> Result<Config, ConfigError> {
        let config_path = match path {
            Some(p) if p.exists() => Some(p.to_path_buf()),
            Some(p) => return Err(ConfigError::NotFound(p.to_path_buf())),
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_FILE);
                default_path.exists().then(|| default_path.to_path_buf())
            }
        };

        match config_path {
            Some(path) => {
                let content = std::fs::read_to_string(&path).map_err(|source| {
                    ConfigError::Read {
                        path: path.clone(),
                        source,
                    }
                })?;
                toml::from_str(&content).map_err(|source| ConfigError::Parse { path, source })
            }
            None => Ok(Config::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_timeout_means_none() {
        assert_eq!(timeout(0), None);
        assert_eq!(timeout(5), Some(Duration::from_secs(5)));
    }

    #[test]
    fn rule_selector_substitutes_placeholder() {
        let lite = LiteConfig::default();
        assert_eq!(lite.rule_selector("java"), "p/java");

        let local = LiteConfig {
            rule_template: "/rules/{rule}.yaml".to_string(),
            ..LiteConfig::default()
        };
        assert_eq!(local.rule_selector("go"), "/rules/go.yaml");
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let config: Config = toml::from_str("[deep]\nlanguages = [\"java\", \"kotlin\"]\n").unwrap();
        assert_eq!(config.deep.languages, vec![Language::Java, Language::Kotlin]);
        assert_eq!(config.deep.prefix, "corax");
        assert!(config.deep.fallback_to_lite);
        assert_eq!(config.lite.program, "semgrep");
    }
}
