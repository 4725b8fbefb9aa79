//! (language, mode) → [`Scanner`] lookup.
//!
//! The registry applies exactly one policy: `max` (deep) mode is optional per
//! language, and a `max` request for a language without a `max` scanner
//! resolves to that language's `lite` scanner. The fallback is one level deep
//! and never crosses languages.
//!
//! Registration is a setup-time operation (`&mut self`); resolution takes
//! `&self`, so a fully built registry can be shared across threads and
//! resolved from concurrently.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::config::Config;
use crate::process::{CommandRunner, SystemRunner};
use crate::scanners::build_aware::BuildAwareEngine;
use crate::scanners::chain::ChainScanner;
use crate::scanners::lite::LightweightEngine;
use crate::scanners::Scanner;

/// Source language of a scan request.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    serde::Serialize,
    serde::Deserialize,
    clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Cpp,
    Java,
    Python,
    #[value(name = "javascript")]
    JavaScript,
    Go,
    Php,
    #[value(name = "csharp")]
    CSharp,
    Swift,
    Ruby,
    Rust,
    Html,
    #[value(name = "objectivec")]
    ObjectiveC,
    #[value(name = "ocaml")]
    OCaml,
    Kotlin,
    Scala,
    Solidity,
    Cobol,
    Shell,
    Sql,
    Fortran,
    Dart,
    Groovy,
    Lua,
    Secrets,
    #[value(name = "iac")]
    IaC,
}

impl Language {
    pub const ALL: [Language; 25] = [
        Language::Cpp,
        Language::Java,
        Language::Python,
        Language::JavaScript,
        Language::Go,
        Language::Php,
        Language::CSharp,
        Language::Swift,
        Language::Ruby,
        Language::Rust,
        Language::Html,
        Language::ObjectiveC,
        Language::OCaml,
        Language::Kotlin,
        Language::Scala,
        Language::Solidity,
        Language::Cobol,
        Language::Shell,
        Language::Sql,
        Language::Fortran,
        Language::Dart,
        Language::Groovy,
        Language::Lua,
        Language::Secrets,
        Language::IaC,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Language::Cpp => "cpp",
            Language::Java => "java",
            Language::Python => "python",
            Language::JavaScript => "javascript",
            Language::Go => "go",
            Language::Php => "php",
            Language::CSharp => "csharp",
            Language::Swift => "swift",
            Language::Ruby => "ruby",
            Language::Rust => "rust",
            Language::Html => "html",
            Language::ObjectiveC => "objectivec",
            Language::OCaml => "ocaml",
            Language::Kotlin => "kotlin",
            Language::Scala => "scala",
            Language::Solidity => "solidity",
            Language::Cobol => "cobol",
            Language::Shell => "shell",
            Language::Sql => "sql",
            Language::Fortran => "fortran",
            Language::Dart => "dart",
            Language::Groovy => "groovy",
            Language::Lua => "lua",
            Language::Secrets => "secrets",
            Language::IaC => "iac",
        }
    }

    /// Rule-pack key handed to scanners as their opaque rule selector.
    pub fn rule(self) -> &'static str {
        self.as_str()
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Language::ALL
            .iter()
            .copied()
            .find(|l| l.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown language: {s}"))
    }
}

/// Requested scanning depth.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    serde::Serialize,
    serde::Deserialize,
    clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Fast, build-free analysis.
    Lite,
    /// Build the project, then run deep analysis.
    #[serde(alias = "deep")]
    #[value(alias = "deep")]
    Max,
}

impl Mode {
    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Lite => "lite",
            Mode::Max => "max",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Two-level map from language and mode to a scanner.
#[derive(Default)]
pub struct ScannerRegistry {
    scanners: HashMap<Language, HashMap<Mode, Arc<dyn Scanner>>>,
}

impl ScannerRegistry {
    pub fn new() -> Self {
        ScannerRegistry::default()
    }

    /// Inserts or replaces the scanner for exactly (`language`, `mode`).
    pub fn register(&mut self, language: Language, mode: Mode, scanner: Arc<dyn Scanner>) {
        self.scanners.entry(language).or_default().insert(mode, scanner);
    }

    /// Looks up the scanner for (`language`, `mode`), falling back from
    /// `max` to `lite` within the same language.
    pub fn resolve(&self, language: Language, mode: Mode) -> Option<Arc<dyn Scanner>> {
        let modes = self.scanners.get(&language)?;
        match modes.get(&mode) {
            Some(scanner) => Some(Arc::clone(scanner)),
            None if mode == Mode::Max => modes.get(&Mode::Lite).cloned(),
            None => None,
        }
    }

    /// Every registered pair, sorted by language then mode.
    pub fn entries(&self) -> Vec<(Language, Mode, Arc<dyn Scanner>)> {
        let mut entries: Vec<_> = self
            .scanners
            .iter()
            .flat_map(|(language, modes)| {
                modes
                    .iter()
                    .map(move |(mode, scanner)| (*language, *mode, Arc::clone(scanner)))
            })
            .collect();
        entries.sort_by_key(|(language, mode, _)| (*language, *mode));
        entries
    }

    pub fn is_empty(&self) -> bool {
        self.scanners.is_empty()
    }
}

/// Builds the standard registry from configuration, running real processes.
pub fn default_registry(config: &Config) -> ScannerRegistry {
    default_registry_with_runner(config, Arc::new(SystemRunner))
}

/// Builds the standard registry with an injected process runner.
///
/// Every `lite.languages` entry gets a [`LightweightEngine`] for `lite`.
/// Every `deep.languages` entry gets a [`BuildAwareEngine`] for `max`,
/// chained in front of the lightweight engine when `deep.fallback_to_lite`
/// is set and the language has one.
pub fn default_registry_with_runner(
    config: &Config,
    runner: Arc<dyn CommandRunner>,
) -> ScannerRegistry {
    let mut registry = ScannerRegistry::new();

    let lite: Arc<dyn Scanner> = Arc::new(LightweightEngine::new(
        config.lite.clone(),
        Arc::clone(&runner),
    ));
    for &language in &config.lite.languages {
        registry.register(language, Mode::Lite, Arc::clone(&lite));
    }

    let deep: Arc<dyn Scanner> = Arc::new(BuildAwareEngine::new(
        config.deep.clone(),
        config.build.clone(),
        runner,
    ));
    for &language in &config.deep.languages {
        let has_lite = config.lite.languages.contains(&language);
        let scanner = if config.deep.fallback_to_lite && has_lite {
            Arc::new(ChainScanner::new(vec![Arc::clone(&deep), Arc::clone(&lite)]))
                as Arc<dyn Scanner>
        } else {
            Arc::clone(&deep)
        };
        registry.register(language, Mode::Max, scanner);
    }

    registry
}
