//! # sast-dispatch
//!
//! Dispatches static-analysis jobs to interchangeable scan engines, selected
//! by source language and scanning depth, and normalizes every engine's
//! output into one canonical vulnerability-report schema.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use std::path::PathBuf;
//! use sast_dispatch::config::Config;
//! use sast_dispatch::dispatch::{Dispatcher, ScanRequest};
//! use sast_dispatch::registry::{default_registry, Language, Mode};
//!
//! let config = Config::load(None).expect("failed to load config");
//! let dispatcher = Dispatcher::new(default_registry(&config));
//!
//! let request = ScanRequest {
//!     id: "task-42".to_string(),
//!     language: Language::Java,
//!     mode: Mode::Max,
//!     workspace: PathBuf::from("./my-project"),
//! };
//! match dispatcher.dispatch(&request) {
//!     Ok(result) => println!("{} findings from {}", result.results.len(), result.prefix),
//!     Err(e) => eprintln!("scan failed: {e}"),
//! }
//! ```
//!
//! ## Architecture
//!
//! 1. **[`registry`]** — (language, mode) → [`scanners::Scanner`], with
//!    `max` → `lite` fallback.
//! 2. **[`scanners`]** — the single-method `Scanner` trait, implemented by
//!    the build-aware deep engine, the lightweight engine, and the
//!    first-success [`scanners::chain::ChainScanner`].
//! 3. **[`sarif`]** — SARIF 2.1.0 normalization into the canonical model.
//! 4. **[`finding`]** — canonical data types ([`finding::ScanResult`],
//!    [`finding::ResultItem`]).
//! 5. **[`process`]** — the subprocess seam engines run tools through.
//! 6. **[`dispatch`]** — request → scanner → result.
//! 7. **[`output`]** — JSON, pretty text, or SARIF rendering.
//!
//! ## Engines
//!
//! | Engine | Mode | External tool |
//! |--------|------|---------------|
//! | build-aware (`corax`) | `max` | `mvn` / `gradle` + launcher script |
//! | lightweight (`semgrep`) | `lite` | [semgrep] |
//!
//! [semgrep]: https://semgrep.dev/

pub mod config;
pub mod dispatch;
pub mod error;
pub mod finding;
pub mod output;
pub mod process;
pub mod registry;
pub mod sarif;
pub mod scanners;
