mod cli;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::Parser;
use cli::{Cli, Commands};
use colored::Colorize;
use sast_dispatch::config::Config;
use sast_dispatch::dispatch::{Dispatcher, ScanRequest};
use sast_dispatch::error::ScanError;
use sast_dispatch::finding::ScanResult;
use sast_dispatch::output;
use sast_dispatch::process::SystemRunner;
use sast_dispatch::registry::default_registry;
use sast_dispatch::sarif;
use sast_dispatch::scanners::build_aware::BuildAwareEngine;
use sast_dispatch::scanners::lite::LightweightEngine;
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Scan {
            workspace,
            language,
            mode,
            id,
            format,
            output: output_path,
            show_output,
            config: config_path,
        } => {
            let config = load_config(config_path.as_deref());
            let dispatcher = Dispatcher::new(default_registry(&config));

            let request = ScanRequest {
                id,
                language,
                mode,
                workspace,
            };

            let result = dispatcher.dispatch(&request).unwrap_or_else(|e| {
                eprintln!("Error: {e}");
                std::process::exit(exit_code(&e));
            });

            if show_output {
                eprint!("{}", result.output);
            }

            let formatted = output::format_result(&result, format);
            if let Some(out_path) = output_path {
                std::fs::write(&out_path, &formatted).unwrap_or_else(|e| {
                    eprintln!("Error writing output: {e}");
                    std::process::exit(2);
                });
                eprintln!("Output written to {}", out_path.display());
            } else {
                print!("{formatted}");
            }
        }

        Commands::ScanAll {
            path,
            language,
            mode,
            format,
            config: config_path,
        } => {
            let workspaces = find_workspaces(&path);
            if workspaces.is_empty() {
                eprintln!("Error: no workspace directories found in '{}'", path.display());
                std::process::exit(2);
            }

            let config = load_config(config_path.as_deref());
            let dispatcher = Dispatcher::new(default_registry(&config));

            let requests: Vec<ScanRequest> = workspaces
                .into_iter()
                .map(|workspace| ScanRequest {
                    id: workspace
                        .file_name()
                        .map(|n| n.to_string_lossy().to_string())
                        .unwrap_or_default(),
                    language,
                    mode,
                    workspace,
                })
                .collect();

            let mut failed = 0usize;
            for (request, outcome) in requests.iter().zip(dispatcher.dispatch_all(&requests)) {
                match outcome {
                    Ok(result) => print!("{}", output::format_result(&result, format)),
                    Err(e) => {
                        failed += 1;
                        eprintln!("{}: {} {e}", request.id, "error:".red().bold());
                    }
                }
            }

            if failed > 0 {
                eprintln!("{failed} of {} scans failed", requests.len());
                std::process::exit(1);
            }
        }

        Commands::Normalize {
            paths,
            id,
            prefix,
            format,
        } => {
            let mut merged = ScanResult::empty();
            for path in &paths {
                let parsed = if path.is_dir() {
                    sarif::parse_sarif_files(path)
                } else {
                    sarif::parse_sarif_file(path)
                };
                match parsed {
                    Ok(result) => merged.merge(result),
                    Err(e) => {
                        eprintln!("Error: {e}");
                        std::process::exit(1);
                    }
                }
            }
            merged.drop_unidentified();
            let result = merged.finalize(&id, &prefix, String::new());
            print!("{}", output::format_result(&result, format));
        }

        Commands::CheckTools {
            config: config_path,
        } => {
            let config = load_config(config_path.as_deref());

            println!("{}", "Engine Availability".bold().underline());
            println!();

            let lite = LightweightEngine::new(config.lite.clone(), Arc::new(SystemRunner));
            let deep = BuildAwareEngine::new(
                config.deep.clone(),
                config.build.clone(),
                Arc::new(SystemRunner),
            );
            print_availability(lite.prefix(), lite.is_available(), &config.lite.program);
            print_availability(
                deep.prefix(),
                deep.is_available(),
                &config.deep.launcher_path().display().to_string(),
            );

            println!();
            println!("{}", "Registered Scanners".bold().underline());
            println!();

            let registry = default_registry(&config);
            for (language, mode, scanner) in registry.entries() {
                println!(
                    "  {language:<12} {mode:<5} {name}",
                    language = language.as_str(),
                    mode = mode.as_str(),
                    name = scanner.name(),
                );
            }
        }
    }
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&Path>) -> Config {
    Config::load(path).unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        std::process::exit(2);
    })
}

/// 2 for bad requests, 1 for engine failures.
fn exit_code(e: &ScanError) -> i32 {
    if e.is_client_error() {
        2
    } else {
        1
    }
}

fn print_availability(name: &str, available: bool, tool: &str) {
    let status = if available {
        "READY".green().bold().to_string()
    } else {
        "NOT AVAILABLE".red().to_string()
    };
    println!("  [{status}] {name:<12} {tool}");
}

/// Returns immediate child directories of `path`, sorted by name.
fn find_workspaces(path: &Path) -> Vec<PathBuf> {
    let Ok(entries) = std::fs::read_dir(path) else {
        return vec![];
    };

    let mut dirs: Vec<PathBuf> = entries
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().map(|t| t.is_dir()).unwrap_or(false))
        .map(|e| e.path())
        .collect();

    dirs.sort();
    dirs
}
