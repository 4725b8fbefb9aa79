//! Deep analysis of a built project.
//!
//! # How it works
//!
//! 1. Checks that the workspace exists ([`ScanError::WorkspaceNotFound`]).
//! 2. Detects the build system from the workspace root, first match wins:
//!    `pom.xml` (Maven), `build.gradle`, `build.gradle.kts` (Gradle). No
//!    descriptor means no build step.
//! 3. Runs the build with tests skipped (`mvn package
//!    -Dmaven.test.skip.exec=true` / `gradle build -x test`). Failures are
//!    not retried.
//! 4. Creates a fresh scratch directory, owned by this invocation alone.
//! 5. Runs `<shell> <root>/<launcher> <root> <workspace> <scratch>`.
//! 6. Normalizes every `*.sarif` file under `<scratch>/sarif`.
//! 7. Stamps the result with the request id, the provenance tag, and the
//!    engine's combined output.
//!
//! The scratch directory is a [`TempDir`]: it is removed when dropped, which
//! covers success, every error return, and unwinding.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;

use crate::config::{BuildConfig, DeepConfig};
use crate::error::ScanError;
use crate::finding::ScanResult;
use crate::process::{which_exists, CommandRunner, Invocation, ProcessOutput, SystemRunner};
use crate::sarif;
use crate::scanners::{ensure_workspace, finish, Scanner};

/// Sub-folder of the scratch directory the engine writes SARIF into.
pub const REPORT_DIR: &str = "sarif";

/// A build system recognised by its descriptor file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildSystem {
    Maven,
    Gradle,
    GradleKotlin,
}

impl BuildSystem {
    /// Detection priority.
    pub const DETECTION_ORDER: [BuildSystem; 3] = [
        BuildSystem::Maven,
        BuildSystem::Gradle,
        BuildSystem::GradleKotlin,
    ];

    pub fn descriptor(self) -> &'static str {
        match self {
            BuildSystem::Maven => "pom.xml",
            BuildSystem::Gradle => "build.gradle",
            BuildSystem::GradleKotlin => "build.gradle.kts",
        }
    }

    /// Name used in error messages.
    pub fn tool(self) -> &'static str {
        match self {
            BuildSystem::Maven => "Maven",
            BuildSystem::Gradle | BuildSystem::GradleKotlin => "Gradle",
        }
    }

    pub fn program(self) -> &'static str {
        match self {
            BuildSystem::Maven => "mvn",
            BuildSystem::Gradle | BuildSystem::GradleKotlin => "gradle",
        }
    }

    /// Build arguments, always with tests skipped.
    pub fn args(self) -> &'static [&'static str] {
        match self {
            BuildSystem::Maven => &["package", "-Dmaven.test.skip.exec=true"],
            BuildSystem::Gradle | BuildSystem::GradleKotlin => &["build", "-x", "test"],
        }
    }

    /// Inspects the workspace root for a build descriptor.
    pub fn detect(workspace: &Path) -> Option<BuildSystem> {
        BuildSystem::DETECTION_ORDER
            .into_iter()
            .find(|system| workspace.join(system.descriptor()).is_file())
    }

    pub fn invocation(self, workspace: &Path, timeout: Option<Duration>) -> Invocation {
        Invocation::new(self.program())
            .args(self.args().iter().copied())
            .current_dir(workspace)
            .timeout(timeout)
    }
}

/// Build-then-analyze engine producing SARIF.
pub struct BuildAwareEngine {
    deep: DeepConfig,
    build: BuildConfig,
    runner: Arc<dyn CommandRunner>,
}

impl BuildAwareEngine {
    pub fn new(deep: DeepConfig, build: BuildConfig, runner: Arc<dyn CommandRunner>) -> Self {
        BuildAwareEngine { deep, build, runner }
    }

    /// Engine rooted at `root` with default settings and real processes.
    pub fn with_root(root: impl Into<std::path::PathBuf>) -> Self {
        let deep = DeepConfig {
            root: root.into(),
            ..DeepConfig::default()
        };
        BuildAwareEngine::new(deep, BuildConfig::default(), Arc::new(SystemRunner))
    }

    pub fn prefix(&self) -> &str {
        &self.deep.prefix
    }

    pub fn config(&self) -> &DeepConfig {
        &self.deep
    }

    /// Returns `true` if the launcher script and its interpreter are present.
    pub fn is_available(&self) -> bool {
        self.deep.launcher_path().is_file() && which_exists(&self.deep.shell)
    }

    /// Runs the detected build step, if any, and returns what was built.
    pub fn build(&self, workspace: &Path) -> Result<Option<BuildSystem>, ScanError> {
        let Some(system) = BuildSystem::detect(workspace) else {
            tracing::debug!(workspace = %workspace.display(), "no build descriptor, skipping build");
            return Ok(None);
        };

        let invocation = system.invocation(workspace, self.build.timeout());
        tracing::debug!(command = %invocation.display(), "building project");

        let out = self
            .runner
            .run(&invocation)
            .map_err(|e| ScanError::BuildFailed {
                tool: system.tool(),
                reason: e.to_string(),
                output: String::new(),
            })?;

        if !out.success() {
            return Err(ScanError::BuildFailed {
                tool: system.tool(),
                reason: out.status_text(),
                output: out.output_lossy(),
            });
        }

        tracing::debug!(tool = system.tool(), "build successful");
        Ok(Some(system))
    }

    fn scratch_dir(&self) -> Result<TempDir, ScanError> {
        let prefix = format!("{}-", self.deep.prefix);
        let mut builder = tempfile::Builder::new();
        builder.prefix(&prefix);
        let dir = match &self.deep.scratch_root {
            Some(root) => builder.tempdir_in(root),
            None => builder.tempdir(),
        };
        dir.map_err(ScanError::ScratchSpace)
    }

    fn invoke(&self, workspace: &Path, scratch: &Path) -> Result<ProcessOutput, ScanError> {
        let invocation = Invocation::new(self.deep.shell.as_str())
            .arg(self.deep.launcher_path())
            .arg(&self.deep.root)
            .arg(workspace)
            .arg(scratch)
            .timeout(self.deep.timeout());

        tracing::debug!(command = %invocation.display(), "executing analysis");

        let out = self
            .runner
            .run(&invocation)
            .map_err(|e| ScanError::ToolInvocationFailed {
                program: invocation.display(),
                reason: e.to_string(),
                output: String::new(),
            })?;

        if !out.success() {
            return Err(ScanError::ToolInvocationFailed {
                program: invocation.display(),
                reason: out.status_text(),
                output: out.output_lossy(),
            });
        }

        Ok(out)
    }
}

impl Scanner for BuildAwareEngine {
    fn scan(&self, id: &str, workspace: &Path, _rule: &str) -> Result<ScanResult, ScanError> {
        ensure_workspace(workspace)?;
        self.build(workspace)?;

        let scratch = self.scratch_dir()?;
        let out = self.invoke(workspace, scratch.path())?;
        let result = sarif::parse_sarif_files(&scratch.path().join(REPORT_DIR))?;

        Ok(finish(result, id, &self.deep.prefix, workspace, out.output_lossy()))
    }

    fn name(&self) -> &str {
        &self.deep.prefix
    }
}
