//! Subprocess execution behind a narrow, swappable seam.
//!
//! Engines never call [`std::process::Command`] directly; they describe an
//! [`Invocation`] and hand it to a [`CommandRunner`]. Production code uses
//! [`SystemRunner`]; tests inject a fake that records invocations and
//! fabricates output.

use std::ffi::OsString;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

/// One subprocess to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<OsString>,
    /// Working directory; inherits the caller's when `None`.
    pub dir: Option<PathBuf>,
    /// Kill the process once this much time has elapsed.
    pub timeout: Option<Duration>,
}

impl Invocation {
    pub fn new(program: impl Into<String>) -> Self {
        Invocation {
            program: program.into(),
            args: Vec::new(),
            dir: None,
            timeout: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn current_dir(mut self, dir: &Path) -> Self {
        self.dir = Some(dir.to_path_buf());
        self
    }

    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Shell-like rendering for logs.
    pub fn display(&self) -> String {
        let mut out = self.program.clone();
        for arg in &self.args {
            out.push(' ');
            out.push_str(&arg.to_string_lossy());
        }
        out
    }
}

/// Exit status and combined output of a finished process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOutput {
    /// `None` when the process was terminated by a signal.
    pub code: Option<i32>,
    /// stdout followed by stderr.
    pub output: Vec<u8>,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    pub fn output_lossy(&self) -> String {
        String::from_utf8_lossy(&self.output).into_owned()
    }

    /// Human-readable exit description, e.g. `"exit status 2"`.
    pub fn status_text(&self) -> String {
        match self.code {
            Some(code) => format!("exit status {code}"),
            None => "terminated by signal".to_string(),
        }
    }
}

/// Runs subprocesses to completion.
///
/// Must be [`Send`] + [`Sync`]: a runner is shared by every scan an engine
/// performs, including concurrent ones.
pub trait CommandRunner: Send + Sync {
    /// Runs `invocation` and returns its output regardless of exit code.
    ///
    /// Errors are reserved for failures to spawn or wait, and for deadline
    /// expiry ([`io::ErrorKind::TimedOut`]).
    fn run(&self, invocation: &Invocation) -> io::Result<ProcessOutput>;
}

/// [`CommandRunner`] backed by real OS processes.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

const POLL_INTERVAL: Duration = Duration::from_millis(100);

impl CommandRunner for SystemRunner {
    fn run(&self, invocation: &Invocation) -> io::Result<ProcessOutput> {
        tracing::debug!(command = %invocation.display(), dir = ?invocation.dir, "executing command");

        let mut command = Command::new(&invocation.program);
        command
            .args(&invocation.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(dir) = &invocation.dir {
            command.current_dir(dir);
        }
        // Own process group, so a deadline reaches the launcher's children too.
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            command.process_group(0);
        }

        let mut child = command.spawn()?;

        // Drain both pipes concurrently so a chatty process cannot block on a
        // full pipe while we poll for exit.
        let stdout = child.stdout.take().map(spawn_reader);
        let stderr = child.stderr.take().map(spawn_reader);

        let code = wait_with_deadline(&mut child, invocation.timeout)?;

        let mut output = join_reader(stdout);
        output.extend(join_reader(stderr));

        Ok(ProcessOutput { code, output })
    }
}

fn spawn_reader<R: Read + Send + 'static>(mut pipe: R) -> thread::JoinHandle<Vec<u8>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        let _ = pipe.read_to_end(&mut buf);
        buf
    })
}

fn join_reader(handle: Option<thread::JoinHandle<Vec<u8>>>) -> Vec<u8> {
    handle
        .and_then(|h| h.join().ok())
        .unwrap_or_default()
}

fn wait_with_deadline(child: &mut Child, timeout: Option<Duration>) -> io::Result<Option<i32>> {
    let Some(timeout) = timeout else {
        return child.wait().map(|status| status.code());
    };

    let start = Instant::now();
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(status.code());
        }
        if start.elapsed() >= timeout {
            kill_process_group(child);
            let _ = child.wait();
            return Err(io::Error::new(
                io::ErrorKind::TimedOut,
                format!("timed out after {}s", timeout.as_secs()),
            ));
        }
        thread::sleep(POLL_INTERVAL);
    }
}

/// Kills `child` and every process in its group.
fn kill_process_group(child: &mut Child) {
    #[cfg(unix)]
    {
        if let Ok(pid) = libc::pid_t::try_from(child.id()) {
            // SAFETY: kill(2) takes no pointers; a negative pid addresses the
            // group created at spawn, whose leader is `child`.
            unsafe {
                libc::kill(-pid, libc::SIGKILL);
            }
        }
    }
    let _ = child.kill();
}

/// Returns `true` if an executable named `cmd` exists on `PATH`.
///
/// A `cmd` containing a path separator is checked directly instead.
/// On Unix the file must also have an executable permission bit set.
pub fn which_exists(cmd: &str) -> bool {
    let direct = Path::new(cmd);
    if direct.components().count() > 1 {
        return is_executable(direct);
    }
    std::env::var_os("PATH")
        .map(|path| std::env::split_paths(&path).any(|dir| is_executable(&dir.join(cmd))))
        .unwrap_or(false)
}

fn is_executable(candidate: &Path) -> bool {
    if !candidate.is_file() {
        return false;
    }
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::metadata(candidate)
            .map(|m| m.permissions().mode() & 0o111 != 0)
            .unwrap_or(false)
    }
    #[cfg(not(unix))]
    {
        true
    }
}
