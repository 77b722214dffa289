//! Health server child process handle

use std::path::{Path, PathBuf};
use std::process::ExitStatus;
use std::time::Duration;
use tokio::process::{Child, Command};

use crate::application::errors::ProcessError;

/// Program and arguments that start the health server child
#[derive(Debug, Clone)]
pub struct HealthCommand {
    pub program: PathBuf,
    pub args: Vec<String>,
}

impl HealthCommand {
    pub fn new(program: impl Into<PathBuf>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Re-invoke the running executable as `[--config <path>] health --port <port>`
    ///
    /// The child reads the same config file as the parent, so logging and the
    /// bind host match.
    pub fn current_exe(config_path: Option<&Path>, port: u16) -> Result<Self, ProcessError> {
        let program = std::env::current_exe().map_err(ProcessError::Spawn)?;
        let mut args = Vec::new();
        if let Some(path) = config_path {
            args.push("--config".to_string());
            args.push(path.to_string_lossy().into_owned());
        }
        args.extend(["health".to_string(), "--port".to_string(), port.to_string()]);
        Ok(Self::new(program, args))
    }
}

/// Owned handle to the running health server process
pub struct HealthProcess {
    child: Child,
    pid: Option<u32>,
}

impl HealthProcess {
    /// Start the child without waiting for it to become ready
    pub fn spawn(command: &HealthCommand) -> Result<Self, ProcessError> {
        let child = Command::new(&command.program)
            .args(&command.args)
            .kill_on_drop(true)
            .spawn()
            .map_err(ProcessError::Spawn)?;

        let pid = child.id();
        tracing::info!("Health server process started (pid {})", pid.unwrap_or_default());
        Ok(Self { child, pid })
    }

    pub fn id(&self) -> Option<u32> {
        self.pid
    }

    pub fn is_alive(&mut self) -> bool {
        matches!(self.child.try_wait(), Ok(None))
    }

    #[cfg(unix)]
    fn terminate(&mut self) -> Result<(), ProcessError> {
        use nix::sys::signal::{kill, Signal};
        use nix::unistd::Pid;

        let Some(pid) = self.pid else {
            return Ok(());
        };
        kill(Pid::from_raw(pid as i32), Signal::SIGTERM).map_err(|e| ProcessError::Signal {
            pid,
            reason: e.to_string(),
        })
    }

    #[cfg(not(unix))]
    fn terminate(&mut self) -> Result<(), ProcessError> {
        let pid = self.pid.unwrap_or_default();
        self.child.start_kill().map_err(|e| ProcessError::Signal {
            pid,
            reason: e.to_string(),
        })
    }

    /// Ask the child to stop, wait up to `timeout`, then kill it.
    ///
    /// Returns the exit status once the child has been reaped.
    pub async fn shutdown(mut self, timeout: Duration) -> Result<ExitStatus, ProcessError> {
        if !self.is_alive() {
            let status = self.child.wait().await.map_err(ProcessError::Wait)?;
            tracing::warn!("Health server had already exited: {}", status);
            return Ok(status);
        }

        if let Err(e) = self.terminate() {
            tracing::warn!("{}", e);
        }

        match tokio::time::timeout(timeout, self.child.wait()).await {
            Ok(result) => {
                let status = result.map_err(ProcessError::Wait)?;
                tracing::info!("Health server stopped: {}", status);
                Ok(status)
            }
            Err(_) => {
                tracing::warn!("Health server did not stop within {:?}, killing it", timeout);
                self.child.kill().await.map_err(ProcessError::Wait)?;
                self.child.wait().await.map_err(ProcessError::Wait)
            }
        }
    }
}
