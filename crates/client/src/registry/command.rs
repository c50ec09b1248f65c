//! `curl` subprocess transport.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;

use super::RegistryError;

/// Hides the console window when spawned from a GUI process on Windows.
#[cfg(windows)]
const CREATE_NO_WINDOW: u32 = 0x0800_0000;

/// Runs `curl -s -L --tlsv1.2 -H "User-Agent: ..." <url>` and returns stdout.
#[derive(Debug, Clone)]
pub struct CurlCommand {
    program: PathBuf,
    user_agent: String,
    timeout: Duration,
}

impl CurlCommand {
    pub fn new(program: impl Into<PathBuf>, user_agent: impl Into<String>, timeout: Duration) -> Self {
        Self { program: program.into(), user_agent: user_agent.into(), timeout }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    fn args(&self, url: &str) -> Vec<String> {
        vec![
            "-s".into(),
            "-L".into(),
            "--tlsv1.2".into(),
            "-H".into(),
            format!("User-Agent: {}", self.user_agent),
            url.into(),
        ]
    }

    /// Run the request. The child is killed if the timeout fires.
    pub async fn get(&self, url: &str) -> Result<Vec<u8>, RegistryError> {
        let mut command = Command::new(&self.program);
        command
            .args(self.args(url))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        #[cfg(windows)]
        command.creation_flags(CREATE_NO_WINDOW);

        let output = match tokio::time::timeout(self.timeout, command.output()).await {
            Err(_) => return Err(RegistryError::Timeout),
            Ok(Err(e)) if e.kind() == ErrorKind::NotFound => {
                return Err(RegistryError::ToolMissing(self.program.display().to_string()));
            }
            Ok(Err(e)) => return Err(RegistryError::Spawn(e.to_string())),
            Ok(Ok(output)) => output,
        };

        if !output.status.success() {
            tracing::debug!(
                code = ?output.status.code(),
                stderr = %String::from_utf8_lossy(&output.stderr).trim(),
                "curl failed"
            );
            return Err(RegistryError::CommandFailed { code: output.status.code() });
        }

        Ok(output.stdout)
    }
}
