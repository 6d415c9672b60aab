use crate::application::ports::UrlOpener;
use crate::shared::error::AppError;
use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

/// Opens URLs with the desktop's default handler (`xdg-open`, `open`, `start`).
pub struct SystemUrlOpener {
    program: String,
    prefix_args: Vec<String>,
}

impl SystemUrlOpener {
    pub fn new() -> Self {
        if cfg!(target_os = "macos") {
            Self::with_program("open", &[])
        } else if cfg!(target_os = "windows") {
            Self::with_program("cmd", &["/C", "start", ""])
        } else {
            Self::with_program("xdg-open", &[])
        }
    }

    pub fn with_program(program: &str, prefix_args: &[&str]) -> Self {
        Self {
            program: program.to_string(),
            prefix_args: prefix_args.iter().map(|arg| arg.to_string()).collect(),
        }
    }
}

impl Default for SystemUrlOpener {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UrlOpener for SystemUrlOpener {
    async fn open(&self, url: &str) -> Result<(), AppError> {
        debug!("Opening {url} with {}", self.program);
        let status = Command::new(&self.program)
            .args(&self.prefix_args)
            .arg(url)
            .status()
            .await
            .map_err(|e| AppError::Internal(format!("failed to launch {}: {e}", self.program)))?;
        if status.success() {
            Ok(())
        } else {
            Err(AppError::Internal(format!(
                "{} exited with {status} for {url}",
                self.program
            )))
        }
    }
}
