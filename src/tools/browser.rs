//! Desktop web browser launcher

use std::path::PathBuf;
use std::process::Stdio;

use async_trait::async_trait;

use crate::capability::Browser;
use crate::{Error, Result};

/// Opens URLs with the platform's default handler
#[derive(Debug, Clone, Default)]
pub struct SystemBrowser {
    opener: Option<Opener>,
}

#[derive(Debug, Clone)]
enum Opener {
    /// `xdg-open` / `open` style: program followed by the URL
    Direct(PathBuf),
    /// `gio open <url>`
    Gio(PathBuf),
    /// Windows `cmd /C start "" <url>`
    CmdStart(PathBuf),
}

impl SystemBrowser {
    /// Locate the platform opener on `PATH`
    ///
    /// A machine without one still gets a browser; every `open` then fails
    /// and the assistant apologizes instead of exiting.
    #[must_use]
    pub fn detect() -> Self {
        let opener = if cfg!(target_os = "windows") {
            which::which("cmd").ok().map(Opener::CmdStart)
        } else if cfg!(target_os = "macos") {
            which::which("open").ok().map(Opener::Direct)
        } else {
            which::which("xdg-open")
                .ok()
                .map(Opener::Direct)
                .or_else(|| which::which("gio").ok().map(Opener::Gio))
        };

        match &opener {
            Some(opener) => tracing::debug!(?opener, "browser opener located"),
            None => tracing::warn!("no URL opener found, links will not open"),
        }
        Self { opener }
    }

    fn command(&self, url: &str) -> Result<tokio::process::Command> {
        let opener = self
            .opener
            .as_ref()
            .ok_or_else(|| Error::Browser("no URL opener available".to_string()))?;

        let cmd = match opener {
            Opener::Direct(program) => {
                let mut cmd = tokio::process::Command::new(program);
                cmd.arg(url);
                cmd
            }
            Opener::Gio(program) => {
                let mut cmd = tokio::process::Command::new(program);
                cmd.arg("open").arg(url);
                cmd
            }
            Opener::CmdStart(program) => {
                let mut cmd = tokio::process::Command::new(program);
                cmd.args(["/C", "start", ""]).arg(url);
                cmd
            }
        };
        Ok(cmd)
    }
}

#[async_trait]
impl Browser for SystemBrowser {
    async fn open(&self, url: &str) -> Result<()> {
        let mut child = self
            .command(url)?
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| Error::Browser(format!("failed to launch browser: {e}")))?;

        tracing::info!(url, "opened in browser");

        // Reap the opener in the background so it never lingers as a zombie
        tokio::spawn(async move {
            if let Err(e) = child.wait().await {
                tracing::debug!(error = %e, "browser opener exited abnormally");
            }
        });

        Ok(())
    }
}
