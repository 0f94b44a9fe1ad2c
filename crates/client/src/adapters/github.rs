//! GitHub repositories packed into one markdown document.
//!
//! Shallow-clones the repository into a scratch directory and runs repomix
//! over it. Both tools are external executables; each step is bounded by
//! `tool_timeout_ms` and the scratch directory is removed on drop.

use async_trait::async_trait;
use perceiver_core::{AdapterKind, AppConfig, Error, Source};
use std::ffi::OsStr;
use std::path::Path;
use std::process::Stdio;
use std::sync::Arc;
use tokio::process::Command;

use super::{Adapter, unsupported};

/// Files repomix keeps: source code, build files and the README.
const INCLUDE_PATTERNS: &[&str] = &[
    "**/*.sh",
    "**/*.bat",
    "**/*.ps1",
    "**/*.js",
    "**/*.css",
    "**/*.ts",
    "**/*.jsx",
    "**/*.tsx",
    "**/*.py",
    "**/*.java",
    "**/*.c",
    "**/*.cpp",
    "**/*.h",
    "**/*.cs",
    "**/*.go",
    "**/*.rs",
    "**/*.rb",
    "**/*.php",
    "**/*.swift",
    "**/*.kt",
    "**/*.sql",
    "**/Dockerfile",
    "**/Makefile",
    "**/README.md",
];

pub(crate) fn clone_url(owner: &str, repo: &str) -> String {
    format!("https://github.com/{owner}/{repo}.git")
}

/// Repository dumps via git and repomix.
#[derive(Debug, Clone)]
pub struct GitHubAdapter {
    config: Arc<AppConfig>,
}

impl GitHubAdapter {
    pub fn new(config: Arc<AppConfig>) -> Self {
        Self { config }
    }

    /// Run an external tool to completion, failing on timeout or non-zero exit.
    async fn run<I, S>(&self, program: &str, args: I) -> Result<(), Error>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let kind = self.kind();
        let mut command = Command::new(program);
        command
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        tracing::debug!(program, "running external tool");

        let output = tokio::time::timeout(self.config.tool_timeout(), command.output())
            .await
            .map_err(|_| {
                Error::extraction(
                    kind.as_str(),
                    format!("{program} timed out after {}ms", self.config.tool_timeout_ms),
                )
            })?
            .map_err(|e| Error::extraction(kind.as_str(), format!("failed to run {program}: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::extraction(
                kind.as_str(),
                format!("{program} exited with {}: {}", output.status, stderr.trim()),
            ));
        }

        Ok(())
    }

    async fn dump(&self, owner: &str, repo: &str, scratch: &Path) -> Result<String, Error> {
        let checkout = scratch.join("repo");
        let output = scratch.join("output.md");

        let url = clone_url(owner, repo);
        tracing::debug!(%url, path = %checkout.display(), "cloning repository");
        self.run(
            &self.config.git_bin,
            [
                OsStr::new("clone"),
                OsStr::new("--depth"),
                OsStr::new("1"),
                OsStr::new(&url),
                checkout.as_os_str(),
            ],
        )
        .await?;

        let include = INCLUDE_PATTERNS.join(",");
        tracing::debug!("packing repository with repomix");
        self.run(
            &self.config.repomix_bin,
            [
                OsStr::new("--style"),
                OsStr::new("markdown"),
                OsStr::new("--include"),
                OsStr::new(&include),
                OsStr::new("--no-file-summary"),
                OsStr::new("--output"),
                output.as_os_str(),
                OsStr::new("--quiet"),
                checkout.as_os_str(),
            ],
        )
        .await?;

        tokio::fs::read_to_string(&output)
            .await
            .map_err(|e| Error::extraction(self.kind().as_str(), format!("repomix output unreadable: {e}")))
    }
}

#[async_trait]
impl Adapter for GitHubAdapter {
    fn kind(&self) -> AdapterKind {
        AdapterKind::GitHub
    }

    async fn extract(&self, source: &Source) -> Result<String, Error> {
        let Source::GitHub { owner, repo, .. } = source else {
            return Err(unsupported(self.kind(), source));
        };

        let scratch = tempfile::Builder::new()
            .prefix("perceiver_github_")
            .tempdir()
            .map_err(|e| Error::extraction(self.kind().as_str(), format!("cannot create scratch directory: {e}")))?;

        let text = self.dump(owner, repo, scratch.path()).await?;
        Ok(text.trim().to_string())
    }
}
