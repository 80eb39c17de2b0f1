//! firefleet-script — prerequisite script download and execution.
//!
//! Install and uninstall flows shell out to versioned scripts published
//! alongside each release. This crate fetches them into a per-version
//! cache directory and runs them under elevated privilege.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use futures_util::StreamExt as _;
use sha2::{Digest as _, Sha256};
use thiserror::Error;
use tokio::io::AsyncWriteExt as _;
use tokio::process::Command;
use tracing::{debug, info};

/// Default location the release scripts are published under; the final URL
/// is `{base}/{version}/{file}`.
const DEFAULT_BASE_URL: &str =
    "https://raw.githubusercontent.com/firefleet/firefleet/main/scripts";

/// The auxiliary scripts a release ships.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Script {
    InstallPrerequisites,
    UninstallPrerequisites,
}

impl Script {
    pub fn file_name(self) -> &'static str {
        match self {
            Script::InstallPrerequisites => "install-prerequisites.sh",
            Script::UninstallPrerequisites => "uninstall-prerequisites.sh",
        }
    }
}

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("invalid script version tag {0:?}")]
    BadVersion(String),

    #[error("script {0} has not been downloaded")]
    NotDownloaded(String),

    #[error("script download failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("{script} exited with {status}")]
    Exec {
        script: String,
        status: std::process::ExitStatus,
    },
}

/// Cache of downloaded release scripts, keyed by version tag.
#[derive(Debug, Clone)]
pub struct ScriptStore {
    root: PathBuf,
    base_url: String,
    privileged: bool,
}

impl Default for ScriptStore {
    fn default() -> Self {
        let root = dirs::cache_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join("firefleet")
            .join("scripts");
        Self {
            root,
            base_url: DEFAULT_BASE_URL.to_string(),
            privileged: true,
        }
    }
}

impl ScriptStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store rooted at an explicit directory.
    pub fn at(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Self::default()
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Run scripts directly rather than through `sudo sh`.
    pub fn unprivileged(mut self) -> Self {
        self.privileged = false;
        self
    }

    /// Where `script` for `version` lives once downloaded.
    pub fn script_path(&self, script: Script, version: &str) -> PathBuf {
        self.root.join(version).join(script.file_name())
    }

    /// Fetch `script` for `version` into the cache. A cached copy is kept
    /// unless `force` is set.
    pub async fn download(
        &self,
        script: Script,
        version: &str,
        force: bool,
    ) -> Result<PathBuf, ScriptError> {
        validate_version(version)?;

        let dest = self.script_path(script, version);
        if dest.is_file() && !force {
            debug!(path = %dest.display(), "script already downloaded");
            return Ok(dest);
        }
        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let url = format!("{}/{}/{}", self.base_url, version, script.file_name());
        info!(%url, "downloading script");

        let response = reqwest::get(&url).await?.error_for_status()?;

        let mut file = tokio::fs::File::create(&dest).await?;
        let mut stream = response.bytes_stream();
        let mut hasher = Sha256::new();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            hasher.update(&chunk);
            file.write_all(&chunk).await?;
        }
        file.flush().await?;
        drop(file);

        mark_executable(&dest).await?;
        debug!(
            path = %dest.display(),
            sha256 = %hex::encode(hasher.finalize()),
            "script downloaded"
        );
        Ok(dest)
    }

    /// Run a previously downloaded script to completion, inheriting stdio.
    pub async fn run(&self, script: Script, version: &str) -> Result<(), ScriptError> {
        validate_version(version)?;

        let path = self.script_path(script, version);
        if !path.is_file() {
            return Err(ScriptError::NotDownloaded(
                script.file_name().to_string(),
            ));
        }

        info!(script = script.file_name(), %version, "running script");

        let mut command = if self.privileged {
            let mut command = Command::new("sudo");
            command.arg("sh").arg(&path);
            command
        } else {
            let mut command = Command::new("sh");
            command.arg(&path);
            command
        };

        let status = command.stdin(Stdio::null()).status().await?;
        if !status.success() {
            return Err(ScriptError::Exec {
                script: script.file_name().to_string(),
                status,
            });
        }
        Ok(())
    }
}

/// Version tags look like `v1.2.3` (the `v` is optional).
fn validate_version(version: &str) -> Result<(), ScriptError> {
    let tag = version.strip_prefix('v').unwrap_or(version);
    semver::Version::parse(tag)
        .map(|_| ())
        .map_err(|_| ScriptError::BadVersion(version.to_string()))
}

#[cfg(unix)]
async fn mark_executable(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt as _;
    let mut perms = tokio::fs::metadata(path).await?.permissions();
    perms.set_mode(0o755);
    tokio::fs::set_permissions(path, perms).await
}

#[cfg(not(unix))]
async fn mark_executable(_path: &Path) -> std::io::Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn version_tags_accept_optional_v_prefix() {
        assert!(validate_version("v0.3.1").is_ok());
        assert!(validate_version("0.3.1").is_ok());
        assert!(matches!(
            validate_version("latest"),
            Err(ScriptError::BadVersion(_))
        ));
        assert!(validate_version("").is_err());
    }

    #[test]
    fn script_paths_are_versioned() {
        let store = ScriptStore::at("/tmp/cache");
        let path = store.script_path(Script::InstallPrerequisites, "v0.3.1");
        assert_eq!(
            path,
            PathBuf::from("/tmp/cache/v0.3.1/install-prerequisites.sh")
        );
    }

    #[tokio::test]
    async fn run_refuses_a_script_that_was_never_downloaded() {
        let dir = TempDir::new().unwrap();
        let store = ScriptStore::at(dir.path()).unprivileged();
        let err = store
            .run(Script::InstallPrerequisites, "v0.1.0")
            .await
            .unwrap_err();
        assert!(matches!(err, ScriptError::NotDownloaded(_)));
    }

    #[tokio::test]
    async fn run_executes_a_cached_script() {
        let dir = TempDir::new().unwrap();
        let store = ScriptStore::at(dir.path()).unprivileged();

        let path = store.script_path(Script::InstallPrerequisites, "v0.1.0");
        tokio::fs::create_dir_all(path.parent().unwrap())
            .await
            .unwrap();
        tokio::fs::write(&path, "#!/bin/sh\nexit 0\n").await.unwrap();

        store
            .run(Script::InstallPrerequisites, "v0.1.0")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn run_surfaces_nonzero_script_exits() {
        let dir = TempDir::new().unwrap();
        let store = ScriptStore::at(dir.path()).unprivileged();

        let path = store.script_path(Script::UninstallPrerequisites, "v0.1.0");
        tokio::fs::create_dir_all(path.parent().unwrap())
            .await
            .unwrap();
        tokio::fs::write(&path, "#!/bin/sh\nexit 9\n").await.unwrap();

        let err = store
            .run(Script::UninstallPrerequisites, "v0.1.0")
            .await
            .unwrap_err();
        assert!(matches!(err, ScriptError::Exec { status, .. } if status.code() == Some(9)));
    }

    #[tokio::test]
    async fn download_skips_when_cached_unless_forced() {
        let dir = TempDir::new().unwrap();
        // A base URL nothing listens on; a skipped download never touches it.
        let store = ScriptStore::at(dir.path())
            .with_base_url("http://127.0.0.1:1/scripts")
            .unprivileged();

        let path = store.script_path(Script::InstallPrerequisites, "v0.1.0");
        tokio::fs::create_dir_all(path.parent().unwrap())
            .await
            .unwrap();
        tokio::fs::write(&path, "#!/bin/sh\n").await.unwrap();

        let cached = store
            .download(Script::InstallPrerequisites, "v0.1.0", false)
            .await
            .unwrap();
        assert_eq!(cached, path);

        // Forcing re-fetches and therefore fails against the dead URL.
        let err = store
            .download(Script::InstallPrerequisites, "v0.1.0", true)
            .await
            .unwrap_err();
        assert!(matches!(err, ScriptError::Http(_)));
    }

    #[tokio::test]
    async fn download_rejects_bad_version_before_fetching() {
        let dir = TempDir::new().unwrap();
        let store = ScriptStore::at(dir.path())
            .with_base_url("http://127.0.0.1:1/scripts");
        let err = store
            .download(Script::InstallPrerequisites, "latest", false)
            .await
            .unwrap_err();
        assert!(matches!(err, ScriptError::BadVersion(_)));
    }
}
