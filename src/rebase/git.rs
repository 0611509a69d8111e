//! Rebase executor driving the `git` command line.
//!
//! Each repository gets one clone under `<workspace>/<team>/<repo>`. A rebase:
//! 1. clones or fetches `origin`
//! 2. resets the local source branch to `origin/<source>`
//! 3. rebases it onto `origin/<destination>` (aborting on conflict)
//! 4. pushes with `--force-with-lease` pinned to the SHA it started from
//!
//! Git runs without system/global config and without terminal prompts.

use super::RebaseExecutor;
use crate::config::{RepositoryConfig, RepositoryHost, RepositoryTeam};
use crate::error::{Error, Result};
use crate::types::PullRequest;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::sync::LazyLock;
use regex::Regex;
use tracing::{debug, info, warn};
use url::Url;

/// Identity used for the rewritten commits.
#[derive(Debug, Clone)]
pub struct CommitIdentity {
    /// git `user.name`
    pub name: String,
    /// git `user.email`
    pub email: String,
}

impl CommitIdentity {
    /// Identity derived from the bot name.
    pub fn for_bot(bot_name: &str) -> Self {
        Self {
            name: bot_name.to_string(),
            email: format!("{bot_name}@users.noreply.localhost"),
        }
    }
}

/// Rebases by cloning the repository and shelling out to `git`.
#[derive(Debug, Clone)]
pub struct GitRebaseExecutor {
    workspace: PathBuf,
    remote_base: String,
    identity: CommitIdentity,
}

impl GitRebaseExecutor {
    /// Create an executor whose remotes are `<remote_base>/<repo>.git`.
    pub fn new(workspace: PathBuf, remote_base: String, identity: CommitIdentity) -> Self {
        Self {
            workspace,
            remote_base: remote_base.trim_end_matches('/').to_string(),
            identity,
        }
    }

    /// Executor for one team, with the team credentials in the clone URL.
    pub fn for_team(
        workspace: &Path,
        host: &RepositoryHost,
        team: &RepositoryTeam,
        identity: CommitIdentity,
    ) -> Result<Self> {
        let git_url = host.git_url()?;
        let remote_base = match Url::parse(&git_url) {
            Ok(mut url) if matches!(url.scheme(), "http" | "https") => {
                let password = team.password(host.host_type)?;
                url.set_username(&team.user)
                    .and_then(|()| url.set_password(Some(&password)))
                    .map_err(|()| Error::Config(format!("cannot add credentials to '{git_url}'")))?;
                url.as_str().trim_end_matches('/').to_string()
            }
            _ => git_url,
        };

        Ok(Self::new(
            workspace.join(&team.name),
            format!("{remote_base}/{}", team.name),
            identity,
        ))
    }

    fn remote_url(&self, repo: &RepositoryConfig) -> String {
        format!("{}/{}.git", self.remote_base, repo.name)
    }

    fn clone_dir(&self, repo: &RepositoryConfig) -> PathBuf {
        self.workspace.join(&repo.name)
    }

    /// Clone on first use, fetch afterwards.
    fn sync_clone(&self, repo: &RepositoryConfig) -> Result<PathBuf> {
        let dir = self.clone_dir(repo);
        let url = self.remote_url(repo);

        if dir.join(".git").exists() {
            run_git(&dir, &["remote", "set-url", "origin", &url])?;
            run_git(&dir, &["fetch", "--prune", "origin"])?;
        } else {
            std::fs::create_dir_all(&self.workspace).map_err(|e| {
                Error::Git(format!("failed to create {}: {e}", self.workspace.display()))
            })?;
            let target = dir.to_string_lossy().into_owned();
            run_git(&self.workspace, &["clone", "--quiet", &url, &target])?;
        }
        Ok(dir)
    }

    fn rebase_blocking(&self, repo: &RepositoryConfig, pr: &PullRequest) -> Result<bool> {
        let dir = self.sync_clone(repo)?;
        let remote_source = format!("origin/{}", pr.source);
        let remote_destination = format!("origin/{}", pr.destination);

        let original = git_stdout(&dir, &["rev-parse", &remote_source])?;
        run_git(&dir, &["checkout", "--quiet", "--force", "-B", &pr.source, &remote_source])?;

        let output = self
            .commit_command(&dir)
            .args(["rebase", "--quiet", remote_destination.as_str()])
            .output()
            .map_err(spawn_error)?;
        if !output.status.success() {
            warn!(
                pr = pr.id,
                stderr = %String::from_utf8_lossy(&output.stderr).trim(),
                "rebase failed, aborting"
            );
            // Nothing to abort if the rebase never started
            let _ = git_command(&dir).args(["rebase", "--abort"]).output();
            return Ok(false);
        }

        let lease = format!("--force-with-lease=refs/heads/{}:{original}", pr.source);
        let refspec = format!("HEAD:refs/heads/{}", pr.source);
        let output = git_command(&dir)
            .args(["push", "--quiet", lease.as_str(), "origin", refspec.as_str()])
            .output()
            .map_err(spawn_error)?;
        if !output.status.success() {
            warn!(
                pr = pr.id,
                stderr = %String::from_utf8_lossy(&output.stderr).trim(),
                "push of rebased branch rejected"
            );
            return Ok(false);
        }

        info!(pr = pr.id, source = %pr.source, onto = %pr.destination, "rebased and pushed");
        Ok(true)
    }

    fn commit_command(&self, workdir: &Path) -> Command {
        let mut cmd = git_command(workdir);
        cmd.arg("-c");
        cmd.arg(format!("user.name={}", self.identity.name));
        cmd.arg("-c");
        cmd.arg(format!("user.email={}", self.identity.email));
        cmd
    }
}

#[async_trait]
impl RebaseExecutor for GitRebaseExecutor {
    async fn rebase(&self, repo: &RepositoryConfig, pr: &PullRequest) -> Result<bool> {
        debug!(repo = %repo.name, pr = pr.id, "rebasing");
        let executor = self.clone();
        let repo = repo.clone();
        let pr = pr.clone();
        tokio::task::spawn_blocking(move || executor.rebase_blocking(&repo, &pr))
            .await
            .map_err(|e| Error::Git(format!("rebase task failed: {e}")))?
    }
}

/// Create a git Command with clean environment (no system/user config).
fn git_command(workdir: &Path) -> Command {
    let mut cmd = Command::new("git");
    cmd.current_dir(workdir);
    cmd.env("GIT_CONFIG_NOSYSTEM", "1");
    cmd.env("GIT_CONFIG_GLOBAL", "/dev/null");
    cmd.env("GIT_TERMINAL_PROMPT", "0");
    cmd
}

fn spawn_error(e: std::io::Error) -> Error {
    Error::Git(format!("failed to run git: {e}"))
}

/// Run a git command, failing on non-zero exit.
fn run_git(workdir: &Path, args: &[&str]) -> Result<Output> {
    let output = git_command(workdir).args(args).output().map_err(spawn_error)?;

    if output.status.success() {
        Ok(output)
    } else {
        Err(Error::Git(format!(
            "git {} failed: {}",
            redact(&args.join(" ")),
            redact(String::from_utf8_lossy(&output.stderr).trim())
        )))
    }
}

fn git_stdout(workdir: &Path, args: &[&str]) -> Result<String> {
    let output = run_git(workdir, args)?;
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

/// `scheme://user:password@` anywhere in a message, quoted or not.
static URL_CREDENTIALS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?P<prefix>[A-Za-z][A-Za-z0-9+.-]*://[^\s:@/'"]+):[^\s@/'"]+@"#)
        .expect("credential pattern is valid")
});

/// Mask the password of any URL in a message.
fn redact(text: &str) -> String {
    URL_CREDENTIALS
        .replace_all(text, "${prefix}:***@")
        .into_owned()
}
