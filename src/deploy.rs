//! Deploys the generated site by committing it to a branch of a git remote,
//! e.g. a GitHub Pages repository. Deployment shells out to `git`, so the
//! user's SSH keys and credential helpers apply.
//!
//! The staging directory is a scratch git working copy: it's recreated on
//! every deploy, its branch is reset to the remote's (if the branch exists
//! yet), its files are replaced by the output directory, and the result is
//! committed and pushed.

use crate::config::DeployConfig;
use crate::resources;
use chrono::Local;
use log::{debug, info};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use thiserror::Error;

const GIT_DIRECTORY: &str = ".git";
const REMOTE_NAME: &str = "origin";

/// Commits the contents of `output_directory` to `config.branch` of
/// `config.remote` and pushes it, using `staging_directory` as the working
/// copy.
pub fn deploy(
    config: &DeployConfig,
    output_directory: &Path,
    staging_directory: &Path,
) -> Result<()> {
    info!(
        "deploying to `{}` (branch `{}`)",
        config.remote, config.branch
    );
    reset_directory(staging_directory)?;

    let git = Git {
        directory: staging_directory,
    };
    git.run(&["init", "--quiet"])?;
    git.run(&["remote", "add", REMOTE_NAME, &config.remote])?;

    if git.succeeds(&["fetch", "--quiet", "--depth", "1", REMOTE_NAME, &config.branch]) {
        git.run(&["checkout", "--quiet", "-B", &config.branch, "FETCH_HEAD"])?;
    } else {
        debug!("branch `{}` doesn't exist yet; creating it", config.branch);
        git.run(&["checkout", "--quiet", "-b", &config.branch])?;
    }

    clear_working_copy(staging_directory)?;
    copy_output(output_directory, staging_directory)?;

    let message = format!("Published {}", Local::now().format("%Y-%m-%d %H:%M"));
    git.run(&["add", "--all"])?;
    git.run(&["commit", "--quiet", "--allow-empty", "-m", &message])?;
    git.run(&["push", "--quiet", REMOTE_NAME, &config.branch])?;
    Ok(())
}

struct Git<'a> {
    directory: &'a Path,
}

impl Git<'_> {
    fn command(&self, args: &[&str]) -> Command {
        let mut command = Command::new("git");
        command.args(args).current_dir(self.directory);
        command
    }

    fn run(&self, args: &[&str]) -> Result<()> {
        debug!("git {}", args.join(" "));
        let output = self.command(args).output().map_err(Error::Spawn)?;
        if output.status.success() {
            return Ok(());
        }
        Err(Error::Git {
            command: format!("git {}", args.join(" ")),
            status: match output.status.code() {
                Some(code) => format!("exit status {}", code),
                None => String::from("terminated by signal"),
            },
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
        })
    }

    fn succeeds(&self, args: &[&str]) -> bool {
        debug!("git {}", args.join(" "));
        self.command(args)
            .output()
            .map(|output| output.status.success())
            .unwrap_or(false)
    }
}

fn reset_directory(dir: &Path) -> Result<()> {
    if dir.exists() {
        fs::remove_dir_all(dir).map_err(|err| Error::Io {
            path: dir.to_owned(),
            err,
        })?;
    }
    fs::create_dir_all(dir).map_err(|err| Error::Io {
        path: dir.to_owned(),
        err,
    })
}

/// Removes everything in `dir` except the `.git` directory.
pub fn clear_working_copy(dir: &Path) -> Result<()> {
    let entries = fs::read_dir(dir).map_err(|err| Error::Io {
        path: dir.to_owned(),
        err,
    })?;
    for entry in entries {
        let entry = entry.map_err(|err| Error::Io {
            path: dir.to_owned(),
            err,
        })?;
        if entry.file_name() == GIT_DIRECTORY {
            continue;
        }
        let path = entry.path();
        let removed = if path.is_dir() {
            fs::remove_dir_all(&path)
        } else {
            fs::remove_file(&path)
        };
        removed.map_err(|err| Error::Io { path, err })?;
    }
    Ok(())
}

/// Copies the generated site into the working copy.
pub fn copy_output(output_directory: &Path, staging_directory: &Path) -> Result<()> {
    if !output_directory.is_dir() {
        return Err(Error::MissingOutput(output_directory.to_owned()));
    }
    resources::copy_resources(output_directory, staging_directory)?;
    Ok(())
}

/// The result of a deploy operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents a problem deploying the site.
#[derive(Debug, Error)]
pub enum Error {
    /// Returned when `git` can't be started at all.
    #[error("running git: {0}")]
    Spawn(std::io::Error),

    /// Returned when a git command exits unsuccessfully.
    #[error("`{command}` failed ({status}): {stderr}")]
    Git {
        command: String,
        status: String,
        stderr: String,
    },

    #[error("preparing `{}`: {err}", path.display())]
    Io { path: PathBuf, err: std::io::Error },

    /// Returned when there is nothing to deploy.
    #[error("output directory `{}` does not exist", .0.display())]
    MissingOutput(PathBuf),

    #[error(transparent)]
    Copy(#[from] resources::Error),
}

#[cfg(test)]
mod test {
    use super::*;
    use tempfile::TempDir;

    fn git_available() -> bool {
        Command::new("git")
            .arg("--version")
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false)
    }

    #[test]
    fn test_clear_working_copy_keeps_git_directory() -> Result<()> {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join(".git/objects")).unwrap();
        fs::create_dir_all(dir.path().join("articles/old")).unwrap();
        fs::write(dir.path().join("index.html"), "old").unwrap();

        clear_working_copy(dir.path())?;
        let names: Vec<String> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(vec![String::from(".git")], names);
        Ok(())
    }

    #[test]
    fn test_copy_output_requires_output() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            copy_output(&dir.path().join("Output"), dir.path()),
            Err(Error::MissingOutput(_))
        ));
    }

    #[test]
    fn test_deploy_to_local_remote() -> Result<()> {
        if !git_available() {
            return Ok(());
        }
        for (key, value) in &[
            ("GIT_AUTHOR_NAME", "Publisher"),
            ("GIT_AUTHOR_EMAIL", "publisher@example.com"),
            ("GIT_COMMITTER_NAME", "Publisher"),
            ("GIT_COMMITTER_EMAIL", "publisher@example.com"),
        ] {
            std::env::set_var(key, value);
        }

        let dir = TempDir::new().unwrap();
        let remote = dir.path().join("remote.git");
        fs::create_dir_all(&remote).unwrap();
        Git { directory: &remote }.run(&["init", "--quiet", "--bare"])?;

        let output = dir.path().join("Output");
        fs::create_dir_all(output.join("articles")).unwrap();
        fs::write(output.join("index.html"), "home").unwrap();
        fs::write(output.join("articles/index.html"), "articles").unwrap();

        let config = DeployConfig {
            remote: remote.to_string_lossy().into_owned(),
            branch: String::from("master"),
        };
        let staging = dir.path().join(".publish");

        // Deploying twice exercises both the new-branch and the
        // existing-branch paths.
        deploy(&config, &output, &staging)?;
        fs::remove_file(output.join("articles/index.html")).unwrap();
        deploy(&config, &output, &staging)?;

        assert!(staging.join("index.html").is_file());
        assert!(!staging.join("articles/index.html").exists());

        let log = Command::new("git")
            .args(&["log", "--format=%s", "master"])
            .current_dir(&remote)
            .output()
            .unwrap();
        let subjects = String::from_utf8_lossy(&log.stdout);
        assert_eq!(2, subjects.lines().filter(|l| l.starts_with("Published ")).count());
        Ok(())
    }
}
