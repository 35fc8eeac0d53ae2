//! # Version-Control Client
//!
//! This module defines `VcsClient`, the contract the rest of the crate uses to
//! talk to a version-control system, and `GitCli`, its implementation on top
//! of the system `git` command.
//!
//! Using the system `git` means that SSH keys, credential helpers and
//! anything else configured in `~/.gitconfig` just work.
//!
//! Every method is a blocking process call. Failures are reported as
//! `Error::VcsOperation` carrying the checkout path, the operation, the exit
//! status and the captured stderr. The adapter re-labels the error with the
//! repository name.

use std::ffi::OsString;
use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use log::debug;

use crate::error::{Error, Result};

/// A configured remote of a checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Remote {
    pub name: String,
    pub url: String,
}

impl Remote {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }
}

/// What `HEAD` of a checkout points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Head {
    /// A local branch is checked out.
    Branch(String),
    /// `HEAD` points directly at a commit.
    Detached,
}

/// Operations the workspace needs from a version-control client.
pub trait VcsClient {
    /// Clones `url` into `dest`, creating parent directories as needed.
    fn clone_repository(&self, url: &str, dest: &Path, recursive_submodules: bool) -> Result<()>;

    /// Points `remote` of the checkout at `url`.
    fn set_remote_url(&self, path: &Path, remote: &str, url: &str) -> Result<()>;

    /// Fetches the current branch's remote.
    fn fetch(&self, path: &Path) -> Result<()>;

    /// Checks out a branch, tag or commit.
    fn checkout(&self, path: &Path, reference: &str) -> Result<()>;

    /// Lists the configured remotes in configuration order.
    fn list_remotes(&self, path: &Path) -> Result<Vec<Remote>>;

    fn current_head(&self, path: &Path) -> Result<Head>;

    /// The remote the branch's upstream lives on, if one is configured.
    fn upstream_remote(&self, path: &Path, branch: &str) -> Result<Option<String>>;

    /// Full hash of the commit `HEAD` points at.
    fn head_commit(&self, path: &Path) -> Result<String>;
}

/// `VcsClient` backed by the `git` executable.
#[derive(Debug, Clone)]
pub struct GitCli {
    program: OsString,
}

impl Default for GitCli {
    fn default() -> Self {
        Self {
            program: OsString::from("git"),
        }
    }
}

impl GitCli {
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses a different git executable.
    pub fn with_program(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn output(&self, dir: Option<&Path>, args: &[&str], operation: &str, subject: &str) -> Result<Output> {
        let mut command = Command::new(&self.program);
        command.args(args);
        if let Some(dir) = dir {
            command.current_dir(dir);
        }
        debug!("running git {} (in {})", args.join(" "), dir.map(|d| d.display().to_string()).unwrap_or_else(|| ".".to_string()));

        command.output().map_err(|e| Error::VcsOperation {
            repository: subject.to_string(),
            operation: operation.to_string(),
            status: None,
            output: e.to_string(),
        })
    }

    /// Runs git and returns trimmed stdout, failing on a non-zero exit.
    fn run(&self, dir: &Path, args: &[&str], operation: &str) -> Result<String> {
        let subject = dir.display().to_string();
        let output = self.output(Some(dir), args, operation, &subject)?;
        if !output.status.success() {
            return Err(failure(&subject, operation, &output));
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

fn failure(subject: &str, operation: &str, output: &Output) -> Error {
    let stderr = String::from_utf8_lossy(&output.stderr);

    // Provide helpful error message for common auth failures
    let message = if stderr.contains("Authentication failed")
        || stderr.contains("Permission denied")
        || stderr.contains("Could not read from remote repository")
    {
        format!(
            "Authentication failed. Make sure you have access to the repository \
            (SSH key in ssh-agent, git credentials, or a personal access token).\n{}",
            stderr.trim()
        )
    } else {
        stderr.trim().to_string()
    };

    Error::VcsOperation {
        repository: subject.to_string(),
        operation: operation.to_string(),
        status: output.status.code(),
        output: message,
    }
}

/// Parses `git config --get-regexp` output for `remote.<name>.url` keys.
fn parse_remote_urls(stdout: &str) -> Vec<Remote> {
    stdout
        .lines()
        .filter_map(|line| {
            let (key, url) = line.split_once(' ')?;
            let name = key.strip_prefix("remote.")?.strip_suffix(".url")?;
            Some(Remote::new(name, url.trim()))
        })
        .collect()
}

impl VcsClient for GitCli {
    fn clone_repository(&self, url: &str, dest: &Path, recursive_submodules: bool) -> Result<()> {
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)?;
        }

        let dest_str = dest.to_string_lossy();
        let mut args = vec!["clone"];
        if recursive_submodules {
            args.push("--recurse-submodules");
        }
        args.push(url);
        args.push(&dest_str);

        let output = self.output(None, &args, "clone", url)?;
        if !output.status.success() {
            return Err(failure(url, "clone", &output));
        }
        Ok(())
    }

    fn set_remote_url(&self, path: &Path, remote: &str, url: &str) -> Result<()> {
        self.run(path, &["remote", "set-url", remote, url], "remote set-url")
            .map(drop)
    }

    fn fetch(&self, path: &Path) -> Result<()> {
        self.run(path, &["fetch"], "fetch").map(drop)
    }

    fn checkout(&self, path: &Path, reference: &str) -> Result<()> {
        self.run(path, &["checkout", reference], "checkout").map(drop)
    }

    fn list_remotes(&self, path: &Path) -> Result<Vec<Remote>> {
        let subject = path.display().to_string();
        let output = self.output(
            Some(path),
            &["config", "--get-regexp", r"^remote\..*\.url$"],
            "list remotes",
            &subject,
        )?;

        // `git config --get-regexp` exits with 1 when nothing matches.
        match output.status.code() {
            Some(0) => Ok(parse_remote_urls(&String::from_utf8_lossy(&output.stdout))),
            Some(1) => Ok(Vec::new()),
            _ => Err(failure(&subject, "list remotes", &output)),
        }
    }

    fn current_head(&self, path: &Path) -> Result<Head> {
        let subject = path.display().to_string();
        let output = self.output(
            Some(path),
            &["symbolic-ref", "--quiet", "--short", "HEAD"],
            "symbolic-ref",
            &subject,
        )?;

        // `--quiet` makes a detached HEAD exit with 1 and no message.
        match output.status.code() {
            Some(0) => Ok(Head::Branch(
                String::from_utf8_lossy(&output.stdout).trim().to_string(),
            )),
            Some(1) => Ok(Head::Detached),
            _ => Err(failure(&subject, "symbolic-ref", &output)),
        }
    }

    fn upstream_remote(&self, path: &Path, branch: &str) -> Result<Option<String>> {
        let subject = path.display().to_string();
        let key = format!("branch.{}.remote", branch);
        let output = self.output(Some(path), &["config", "--get", &key], "upstream", &subject)?;

        match output.status.code() {
            Some(0) => {
                let remote = String::from_utf8_lossy(&output.stdout).trim().to_string();
                Ok(Some(remote).filter(|r| !r.is_empty()))
            }
            Some(1) => Ok(None),
            _ => Err(failure(&subject, "upstream", &output)),
        }
    }

    fn head_commit(&self, path: &Path) -> Result<String> {
        self.run(path, &["rev-parse", "HEAD"], "rev-parse")
    }
}
