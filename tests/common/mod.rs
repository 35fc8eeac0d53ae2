//! Shared test utilities for integration and E2E tests.
//!
//! ## Usage
//!
//! Add `mod common;` to your test file, then use the helpers:
//!
//! ```rust,ignore
//! mod common;
//! use common::prelude::*;
//!
//! let fixture = TestFixture::new();
//! let upstream = fixture.upstream("lidar");
//! fixture.write_repos(&descriptors::single("drivers/lidar", &upstream, "main"));
//! ```

use std::path::{Path, PathBuf};
use std::process::Command;

use assert_fs::prelude::*;

/// Re-export commonly used test dependencies for convenience.
pub mod prelude {
    pub use assert_cmd::cargo::cargo_bin_cmd;
    pub use assert_fs::prelude::*;
    #[allow(unused_imports)]
    pub use assert_fs::TempDir;
    pub use predicates::prelude::*;

    #[allow(unused_imports)]
    pub use super::descriptors;
    #[allow(unused_imports)]
    pub use super::{current_branch, git, git_output};
    pub use super::TestFixture;
}

/// Descriptor file snippets for testing.
#[allow(dead_code)]
pub mod descriptors {
    use std::path::Path;

    /// A descriptor with one git repository.
    pub fn single(name: &str, url: &Path, version: &str) -> String {
        format!(
            "repositories:\n  {}:\n    type: git\n    url: {}\n    version: {}\n",
            name,
            url.display(),
            version
        )
    }

    /// A descriptor with only entries that are skipped.
    pub const ONLY_SKIPPED: &str = r#"repositories:
  legacy:
    type: svn
    url: https://svn.example.com/legacy
  no_url:
    type: git
    version: main
"#;

    pub const EMPTY: &str = "repositories: {}\n";
}

/// Runs git in `dir` with a fixed identity, panicking on failure.
pub fn git(dir: &Path, args: &[&str]) {
    let status = Command::new("git")
        .args(["-c", "user.name=Robot Folders", "-c", "user.email=robot@example.com"])
        .args(["-c", "init.defaultBranch=main", "-c", "protocol.file.allow=always"])
        .args(args)
        .current_dir(dir)
        .status()
        .expect("failed to run git");
    assert!(status.success(), "git {:?} failed in {}", args, dir.display());
}

/// Runs git in `dir` and returns trimmed stdout.
#[allow(dead_code)]
pub fn git_output(dir: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .expect("failed to run git");
    assert!(output.status.success(), "git {:?} failed in {}", args, dir.display());
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

#[allow(dead_code)]
pub fn current_branch(checkout: &Path) -> String {
    git_output(checkout, &["rev-parse", "--abbrev-ref", "HEAD"])
}

/// A temporary directory with an `upstream/` area for source repositories
/// and an `ws/src/` area for checkouts.
pub struct TestFixture {
    temp_dir: assert_fs::TempDir,
}

#[allow(dead_code)]
impl TestFixture {
    pub fn new() -> Self {
        let temp_dir = assert_fs::TempDir::new().unwrap();
        temp_dir.child("ws/src").create_dir_all().unwrap();
        Self { temp_dir }
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// The directory the checkouts go to.
    pub fn src(&self) -> PathBuf {
        self.temp_dir.path().join("ws/src")
    }

    /// Writes `content` as `ws.repos` and returns its path.
    pub fn write_repos(&self, content: &str) -> PathBuf {
        let file = self.temp_dir.child("ws.repos");
        file.write_str(content).unwrap();
        file.path().to_path_buf()
    }

    /// Creates a source repository with a commit on `main` and a `develop`
    /// branch one commit ahead, and returns its path for use as a URL.
    pub fn upstream(&self, name: &str) -> PathBuf {
        let dir = self.temp_dir.path().join("upstream").join(name);
        std::fs::create_dir_all(&dir).unwrap();

        git(&dir, &["init", "--quiet"]);
        std::fs::write(dir.join("README.md"), format!("# {}\n", name)).unwrap();
        git(&dir, &["add", "README.md"]);
        git(&dir, &["commit", "--quiet", "-m", "Initial commit"]);
        git(&dir, &["checkout", "--quiet", "-b", "develop"]);
        std::fs::write(dir.join("CHANGELOG.md"), "- develop\n").unwrap();
        git(&dir, &["add", "CHANGELOG.md"]);
        git(&dir, &["commit", "--quiet", "-m", "Start develop"]);
        git(&dir, &["checkout", "--quiet", "main"]);
        dir
    }

    /// Clones `url` into `src/<name>` with plain git.
    pub fn checkout(&self, url: &Path, name: &str) -> PathBuf {
        let dest = self.src().join(name);
        git(
            self.path(),
            &["clone", "--quiet", &url.to_string_lossy(), &dest.to_string_lossy()],
        );
        dest
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}
