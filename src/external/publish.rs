//! Post-run publication: mirroring and completion notices
//!
//! Publishers run after the workbook is written. Their failures are
//! reported by the pipeline and never undo or repeat the computation.

use anyhow::{bail, Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

pub trait Publisher {
    /// Short name used in logs
    fn name(&self) -> &str;

    /// Publish the workbook located at `artifact`
    fn publish(&self, artifact: &Path) -> Result<()>;
}

fn copy_dir_files(from: &Path, to: &Path) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(to).with_context(|| format!("creating {}", to.display()))?;
    let mut copied = Vec::new();
    let mut entries: Vec<PathBuf> = fs::read_dir(from)
        .with_context(|| format!("reading {}", from.display()))?
        .filter_map(|e| e.ok().map(|e| e.path()))
        .filter(|p| p.is_file())
        .collect();
    entries.sort();
    for source in entries {
        let Some(file_name) = source.file_name() else { continue };
        let target = to.join(file_name);
        fs::copy(&source, &target)
            .with_context(|| format!("copying {} to {}", source.display(), target.display()))?;
        copied.push(target);
    }
    Ok(copied)
}

/// Copies the workbook files into another directory
#[derive(Debug, Clone)]
pub struct DirectoryMirror {
    target: PathBuf,
}

impl DirectoryMirror {
    pub fn new(target: impl Into<PathBuf>) -> Self {
        Self { target: target.into() }
    }
}

impl Publisher for DirectoryMirror {
    fn name(&self) -> &str {
        "directory-mirror"
    }

    fn publish(&self, artifact: &Path) -> Result<()> {
        let copied = copy_dir_files(artifact, &self.target)?;
        log::info!("Mirrored {} files to {}", copied.len(), self.target.display());
        Ok(())
    }
}

/// Copies the workbook into a subdirectory of a git checkout, then commits
/// and pushes it
#[derive(Debug, Clone)]
pub struct GitMirror {
    repo: PathBuf,
    subdir: PathBuf,
    message: String,
    push: bool,
}

impl GitMirror {
    pub fn new(repo: impl Into<PathBuf>) -> Self {
        Self {
            repo: repo.into(),
            subdir: PathBuf::from("credit_kpis"),
            message: "Auto-update: latest credit KPI workbook".to_string(),
            push: true,
        }
    }

    pub fn with_subdir(mut self, subdir: impl Into<PathBuf>) -> Self {
        self.subdir = subdir.into();
        self
    }

    pub fn without_push(mut self) -> Self {
        self.push = false;
        self
    }

    fn git(&self, args: &[&str]) -> Result<()> {
        let output = Command::new("git")
            .args(args)
            .current_dir(&self.repo)
            .output()
            .with_context(|| format!("running git {}", args.join(" ")))?;
        if !output.status.success() {
            bail!(
                "git {} failed: {}",
                args.join(" "),
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }
        Ok(())
    }
}

impl Publisher for GitMirror {
    fn name(&self) -> &str {
        "git-mirror"
    }

    fn publish(&self, artifact: &Path) -> Result<()> {
        let target = self.repo.join(&self.subdir);
        copy_dir_files(artifact, &target)?;

        let subdir = self.subdir.to_string_lossy();
        self.git(&["add", &subdir])?;
        self.git(&["commit", "-m", &self.message])?;
        if self.push {
            self.git(&["push"])?;
        }
        log::info!("Workbook committed to {}", target.display());
        Ok(())
    }
}

/// Completion notice through the log
#[derive(Debug, Clone, Default)]
pub struct LogNotifier {
    pub recipient: Option<String>,
}

impl Publisher for LogNotifier {
    fn name(&self) -> &str {
        "log-notifier"
    }

    fn publish(&self, artifact: &Path) -> Result<()> {
        match &self.recipient {
            Some(to) => log::info!("Credit KPI workbook ready for {}: {}", to, artifact.display()),
            None => log::info!("Credit KPI workbook ready: {}", artifact.display()),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn workbook_dir(root: &Path) -> PathBuf {
        let source = root.join("out");
        fs::create_dir_all(&source).unwrap();
        fs::write(source.join("A.csv"), "a\n1\n").unwrap();
        source
    }

    fn git_in(repo: &Path, args: &[&str]) -> String {
        let output = Command::new("git").args(args).current_dir(repo).output().unwrap();
        assert!(output.status.success(), "git {:?}: {}", args, String::from_utf8_lossy(&output.stderr));
        String::from_utf8(output.stdout).unwrap()
    }

    #[test]
    fn test_directory_mirror_copies_files() {
        let root = tempfile::tempdir().unwrap();
        let source = workbook_dir(root.path());
        let target = root.path().join("mirror");

        DirectoryMirror::new(&target).publish(&source).unwrap();
        assert_eq!(fs::read_to_string(target.join("A.csv")).unwrap(), "a\n1\n");
    }

    #[test]
    fn test_mirror_of_missing_artifact_fails() {
        let root = tempfile::tempdir().unwrap();
        let missing = root.path().join("does-not-exist");
        assert!(DirectoryMirror::new(root.path().join("mirror")).publish(&missing).is_err());
    }

    #[test]
    fn test_git_mirror_commits_workbook() {
        let root = tempfile::tempdir().unwrap();
        let source = workbook_dir(root.path());
        let repo = root.path().join("repo");
        fs::create_dir_all(&repo).unwrap();
        git_in(&repo, &["init", "-q"]);
        git_in(&repo, &["config", "user.name", "KPI Bot"]);
        git_in(&repo, &["config", "user.email", "kpi@example.com"]);
        git_in(&repo, &["config", "commit.gpgsign", "false"]);

        let mirror = GitMirror::new(&repo).with_subdir("reports").without_push();
        mirror.publish(&source).unwrap();

        assert_eq!(git_in(&repo, &["rev-list", "--count", "HEAD"]).trim(), "1");
        assert_eq!(git_in(&repo, &["ls-files"]).trim(), "reports/A.csv");
        assert!(git_in(&repo, &["log", "-1", "--format=%s"]).contains("credit KPI workbook"));
    }

    #[test]
    fn test_git_mirror_outside_repository_fails() {
        let root = tempfile::tempdir().unwrap();
        let source = workbook_dir(root.path());
        let not_a_repo = root.path().join("plain");
        fs::create_dir_all(&not_a_repo).unwrap();

        let err = GitMirror::new(&not_a_repo).without_push().publish(&source).unwrap_err();
        assert!(format!("{:#}", err).contains("git add"));
    }
}
