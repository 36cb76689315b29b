//! Branch listing for the picker. Runs the `git` binary.

use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Nearest ancestor of `start` (inclusive) that contains `.git`.
pub fn find_repo_root(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| dir.join(".git").exists())
        .map(Path::to_path_buf)
}

pub fn parse_branch_list(text: &str) -> Vec<String> {
    let mut branches: Vec<String> = text
        .lines()
        .map(|line| line.trim().trim_start_matches("* ").trim())
        .filter(|line| !line.is_empty() && !line.starts_with('('))
        .map(str::to_string)
        .collect();
    branches.sort();
    branches.dedup();
    branches
}

fn git(root: &Path, args: &[&str]) -> io::Result<String> {
    let output = Command::new("git").arg("-C").arg(root).args(args).output()?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let message = stderr.lines().next().unwrap_or("git failed").trim().to_string();
        return Err(io::Error::new(io::ErrorKind::Other, message));
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Local branch names, sorted.
pub fn list_branches(root: &Path) -> io::Result<Vec<String>> {
    let out = git(root, &["for-each-ref", "--format=%(refname:short)", "refs/heads"])?;
    let branches = parse_branch_list(&out);
    tracing::debug!(root = %root.display(), count = branches.len(), "branches listed");
    Ok(branches)
}

/// The checked-out branch, or `None` on a detached head or outside a repo.
pub fn current_branch(root: &Path) -> Option<String> {
    let out = git(root, &["rev-parse", "--abbrev-ref", "HEAD"]).ok()?;
    let name = out.trim();
    (!name.is_empty() && name != "HEAD").then(|| name.to_string())
}

#[cfg(test)]
#[path = "../../../../tests/unit/kernel/services/adapters/git.rs"]
mod tests;
