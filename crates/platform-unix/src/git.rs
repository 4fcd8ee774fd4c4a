//! Git repository context for a working directory

use git2::{ErrorCode, Repository};
use std::path::Path;

/// Repository name and checked-out branch for a directory
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GitContext {
    /// Name of the repository's top-level directory
    pub repo: Option<String>,
    /// Current branch, absent for a detached HEAD
    pub branch: Option<String>,
}

/// Discover the repository containing `dir`, searching parent directories
pub fn git_context(dir: &Path) -> GitContext {
    if dir.as_os_str().is_empty() {
        return GitContext::default();
    }

    let repo = match Repository::discover(dir) {
        Ok(repo) => repo,
        Err(e) => {
            log::trace!("No git repository for {}: {}", dir.display(), e.message());
            return GitContext::default();
        }
    };

    let name = repo
        .workdir()
        .unwrap_or_else(|| repo.path())
        .file_name()
        .map(|n| n.to_string_lossy().into_owned());

    GitContext {
        repo: name,
        branch: current_branch(&repo),
    }
}

fn current_branch(repo: &Repository) -> Option<String> {
    match repo.head() {
        Ok(head) if head.is_branch() => head.shorthand().map(str::to_string),
        Ok(_) => None,
        // HEAD names a branch with no commits yet
        Err(e) if e.code() == ErrorCode::UnbornBranch => {
            let head = repo.find_reference("HEAD").ok()?;
            let target = head.symbolic_target()?;
            Some(target.strip_prefix("refs/heads/").unwrap_or(target).to_string())
        }
        Err(e) => {
            log::trace!("Unreadable HEAD: {}", e.message());
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use git2::{RepositoryInitOptions, Signature};

    #[test]
    fn test_not_a_repository() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(git_context(dir.path()), GitContext::default());
    }

    #[test]
    fn test_empty_dir_path() {
        assert_eq!(git_context(Path::new("")), GitContext::default());
    }

    #[test]
    fn test_nested_directory_finds_repository() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("service");
        let nested = root.join("src").join("bin");
        std::fs::create_dir_all(&nested).unwrap();
        Repository::init(&root).unwrap();

        let ctx = git_context(&nested);
        assert_eq!(ctx.repo.as_deref(), Some("service"));
        assert!(ctx.branch.is_some());
    }

    #[test]
    fn test_unborn_branch_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let mut opts = RepositoryInitOptions::new();
        opts.initial_head("trunk");
        Repository::init_opts(dir.path(), &opts).unwrap();

        let ctx = git_context(dir.path());
        assert_eq!(ctx.branch.as_deref(), Some("trunk"));
    }

    #[test]
    fn test_detached_head_has_no_branch() {
        let dir = tempfile::tempdir().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        let sig = Signature::now("witr", "witr@example.com").unwrap();
        let tree_id = repo.index().unwrap().write_tree().unwrap();
        let tree = repo.find_tree(tree_id).unwrap();
        let commit = repo
            .commit(Some("HEAD"), &sig, &sig, "initial", &tree, &[])
            .unwrap();
        repo.set_head_detached(commit).unwrap();

        let ctx = git_context(dir.path());
        assert!(ctx.repo.is_some());
        assert_eq!(ctx.branch, None);
    }
}
