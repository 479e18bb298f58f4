//! Version-control operations used by checkout and submodule resolution.
//!
//! [`GitVcs`] drives libgit2 through `git2`. Tests substitute their own
//! [`Vcs`] to observe which operations a run performs.

use crate::error::CheckoutError;
use colored::*;
use git2::{Oid, Repository};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;

pub trait Vcs {
    /// Clone `url` into `dest` (an existing empty directory) and check out `tag`.
    fn clone_pinned(&self, name: &str, url: &str, tag: &str, dest: &Path) -> Result<(), CheckoutError>;

    /// Initialise exactly the submodules at `paths` inside the repository at `repo_dir`.
    fn init_submodules(&self, name: &str, repo_dir: &Path, paths: &[String]) -> Result<(), CheckoutError>;

    /// Update the submodules at `paths` inside `repo_dir`, recursing into nested ones.
    fn update_submodules(&self, name: &str, repo_dir: &Path, paths: &[String]) -> Result<(), CheckoutError>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct GitVcs {
    pub quiet: bool,
}

impl GitVcs {
    pub fn new() -> Self {
        Self::default()
    }

    fn spinner(&self, message: String) -> ProgressBar {
        if self.quiet {
            return ProgressBar::hidden();
        }
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.blue} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_chars("⣾⣽⣻⢿⡿⣟⣯⣷"),
        );
        pb.set_message(message);
        pb.enable_steady_tick(std::time::Duration::from_millis(100));
        pb
    }
}

fn vcs_error(name: &str, err: impl std::fmt::Display) -> CheckoutError {
    CheckoutError::Vcs {
        name: name.to_string(),
        message: err.to_string(),
    }
}

impl Vcs for GitVcs {
    fn clone_pinned(&self, name: &str, url: &str, tag: &str, dest: &Path) -> Result<(), CheckoutError> {
        log::debug!("git clone {} {} --branch {}", url, dest.display(), tag);
        let pb = self.spinner(format!("Cloning {} ({})...", name, tag));

        let repo = match Repository::clone(url, dest) {
            Ok(repo) => repo,
            Err(err) => {
                pb.finish_with_message(format!("{} Failed {}", "x".red(), name));
                return Err(vcs_error(name, format!("clone of {} failed: {}", url, err)));
            }
        };

        let Some((oid, what)) = find_pinned_commit(&repo, tag) else {
            pb.finish_with_message(format!("{} Failed {}", "x".red(), name));
            return Err(vcs_error(
                name,
                format!("no tag or branch named '{}' in {}", tag, url),
            ));
        };

        if let Err(err) = checkout_detached(&repo, oid) {
            pb.finish_with_message(format!("{} Failed {}", "x".red(), name));
            return Err(vcs_error(name, err));
        }
        pb.finish_with_message(format!("{} Cloned {} at {}", "✓".green(), name, what));
        Ok(())
    }

    fn init_submodules(&self, name: &str, repo_dir: &Path, paths: &[String]) -> Result<(), CheckoutError> {
        log::debug!("git submodule init {}", paths.join(" "));
        let repo = Repository::open(repo_dir).map_err(|e| vcs_error(name, e))?;
        for path in paths {
            let mut submodule = repo
                .find_submodule(path)
                .map_err(|e| vcs_error(name, format!("submodule '{}': {}", path, e)))?;
            submodule
                .init(false)
                .map_err(|e| vcs_error(name, format!("submodule '{}': {}", path, e)))?;
        }
        Ok(())
    }

    fn update_submodules(&self, name: &str, repo_dir: &Path, paths: &[String]) -> Result<(), CheckoutError> {
        log::debug!("git submodule update --recursive {}", paths.join(" "));
        let repo = Repository::open(repo_dir).map_err(|e| vcs_error(name, e))?;
        let pb = self.spinner(format!("Updating submodules of {}...", name));
        match update_listed(&repo, paths) {
            Ok(count) => {
                pb.finish_with_message(format!(
                    "{} Updated {} submodules of {}",
                    "✓".green(),
                    count,
                    name
                ));
                Ok(())
            }
            Err(err) => {
                pb.finish_with_message(format!("{} Failed {}", "x".red(), name));
                Err(vcs_error(name, err))
            }
        }
    }
}

/// Tag first, then a local or remote-tracking branch of that name.
fn find_pinned_commit(repo: &Repository, tag: &str) -> Option<(Oid, String)> {
    if let Ok(reference) = repo.find_reference(&format!("refs/tags/{}", tag))
        && let Ok(commit) = reference.peel_to_commit()
    {
        return Some((commit.id(), format!("tag {}", tag)));
    }

    if let Ok(branch) = repo.find_branch(tag, git2::BranchType::Local)
        && let Ok(commit) = branch.get().peel_to_commit()
    {
        return Some((commit.id(), format!("branch {}", tag)));
    }

    let remote_ref = format!("origin/{}", tag);
    if let Ok(branch) = repo.find_branch(&remote_ref, git2::BranchType::Remote)
        && let Ok(commit) = branch.get().peel_to_commit()
    {
        return Some((commit.id(), format!("branch {}", tag)));
    }

    None
}

fn checkout_detached(repo: &Repository, oid: Oid) -> Result<(), git2::Error> {
    let obj = repo.find_object(oid, None)?;
    let mut opts = git2::build::CheckoutBuilder::new();
    opts.force();
    repo.checkout_tree(&obj, Some(&mut opts))?;
    repo.set_head_detached(oid)
}

/// Update the submodules at `paths`. Other submodules of `repo` stay
/// uninitialised even when they appear in `.gitmodules`.
fn update_listed(repo: &Repository, paths: &[String]) -> Result<usize, git2::Error> {
    let mut updated = 0;
    for path in paths {
        let mut submodule = repo.find_submodule(path)?;
        log::debug!("updating submodule {}", path);
        submodule.update(true, None)?;
        updated += 1;

        let nested = submodule.open()?;
        updated += update_all(&nested)?;
    }
    Ok(updated)
}

/// Initialise and update every submodule of `repo`, recursively.
fn update_all(repo: &Repository) -> Result<usize, git2::Error> {
    let mut updated = 0;
    for mut submodule in repo.submodules()? {
        log::debug!("updating nested submodule {}", submodule.path().display());
        submodule.update(true, None)?;
        updated += 1;

        let nested = submodule.open()?;
        updated += update_all(&nested)?;
    }
    Ok(updated)
}
