//! Submodule initialisation for freshly cloned dependencies.
//!
//! Only the submodule paths listed in the manifest are initialised, which
//! allows a partial checkout of very large super-repositories. Boost is the
//! one dependency that needs more: each of its libraries is a submodule with
//! its own `include/boost/` tree, and its build expects those trees unified
//! under a single `boost/` directory before `b2` can run.

use super::manifest::DependencyRecord;
use super::merge::merge_dirs;
use super::tools::ToolRunner;
use super::vcs::Vcs;
use crate::error::CheckoutError;
use crate::workdir::WorkingDirGuard;
use colored::*;
use std::fs;
use std::path::Path;

/// Include root the boost submodules are unified into.
pub const UNIFIED_INCLUDE_DIR: &str = "boost";

/// Compiled boost libraries built after bootstrapping.
pub const BOOST_BUILD_ARGS: [&str; 2] = ["--with-system", "--with-filesystem"];

/// Post-checkout behaviour selected per dependency.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DependencyKind {
    Generic,
    /// Submodules each ship `include/boost/`; unify them and build.
    MultiSubmoduleIncludeUnion,
}

impl DependencyKind {
    pub fn of(record: &DependencyRecord) -> Self {
        if record.name.starts_with("boost") {
            DependencyKind::MultiSubmoduleIncludeUnion
        } else {
            DependencyKind::Generic
        }
    }
}

/// Bootstrap script and build driver for the host platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildScripts {
    pub bootstrap: &'static str,
    pub build: &'static str,
}

impl BuildScripts {
    pub fn for_host() -> Self {
        if cfg!(windows) {
            Self {
                bootstrap: "bootstrap.bat",
                build: "b2.exe",
            }
        } else {
            Self {
                bootstrap: "./bootstrap.sh",
                build: "./b2",
            }
        }
    }
}

pub struct SubmoduleResolver<'a> {
    vcs: &'a dyn Vcs,
    tools: &'a dyn ToolRunner,
}

impl<'a> SubmoduleResolver<'a> {
    pub fn new(vcs: &'a dyn Vcs, tools: &'a dyn ToolRunner) -> Self {
        Self { vcs, tools }
    }

    /// Initialise and update the submodules of `record`, checked out at `checkout_dir`.
    ///
    /// Runs with `checkout_dir` as the working directory; the previous one is
    /// restored on every return path.
    pub fn resolve(&self, record: &DependencyRecord, checkout_dir: &Path) -> Result<(), CheckoutError> {
        if record.submodules.is_empty() {
            return Ok(());
        }

        let _cwd = WorkingDirGuard::enter(checkout_dir).map_err(|e| CheckoutError::fs(checkout_dir, e))?;
        let here = Path::new(".");

        println!(
            "   {} Initialising {} submodules of {}",
            "📦".blue(),
            record.submodules.len(),
            record.name
        );
        self.vcs.init_submodules(&record.name, here, &record.submodules)?;
        self.vcs.update_submodules(&record.name, here, &record.submodules)?;

        match DependencyKind::of(record) {
            DependencyKind::Generic => Ok(()),
            DependencyKind::MultiSubmoduleIncludeUnion => {
                unify_includes(&record.submodules, Path::new(UNIFIED_INCLUDE_DIR))?;
                self.build(BuildScripts::for_host())
            }
        }
    }

    fn build(&self, scripts: BuildScripts) -> Result<(), CheckoutError> {
        self.tools.run(scripts.bootstrap, &[])?;
        self.tools.run(scripts.build, &BOOST_BUILD_ARGS)
    }
}

/// Merge every `<submodule>/include/boost/` that exists into `unified`.
fn unify_includes(submodules: &[String], unified: &Path) -> Result<(), CheckoutError> {
    fs::create_dir_all(unified).map_err(|e| CheckoutError::fs(unified, e))?;

    for submodule in submodules {
        let include = Path::new(submodule).join("include").join("boost");
        if !include.is_dir() {
            log::debug!("{} has no include/boost, skipping", submodule);
            continue;
        }
        let stats = merge_dirs(&include, unified)?;
        log::debug!(
            "{}: moved {} entries, merged {} directories",
            submodule,
            stats.moved,
            stats.merged_dirs
        );
    }
    Ok(())
}
