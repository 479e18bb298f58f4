//! In-memory stand-ins for git and build tools, shared by the unit tests.

use super::tools::ToolRunner;
use super::vcs::Vcs;
use crate::error::CheckoutError;
use std::cell::RefCell;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VcsCall {
    Clone {
        name: String,
        url: String,
        tag: String,
        dest: PathBuf,
    },
    InitSubmodules {
        name: String,
        paths: Vec<String>,
    },
    UpdateSubmodules {
        name: String,
        paths: Vec<String>,
    },
}

#[derive(Debug, Default)]
pub struct RecordingVcs {
    pub log: RefCell<Vec<VcsCall>>,
    /// Dependency names whose clone fails.
    pub fail_clone: BTreeSet<String>,
    pub fail_update: bool,
    /// Files (relative path, content) written into every clone destination.
    pub clone_files: Vec<(String, String)>,
}

impl RecordingVcs {
    pub fn calls(&self) -> Vec<VcsCall> {
        self.log.borrow().clone()
    }

    pub fn clones(&self) -> Vec<VcsCall> {
        self.calls()
            .into_iter()
            .filter(|c| matches!(c, VcsCall::Clone { .. }))
            .collect()
    }

    fn failure(name: &str, what: &str) -> CheckoutError {
        CheckoutError::Vcs {
            name: name.to_string(),
            message: format!("{what} failed"),
        }
    }
}

impl Vcs for RecordingVcs {
    fn clone_pinned(&self, name: &str, url: &str, tag: &str, dest: &Path) -> Result<(), CheckoutError> {
        self.log.borrow_mut().push(VcsCall::Clone {
            name: name.to_string(),
            url: url.to_string(),
            tag: tag.to_string(),
            dest: dest.to_path_buf(),
        });
        if self.fail_clone.contains(name) {
            return Err(Self::failure(name, "clone"));
        }
        for (relative, content) in &self.clone_files {
            let path = dest.join(relative);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).map_err(|e| CheckoutError::fs(parent, e))?;
            }
            fs::write(&path, content).map_err(|e| CheckoutError::fs(&path, e))?;
        }
        Ok(())
    }

    fn init_submodules(&self, name: &str, _repo_dir: &Path, paths: &[String]) -> Result<(), CheckoutError> {
        self.log.borrow_mut().push(VcsCall::InitSubmodules {
            name: name.to_string(),
            paths: paths.to_vec(),
        });
        Ok(())
    }

    fn update_submodules(&self, name: &str, _repo_dir: &Path, paths: &[String]) -> Result<(), CheckoutError> {
        self.log.borrow_mut().push(VcsCall::UpdateSubmodules {
            name: name.to_string(),
            paths: paths.to_vec(),
        });
        if self.fail_update {
            return Err(Self::failure(name, "submodule update"));
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct RecordingTools {
    log: RefCell<Vec<(String, Vec<String>)>>,
    fail_on: Option<String>,
}

impl RecordingTools {
    pub fn failing_on(program: &str) -> Self {
        Self {
            fail_on: Some(program.to_string()),
            ..Default::default()
        }
    }

    pub fn calls(&self) -> Vec<(String, Vec<String>)> {
        self.log.borrow().clone()
    }
}

impl ToolRunner for RecordingTools {
    fn run(&self, program: &str, args: &[&str]) -> Result<(), CheckoutError> {
        self.log.borrow_mut().push((
            program.to_string(),
            args.iter().map(|a| a.to_string()).collect(),
        ));
        if self.fail_on.as_deref() == Some(program) {
            return Err(CheckoutError::ToolSpawn {
                program: program.to_string(),
                source: std::io::Error::other("simulated failure"),
            });
        }
        Ok(())
    }
}
