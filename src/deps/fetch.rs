//! Checkout of manifest dependencies.
//!
//! Each dependency is cloned into its `target_dir` at the pinned tag, then its
//! submodules are resolved. A target directory that already exists means the
//! dependency is already resolved and nothing is fetched. Failures are
//! recorded per dependency and the run moves on to the next one.

use super::manifest::DependencyRecord;
use super::submodules::SubmoduleResolver;
use super::tools::ToolRunner;
use super::vcs::Vcs;
use crate::error::CheckoutError;
use colored::*;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub enum CheckoutStatus {
    Cloned,
    AlreadyPresent,
    Failed(CheckoutError),
}

impl CheckoutStatus {
    pub fn label(&self) -> &'static str {
        match self {
            CheckoutStatus::Cloned => "cloned",
            CheckoutStatus::AlreadyPresent => "already present",
            CheckoutStatus::Failed(_) => "failed",
        }
    }
}

#[derive(Debug)]
pub struct CheckoutOutcome {
    pub name: String,
    pub target_dir: PathBuf,
    pub status: CheckoutStatus,
}

/// Per-dependency results of [`CheckoutExecutor::checkout_all`], in manifest order.
#[derive(Debug, Default)]
pub struct CheckoutReport {
    pub outcomes: Vec<CheckoutOutcome>,
}

impl CheckoutReport {
    pub fn failures(&self) -> impl Iterator<Item = (&str, &CheckoutError)> {
        self.outcomes.iter().filter_map(|o| match &o.status {
            CheckoutStatus::Failed(err) => Some((o.name.as_str(), err)),
            _ => None,
        })
    }

    pub fn has_failures(&self) -> bool {
        self.failures().next().is_some()
    }

    pub fn count(&self, label: &str) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.status.label() == label)
            .count()
    }
}

pub struct CheckoutExecutor<'a> {
    root: &'a Path,
    vcs: &'a dyn Vcs,
    tools: &'a dyn ToolRunner,
}

impl<'a> CheckoutExecutor<'a> {
    /// `root` is the directory relative `target_dir` values are resolved against.
    pub fn new(root: &'a Path, vcs: &'a dyn Vcs, tools: &'a dyn ToolRunner) -> Self {
        Self { root, vcs, tools }
    }

    pub fn checkout_all(&self, records: &[DependencyRecord]) -> CheckoutReport {
        let mut report = CheckoutReport::default();
        let mut claimed: HashSet<PathBuf> = HashSet::new();

        if !records.is_empty() {
            println!("{} Checking {} dependencies...", "📦".blue(), records.len());
        }

        for record in records {
            let target = self.target_path(record);
            println!(
                "Checking out {} to {} ...",
                record.name.bold(),
                record.target_dir.display()
            );

            let status = if target.is_dir() || claimed.contains(&target) {
                println!("   {} ... already exists", "⚡".green());
                CheckoutStatus::AlreadyPresent
            } else {
                claimed.insert(target.clone());
                match self.checkout(record, &target) {
                    Ok(()) => CheckoutStatus::Cloned,
                    Err(err) => {
                        println!("   {} {}", "x".red(), err);
                        CheckoutStatus::Failed(err)
                    }
                }
            };

            report.outcomes.push(CheckoutOutcome {
                name: record.name.clone(),
                target_dir: record.target_dir.clone(),
                status,
            });
        }

        report
    }

    fn target_path(&self, record: &DependencyRecord) -> PathBuf {
        if record.target_dir.is_absolute() {
            record.target_dir.clone()
        } else {
            self.root.join(&record.target_dir)
        }
    }

    fn checkout(&self, record: &DependencyRecord, target: &Path) -> Result<(), CheckoutError> {
        fs::create_dir_all(target).map_err(|e| CheckoutError::fs(target, e))?;

        if let Err(err) = self
            .vcs
            .clone_pinned(&record.name, &record.url, &record.tag, target)
        {
            // an empty leftover would look resolved on the next run
            if let Err(cleanup) = fs::remove_dir_all(target) {
                log::warn!("could not remove {}: {}", target.display(), cleanup);
            }
            return Err(err);
        }

        SubmoduleResolver::new(self.vcs, self.tools).resolve(record, target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deps::submodules::{BuildScripts, UNIFIED_INCLUDE_DIR};
    use crate::deps::testing::{RecordingTools, RecordingVcs, VcsCall};
    use serial_test::serial;

    fn record(name: &str, target: &str) -> DependencyRecord {
        DependencyRecord {
            name: name.to_string(),
            url: format!("https://example/{name}.git"),
            tag: "v1".to_string(),
            target_dir: PathBuf::from(target),
            ..Default::default()
        }
    }

    #[test]
    fn test_single_dependency_is_cloned_once_at_tag() {
        let tmp = tempfile::tempdir().unwrap();
        let vcs = RecordingVcs::default();
        let tools = RecordingTools::default();
        let zlib = DependencyRecord {
            tag: "v1.2".to_string(),
            url: "https://example/zlib.git".to_string(),
            ..record("zlib", "third_party/zlib")
        };

        let report = CheckoutExecutor::new(tmp.path(), &vcs, &tools).checkout_all(&[zlib]);

        assert_eq!(
            vcs.calls(),
            vec![VcsCall::Clone {
                name: "zlib".to_string(),
                url: "https://example/zlib.git".to_string(),
                tag: "v1.2".to_string(),
                dest: tmp.path().join("third_party/zlib"),
            }]
        );
        assert!(tools.calls().is_empty());
        assert!(!tmp.path().join("third_party/zlib").join(UNIFIED_INCLUDE_DIR).exists());
        assert_eq!(report.count("cloned"), 1);
        assert!(!report.has_failures());
    }

    #[test]
    fn test_existing_target_is_skipped() {
        let tmp = tempfile::tempdir().unwrap();
        fs::create_dir_all(tmp.path().join("third_party/zlib")).unwrap();
        let vcs = RecordingVcs::default();
        let tools = RecordingTools::default();

        let report = CheckoutExecutor::new(tmp.path(), &vcs, &tools)
            .checkout_all(&[record("zlib", "third_party/zlib")]);

        assert!(vcs.calls().is_empty());
        assert!(matches!(report.outcomes[0].status, CheckoutStatus::AlreadyPresent));
    }

    #[test]
    fn test_duplicate_target_dir_skips_second_in_either_order() {
        for order in [["first", "second"], ["second", "first"]] {
            let tmp = tempfile::tempdir().unwrap();
            let vcs = RecordingVcs::default();
            let tools = RecordingTools::default();
            let records: Vec<_> = order.iter().map(|n| record(n, "shared")).collect();

            let report = CheckoutExecutor::new(tmp.path(), &vcs, &tools).checkout_all(&records);

            assert_eq!(vcs.clones().len(), 1);
            assert!(matches!(report.outcomes[0].status, CheckoutStatus::Cloned));
            assert!(matches!(report.outcomes[1].status, CheckoutStatus::AlreadyPresent));
        }
    }

    #[test]
    fn test_duplicate_target_dir_is_skipped_even_after_failed_clone() {
        let tmp = tempfile::tempdir().unwrap();
        let vcs = RecordingVcs {
            fail_clone: ["first".to_string()].into(),
            ..Default::default()
        };
        let tools = RecordingTools::default();

        let report = CheckoutExecutor::new(tmp.path(), &vcs, &tools)
            .checkout_all(&[record("first", "shared"), record("second", "shared")]);

        assert_eq!(vcs.clones().len(), 1);
        assert!(matches!(report.outcomes[1].status, CheckoutStatus::AlreadyPresent));
    }

    #[test]
    fn test_failed_clone_is_isolated_and_cleaned_up() {
        let tmp = tempfile::tempdir().unwrap();
        let vcs = RecordingVcs {
            fail_clone: ["broken".to_string()].into(),
            ..Default::default()
        };
        let tools = RecordingTools::default();

        let report = CheckoutExecutor::new(tmp.path(), &vcs, &tools)
            .checkout_all(&[record("broken", "deps/broken"), record("fine", "deps/fine")]);

        assert_eq!(vcs.clones().len(), 2);
        let failures: Vec<_> = report.failures().map(|(name, _)| name).collect();
        assert_eq!(failures, ["broken"]);
        assert!(matches!(report.outcomes[1].status, CheckoutStatus::Cloned));
        assert!(!tmp.path().join("deps/broken").exists());
        assert!(tmp.path().join("deps/fine").is_dir());
    }

    #[test]
    fn test_target_that_is_a_file_fails() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("zlib"), "not a directory").unwrap();
        let vcs = RecordingVcs::default();
        let tools = RecordingTools::default();

        let report =
            CheckoutExecutor::new(tmp.path(), &vcs, &tools).checkout_all(&[record("zlib", "zlib")]);

        assert!(vcs.calls().is_empty());
        assert!(matches!(
            report.outcomes[0].status,
            CheckoutStatus::Failed(CheckoutError::Filesystem { .. })
        ));
    }

    #[test]
    #[serial]
    fn test_boost_clone_runs_submodules_merge_and_build() {
        let tmp = tempfile::tempdir().unwrap();
        let vcs = RecordingVcs {
            clone_files: vec![
                (
                    "libs/system/include/boost/system/api.hpp".to_string(),
                    "system".to_string(),
                ),
                (
                    "libs/filesystem/include/boost/filesystem.hpp".to_string(),
                    "fs".to_string(),
                ),
            ],
            ..Default::default()
        };
        let tools = RecordingTools::default();
        let boost = DependencyRecord {
            submodules: vec!["libs/system".to_string(), "libs/filesystem".to_string()],
            ..record("boost", "3rdParty/boost")
        };

        let report = CheckoutExecutor::new(tmp.path(), &vcs, &tools).checkout_all(&[boost]);

        assert!(!report.has_failures());
        let unified = tmp.path().join("3rdParty/boost").join(UNIFIED_INCLUDE_DIR);
        assert!(unified.join("system/api.hpp").is_file());
        assert!(unified.join("filesystem.hpp").is_file());
        assert_eq!(vcs.calls().len(), 3);
        let programs: Vec<_> = tools.calls().into_iter().map(|(p, _)| p).collect();
        let scripts = BuildScripts::for_host();
        assert_eq!(programs, [scripts.bootstrap, scripts.build]);
    }
}
