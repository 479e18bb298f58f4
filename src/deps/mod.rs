//! Third-party dependency resolution.
//!
//! - **Manifest**: read `cfg/dependencies.xml` into [`DependencyRecord`]s and filter them
//! - **Fetch**: clone each record at its pinned tag unless its target exists
//! - **Submodules**: initialise listed submodules, unify boost include trees
//! - **Merge**: move one directory tree into another without replacing directories

mod fetch;
mod manifest;
mod merge;
mod submodules;
mod tools;
mod vcs;

#[cfg(test)]
pub(crate) mod testing;

pub use fetch::{CheckoutExecutor, CheckoutOutcome, CheckoutReport, CheckoutStatus};
pub use manifest::{DependencyRecord, FieldValue, FilterOptions, load, parse_manifest};
pub use merge::{MergeStats, merge_dirs};
pub use submodules::{BuildScripts, DependencyKind, SubmoduleResolver, UNIFIED_INCLUDE_DIR};
pub use tools::{SystemTools, ToolRunner};
pub use vcs::{GitVcs, Vcs};
