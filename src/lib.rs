//! # depfetch - third-party source dependency bootstrapper
//!
//! Reads a declarative XML manifest of third-party dependencies, clones each
//! one at its pinned tag into its target directory, initialises the
//! submodules it lists and finally points the project's configuration file
//! at the fetched include and library directories.
//!
//! ## Quick Start
//!
//! ```bash
//! # Fetch everything listed in cfg/dependencies.xml
//! depfetch
//!
//! # Only boost and catch, but never catch
//! depfetch --with boost --with catch --without catch
//! ```
//!
//! ## Module Organization
//!
//! - [`deps`] - Manifest loading, checkout, submodules, directory merging
//! - [`configure`] - Configuration file path rewriting
//! - [`commands`] - The end-to-end bootstrap run

/// CLI command handlers.
pub mod commands;

/// Resolver settings (`bootstrap.toml`, default paths).
pub mod config;

/// Configuration file rewriting.
pub mod configure;

/// Dependency manifest and checkout.
pub mod deps;

/// Error types.
pub mod error;

/// Terminal UI utilities (tables).
pub mod ui;

/// Scoped working-directory changes.
pub mod workdir;
