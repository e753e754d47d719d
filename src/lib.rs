//! modcache - offline module cache
//!
//! Mirrors a project's installed dependencies into versioned archives
//! under `.modules` and restores them into `node_modules` without
//! re-resolving or re-downloading anything.

pub mod cache;
pub mod cli;
pub mod config;
pub mod error;
pub mod project;
pub mod strategy;
pub mod ui;

pub use error::{ModcacheError, ModcacheResult};
pub use strategy::{InstallReport, PackReport, Strategy};
