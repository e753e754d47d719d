//! UI module for operator-facing output
//!
//! Uses `cliclack` in interactive terminals with automatic fallback to plain
//! `[OK]`/`[WARN]`/`[FAIL]` lines in CI/non-interactive environments.
//!
//! # Example
//!
//! ```rust,ignore
//! use modcache::ui::{self, BatchProgress, UiContext};
//!
//! let ctx = UiContext::detect();
//! ui::intro(&ctx, "modcache pack");
//!
//! let progress = BatchProgress::new(&ctx);
//! let report = strategy.pack(None, &progress).await?;
//!
//! ui::outro_success(&ctx, "Cache is in sync");
//! ```

mod context;
mod output;
mod progress;

pub use context::UiContext;
pub use output::{
    intro, outro_success, outro_warn, remark, section, step_error, step_info, step_ok, step_warn,
    warn_ignored,
};
pub use progress::{BatchProgress, TaskSpinner};
