//! Progress indicators with CI fallback

use super::context::UiContext;
use crate::cache::{BatchObserver, BatchReport, ItemOutcome, ItemStatus};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Mutex;

/// A task spinner with CI fallback
pub struct TaskSpinner {
    spinner: Option<cliclack::ProgressBar>,
    interactive: bool,
}

impl TaskSpinner {
    /// Create a new spinner (shows immediately in interactive mode)
    pub fn new(ctx: &UiContext) -> Self {
        Self {
            spinner: None,
            interactive: ctx.use_fancy_output(),
        }
    }

    /// Start the spinner with a message
    pub fn start(&mut self, message: &str) {
        if self.interactive {
            let spinner = cliclack::spinner();
            spinner.start(message);
            self.spinner = Some(spinner);
        } else {
            // Plain output for CI
            println!("{} {}", style("...").dim(), message);
        }
    }

    /// Stop with success message
    pub fn stop(&mut self, message: &str) {
        if let Some(spinner) = self.spinner.take() {
            spinner.stop(message);
        } else if self.interactive {
            println!("{} {}", style("✓").green(), message);
        } else {
            println!("{} {}", style("[OK]").green(), message);
        }
    }

    /// Stop with error message
    pub fn stop_error(&mut self, message: &str) {
        if let Some(spinner) = self.spinner.take() {
            spinner.error(message);
        } else if self.interactive {
            println!("{} {}", style("✗").red(), message);
        } else {
            println!("{} {}", style("[FAIL]").red(), message);
        }
    }
}

/// Progress bar for a batch of archive operations.
///
/// Shows an indicatif bar in interactive mode and one line per item in CI.
/// Failures and warnings are always printed so they survive the bar.
pub struct BatchProgress {
    interactive: bool,
    bar: Mutex<Option<ProgressBar>>,
}

impl BatchProgress {
    pub fn new(ctx: &UiContext) -> Self {
        Self {
            interactive: ctx.use_fancy_output(),
            bar: Mutex::new(None),
        }
    }

    fn current_bar(&self) -> Option<ProgressBar> {
        self.bar.lock().ok().and_then(|bar| bar.clone())
    }
}

/// Plain-text line for one finished item
fn outcome_line(outcome: &ItemOutcome) -> String {
    match &outcome.status {
        ItemStatus::Done => format!("  {} {}", style("[OK]").green(), outcome.item),
        ItemStatus::Warned => format!("  {} {}", style("[WARN]").yellow(), outcome.item),
        ItemStatus::Failed(reason) => {
            format!("  {} {}: {}", style("[FAIL]").red(), outcome.item, reason)
        }
    }
}

impl BatchObserver for BatchProgress {
    fn on_start(&self, label: &str, total: usize) {
        if total == 0 {
            return;
        }

        if !self.interactive {
            println!("{} ({} item(s))", style(label).bold(), total);
            return;
        }

        let bar = ProgressBar::new(total as u64);
        if let Ok(bar_style) = ProgressStyle::default_bar()
            .template("  {spinner:.cyan} {prefix}  {bar:20.cyan/dim} {pos}/{len} {msg:.dim}  {elapsed:.dim}")
        {
            bar.set_style(bar_style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ ").progress_chars("━╸─"));
        }
        bar.set_prefix(label.to_string());
        bar.enable_steady_tick(std::time::Duration::from_millis(120));

        if let Ok(mut slot) = self.bar.lock() {
            *slot = Some(bar);
        }
    }

    fn on_item(&self, outcome: &ItemOutcome) {
        match self.current_bar() {
            Some(bar) => {
                if outcome.status != ItemStatus::Done {
                    bar.println(outcome_line(outcome));
                }
                bar.set_message(outcome.item.clone());
                bar.inc(1);
            }
            None => println!("{}", outcome_line(outcome)),
        }
    }

    fn on_finish(&self, _report: &BatchReport) {
        let bar = self.bar.lock().ok().and_then(|mut slot| slot.take());
        if let Some(bar) = bar {
            bar.disable_steady_tick();
            bar.finish_and_clear();
        }
    }
}
