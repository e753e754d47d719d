//! Install command - restore node_modules from the cache

use crate::config::Settings;
use crate::error::ModcacheResult;
use crate::strategy::Strategy;
use crate::ui::{self, BatchProgress, UiContext};

/// Execute the install command
pub async fn execute(settings: &Settings) -> ModcacheResult<()> {
    let ctx = UiContext::detect();
    ui::intro(&ctx, "modcache install");

    let strategy = Strategy::new(settings.clone()).await?;
    if strategy.is_production() {
        ui::step_info(&ctx, "Production mode: skipping devDependencies");
    }

    let progress = BatchProgress::new(&ctx);
    let report = strategy.install(&progress).await?;

    for run in &report.buckets {
        ui::warn_ignored(&ctx, run.bucket, &run.ignored);
        if run.report.is_empty() {
            ui::step_info(&ctx, &format!("{}: cache is empty", run.bucket));
        } else if run.report.failed() == 0 {
            ui::step_ok(
                &ctx,
                &format!("{}: extracted {}", run.bucket, run.report.succeeded()),
            );
        } else {
            ui::step_warn(
                &ctx,
                &format!(
                    "{}: extracted {}, {} failed",
                    run.bucket,
                    run.report.succeeded(),
                    run.report.failed()
                ),
            );
        }
    }

    if report.failed() > 0 {
        ui::outro_warn(&ctx, "Done with errors. Now run 'npm rebuild'");
    } else {
        ui::outro_success(&ctx, "Done! Now run 'npm rebuild'");
    }

    Ok(())
}
