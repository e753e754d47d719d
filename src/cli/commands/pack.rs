//! Pack command - refresh the cache from node_modules

use crate::cache::{Operation, PlanSummary};
use crate::cli::args::PackArgs;
use crate::config::Settings;
use crate::error::ModcacheResult;
use crate::strategy::{PackReport, Strategy};
use crate::ui::{self, BatchProgress, TaskSpinner, UiContext};
use console::style;

/// Execute the pack command
pub async fn execute(args: PackArgs, settings: &Settings) -> ModcacheResult<()> {
    let ctx = UiContext::detect();

    if args.dry_run {
        let strategy = Strategy::open(settings.clone()).await?;
        return print_plan(&ctx, &strategy).await;
    }

    let strategy = Strategy::new(settings.clone()).await?;

    match args.module {
        Some(module) => pack_one(&ctx, &strategy, &module).await,
        None => pack_all(&ctx, &strategy).await,
    }
}

async fn pack_one(ctx: &UiContext, strategy: &Strategy, module: &str) -> ModcacheResult<()> {
    let mut spinner = TaskSpinner::new(ctx);
    spinner.start(&format!("Packing {}...", module));

    match strategy.pack(Some(module), &BatchProgress::new(ctx)).await {
        Ok(PackReport::Single {
            bucket,
            archive,
            replaced,
        }) => {
            let detail = match replaced {
                Some(old) => format!("Packed {} into {} (replaced {})", archive, bucket, old),
                None => format!("Packed {} into {}", archive, bucket),
            };
            spinner.stop(&detail);
            Ok(())
        }
        Ok(PackReport::Full { .. }) => {
            spinner.stop("Packed");
            Ok(())
        }
        Err(e) => {
            spinner.stop_error(&format!("Failed to pack {}", module));
            Err(e)
        }
    }
}

async fn pack_all(ctx: &UiContext, strategy: &Strategy) -> ModcacheResult<()> {
    ui::intro(ctx, "modcache pack");

    let progress = BatchProgress::new(ctx);
    let PackReport::Full { buckets } = strategy.pack(None, &progress).await? else {
        return Ok(());
    };

    let mut failed = 0;
    for run in &buckets {
        failed += run.report.failed();
        ui::warn_ignored(ctx, run.bucket, &run.ignored);
        if run.report.is_empty() {
            ui::step_ok(ctx, &format!("{}: up to date", run.bucket));
            continue;
        }

        let message = format!(
            "{}: {} applied, {} warning(s), {} failed",
            run.bucket,
            run.report.succeeded(),
            run.report.warned(),
            run.report.failed()
        );
        if run.report.failed() > 0 {
            ui::step_error(ctx, &message);
        } else if run.report.warned() > 0 {
            ui::step_warn(ctx, &message);
        } else {
            ui::step_ok(ctx, &message);
        }
    }

    if failed > 0 {
        ui::outro_warn(ctx, &format!("Pack finished with {} failure(s)", failed));
    } else {
        ui::outro_success(ctx, "Cache is in sync");
    }
    Ok(())
}

async fn print_plan(ctx: &UiContext, strategy: &Strategy) -> ModcacheResult<()> {
    ui::intro(ctx, "modcache pack --dry-run");

    for bucket_plan in strategy.plan().await? {
        ui::section(ctx, bucket_plan.bucket.dir_name());
        ui::warn_ignored(ctx, bucket_plan.bucket, &bucket_plan.ignored);

        if bucket_plan.plan.is_empty() {
            ui::remark(ctx, "up to date");
            continue;
        }

        for op in &bucket_plan.plan.operations {
            let marker = match op {
                Operation::Add { .. } => style("+").green(),
                Operation::Update { .. } => style("~").yellow(),
                Operation::Remove { .. } => style("-").red(),
                Operation::Warn { .. } => style("!").yellow(),
            };
            println!("  {} {}", marker, op);
        }

        let PlanSummary {
            add,
            update,
            remove,
            warn,
        } = bucket_plan.plan.summary();
        ui::remark(
            ctx,
            &format!(
                "{} to add, {} to update, {} to remove, {} not installed",
                add, update, remove, warn
            ),
        );
    }

    Ok(())
}
