//! List command - show cached archives

use crate::cache::{list_archives, Bucket, CachedArchive};
use crate::cli::args::{ListArgs, OutputFormat};
use crate::config::Settings;
use crate::error::ModcacheResult;
use crate::project::ProjectLayout;
use crate::ui::{self, UiContext};
use console::style;
use serde::Serialize;

/// Archives of one bucket
#[derive(Debug, Serialize)]
struct BucketListing {
    bucket: Bucket,
    archives: Vec<CachedArchive>,
}

/// Execute the list command
pub async fn execute(args: ListArgs, settings: &Settings) -> ModcacheResult<()> {
    let layout = ProjectLayout::from_settings(settings);

    let mut listings = Vec::new();
    for bucket in [Bucket::Dependencies, Bucket::DevDependencies] {
        let archives = list_archives(layout.bucket_dir(bucket)).await?;
        listings.push(BucketListing { bucket, archives });
    }

    let total: usize = listings.iter().map(|l| l.archives.len()).sum();
    if total == 0 {
        match args.format {
            OutputFormat::Json => println!("[]"),
            OutputFormat::Plain => {}
            OutputFormat::Table => {
                let ctx = UiContext::detect();
                ui::step_info(&ctx, "No cached modules");
            }
        }
        return Ok(());
    }

    match args.format {
        OutputFormat::Table => print_table(&listings, total),
        OutputFormat::Json => print_json(&listings)?,
        OutputFormat::Plain => print_plain(&listings),
    }

    Ok(())
}

/// Format bytes as human-readable size (e.g., "1.5 MB")
fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

fn print_table(listings: &[BucketListing], total: usize) {
    let ctx = UiContext::detect();
    ui::intro(&ctx, "Cached modules");

    println!(
        "{:<32} {:<16} {:<16} {:>10} {:<17}",
        style("NAME").bold(),
        style("VERSION").bold(),
        style("BUCKET").bold(),
        style("SIZE").bold(),
        style("PACKED").bold()
    );
    println!("{}", "-".repeat(95));

    for listing in listings {
        for archive in &listing.archives {
            let packed = archive
                .modified
                .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_else(|| "unknown".to_string());
            let bucket = match listing.bucket {
                Bucket::Dependencies => style(listing.bucket.dir_name()).green(),
                Bucket::DevDependencies => style(listing.bucket.dir_name()).cyan(),
            };

            println!(
                "{:<32} {:<16} {:<16} {:>10} {:<17}",
                archive.name,
                archive.version,
                bucket,
                format_bytes(archive.size_bytes),
                packed
            );
        }
    }

    println!();
    println!("{} archive(s)", total);
}

fn print_json(listings: &[BucketListing]) -> ModcacheResult<()> {
    let json = serde_json::to_string_pretty(listings)?;
    println!("{}", json);
    Ok(())
}

fn print_plain(listings: &[BucketListing]) {
    for listing in listings {
        for archive in &listing.archives {
            println!("{}/{}@{}", listing.bucket, archive.name, archive.version);
        }
    }
}
