use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::time::Instant;

use new_releases::catalog::metallum::DEFAULT_BASE_URL;
use new_releases::catalog::{Catalog, InMemoryCatalog, MetallumClient};
use new_releases::collection::CollectionStore;
use new_releases::interval::ReleaseInterval;
use new_releases::output::{write_new_releases, DEFAULT_OUTPUT_FILE};
use new_releases::progress::{create_progress_bar, format_duration, log_event, set_log_only};
use new_releases::reconcile::{ReconcileEvent, Reconciler};
use new_releases::safety::validate_output_path;
use new_releases::stats::ReconcileStats;

#[derive(Parser)]
#[command(name = "new-releases")]
#[command(about = "Report full-length albums released by owned Metal bands that are not in the collection yet")]
struct Args {
    /// The file (in JSON format) with the bands to check for new releases
    #[arg(short = 'a', long)]
    albumlist: PathBuf,

    /// Interval in years (for example 2010-2016 or 2010-2010) within (and including) it will be searched
    #[arg(short = 'r', long, alias = "release_interval")]
    release_interval: ReleaseInterval,

    /// A file (in JSON format) with the bands and/or albums to be skipped
    #[arg(short = 's', long, alias = "skip_bands")]
    skip_bands: Option<PathBuf>,

    /// A file (in JSON format) with disambiguation information in case of bands with the same name
    #[arg(short = 'd', long)]
    disambiguations: Option<PathBuf>,

    /// Offline catalog snapshot (JSON) used instead of Encyclopaedia Metallum
    #[arg(long)]
    catalog: Option<PathBuf>,

    #[arg(long, default_value = DEFAULT_BASE_URL)]
    metallum_url: String,

    #[arg(short = 'o', long, default_value = DEFAULT_OUTPUT_FILE)]
    output: PathBuf,

    /// Write run statistics as JSON to this file
    #[arg(long)]
    stats: Option<PathBuf>,

    /// Hide the progress bar and colours
    #[arg(long)]
    log_only: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    set_log_only(args.log_only);

    let start = Instant::now();

    let mut inputs = vec![args.albumlist.as_path()];
    inputs.extend(args.skip_bands.as_deref());
    inputs.extend(args.disambiguations.as_deref());
    inputs.extend(args.catalog.as_deref());
    validate_output_path(&args.output, &inputs)?;

    println!("Loading collection: {:?}", args.albumlist);
    let store = CollectionStore::load(
        &args.albumlist,
        args.disambiguations.as_deref(),
        args.skip_bands.as_deref(),
    )?;
    println!("  {} Metal bands to check", store.len());

    let catalog: Box<dyn Catalog> = match &args.catalog {
        Some(path) => {
            println!("Using catalog snapshot: {:?}", path);
            Box::new(InMemoryCatalog::from_json_file(path)?)
        }
        None => {
            println!("Using catalog: {}", args.metallum_url);
            Box::new(MetallumClient::new(&args.metallum_url))
        }
    };

    let today = chrono::Local::now().date_naive();
    println!(
        "Searching releases in {} (up to {})",
        args.release_interval, today
    );

    let mut stats = ReconcileStats::new(store.len());
    let pb = create_progress_bar(store.len() as u64, "Checking bands");
    let reconciler = Reconciler::new(&store, catalog, args.release_interval, today);
    let releases = reconciler
        .run_with(|event| {
            stats.record(event);
            log_event(&pb, event);
            if matches!(
                event,
                ReconcileEvent::BandFound { .. } | ReconcileEvent::BandNotFound { .. }
            ) {
                pb.inc(1);
            }
        })
        .context("Reconciliation aborted")?;
    pb.finish_with_message(format!("Checked {} bands", store.len()));

    let written = write_new_releases(&args.output, &releases)?;

    stats.elapsed_seconds = start.elapsed().as_secs_f64();
    if let Some(path) = &args.stats {
        stats
            .write_to_file(path)
            .with_context(|| format!("Failed to write stats to {:?}", path))?;
    }
    if args.log_only {
        stats.log_json();
    }

    println!("\n{:=<60}", "");
    println!("Reconciliation complete!");
    println!("  Bands checked: {}", stats.bands_total);
    println!("  Not found: {}", stats.bands_not_found);
    println!("  Skipped: {}", stats.bands_skipped);
    println!("  Ambiguous names: {}", stats.ambiguous_names);
    println!("  Stale disambiguations: {}", stats.no_disambiguation_found);
    println!("  New releases: {}", releases.len());
    if written {
        println!("  Output: {:?}", args.output);
    }
    println!("  Elapsed: {}", format_duration(start.elapsed()));
    println!("{:=<60}", "");

    Ok(())
}
