use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info};
use reconcile_lib::cache::{ComparisonCache, FileComparisonCache};
use reconcile_lib::comparison::CachedComparator;
use reconcile_lib::config::PipelineConfig;
use reconcile_lib::ingest::load_properties;
use reconcile_lib::llm::OpenAiChatService;
use reconcile_lib::matching::manager::run_matching_pipeline;
use reconcile_lib::models::stats::MatchStats;
use reconcile_lib::report::write_report;
use reconcile_lib::utils::env::load_env;
use reconcile_lib::utils::progress_bars::progress_config::ProgressConfig;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use uuid::Uuid;

/// Reconciles two JSON property lists into a CSV match report.
#[derive(Parser, Debug)]
#[command(name = "reconcile")]
struct Args {
    /// First property list (list A)
    #[arg(long, default_value = "data/list1.json")]
    list_a: PathBuf,

    /// Second property list (list B)
    #[arg(long, default_value = "data/list2.json")]
    list_b: PathBuf,

    /// Where to write the CSV report
    #[arg(long, short, default_value = "report.csv")]
    output: PathBuf,

    /// Override NUM_WORKERS from the environment
    #[arg(long)]
    workers: Option<usize>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging and environment
    env_logger::init();
    info!("Starting property reconciliation pipeline");
    load_env();

    let args = Args::parse();
    let mut config = PipelineConfig::from_env();
    if let Some(workers) = args.workers {
        config.num_workers = workers.max(1);
    }
    info!(
        "Configuration: model={}, workers={}, batch_size={}, llm_batch_size={}, cache_file={}",
        config.model, config.num_workers, config.batch_size, config.llm_batch_size, config.cache_file
    );

    // Load progress configuration from environment
    let progress_config = ProgressConfig::from_env();
    info!(
        "Progress tracking: enabled={}, detailed={}",
        progress_config.enabled, progress_config.detailed
    );
    let multi_progress = progress_config.create_multi_progress();

    // Create main pipeline progress bar
    let main_pb = if let Some(mp) = &multi_progress {
        let pb = mp.add(ProgressBar::new(3));
        pb.set_style(
            ProgressStyle::default_bar()
                .template(
                    "{spinner:.green} [{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}",
                )
                .unwrap()
                .progress_chars("█▉▊▋▌▍▎▏  "),
        );
        pb.set_message("Initializing pipeline...");
        Some(pb)
    } else {
        None
    };

    let mut phase_times = HashMap::new();
    let run_id = Uuid::new_v4().to_string();
    let run_timestamp = Utc::now();
    info!("Run ID: {} (started {})", run_id, run_timestamp);

    // Phase 1: Ingestion
    if let Some(pb) = &main_pb {
        pb.set_message("Phase 1: Loading property lists");
    }
    let phase1_start = Instant::now();

    let list_a = Arc::new(load_properties(&args.list_a)?);
    let list_b = Arc::new(load_properties(&args.list_b)?);
    if config.debug {
        for record in list_a.iter().take(3) {
            debug!("List A sample: {:?}", record);
        }
        for record in list_b.iter().take(3) {
            debug!("List B sample: {:?}", record);
        }
    }

    let phase1_duration = phase1_start.elapsed();
    phase_times.insert("ingestion".to_string(), phase1_duration);

    if let Some(pb) = &main_pb {
        pb.inc(1);
        pb.set_message(format!(
            "Phase 1 complete: {} + {} records",
            list_a.len(),
            list_b.len()
        ));
    }

    // Phase 2: Matching
    if let Some(pb) = &main_pb {
        pb.set_message("Phase 2: Matching");
    }
    let phase2_start = Instant::now();

    let cache = Arc::new(
        FileComparisonCache::load(&config.cache_file)
            .context("Failed to load comparison cache")?,
    );
    let model = Arc::new(OpenAiChatService::new(
        &config.openai_base_url,
        &config.openai_api_key,
        &config.model,
    ));
    let comparator = Arc::new(CachedComparator::new(
        cache.clone() as Arc<dyn ComparisonCache>,
        model,
    ));

    let worker_bars = if progress_config.should_show_detailed() {
        multi_progress.as_ref()
    } else {
        None
    };
    let report = run_matching_pipeline(
        Arc::clone(&list_a),
        Arc::clone(&list_b),
        Arc::clone(&comparator),
        config.num_workers,
        config.batch_size,
        config.llm_batch_size,
        worker_bars,
    )
    .await
    .context("Matching pipeline failed")?;

    let phase2_duration = phase2_start.elapsed();
    phase_times.insert("matching".to_string(), phase2_duration);

    if let Some(pb) = &main_pb {
        pb.inc(1);
        pb.set_message(format!("Phase 2 complete: {} entries", report.len()));
    }

    // Phase 3: Reporting and cache persistence
    if let Some(pb) = &main_pb {
        pb.set_message("Phase 3: Writing report");
    }
    let phase3_start = Instant::now();

    let stats = MatchStats::from_report(&report);
    write_report(&args.output, &report)?;
    cache
        .flush()
        .await
        .context("Failed to persist comparison cache")?;

    let phase3_duration = phase3_start.elapsed();
    phase_times.insert("reporting".to_string(), phase3_duration);

    if let Some(pb) = &main_pb {
        pb.inc(1);
        pb.set_message(format!("Pipeline complete: {} entries", report.len()));
        pb.finish();
    }

    // Print comprehensive summary
    let total_time = phase1_duration + phase2_duration + phase3_duration;
    let (cache_hits, cache_misses) = cache.stats().await;

    info!("=== Reconciliation Summary ===");
    info!("Run ID: {}", run_id);
    info!("List A records: {}", list_a.len());
    info!("List B records: {}", list_b.len());
    info!("Report entries: {}", stats.total());
    info!("Matches: {}", stats.matches);
    info!("Similar matches: {}", stats.similar_matches);
    info!("Mismatches: {}", stats.mismatches);
    info!("Model calls: {}", comparator.model_calls());
    if progress_config.should_show_cache_stats() {
        info!(
            "Cache: {} hits, {} misses ({:.1}% hit rate)",
            cache_hits,
            cache_misses,
            cache.hit_rate().await
        );
    }
    info!("=== Timing Breakdown ===");
    info!("Phase 1 (Ingestion): {:.2?}", phase1_duration);
    info!("Phase 2 (Matching): {:.2?}", phase2_duration);
    info!("Phase 3 (Reporting): {:.2?}", phase3_duration);
    info!("Total execution time: {:.2?}", total_time);

    info!(
        "Reconciliation complete. Report written to {}",
        args.output.display()
    );
    Ok(())
}
