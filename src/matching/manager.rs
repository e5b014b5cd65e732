// src/matching/manager.rs - Worker fan-out and merge for the reconciliation run
use anyhow::{anyhow, Context, Result};
use futures::future::join_all;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use log::{debug, error, info, warn};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinHandle;

use crate::comparison::CachedComparator;
use crate::matching::processor::{BatchProcessor, NO_CORRESPONDING_PROPERTY};
use crate::models::matching::{MatchStatus, PropertyRecord, ReportEntry, WorkerOutput};

/// Runs the full matching phase: list A is split into interleaved slices,
/// one worker per slice, each tracking consumption privately. Reports are
/// concatenated and consumed sets unioned only after every worker finishes,
/// then every unclaimed list-B record gets its own mismatch row.
pub async fn run_matching_pipeline(
    list_a: Arc<Vec<PropertyRecord>>,
    list_b: Arc<Vec<PropertyRecord>>,
    comparator: Arc<CachedComparator>,
    num_workers: usize,
    chunk_size: usize,
    sub_batch_size: usize,
    multi_progress: Option<&MultiProgress>,
) -> Result<Vec<ReportEntry>> {
    let num_workers = num_workers.max(1);
    let chunk_size = chunk_size.max(1);
    let start_time = Instant::now();

    info!(
        "🚀 Launching {} matching workers over {} list-A records against {} list-B candidates",
        num_workers,
        list_a.len(),
        list_b.len()
    );

    let processor = Arc::new(BatchProcessor::new(comparator, sub_batch_size));
    let mut tasks: Vec<JoinHandle<Result<WorkerOutput>>> = Vec::new();

    for worker_index in 0..num_workers {
        let slice = interleaved_slice(&list_a, worker_index, num_workers);

        let progress = multi_progress.map(|mp| {
            let pb = mp.add(ProgressBar::new(slice.len() as u64));
            pb.set_style(
                ProgressStyle::default_bar()
                    .template(
                        "  {spinner:.blue} [{elapsed_precise}] {bar:30.green/blue} {pos}/{len} {msg}",
                    )
                    .unwrap()
                    .progress_chars("█▉▊▋▌▍▎▏  "),
            );
            pb.set_message(format!("Worker {}", worker_index + 1));
            pb
        });

        let list_b = Arc::clone(&list_b);
        let processor = Arc::clone(&processor);
        tasks.push(tokio::spawn(async move {
            run_worker(worker_index, slice, list_b, processor, chunk_size, progress).await
        }));
    }

    let join_results = join_all(tasks).await;

    let mut outputs: Vec<WorkerOutput> = Vec::new();
    let mut failed_workers = 0;
    for (i, join_result) in join_results.into_iter().enumerate() {
        match join_result {
            Ok(Ok(output)) => {
                debug!(
                    "Worker {} finished: {} report entries, {} list-B indices claimed",
                    i + 1,
                    output.report.len(),
                    output.consumed.len()
                );
                outputs.push(output);
            }
            Ok(Err(e)) => {
                failed_workers += 1;
                error!("❌ Worker {} returned an error: {:?}", i + 1, e);
            }
            Err(e) => {
                failed_workers += 1;
                error!("💥 Worker {} panicked or failed to join: {:?}", i + 1, e);
            }
        }
    }

    if failed_workers > 0 {
        return Err(anyhow!(
            "{} of {} matching workers failed",
            failed_workers,
            num_workers
        ));
    }

    // Consumption is private to each worker until this point, so two workers
    // can have claimed the same list-B index. The union keeps one copy while
    // the report keeps both rows; the overlap is logged, not repaired.
    let mut report: Vec<ReportEntry> = Vec::new();
    let mut consumed: HashSet<usize> = HashSet::new();
    for output in outputs {
        for &index in &output.consumed {
            if !consumed.insert(index) {
                warn!(
                    "⚠️ List-B index {} was claimed by more than one worker",
                    index
                );
            }
        }
        report.extend(output.report);
    }

    let mut unmatched_b = 0;
    for (index, record) in list_b.iter().enumerate() {
        if !consumed.contains(&index) {
            unmatched_b += 1;
            report.push(ReportEntry {
                list_a_desc: String::new(),
                list_b_desc: record.description.clone(),
                status: MatchStatus::Mismatch,
                details: NO_CORRESPONDING_PROPERTY.to_string(),
            });
        }
    }

    info!(
        "🏁 Matching complete: {} report entries, {} unmatched list-B records, {:.2?} elapsed",
        report.len(),
        unmatched_b,
        start_time.elapsed()
    );
    Ok(report)
}

/// Slice `offset` takes every `step`-th record starting at `offset`, so
/// workers cover disjoint records while sharing the list's ordering.
fn interleaved_slice(
    list: &[PropertyRecord],
    offset: usize,
    step: usize,
) -> Vec<PropertyRecord> {
    list.iter().skip(offset).step_by(step).cloned().collect()
}

async fn run_worker(
    worker_index: usize,
    slice: Vec<PropertyRecord>,
    list_b: Arc<Vec<PropertyRecord>>,
    processor: Arc<BatchProcessor>,
    chunk_size: usize,
    progress: Option<ProgressBar>,
) -> Result<WorkerOutput> {
    let mut output = WorkerOutput::default();
    if slice.is_empty() {
        if let Some(pb) = &progress {
            pb.finish_with_message(format!("Worker {}: no records assigned", worker_index + 1));
        }
        return Ok(output);
    }

    debug!(
        "Worker {} starting on {} records",
        worker_index + 1,
        slice.len()
    );

    for chunk in slice.chunks(chunk_size) {
        let entries = processor
            .process(chunk, &list_b, &mut output.consumed)
            .await
            .with_context(|| {
                format!(
                    "Worker {} failed while processing a chunk of {} records",
                    worker_index + 1,
                    chunk.len()
                )
            })?;
        output.report.extend(entries);
        if let Some(pb) = &progress {
            pb.inc(chunk.len() as u64);
        }
    }

    if let Some(pb) = &progress {
        pb.finish_with_message(format!(
            "Worker {}: {} entries",
            worker_index + 1,
            output.report.len()
        ));
    }
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prop(desc: &str) -> PropertyRecord {
        PropertyRecord {
            description: desc.to_string(),
            limit: "$1M".to_string(),
            mortgage_amount: "500K".to_string(),
        }
    }

    #[test]
    fn interleaved_slices_cover_the_list_without_overlap() {
        let list: Vec<PropertyRecord> = (0..7).map(|i| prop(&format!("P{}", i))).collect();

        let s0 = interleaved_slice(&list, 0, 3);
        let s1 = interleaved_slice(&list, 1, 3);
        let s2 = interleaved_slice(&list, 2, 3);

        let descs = |s: &[PropertyRecord]| -> Vec<String> {
            s.iter().map(|p| p.description.clone()).collect()
        };
        assert_eq!(descs(&s0), vec!["P0", "P3", "P6"]);
        assert_eq!(descs(&s1), vec!["P1", "P4"]);
        assert_eq!(descs(&s2), vec!["P2", "P5"]);
        assert_eq!(s0.len() + s1.len() + s2.len(), list.len());
    }

    #[test]
    fn more_workers_than_records_leaves_trailing_slices_empty() {
        let list = vec![prop("Only One")];
        assert_eq!(interleaved_slice(&list, 0, 4).len(), 1);
        assert!(interleaved_slice(&list, 1, 4).is_empty());
        assert!(interleaved_slice(&list, 3, 4).is_empty());
    }
}
