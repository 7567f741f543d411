//! Top-level alignment pipeline

use std::time::Instant;

use log::{debug, info};
use rayon::prelude::*;

use crate::anchor::{filter_anchors, find_anchors, find_reverse_anchors, Anchor};
use crate::chain::chain_anchors;
use crate::coverage::{ensure_complete_coverage, find_uncovered_regions, resolve_overlaps};
use crate::merge::{merge_adjacent, FINAL_MERGE_MAX_GAP, INITIAL_MERGE_MAX_GAP};
use crate::params::AlignParams;
use crate::segment::{clamp_segments, sort_segments, Segment};

/// Compute a sorted list of segments that together cover the whole query.
///
/// Each segment asserts that its query interval approximately matches its
/// reference interval, either directly or through the reverse complement of
/// the reference. Returns an empty list when either sequence is empty.
pub fn find_alignment(query: &[u8], reference: &[u8]) -> Vec<Segment> {
    if query.is_empty() || reference.is_empty() {
        return vec![];
    }

    let params = AlignParams::from_sequences(query, reference);
    info!("GC content: {:.4}", params.gc);

    // Anchor search per k value; the k values are independent and the
    // results are concatenated in k order, so the fan-out is deterministic
    let timer = Instant::now();
    let per_k: Vec<(Vec<Anchor>, Vec<Anchor>)> = params
        .k_values
        .par_iter()
        .map(|&k| {
            let stride = params.stride_for(k);
            let forward = find_anchors(
                query,
                reference,
                k,
                params.min_match,
                stride,
                params.max_errors,
            );
            let reverse = find_reverse_anchors(
                query,
                reference,
                k,
                params.min_match,
                stride,
                params.max_errors,
            );
            (forward, reverse)
        })
        .collect();
    let mut forward_anchors = Vec::new();
    let mut reverse_anchors = Vec::new();
    for (k, (forward, reverse)) in params.k_values.iter().zip(per_k) {
        debug!(
            "k={}: {} forward, {} reverse anchors",
            k,
            forward.len(),
            reverse.len()
        );
        forward_anchors.extend(forward);
        reverse_anchors.extend(reverse);
    }
    debug!("Anchor search: {:.2} s", timer.elapsed().as_secs_f64());

    let forward_anchors = filter_anchors(forward_anchors, params.overlap_threshold);
    let reverse_anchors = filter_anchors(reverse_anchors, params.overlap_threshold);
    info!(
        "After filtering: {} forward, {} reverse anchors remaining",
        forward_anchors.len(),
        reverse_anchors.len()
    );

    // Chain each strand separately, then pool the chained segments
    let mut chained: Vec<Segment> = Vec::new();
    chained.extend(
        chain_anchors(&forward_anchors)
            .into_iter()
            .map(|i| Segment::from(&forward_anchors[i])),
    );
    chained.extend(
        chain_anchors(&reverse_anchors)
            .into_iter()
            .map(|i| Segment::from(&reverse_anchors[i])),
    );

    let resolved = resolve_overlaps(&chained);
    let merged = merge_adjacent(&resolved, INITIAL_MERGE_MAX_GAP);

    let timer = Instant::now();
    let mut covered = ensure_complete_coverage(query, reference, &merged);
    debug!("Coverage repair: {:.2} s", timer.elapsed().as_secs_f64());

    covered.sort_by_key(|s| (s.query_start, s.ref_start));
    let merged = merge_adjacent(&covered, FINAL_MERGE_MAX_GAP);
    let resolved = resolve_overlaps(&merged);
    let mut segments = clamp_segments(&resolved, query.len(), reference.len());
    sort_segments(&mut segments);

    let uncovered_total: usize = find_uncovered_regions(query.len(), &segments)
        .iter()
        .map(|(start, end)| end - start + 1)
        .sum();
    info!(
        "Final coverage: {:.2}% of query ({} segments)",
        100.0 * (query.len() - uncovered_total) as f64 / query.len() as f64,
        segments.len()
    );

    segments
}
