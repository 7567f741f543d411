use std::collections::HashSet;
use std::fmt::{Display, Formatter};

use crate::extend::extend_seed;
use crate::kmer::find_exact_matches;
use crate::params::BASE_OVERLAP_THRESHOLD;
use crate::sequence::reverse_complement;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Forward,
    Reverse,
}

/// Extended, scored approximate match between a query interval and a
/// reference interval. All coordinates are inclusive.
#[derive(Debug, Clone)]
pub struct Anchor {
    pub query_start: usize,
    pub query_end: usize,
    pub ref_start: usize,
    pub ref_end: usize,
    pub score: f64,
    pub identity: f64,
    pub orientation: Orientation,
}

impl Anchor {
    pub fn query_len(&self) -> usize {
        self.query_end - self.query_start + 1
    }

    pub fn ref_len(&self) -> usize {
        self.ref_end - self.ref_start + 1
    }
}

impl Display for Anchor {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Anchor(query: {}..{}, ref: {}..{}, rc={}, identity={:.3}, score={:.1})",
            self.query_start,
            self.query_end,
            self.ref_start,
            self.ref_end,
            (self.orientation == Orientation::Reverse) as u8,
            self.identity,
            self.score,
        )
    }
}

/// Find anchors between query and reference by extending exact k-mer seeds.
///
/// Seeds whose (query, ref) start already lies on the diagonal of an earlier
/// anchor are skipped unless they fall on the stride grid. Returns anchors
/// deduplicated by the seed-level overlap filter, sorted by query start.
pub fn find_anchors(
    query: &[u8],
    reference: &[u8],
    k: usize,
    min_match: usize,
    stride: usize,
    max_errors: usize,
) -> Vec<Anchor> {
    if k == 0 {
        return vec![];
    }
    let seeds = find_exact_matches(query, reference, k);

    let mut anchors = Vec::new();
    let mut processed: HashSet<(usize, usize)> = HashSet::new();
    for (i, seed) in seeds.iter().enumerate() {
        if i % stride != 0 && processed.contains(&(seed.query_pos, seed.ref_pos)) {
            continue;
        }
        let Some(anchor) = extend_seed(
            query,
            reference,
            seed.query_pos,
            seed.ref_pos,
            seed.len,
            min_match,
            max_errors,
        ) else {
            continue;
        };

        // Mark points along the anchor diagonal so later seeds that would
        // reproduce the same extension are skipped
        let len = anchor.query_len();
        let step = (len / 10).max(1);
        for offset in (0..len).step_by(step) {
            let q = anchor.query_start + offset;
            let r = anchor.ref_start + offset;
            if q < query.len() && r < reference.len() {
                processed.insert((q, r));
            }
        }
        anchors.push(anchor);
    }

    filter_anchors(anchors, BASE_OVERLAP_THRESHOLD)
}

/// Find anchors between the query and the reverse complement of the
/// reference, remapped onto forward reference coordinates.
pub fn find_reverse_anchors(
    query: &[u8],
    reference: &[u8],
    k: usize,
    min_match: usize,
    stride: usize,
    max_errors: usize,
) -> Vec<Anchor> {
    let rc = reverse_complement(reference);
    let mut anchors = find_anchors(query, &rc, k, min_match, stride, max_errors);
    for anchor in &mut anchors {
        let (start, end) = (anchor.ref_start, anchor.ref_end);
        anchor.ref_start = reference.len() - 1 - end;
        anchor.ref_end = reference.len() - 1 - start;
        anchor.orientation = Orientation::Reverse;
    }
    anchors
}

/// Score-greedy overlap removal: anchors are visited in order of decreasing
/// score, and every later anchor that overlaps a kept one by more than
/// `overlap_threshold` of its own span (in query or reference) is dropped.
/// The kept anchors are returned sorted by query start.
pub fn filter_anchors(mut anchors: Vec<Anchor>, overlap_threshold: f64) -> Vec<Anchor> {
    if anchors.is_empty() {
        return anchors;
    }
    anchors.sort_by(|a, b| b.score.total_cmp(&a.score));

    let mut excluded = vec![false; anchors.len()];
    let mut kept: Vec<Anchor> = Vec::new();
    for i in 0..anchors.len() {
        if excluded[i] {
            continue;
        }
        for j in i + 1..anchors.len() {
            if excluded[j] {
                continue;
            }
            let query_ratio = overlap_ratio(
                anchors[i].query_start,
                anchors[i].query_end,
                anchors[j].query_start,
                anchors[j].query_end,
            );
            let ref_ratio = overlap_ratio(
                anchors[i].ref_start,
                anchors[i].ref_end,
                anchors[j].ref_start,
                anchors[j].ref_end,
            );
            if query_ratio > overlap_threshold || ref_ratio > overlap_threshold {
                excluded[j] = true;
            }
        }
        kept.push(anchors[i].clone());
    }

    kept.sort_by_key(|a| a.query_start);
    kept
}

/// Overlap of [a_start, a_end] with [b_start, b_end], inclusive, as a
/// fraction of the second interval
fn overlap_ratio(a_start: usize, a_end: usize, b_start: usize, b_end: usize) -> f64 {
    let start = a_start.max(b_start);
    let end = a_end.min(b_end);
    if end < start {
        return 0.0;
    }
    (end - start + 1) as f64 / (b_end - b_start + 1) as f64
}
