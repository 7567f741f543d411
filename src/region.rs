//! Local anchor search for uncovered query regions

use crate::anchor::{find_anchors, find_reverse_anchors, Anchor};
use crate::params::{
    BASE_OVERLAP_THRESHOLD, DEFAULT_MAX_ERRORS, MIN_MATCH_LENGTH, STRICT_OVERLAP_THRESHOLD,
};

const SMALL_REGION_K: usize = 5;
const MEDIUM_REGION_K: usize = 6;
const LARGE_REGION_K: usize = 7;

const HUGE_REGION_THRESHOLD: usize = 5000;
const HUGE_CHUNK_SIZE: usize = 575;
const HUGE_CHUNK_OVERLAP: usize = 210;
const STANDARD_CHUNK_SIZE: usize = 475;
const STANDARD_CHUNK_OVERLAP_RATIO: f64 = 2.8;
const BOUNDARY_EXTRA_ERRORS: usize = 2;

static VERY_SHORT_CHUNK_KS: [usize; 2] = [4, 5];
static SHORT_CHUNK_KS: [usize; 3] = [5, 6, 7];
static LONG_CHUNK_KS: [usize; 3] = [7, 8, 9];

/// Anchors between a query region and the whole reference, both strands,
/// concatenated per k. Coordinates are relative to the region.
fn region_matches(
    query_region: &[u8],
    reference: &[u8],
    min_match: usize,
    max_errors: usize,
    k_values: &[usize],
) -> Vec<Anchor> {
    let mut matches = Vec::new();
    for &k in k_values {
        if k == 0 || k > query_region.len() || k > reference.len() {
            continue;
        }
        matches.extend(find_anchors(
            query_region,
            reference,
            k,
            min_match,
            1,
            max_errors,
        ));
        matches.extend(find_reverse_anchors(
            query_region,
            reference,
            k,
            min_match,
            1,
            max_errors,
        ));
    }
    matches
}

/// Search a short uncovered region against the whole reference with a single
/// k chosen from the region length.
pub fn find_matches_in_region(query_region: &[u8], reference: &[u8]) -> Vec<Anchor> {
    if query_region.is_empty() {
        return vec![];
    }
    let k = if query_region.len() < 50 {
        SMALL_REGION_K
    } else if query_region.len() < 100 {
        MEDIUM_REGION_K
    } else {
        LARGE_REGION_K
    };
    let max_errors = (MIN_MATCH_LENGTH / 10).max(3);
    region_matches(query_region, reference, MIN_MATCH_LENGTH, max_errors, &[k])
}

/// Divide-and-conquer search for a long uncovered region: the region is cut
/// into overlapping chunks, each chunk is searched against the whole
/// reference, and the pooled candidates go through the chunk-level overlap
/// filter.
pub fn find_matches_in_large_region(query_region: &[u8], reference: &[u8]) -> Vec<Anchor> {
    let region_len = query_region.len();
    if region_len == 0 {
        return vec![];
    }
    let (chunk_size, overlap) = if region_len > HUGE_REGION_THRESHOLD {
        (HUGE_CHUNK_SIZE, HUGE_CHUNK_OVERLAP)
    } else {
        (
            STANDARD_CHUNK_SIZE,
            (STANDARD_CHUNK_SIZE as f64 / STANDARD_CHUNK_OVERLAP_RATIO) as usize,
        )
    };
    let step = chunk_size - overlap;

    let mut matches = Vec::new();
    let mut chunk_start = 0;
    while chunk_start < region_len {
        let chunk_end = (chunk_start + chunk_size).min(region_len);
        if chunk_end - chunk_start >= MIN_MATCH_LENGTH {
            let chunk = &query_region[chunk_start..chunk_end];
            let k_values: &[usize] = if chunk.len() < 100 {
                &VERY_SHORT_CHUNK_KS
            } else if chunk.len() < 300 {
                &SHORT_CHUNK_KS
            } else {
                &LONG_CHUNK_KS
            };
            let mut max_errors = DEFAULT_MAX_ERRORS;
            if chunk_start == 0 || chunk_end == region_len {
                max_errors += BOUNDARY_EXTRA_ERRORS;
            }
            for m in region_matches(chunk, reference, MIN_MATCH_LENGTH, max_errors, k_values) {
                matches.push(Anchor {
                    query_start: m.query_start + chunk_start,
                    query_end: m.query_end + chunk_start,
                    ..m
                });
            }
        }
        chunk_start += step;
    }

    filter_region_matches(matches)
}

const HIGH_IDENTITY: f64 = 0.9;
const HIGH_IDENTITY_MIN_LEN: usize = 100;

/// Chunk-level variant of the anchor filter: the overlap ratio is taken over
/// the shorter of the two query intervals, every pair is compared, and
/// high-identity long matches tolerate less overlap around them.
fn filter_region_matches(mut matches: Vec<Anchor>) -> Vec<Anchor> {
    if matches.is_empty() {
        return matches;
    }
    matches.sort_by(|a, b| b.score.total_cmp(&a.score));

    let mut excluded = vec![false; matches.len()];
    let mut kept = Vec::new();
    for i in 0..matches.len() {
        if excluded[i] {
            continue;
        }
        let len_i = matches[i].query_len();
        let threshold = if matches[i].identity > HIGH_IDENTITY && len_i > HIGH_IDENTITY_MIN_LEN {
            STRICT_OVERLAP_THRESHOLD
        } else {
            BASE_OVERLAP_THRESHOLD
        };
        for j in 0..matches.len() {
            if i == j || excluded[j] {
                continue;
            }
            let start = matches[i].query_start.max(matches[j].query_start);
            let end = matches[i].query_end.min(matches[j].query_end);
            let overlap = if end >= start { end - start + 1 } else { 0 };
            let min_len = len_i.min(matches[j].query_len());
            if overlap as f64 / min_len as f64 > threshold {
                excluded[j] = true;
            }
        }
        kept.push(matches[i].clone());
    }
    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anchor::Orientation;

    /// Deterministic pseudo-random base sequence
    fn make_sequence(len: usize, mut state: u64) -> Vec<u8> {
        let mut seq = Vec::with_capacity(len);
        for _ in 0..len {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            seq.push(b"ACGT"[(state >> 33) as usize % 4]);
        }
        seq
    }

    fn anchor(query_start: usize, query_end: usize, score: f64, identity: f64) -> Anchor {
        Anchor {
            query_start,
            query_end,
            ref_start: query_start,
            ref_end: query_end,
            score,
            identity,
            orientation: Orientation::Forward,
        }
    }

    #[test]
    fn test_small_region_exact_match() {
        let reference = make_sequence(200, 7);
        let region = &reference[60..100];
        let matches = find_matches_in_region(region, &reference);
        assert!(!matches.is_empty());
        let best = matches
            .iter()
            .max_by(|a, b| a.score.total_cmp(&b.score))
            .unwrap();
        assert_eq!((best.query_start, best.query_end), (0, 39));
        assert_eq!((best.ref_start, best.ref_end), (60, 99));
        assert_eq!(best.identity, 1.0);
    }

    #[test]
    fn test_region_shorter_than_min_match_yields_nothing() {
        let reference = make_sequence(200, 7);
        let region = &reference[60..80];
        assert!(find_matches_in_region(region, &reference).is_empty());
    }

    #[test]
    fn test_empty_region() {
        assert!(find_matches_in_region(b"", b"ACGT").is_empty());
        assert!(find_matches_in_large_region(b"", b"ACGT").is_empty());
    }

    #[test]
    fn test_large_region_chunked_search() {
        let reference = make_sequence(1200, 11);
        let matches = find_matches_in_large_region(&reference, &reference);

        // chunks of 475 with overlap 169 start at 0, 306, 612 and 918; each
        // produces a full-length diagonal anchor, and the last one is close
        // enough to its predecessor to be filtered out
        for (start, end) in [(0, 474), (306, 780), (612, 1086)] {
            assert!(
                matches.iter().any(|m| m.query_start == start
                    && m.query_end == end
                    && m.ref_start == start
                    && m.ref_end == end),
                "missing diagonal anchor {}..{}",
                start,
                end
            );
        }
        assert!(!matches
            .iter()
            .any(|m| (m.query_start, m.query_end) == (918, 1199)));
        for m in &matches {
            assert!(m.identity >= 0.74);
            assert!(m.query_end < 1200);
            assert!(m.ref_end < 1200);
        }
    }

    #[test]
    fn test_filter_region_matches_uses_min_length() {
        // overlap of 80 is 0.4 of the longer interval but 0.8 of the
        // shorter one, which is what counts here
        let a = anchor(0, 199, 200.0, 0.8);
        let b = anchor(120, 219, 80.0, 0.8);
        let kept = filter_region_matches(vec![a, b]);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].query_start, 0);
    }

    #[test]
    fn test_filter_region_matches_high_identity_threshold() {
        // the same overlap fraction survives next to a low-identity anchor
        // but not next to a high-identity long one
        let low = anchor(0, 199, 200.0, 0.8);
        let tail_low = anchor(80, 279, 150.0, 0.8);
        let kept = filter_region_matches(vec![low, tail_low]);
        assert_eq!(kept.len(), 2);

        let high = anchor(0, 199, 200.0, 0.95);
        let tail_high = anchor(80, 279, 150.0, 0.8);
        let kept = filter_region_matches(vec![high, tail_high]);
        assert_eq!(kept.len(), 1);
    }
}
