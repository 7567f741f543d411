//! Coverage accounting and repair: every query position ends up inside a
//! segment, with locally re-searched matches where possible and synthesized
//! fallback segments where not.

use std::collections::HashSet;

use log::{debug, info};

use crate::region::{find_matches_in_large_region, find_matches_in_region};
use crate::segment::Segment;

const MIN_REGION_LENGTH: usize = 4;
const LARGE_REGION_THRESHOLD: usize = 1000;
const FALLBACK_TILE_THRESHOLD: usize = 475;
const FALLBACK_TILE_LENGTH: usize = 275;
const REF_SAMPLE_COUNT: usize = 25;

/// Maximal query intervals not covered by any segment, as inclusive
/// (start, end) pairs in query order
pub fn find_uncovered_regions(query_len: usize, segments: &[Segment]) -> Vec<(usize, usize)> {
    if segments.is_empty() {
        return if query_len > 0 {
            vec![(0, query_len - 1)]
        } else {
            vec![]
        };
    }
    let mut sorted = segments.to_vec();
    sorted.sort_by_key(|s| s.query_start);

    let mut uncovered = Vec::new();
    let mut cursor = 0;
    for seg in &sorted {
        if seg.query_start > cursor {
            uncovered.push((cursor, seg.query_start - 1));
        }
        cursor = cursor.max(seg.query_end + 1);
    }
    if cursor < query_len {
        uncovered.push((cursor, query_len - 1));
    }
    uncovered
}

/// Resolve query overlaps by keeping the longer segment. The output is
/// sorted by query start and pairwise non-overlapping in query coordinates.
pub fn resolve_overlaps(segments: &[Segment]) -> Vec<Segment> {
    if segments.is_empty() {
        return vec![];
    }
    let mut sorted = segments.to_vec();
    sorted.sort_by(|a, b| {
        a.query_start
            .cmp(&b.query_start)
            .then(b.query_len().cmp(&a.query_len()))
            .then(a.ref_start.cmp(&b.ref_start))
    });

    let mut result = vec![sorted[0]];
    for &seg in &sorted[1..] {
        let current = result.last_mut().unwrap();
        if seg.query_start <= current.query_end {
            if seg.query_len() > current.query_len() {
                *current = seg;
            }
        } else {
            result.push(seg);
        }
    }
    result
}

/// Close every hole in the query coverage.
///
/// Each uncovered interval is re-searched locally against the whole
/// reference; intervals where nothing is found receive synthesized fallback
/// segments. Overlaps between the incoming segments and repair segments are
/// resolved in favor of the incoming ones. Whenever the query and reference
/// are non-empty, the result covers every query position.
pub fn ensure_complete_coverage(
    query: &[u8],
    reference: &[u8],
    initial: &[Segment],
) -> Vec<Segment> {
    if query.is_empty() {
        return vec![];
    }

    let mut covering = initial.to_vec();
    covering.sort_by_key(|s| s.query_start);

    let uncovered = find_uncovered_regions(query.len(), &covering);
    if uncovered.is_empty() {
        debug!("query already fully covered");
        return covering;
    }
    info!("Found {} uncovered regions in query", uncovered.len());

    let mut repairs = Vec::new();
    for (i, &(start, end)) in uncovered.iter().enumerate() {
        let region_len = end - start + 1;
        debug!(
            "Processing uncovered region {}/{}: query pos {}-{} (length {})",
            i + 1,
            uncovered.len(),
            start,
            end,
            region_len
        );
        if region_len < MIN_REGION_LENGTH {
            continue;
        }

        let region = &query[start..=end];
        let mut matches = if region_len > LARGE_REGION_THRESHOLD {
            find_matches_in_large_region(region, reference)
        } else {
            find_matches_in_region(region, reference)
        };

        if matches.is_empty() {
            synthesize_fallbacks(query, reference, start, end, &mut repairs);
            continue;
        }
        debug!("  {} candidate matches", matches.len());

        // Best-first, keeping candidates that do not collide within this
        // same interval
        matches.sort_by(|a, b| b.score.total_cmp(&a.score));
        let mut taken: Vec<Segment> = Vec::new();
        for m in &matches {
            let candidate = Segment {
                query_start: m.query_start + start,
                query_end: m.query_end + start,
                ref_start: m.ref_start,
                ref_end: m.ref_end,
            };
            let collides = taken.iter().any(|t| {
                t.query_start.max(candidate.query_start) <= t.query_end.min(candidate.query_end)
            });
            if !collides {
                taken.push(candidate);
                repairs.push(candidate);
            }
        }
    }

    let originals: HashSet<Segment> = initial.iter().copied().collect();
    let mut all = covering;
    all.extend(repairs);
    all.sort_by_key(|s| s.query_start);

    // On overlap, an original segment beats a repair; otherwise the longer
    // one wins
    let mut resolved: Vec<Segment> = Vec::new();
    if let Some((&head, rest)) = all.split_first() {
        let mut current = head;
        for &next in rest {
            if next.query_start <= current.query_end {
                let current_is_original = originals.contains(&current);
                let next_is_original = originals.contains(&next);
                if next_is_original && !current_is_original {
                    current = next;
                } else if next_is_original == current_is_original
                    && next.query_end - next.query_start > current.query_end - current.query_start
                {
                    current = next;
                }
            } else {
                resolved.push(current);
                current = next;
            }
        }
        resolved.push(current);
    }

    let residual = find_uncovered_regions(query.len(), &resolved);
    if residual.is_empty() {
        return resolved;
    }
    info!(
        "{} regions still uncovered, adding fallback segments",
        residual.len()
    );
    for (start, end) in residual {
        resolved.push(positional_fallback(start, end, reference.len()));
    }
    resolve_overlaps(&resolved)
}

/// Fabricate segments for an interval the search could not place. Long
/// intervals are tiled and each tile is pinned to the reference window with
/// the best exact-match ratio among evenly sampled starts; short intervals
/// map positionally.
fn synthesize_fallbacks(
    query: &[u8],
    reference: &[u8],
    start: usize,
    end: usize,
    out: &mut Vec<Segment>,
) {
    let region_len = end - start + 1;
    debug!(
        "  no matches for region {}-{}, synthesizing fallbacks",
        start, end
    );
    if region_len > FALLBACK_TILE_THRESHOLD {
        let mut offset = 0;
        while offset < region_len {
            let tile_start = start + offset;
            let tile_end = start + (offset + FALLBACK_TILE_LENGTH).min(region_len) - 1;
            let tile = &query[tile_start..=tile_end];
            let ref_start = best_sampled_start(tile, reference);
            out.push(Segment {
                query_start: tile_start,
                query_end: tile_end,
                ref_start,
                ref_end: ref_start + tile.len() - 1,
            });
            offset += FALLBACK_TILE_LENGTH;
        }
    } else {
        out.push(positional_fallback(start, end, reference.len()));
    }
}

/// Probe evenly spaced reference starts and return the one whose window has
/// the highest exact-match ratio against the tile
fn best_sampled_start(tile: &[u8], reference: &[u8]) -> usize {
    let step = (reference.len() / REF_SAMPLE_COUNT).max(1);
    let mut best_start = 0;
    let mut best_ratio = -1.0;
    let mut pos = 0;
    while pos + tile.len() <= reference.len() {
        let window = &reference[pos..pos + tile.len()];
        let matches = tile.iter().zip(window).filter(|(a, b)| a == b).count();
        let ratio = matches as f64 / tile.len() as f64;
        if ratio > best_ratio {
            best_ratio = ratio;
            best_start = pos;
        }
        pos += step;
    }
    best_start
}

/// Map an unplaceable query interval onto the reference by position,
/// clipping to the reference bounds
fn positional_fallback(start: usize, end: usize, ref_len: usize) -> Segment {
    let len = end - start + 1;
    let mut ref_start = start % ref_len;
    let mut ref_end = ref_start + len - 1;
    if ref_end >= ref_len {
        ref_end = ref_len - 1;
        if ref_start > ref_end || len > ref_len {
            ref_start = 0;
        }
    }
    Segment {
        query_start: start,
        query_end: end,
        ref_start,
        ref_end,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segment(query_start: usize, query_end: usize, ref_start: usize, ref_end: usize) -> Segment {
        Segment {
            query_start,
            query_end,
            ref_start,
            ref_end,
        }
    }

    fn make_sequence(len: usize, mut state: u64) -> Vec<u8> {
        let mut seq = Vec::with_capacity(len);
        for _ in 0..len {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            seq.push(b"ACGT"[(state >> 33) as usize % 4]);
        }
        seq
    }

    #[test]
    fn test_find_uncovered_regions() {
        assert_eq!(find_uncovered_regions(10, &[]), [(0, 9)]);
        assert!(find_uncovered_regions(0, &[]).is_empty());

        let segments = [segment(0, 4, 0, 4), segment(10, 14, 10, 14)];
        assert_eq!(find_uncovered_regions(20, &segments), [(5, 9), (15, 19)]);

        let covering = [segment(0, 19, 0, 19)];
        assert!(find_uncovered_regions(20, &covering).is_empty());
    }

    #[test]
    fn test_find_uncovered_regions_unsorted_input() {
        let segments = [segment(10, 14, 0, 4), segment(0, 4, 0, 4)];
        assert_eq!(find_uncovered_regions(15, &segments), [(5, 9)]);
    }

    #[test]
    fn test_resolve_overlaps_keeps_longer() {
        let segments = [
            segment(0, 10, 0, 10),
            segment(5, 30, 100, 125),
            segment(25, 28, 200, 203),
        ];
        let resolved = resolve_overlaps(&segments);
        assert_eq!(resolved, [segment(5, 30, 100, 125)]);
    }

    #[test]
    fn test_resolve_overlaps_disjoint_passthrough() {
        let segments = [segment(0, 10, 0, 10), segment(20, 30, 20, 30)];
        assert_eq!(resolve_overlaps(&segments), segments);
    }

    #[test]
    fn test_resolve_overlaps_is_nonoverlapping_and_sorted() {
        let segments = [
            segment(12, 40, 0, 28),
            segment(0, 25, 30, 55),
            segment(38, 60, 70, 92),
        ];
        let resolved = resolve_overlaps(&segments);
        for pair in resolved.windows(2) {
            assert!(pair[0].query_end < pair[1].query_start);
        }
    }

    #[test]
    fn test_positional_fallback() {
        assert_eq!(positional_fallback(5, 9, 100), segment(5, 9, 5, 9));
        // wraps by query position
        assert_eq!(positional_fallback(105, 109, 100), segment(105, 109, 5, 9));
        // clipped at the reference end
        assert_eq!(positional_fallback(95, 104, 100), segment(95, 104, 95, 99));
        // interval longer than the whole reference
        assert_eq!(positional_fallback(0, 149, 100), segment(0, 149, 0, 99));
    }

    #[test]
    fn test_best_sampled_start_finds_origin() {
        let reference = make_sequence(1000, 3);
        let tile = &reference[280..400];
        // step is 1000 / 25 = 40, so position 280 is on the sample grid and
        // matches exactly
        assert_eq!(best_sampled_start(tile, &reference), 280);
    }

    #[test]
    fn test_coverage_of_empty_inputs() {
        assert!(ensure_complete_coverage(b"", b"ACGT", &[]).is_empty());
    }

    #[test]
    fn test_already_covered_input_is_returned_as_is() {
        let seq = make_sequence(40, 5);
        let initial = [segment(0, 39, 0, 39)];
        assert_eq!(ensure_complete_coverage(&seq, &seq, &initial), initial);
    }

    #[test]
    fn test_small_gap_is_skipped_then_backfilled() {
        // a 3-long hole is below the search threshold but still gets a
        // fallback segment in the end
        let seq = make_sequence(40, 5);
        let initial = [segment(0, 19, 0, 19), segment(23, 39, 23, 39)];
        let result = ensure_complete_coverage(&seq, &seq, &initial);
        assert!(find_uncovered_regions(seq.len(), &result).is_empty());
        assert!(result.contains(&segment(20, 22, 20, 22)));
    }

    #[test]
    fn test_uncovered_tail_is_repaired_by_search() {
        let seq = make_sequence(60, 21);
        let initial = [segment(0, 29, 0, 29)];
        let result = ensure_complete_coverage(&seq, &seq, &initial);
        assert!(find_uncovered_regions(seq.len(), &result).is_empty());
        assert!(result.contains(&segment(0, 29, 0, 29)));
        assert!(result.contains(&segment(30, 59, 30, 59)));
    }

    #[test]
    fn test_unmatchable_query_gets_positional_fallback() {
        // query of N's never matches an ACGT reference
        let query = vec![b'N'; 30];
        let reference = make_sequence(100, 9);
        let result = ensure_complete_coverage(&query, &reference, &[]);
        assert_eq!(result, [segment(0, 29, 0, 29)]);
    }
}
