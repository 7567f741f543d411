use crate::segment::Segment;

pub const INITIAL_MERGE_MAX_GAP: i64 = 32;
pub const FINAL_MERGE_MAX_GAP: i64 = 22;

/// A pair of gaps may differ by at most this fraction of the smaller gap
/// (with an absolute floor of 5)
const MAX_GAP_RATIO_DIFFERENCE: f64 = 0.55;

/// Fuse nearby collinear segments. Input must be sorted by query start.
///
/// Two segments merge when both the query gap and the reference gap between
/// them are at most `max_gap` and the gaps are of similar size, so that the
/// fused block stays roughly diagonal.
pub fn merge_adjacent(segments: &[Segment], max_gap: i64) -> Vec<Segment> {
    let Some(first) = segments.first() else {
        return vec![];
    };
    let mut merged = vec![*first];
    for next in &segments[1..] {
        let current = merged.last_mut().unwrap();
        let query_gap = next.query_start as i64 - current.query_end as i64 - 1;
        let ref_gap = next.ref_start as i64 - current.ref_end as i64 - 1;
        let max_difference = f64::max(
            5.0,
            query_gap.min(ref_gap) as f64 * MAX_GAP_RATIO_DIFFERENCE,
        );
        if query_gap <= max_gap
            && ref_gap <= max_gap
            && (query_gap - ref_gap).abs() as f64 <= max_difference
        {
            current.query_end = next.query_end;
            current.ref_end = next.ref_end;
        } else {
            merged.push(*next);
        }
    }
    merged
}
