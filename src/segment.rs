use crate::anchor::Anchor;

/// Alignment block between a query interval and a reference interval.
/// All coordinates are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Segment {
    pub query_start: usize,
    pub query_end: usize,
    pub ref_start: usize,
    pub ref_end: usize,
}

impl Segment {
    pub fn query_len(&self) -> usize {
        self.query_end - self.query_start + 1
    }
}

impl From<&Anchor> for Segment {
    fn from(anchor: &Anchor) -> Self {
        Segment {
            query_start: anchor.query_start,
            query_end: anchor.query_end,
            ref_start: anchor.ref_start,
            ref_end: anchor.ref_end,
        }
    }
}

/// One-line segment report. End coordinates are printed half-open; the
/// internal representation stays inclusive.
pub fn format_segments(segments: &[Segment]) -> String {
    let parts: Vec<String> = segments
        .iter()
        .map(|s| {
            format!(
                "({}, {}, {}, {})",
                s.query_start,
                s.query_end + 1,
                s.ref_start,
                s.ref_end + 1
            )
        })
        .collect();
    format!("[{}]", parts.join(", "))
}

/// Deterministic output order: query start, then reference start, then the
/// end coordinates
pub fn sort_segments(segments: &mut [Segment]) {
    segments.sort_by_key(|s| (s.query_start, s.ref_start, s.query_end, s.ref_end));
}

/// Clamp segment ends to the sequence bounds, dropping segments that become
/// inverted
pub fn clamp_segments(segments: &[Segment], query_len: usize, ref_len: usize) -> Vec<Segment> {
    segments
        .iter()
        .filter_map(|s| {
            let query_end = s.query_end.min(query_len - 1);
            let ref_end = s.ref_end.min(ref_len - 1);
            (s.query_start <= query_end && s.ref_start <= ref_end).then_some(Segment {
                query_start: s.query_start,
                query_end,
                ref_start: s.ref_start,
                ref_end,
            })
        })
        .collect()
}
