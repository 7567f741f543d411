//! Indel-tolerant bidirectional seed extension

use crate::anchor::{Anchor, Orientation};
use crate::params::MIN_IDENTITY;

/// Grow an exact seed match at (seed_q, seed_r) of length k into a scored
/// anchor by walking outwards in both directions. A mismatch first probes for
/// a 1- or 2-base gap on either sequence before being counted as a
/// substitution; every error costs one unit against `max_errors`, separately
/// per direction.
///
/// Returns `None` if the extended interval is shorter than `min_match` or its
/// identity falls below the acceptance threshold.
pub fn extend_seed(
    query: &[u8],
    reference: &[u8],
    seed_q: usize,
    seed_r: usize,
    k: usize,
    min_match: usize,
    max_errors: usize,
) -> Option<Anchor> {
    let mut total_matches = k;

    // Forward walk; qf/rf are exclusive ends
    let mut qf = seed_q + k;
    let mut rf = seed_r + k;
    let mut errors_fwd = 0;
    while qf < query.len() && rf < reference.len() && errors_fwd <= max_errors {
        if query[qf] == reference[rf] {
            qf += 1;
            rf += 1;
            total_matches += 1;
            continue;
        }
        if let Some(delta) = (1..=2).find(|&d| qf + d < query.len() && query[qf + d] == reference[rf]) {
            // gap in the reference: skip delta query bases
            qf += delta + 1;
            rf += 1;
            errors_fwd += 1;
            total_matches += 1;
            continue;
        }
        if let Some(delta) = (1..=2).find(|&d| rf + d < reference.len() && query[qf] == reference[rf + d]) {
            // gap in the query: skip delta reference bases
            qf += 1;
            rf += delta + 1;
            errors_fwd += 1;
            total_matches += 1;
            continue;
        }
        qf += 1;
        rf += 1;
        errors_fwd += 1;
    }

    // Backward walk; cursors may run past the left end, so they are signed
    let mut qb = seed_q as i64 - 1;
    let mut rb = seed_r as i64 - 1;
    let mut errors_bwd = 0;
    while qb >= 0 && rb >= 0 && errors_bwd <= max_errors {
        let (qi, ri) = (qb as usize, rb as usize);
        if query[qi] == reference[ri] {
            qb -= 1;
            rb -= 1;
            total_matches += 1;
            continue;
        }
        if let Some(delta) = (1..=2).find(|&d| qb - d >= 0 && query[(qb - d) as usize] == reference[ri]) {
            qb -= delta + 1;
            rb -= 1;
            errors_bwd += 1;
            total_matches += 1;
            continue;
        }
        if let Some(delta) = (1..=2).find(|&d| rb - d >= 0 && query[qi] == reference[(rb - d) as usize]) {
            qb -= 1;
            rb -= delta + 1;
            errors_bwd += 1;
            total_matches += 1;
            continue;
        }
        qb -= 1;
        rb -= 1;
        errors_bwd += 1;
    }

    let q_start = (qb + 1) as usize;
    let r_start = (rb + 1) as usize;
    let match_len = qf - q_start;

    let mut identity = total_matches as f64 / match_len as f64;
    if match_len > 50 {
        // Long anchors fold half-weighted left-context matches into the
        // identity so that anchors preceded by similar sequence rank higher
        let context = (match_len / 4).min(20);
        if q_start >= context && r_start >= context {
            let left_q = &query[q_start - context..q_start];
            let left_r = &reference[r_start - context..r_start];
            let context_matches = left_q.iter().zip(left_r).filter(|(a, b)| a == b).count();
            identity = (identity * match_len as f64 + context_matches as f64 * 0.5)
                / (match_len as f64 + context as f64 * 0.5);
        }
    }

    if match_len < min_match || identity < MIN_IDENTITY {
        return None;
    }

    // The score penalty counts only errors from the backward walk
    let score = match_len as f64 * identity * (1.0 - 0.05 * errors_bwd as f64);
    Some(Anchor {
        query_start: q_start,
        query_end: qf - 1,
        ref_start: r_start,
        ref_end: rf - 1,
        score,
        identity,
        orientation: Orientation::Forward,
    })
}
